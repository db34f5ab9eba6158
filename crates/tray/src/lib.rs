//! Tray status model for the regwatch connectivity watchdog.
//!
//! Holds everything a system tray needs to show the device's reachability:
//! the status icon colour, tooltip, status text, and context menu. Drawing the
//! icon is left to whichever GUI backend hosts the tray.
//!
//! The tray communicates with the application via channels:
//! - [`TrayEvent`]: events from tray to application (menu clicks)
//! - [`TrayUpdate`]: updates from application to tray (status changes)
//!
//! # Platform notes
//! - The tray event loop must run on the main thread on some platforms, so
//!   the application side only ever talks to it through [`TrayHandle`].

mod icon;
mod menu;
mod tray;

pub use icon::StatusIcon;
pub use menu::{MenuAction, MenuItem, MenuState};
pub use tray::{TrayConfig, TrayEvent, TrayHandle, TrayUpdate};
