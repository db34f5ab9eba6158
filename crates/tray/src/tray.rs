//! Tray handle, events, and update types.
//!
//! The actual system tray implementation depends on platform GUI crates that
//! need system libraries. This module defines the channel-based interface the
//! application uses to talk to the tray, independent of the GUI backend.

use std::sync::mpsc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::icon::StatusIcon;
use crate::menu::MenuState;

/// Configuration for the system tray.
#[derive(Debug, Clone)]
pub struct TrayConfig {
    /// Device display name shown in the tooltip and menu header.
    pub device_name: String,
    /// `host:port` being monitored.
    pub target: String,
}

impl Default for TrayConfig {
    fn default() -> Self {
        Self {
            device_name: "Cash Register".into(),
            target: String::new(),
        }
    }
}

/// Events emitted by the tray to the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrayEvent {
    /// User clicked "Status".
    StatusRequested,
    /// User clicked "Settings".
    SettingsRequested,
    /// User clicked "Quit" in the context menu.
    QuitRequested,
}

/// Updates sent from the application to the tray.
#[derive(Debug, Clone)]
pub enum TrayUpdate {
    /// Reachability was announced.
    StatusChanged { connected: bool, at: DateTime<Utc> },
    /// The monitored address changed.
    TargetChanged(String),
    /// Monitoring started or stopped.
    RunningStateChanged(bool),
    /// Request tray shutdown.
    Shutdown,
}

/// Handle for communicating with the system tray from the application.
///
/// The tray event loop runs on the main thread and communicates via channels.
pub struct TrayHandle {
    /// Send updates to the tray.
    update_tx: mpsc::Sender<TrayUpdate>,
    /// Receive events from the tray.
    event_rx: mpsc::Receiver<TrayEvent>,
    /// Current menu state (for tracking).
    state: MenuState,
}

impl TrayHandle {
    /// Creates a new tray handle with its channel pair.
    ///
    /// Returns `(handle, event_sender, update_receiver)`; the sender/receiver
    /// pair is given to the tray event loop running on the main thread.
    pub fn new(config: TrayConfig) -> (Self, mpsc::Sender<TrayEvent>, mpsc::Receiver<TrayUpdate>) {
        let (update_tx, update_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        let handle = Self {
            update_tx,
            event_rx,
            state: MenuState {
                device_name: config.device_name,
                target: config.target,
                ..MenuState::default()
            },
        };

        (handle, event_tx, update_rx)
    }

    /// Records a reachability announcement and forwards it to the tray.
    pub fn status_changed(&mut self, connected: bool, at: DateTime<Utc>) {
        self.state.connected = Some(connected);
        self.state.last_checked_at = Some(at);
        debug!(connected, icon = self.icon().colour_name(), "tray status updated");
        self.send(TrayUpdate::StatusChanged { connected, at });
    }

    /// Notifies the tray that a different address is being monitored.
    pub fn target_changed(&mut self, target: String) {
        self.state.target = target.clone();
        self.send(TrayUpdate::TargetChanged(target));
    }

    /// Updates the running state. Stopping clears the last result.
    pub fn set_running(&mut self, running: bool) {
        self.state.running = running;
        if !running {
            self.state.connected = None;
            self.state.last_checked_at = None;
        }
        self.send(TrayUpdate::RunningStateChanged(running));
    }

    /// Requests the tray to shut down.
    pub fn shutdown(&self) {
        self.send(TrayUpdate::Shutdown);
    }

    /// Tries to receive a tray event (non-blocking).
    pub fn try_recv_event(&self) -> Option<TrayEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Returns the current menu state.
    pub fn state(&self) -> &MenuState {
        &self.state
    }

    /// Returns the icon the tray should currently show.
    pub fn icon(&self) -> StatusIcon {
        self.state.icon()
    }

    fn send(&self, update: TrayUpdate) {
        // The tray backend may already be gone during shutdown.
        let _ = self.update_tx.send(update);
    }
}
