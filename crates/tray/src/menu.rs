//! Dynamic context menu and status text for the system tray.

use chrono::{DateTime, Local, Utc};

use crate::icon::StatusIcon;
use crate::tray::TrayEvent;

/// Actions that can be triggered from the tray context menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    /// Show the current status in a message box.
    ShowStatus,
    /// Open (or reload) the settings.
    OpenSettings,
    /// User requested to quit the application.
    Quit,
}

impl MenuAction {
    /// The event the tray sends to the application when this item is clicked.
    pub fn event(&self) -> TrayEvent {
        match self {
            Self::ShowStatus => TrayEvent::StatusRequested,
            Self::OpenSettings => TrayEvent::SettingsRequested,
            Self::Quit => TrayEvent::QuitRequested,
        }
    }
}

/// A single menu item.
#[derive(Debug, Clone)]
pub struct MenuItem {
    /// Display text.
    pub label: String,
    /// Whether the item is enabled (clickable).
    pub enabled: bool,
    /// Optional action triggered on click.
    pub action: Option<MenuAction>,
}

impl MenuItem {
    fn info(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            enabled: false,
            action: None,
        }
    }

    fn separator() -> Self {
        Self::info(String::new())
    }

    fn action(label: &str, action: MenuAction) -> Self {
        Self {
            label: label.into(),
            enabled: true,
            action: Some(action),
        }
    }
}

/// Current state used to build the context menu.
#[derive(Debug, Clone)]
pub struct MenuState {
    /// Display name of the monitored device.
    pub device_name: String,
    /// `host:port` being probed.
    pub target: String,
    /// Whether monitoring is running.
    pub running: bool,
    /// Last reported reachability (`None` before the first report).
    pub connected: Option<bool>,
    /// Time of the last report.
    pub last_checked_at: Option<DateTime<Utc>>,
}

impl Default for MenuState {
    fn default() -> Self {
        Self {
            device_name: "Cash Register".into(),
            target: String::new(),
            running: false,
            connected: None,
            last_checked_at: None,
        }
    }
}

impl MenuState {
    pub fn icon(&self) -> StatusIcon {
        StatusIcon::from_state(self.running, self.connected)
    }

    /// Short status word shown in the menu header.
    pub fn status_label(&self) -> &'static str {
        match self.icon() {
            StatusIcon::Idle => "Stopped",
            StatusIcon::Checking => "Checking...",
            StatusIcon::Connected => "Connected",
            StatusIcon::Disconnected => "Disconnected",
        }
    }

    /// Hover text for the tray icon.
    pub fn tooltip(&self) -> String {
        if self.connected.is_none() {
            return format!("{} Monitor", self.device_name);
        }

        let mut text = format!(
            "{}: {}\nTarget: {}",
            self.device_name,
            self.status_label(),
            self.target
        );
        if let Some(at) = self.last_checked_at {
            text.push_str(&format!("\nLast check: {}", local_time(at, "%H:%M:%S")));
        }
        text
    }

    /// Long-form status shown by the "Status" menu item.
    pub fn status_message(&self) -> String {
        let mut text = format!("Status: {}\nTarget: {}", self.status_label(), self.target);
        if let Some(at) = self.last_checked_at {
            text.push_str(&format!(
                "\nLast check: {}",
                local_time(at, "%Y-%m-%d %H:%M:%S")
            ));
        }
        text
    }

    /// Builds the menu items from the current state.
    pub fn build_menu(&self) -> Vec<MenuItem> {
        vec![
            MenuItem::info(format!("{}: {}", self.device_name, self.status_label())),
            MenuItem::info(format!("Target: {}", self.target)),
            MenuItem::separator(),
            MenuItem::action("Status", MenuAction::ShowStatus),
            MenuItem::action("Settings", MenuAction::OpenSettings),
            MenuItem::separator(),
            MenuItem::action("Quit", MenuAction::Quit),
        ]
    }
}

fn local_time(at: DateTime<Utc>, fmt: &str) -> String {
    at.with_timezone(&Local).format(fmt).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    fn connected_state() -> MenuState {
        MenuState {
            device_name: "Front Till".into(),
            target: "192.168.1.155:4999".into(),
            running: true,
            connected: Some(true),
            last_checked_at: Some(Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()),
        }
    }

    #[test]
    fn default_menu_state() {
        let state = MenuState::default();
        assert_eq!(state.device_name, "Cash Register");
        assert!(!state.running);
        assert!(state.connected.is_none());
        assert_eq!(state.status_label(), "Stopped");
    }

    #[test]
    fn build_menu_layout() {
        let items = connected_state().build_menu();

        assert_eq!(items[0].label, "Front Till: Connected");
        assert!(!items[0].enabled);
        assert_eq!(items[1].label, "Target: 192.168.1.155:4999");

        let actions: Vec<_> = items.iter().filter_map(|i| i.action.clone()).collect();
        assert_eq!(
            actions,
            vec![MenuAction::ShowStatus, MenuAction::OpenSettings, MenuAction::Quit]
        );
        assert!(items.last().unwrap().action == Some(MenuAction::Quit));
    }

    #[test]
    fn header_tracks_state() {
        let mut state = connected_state();
        state.connected = Some(false);
        assert!(state.build_menu()[0].label.ends_with("Disconnected"));

        state.connected = None;
        assert!(state.build_menu()[0].label.ends_with("Checking..."));

        state.running = false;
        assert!(state.build_menu()[0].label.ends_with("Stopped"));
    }

    #[test]
    fn action_items_are_enabled() {
        let items = MenuState::default().build_menu();
        assert!(
            items
                .iter()
                .filter(|i| i.action.is_some())
                .all(|i| i.enabled)
        );
    }

    #[test]
    fn tooltip_before_first_report() {
        let state = MenuState {
            running: true,
            ..MenuState::default()
        };
        assert_eq!(state.tooltip(), "Cash Register Monitor");
    }

    #[test]
    fn tooltip_with_last_check() {
        let state = connected_state();
        let expected_time = local_time(state.last_checked_at.unwrap(), "%H:%M:%S");
        assert_eq!(
            state.tooltip(),
            format!("Front Till: Connected\nTarget: 192.168.1.155:4999\nLast check: {expected_time}")
        );
    }

    #[test]
    fn status_message_uses_full_date() {
        let state = connected_state();
        let message = state.status_message();
        assert!(message.starts_with("Status: Connected\nTarget: 192.168.1.155:4999\n"));
        let expected = local_time(state.last_checked_at.unwrap(), "%Y-%m-%d %H:%M:%S");
        assert!(message.ends_with(&expected));
    }

    #[test]
    fn status_message_without_check() {
        let state = MenuState {
            target: "10.0.0.7:9100".into(),
            ..MenuState::default()
        };
        assert_eq!(state.status_message(), "Status: Stopped\nTarget: 10.0.0.7:9100");
    }

    #[test]
    fn menu_actions_map_to_events() {
        assert_eq!(MenuAction::ShowStatus.event(), TrayEvent::StatusRequested);
        assert_eq!(MenuAction::OpenSettings.event(), TrayEvent::SettingsRequested);
        assert_eq!(MenuAction::Quit.event(), TrayEvent::QuitRequested);
    }
}
