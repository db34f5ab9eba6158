//! Status icon colours.

/// Colour of the tray icon for a given monitoring state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusIcon {
    /// Monitoring is not running.
    Idle,
    /// Running, first result not in yet.
    Checking,
    Connected,
    Disconnected,
}

impl StatusIcon {
    pub fn from_state(running: bool, connected: Option<bool>) -> Self {
        match (running, connected) {
            (false, _) => Self::Idle,
            (true, None) => Self::Checking,
            (true, Some(true)) => Self::Connected,
            (true, Some(false)) => Self::Disconnected,
        }
    }

    pub fn colour_name(self) -> &'static str {
        match self {
            Self::Idle => "gray",
            Self::Checking => "yellow",
            Self::Connected => "green",
            Self::Disconnected => "red",
        }
    }

    /// Fill colour as RGBA.
    pub fn rgba(self) -> [u8; 4] {
        match self {
            Self::Idle => [128, 128, 128, 255],
            Self::Checking => [255, 200, 0, 255],
            Self::Connected => [0, 180, 0, 255],
            Self::Disconnected => [220, 0, 0, 255],
        }
    }
}
