//! Layout-shell state: sidebar visibility and the active application.

/// Terminals narrower than this many columns start with the sidebar closed.
pub const NARROW_TERMINAL_COLUMNS: u16 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SidebarStore {
    pub is_open: bool,
}

impl SidebarStore {
    /// Initial state for a terminal `width` columns wide.
    pub fn for_width(width: u16) -> Self {
        Self {
            is_open: width >= NARROW_TERMINAL_COLUMNS,
        }
    }

    pub fn set_open(&mut self, open: bool) {
        self.is_open = open;
    }
}

impl Default for SidebarStore {
    fn default() -> Self {
        Self { is_open: true }
    }
}

/// Which application the user is in, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppStore {
    current_app: Option<String>,
}

impl AppStore {
    pub fn set_current_app(&mut self, app: Option<String>) {
        self.current_app = app;
    }

    pub fn current_app(&self) -> Option<&str> {
        self.current_app.as_deref()
    }
}
