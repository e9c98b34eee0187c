//! The stores and settings one CLI invocation works with.

use thiserror::Error;
use tracing::debug;

use crate::api::{ApiClient, ApiError};
use crate::config::Settings;
use crate::routes::{self, Match, Resolution, Route};
use crate::store::{AppStore, AuthStore, CourtIndexStore, MasterDedupStore, SidebarStore, StoreError};

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("Not signed in. Run 'truv login' first.")]
    Unauthenticated,
    #[error("Your role does not allow access to {0}")]
    Forbidden(&'static str),
    #[error("Cannot open {0}")]
    Unreachable(String),
}

/// Owns every store for the lifetime of a command.
#[derive(Debug)]
pub struct Workspace {
    pub settings: Settings,
    pub auth: AuthStore,
    pub sidebar: SidebarStore,
    pub apps: AppStore,
    pub court_index: CourtIndexStore,
    pub dedup: MasterDedupStore,
}

impl Workspace {
    /// Load the persisted session and saved dedup configurations.
    pub fn open(settings: Settings) -> Result<Self, StoreError> {
        let auth = AuthStore::open(&settings.session_path())?;
        let dedup = MasterDedupStore::load_saved(&settings.dedup_configs_path())?;
        let width = console::Term::stdout().size().1;
        debug!(
            "Opened workspace at {} (signed in: {})",
            settings.data_dir.display(),
            auth.is_authenticated()
        );
        Ok(Self {
            settings,
            auth,
            sidebar: SidebarStore::for_width(width),
            apps: AppStore::default(),
            court_index: CourtIndexStore::new(),
            dedup,
        })
    }

    /// A workspace with nothing loaded from disk.
    pub fn in_memory(settings: Settings) -> Self {
        Self {
            settings,
            auth: AuthStore::in_memory(),
            sidebar: SidebarStore::default(),
            apps: AppStore::default(),
            court_index: CourtIndexStore::new(),
            dedup: MasterDedupStore::new(),
        }
    }

    pub fn api(&self) -> Result<ApiClient, ApiError> {
        ApiClient::new(&self.settings.api_url, self.settings.timeout())
    }

    /// Navigate to `path`, applying guards and recording the active app.
    pub fn navigate(&mut self, path: &str) -> Result<Route, AccessError> {
        let asked_for_login = routes::match_path(path) == Match::Route(Route::Login);
        match routes::resolve_final(path, &self.auth) {
            Resolution::Allow(Route::Login) if !asked_for_login => Err(AccessError::Unauthenticated),
            Resolution::Allow(route) => {
                self.apps
                    .set_current_app(route.app_id().map(String::from));
                Ok(route)
            }
            Resolution::Forbidden(route) => Err(AccessError::Forbidden(route.path())),
            Resolution::Redirect(target) => Err(AccessError::Unreachable(target)),
        }
    }

    pub fn save_dedup_configs(&self) -> Result<(), StoreError> {
        self.dedup
            .persist_saved(&self.settings.dedup_configs_path())
    }
}
