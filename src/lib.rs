pub mod config;
pub mod element;
pub mod error;
pub mod grid;
pub mod history;
pub mod interaction;
pub mod logging;
pub mod session;
pub mod storage;
pub mod store;
pub mod style;
pub mod template;
pub mod tokens;
pub mod viewport;

pub use config::{load_engine_config, EngineConfig};
pub use element::{Element, ElementId, ElementKind, ElementPatch, ElementProperties, PatchError};
pub use error::{BuilderError, BuilderResult};
pub use grid::{resolve_grid, GridCss, GridPreset, GridSpec};
pub use history::{History, HistoryEntry, HistoryError};
pub use interaction::{ActionEffect, ActionPlan, ScheduledStep, StepOutcome};
pub use session::{ChangeEvent, EditorSession, SubscriptionId};
pub use storage::{JsonFileStorage, PageStorage, PersistenceWorker, StorageError};
pub use store::ElementStore;
pub use style::{compile_style, InteractionState, StyleDescriptor};
pub use template::SectionTemplate;
pub use tokens::{DesignSettings, DesignSettingsPatch, TokenRegistry};
pub use viewport::{Viewport, ViewportResolver};

/// Builds a session from the user's config file, with persistence enabled
/// under the configured (or default) data directory.
pub fn open_session() -> BuilderResult<EditorSession> {
    logging::init();
    let config = load_engine_config();
    let storage = match &config.storage_dir {
        Some(dir) => JsonFileStorage::with_paths(dir.clone()),
        None => JsonFileStorage::with_default_paths()?,
    };
    tracing::info!(root = %storage.root().display(), "starting pagecraft session");

    let mut session = EditorSession::new(config);
    session.enable_persistence(storage);
    Ok(session)
}
