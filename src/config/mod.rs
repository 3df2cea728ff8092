pub mod loader;
pub mod schema;

pub use loader::{load_from_path, load_from_str, load_or_default, ConfigError, ConfigOrigin};
pub use schema::{
    DiffSettings, EngineConfig, MatchSettings, PatchSettings, UnifiedSettings, ValidationError,
    ValidationIssue,
};
