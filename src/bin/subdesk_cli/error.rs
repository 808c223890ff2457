use thiserror::Error;

use subdesk::config::SettingsError;
use subdesk::infra::{ApiError, InfraError};
use subdesk::registry::RegistryError;
use subdesk::validate::{AssociationError, CookieContentError, FieldErrors, ResolveError};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Settings(#[from] SettingsError),
    #[error("setup error: {0}")]
    Infra(#[from] InfraError),
    #[error("api error: {0}")]
    Api(#[from] ApiError),
    #[error("capability error: {0}")]
    Registry(#[from] RegistryError),
    #[error("validation failed: {0}")]
    Validation(#[from] FieldErrors),
    #[error("target resolution failed: {0}")]
    Resolve(#[from] ResolveError),
    #[error("association rejected: {0}")]
    Association(#[from] AssociationError),
    #[error("cookie content rejected: {0}")]
    CookieContent(#[from] CookieContentError),
    #[error("failed to read input file {path}: {source}")]
    InputFile {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to render output: {0}")]
    Render(#[from] serde_json::Error),
}
