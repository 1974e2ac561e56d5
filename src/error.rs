//! Error taxonomy shared by the scraper, settings store and sync pipeline.

use thiserror::Error;

/// Errors surfaced by pipeline operations.
///
/// Each variant tells the user what to fix; nothing here is retried
/// automatically.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Required settings are missing (credentials, table ids, field names).
    #[error("{0}")]
    Configuration(String),

    /// The token endpoint rejected the app credentials.
    #[error("{0}")]
    Auth(String),

    /// The caller passed unusable input.
    #[error("{0}")]
    Validation(String),

    /// The table API rejected a batch.
    #[error("{0}")]
    Sync(String),

    /// The target page could not be reached or read.
    #[error("page unavailable: {0}. Reload the target page and try again")]
    DomAccess(String),

    /// The settings file could not be written.
    #[error("settings storage error: {0}")]
    Storage(String),
}

/// Result alias for pipeline operations.
pub type Result<T, E = PipelineError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_display() {
        let err = PipelineError::Configuration("missing settings: appToken, tableId".to_string());
        assert_eq!(err.to_string(), "missing settings: appToken, tableId");
    }

    #[test]
    fn test_remote_messages_pass_through() {
        assert_eq!(PipelineError::Sync("FieldNameNotFound".into()).to_string(), "FieldNameNotFound");
        assert_eq!(PipelineError::Validation("nothing to sync".into()).to_string(), "nothing to sync");
    }

    #[test]
    fn test_dom_access_mentions_reload() {
        let err = PipelineError::DomAccess("connection refused".into());
        assert!(err.to_string().contains("Reload the target page"));
    }

    #[test]
    fn test_converts_into_anyhow() {
        let err: anyhow::Error = PipelineError::Auth("bad secret".into()).into();
        assert_eq!(err.to_string(), "bad secret");
    }
}
