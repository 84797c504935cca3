use thiserror::Error;

#[derive(Debug, Error)]
pub enum LccError {
    #[error("not initialized: run 'lcc init'")]
    NotInitialized,

    #[error("workflow not found: {0}")]
    WorkflowNotFound(String),

    #[error("workflow file '{file}' declares id '{id}'; the id must match the file name")]
    WorkflowIdMismatch { file: String, id: String },

    #[error("invalid workflow id '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidSlug(String),

    #[error("invalid pattern for rule '{rule}': {source}")]
    InvalidPattern {
        rule: String,
        #[source]
        source: regex::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, LccError>;
