use thiserror::Error;

/// Errors raised while packaging selected entries
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("archive export requested but no archive writer is configured")]
    MissingCapability,

    #[error("entry '{id}' has an invalid base64 body: {source}")]
    InvalidBase64 {
        id: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("failed to build archive member '{path}': {source}")]
    Archive {
        path: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("failed to write '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
