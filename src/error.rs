use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    #[error("catalog API key is not configured")]
    MissingCredential,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("decoding error: {0}")]
    Decoding(String),

    #[error("unknown catalog error")]
    Unknown,
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            CatalogError::InvalidRequest(err.to_string())
        } else if err.is_decode() {
            CatalogError::Decoding(err.to_string())
        } else {
            CatalogError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Decoding(err.to_string())
    }
}
