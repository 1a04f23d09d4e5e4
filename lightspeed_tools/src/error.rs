use thiserror::Error;

#[derive(Debug, Error)]
pub enum LightspeedApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid REST request: {0}")]
    RestRequestError(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("Invalid order payload: {0}")]
    InvalidPayload(String),
}

impl LightspeedApiError {
    /// Authentication failures are reported by Lightspeed as 401/403 query errors.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::QueryError { status: 401 | 403, .. })
    }
}
