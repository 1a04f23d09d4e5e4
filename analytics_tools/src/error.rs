use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyticsApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("The request could not be sent: {0}")]
    RequestError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("Unexpected response status {status}. {message}")]
    UnexpectedStatus { status: u16, message: String },
    #[error("The destination is not configured: {0}")]
    NotConfigured(String),
}
