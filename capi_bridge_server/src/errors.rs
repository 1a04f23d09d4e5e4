use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use bridge_common::ShopIdError;
use conversion_engine::traits::StoreError;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("No shop was specified. Use the `shop` query parameter or the X-Shop-Id header.")]
    MissingShop,
    #[error("Invalid shop identifier. {0}")]
    InvalidShop(#[from] ShopIdError),
    #[error("Shop configuration error. {0}")]
    ConfigurationError(#[from] ConfigError),
    #[error("Order conversion error. {0}")]
    OrderConversionError(#[from] OrderConversionError),
    #[error("Could not store attribution data. {0}")]
    StorageError(#[from] StoreError),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::MissingShop => StatusCode::BAD_REQUEST,
            Self::InvalidShop(_) => StatusCode::BAD_REQUEST,
            Self::ConfigurationError(_) => StatusCode::BAD_REQUEST,
            Self::OrderConversionError(_) => StatusCode::BAD_REQUEST,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::StorageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "success": false, "error": self.to_string() }).to_string())
    }
}

#[derive(Debug, Error)]
pub enum OrderConversionError {
    #[error("The order payload is not valid. {0}")]
    InvalidPayload(String),
    #[error("The order has no order number.")]
    MissingOrderNumber,
}
