use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use oxigraph::sparql::EvaluationError;
use oxigraph::store::{LoaderError, SerializerError, StorageError};

#[derive(thiserror::Error, Debug)]
pub enum FakeFusekiError {
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("SPARQL requests sent with POST are not accepted")]
    PostRejected(StatusCode),
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal server error: {0}")]
    Internal(anyhow::Error),
}

impl IntoResponse for FakeFusekiError {
    fn into_response(self) -> Response {
        let status = match &self {
            FakeFusekiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            FakeFusekiError::NotFound(_) => StatusCode::NOT_FOUND,
            FakeFusekiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            FakeFusekiError::PostRejected(status) => *status,
            FakeFusekiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            FakeFusekiError::Unauthorized => StatusCode::UNAUTHORIZED,
            FakeFusekiError::Conflict(_) => StatusCode::CONFLICT,
            FakeFusekiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let mut response = (status, self.to_string()).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Basic realm=\"fuseki\""),
            );
        }
        response
    }
}

impl From<StorageError> for FakeFusekiError {
    fn from(error: StorageError) -> Self {
        Self::Internal(error.into())
    }
}

impl From<SerializerError> for FakeFusekiError {
    fn from(error: SerializerError) -> Self {
        Self::Internal(error.into())
    }
}

impl From<EvaluationError> for FakeFusekiError {
    fn from(error: EvaluationError) -> Self {
        Self::BadRequest(error.to_string())
    }
}

impl From<LoaderError> for FakeFusekiError {
    fn from(error: LoaderError) -> Self {
        match error {
            LoaderError::Storage(error) => error.into(),
            error => Self::BadRequest(error.to_string()),
        }
    }
}

impl From<std::io::Error> for FakeFusekiError {
    fn from(error: std::io::Error) -> Self {
        Self::Internal(error.into())
    }
}
