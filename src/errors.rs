use actix_web::{http::StatusCode, HttpResponse};
use derive_more::Display;

#[derive(Debug, Display)]
pub enum StorageError {
    #[display(fmt = "diesel error: {}", _0)]
    DieselError(diesel::result::Error),
    #[display(fmt = "pooling error: {}", _0)]
    R2D2Error(r2d2::Error),
    #[display(fmt = "migration error: {}", _0)]
    MigrationError(String),
    #[display(fmt = "blocking task was canceled")]
    BlockingError,
}

impl From<diesel::result::Error> for StorageError {
    fn from(e: diesel::result::Error) -> StorageError {
        StorageError::DieselError(e)
    }
}

impl From<r2d2::Error> for StorageError {
    fn from(e: r2d2::Error) -> StorageError {
        StorageError::R2D2Error(e)
    }
}

impl From<actix_web::error::BlockingError> for StorageError {
    fn from(_: actix_web::error::BlockingError) -> StorageError {
        StorageError::BlockingError
    }
}

impl std::error::Error for StorageError {}

#[derive(Debug, Display)]
pub enum ServerError {
    #[display(fmt = "{}", _0)]
    Storage(StorageError),
    #[display(fmt = "environment variable {} is missing or invalid", _0)]
    EnvironmentError(&'static str),
    #[display(fmt = "invalid request: {}", _0)]
    UserError(&'static str),
    #[display(fmt = "note is too large")]
    PayloadTooLarge,
}

impl From<StorageError> for ServerError {
    fn from(e: StorageError) -> ServerError {
        ServerError::Storage(e)
    }
}

impl std::error::Error for ServerError {}

impl actix_web::error::ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServerError::UserError(_) => StatusCode::BAD_REQUEST,
            ServerError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ServerError::UserError(msg) => HttpResponse::BadRequest()
                .content_type("text/html; charset=utf-8")
                .body(format!("<span class='error'>{}</span>", msg)),
            ServerError::PayloadTooLarge => HttpResponse::PayloadTooLarge()
                .content_type("text/html; charset=utf-8")
                .body("<span class='error'>Note is too large!</span>"),
            _ => {
                log::error!("{self}");
                HttpResponse::InternalServerError()
                    .content_type("text/html; charset=utf-8")
                    .body("<span class='error'>Unexpected error!</span>")
            }
        }
    }
}
