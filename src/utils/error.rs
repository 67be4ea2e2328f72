use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use std::fmt;

/// Field-level validation failure, shaped like the front end expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub msg: String,
    pub path: String,
    pub location: &'static str,
}

impl FieldError {
    pub fn body(path: &str, value: Option<&str>, msg: &str) -> Self {
        Self {
            kind: "field",
            value: value.map(str::to_string),
            msg: msg.to_string(),
            path: path.to_string(),
            location: "body",
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    Validation(Vec<FieldError>),
    InvalidPayload,
    UserExists,
    InvalidCredentials,
    Unauthorized(&'static str),
    DatabaseError(String),
    Internal(String),
}

impl AppError {
    pub const NO_TOKEN: &'static str = "No token provided";
    pub const BLACKLISTED: &'static str = "Token is blacklisted. Please login again.";
    pub const INVALID_TOKEN: &'static str = "Invalid or expired token";
    pub const USER_NOT_FOUND: &'static str = "User not found";
    pub const UNAUTHORIZED: &'static str = "Unauthorized";

    /// Message safe to send to the client.
    fn public_message(&self) -> &str {
        match self {
            AppError::Validation(_) => "Validation failed",
            AppError::InvalidPayload => "Invalid JSON payload",
            AppError::UserExists => "User already exists",
            AppError::InvalidCredentials => "Invalid email or password",
            AppError::Unauthorized(reason) => reason,
            AppError::DatabaseError(_) | AppError::Internal(_) => "Server error",
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(errors) => write!(f, "Validation failed: {} field(s)", errors.len()),
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            other => f.write_str(other.public_message()),
        }
    }
}

impl std::error::Error for AppError {}

impl From<mongodb::error::Error> for AppError {
    fn from(e: mongodb::error::Error) -> Self {
        AppError::DatabaseError(e.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(e: bcrypt::BcryptError) -> Self {
        AppError::Internal(format!("bcrypt: {}", e))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidPayload | AppError::UserExists => {
                StatusCode::BAD_REQUEST
            }
            AppError::InvalidCredentials | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::DatabaseError(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        match self {
            AppError::Validation(errors) => builder.json(serde_json::json!({ "errors": errors })),
            AppError::DatabaseError(_) | AppError::Internal(_) => {
                log::error!("❌ {}", self);
                builder.json(serde_json::json!({ "error": self.public_message() }))
            }
            _ => builder.json(serde_json::json!({ "error": self.public_message() })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn server_errors_hide_details() {
        let err = AppError::DatabaseError("connection refused on 10.0.0.3".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        assert_eq!(body, r#"{"error":"Server error"}"#);
    }

    #[actix_web::test]
    async fn validation_errors_list_fields() {
        let err = AppError::Validation(vec![FieldError::body("name", Some(""), "Name is required")]);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["errors"][0]["path"], "name");
        assert_eq!(json["errors"][0]["location"], "body");
        assert_eq!(json["errors"][0]["type"], "field");
    }

    #[test]
    fn unauthorized_reasons_pass_through() {
        let err = AppError::Unauthorized(AppError::BLACKLISTED);
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), "Token is blacklisted. Please login again.");
    }
}
