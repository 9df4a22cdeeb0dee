use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::collections::BTreeMap;
use thiserror::Error;

// Три вида ошибок API: локальная валидация формы, распознанные нарушения
// ограничений БД и все остальные сбои (generic, без повторов).
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed")]
    Validation(BTreeMap<&'static str, String>),

    #[error("duplicate value for {field}")]
    Duplicate { field: &'static str, message: String },

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    /// Ошибка валидации одного поля.
    pub fn field(field: &'static str, message: &str) -> Self {
        ApiError::Validation(BTreeMap::from([(field, message.to_string())]))
    }

    // Структурное распознавание нарушений уникальности по имени ограничения,
    // не по тексту сообщения.
    pub fn from_db(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db) = e {
            if db.is_unique_violation() {
                match db.constraint() {
                    Some("students_email_key") => {
                        return ApiError::Duplicate {
                            field: "email",
                            message: "This email is already registered".to_string(),
                        };
                    }
                    Some("students_student_id_key") => {
                        return ApiError::Duplicate {
                            field: "student_id",
                            message: "This student ID is already registered".to_string(),
                        };
                    }
                    _ => {}
                }
            }
        }
        ApiError::Database(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "errors": errors })),
            )
                .into_response(),
            ApiError::Duplicate { field, message } => (
                StatusCode::CONFLICT,
                Json(json!({ "errors": BTreeMap::from([(field, message)]) })),
            )
                .into_response(),
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Conflict(message) => {
                (StatusCode::CONFLICT, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Database(e) => {
                tracing::error!("database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Внутренняя ошибка сервера" })),
                )
                    .into_response()
            }
        }
    }
}
