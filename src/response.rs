use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::services::trainer::{ActionOutcome, OutcomeCode, OutcomeLevel, SessionView};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
}

#[derive(Debug, Clone)]
pub struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        json_error(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            success: false,
            error: self.message,
            code: self.code,
        };

        (self.status, Json(body)).into_response()
    }
}

pub fn json_error(
    status: StatusCode,
    code: impl Into<String>,
    message: impl Into<String>,
) -> AppError {
    AppError {
        status,
        code: code.into(),
        message: message.into(),
    }
}

/// Body returned by every training action.
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    pub level: OutcomeLevel,
    pub code: OutcomeCode,
    pub message: String,
    pub session: SessionView,
}

pub fn status_for(code: OutcomeCode) -> StatusCode {
    match code {
        OutcomeCode::WordAdded => StatusCode::CREATED,
        OutcomeCode::NothingDue
        | OutcomeCode::SessionStarted
        | OutcomeCode::TranslationRevealed
        | OutcomeCode::AllTranslated
        | OutcomeCode::Graded => StatusCode::OK,
        OutcomeCode::EmptyWord | OutcomeCode::NoActiveSession => StatusCode::BAD_REQUEST,
        OutcomeCode::DuplicateWord => StatusCode::CONFLICT,
        OutcomeCode::TargetMissing => StatusCode::GONE,
        OutcomeCode::ExternalService => StatusCode::BAD_GATEWAY,
        OutcomeCode::Persistence => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn action_response(outcome: ActionOutcome, session: SessionView) -> Response {
    let status = status_for(outcome.code);
    let body = ActionResponse {
        success: !outcome.is_failure(),
        level: outcome.level,
        code: outcome.code,
        message: outcome.message,
        session,
    };
    (status, Json(body)).into_response()
}
