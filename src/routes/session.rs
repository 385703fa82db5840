use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::response::{action_response, AppError};
use crate::services::session::Grade;
use crate::services::trainer::{Action, SessionView};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(current))
        .route("/start", post(start))
        .route("/translate-next", post(translate_next))
        .route("/grade", post(grade))
}

#[derive(Serialize)]
struct SessionResponse {
    success: bool,
    data: SessionView,
}

#[derive(Debug, Deserialize)]
struct GradeRequest {
    outcome: String,
}

async fn current(State(state): State<AppState>) -> Response {
    let trainer = state.trainer();
    let view = trainer.lock().await.view();
    Json(SessionResponse { success: true, data: view }).into_response()
}

async fn start(State(state): State<AppState>) -> Response {
    run(&state, Action::StartSession).await
}

async fn translate_next(State(state): State<AppState>) -> Response {
    run(&state, Action::RequestNextTranslation).await
}

async fn grade(State(state): State<AppState>, Json(payload): Json<GradeRequest>) -> Response {
    let grade = match payload.outcome.parse::<Grade>() {
        Ok(grade) => grade,
        Err(message) => return AppError::validation(message).into_response(),
    };
    run(&state, Action::Grade(grade)).await
}

async fn run(state: &AppState, action: Action) -> Response {
    let trainer = state.trainer();
    let mut trainer = trainer.lock().await;

    let outcome = trainer.dispatch(action).await;
    action_response(outcome, trainer.view())
}
