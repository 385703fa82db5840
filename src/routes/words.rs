use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::response::action_response;
use crate::services::due::is_due;
use crate::services::trainer::{local_today, Action};
use crate::state::AppState;
use crate::store::VocabEntry;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_words).post(add_word))
        .route("/due", get(due_words))
}

#[derive(Serialize)]
struct SuccessResponse<T> {
    success: bool,
    data: T,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WordResponse {
    word: String,
    level: i32,
    last_reviewed: String,
    due: bool,
}

impl WordResponse {
    fn from_entry(entry: &VocabEntry, due: bool) -> Self {
        Self {
            word: entry.word.clone(),
            level: entry.level,
            last_reviewed: entry.last_reviewed.clone(),
            due,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AddWordRequest {
    word: String,
}

async fn list_words(State(state): State<AppState>) -> Response {
    let today = local_today();
    let trainer = state.trainer();
    let trainer = trainer.lock().await;

    let data: Vec<WordResponse> = trainer
        .store()
        .entries()
        .iter()
        .map(|entry| WordResponse::from_entry(entry, is_due(entry, today)))
        .collect();

    Json(SuccessResponse { success: true, data }).into_response()
}

async fn due_words(State(state): State<AppState>) -> Response {
    let trainer = state.trainer();
    let trainer = trainer.lock().await;

    let data: Vec<WordResponse> = trainer
        .due_words(local_today())
        .iter()
        .map(|entry| WordResponse::from_entry(entry, true))
        .collect();

    Json(SuccessResponse { success: true, data }).into_response()
}

async fn add_word(State(state): State<AppState>, Json(payload): Json<AddWordRequest>) -> Response {
    let trainer = state.trainer();
    let mut trainer = trainer.lock().await;

    let outcome = trainer.dispatch(Action::AddWord(payload.word)).await;
    action_response(outcome, trainer.view())
}
