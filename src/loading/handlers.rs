// HTTP handlers for the loading indicator

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::loading::{
    reducer::{DispatchedAction, LoadingState},
    store::LoadingStore,
};

/// Read the current loading state
/// GET /api/ui/loading
#[utoipa::path(
    get,
    path = "/api/ui/loading",
    responses(
        (status = 200, description = "Current loading state", body = LoadingState)
    ),
    tag = "ui"
)]
pub async fn get_loading_handler(State(store): State<Arc<LoadingStore>>) -> Json<LoadingState> {
    Json(store.current())
}

/// Dispatch an action to the loading reducer
/// POST /api/ui/loading/dispatch
///
/// Unrecognized action types are accepted and leave the state unchanged.
#[utoipa::path(
    post,
    path = "/api/ui/loading/dispatch",
    request_body = DispatchedAction,
    responses(
        (status = 200, description = "State after the action", body = LoadingState)
    ),
    tag = "ui"
)]
pub async fn dispatch_loading_handler(
    State(store): State<Arc<LoadingStore>>,
    Json(action): Json<DispatchedAction>,
) -> Json<LoadingState> {
    Json(store.dispatch(action))
}
