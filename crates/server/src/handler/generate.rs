use crate::AppState;
use crate::relay::RelayResult;
use axum::extract::State;
use axum::http::Method;
use bytes::Bytes;

pub async fn generate(State(state): State<AppState>, method: Method, body: Bytes) -> RelayResult {
    state.relay.handle(&method, &body).await
}
