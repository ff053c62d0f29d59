use axum::{extract::Request, middleware::Next, response::Response};
use genrelay_core::context::RequestContext;
use tracing::Instrument;

/// Logs receipt and completion of each request. Everything logged while the
/// request is handled carries its `request_id`.
pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let ctx = request.extensions().get::<RequestContext>().cloned();
    let request_id = ctx
        .as_ref()
        .map(|c| c.request_id.clone())
        .unwrap_or_default();
    let client_ip = ctx
        .as_ref()
        .and_then(|c| c.client_ip.clone())
        .unwrap_or_else(|| "-".to_string());

    let span = tracing::info_span!("request", request_id = %request_id);

    async move {
        tracing::info!(
            client_ip = %client_ip,
            method = %method,
            path = %path,
            "Request received"
        );

        let response = next.run(request).await;

        let elapsed = ctx.as_ref().map(|c| c.elapsed_ms()).unwrap_or(0);
        tracing::info!(
            status = response.status().as_u16(),
            elapsed_ms = elapsed as u64,
            "Request completed"
        );

        response
    }
    .instrument(span)
    .await
}
