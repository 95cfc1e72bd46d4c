use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

const REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Propagates the caller's `x-request-id` or assigns a fresh one.
///
/// The id lands in the request extensions for the trace span and is echoed
/// back on the response.
pub async fn request_id(mut req: Request<Body>, next: Next) -> Response {
    let id = match req.headers().get(&REQUEST_ID) {
        Some(value) => value.clone(),
        // a v4 uuid is always a valid header value
        None => HeaderValue::from_str(&Uuid::new_v4().to_string()).unwrap(),
    };

    req.extensions_mut().insert(id.clone());

    let mut res = next.run(req).await;
    res.headers_mut().insert(REQUEST_ID, id);
    res
}
