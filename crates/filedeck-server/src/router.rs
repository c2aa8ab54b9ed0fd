//! Router assembly and response middleware.

use crate::auth::XSRF_COOKIE;
use crate::auth::xsrf_cookie;
use crate::dispatch::SharedState;
use crate::dispatch::handle_get;
use crate::dispatch::handle_post;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::extract::Request;
use axum::http::HeaderValue;
use axum::http::header;
use axum::middleware;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum_extra::extract::CookieJar;
use tower_http::trace::TraceLayer;

pub fn build_router(state: SharedState, body_limit: usize) -> Router {
    Router::new()
        .route("/", get(handle_get).post(handle_post))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(issue_xsrf_cookie))
        .layer(middleware::from_fn(add_security_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Hands out an XSRF token to clients that do not have one yet.
async fn issue_xsrf_cookie(jar: CookieJar, request: Request, next: Next) -> Response {
    let missing = jar.get(XSRF_COOKIE).is_none_or(|c| c.value().is_empty());
    let response = next.run(request).await;
    if missing {
        (jar.add(xsrf_cookie()), response).into_response()
    } else {
        response
    }
}

async fn add_security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::X_XSS_PROTECTION,
        HeaderValue::from_static("1; mode=block"),
    );
    response
}
