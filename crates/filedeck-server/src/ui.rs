//! Embedded HTML pages.

use axum::http::StatusCode;
use axum::response::Html;
use axum::response::IntoResponse;
use axum::response::Response;

const INDEX_HTML: &str = include_str!("assets/index.html");
const LOGIN_HTML: &str = include_str!("assets/login.html");

pub fn index_page() -> Response {
    Html(INDEX_HTML).into_response()
}

pub fn login_page(status: StatusCode) -> Response {
    (status, Html(LOGIN_HTML)).into_response()
}
