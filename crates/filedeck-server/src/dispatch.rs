//! The single `/` endpoint and its actions.
//!
//! Every request passes the same gates in order: the login check, the XSRF
//! check (POST only), then path resolution. Only then is the `do` action
//! looked at.

use crate::auth::AuthGate;
use crate::auth::SESSION_COOKIE;
use crate::auth::XSRF_COOKIE;
use crate::auth::xsrf_matches;
use crate::error::ApiError;
use crate::output::ListOutput;
use crate::output::Success;
use crate::ui;
use axum::Form;
use axum::Json;
use axum::body::Body;
use axum::body::Bytes;
use axum::extract::FromRequest;
use axum::extract::Multipart;
use axum::extract::Query;
use axum::extract::Request;
use axum::extract::State;
use axum::extract::multipart::MultipartError;
use axum::http::HeaderMap;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::http::header;
use axum::response::IntoResponse;
use axum::response::Redirect;
use axum::response::Response;
use axum_extra::extract::CookieJar;
use filedeck_core::ConfinedPath;
use filedeck_core::FileDeck;
use filedeck_core::names::base_name;
use futures_util::StreamExt;
use serde::Deserialize;
use std::fs::File;
use std::io;
use std::io::Read;
use std::io::Seek;
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use tracing::info;
use tracing::warn;

/// Shared state handed to every request.
#[derive(Debug)]
pub struct AppState {
    pub deck: FileDeck,
    pub auth: AuthGate,
}

pub type SharedState = Arc<AppState>;

/// Request parameters, accepted from the query string or the form body.
#[derive(Debug, Default, Deserialize)]
pub struct Params {
    #[serde(rename = "do")]
    pub action: Option<String>,
    pub file: Option<String>,
    pub xsrf: Option<String>,
    pub name: Option<String>,
    /// Login password.
    pub p: Option<String>,
}

impl Params {
    /// Fills fields missing from `self` with those from `fallback`.
    fn or(self, fallback: Self) -> Self {
        Self {
            action: self.action.or(fallback.action),
            file: self.file.or(fallback.file),
            xsrf: self.xsrf.or(fallback.xsrf),
            name: self.name.or(fallback.name),
            p: self.p.or(fallback.p),
        }
    }

    fn set(&mut self, field: &str, value: String) {
        match field {
            "do" => self.action = Some(value),
            "file" => self.file = Some(value),
            "xsrf" => self.xsrf = Some(value),
            "name" => self.name = Some(value),
            "p" => self.p = Some(value),
            _ => {}
        }
    }

    fn path(&self) -> &str {
        self.file.as_deref().unwrap_or(".")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    List,
    Delete,
    Mkdir,
    Upload,
    Download,
    Zip,
}

impl Action {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "list" => Some(Self::List),
            "delete" => Some(Self::Delete),
            "mkdir" => Some(Self::Mkdir),
            "upload" => Some(Self::Upload),
            "download" => Some(Self::Download),
            "zip" => Some(Self::Zip),
            _ => None,
        }
    }

    const fn is_mutating(self) -> bool {
        matches!(self, Self::Delete | Self::Mkdir | Self::Upload)
    }
}

/// The `file_data` part of a multipart upload.
#[derive(Debug)]
pub struct Upload {
    pub file_name: String,
    pub data: Bytes,
}

pub async fn handle_get(
    State(state): State<SharedState>,
    jar: CookieJar,
    Query(params): Query<Params>,
) -> Result<Response, ApiError> {
    let authorized = state.auth.is_authorized(session_token(&jar)).await;

    let Some(raw_action) = params.action.as_deref() else {
        return Ok(if authorized {
            ui::index_page()
        } else {
            ui::login_page(StatusCode::OK)
        });
    };
    if !authorized {
        return Err(ApiError::Unauthorized);
    }

    let action = Action::parse(raw_action);
    let target = resolve(&state, params.path(), action).await?;
    match action {
        Some(action) if !action.is_mutating() => run(&state, action, target, params, None).await,
        _ => Err(ApiError::InvalidRequest),
    }
}

pub async fn handle_post(
    State(state): State<SharedState>,
    jar: CookieJar,
    Query(query): Query<Params>,
    request: Request,
) -> Result<Response, ApiError> {
    let authorized = state.auth.is_authorized(session_token(&jar)).await;
    // Unauthenticated clients may only submit the login form; never buffer
    // their uploads.
    if !authorized && is_multipart(&request) {
        return Err(ApiError::Unauthorized);
    }

    let (body, upload) = read_post_body(request).await?;
    let params = body.or(query);

    if params.action.is_none()
        && let Some(candidate) = params.p.as_deref()
    {
        return Ok(login(&state, jar, candidate).await);
    }
    if !authorized {
        return Err(ApiError::Unauthorized);
    }

    let cookie_token = jar.get(XSRF_COOKIE).map(|c| c.value());
    if !xsrf_matches(cookie_token, params.xsrf.as_deref()) {
        warn!(action = ?params.action, "rejected POST with bad XSRF token");
        return Err(ApiError::XsrfFailure);
    }

    let action = params.action.as_deref().and_then(Action::parse);
    let target = resolve(&state, params.path(), action).await?;
    let action = action.ok_or(ApiError::InvalidRequest)?;
    run(&state, action, target, params, upload).await
}

async fn run(
    state: &SharedState,
    action: Action,
    target: ConfinedPath,
    params: Params,
    upload: Option<Upload>,
) -> Result<Response, ApiError> {
    match action {
        Action::List => list(state, target).await,
        Action::Delete => delete(state, target).await,
        Action::Mkdir => mkdir(state, target, params.name.unwrap_or_default()).await,
        Action::Upload => upload_file(state, target, upload).await,
        Action::Download => download(state, target).await,
        Action::Zip => zip(state, target).await,
    }
}

async fn login(state: &SharedState, jar: CookieJar, candidate: &str) -> Response {
    if !state.auth.is_enabled() {
        return Redirect::to("/").into_response();
    }

    match state.auth.login(candidate).await {
        Some(token) => {
            info!("login succeeded");
            (jar.add(AuthGate::session_cookie(token)), Redirect::to("/")).into_response()
        }
        None => {
            warn!("login failed");
            ui::login_page(StatusCode::UNAUTHORIZED)
        }
    }
}

async fn list(state: &SharedState, dir: ConfinedPath) -> Result<Response, ApiError> {
    let listing = blocking(state, move |deck| deck.list(&dir)).await?;
    Ok(Json(ListOutput::from(listing)).into_response())
}

async fn delete(state: &SharedState, target: ConfinedPath) -> Result<Response, ApiError> {
    let shown = target.display_relative();
    match blocking(state, move |deck| deck.remove(&target)).await {
        Ok(report) => {
            info!(
                path = %shown,
                files = report.files_removed,
                directories = report.directories_removed,
                "deleted"
            );
            Ok(Json(Success::OK).into_response())
        }
        Err(err) => {
            warn!(path = %shown, error = err.message(), "delete failed");
            Err(err)
        }
    }
}

async fn mkdir(
    state: &SharedState,
    parent: ConfinedPath,
    name: String,
) -> Result<Response, ApiError> {
    let created = blocking(state, move |deck| deck.create_directory(&parent, &name)).await?;
    info!(path = %created.display_relative(), "created directory");
    Ok(Json(Success::OK).into_response())
}

async fn upload_file(
    state: &SharedState,
    dir: ConfinedPath,
    upload: Option<Upload>,
) -> Result<Response, ApiError> {
    let upload = upload.ok_or(ApiError::NoFileUploaded)?;
    if base_name(&upload.file_name).is_err() {
        return Err(ApiError::NoFileUploaded);
    }

    let size = upload.data.len();
    let stored = blocking(state, move |deck| {
        deck.store_file(&dir, &upload.file_name, &upload.data[..])
    })
    .await?;
    info!(path = %stored.display_relative(), size, "stored upload");
    Ok(Json(Success::OK).into_response())
}

async fn download(state: &SharedState, target: ConfinedPath) -> Result<Response, ApiError> {
    let (download, sniffed) = blocking(state, move |deck| {
        let mut download = deck.open_download(&target)?;
        let sniffed = sniff_content_type(&mut download.file)?;
        Ok((download, sniffed))
    })
    .await?;
    let content_type = sniffed.map_or_else(
        || {
            mime_guess::from_path(&download.name)
                .first_or_octet_stream()
                .essence_str()
                .to_owned()
        },
        str::to_owned,
    );
    let headers = attachment_headers(&content_type, &download.name, download.size)?;

    let stream = ReaderStream::new(tokio::fs::File::from_std(download.file));
    Ok((headers, Body::from_stream(stream)).into_response())
}

/// Leading bytes inspected for a content signature.
const SNIFF_LEN: u64 = 8192;

/// Detects the content type from the file's leading bytes and rewinds it.
///
/// Returns `None` when no signature matches; the caller falls back to the
/// file extension.
fn sniff_content_type(file: &mut File) -> io::Result<Option<&'static str>> {
    let mut head = Vec::new();
    file.by_ref().take(SNIFF_LEN).read_to_end(&mut head)?;
    file.rewind()?;
    Ok(infer::get(&head).map(|kind| kind.mime_type()))
}

async fn zip(state: &SharedState, target: ConfinedPath) -> Result<Response, ApiError> {
    let shown = target.display_relative();
    let job = blocking(state, move |deck| deck.archive(&target)).await?;
    info!(
        path = %shown,
        files = job.report().files_added,
        skipped = job.report().files_skipped,
        bytes = job.len(),
        "created zip"
    );

    let headers = attachment_headers("application/zip", job.download_name(), job.len())?;
    let (file, guard) = job.into_parts();
    // The temporary zip is deleted once the body stream is dropped, whether
    // it finished or the client went away.
    let stream = ReaderStream::new(tokio::fs::File::from_std(file)).map(move |chunk| {
        let _ = &guard;
        chunk
    });
    Ok((headers, Body::from_stream(stream)).into_response())
}

/// Resolves the request path. A delete targets the named node itself, so a
/// symlink is unlinked rather than followed.
async fn resolve(
    state: &SharedState,
    raw: &str,
    action: Option<Action>,
) -> Result<ConfinedPath, ApiError> {
    let raw = raw.to_owned();
    if action == Some(Action::Delete) {
        blocking(state, move |deck| deck.resolve_node(&raw)).await
    } else {
        blocking(state, move |deck| deck.resolve(&raw)).await
    }
}

/// Runs a core operation on the blocking pool.
async fn blocking<T, F>(state: &SharedState, op: F) -> Result<T, ApiError>
where
    F: FnOnce(&FileDeck) -> filedeck_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || op(&state.deck))
        .await
        .map_err(|e| ApiError::Internal(format!("worker task failed: {e}")))?
        .map_err(ApiError::from)
}

fn session_token(jar: &CookieJar) -> Option<&str> {
    jar.get(SESSION_COOKIE).map(|c| c.value())
}

fn is_multipart(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
}

async fn read_post_body(request: Request) -> Result<(Params, Option<Upload>), ApiError> {
    if !is_multipart(&request) {
        let Form(params) = Form::<Params>::from_request(request, &())
            .await
            .map_err(|rejection| body_rejected(rejection.status()))?;
        return Ok((params, None));
    }

    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|rejection| body_rejected(rejection.status()))?;

    let mut params = Params::default();
    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_failed)? {
        let Some(name) = field.name().map(ToOwned::to_owned) else {
            continue;
        };
        if name == "file_data" {
            let file_name = field.file_name().unwrap_or_default().to_owned();
            let data = field.bytes().await.map_err(multipart_failed)?;
            upload = Some(Upload { file_name, data });
        } else {
            let value = field.text().await.map_err(multipart_failed)?;
            params.set(&name, value);
        }
    }
    Ok((params, upload))
}

fn multipart_failed(err: MultipartError) -> ApiError {
    body_rejected(err.status())
}

fn body_rejected(status: StatusCode) -> ApiError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::InvalidRequest
    }
}

fn attachment_headers(
    content_type: &str,
    file_name: &str,
    len: u64,
) -> Result<HeaderMap, ApiError> {
    let invalid = |_| ApiError::Internal("cannot build response headers".into());

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(content_type).map_err(invalid)?,
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
    let disposition = format!("attachment; filename=\"{}\"", header_safe(file_name));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_bytes(disposition.as_bytes()).map_err(invalid)?,
    );
    Ok(headers)
}

/// Replaces characters that would break out of a quoted header parameter.
fn header_safe(name: &str) -> String {
    name.chars()
        .map(|c| if c == '"' || c == '\\' || c.is_control() { '_' } else { c })
        .collect()
}
