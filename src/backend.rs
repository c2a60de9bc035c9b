use crate::gallery::{Catalog, CatalogError, ImageRef, ProjectId};
use axum::{
    extract::{Path as RoutePath, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::{
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
    sync::Arc,
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};
use tower_http::services::{ServeDir, ServeFile};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_STATIC_DIR: &str = "dist";
const DEFAULT_CATALOG_MAX_AGE_SECONDS: u64 = 300;
const MAX_CATALOG_MAX_AGE_SECONDS: u64 = 86_400;
const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;

const REQUEST_ID_HEADER: &str = "x-request-id";

static REQUEST_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Declaration order is severity order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
enum LogLevel {
    Debug,
    Info,
}

impl LogLevel {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
        }
    }
}

#[derive(Serialize)]
struct LogLine<'a> {
    ts: u64,
    level: &'static str,
    event: &'a str,
    #[serde(flatten)]
    fields: serde_json::Map<String, serde_json::Value>,
}

impl LogLine<'_> {
    fn render(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }
}

#[derive(Clone, Debug, PartialEq)]
struct ServerConfig {
    port: u16,
    static_dir: PathBuf,
    catalog_max_age_seconds: u64,
    log_level: LogLevel,
}

impl ServerConfig {
    fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Blank, malformed or out-of-range settings fall back to their defaults.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let setting = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            port: setting("PORT")
                .and_then(|value| value.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            static_dir: setting("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR)),
            catalog_max_age_seconds: setting("GALLERY_CACHE_MAX_AGE_SECONDS")
                .and_then(|value| value.parse::<u64>().ok())
                .filter(|seconds| *seconds <= MAX_CATALOG_MAX_AGE_SECONDS)
                .unwrap_or(DEFAULT_CATALOG_MAX_AGE_SECONDS),
            log_level: setting("LOG_LEVEL")
                .and_then(|value| LogLevel::parse(&value))
                .unwrap_or(DEFAULT_LOG_LEVEL),
        }
    }

    fn catalog_cache_control(&self) -> HeaderValue {
        cache_control(&format!("public, max-age={}", self.catalog_max_age_seconds))
    }

    fn log(&self, level: LogLevel, event: &str, fields: serde_json::Value) {
        if level < self.log_level {
            return;
        }

        let fields = match fields {
            serde_json::Value::Object(fields) => fields,
            _ => serde_json::Map::new(),
        };
        let line = LogLine {
            ts: unix_time().as_secs(),
            level: level.as_str(),
            event,
            fields,
        };

        if let Some(line) = line.render() {
            println!("{line}");
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    catalog: Arc<Catalog>,
    config: ServerConfig,
}

impl AppState {
    /// Serves the same compiled-in catalog the browser page renders.
    fn bundled(config: ServerConfig) -> Result<Self, CatalogError> {
        Ok(Self {
            catalog: Arc::new(Catalog::bundled()?),
            config,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectSummary {
    id: ProjectId,
    images: Vec<ImageRef>,
    count: usize,
}

impl ProjectSummary {
    fn new(id: &ProjectId, images: &[ImageRef]) -> Self {
        Self {
            id: id.clone(),
            images: images.to_vec(),
            count: images.len(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GalleryPayload {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    projects: Option<Vec<ProjectSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    project: Option<ProjectSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl GalleryPayload {
    fn catalog(catalog: &Catalog) -> Self {
        Self {
            ok: true,
            projects: Some(
                catalog
                    .projects()
                    .map(|(id, images)| ProjectSummary::new(id, images))
                    .collect(),
            ),
            project: None,
            error: None,
        }
    }

    fn project(summary: ProjectSummary) -> Self {
        Self {
            ok: true,
            projects: None,
            project: Some(summary),
            error: None,
        }
    }

    fn error(message: &str) -> Self {
        Self {
            ok: false,
            projects: None,
            project: None,
            error: Some(message.to_string()),
        }
    }
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::bundled(ServerConfig::from_env())?;
    let config = &state.config;

    config.log(
        LogLevel::Info,
        "gallery_catalog_loaded",
        serde_json::json!({
            "source": "bundled",
            "projects": state.catalog.project_count(),
        }),
    );

    for (project, image) in missing_images(&state.catalog, &config.static_dir) {
        config.log(
            LogLevel::Info,
            "gallery_image_missing",
            serde_json::json!({
                "project": project.as_str(),
                "image": image.as_str(),
                "static_dir": config.static_dir.display().to_string(),
            }),
        );
    }

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    config.log(
        LogLevel::Info,
        "server_start",
        serde_json::json!({ "address": format!("http://127.0.0.1:{}", config.port) }),
    );
    axum::serve(listener, router(state.clone())).await?;
    Ok(())
}

fn router(state: AppState) -> Router {
    let index_path = state.config.static_dir.join("index.html");
    let static_service =
        ServeDir::new(&state.config.static_dir).not_found_service(ServeFile::new(index_path));

    Router::new()
        .route("/api/gallery", get(get_gallery))
        .route("/api/gallery/{project}", get(get_project))
        .fallback_service(static_service)
        .with_state(state)
}

async fn get_gallery(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = request_id(&headers);

    state.config.log(
        LogLevel::Debug,
        "gallery_request_start",
        serde_json::json!({
            "request_id": request_id.as_str(),
            "method": method.as_str(),
            "path": uri.path(),
        }),
    );

    let payload = GalleryPayload::catalog(&state.catalog);

    state.config.log(
        LogLevel::Info,
        "gallery_request_complete",
        serde_json::json!({
            "request_id": request_id.as_str(),
            "status": StatusCode::OK.as_u16(),
            "projects": state.catalog.project_count(),
            "duration_ms": started.elapsed().as_millis(),
        }),
    );

    json_response(
        StatusCode::OK,
        payload,
        state.config.catalog_cache_control(),
        &request_id,
    )
}

async fn get_project(
    State(state): State<AppState>,
    RoutePath(project): RoutePath<String>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let started = Instant::now();
    let request_id = request_id(&headers);
    let project = ProjectId::new(project);

    let Some(images) = state.catalog.images(&project) else {
        state.config.log(
            LogLevel::Info,
            "gallery_request_failed",
            serde_json::json!({
                "request_id": request_id.as_str(),
                "error_class": "unknown_project",
                "project": project.as_str(),
                "duration_ms": started.elapsed().as_millis(),
            }),
        );
        return json_response(
            StatusCode::NOT_FOUND,
            GalleryPayload::error("unknown project"),
            cache_control("no-store"),
            &request_id,
        );
    };

    state.config.log(
        LogLevel::Info,
        "gallery_request_complete",
        serde_json::json!({
            "request_id": request_id.as_str(),
            "status": StatusCode::OK.as_u16(),
            "project": project.as_str(),
            "duration_ms": started.elapsed().as_millis(),
        }),
    );

    json_response(
        StatusCode::OK,
        GalleryPayload::project(ProjectSummary::new(&project, images)),
        state.config.catalog_cache_control(),
        &request_id,
    )
}

/// Image references with no file under `static_dir`. Absolute URLs are skipped.
fn missing_images<'a>(catalog: &'a Catalog, static_dir: &Path) -> Vec<(&'a ProjectId, &'a ImageRef)> {
    catalog
        .projects()
        .flat_map(|(project, images)| images.iter().map(move |image| (project, image)))
        .filter(|(_, image)| !is_remote_reference(image.as_str()))
        .filter(|(_, image)| !static_dir.join(image.as_str().trim_start_matches('/')).is_file())
        .collect()
}

fn is_remote_reference(value: &str) -> bool {
    ["http://", "https://", "//"]
        .iter()
        .any(|scheme| value.starts_with(scheme))
}

fn json_response(
    status: StatusCode,
    payload: GalleryPayload,
    cache_control: HeaderValue,
    request_id: &str,
) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(header::CACHE_CONTROL, cache_control);
    headers.insert(header::VARY, HeaderValue::from_static("Accept-Encoding"));
    if let Ok(request_id) = HeaderValue::from_str(request_id) {
        headers.insert(REQUEST_ID_HEADER, request_id);
    }
    (status, headers, Json(payload)).into_response()
}

fn cache_control(value: &str) -> HeaderValue {
    HeaderValue::from_str(value).unwrap_or_else(|_| HeaderValue::from_static("no-store"))
}

fn unix_time() -> Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}

/// Echoes a non-blank `x-request-id`, otherwise mints `req-<millis>-<counter>`.
fn request_id(headers: &HeaderMap) -> String {
    let echoed = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|raw| raw.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    match echoed {
        Some(value) => value.to_string(),
        None => {
            let counter = REQUEST_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
            format!("req-{}-{counter}", unix_time().as_millis())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use std::collections::HashMap;

    fn test_config() -> ServerConfig {
        ServerConfig {
            port: DEFAULT_PORT,
            static_dir: PathBuf::from("/nonexistent-static-dir"),
            catalog_max_age_seconds: 120,
            log_level: LogLevel::Info,
        }
    }

    fn test_state() -> AppState {
        let catalog = Catalog::from_entries([
            ("fumart", vec!["image/fumart1.png", "image/fumart2.png"]),
            ("poster", vec!["https://cdn.example.com/poster1.png"]),
        ])
        .expect("valid catalog");

        AppState {
            catalog: Arc::new(catalog),
            config: test_config(),
        }
    }

    fn config_from(pairs: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("body is readable");
        serde_json::from_slice(&bytes).expect("body is JSON")
    }

    #[tokio::test]
    async fn gallery_endpoint_lists_every_project() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("req-test-1"));

        let response = get_gallery(
            State(test_state()),
            Method::GET,
            Uri::from_static("/api/gallery"),
            headers,
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(REQUEST_ID_HEADER),
            Some(&HeaderValue::from_static("req-test-1"))
        );
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL),
            Some(&HeaderValue::from_static("public, max-age=120"))
        );

        let body = body_json(response).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["projects"][0]["id"], "fumart");
        assert_eq!(body["projects"][0]["count"], 2);
        assert_eq!(body["projects"][0]["images"][1], "image/fumart2.png");
        assert_eq!(body["projects"][1]["id"], "poster");
    }

    #[tokio::test]
    async fn project_endpoint_returns_one_project() {
        let response = get_project(
            State(test_state()),
            RoutePath("fumart".to_string()),
            HeaderMap::new(),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));

        let body = body_json(response).await;
        assert_eq!(body["project"]["count"], 2);
        assert!(body.get("projects").is_none());
    }

    #[tokio::test]
    async fn unknown_project_is_not_found() {
        let response = get_project(
            State(test_state()),
            RoutePath("missing".to_string()),
            HeaderMap::new(),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL),
            Some(&HeaderValue::from_static("no-store"))
        );

        let body = body_json(response).await;
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "unknown project");
    }

    #[test]
    fn server_serves_the_catalog_the_page_renders() {
        let state = AppState::bundled(test_config()).expect("bundled catalog is valid");

        assert_eq!(
            *state.catalog,
            Catalog::bundled().expect("bundled catalog is valid")
        );
        assert!(state.catalog.contains(&ProjectId::from("fumart")));
    }

    #[test]
    fn missing_images_skips_remote_references() {
        let state = test_state();

        let missing: Vec<&str> = missing_images(&state.catalog, &state.config.static_dir)
            .into_iter()
            .map(|(_, image)| image.as_str())
            .collect();

        assert_eq!(missing, ["image/fumart1.png", "image/fumart2.png"]);
    }

    #[test]
    fn blank_request_id_is_replaced() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("   "));

        assert!(request_id(&headers).starts_with("req-"));
    }

    #[test]
    fn unset_settings_use_defaults() {
        let config = config_from(&[]);

        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.static_dir, PathBuf::from(DEFAULT_STATIC_DIR));
        assert_eq!(config.catalog_max_age_seconds, DEFAULT_CATALOG_MAX_AGE_SECONDS);
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn invalid_settings_fall_back_to_defaults() {
        let config = config_from(&[
            ("PORT", "not-a-port"),
            ("STATIC_DIR", "   "),
            ("GALLERY_CACHE_MAX_AGE_SECONDS", "999999"),
            ("LOG_LEVEL", "verbose"),
        ]);

        assert_eq!(config, config_from(&[]));
    }

    #[test]
    fn valid_settings_are_trimmed_and_applied() {
        let config = config_from(&[
            ("PORT", " 3000 "),
            ("STATIC_DIR", "public"),
            ("GALLERY_CACHE_MAX_AGE_SECONDS", " 60 "),
            ("LOG_LEVEL", "DEBUG"),
        ]);

        assert_eq!(config.port, 3000);
        assert_eq!(config.static_dir, PathBuf::from("public"));
        assert_eq!(config.catalog_max_age_seconds, 60);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Info);
    }

    #[test]
    fn log_line_flattens_fields_next_to_the_header() {
        let serde_json::Value::Object(fields) = serde_json::json!({ "project": "fumart" }) else {
            panic!("object literal");
        };
        let line = LogLine {
            ts: 7,
            level: LogLevel::Info.as_str(),
            event: "gallery_image_missing",
            fields,
        };

        let parsed: serde_json::Value =
            serde_json::from_str(&line.render().expect("line serializes")).expect("line is JSON");
        assert_eq!(
            parsed,
            serde_json::json!({
                "ts": 7,
                "level": "info",
                "event": "gallery_image_missing",
                "project": "fumart",
            })
        );
    }
}
