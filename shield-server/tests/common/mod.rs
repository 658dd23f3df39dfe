//! Shared helpers for the integration tests
#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use http::{Request, Response, StatusCode, header};
use http_body_util::BodyExt;
use shield_server::core::config::{CloudinaryConfig, PhotoStorageKind};
use shield_server::db::DbService;
use shield_server::{Config, ServerState, build_app, storage};
use tempfile::TempDir;
use tower::ServiceExt;

pub const ADMIN_PASSWORD: &str = "admin";
pub const BOUNDARY: &str = "shield-test-boundary";

/// Minimal PNG signature; enough for content sniffing
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];
pub const GIF_BYTES: &[u8] = b"GIF89a\x01\x00\x01\x00\x80\x00\x00";

pub struct TestApp {
    pub app: Router,
    pub state: ServerState,
    pub dir: TempDir,
}

/// App with local photo storage under a temp dir and an in-memory database
pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

pub async fn spawn_app_with(customize: impl FnOnce(&mut Config)) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::with_root(dir.path());
    customize(&mut config);

    let db = DbService::in_memory().await.unwrap();
    let storage = storage::from_config(&config).unwrap();
    let state = ServerState::new(config, db.pool, storage).unwrap();
    let app = build_app(&state).with_state(state.clone());

    TestApp { app, state, dir }
}

/// Point hosted storage at `api_base`
pub fn hosted(config: &mut Config, api_base: &str, api_key: &str) {
    config.photo_storage = PhotoStorageKind::Hosted;
    config.cloudinary = Some(CloudinaryConfig {
        cloud_name: "demo".into(),
        api_key: api_key.into(),
        api_secret: "test-secret".into(),
        api_base: api_base.into(),
    });
}

pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"{filename}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8_lossy(&bytes).into_owned()
}

pub fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

/// `name=value` part of the first Set-Cookie header
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.to_string())
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_empty(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("POST").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_login(&self, password: &str, ip: &str) -> Response<Body> {
        let request = Request::builder()
            .method("POST")
            .uri("/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header("x-forwarded-for", ip)
            .body(Body::from(format!("password={password}")))
            .unwrap();
        self.send(request).await
    }

    /// Log in and return the session cookie
    pub async fn login(&self) -> String {
        let response = self.post_login(ADMIN_PASSWORD, "192.0.2.1").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        session_cookie(&response).expect("login sets a session cookie")
    }

    pub async fn post_create(
        &self,
        cookie: Option<&str>,
        fields: &[(&str, &str)],
        file: Option<(&str, &[u8])>,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/admin")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(multipart_body(fields, file))).unwrap())
            .await
    }

    /// Body of the admin page (consumes pending flashes)
    pub async fn admin_html(&self, cookie: &str, query: &str) -> String {
        let response = self.get(&format!("/admin{query}"), Some(cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
        body_string(response).await
    }

    pub async fn count(&self) -> i64 {
        shield_server::db::repository::shield::count(&self.state.pool)
            .await
            .unwrap()
    }
}
