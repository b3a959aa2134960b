mod auth_handlers;
mod contact;
pub mod content;
mod upload;

use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::{Json, Router};
use folio_core::{Education, Experience, Interest, Project, Skill};

use crate::dto::{ApiResponse, HealthResponse};
use crate::middleware::rate_limit;
use crate::state::AppState;

/// Every `/api` route, each behind its rate limit class.
pub fn router(state: &AppState) -> Router<AppState> {
    let login_limit = from_fn_with_state(state.clone(), rate_limit::login);
    let contact_limit = from_fn_with_state(state.clone(), rate_limit::contact);
    let upload_limit = from_fn_with_state(state.clone(), rate_limit::upload);
    let api_limit = from_fn_with_state(state.clone(), rate_limit::api);

    // Multipart framing on top of the file itself.
    let upload_body_limit = state.config.max_upload_bytes() + 64 * 1024;

    let router = Router::new()
        .route("/api/health", get(health))
        .route(
            "/api/auth/login",
            post(auth_handlers::login).route_layer(login_limit),
        )
        .route(
            "/api/auth/verify",
            get(auth_handlers::verify).route_layer(api_limit),
        )
        .route(
            "/api/contact",
            post(contact::submit).route_layer(contact_limit),
        )
        .route(
            "/api/upload",
            post(upload::upload_image)
                .route_layer(upload_limit)
                .layer(DefaultBodyLimit::max(upload_body_limit)),
        );

    let router = content::routes::<Project>(router, state);
    let router = content::routes::<Experience>(router, state);
    let router = content::routes::<Education>(router, state);
    let router = content::routes::<Skill>(router, state);
    content::routes::<Interest>(router, state)
}

async fn health() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use argon2::password_hash::{rand_core::OsRng, PasswordHasher, SaltString};
    use argon2::{Algorithm, Argon2, Params, Version};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use folio_core::MemoryStore;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::ServerConfig;
    use crate::services::mailer::{ContactMessage, Mailer};
    use crate::services::media::{ImageUpload, MediaHost, UploadedImage};

    const PASSWORD: &str = "correct horse battery staple";
    const BOUNDARY: &str = "folio-test-boundary";

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<ContactMessage>>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send_contact(&self, message: &ContactMessage) -> anyhow::Result<()> {
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    struct FailingMailer;

    #[async_trait]
    impl Mailer for FailingMailer {
        async fn send_contact(&self, _message: &ContactMessage) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("provider down"))
        }
    }

    struct StubMedia;

    #[async_trait]
    impl MediaHost for StubMedia {
        async fn upload(&self, image: ImageUpload) -> anyhow::Result<UploadedImage> {
            Ok(UploadedImage {
                url: format!("https://cdn.example.com/{}/{}", image.folder, image.file_name),
                public_id: format!("{}/{}", image.folder, image.file_name),
                width: Some(10),
                height: Some(10),
            })
        }
    }

    /// Cheap Argon2 parameters so tests stay fast; verification reads them from the hash.
    fn cheap_hash(password: &str) -> String {
        let params = Params::new(1024, 1, 1, None).unwrap();
        let argon = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        argon
            .hash_password(password.as_bytes(), &SaltString::generate(&mut OsRng))
            .unwrap()
            .to_string()
    }

    fn test_config() -> ServerConfig {
        let mut config = ServerConfig::default();
        config.auth.jwt_secret = "a-test-secret-of-reasonable-length!!".to_string();
        config.admin.email = "admin@example.com".to_string();
        config.admin.name = "Admin".to_string();
        config.admin.password_hash = cheap_hash(PASSWORD);
        config
    }

    struct TestApp {
        router: Router,
        mailer: Arc<RecordingMailer>,
    }

    fn app_with(config: ServerConfig) -> TestApp {
        let mailer = Arc::new(RecordingMailer::default());
        let state = AppState::new(
            config,
            Arc::new(MemoryStore::new()),
            mailer.clone(),
            Arc::new(StubMedia),
        );
        TestApp {
            router: router(&state).with_state(state),
            mailer,
        }
    }

    fn app() -> TestApp {
        app_with(test_config())
    }

    impl TestApp {
        async fn send(&self, req: Request<Body>) -> Response {
            self.router.clone().oneshot(req).await.unwrap()
        }

        async fn login(&self) -> String {
            let response = self
                .send(json_request("POST", "/api/auth/login", None, login_body(PASSWORD)))
                .await;
            assert_eq!(response.status(), StatusCode::OK);
            body_json(response).await["data"]["token"]
                .as_str()
                .unwrap()
                .to_string()
        }
    }

    fn login_body(password: &str) -> Value {
        json!({ "email": "Admin@Example.com", "password": password })
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", "203.0.113.7");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri).header("x-forwarded-for", "203.0.113.7");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn multipart_request(token: Option<&str>, content_type: &str, bytes: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"folder\"\r\n\r\nportfolio/projects\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"shot.png\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .header("x-forwarded-for", "203.0.113.7");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body)).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn project() -> Value {
        json!({
            "title": "Folio",
            "description": "Portfolio backend",
            "technologies": ["Rust", "axum"],
            "featured": true,
            "order": 1
        })
    }

    fn contact_body() -> Value {
        json!({
            "name": "Ada",
            "email": "ada@example.com",
            "subject": "Hello",
            "message": "I enjoyed your portfolio a lot."
        })
    }

    // --- health / auth ---

    #[tokio::test]
    async fn health_is_public() {
        let app = app();
        let response = app.send(get_request("/api/health", None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["data"]["status"], "ok");
    }

    #[tokio::test]
    async fn login_returns_token_and_rate_limit_headers() {
        let app = app();
        let response = app
            .send(json_request("POST", "/api/auth/login", None, login_body(PASSWORD)))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-ratelimit-limit"], "5");
        assert_eq!(response.headers()["x-ratelimit-remaining"], "4");
        assert!(response.headers().contains_key("x-ratelimit-reset"));

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["user"]["email"], "admin@example.com");
        assert!(body["data"]["token"].as_str().unwrap().split('.').count() == 3);
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_generic_401() {
        let app = app();
        let response = app
            .send(json_request("POST", "/api/auth/login", None, login_body("nope")))
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Invalid credentials");
    }

    #[tokio::test]
    async fn login_with_unknown_email_is_generic_401() {
        let app = app();
        let body = json!({ "email": "intruder@example.com", "password": PASSWORD });
        let response = app
            .send(json_request("POST", "/api/auth/login", None, body))
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "Invalid credentials");
    }

    #[tokio::test]
    async fn sixth_login_attempt_is_rate_limited() {
        let app = app();
        for _ in 0..5 {
            let response = app
                .send(json_request("POST", "/api/auth/login", None, login_body("wrong")))
                .await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
        let response = app
            .send(json_request("POST", "/api/auth/login", None, login_body(PASSWORD)))
            .await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()["x-ratelimit-remaining"], "0");
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(
            body["error"],
            "Too many login attempts. Please try again in 5 minutes."
        );
    }

    #[tokio::test]
    async fn verify_returns_session_for_valid_token() {
        let app = app();
        let token = app.login().await;
        let response = app.send(get_request("/api/auth/verify", Some(&token))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"]["user"]["id"], "admin");
    }

    #[tokio::test]
    async fn verify_without_token_is_401() {
        let app = app();
        let response = app.send(get_request("/api/auth/verify", None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await["error"],
            "Unauthorized - Invalid or missing token"
        );
    }

    // --- content ---

    #[tokio::test]
    async fn create_without_token_is_401() {
        let app = app();
        let response = app
            .send(json_request("POST", "/api/projects", None, project()))
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await["error"],
            "Unauthorized - Invalid or missing token"
        );
    }

    #[tokio::test]
    async fn lowercase_bearer_scheme_is_401() {
        let app = app();
        let token = app.login().await;
        let request = Request::builder()
            .method("POST")
            .uri("/api/projects")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("bearer {token}"))
            .body(Body::from(project().to_string()))
            .unwrap();
        let response = app.send(request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn project_crud_round_trip() {
        let app = app();
        let token = app.login().await;

        let response = app
            .send(json_request("POST", "/api/projects", Some(&token), project()))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await["data"].clone();
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(created["title"], "Folio");

        let response = app.send(get_request("/api/projects", None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let list = body_json(response).await;
        assert_eq!(list["data"].as_array().unwrap().len(), 1);

        let mut changed = project();
        changed["title"] = json!("Folio v2");
        let response = app
            .send(json_request(
                "PUT",
                &format!("/api/projects/{id}"),
                Some(&token),
                changed,
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["data"]["title"], "Folio v2");

        let response = app
            .send(get_request(&format!("/api/projects/{id}"), None))
            .await;
        assert_eq!(body_json(response).await["data"]["title"], "Folio v2");

        let response = app
            .send(json_request(
                "DELETE",
                &format!("/api/projects/{id}"),
                Some(&token),
                json!({}),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["data"]["id"], id.as_str());

        let response = app
            .send(get_request(&format!("/api/projects/{id}"), None))
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["success"], false);
    }

    #[tokio::test]
    async fn every_collection_is_mounted() {
        let app = app();
        for name in folio_core::COLLECTIONS {
            let response = app.send(get_request(&format!("/api/{name}"), None)).await;
            assert_eq!(response.status(), StatusCode::OK, "GET /api/{name}");
        }
    }

    #[tokio::test]
    async fn invalid_document_is_400() {
        let app = app();
        let token = app.login().await;
        let body = json!({ "name": "Rust", "category": "Languages", "proficiency": 250 });
        let response = app
            .send(json_request("POST", "/api/skills", Some(&token), body))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["success"], false);

        let body = json!({ "name": "", "category": "Languages", "proficiency": 50 });
        let response = app
            .send(json_request("POST", "/api/skills", Some(&token), body))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error = body_json(response).await["error"].as_str().unwrap().to_string();
        assert!(error.contains("name"));
    }

    #[tokio::test]
    async fn malformed_json_is_400_envelope() {
        let app = app();
        let token = app.login().await;
        let request = Request::builder()
            .method("POST")
            .uri("/api/interests")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.send(request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["success"], false);
    }

    #[tokio::test]
    async fn update_unknown_id_is_404() {
        let app = app();
        let token = app.login().await;
        let response = app
            .send(json_request(
                "PUT",
                "/api/interests/does-not-exist",
                Some(&token),
                json!({ "title": "Chess" }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn public_reads_have_their_own_budget() {
        let mut config = test_config();
        config.rate_limit.public_read.max_requests = 2;
        let app = app_with(config);

        for _ in 0..2 {
            let response = app.send(get_request("/api/skills", None)).await;
            assert_eq!(response.status(), StatusCode::OK);
            assert!(response.headers().get("x-ratelimit-limit").is_none());
        }
        let response = app.send(get_request("/api/skills", None)).await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            body_json(response).await["error"],
            crate::limiter::DEFAULT_LIMIT_MESSAGE
        );

        // Login draws from a different bucket.
        app.login().await;
    }

    // --- contact ---

    #[tokio::test]
    async fn contact_sends_mail() {
        let app = app();
        let response = app
            .send(json_request("POST", "/api/contact", None, contact_body()))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-ratelimit-limit"], "3");
        assert_eq!(body_json(response).await["success"], true);

        let sent = app.mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].email, "ada@example.com");
        assert_eq!(sent[0].subject.as_deref(), Some("Hello"));
    }

    #[tokio::test]
    async fn contact_with_blank_name_is_400() {
        let app = app();
        let mut body = contact_body();
        body["name"] = json!("   ");
        let response = app
            .send(json_request("POST", "/api/contact", None, body))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"]
            .as_str()
            .unwrap()
            .contains("name"));
        assert!(app.mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn contact_with_bad_email_is_400() {
        let app = app();
        let mut body = contact_body();
        body["email"] = json!("not-an-email");
        let response = app
            .send(json_request("POST", "/api/contact", None, body))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(app.mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn fourth_contact_message_is_rate_limited() {
        let app = app();
        for _ in 0..3 {
            let response = app
                .send(json_request("POST", "/api/contact", None, contact_body()))
                .await;
            assert_eq!(response.status(), StatusCode::OK);
        }
        let response = app
            .send(json_request("POST", "/api/contact", None, contact_body()))
            .await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()["x-ratelimit-remaining"], "0");
        assert_eq!(app.mailer.sent.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn mail_provider_failure_is_502() {
        let state = AppState::new(
            test_config(),
            Arc::new(MemoryStore::new()),
            Arc::new(FailingMailer),
            Arc::new(StubMedia),
        );
        let router = router(&state).with_state(state);
        let response = router
            .oneshot(json_request("POST", "/api/contact", None, contact_body()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    // --- upload ---

    #[tokio::test]
    async fn upload_requires_token() {
        let app = app();
        let response = app
            .send(multipart_request(None, "image/png", b"\x89PNG"))
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn upload_forwards_image_to_media_host() {
        let app = app();
        let token = app.login().await;
        let response = app
            .send(multipart_request(Some(&token), "image/png", b"\x89PNG"))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(
            body["data"]["url"],
            "https://cdn.example.com/portfolio/projects/shot.png"
        );
    }

    #[tokio::test]
    async fn upload_rejects_non_image() {
        let app = app();
        let token = app.login().await;
        let response = app
            .send(multipart_request(Some(&token), "application/pdf", b"%PDF"))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
