//! Test harness: the full router over an in-memory database, with the
//! notification outbox captured instead of mailed.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tower::ServiceExt;

use furniture_server::notify::{Notification, Notifier};
use furniture_server::{AppState, Config, DbService, create_router};

pub const PASSWORD: &str = "secret123";

pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
pub const JPEG: &[u8] = b"\xFF\xD8\xFF\xE0\0\x10JFIF\0";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub outbox: mpsc::Receiver<Notification>,
    pub upload_dir: tempfile::TempDir,
}

/// One file part of a multipart request
pub struct FilePart<'a> {
    pub filename: &'a str,
    pub content_type: &'a str,
    pub data: &'a [u8],
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_env(&[]).await
    }

    /// Build the app with extra configuration variables
    pub async fn with_env(vars: &[(&str, &str)]) -> Self {
        let upload_dir = tempfile::tempdir().unwrap();
        let upload_path = upload_dir.path().to_string_lossy().to_string();
        let config = Config::from_lookup(|name| match name {
            "UPLOAD_DIR" => Some(upload_path.clone()),
            "ADMIN_EMAIL" => Some("admin@getfurnitures.test".into()),
            "FRONTEND_URL" => Some("https://shop.test".into()),
            other => vars
                .iter()
                .find(|(k, _)| *k == other)
                .map(|(_, v)| v.to_string()),
        })
        .unwrap();

        let db = DbService::in_memory().await.unwrap();
        let (notifier, outbox) = Notifier::channel(256);
        let state = AppState::new(config, db, notifier);
        let router = create_router(state.clone());

        Self {
            router,
            state,
            outbox,
            upload_dir,
        }
    }

    /// Send a request, returning status and JSON body (`Null` when empty)
    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request(Method::GET, uri, token, None)).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(request(Method::POST, uri, token, Some(body))).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request(Method::DELETE, uri, token, None)).await
    }

    /// Everything queued on the outbox so far
    pub fn drain_outbox(&mut self) -> Vec<Notification> {
        let mut out = Vec::new();
        while let Ok(n) = self.outbox.try_recv() {
            out.push(n);
        }
        out
    }

    /// Latest OTP mailed to `email`
    pub fn otp_for(&mut self, email: &str) -> i64 {
        self.drain_outbox()
            .into_iter()
            .filter_map(|n| match n {
                Notification::VerificationOtp { to, otp, .. } if to == email => Some(otp),
                _ => None,
            })
            .last()
            .unwrap_or_else(|| panic!("no OTP mailed to {email}"))
    }

    pub async fn register(&self, name: &str, email: &str) -> (StatusCode, Value) {
        self.post(
            "/public/user-register",
            None,
            json!({
                "name": name,
                "email": email,
                "phone": "9876543210",
                "password": PASSWORD,
                "address": "12 MG Road, Pune"
            }),
        )
        .await
    }

    /// Register and verify a customer, returning a session token
    pub async fn customer(&mut self, email: &str) -> String {
        let (status, _) = self.register("Asha", email).await;
        assert_eq!(status, StatusCode::CREATED);
        let otp = self.otp_for(email);
        let (status, body) = self
            .post("/public/email-otp", None, json!({ "email": email, "otp": otp }))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["token"].as_str().unwrap().to_string()
    }

    /// Register an admin and log in
    pub async fn admin(&self) -> String {
        let (status, body) = self
            .post(
                "/public/admin-register",
                None,
                json!({ "name": "Ops", "email": "ops@getfurnitures.test", "password": PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        let (status, body) = self
            .post(
                "/public/admin-login",
                None,
                json!({ "email": "ops@getfurnitures.test", "password": PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["token"].as_str().unwrap().to_string()
    }

    /// Add a product through the multipart endpoint, returning its id
    pub async fn product(&self, admin: &str, model: &str, category: &str) -> i64 {
        let (status, body) = self
            .add_product(
                admin,
                &product_fields(model, category),
                &[FilePart {
                    filename: "front.png",
                    content_type: "image/png",
                    data: PNG,
                }],
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["id"].as_i64().unwrap()
    }

    pub async fn add_product(
        &self,
        token: &str,
        fields: &[(&str, &str)],
        files: &[FilePart<'_>],
    ) -> (StatusCode, Value) {
        let boundary = "furniture-test-boundary";
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        for file in files {
            body.extend_from_slice(
                format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"images\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                    file.filename, file.content_type
                )
                .as_bytes(),
            );
            body.extend_from_slice(file.data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

        let req = Request::builder()
            .method(Method::POST)
            .uri("/private/add-product")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(req).await
    }
}

pub fn product_fields<'a>(model: &'a str, category: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("manufacturerName", "Acme Furniture"),
        ("manufacturerPhone", "5550001111"),
        ("factoryName", "Acme Works"),
        ("modelName", model),
        ("category", category),
        ("description", "Solid teak"),
        ("minPrice", "15000"),
        ("maxPrice", "22000"),
    ]
}

pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}
