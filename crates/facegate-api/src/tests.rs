//! Router tests: real SQLite store in memory, fake perception and identity
//! backends.

use std::{
  collections::HashMap,
  sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
  },
  time::Duration,
};

use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use axum::{
  body::Body,
  http::{Request, StatusCode, header},
  response::Response,
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use facegate_core::{
  account::AccountId,
  descriptor::NewDescriptor,
  identity::LoginLinkIssuer,
  image::ImagePayload,
  perception::PerceptionService,
  session::LoginArtifact,
  store::{AccountStore, DescriptorStore},
};
use facegate_store_sqlite::SqliteStore;
use rand_core::OsRng;
use serde_json::{Value, json};
use thiserror::Error;
use tower::ServiceExt as _;

use crate::{ApiSettings, AppState, AuthConfig, api_router};

#[derive(Debug, Error)]
#[error("fake failure")]
struct FakeError;

// ─── Fakes ───────────────────────────────────────────────────────────────────

struct FakePerception {
  face:        bool,
  fail_detect: bool,
  description: &'static str,
  scores:      HashMap<&'static str, u8>,
  delay:       Option<Duration>,
}

impl FakePerception {
  fn new() -> Self {
    Self {
      face:        true,
      fail_detect: false,
      description: "oval face, brown eyes",
      scores:      HashMap::new(),
      delay:       None,
    }
  }

  fn score(mut self, stored: &'static str, score: u8) -> Self {
    self.scores.insert(stored, score);
    self
  }
}

impl PerceptionService for FakePerception {
  type Error = FakeError;

  async fn detect_face(&self, _image: &ImagePayload) -> Result<bool, FakeError> {
    if self.fail_detect {
      return Err(FakeError);
    }
    Ok(self.face)
  }

  async fn describe(&self, _image: &ImagePayload) -> Result<String, FakeError> {
    if let Some(d) = self.delay {
      tokio::time::sleep(d).await;
    }
    Ok(self.description.to_owned())
  }

  async fn compare(&self, _submitted: &str, stored: &str) -> Result<u8, FakeError> {
    Ok(self.scores.get(stored).copied().unwrap_or(0))
  }
}

#[derive(Default)]
struct FakeLinks {
  fail:  bool,
  calls: AtomicUsize,
}

impl LoginLinkIssuer for FakeLinks {
  type Error = FakeError;

  async fn issue_login_link(&self, login_identifier: &str) -> Result<LoginArtifact, FakeError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    if self.fail {
      return Err(FakeError);
    }
    Ok(LoginArtifact::new(format!(
      "https://console.example/#access_token=at-{login_identifier}&refresh_token=rt-1"
    )))
  }
}

// ─── Harness ─────────────────────────────────────────────────────────────────

type TestState = AppState<FakePerception, SqliteStore, FakeLinks>;

struct Harness {
  state: TestState,
  store: SqliteStore,
  links: Arc<FakeLinks>,
}

async fn harness_with(perception: FakePerception, settings: ApiSettings) -> Harness {
  harness_full(perception, FakeLinks::default(), settings).await
}

async fn harness_full(
  perception: FakePerception,
  links: FakeLinks,
  settings: ApiSettings,
) -> Harness {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let salt  = SaltString::generate(&mut OsRng);
  let hash  = Argon2::default()
    .hash_password(b"secret", &salt)
    .unwrap()
    .to_string();
  let links = Arc::new(links);

  let state = AppState::new(
    Arc::new(perception),
    Arc::new(store.clone()),
    Arc::clone(&links),
    AuthConfig { username: "admin".to_string(), password_hash: hash },
    settings,
  );
  Harness { state, store, links }
}

async fn harness(perception: FakePerception) -> Harness {
  harness_with(perception, ApiSettings::default()).await
}

impl Harness {
  async fn account(&self, id: &str, email: &str, enabled: bool) {
    self.store.add_account(AccountId::from(id), email, enabled).await.unwrap();
  }

  async fn descriptor(&self, id: &str, text: &str) {
    self
      .store
      .record_descriptor(NewDescriptor {
        account_id:       AccountId::from(id),
        descriptor_text:  text.to_owned(),
        source_image_ref: None,
      })
      .await
      .unwrap();
  }

  async fn send(&self, method: &str, uri: &str, auth: bool, body: Option<Value>) -> Response {
    let mut req = Request::builder().method(method).uri(uri);
    if auth {
      req = req.header(header::AUTHORIZATION, basic("admin", "secret"));
    }
    let req = match body {
      Some(v) => req
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(v.to_string())),
      None => req.body(Body::empty()),
    }
    .unwrap();
    api_router(self.state.clone()).oneshot(req).await.unwrap()
  }
}

fn basic(user: &str, pass: &str) -> String {
  format!("Basic {}", B64.encode(format!("{user}:{pass}")))
}

fn photo() -> String { photo_of(512) }

fn photo_of(len: usize) -> String {
  let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
  bytes.resize(len, 3);
  format!("data:image/jpeg;base64,{}", B64.encode(bytes))
}

async fn json_body(res: Response) -> Value {
  let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

fn login_body() -> Value { json!({ "imageBase64OrDataUrl": photo() }) }

// ─── Face login ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn successful_login_returns_tokens() {
  let h = harness(FakePerception::new().score("a1-face", 85)).await;
  h.account("A1", "a1@example.org", true).await;
  h.descriptor("A1", "a1-face").await;

  let res = h.send("POST", "/face-login", false, Some(login_body())).await;
  assert_eq!(res.status(), StatusCode::OK);

  let body = json_body(res).await;
  assert_eq!(body["success"], true);
  assert_eq!(body["similarity"], 85);
  assert_eq!(body["email"], "a1@example.org");
  assert_eq!(body["userId"], "A1");
  assert_eq!(body["accessToken"], "at-a1@example.org");
  assert_eq!(body["refreshToken"], "rt-1");
}

#[tokio::test]
async fn login_auto_enables_face_login() {
  let h = harness(FakePerception::new().score("a1-face", 90)).await;
  h.account("A1", "a1@example.org", false).await;
  h.descriptor("A1", "a1-face").await;

  let res = h.send("POST", "/face-login", false, Some(login_body())).await;
  assert_eq!(res.status(), StatusCode::OK);

  let account = h.store.get_account(&AccountId::from("A1")).await.unwrap().unwrap();
  assert!(account.face_login_enabled);
}

#[tokio::test]
async fn below_threshold_is_no_match() {
  let h = harness(FakePerception::new().score("a1-face", 69)).await;
  h.account("A1", "a1@example.org", true).await;
  h.descriptor("A1", "a1-face").await;

  let res = h.send("POST", "/face-login", false, Some(login_body())).await;
  assert_eq!(res.status(), StatusCode::NOT_FOUND);
  let body = json_body(res).await;
  assert_eq!(body["success"], false);
  assert_eq!(body["error"], "NoMatch");
  assert_eq!(h.links.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_store_is_no_enrollments() {
  let h = harness(FakePerception::new()).await;
  let res = h.send("POST", "/face-login", false, Some(login_body())).await;
  assert_eq!(res.status(), StatusCode::NOT_FOUND);
  assert_eq!(json_body(res).await["error"], "NoEnrollments");
}

#[tokio::test]
async fn no_face_is_bad_request() {
  let mut perception = FakePerception::new();
  perception.face = false;
  let h = harness(perception).await;

  let res = h.send("POST", "/face-login", false, Some(login_body())).await;
  assert_eq!(res.status(), StatusCode::BAD_REQUEST);
  assert_eq!(json_body(res).await["error"], "NoFaceDetected");
}

#[tokio::test]
async fn tiny_image_is_invalid_input() {
  let h = harness(FakePerception::new()).await;
  let body = json!({ "imageBase64OrDataUrl": B64.encode([0xFFu8; 10]) });

  let res = h.send("POST", "/face-login", false, Some(body)).await;
  assert_eq!(res.status(), StatusCode::BAD_REQUEST);
  assert_eq!(json_body(res).await["error"], "InvalidImageInput");
}

#[tokio::test]
async fn missing_image_field_is_invalid_input() {
  let h = harness(FakePerception::new()).await;
  let res = h.send("POST", "/face-login", false, Some(json!({}))).await;
  assert_eq!(res.status(), StatusCode::BAD_REQUEST);
  assert_eq!(json_body(res).await["error"], "InvalidImageInput");
}

#[tokio::test]
async fn non_json_body_is_invalid_input() {
  let h = harness(FakePerception::new()).await;
  let res = h.send("POST", "/face-login", false, None).await;
  assert_eq!(res.status(), StatusCode::BAD_REQUEST);
  assert_eq!(json_body(res).await["error"], "InvalidImageInput");
}

#[tokio::test]
async fn slow_pipeline_times_out() {
  let mut perception = FakePerception::new();
  perception.delay = Some(Duration::from_millis(500));
  let settings = ApiSettings { verify_timeout: Duration::from_millis(20), ..Default::default() };
  let h = harness_with(perception, settings).await;

  let res = h.send("POST", "/face-login", false, Some(login_body())).await;
  assert_eq!(res.status(), StatusCode::GATEWAY_TIMEOUT);
  assert_eq!(json_body(res).await["error"], "Timeout");
}

#[tokio::test]
async fn photo_larger_than_axum_default_limit_is_accepted() {
  let h = harness(FakePerception::new().score("a1-face", 85)).await;
  h.account("A1", "a1@example.org", true).await;
  h.descriptor("A1", "a1-face").await;

  // 1.8 MB of image, about 2.4 MB once base64-encoded.
  let body = json!({ "imageBase64OrDataUrl": photo_of(1_800_000) });
  let res = h.send("POST", "/face-login", false, Some(body)).await;
  assert_eq!(res.status(), StatusCode::OK);
  assert_eq!(json_body(res).await["userId"], "A1");
}

#[tokio::test]
async fn body_over_configured_limit_is_413() {
  let settings = ApiSettings { max_body_bytes: 64 * 1024, ..Default::default() };
  let h = harness_with(FakePerception::new(), settings).await;

  let body = json!({ "imageBase64OrDataUrl": photo_of(100_000) });
  let res = h.send("POST", "/face-login", false, Some(body)).await;
  assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
  let body = json_body(res).await;
  assert_eq!(body["success"], false);
  assert_eq!(body["error"], "PayloadTooLarge");
}

#[tokio::test]
async fn perception_outage_is_500_with_generic_message() {
  let mut perception = FakePerception::new();
  perception.fail_detect = true;
  let h = harness(perception).await;

  let res = h.send("POST", "/face-login", false, Some(login_body())).await;
  assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
  let body = json_body(res).await;
  assert_eq!(body["success"], false);
  assert_eq!(body["error"], "PerceptionServiceError");
  assert!(body["message"].as_str().unwrap().contains("temporarily unavailable"));
}

#[tokio::test]
async fn identity_outage_is_500_session_issuance_error() {
  let links = FakeLinks { fail: true, ..FakeLinks::default() };
  let h = harness_full(
    FakePerception::new().score("a1-face", 90),
    links,
    ApiSettings::default(),
  )
  .await;
  h.account("A1", "a1@example.org", true).await;
  h.descriptor("A1", "a1-face").await;

  let res = h.send("POST", "/face-login", false, Some(login_body())).await;
  assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
  let body = json_body(res).await;
  assert_eq!(body["success"], false);
  assert_eq!(body["error"], "SessionIssuanceError");
  assert!(body.get("accessToken").is_none());
  assert_eq!(h.links.calls.load(Ordering::SeqCst), 1);
}

// ─── Enrollment ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn enrollment_requires_admin() {
  let h = harness(FakePerception::new()).await;
  h.account("A1", "a1@example.org", false).await;

  let body = json!({ "accountId": "A1", "imageBase64OrDataUrl": photo() });
  let res = h.send("POST", "/enrollments", false, Some(body)).await;
  assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
  assert!(res.headers().contains_key(header::WWW_AUTHENTICATE));
  assert!(h.store.list_active_descriptors().await.unwrap().is_empty());
}

#[tokio::test]
async fn enrollment_then_login_round_trip() {
  let h = harness(FakePerception::new().score("oval face, brown eyes", 91)).await;
  h.account("A1", "a1@example.org", false).await;

  let body = json!({ "accountId": "A1", "imageBase64OrDataUrl": photo() });
  let res = h.send("POST", "/enrollments", true, Some(body)).await;
  assert_eq!(res.status(), StatusCode::CREATED);
  let enrolled = json_body(res).await;
  assert_eq!(enrolled["accountId"], "A1");
  assert!(enrolled["sourceImageRef"].as_str().unwrap().starts_with("sha256:"));

  let res = h.send("GET", "/accounts/A1/face-login", true, None).await;
  let status = json_body(res).await;
  assert_eq!(status["faceLoginEnabled"], true);
  assert_eq!(status["activeDescriptors"], 1);

  let res = h.send("POST", "/face-login", false, Some(login_body())).await;
  assert_eq!(res.status(), StatusCode::OK);
  assert_eq!(json_body(res).await["userId"], "A1");
}

#[tokio::test]
async fn enrollment_for_unknown_account_is_404() {
  let h = harness(FakePerception::new()).await;
  let body = json!({ "accountId": "ghost", "imageBase64OrDataUrl": photo() });
  let res = h.send("POST", "/enrollments", true, Some(body)).await;
  assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn enrollment_without_account_id_is_bad_request() {
  let h = harness(FakePerception::new()).await;
  let body = json!({ "imageBase64OrDataUrl": photo() });
  let res = h.send("POST", "/enrollments", true, Some(body)).await;
  assert_eq!(res.status(), StatusCode::BAD_REQUEST);
  assert_eq!(json_body(res).await["error"], "BadRequest");
}

// ─── Account management ──────────────────────────────────────────────────────

#[tokio::test]
async fn status_of_unknown_account_is_404() {
  let h = harness(FakePerception::new()).await;
  let res = h.send("GET", "/accounts/ghost/face-login", true, None).await;
  assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn disable_deactivates_and_blocks_login() {
  let h = harness(FakePerception::new().score("a1-face", 95)).await;
  h.account("A1", "a1@example.org", true).await;
  h.descriptor("A1", "a1-face").await;
  h.descriptor("A1", "a1-face").await;

  let res = h.send("DELETE", "/accounts/A1/face-login", true, None).await;
  assert_eq!(res.status(), StatusCode::OK);
  let body = json_body(res).await;
  assert_eq!(body["accountId"], "A1");
  assert_eq!(body["deactivated"], 2);

  let account = h.store.get_account(&AccountId::from("A1")).await.unwrap().unwrap();
  assert!(!account.face_login_enabled);

  let res = h.send("POST", "/face-login", false, Some(login_body())).await;
  assert_eq!(json_body(res).await["error"], "NoEnrollments");
}

#[tokio::test]
async fn admin_routes_reject_wrong_password() {
  let h = harness(FakePerception::new()).await;
  h.account("A1", "a1@example.org", true).await;

  let req = Request::builder()
    .method("GET")
    .uri("/accounts/A1/face-login")
    .header(header::AUTHORIZATION, basic("admin", "wrong"))
    .body(Body::empty())
    .unwrap();
  let res = api_router(h.state.clone()).oneshot(req).await.unwrap();
  assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
  assert_eq!(json_body(res).await["error"], "Unauthorized");
}
