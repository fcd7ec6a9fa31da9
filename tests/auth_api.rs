use std::sync::{Arc, Mutex};

use actix_web::{test, web, App};
use async_trait::async_trait;
use authgate_server::auth::handlers::{confirm_account, signin, signup};
use authgate_server::error::NotifierError;
use authgate_server::store::models::{ConfirmationToken, User};
use authgate_server::{AccountStore, AppState, MemoryStore, Notifier, Settings, TokenIssuer};
use serde_json::json;

/// Captures outgoing mail so tests can pull the confirmation token out of
/// the message body.
#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    fn last_token(&self) -> String {
        let sent = self.sent.lock().unwrap();
        let body = sent.last().expect("no mail was sent");
        body.rsplit('/').next().unwrap().to_string()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, _to: &str, _subject: &str, body: &str) -> Result<(), NotifierError> {
        self.sent.lock().unwrap().push(body.to_string());
        Ok(())
    }
}

fn test_state(notifier: Arc<RecordingNotifier>) -> web::Data<AppState> {
    let config = Settings::new_for_test().unwrap();
    web::Data::new(AppState::with_collaborators(
        config,
        Arc::new(MemoryStore::new()),
        notifier,
    ))
}

macro_rules! test_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data($state.clone())
                .route("/api/auth/signup", web::post().to(signup))
                .route("/api/auth/signin", web::post().to(signin))
                .route(
                    "/api/auth/confirm-account/{token}",
                    web::get().to(confirm_account),
                ),
        )
        .await
    };
}

fn alice_signup() -> serde_json::Value {
    json!({
        "name": "Alice",
        "username": "alice",
        "email": "a@x.com",
        "password": "secret",
        "roles": ["admin"]
    })
}

#[actix_web::test]
async fn test_signup_confirm_signin_flow() {
    let notifier = Arc::new(RecordingNotifier::default());
    let state = test_state(notifier.clone());
    let app = test_app!(state);

    // signup
    let resp = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(alice_signup())
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("email"));
    // the token itself never appears in the response
    assert!(!message.contains(&notifier.last_token()));

    // signin before confirmation is forbidden, regardless of password
    for password in ["secret", "wrong"] {
        let resp = test::TestRequest::post()
            .uri("/api/auth/signin")
            .set_json(json!({"username": "alice", "password": password}))
            .send_request(&app)
            .await;
        assert_eq!(resp.status(), 403);
    }

    // confirm via the mailed token
    let token = notifier.last_token();
    let resp = test::TestRequest::get()
        .uri(&format!("/api/auth/confirm-account/{}", token))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);

    // signin now succeeds and the session token embeds the username
    let resp = test::TestRequest::post()
        .uri("/api/auth/signin")
        .set_json(json!({"username": "alice", "password": "secret"}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["username"], "alice");

    let issuer = TokenIssuer::new("test_secret".to_string(), 1);
    let claims = issuer
        .decode_session_token(body["token"].as_str().unwrap())
        .unwrap();
    assert_eq!(claims.sub, "alice");
    assert_eq!(claims.roles, vec!["ROLE_ADMIN"]);

    // wrong password on a verified account
    let resp = test::TestRequest::post()
        .uri("/api/auth/signin")
        .set_json(json!({"username": "alice", "password": "wrong"}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 401);

    // repeated confirmation with the same token succeeds again
    let resp = test::TestRequest::get()
        .uri(&format!("/api/auth/confirm-account/{}", token))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
}

#[actix_web::test]
async fn test_duplicate_signup_rejected() {
    let state = test_state(Arc::new(RecordingNotifier::default()));
    let app = test_app!(state);

    let resp = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(alice_signup())
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);

    // same username, different email
    let resp = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({
            "name": "Alice Again",
            "username": "alice",
            "email": "other@x.com",
            "password": "secret"
        }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 400);

    // same email, different username
    let resp = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({
            "name": "Alice Again",
            "username": "alice2",
            "email": "a@x.com",
            "password": "secret"
        }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["status"], 400);
}

#[actix_web::test]
async fn test_signin_unknown_user_is_not_found() {
    let state = test_state(Arc::new(RecordingNotifier::default()));
    let app = test_app!(state);

    let resp = test::TestRequest::post()
        .uri("/api/auth/signin")
        .set_json(json!({"username": "ghost", "password": "whatever"}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn test_confirm_unknown_token_is_unauthorized() {
    let state = test_state(Arc::new(RecordingNotifier::default()));
    let app = test_app!(state);

    let resp = test::TestRequest::get()
        .uri("/api/auth/confirm-account/definitely-not-a-token")
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn test_confirm_token_with_missing_user_is_not_found() {
    let store = Arc::new(MemoryStore::new());
    let config = Settings::new_for_test().unwrap();
    let state = web::Data::new(AppState::with_collaborators(
        config,
        store.clone(),
        Arc::new(RecordingNotifier::default()),
    ));
    let app = test_app!(state);

    // a confirmation token whose user record was never persisted
    let ghost = User::new(
        "Ghost".into(),
        "ghost".into(),
        "ghost@x.com".into(),
        "hash".into(),
        false,
    );
    let orphan = ConfirmationToken::new(&ghost, "orphan-token".into());
    store.save_confirmation_token(&orphan).await.unwrap();

    let resp = test::TestRequest::get()
        .uri("/api/auth/confirm-account/orphan-token")
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 404);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["status"], 404);
}

#[actix_web::test]
async fn test_signup_rejects_empty_fields() {
    let state = test_state(Arc::new(RecordingNotifier::default()));
    let app = test_app!(state);

    let resp = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({
            "name": "Nobody",
            "username": "nobody",
            "email": "n@x.com",
            "password": ""
        }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 400);

    let resp = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({
            "name": "",
            "username": "nobody",
            "email": "n@x.com",
            "password": "secret"
        }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 400);
}
