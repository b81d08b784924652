use std::sync::Arc;

use innovatube_client::config::ClientConfig;
use innovatube_client::error::Error;
use innovatube_client::forms::{LoginForm, RegisterForm, ResetPasswordForm};
use innovatube_client::messages::{user_message, Action};
use innovatube_client::session::{FileSessionStore, MemorySessionStore, Session, SessionStore};
use innovatube_client::InnovaTube;
use serde_json::json;
use wiremock::matchers::{any, body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_with(server: &MockServer, store: Arc<dyn SessionStore>) -> InnovaTube {
    let config = ClientConfig::default().with_api_base_url(&server.uri());
    InnovaTube::new_with_session_store(config, store).unwrap()
}

fn stored(session: Session) -> Arc<dyn SessionStore> {
    Arc::new(MemorySessionStore::with_session(session))
}

#[tokio::test]
async fn test_login_persists_session() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/Auth/login"))
        .and(body_json(json!({ "identifier": "alice", "password": "secret" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "abc",
            "sessionId": 7,
            "username": "alice"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_with(&mock_server, Arc::new(MemorySessionStore::new()));
    let data = client.auth().login("alice", "secret").await.unwrap();

    assert_eq!(data["accessToken"], "abc");
    assert_eq!(
        client.session(),
        Some(Session {
            access_token: Some("abc".into()),
            refresh_token: None,
            session_id: Some(7),
            username: Some("alice".into()),
            email: None,
        })
    );
    assert!(client.auth().is_authenticated());
}

#[tokio::test]
async fn test_login_accepts_alternate_token_names() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/Auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jwtToken": "xyz",
            "refreshToken": "r1",
            "id": "12",
            "userName": "bob",
            "email": "bob@example.com"
        })))
        .mount(&mock_server)
        .await;

    let client = client_with(&mock_server, Arc::new(MemorySessionStore::new()));
    client.auth().login("bob", "pw").await.unwrap();

    let session = client.session().unwrap();
    assert_eq!(session.access_token.as_deref(), Some("xyz"));
    assert_eq!(session.refresh_token.as_deref(), Some("r1"));
    assert_eq!(session.session_id, Some(12));
    assert_eq!(session.username.as_deref(), Some("bob"));
    assert_eq!(session.email.as_deref(), Some("bob@example.com"));
}

#[tokio::test]
async fn test_login_session_survives_restart() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let session_file = dir.path().join("nested").join("session.json");

    Mock::given(method("POST"))
        .and(path("/api/Auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "persisted",
            "sessionId": 3
        })))
        .mount(&mock_server)
        .await;

    let config = ClientConfig::default()
        .with_api_base_url(&mock_server.uri())
        .with_session_path(&session_file);
    let client = InnovaTube::new(config.clone()).unwrap();
    client.auth().login("carol", "pw").await.unwrap();

    let reopened = FileSessionStore::new(&session_file).get().unwrap();
    assert_eq!(reopened.access_token.as_deref(), Some("persisted"));
    assert_eq!(reopened.session_id, Some(3));

    let restarted = InnovaTube::new(config).unwrap();
    assert!(restarted.auth().is_authenticated());
}

#[tokio::test]
async fn test_login_failure_keeps_previous_session() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/Auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid credentials" })),
        )
        .mount(&mock_server)
        .await;

    let previous = Session {
        access_token: Some("old".into()),
        ..Default::default()
    };
    let client = client_with(&mock_server, stored(previous.clone()));
    let err = client.auth().login("alice", "wrong").await.unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert_eq!(user_message(Action::Login, &err), "Incorrect username or password.");
    assert_eq!(client.session(), Some(previous));
}

#[tokio::test]
async fn test_refresh_merges_tokens() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/Auth/refresh"))
        .and(body_json(json!({ "refreshToken": "r1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "new",
            "refreshToken": "r2"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_with(
        &mock_server,
        stored(Session {
            access_token: Some("old".into()),
            refresh_token: Some("r1".into()),
            session_id: Some(7),
            username: Some("alice".into()),
            email: Some("alice@example.com".into()),
        }),
    );
    client.auth().refresh_token("r1").await.unwrap();

    assert_eq!(
        client.session(),
        Some(Session {
            access_token: Some("new".into()),
            refresh_token: Some("r2".into()),
            session_id: Some(7),
            username: Some("alice".into()),
            email: Some("alice@example.com".into()),
        })
    );
}

#[tokio::test]
async fn test_logout_clears_even_when_server_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/Auth/logout"))
        .and(query_param("sessionId", "7"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "boom" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_with(
        &mock_server,
        stored(Session {
            access_token: Some("abc".into()),
            session_id: Some(7),
            ..Default::default()
        }),
    );
    let err = client.auth().logout(7).await.unwrap_err();

    assert_eq!(err.to_string(), "boom");
    assert_eq!(client.session(), None);
}

#[tokio::test]
async fn test_sign_out_without_session_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/Auth/logout"))
        .and(query_param("sessionId", "0"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_with(
        &mock_server,
        stored(Session {
            access_token: Some("abc".into()),
            ..Default::default()
        }),
    );
    client.auth().sign_out().await;

    assert!(!client.auth().is_authenticated());
}

#[tokio::test]
async fn test_register_sends_trimmed_fields() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/Auth/register"))
        .and(body_json(json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "username": "ada",
            "email": "ada@example.com",
            "password": "pw"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 1 })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_with(&mock_server, Arc::new(MemorySessionStore::new()));
    let form = RegisterForm {
        first_name: " Ada ".into(),
        last_name: "Lovelace".into(),
        username: "ada ".into(),
        email: "ada@example.com".into(),
        password: "pw".into(),
        captcha_token: None,
    };
    client.auth().sign_up(&form).await.unwrap();

    assert_eq!(client.session(), None);
}

#[tokio::test]
async fn test_register_duplicate_username_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/Auth/register"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "Duplicate entry 'ada' for key 'ux_users_username'"
        })))
        .mount(&mock_server)
        .await;

    let client = client_with(&mock_server, Arc::new(MemorySessionStore::new()));
    let form = RegisterForm {
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        username: "ada".into(),
        email: "ada@example.com".into(),
        password: "pw".into(),
        captcha_token: None,
    };
    let err = client.auth().sign_up(&form).await.unwrap_err();

    assert_eq!(
        user_message(Action::Register, &err),
        "That username is taken. Please choose another one."
    );
}

#[tokio::test]
async fn test_reset_mismatch_sends_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client_with(&mock_server, Arc::new(MemorySessionStore::new()));
    let form = ResetPasswordForm {
        code: "123456".into(),
        new_password: "one".into(),
        confirm_password: "two".into(),
    };
    let err = client.auth().confirm_password_reset(&form).await.unwrap_err();

    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(user_message(Action::ResetPassword, &err), "Passwords do not match.");
}

#[tokio::test]
async fn test_reset_password_posts_code() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/Auth/reset-password"))
        .and(body_json(json!({ "code": "123456", "newPassword": "fresh" })))
        .respond_with(ResponseTemplate::new(200).set_body_string("Password updated"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_with(&mock_server, Arc::new(MemorySessionStore::new()));
    let form = ResetPasswordForm {
        code: " 123456 ".into(),
        new_password: "fresh".into(),
        confirm_password: "fresh".into(),
    };
    client.auth().confirm_password_reset(&form).await.unwrap();
}

#[tokio::test]
async fn test_forgot_password_unknown_account() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/Auth/forgot-password"))
        .and(body_json(json!({ "identifier": "ghost" })))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "User not found" })),
        )
        .mount(&mock_server)
        .await;

    let client = client_with(&mock_server, Arc::new(MemorySessionStore::new()));
    let err = client.auth().forgot_password("ghost").await.unwrap_err();

    assert_eq!(
        user_message(Action::ForgotPassword, &err),
        "We could not find an account with those details."
    );
}

#[tokio::test]
async fn test_captcha_required_when_configured() {
    let mock_server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = ClientConfig::default()
        .with_api_base_url(&mock_server.uri())
        .with_recaptcha_site_key("site-key");
    let client =
        InnovaTube::new_with_session_store(config, Arc::new(MemorySessionStore::new())).unwrap();

    let form = LoginForm {
        identifier: "alice".into(),
        password: "secret".into(),
        captcha_token: None,
    };
    let err = client.auth().sign_in(&form).await.unwrap_err();

    assert!(matches!(err, Error::Validation(_)));
    assert!(!client.auth().is_authenticated());
}

#[tokio::test]
async fn test_login_without_token_keeps_previous_session() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/Auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "username": "alice" })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/Auth/login"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let previous = Session {
        access_token: Some("still-valid".into()),
        session_id: Some(4),
        ..Default::default()
    };
    let client = client_with(&mock_server, stored(previous.clone()));

    let data = client.auth().login("alice", "secret").await.unwrap();
    assert_eq!(data["username"], "alice");
    assert_eq!(client.session(), Some(previous.clone()));

    let data = client.auth().login("alice", "secret").await.unwrap();
    assert!(data.is_null());
    assert_eq!(client.session(), Some(previous));
}

#[tokio::test]
async fn test_sign_out_swallows_server_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/Auth/logout"))
        .and(query_param("sessionId", "9"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_with(
        &mock_server,
        stored(Session {
            access_token: Some("abc".into()),
            session_id: Some(9),
            ..Default::default()
        }),
    );
    client.auth().sign_out().await;

    assert_eq!(client.session(), None);
}
