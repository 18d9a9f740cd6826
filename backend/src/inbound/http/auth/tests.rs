//! Handler tests for the authentication routes.

use actix_web::http::StatusCode;
use actix_web::test;
use chrono::NaiveDate;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use crate::domain::Role;
use crate::domain::ports::EmailKind;
use crate::inbound::http::test_utils::{bearer, test_app};
use crate::test_support::InMemoryStack;

#[fixture]
fn stack() -> InMemoryStack {
    InMemoryStack::new(NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid date"))
}

fn signup_body() -> Value {
    json!({"username": "ada", "email": "Ada@Example.com", "password": "secret1"})
}

fn message_of(body: &Value) -> Option<&str> {
    body.get("message").and_then(Value::as_str)
}

#[rstest]
#[actix_web::test]
async fn signup_creates_account_and_sends_verification(stack: InMemoryStack) {
    let app = test::init_service(test_app(stack.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(signup_body())
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(
        body.get("detail").and_then(Value::as_str),
        Some(super::SIGNUP_DETAIL)
    );
    assert_eq!(body["user"]["email"], json!("ada@example.com"));
    assert_eq!(body["user"]["confirmed"], json!(false));
    assert!(body["user"].get("passwordHash").is_none());

    let sent = stack.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].kind, EmailKind::Verification);
    assert_eq!(sent[0].base_url, stack.state.public_base_url.as_ref());
}

#[rstest]
#[actix_web::test]
async fn signup_link_uses_configured_origin(stack: InMemoryStack) {
    let state = stack
        .state
        .clone()
        .with_public_base_url("https://contacts.example/");
    let app = test::init_service(test_app(state)).await;
    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .insert_header(("Host", "attacker.example"))
        .set_json(signup_body())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let sent = stack.mailer.sent();
    assert_eq!(sent[0].base_url, "https://contacts.example/");
}

#[rstest]
#[actix_web::test]
async fn duplicate_signup_conflicts(stack: InMemoryStack) {
    let app = test::init_service(test_app(stack.state.clone())).await;
    for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
        let req = test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(signup_body())
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), expected);
    }
}

#[rstest]
#[case(json!({"username": "ada", "email": "ada@example.com", "password": "123"}), "password")]
#[case(json!({"username": "ad", "email": "ada@example.com", "password": "secret1"}), "username")]
#[case(json!({"username": "ada", "email": "not-an-email", "password": "secret1"}), "email")]
#[case(
    json!({"username": "ada", "email": format!("{}@example.com", "a".repeat(243)), "password": "secret1"}),
    "email"
)]
#[actix_web::test]
async fn signup_rejects_invalid_fields(
    stack: InMemoryStack,
    #[case] payload: Value,
    #[case] field: &str,
) {
    let app = test::init_service(test_app(stack.state.clone())).await;
    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(payload)
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], json!(field));
    assert!(stack.mailer.sent().is_empty());
}

#[rstest]
#[actix_web::test]
async fn confirmation_unlocks_login(stack: InMemoryStack) {
    let app = test::init_service(test_app(stack.state.clone())).await;
    let signup = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(signup_body())
        .to_request();
    test::call_service(&app, signup).await;

    let login = || {
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_form([("username", "ada@example.com"), ("password", "secret1")])
            .to_request()
    };
    let res = test::call_service(&app, login()).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(message_of(&body), Some("Email not confirmed"));

    let token = stack.mailer.last_token().expect("verification token sent");
    let confirm = test::TestRequest::get()
        .uri(&format!("/api/auth/confirmed_email/{token}"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, confirm).await;
    assert_eq!(message_of(&body), Some("Email confirmed"));

    let body: Value = test::call_and_read_body_json(&app, login()).await;
    assert_eq!(body["token_type"], json!("bearer"));
    assert!(body["access_token"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(body["refresh_token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[rstest]
#[case("ada@example.com", "wrong12", "Invalid password")]
#[case("nobody@example.com", "secret1", "Invalid email")]
#[actix_web::test]
async fn bad_credentials_are_unauthorised(
    stack: InMemoryStack,
    #[case] username: &str,
    #[case] password: &str,
    #[case] message: &str,
) {
    stack.signed_in("ada@example.com", "secret1", Role::User).await;
    let app = test::init_service(test_app(stack.state.clone())).await;
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_form([("username", username), ("password", password)])
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().contains_key("www-authenticate"));
    let body: Value = test::read_body_json(res).await;
    assert_eq!(message_of(&body), Some(message));
}

#[rstest]
#[actix_web::test]
async fn blank_login_username_is_invalid(stack: InMemoryStack) {
    let app = test::init_service(test_app(stack.state.clone())).await;
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_form([("username", "  "), ("password", "secret1")])
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["code"], json!("empty_username"));
}

#[rstest]
#[actix_web::test]
async fn logout_revokes_access_tokens(stack: InMemoryStack) {
    let (_, access) = stack.signed_in("ada@example.com", "secret1", Role::User).await;
    let app = test::init_service(test_app(stack.state.clone())).await;

    let logout = test::TestRequest::post()
        .uri("/api/auth/logout")
        .insert_header(bearer(&access))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, logout).await;
    assert_eq!(body, json!({"result": "Success"}));

    let me = test::TestRequest::get()
        .uri("/api/users/me")
        .insert_header(bearer(&access))
        .to_request();
    assert_eq!(
        test::call_service(&app, me).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[rstest]
#[actix_web::test]
async fn refresh_rotates_pair_and_rejects_access_tokens(stack: InMemoryStack) {
    let (user, access) = stack.signed_in("ada@example.com", "secret1", Role::User).await;
    let refresh = user.refresh_token.clone().expect("session open");
    let app = test::init_service(test_app(stack.state.clone())).await;

    let wrong_scope = test::TestRequest::get()
        .uri("/api/auth/refresh_token")
        .insert_header(bearer(&access))
        .to_request();
    let res = test::call_service(&app, wrong_scope).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(message_of(&body), Some("Invalid scope for token"));

    stack.clock.advance_seconds(1);
    let rotate = test::TestRequest::get()
        .uri("/api/auth/refresh_token")
        .insert_header(bearer(&refresh))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, rotate).await;
    let stored = stack
        .users
        .get("ada@example.com")
        .and_then(|u| u.refresh_token)
        .expect("refresh token stored");
    assert_eq!(body["refresh_token"], json!(stored));
}

#[rstest]
#[actix_web::test]
async fn request_email_reports_confirmed_accounts(stack: InMemoryStack) {
    stack.signed_in("ada@example.com", "secret1", Role::User).await;
    let app = test::init_service(test_app(stack.state.clone())).await;
    let req = test::TestRequest::post()
        .uri("/api/auth/request_email")
        .set_json(json!({"email": "ada@example.com"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(message_of(&body), Some("Your email is already confirmed"));
    assert!(stack.mailer.sent().is_empty());
}

#[rstest]
#[actix_web::test]
async fn garbage_verification_token_is_unprocessable(stack: InMemoryStack) {
    let app = test::init_service(test_app(stack.state.clone())).await;
    let req = test::TestRequest::get()
        .uri("/api/auth/confirmed_email/not-a-token")
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
