//! End-to-end account and contact journey through the composed HTTP stack.

mod support;

use actix_web::http::StatusCode;
use actix_web::test;
use contactbook::domain::Role;
use rstest::rstest;
use serde_json::{Value, json};

use support::{app, bearer, stack};

fn header<'a>(response: &'a actix_web::dev::ServiceResponse, name: &str) -> Option<&'a str> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
}

#[rstest]
#[actix_web::test]
async fn signup_confirm_login_and_manage_contacts() {
    let stack = stack();
    let app = test::init_service(app(&stack)).await;

    let signup = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({"username": "ada", "email": "ada@example.com", "password": "secret1"}))
        .to_request();
    let res = test::call_service(&app, signup).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert!(header(&res, "trace-id").is_some());
    assert_eq!(header(&res, "request-time"), Some("2024-05-01T12:00:00.000Z"));

    let login_form = [("username", "ada@example.com"), ("password", "secret1")];
    let early = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_form(login_form)
        .to_request();
    let res = test::call_service(&app, early).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], json!("Email not confirmed"));

    let token = stack.mailer.last_token().expect("verification mail sent");
    let confirm = test::TestRequest::get()
        .uri(&format!("/api/auth/confirmed_email/{token}"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, confirm).await;
    assert_eq!(body["message"], json!("Email confirmed"));

    let login = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_form(login_form)
        .to_request();
    let tokens: Value = test::call_and_read_body_json(&app, login).await;
    assert_eq!(tokens["token_type"], json!("bearer"));
    let access = tokens["access_token"].as_str().expect("access token").to_owned();

    let create = test::TestRequest::post()
        .uri("/api/contacts")
        .insert_header(bearer(&access))
        .set_json(json!({
            "firstName": "Grace",
            "lastName": "Hopper",
            "email": "grace@example.com",
            "phone": "+380501234567",
            "birthDate": "1906-05-03",
        }))
        .to_request();
    let res = test::call_service(&app, create).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let birthdays = test::TestRequest::get()
        .uri("/api/contacts/birthday")
        .insert_header(bearer(&access))
        .to_request();
    let upcoming: Value = test::call_and_read_body_json(&app, birthdays).await;
    assert_eq!(upcoming.as_array().map(Vec::len), Some(1));

    let logout = test::TestRequest::post()
        .uri("/api/auth/logout")
        .insert_header(bearer(&access))
        .to_request();
    assert_eq!(test::call_service(&app, logout).await.status(), StatusCode::OK);

    let after = test::TestRequest::get()
        .uri("/api/users/me")
        .insert_header(bearer(&access))
        .to_request();
    assert_eq!(
        test::call_service(&app, after).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[rstest]
#[actix_web::test]
async fn contacts_stay_private_to_their_owner() {
    let stack = stack();
    let (_, ada) = stack.signed_in("ada@example.com", "secret1", Role::User).await;
    let (_, bob) = stack.signed_in("bob@example.com", "secret1", Role::User).await;
    let (_, admin) = stack
        .signed_in("root@example.com", "secret1", Role::Admin)
        .await;
    let app = test::init_service(app(&stack)).await;

    let create = test::TestRequest::post()
        .uri("/api/contacts")
        .insert_header(bearer(&ada))
        .set_json(json!({
            "firstName": "Grace",
            "lastName": "Hopper",
            "email": "grace@example.com",
            "phone": "+380501234567",
            "birthDate": "1906-12-09",
        }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, create).await;
    let id = created["id"].as_str().expect("id").to_owned();

    let foreign = test::TestRequest::get()
        .uri(&format!("/api/contacts/{id}"))
        .insert_header(bearer(&bob))
        .to_request();
    assert_eq!(
        test::call_service(&app, foreign).await.status(),
        StatusCode::NOT_FOUND
    );

    let all_as_user = test::TestRequest::get()
        .uri("/api/contacts/all")
        .insert_header(bearer(&ada))
        .to_request();
    assert_eq!(
        test::call_service(&app, all_as_user).await.status(),
        StatusCode::FORBIDDEN
    );

    let all_as_admin = test::TestRequest::get()
        .uri("/api/contacts/all")
        .insert_header(bearer(&admin))
        .to_request();
    let all: Value = test::call_and_read_body_json(&app, all_as_admin).await;
    assert_eq!(all.as_array().map(Vec::len), Some(1));
}

#[rstest]
#[actix_web::test]
async fn error_bodies_echo_the_trace_header() {
    let stack = stack();
    let app = test::init_service(app(&stack)).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/users/me").to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let trace = header(&res, "trace-id").expect("trace header").to_owned();
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["traceId"], json!(trace));
}

#[rstest]
#[actix_web::test]
async fn sixth_listing_within_a_minute_is_throttled() {
    let stack = stack();
    let (_, token) = stack.signed_in("ada@example.com", "secret1", Role::User).await;
    let app = test::init_service(app(&stack)).await;

    for _ in 0..5 {
        let req = test::TestRequest::get()
            .uri("/api/contacts")
            .insert_header(bearer(&token))
            .to_request();
        let status = test::call_service(&app, req).await.status();
        assert_ne!(status, StatusCode::TOO_MANY_REQUESTS);
    }

    let req = test::TestRequest::get()
        .uri("/api/contacts")
        .insert_header(bearer(&token))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::TOO_MANY_REQUESTS
    );
}
