//! Handler tests for the contact routes.

use actix_web::http::StatusCode;
use actix_web::test;
use chrono::NaiveDate;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use crate::domain::Role;
use crate::inbound::http::test_utils::{bearer, test_app};
use crate::test_support::{InMemoryStack, sample_draft};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[fixture]
fn stack() -> InMemoryStack {
    InMemoryStack::with_limits(date(2024, 6, 15), 100, 60)
}

fn contact_body(email: &str) -> Value {
    json!({
        "firstName": "Grace",
        "lastName": "Hopper",
        "email": email,
        "phone": "+380501234567",
        "birthDate": "1906-12-09",
    })
}

#[rstest]
#[actix_web::test]
async fn create_then_fetch_by_id(stack: InMemoryStack) {
    let (_, token) = stack.signed_in("ada@example.com", "secret1", Role::User).await;
    let app = test::init_service(test_app(stack.state.clone())).await;

    let create = test::TestRequest::post()
        .uri("/api/contacts")
        .insert_header(bearer(&token))
        .set_json(contact_body("grace@example.com"))
        .to_request();
    let res = test::call_service(&app, create).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(res).await;
    assert_eq!(created["friendStatus"], json!(false));
    let id = created["id"].as_str().expect("id present").to_owned();

    let fetch = test::TestRequest::get()
        .uri(&format!("/api/contacts/{id}"))
        .insert_header(bearer(&token))
        .to_request();
    let fetched: Value = test::call_and_read_body_json(&app, fetch).await;
    assert_eq!(fetched, created);
}

#[rstest]
#[actix_web::test]
async fn duplicate_email_conflicts(stack: InMemoryStack) {
    let (_, token) = stack.signed_in("ada@example.com", "secret1", Role::User).await;
    let app = test::init_service(test_app(stack.state.clone())).await;

    for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
        let req = test::TestRequest::post()
            .uri("/api/contacts")
            .insert_header(bearer(&token))
            .set_json(contact_body("grace@example.com"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), expected);
    }
}

#[rstest]
#[case("firstName", json!("Al"))]
#[case("phone", json!("12345"))]
#[case("email", json!("grace"))]
#[actix_web::test]
async fn invalid_fields_are_rejected(
    stack: InMemoryStack,
    #[case] field: &str,
    #[case] value: Value,
) {
    let (_, token) = stack.signed_in("ada@example.com", "secret1", Role::User).await;
    let app = test::init_service(test_app(stack.state.clone())).await;
    let mut body = contact_body("grace@example.com");
    body[field] = value;

    let req = test::TestRequest::post()
        .uri("/api/contacts")
        .insert_header(bearer(&token))
        .set_json(body)
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let payload: Value = test::read_body_json(res).await;
    assert_eq!(payload["details"]["field"], json!(field));
    assert!(stack.contacts.is_empty());
}

#[rstest]
#[actix_web::test]
async fn other_owners_contacts_are_not_found(stack: InMemoryStack) {
    let (ada, _) = stack.signed_in("ada@example.com", "secret1", Role::User).await;
    let (_, grace_token) = stack.signed_in("grace@example.com", "secret1", Role::User).await;
    let contact = stack
        .contacts
        .seed(&ada.id, sample_draft("alan@example.com", date(1912, 6, 23)));
    let app = test::init_service(test_app(stack.state.clone())).await;

    for req in [
        test::TestRequest::get().uri(&format!("/api/contacts/{}", contact.id)),
        test::TestRequest::delete().uri(&format!("/api/contacts/{}", contact.id)),
        test::TestRequest::put()
            .uri(&format!("/api/contacts/{}", contact.id))
            .set_json(contact_body("alan@example.com")),
    ] {
        let res = test::call_service(&app, req.insert_header(bearer(&grace_token)).to_request())
            .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
    assert_eq!(stack.contacts.len(), 1);
}

#[rstest]
#[actix_web::test]
async fn update_and_delete_own_contact(stack: InMemoryStack) {
    let (ada, token) = stack.signed_in("ada@example.com", "secret1", Role::User).await;
    let contact = stack
        .contacts
        .seed(&ada.id, sample_draft("grace@example.com", date(1906, 12, 9)));
    let app = test::init_service(test_app(stack.state.clone())).await;

    let mut body = contact_body("grace@example.com");
    body["birthDate"] = json!("1906-12-10");
    body["friendStatus"] = json!(true);
    let update = test::TestRequest::put()
        .uri(&format!("/api/contacts/{}", contact.id))
        .insert_header(bearer(&token))
        .set_json(body)
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, update).await;
    assert_eq!(updated["birthDate"], json!("1906-12-10"));
    assert_eq!(updated["friendStatus"], json!(true));

    let delete = test::TestRequest::delete()
        .uri(&format!("/api/contacts/{}", contact.id))
        .insert_header(bearer(&token))
        .to_request();
    assert_eq!(
        test::call_service(&app, delete).await.status(),
        StatusCode::NO_CONTENT
    );
    assert!(stack.contacts.is_empty());
}

#[rstest]
#[case(Role::User, StatusCode::FORBIDDEN)]
#[case(Role::Moderator, StatusCode::OK)]
#[case(Role::Admin, StatusCode::OK)]
#[actix_web::test]
async fn all_contacts_require_staff_role(
    stack: InMemoryStack,
    #[case] role: Role,
    #[case] expected: StatusCode,
) {
    let (other, _) = stack.signed_in("grace@example.com", "secret1", Role::User).await;
    stack
        .contacts
        .seed(&other.id, sample_draft("alan@example.com", date(1912, 6, 23)));
    let (_, token) = stack.signed_in("ada@example.com", "secret1", role).await;
    let app = test::init_service(test_app(stack.state.clone())).await;

    let req = test::TestRequest::get()
        .uri("/api/contacts/all")
        .insert_header(bearer(&token))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), expected);
}

#[rstest]
#[actix_web::test]
async fn birthday_route_lists_next_seven_days(stack: InMemoryStack) {
    let (ada, token) = stack.signed_in("ada@example.com", "secret1", Role::User).await;
    stack
        .contacts
        .seed(&ada.id, sample_draft("soon@example.com", date(1990, 6, 20)));
    stack
        .contacts
        .seed(&ada.id, sample_draft("later@example.com", date(1990, 7, 20)));
    let app = test::init_service(test_app(stack.state.clone())).await;

    let req = test::TestRequest::get()
        .uri("/api/contacts/birthday")
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let emails: Vec<&str> = body
        .as_array()
        .expect("array body")
        .iter()
        .filter_map(|c| c["email"].as_str())
        .collect();
    assert_eq!(emails, vec!["soon@example.com"]);
}

#[rstest]
#[case("/api/contacts/first_name?first_name=Grace", StatusCode::OK)]
#[case("/api/contacts/last_name?last_name=Hopper", StatusCode::OK)]
#[case("/api/contacts/last_name?last_name=Grace", StatusCode::NOT_FOUND)]
#[case("/api/contacts/first_name?first_name=Gr", StatusCode::BAD_REQUEST)]
#[case("/api/contacts/email?email=grace@example.com", StatusCode::OK)]
#[case("/api/contacts/email?email=ghost@example.com", StatusCode::NOT_FOUND)]
#[case("/api/contacts?limit=5", StatusCode::BAD_REQUEST)]
#[case("/api/contacts/not-a-uuid", StatusCode::BAD_REQUEST)]
#[actix_web::test]
async fn searches_and_lookups(
    stack: InMemoryStack,
    #[case] uri: &str,
    #[case] expected: StatusCode,
) {
    let (ada, token) = stack.signed_in("ada@example.com", "secret1", Role::User).await;
    stack
        .contacts
        .seed(&ada.id, sample_draft("grace@example.com", date(1906, 12, 9)));
    let app = test::init_service(test_app(stack.state.clone())).await;

    let req = test::TestRequest::get()
        .uri(uri)
        .insert_header(bearer(&token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), expected);
}

#[rstest]
#[actix_web::test]
async fn listing_is_rate_limited() {
    let stack = InMemoryStack::new(date(2024, 6, 15));
    let (ada, token) = stack.signed_in("ada@example.com", "secret1", Role::User).await;
    stack
        .contacts
        .seed(&ada.id, sample_draft("grace@example.com", date(1906, 12, 9)));
    let app = test::init_service(test_app(stack.state.clone())).await;

    let list = || {
        test::TestRequest::get()
            .uri("/api/contacts")
            .insert_header(bearer(&token))
            .to_request()
    };
    for _ in 0..5 {
        assert_eq!(test::call_service(&app, list()).await.status(), StatusCode::OK);
    }
    assert_eq!(
        test::call_service(&app, list()).await.status(),
        StatusCode::TOO_MANY_REQUESTS
    );

    stack.clock.advance_seconds(60);
    assert_eq!(test::call_service(&app, list()).await.status(), StatusCode::OK);
}

#[rstest]
#[actix_web::test]
async fn rejected_requests_do_not_spend_the_rate_budget() {
    let stack = InMemoryStack::with_limits(date(2024, 6, 15), 2, 60);
    let (_, token) = stack.signed_in("ada@example.com", "secret1", Role::User).await;
    let app = test::init_service(test_app(stack.state.clone())).await;

    for _ in 0..5 {
        let bad_page = test::TestRequest::get()
            .uri("/api/contacts?limit=1000")
            .insert_header(bearer(&token))
            .to_request();
        assert_eq!(
            test::call_service(&app, bad_page).await.status(),
            StatusCode::BAD_REQUEST
        );

        let mut body = contact_body("grace@example.com");
        body["phone"] = json!("not a phone");
        let bad_draft = test::TestRequest::post()
            .uri("/api/contacts")
            .insert_header(bearer(&token))
            .set_json(body)
            .to_request();
        assert_eq!(
            test::call_service(&app, bad_draft).await.status(),
            StatusCode::BAD_REQUEST
        );
    }

    let list = || {
        test::TestRequest::get()
            .uri("/api/contacts")
            .insert_header(bearer(&token))
            .to_request()
    };
    for _ in 0..2 {
        assert_eq!(test::call_service(&app, list()).await.status(), StatusCode::OK);
    }
    assert_eq!(
        test::call_service(&app, list()).await.status(),
        StatusCode::TOO_MANY_REQUESTS
    );

    for (email, expected) in [
        ("grace@example.com", StatusCode::CREATED),
        ("alan@example.com", StatusCode::CREATED),
        ("edsger@example.com", StatusCode::TOO_MANY_REQUESTS),
    ] {
        let create = test::TestRequest::post()
            .uri("/api/contacts")
            .insert_header(bearer(&token))
            .set_json(contact_body(email))
            .to_request();
        assert_eq!(test::call_service(&app, create).await.status(), expected);
    }
}
