//! Account API handlers.
//!
//! ```text
//! GET   /api/users/me
//! PATCH /api/users/avatar {"avatarUrl":"https://cdn.example/ada.png"}
//! POST  /api/users/forgot_password {"email":"ada@example.com"}
//! POST  /api/users/reset_password/{token} {"newPassword":"secret2"}
//! ```

use actix_web::{get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, PlainPassword};

use super::ApiResult;
use super::auth::EmailRequest;
use super::bearer::CurrentUser;
use super::schemas::{MessageResponse, UserResponse};
use super::state::HttpState;
use super::validation::{NEW_PASSWORD, password_error};

/// Body for `PATCH /api/users/avatar`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvatarRequest {
    #[schema(example = "https://cdn.example/ada.png")]
    pub avatar_url: String,
}

/// Body for `POST /api/users/reset_password/{token}`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[schema(example = "secret2")]
    pub new_password: String,
}

/// Current account.
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentUser",
    security(("bearer" = []))
)]
#[get("/me")]
pub async fn me(user: CurrentUser) -> web::Json<UserResponse> {
    web::Json(UserResponse::from(&*user))
}

/// Replace the account avatar with an absolute http(s) URL.
#[utoipa::path(
    patch,
    path = "/api/users/avatar",
    request_body = AvatarRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Invalid URL", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateAvatar",
    security(("bearer" = []))
)]
#[patch("/avatar")]
pub async fn update_avatar(
    state: web::Data<HttpState>,
    user: CurrentUser,
    payload: web::Json<AvatarRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let updated = state
        .accounts
        .update_avatar(&user, &payload.avatar_url)
        .await?;
    Ok(web::Json(UserResponse::from(&updated)))
}

/// Email a password reset link.
#[utoipa::path(
    post,
    path = "/api/users/forgot_password",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Reset email sent", body = MessageResponse),
        (status = 404, description = "User not found", body = Error)
    ),
    tags = ["users"],
    operation_id = "forgotPassword",
    security([])
)]
#[post("/forgot_password")]
pub async fn forgot_password(
    state: web::Data<HttpState>,
    payload: web::Json<EmailRequest>,
) -> ApiResult<web::Json<MessageResponse>> {
    let email = payload.into_inner().parse()?;
    let message = state
        .accounts
        .forgot_password(&email, &state.public_base_url)
        .await?;
    Ok(web::Json(MessageResponse::new(message)))
}

/// Set a new password using the token from the reset email.
#[utoipa::path(
    post,
    path = "/api/users/reset_password/{token}",
    params(("token" = String, Path, description = "Reset token from the email")),
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Invalid password", body = Error),
        (status = 404, description = "User not found", body = Error),
        (status = 422, description = "Invalid token", body = Error)
    ),
    tags = ["users"],
    operation_id = "resetPassword",
    security([])
)]
#[post("/reset_password/{token}")]
pub async fn reset_password(
    state: web::Data<HttpState>,
    token: web::Path<String>,
    payload: web::Json<ResetPasswordRequest>,
) -> ApiResult<web::Json<MessageResponse>> {
    let password = PlainPassword::new(payload.into_inner().new_password)
        .map_err(|err| password_error(NEW_PASSWORD, &err))?;
    let message = state.accounts.reset_password(&token, password).await?;
    Ok(web::Json(MessageResponse::new(message)))
}

/// Register the `/api/users` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/users")
            .service(me)
            .service(update_avatar)
            .service(forgot_password)
            .service(reset_password),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::domain::ports::{EmailKind, MockAccounts};
    use crate::inbound::http::test_utils::{bearer, test_app};
    use crate::test_support::{InMemoryStack, sample_user};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use chrono::NaiveDate;
    use rstest::{fixture, rstest};
    use serde_json::{Value, json};
    use std::sync::Arc;

    #[fixture]
    fn stack() -> InMemoryStack {
        InMemoryStack::new(NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid date"))
    }

    #[rstest]
    #[actix_web::test]
    async fn me_returns_current_user(stack: InMemoryStack) {
        let (_, access) = stack.signed_in("ada@example.com", "secret1", Role::Moderator).await;
        let app = test::init_service(test_app(stack.state.clone())).await;
        let req = test::TestRequest::get()
            .uri("/api/users/me")
            .insert_header(bearer(&access))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["email"], json!("ada@example.com"));
        assert_eq!(body["role"], json!("moderator"));
    }

    #[rstest]
    #[case(None)]
    #[case(Some("garbage"))]
    #[actix_web::test]
    async fn me_requires_valid_token(stack: InMemoryStack, #[case] token: Option<&str>) {
        let app = test::init_service(test_app(stack.state.clone())).await;
        let mut req = test::TestRequest::get().uri("/api/users/me");
        if let Some(token) = token {
            req = req.insert_header(bearer(token));
        }
        let res = test::call_service(&app, req.to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[actix_web::test]
    async fn expired_access_token_is_rejected(stack: InMemoryStack) {
        let (_, access) = stack.signed_in("ada@example.com", "secret1", Role::User).await;
        stack.clock.advance_seconds(16 * 60);
        let app = test::init_service(test_app(stack.state.clone())).await;
        let req = test::TestRequest::get()
            .uri("/api/users/me")
            .insert_header(bearer(&access))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[actix_web::test]
    async fn avatar_update_validates_url(stack: InMemoryStack) {
        let (_, access) = stack.signed_in("ada@example.com", "secret1", Role::User).await;
        let app = test::init_service(test_app(stack.state.clone())).await;

        let bad = test::TestRequest::patch()
            .uri("/api/users/avatar")
            .insert_header(bearer(&access))
            .set_json(json!({"avatarUrl": "ftp://example.com/a.png"}))
            .to_request();
        let res = test::call_service(&app, bad).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let good = test::TestRequest::patch()
            .uri("/api/users/avatar")
            .insert_header(bearer(&access))
            .set_json(json!({"avatarUrl": "https://cdn.example/ada.png"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, good).await;
        assert_eq!(body["avatar"], json!("https://cdn.example/ada.png"));
    }

    #[rstest]
    #[actix_web::test]
    async fn password_reset_round_trip(stack: InMemoryStack) {
        stack.signed_in("ada@example.com", "secret1", Role::User).await;
        let app = test::init_service(test_app(stack.state.clone())).await;

        let forgot = test::TestRequest::post()
            .uri("/api/users/forgot_password")
            .set_json(json!({"email": "ada@example.com"}))
            .to_request();
        assert_eq!(test::call_service(&app, forgot).await.status(), StatusCode::OK);
        let sent = stack.mailer.sent();
        assert_eq!(sent.last().map(|m| m.kind), Some(EmailKind::PasswordReset));
        let token = stack.mailer.last_token().expect("reset token");

        let reset = test::TestRequest::post()
            .uri(&format!("/api/users/reset_password/{token}"))
            .set_json(json!({"newPassword": "secret2"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, reset).await;
        assert_eq!(body["message"], json!("Password reset successfully"));

        let login = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_form([("username", "ada@example.com"), ("password", "secret2")])
            .to_request();
        assert_eq!(test::call_service(&app, login).await.status(), StatusCode::OK);
    }

    #[rstest]
    #[actix_web::test]
    async fn reset_links_ignore_forged_host_header(stack: InMemoryStack) {
        stack.signed_in("ada@example.com", "secret1", Role::User).await;
        let state = stack
            .state
            .clone()
            .with_public_base_url("https://contacts.example/");
        let app = test::init_service(test_app(state)).await;

        let req = test::TestRequest::post()
            .uri("/api/users/forgot_password")
            .insert_header(("Host", "attacker.example"))
            .insert_header(("X-Forwarded-Host", "attacker.example"))
            .set_json(json!({"email": "ada@example.com"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let sent = stack.mailer.sent();
        let message = sent.last().expect("reset email recorded");
        assert_eq!(message.base_url, "https://contacts.example/");
        assert!(!message.base_url.contains("attacker.example"));
    }

    #[rstest]
    #[actix_web::test]
    async fn avatar_url_length_is_capped(stack: InMemoryStack) {
        let (_, access) = stack.signed_in("ada@example.com", "secret1", Role::User).await;
        let app = test::init_service(test_app(stack.state.clone())).await;
        let prefix = "https://cdn.example/";
        let url = format!("{prefix}{}", "a".repeat(256 - prefix.len()));

        let req = test::TestRequest::patch()
            .uri("/api/users/avatar")
            .insert_header(bearer(&access))
            .set_json(json!({"avatarUrl": url}))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["code"], json!("invalid_request"));
        assert_eq!(body["details"]["field"], json!("avatarUrl"));
        assert_eq!(body["details"]["code"], json!("invalid_length"));
    }

    #[rstest]
    #[actix_web::test]
    async fn forgot_password_for_unknown_account_is_not_found(stack: InMemoryStack) {
        let app = test::init_service(test_app(stack.state.clone())).await;
        let req = test::TestRequest::post()
            .uri("/api/users/forgot_password")
            .set_json(json!({"email": "ghost@example.com"}))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::NOT_FOUND
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn short_new_password_never_reaches_the_service(stack: InMemoryStack) {
        let mut accounts = MockAccounts::new();
        accounts.expect_reset_password().never();
        let state = HttpState::new(
            Arc::new(accounts),
            stack.state.contacts.clone(),
            stack.state.rate_limiter.clone(),
        );
        let app = test::init_service(test_app(state)).await;
        let req = test::TestRequest::post()
            .uri("/api/users/reset_password/whatever")
            .set_json(json!({"newPassword": "abc"}))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["details"]["field"], json!("newPassword"));
    }

    #[rstest]
    #[actix_web::test]
    async fn service_outage_maps_to_unavailable(stack: InMemoryStack) {
        let mut accounts = MockAccounts::new();
        accounts
            .expect_authenticate()
            .returning(|_| Ok(sample_user("ada@example.com")));
        accounts
            .expect_update_avatar()
            .returning(|_, _| Err(Error::service_unavailable("user repository unavailable")));
        let state = HttpState::new(
            Arc::new(accounts),
            stack.state.contacts.clone(),
            stack.state.rate_limiter.clone(),
        );
        let app = test::init_service(test_app(state)).await;
        let req = test::TestRequest::patch()
            .uri("/api/users/avatar")
            .insert_header(bearer("any"))
            .set_json(json!({"avatarUrl": "https://cdn.example/ada.png"}))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
