//! Authentication API handlers.
//!
//! ```text
//! POST /api/auth/signup {"username":"ada","email":"ada@example.com","password":"secret1"}
//! POST /api/auth/login  username=ada@example.com&password=secret1
//! GET  /api/auth/refresh_token   (Authorization: Bearer <refresh token>)
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{
    EmailAddress, Error, LoginCredentials, LoginValidationError, NewAccount, PlainPassword,
    Username,
};

use super::ApiResult;
use super::bearer::{BearerToken, CurrentUser};
use super::schemas::{MessageResponse, TokenResponse, UserResponse};
use super::state::HttpState;
use super::validation::{EMAIL, PASSWORD, USERNAME, password_error, user_field_error};

/// Detail returned alongside a freshly created account.
pub const SIGNUP_DETAIL: &str = "User successfully created. Check your email for confirmation.";

/// Signup request body for `POST /api/auth/signup`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SignupRequest {
    #[schema(example = "ada")]
    pub username: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "secret1")]
    pub password: String,
}

impl TryFrom<SignupRequest> for NewAccount {
    type Error = Error;

    fn try_from(value: SignupRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            username: Username::new(&value.username)
                .map_err(|err| user_field_error(USERNAME, &err))?,
            email: EmailAddress::new(&value.email).map_err(|err| user_field_error(EMAIL, &err))?,
            password: PlainPassword::new(value.password)
                .map_err(|err| password_error(PASSWORD, &err))?,
        })
    }
}

/// Body of a successful signup.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignupResponse {
    pub user: UserResponse,
    pub detail: String,
}

/// OAuth2 password-flow form for `POST /api/auth/login`.
///
/// `username` carries the account email.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl TryFrom<LoginForm> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginForm) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyUsername => Error::invalid_request("username must not be empty")
            .with_details(json!({ "field": "username", "code": "empty_username" })),
        LoginValidationError::EmptyPassword => Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "empty_password" })),
    }
}

/// Body naming an account by email.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct EmailRequest {
    #[schema(example = "ada@example.com")]
    pub email: String,
}

impl EmailRequest {
    pub(crate) fn parse(self) -> Result<EmailAddress, Error> {
        EmailAddress::new(&self.email).map_err(|err| user_field_error(EMAIL, &err))
    }
}

/// Register an account and send the verification email.
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = SignupResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Account already exists", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "signup",
    security([])
)]
#[post("/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    payload: web::Json<SignupRequest>,
) -> ApiResult<HttpResponse> {
    let account = NewAccount::try_from(payload.into_inner())?;
    let user = state.accounts.signup(account, &state.public_base_url).await?;
    Ok(HttpResponse::Created().json(SignupResponse {
        user: UserResponse::from(&user),
        detail: SIGNUP_DETAIL.to_owned(),
    }))
}

/// Exchange email and password for an access/refresh token pair.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Token pair", body = TokenResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    form: web::Form<LoginForm>,
) -> ApiResult<web::Json<TokenResponse>> {
    let credentials =
        LoginCredentials::try_from(form.into_inner()).map_err(map_login_validation_error)?;
    let pair = state.accounts.login(&credentials).await?;
    Ok(web::Json(TokenResponse::from(pair)))
}

/// End the caller's session; its access tokens stop working.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out"),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["auth"],
    operation_id = "logout",
    security(("bearer" = []))
)]
#[post("/logout")]
pub async fn logout(
    state: web::Data<HttpState>,
    user: CurrentUser,
) -> ApiResult<HttpResponse> {
    state.accounts.logout(&user).await?;
    Ok(HttpResponse::Ok().json(json!({ "result": "Success" })))
}

/// Rotate the token pair using the refresh token as bearer credential.
#[utoipa::path(
    get,
    path = "/api/auth/refresh_token",
    responses(
        (status = 200, description = "New token pair", body = TokenResponse),
        (status = 401, description = "Invalid refresh token", body = Error)
    ),
    tags = ["auth"],
    operation_id = "refreshToken",
    security(("bearer" = []))
)]
#[get("/refresh_token")]
pub async fn refresh_token(
    state: web::Data<HttpState>,
    token: BearerToken,
) -> ApiResult<web::Json<TokenResponse>> {
    let pair = state.accounts.refresh(token.as_str()).await?;
    Ok(web::Json(TokenResponse::from(pair)))
}

/// Re-send the verification email.
#[utoipa::path(
    post,
    path = "/api/auth/request_email",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Outcome", body = MessageResponse),
        (status = 400, description = "Invalid request", body = Error)
    ),
    tags = ["auth"],
    operation_id = "requestEmail",
    security([])
)]
#[post("/request_email")]
pub async fn request_email(
    state: web::Data<HttpState>,
    payload: web::Json<EmailRequest>,
) -> ApiResult<web::Json<MessageResponse>> {
    let email = payload.into_inner().parse()?;
    let message = state.accounts.request_email(&email, &state.public_base_url).await?;
    Ok(web::Json(MessageResponse::new(message)))
}

/// Confirm the email address behind a verification token.
#[utoipa::path(
    get,
    path = "/api/auth/confirmed_email/{token}",
    params(("token" = String, Path, description = "Verification token from the email")),
    responses(
        (status = 200, description = "Outcome", body = MessageResponse),
        (status = 400, description = "Verification error", body = Error),
        (status = 422, description = "Invalid token", body = Error)
    ),
    tags = ["auth"],
    operation_id = "confirmedEmail",
    security([])
)]
#[get("/confirmed_email/{token}")]
pub async fn confirmed_email(
    state: web::Data<HttpState>,
    token: web::Path<String>,
) -> ApiResult<web::Json<MessageResponse>> {
    let message = state.accounts.confirm_email(&token).await?;
    Ok(web::Json(MessageResponse::new(message)))
}

/// Register the `/api/auth` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/auth")
            .service(signup)
            .service(login)
            .service(logout)
            .service(refresh_token)
            .service(request_email)
            .service(confirmed_email),
    );
}

#[cfg(test)]
mod tests;
