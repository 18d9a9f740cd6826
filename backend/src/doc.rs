//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint from the inbound layer, the
//! request/response DTOs and the bearer security scheme. The document is
//! served by Swagger UI at `/docs` in debug builds.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode, Role};
use crate::inbound::http::auth::{EmailRequest, LoginForm, SignupRequest, SignupResponse};
use crate::inbound::http::contacts::ContactBody;
use crate::inbound::http::schemas::{
    ContactResponse, MessageResponse, TokenResponse, UserResponse,
};
use crate::inbound::http::users::{AvatarRequest, ResetPasswordRequest};

/// Enrich the generated document with the JWT bearer security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Access token from POST /api/auth/login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Contact book API",
        description = "Accounts, JWT sessions and per-user contact management."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::auth::signup,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::refresh_token,
        crate::inbound::http::auth::request_email,
        crate::inbound::http::auth::confirmed_email,
        crate::inbound::http::users::me,
        crate::inbound::http::users::update_avatar,
        crate::inbound::http::users::forgot_password,
        crate::inbound::http::users::reset_password,
        crate::inbound::http::contacts::list_contacts,
        crate::inbound::http::contacts::list_all_contacts,
        crate::inbound::http::contacts::upcoming_birthdays,
        crate::inbound::http::contacts::contact_by_email,
        crate::inbound::http::contacts::contacts_by_first_name,
        crate::inbound::http::contacts::contacts_by_last_name,
        crate::inbound::http::contacts::get_contact,
        crate::inbound::http::contacts::create_contact,
        crate::inbound::http::contacts::update_contact,
        crate::inbound::http::contacts::delete_contact,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
        crate::inbound::http::health::healthchecker,
        crate::inbound::http::health::root,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Role,
        SignupRequest,
        SignupResponse,
        LoginForm,
        EmailRequest,
        AvatarRequest,
        ResetPasswordRequest,
        UserResponse,
        TokenResponse,
        MessageResponse,
        ContactBody,
        ContactResponse,
    )),
    tags(
        (name = "auth", description = "Signup, login and email confirmation"),
        (name = "users", description = "Current account and password reset"),
        (name = "contacts", description = "Per-user address book"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
