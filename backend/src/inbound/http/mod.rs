//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod bearer;
pub mod contacts;
pub mod error;
pub mod health;
pub mod rate_limit;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;

/// Register every `/api` route and the extractor error configs.
///
/// Handlers expect `web::Data<HttpState>` to be registered on the app.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(validation::json_config())
        .app_data(validation::form_config())
        .app_data(validation::query_config())
        .configure(auth::configure)
        .configure(users::configure)
        .configure(contacts::configure);
}
