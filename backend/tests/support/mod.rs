//! Shared helpers for the HTTP integration suites.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use chrono::NaiveDate;
use contactbook::domain::ports::FixtureConnectivityProbe;
use contactbook::inbound::http::configure_api;
use contactbook::inbound::http::health::{self, HealthState};
use contactbook::test_support::InMemoryStack;
use contactbook::{RequestTime, Trace};

/// Stack pinned to 1 May 2024.
pub fn stack() -> InMemoryStack {
    InMemoryStack::new(NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid date"))
}

/// App wired the way the server wires it, minus CORS and Swagger.
pub fn app(
    stack: &InMemoryStack,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    let health_state = HealthState::new(Arc::new(FixtureConnectivityProbe));
    health_state.mark_ready();
    App::new()
        .app_data(web::Data::new(health_state))
        .app_data(web::Data::new(stack.state.clone()))
        .wrap(RequestTime::new(stack.clock.clone()))
        .wrap(Trace)
        .configure(health::configure)
        .configure(configure_api)
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}
