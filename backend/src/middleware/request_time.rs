//! Middleware stamping each response with the time it was produced.

use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use chrono::SecondsFormat;
use futures_util::future::{LocalBoxFuture, Ready, ready};
use mockable::Clock;
use tracing::error;

/// Response header carrying the RFC 3339 completion timestamp.
pub const REQUEST_TIME_HEADER: &str = "request-time";

/// Adds a `Request-Time` header read from the injected clock.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use actix_web::App;
/// use contactbook::middleware::RequestTime;
/// use mockable::DefaultClock;
///
/// let app = App::new().wrap(RequestTime::new(Arc::new(DefaultClock)));
/// ```
#[derive(Clone)]
pub struct RequestTime {
    clock: Arc<dyn Clock>,
}

impl RequestTime {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestTime
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestTimeMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestTimeMiddleware {
            service,
            clock: Arc::clone(&self.clock),
        }))
    }
}

/// Service wrapper produced by [`RequestTime`].
pub struct RequestTimeMiddleware<S> {
    service: S,
    clock: Arc<dyn Clock>,
}

impl<S, B> Service<ServiceRequest> for RequestTimeMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let clock = Arc::clone(&self.clock);
        let fut = self.service.call(req);
        Box::pin(async move {
            let mut res = fut.await?;
            let stamp = clock.utc().to_rfc3339_opts(SecondsFormat::Millis, true);
            match HeaderValue::from_str(&stamp) {
                Ok(value) => {
                    res.response_mut()
                        .headers_mut()
                        .insert(HeaderName::from_static(REQUEST_TIME_HEADER), value);
                }
                Err(error) => error!(%error, "failed to encode request time header"),
            }
            Ok(res)
        })
    }
}
