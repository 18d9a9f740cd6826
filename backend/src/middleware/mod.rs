//! Request middleware.
//!
//! Purpose: response headers common to every route, namely the request
//! trace identifier and the completion timestamp.

pub mod request_time;
pub mod trace;

pub use request_time::RequestTime;
pub use trace::Trace;
