//! # Network Gateway
//!
//! Forwards an assembled registration to the backend and answers with a structured
//! [`GatewayResponse`]. [`RateLimitedGateway`] keys attempts by endpoint, client signature and
//! email over a fixed window, and answers a localized `429` without reaching upstream once a
//! key is exhausted. Windows are kept in a [`mkp_storage::KeyValueStore`], so a file-backed
//! limiter enforces the limit across processes. [`HttpUpstream`] (feature `http`) is the multipart transport.
//!
//! ```rust
//! use mkp_gateway::{
//!     GatewayError, GatewayResponse, RateLimitedGateway, RateLimiter, RegistrationPayload,
//!     SubmissionContext, SubmissionGateway,
//! };
//! use std::time::Duration;
//!
//! struct Accepting;
//!
//! impl SubmissionGateway for Accepting {
//!     async fn submit(
//!         &self,
//!         _payload: RegistrationPayload,
//!         _context: &SubmissionContext,
//!     ) -> Result<GatewayResponse, GatewayError> {
//!         Ok(GatewayResponse::accepted(None))
//!     }
//! }
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let limiter = RateLimiter::new("docs", 1, Duration::from_secs(60), 16);
//! let gateway = RateLimitedGateway::new(Accepting, limiter, "register");
//! let context = SubmissionContext::default();
//!
//! assert!(gateway.submit(RegistrationPayload::new(), &context).await?.success);
//! assert!(gateway.submit(RegistrationPayload::new(), &context).await?.is_rate_limited());
//! # Ok::<(), GatewayError>(())
//! # }).unwrap();
//! ```

mod error;
mod gateway;
#[cfg(feature = "http")]
mod http;
mod limiter;
mod payload;
mod response;

pub use error::{GatewayError, GatewayErrorExt};
pub use gateway::{RateLimitedGateway, SubmissionContext, SubmissionGateway};
#[cfg(feature = "http")]
pub use http::HttpUpstream;
pub use limiter::{RateDecision, RateLimiter};
pub use payload::{FilePart, RegistrationPayload};
pub use response::{GatewayResponse, rate_limit_message};
