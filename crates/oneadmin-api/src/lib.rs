//! Typed client for the gateway's management REST API.
//!
//! Every endpoint answers with the `{success, message, data}` envelope; the
//! resource modules add one `ApiClient` method per endpoint on top of the
//! [`Transport`] seam, so page logic can be tested against a scripted
//! transport.

pub mod channel;
pub mod client;
pub mod envelope;
pub mod error;
pub mod group;
pub mod log;
pub mod mj;
pub mod oauth;
pub mod option;
pub mod redemption;
pub mod site;
pub mod token;
pub mod transport;
pub mod user;

pub use client::ApiClient;
pub use envelope::Envelope;
pub use error::{ApiError, Result};
pub use transport::{ApiRequest, HttpTransport, Method, Transport};
