//! Client-side state shared by the console pages: the persisted key/value
//! cache and the auth and site-status contexts built on top of it.

pub mod auth;
pub mod error;
pub mod status;
pub mod store;

pub use auth::AuthContext;
pub use error::StoreError;
pub use status::StatusContext;
pub use store::{LocalStore, SharedStore, StoreKey};
