//! Page logic of the admin console.
//!
//! Each page owns its fetched copy of server state and talks to the
//! gateway through the [`Console`] context. Failures are reported through
//! the context's [`Notifier`] and returned to the caller; local state is
//! only touched after the gateway confirms a change.

pub mod auth;
pub mod channels;
pub mod context;
pub mod edit_channel;
pub mod edit_redemption;
pub mod edit_token;
pub mod edit_user;
pub mod home;
pub mod mj_logs;
pub mod navigate;
pub mod notify;
pub mod personal;
pub mod redemptions;
pub mod settings;
pub mod table;
pub mod tokens;
pub mod topup;
pub mod users;

#[cfg(test)]
mod testing;

pub use context::{Console, Refresh};
pub use navigate::Route;
pub use notify::{Level, Notifier, RecordingNotifier, TracingNotifier};
pub use table::{PagedTable, Row};
