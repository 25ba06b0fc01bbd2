//! Example services
//!
//! A synchronous calculator and a deferred user store, declared with
//! parameter names and schemas so that decoration validates and logs them.

mod context;
mod handlers;
mod types;

pub use context::{AppContext, DbService};
pub use handlers::{calculator_service, users_service};
pub use types::*;
