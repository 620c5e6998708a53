//! Endpoint handlers
//!
//! Each handler returns `Result<WidgetResponse>`; failures are turned into
//! CORS-wrapped errors by the dispatcher in the crate root.

pub mod customer;
pub mod session;
pub mod webhook;


pub use customer::handle_customer;
pub use session::{handle_describe_session, handle_mint_session};
pub use webhook::handle_webhook;
