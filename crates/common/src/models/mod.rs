mod customer;
mod mailbox;

pub use customer::CustomerFilter;
pub use mailbox::{Mailbox, WidgetDisplayMode};
