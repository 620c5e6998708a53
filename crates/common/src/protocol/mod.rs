mod request;
mod response;

pub use request::WidgetRequest;
pub use response::WidgetResponse;
