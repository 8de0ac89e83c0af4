pub mod json_extract;
pub mod logging;
pub mod retry;

pub use json_extract::{json_object_span, parse_json_object};
pub use retry::{RetryExhausted, RetryPolicy};
