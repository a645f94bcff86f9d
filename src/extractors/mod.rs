//! Request extractors.

mod payload;
pub use payload::{parse_body, Payload};
