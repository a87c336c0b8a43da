pub mod content;

pub use content::{ContentCategory, ContentError, ContentMatcher, ContentSelection};
pub use http::{HeaderMap, Method, StatusCode};
