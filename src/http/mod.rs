//! HTTP protocol layer module
//!
//! Base protocol functionality shared by the page, asset, and annotation
//! handlers: response builders, MIME lookup, and conditional-request support.

pub mod cache;
pub mod mime;
pub mod response;

// Re-export commonly used builders
pub use response::{
    build_304_response, build_404_response, build_405_response, build_413_response,
    build_500_response, build_health_response, build_options_response,
};
