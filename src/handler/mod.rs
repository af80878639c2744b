//! Request handler module
//!
//! Routing dispatch plus the page and static-asset handlers behind it.

pub mod pages;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
