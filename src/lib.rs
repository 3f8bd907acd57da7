//! Webmachine - HTTP decision-diagram engine
//!
//! Drives each request through the HTTP decision graph so responses follow
//! HTTP semantics whatever the resource implements.

pub mod config;
pub mod decision;
pub mod errors;
pub mod http;
pub mod observability;
pub mod resource;

pub use decision::{Engine, FlowError, Outcome};
pub use resource::{Authorization, Context, Resource};
