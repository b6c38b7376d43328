//! Shared request/response types.

pub mod assistants;
pub mod common;

pub use assistants::*;
pub use common::*;
