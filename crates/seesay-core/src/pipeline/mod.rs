//! Narration pipeline components.
//!
//! - **validate**: Upload and path checks, stored-file naming
//! - **narrator**: Orchestrates validate, describe and speak

pub mod narrator;
pub mod validate;

pub use narrator::Narrator;
pub use validate::{secure_filename_with_timestamp, Validator};
