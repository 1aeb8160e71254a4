//! Core domain models for the out action
//!
//! This module defines the request as it arrives on stdin, the pipelines
//! file it may point at, the validation rules both must satisfy, and the
//! state recorded while a run applies pipelines.

pub mod config;
pub mod request;
pub mod state;
pub mod target;
pub mod validation;

pub use config::{pipelines_from_file, PipelinesConfig, PipelinesFileError};
pub use request::*;
pub use state::*;
pub use target::*;
pub use validation::{validate_out, ValidationError};
