//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod init;
pub mod redact;
pub mod scan;
pub mod serve;
pub mod submit;
pub mod validate;
