//! CLI command implementations.

pub mod enter;
pub mod init;
pub mod inspect;
pub mod run;
pub mod stats;
