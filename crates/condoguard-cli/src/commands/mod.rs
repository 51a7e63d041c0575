//! Command handlers, one module per top-level command

pub mod config;
pub mod document;
pub mod resident;
pub mod status;
