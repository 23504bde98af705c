pub use crate::errors::{TkError, TkResult};

pub mod actions;
pub mod cli;
pub mod config;
pub mod errors;
pub mod loader;
pub mod output;
pub mod report;
pub mod runner;
pub mod symbols;
pub mod unit;
pub mod wdir;
pub mod writer;
