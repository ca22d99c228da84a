pub mod changelog;
pub mod cli;
pub mod collector;
pub mod command;
pub mod config;
pub mod error;
mod file_loader;
pub mod forge;
pub mod grouping;
pub mod image;
pub mod markdown;
pub mod orchestrator;
pub mod release;
pub mod retry;
pub mod summarizer;

pub use cli::{Args, Command};
pub use error::{ReleaseScribeError, Result};

#[cfg(test)]
pub mod test_helpers;
