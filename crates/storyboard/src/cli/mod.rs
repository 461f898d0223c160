//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the storyboard binary.

mod assets;
mod commands;
mod run;

pub use commands::{Cli, Commands};
pub use run::{continue_storyboard, generate_storyboard};
