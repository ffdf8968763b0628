//! # keytier-cli
//!
//! Operator command line for keytier: resolve credentials, inspect the tier
//! chain, and manage the parameter store and settings.

pub mod cli;
pub mod commands;

pub use cli::{Args, Command, KeychainCommand, ParamCommand, SettingsCommand};
pub use commands::run;
