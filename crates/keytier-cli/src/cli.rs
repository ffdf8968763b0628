//! Command line argument model

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// keytier - resolve credentials from the most secure tier that holds them
#[derive(Parser, Debug)]
#[command(name = "keytier")]
#[command(version)]
#[command(about = "Resolve API keys through security-tiered sources with an audit trail")]
pub struct Args {
    /// Data directory holding settings, parameters and audit logs
    #[arg(long, global = true, env = "KEYTIER_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Resolve the credential and report which tier supplied it
    Resolve {
        /// Print the full value instead of a masked prefix
        #[arg(long)]
        reveal: bool,
    },

    /// List the tiers in priority order
    Sources,

    /// Manage the system parameter store
    Param {
        #[command(subcommand)]
        action: ParamCommand,
    },

    /// Manage the OS keychain entry of the keychain tier
    Keychain {
        #[command(subcommand)]
        action: KeychainCommand,
    },

    /// Manage the settings file
    Settings {
        #[command(subcommand)]
        action: SettingsCommand,
    },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum KeychainCommand {
    /// Store the credential (prompts for the value when omitted)
    Set { value: Option<String> },

    /// Delete the credential
    Unset,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ParamCommand {
    /// Print a parameter value
    Get { key: String },

    /// Set a parameter (prompts for the value when omitted)
    Set { key: String, value: Option<String> },

    /// Remove a parameter
    Unset { key: String },

    /// List parameter keys
    List,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum SettingsCommand {
    /// Print the effective settings as JSON
    Show,

    /// Write default settings
    Init {
        /// Overwrite an existing settings file
        #[arg(long)]
        force: bool,
    },
}
