//! Command-line interface for the lootvault server.

use clap::{Parser, Subcommand};

/// Lootvault - vault-opening game server
/// Guardians, offensives, hunts and press-and-hold loot claims.
#[derive(Parser)]
#[command(name = "lootvault")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the web server (default when no command is given)
    #[command(alias = "s")]
    Serve,

    /// Run a single maintenance pass and exit
    #[command(alias = "c")]
    Check,

    /// Create default config file
    Init,

    /// List vaults
    #[command(alias = "ls")]
    Vaults,

    /// Reset a user's password
    ResetPassword {
        /// Account to reset
        username: String,
        /// New password (min 8 characters)
        password: String,
    },
}
