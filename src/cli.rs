//! Command-line interface

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Mint, exchange, and revoke mytokens against a mytoken service
#[derive(Parser, Debug)]
#[command(name = "mytoken-client")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short, long, env = "MYTOKEN_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", env = "MYTOKEN_LOG_LEVEL", global = true)]
    pub log_level: String,

    /// Log format (text, json)
    #[arg(long, env = "MYTOKEN_LOG_FORMAT", global = true)]
    pub log_format: Option<String>,

    /// Subcommand (optional - defaults to the chained token flow)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Mint a mytoken and exchange it for an access token (default)
    Token {
        /// Exchange via the ambient session instead of minting a mytoken
        #[arg(long)]
        session: bool,
    },

    /// Mint a mytoken only
    Mint {
        /// Capability the mytoken is scoped to
        #[arg(long, default_value = "AT")]
        capability: String,
    },

    /// Revoke the session's mytoken
    Revoke {
        /// Revoke only this token, not the tokens minted from it
        #[arg(long)]
        no_recursive: bool,
    },
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn defaults_to_chained_flow() {
        let cli = Cli::parse_from(["mytoken-client"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.log_level, "warn");
    }

    #[test]
    fn mint_defaults_to_at_capability() {
        let cli = Cli::parse_from(["mytoken-client", "mint"]);
        match cli.command {
            Some(Command::Mint { capability }) => assert_eq!(capability, "AT"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn revoke_defaults_to_recursive() {
        let cli = Cli::parse_from(["mytoken-client", "revoke"]);
        match cli.command {
            Some(Command::Revoke { no_recursive }) => assert!(!no_recursive),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
