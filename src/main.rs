//! mytoken-client - mint, exchange, and revoke mytokens

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use mytoken_client::{
    MytokenClient,
    cli::{Cli, Command},
    config::Config,
    model::Capability,
    setup_tracing,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup tracing
    if let Err(e) = setup_tracing(&cli.log_level, cli.log_format.as_deref()) {
        eprintln!("Failed to setup tracing: {e}");
        return ExitCode::FAILURE;
    }

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            eprintln!("{}", e.message());
            return ExitCode::FAILURE;
        }
    };

    let client = match MytokenClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{}", e.message());
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Some(Command::Mint { capability }) => run_mint(&client, &capability).await,
        Some(Command::Revoke { no_recursive }) => run_revoke(&client, !no_recursive).await,
        Some(Command::Token { session }) => run_token(&client, session).await,
        None => run_token(&client, false).await,
    }
}

/// Run the chained flow (or a session-backed exchange) and print the
/// access token.
async fn run_token(client: &MytokenClient, session: bool) -> ExitCode {
    let result = if session {
        client
            .exchange_access_token(None)
            .await
            .map(|res| res.access_token)
    } else {
        client.access_token_via_mytoken().await
    };

    match result {
        Ok(access_token) => {
            println!("{access_token}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e.message());
            ExitCode::FAILURE
        }
    }
}

/// Mint a mytoken and print it.
async fn run_mint(client: &MytokenClient, capability: &str) -> ExitCode {
    match client.request_mytoken(Capability::from(capability)).await {
        Ok(res) => {
            println!("{}", res.mytoken);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e.message());
            ExitCode::FAILURE
        }
    }
}

/// Revoke the session's mytoken and report what the service said.
/// Revocation is fire-and-report: the outcome is printed either way and
/// the exit code reflects the reported status.
async fn run_revoke(client: &MytokenClient, recursive: bool) -> ExitCode {
    let outcome = client.revoke_mytoken(recursive).await;
    match (outcome.status, &outcome.error) {
        (Some(status), _) => println!("revocation: HTTP {status}"),
        (None, Some(e)) => println!("revocation: {e}"),
        (None, None) => println!("revocation: no response"),
    }
    if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
