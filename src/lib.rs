//! Mytoken Client Library
//!
//! Client for the mytoken delegation-token service:
//!
//! - **Mint**: request a short-lived, narrowly scoped mytoken for a capability
//! - **Exchange**: redeem a mytoken (or ambient session) for an OAuth access token
//! - **Revoke**: revoke a mytoken, optionally cascading to derived tokens
//! - **Chained flow**: mint for "AT" then exchange, fail-fast
//!
//! This crate shapes HTTP request bodies and delegates all trust
//! decisions to the remote service; it issues, validates, and stores
//! nothing itself.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod model;

pub use client::{MytokenClient, RevocationOutcome};
pub use error::{Error, Result};

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Setup tracing/logging
pub fn setup_tracing(level: &str, format: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        Some("json") => {
            subscriber.with(fmt::layer().json()).init();
        }
        _ => {
            subscriber.with(fmt::layer()).init();
        }
    }

    Ok(())
}
