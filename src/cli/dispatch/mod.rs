//! Map parsed CLI arguments to the action the binary runs.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{ARG_DSN, ARG_PORT, ARG_STORAGE_TIMEOUT, auth};
use anyhow::{Context, Result};
use secrecy::SecretString;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>(ARG_DSN)
        .filter(|dsn| !dsn.trim().is_empty())
        .map(|dsn| SecretString::from(dsn.clone()));
    let storage_timeout_seconds = matches
        .get_one::<u64>(ARG_STORAGE_TIMEOUT)
        .copied()
        .context("missing required argument: --storage-timeout-seconds")?;

    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        storage_timeout_seconds,
        signing_key: auth_opts.signing_key,
        signing_key_path: auth_opts.signing_key_path,
        access_token_ttl_seconds: auth_opts.access_token_ttl_seconds,
        refresh_token_ttl_seconds: auth_opts.refresh_token_ttl_seconds,
        hash_memory_kib: auth_opts.hash_memory_kib,
        hash_iterations: auth_opts.hash_iterations,
        hash_parallelism: auth_opts.hash_parallelism,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn server_args_from_env() -> Result<()> {
        temp_env::with_vars(
            [
                ("AUTHGATE_PORT", Some("9000")),
                ("AUTHGATE_DSN", Some("postgres://user:pw@localhost/authgate")),
                ("AUTHGATE_STORAGE_TIMEOUT_SECONDS", Some("10")),
                ("AUTHGATE_REFRESH_TOKEN_TTL_SECONDS", Some("3600")),
            ],
            || {
                let matches = crate::cli::commands::new().get_matches_from(vec!["authgate"]);
                let Action::Server(args) = handler(&matches)?;
                assert_eq!(args.port, 9000);
                assert_eq!(
                    args.dsn.as_ref().map(|dsn| dsn.expose_secret()),
                    Some("postgres://user:pw@localhost/authgate")
                );
                assert_eq!(args.storage_timeout_seconds, 10);
                assert_eq!(args.refresh_token_ttl_seconds, 3600);
                Ok(())
            },
        )
    }

    #[test]
    fn blank_dsn_means_memory_store() -> Result<()> {
        temp_env::with_vars([("AUTHGATE_DSN", Some("  "))], || {
            let matches = crate::cli::commands::new().get_matches_from(vec!["authgate"]);
            let Action::Server(args) = handler(&matches)?;
            assert!(args.dsn.is_none());
            Ok(())
        })
    }
}
