//! Token signing and password hashing arguments.

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_SIGNING_KEY: &str = "signing-key";
pub const ARG_SIGNING_KEY_PATH: &str = "signing-key-path";
pub const ARG_ACCESS_TOKEN_TTL: &str = "access-token-ttl-seconds";
pub const ARG_REFRESH_TOKEN_TTL: &str = "refresh-token-ttl-seconds";
pub const ARG_HASH_MEMORY_KIB: &str = "hash-memory-kib";
pub const ARG_HASH_ITERATIONS: &str = "hash-iterations";
pub const ARG_HASH_PARALLELISM: &str = "hash-parallelism";

#[derive(Debug)]
pub struct Options {
    pub signing_key: Option<SecretString>,
    pub signing_key_path: Option<String>,
    pub access_token_ttl_seconds: u64,
    pub refresh_token_ttl_seconds: u64,
    pub hash_memory_kib: u32,
    pub hash_iterations: u32,
    pub hash_parallelism: u32,
}

impl Options {
    /// # Errors
    /// Returns an error if a defaulted argument is missing from the matches.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let required_u64 = |name: &str| -> Result<u64> {
            matches
                .get_one::<u64>(name)
                .copied()
                .with_context(|| format!("missing required argument: --{name}"))
        };
        let required_u32 = |name: &str| -> Result<u32> {
            matches
                .get_one::<u32>(name)
                .copied()
                .with_context(|| format!("missing required argument: --{name}"))
        };

        Ok(Self {
            signing_key: matches
                .get_one::<String>(ARG_SIGNING_KEY)
                .map(|key| SecretString::from(key.clone())),
            signing_key_path: matches.get_one::<String>(ARG_SIGNING_KEY_PATH).cloned(),
            access_token_ttl_seconds: required_u64(ARG_ACCESS_TOKEN_TTL)?,
            refresh_token_ttl_seconds: required_u64(ARG_REFRESH_TOKEN_TTL)?,
            hash_memory_kib: required_u32(ARG_HASH_MEMORY_KIB)?,
            hash_iterations: required_u32(ARG_HASH_ITERATIONS)?,
            hash_parallelism: required_u32(ARG_HASH_PARALLELISM)?,
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    let command = with_signing_args(command);
    with_hashing_args(command)
}

fn with_signing_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SIGNING_KEY)
                .long(ARG_SIGNING_KEY)
                .help("Base64 PKCS#8 DER P-256 private key used to sign tokens")
                .long_help(
                    "Base64 PKCS#8 DER P-256 private key used to sign tokens. \
                     If neither this nor --signing-key-path is set, an ephemeral key is generated \
                     and tokens do not survive a restart.",
                )
                .env("AUTHGATE_SIGNING_KEY")
                .hide_env_values(true)
                .conflicts_with(ARG_SIGNING_KEY_PATH),
        )
        .arg(
            Arg::new(ARG_SIGNING_KEY_PATH)
                .long(ARG_SIGNING_KEY_PATH)
                .help("Path to a PKCS#8 PEM P-256 private key used to sign tokens")
                .env("AUTHGATE_SIGNING_KEY_PATH"),
        )
        .arg(
            Arg::new(ARG_ACCESS_TOKEN_TTL)
                .long(ARG_ACCESS_TOKEN_TTL)
                .help("Access token lifetime in seconds")
                .env("AUTHGATE_ACCESS_TOKEN_TTL_SECONDS")
                .default_value("86400")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_REFRESH_TOKEN_TTL)
                .long(ARG_REFRESH_TOKEN_TTL)
                .help("Refresh token lifetime in seconds")
                .env("AUTHGATE_REFRESH_TOKEN_TTL_SECONDS")
                .default_value("604800")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}

fn with_hashing_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_HASH_MEMORY_KIB)
                .long(ARG_HASH_MEMORY_KIB)
                .help("Argon2id memory cost in KiB")
                .env("AUTHGATE_HASH_MEMORY_KIB")
                .default_value("19456")
                .value_parser(clap::value_parser!(u32).range(8..)),
        )
        .arg(
            Arg::new(ARG_HASH_ITERATIONS)
                .long(ARG_HASH_ITERATIONS)
                .help("Argon2id iterations")
                .env("AUTHGATE_HASH_ITERATIONS")
                .default_value("2")
                .value_parser(clap::value_parser!(u32).range(1..)),
        )
        .arg(
            Arg::new(ARG_HASH_PARALLELISM)
                .long(ARG_HASH_PARALLELISM)
                .help("Argon2id lanes")
                .env("AUTHGATE_HASH_PARALLELISM")
                .default_value("1")
                .value_parser(clap::value_parser!(u32).range(1..)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::{DEFAULT_ITERATIONS, DEFAULT_MEMORY_KIB, DEFAULT_PARALLELISM};
    use secrecy::ExposeSecret;

    fn command() -> Command {
        with_args(Command::new("authgate"))
    }

    #[test]
    fn defaults() -> Result<()> {
        temp_env::with_vars_unset(
            [
                "AUTHGATE_SIGNING_KEY",
                "AUTHGATE_SIGNING_KEY_PATH",
                "AUTHGATE_ACCESS_TOKEN_TTL_SECONDS",
                "AUTHGATE_REFRESH_TOKEN_TTL_SECONDS",
                "AUTHGATE_HASH_MEMORY_KIB",
                "AUTHGATE_HASH_ITERATIONS",
                "AUTHGATE_HASH_PARALLELISM",
            ],
            || {
                let matches = command().get_matches_from(vec!["authgate"]);
                let options = Options::parse(&matches)?;
                assert!(options.signing_key.is_none());
                assert!(options.signing_key_path.is_none());
                assert_eq!(options.access_token_ttl_seconds, 86_400);
                assert_eq!(options.refresh_token_ttl_seconds, 604_800);
                assert_eq!(options.hash_memory_kib, DEFAULT_MEMORY_KIB);
                assert_eq!(options.hash_iterations, DEFAULT_ITERATIONS);
                assert_eq!(options.hash_parallelism, DEFAULT_PARALLELISM);
                Ok(())
            },
        )
    }

    #[test]
    fn env_overrides() -> Result<()> {
        temp_env::with_vars(
            [
                ("AUTHGATE_SIGNING_KEY", Some("c2VjcmV0")),
                ("AUTHGATE_SIGNING_KEY_PATH", None),
                ("AUTHGATE_ACCESS_TOKEN_TTL_SECONDS", Some("60")),
                ("AUTHGATE_HASH_ITERATIONS", Some("3")),
            ],
            || {
                let matches = command().get_matches_from(vec!["authgate"]);
                let options = Options::parse(&matches)?;
                assert_eq!(
                    options.signing_key.as_ref().map(|key| key.expose_secret()),
                    Some("c2VjcmV0")
                );
                assert_eq!(options.access_token_ttl_seconds, 60);
                assert_eq!(options.hash_iterations, 3);
                Ok(())
            },
        )
    }

    #[test]
    fn signing_key_sources_conflict() {
        let result = command().try_get_matches_from(vec![
            "authgate",
            "--signing-key",
            "c2VjcmV0",
            "--signing-key-path",
            "/tmp/key.pem",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn zero_ttl_rejected() {
        let result =
            command().try_get_matches_from(vec!["authgate", "--access-token-ttl-seconds", "0"]);
        assert!(result.is_err());
    }
}
