use crate::{
    account::AccountService,
    api,
    auth::{HashParams, PasswordHasher, SigningKey, TokenIssuer, TokenLifetimes},
    cli::telemetry,
    store::{MemoryUserStore, PgUserStore, UserStore},
};
use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use std::{fs, sync::Arc, time::Duration};
use tracing::{debug, info, warn};
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: Option<SecretString>,
    pub storage_timeout_seconds: u64,
    pub signing_key: Option<SecretString>,
    pub signing_key_path: Option<String>,
    pub access_token_ttl_seconds: u64,
    pub refresh_token_ttl_seconds: u64,
    pub hash_memory_kib: u32,
    pub hash_iterations: u32,
    pub hash_parallelism: u32,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the signing key or hasher cannot be initialized, the
/// database is unreachable, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let key = Arc::new(load_signing_key(&args)?);
    info!(kid = key.kid(), "Token signing key ready");

    let hasher = PasswordHasher::new(HashParams {
        memory_kib: args.hash_memory_kib,
        iterations: args.hash_iterations,
        parallelism: args.hash_parallelism,
    })
    .context("Invalid password hashing parameters")?;
    debug!(params = ?hasher.params(), "Password hasher ready");

    let issuer = TokenIssuer::new(
        key,
        TokenLifetimes {
            access: Duration::from_secs(args.access_token_ttl_seconds),
            refresh: Duration::from_secs(args.refresh_token_ttl_seconds),
        },
    );

    let storage_timeout = Duration::from_secs(args.storage_timeout_seconds);
    let store = open_store(args.dsn.as_ref(), storage_timeout).await?;

    let accounts = AccountService::new(store, Arc::new(hasher), Arc::new(issuer))
        .with_storage_timeout(storage_timeout);

    let result = api::serve(args.port, Arc::new(accounts)).await;

    telemetry::shutdown_tracer();

    result
}

fn load_signing_key(args: &Args) -> Result<SigningKey> {
    if let Some(path) = &args.signing_key_path {
        let pem = fs::read_to_string(path)
            .with_context(|| format!("Failed to read signing key file: {path}"))?;
        return SigningKey::from_pem(&pem)
            .with_context(|| format!("Invalid signing key in {path}"));
    }

    if let Some(encoded) = &args.signing_key {
        return SigningKey::from_base64(encoded.expose_secret())
            .context("Invalid AUTHGATE_SIGNING_KEY");
    }

    warn!("No signing key configured, generating an ephemeral one; tokens will not survive a restart");
    SigningKey::generate().context("Failed to generate signing key")
}

async fn open_store(
    dsn: Option<&SecretString>,
    storage_timeout: Duration,
) -> Result<Arc<dyn UserStore>> {
    let Some(dsn) = dsn else {
        warn!("No DSN configured, accounts are kept in memory");
        return Ok(Arc::new(MemoryUserStore::new()));
    };

    info!("Connecting to {}", redact_dsn(dsn.expose_secret()));

    let store = PgUserStore::connect(dsn.expose_secret(), storage_timeout)
        .await
        .context("Failed to connect to database")?;
    store
        .ensure_schema()
        .await
        .context("Failed to create database schema")?;

    Ok(Arc::new(store))
}

/// DSN safe for logs: the password, if any, is masked.
fn redact_dsn(dsn: &str) -> String {
    match Url::parse(dsn) {
        Ok(mut url) => {
            if url.password().is_some() {
                let _ = url.set_password(Some("***"));
            }
            url.to_string()
        }
        Err(_) => "<unparsable dsn>".to_string(),
    }
}
