// # bao - one-shot dynamic DNS updater
//
// A thin integration layer: it reads configuration, builds the IP source and
// the provider, runs exactly one reconcile pass and exits. All reconcile,
// retry and comparison logic lives in bao-core.
//
// ## Configuration
//
// Every setting is an environment variable. Variables missing from the
// process environment are filled from a dotenv file (`BAO_ENV_FILE`,
// default `.env`); the file never overrides a variable that is already set.
//
// ### Provider
// - `BAO_ACCESS_KEY_ID`: Access key ID (required)
// - `BAO_ACCESS_KEY_SECRET`: Access key secret (required)
// - `BAO_ENDPOINT`: Alidns endpoint, host or URL (required)
// - `BAO_RECORD_ID`: ID of the record to reconcile (required)
//
// ### IP lookup
// - `BAO_IP_SERVICE_URL`: Plain-text "what is my IP" URL (required)
// - `BAO_USER_AGENT`: `User-Agent` sent to the lookup service (default `curl`)
// - `BAO_IP_VERSION`: `v4`, `v6` or `any` (default `any`)
//
// ### Pass
// - `BAO_MAX_ATTEMPTS`: Attempts for the lookup and the record read, 1-10 (default 3)
// - `BAO_RETRY_DELAY_SECS`: Linear backoff base in seconds, 0-300 (default 1)
// - `BAO_MODE`: `live` or `dry-run` (default `live`)
// - `BAO_LOG_LEVEL`: trace, debug, info, warn or error (default `info`)
//
// ## Example
//
// ```bash
// export BAO_ACCESS_KEY_ID=LTAI...
// export BAO_ACCESS_KEY_SECRET=...
// export BAO_ENDPOINT=alidns.cn-hangzhou.aliyuncs.com
// export BAO_IP_SERVICE_URL=https://ifconfig.me/ip
// export BAO_RECORD_ID=1234567890
//
// bao
// ```

use anyhow::{Context, Result};
use bao_core::config::{BaoConfig, EngineConfig, IpLookupConfig, ProviderConfig, default_user_agent};
use bao_core::{ReconcileOutcome, Reconciler};
use bao_ip_http::HttpIpSource;
use bao_provider_alidns::AlidnsProvider;
use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::process::ExitCode;
use tracing::{Instrument, Level, error, info, info_span};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for the possible ends of a pass
///
/// - 0: Pass completed (record updated, unchanged, or dry-run)
/// - 1: Configuration or startup error, no network call made
/// - 2: Runtime error (lookup, provider or write failure)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BaoExitCode {
    /// Pass completed
    Completed = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error
    RuntimeError = 2,
}

impl From<BaoExitCode> for ExitCode {
    fn from(code: BaoExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

impl From<&bao_core::Error> for BaoExitCode {
    fn from(err: &bao_core::Error) -> Self {
        if err.is_config() {
            BaoExitCode::ConfigError
        } else {
            BaoExitCode::RuntimeError
        }
    }
}

const DEFAULT_ENV_FILE: &str = ".env";

/// Everything read from the environment
#[derive(Debug)]
struct Settings {
    config: BaoConfig,
    log_level: Level,
}

impl Settings {
    /// Load settings, layering the dotenv file under `env_lookup`
    fn load(env_lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let env_file = env_lookup("BAO_ENV_FILE").unwrap_or_else(|| DEFAULT_ENV_FILE.to_string());
        let file_vars = read_env_file(Path::new(&env_file))?;

        Self::from_lookup(|key| env_lookup(key).or_else(|| file_vars.get(key).cloned()))
    }

    /// Build and validate settings from a variable lookup
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        // Blank values count as unset
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            get(key).with_context(|| format!("{} is required. Set it via: export {}=...", key, key))
        };

        let mut engine = EngineConfig::default();
        if let Some(raw) = get("BAO_MAX_ATTEMPTS") {
            engine.max_attempts = raw
                .trim()
                .parse()
                .with_context(|| format!("BAO_MAX_ATTEMPTS must be a number. Got: {}", raw))?;
        }
        if let Some(raw) = get("BAO_RETRY_DELAY_SECS") {
            engine.retry_delay_secs = raw
                .trim()
                .parse()
                .with_context(|| format!("BAO_RETRY_DELAY_SECS must be a number. Got: {}", raw))?;
        }
        if let Some(raw) = get("BAO_MODE") {
            engine.mode = raw.parse()?;
        }

        let mut ip_lookup = IpLookupConfig::new(required("BAO_IP_SERVICE_URL")?);
        ip_lookup.user_agent = get("BAO_USER_AGENT").unwrap_or_else(default_user_agent);
        if let Some(raw) = get("BAO_IP_VERSION") {
            ip_lookup.version = raw.parse()?;
        }

        let config = BaoConfig {
            provider: ProviderConfig {
                access_key_id: required("BAO_ACCESS_KEY_ID")?,
                access_key_secret: required("BAO_ACCESS_KEY_SECRET")?,
                endpoint: required("BAO_ENDPOINT")?,
            },
            ip_lookup,
            record_id: required("BAO_RECORD_ID")?,
            engine,
        };
        config.validate()?;

        let log_level =
            parse_log_level(&get("BAO_LOG_LEVEL").unwrap_or_else(|| "info".to_string()))?;

        Ok(Self { config, log_level })
    }
}

/// Read a dotenv file into a map without touching the process environment
///
/// A missing file yields an empty map.
fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    match dotenvy::from_path_iter(path) {
        Ok(iter) => iter
            .collect::<std::result::Result<HashMap<_, _>, _>>()
            .with_context(|| format!("Malformed env file: {}", path.display())),
        Err(e) if e.not_found() => Ok(HashMap::new()),
        Err(e) => Err(e).with_context(|| format!("Failed to read env file: {}", path.display())),
    }
}

fn parse_log_level(raw: &str) -> Result<Level> {
    match raw.trim().to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "BAO_LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            raw
        ),
    }
}

fn main() -> ExitCode {
    let settings = match Settings::load(|key| env::var(key).ok()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("BAO Configuration error: {:#}", e);
            return BaoExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(settings.log_level)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return BaoExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return BaoExitCode::RuntimeError.into();
        }
    };

    let code = rt.block_on(
        async {
            match run_pass(&settings.config).await {
                Ok(outcome) => {
                    report(&outcome);
                    BaoExitCode::Completed
                }
                Err(e) => {
                    error!("Reconcile pass failed: {}", e);
                    BaoExitCode::from(&e)
                }
            }
        }
        .instrument(info_span!("BAO")),
    );

    code.into()
}

/// Build the collaborators and run one pass
async fn run_pass(config: &BaoConfig) -> bao_core::Result<ReconcileOutcome> {
    let ip_source = HttpIpSource::from_config(&config.ip_lookup)?;
    let provider = AlidnsProvider::from_config(&config.provider)?;

    info!(
        "Reconciling record {} via {} [mode: {:?}]",
        config.record_id,
        provider.endpoint(),
        config.engine.mode
    );

    Reconciler::new(Box::new(ip_source), Box::new(provider), config)?
        .run()
        .await
}

fn report(outcome: &ReconcileOutcome) {
    match outcome {
        ReconcileOutcome::Unchanged { ip } => info!("Done, record already points at {}", ip),
        ReconcileOutcome::Updated { previous, current } => {
            info!("Done, record moved from {} to {}", previous, current)
        }
        ReconcileOutcome::WouldUpdate { previous, current } => {
            info!("Done (dry-run), record would move from {} to {}", previous, current)
        }
    }
}
