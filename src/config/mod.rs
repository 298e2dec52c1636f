//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{net::SocketAddr, num::NonZeroU32, path::PathBuf, str::FromStr, time::Duration};

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "akasite";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_PUBLIC_URL: &str = "http://127.0.0.1:3000";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 8;
const DEFAULT_SESSION_RECHECK_SECS: u64 = 30;
const DEFAULT_CACHE_MAX_AGE_SECS: u64 = 300;
const DEFAULT_LIVE_KEEPALIVE_SECS: u64 = 15;
const DEFAULT_SEED_ADMIN_EMAIL: &str = "admin@akacorptech.com";

/// Command-line arguments for the akasite binary.
#[derive(Debug, Parser)]
#[command(name = "akasite", version, about = "AKACorpTech website server")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "AKASITE_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the website and admin panel.
    Serve(Box<ServeArgs>),
    /// Apply database migrations and exit.
    Migrate(MigrateArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct DatabaseOverride {
    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub database: DatabaseOverride,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the externally visible base URL (used for auth email redirects).
    #[arg(long = "public-url", value_name = "URL")]
    pub public_url: Option<String>,

    /// Toggle the `Secure` attribute on session cookies.
    #[arg(
        long = "secure-cookies",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub secure_cookies: Option<bool>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Select the backend (postgres|memory).
    #[arg(long = "backend", value_name = "KIND")]
    pub backend: Option<String>,

    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,

    /// Override the database pool size.
    #[arg(long = "database-max-connections", value_name = "COUNT")]
    pub database_max_connections: Option<u32>,

    /// Override the auth provider base URL.
    #[arg(long = "auth-url", value_name = "URL")]
    pub auth_url: Option<String>,

    /// Override the auth provider API key.
    #[arg(long = "auth-api-key", env = "AKASITE_AUTH_API_KEY", value_name = "KEY")]
    pub auth_api_key: Option<String>,

    /// Override how often live admin views re-check the session.
    #[arg(long = "auth-session-recheck-seconds", value_name = "SECONDS")]
    pub auth_session_recheck_seconds: Option<u64>,

    /// Override the query cache safety-net expiry (0 disables expiry).
    #[arg(long = "cache-max-age-seconds", value_name = "SECONDS")]
    pub cache_max_age_seconds: Option<u64>,
}

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub backend: BackendKind,
    pub seed_admin: SeedAdmin,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    pub cache: CacheSettings,
    pub live: LiveSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub graceful_shutdown: Duration,
    pub public_url: Url,
    pub secure_cookies: bool,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

/// Which backend implementation serves auth, store and change feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Postgres,
    Memory,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" | "in-memory" => Ok(Self::Memory),
            other => Err(format!("unknown backend `{other}`")),
        }
    }
}

/// Account created at startup by the memory backend.
#[derive(Debug, Clone)]
pub struct SeedAdmin {
    pub email: String,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: NonZeroU32,
}

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub url: Option<Url>,
    pub api_key: Option<String>,
    pub session_recheck: Duration,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// `None` keeps entries until they are invalidated.
    pub max_age: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct LiveSettings {
    pub keepalive: Duration,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("AKASITE").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Migrate(args)) => raw.apply_database_override(&args.database),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    backend: RawBackendSettings,
    database: RawDatabaseSettings,
    auth: RawAuthSettings,
    cache: RawCacheSettings,
    live: RawLiveSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(seconds) = overrides.server_graceful_shutdown_seconds {
            self.server.graceful_shutdown_seconds = Some(seconds);
        }
        if let Some(url) = overrides.public_url.as_ref() {
            self.server.public_url = Some(url.clone());
        }
        if let Some(secure) = overrides.secure_cookies {
            self.server.secure_cookies = Some(secure);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(kind) = overrides.backend.as_ref() {
            self.backend.kind = Some(kind.clone());
        }
        if let Some(url) = overrides.database_url.as_ref() {
            self.database.url = Some(url.clone());
        }
        if let Some(max) = overrides.database_max_connections {
            self.database.max_connections = Some(max);
        }
        if let Some(url) = overrides.auth_url.as_ref() {
            self.auth.url = Some(url.clone());
        }
        if let Some(key) = overrides.auth_api_key.as_ref() {
            self.auth.api_key = Some(key.clone());
        }
        if let Some(seconds) = overrides.auth_session_recheck_seconds {
            self.auth.session_recheck_seconds = Some(seconds);
        }
        if let Some(seconds) = overrides.cache_max_age_seconds {
            self.cache.max_age_seconds = Some(seconds);
        }
    }

    fn apply_database_override(&mut self, overrides: &DatabaseOverride) {
        if let Some(url) = overrides.database_url.as_ref() {
            self.database.url = Some(url.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            backend,
            database,
            auth,
            cache,
            live,
        } = raw;

        let seed_admin = SeedAdmin {
            email: blank_to_none(backend.seed_admin_email.clone())
                .unwrap_or_else(|| DEFAULT_SEED_ADMIN_EMAIL.to_string()),
            password: blank_to_none(backend.seed_admin_password.clone()),
        };

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            backend: build_backend_kind(backend)?,
            seed_admin,
            database: build_database_settings(database)?,
            auth: build_auth_settings(auth)?,
            cache: build_cache_settings(cache),
            live: build_live_settings(live)?,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    if graceful_secs == 0 {
        return Err(LoadError::invalid(
            "server.graceful_shutdown_seconds",
            "must be greater than zero",
        ));
    }

    let public_url = server
        .public_url
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_PUBLIC_URL);
    let mut public_url = Url::parse(public_url)
        .map_err(|err| LoadError::invalid("server.public_url", format!("invalid url: {err}")))?;
    if public_url.cannot_be_a_base() {
        return Err(LoadError::invalid(
            "server.public_url",
            "must be an absolute http(s) url",
        ));
    }
    ensure_trailing_slash(&mut public_url);

    Ok(ServerSettings {
        addr,
        graceful_shutdown: Duration::from_secs(graceful_secs),
        public_url,
        secure_cookies: server.secure_cookies.unwrap_or(false),
    })
}

/// Relative joins keep the base path only when it ends with `/`.
fn ensure_trailing_slash(url: &mut Url) {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_backend_kind(backend: RawBackendSettings) -> Result<BackendKind, LoadError> {
    match backend.kind {
        Some(kind) => {
            BackendKind::from_str(&kind).map_err(|reason| LoadError::invalid("backend.kind", reason))
        }
        None => Ok(BackendKind::Postgres),
    }
}

fn build_database_settings(database: RawDatabaseSettings) -> Result<DatabaseSettings, LoadError> {
    let url = blank_to_none(database.url);
    let max_value = database
        .max_connections
        .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS);
    let max_connections = non_zero_u32(max_value.into(), "database.max_connections")?;

    Ok(DatabaseSettings {
        url,
        max_connections,
    })
}

fn build_auth_settings(auth: RawAuthSettings) -> Result<AuthSettings, LoadError> {
    let url = match blank_to_none(auth.url) {
        Some(value) => {
            let mut parsed = Url::parse(&value)
                .map_err(|err| LoadError::invalid("auth.url", format!("invalid url: {err}")))?;
            if parsed.cannot_be_a_base() {
                return Err(LoadError::invalid("auth.url", "must be an absolute url"));
            }
            ensure_trailing_slash(&mut parsed);
            Some(parsed)
        }
        None => None,
    };

    let recheck_secs = auth
        .session_recheck_seconds
        .unwrap_or(DEFAULT_SESSION_RECHECK_SECS);
    if recheck_secs == 0 {
        return Err(LoadError::invalid(
            "auth.session_recheck_seconds",
            "must be greater than zero",
        ));
    }

    Ok(AuthSettings {
        url,
        api_key: blank_to_none(auth.api_key),
        session_recheck: Duration::from_secs(recheck_secs),
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> CacheSettings {
    let seconds = cache.max_age_seconds.unwrap_or(DEFAULT_CACHE_MAX_AGE_SECS);
    CacheSettings {
        max_age: (seconds > 0).then(|| Duration::from_secs(seconds)),
    }
}

fn build_live_settings(live: RawLiveSettings) -> Result<LiveSettings, LoadError> {
    let seconds = live
        .keepalive_seconds
        .unwrap_or(DEFAULT_LIVE_KEEPALIVE_SECS);
    if seconds == 0 {
        return Err(LoadError::invalid(
            "live.keepalive_seconds",
            "must be greater than zero",
        ));
    }
    Ok(LiveSettings {
        keepalive: Duration::from_secs(seconds),
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
    public_url: Option<String>,
    secure_cookies: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawBackendSettings {
    kind: Option<String>,
    seed_admin_email: Option<String>,
    seed_admin_password: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawDatabaseSettings {
    url: Option<String>,
    max_connections: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawAuthSettings {
    url: Option<String>,
    api_key: Option<String>,
    session_recheck_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    max_age_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLiveSettings {
    keepalive_seconds: Option<u64>,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn non_zero_u32(value: u64, key: &'static str) -> Result<NonZeroU32, LoadError> {
    if value == 0 {
        return Err(LoadError::invalid(key, "must be greater than zero"));
    }
    let value_u32: u32 = value
        .try_into()
        .map_err(|_| LoadError::invalid(key, "value exceeds supported range for u32"))?;
    NonZeroU32::new(value_u32).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_take_highest_precedence() {
        let mut raw = RawSettings::default();
        raw.server.port = Some(4000);
        raw.logging.level = Some("info".to_string());

        let overrides = ServeOverrides {
            server_port: Some(4321),
            log_level: Some("debug".to_string()),
            ..Default::default()
        };

        raw.apply_serve_overrides(&overrides);
        let settings = Settings::from_raw(raw).expect("valid settings");

        assert_eq!(settings.server.addr.port(), 4321);
        assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    }

    #[test]
    fn defaults_select_postgres_with_expiring_cache() {
        let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

        assert_eq!(settings.backend, BackendKind::Postgres);
        assert_eq!(
            settings.cache.max_age,
            Some(Duration::from_secs(DEFAULT_CACHE_MAX_AGE_SECS))
        );
        assert_eq!(settings.server.public_url.as_str(), "http://127.0.0.1:3000/");
        assert!(!settings.server.secure_cookies);
    }

    #[test]
    fn zero_cache_age_disables_expiry() {
        let mut raw = RawSettings::default();
        raw.apply_serve_overrides(&ServeOverrides {
            cache_max_age_seconds: Some(0),
            ..Default::default()
        });

        let settings = Settings::from_raw(raw).expect("valid settings");
        assert!(settings.cache.max_age.is_none());
    }

    #[test]
    fn auth_url_gains_trailing_slash() {
        let mut raw = RawSettings::default();
        raw.auth.url = Some("https://project.supabase.co/auth/v1".to_string());

        let settings = Settings::from_raw(raw).expect("valid settings");
        let url = settings.auth.url.expect("auth url");
        assert_eq!(url.as_str(), "https://project.supabase.co/auth/v1/");
        assert_eq!(
            url.join("token").expect("join").as_str(),
            "https://project.supabase.co/auth/v1/token"
        );
    }

    #[test]
    fn path_prefixed_public_url_keeps_its_prefix() {
        let mut raw = RawSettings::default();
        raw.server.public_url = Some("https://host.example/site".to_string());

        let settings = Settings::from_raw(raw).expect("valid settings");
        let url = settings.server.public_url;
        assert_eq!(url.as_str(), "https://host.example/site/");
        assert_eq!(
            url.join("admin/dashboard").expect("join").as_str(),
            "https://host.example/site/admin/dashboard"
        );
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let mut raw = RawSettings::default();
        raw.backend.kind = Some("sqlite".to_string());

        let err = Settings::from_raw(raw).expect_err("invalid backend");
        assert!(matches!(
            err,
            LoadError::Invalid {
                key: "backend.kind",
                ..
            }
        ));
    }

    #[test]
    fn zero_session_recheck_is_rejected() {
        let mut raw = RawSettings::default();
        raw.auth.session_recheck_seconds = Some(0);

        assert!(Settings::from_raw(raw).is_err());
    }

    #[test]
    fn cli_json_logging_enforces_format() {
        let mut raw = RawSettings::default();
        let overrides = ServeOverrides {
            log_json: Some(true),
            ..Default::default()
        };

        raw.apply_serve_overrides(&overrides);
        let settings = Settings::from_raw(raw).expect("valid settings");

        assert!(matches!(settings.logging.format, LogFormat::Json));
    }

    #[test]
    fn default_to_serve_command() {
        let args = CliArgs::parse_from(["akasite"]);
        let command = args
            .command
            .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
        assert!(matches!(command, Command::Serve(_)));
    }

    #[test]
    fn parse_serve_overrides() {
        let args = CliArgs::parse_from([
            "akasite",
            "serve",
            "--server-host",
            "0.0.0.0",
            "--backend",
            "memory",
            "--secure-cookies",
            "true",
        ]);

        match args.command.expect("serve command") {
            Command::Serve(serve) => {
                assert_eq!(serve.overrides.server_host.as_deref(), Some("0.0.0.0"));
                assert_eq!(serve.overrides.backend.as_deref(), Some("memory"));
                assert_eq!(serve.overrides.secure_cookies, Some(true));
            }
            _ => panic!("wrong command parsed"),
        }
    }

    #[test]
    fn parse_migrate_arguments() {
        let args = CliArgs::parse_from([
            "akasite",
            "migrate",
            "--database-url",
            "postgres://example",
        ]);

        match args.command.expect("migrate command") {
            Command::Migrate(migrate) => {
                assert_eq!(
                    migrate.database.database_url.as_deref(),
                    Some("postgres://example")
                );
            }
            _ => panic!("wrong command parsed"),
        }
    }
}
