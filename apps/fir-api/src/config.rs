//! Command-line and environment configuration
//!
//! Every flag has an environment fallback so the server can be driven from
//! a `.env` file. Signing keys and the user table are never compiled in:
//! secured mode refuses to start without them.

use std::path::PathBuf;

use chrono::Duration;
use clap::{Parser, Subcommand, ValueEnum};
use fir_auth::MIN_SECRET_LEN;
use fir_pdf::FirLayout;
use serde::Serialize;
use thiserror::Error;

/// Command-line arguments for the FIR API server
#[derive(Parser, Debug)]
#[command(name = "fir-api")]
#[command(about = "PDF text extraction and FIR report generation API")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub serve: ServeArgs,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print an Argon2id hash for use in the users file
    HashPassword {
        /// Plaintext password to hash
        password: String,
    },
}

/// Which variant of the service to run
#[derive(ValueEnum, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Token-protected endpoints with an audit trail
    Secured,
    /// Unauthenticated endpoints, no audit trail
    Open,
}

impl Mode {
    pub fn default_layout(self) -> FirLayout {
        match self {
            Mode::Secured => FirLayout::Summary,
            Mode::Open => FirLayout::Detailed,
        }
    }
}

#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    /// Service variant
    #[arg(long, env = "FIR_MODE", value_enum, default_value_t = Mode::Secured)]
    pub mode: Mode,

    /// FIR template; defaults to `summary` when secured, `detailed` when open
    #[arg(long, env = "FIR_LAYOUT", value_parser = parse_layout)]
    pub layout: Option<FirLayout>,

    /// Host address to bind to
    #[arg(long, env = "FIR_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "8000")]
    pub port: u16,

    /// Directory generated PDFs are written to and served from
    #[arg(long, env = "FIR_OUTPUT_DIR", default_value = "generated_pdfs")]
    pub output_dir: PathBuf,

    /// Directory for transient upload files (system temp dir if unset)
    #[arg(long, env = "FIR_TEMP_DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Audit database URL
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:audit.db")]
    pub database_url: String,

    /// JSON file with the user table (secured mode)
    #[arg(long, env = "FIR_USERS_FILE")]
    pub users_file: Option<PathBuf>,

    /// HS256 signing key, at least 32 bytes (secured mode)
    #[arg(long, env = "FIR_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Access token lifetime in minutes
    #[arg(long, env = "FIR_TOKEN_TTL_MINUTES", default_value = "30")]
    pub token_ttl_minutes: i64,

    /// Largest accepted request body in megabytes
    #[arg(long, env = "FIR_MAX_UPLOAD_MB", default_value = "25")]
    pub max_upload_mb: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_layout(value: &str) -> Result<FirLayout, String> {
    match value.to_ascii_lowercase().as_str() {
        "summary" => Ok(FirLayout::Summary),
        "detailed" => Ok(FirLayout::Detailed),
        other => Err(format!(
            "invalid layout '{}'; expected 'summary' or 'detailed'",
            other
        )),
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("secured mode requires FIR_JWT_SECRET (or --jwt-secret)")]
    MissingSecret,

    #[error("FIR_JWT_SECRET must be at least {0} bytes")]
    WeakSecret(usize),

    #[error("secured mode requires FIR_USERS_FILE (or --users-file)")]
    MissingUsersFile,

    #[error("token lifetime must be positive, got {0} minutes")]
    InvalidTokenTtl(i64),
}

/// Settings for the token-protected variant
#[derive(Clone)]
pub struct AuthConfig {
    pub users_file: Option<PathBuf>,
    pub jwt_secret: String,
    pub token_ttl: Duration,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("users_file", &self.users_file)
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

/// Validated server configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mode: Mode,
    pub layout: FirLayout,
    pub host: String,
    pub port: u16,
    pub output_dir: PathBuf,
    pub temp_dir: PathBuf,
    pub database_url: String,
    pub max_upload_bytes: usize,
    pub auth: Option<AuthConfig>,
}

impl AppConfig {
    pub fn from_args(args: ServeArgs) -> Result<Self, ConfigError> {
        let auth = match args.mode {
            Mode::Open => None,
            Mode::Secured => {
                let jwt_secret = args.jwt_secret.ok_or(ConfigError::MissingSecret)?;
                if jwt_secret.len() < MIN_SECRET_LEN {
                    return Err(ConfigError::WeakSecret(MIN_SECRET_LEN));
                }
                let users_file = args.users_file.ok_or(ConfigError::MissingUsersFile)?;
                if args.token_ttl_minutes <= 0 {
                    return Err(ConfigError::InvalidTokenTtl(args.token_ttl_minutes));
                }
                Some(AuthConfig {
                    users_file: Some(users_file),
                    jwt_secret,
                    token_ttl: Duration::minutes(args.token_ttl_minutes),
                })
            }
        };

        Ok(Self {
            mode: args.mode,
            layout: args.layout.unwrap_or_else(|| args.mode.default_layout()),
            host: args.host,
            port: args.port,
            output_dir: args.output_dir,
            temp_dir: args.temp_dir.unwrap_or_else(std::env::temp_dir),
            database_url: args.database_url,
            max_upload_bytes: args.max_upload_mb * 1024 * 1024,
            auth,
        })
    }
}
