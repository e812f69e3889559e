//! Application state for the FIR API

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use fir_auth::{CredentialProvider, StaticCredentials, TokenIssuer};
use fir_pdf::FirRenderer;

use crate::audit::AuditLog;
use crate::auth::Actor;
use crate::config::{AppConfig, Mode};
use crate::error::ApiError;
use crate::storage::DocumentStore;

/// Everything the secured variant needs beyond the open one
pub struct AuthService {
    pub credentials: Arc<dyn CredentialProvider>,
    pub tokens: TokenIssuer,
    pub audit: AuditLog,
}

pub struct AppState {
    pub mode: Mode,
    pub renderer: FirRenderer,
    pub documents: DocumentStore,
    pub auth: Option<AuthService>,
    pub temp_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Build state from config, loading the users file in secured mode
    pub async fn new(config: &AppConfig) -> Result<Self> {
        let credentials = match config.auth.as_ref().and_then(|a| a.users_file.as_ref()) {
            Some(path) => {
                let users = StaticCredentials::from_file(path)
                    .with_context(|| format!("loading users from {}", path.display()))?;
                tracing::info!("Loaded {} user(s) from {}", users.len(), path.display());
                Some(Arc::new(users) as Arc<dyn CredentialProvider>)
            }
            None => None,
        };

        Self::with_credentials(config, credentials).await
    }

    /// Build state with an explicit credential provider
    pub async fn with_credentials(
        config: &AppConfig,
        credentials: Option<Arc<dyn CredentialProvider>>,
    ) -> Result<Self> {
        let documents = DocumentStore::open(&config.output_dir).with_context(|| {
            format!("opening output directory {}", config.output_dir.display())
        })?;
        std::fs::create_dir_all(&config.temp_dir)
            .with_context(|| format!("creating temp directory {}", config.temp_dir.display()))?;

        let auth = match (config.mode, &config.auth) {
            (Mode::Open, _) => None,
            (Mode::Secured, None) => anyhow::bail!("secured mode requires auth settings"),
            (Mode::Secured, Some(auth)) => {
                let credentials =
                    credentials.context("secured mode requires a credential provider")?;
                let tokens = TokenIssuer::new(auth.jwt_secret.as_bytes(), auth.token_ttl)?;

                tracing::info!("Connecting to audit database: {}", config.database_url);
                let audit = AuditLog::connect(&config.database_url).await?;

                Some(AuthService {
                    credentials,
                    tokens,
                    audit,
                })
            }
        };

        Ok(Self {
            mode: config.mode,
            renderer: FirRenderer::new(config.layout),
            documents,
            auth,
            temp_dir: config.temp_dir.clone(),
            max_upload_bytes: config.max_upload_bytes,
        })
    }

    /// Append an audit row for an authenticated actor; anonymous calls are not audited
    pub async fn record(&self, actor: &Actor, action: &str) -> Result<(), ApiError> {
        if let (Actor::User(user), Some(auth)) = (actor, &self.auth) {
            auth.audit.record(&user.username, action).await?;
        }
        Ok(())
    }
}
