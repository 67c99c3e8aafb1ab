use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use pamsync_core::AppError;
use pamsync_domain::SafeCatalog;
use pamsync_infrastructure::{PamClientConfig, TokenCacheMode};
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Debug, Clone)]
pub struct ConnectorConfig {
    pub pam: PamClientConfig,
    pub catalog: SafeCatalog,
    pub connector_host: String,
    pub connector_port: u16,
}

impl ConnectorConfig {
    pub fn load() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let tenant_url = required_non_empty(&lookup, "PAM_TENANT_URL")?;
        let tenant_url = Url::parse(tenant_url.trim()).map_err(|error| {
            AppError::Validation(format!("invalid PAM_TENANT_URL '{tenant_url}': {error}"))
        })?;
        if tenant_url.cannot_be_a_base() {
            return Err(AppError::Validation(format!(
                "PAM_TENANT_URL '{tenant_url}' must be an absolute http(s) URL"
            )));
        }

        let pam = PamClientConfig {
            tenant_url,
            client_id: required_non_empty(&lookup, "PAM_CLIENT_ID")?,
            client_secret: required_non_empty(&lookup, "PAM_CLIENT_SECRET")?,
            oauth_app_id: required_non_empty(&lookup, "PAM_OAUTH_APP_ID")?,
            oauth_scope: required_non_empty(&lookup, "PAM_OAUTH_SCOPE")?,
            directory_service_id: required_non_empty(&lookup, "PAM_DIRECTORY_SERVICE_ID")?,
            accept_invalid_certs: flag(&lookup, "PAM_IGNORE_TLS"),
            token_cache: if flag(&lookup, "PAM_TOKEN_CACHE") {
                TokenCacheMode::Cached
            } else {
                TokenCacheMode::PerRequest
            },
        };

        let roles_json = lookup("PAM_SAFE_ROLES").unwrap_or_else(|| "[]".to_owned());
        let rights_json = lookup("PAM_SAFE_RIGHTS").unwrap_or_else(|| "[]".to_owned());
        let catalog = SafeCatalog::from_json(roles_json.as_str(), rights_json.as_str())?;

        let connector_host = lookup("CONNECTOR_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let connector_port = match lookup("CONNECTOR_PORT") {
            Some(value) => value.trim().parse::<u16>().map_err(|error| {
                AppError::Validation(format!("invalid CONNECTOR_PORT '{value}': {error}"))
            })?,
            None => 3100,
        };

        Ok(Self {
            pam,
            catalog,
            connector_host,
            connector_port,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.connector_host).map_err(|error| {
            AppError::Validation(format!(
                "invalid CONNECTOR_HOST '{}': {error}",
                self.connector_host
            ))
        })?;
        Ok(SocketAddr::from((host, self.connector_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_non_empty<F>(lookup: &F, name: &str) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

fn flag<F>(lookup: &F, name: &str) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
}
