use url::Url;

/// Whether access tokens are reused across calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenCacheMode {
    /// Request a fresh token before every call.
    #[default]
    PerRequest,
    /// Reuse a token until shortly before it expires.
    Cached,
}

/// Connection settings for one PAM tenant.
#[derive(Clone)]
pub struct PamClientConfig {
    /// Tenant base URL, e.g. `https://tenant.example.com`.
    pub tenant_url: Url,
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// OAuth application id appended to the token path.
    pub oauth_app_id: String,
    /// OAuth scope requested with the token.
    pub oauth_scope: String,
    /// Directory service searched when provisioning new users.
    pub directory_service_id: String,
    /// Disables TLS certificate verification for this client only.
    pub accept_invalid_certs: bool,
    /// Token reuse policy.
    pub token_cache: TokenCacheMode,
}

impl std::fmt::Debug for PamClientConfig {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("PamClientConfig")
            .field("tenant_url", &self.tenant_url.as_str())
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("oauth_app_id", &self.oauth_app_id)
            .field("oauth_scope", &self.oauth_scope)
            .field("directory_service_id", &self.directory_service_id)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("token_cache", &self.token_cache)
            .finish()
    }
}
