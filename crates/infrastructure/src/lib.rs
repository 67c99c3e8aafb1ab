//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod http_pam_gateway;
mod oauth_token_provider;
mod pam_client_config;

pub use http_pam_gateway::HttpPamGateway;
pub use oauth_token_provider::OAuthTokenProvider;
pub use pam_client_config::{PamClientConfig, TokenCacheMode};
