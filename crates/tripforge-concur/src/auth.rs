//! OAuth2 credential provider: authorization-code grant to connect, silent
//! refresh-token grant when the stored access token has lapsed.

use crate::settings::ConcurSettings;
use crate::store::{CredentialStore, StoreError};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::info;
use tripforge_core::model::Credential;
use url::Url;

/// Tokens about to lapse within this margin are refreshed up front rather
/// than risking a mid-run expiry.
const EXPIRY_SKEW_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token endpoint rejected the request ({status}): {body}")]
    Endpoint { status: u16, body: String },
    #[error("Token request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Authorization URL could not be built: {0}")]
    Url(#[from] url::ParseError),
}

/// Short-lived view of a usable credential, borrowed for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiAccess {
    pub token: String,
    pub api_base: String,
}

/// Outcome of asking the provider for a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenState {
    Ready(ApiAccess),
    /// No stored credential and no way to mint one silently; the user has
    /// to go through the authorization-code flow.
    AuthRequired,
}

#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn get_token(&mut self) -> Result<TokenState, AuthError>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: u64,
    /// Concur returns the tenant's home API host here; subsequent calls
    /// must go to it rather than the login host.
    #[serde(default)]
    geolocation: Option<String>,
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Credential provider backed by Concur's OAuth2 endpoints and a local
/// credential store.
pub struct ConcurAuth {
    settings: ConcurSettings,
    store: Box<dyn CredentialStore>,
    http: reqwest::Client,
}

impl ConcurAuth {
    pub fn new(settings: ConcurSettings, store: Box<dyn CredentialStore>) -> Self {
        ConcurAuth {
            settings,
            store,
            http: reqwest::Client::new(),
        }
    }

    /// URL the user opens in a browser to grant access.
    pub fn authorize_url(&self) -> Result<Url, AuthError> {
        let mut url = Url::parse(&self.settings.authorize_endpoint())?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.settings.client_id)
            .append_pair("redirect_uri", &self.settings.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", "travelrequest.write");
        Ok(url)
    }

    /// Exchange an authorization code for a credential and persist it.
    pub async fn exchange_code(&mut self, code: &str) -> Result<Credential, AuthError> {
        let response = self
            .http
            .post(self.settings.token_endpoint())
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", &self.settings.client_id),
                ("client_secret", &self.settings.client_secret),
                ("redirect_uri", &self.settings.redirect_uri),
            ])
            .send()
            .await?;
        let credential = self.read_token_response(response).await?;
        self.store.save(&credential).await?;
        Ok(credential)
    }

    /// Drop the stored credential, forcing a fresh authorization.
    pub async fn disconnect(&mut self) -> Result<(), AuthError> {
        self.store.clear().await?;
        Ok(())
    }

    async fn refresh(&mut self, credential: &Credential) -> Result<Credential, AuthError> {
        info!("Access token expired, refreshing...");
        let response = self
            .http
            .post(self.settings.token_endpoint())
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", &credential.refresh_token),
                ("client_id", &self.settings.client_id),
                ("client_secret", &self.settings.client_secret),
            ])
            .send()
            .await?;
        let refreshed = self.read_token_response(response).await?;
        self.store.save(&refreshed).await?;
        Ok(refreshed)
    }

    async fn read_token_response(
        &self,
        response: reqwest::Response,
    ) -> Result<Credential, AuthError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Endpoint {
                status: status.as_u16(),
                body,
            });
        }
        let token: TokenResponse = response.json().await?;
        Ok(Credential {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at: now_unix().saturating_add(token.expires_in),
            api_base: token
                .geolocation
                .unwrap_or_else(|| self.settings.api_base.clone()),
        })
    }
}

#[async_trait]
impl CredentialProvider for ConcurAuth {
    async fn get_token(&mut self) -> Result<TokenState, AuthError> {
        let Some(credential) = self.store.load().await? else {
            return Ok(TokenState::AuthRequired);
        };

        let credential = if credential.is_expired(now_unix(), EXPIRY_SKEW_SECS) {
            self.refresh(&credential).await?
        } else {
            credential
        };

        Ok(TokenState::Ready(ApiAccess {
            token: credential.access_token,
            api_base: credential.api_base,
        }))
    }
}
