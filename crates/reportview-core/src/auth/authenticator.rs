//! Session authentication against the server's authentication endpoint.
//!
//! [`AuthClient`] is the typed façade over that endpoint, bound to one token
//! like every other client. [`Authenticator`] is the handle callers keep: it
//! builds a short-lived `AuthClient` for whichever token an operation is
//! about, and hands out service clients bound to a token.

use serde_json::json;
use tracing::{debug, warn};

use super::credentials::Credentials;
use super::session::{AuthHandshake, SessionState, SessionToken};
use crate::api::{
    Client, ClientError, Connector, HttpConnector, ProductClient, Transport, ViewerClient,
};
use crate::config::Config;

pub struct AuthClient<T: Transport> {
    client: Client<T>,
}

impl<T: Transport> AuthClient<T> {
    pub fn connect<C>(
        connector: &C,
        config: &Config,
        token: Option<&SessionToken>,
    ) -> Result<Self, ClientError>
    where
        C: Connector<Transport = T>,
    {
        let transport = connector.connect(&config.auth_endpoint)?;
        Ok(Self::new(Client::new(transport, token, config)?))
    }

    pub fn new(client: Client<T>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client<T> {
        &self.client
    }

    /// Never requires a live session.
    pub async fn auth_parameters(&self) -> Result<AuthHandshake, ClientError> {
        self.client.request("getAuthParameters", &[]).await
    }

    pub async fn accepted_auth_methods(&self) -> Result<Vec<String>, ClientError> {
        self.client.request("getAcceptedAuthMethods", &[]).await
    }

    pub async fn perform_login(
        &self,
        credentials: &Credentials,
    ) -> Result<SessionToken, ClientError> {
        let args = [json!(credentials.scheme()), json!(credentials.secret())];
        let token: Option<String> = self.client.request("performLogin", &args).await?;
        match token {
            Some(token) if !token.is_empty() => Ok(SessionToken::new(token)),
            _ => Err(ClientError::Protocol(
                "performLogin succeeded without returning a session token".to_string(),
            )),
        }
    }

    /// Empty when the bound token has no live session.
    pub async fn logged_in_user(&self) -> Result<String, ClientError> {
        let user: Option<String> = self.client.request("getLoggedInUser", &[]).await?;
        Ok(user.unwrap_or_default())
    }

    pub async fn destroy_session(&self) -> Result<bool, ClientError> {
        self.client.request("destroySession", &[]).await
    }
}

/// Entry point for establishing, inspecting and ending sessions.
pub struct Authenticator<C: Connector> {
    connector: C,
    config: Config,
}

impl Authenticator<HttpConnector> {
    pub fn from_config(config: Config) -> Self {
        let connector = HttpConnector::from_config(&config);
        Self::new(connector, config)
    }
}

impl<C: Connector> Authenticator<C> {
    pub fn new(connector: C, config: Config) -> Self {
        Self { connector, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn auth_client(
        &self,
        token: Option<&SessionToken>,
    ) -> Result<AuthClient<C::Transport>, ClientError> {
        AuthClient::connect(&self.connector, &self.config, token)
    }

    /// Ask whether the server requires authentication and whether `token`
    /// still has a live session. Works without any token.
    pub async fn get_auth_parameters(
        &self,
        token: Option<&SessionToken>,
    ) -> Result<AuthHandshake, ClientError> {
        self.auth_client(token)?.auth_parameters().await
    }

    pub async fn session_state(
        &self,
        token: Option<&SessionToken>,
    ) -> Result<SessionState, ClientError> {
        let handshake = self.get_auth_parameters(token).await?;
        Ok(handshake.session_state(token.is_some()))
    }

    pub async fn accepted_auth_methods(&self) -> Result<Vec<String>, ClientError> {
        self.auth_client(None)?.accepted_auth_methods().await
    }

    /// Exchange credentials for a fresh session token.
    ///
    /// Invalid credentials fail with [`ErrorCode::AuthDenied`](crate::api::ErrorCode::AuthDenied).
    pub async fn login(&self, credentials: &Credentials) -> Result<SessionToken, ClientError> {
        let token = self.auth_client(None)?.perform_login(credentials).await?;
        debug!(scheme = credentials.scheme(), "Session established");
        Ok(token)
    }

    /// The principal behind `token`, or an empty string when there is no
    /// live session for it.
    pub async fn logged_in_user(
        &self,
        token: Option<&SessionToken>,
    ) -> Result<String, ClientError> {
        self.auth_client(token)?.logged_in_user().await
    }

    /// Destroy the session behind `token`.
    ///
    /// Whatever this returns, the token must not be used again.
    pub async fn logout(&self, token: &SessionToken) -> Result<bool, ClientError> {
        let destroyed = self.auth_client(Some(token))?.destroy_session().await?;
        if destroyed {
            debug!("Session destroyed");
        } else {
            warn!("Server did not confirm session destruction");
        }
        Ok(destroyed)
    }

    /// A results service client for `product`, bound to `token`.
    pub fn viewer(
        &self,
        product: &str,
        token: Option<&SessionToken>,
    ) -> Result<ViewerClient<C::Transport>, ClientError> {
        ViewerClient::connect(&self.connector, &self.config, product, token)
    }

    /// A product configuration client bound to `token`.
    pub fn products(
        &self,
        token: Option<&SessionToken>,
    ) -> Result<ProductClient<C::Transport>, ClientError> {
        ProductClient::connect(&self.connector, &self.config, token)
    }
}
