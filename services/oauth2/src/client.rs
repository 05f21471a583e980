// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::sync::Arc;

use chrono::{NaiveDate, Weekday};
use http::Method;
use log::{debug, warn};
use serde_json::Value;

use lockme_core::time::format_date;
use lockme_core::utils::{constant_time_eq, encode_path_segment, weekday_index};
use lockme_core::{
    check_envelope, require_fields, AccessToken, Context, Error, Result, SessionStore,
    TokenSource, TokenStore,
};

use crate::constants::SESSION_STATE_KEY;
use crate::provider::{ApiRequest, Grant, LockmeProvider, OAuth2Provider, ResourceOwner};
use crate::{Config, TokenManager};

/// Fields every new reservation must carry, with the message reported when missing.
const RESERVATION_REQUIRED_FIELDS: [(&str, &str); 3] = [
    ("roomid", "No room ID"),
    ("date", "No date"),
    ("hour", "No hour"),
];

/// Lockme is the OAuth2 client of the Lockme API.
///
/// Every API method issues exactly one request with either the given token
/// or the one held by the [`TokenManager`].
///
/// ```no_run
/// use lockme_core::{Context, FnTokenStore, MemoryLock, TokenSource};
/// use lockme_http_send_reqwest::ReqwestHttpSend;
/// use lockme_oauth2::{Config, Lockme};
///
/// # async fn example() -> lockme_core::Result<()> {
/// let ctx = Context::new()
///     .with_http_send(ReqwestHttpSend::default())
///     .with_lock(MemoryLock::default());
/// let lockme = Lockme::new(ctx, Config::new().with_client_id("id").with_client_secret("secret"));
///
/// let store = FnTokenStore::new(|| Ok(Some(TokenSource::Raw(std::fs::read_to_string("token.json")?))))
///     .with_save(|token| Ok(std::fs::write("token.json", token.to_json()?)?));
/// lockme.load_access_token(&store).await?;
///
/// let rooms = lockme.room_list(None).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Lockme {
    ctx: Context,
    provider: Arc<dyn OAuth2Provider>,
    tokens: TokenManager,
}

impl Lockme {
    /// Create a client talking to Lockme with `config`.
    pub fn new(ctx: Context, config: Config) -> Self {
        let grace = config.expiry_grace;
        Self::with_provider(ctx, LockmeProvider::new(config)).with_expiry_grace(grace)
    }

    /// Create a client on top of a custom provider.
    pub fn with_provider(ctx: Context, provider: impl OAuth2Provider) -> Self {
        let provider: Arc<dyn OAuth2Provider> = Arc::new(provider);
        Self {
            ctx,
            tokens: TokenManager::new(provider.clone()),
            provider,
        }
    }

    /// Treat tokens as expired `grace` before their expiry.
    pub fn with_expiry_grace(mut self, grace: std::time::Duration) -> Self {
        self.tokens = self.tokens.with_expiry_grace(grace);
        self
    }

    /// The context used for every call.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// The token manager holding the current token.
    pub fn token_manager(&self) -> &TokenManager {
        &self.tokens
    }

    /// Build the authorization url and remember its state in `session`.
    pub fn authorization_url(
        &self,
        session: &mut dyn SessionStore,
        scopes: &[&str],
    ) -> Result<String> {
        let req = self.provider.authorization_url(scopes)?;
        session.set(SESSION_STATE_KEY, req.state);
        Ok(req.url)
    }

    /// Exchange the code from the authorization redirect for a token.
    ///
    /// The stored state is removed from `session` before comparing, so it
    /// can never be used twice, whether it matches or not.
    pub async fn token_for_code(
        &self,
        session: &mut dyn SessionStore,
        code: &str,
        state: &str,
    ) -> Result<AccessToken> {
        let matches = session
            .remove(SESSION_STATE_KEY)
            .is_some_and(|expected| constant_time_eq(expected.as_bytes(), state.as_bytes()));
        if !matches {
            warn!("authorization state does not match the one issued");
            return Err(Error::state_mismatch("Wrong state"));
        }

        let token = self
            .provider
            .access_token(
                &self.ctx,
                Grant::AuthorizationCode {
                    code: code.to_string(),
                },
            )
            .await?;
        self.tokens.set_token(token.clone());
        Ok(token)
    }

    /// Refresh the given token, or the held one.
    pub async fn refresh_token(&self, token: Option<&AccessToken>) -> Result<AccessToken> {
        self.tokens.refresh(&self.ctx, token).await
    }

    /// Load a valid token from `store`, coordinating refreshes across processes.
    ///
    /// See [`TokenManager::load_token`].
    pub async fn load_access_token<S>(&self, store: &S) -> Result<AccessToken>
    where
        S: TokenStore + Clone + 'static,
    {
        self.tokens.load_token(&self.ctx, store).await
    }

    /// Set the token used by default, refreshing it without coordination if expired.
    #[deprecated(note = "use `load_access_token` with a `TokenStore` instead")]
    #[allow(deprecated)]
    pub async fn set_default_access_token(
        &self,
        token: impl Into<TokenSource>,
    ) -> Result<AccessToken> {
        self.tokens.set_default_token(&self.ctx, token).await
    }

    /// Fetch the account behind a token.
    pub async fn resource_owner(&self, token: Option<&AccessToken>) -> Result<ResourceOwner> {
        let token = self.token_or_default(token)?;
        self.provider.resource_owner(&self.ctx, &token).await
    }

    /// Check the connection.
    pub async fn test(&self, token: Option<&AccessToken>) -> Result<Value> {
        self.request(Method::GET, "/test".to_string(), None, token)
            .await
    }

    /// List the rooms the account manages.
    pub async fn room_list(&self, token: Option<&AccessToken>) -> Result<Value> {
        self.request(Method::GET, "/rooms".to_string(), None, token)
            .await
    }

    /// Get one reservation.
    pub async fn reservation(
        &self,
        room_id: u64,
        reservation_id: &str,
        token: Option<&AccessToken>,
    ) -> Result<Value> {
        self.request(
            Method::GET,
            format!(
                "/room/{room_id}/reservation/{}",
                encode_path_segment(reservation_id)
            ),
            None,
            token,
        )
        .await
    }

    /// Create a reservation.
    ///
    /// `data` must carry truthy `roomid`, `date` and `hour`, checked before
    /// anything is sent.
    pub async fn add_reservation(
        &self,
        data: &Value,
        token: Option<&AccessToken>,
    ) -> Result<Value> {
        require_fields(data, &RESERVATION_REQUIRED_FIELDS)?;
        let room_id = path_segment(&data["roomid"]);

        self.request(
            Method::PUT,
            format!("/room/{room_id}/reservation"),
            Some(data),
            token,
        )
        .await
    }

    /// Delete a reservation.
    pub async fn delete_reservation(
        &self,
        room_id: u64,
        reservation_id: &str,
        token: Option<&AccessToken>,
    ) -> Result<Value> {
        self.request(
            Method::DELETE,
            format!(
                "/room/{room_id}/reservation/{}",
                encode_path_segment(reservation_id)
            ),
            None,
            token,
        )
        .await
    }

    /// Update a reservation.
    pub async fn edit_reservation(
        &self,
        room_id: u64,
        reservation_id: &str,
        data: &Value,
        token: Option<&AccessToken>,
    ) -> Result<Value> {
        self.request(
            Method::POST,
            format!(
                "/room/{room_id}/reservation/{}",
                encode_path_segment(reservation_id)
            ),
            Some(data),
            token,
        )
        .await
    }

    /// Move a reservation to another slot.
    pub async fn move_reservation(
        &self,
        room_id: u64,
        reservation_id: &str,
        data: &Value,
        token: Option<&AccessToken>,
    ) -> Result<Value> {
        self.request(
            Method::POST,
            format!(
                "/room/{room_id}/reservation/{}/move",
                encode_path_segment(reservation_id)
            ),
            Some(data),
            token,
        )
        .await
    }

    /// Read a webhook message.
    pub async fn get_message(&self, message_id: u64, token: Option<&AccessToken>) -> Result<Value> {
        self.request(Method::GET, format!("/message/{message_id}"), None, token)
            .await
    }

    /// Mark a webhook message as read.
    pub async fn mark_message_read(
        &self,
        message_id: u64,
        token: Option<&AccessToken>,
    ) -> Result<Value> {
        self.request(Method::POST, format!("/message/{message_id}"), None, token)
            .await
    }

    /// Get the schedule of a room for a day of the week.
    pub async fn get_day_settings(
        &self,
        room_id: u64,
        day: Weekday,
        token: Option<&AccessToken>,
    ) -> Result<Value> {
        self.request(
            Method::GET,
            format!("/room/{room_id}/day/{}", weekday_index(day)),
            None,
            token,
        )
        .await
    }

    /// Set the schedule of a room for a day of the week.
    pub async fn set_day_settings(
        &self,
        room_id: u64,
        day: Weekday,
        settings: &Value,
        token: Option<&AccessToken>,
    ) -> Result<Value> {
        self.request(
            Method::POST,
            format!("/room/{room_id}/day/{}", weekday_index(day)),
            Some(settings),
            token,
        )
        .await
    }

    /// Get the schedule of a room for a date.
    pub async fn get_date_settings(
        &self,
        room_id: u64,
        date: NaiveDate,
        token: Option<&AccessToken>,
    ) -> Result<Value> {
        self.request(
            Method::GET,
            format!("/room/{room_id}/date/{}", format_date(date)),
            None,
            token,
        )
        .await
    }

    /// Set the schedule of a room for a date.
    pub async fn set_date_settings(
        &self,
        room_id: u64,
        date: NaiveDate,
        settings: &Value,
        token: Option<&AccessToken>,
    ) -> Result<Value> {
        self.request(
            Method::POST,
            format!("/room/{room_id}/date/{}", format_date(date)),
            Some(settings),
            token,
        )
        .await
    }

    async fn request(
        &self,
        method: Method,
        path: String,
        body: Option<&Value>,
        token: Option<&AccessToken>,
    ) -> Result<Value> {
        let token = self.token_or_default(token)?;
        debug!("sending {method} {path}");

        let value = self
            .provider
            .execute_request(
                &self.ctx,
                ApiRequest {
                    method,
                    path,
                    body,
                    token: &token,
                },
            )
            .await?;
        check_envelope(value)
    }

    fn token_or_default(&self, token: Option<&AccessToken>) -> Result<AccessToken> {
        match token {
            Some(token) => Ok(token.clone()),
            None => self
                .tokens
                .token()
                .ok_or_else(|| Error::invalid_token("no access token set")),
        }
    }
}

/// Render a JSON scalar as an encoded path segment: strings by content, the
/// rest as JSON text.
fn path_segment(value: &Value) -> String {
    match value {
        Value::String(s) => encode_path_segment(s),
        v => encode_path_segment(&v.to_string()),
    }
}
