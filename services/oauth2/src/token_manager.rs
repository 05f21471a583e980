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

use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, error, warn};

use lockme_core::time::now;
use lockme_core::{
    AccessToken, Context, Error, ErrorKind, Result, TokenSource, TokenStore, REFRESH_TOKEN_LOCK,
};

use crate::provider::{Grant, OAuth2Provider};

/// TokenManager keeps the access token used by a client valid.
///
/// It holds the current token in memory. When callers share tokens across
/// processes through a [`TokenStore`], [`TokenManager::load_token`] makes
/// sure that among all racers that find the same expired token, only one
/// performs the refresh while the others pick up its result.
#[derive(Clone, Debug)]
pub struct TokenManager {
    provider: Arc<dyn OAuth2Provider>,
    expiry_grace: Duration,
    token: Arc<Mutex<Option<AccessToken>>>,
}

impl TokenManager {
    /// Create a manager refreshing tokens through `provider`.
    pub fn new(provider: Arc<dyn OAuth2Provider>) -> Self {
        Self {
            provider,
            expiry_grace: Duration::ZERO,
            token: Arc::new(Mutex::new(None)),
        }
    }

    /// Treat tokens as expired `grace` before their expiry.
    pub fn with_expiry_grace(mut self, grace: Duration) -> Self {
        self.expiry_grace = grace;
        self
    }

    /// The token currently held, if any.
    pub fn token(&self) -> Option<AccessToken> {
        self.token.lock().expect("lock poisoned").clone()
    }

    /// Replace the held token.
    pub fn set_token(&self, token: AccessToken) {
        *self.token.lock().expect("lock poisoned") = Some(token);
    }

    /// Check expiry, honouring the configured grace.
    pub fn is_expired(&self, token: &AccessToken) -> bool {
        token.is_expired_at(now(), self.expiry_grace)
    }

    /// Load a valid token from `store`, refreshing it if needed.
    ///
    /// The steps are, in order:
    ///
    /// 1. load the token; if it is still valid, return it without locking
    /// 2. acquire the `refresh-token` lock through `ctx`, waiting as long as it takes
    /// 3. load the token again, another process may have refreshed it meanwhile
    /// 4. if it is still expired, refresh it and save the new token to `store`
    /// 5. release the lock, whatever happened in 3 and 4
    ///
    /// Steps 2 to 5 run on a spawned tokio task. Dropping the returned future
    /// does not cancel an issued refresh, and the lock is always released.
    pub async fn load_token<S>(&self, ctx: &Context, store: &S) -> Result<AccessToken>
    where
        S: TokenStore + Clone + 'static,
    {
        let token = self.load_from(store).await?;
        if !self.is_expired(&token) {
            debug!("loaded access token is valid, no refresh needed");
            return Ok(self.hold(token));
        }

        let manager = self.clone();
        let ctx = ctx.clone();
        let store = store.clone();
        tokio::spawn(async move { manager.refresh_coordinated(&ctx, &store).await })
            .await
            .map_err(|e| Error::unexpected("token refresh task failed").with_source(e))?
    }

    async fn refresh_coordinated(
        &self,
        ctx: &Context,
        store: &dyn TokenStore,
    ) -> Result<AccessToken> {
        debug!("loaded access token is expired, waiting for lock {REFRESH_TOKEN_LOCK}");
        ctx.lock_acquire(REFRESH_TOKEN_LOCK).await?;

        let result = self.refresh_locked(ctx, store).await;
        let released = ctx.lock_release(REFRESH_TOKEN_LOCK).await;

        match (result, released) {
            (Ok(token), Ok(())) => Ok(token),
            (Ok(_), Err(err)) => Err(err),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(release_err)) => {
                error!("failed to release lock {REFRESH_TOKEN_LOCK}: {release_err}");
                Err(err)
            }
        }
    }

    /// Runs while holding the refresh lock.
    async fn refresh_locked(&self, ctx: &Context, store: &dyn TokenStore) -> Result<AccessToken> {
        let token = self.load_from(store).await?;
        if !self.is_expired(&token) {
            debug!("access token was refreshed while waiting for the lock, reusing it");
            return Ok(self.hold(token));
        }

        let fresh = self.refresh(ctx, Some(&token)).await?;
        store.save(&fresh).await?;
        debug!("refreshed access token saved");
        Ok(fresh)
    }

    async fn load_from(&self, store: &dyn TokenStore) -> Result<AccessToken> {
        store
            .load()
            .await?
            .ok_or_else(|| Error::invalid_token("token store returned no token"))?
            .resolve()
    }

    /// Exchange the refresh token of `token` (or of the held token) for a new
    /// access token, which becomes the held one.
    ///
    /// When the provider does not rotate the refresh token, the previous one
    /// is carried over.
    pub async fn refresh(&self, ctx: &Context, token: Option<&AccessToken>) -> Result<AccessToken> {
        let current = match token {
            Some(token) => token.clone(),
            None => self
                .token()
                .ok_or_else(|| Error::invalid_token("no access token to refresh"))?,
        };
        let refresh_token = current
            .refresh_token
            .clone()
            .ok_or_else(|| Error::identity_provider("access token has no refresh token"))?;

        debug!("refreshing access token");
        let mut fresh = self
            .provider
            .access_token(
                ctx,
                Grant::RefreshToken {
                    refresh_token: refresh_token.clone(),
                },
            )
            .await
            .map_err(|err| {
                warn!("access token refresh failed: {err}");
                match err.kind() {
                    ErrorKind::IdentityProvider => err,
                    _ => Error::identity_provider(format!("failed to refresh access token: {err}"))
                        .with_source(err),
                }
            })?;

        if fresh.refresh_token.is_none() {
            fresh.refresh_token = Some(refresh_token);
        }
        if fresh.resource_owner_id.is_none() {
            fresh.resource_owner_id = current.resource_owner_id;
        }

        Ok(self.hold(fresh))
    }

    /// Set the held token, refreshing it right away if it is expired.
    ///
    /// The refresh does not take the lock, so concurrent processes may
    /// refresh the same token more than once. Only use it where a single
    /// process owns the token.
    #[deprecated(note = "use `load_token` with a `TokenStore` instead")]
    pub async fn set_default_token(
        &self,
        ctx: &Context,
        source: impl Into<TokenSource>,
    ) -> Result<AccessToken> {
        let token = source.into().resolve()?;
        if self.is_expired(&token) {
            debug!("default access token is expired, refreshing without lock");
            return self.refresh(ctx, Some(&token)).await;
        }

        Ok(self.hold(token))
    }

    fn hold(&self, token: AccessToken) -> AccessToken {
        self.set_token(token.clone());
        token
    }
}
