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

use std::fmt::{Debug, Formatter};
use std::time::Duration;

use lockme_core::utils::Redact;
use lockme_core::Context;
use log::warn;

use crate::constants::*;

/// Config carries all the configuration for the OAuth2 Lockme client.
#[derive(Clone)]
pub struct Config {
    /// OAuth2 client id issued by Lockme.
    pub client_id: Option<String>,
    /// OAuth2 client secret issued by Lockme.
    pub client_secret: Option<String>,
    /// Where Lockme redirects the user back after authorization.
    pub redirect_uri: Option<String>,
    /// Scheme and host of the Lockme API.
    pub api_domain: String,
    /// API version path segment, e.g. `v2.0`.
    pub api_version: String,
    /// Treat tokens as expired this long before their real expiry.
    pub expiry_grace: Duration,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("client_id", &self.client_id)
            .field("client_secret", &Redact::from(&self.client_secret))
            .field("redirect_uri", &self.redirect_uri)
            .field("api_domain", &self.api_domain)
            .field("api_version", &self.api_version)
            .field("expiry_grace", &self.expiry_grace)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: None,
            api_domain: DEFAULT_API_DOMAIN.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            expiry_grace: Duration::ZERO,
        }
    }
}

impl Config {
    /// Create a new config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the client id.
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Set the client secret.
    pub fn with_client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(client_secret.into());
        self
    }

    /// Set the redirect uri.
    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    /// Set the API domain, mostly useful against a test instance.
    pub fn with_api_domain(mut self, api_domain: impl Into<String>) -> Self {
        self.api_domain = api_domain.into();
        self
    }

    /// Set the API version.
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Set the clock skew allowance applied to token expiry.
    pub fn with_expiry_grace(mut self, expiry_grace: Duration) -> Self {
        self.expiry_grace = expiry_grace;
        self
    }

    /// Load config from environment variables.
    ///
    /// Values already set are overridden by the environment.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if let Some(v) = ctx.env_var(LOCKME_CLIENT_ID) {
            self.client_id = Some(v);
        }
        if let Some(v) = ctx.env_var(LOCKME_CLIENT_SECRET) {
            self.client_secret = Some(v);
        }
        if let Some(v) = ctx.env_var(LOCKME_REDIRECT_URI) {
            self.redirect_uri = Some(v);
        }
        if let Some(v) = ctx.env_var(LOCKME_API_DOMAIN) {
            self.api_domain = v;
        }
        if let Some(v) = ctx.env_var(LOCKME_API_VERSION) {
            self.api_version = v;
        }
        if let Some(v) = ctx.env_var(LOCKME_TOKEN_EXPIRY_GRACE) {
            match v.parse::<u64>() {
                Ok(secs) => self.expiry_grace = Duration::from_secs(secs),
                Err(e) => warn!("ignoring invalid {LOCKME_TOKEN_EXPIRY_GRACE} {v:?}: {e}"),
            }
        }

        self
    }
}
