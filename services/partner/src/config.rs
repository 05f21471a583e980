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

use lockme_core::utils::Redact;
use lockme_core::{Context, Error, Result};

use crate::constants::*;

/// Config carries all the configuration for the Lockme partner API.
#[derive(Clone)]
pub struct Config {
    /// Partner key sent with every request.
    pub partner_key: Option<String>,
    /// Shared secret used to sign requests and verify webhooks.
    pub secret: Option<String>,
    /// Base endpoint, without the version segment.
    pub endpoint: String,
    /// API version, rendered as `v{version}` in urls.
    pub version: String,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("partner_key", &self.partner_key)
            .field("secret", &Redact::from(&self.secret))
            .field("endpoint", &self.endpoint)
            .field("version", &self.version)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            partner_key: None,
            secret: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            version: DEFAULT_VERSION.to_string(),
        }
    }
}

impl Config {
    /// Create a new config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the partner key.
    pub fn with_partner_key(mut self, partner_key: impl Into<String>) -> Self {
        self.partner_key = Some(partner_key.into());
        self
    }

    /// Set the shared secret.
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    /// Set the endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the API version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Load config from environment variables.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if let Some(v) = ctx.env_var(LOCKME_PARTNER_KEY) {
            self.partner_key = Some(v);
        }
        if let Some(v) = ctx.env_var(LOCKME_PARTNER_SECRET) {
            self.secret = Some(v);
        }
        if let Some(v) = ctx.env_var(LOCKME_PARTNER_ENDPOINT) {
            self.endpoint = v;
        }
        if let Some(v) = ctx.env_var(LOCKME_PARTNER_VERSION) {
            self.version = v;
        }

        self
    }

    pub(crate) fn secret(&self) -> Result<&str> {
        self.secret
            .as_deref()
            .ok_or_else(|| Error::config_invalid("partner secret is required"))
    }

    pub(crate) fn partner_key(&self) -> Result<&str> {
        self.partner_key
            .as_deref()
            .ok_or_else(|| Error::config_invalid("partner key is required"))
    }
}
