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

use std::fmt::{self, Debug};
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::time::{now, DateTime};
use crate::utils::Redact;
use crate::{Error, Result};

/// AccessToken is an OAuth2 bearer credential issued by Lockme.
///
/// A token is replaced as a whole on every refresh, it is never patched in
/// place. The serialized form is the JSON document persisted by token stores:
///
/// ```json
/// {"access_token":"...","refresh_token":"...","expires":1700000000,"resource_owner_id":"42"}
/// ```
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessToken {
    /// The bearer credential.
    pub access_token: String,
    /// The credential used to mint the next access token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// When the access token stops being accepted. `None` means never.
    #[serde(
        default,
        with = "chrono::serde::ts_seconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub expires: Option<DateTime>,
    /// The account the token was issued for.
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub resource_owner_id: Option<String>,
    /// Any other fields returned by the provider.
    #[serde(flatten)]
    pub values: Map<String, Value>,
}

impl Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &Redact::from(&self.access_token))
            .field("refresh_token", &Redact::from(&self.refresh_token))
            .field("expires", &self.expires)
            .field("resource_owner_id", &self.resource_owner_id)
            .finish()
    }
}

impl AccessToken {
    /// Create a token that never expires and cannot be refreshed.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires: None,
            resource_owner_id: None,
            values: Map::new(),
        }
    }

    /// Set the refresh credential.
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Set the absolute expiry.
    pub fn with_expires(mut self, expires: DateTime) -> Self {
        self.expires = Some(expires);
        self
    }

    /// Set the expiry relative to now.
    pub fn with_expires_in(mut self, expires_in: Duration) -> Self {
        let delta = chrono::TimeDelta::from_std(expires_in).unwrap_or(chrono::TimeDelta::MAX);
        self.expires = now().checked_add_signed(delta);
        self
    }

    /// Set the resource owner.
    pub fn with_resource_owner_id(mut self, id: impl Into<String>) -> Self {
        self.resource_owner_id = Some(id.into());
        self
    }

    /// Check if the token is expired right now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(now(), Duration::ZERO)
    }

    /// Check if the token is expired at `at`, treating it as expired `grace` early.
    ///
    /// A token whose expiry equals `at` is expired. Tokens without expiry never expire.
    pub fn is_expired_at(&self, at: DateTime, grace: Duration) -> bool {
        let Some(expires) = self.expires else {
            return false;
        };

        let grace = chrono::TimeDelta::from_std(grace).unwrap_or(chrono::TimeDelta::MAX);
        match expires.checked_sub_signed(grace) {
            Some(deadline) => at >= deadline,
            None => true,
        }
    }

    /// Serialize the token into the JSON form handed to token stores.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| Error::unexpected("failed to serialize access token").with_source(e))
    }

    /// Parse a token from the JSON form produced by [`AccessToken::to_json`].
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|e| Error::invalid_token("stored token is not valid").with_source(e))
    }
}

/// TokenSource is whatever a token store hands back: an already serialized
/// token, or a structured one.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenSource {
    /// The JSON form of an [`AccessToken`].
    Raw(String),
    /// A token object.
    Structured(AccessToken),
}

impl TokenSource {
    /// Resolve into the canonical token type.
    pub fn resolve(self) -> Result<AccessToken> {
        match self {
            TokenSource::Raw(raw) => AccessToken::from_json(&raw),
            TokenSource::Structured(token) => Ok(token),
        }
    }
}

impl From<AccessToken> for TokenSource {
    fn from(token: AccessToken) -> Self {
        TokenSource::Structured(token)
    }
}

impl From<String> for TokenSource {
    fn from(raw: String) -> Self {
        TokenSource::Raw(raw)
    }
}

impl From<&str> for TokenSource {
    fn from(raw: &str) -> Self {
        TokenSource::Raw(raw.to_string())
    }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(v) => Some(v.to_string()),
    })
}
