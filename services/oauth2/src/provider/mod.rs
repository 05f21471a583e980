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

//! The OAuth2 provider seam.
//!
//! The client only talks to Lockme through an [`OAuth2Provider`]. The
//! default implementation is [`LockmeProvider`]; tests and exotic setups can
//! bring their own.

use std::fmt::Debug;

use http::Method;
use serde_json::{Map, Value};

use lockme_core::{AccessToken, Context, Result};

mod lockme;
pub use lockme::LockmeProvider;

/// Grant exchanged at the token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub enum Grant {
    /// One-time code handed back by the authorization redirect.
    AuthorizationCode {
        /// The code.
        code: String,
    },
    /// Long lived credential used to mint a new access token.
    RefreshToken {
        /// The refresh token.
        refresh_token: String,
    },
}

impl Grant {
    /// The `grant_type` form value.
    pub fn grant_type(&self) -> &'static str {
        match self {
            Grant::AuthorizationCode { .. } => "authorization_code",
            Grant::RefreshToken { .. } => "refresh_token",
        }
    }
}

impl Debug for Grant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grant")
            .field("grant_type", &self.grant_type())
            .finish_non_exhaustive()
    }
}

/// Where to send the user, and the state that must come back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizationRequest {
    /// The authorization url.
    pub url: String,
    /// The CSRF state embedded in `url`.
    pub state: String,
}

/// One authenticated API call.
///
/// Built per call and dropped afterwards.
#[derive(Clone, Debug)]
pub struct ApiRequest<'a> {
    /// HTTP method.
    pub method: Method,
    /// Path below the versioned API root, starting with `/`.
    pub path: String,
    /// JSON body, if any.
    pub body: Option<&'a Value>,
    /// Bearer token.
    pub token: &'a AccessToken,
}

/// The account a token acts for.
#[derive(Clone, Debug, PartialEq)]
pub struct ResourceOwner {
    /// Account id.
    pub id: Option<String>,
    /// Everything else the API returned about the account.
    pub values: Map<String, Value>,
}

impl ResourceOwner {
    /// Build from the decoded `/me` response.
    pub fn from_value(value: Value) -> Self {
        let mut values = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let id = match values.remove("id") {
            Some(Value::String(s)) => Some(s),
            Some(Value::Null) | None => None,
            Some(v) => Some(v.to_string()),
        };

        Self { id, values }
    }
}

/// OAuth2Provider is everything the client needs from an OAuth2 server.
#[async_trait::async_trait]
pub trait OAuth2Provider: Debug + Send + Sync + 'static {
    /// Build the url the user must visit, with a freshly generated state.
    fn authorization_url(&self, scopes: &[&str]) -> Result<AuthorizationRequest>;

    /// Exchange a grant for a token.
    ///
    /// Failures are reported as [`lockme_core::ErrorKind::IdentityProvider`].
    async fn access_token(&self, ctx: &Context, grant: Grant) -> Result<AccessToken>;

    /// Send an authenticated API request and decode the response body.
    ///
    /// Error envelopes are returned as values, interpreting them is up to
    /// the caller.
    async fn execute_request(&self, ctx: &Context, req: ApiRequest<'_>) -> Result<Value>;

    /// Fetch the account the token belongs to.
    async fn resource_owner(&self, ctx: &Context, token: &AccessToken) -> Result<ResourceOwner>;
}
