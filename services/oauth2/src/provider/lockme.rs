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

use bytes::Bytes;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::{Method, StatusCode};
use log::{debug, error};
use serde_json::{Map, Value};

use lockme_core::time::{from_timestamp, now};
use lockme_core::utils::join_url;
use lockme_core::{check_envelope, decode_body, AccessToken, Context, Error, Result};

use super::{ApiRequest, AuthorizationRequest, Grant, OAuth2Provider, ResourceOwner};
use crate::constants::SCOPE_SEPARATOR;
use crate::Config;

/// LockmeProvider talks to the Lockme OAuth2 server and API.
///
/// - authorization: `{api_domain}/authorize`
/// - token endpoint: `{api_domain}/access_token`
/// - API calls: `{api_domain}/{api_version}{path}`
#[derive(Clone, Debug)]
pub struct LockmeProvider {
    config: Config,
}

impl LockmeProvider {
    /// Create a provider from config.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    fn api_url(&self, path: &str) -> String {
        join_url(
            &join_url(&self.config.api_domain, &self.config.api_version),
            path,
        )
    }

    fn client_id(&self) -> Result<&str> {
        self.config
            .client_id
            .as_deref()
            .ok_or_else(|| Error::config_invalid("client_id is required"))
    }

    fn client_secret(&self) -> Result<&str> {
        self.config
            .client_secret
            .as_deref()
            .ok_or_else(|| Error::config_invalid("client_secret is required"))
    }
}

#[async_trait::async_trait]
impl OAuth2Provider for LockmeProvider {
    fn authorization_url(&self, scopes: &[&str]) -> Result<AuthorizationRequest> {
        let state = hex::encode(rand::random::<[u8; 16]>());

        let mut query = form_urlencoded::Serializer::new(String::new());
        query
            .append_pair("response_type", "code")
            .append_pair("client_id", self.client_id()?);
        if let Some(redirect_uri) = &self.config.redirect_uri {
            query.append_pair("redirect_uri", redirect_uri);
        }
        if !scopes.is_empty() {
            query.append_pair("scope", &scopes.join(SCOPE_SEPARATOR));
        }
        query
            .append_pair("state", &state)
            .append_pair("approval_prompt", "auto");

        let url = format!(
            "{}?{}",
            join_url(&self.config.api_domain, "authorize"),
            query.finish()
        );
        Ok(AuthorizationRequest { url, state })
    }

    async fn access_token(&self, ctx: &Context, grant: Grant) -> Result<AccessToken> {
        debug!("exchanging {} grant for access token", grant.grant_type());

        // The serializer is not Send, it must be gone before the first await.
        let form = {
            let mut form = form_urlencoded::Serializer::new(String::new());
            form.append_pair("grant_type", grant.grant_type())
                .append_pair("client_id", self.client_id()?)
                .append_pair("client_secret", self.client_secret()?);
            if let Some(redirect_uri) = &self.config.redirect_uri {
                form.append_pair("redirect_uri", redirect_uri);
            }
            match &grant {
                Grant::AuthorizationCode { code } => form.append_pair("code", code),
                Grant::RefreshToken { refresh_token } => {
                    form.append_pair("refresh_token", refresh_token)
                }
            };
            form.finish()
        };

        let url = join_url(&self.config.api_domain, "access_token");
        let req = http::Request::builder()
            .method(Method::POST)
            .uri(&url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(ACCEPT, "application/json")
            .body(Bytes::from(form))?;

        let resp = ctx.http_send(req).await.map_err(|e| {
            Error::identity_provider(format!("failed to reach token endpoint {url}")).with_source(e)
        })?;
        let status = resp.status();
        let body = decode_body(resp.body()).map_err(|e| {
            Error::identity_provider(format!("token endpoint returned {status} with undecodable body"))
                .with_source(e)
        })?;

        if !status.is_success() || body.get("error").is_some() {
            let message = provider_error_message(&body, status);
            error!("{} grant rejected: {message}", grant.grant_type());
            return Err(Error::identity_provider(format!(
                "{} grant failed: {message}",
                grant.grant_type()
            )));
        }

        parse_token(body)
    }

    async fn execute_request(&self, ctx: &Context, req: ApiRequest<'_>) -> Result<Value> {
        let url = self.api_url(&req.path);

        let mut builder = http::Request::builder()
            .method(req.method.clone())
            .uri(&url)
            .header(AUTHORIZATION, format!("Bearer {}", req.token.access_token))
            .header(ACCEPT, "application/json");
        let body = match req.body {
            Some(body) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Bytes::from(serde_json::to_vec(body)?)
            }
            None => Bytes::new(),
        };

        let resp = ctx.http_send(builder.body(body)?).await?;
        debug!("{} {url} returned {}", req.method, resp.status());

        decode_body(resp.body())
    }

    async fn resource_owner(&self, ctx: &Context, token: &AccessToken) -> Result<ResourceOwner> {
        let value = self
            .execute_request(
                ctx,
                ApiRequest {
                    method: Method::GET,
                    path: "/me".to_string(),
                    body: None,
                    token,
                },
            )
            .await?;

        Ok(ResourceOwner::from_value(check_envelope(value)?))
    }
}

fn provider_error_message(body: &Value, status: StatusCode) -> String {
    for key in ["error_description", "message", "error"] {
        match body.get(key) {
            Some(Value::String(s)) if !s.is_empty() => return s.clone(),
            Some(Value::Null) | None => {}
            Some(v) => return v.to_string(),
        }
    }
    format!("unexpected status {status}")
}

fn parse_token(body: Value) -> Result<AccessToken> {
    let Value::Object(mut values) = body else {
        return Err(Error::identity_provider("token response is not an object"));
    };

    let access_token = match values.remove("access_token") {
        Some(Value::String(s)) if !s.is_empty() => s,
        _ => return Err(Error::identity_provider("token response has no access_token")),
    };
    let refresh_token = take_string(&mut values, "refresh_token");
    let resource_owner_id = take_string(&mut values, "resource_owner_id");

    let expires_in = values.remove("expires_in").and_then(|v| v.as_i64());
    let expires = values.remove("expires").and_then(|v| v.as_i64());
    let expires = match (expires_in, expires) {
        (Some(secs), _) => chrono::TimeDelta::try_seconds(secs).and_then(|d| now().checked_add_signed(d)),
        (None, Some(ts)) => from_timestamp(ts),
        (None, None) => None,
    };

    Ok(AccessToken {
        access_token,
        refresh_token,
        expires,
        resource_owner_id,
        values,
    })
}

fn take_string(values: &mut Map<String, Value>, key: &str) -> Option<String> {
    match values.remove(key)? {
        Value::String(s) => Some(s),
        Value::Null => None,
        v => Some(v.to_string()),
    }
}
