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
use http::header::CONTENT_TYPE;
use http::Method;
use log::debug;
use serde_json::Value;

use lockme_core::utils::{encode_path_segment, join_url};
use lockme_core::{check_envelope, decode_body, require_fields, verify_payload, Context, Result};

use crate::constants::EMPTY_PARAMS;
use crate::{Config, RequestSigner};

const RESERVATION_REQUIRED_FIELDS: [(&str, &str); 3] = [
    ("roomid", "No room ID"),
    ("date", "No date"),
    ("hour", "No hour"),
];

/// PartnerClient talks to the legacy partner API, authenticated by a
/// partner key and signed with a shared secret.
#[derive(Clone, Debug)]
pub struct PartnerClient {
    ctx: Context,
    config: Config,
}

impl PartnerClient {
    /// Create a client with `config`.
    pub fn new(ctx: Context, config: Config) -> Self {
        Self { ctx, config }
    }

    /// Check the connection.
    pub async fn test(&self) -> Result<Value> {
        self.request(Method::GET, "test", None).await
    }

    /// List the rooms of the partner.
    pub async fn room_list(&self) -> Result<Value> {
        self.request(Method::GET, "rooms", None).await
    }

    /// Get one reservation.
    pub async fn reservation(&self, id: &str) -> Result<Value> {
        self.request(Method::GET, &reservation_path(id), None).await
    }

    /// Create a reservation. `data` needs truthy `roomid`, `date` and `hour`.
    pub async fn add_reservation(&self, data: &Value) -> Result<Value> {
        require_fields(data, &RESERVATION_REQUIRED_FIELDS)?;
        self.request(Method::PUT, "reservation", Some(data)).await
    }

    /// Delete a reservation, optionally passing extra data such as a reason.
    pub async fn delete_reservation(&self, id: &str, data: Option<&Value>) -> Result<Value> {
        self.request(Method::DELETE, &reservation_path(id), data)
            .await
    }

    /// Update a reservation.
    pub async fn edit_reservation(&self, id: &str, data: &Value) -> Result<Value> {
        self.request(Method::POST, &reservation_path(id), Some(data))
            .await
    }

    /// List the pricers of the partner.
    pub async fn pricer_list(&self) -> Result<Value> {
        self.request(Method::GET, "pricers", None).await
    }

    /// Verify and decode a payload pushed by Lockme.
    pub fn decrypt(&self, body: &[u8], signature: &str) -> Result<Value> {
        verify_payload(body, self.config.secret()?, signature)
    }

    async fn request(&self, method: Method, path: &str, params: Option<&Value>) -> Result<Value> {
        let signer = RequestSigner::new(self.config.partner_key()?, self.config.secret()?);
        let params = match params {
            Some(v) => serde_json::to_string(v)?,
            None => EMPTY_PARAMS.to_string(),
        };

        let url = join_url(
            &join_url(&self.config.endpoint, &format!("v{}", self.config.version)),
            path,
        );
        let body = if method == Method::GET {
            Bytes::new()
        } else {
            Bytes::from(params.clone())
        };

        let req = http::Request::builder()
            .method(method)
            .uri(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)?;
        let (mut parts, body) = req.into_parts();
        signer.sign_request(&mut parts, path, &params)?;

        let resp = self
            .ctx
            .http_send(http::Request::from_parts(parts, body))
            .await?;
        debug!("{url} returned {}", resp.status());

        check_envelope(decode_body(resp.body())?)
    }
}

fn reservation_path(id: &str) -> String {
    format!("reservation/{}", encode_path_segment(id))
}
