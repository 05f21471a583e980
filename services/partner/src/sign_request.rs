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

use http::HeaderValue;
use log::debug;

use lockme_core::hash::hex_sha1_concat;
use lockme_core::Result;

use crate::constants::{X_PARTNER_KEY, X_SIGNATURE};

/// RequestSigner signs requests for the partner API.
///
/// The signature is hex `sha1(method ++ path ++ params ++ secret)`, where
/// `path` is relative to the versioned endpoint and `params` the JSON text
/// of the request parameters.
#[derive(Debug)]
pub struct RequestSigner<'a> {
    partner_key: &'a str,
    secret: &'a str,
}

impl<'a> RequestSigner<'a> {
    /// Create a signer for one partner.
    pub fn new(partner_key: &'a str, secret: &'a str) -> Self {
        Self {
            partner_key,
            secret,
        }
    }

    /// Compute the signature of a call.
    pub fn signature(&self, method: &http::Method, path: &str, params: &str) -> String {
        hex_sha1_concat(&[
            method.as_str().as_bytes(),
            path.as_bytes(),
            params.as_bytes(),
            self.secret.as_bytes(),
        ])
    }

    /// Insert the partner key and signature headers into `req`.
    pub fn sign_request(
        &self,
        req: &mut http::request::Parts,
        path: &str,
        params: &str,
    ) -> Result<()> {
        let signature = self.signature(&req.method, path, params);
        debug!("signed {} {path}", req.method);

        req.headers
            .insert(X_PARTNER_KEY, HeaderValue::from_str(self.partner_key)?);
        let mut value = HeaderValue::from_str(&signature)?;
        value.set_sensitive(true);
        req.headers.insert(X_SIGNATURE, value);

        Ok(())
    }
}
