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

use std::env;

use async_trait::async_trait;
use bytes::Bytes;
use lockme_core::{Context, Env, Error, HttpSend, Result};
use reqwest::Client;

/// DefaultContext sends requests with reqwest and reads the process
/// environment.
///
/// Converting it into a [`Context`] installs no lock backend. Token refresh
/// fails until one is chosen with [`Context::with_lock`]: a file lock when
/// several processes share one token, [`lockme_core::MemoryLock`] when a
/// single process owns it.
#[derive(Debug, Default, Clone)]
pub struct DefaultContext {
    client: Client,
}

impl DefaultContext {
    /// Create a context with a default reqwest client.
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Create a context on top of a configured reqwest client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpSend for DefaultContext {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let method = req.method().clone();
        let uri = req.uri().to_string();
        let headers = req.headers().clone();
        let body = req.into_body();

        let resp = self
            .client
            .request(method, &uri)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| Error::unexpected(format!("failed to send request to {uri}")).with_source(e))?;

        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp
            .bytes()
            .await
            .map_err(|e| Error::unexpected(format!("failed to read response from {uri}")).with_source(e))?;

        let mut builder = http::Response::builder().status(status);
        for (name, value) in headers.iter() {
            builder = builder.header(name, value);
        }
        Ok(builder.body(body)?)
    }
}

impl Env for DefaultContext {
    fn var(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

impl From<DefaultContext> for Context {
    fn from(ctx: DefaultContext) -> Self {
        Context::new().with_http_send(ctx.clone()).with_env(ctx)
    }
}
