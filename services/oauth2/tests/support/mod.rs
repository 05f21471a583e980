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

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use lockme_core::time::now;
use lockme_core::{
    AccessToken, Context, Error, HttpSend, Lock, MemoryLock, Result, TokenSource, TokenStore,
};
use lockme_oauth2::{ApiRequest, AuthorizationRequest, Grant, OAuth2Provider, ResourceOwner};
use serde_json::Value;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenv::dotenv();
}

pub fn expired_token() -> AccessToken {
    AccessToken::new("stale-access-token")
        .with_refresh_token("refresh-0")
        .with_expires(now() - chrono::TimeDelta::try_minutes(10).unwrap())
}

pub fn valid_token() -> AccessToken {
    AccessToken::new("valid-access-token")
        .with_refresh_token("refresh-0")
        .with_expires_in(Duration::from_secs(3600))
}

/// A request seen by [`MockHttpSend`].
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: Method,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RecordedRequest {
    pub fn body_str(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .map(|v| v.to_str().unwrap().to_string())
    }
}

#[derive(Debug, Default)]
struct MockState {
    requests: Vec<RecordedRequest>,
    responses: VecDeque<(StatusCode, String)>,
}

/// Records every request and answers with queued responses, `200 null` when
/// nothing is queued.
#[derive(Clone, Debug, Default)]
pub struct MockHttpSend {
    state: Arc<Mutex<MockState>>,
}

impl MockHttpSend {
    pub fn respond(&self, status: StatusCode, body: &str) -> &Self {
        self.state
            .lock()
            .unwrap()
            .responses
            .push_back((status, body.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }
}

#[async_trait]
impl HttpSend for MockHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let (parts, body) = req.into_parts();
        let mut state = self.state.lock().unwrap();
        state.requests.push(RecordedRequest {
            method: parts.method,
            uri: parts.uri.to_string(),
            headers: parts.headers,
            body,
        });

        let (status, body) = state
            .responses
            .pop_front()
            .unwrap_or((StatusCode::OK, "null".to_string()));
        Ok(http::Response::builder()
            .status(status)
            .body(Bytes::from(body))
            .unwrap())
    }
}

/// Transport that is always down.
#[derive(Debug)]
pub struct FailingHttpSend;

#[async_trait]
impl HttpSend for FailingHttpSend {
    async fn http_send(&self, _: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        Err(Error::unexpected("connection refused"))
    }
}

/// In-process lock that counts how it is used.
#[derive(Debug, Default)]
pub struct SpyLock {
    inner: MemoryLock,
    acquires: AtomicUsize,
    releases: AtomicUsize,
}

impl SpyLock {
    pub fn acquires(&self) -> usize {
        self.acquires.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Lock for SpyLock {
    async fn acquire(&self, resource: &str) -> Result<()> {
        self.acquires.fetch_add(1, Ordering::SeqCst);
        self.inner.acquire(resource).await
    }

    async fn release(&self, resource: &str) -> Result<()> {
        self.releases.fetch_add(1, Ordering::SeqCst);
        self.inner.release(resource).await
    }
}

/// Token storage shared by every racer, like a database row would be.
#[derive(Clone, Debug)]
pub struct SharedStore {
    raw: Arc<Mutex<Option<String>>>,
    saves: Arc<AtomicUsize>,
}

impl SharedStore {
    pub fn new(token: &AccessToken) -> Self {
        Self {
            raw: Arc::new(Mutex::new(Some(token.to_json().unwrap()))),
            saves: Arc::default(),
        }
    }

    pub fn current(&self) -> AccessToken {
        AccessToken::from_json(self.raw.lock().unwrap().as_ref().unwrap()).unwrap()
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenStore for SharedStore {
    async fn load(&self) -> Result<Option<TokenSource>> {
        Ok(self.raw.lock().unwrap().clone().map(TokenSource::Raw))
    }

    async fn save(&self, token: &AccessToken) -> Result<()> {
        *self.raw.lock().unwrap() = Some(token.to_json()?);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Provider whose refresh grant takes a while and counts its calls.
#[derive(Debug, Default)]
pub struct SlowProvider {
    refreshes: AtomicUsize,
    delay: Duration,
    fail: bool,
}

impl SlowProvider {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OAuth2Provider for SlowProvider {
    fn authorization_url(&self, _: &[&str]) -> Result<AuthorizationRequest> {
        Err(Error::unexpected("not used"))
    }

    async fn access_token(&self, _: &Context, _: Grant) -> Result<AccessToken> {
        let n = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;
        if self.fail {
            return Err(Error::identity_provider("invalid_grant"));
        }

        Ok(AccessToken::new(format!("fresh-{n}"))
            .with_refresh_token(format!("refresh-{n}"))
            .with_expires_in(Duration::from_secs(3600)))
    }

    async fn execute_request(&self, _: &Context, _: ApiRequest<'_>) -> Result<Value> {
        Err(Error::unexpected("not used"))
    }

    async fn resource_owner(&self, _: &Context, _: &AccessToken) -> Result<ResourceOwner> {
        Err(Error::unexpected("not used"))
    }
}
