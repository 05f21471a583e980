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

use crate::{Error, Result};
use bytes::Bytes;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

/// Context provides the collaborators used by the Lockme clients.
///
/// ## Important
///
/// lockme provides NO default implementations. Users MAY configure components they need.
/// Any unconfigured component will use a no-op implementation that returns errors or empty values when called.
///
/// ## Example
///
/// ```
/// use lockme_core::{Context, MemoryLock, OsEnv};
///
/// // Create a context with explicit implementations
/// let ctx = Context::new()
///     .with_env(OsEnv)
///     .with_lock(MemoryLock::default());
/// ```
#[derive(Clone)]
pub struct Context {
    http: Arc<dyn HttpSend>,
    env: Arc<dyn Env>,
    lock: Arc<dyn Lock>,
}

impl Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("http", &self.http)
            .field("env", &self.env)
            .field("lock", &self.lock)
            .finish()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Create a new Context with no-op implementations.
    ///
    /// All components use no-op implementations by default.
    /// Use the `with_*` methods to configure the components you need.
    pub fn new() -> Self {
        Self {
            http: Arc::new(NoopHttpSend),
            env: Arc::new(NoopEnv),
            lock: Arc::new(NoopLock),
        }
    }

    /// Replace the HTTP client implementation.
    pub fn with_http_send(mut self, http: impl HttpSend) -> Self {
        self.http = Arc::new(http);
        self
    }

    /// Replace the environment implementation.
    pub fn with_env(mut self, env: impl Env) -> Self {
        self.env = Arc::new(env);
        self
    }

    /// Replace the lock backend.
    pub fn with_lock(mut self, lock: impl Lock) -> Self {
        self.lock = Arc::new(lock);
        self
    }

    /// Replace the lock backend with one that is already shared.
    ///
    /// Useful when several contexts must contend on the same in-process lock.
    pub fn with_shared_lock(mut self, lock: Arc<dyn Lock>) -> Self {
        self.lock = lock;
        self
    }

    /// Send http request and return the response.
    #[inline]
    pub async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        self.http.http_send(req).await
    }

    /// Get the environment variable.
    ///
    /// - Returns `Some(v)` if the environment variable is found and is valid utf-8.
    /// - Returns `None` if the environment variable is not found or value is invalid.
    #[inline]
    pub fn env_var(&self, key: &str) -> Option<String> {
        self.env.var(key)
    }

    /// Wait until the named resource is exclusively ours.
    #[inline]
    pub async fn lock_acquire(&self, resource: &str) -> Result<()> {
        self.lock.acquire(resource).await
    }

    /// Give up ownership of the named resource.
    #[inline]
    pub async fn lock_release(&self, resource: &str) -> Result<()> {
        self.lock.release(resource).await
    }
}

/// HttpSend is used to send http requests to the Lockme API and its OAuth2 endpoints.
///
/// This trait is designed especially for the SDK, please don't use it as a general http client.
#[async_trait::async_trait]
pub trait HttpSend: Debug + Send + Sync + 'static {
    /// Send http request and return the response.
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>>;
}

/// Permits parameterizing configuration lookups.
pub trait Env: Debug + Send + Sync + 'static {
    /// Get an environment variable.
    ///
    /// - Returns `Some(v)` if the environment variable is found and is valid utf-8.
    /// - Returns `None` if the environment variable is not found or value is invalid.
    fn var(&self, key: &str) -> Option<String>;
}

/// Lock provides mutual exclusion on a named resource.
///
/// Implementations must make ownership visible to every process sharing the
/// backend, not only to tasks of the current one. `acquire` waits for as long
/// as it takes; backends that need a timeout or a TTL configure it themselves.
#[async_trait::async_trait]
pub trait Lock: Debug + Send + Sync + 'static {
    /// Wait until `resource` is exclusively held by the caller.
    async fn acquire(&self, resource: &str) -> Result<()>;

    /// Release `resource` previously obtained by [`Lock::acquire`].
    async fn release(&self, resource: &str) -> Result<()>;
}

/// Implements Env for the OS context, both Unix style and Windows.
#[derive(Debug, Copy, Clone)]
pub struct OsEnv;

impl Env for OsEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var_os(key)?.into_string().ok()
    }
}

/// StaticEnv provides a static env environment.
///
/// This is useful for testing or for providing a fixed environment.
#[derive(Debug, Clone, Default)]
pub struct StaticEnv {
    /// The environment variables to use.
    pub envs: HashMap<String, String>,
}

impl Env for StaticEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.envs.get(key).cloned()
    }
}

/// NoopHttpSend is a no-op implementation that always returns an error.
///
/// This is used when no HTTP client is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHttpSend;

#[async_trait::async_trait]
impl HttpSend for NoopHttpSend {
    async fn http_send(&self, _req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        Err(Error::unexpected(
            "HTTP sending not supported: no HTTP client configured",
        ))
    }
}

/// NoopEnv is a no-op implementation that always returns None/empty.
///
/// This is used when no environment is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEnv;

impl Env for NoopEnv {
    fn var(&self, _key: &str) -> Option<String> {
        None
    }
}

/// NoopLock is a no-op implementation that always returns an error.
///
/// This is used when no lock backend is configured. Refreshing an expired
/// token through the coordinated path fails until one is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLock;

#[async_trait::async_trait]
impl Lock for NoopLock {
    async fn acquire(&self, resource: &str) -> Result<()> {
        Err(Error::unexpected(format!(
            "locking {resource} not supported: no lock backend configured"
        )))
    }

    async fn release(&self, resource: &str) -> Result<()> {
        Err(Error::unexpected(format!(
            "unlocking {resource} not supported: no lock backend configured"
        )))
    }
}
