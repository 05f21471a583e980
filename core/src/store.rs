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

use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::sync::{Arc, Mutex};

use crate::{AccessToken, Result, TokenSource};

/// TokenStore is the caller supplied persistence for access tokens.
///
/// The SDK never keeps tokens anywhere but in memory. Every process that may
/// refresh a token must be able to see the token saved by the others through
/// [`TokenStore::load`].
#[async_trait::async_trait]
pub trait TokenStore: Debug + Send + Sync {
    /// Load the current token.
    ///
    /// Returning `Ok(None)` means there is no token to work with, which the
    /// token manager reports as an invalid token.
    async fn load(&self) -> Result<Option<TokenSource>>;

    /// Persist a freshly refreshed token.
    ///
    /// Stores that do not persist anything can keep the default.
    async fn save(&self, token: &AccessToken) -> Result<()> {
        let _ = token;
        Ok(())
    }
}

type LoadFn = dyn Fn() -> Result<Option<TokenSource>> + Send + Sync;
type SaveFn = dyn Fn(&AccessToken) -> Result<()> + Send + Sync;

/// FnTokenStore adapts a pair of closures into a [`TokenStore`].
///
/// ```
/// use lockme_core::{FnTokenStore, TokenSource};
///
/// let store = FnTokenStore::new(|| {
///     Ok(Some(TokenSource::Raw(std::fs::read_to_string("token.json")?)))
/// })
/// .with_save(|token| Ok(std::fs::write("token.json", token.to_json()?)?));
/// ```
#[derive(Clone)]
pub struct FnTokenStore {
    load: Arc<LoadFn>,
    save: Option<Arc<SaveFn>>,
}

impl Debug for FnTokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTokenStore")
            .field("save", &self.save.is_some())
            .finish_non_exhaustive()
    }
}

impl FnTokenStore {
    /// Create a store that only knows how to load.
    pub fn new(load: impl Fn() -> Result<Option<TokenSource>> + Send + Sync + 'static) -> Self {
        Self {
            load: Arc::new(load),
            save: None,
        }
    }

    /// Persist refreshed tokens with `save`.
    pub fn with_save(mut self, save: impl Fn(&AccessToken) -> Result<()> + Send + Sync + 'static) -> Self {
        self.save = Some(Arc::new(save));
        self
    }
}

#[async_trait::async_trait]
impl TokenStore for FnTokenStore {
    async fn load(&self) -> Result<Option<TokenSource>> {
        (self.load)()
    }

    async fn save(&self, token: &AccessToken) -> Result<()> {
        match &self.save {
            Some(save) => save(token),
            None => Ok(()),
        }
    }
}

/// SessionStore keeps per-user values between the authorization redirect
/// and its callback.
pub trait SessionStore: Send {
    /// Get a value.
    fn get(&self, key: &str) -> Option<String>;

    /// Set a value, replacing any previous one.
    fn set(&mut self, key: &str, value: String);

    /// Remove a value, returning it if present.
    fn remove(&mut self, key: &str) -> Option<String>;
}

/// MemorySession is a [`SessionStore`] backed by a shared map.
///
/// Clones share the same values.
#[derive(Clone, Debug, Default)]
pub struct MemorySession {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl SessionStore for MemorySession {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().expect("lock poisoned").get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values
            .lock()
            .expect("lock poisoned")
            .insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) -> Option<String> {
        self.values.lock().expect("lock poisoned").remove(key)
    }
}

impl SessionStore for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) -> Option<String> {
        HashMap::remove(self, key)
    }
}
