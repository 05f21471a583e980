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
use std::sync::{Arc, Mutex};

use log::debug;
use tokio::sync::Semaphore;

use crate::{Error, Lock, Result};

/// Name of the resource guarding token refreshes.
pub const REFRESH_TOKEN_LOCK: &str = "refresh-token";

/// MemoryLock is an in-process [`Lock`] built on one semaphore per resource.
///
/// Ownership is only visible to tasks sharing this value (clones share it
/// too). Deployments running several processes need a cross-process backend
/// such as a file lock instead.
#[derive(Clone, Debug, Default)]
pub struct MemoryLock {
    resources: Arc<Mutex<HashMap<String, Arc<Semaphore>>>>,
}

impl MemoryLock {
    fn semaphore(&self, resource: &str) -> Arc<Semaphore> {
        self.resources
            .lock()
            .expect("lock poisoned")
            .entry(resource.to_string())
            .or_insert_with(|| Arc::new(Semaphore::new(1)))
            .clone()
    }
}

#[async_trait::async_trait]
impl Lock for MemoryLock {
    async fn acquire(&self, resource: &str) -> Result<()> {
        let semaphore = self.semaphore(resource);
        let permit = semaphore.acquire().await.map_err(|e| {
            Error::unexpected(format!("lock {resource} is closed")).with_source(e)
        })?;
        // Ownership outlives this call, it ends in `release`.
        permit.forget();

        debug!("acquired in-process lock {resource}");
        Ok(())
    }

    async fn release(&self, resource: &str) -> Result<()> {
        let semaphore = self.semaphore(resource);
        if semaphore.available_permits() > 0 {
            return Err(Error::unexpected(format!(
                "lock {resource} released without being held"
            )));
        }
        semaphore.add_permits(1);

        debug!("released in-process lock {resource}");
        Ok(())
    }
}
