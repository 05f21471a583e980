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

//! File based cross-process lock for the Lockme SDK.
//!
//! Every resource maps to `<dir>/<resource>.lock`, guarded by an exclusive
//! advisory lock (`flock` on unix, `LockFileEx` on windows). All processes
//! pointing at the same directory contend on the same locks, which is what
//! token refresh coordination needs in multi-worker deployments.
//!
//! ## Example
//!
//! ```no_run
//! use lockme_core::Context;
//! use lockme_lock_file::FileLock;
//!
//! let ctx = Context::new().with_lock(FileLock::new("/var/run/lockme"));
//! ```
//!
//! The lock file is left in place after release, only the advisory lock is
//! dropped. A process that dies while holding a lock releases it with its
//! file descriptors, so abandoned locks do not outlive their owner.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fs2::FileExt;
use log::debug;
use lockme_core::{Error, Lock, Result};

/// FileLock implements [`Lock`] on top of lock files in a directory.
#[derive(Clone, Debug)]
pub struct FileLock {
    dir: PathBuf,
    held: Arc<Mutex<HashMap<String, File>>>,
}

impl FileLock {
    /// Create a lock backend keeping its lock files under `dir`.
    ///
    /// The directory is created on first use.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            held: Arc::default(),
        }
    }

    /// The directory holding the lock files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, resource: &str) -> PathBuf {
        let name: String = resource
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.lock"))
    }
}

#[async_trait]
impl Lock for FileLock {
    async fn acquire(&self, resource: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            Error::unexpected(format!(
                "failed to create lock directory {}",
                self.dir.display()
            ))
            .with_source(e)
        })?;

        let path = self.path(resource);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| {
                Error::unexpected(format!("failed to open lock file {}", path.display()))
                    .with_source(e)
            })?;

        debug!("waiting for file lock {}", path.display());
        let file = tokio::task::spawn_blocking(move || {
            FileExt::lock_exclusive(&file).map(|_| file)
        })
        .await
        .map_err(|e| Error::unexpected("lock task failed").with_source(e))?
        .map_err(|e| {
            Error::unexpected(format!("failed to lock {}", path.display())).with_source(e)
        })?;

        self.held
            .lock()
            .expect("lock poisoned")
            .insert(resource.to_string(), file);
        debug!("acquired file lock {}", path.display());
        Ok(())
    }

    async fn release(&self, resource: &str) -> Result<()> {
        let file = self
            .held
            .lock()
            .expect("lock poisoned")
            .remove(resource)
            .ok_or_else(|| {
                Error::unexpected(format!("lock {resource} released without being held"))
            })?;

        FileExt::unlock(&file).map_err(|e| {
            Error::unexpected(format!("failed to unlock {resource}")).with_source(e)
        })?;
        debug!("released file lock {}", self.path(resource).display());
        Ok(())
    }
}
