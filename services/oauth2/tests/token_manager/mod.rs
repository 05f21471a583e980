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

use std::sync::Arc;
use std::time::Duration;

use lockme_core::{Context, ErrorKind, Lock, REFRESH_TOKEN_LOCK};
use lockme_oauth2::TokenManager;
use pretty_assertions::assert_eq;

use crate::support::{expired_token, init_logger, valid_token, SharedStore, SlowProvider, SpyLock};

#[tokio::test]
async fn test_valid_token_never_takes_the_lock() {
    init_logger();
    let lock = Arc::new(SpyLock::default());
    let provider = Arc::new(SlowProvider::default());
    let ctx = Context::new().with_shared_lock(lock.clone());
    let store = SharedStore::new(&valid_token());

    let manager = TokenManager::new(provider.clone());
    let token = manager.load_token(&ctx, &store).await.unwrap();

    assert_eq!(token.access_token, "valid-access-token");
    assert_eq!(lock.acquires(), 0);
    assert_eq!(lock.releases(), 0);
    assert_eq!(provider.refreshes(), 0);
    assert_eq!(store.saves(), 0);
    assert_eq!(manager.token(), Some(token));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_racers_refresh_once() {
    init_logger();
    let lock = Arc::new(SpyLock::default());
    let provider = Arc::new(SlowProvider::new(Duration::from_millis(50)));
    let store = SharedStore::new(&expired_token());

    let mut racers = Vec::new();
    for _ in 0..8 {
        // One manager per racer, as every worker process has its own.
        let manager = TokenManager::new(provider.clone());
        let ctx = Context::new().with_shared_lock(lock.clone());
        let store = store.clone();
        racers.push(tokio::spawn(async move {
            manager.load_token(&ctx, &store).await
        }));
    }

    for racer in racers {
        let token = racer.await.unwrap().unwrap();
        assert_eq!(token.access_token, "fresh-1");
    }

    assert_eq!(provider.refreshes(), 1);
    assert_eq!(store.saves(), 1);
    assert_eq!(store.current().access_token, "fresh-1");
    assert_eq!(store.current().refresh_token.as_deref(), Some("refresh-1"));
    assert_eq!(lock.acquires(), lock.releases());
}

#[tokio::test]
async fn test_token_refreshed_while_waiting_is_reused() {
    init_logger();
    let lock = Arc::new(SpyLock::default());
    let provider = Arc::new(SlowProvider::default());
    let ctx = Context::new().with_shared_lock(lock.clone());
    let store = SharedStore::new(&expired_token());

    // Someone else holds the lock and refreshes in the meantime.
    lock.acquire(REFRESH_TOKEN_LOCK).await.unwrap();
    let waiter = {
        let manager = TokenManager::new(provider.clone());
        let ctx = ctx.clone();
        let store = store.clone();
        tokio::spawn(async move { manager.load_token(&ctx, &store).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!waiter.is_finished());

    lockme_core::TokenStore::save(&store, &valid_token()).await.unwrap();
    lock.release(REFRESH_TOKEN_LOCK).await.unwrap();

    let token = waiter.await.unwrap().unwrap();
    assert_eq!(token.access_token, "valid-access-token");
    assert_eq!(provider.refreshes(), 0);
}

#[tokio::test]
async fn test_lock_released_when_refresh_fails() {
    init_logger();
    let lock = Arc::new(SpyLock::default());
    let provider = Arc::new(SlowProvider::failing());
    let ctx = Context::new().with_shared_lock(lock.clone());
    let store = SharedStore::new(&expired_token());

    let manager = TokenManager::new(provider.clone());
    let err = manager.load_token(&ctx, &store).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::IdentityProvider);
    assert_eq!(lock.acquires(), 1);
    assert_eq!(lock.releases(), 1);
    assert_eq!(store.saves(), 0);
    assert_eq!(store.current().access_token, "stale-access-token");

    // Nobody is left waiting on an abandoned lock.
    tokio::time::timeout(Duration::from_secs(1), lock.acquire(REFRESH_TOKEN_LOCK))
        .await
        .expect("lock must be free after a failed refresh")
        .unwrap();
}

#[tokio::test]
async fn test_expired_token_without_lock_backend_fails() {
    init_logger();
    let provider = Arc::new(SlowProvider::default());
    let store = SharedStore::new(&expired_token());

    let manager = TokenManager::new(provider.clone());
    let err = manager
        .load_token(&Context::new(), &store)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unexpected);
    assert_eq!(provider.refreshes(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancelled_caller_does_not_strand_the_lock() {
    init_logger();
    let lock = Arc::new(SpyLock::default());
    let provider = Arc::new(SlowProvider::new(Duration::from_millis(500)));
    let ctx = Context::new().with_shared_lock(lock.clone());
    let store = SharedStore::new(&expired_token());

    // The caller gives up long before the provider answers.
    let impatient = TokenManager::new(provider.clone());
    let cancelled =
        tokio::time::timeout(Duration::from_millis(100), impatient.load_token(&ctx, &store)).await;
    assert!(cancelled.is_err());

    let manager = TokenManager::new(provider.clone());
    let token = tokio::time::timeout(Duration::from_secs(5), manager.load_token(&ctx, &store))
        .await
        .expect("lock must be released by the abandoned refresh")
        .unwrap();

    // The abandoned refresh ran to completion and its result was reused.
    assert_eq!(token.access_token, "fresh-1");
    assert_eq!(provider.refreshes(), 1);
    assert_eq!(store.saves(), 1);
    assert_eq!(lock.acquires(), 2);
    assert_eq!(lock.releases(), 2);
}
