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

//! Core components for the Lockme SDK.
//!
//! This crate provides the foundational types and traits shared by every
//! Lockme client. It defines the collaborator seams the clients are built on,
//! so transports, locks and storage can be swapped without touching the
//! token lifecycle.
//!
//! ## Overview
//!
//! The crate is built around several key concepts:
//!
//! - **Context**: A container that holds implementations for HTTP sending, environment access and cross-process locking
//! - **Token**: The OAuth2 [`AccessToken`] and the [`TokenSource`] it can be loaded from
//! - **Stores**: Caller supplied persistence for tokens ([`TokenStore`]) and CSRF state ([`SessionStore`])
//! - **Envelope**: Translation of API error bodies into typed failures
//!
//! ## Example
//!
//! ```
//! use lockme_core::{AccessToken, Context, MemoryLock, TokenSource};
//!
//! let ctx = Context::new().with_lock(MemoryLock::default());
//!
//! let raw = r#"{"access_token":"abc","refresh_token":"def","expires":4102444800}"#;
//! let token = TokenSource::Raw(raw.to_string()).resolve().unwrap();
//! assert!(!token.is_expired());
//! # let _ = ctx;
//! ```
//!
//! ## Traits
//!
//! This crate defines several important traits:
//!
//! - [`HttpSend`]: For sending HTTP requests
//! - [`Env`]: For environment variable access
//! - [`Lock`]: For cross-process mutual exclusion
//! - [`TokenStore`]: For loading and persisting tokens
//! - [`SessionStore`]: For keeping authorization state between redirects
//!
//! ## Utilities
//!
//! - [`hash`]: Cryptographic hashing utilities
//! - [`time`]: Time manipulation utilities
//! - [`utils`]: General utilities including data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod context;
pub use context::{Context, Env, HttpSend, Lock, NoopEnv, NoopHttpSend, NoopLock, OsEnv, StaticEnv};
mod error;
pub use error::{Error, ErrorKind, Result};
mod token;
pub use token::{AccessToken, TokenSource};
mod store;
pub use store::{FnTokenStore, MemorySession, SessionStore, TokenStore};
mod lock;
pub use lock::{MemoryLock, REFRESH_TOKEN_LOCK};
mod envelope;
pub use envelope::{check_envelope, decode_body, is_truthy, require_fields};
mod webhook;
pub use webhook::{payload_signature, verify_payload};
