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

//! OAuth2 client for the Lockme booking API.
//!
//! - [`Lockme`] exposes the API: rooms, reservations, schedule settings and
//!   webhook messages, plus the authorization-code flow.
//! - [`TokenManager`] keeps the access token valid and makes concurrent
//!   refreshes across processes collapse into one.
//! - [`OAuth2Provider`] is the seam to the OAuth2 server, implemented for
//!   Lockme by [`LockmeProvider`].

mod constants;
pub use constants::SESSION_STATE_KEY;

mod config;
pub use config::Config;

mod provider;
pub use provider::{
    ApiRequest, AuthorizationRequest, Grant, LockmeProvider, OAuth2Provider, ResourceOwner,
};

mod token_manager;
pub use token_manager::TokenManager;

mod client;
pub use client::Lockme;
