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

// Env values used in lockme-oauth2.
pub const LOCKME_CLIENT_ID: &str = "LOCKME_CLIENT_ID";
pub const LOCKME_CLIENT_SECRET: &str = "LOCKME_CLIENT_SECRET";
pub const LOCKME_REDIRECT_URI: &str = "LOCKME_REDIRECT_URI";
pub const LOCKME_API_DOMAIN: &str = "LOCKME_API_DOMAIN";
pub const LOCKME_API_VERSION: &str = "LOCKME_API_VERSION";
pub const LOCKME_TOKEN_EXPIRY_GRACE: &str = "LOCKME_TOKEN_EXPIRY_GRACE";

// Defaults.
pub const DEFAULT_API_DOMAIN: &str = "https://api.lock.me";
pub const DEFAULT_API_VERSION: &str = "v2.0";

/// Session key holding the state issued with the authorization url.
pub const SESSION_STATE_KEY: &str = "oauth2_state";

/// Scope separator used in the authorization url.
pub const SCOPE_SEPARATOR: &str = ",";
