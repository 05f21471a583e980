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

// Env values used in the partner API.
pub const LOCKME_PARTNER_KEY: &str = "LOCKME_PARTNER_KEY";
pub const LOCKME_PARTNER_SECRET: &str = "LOCKME_PARTNER_SECRET";
pub const LOCKME_PARTNER_ENDPOINT: &str = "LOCKME_PARTNER_ENDPOINT";
pub const LOCKME_PARTNER_VERSION: &str = "LOCKME_PARTNER_VERSION";

pub const DEFAULT_ENDPOINT: &str = "https://lockme.pl/api";
pub const DEFAULT_VERSION: &str = "1.0";

// Headers used in the partner API.
pub const X_PARTNER_KEY: &str = "partner-key";
pub const X_SIGNATURE: &str = "signature";

/// Parameters signed when a call carries none.
pub const EMPTY_PARAMS: &str = "[]";
