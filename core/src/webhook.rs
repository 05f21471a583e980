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

//! Verification of payloads Lockme pushes to partner endpoints.

use log::warn;
use serde_json::Value;

use crate::hash::hex_sha1_concat;
use crate::utils::constant_time_eq;
use crate::{decode_body, Error, Result};

/// Compute the signature Lockme sends for `body`: hex `sha1(body ++ secret)`.
pub fn payload_signature(body: &[u8], secret: &str) -> String {
    hex_sha1_concat(&[body, secret.as_bytes()])
}

/// Verify `signature` against `body` and decode the body.
///
/// The comparison is exact and case-sensitive. On mismatch the body is not
/// decoded at all.
pub fn verify_payload(body: &[u8], secret: &str, signature: &str) -> Result<Value> {
    let expected = payload_signature(body, secret);
    if !constant_time_eq(expected.as_bytes(), signature.as_bytes()) {
        warn!("rejected inbound payload with wrong signature");
        return Err(Error::signature_mismatch("Wrong signature"));
    }

    decode_body(body)
}
