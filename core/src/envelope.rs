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

//! Response decoding shared by the Lockme clients.

use log::debug;
use serde_json::Value;

use crate::{Error, Result};

/// Decode a response body as JSON. An empty body decodes to `null`.
pub fn decode_body(body: &[u8]) -> Result<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }

    serde_json::from_slice(body).map_err(|e| {
        Error::unexpected(format!(
            "failed to decode response: {}",
            String::from_utf8_lossy(body)
        ))
        .with_source(e)
    })
}

/// Turn an error envelope into [`crate::ErrorKind::Api`].
///
/// Any object carrying an `error` key fails, whatever the key holds: even
/// `{"error": false}` is an error. The HTTP status plays no part. String
/// values become the message verbatim, anything else its JSON text.
pub fn check_envelope(value: Value) -> Result<Value> {
    let Some(err) = value.as_object().and_then(|obj| obj.get("error")) else {
        return Ok(value);
    };

    let message = match err {
        Value::String(s) => s.clone(),
        v => v.to_string(),
    };
    debug!("api returned error envelope: {message}");
    Err(Error::api(message))
}

/// Loose truthiness of a JSON value.
///
/// `null`, `false`, `0`, `0.0`, `""`, `"0"`, `[]` and `{}` are falsy;
/// everything else is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Check that every `(field, message)` pair names a truthy field of `data`.
///
/// Fails with [`crate::ErrorKind::Validation`] carrying the message of the
/// first missing field.
pub fn require_fields(data: &Value, fields: &[(&str, &str)]) -> Result<()> {
    for (field, message) in fields {
        if !data.get(*field).is_some_and(is_truthy) {
            return Err(Error::validation(*message));
        }
    }
    Ok(())
}
