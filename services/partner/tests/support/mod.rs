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

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use http::StatusCode;
use lockme_core::{HttpSend, Result};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenv::dotenv();
}

#[derive(Debug, Default)]
struct MockState {
    requests: Vec<http::Request<Bytes>>,
    responses: VecDeque<(StatusCode, String)>,
}

/// Records requests, answers with queued responses or `200 null`.
#[derive(Clone, Debug, Default)]
pub struct MockHttpSend {
    state: Arc<Mutex<MockState>>,
}

impl MockHttpSend {
    pub fn respond(&self, status: StatusCode, body: &str) -> &Self {
        self.state
            .lock()
            .unwrap()
            .responses
            .push_back((status, body.to_string()));
        self
    }

    /// Method, uri, signature header and body of every request, in order.
    pub fn seen(&self) -> Vec<(String, String, String, String)> {
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .map(|req| {
                (
                    req.method().to_string(),
                    req.uri().to_string(),
                    req.headers()["signature"].to_str().unwrap().to_string(),
                    String::from_utf8_lossy(req.body()).to_string(),
                )
            })
            .collect()
    }

    pub fn partner_key(&self, idx: usize) -> String {
        self.state.lock().unwrap().requests[idx].headers()["partner-key"]
            .to_str()
            .unwrap()
            .to_string()
    }

    pub fn content_type(&self, idx: usize) -> String {
        self.state.lock().unwrap().requests[idx].headers()["content-type"]
            .to_str()
            .unwrap()
            .to_string()
    }
}

#[async_trait]
impl HttpSend for MockHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(req);

        let (status, body) = state
            .responses
            .pop_front()
            .unwrap_or((StatusCode::OK, "null".to_string()));
        Ok(http::Response::builder()
            .status(status)
            .body(Bytes::from(body))
            .unwrap())
    }
}
