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

use std::io::Read;

use anyhow::Result;
use lockme::partner::{Config, PartnerClient};
use lockme::{Context, DefaultContext};

/// Reads a pushed payload from stdin and its signature from the first
/// argument, then prints the decoded message.
fn main() -> Result<()> {
    env_logger::init();

    let ctx = Context::from(DefaultContext::new());
    let config = Config::new().from_env(&ctx);
    let partner = PartnerClient::new(ctx, config);

    let signature = std::env::args().nth(1).unwrap_or_default();
    let mut body = Vec::new();
    std::io::stdin().read_to_end(&mut body)?;

    let message = partner.decrypt(&body, &signature)?;
    println!("{message:#}");
    Ok(())
}
