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

use anyhow::Result;
use lockme::oauth2::{Config, Lockme};
use lockme::{Context, DefaultContext, FnTokenStore, TokenSource};
use lockme_lock_file::FileLock;
use serde_json::json;

const TOKEN_FILE: &str = "lockme-token.json";

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    // Every worker on this host contends on the same lock file.
    let ctx = Context::from(DefaultContext::new()).with_lock(FileLock::new(std::env::temp_dir()));
    let config = Config::new().from_env(&ctx);
    let lockme = Lockme::new(ctx, config);

    let store = FnTokenStore::new(|| {
        Ok(Some(TokenSource::Raw(std::fs::read_to_string(TOKEN_FILE)?)))
    })
    .with_save(|token| Ok(std::fs::write(TOKEN_FILE, token.to_json()?)?));
    let token = lockme.load_access_token(&store).await?;
    println!("using token for account {:?}", token.resource_owner_id);

    let rooms = lockme.room_list(None).await?;
    println!("rooms: {rooms}");

    let created = lockme
        .add_reservation(
            &json!({
                "roomid": 1,
                "date": "2030-01-01",
                "hour": "18:00",
                "people": 4,
                "name": "Jan",
                "email": "jan@example.com",
            }),
            None,
        )
        .await?;
    println!("created reservation: {created}");

    Ok(())
}
