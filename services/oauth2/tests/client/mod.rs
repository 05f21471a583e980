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

use std::collections::HashMap;

use chrono::{NaiveDate, Weekday};
use http::{Method, StatusCode};
use lockme_core::{AccessToken, Context, ErrorKind, MemorySession, OsEnv, SessionStore};
use lockme_oauth2::{Config, Lockme, SESSION_STATE_KEY};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::support::{init_logger, valid_token, MockHttpSend};

fn client(http: &MockHttpSend) -> Lockme {
    let ctx = Context::new().with_http_send(http.clone());
    let config = Config::new()
        .with_client_id("client")
        .with_client_secret("secret")
        .with_redirect_uri("https://partner.example/callback");
    Lockme::new(ctx, config)
}

fn client_with_token(http: &MockHttpSend) -> Lockme {
    let lockme = client(http);
    lockme.token_manager().set_token(valid_token());
    lockme
}

#[tokio::test]
async fn test_operations_map_to_fixed_routes() {
    init_logger();
    let http = MockHttpSend::default();
    let lockme = client_with_token(&http);
    let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
    let data = json!({"roomid": 5, "date": "2024-03-09", "hour": "18:00"});

    lockme.test(None).await.unwrap();
    lockme.room_list(None).await.unwrap();
    lockme.reservation(5, "77", None).await.unwrap();
    lockme.add_reservation(&data, None).await.unwrap();
    lockme.edit_reservation(5, "77", &data, None).await.unwrap();
    lockme.move_reservation(5, "77", &data, None).await.unwrap();
    lockme.delete_reservation(5, "77", None).await.unwrap();
    lockme.get_message(12, None).await.unwrap();
    lockme.mark_message_read(12, None).await.unwrap();
    lockme.get_day_settings(5, Weekday::Wed, None).await.unwrap();
    lockme
        .set_day_settings(5, Weekday::Sun, &json!([]), None)
        .await
        .unwrap();
    lockme.get_date_settings(5, date, None).await.unwrap();
    lockme
        .set_date_settings(5, date, &json!([]), None)
        .await
        .unwrap();

    let seen: Vec<(Method, String)> = http
        .requests()
        .into_iter()
        .map(|r| (r.method, r.uri))
        .collect();
    let base = "https://api.lock.me/v2.0";
    let expected: Vec<(Method, String)> = vec![
        (Method::GET, "/test"),
        (Method::GET, "/rooms"),
        (Method::GET, "/room/5/reservation/77"),
        (Method::PUT, "/room/5/reservation"),
        (Method::POST, "/room/5/reservation/77"),
        (Method::POST, "/room/5/reservation/77/move"),
        (Method::DELETE, "/room/5/reservation/77"),
        (Method::GET, "/message/12"),
        (Method::POST, "/message/12"),
        (Method::GET, "/room/5/day/2"),
        (Method::POST, "/room/5/day/6"),
        (Method::GET, "/room/5/date/2024-03-09"),
        (Method::POST, "/room/5/date/2024-03-09"),
    ]
    .into_iter()
    .map(|(m, p)| (m, format!("{base}{p}")))
    .collect();
    assert_eq!(seen, expected);
}

#[tokio::test]
async fn test_request_carries_bearer_and_json_body() {
    init_logger();
    let http = MockHttpSend::default();
    http.respond(StatusCode::OK, r#"{"id": 991}"#);
    let lockme = client_with_token(&http);

    let data = json!({"roomid": "5", "date": "2024-03-09", "hour": "18:00", "people": 4});
    let created = lockme.add_reservation(&data, None).await.unwrap();
    assert_eq!(created, json!({"id": 991}));

    let req = &http.requests()[0];
    assert_eq!(req.uri, "https://api.lock.me/v2.0/room/5/reservation");
    assert_eq!(
        req.header("authorization").as_deref(),
        Some("Bearer valid-access-token")
    );
    assert_eq!(req.header("content-type").as_deref(), Some("application/json"));
    assert_eq!(serde_json::from_slice::<serde_json::Value>(&req.body).unwrap(), data);
}

#[tokio::test]
async fn test_token_override_wins_over_held_token() {
    init_logger();
    let http = MockHttpSend::default();
    let lockme = client_with_token(&http);

    let other = AccessToken::new("other-access-token");
    lockme.room_list(Some(&other)).await.unwrap();

    assert_eq!(
        http.requests()[0].header("authorization").as_deref(),
        Some("Bearer other-access-token")
    );
}

#[tokio::test]
async fn test_missing_token_sends_nothing() {
    init_logger();
    let http = MockHttpSend::default();
    let lockme = client(&http);

    let err = lockme.room_list(None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidToken);
    assert!(http.requests().is_empty());
}

#[tokio::test]
async fn test_add_reservation_validates_before_sending() {
    init_logger();
    let http = MockHttpSend::default();
    let lockme = client_with_token(&http);

    let cases = [
        (json!({"roomid": 0, "date": "2024-01-01", "hour": "10:00"}), "No room ID"),
        (json!({"date": "2024-01-01", "hour": "10:00"}), "No room ID"),
        (json!({"roomid": 5, "date": "", "hour": "10:00"}), "No date"),
        (json!({"roomid": 5, "date": "2024-01-01", "hour": null}), "No hour"),
    ];
    for (data, message) in cases {
        let err = lockme.add_reservation(&data, None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.message(), message);
    }

    assert!(http.requests().is_empty());
}

#[tokio::test]
async fn test_error_envelope_fails_regardless_of_status() {
    init_logger();
    let http = MockHttpSend::default();
    http.respond(StatusCode::OK, r#"{"error": "Room full"}"#)
        .respond(StatusCode::OK, r#"{"error": false}"#)
        .respond(StatusCode::INTERNAL_SERVER_ERROR, r#"[{"id": 1}]"#)
        .respond(StatusCode::OK, "true");
    let lockme = client_with_token(&http);

    let err = lockme.room_list(None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Api);
    assert_eq!(err.message(), "Room full");

    // Presence of the key is enough, whatever it holds.
    let err = lockme.room_list(None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Api);

    assert_eq!(lockme.room_list(None).await.unwrap(), json!([{"id": 1}]));
    assert_eq!(lockme.mark_message_read(3, None).await.unwrap(), json!(true));
}

#[tokio::test]
async fn test_authorization_flow() {
    init_logger();
    let http = MockHttpSend::default();
    http.respond(
        StatusCode::OK,
        r#"{"access_token": "issued", "refresh_token": "r1", "expires_in": 3600, "token_type": "Bearer"}"#,
    );
    let lockme = client(&http);
    let mut session = MemorySession::default();

    let url = lockme
        .authorization_url(&mut session, &["rooms_manage"])
        .unwrap();
    let state = session.get(SESSION_STATE_KEY).unwrap();
    assert!(url.contains(&format!("state={state}")));

    let token = lockme
        .token_for_code(&mut session, "the-code", &state)
        .await
        .unwrap();
    assert_eq!(token.access_token, "issued");
    assert_eq!(lockme.token_manager().token(), Some(token));
    assert_eq!(session.get(SESSION_STATE_KEY), None);

    let req = &http.requests()[0];
    assert_eq!(req.method, Method::POST);
    assert_eq!(req.uri, "https://api.lock.me/access_token");
    let form: HashMap<String, String> = form_urlencoded::parse(&req.body)
        .into_owned()
        .collect();
    assert_eq!(form["grant_type"], "authorization_code");
    assert_eq!(form["code"], "the-code");
    assert_eq!(form["client_id"], "client");
    assert_eq!(form["redirect_uri"], "https://partner.example/callback");
}

#[tokio::test]
async fn test_state_mismatch_clears_session() {
    init_logger();
    let http = MockHttpSend::default();
    let lockme = client(&http);
    let mut session: HashMap<String, String> = HashMap::new();

    lockme.authorization_url(&mut session, &[]).unwrap();
    let err = lockme
        .token_for_code(&mut session, "the-code", "forged")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::StateMismatch);
    assert!(!session.contains_key(SESSION_STATE_KEY));
    assert!(http.requests().is_empty());

    // Without a stored state nothing can match, not even an empty one.
    let err = lockme
        .token_for_code(&mut session, "the-code", "")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StateMismatch);
}

#[tokio::test]
async fn test_refresh_token_uses_held_token() {
    init_logger();
    let http = MockHttpSend::default();
    http.respond(
        StatusCode::OK,
        r#"{"access_token": "renewed", "expires_in": 3600}"#,
    );
    let lockme = client_with_token(&http);

    let token = lockme.refresh_token(None).await.unwrap();
    assert_eq!(token.access_token, "renewed");
    assert_eq!(token.refresh_token.as_deref(), Some("refresh-0"));

    let form: HashMap<String, String> = form_urlencoded::parse(&http.requests()[0].body)
        .into_owned()
        .collect();
    assert_eq!(form["grant_type"], "refresh_token");
    assert_eq!(form["refresh_token"], "refresh-0");
}

#[tokio::test]
async fn test_resource_owner() {
    init_logger();
    let http = MockHttpSend::default();
    http.respond(StatusCode::OK, r#"{"id": 314, "name": "Escape Room"}"#);
    let lockme = client_with_token(&http);

    let owner = lockme.resource_owner(None).await.unwrap();
    assert_eq!(owner.id.as_deref(), Some("314"));
    assert_eq!(http.requests()[0].uri, "https://api.lock.me/v2.0/me");
}

#[test]
fn test_config_from_process_environment() {
    temp_env::with_vars(
        [
            ("LOCKME_CLIENT_ID", Some("env-client")),
            ("LOCKME_API_VERSION", Some("v2.1")),
            ("LOCKME_API_DOMAIN", None),
        ],
        || {
            let ctx = Context::new().with_env(OsEnv);
            let cfg = Config::new().with_client_id("code-client").from_env(&ctx);

            assert_eq!(cfg.client_id.as_deref(), Some("env-client"));
            assert_eq!(cfg.api_version, "v2.1");
            assert_eq!(cfg.api_domain, "https://api.lock.me");
        },
    );
}

#[tokio::test]
async fn test_path_values_cannot_change_the_route() {
    init_logger();
    let http = MockHttpSend::default();
    let lockme = client_with_token(&http);

    lockme.reservation(5, "77/move?x=1", None).await.unwrap();
    lockme
        .add_reservation(
            &json!({"roomid": "5/reservation/9", "date": "2024-03-09", "hour": "18:00"}),
            None,
        )
        .await
        .unwrap();

    let uris: Vec<String> = http.requests().into_iter().map(|r| r.uri).collect();
    assert_eq!(
        uris,
        vec![
            "https://api.lock.me/v2.0/room/5/reservation/77%2Fmove%3Fx%3D1".to_string(),
            "https://api.lock.me/v2.0/room/5%2Freservation%2F9/reservation".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_state_prefix_does_not_match() {
    init_logger();
    let http = MockHttpSend::default();
    let lockme = client(&http);
    let mut session = MemorySession::default();

    lockme.authorization_url(&mut session, &[]).unwrap();
    let state = session.get(SESSION_STATE_KEY).unwrap();

    let err = lockme
        .token_for_code(&mut session, "the-code", &state[..state.len() - 1])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StateMismatch);
    assert!(http.requests().is_empty());
}
