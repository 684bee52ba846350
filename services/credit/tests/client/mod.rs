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

use std::sync::Arc;

use creditsign_core::{Context, ErrorKind, Signer};
use creditsign_credit::{
    Client, Config, ConfigCredentialProvider, Credential, RequestBody, RequestSigner,
    StaticCredentialProvider,
};
use http::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE};
use http::Method;
use pretty_assertions::assert_eq;

use crate::RecordingHttpSend;

fn client_with(http: RecordingHttpSend) -> Client {
    let ctx = Context::new().with_http_send(http);
    Client::new(ctx, StaticCredentialProvider::new("ak1", "sk1"))
}

#[tokio::test]
async fn test_request_sends_signed_post() -> anyhow::Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    let http = RecordingHttpSend::default();
    let client = client_with(http.clone());

    let text = client
        .request(
            "https://api.example.com/v1/query?b=2&a=1",
            RequestBody::from([("id", "42"), ("name", "alice smith")]),
        )
        .await?;
    assert_eq!(text, r#"{"echo":"id=42&name=alice+smith"}"#);

    let requests = http.take_requests();
    assert_eq!(requests.len(), 1);
    let req = &requests[0];

    assert_eq!(req.method(), Method::POST);
    assert_eq!(
        req.uri().to_string(),
        "https://api.example.com/v1/query?a=1&b=2"
    );
    assert_eq!(req.body().as_ref(), b"id=42&name=alice+smith");
    assert_eq!(req.headers()[CONTENT_LENGTH], "22");
    assert_eq!(
        req.headers()[CONTENT_TYPE],
        "application/x-www-form-urlencoded"
    );
    assert_eq!(req.headers()["content-md5"].len(), 32);

    let authorization = req.headers()[AUTHORIZATION].to_str()?;
    assert!(authorization.starts_with("credit-v1/ak1/"));
    assert!(authorization.contains("/1800//"));
    Ok(())
}

#[tokio::test]
async fn test_request_with_json_payload() -> anyhow::Result<()> {
    let http = RecordingHttpSend::default();
    let client = client_with(http.clone());

    let body = RequestBody::try_from(serde_json::json!({"b": "2", "a": "1"}))?;
    client.request("https://api.example.com/v1", body).await?;

    let requests = http.take_requests();
    assert_eq!(requests[0].body().as_ref(), b"a=1&b=2");
    Ok(())
}

#[tokio::test]
async fn test_invalid_url_is_never_sent() {
    let http = RecordingHttpSend::default();
    let client = client_with(http.clone());

    let err = client
        .request("http://[::1", RequestBody::from("a=1"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidUrl);
    assert!(err.is_signing_error());
    assert!(http.take_requests().is_empty());
}

#[test]
fn test_unsupported_body_is_rejected_before_signing() {
    let err = RequestBody::try_from(serde_json::json!(12345)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedBody);
    assert!(err.is_signing_error());
}

#[tokio::test]
async fn test_missing_credential_is_never_sent() {
    let http = RecordingHttpSend::default();
    let ctx = Context::new().with_http_send(http.clone());
    let client = Client::new(
        ctx,
        ConfigCredentialProvider::new(Arc::new(Config::new())),
    );

    let err = client
        .request("https://api.example.com/v1", RequestBody::from("a=1"))
        .await
        .unwrap_err();

    assert!(err.is_credential_error());
    assert!(http.take_requests().is_empty());
}

#[tokio::test]
async fn test_transport_error_is_passed_through() {
    let http = RecordingHttpSend::failing();
    let client = client_with(http.clone());

    let err = client
        .request("https://api.example.com/v1", RequestBody::from("a=1"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unexpected);
    assert!(!err.is_signing_error());
    assert!(err.to_string().contains("connection reset by peer"));
    assert_eq!(http.take_requests().len(), 1);
}

#[tokio::test]
async fn test_client_with_signer_can_be_shared() -> anyhow::Result<()> {
    let http = RecordingHttpSend::default();
    let signer = Signer::new(
        Context::new().with_http_send(http.clone()),
        StaticCredentialProvider::new("ak1", "sk1"),
        RequestSigner::new(),
    );
    let client = Client::with_signer(signer);

    let mut handles = Vec::new();
    for i in 0..8 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client
                .request(
                    &format!("https://api.example.com/v1?page={i}"),
                    RequestBody::from(format!("n={i}")),
                )
                .await
        }));
    }
    for handle in handles {
        handle.await??;
    }

    let requests = http.take_requests();
    assert_eq!(requests.len(), 8);
    for req in &requests {
        let expected = Credential::new("ak1", "sk1");
        let authorization = req.headers()[AUTHORIZATION].to_str()?;
        assert!(authorization.starts_with(&format!("credit-v1/{}/", expected.access_key)));
    }
    Ok(())
}
