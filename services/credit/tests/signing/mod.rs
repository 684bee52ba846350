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

use chrono::{TimeZone, Utc};
use creditsign_core::time::DateTime;
use creditsign_credit::{
    build_canonical_message, derive_signature, derive_signing_key, sign, Credential, RequestBody,
};
use http::header::AUTHORIZATION;
use http::HeaderMap;
use pretty_assertions::assert_eq;
use test_case::test_case;

fn fixed_time() -> DateTime {
    Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()
}

fn credential() -> Credential {
    Credential::new("ak1", "sk1")
}

/// Recompute the signature from what a server would receive.
fn verify(method: &str, url: &str, headers: &HeaderMap, secret_key: &str) -> bool {
    let authorization = headers[AUTHORIZATION].to_str().unwrap();
    let (prefix, signature) = authorization.rsplit_once("//").unwrap();

    let msg = build_canonical_message(method, url, headers).unwrap();
    let signing_key = derive_signing_key(secret_key, prefix);
    derive_signature(&signing_key, &msg) == signature
}

#[test_case(
    "http://h/api",
    RequestBody::from([("a", "1"), ("b", "2")]),
    "a6b7ca772e2c9ac63cd28c114e1b307b51ea61a2b0760637ac639d0a519ad65f";
    "form body"
)]
#[test_case(
    "http://h/x?b=2&a=1",
    RequestBody::from([("b", "2"), ("a", "1")]),
    "a04036327988ff76fe07c534e8e8b7bfea75be2ee29d3e5bee12cbbe41362c52";
    "form body with query"
)]
#[test_case(
    "http://h/api",
    RequestBody::from("test"),
    "301f2a2950f2eb3a0dba0aeb46856bcd9d227a081b418fa6da342cad73ea333b";
    "text body"
)]
fn test_sign_golden(url: &str, body: RequestBody, signature: &str) {
    let signed = sign(url, "POST", body, &credential(), fixed_time()).unwrap();

    assert_eq!(
        signed.authorization,
        format!("credit-v1/ak1/2023-01-01T00:00:00Z/1800//{signature}")
    );
    assert_eq!(signed.headers[AUTHORIZATION], signed.authorization.as_str());
    assert!(signed.headers[AUTHORIZATION].is_sensitive());
}

#[test]
fn test_query_order_does_not_change_signature() {
    let a = sign(
        "http://h/x?a=1&b=2&c=3",
        "POST",
        RequestBody::from("n=1"),
        &credential(),
        fixed_time(),
    )
    .unwrap();
    let b = sign(
        "http://h/x?c=3&a=1&b=2",
        "POST",
        RequestBody::from("n=1"),
        &credential(),
        fixed_time(),
    )
    .unwrap();

    assert_eq!(a.canonical_url, "http://h/x?a=1&b=2&c=3");
    assert_eq!(a.canonical_url, b.canonical_url);
    assert_eq!(a.authorization, b.authorization);
}

#[test]
fn test_server_side_verification() {
    let signed = sign(
        "https://api.example.com/v1/query?name=alice%20smith&id=42",
        "post",
        RequestBody::from([("k", "v w")]),
        &credential(),
        fixed_time(),
    )
    .unwrap();

    assert!(verify(
        "POST",
        &signed.canonical_url,
        &signed.headers,
        "sk1"
    ));
    assert!(!verify(
        "POST",
        &signed.canonical_url,
        &signed.headers,
        "sk2"
    ));
}

#[test]
fn test_unsigned_headers_do_not_affect_signature() {
    let signed = sign(
        "http://h/api",
        "POST",
        RequestBody::from("a=1"),
        &credential(),
        fixed_time(),
    )
    .unwrap();

    let mut headers = signed.headers.clone();
    headers.insert("x-debug", "1".parse().unwrap());
    assert!(verify("POST", &signed.canonical_url, &headers, "sk1"));

    let mut headers = signed.headers.clone();
    headers.insert("credit-extra", "1".parse().unwrap());
    assert!(!verify("POST", &signed.canonical_url, &headers, "sk1"));
}

#[test]
fn test_tampered_body_fails_verification() {
    let signed = sign(
        "http://h/api",
        "POST",
        RequestBody::from("a=1"),
        &credential(),
        fixed_time(),
    )
    .unwrap();

    let mut headers = signed.headers.clone();
    headers.insert("content-md5", "d41d8cd98f00b204e9800998ecf8427e".parse().unwrap());
    assert!(!verify("POST", &signed.canonical_url, &headers, "sk1"));
}

#[test_case("http://h/api?a=1;b=2"; "semicolon")]
#[test_case("http://h/a%zz"; "bad path escape")]
#[test_case("http://h/a%FF"; "invalid utf8 path")]
#[test_case("http://h/api?k=%FF"; "invalid utf8 query")]
fn test_sign_rejects_invalid_url(url: &str) {
    let err = sign(
        url,
        "POST",
        RequestBody::from("a=1"),
        &credential(),
        fixed_time(),
    )
    .unwrap_err();

    assert_eq!(err.kind(), creditsign_core::ErrorKind::InvalidUrl);
}

#[test]
fn test_sign_accepts_space_in_query() {
    let signed = sign(
        "http://h/x?q=a b",
        "POST",
        RequestBody::from("a=1"),
        &credential(),
        fixed_time(),
    )
    .unwrap();

    assert_eq!(signed.canonical_url, "http://h/x?q=a+b");
    assert!(verify("POST", &signed.canonical_url, &signed.headers, "sk1"));
}
