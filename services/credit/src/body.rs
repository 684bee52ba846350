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

use std::collections::BTreeMap;
use std::collections::HashMap;

use bytes::Bytes;
use creditsign_core::{Error, Result, SigningRequest};
use serde_json::Value;

/// Payload of a credit API request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// Flat form fields, sent form-urlencoded and ordered by key.
    Form(BTreeMap<String, String>),
    /// Raw text sent as is.
    Text(String),
    /// Raw bytes sent as is.
    Bytes(Bytes),
}

impl RequestBody {
    /// Encode the payload into the exact bytes that go on the wire.
    ///
    /// Form fields become `k1=v1&k2=v2` with keys ascending and both sides
    /// query-escaped.
    pub fn into_bytes(self) -> Bytes {
        match self {
            RequestBody::Form(fields) => {
                let mut s = String::new();
                for (idx, (k, v)) in fields.iter().enumerate() {
                    if idx > 0 {
                        s.push('&');
                    }
                    s.push_str(&SigningRequest::query_escape(k));
                    s.push('=');
                    s.push_str(&SigningRequest::query_escape(v));
                }
                Bytes::from(s)
            }
            RequestBody::Text(s) => Bytes::from(s),
            RequestBody::Bytes(bs) => bs,
        }
    }
}

impl From<String> for RequestBody {
    fn from(value: String) -> Self {
        RequestBody::Text(value)
    }
}

impl From<&str> for RequestBody {
    fn from(value: &str) -> Self {
        RequestBody::Text(value.to_string())
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(value: Vec<u8>) -> Self {
        RequestBody::Bytes(Bytes::from(value))
    }
}

impl From<Bytes> for RequestBody {
    fn from(value: Bytes) -> Self {
        RequestBody::Bytes(value)
    }
}

impl From<BTreeMap<String, String>> for RequestBody {
    fn from(value: BTreeMap<String, String>) -> Self {
        RequestBody::Form(value)
    }
}

impl From<HashMap<String, String>> for RequestBody {
    fn from(value: HashMap<String, String>) -> Self {
        RequestBody::Form(value.into_iter().collect())
    }
}

impl<const N: usize> From<[(&str, &str); N]> for RequestBody {
    fn from(value: [(&str, &str); N]) -> Self {
        RequestBody::Form(
            value
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

/// Convert a dynamically shaped payload.
///
/// Accepted shapes:
///
/// - an object whose values are all strings: [`RequestBody::Form`]
/// - a string: [`RequestBody::Text`]
/// - an array of integers in `0..=255`: [`RequestBody::Bytes`]
///
/// Everything else is rejected with an unsupported body error.
impl TryFrom<Value> for RequestBody {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(RequestBody::Text(s)),
            Value::Object(fields) => fields
                .into_iter()
                .map(|(k, v)| match v {
                    Value::String(v) => Ok((k, v)),
                    other => Err(Error::unsupported_body(format!(
                        "form field {k} must be a string, got {}",
                        json_type_name(&other)
                    ))),
                })
                .collect::<Result<BTreeMap<_, _>>>()
                .map(RequestBody::Form),
            Value::Array(items) => items
                .iter()
                .map(|v| {
                    v.as_u64()
                        .and_then(|n| u8::try_from(n).ok())
                        .ok_or_else(|| {
                            Error::unsupported_body("byte arrays must only hold integers in 0..=255")
                        })
                })
                .collect::<Result<Vec<u8>>>()
                .map(RequestBody::from),
            other => Err(Error::unsupported_body(format!(
                "only form fields, text or bytes are supported, got {}",
                json_type_name(&other)
            ))),
        }
    }
}

fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use creditsign_core::ErrorKind;
    use serde_json::json;
    use test_case::test_case;

    #[test]
    fn test_form_is_sorted_and_escaped() {
        let body = RequestBody::from([("b", "2"), ("a", "1"), ("q", "x y/z")]);
        assert_eq!(body.into_bytes(), Bytes::from_static(b"a=1&b=2&q=x+y%2Fz"));
    }

    #[test]
    fn test_empty_form() {
        let body = RequestBody::Form(BTreeMap::new());
        assert!(body.into_bytes().is_empty());
    }

    #[test]
    fn test_text_and_bytes_pass_through() {
        assert_eq!(
            RequestBody::from("a=1&b=2").into_bytes(),
            Bytes::from_static(b"a=1&b=2")
        );
        assert_eq!(
            RequestBody::from(vec![0_u8, 255]).into_bytes(),
            Bytes::from_static(&[0, 255])
        );
    }

    #[test]
    fn test_try_from_json() {
        assert_eq!(
            RequestBody::try_from(json!({"a": "1", "b": "2"})).unwrap(),
            RequestBody::from([("a", "1"), ("b", "2")])
        );
        assert_eq!(
            RequestBody::try_from(json!("raw")).unwrap(),
            RequestBody::from("raw")
        );
        assert_eq!(
            RequestBody::try_from(json!([104, 105])).unwrap(),
            RequestBody::from(b"hi".to_vec())
        );
    }

    #[test_case(json!(12345); "number")]
    #[test_case(json!(null); "null")]
    #[test_case(json!(true); "bool")]
    #[test_case(json!({"a": 1}); "non string field")]
    #[test_case(json!({"a": {"b": "c"}}); "nested object")]
    #[test_case(json!([1, 256]); "byte out of range")]
    #[test_case(json!(["a"]); "string array")]
    fn test_try_from_json_rejects(value: Value) {
        let err = RequestBody::try_from(value).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedBody);
    }
}
