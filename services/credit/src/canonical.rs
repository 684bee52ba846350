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

//! Canonicalization of credit API requests.
//!
//! The canonical message commits to the request in this order, one item per line:
//!
//! ```text
//! METHOD
//! /decoded/path
//! k1=escaped-v1&k2=escaped-v2
//! content-length:7
//! content-md5:ed04c91cf6f6ab5a01a31c0295c5da34
//! content-type:application%2Fx-www-form-urlencoded
//! credit-extra:v
//! ```
//!
//! Query pairs and header lines are sorted by key. Leading and trailing
//! whitespace of the whole message is stripped.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt::Write;
use std::str::FromStr;

use creditsign_core::{Error, Result, SigningRequest};
use http::uri::Authority;
use http::HeaderMap;
use log::debug;
use percent_encoding::utf8_percent_encode;
use percent_encoding::AsciiSet;
use percent_encoding::CONTROLS;

use crate::constants::{SIGNED_HEADERS, SIGNED_HEADER_MARKER};

/// Bytes escaped when a path is written back into a URL.
///
/// `%` is kept so existing escapes survive normalization untouched.
const PATH_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Normalize a URL so that its query is sorted by key and escaped once.
///
/// `extra_params` are merged into the query. When a key appears both in the
/// URL and in `extra_params`, the URL value wins. Repeated keys in the URL
/// keep their first value.
///
/// Relative references such as `/x?a=1` or `api/x?a=1` are accepted, and a
/// literal space in the query decodes like `+`. An absolute URL with an empty
/// path is written with `/`, the path that goes on the request line, and `/`
/// is what gets signed for it. Fragments are dropped.
///
/// Normalizing an already normalized URL returns it unchanged.
pub fn normalize_url(raw_url: &str, extra_params: &[(&str, &str)]) -> Result<String> {
    let url = RawUrl::parse(raw_url)?;
    SigningRequest::decode_path(url.path)?;
    let url_query = SigningRequest::parse_query(url.query)?;

    let mut query: BTreeMap<String, String> = extra_params
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    query.extend(first_values(&url_query));

    let mut s = String::with_capacity(raw_url.len());
    if let Some(scheme) = url.scheme {
        s.push_str(scheme);
        s.push(':');
    }
    if let Some(authority) = &url.authority {
        s.push_str("//");
        s.push_str(authority.as_str());
    }
    s.extend(utf8_percent_encode(url.path(), PATH_ENCODE_SET));
    if !query.is_empty() {
        s.push('?');
        for (idx, (k, v)) in query.iter().enumerate() {
            if idx > 0 {
                s.push('&');
            }
            s.push_str(&SigningRequest::query_escape(k));
            s.push('=');
            s.push_str(&SigningRequest::query_escape(v));
        }
    }

    Ok(s)
}

/// Build the canonical message of a request from its URL and headers.
///
/// The URL is parsed again here, so a URL that cannot be parsed fails with an
/// invalid url error before any signing work happens.
pub fn build_canonical_message(method: &str, url: &str, headers: &HeaderMap) -> Result<String> {
    let url = RawUrl::parse(url)?;
    let path = SigningRequest::decode_path(url.path())?;
    let query = SigningRequest::parse_query(url.query)?;

    canonical_message(method, &path, &query, headers, SIGNED_HEADERS)
}

/// A URL split into the parts that are signed, borrowed from the input.
///
/// Follows the generic URI grammar: `[scheme:][//authority][path][?query][#fragment]`.
/// Only the authority is parsed further, by [`Authority`]. Escapes in the
/// path and the query are checked by their decoders.
#[derive(Debug)]
struct RawUrl<'a> {
    scheme: Option<&'a str>,
    authority: Option<Authority>,
    path: &'a str,
    query: &'a str,
}

impl<'a> RawUrl<'a> {
    fn parse(raw: &'a str) -> Result<Self> {
        if raw.bytes().any(|b| b.is_ascii_control()) {
            return Err(Error::invalid_url(format!(
                "invalid control character in url: {raw:?}"
            )));
        }

        let rest = raw.split_once('#').map_or(raw, |(rest, _)| rest);
        let (rest, query) = rest.split_once('?').unwrap_or((rest, ""));
        let (scheme, rest) = split_scheme(rest)?;

        let (authority, path) = match rest.strip_prefix("//") {
            Some(rest) => {
                let (authority, path) = rest.split_at(rest.find('/').unwrap_or(rest.len()));
                (Some(Authority::from_str(authority)?), path)
            }
            None if scheme.is_some() => {
                return Err(Error::invalid_url(format!(
                    "url with a scheme must have an authority: {raw}"
                )));
            }
            None => {
                let first_segment = rest.split('/').next().unwrap_or_default();
                if first_segment.contains(':') {
                    return Err(Error::invalid_url(format!(
                        "first path segment in url cannot contain colon: {raw}"
                    )));
                }
                (None, rest)
            }
        };

        Ok(RawUrl {
            scheme,
            authority,
            path,
            query,
        })
    }

    /// Path as it appears on the request line.
    fn path(&self) -> &'a str {
        if self.authority.is_some() && self.path.is_empty() {
            "/"
        } else {
            self.path
        }
    }
}

/// Split `scheme:` off the front when the input starts with one.
fn split_scheme(s: &str) -> Result<(Option<&str>, &str)> {
    for (idx, c) in s.char_indices() {
        match c {
            'a'..='z' | 'A'..='Z' => {}
            '0'..='9' | '+' | '-' | '.' if idx > 0 => {}
            ':' if idx == 0 => {
                return Err(Error::invalid_url(format!(
                    "missing protocol scheme in url: {s}"
                )))
            }
            ':' => return Ok((Some(&s[..idx]), &s[idx + 1..])),
            _ => break,
        }
    }
    Ok((None, s))
}

/// Assemble the canonical message from already parsed request parts.
///
/// `path` must be percent decoded and `query` must hold decoded pairs.
/// `signed_headers` lists the lowercase header names that are always signed;
/// headers whose name contains `credit-` are signed as well.
pub fn canonical_message(
    method: &str,
    path: &str,
    query: &[(String, String)],
    headers: &HeaderMap,
    signed_headers: &[&str],
) -> Result<String> {
    let mut s = String::new();
    writeln!(s, "{}", method.to_uppercase())?;
    writeln!(s, "{path}")?;
    writeln!(s, "{}", canonical_query(query))?;
    for (name, value) in canonical_headers(headers, signed_headers)? {
        writeln!(s, "{name}:{}", SigningRequest::query_escape(value.trim()))?;
    }

    let msg = s.trim().to_string();
    debug!("calculated canonical message: {msg:?}");
    Ok(msg)
}

fn first_values(query: &[(String, String)]) -> BTreeMap<String, String> {
    let mut m = BTreeMap::new();
    for (k, v) in query {
        m.entry(k.clone()).or_insert_with(|| v.clone());
    }
    m
}

/// Keys stay decoded while values are escaped.
fn canonical_query(query: &[(String, String)]) -> String {
    first_values(query)
        .into_iter()
        .map(|(k, v)| format!("{k}={}", SigningRequest::query_escape(&v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn canonical_headers<'a>(
    headers: &'a HeaderMap,
    signed_headers: &[&str],
) -> Result<Vec<(String, &'a str)>> {
    let names: BTreeSet<String> = signed_headers
        .iter()
        .map(|k| k.to_lowercase())
        .chain(
            headers
                .keys()
                .map(|k| k.as_str())
                .filter(|k| k.contains(SIGNED_HEADER_MARKER))
                .map(str::to_string),
        )
        .collect();

    names
        .into_iter()
        .map(|name| -> Result<(String, &'a str)> {
            let value = match headers.get(name.as_str()) {
                Some(v) => v.to_str()?,
                None => "",
            };
            Ok((name, value))
        })
        .collect()
}
