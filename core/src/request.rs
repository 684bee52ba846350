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

use std::borrow::Cow;
use std::mem;
use std::str::FromStr;

use http::uri::Authority;
use http::uri::PathAndQuery;
use http::uri::Scheme;
use http::HeaderMap;
use http::Method;
use http::Uri;
use percent_encoding::percent_decode_str;
use percent_encoding::utf8_percent_encode;
use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;

use crate::{Error, Result};

/// AsciiSet for query component escaping.
///
/// Every byte is escaped except the unreserved characters: 'A'-'Z', 'a'-'z', '0'-'9', '-', '.', '_', and '~'.
/// Space is handled by [`SigningRequest::query_escape`] which turns it into `+`.
pub static QUERY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Signing context for request.
#[derive(Debug)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// HTTP scheme.
    pub scheme: Scheme,
    /// HTTP authority.
    pub authority: Authority,
    /// HTTP path, still percent encoded.
    pub path: String,
    /// HTTP query parameters, percent decoded, in wire order.
    pub query: Vec<(String, String)>,
    /// HTTP headers.
    pub headers: HeaderMap,
}

impl SigningRequest {
    /// Build a signing context from http::request::Parts.
    pub fn build(parts: &mut http::request::Parts) -> Result<Self> {
        let uri = mem::take(&mut parts.uri).into_parts();
        let paq = uri
            .path_and_query
            .unwrap_or_else(|| PathAndQuery::from_static("/"));

        Ok(SigningRequest {
            method: parts.method.clone(),
            scheme: uri.scheme.unwrap_or(Scheme::HTTP),
            authority: uri.authority.ok_or_else(|| {
                Error::request_invalid("request without authority is invalid for signing")
            })?,
            path: {
                Self::decode_path(paq.path())?;
                paq.path().to_string()
            },
            query: Self::parse_query(paq.query().unwrap_or_default())?,

            // Take the headers out of the request to avoid copy.
            // We will return it back when apply the context.
            headers: mem::take(&mut parts.headers),
        })
    }

    /// Apply the signing context back to http::request::Parts.
    pub fn apply(mut self, parts: &mut http::request::Parts) -> Result<()> {
        // Return headers back.
        mem::swap(&mut parts.headers, &mut self.headers);
        parts.method = self.method;
        parts.uri = {
            let mut uri_parts = mem::take(&mut parts.uri).into_parts();
            uri_parts.scheme = Some(self.scheme);
            uri_parts.authority = Some(self.authority);
            uri_parts.path_and_query = {
                let paq = if self.query.is_empty() {
                    self.path
                } else {
                    let mut s = self.path;
                    s.push('?');
                    for (i, (k, v)) in self.query.iter().enumerate() {
                        if i > 0 {
                            s.push('&');
                        }
                        s.push_str(&Self::query_escape(k));
                        s.push('=');
                        s.push_str(&Self::query_escape(v));
                    }
                    s
                };

                Some(PathAndQuery::from_str(&paq)?)
            };
            Uri::from_parts(uri_parts)?
        };

        Ok(())
    }

    /// Get the path percent decoded.
    ///
    /// [`SigningRequest::build`] has already checked the path, so nothing is
    /// replaced here.
    pub fn path_percent_decoded(&self) -> Cow<'_, str> {
        percent_decode_str(&self.path).decode_utf8_lossy()
    }

    /// Decode a raw URL path.
    ///
    /// Malformed percent escapes and escapes that do not decode to utf-8 are
    /// rejected with an invalid url error.
    ///
    /// ```
    /// use creditsign_core::SigningRequest;
    ///
    /// assert_eq!(SigningRequest::decode_path("/a%20b").unwrap(), "/a b");
    /// assert!(SigningRequest::decode_path("/a%zz").is_err());
    /// ```
    pub fn decode_path(path: &str) -> Result<String> {
        check_percent_escapes("path", path)?;
        Ok(percent_decode_str(path).decode_utf8_lossy().into_owned())
    }

    /// Parse a raw query string into decoded pairs.
    ///
    /// Pairs are split on `&` and keys from values on the first `=`. `+`
    /// decodes to a space. `;` separators, malformed percent escapes and
    /// escapes that do not decode to utf-8 are rejected instead of being
    /// guessed at.
    pub fn parse_query(query: &str) -> Result<Vec<(String, String)>> {
        if query.contains(';') {
            return Err(Error::invalid_url(format!(
                "invalid semicolon separator in query: {query}"
            )));
        }

        check_percent_escapes("query", query)?;

        Ok(form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect())
    }

    /// Escape a query component.
    ///
    /// ```
    /// use creditsign_core::SigningRequest;
    ///
    /// assert_eq!(SigningRequest::query_escape("a b/c~"), "a+b%2Fc~");
    /// ```
    pub fn query_escape(s: &str) -> String {
        let mut escaped = String::with_capacity(s.len());
        for (idx, part) in s.split(' ').enumerate() {
            if idx > 0 {
                escaped.push('+');
            }
            escaped.extend(utf8_percent_encode(part, &QUERY_ENCODE_SET));
        }
        escaped
    }
}

/// Every `%` must start a `%XX` escape and the decoded bytes must be utf-8.
fn check_percent_escapes(component: &str, s: &str) -> Result<()> {
    let bs = s.as_bytes();
    let mut idx = 0;
    while idx < bs.len() {
        if bs[idx] == b'%' {
            let valid = bs.len() > idx + 2
                && bs[idx + 1].is_ascii_hexdigit()
                && bs[idx + 2].is_ascii_hexdigit();
            if !valid {
                return Err(Error::invalid_url(format!(
                    "invalid percent escape in {component}: {s}"
                )));
            }
            idx += 3;
        } else {
            idx += 1;
        }
    }

    percent_decode_str(s).decode_utf8().map_err(|e| {
        Error::invalid_url(format!("{component} does not decode to utf-8: {s}")).with_source(e)
    })?;
    Ok(())
}
