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

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use creditsign_core::hash::{hex_hmac_sha256, hex_md5};
use creditsign_core::time::{format_iso8601, now, DateTime};
use creditsign_core::{Context, Error, Result, SignRequest, SigningRequest};
use http::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue};
use log::debug;

use crate::body::RequestBody;
use crate::canonical::{build_canonical_message, canonical_message, normalize_url};
use crate::constants::*;
use crate::credential::Credential;

/// RequestSigner that implements the credit-v1 authorization.
///
/// The request must already carry its body headers, see [`derive_body_headers`].
#[derive(Debug, Default)]
pub struct RequestSigner {
    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new request signer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _: &Context,
        req: &mut http::request::Parts,
        credential: Option<&Self::Credential>,
        expires_in: Option<Duration>,
    ) -> Result<()> {
        let cred = credential.ok_or_else(|| Error::credential_invalid("missing credential"))?;
        if let Some(expires_in) = expires_in {
            if expires_in.as_secs() != DEFAULT_EXPIRE_SECONDS || expires_in.subsec_nanos() != 0 {
                return Err(Error::request_invalid(format!(
                    "credit-v{AUTH_PREFIX_VERSION} signatures expire after {DEFAULT_EXPIRE_SECONDS}s, got {expires_in:?}"
                )));
            }
        }
        let now = self.time.unwrap_or_else(now);

        let mut ctx = SigningRequest::build(req)?;
        let msg = canonical_message(
            ctx.method.as_str(),
            &ctx.path_percent_decoded(),
            &ctx.query,
            &ctx.headers,
            SIGNED_HEADERS,
        )?;

        let authorization =
            build_authorization_header(&cred.access_key, &cred.secret_key, &msg, now);
        ctx.headers
            .insert(AUTHORIZATION, sensitive_header_value(&authorization)?);

        ctx.apply(req)
    }
}

/// A request that is ready to be sent.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    /// URL with its query sorted and escaped.
    pub canonical_url: String,
    /// Encoded body bytes.
    pub body: Bytes,
    /// Body headers plus `Authorization`.
    pub headers: HeaderMap,
    /// Value of the `Authorization` header.
    pub authorization: String,
}

/// Sign a request without sending it.
///
/// The URL is validated first, so a malformed URL fails before any hashing.
pub fn sign(
    raw_url: &str,
    method: &str,
    body: RequestBody,
    cred: &Credential,
    now: DateTime,
) -> Result<SignedRequest> {
    let canonical_url = normalize_url(raw_url, &[])?;
    let body = body.into_bytes();
    let mut headers = derive_body_headers(&body)?;

    let msg = build_canonical_message(method, &canonical_url, &headers)?;
    let authorization = build_authorization_header(&cred.access_key, &cred.secret_key, &msg, now);
    headers.insert(AUTHORIZATION, sensitive_header_value(&authorization)?);

    Ok(SignedRequest {
        canonical_url,
        body,
        headers,
        authorization,
    })
}

/// Headers describing the body: length, hex MD5 digest and form content type.
pub fn derive_body_headers(body: &[u8]) -> Result<HeaderMap> {
    let mut headers = HeaderMap::with_capacity(3);
    headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
    headers.insert(CONTENT_MD5, HeaderValue::from_str(&hex_md5(body))?);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
    Ok(headers)
}

/// Auth prefix: `credit-v1/{access_key}/{2023-01-01T00:00:00Z}/1800`
pub fn build_auth_prefix(access_key: &str, now: DateTime) -> String {
    format!(
        "{AUTH_PREFIX_SCHEME}-v{AUTH_PREFIX_VERSION}/{access_key}/{}/{DEFAULT_EXPIRE_SECONDS}",
        format_iso8601(now)
    )
}

/// Signing key is the hex HMAC-SHA256 of the auth prefix keyed by the secret key.
///
/// The hex string itself, not the raw digest, keys the next HMAC.
pub fn derive_signing_key(secret_key: &str, auth_prefix: &str) -> String {
    hex_hmac_sha256(secret_key.as_bytes(), auth_prefix.as_bytes())
}

/// Signature is the hex HMAC-SHA256 of the canonical message keyed by the signing key.
pub fn derive_signature(signing_key: &str, canonical_message: &str) -> String {
    hex_hmac_sha256(signing_key.as_bytes(), canonical_message.as_bytes())
}

/// Build the `Authorization` value: `{auth_prefix}//{signature}`.
pub fn build_authorization_header(
    access_key: &str,
    secret_key: &str,
    canonical_message: &str,
    now: DateTime,
) -> String {
    let auth_prefix = build_auth_prefix(access_key, now);
    debug!("calculated auth prefix: {auth_prefix}");

    let signing_key = derive_signing_key(secret_key, &auth_prefix);
    let signature = derive_signature(&signing_key, canonical_message);
    format!("{auth_prefix}{SIGNATURE_SEPARATOR}{signature}")
}

fn sensitive_header_value(v: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(v)?;
    value.set_sensitive(true);
    Ok(value)
}
