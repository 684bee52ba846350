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

use bytes::Bytes;
use creditsign_core::{Context, ProvideCredential, Result, Signer};
use log::debug;

use crate::body::RequestBody;
use crate::canonical::normalize_url;
use crate::credential::Credential;
use crate::sign_request::{derive_body_headers, RequestSigner};

/// Client signs credit API requests and sends them through the context's [`HttpSend`].
///
/// Any error raised while signing aborts the call before the request is
/// handed to the transport. Transport errors are returned as they are.
///
/// [`HttpSend`]: creditsign_core::HttpSend
#[derive(Debug, Clone)]
pub struct Client {
    signer: Signer<Credential>,
}

impl Client {
    /// Create a client that loads its credential from `provider`.
    pub fn new(ctx: Context, provider: impl ProvideCredential<Credential = Credential>) -> Self {
        Self {
            signer: Signer::new(ctx, provider, RequestSigner::new()),
        }
    }

    /// Create a client from a prepared signer.
    pub fn with_signer(signer: Signer<Credential>) -> Self {
        Self { signer }
    }

    /// POST `body` to `url` and return the response text.
    pub async fn request(&self, url: &str, body: RequestBody) -> Result<String> {
        let url = normalize_url(url, &[])?;
        let body = body.into_bytes();
        let headers = derive_body_headers(&body)?;

        let mut req = http::Request::post(url.as_str()).body(Bytes::new())?;
        req.headers_mut().extend(headers);
        let (mut parts, _) = req.into_parts();
        self.signer.sign(&mut parts, None).await?;

        let req = http::Request::from_parts(parts, body);
        debug!("sending credit request: {} {}", req.method(), req.uri());

        let resp = self.signer.context().http_send_as_string(req).await?;
        debug!("got credit response: {}", resp.status());
        Ok(resp.into_body())
    }
}
