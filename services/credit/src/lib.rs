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

//! Signer for the credit API.
//!
//! Requests are signed with the `credit-v1` scheme: the request is reduced to
//! a canonical message, a per-request signing key is derived from the secret
//! key and a time-limited auth prefix, and the resulting signature is carried
//! in the `Authorization` header as `{auth_prefix}//{signature}`.
//!
//! ## Example
//!
//! ```no_run
//! use creditsign_core::{Context, OsEnv, Result};
//! use creditsign_credit::{Client, DefaultCredentialProvider, RequestBody};
//! use creditsign_http_send_reqwest::ReqwestHttpSend;
//!
//! # async fn example() -> Result<()> {
//! let ctx = Context::new()
//!     .with_env(OsEnv)
//!     .with_http_send(ReqwestHttpSend::builder().build()?);
//! let client = Client::new(ctx, DefaultCredentialProvider::new());
//!
//! let text = client
//!     .request(
//!         "https://api.example.com/v1/query?name=alice",
//!         RequestBody::from([("id", "42")]),
//!     )
//!     .await?;
//! println!("{text}");
//! # Ok(())
//! # }
//! ```

mod constants;
pub use constants::{
    AUTH_PREFIX_VERSION, CREDIT_ACCESS_KEY, CREDIT_SECRET_KEY, DEFAULT_EXPIRE_SECONDS,
    FORM_CONTENT_TYPE, SIGNED_HEADERS,
};

mod body;
pub use body::RequestBody;

mod canonical;
pub use canonical::{build_canonical_message, canonical_message, normalize_url};

mod sign_request;
pub use sign_request::{
    build_auth_prefix, build_authorization_header, derive_body_headers, derive_signature,
    derive_signing_key, sign, RequestSigner, SignedRequest,
};

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod provide_credential;
pub use provide_credential::{
    ConfigCredentialProvider, DefaultCredentialProvider, EnvCredentialProvider,
    StaticCredentialProvider,
};

mod client;
pub use client::Client;
