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

use async_trait::async_trait;
use creditsign_core::hash::hex_hmac_sha256;
use creditsign_core::{
    Context, Error, ProvideCredential, Result, SignRequest, Signer, SigningCredential, StaticEnv,
};
use http::request::Parts;
use http::HeaderValue;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Clone, Debug)]
struct MyCredential {
    api_key: String,
    api_secret: String,
}

impl SigningCredential for MyCredential {
    fn is_valid(&self) -> bool {
        !self.api_key.is_empty() && !self.api_secret.is_empty()
    }
}

#[derive(Debug)]
struct MyCredentialLoader;

#[async_trait]
impl ProvideCredential for MyCredentialLoader {
    type Credential = MyCredential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let (Some(api_key), Some(api_secret)) =
            (ctx.env_var("MY_API_KEY"), ctx.env_var("MY_API_SECRET"))
        else {
            return Ok(None);
        };

        Ok(Some(MyCredential {
            api_key,
            api_secret,
        }))
    }
}

#[derive(Debug)]
struct MyRequestSigner;

#[async_trait]
impl SignRequest for MyRequestSigner {
    type Credential = MyCredential;

    async fn sign_request(
        &self,
        _ctx: &Context,
        req: &mut Parts,
        credential: Option<&Self::Credential>,
        _expires_in: Option<Duration>,
    ) -> Result<()> {
        let cred = credential.ok_or_else(|| Error::credential_invalid("no credential loaded"))?;

        let msg = format!("{}\n{}", req.method, req.uri.path());
        let signature = hex_hmac_sha256(cred.api_secret.as_bytes(), msg.as_bytes());

        req.headers
            .insert("x-api-key", HeaderValue::from_str(&cred.api_key)?);
        req.headers
            .insert("x-api-signature", HeaderValue::from_str(&signature)?);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let ctx = Context::new().with_env(StaticEnv {
        envs: HashMap::from([
            ("MY_API_KEY".to_string(), "demo-api-key".to_string()),
            ("MY_API_SECRET".to_string(), "demo-api-secret".to_string()),
        ]),
    });

    let signer = Signer::new(ctx, MyCredentialLoader, MyRequestSigner);

    let (mut parts, _) = http::Request::post("https://api.example.com/v1/users")
        .body(())?
        .into_parts();

    signer.sign(&mut parts, None).await?;
    println!("signed headers: {:?}", parts.headers);
    Ok(())
}
