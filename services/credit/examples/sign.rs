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

//! Sign a request offline and print what would be sent.
//!
//! ```shell
//! CREDIT_ACCESS_KEY=ak CREDIT_SECRET_KEY=sk cargo run --example sign -- https://api.example.com/v1/query?id=42
//! ```

use anyhow::Result;
use creditsign_core::time::now;
use creditsign_core::{Context, OsEnv, ProvideCredential};
use creditsign_credit::{sign, DefaultCredentialProvider, RequestBody};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = env_logger::builder().try_init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://api.example.com/v1/query?id=42".to_string());

    let ctx = Context::new().with_env(OsEnv);
    let Some(cred) = DefaultCredentialProvider::new()
        .provide_credential(&ctx)
        .await?
    else {
        anyhow::bail!("CREDIT_ACCESS_KEY and CREDIT_SECRET_KEY must be set");
    };

    let signed = sign(
        &url,
        "POST",
        RequestBody::from([("source", "example")]),
        &cred,
        now(),
    )?;

    println!("POST {}", signed.canonical_url);
    for (name, value) in &signed.headers {
        println!("{name}: {}", value.to_str()?);
    }
    println!();
    println!("{}", String::from_utf8_lossy(&signed.body));
    Ok(())
}
