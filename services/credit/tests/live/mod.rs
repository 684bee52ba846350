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

use std::env;

use anyhow::Result;
use creditsign_core::{Context, OsEnv};
use creditsign_credit::{Client, DefaultCredentialProvider, RequestBody};
use creditsign_http_send_reqwest::ReqwestHttpSend;
use log::{debug, warn};

fn init_live_client() -> Option<(Client, String)> {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenv::dotenv();

    if env::var("CREDIT_TEST").ok().as_deref() != Some("on") {
        return None;
    }

    let url = env::var("CREDIT_URL").expect("env CREDIT_URL must set");
    let ctx = Context::new().with_env(OsEnv).with_http_send(
        ReqwestHttpSend::builder()
            .build()
            .expect("http client must build"),
    );

    Some((Client::new(ctx, DefaultCredentialProvider::new()), url))
}

#[tokio::test]
async fn test_live_request() -> Result<()> {
    let Some((client, url)) = init_live_client() else {
        warn!("CREDIT_TEST is not set, skipped");
        return Ok(());
    };

    let text = client
        .request(&url, RequestBody::from([("source", "creditsign")]))
        .await?;
    debug!("got response: {text}");
    Ok(())
}
