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
use creditsign_core::{Context, Result};
use creditsign_http_send_reqwest::ReqwestHttpSend;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = env_logger::try_init();

    let http = ReqwestHttpSend::builder()
        .timeout(Duration::from_secs(10))
        .use_proxy(true)
        .retry(2)
        .build()?;
    let ctx = Context::new().with_http_send(http);

    let req = http::Request::post("https://httpbin.org/post")
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(Bytes::from_static(b"a=1&b=2"))?;

    let resp = ctx.http_send_as_string(req).await?;
    println!("status: {}", resp.status());
    println!("{}", resp.body());
    Ok(())
}
