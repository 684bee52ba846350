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

mod client;
mod live;
mod signing;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use creditsign_core::{Error, HttpSend, Result};

/// HttpSend that records every request and answers with a canned result.
#[derive(Debug, Clone, Default)]
pub struct RecordingHttpSend {
    requests: Arc<Mutex<Vec<http::Request<Bytes>>>>,
    fail: bool,
}

impl RecordingHttpSend {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn take_requests(&self) -> Vec<http::Request<Bytes>> {
        std::mem::take(&mut *self.requests.lock().unwrap())
    }
}

#[async_trait]
impl HttpSend for RecordingHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let body = req.body().clone();
        self.requests.lock().unwrap().push(req);

        if self.fail {
            return Err(Error::unexpected("connection reset by peer"));
        }
        Ok(http::Response::new(Bytes::from(format!(
            "{{\"echo\":\"{}\"}}",
            String::from_utf8_lossy(&body)
        ))))
    }
}
