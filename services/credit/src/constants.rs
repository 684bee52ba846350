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

// Env values used by the credit API.
pub const CREDIT_ACCESS_KEY: &str = "CREDIT_ACCESS_KEY";
pub const CREDIT_SECRET_KEY: &str = "CREDIT_SECRET_KEY";

// Auth prefix fields.
pub const AUTH_PREFIX_SCHEME: &str = "credit";
pub const AUTH_PREFIX_VERSION: u32 = 1;
pub const DEFAULT_EXPIRE_SECONDS: u64 = 1800;

/// Separator between the auth prefix and the signature.
///
/// Verifiers split the `Authorization` value on the last occurrence.
pub const SIGNATURE_SEPARATOR: &str = "//";

// Headers used by the credit API.
pub const CONTENT_MD5: &str = "content-md5";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Header names that are always folded into the canonical message.
pub const SIGNED_HEADERS: &[&str] = &["content-length", "content-type", "content-md5"];

/// Any header whose name contains this marker is signed as well.
pub const SIGNED_HEADER_MARKER: &str = "credit-";
