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

use std::fmt::{Debug, Formatter};

use creditsign_core::{utils::Redact, SigningCredential};

/// Credential for the credit API.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    /// Access key, sent in clear inside the auth prefix.
    pub access_key: String,
    /// Secret key, never sent.
    pub secret_key: String,
}

impl Credential {
    /// Create a new credential.
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_key", &Redact::from(&self.access_key))
            .field("secret_key", &Redact::from(&self.secret_key))
            .finish()
    }
}

impl SigningCredential for Credential {
    fn is_valid(&self) -> bool {
        !self.access_key.is_empty() && !self.secret_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secret() {
        let cred = Credential::new("ak1", "credit-secret-key-value");
        let s = format!("{cred:?}");
        assert_eq!(s, r#"Credential { access_key: ***, secret_key: cre***lue }"#);
    }

    #[test]
    fn test_is_valid() {
        assert!(Credential::new("ak1", "sk1").is_valid());
        assert!(!Credential::new("", "sk1").is_valid());
        assert!(!Credential::new("ak1", "").is_valid());
    }
}
