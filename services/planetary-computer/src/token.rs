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

use pcsign_core::time::{now, DateTime};
use pcsign_core::utils::redact_sas;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};

/// A Shared Access Signature token issued by the signing service.
///
/// The token is an opaque query string fragment such as
/// `st=2023-01-01T00%3A00%3A00Z&se=2023-01-02T00%3A00%3A00Z&sp=rl&sig=...`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SasToken {
    /// The query string to append to blob URLs, or to hand to storage
    /// clients as a credential.
    pub token: String,
    /// When the token stops working.
    #[serde(rename = "msft:expiry")]
    pub expiry: DateTime,
}

impl Debug for SasToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SasToken")
            .field("token", &redact_sas(&self.token))
            .field("expiry", &self.expiry)
            .finish()
    }
}

impl SasToken {
    /// Create a new token.
    pub fn new(token: impl Into<String>, expiry: DateTime) -> Self {
        Self {
            token: token.into(),
            expiry,
        }
    }

    /// Number of seconds the token is still valid for. Negative once expired.
    pub fn ttl(&self) -> i64 {
        (self.expiry - now()).num_seconds()
    }

    /// Sign `href` with this token.
    pub fn sign(&self, href: &str) -> SignedLink {
        SignedLink {
            href: format!("{href}?{}", self.token),
            expiry: self.expiry,
        }
    }
}

/// A URL carrying a SAS token, and the time it stops working.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedLink {
    /// The signed URL, usable in plain HTTP GET requests.
    pub href: String,
    /// Expiry of the token embedded in `href`.
    #[serde(rename = "msft:expiry")]
    pub expiry: DateTime,
}
