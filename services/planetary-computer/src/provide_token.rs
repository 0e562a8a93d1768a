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
use http::header::ACCEPT;
use log::debug;
use pcsign_core::{Context, Error, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use crate::constants::{OCP_APIM_SUBSCRIPTION_KEY, TOKEN_EXPIRY_BUFFER_SECS};
use crate::{Config, SasToken};

type Slot = Arc<tokio::sync::Mutex<Option<SasToken>>>;

/// Tokens keyed by their token request URL (`{sas_url}/{account}/{container}`).
///
/// Every key owns one async slot. Refreshing a key holds its slot locked, so
/// concurrent callers asking for the same key wait for the in-flight request
/// instead of issuing their own. Different keys never wait on each other.
#[derive(Debug, Default)]
pub struct TokenCache {
    slots: Mutex<HashMap<String, Slot>>,
}

impl TokenCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, key: &str) -> Slot {
        let mut slots = self.slots.lock().expect("lock poisoned");
        slots.entry(key.to_string()).or_default().clone()
    }

    /// Peek at the token cached for `key`, expired or not.
    pub async fn get(&self, key: &str) -> Option<SasToken> {
        let slot = {
            let slots = self.slots.lock().expect("lock poisoned");
            slots.get(key).cloned()
        }?;
        let token = slot.lock().await.clone();
        token
    }

    /// Number of keys that have been requested so far.
    pub fn len(&self) -> usize {
        self.slots.lock().expect("lock poisoned").len()
    }

    /// Check if no key has been requested yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// TokenProvider hands out SAS tokens for (account, container) pairs, going to
/// the signing service only when the cached token is missing or about to
/// expire.
///
/// Clones share the same config and cache.
#[derive(Clone, Debug, Default)]
pub struct TokenProvider {
    config: Arc<RwLock<Config>>,
    cache: Arc<TokenCache>,
}

impl TokenProvider {
    /// Create a new provider with an empty cache.
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            cache: Arc::new(TokenCache::new()),
        }
    }

    /// A snapshot of the current config.
    pub fn config(&self) -> Config {
        self.config.read().expect("lock poisoned").clone()
    }

    /// Set the subscription key used by later token requests.
    ///
    /// Cached tokens stay valid.
    pub fn set_subscription_key(&self, key: impl Into<String>) {
        self.config.write().expect("lock poisoned").subscription_key = Some(key.into());
    }

    /// The token cache backing this provider.
    pub fn cache(&self) -> &TokenCache {
        &self.cache
    }

    /// Get a token for a container in a storage account.
    ///
    /// A cached token is reused while it has at least a minute left. Otherwise a
    /// new one is requested and replaces the cached one.
    pub async fn get_token(&self, ctx: &Context, account: &str, container: &str) -> Result<SasToken> {
        let config = self.config();
        let key = config.token_request_url(account, container);

        let slot = self.cache.slot(&key);
        let mut cached = slot.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.ttl() >= TOKEN_EXPIRY_BUFFER_SECS {
                debug!("token for {key} found in cache, expires at {}", token.expiry);
                return Ok(token.clone());
            }
            debug!("token for {key} expires at {}, refreshing", token.expiry);
        }

        let token = request_token(ctx, &config, &key).await?;
        *cached = Some(token.clone());
        Ok(token)
    }
}

async fn request_token(ctx: &Context, config: &Config, url: &str) -> Result<SasToken> {
    debug!("requesting sas token from {url}");

    let mut req = http::Request::get(url).header(ACCEPT, "application/json");
    if let Some(key) = &config.subscription_key {
        req = req.header(OCP_APIM_SUBSCRIPTION_KEY, key);
    }
    let req = req
        .body(Bytes::new())
        .map_err(|e| Error::token_request_failed("failed to build token request").with_source(e))?;

    let resp = ctx.http_send(req).await?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = String::from_utf8_lossy(resp.body());
        return Err(Error::token_request_failed(format!(
            "token request to {url} failed with status {status}: {body}"
        )));
    }

    let token: SasToken = serde_json::from_slice(resp.body()).map_err(|e| {
        Error::token_request_failed(format!(
            "No token found in response: {}",
            String::from_utf8_lossy(resp.body())
        ))
        .with_source(e)
    })?;
    if token.token.is_empty() {
        return Err(Error::token_request_failed(format!(
            "No token found in response from {url}"
        )));
    }

    debug!("got sas token for {url}, expires at {}", token.expiry);
    Ok(token)
}
