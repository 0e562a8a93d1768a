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

use log::debug;
use pcsign_core::utils::Redact;
use pcsign_core::{Context, Error, Result};
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};

use crate::constants::*;

/// Config carries the settings for talking to the SAS token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// `subscription_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`PC_SDK_SUBSCRIPTION_KEY`]
    /// - settings file: `~/.planetarycomputer/settings.env`
    ///
    /// When set, it's sent as `Ocp-Apim-Subscription-Key` with every token request.
    pub subscription_key: Option<String>,
    /// `sas_url` will be loaded from
    ///
    /// - env value: [`PC_SDK_SAS_URL`]
    /// - settings file: `~/.planetarycomputer/settings.env`
    /// - default to [`DEFAULT_SAS_TOKEN_ENDPOINT`]
    pub sas_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            subscription_key: None,
            sas_url: DEFAULT_SAS_TOKEN_ENDPOINT.to_string(),
        }
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("subscription_key", &Redact::from(&self.subscription_key))
            .field("sas_url", &self.sas_url)
            .finish()
    }
}

impl Config {
    /// Load config from the environment, falling back to the settings file.
    ///
    /// Environment variables always take precedence over the settings file. A
    /// missing settings file is fine; a malformed one is an error.
    pub async fn from_env(ctx: &Context) -> Result<Self> {
        let mut subscription_key = ctx.env_var(PC_SDK_SUBSCRIPTION_KEY);
        let mut sas_url = ctx.env_var(PC_SDK_SAS_URL);

        if subscription_key.is_none() || sas_url.is_none() {
            if let Some(mut settings) = load_settings_file(ctx).await? {
                if subscription_key.is_none() {
                    subscription_key = settings.remove(PC_SDK_SUBSCRIPTION_KEY);
                }
                if sas_url.is_none() {
                    sas_url = settings.remove(PC_SDK_SAS_URL);
                }
            }
        }

        Ok(Self {
            subscription_key: subscription_key.filter(|v| !v.is_empty()),
            sas_url: sas_url
                .filter(|v| !v.is_empty())
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_SAS_TOKEN_ENDPOINT.to_string()),
        })
    }

    /// Set the subscription key.
    pub fn with_subscription_key(mut self, key: impl Into<String>) -> Self {
        self.subscription_key = Some(key.into());
        self
    }

    /// Set the SAS token endpoint.
    pub fn with_sas_url(mut self, url: impl Into<String>) -> Self {
        self.sas_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// The URL that issues tokens for `account`/`container`.
    ///
    /// Also used as the token cache key.
    pub fn token_request_url(&self, account: &str, container: &str) -> String {
        format!("{}/{account}/{container}", self.sas_url)
    }
}

/// Read the settings file as a dotenv file.
///
/// Values are returned, never exported into the process environment.
async fn load_settings_file(ctx: &Context) -> Result<Option<HashMap<String, String>>> {
    let Some(path) = ctx.expand_home_dir(SETTINGS_ENV_FILE) else {
        debug!("failed to expand homedir for settings file {SETTINGS_ENV_FILE}");
        return Ok(None);
    };

    let content = match ctx.file_read_as_string(&path).await {
        Ok(content) => content,
        Err(err) => {
            debug!("settings file {path} not loaded: {err:?}");
            return Ok(None);
        }
    };

    let settings = dotenv::Iter::new(content.as_bytes())
        .collect::<std::result::Result<HashMap<_, _>, _>>()
        .map_err(|e| {
            Error::config_invalid(format!("failed to parse settings file {path}"))
                .with_source(anyhow::Error::new(e))
        })?;
    Ok(Some(settings))
}
