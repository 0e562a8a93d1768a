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

//! A process-wide signer, configured from the environment on first use.

use log::{debug, warn};
use once_cell::sync::Lazy;
use pcsign_core::{Context, Result};
use pcsign_planetary_computer::{
    Asset, Config, Item, ItemCollection, ItemSearch, SasToken, Signable, Signer,
};
use reqwest::Client;
use serde_json::{Map, Value};
use tokio::sync::OnceCell;

use crate::context_with_client;

/// The process-wide context outlives any single tokio runtime, so its client
/// keeps no idle connections: a pooled connection is bound to the runtime
/// that opened it and fails once that runtime is dropped.
static DEFAULT_CONTEXT: Lazy<Context> = Lazy::new(|| context_with_client(process_client()));
static DEFAULT_SIGNER: OnceCell<Signer> = OnceCell::const_new();

fn process_client() -> Client {
    Client::builder()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap_or_else(|err| {
            warn!("failed to build http client without pooling, using the default: {err}");
            Client::new()
        })
}

/// The process-wide signer.
///
/// Built on first use from [`Config::from_env`], so it picks up
/// `PC_SDK_SUBSCRIPTION_KEY`, `PC_SDK_SAS_URL` and
/// `~/.planetarycomputer/settings.env`. All top-level functions of this crate
/// share it, and with it one token cache.
///
/// It can be used from any tokio runtime, including several runtimes created
/// one after another. Callers that run a single long-lived runtime and want
/// connection reuse should build their own [`Signer`] with
/// [`context_with_client`](crate::context_with_client).
pub async fn default_signer() -> Result<&'static Signer> {
    DEFAULT_SIGNER
        .get_or_try_init(|| async {
            let ctx = DEFAULT_CONTEXT.clone();
            let config = Config::from_env(&ctx).await?;
            debug!("default signer loaded with {config:?}");
            Ok(Signer::new(ctx, config))
        })
        .await
}

/// Set the subscription key used by the process-wide signer.
///
/// Signers created with [`Signer::new`] are not affected.
pub async fn set_subscription_key(key: impl Into<String>) -> Result<()> {
    default_signer()
        .await?
        .token_provider()
        .set_subscription_key(key);
    Ok(())
}

/// Get a token for a container in a storage account.
pub async fn get_token(account: &str, container: &str) -> Result<SasToken> {
    default_signer().await?.get_token(account, container).await
}

/// Return a signed copy of `signable`, see [`Signer::sign`].
pub async fn sign(signable: impl Into<Signable>) -> Result<Signable> {
    let mut signable = signable.into();
    default_signer().await?.sign_in_place(&mut signable).await?;
    Ok(signable)
}

/// Sign `signable` in place, see [`Signer::sign_in_place`].
pub async fn sign_in_place(signable: &mut Signable) -> Result<()> {
    default_signer().await?.sign_in_place(signable).await
}

/// Sign an arbitrary JSON value, see [`Signer::sign_value`].
pub async fn sign_value(value: &Value) -> Result<Value> {
    default_signer().await?.sign_value(value).await
}

/// Sign a single URL, see [`Signer::sign_url`].
pub async fn sign_url(url: &str) -> Result<String> {
    default_signer().await?.sign_url(url).await
}

/// Sign every blob storage URL in a VRT document.
pub async fn sign_vrt(vrt: &str) -> Result<String> {
    default_signer().await?.sign_vrt(vrt).await
}

/// Return a signed copy of `asset`.
pub async fn sign_asset(asset: &Asset) -> Result<Asset> {
    default_signer().await?.sign_asset(asset).await
}

/// Return a copy of `item` with all of its assets signed.
pub async fn sign_item(item: &Item) -> Result<Item> {
    default_signer().await?.sign_item(item).await
}

/// Old name of [`sign_item`].
#[deprecated(note = "use `sign_item` instead")]
#[allow(deprecated)]
pub async fn sign_assets(item: &Item) -> Result<Item> {
    default_signer().await?.sign_assets(item).await
}

/// Return a copy of `items` with every item signed.
pub async fn sign_item_collection(items: &ItemCollection) -> Result<ItemCollection> {
    default_signer().await?.sign_item_collection(items).await
}

/// Return a signed copy of a Kerchunk reference file, STAC item or feature
/// collection given as raw JSON.
pub async fn sign_mapping(mapping: &Map<String, Value>) -> Result<Map<String, Value>> {
    default_signer().await?.sign_mapping(mapping).await
}

/// Run `search` and sign everything it found.
pub async fn search_and_sign(search: &dyn ItemSearch) -> Result<ItemCollection> {
    default_signer().await?.search_and_sign(search).await
}
