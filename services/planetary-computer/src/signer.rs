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

use log::{debug, warn};
use pcsign_core::{Context, Error, Result};
use serde_json::{Map, Value};

use crate::fsspec::inject_credential;
use crate::stac::{Asset, Item, ItemCollection, ItemSearch};
use crate::url::{is_blob_storage_url, is_signed, parse_blob_url};
use crate::vrt::find_blob_urls;
use crate::{Config, MappingSchema, SasToken, Signable, SignedLink, TokenProvider};

const UNSUPPORTED_MAPPING: &str = "When providing a mapping, it must conform to the Kerchunk \
    reference file spec or the STAC Item / FeatureCollection spec";

/// Signer appends SAS tokens to blob storage URLs, wherever they appear.
///
/// Every `sign_*` method comes in two flavors: the plain one leaves its input
/// untouched and returns a signed copy, the `_in_place` one rewrites its input.
/// Values that contain nothing to sign come back unchanged, never as errors.
///
/// Clones share the same token cache.
#[derive(Clone, Debug)]
pub struct Signer {
    ctx: Context,
    tokens: TokenProvider,
}

impl Signer {
    /// Create a signer with its own token cache.
    pub fn new(ctx: Context, config: Config) -> Self {
        Self::with_token_provider(ctx, TokenProvider::new(config))
    }

    /// Create a signer drawing tokens from `tokens`.
    pub fn with_token_provider(ctx: Context, tokens: TokenProvider) -> Self {
        Self { ctx, tokens }
    }

    /// The context used for token requests and searches.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// The provider tokens are drawn from.
    pub fn token_provider(&self) -> &TokenProvider {
        &self.tokens
    }

    /// Get a token for a container in a storage account, cached or fresh.
    pub async fn get_token(&self, account: &str, container: &str) -> Result<SasToken> {
        self.tokens.get_token(&self.ctx, account, container).await
    }

    /// Sign a single URL.
    ///
    /// URLs outside blob storage, already signed URLs and strings that aren't
    /// URLs at all are returned as is.
    pub async fn sign_url(&self, url: &str) -> Result<String> {
        Ok(match self.sign_url_link(url).await? {
            Some(link) => link.href,
            None => url.to_string(),
        })
    }

    /// Like [`Signer::sign_url`], but also tells when the signature expires.
    ///
    /// Returns `None` for URLs that don't need signing.
    pub async fn sign_url_link(&self, url: &str) -> Result<Option<SignedLink>> {
        if !is_blob_storage_url(url) {
            debug!("{url} is not in blob storage, skip signing");
            return Ok(None);
        }
        if is_signed(url) {
            debug!("{url} is already signed, skip signing");
            return Ok(None);
        }

        let (account, container) = parse_blob_url(url)?;
        let token = self.get_token(&account, &container).await?;
        Ok(Some(token.sign(url)))
    }

    /// Sign every blob storage URL inside a VRT document.
    ///
    /// All other text, including URLs elsewhere, is kept byte for byte.
    pub async fn sign_vrt(&self, vrt: &str) -> Result<String> {
        let mut signed = String::with_capacity(vrt.len());
        let mut last = 0;

        for range in find_blob_urls(vrt) {
            signed.push_str(&vrt[last..range.start]);
            signed.push_str(&self.sign_url(&vrt[range.clone()]).await?);
            last = range.end;
        }
        signed.push_str(&vrt[last..]);

        Ok(signed)
    }

    /// Return a signed copy of `asset`.
    pub async fn sign_asset(&self, asset: &Asset) -> Result<Asset> {
        let mut signed = asset.clone();
        self.sign_asset_in_place(&mut signed).await?;
        Ok(signed)
    }

    /// Sign the asset's href, and put a credential into its storage options if
    /// it is read through fsspec.
    pub async fn sign_asset_in_place(&self, asset: &mut Asset) -> Result<()> {
        asset.href = self.sign_url(&asset.href).await?;
        inject_credential(&self.ctx, &self.tokens, &asset.href, &mut asset.extra_fields).await
    }

    /// Return a copy of `item` with all of its assets signed.
    pub async fn sign_item(&self, item: &Item) -> Result<Item> {
        let mut signed = item.clone();
        self.sign_item_in_place(&mut signed).await?;
        Ok(signed)
    }

    /// Sign all assets of `item`.
    pub async fn sign_item_in_place(&self, item: &mut Item) -> Result<()> {
        for (_, asset) in item.assets_mut() {
            self.sign_asset_in_place(asset).await?;
        }
        Ok(())
    }

    /// Old name of [`Signer::sign_item`].
    #[deprecated(note = "use `sign_item` instead")]
    pub async fn sign_assets(&self, item: &Item) -> Result<Item> {
        warn!("'sign_assets' is deprecated and will be removed in a future version, use 'sign_item' instead");
        self.sign_item(item).await
    }

    /// Return a copy of `items` with every item signed.
    pub async fn sign_item_collection(&self, items: &ItemCollection) -> Result<ItemCollection> {
        let mut signed = items.clone();
        self.sign_item_collection_in_place(&mut signed).await?;
        Ok(signed)
    }

    /// Sign every item of `items`.
    pub async fn sign_item_collection_in_place(&self, items: &mut ItemCollection) -> Result<()> {
        for item in items.iter_mut() {
            self.sign_item_in_place(item).await?;
        }
        Ok(())
    }

    /// Run `search` and sign everything it found.
    pub async fn search_and_sign(&self, search: &dyn ItemSearch) -> Result<ItemCollection> {
        let mut items = search.item_collection(&self.ctx).await?;
        self.sign_item_collection_in_place(&mut items).await?;
        Ok(items)
    }

    /// Return a signed copy of a Kerchunk reference file, STAC item or
    /// feature collection given as raw JSON.
    pub async fn sign_mapping(&self, mapping: &Map<String, Value>) -> Result<Map<String, Value>> {
        let mut signed = mapping.clone();
        self.sign_mapping_in_place(&mut signed).await?;
        Ok(signed)
    }

    /// Sign a raw JSON mapping, see [`MappingSchema`] for the accepted formats.
    pub async fn sign_mapping_in_place(&self, mapping: &mut Map<String, Value>) -> Result<()> {
        match MappingSchema::identify(mapping) {
            Some(MappingSchema::ReferenceFile) => self.sign_reference_file(mapping).await,
            Some(MappingSchema::Item) => self.sign_item_mapping(mapping).await,
            Some(MappingSchema::FeatureCollection) => {
                if let Some(Value::Array(features)) = mapping.get_mut("features") {
                    for feature in features.iter_mut() {
                        if let Value::Object(feature) = feature {
                            self.sign_item_mapping(feature).await?;
                        }
                    }
                }
                Ok(())
            }
            None => Err(Error::unsupported_mapping(UNSUPPORTED_MAPPING)),
        }
    }

    async fn sign_reference_file(&self, mapping: &mut Map<String, Value>) -> Result<()> {
        let Some(Value::Object(templates)) = mapping.get_mut("templates") else {
            return Err(Error::unsupported_mapping(
                "templates of a Kerchunk reference file must be a mapping",
            ));
        };

        for template in templates.values_mut() {
            if let Value::String(url) = template {
                *url = self.sign_url(url).await?;
            }
        }
        Ok(())
    }

    async fn sign_item_mapping(&self, item: &mut Map<String, Value>) -> Result<()> {
        let Some(Value::Object(assets)) = item.get_mut("assets") else {
            return Ok(());
        };

        for asset in assets.values_mut() {
            let Value::Object(asset) = asset else {
                continue;
            };
            let Some(href) = asset.get("href").and_then(Value::as_str) else {
                continue;
            };

            let href = self.sign_url(href).await?;
            asset.insert("href".to_string(), Value::String(href.clone()));
            inject_credential(&self.ctx, &self.tokens, &href, asset).await?;
        }
        Ok(())
    }

    /// Return a signed copy of `signable`.
    ///
    /// A [`Signable::Search`] is run and comes back as the signed
    /// [`Signable::ItemCollection`] of its results.
    pub async fn sign(&self, signable: &Signable) -> Result<Signable> {
        let mut signed = signable.clone();
        self.sign_in_place(&mut signed).await?;
        Ok(signed)
    }

    /// Sign `signable`, replacing a search with the items it found.
    pub async fn sign_in_place(&self, signable: &mut Signable) -> Result<()> {
        match signable {
            Signable::Url(url) => *url = self.sign_url(url).await?,
            Signable::Vrt(vrt) => *vrt = self.sign_vrt(vrt).await?,
            Signable::Asset(asset) => self.sign_asset_in_place(asset).await?,
            Signable::Item(item) => self.sign_item_in_place(item).await?,
            Signable::ItemCollection(items) => self.sign_item_collection_in_place(items).await?,
            Signable::Search(search) => {
                let items = self.search_and_sign(search.as_ref()).await?;
                *signable = Signable::ItemCollection(items);
            }
            Signable::Mapping(mapping) => self.sign_mapping_in_place(mapping).await?,
        }
        Ok(())
    }

    /// Sign an arbitrary JSON value: a URL, a VRT document or a mapping.
    ///
    /// Anything else fails with
    /// [`ErrorKind::UnsupportedType`](pcsign_core::ErrorKind::UnsupportedType).
    pub async fn sign_value(&self, value: &Value) -> Result<Value> {
        let mut signable = Signable::from_value(value.clone())?;
        self.sign_in_place(&mut signable).await?;
        signable.into_value()
    }
}
