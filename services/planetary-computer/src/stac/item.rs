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

use pcsign_core::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

use super::{Asset, Link};

/// A geospatial catalog entry: metadata plus a map of named assets.
///
/// Assets added to an item remember the item's id as their owner. The owner is
/// a plain id, so a cloned item owns its cloned assets without pointing back
/// into the item it was cloned from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "ItemRepr")]
pub struct Item {
    id: String,
    #[serde(default)]
    assets: BTreeMap<String, Asset>,
    /// `type`, `stac_version`, `geometry`, `links`, `collection`, `properties`
    /// and every other top-level field, kept verbatim.
    #[serde(flatten)]
    pub extra_fields: Map<String, Value>,
}

#[derive(Deserialize)]
struct ItemRepr {
    id: String,
    #[serde(default)]
    assets: BTreeMap<String, Asset>,
    #[serde(flatten)]
    extra_fields: Map<String, Value>,
}

impl From<ItemRepr> for Item {
    fn from(repr: ItemRepr) -> Self {
        let mut item = Item {
            id: repr.id,
            assets: repr.assets,
            extra_fields: repr.extra_fields,
        };
        item.adopt_assets();
        item
    }
}

impl Item {
    /// Create an empty `Feature` with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        let extra_fields = match json!({
            "type": "Feature",
            "stac_version": "1.0.0",
            "geometry": null,
            "properties": {},
            "links": [],
        }) {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };

        Self {
            id: id.into(),
            assets: BTreeMap::new(),
            extra_fields,
        }
    }

    /// Parse an item from its JSON form.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| Error::unexpected("failed to parse item").with_source(e))
    }

    /// Convert the item into its JSON form.
    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self)
            .map_err(|e| Error::unexpected("failed to serialize item").with_source(e))
    }

    /// Id of the item.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Change the id, keeping the owned assets pointed at this item.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
        self.adopt_assets();
    }

    /// Id of the collection this item belongs to.
    pub fn collection(&self) -> Option<&str> {
        self.extra_fields.get("collection").and_then(Value::as_str)
    }

    /// Set the collection id, or remove it with `None`.
    pub fn set_collection(&mut self, collection: Option<String>) {
        match collection {
            Some(collection) => {
                self.extra_fields
                    .insert("collection".to_string(), Value::String(collection));
            }
            None => {
                self.extra_fields.remove("collection");
            }
        }
    }

    /// The item's `properties`, if present.
    pub fn properties(&self) -> Option<&Map<String, Value>> {
        self.extra_fields.get("properties").and_then(Value::as_object)
    }

    /// Links to related resources. Entries that aren't valid links are skipped.
    pub fn links(&self) -> Vec<Link> {
        self.extra_fields
            .get("links")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|link| serde_json::from_value(link.clone()).ok())
            .collect()
    }

    /// All assets by key.
    pub fn assets(&self) -> &BTreeMap<String, Asset> {
        &self.assets
    }

    /// Look up one asset.
    pub fn asset(&self, key: &str) -> Option<&Asset> {
        self.assets.get(key)
    }

    /// Mutable access to every asset.
    ///
    /// Assets can be edited but not swapped out, so their owner stays intact.
    pub fn assets_mut(&mut self) -> impl Iterator<Item = (&String, &mut Asset)> {
        self.assets.iter_mut()
    }

    /// Mutable access to one asset.
    pub fn asset_mut(&mut self, key: &str) -> Option<&mut Asset> {
        self.assets.get_mut(key)
    }

    /// Add an asset, taking ownership of it. Returns the asset previously stored
    /// under `key`, released from this item.
    pub fn add_asset(&mut self, key: impl Into<String>, mut asset: Asset) -> Option<Asset> {
        asset.set_owner(Some(self.id.clone()));
        let mut previous = self.assets.insert(key.into(), asset)?;
        previous.set_owner(None);
        Some(previous)
    }

    /// Remove an asset, releasing it from this item.
    pub fn remove_asset(&mut self, key: &str) -> Option<Asset> {
        let mut asset = self.assets.remove(key)?;
        asset.set_owner(None);
        Some(asset)
    }

    fn adopt_assets(&mut self) {
        for asset in self.assets.values_mut() {
            asset.set_owner(Some(self.id.clone()));
        }
    }
}
