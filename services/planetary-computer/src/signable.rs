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
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::stac::{Asset, Item, ItemCollection, ItemSearch};
use crate::vrt::is_vrt_string;

/// Everything [`Signer::sign`](crate::Signer::sign) knows how to sign.
///
/// Strings are classified into [`Signable::Vrt`] or [`Signable::Url`] by
/// [`Signable::from`], JSON objects stay untyped as [`Signable::Mapping`] until
/// signing identifies their [`MappingSchema`].
#[derive(Clone, Debug)]
pub enum Signable {
    /// A single URL.
    Url(String),
    /// A GDAL VRT document.
    Vrt(String),
    /// A single asset.
    Asset(Asset),
    /// An item and all of its assets.
    Item(Item),
    /// A list of items.
    ItemCollection(ItemCollection),
    /// A search whose results get signed once it has been run.
    Search(Arc<dyn ItemSearch>),
    /// A raw JSON object: Kerchunk reference file, item or feature collection.
    Mapping(Map<String, Value>),
}

impl Signable {
    /// Classify an arbitrary JSON value.
    ///
    /// Only strings and objects can be signed, everything else fails with
    /// [`ErrorKind::UnsupportedType`](pcsign_core::ErrorKind::UnsupportedType).
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(Self::from(s)),
            Value::Object(map) => Ok(Self::Mapping(map)),
            v => Err(Error::unsupported_type(format!(
                "Unable to sign object of type {}",
                json_type_name(&v)
            ))),
        }
    }

    /// Turn the signed value back into JSON.
    ///
    /// A [`Signable::Search`] has no JSON form until it has been signed.
    pub fn into_value(self) -> Result<Value> {
        match self {
            Self::Url(s) | Self::Vrt(s) => Ok(Value::String(s)),
            Self::Asset(asset) => serde_json::to_value(asset)
                .map_err(|e| Error::unexpected("failed to serialize asset").with_source(e)),
            Self::Item(item) => item.to_value(),
            Self::ItemCollection(items) => items.to_value(),
            Self::Search(search) => Err(Error::unsupported_type(format!(
                "search {search:?} must be signed before it can be serialized"
            ))),
            Self::Mapping(map) => Ok(Value::Object(map)),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl From<String> for Signable {
    fn from(s: String) -> Self {
        if is_vrt_string(&s) {
            Self::Vrt(s)
        } else {
            Self::Url(s)
        }
    }
}

impl From<&str> for Signable {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<Asset> for Signable {
    fn from(asset: Asset) -> Self {
        Self::Asset(asset)
    }
}

impl From<Item> for Signable {
    fn from(item: Item) -> Self {
        Self::Item(item)
    }
}

impl From<ItemCollection> for Signable {
    fn from(items: ItemCollection) -> Self {
        Self::ItemCollection(items)
    }
}

impl From<Map<String, Value>> for Signable {
    fn from(map: Map<String, Value>) -> Self {
        Self::Mapping(map)
    }
}

impl<S: ItemSearch> From<Arc<S>> for Signable {
    fn from(search: Arc<S>) -> Self {
        Self::Search(search)
    }
}

/// The document formats a raw mapping may follow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MappingSchema {
    /// A Kerchunk reference file with `version`, `templates` and `refs`.
    ReferenceFile,
    /// A single STAC item (`"type": "Feature"`).
    Item,
    /// A GeoJSON feature collection of STAC items.
    FeatureCollection,
}

impl MappingSchema {
    /// Work out which format `map` follows, if any.
    pub fn identify(map: &Map<String, Value>) -> Option<Self> {
        if ["version", "templates", "refs"]
            .iter()
            .all(|key| map.contains_key(*key))
        {
            return Some(Self::ReferenceFile);
        }

        match map.get("type").and_then(Value::as_str) {
            Some("Feature") => Some(Self::Item),
            Some("FeatureCollection") if map.get("features").is_some_and(Value::is_array) => {
                Some(Self::FeatureCollection)
            }
            _ => None,
        }
    }
}
