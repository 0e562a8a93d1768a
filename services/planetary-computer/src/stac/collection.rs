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
use serde_json::{Map, Value};

use super::Item;

/// An ordered group of items, serialized as a GeoJSON `FeatureCollection`.
///
/// Items are addressed by their index in the collection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemCollection {
    #[serde(rename = "features", default)]
    items: Vec<Item>,
    /// `type` and every other top-level field, kept verbatim.
    #[serde(flatten)]
    pub extra_fields: Map<String, Value>,
}

impl Default for ItemCollection {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl FromIterator<Item> for ItemCollection {
    fn from_iter<T: IntoIterator<Item = Item>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for ItemCollection {
    type Item = Item;
    type IntoIter = std::vec::IntoIter<Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a ItemCollection {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl ItemCollection {
    /// Create a collection holding `items`.
    pub fn new(items: Vec<Item>) -> Self {
        let mut extra_fields = Map::new();
        extra_fields.insert(
            "type".to_string(),
            Value::String("FeatureCollection".to_string()),
        );
        Self {
            items,
            extra_fields,
        }
    }

    /// Parse a collection from its `FeatureCollection` JSON form.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| Error::unexpected("failed to parse item collection").with_source(e))
    }

    /// Convert the collection into its `FeatureCollection` JSON form.
    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self)
            .map_err(|e| Error::unexpected("failed to serialize item collection").with_source(e))
    }

    /// Append an item, returning its index.
    pub fn push(&mut self, item: Item) -> usize {
        self.items.push(item);
        self.items.len() - 1
    }

    /// The item at `index`.
    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    /// Mutable access to the item at `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Item> {
        self.items.get_mut(index)
    }

    /// All items, in order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Iterate over the items.
    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    /// Iterate mutably over the items.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Item> {
        self.items.iter_mut()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the collection has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
