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

//! A small STAC object model: just enough of items, assets and item
//! collections to find and rewrite the URLs inside them.

mod asset;
pub use asset::Asset;

mod item;
pub use item::Item;

mod collection;
pub use collection::ItemCollection;

mod search;
pub use search::{ItemSearch, StacApiSearch};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A link from a STAC object to a related resource.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// Relation type, e.g. `self`, `parent` or `next`.
    pub rel: String,
    /// Target of the link.
    pub href: String,
    /// Media type of the target.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    /// HTTP method to use when following the link. STAC API paging uses this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Request body to send when following the link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Whether `body` should be merged into the previous request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge: Option<bool>,
    /// All other fields of the link.
    #[serde(flatten)]
    pub extra_fields: Map<String, Value>,
}

impl Link {
    /// Create a new link.
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            href: href.into(),
            media_type: None,
            method: None,
            body: None,
            merge: None,
            extra_fields: Map::new(),
        }
    }
}
