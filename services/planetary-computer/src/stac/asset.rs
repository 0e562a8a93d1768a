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

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A named data file belonging to an [`Item`](super::Item).
///
/// Only `href` is typed. Every other field, including `title`, `type`,
/// `roles` and extensions like `xarray:storage_options`, stays in
/// `extra_fields` exactly as it was read, nulls and empty arrays included.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Location of the data.
    pub href: String,
    /// All other fields of the asset.
    #[serde(flatten)]
    pub extra_fields: Map<String, Value>,

    #[serde(skip)]
    owner: Option<String>,
}

impl Asset {
    /// Create a new asset pointing at `href`.
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            ..Default::default()
        }
    }

    /// Set an extra field.
    pub fn with_extra_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra_fields.insert(key.into(), value);
        self
    }

    /// Short human readable title.
    pub fn title(&self) -> Option<&str> {
        self.extra_fields.get("title").and_then(Value::as_str)
    }

    /// Media type of the data.
    pub fn media_type(&self) -> Option<&str> {
        self.extra_fields.get("type").and_then(Value::as_str)
    }

    /// Semantic roles such as `data` or `thumbnail`.
    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.extra_fields
            .get("roles")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
    }

    /// Id of the item this asset belongs to, if it was added to one.
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub(crate) fn set_owner(&mut self, owner: Option<String>) {
        self.owner = owner;
    }
}
