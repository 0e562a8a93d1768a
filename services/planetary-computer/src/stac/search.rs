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

use async_trait::async_trait;
use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE};
use http::Method;
use log::debug;
use pcsign_core::{Context, Error, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt::Debug;

use super::{Item, ItemCollection, Link};

/// ItemSearch is a catalog query that can be run to materialize its matching
/// items.
#[async_trait]
pub trait ItemSearch: Debug + Send + Sync + 'static {
    /// Run the search and collect every matching item.
    async fn item_collection(&self, ctx: &Context) -> Result<ItemCollection>;
}

/// Search a [STAC API](https://github.com/radiantearth/stac-api-spec) `/search`
/// endpoint, following `next` links until the results are exhausted.
///
/// ```
/// use pcsign_planetary_computer::StacApiSearch;
///
/// let search = StacApiSearch::new("https://planetarycomputer.microsoft.com/api/stac/v1/search")
///     .with_collections(["naip"])
///     .with_bbox([-73.21, 43.99, -73.12, 44.05])
///     .with_max_items(10);
/// ```
#[derive(Clone, Debug)]
pub struct StacApiSearch {
    url: String,
    params: Map<String, Value>,
    max_items: Option<usize>,
}

#[derive(Deserialize)]
struct SearchPage {
    #[serde(default)]
    features: Vec<Item>,
    #[serde(default)]
    links: Vec<Link>,
}

struct PageRequest {
    method: Method,
    url: String,
    body: Option<Map<String, Value>>,
}

impl StacApiSearch {
    /// Create a search against `url` without any filters.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            params: Map::new(),
            max_items: None,
        }
    }

    /// Only match items in these collections.
    pub fn with_collections<I, S>(self, collections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let collections = collections
            .into_iter()
            .map(|c| Value::String(c.into()))
            .collect();
        self.with_param("collections", Value::Array(collections))
    }

    /// Only match items intersecting `[min_x, min_y, max_x, max_y]`.
    pub fn with_bbox(self, bbox: [f64; 4]) -> Self {
        self.with_param("bbox", Value::from(bbox.to_vec()))
    }

    /// Page size requested from the server.
    pub fn with_limit(self, limit: u64) -> Self {
        self.with_param("limit", Value::from(limit))
    }

    /// Stop after this many items, across pages.
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }

    /// Set any other search parameter, like `datetime`, `ids` or `query`.
    pub fn with_param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    async fn fetch_page(&self, ctx: &Context, page: &PageRequest) -> Result<SearchPage> {
        debug!("fetching search page {} {}", page.method, page.url);

        let req = http::Request::builder()
            .method(page.method.clone())
            .uri(&page.url)
            .header(ACCEPT, "application/geo+json");
        let req = match &page.body {
            Some(body) => {
                let body = serde_json::to_vec(body).map_err(|e| {
                    Error::unexpected("failed to serialize search body").with_source(e)
                })?;
                req.header(CONTENT_TYPE, "application/json")
                    .body(Bytes::from(body))?
            }
            None => req.body(Bytes::new())?,
        };

        let resp = ctx.http_send(req).await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = String::from_utf8_lossy(resp.body());
            return Err(Error::unexpected(format!(
                "search request to {} failed with status {status}: {body}",
                page.url
            )));
        }

        serde_json::from_slice(resp.body())
            .map_err(|e| Error::unexpected("failed to parse search response").with_source(e))
    }
}

fn next_page(links: &[Link], previous: &PageRequest) -> Result<Option<PageRequest>> {
    let Some(link) = links.iter().find(|link| link.rel == "next") else {
        return Ok(None);
    };

    let method = match link.method.as_deref() {
        Some(method) => Method::from_bytes(method.to_ascii_uppercase().as_bytes())
            .map_err(|e| Error::unexpected(format!("invalid next link method {method}")).with_source(e))?,
        None => Method::GET,
    };

    let body = if method == Method::GET {
        None
    } else {
        let mut body = if link.merge == Some(true) {
            previous.body.clone().unwrap_or_default()
        } else {
            Map::new()
        };
        if let Some(Value::Object(extra)) = &link.body {
            body.extend(extra.clone());
        }
        Some(body)
    };

    Ok(Some(PageRequest {
        method,
        url: link.href.clone(),
        body,
    }))
}

#[async_trait]
impl ItemSearch for StacApiSearch {
    async fn item_collection(&self, ctx: &Context) -> Result<ItemCollection> {
        let mut items = Vec::new();
        let mut next = Some(PageRequest {
            method: Method::POST,
            url: self.url.clone(),
            body: Some(self.params.clone()),
        });

        while let Some(page) = next.take() {
            let resp = self.fetch_page(ctx, &page).await?;
            let fetched = resp.features.len();
            items.extend(resp.features);

            if let Some(max) = self.max_items {
                if items.len() >= max {
                    items.truncate(max);
                    break;
                }
            }
            if fetched == 0 {
                break;
            }
            next = next_page(&resp.links, &page)?;
        }

        debug!("search against {} matched {} items", self.url, items.len());
        Ok(ItemCollection::new(items))
    }
}
