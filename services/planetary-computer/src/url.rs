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

//! Inspecting blob storage and adlfs URLs.

use pcsign_core::{Error, Result};
use url::Url;

use crate::constants::{ADLFS_SCHEMES, BLOB_STORAGE_DOMAIN, SAS_QUERY_MARKERS};

/// Find the account and container in a blob storage URL.
///
/// `https://naipeuwest.blob.core.windows.net/naip/v002/01.tif` yields
/// `("naipeuwest", "naip")`.
pub fn parse_blob_url(url: &str) -> Result<(String, String)> {
    let invalid = || Error::url_invalid(format!("Invalid blob URL: {url}"));

    let parsed = Url::parse(url.trim_end_matches('/'))
        .map_err(|e| invalid().with_source(anyhow::Error::new(e)))?;
    let host = parsed.host_str().ok_or_else(invalid)?;

    let account = host
        .split_once('.')
        .map(|(account, _)| account)
        .filter(|account| !account.is_empty())
        .ok_or_else(invalid)?;

    let container = parsed
        .path_segments()
        .and_then(|mut segments| segments.next())
        .filter(|container| !container.is_empty())
        .ok_or_else(invalid)?;

    Ok((account.to_string(), container.to_string()))
}

/// Find the container in an adlfs-style URL.
///
/// Both `abfs://<container>/<path>` and
/// `abfs://<container>@<account>.dfs.core.windows.net/<path>` are understood.
/// Returns `None` for any scheme adlfs doesn't understand.
pub fn parse_adlfs_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    if !ADLFS_SCHEMES.contains(&parsed.scheme()) {
        return None;
    }

    let container = match parsed.username() {
        "" => parsed.host_str()?,
        username => username,
    };
    (!container.is_empty()).then(|| container.to_string())
}

/// Check if `url` points at blob storage.
///
/// Strings that aren't URLs are never blob storage URLs.
pub fn is_blob_storage_url(url: &str) -> bool {
    Url::parse(url.trim_end_matches('/'))
        .ok()
        .and_then(|parsed| {
            parsed
                .host_str()
                .map(|host| host.ends_with(BLOB_STORAGE_DOMAIN))
        })
        .unwrap_or(false)
}

/// Check if `url` already carries a SAS token.
///
/// Every marker must be present with a non-empty value.
pub fn is_signed(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };

    let present: Vec<_> = parsed
        .query_pairs()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, _)| k)
        .collect();
    SAS_QUERY_MARKERS
        .iter()
        .all(|marker| present.iter().any(|k| k == marker))
}
