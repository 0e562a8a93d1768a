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

//! Credentials for assets opened through fsspec storage options.
//!
//! Some assets aren't read through a signed URL but through a remote filesystem
//! built from a nested `storage_options` dictionary, e.g.
//!
//! ```json
//! {
//!   "href": "abfs://daymet-zarr/daily/hi.zarr",
//!   "xarray:open_kwargs": {"storage_options": {"account_name": "daymeteuwest"}}
//! }
//! ```
//!
//! For those the raw SAS token goes into the dictionary as `credential`.

use log::debug;
use pcsign_core::{Context, Result};
use serde_json::{Map, Value};

use crate::constants::STORAGE_OPTIONS_PATHS;
use crate::url::parse_adlfs_url;
use crate::TokenProvider;

const ACCOUNT_NAME: &str = "account_name";
const CREDENTIAL: &str = "credential";

fn lookup<'a>(fields: &'a Map<String, Value>, path: &[&str]) -> Option<&'a Value> {
    let (last, parents) = path.split_last()?;
    let mut current = fields;
    for key in parents {
        current = current.get(*key)?.as_object()?;
    }
    current.get(*last).filter(|v| !v.is_null())
}

fn lookup_mut<'a>(fields: &'a mut Map<String, Value>, path: &[&str]) -> Option<&'a mut Value> {
    let (last, parents) = path.split_last()?;
    let mut current = fields;
    for key in parents {
        current = current.get_mut(*key)?.as_object_mut()?;
    }
    current.get_mut(*last).filter(|v| !v.is_null())
}

/// Check if any known storage options location of `fields` names an account.
pub fn is_fsspec_asset(fields: &Map<String, Value>) -> bool {
    STORAGE_OPTIONS_PATHS.iter().any(|path| {
        lookup(fields, path)
            .and_then(Value::as_object)
            .is_some_and(|options| options.contains_key(ACCOUNT_NAME))
    })
}

/// The storage options location in use: the first one present, even if it
/// doesn't name an account.
fn storage_options_path(fields: &Map<String, Value>) -> Option<&'static [&'static str]> {
    STORAGE_OPTIONS_PATHS
        .iter()
        .copied()
        .find(|path| lookup(fields, path).is_some())
}

/// Put a SAS token for the asset's container into its storage options.
///
/// `fields` are the asset's properties beside `href`. Nothing happens unless the
/// storage options name an account and `href` is an `abfs://` or `az://` URL.
pub(crate) async fn inject_credential(
    ctx: &Context,
    tokens: &TokenProvider,
    href: &str,
    fields: &mut Map<String, Value>,
) -> Result<()> {
    if !is_fsspec_asset(fields) {
        return Ok(());
    }
    let Some(path) = storage_options_path(fields) else {
        return Ok(());
    };

    let account = lookup(fields, path)
        .and_then(|options| options.get(ACCOUNT_NAME))
        .and_then(Value::as_str)
        .filter(|account| !account.is_empty())
        .map(str::to_string);
    let (Some(account), Some(container)) = (account, parse_adlfs_url(href)) else {
        debug!("storage options at {} can't be signed for {href}", path.join("."));
        return Ok(());
    };

    let token = tokens.get_token(ctx, &account, &container).await?;
    if let Some(Value::Object(options)) = lookup_mut(fields, path) {
        options.insert(CREDENTIAL.to_string(), Value::String(token.token));
    }
    Ok(())
}
