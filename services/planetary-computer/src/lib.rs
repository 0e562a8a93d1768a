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

//! Sign Planetary Computer data with SAS tokens
//!
//! Data in the Planetary Computer lives in Azure Blob Storage and can only be
//! read with a Shared Access Signature (SAS) token issued by the Planetary
//! Computer token service. This crate fetches and caches those tokens and
//! appends them to every blob storage URL it finds in:
//!
//! - plain URLs and GDAL VRT documents
//! - STAC assets, items and item collections, including the credentials of
//!   assets opened through fsspec storage options
//! - STAC API searches
//! - raw JSON: Kerchunk reference files, STAC items and feature collections
//!
//! # Example
//!
//! ```rust,no_run
//! use anyhow::Result;
//! use pcsign_core::{Context, OsEnv};
//! use pcsign_planetary_computer::{Config, Signer};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Wire up real HTTP and file reading implementations here.
//!     let ctx = Context::new().with_env(OsEnv);
//!
//!     let config = Config::from_env(&ctx).await?;
//!     let signer = Signer::new(ctx, config);
//!
//!     let href = signer
//!         .sign_url("https://naipeuwest.blob.core.windows.net/naip/v002/al/2019/al_60cm_2019/30086/m_3008601_ne_16_060_20191109.tif")
//!         .await?;
//!     println!("{href}");
//!
//!     Ok(())
//! }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

mod constants;
pub use constants::{
    BLOB_STORAGE_DOMAIN, DEFAULT_SAS_TOKEN_ENDPOINT, PC_SDK_SAS_URL, PC_SDK_SUBSCRIPTION_KEY,
};

mod config;
pub use config::Config;

mod token;
pub use token::{SasToken, SignedLink};

mod provide_token;
pub use provide_token::{TokenCache, TokenProvider};

mod url;
pub use url::{is_blob_storage_url, is_signed, parse_adlfs_url, parse_blob_url};

mod vrt;
pub use vrt::{find_blob_urls, is_vrt_string};

mod fsspec;
pub use fsspec::is_fsspec_asset;

pub mod stac;
pub use stac::{Asset, Item, ItemCollection, ItemSearch, Link, StacApiSearch};

mod signable;
pub use signable::{MappingSchema, Signable};

mod signer;
pub use signer::Signer;
