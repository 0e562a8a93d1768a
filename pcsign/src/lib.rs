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

//! Sign Planetary Computer data with SAS tokens, without any setup.
//!
//! This crate wires [`pcsign_planetary_computer`] to real I/O: tokio for
//! reading the settings file, reqwest for talking to the token service and
//! the process environment for configuration. On top of that it keeps one
//! process-wide [`Signer`] so tokens are cached across calls.
//!
//! # Example
//!
//! ```no_run
//! # #[tokio::main]
//! # async fn main() -> pcsign::Result<()> {
//! let href = pcsign::sign_url(
//!     "https://naipeuwest.blob.core.windows.net/naip/v002/al/2019/al_60cm_2019/30086/m_3008601_ne_16_060_20191109.tif",
//! )
//! .await?;
//! println!("{href}");
//! # Ok(())
//! # }
//! ```
//!
//! To sign against another endpoint or with an explicit subscription key, build
//! a [`Signer`] yourself:
//!
//! ```no_run
//! # async fn example() -> pcsign::Result<()> {
//! use pcsign::{default_context, Config, Signer};
//!
//! let signer = Signer::new(
//!     default_context(),
//!     Config::default().with_subscription_key("my-key"),
//! );
//! let href = signer
//!     .sign_url("https://naipeuwest.blob.core.windows.net/naip/01.tif")
//!     .await?;
//! # Ok(())
//! # }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub use pcsign_core::*;
pub use pcsign_planetary_computer::*;

mod context;
pub use context::{context_with_client, default_context};

mod default;
#[allow(deprecated)]
pub use default::sign_assets;
pub use default::{
    default_signer, get_token, search_and_sign, set_subscription_key, sign, sign_asset,
    sign_in_place, sign_item, sign_item_collection, sign_mapping, sign_url, sign_value, sign_vrt,
};
