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

/// Env value holding the subscription key sent with token requests.
pub const PC_SDK_SUBSCRIPTION_KEY: &str = "PC_SDK_SUBSCRIPTION_KEY";
/// Env value overriding the SAS token endpoint.
pub const PC_SDK_SAS_URL: &str = "PC_SDK_SAS_URL";

/// User-level settings file, consulted for values missing from the environment.
pub const SETTINGS_ENV_FILE: &str = "~/.planetarycomputer/settings.env";

/// Token endpoint used when nothing else is configured.
pub const DEFAULT_SAS_TOKEN_ENDPOINT: &str =
    "https://planetarycomputer.microsoft.com/api/sas/v1/token";

// Headers used by the signing service.
pub const OCP_APIM_SUBSCRIPTION_KEY: &str = "Ocp-Apim-Subscription-Key";

/// Host suffix of every URL that needs signing.
pub const BLOB_STORAGE_DOMAIN: &str = ".blob.core.windows.net";

/// Tokens with less than this many seconds left are refreshed before use.
pub const TOKEN_EXPIRY_BUFFER_SECS: i64 = 60;

/// Query parameters that mark a URL as already signed.
pub const SAS_QUERY_MARKERS: [&str; 3] = ["st", "se", "sp"];

pub const VRT_OPEN_TAG: &str = "<VRTDataset";
pub const VRT_CLOSE_TAG: &str = "</VRTDataset>";

/// Schemes understood by adlfs; their authority is the container name.
pub const ADLFS_SCHEMES: [&str; 2] = ["abfs", "az"];

/// Nested locations of fsspec storage options inside an asset, in lookup order.
pub const STORAGE_OPTIONS_PATHS: [&[&str]; 4] = [
    &["table:storage_options"],
    &["xarray:storage_options"],
    &["xarray:open_kwargs", "storage_options"],
    &["xarray:open_kwargs", "backend_kwargs", "storage_options"],
];
