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

//! Finding blob storage URLs inside GDAL VRT documents.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::{VRT_CLOSE_TAG, VRT_OPEN_TAG};

/// `https://<account>.blob.core.windows.net/<container>/<path>`, where the
/// path runs until the next `<`.
static BLOB_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https://[A-Za-z0-9_]+\.blob\.core\.windows\.net/[^/<]+/[^<]+")
        .expect("blob url pattern must be valid")
});

/// Check if `s` looks like a VRT document.
///
/// Only the outermost tags are checked, the document is not parsed.
pub fn is_vrt_string(s: &str) -> bool {
    let s = s.trim();
    s.starts_with(VRT_OPEN_TAG) && s.ends_with(VRT_CLOSE_TAG)
}

/// Byte ranges of every blob storage URL embedded in `vrt`, in order.
pub fn find_blob_urls(vrt: &str) -> Vec<Range<usize>> {
    BLOB_URL_RE.find_iter(vrt).map(|m| m.range()).collect()
}
