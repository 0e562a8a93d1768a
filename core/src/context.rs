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

use crate::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;

/// Context is everything a signer may need from the outside world: the
/// settings file, the token service and the process environment.
///
/// Signers never reach for `std::env`, `std::fs` or a HTTP client themselves.
/// A fresh context can do none of these things; wire in the parts you need with
/// the `with_*` methods.
///
/// ```
/// use pcsign_core::{Context, StaticEnv};
///
/// let ctx = Context::new().with_env(StaticEnv::new().with_var("PC_SDK_SAS_URL", "https://example.com"));
/// assert_eq!(ctx.env_var("PC_SDK_SAS_URL").as_deref(), Some("https://example.com"));
/// ```
#[derive(Clone)]
pub struct Context {
    fs: Arc<dyn FileRead>,
    http: Arc<dyn HttpSend>,
    env: Arc<dyn Env>,
}

impl Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("fs", &self.fs)
            .field("http", &self.http)
            .field("env", &self.env)
            .finish()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Create a context where file reads and HTTP requests fail and the
    /// environment is empty.
    pub fn new() -> Self {
        Self {
            fs: Arc::new(NoopFileRead),
            http: Arc::new(NoopHttpSend),
            env: Arc::new(NoopEnv),
        }
    }

    /// Use `fs` for reading files.
    pub fn with_file_read(mut self, fs: impl FileRead) -> Self {
        self.fs = Arc::new(fs);
        self
    }

    /// Use `http` for sending requests.
    pub fn with_http_send(mut self, http: impl HttpSend) -> Self {
        self.http = Arc::new(http);
        self
    }

    /// Use `env` for environment lookups.
    pub fn with_env(mut self, env: impl Env) -> Self {
        self.env = Arc::new(env);
        self
    }

    /// Read a whole file.
    #[inline]
    pub async fn file_read(&self, path: &str) -> Result<Vec<u8>> {
        self.fs.file_read(path).await
    }

    /// Read a whole file as text. Invalid utf-8 is replaced, not rejected.
    pub async fn file_read_as_string(&self, path: &str) -> Result<String> {
        let bytes = self.file_read(path).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Send a request and wait for the full response.
    #[inline]
    pub async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        self.http.http_send(req).await
    }

    /// Look up an environment variable.
    ///
    /// Missing and non utf-8 values are both `None`.
    #[inline]
    pub fn env_var(&self, key: &str) -> Option<String> {
        self.env.var(key)
    }

    /// Home directory of the current user.
    #[inline]
    pub fn home_dir(&self) -> Option<PathBuf> {
        self.env.home_dir()
    }

    /// Replace a leading `~` in `path` with the home directory.
    ///
    /// Paths without a leading `~/` (or `~\`) are returned as is. `None` means
    /// the path needs a home directory and there is none.
    pub fn expand_home_dir(&self, path: &str) -> Option<String> {
        let Some(rest) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) else {
            return Some(path.to_string());
        };
        let home = self.home_dir()?;
        Some(home.join(rest).to_string_lossy().into_owned())
    }
}

/// FileRead reads whole files, like the user-level settings file.
#[async_trait]
pub trait FileRead: Debug + Send + Sync + 'static {
    /// Read the file at `path` entirely.
    async fn file_read(&self, path: &str) -> Result<Vec<u8>>;
}

/// HttpSend sends the few requests signing needs: token requests and catalog
/// searches. It's not meant to be a general purpose HTTP client.
#[async_trait]
pub trait HttpSend: Debug + Send + Sync + 'static {
    /// Send `req` and return the response with its body fully read.
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>>;
}

/// Env answers environment lookups.
pub trait Env: Debug + Send + Sync + 'static {
    /// Get an environment variable.
    fn var(&self, key: &str) -> Option<String>;

    /// Home directory of the current user, if there is one.
    fn home_dir(&self) -> Option<PathBuf>;
}

/// The environment of the running process.
#[derive(Debug, Copy, Clone)]
pub struct OsEnv;

impl Env for OsEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var_os(key)?.into_string().ok()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        let key = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
        std::env::var_os(key)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
    }
}

/// A fixed environment, mostly useful in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticEnv {
    home_dir: Option<PathBuf>,
    vars: HashMap<String, String>,
}

impl StaticEnv {
    /// Create an empty environment without a home directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable.
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Set the home directory.
    pub fn with_home_dir(mut self, home_dir: impl Into<PathBuf>) -> Self {
        self.home_dir = Some(home_dir.into());
        self
    }
}

impl Env for StaticEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        self.home_dir.clone()
    }
}

/// NoopFileRead fails every read.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFileRead;

#[async_trait]
impl FileRead for NoopFileRead {
    async fn file_read(&self, path: &str) -> Result<Vec<u8>> {
        Err(Error::unexpected(format!(
            "can't read {path}: no file reader configured"
        )))
    }
}

/// NoopHttpSend fails every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHttpSend;

#[async_trait]
impl HttpSend for NoopHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        Err(Error::unexpected(format!(
            "can't send request to {}: no HTTP client configured",
            req.uri()
        )))
    }
}

/// NoopEnv is an empty environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEnv;

impl Env for NoopEnv {
    fn var(&self, _key: &str) -> Option<String> {
        None
    }

    fn home_dir(&self) -> Option<PathBuf> {
        None
    }
}
