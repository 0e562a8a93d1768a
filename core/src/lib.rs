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

//! Core components for signing blob storage references.
//!
//! This crate provides the foundational types shared by the pcsign workspace:
//!
//! - **Context**: A container that holds implementations for file reading, HTTP sending and
//!   environment access. Signers never touch the network, the filesystem or the process
//!   environment directly; they go through the context so that tests can swap in fakes.
//! - **Error**: The single error type used across the workspace.
//!
//! ## Example
//!
//! ```
//! use pcsign_core::{Context, OsEnv};
//!
//! // Only the environment is wired up here; HTTP and file reading stay no-ops
//! // until `with_http_send` / `with_file_read` are called.
//! let ctx = Context::new().with_env(OsEnv);
//! assert!(ctx.env_var("PC_SDK_SOME_UNSET_VARIABLE").is_none());
//! ```
//!
//! ## Utilities
//!
//! - [`time`]: Time helpers built on chrono
//! - [`utils`]: General utilities including data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod time;
pub mod utils;

mod context;
pub use context::{Context, Env, FileRead, HttpSend, NoopEnv, NoopFileRead, NoopHttpSend};
pub use context::{OsEnv, StaticEnv};

mod error;
pub use error::{Error, ErrorKind, Result};
