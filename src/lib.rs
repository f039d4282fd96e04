// SPDX-FileCopyrightText: 2024 Softbear, Inc.
// SPDX-License-Identifier: LGPL-3.0-or-later

#![warn(missing_docs)]
//! Credentials for third-party OAuth providers (Facebook, Twitter and
//! Google), loaded once from a config file and the environment, validated
//! at startup and read-only afterwards.
//!
//! ```no_run
//! use passport_keys::{install_auth_settings, AuthConfig, AuthSettings};
//!
//! let auth_config = AuthConfig::builder()
//!     .toml_file("auth.toml")
//!     .env()
//!     .build()?;
//! let auth_settings = install_auth_settings(AuthSettings::new(&auth_config)?)?;
//! let client_id = auth_settings.field("googleAuth", "clientID");
//! # Ok::<(), passport_keys::Error>(())
//! ```

/// Configuration sources and the error type.
pub mod common;
pub use common::*;

/// Thread-safe load log.
pub mod log;
pub use log::*;

/// Provider credential records.
pub mod oauth;
pub use oauth::*;

/// Macros used with `serde` serialization and deserialization.
pub mod serde_utils;
pub use serde_utils::*;
