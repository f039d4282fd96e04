// SPDX-FileCopyrightText: 2024 Softbear, Inc.
// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::oauth::OAuthProvider;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Eq, PartialEq)]
/// An enum that encapsulates a variety of error types.
///
/// # Example
///
/// Error::MissingField { provider: OAuthProvider::Google, field: "clientID" }
pub enum Error {
    /// The process-wide settings were installed more than once.
    AlreadyInstalled,
    /// A callback URL cannot be used by the provider's redirect.
    InvalidUrl {
        /// Provider whose record holds the URL.
        provider: OAuthProvider,
        /// Field name, e.g. `callbackURL`.
        field: &'static str,
        /// Why the URL was rejected.
        reason: String,
    },
    /// A required field is absent or empty.
    MissingField {
        /// Provider whose record is incomplete.
        provider: OAuthProvider,
        /// Field name, e.g. `clientID`.
        field: &'static str,
    },
    /// String error.
    String(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Error::AlreadyInstalled => Display::fmt("auth settings already installed", f),
            Error::InvalidUrl {
                provider,
                field,
                reason,
            } => Display::fmt(
                &format!("{}.{field}: invalid URL: {reason}", provider.config_key()),
                f,
            ),
            Error::MissingField { provider, field } => Display::fmt(
                &format!(
                    "{}.{field}: missing (set {} or add it to the config file)",
                    provider.config_key(),
                    provider.env_var(field).unwrap_or("?"),
                ),
                f,
            ),
            Error::String(s) => Display::fmt(&s, f),
        }
    }
}

impl std::error::Error for Error {}
