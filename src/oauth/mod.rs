// SPDX-FileCopyrightText: 2024 Softbear, Inc.
// SPDX-License-Identifier: LGPL-3.0-or-later

/// A provider credential record and its fields.
mod credentials;
/// A supported OAuth2 provider and its field names.
mod provider;
mod settings;
mod tests;

pub use self::credentials::{CallbackUrl, ClientId, ClientSecret, ProviderCredentials};
pub use self::provider::{OAuthProvider, CALLBACK_FIELD};
pub use self::settings::{auth_settings, install_auth_settings, AuthSettings};
