// SPDX-FileCopyrightText: 2024 Softbear, Inc.
// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::common::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Name of the callback field, shared by every provider.
pub const CALLBACK_FIELD: &str = "callbackURL";

/// The `OAuthProvider` enum contains the list of supported `OAuth2` providers.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum OAuthProvider {
    /// https://facebook.com
    Facebook,
    /// https://twitter.com
    Twitter,
    /// https://google.com
    Google,
}

impl OAuthProvider {
    /// Every provider, in load order.
    pub const ALL: [OAuthProvider; 3] = [Self::Facebook, Self::Twitter, Self::Google];

    /// Key of this provider's record in the outer mapping.
    pub fn config_key(self) -> &'static str {
        match self {
            Self::Facebook => "facebookAuth",
            Self::Twitter => "twitterAuth",
            Self::Google => "googleAuth",
        }
    }

    /// Returns the provider whose record lives under `key`, e.g. `googleAuth`.
    pub fn from_config_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.config_key() == key)
    }

    /// Name of the public identifier field.
    pub fn identifier_field(self) -> &'static str {
        match self {
            Self::Twitter => "consumerKey",
            Self::Facebook | Self::Google => "clientID",
        }
    }

    /// Name of the confidential secret field.
    pub fn secret_field(self) -> &'static str {
        match self {
            Self::Twitter => "consumerSecret",
            Self::Facebook | Self::Google => "clientSecret",
        }
    }

    /// Name of the callback URL field.
    pub fn callback_field(self) -> &'static str {
        CALLBACK_FIELD
    }

    /// Identifier, secret and callback field names, in that order.
    pub fn field_names(self) -> [&'static str; 3] {
        [
            self.identifier_field(),
            self.secret_field(),
            self.callback_field(),
        ]
    }

    /// Environment variable that supplies `field`, or `None` if this
    /// provider has no such field.
    pub fn env_var(self, field: &str) -> Option<&'static str> {
        use OAuthProvider::*;
        Some(match (self, field) {
            (Facebook, "clientID") => "FACEBOOK_CLIENT_ID",
            (Facebook, "clientSecret") => "FACEBOOK_CLIENT_SECRET",
            (Facebook, CALLBACK_FIELD) => "FACEBOOK_CALLBACK_URL",
            (Twitter, "consumerKey") => "TWITTER_CONSUMER_KEY",
            (Twitter, "consumerSecret") => "TWITTER_CONSUMER_SECRET",
            (Twitter, CALLBACK_FIELD) => "TWITTER_CALLBACK_URL",
            (Google, "clientID") => "GOOGLE_CLIENT_ID",
            (Google, "clientSecret") => "GOOGLE_CLIENT_SECRET",
            (Google, CALLBACK_FIELD) => "GOOGLE_CALLBACK_URL",
            _ => return None,
        })
    }

    /// Lowercase name, as used in callback paths like `/auth/google/callback`.
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::Facebook => "facebook",
            Self::Twitter => "twitter",
            Self::Google => "google",
        }
    }
}

impl Display for OAuthProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Self::Facebook => Display::fmt("Facebook", f),
            Self::Twitter => Display::fmt("Twitter", f),
            Self::Google => Display::fmt("Google", f),
        }
    }
}

/// Accepts the provider name in any case, or its config key.
impl FromStr for OAuthProvider {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Error> {
        if let Some(provider) = Self::from_config_key(s) {
            return Ok(provider);
        }
        Self::ALL
            .into_iter()
            .find(|p| p.path_segment().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::String(format!("{s}: not an oauth2 provider")))
    }
}

/// Convert from provider name to `OAuthProvider` enum.
impl TryFrom<String> for OAuthProvider {
    type Error = Error;
    fn try_from(oauth_provider: String) -> Result<Self, Error> {
        oauth_provider.parse()
    }
}

crate::serde_str!(OAuthProvider);
