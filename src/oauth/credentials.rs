// SPDX-FileCopyrightText: 2024 Softbear, Inc.
// SPDX-License-Identifier: AGPL-3.0-or-later

use super::OAuthProvider;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::fmt::{self, Debug, Display, Formatter};
use std::str::FromStr;
use url::{Host, Url};

/// A public client identifier, `clientID` or `consumerKey` depending on provider.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ClientId(String);
crate::impl_wrapper_str!(ClientId);
crate::impl_wrapper_display!(ClientId);

impl ClientId {
    /// Returns the trimmed identifier, or `None` if it is blank.
    pub fn new(value: &str) -> Option<Self> {
        non_blank(value).map(Self)
    }
}

/// A confidential client secret.
///
/// `Debug` shows a fingerprint instead of the value and there is no `Display`.
#[derive(Clone, Eq, PartialEq)]
pub struct ClientSecret(String);
crate::impl_wrapper_str!(ClientSecret);

impl ClientSecret {
    /// Returns the trimmed secret, or `None` if it is blank.
    pub fn new(value: &str) -> Option<Self> {
        non_blank(value).map(Self)
    }

    /// First 8 hex chars of the SHA-256 of the secret.
    ///
    /// Lets two deployments be compared without logging the secret.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        format!("{digest:x}").chars().take(8).collect()
    }
}

impl Debug for ClientSecret {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ClientSecret(sha256:{})", self.fingerprint())
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// An absolute `http` or `https` URL the provider redirects to.
///
/// Keeps the configured text so it is handed to consumers unchanged.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CallbackUrl {
    raw: String,
    url: Url,
}

impl CallbackUrl {
    /// Returns the URL exactly as configured.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the parsed URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Whether the host is `localhost` or a loopback address.
    pub fn is_loopback(&self) -> bool {
        match self.url.host() {
            Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
            Some(Host::Ipv4(ip)) => ip.is_loopback(),
            Some(Host::Ipv6(ip)) => ip.is_loopback(),
            None => false,
        }
    }

    /// Whether the provider would redirect over plain HTTP.
    pub fn is_insecure(&self) -> bool {
        self.url.scheme() == "http"
    }
}

impl Display for CallbackUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.raw, f)
    }
}

impl FromStr for CallbackUrl {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        let raw = s.trim();
        let url = Url::parse(raw).map_err(|e| format!("{raw}: {e}"))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!("{raw}: scheme must be http or https"));
        }
        if url.host().is_none() {
            return Err(format!("{raw}: no host"));
        }
        Ok(Self {
            raw: raw.to_string(),
            url,
        })
    }
}

crate::serde_str!(CallbackUrl);

/// The credentials a provider issued to this application.
///
/// Serializes with the provider's own field names, e.g. Twitter as
/// `{consumerKey, consumerSecret, callbackURL}`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProviderCredentials {
    provider: OAuthProvider,
    identifier: ClientId,
    secret: ClientSecret,
    callback_url: CallbackUrl,
}

impl ProviderCredentials {
    /// Creates a complete record.
    pub fn new(
        provider: OAuthProvider,
        identifier: ClientId,
        secret: ClientSecret,
        callback_url: CallbackUrl,
    ) -> Self {
        Self {
            provider,
            identifier,
            secret,
            callback_url,
        }
    }

    /// Returns provider.
    pub fn provider(&self) -> OAuthProvider {
        self.provider
    }

    /// `clientID` or `consumerKey`.
    pub fn identifier(&self) -> &ClientId {
        &self.identifier
    }

    /// `clientSecret` or `consumerSecret`.
    pub fn secret(&self) -> &ClientSecret {
        &self.secret
    }

    /// `callbackURL`.
    pub fn callback_url(&self) -> &CallbackUrl {
        &self.callback_url
    }

    /// Looks up a field by the provider's own name for it.
    pub fn field(&self, name: &str) -> Option<&str> {
        let provider = self.provider;
        if name == provider.identifier_field() {
            Some(self.identifier.as_str())
        } else if name == provider.secret_field() {
            Some(self.secret.as_str())
        } else if name == provider.callback_field() {
            Some(self.callback_url.as_str())
        } else {
            None
        }
    }

    /// Same shape as serialization, with the secret replaced by its fingerprint.
    pub fn redacted(&self) -> Value {
        let provider = self.provider;
        let mut object = serde_json::Map::new();
        object.insert(
            provider.identifier_field().to_string(),
            json!(self.identifier.as_str()),
        );
        object.insert(
            provider.secret_field().to_string(),
            json!(format!("sha256:{}", self.secret.fingerprint())),
        );
        object.insert(
            provider.callback_field().to_string(),
            json!(self.callback_url.as_str()),
        );
        Value::Object(object)
    }
}

impl Serialize for ProviderCredentials {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let provider = self.provider;
        let mut state = serializer.serialize_struct("ProviderCredentials", 3)?;
        state.serialize_field(provider.identifier_field(), &self.identifier)?;
        state.serialize_field(provider.secret_field(), &self.secret)?;
        state.serialize_field(provider.callback_field(), &self.callback_url)?;
        state.end()
    }
}
