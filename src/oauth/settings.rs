// SPDX-FileCopyrightText: 2024 Softbear, Inc.
// SPDX-License-Identifier: AGPL-3.0-or-later

use super::{CallbackUrl, ClientId, ClientSecret, OAuthProvider, ProviderCredentials};
use crate::common::{AuthConfig, Error};
use crate::log::LoadLog;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::OnceLock;

// Shorter secrets are legal but usually a copy/paste mistake.
const MIN_SECRET_LEN: usize = 16;

static AUTH_SETTINGS: OnceLock<AuthSettings> = OnceLock::new();

/// Credentials for every supported provider.
///
/// Always complete: one validated record per [`OAuthProvider`]. There are no
/// mutators; replacing credentials means loading a new configuration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AuthSettings {
    facebook: ProviderCredentials,
    twitter: ProviderCredentials,
    google: ProviderCredentials,
}

impl AuthSettings {
    /// Loads and validates provider credentials from `auth_config`.
    pub fn new(auth_config: &AuthConfig) -> Result<Self, Error> {
        Self::load(auth_config, &LoadLog::new(auth_config.debug()))
    }

    /// Like [`AuthSettings::new`], tracing the source of each value to `log`.
    ///
    /// Fails on the first missing or invalid field, in provider order.
    pub fn load(auth_config: &AuthConfig, log: &LoadLog) -> Result<Self, Error> {
        #[derive(Deserialize)]
        struct ConfigToml {
            #[serde(default, rename = "facebookAuth")]
            facebook_auth: BTreeMap<String, String>,
            #[serde(default, rename = "twitterAuth")]
            twitter_auth: BTreeMap<String, String>,
            #[serde(default, rename = "googleAuth")]
            google_auth: BTreeMap<String, String>,
        }
        let ConfigToml {
            facebook_auth,
            twitter_auth,
            google_auth,
        } = log.call("parsing config file".to_string(), auth_config.get())?;

        Ok(Self {
            facebook: load_provider(OAuthProvider::Facebook, &facebook_auth, auth_config, log)?,
            twitter: load_provider(OAuthProvider::Twitter, &twitter_auth, auth_config, log)?,
            google: load_provider(OAuthProvider::Google, &google_auth, auth_config, log)?,
        })
    }

    /// Returns the record for `provider`.
    pub fn provider(&self, provider: OAuthProvider) -> &ProviderCredentials {
        match provider {
            OAuthProvider::Facebook => &self.facebook,
            OAuthProvider::Twitter => &self.twitter,
            OAuthProvider::Google => &self.google,
        }
    }

    /// Returns the record under a config key like `googleAuth`, if any.
    pub fn get(&self, key: &str) -> Option<&ProviderCredentials> {
        OAuthProvider::from_config_key(key).map(|provider| self.provider(provider))
    }

    /// Returns a single value, e.g. `field("googleAuth", "clientID")`.
    pub fn field(&self, key: &str, field: &str) -> Option<&str> {
        self.get(key)?.field(field)
    }

    /// Every record, in provider order.
    pub fn iter(&self) -> impl Iterator<Item = &ProviderCredentials> {
        OAuthProvider::ALL
            .into_iter()
            .map(move |provider| self.provider(provider))
    }

    /// Same shape as serialization, with secrets replaced by fingerprints.
    pub fn redacted(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|credentials| {
                    (
                        credentials.provider().config_key().to_string(),
                        credentials.redacted(),
                    )
                })
                .collect(),
        )
    }
}

impl Serialize for AuthSettings {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("AuthSettings", OAuthProvider::ALL.len())?;
        for credentials in self.iter() {
            state.serialize_field(credentials.provider().config_key(), credentials)?;
        }
        state.end()
    }
}

/// Installs the process-wide settings. Only the first call succeeds.
pub fn install_auth_settings(auth_settings: AuthSettings) -> Result<&'static AuthSettings, Error> {
    AUTH_SETTINGS
        .set(auth_settings)
        .map_err(|_| Error::AlreadyInstalled)?;
    AUTH_SETTINGS.get().ok_or(Error::AlreadyInstalled)
}

/// Returns the process-wide settings, if installed.
pub fn auth_settings() -> Option<&'static AuthSettings> {
    AUTH_SETTINGS.get()
}

/// Resolves one field: environment, then config file.
fn lookup<'a>(
    provider: OAuthProvider,
    field: &'static str,
    table: &'a BTreeMap<String, String>,
    auth_config: &'a AuthConfig,
    log: &LoadLog,
) -> Option<&'a str> {
    let key = provider.config_key();
    if let Some(var) = provider.env_var(field) {
        if let Some(value) = auth_config.env_var(var) {
            log.trace(format!("{key}.{field}: from {var}"));
            return Some(value);
        }
    }
    let value = table.get(field).map(|v| v.trim()).filter(|v| !v.is_empty())?;
    log.trace(format!("{key}.{field}: from config file"));
    Some(value)
}

fn load_provider(
    provider: OAuthProvider,
    table: &BTreeMap<String, String>,
    auth_config: &AuthConfig,
    log: &LoadLog,
) -> Result<ProviderCredentials, Error> {
    let key = provider.config_key();
    for name in table.keys() {
        if !provider.field_names().contains(&name.as_str()) {
            log.warn(format!("{key}.{name}: unknown field ignored"));
        }
    }

    let missing = |field: &'static str| Error::MissingField { provider, field };

    let field = provider.identifier_field();
    let identifier = lookup(provider, field, table, auth_config, log)
        .and_then(ClientId::new)
        .ok_or_else(|| missing(field))?;
    warn_if_placeholder(log, key, field, identifier.as_str());

    let field = provider.secret_field();
    let secret = lookup(provider, field, table, auth_config, log)
        .and_then(ClientSecret::new)
        .ok_or_else(|| missing(field))?;
    warn_if_placeholder(log, key, field, secret.as_str());
    if secret.len() < MIN_SECRET_LEN {
        log.warn(format!(
            "{key}.{field}: unusually short ({} chars, sha256:{})",
            secret.len(),
            secret.fingerprint()
        ));
    } else {
        log.trace(format!("{key}.{field}: sha256:{}", secret.fingerprint()));
    }

    let field = provider.callback_field();
    let derived;
    let raw_callback = match lookup(provider, field, table, auth_config, log) {
        Some(value) => value,
        None => {
            let base_url = auth_config.base_url().ok_or_else(|| missing(field))?;
            derived = format!("{base_url}/auth/{}/callback", provider.path_segment());
            log.trace(format!("{key}.{field}: defaulted from base URL"));
            derived.as_str()
        }
    };
    let callback_url: CallbackUrl = raw_callback.parse().map_err(|reason| Error::InvalidUrl {
        provider,
        field,
        reason,
    })?;
    if callback_url.is_insecure() && !callback_url.is_loopback() {
        log.warn(format!(
            "{key}.{field}: {callback_url} uses http on a non-local host"
        ));
    }

    Ok(ProviderCredentials::new(
        provider,
        identifier,
        secret,
        callback_url,
    ))
}

/// Values like `your-client-secret-here` are sample text, not credentials.
fn warn_if_placeholder(log: &LoadLog, key: &str, field: &str, value: &str) {
    let lower = value.to_ascii_lowercase();
    if lower.starts_with("your-") && lower.ends_with("-here") {
        log.warn(format!("{key}.{field}: looks like a placeholder"));
    }
}
