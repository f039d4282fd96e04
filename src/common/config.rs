// SPDX-FileCopyrightText: 2024 Softbear, Inc.
// SPDX-License-Identifier: LGPL-3.0-or-later

use super::Error;
use crate::oauth::OAuthProvider;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
#[allow(deprecated)]
use std::env::home_dir;
use std::fmt;
use std::fs::read_to_string;
use std::path::Path;

/// Environment variable holding the base used to derive default callback URLs.
pub const BASE_URL_VAR: &str = "AUTH_BASE_URL";

/// Configuration sources for provider credentials.
///
/// Holds an optional TOML document and a snapshot of the relevant
/// environment variables. Nothing is validated until the sources are turned
/// into [`AuthSettings`](crate::oauth::AuthSettings).
pub struct AuthConfig {
    base_url: Option<String>,
    debug_enabled: bool,
    env: BTreeMap<String, String>,
    toml: String,
}

impl AuthConfig {
    /// Creates a configuration builder.
    pub fn builder() -> AuthConfigBuilder {
        AuthConfigBuilder {
            base_url: None,
            debug_enabled: false,
            env: BTreeMap::new(),
            error: None,
            toml: None,
        }
    }

    /// Returns the base URL for default callbacks, if any.
    ///
    /// An explicit builder value wins over `AUTH_BASE_URL`.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url
            .as_deref()
            .or_else(|| self.env_var(BASE_URL_VAR))
            .map(|s| s.trim_end_matches('/'))
            .filter(|s| !s.is_empty())
    }

    /// Returns `true` if debug is enabled.
    pub fn debug(&self) -> bool {
        self.debug_enabled
    }

    /// Returns a captured environment variable, trimmed, if set and non-empty.
    pub fn env_var(&self, name: &str) -> Option<&str> {
        self.env
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Returns configuration parameters.
    ///
    /// Errors carry a position and a scrubbed message, never source text.
    pub fn get<T: DeserializeOwned>(&self) -> Result<T, Error> {
        toml::from_str(&self.toml).map_err(|e: toml::de::Error| {
            let message = scrub_quoted(e.message());
            match e.span() {
                Some(span) => {
                    let (line, column) = line_column(&self.toml, span.start);
                    Error::String(format!("toml: line {line}, column {column}: {message}"))
                }
                None => Error::String(format!("toml: {message}")),
            }
        })
    }
}

/// 1-based line and column of byte `offset` in `text`.
fn line_column(text: &str, offset: usize) -> (usize, usize) {
    let mut end = offset.min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let before = &text[..end];
    let line = before.matches('\n').count() + 1;
    let column = before
        .rsplit('\n')
        .next()
        .map(|s| s.chars().count())
        .unwrap_or(0)
        + 1;
    (line, column)
}

/// Replaces anything between backticks or double quotes with `...`.
///
/// Serde quotes offending values that way, e.g. integer `123`.
fn scrub_quoted(message: &str) -> String {
    let mut scrubbed = String::with_capacity(message.len());
    let mut quote = None;
    for c in message.chars() {
        match quote {
            Some(open) if c == open => {
                scrubbed.push_str("...");
                scrubbed.push(c);
                quote = None;
            }
            Some(_) => {}
            None => {
                scrubbed.push(c);
                if c == '`' || c == '"' {
                    quote = Some(c);
                }
            }
        }
    }
    if quote.is_some() {
        scrubbed.push_str("...");
    }
    scrubbed
}

// Values may be secrets, so only names and sizes are shown.
impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("base_url", &self.base_url)
            .field("debug_enabled", &self.debug_enabled)
            .field("env", &self.env.keys().collect::<Vec<_>>())
            .field("toml_len", &self.toml.len())
            .finish()
    }
}

/// Returns `true` for variables that [`AuthConfigBuilder::env`] captures.
fn is_captured_var(name: &str) -> bool {
    name == BASE_URL_VAR
        || OAuthProvider::ALL.iter().any(|provider| {
            provider
                .field_names()
                .iter()
                .any(|field| provider.env_var(field) == Some(name))
        })
}

/// Builder for [`AuthConfig`].
pub struct AuthConfigBuilder {
    base_url: Option<String>,
    debug_enabled: bool,
    env: BTreeMap<String, String>,
    error: Option<Error>,
    toml: Option<String>,
}

impl AuthConfigBuilder {
    /// Uses `base_url` to derive callback URLs that are not configured.
    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = Some(base_url.to_string());
        self
    }

    /// Returns the configuration, or the first error seen while reading sources.
    pub fn build(self) -> Result<AuthConfig, Error> {
        if let Some(error) = self.error {
            return Err(error);
        }
        Ok(AuthConfig {
            base_url: self.base_url,
            debug_enabled: self.debug_enabled,
            env: self.env,
            toml: self.toml.unwrap_or_default(),
        })
    }

    /// Echo load-log lines to stdout.
    pub fn debug(mut self, debug_enabled: bool) -> Self {
        self.debug_enabled = debug_enabled;
        self
    }

    /// Snapshots the provider variables from the process environment.
    pub fn env(self) -> Self {
        self.env_vars(std::env::vars())
    }

    /// Uses the given variables in place of the process environment.
    pub fn env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, _): &(String, String)| is_captured_var(k))
            .collect();
        self
    }

    /// Reads TOML from `file_name`.
    ///
    /// An absolute path is read as is. Otherwise the home directory is tried
    /// first, then the working directory.
    pub fn toml_file(mut self, file_name: &str) -> Self {
        if Path::new(file_name).is_absolute() {
            match read_to_string(file_name) {
                Ok(s) => {
                    self.toml = Some(s);
                    self.error = None;
                }
                Err(e) => self.error = Some(Error::String(format!("{file_name}: cannot read: {e}"))),
            }
            return self;
        }
        #[allow(deprecated)]
        let home_path = home_dir().and_then(|pathbuf| {
            pathbuf
                .to_str()
                .map(|path| format!("{path}/{file_name}"))
        });
        let local_path = format!("./{file_name}");
        if let Some(s) = home_path.and_then(|path| read_to_string(path).ok()) {
            self.toml = Some(s);
            self.error = None;
        } else {
            match read_to_string(&local_path) {
                Ok(s) => {
                    self.toml = Some(s);
                    self.error = None;
                }
                Err(_) => self.error = Some(Error::String(format!("{local_path}: cannot read"))),
            }
        }
        self
    }

    /// Uses inline TOML.
    pub fn toml_str(self, toml: &str) -> Self {
        self.toml_string(toml.to_string())
    }

    /// Uses inline TOML.
    ///
    /// Replaces any earlier `toml_file`, including one that failed.
    pub fn toml_string(mut self, toml: String) -> Self {
        self.toml = Some(toml);
        self.error = None;
        self
    }
}
