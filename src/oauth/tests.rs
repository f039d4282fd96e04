// SPDX-FileCopyrightText: 2024 Softbear, Inc.
// SPDX-License-Identifier: LGPL-3.0-or-later

#[cfg(test)]
mod oauth_tests {
    use crate::common::{AuthConfig, Error};
    use crate::log::LoadLog;
    use crate::oauth::{
        auth_settings, install_auth_settings, AuthSettings, CallbackUrl, ClientSecret,
        OAuthProvider,
    };
    use serde_json::Value;
    use std::collections::BTreeSet;

    fn sample(provider: OAuthProvider, field: &str) -> &'static str {
        use OAuthProvider::*;
        match (provider, field) {
            (Facebook, "clientID") => "1234567890",
            (Facebook, "clientSecret") => "fb-secret-0123456789abcdef",
            (Facebook, _) => "http://localhost:8080/auth/facebook/callback",
            (Twitter, "consumerKey") => "tw-consumer-key",
            (Twitter, "consumerSecret") => "tw-consumer-secret-0123456789",
            (Twitter, _) => "http://localhost:8080/auth/twitter/callback",
            (Google, "clientID") => "837639568766-example.apps.googleusercontent.com",
            (Google, "clientSecret") => "google-secret-0123456789",
            (Google, _) => "http://localhost:8080/auth/google/callback",
        }
    }

    /// Sample config file, optionally leaving out one field.
    fn sample_toml(skip: Option<(OAuthProvider, &str)>) -> String {
        let mut toml = String::new();
        for provider in OAuthProvider::ALL {
            toml.push_str(&format!("[{}]\n", provider.config_key()));
            for field in provider.field_names() {
                if skip == Some((provider, field)) {
                    continue;
                }
                toml.push_str(&format!("{field} = \"{}\"\n", sample(provider, field)));
            }
        }
        toml
    }

    fn load_toml(toml: &str) -> (Result<AuthSettings, Error>, LoadLog) {
        let auth_config = AuthConfig::builder()
            .toml_str(toml)
            .build()
            .expect("inline config");
        let log = LoadLog::default();
        (AuthSettings::load(&auth_config, &log), log)
    }

    fn sample_settings() -> AuthSettings {
        load_toml(&sample_toml(None)).0.expect("sample settings")
    }

    #[test]
    fn provider_names() {
        let keys: Vec<_> = OAuthProvider::ALL.iter().map(|p| p.config_key()).collect();
        assert_eq!(keys, vec!["facebookAuth", "twitterAuth", "googleAuth"]);
        assert_eq!(
            OAuthProvider::Twitter.field_names(),
            ["consumerKey", "consumerSecret", "callbackURL"]
        );
        assert_eq!(
            OAuthProvider::Facebook.field_names(),
            ["clientID", "clientSecret", "callbackURL"]
        );
        assert_eq!(
            OAuthProvider::Google.env_var("clientSecret"),
            Some("GOOGLE_CLIENT_SECRET")
        );
        assert_eq!(OAuthProvider::Twitter.env_var("clientID"), None);

        assert_eq!("google".parse::<OAuthProvider>(), Ok(OAuthProvider::Google));
        assert_eq!("Twitter".parse::<OAuthProvider>(), Ok(OAuthProvider::Twitter));
        assert_eq!(
            "facebookAuth".parse::<OAuthProvider>(),
            Ok(OAuthProvider::Facebook)
        );
        assert!("github".parse::<OAuthProvider>().is_err());
        assert!(OAuthProvider::try_from("githubAuth".to_string()).is_err());
        assert_eq!(OAuthProvider::from_config_key("google"), None);
        assert_eq!(OAuthProvider::Google.to_string(), "Google");

        assert_eq!(
            serde_json::to_string(&OAuthProvider::Google).unwrap(),
            "\"Google\""
        );
        let parsed: OAuthProvider = serde_json::from_str("\"twitterAuth\"").unwrap();
        assert_eq!(parsed, OAuthProvider::Twitter);
        assert!(serde_json::from_str::<OAuthProvider>("\"github\"").is_err());
    }

    #[test]
    fn records_have_expected_fields() {
        let settings = sample_settings();
        let value = serde_json::to_value(&settings).expect("serialize settings");
        let Value::Object(outer) = value else {
            panic!("settings not an object");
        };
        let outer_keys: BTreeSet<_> = outer.keys().map(String::as_str).collect();
        assert_eq!(
            outer_keys,
            BTreeSet::from(["facebookAuth", "googleAuth", "twitterAuth"])
        );
        for provider in OAuthProvider::ALL {
            let Some(Value::Object(record)) = outer.get(provider.config_key()) else {
                panic!("{provider}: record not an object");
            };
            let record_keys: BTreeSet<_> = record.keys().map(String::as_str).collect();
            assert_eq!(record_keys, BTreeSet::from(provider.field_names()));
            for field in provider.field_names() {
                match record.get(field) {
                    Some(Value::String(s)) => assert_eq!(s, sample(provider, field)),
                    other => panic!("{provider}.{field}: {other:?}"),
                }
            }
        }
    }

    #[test]
    fn callback_urls_are_absolute() {
        let settings = sample_settings();
        for credentials in settings.iter() {
            let url = credentials.callback_url().url();
            assert!(!url.cannot_be_a_base());
            assert!(url.host().is_some());
            assert_eq!(url.scheme(), "http");
            assert!(credentials.callback_url().is_loopback());
        }
    }

    #[test]
    fn lookups() {
        let settings = sample_settings();
        assert_eq!(
            settings.field("googleAuth", "clientID"),
            Some("837639568766-example.apps.googleusercontent.com")
        );
        assert_eq!(
            settings.field("twitterAuth", "consumerSecret"),
            Some("tw-consumer-secret-0123456789")
        );
        assert_eq!(settings.field("twitterAuth", "clientID"), None);
        assert_eq!(settings.field("googleAuth", "redirectURL"), None);
        assert!(settings.get("githubAuth").is_none());
        assert_eq!(settings.field("githubAuth", "clientID"), None);

        let google = settings.get("googleAuth").expect("google record");
        assert_eq!(google.provider(), OAuthProvider::Google);
        assert_eq!(google, settings.provider(OAuthProvider::Google));
        assert_eq!(
            google.callback_url().to_string(),
            "http://localhost:8080/auth/google/callback"
        );

        let providers: Vec<_> = settings.iter().map(|c| c.provider()).collect();
        assert_eq!(providers, OAuthProvider::ALL.to_vec());
    }

    #[test]
    fn missing_fields_fail_fast() {
        for provider in OAuthProvider::ALL {
            for field in provider.field_names() {
                let (result, _) = load_toml(&sample_toml(Some((provider, field))));
                match result {
                    Err(Error::MissingField {
                        provider: p,
                        field: f,
                    }) => {
                        assert_eq!((p, f), (provider, field));
                    }
                    Err(e) => panic!("{provider}.{field}: unexpected error {e}"),
                    Ok(_) => panic!("{provider}.{field}: loaded without it"),
                }
            }
        }

        let (result, _) = load_toml("");
        assert_eq!(
            result,
            Err(Error::MissingField {
                provider: OAuthProvider::Facebook,
                field: "clientID",
            })
        );

        let blank = sample_toml(None).replace("\"tw-consumer-key\"", "\"   \"");
        let (result, _) = load_toml(&blank);
        assert_eq!(
            result,
            Err(Error::MissingField {
                provider: OAuthProvider::Twitter,
                field: "consumerKey",
            })
        );
    }

    #[test]
    fn malformed_values_are_rejected() {
        let relative = sample_toml(None).replace(
            "http://localhost:8080/auth/google/callback",
            "/auth/google/callback",
        );
        match load_toml(&relative).0 {
            Err(Error::InvalidUrl {
                provider, field, ..
            }) => assert_eq!((provider, field), (OAuthProvider::Google, "callbackURL")),
            other => panic!("expected invalid URL, got {other:?}"),
        }

        let ftp = sample_toml(None).replace(
            "http://localhost:8080/auth/twitter/callback",
            "ftp://localhost/auth/twitter/callback",
        );
        assert!(matches!(
            load_toml(&ftp).0,
            Err(Error::InvalidUrl {
                provider: OAuthProvider::Twitter,
                ..
            })
        ));

        let number = sample_toml(None).replace("\"1234567890\"", "1234567890");
        match load_toml(&number).0 {
            Err(Error::String(s)) => assert!(s.starts_with("toml:"), "{s}"),
            other => panic!("expected toml error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_secret_stays_out_of_errors() {
        let wrong_type = sample_toml(None).replace(
            "\"fb-secret-0123456789abcdef\"",
            "987654321987654321",
        );
        let (result, log) = load_toml(&wrong_type);
        let message = match result {
            Err(Error::String(message)) => message,
            other => panic!("expected toml error, got {other:?}"),
        };
        assert!(message.starts_with("toml: line 3,"), "{message}");
        assert!(!message.contains("987654321987654321"), "{message}");
        assert!(!log.to_string().contains("987654321987654321"), "{log}");
        assert!(log.contains_warnings());

        let unterminated = sample_toml(None).replace(
            "\"fb-secret-0123456789abcdef\"",
            "\"SUPERSECRETVALUE0123456789",
        );
        let (result, log) = load_toml(&unterminated);
        let message = match result {
            Err(Error::String(message)) => message,
            other => panic!("expected toml error, got {other:?}"),
        };
        assert!(message.starts_with("toml:"), "{message}");
        assert!(!message.contains("SUPERSECRETVALUE"), "{message}");
        assert!(!log.to_string().contains("SUPERSECRETVALUE"), "{log}");
    }

    #[test]
    fn environment_overrides_file() {
        let auth_config = AuthConfig::builder()
            .toml_string(sample_toml(None))
            .env_vars(vec![
                ("GOOGLE_CLIENT_ID", "from-env.apps.googleusercontent.com"),
                ("TWITTER_CALLBACK_URL", "https://example.com/auth/twitter/callback"),
            ])
            .build()
            .expect("config");
        let log = LoadLog::default();
        let settings = AuthSettings::load(&auth_config, &log).expect("settings");
        assert_eq!(
            settings.field("googleAuth", "clientID"),
            Some("from-env.apps.googleusercontent.com")
        );
        assert_eq!(
            settings.field("twitterAuth", "callbackURL"),
            Some("https://example.com/auth/twitter/callback")
        );
        assert_eq!(
            settings.field("googleAuth", "clientSecret"),
            Some("google-secret-0123456789")
        );
        let lines = log.lines();
        assert!(lines.contains(&"googleAuth.clientID: from GOOGLE_CLIENT_ID".to_string()));
        assert!(lines.contains(&"googleAuth.clientSecret: from config file".to_string()));
        assert!(!log.contains_warnings(), "{log}");
    }

    #[test]
    fn environment_only_with_base_url() {
        let mut vars = Vec::new();
        for provider in OAuthProvider::ALL {
            for field in [provider.identifier_field(), provider.secret_field()] {
                let var = provider.env_var(field).expect("env var");
                vars.push((var, sample(provider, field)));
            }
        }
        vars.push(("AUTH_BASE_URL", "https://auth.example.com/"));
        let auth_config = AuthConfig::builder()
            .env_vars(vars.clone())
            .build()
            .expect("config");
        let log = LoadLog::default();
        let settings = AuthSettings::load(&auth_config, &log).expect("settings");
        assert_eq!(
            settings.field("facebookAuth", "callbackURL"),
            Some("https://auth.example.com/auth/facebook/callback")
        );
        assert_eq!(
            settings.field("twitterAuth", "consumerKey"),
            Some("tw-consumer-key")
        );
        assert!(log
            .lines()
            .contains(&"googleAuth.callbackURL: defaulted from base URL".to_string()));

        // Without a base URL the callback is simply missing.
        vars.pop();
        let auth_config = AuthConfig::builder().env_vars(vars).build().expect("config");
        assert_eq!(
            AuthSettings::new(&auth_config),
            Err(Error::MissingField {
                provider: OAuthProvider::Facebook,
                field: "callbackURL",
            })
        );
    }

    #[test]
    fn secrets_stay_out_of_debug_output() {
        let settings = sample_settings();
        let debug = format!("{settings:?}");
        let redacted = settings.redacted().to_string();
        for credentials in settings.iter() {
            let secret = credentials.secret();
            assert!(!debug.contains(secret.as_str()), "{debug}");
            assert!(!redacted.contains(secret.as_str()), "{redacted}");
            assert!(redacted.contains(&format!("sha256:{}", secret.fingerprint())));
        }
        assert_eq!(
            settings.redacted()["googleAuth"]["clientID"],
            "837639568766-example.apps.googleusercontent.com"
        );
        assert_eq!(
            ClientSecret::new(" abc ").expect("secret").fingerprint(),
            "ba7816bf"
        );
        assert!(ClientSecret::new("  ").is_none());
    }

    #[test]
    fn suspicious_values_warn() {
        let toml = sample_toml(None)
            .replace("\"1234567890\"", "\"your-secret-clientID-here\"")
            .replace("\"tw-consumer-secret-0123456789\"", "\"short\"")
            .replace(
                "http://localhost:8080/auth/google/callback",
                "http://example.com/auth/google/callback",
            )
            .replace("[googleAuth]\n", "[googleAuth]\nredirectURL = \"x\"\n");
        let (result, log) = load_toml(&toml);
        assert!(result.is_ok(), "{result:?}");
        assert!(log.contains_warnings());
        let text = log.to_string();
        assert!(text.contains("warning: facebookAuth.clientID: looks like a placeholder"), "{text}");
        assert!(text.contains("warning: twitterAuth.consumerSecret: unusually short"), "{text}");
        assert!(text.contains("warning: googleAuth.callbackURL: http://example.com/auth/google/callback uses http"), "{text}");
        assert!(text.contains("warning: googleAuth.redirectURL: unknown field ignored"), "{text}");
        assert!(!text.contains("short\""), "{text}");
    }

    #[test]
    fn callback_url_keeps_configured_text() {
        let url: CallbackUrl = " https://example.com ".parse().expect("url");
        assert_eq!(url.as_str(), "https://example.com");
        assert_eq!(url.url().as_str(), "https://example.com/");
        assert!(!url.is_insecure());
        assert!(!url.is_loopback());
        assert!("mailto:someone@example.com".parse::<CallbackUrl>().is_err());
        assert!("http://127.0.0.1:8080/cb"
            .parse::<CallbackUrl>()
            .expect("loopback")
            .is_loopback());
    }

    #[test]
    fn installed_settings_are_shared() {
        let first = install_auth_settings(sample_settings()).expect("first install");
        let a = auth_settings().expect("installed");
        let b = auth_settings().expect("installed");
        assert!(std::ptr::eq(first, a));
        assert!(std::ptr::eq(a, b));
        assert_eq!(
            a.field("googleAuth", "clientID"),
            b.field("googleAuth", "clientID")
        );
        assert_eq!(
            install_auth_settings(sample_settings()),
            Err(Error::AlreadyInstalled)
        );
    }
}
