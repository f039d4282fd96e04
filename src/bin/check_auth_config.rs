// SPDX-FileCopyrightText: 2024 Softbear, Inc.
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Loads provider credentials the way a server would at startup and prints
//! the resulting shape, or the first configuration error.

use passport_keys::{AuthConfig, AuthSettings, Error, LoadLog};
use std::process::ExitCode;
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(name = "check-auth-config")]
struct Options {
    /// TOML file with `facebookAuth`, `twitterAuth` and `googleAuth` tables.
    #[structopt(short, long)]
    config: Option<String>,

    /// Ignore provider environment variables.
    #[structopt(long)]
    no_env: bool,

    /// Base for callback URLs that are not configured, e.g. http://localhost:8080
    #[structopt(long)]
    base_url: Option<String>,

    /// Echo the load log while loading.
    #[structopt(short, long)]
    debug: bool,

    /// Print the load log after loading.
    #[structopt(short, long)]
    verbose: bool,

    /// Print secrets instead of their fingerprints.
    #[structopt(long)]
    show_secrets: bool,
}

fn load(options: &Options, log: &LoadLog) -> Result<AuthSettings, Error> {
    let mut builder = AuthConfig::builder().debug(options.debug);
    if let Some(file_name) = &options.config {
        builder = builder.toml_file(file_name);
    }
    if !options.no_env {
        builder = builder.env();
    }
    if let Some(base_url) = &options.base_url {
        builder = builder.base_url(base_url);
    }
    AuthSettings::load(&builder.build()?, log)
}

fn main() -> ExitCode {
    let options = Options::from_args();
    let log = LoadLog::new(options.debug);
    let result = load(&options, &log);
    if options.verbose && !options.debug {
        eprintln!("{log}");
    }
    match result {
        Ok(auth_settings) => {
            let shape = if options.show_secrets {
                serde_json::to_value(&auth_settings)
            } else {
                Ok(auth_settings.redacted())
            };
            match shape.and_then(|value| serde_json::to_string_pretty(&value)) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("cannot print settings: {e}");
                    return ExitCode::FAILURE;
                }
            }
            if log.contains_warnings() && !options.verbose && !options.debug {
                eprintln!("loaded with warnings (run with --verbose to see them)");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
