use anyhow::{Context, Result};
use dotenv::dotenv;
use std::env;

use crate::{
    calendar::{DEFAULT_TIME_ZONE, EmbedOptions, ViewMode},
    session::Session,
};

#[derive(Debug)]
pub struct Config {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub access_token: String,
    pub user_id: String,
    pub user_email: Option<String>,
}

fn get_optional_var(
    lookup: impl Fn(&str) -> Result<String, env::VarError>,
    name: &str,
) -> Result<Option<String>> {
    match lookup(name) {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(e).with_context(|| format!("'{}' contained invalid unicode", name)),
    }
}

fn get_optional_bool(
    lookup: impl Fn(&str) -> Result<String, env::VarError>,
    name: &str,
) -> Result<Option<bool>> {
    match get_optional_var(lookup, name)? {
        Some(val_str) => {
            let value = val_str.parse::<bool>().with_context(|| {
                format!(
                    "'{}' is invalid: could not parse '{}' as a boolean",
                    name, val_str
                )
            })?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

fn required(name: &str) -> Result<String> {
    env::var(name).with_context(|| format!("{} environment variable not set", name))
}

impl Config {
    // Load backend configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            supabase_url: required("SUPABASE_URL")?,
            supabase_anon_key: required("SUPABASE_ANON_KEY")?,
            access_token: required("SUPABASE_ACCESS_TOKEN")?,
            user_id: required("SUPABASE_USER_ID")?,
            user_email: env::var("SUPABASE_USER_EMAIL").ok(),
        })
    }

    pub fn session(&self) -> Session {
        Session {
            user_id: self.user_id.clone(),
            email: self.user_email.clone(),
            access_token: self.access_token.clone(),
        }
    }
}

/// Embed defaults, overridable through `EMBED_MODE`, `EMBED_SHOW_NAV` and `EMBED_TIMEZONE`.
pub fn embed_options_from_env() -> Result<EmbedOptions> {
    dotenv().ok();
    embed_options_from(|name| env::var(name))
}

fn embed_options_from(
    lookup: impl Fn(&str) -> Result<String, env::VarError>,
) -> Result<EmbedOptions> {
    let mode = match get_optional_var(&lookup, "EMBED_MODE")? {
        Some(mode) => mode
            .parse::<ViewMode>()
            .context("'EMBED_MODE' is invalid")?,
        None => ViewMode::default(),
    };

    Ok(EmbedOptions {
        mode,
        show_nav: get_optional_bool(&lookup, "EMBED_SHOW_NAV")?.unwrap_or(true),
        time_zone: get_optional_var(&lookup, "EMBED_TIMEZONE")?
            .unwrap_or_else(|| DEFAULT_TIME_ZONE.to_string()),
    })
}
