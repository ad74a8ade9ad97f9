use std::path::PathBuf;

use anyhow::anyhow;
use clap::{
    builder::{PossibleValuesParser, TypedValueParser},
    Parser,
};
use strum::VariantNames;

use crate::{
    catalog::{AllCatalogStores, JsonCatalogStore, RealtimeDbStore, StoreKind},
    utils::token::{DEFAULT_TTL_MINUTES, MAX_TTL_MINUTES},
};

/// Runtime settings. Every flag can also come from the environment (or a
/// `.env` file next to the binary).
#[derive(Debug, Clone, Parser)]
#[command(name = "traslink")]
#[command(about = "Scrapes blog posts into tokenised episode lists", long_about = None)]
pub struct Config {
    /// Host to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Catalog backend
    #[arg(
        long = "store",
        env = "STORE_KIND",
        default_value = "json",
        value_parser = PossibleValuesParser::new(StoreKind::VARIANTS).try_map(|s| s.parse::<StoreKind>())
    )]
    pub store_kind: StoreKind,

    /// Catalog export used by the json backend
    #[arg(long, env = "CATALOG_FILE", default_value = "catalog.json")]
    pub catalog_file: PathBuf,

    /// Realtime database root, e.g. https://project.firebaseio.com
    #[arg(long, env = "DB_URL")]
    pub db_url: Option<String>,

    /// Realtime database secret or id token
    #[arg(long, env = "DB_AUTH", hide_env_values = true)]
    pub db_auth: Option<String>,

    /// Secret used to sign session tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Session token lifetime, 1 minute to 1 year
    #[arg(
        long,
        env = "SESSION_TTL_MINUTES",
        default_value_t = 60,
        value_parser = clap::value_parser!(i64).range(1..=MAX_TTL_MINUTES)
    )]
    pub session_ttl_minutes: i64,

    /// Video token lifetime, 1 minute to 1 year
    #[arg(
        long,
        env = "VIDEO_TOKEN_TTL_MINUTES",
        default_value_t = DEFAULT_TTL_MINUTES,
        value_parser = clap::value_parser!(i64).range(1..=MAX_TTL_MINUTES)
    )]
    pub video_token_ttl_minutes: i64,

    /// Comma separated CORS allow-list, any origin when empty
    #[arg(long, env = "ALLOWED_ORIGINS", value_delimiter = ',')]
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn build_store(&self) -> anyhow::Result<AllCatalogStores> {
        let store = match self.store_kind {
            StoreKind::Json => JsonCatalogStore::from_file(&self.catalog_file)?.into(),
            StoreKind::RealtimeDb => {
                let db_url = self
                    .db_url
                    .as_deref()
                    .ok_or_else(|| anyhow!("DB_URL is required for the {} store", self.store_kind))?;
                RealtimeDbStore::new(db_url, self.db_auth.clone())?.into()
            }
        };

        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_flags() {
        let config = Config::try_parse_from([
            "traslink",
            "--port",
            "8080",
            "--store",
            "realtime-db",
            "--db-url",
            "https://proj.firebaseio.com",
            "--jwt-secret",
            "s3cret",
            "--allowed-origins",
            "https://a.example,https://b.example",
        ])
        .unwrap();

        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.store_kind, StoreKind::RealtimeDb);
        assert_eq!(config.allowed_origins.len(), 2);
        assert_eq!(config.video_token_ttl_minutes, 10);
        assert!(config.build_store().is_ok());
    }

    #[test]
    fn should_require_db_url_for_realtime_db() {
        let config = Config::try_parse_from([
            "traslink",
            "--store",
            "realtime-db",
            "--jwt-secret",
            "s3cret",
        ])
        .unwrap();

        assert!(config.build_store().is_err());
    }

    #[test]
    fn should_reject_unknown_store() {
        let err = Config::try_parse_from(["traslink", "--store", "redis", "--jwt-secret", "x"])
            .unwrap_err();

        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
        let message = err.to_string();
        for kind in StoreKind::VARIANTS {
            assert!(message.contains(kind), "{message}");
        }
    }

    #[test]
    fn should_reject_out_of_range_ttls() {
        let max = MAX_TTL_MINUTES.to_string();
        let too_long = (MAX_TTL_MINUTES + 1).to_string();

        for flag in ["--video-token-ttl-minutes", "--session-ttl-minutes"] {
            for value in ["-5", "0", too_long.as_str(), "9223372036854775807"] {
                let res = Config::try_parse_from([
                    "traslink".to_owned(),
                    "--jwt-secret".to_owned(),
                    "x".to_owned(),
                    format!("{flag}={value}"),
                ]);
                assert!(res.is_err(), "{flag}={value}");
            }

            let config = Config::try_parse_from([
                "traslink".to_owned(),
                "--jwt-secret".to_owned(),
                "x".to_owned(),
                format!("{flag}={max}"),
            ])
            .unwrap();
            let parsed = match flag {
                "--video-token-ttl-minutes" => config.video_token_ttl_minutes,
                _ => config.session_ttl_minutes,
            };
            assert_eq!(parsed, MAX_TTL_MINUTES);
        }
    }
}
