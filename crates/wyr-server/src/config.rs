use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, bail};
use chrono::NaiveTime;

const PLACEHOLDER_TOKENS: &[&str] = &["change-me", "dev-secret-change-me", "your_token_here"];

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub api_token: String,
    /// UTC time of day for the daily question.
    pub daily_time: NaiveTime,
    pub seed_questions: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let api_token = lookup("WYR_API_TOKEN").context("WYR_API_TOKEN must be set")?;
        let api_token = api_token.trim().to_string();
        if api_token.is_empty() || PLACEHOLDER_TOKENS.contains(&api_token.as_str()) {
            bail!("WYR_API_TOKEN is empty or still a placeholder value");
        }

        let port = var("WYR_PORT", "3000");
        let port: u16 = port
            .parse()
            .with_context(|| format!("invalid WYR_PORT: {}", port))?;

        let daily_time = var("WYR_DAILY_TIME", "12:00");
        let daily_time = NaiveTime::parse_from_str(&daily_time, "%H:%M")
            .with_context(|| format!("invalid WYR_DAILY_TIME (expected HH:MM): {}", daily_time))?;

        let seed_questions = match var("WYR_SEED_QUESTIONS", "true").to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => true,
            "0" | "false" | "no" => false,
            other => bail!("invalid WYR_SEED_QUESTIONS: {}", other),
        };

        Ok(Self {
            db_path: PathBuf::from(var("WYR_DB_PATH", "wyr_bot.db")),
            host: var("WYR_HOST", "0.0.0.0"),
            port,
            api_token,
            daily_time,
            seed_questions,
        })
    }

    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .with_context(|| format!("invalid listen address: {}", addr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[("WYR_API_TOKEN", "s3cret")]).unwrap();
        assert_eq!(config.db_path, PathBuf::from("wyr_bot.db"));
        assert_eq!(config.port, 3000);
        assert_eq!(config.daily_time, NaiveTime::from_hms_opt(12, 0, 0).unwrap());
        assert!(config.seed_questions);
        assert_eq!(config.listen_addr().unwrap().to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn test_token_required() {
        assert!(config(&[]).is_err());
        assert!(config(&[("WYR_API_TOKEN", "change-me")]).is_err());
        assert!(config(&[("WYR_API_TOKEN", "  ")]).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("WYR_API_TOKEN", "s3cret"),
            ("WYR_PORT", "8080"),
            ("WYR_DAILY_TIME", "09:30"),
            ("WYR_SEED_QUESTIONS", "false"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.daily_time, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert!(!config.seed_questions);
    }

    #[test]
    fn test_invalid_values() {
        assert!(config(&[("WYR_API_TOKEN", "s3cret"), ("WYR_PORT", "http")]).is_err());
        assert!(config(&[("WYR_API_TOKEN", "s3cret"), ("WYR_DAILY_TIME", "25:00")]).is_err());
        assert!(config(&[("WYR_API_TOKEN", "s3cret"), ("WYR_SEED_QUESTIONS", "maybe")]).is_err());
    }
}
