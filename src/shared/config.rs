//! Application configuration. Bot credentials, API tuning, paths.

use serde::Deserialize;

pub use crate::usecases::collector::DEFAULT_PAGE_LIMIT;
use std::time::Duration;

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_API_DOMAIN: &str = "roblox.com";
pub const DEFAULT_MEMBERS_PER_PAGE: usize = 5;
pub const DEFAULT_PAGER_TTL_SECS: u64 = 300;
pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_REPORTS_DIR: &str = "./reports";

/// Page sizes the Roblox cursor endpoints accept.
const ALLOWED_PAGE_LIMITS: &[u32] = &[10, 25, 50, 100];

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Bot API token. Read from ISB_TELEGRAM_TOKEN, or TOKEN.
    #[serde(default)]
    pub telegram_token: Option<String>,

    /// Chat user allowed to run `/calibrate_uplink`. Read from ISB_OPERATOR_ID.
    #[serde(default)]
    pub operator_id: Option<i64>,

    /// Publish commands globally (default) or only to `home_chat_id`.
    #[serde(default)]
    pub global_command_sync: Option<bool>,

    #[serde(default)]
    pub home_chat_id: Option<i64>,

    #[serde(default)]
    pub http_timeout_secs: Option<u64>,

    /// API root; subdomains (groups, users, friends, badges) are prepended.
    #[serde(default)]
    pub api_domain: Option<String>,

    /// Serve every Roblox service under one URL (`{base}/{service}/v1/...`),
    /// e.g. a caching proxy. Overrides `api_domain`.
    #[serde(default)]
    pub api_base_url: Option<String>,

    #[serde(default)]
    pub page_limit: Option<u32>,

    /// Common members shown per group-check page.
    #[serde(default)]
    pub members_per_page: Option<usize>,

    #[serde(default)]
    pub pager_ttl_secs: Option<u64>,

    #[serde(default)]
    pub poll_timeout_secs: Option<u64>,

    /// Where the console saves badge CSVs.
    #[serde(default)]
    pub reports_dir: Option<String>,

    /// Skip the console and run the bot directly.
    #[serde(default)]
    pub headless: Option<bool>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("ISB").try_parsing(true));
        if let Ok(path) = std::env::var("ISB_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        let mut cfg: Self = c.build()?.try_deserialize()?;
        // TOKEN is read directly (no ISB_ prefix) so older .env files keep working
        if cfg.telegram_token.is_none() {
            cfg.telegram_token = std::env::var("TOKEN").ok().filter(|t| !t.trim().is_empty());
        }
        Ok(cfg)
    }

    pub fn telegram_token(&self) -> Option<&str> {
        self.telegram_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    pub fn global_command_sync_or_default(&self) -> bool {
        self.global_command_sync.unwrap_or(true)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS).max(1))
    }

    pub fn api_domain_or_default(&self) -> String {
        self.api_domain
            .clone()
            .unwrap_or_else(|| DEFAULT_API_DOMAIN.to_string())
    }

    pub fn api_base_url(&self) -> Option<&str> {
        self.api_base_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }

    /// Returns the page size. Falls back to 100 for values the API rejects.
    pub fn page_limit_or_default(&self) -> u32 {
        match self.page_limit {
            Some(n) if ALLOWED_PAGE_LIMITS.contains(&n) => n,
            _ => DEFAULT_PAGE_LIMIT,
        }
    }

    pub fn members_per_page_or_default(&self) -> usize {
        self.members_per_page
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_MEMBERS_PER_PAGE)
    }

    pub fn pager_ttl(&self) -> Duration {
        Duration::from_secs(self.pager_ttl_secs.unwrap_or(DEFAULT_PAGER_TTL_SECS))
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs.unwrap_or(DEFAULT_POLL_TIMEOUT_SECS))
    }

    pub fn reports_dir_or_default(&self) -> String {
        self.reports_dir
            .clone()
            .unwrap_or_else(|| DEFAULT_REPORTS_DIR.to_string())
    }

    pub fn is_headless(&self) -> bool {
        self.headless.unwrap_or(false)
    }

    /// Returns None when chat-scoped sync is requested without a home chat.
    pub fn command_scope(&self) -> Option<crate::domain::CommandScope> {
        use crate::domain::CommandScope;
        if self.global_command_sync_or_default() {
            Some(CommandScope::Global)
        } else {
            self.home_chat_id.map(CommandScope::Chat)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CommandScope;

    #[test]
    fn defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.http_timeout(), Duration::from_secs(10));
        assert_eq!(cfg.api_domain_or_default(), "roblox.com");
        assert_eq!(cfg.page_limit_or_default(), 100);
        assert_eq!(cfg.page_limit_or_default(), crate::usecases::DEFAULT_PAGE_LIMIT);
        assert!(cfg.api_base_url().is_none());
        assert_eq!(cfg.members_per_page_or_default(), 5);
        assert_eq!(cfg.pager_ttl(), Duration::from_secs(300));
        assert_eq!(cfg.poll_timeout(), Duration::from_secs(30));
        assert_eq!(cfg.reports_dir_or_default(), "./reports");
        assert!(!cfg.is_headless());
        assert_eq!(cfg.command_scope(), Some(CommandScope::Global));
        assert!(cfg.telegram_token().is_none());
    }

    #[test]
    fn invalid_values_fall_back() {
        let cfg = AppConfig {
            page_limit: Some(37),
            members_per_page: Some(0),
            telegram_token: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(cfg.page_limit_or_default(), 100);
        assert_eq!(cfg.members_per_page_or_default(), 5);
        assert!(cfg.telegram_token().is_none());
    }

    #[test]
    fn base_url_is_trimmed_and_blank_means_unset() {
        let mut cfg = AppConfig {
            api_base_url: Some("  http://127.0.0.1:9000 ".into()),
            ..Default::default()
        };
        assert_eq!(cfg.api_base_url(), Some("http://127.0.0.1:9000"));
        cfg.api_base_url = Some("  ".into());
        assert!(cfg.api_base_url().is_none());
    }

    #[test]
    fn chat_scope_needs_home_chat() {
        let mut cfg = AppConfig {
            global_command_sync: Some(false),
            ..Default::default()
        };
        assert_eq!(cfg.command_scope(), None);
        cfg.home_chat_id = Some(-100);
        assert_eq!(cfg.command_scope(), Some(CommandScope::Chat(-100)));
    }
}
