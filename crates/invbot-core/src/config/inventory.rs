use serde::{Deserialize, Serialize};

use super::defaults::*;

/// Upstream inventory endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Human-facing listing page linked at the bottom of notifications.
    #[serde(default = "default_listing_url")]
    pub listing_url: String,
    #[serde(default = "default_referer")]
    pub referer: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
    /// Deadline for scheduled fetches, in seconds.
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,
    /// Deadline for interactive `/check` fetches, in seconds.
    #[serde(default = "default_check_timeout")]
    pub check_timeout_secs: u64,
    /// Forward proxy URL. Empty = direct. `PROXY_URL` overrides the file value.
    #[serde(default)]
    pub proxy_url: String,
    /// Probed through the proxy before each fetch. Empty = no probe.
    #[serde(default = "default_proxy_probe_url")]
    pub proxy_probe_url: String,
    #[serde(default = "default_proxy_probe_timeout")]
    pub proxy_probe_timeout_secs: u64,
    #[serde(default)]
    pub query: QueryConfig,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            listing_url: default_listing_url(),
            referer: default_referer(),
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            timeout_secs: default_fetch_timeout(),
            check_timeout_secs: default_check_timeout(),
            proxy_url: String::new(),
            proxy_probe_url: default_proxy_probe_url(),
            proxy_probe_timeout_secs: default_proxy_probe_timeout(),
            query: QueryConfig::default(),
        }
    }
}

impl InventoryConfig {
    /// Configured proxy, if any.
    pub fn proxy(&self) -> Option<&str> {
        let p = self.proxy_url.trim();
        (!p.is_empty()).then_some(p)
    }
}

/// Search parameters encoded into the upstream `query` string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    #[serde(default = "default_query_model")]
    pub model: String,
    #[serde(default = "default_condition")]
    pub condition: String,
    #[serde(default = "default_market")]
    pub market: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_super_region")]
    pub super_region: String,
    #[serde(default = "default_market")]
    pub region: String,
    #[serde(default = "default_zip")]
    pub zip: String,
    #[serde(default = "default_lat")]
    pub lat: f64,
    #[serde(default = "default_lng")]
    pub lng: f64,
    #[serde(default)]
    pub range: u32,
    #[serde(default = "default_arrange_by")]
    pub arrange_by: String,
    #[serde(default = "default_order")]
    pub order: String,
    #[serde(default)]
    pub offset: u32,
    #[serde(default = "default_count")]
    pub count: u32,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            model: default_query_model(),
            condition: default_condition(),
            market: default_market(),
            language: default_language(),
            super_region: default_super_region(),
            region: default_market(),
            zip: default_zip(),
            lat: default_lat(),
            lng: default_lng(),
            range: 0,
            arrange_by: default_arrange_by(),
            order: default_order(),
            offset: 0,
            count: default_count(),
        }
    }
}
