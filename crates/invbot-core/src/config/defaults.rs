//! Default value functions used by serde for config deserialization.

pub fn default_name() -> String {
    "invbot".to_string()
}

pub fn default_data_dir() -> String {
    "~/.invbot".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_true() -> bool {
    true
}

pub fn default_base_url() -> String {
    "https://www.tesla.com/tr_TR/inventory/api/v4/inventory-results".to_string()
}

pub fn default_listing_url() -> String {
    "https://www.tesla.com/tr_tr/inventory/new/my".to_string()
}

pub fn default_referer() -> String {
    "https://www.tesla.com/tr_TR/inventory/new/my".to_string()
}

pub fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36"
        .to_string()
}

pub fn default_accept_language() -> String {
    "tr-TR,tr;q=0.9,en-US;q=0.8,en;q=0.7".to_string()
}

pub fn default_fetch_timeout() -> u64 {
    30
}

pub fn default_check_timeout() -> u64 {
    10
}

pub fn default_proxy_probe_url() -> String {
    "https://www.tesla.com".to_string()
}

pub fn default_proxy_probe_timeout() -> u64 {
    5
}

pub fn default_query_model() -> String {
    "my".to_string()
}

pub fn default_condition() -> String {
    "new".to_string()
}

pub fn default_market() -> String {
    "TR".to_string()
}

pub fn default_language() -> String {
    "tr".to_string()
}

pub fn default_super_region() -> String {
    "europe".to_string()
}

pub fn default_zip() -> String {
    "34384".to_string()
}

pub fn default_lat() -> f64 {
    41.0082
}

pub fn default_lng() -> f64 {
    28.9784
}

pub fn default_arrange_by() -> String {
    "Price".to_string()
}

pub fn default_order() -> String {
    "asc".to_string()
}

pub fn default_count() -> u32 {
    24
}

pub fn default_tick_secs() -> u64 {
    60
}

pub fn default_min_spacing_secs() -> u64 {
    240
}

pub fn default_send_delay_ms() -> u64 {
    35
}

pub fn default_highlight_group() -> String {
    "SPECS_RANGE".to_string()
}

pub fn default_highlight_min() -> f64 {
    568.0
}

pub fn default_check_preview_count() -> usize {
    10
}

pub fn default_currency() -> String {
    "TL".to_string()
}

pub fn default_snapshot_file() -> String {
    "inventory.json".to_string()
}

pub fn default_subscribers_file() -> String {
    "members.json".to_string()
}
