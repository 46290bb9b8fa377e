//! Upstream query-string encoding.
//!
//! The endpoint takes a single `query` parameter holding a URL-encoded JSON object.

use invbot_core::config::QueryConfig;
use serde::Serialize;

#[derive(Serialize)]
struct UpstreamQuery<'a> {
    query: QueryBody<'a>,
    offset: u32,
    count: u32,
    #[serde(rename = "outsideOffset")]
    outside_offset: u32,
    #[serde(rename = "outsideSearch")]
    outside_search: bool,
    #[serde(rename = "isFalconDeliverySelectionEnabled")]
    falcon_delivery_selection: bool,
    version: &'static str,
}

#[derive(Serialize)]
struct QueryBody<'a> {
    model: &'a str,
    condition: &'a str,
    options: serde_json::Map<String, serde_json::Value>,
    arrangeby: &'a str,
    order: &'a str,
    market: &'a str,
    language: &'a str,
    super_region: &'a str,
    lng: f64,
    lat: f64,
    zip: &'a str,
    range: u32,
    region: &'a str,
}

/// JSON form of the search, before URL encoding.
pub(crate) fn query_json(q: &QueryConfig) -> String {
    let body = UpstreamQuery {
        query: QueryBody {
            model: &q.model,
            condition: &q.condition,
            options: serde_json::Map::new(),
            arrangeby: &q.arrange_by,
            order: &q.order,
            market: &q.market,
            language: &q.language,
            super_region: &q.super_region,
            lng: q.lng,
            lat: q.lat,
            zip: &q.zip,
            range: q.range,
            region: &q.region,
        },
        offset: q.offset,
        count: q.count,
        outside_offset: 0,
        outside_search: false,
        falcon_delivery_selection: true,
        version: "v2",
    };
    // Only plain strings and numbers; serialization cannot fail.
    serde_json::to_string(&body).unwrap_or_default()
}

/// Full request URL: `base_url?query=<encoded JSON>`.
pub(crate) fn build_url(base_url: &str, q: &QueryConfig) -> String {
    let sep = if base_url.contains('?') { '&' } else { '?' };
    format!(
        "{base_url}{sep}query={}",
        urlencoding::encode(&query_json(q))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_json_shape() {
        let json: serde_json::Value =
            serde_json::from_str(&query_json(&QueryConfig::default())).unwrap();
        assert_eq!(json["query"]["model"], "my");
        assert_eq!(json["query"]["condition"], "new");
        assert_eq!(json["query"]["arrangeby"], "Price");
        assert_eq!(json["query"]["market"], "TR");
        assert!(json["query"]["options"].as_object().unwrap().is_empty());
        assert_eq!(json["count"], 24);
        assert_eq!(json["outsideSearch"], false);
        assert_eq!(json["isFalconDeliverySelectionEnabled"], true);
        assert_eq!(json["version"], "v2");
    }

    #[test]
    fn test_build_url_encodes_query() {
        let url = build_url("https://example.test/api", &QueryConfig::default());
        assert!(url.starts_with("https://example.test/api?query=%7B%22query%22%3A%7B"));
        assert!(!url.contains('{'));
        assert!(!url.contains('"'));
    }

    #[test]
    fn test_build_url_appends_to_existing_params() {
        let url = build_url("https://example.test/api?x=1", &QueryConfig::default());
        assert!(url.starts_with("https://example.test/api?x=1&query="));
    }
}
