//! Telegram HTML rendering of inventory records.
//!
//! Every tag opens and closes on the same line, so the channel's
//! newline-based message splitting never cuts markup in half.

use crate::{
    diff::Changes,
    filter::{highlight_from_config, Highlight},
    labels,
};
use chrono::{DateTime, Utc};
use invbot_core::{
    config::Config,
    error::{FetchError, FormatError},
    model::{InventoryRecord, ResultSet},
};
use std::fmt::Write;

/// Placeholder for any field upstream did not provide.
pub const MISSING: &str = "N/A";

/// Reply sent to `/check` when the upstream call fails.
pub const CHECK_FAILED: &str = "❌ <b>Inventory check failed</b>\n\n\
    The inventory could not be fetched right now.\n\
    Please try again in a few minutes.";

/// Renders records, batches and whole notifications.
pub struct Formatter {
    highlight: Box<dyn Highlight>,
    currency: String,
    listing_url: String,
    preview_count: usize,
}

impl Formatter {
    pub fn new(
        highlight: Box<dyn Highlight>,
        currency: impl Into<String>,
        listing_url: impl Into<String>,
        preview_count: usize,
    ) -> Self {
        Self {
            highlight,
            currency: currency.into(),
            listing_url: listing_url.into(),
            preview_count,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            highlight_from_config(&config.notify),
            config.notify.currency.clone(),
            config.inventory.listing_url.clone(),
            config.notify.check_preview_count,
        )
    }

    /// One vehicle as a short multi-line block.
    pub fn format_record(&self, record: &InventoryRecord) -> Result<String, FormatError> {
        let price = match record.display_price() {
            Some(p) => format_price(p, &self.currency)?,
            None => MISSING.to_string(),
        };
        let highlighted = self.highlight.is_highlighted(record);

        let mut out = String::new();
        let _ = write!(
            out,
            "<b>{}</b>",
            escape_html(record.trim_name.as_deref().unwrap_or(MISSING))
        );
        if highlighted {
            out.push_str(" 🚀");
        }
        out.push('\n');
        let _ = writeln!(out, "💰 Price: {price}");
        let _ = writeln!(out, "🎨 Paint: {}", facet(record.paint_code(), labels::paint));
        let _ = writeln!(
            out,
            "🛋️ Interior: {}",
            facet(record.interior_code(), labels::interior)
        );
        let _ = writeln!(out, "🛞 Wheels: {}", facet(record.wheels_code(), labels::wheels));
        let _ = writeln!(out, "⚡ 0-100: {}", spec(record, "SPECS_ACCELERATION"));
        let _ = writeln!(out, "🔋 Range: {}", spec(record, "SPECS_RANGE"));
        if let Some(vin) = record.vin.as_deref() {
            let _ = writeln!(out, "🔑 VIN: <code>{}</code>", escape_html(vin));
        }
        Ok(out)
    }

    /// Numbered list of records. A record that fails to render becomes a
    /// one-line placeholder and the rest of the batch still renders.
    pub fn format_batch(&self, records: &[InventoryRecord]) -> String {
        let mut out = String::new();
        for (i, record) in records.iter().enumerate() {
            match self.format_record(record) {
                Ok(text) => {
                    let _ = writeln!(out, "{}. {text}", i + 1);
                }
                Err(e) => {
                    tracing::warn!(
                        "format: record {} ({}) not rendered: {e}",
                        i + 1,
                        record.vin.as_deref().unwrap_or(MISSING)
                    );
                    let _ = writeln!(
                        out,
                        "{}. ⚠️ Could not render vehicle {}\n",
                        i + 1,
                        escape_html(record.vin.as_deref().unwrap_or(MISSING))
                    );
                }
            }
        }
        out
    }

    /// Broadcast text for one cycle's changes.
    pub fn format_changes(&self, changes: &Changes, at: DateTime<Utc>) -> String {
        let mut out = String::new();
        if !changes.new.is_empty() {
            let _ = writeln!(
                out,
                "🚗 <b>{} new vehicle{} in inventory</b>",
                changes.new.len(),
                plural(changes.new.len())
            );
            let _ = writeln!(out, "{}\n", timestamp(at));
            out.push_str(&self.format_batch(&changes.new));
        }

        if !changes.price_changes.is_empty() {
            let _ = writeln!(out, "💸 <b>Price changes</b>");
            for change in &changes.price_changes {
                let arrow = if change.delta() < 0.0 { "📉" } else { "📈" };
                let _ = writeln!(
                    out,
                    "{arrow} {} ({}): {} → {}",
                    escape_html(change.record.trim_name.as_deref().unwrap_or(MISSING)),
                    escape_html(change.record.vin.as_deref().unwrap_or(MISSING)),
                    self.price_or_missing(change.old_price),
                    self.price_or_missing(change.new_price),
                );
            }
            out.push('\n');
        }

        out.push_str(&self.footer());
        out
    }

    /// Reply to `/check`: a summary plus the first few vehicles.
    pub fn format_check(&self, results: &ResultSet, at: DateTime<Utc>) -> String {
        if results.records.is_empty() {
            return format!(
                "📢 <b>Inventory status</b>\n\n\
                 ❌ There are no vehicles in inventory right now.\n\
                 Use /check again later.\n\n{}",
                self.footer()
            );
        }

        let shown = &results.records[..results.records.len().min(self.preview_count)];
        let total = results
            .total_matches_found
            .clone()
            .unwrap_or_else(|| results.records.len().to_string());

        let mut out = String::new();
        let _ = writeln!(out, "🚗 <b>Inventory status</b>\n");
        let _ = writeln!(out, "Last update: {}", timestamp(at));
        let _ = writeln!(out, "Total vehicles: {}", escape_html(&total));
        let _ = writeln!(out, "Vehicles returned: {}\n", results.records.len());
        if !shown.is_empty() {
            let _ = writeln!(out, "📋 <b>First {} vehicles</b>\n", shown.len());
            out.push_str(&self.format_batch(shown));
        }
        out.push_str(&self.footer());
        out
    }

    /// First-run acknowledgement for admins.
    pub fn format_initialized(&self, vehicles: usize, at: DateTime<Utc>) -> String {
        format!(
            "✅ <b>Inventory tracking initialized</b>\n\
             {vehicles} vehicle{} recorded at {}.\n\
             Subscribers will be notified about vehicles that appear from now on.",
            plural(vehicles),
            timestamp(at)
        )
    }

    fn footer(&self) -> String {
        format!("More: {}", escape_html(&self.listing_url))
    }

    fn price_or_missing(&self, value: f64) -> String {
        format_price(value, &self.currency).unwrap_or_else(|_| MISSING.to_string())
    }
}

/// Admin alert for a failed scheduled cycle.
pub fn format_fetch_failure(err: &FetchError) -> String {
    let headline = if err.is_timeout() {
        "⏱️ <b>Inventory check timed out</b>"
    } else {
        "⚠️ <b>Inventory check failed</b>"
    };
    format!("{headline}\n<code>{}</code>", escape_html(&err.to_string()))
}

/// Whole-unit price with `.` thousands grouping and a currency suffix.
pub fn format_price(value: f64, currency: &str) -> Result<String, FormatError> {
    if !value.is_finite() {
        return Err(FormatError::InvalidPrice(value));
    }
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    let sign = if rounded < 0.0 { "-" } else { "" };
    if currency.is_empty() {
        Ok(format!("{sign}{grouped}"))
    } else {
        Ok(format!("{sign}{grouped} {}", escape_html(currency)))
    }
}

/// Escape text for Telegram's HTML parse mode.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn facet(code: Option<&str>, label: fn(&str) -> &str) -> String {
    match code.filter(|c| !c.is_empty()) {
        Some(c) => escape_html(label(c)),
        None => MISSING.to_string(),
    }
}

fn spec(record: &InventoryRecord, group: &str) -> String {
    match record.option(group).filter(|o| !o.value.is_empty()) {
        Some(o) if o.unit_short.is_empty() => escape_html(&o.value),
        Some(o) => format!("{} {}", escape_html(&o.value), escape_html(&o.unit_short)),
        None => MISSING.to_string(),
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
