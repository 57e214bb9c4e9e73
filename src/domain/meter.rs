//! Persisted visit counter format.
//!
//! One key per site, `pw_meter_<site>`, holding the count as decimal text.

/// Prefix of every persisted meter key.
pub const METER_KEY_PREFIX: &str = "pw_meter_";

/// Storage key for a site's visit counter.
pub fn meter_key(site_id: &str) -> String {
    format!("{}{}", METER_KEY_PREFIX, site_id)
}

/// Parse a persisted counter.
///
/// Returns `None` for anything that is not a non-negative integer in range,
/// so callers can fall back to zero.
pub fn parse_count(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok()
}

/// Serialize a counter for persistence.
pub fn format_count(count: u32) -> String {
    count.to_string()
}
