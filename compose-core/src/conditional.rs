//! Conditional delivery.
//!
//! A stateless predicate over a resource's last-modified timestamp and the
//! client's `If-Modified-Since` validator. HTTP dates carry whole seconds,
//! so the timestamp is truncated before it is compared.

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};

/// `Last-Modified` / `If-Modified-Since` format (IMF-fixdate).
pub const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

const RFC850_FORMAT: &str = "%A, %d-%b-%y %H:%M:%S GMT";
const ASCTIME_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// Outcome of a validator check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// The client copy is current: answer "not modified" with no body.
    Fresh,
    /// Deliver the full resource.
    Stale,
}

impl Freshness {
    pub fn is_fresh(&self) -> bool {
        matches!(self, Freshness::Fresh)
    }
}

/// Parse an HTTP date in any of the three formats RFC 9110 requires
/// recipients to accept.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    [HTTP_DATE_FORMAT, RFC850_FORMAT, ASCTIME_FORMAT]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Render a timestamp as a `Last-Modified` header value.
pub fn format_http_date(ts: DateTime<Utc>) -> String {
    ts.format(HTTP_DATE_FORMAT).to_string()
}

/// Truncate to the second resolution HTTP dates can express.
pub fn truncate_to_second(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(0)
}

/// Decide whether the resource must be delivered.
///
/// An absent or unparseable validator is always stale.
pub fn evaluate(last_modified: DateTime<Utc>, validator: Option<&str>) -> Freshness {
    let Some(since) = validator.and_then(parse_http_date) else {
        return Freshness::Stale;
    };

    if truncate_to_second(last_modified) > since {
        Freshness::Stale
    } else {
        Freshness::Fresh
    }
}
