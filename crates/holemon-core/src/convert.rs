// ── API-to-domain conversions ──
//
// Maps the loosely-typed JSON returned by `holemon_api` into the model
// types. Lookups never fail: a missing or mistyped field falls back to the
// field's default, so a partial response still yields a complete record.

use chrono::{DateTime, Utc};
use serde_json::{Number, Value};

use crate::model::{BlockedClient, BlockingStatus, HistoryBuffer, SummaryRecord, TopBlockedClients};

// ── Helpers ────────────────────────────────────────────────────────

/// First non-null value among `pointers`.
fn lookup<'a>(doc: &'a Value, pointers: &[&str]) -> Option<&'a Value> {
    pointers
        .iter()
        .filter_map(|p| doc.pointer(p))
        .find(|v| !v.is_null())
}

/// Render a scalar the way it would print in a status line: integral
/// numbers without a fractional part, strings verbatim.
fn scalar_text(value: Option<&Value>, default: &str) -> String {
    match value {
        Some(Value::Number(n)) => number_text(n),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => default.to_owned(),
    }
}

fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract().abs() < f64::EPSILON && f.abs() < 1e15 => {
            format!("{f:.0}")
        }
        _ => n.to_string(),
    }
}

fn count(doc: &Value, pointers: &[&str]) -> String {
    scalar_text(lookup(doc, pointers), "0")
}

/// Integer value of a counter; fractions truncate, anything else is 0.
#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
fn as_count(value: &Value) -> i64 {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
        .unwrap_or(0)
}

fn as_unsigned_count(value: &Value) -> u64 {
    u64::try_from(as_count(value)).unwrap_or(0)
}

// ── Summary ────────────────────────────────────────────────────────

/// Round to one decimal, ties away from zero, and drop a zero tenth.
///
/// The tie is judged on the shortest decimal form of `value` (what the
/// server wrote), not its binary expansion: 12.35 gives "12.4".
pub fn round_percentage(value: f64) -> String {
    if !value.is_finite() {
        return "0".into();
    }
    if value.abs() >= 1e15 {
        return format!("{value:.0}");
    }

    let digits = value.abs().to_string();
    let (whole, fraction) = digits.split_once('.').unwrap_or((&digits, ""));
    let mut fraction = fraction.bytes();
    let tenth = fraction.next().map_or(0, |d| u64::from(d - b'0'));
    let round_up = fraction.next().is_some_and(|d| d >= b'5');

    let Ok(whole) = whole.parse::<u64>() else {
        return format!("{value:.1}");
    };
    let tenths = whole * 10 + tenth + u64::from(round_up);
    let sign = if value < 0.0 && tenths != 0 { "-" } else { "" };

    match tenths % 10 {
        0 => format!("{sign}{}", tenths / 10),
        d => format!("{sign}{}.{d}", tenths / 10),
    }
}

/// Integer sum of every value in a query-type mapping.
pub fn sum_query_types(types: Option<&Value>) -> i64 {
    types
        .and_then(Value::as_object)
        .map_or(0, |map| map.values().map(as_count).fold(0, i64::saturating_add))
}

fn percentage(value: Option<&Value>) -> String {
    let raw = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    round_percentage(raw.unwrap_or(0.0))
}

/// `dns: true` in the login probe means blocking is active.
pub fn blocking_status(probe: &Value) -> BlockingStatus {
    if probe.get("dns").and_then(Value::as_bool) == Some(true) {
        BlockingStatus::Blocking
    } else {
        BlockingStatus::Disabled
    }
}

/// Build a [`SummaryRecord`] from a `/api/stats/summary` document.
///
/// Query types and reply counters live under `queries` on current servers
/// and at the top level on older ones; both are accepted.
pub fn summary_from_json(
    doc: &Value,
    status: BlockingStatus,
    fetched_at: DateTime<Utc>,
) -> SummaryRecord {
    let types = lookup(doc, &["/queries/types", "/types"]);
    let reply = |kind: &str| {
        count(
            doc,
            &[
                format!("/queries/replies/{kind}").as_str(),
                format!("/replies/{kind}").as_str(),
            ],
        )
    };

    SummaryRecord {
        domains_being_blocked: count(doc, &["/gravity/domains_being_blocked"]),
        dns_queries_today: count(doc, &["/queries/total"]),
        ads_blocked_today: count(doc, &["/queries/blocked"]),
        ads_percentage_today: percentage(lookup(doc, &["/queries/percent_blocked"])),
        unique_domains: count(doc, &["/queries/unique_domains"]),
        queries_forwarded: count(doc, &["/queries/forwarded"]),
        queries_cached: count(doc, &["/queries/cached"]),
        clients_ever_seen: count(doc, &["/clients/total"]),
        unique_clients: count(doc, &["/clients/active"]),
        dns_queries_all_types: sum_query_types(types).to_string(),
        reply_nodata: reply("NODATA"),
        reply_nxdomain: reply("NXDOMAIN"),
        reply_cname: reply("CNAME"),
        reply_ip: reply("IP"),
        privacy_level: scalar_text(lookup(doc, &["/privacy_level"]), ""),
        status,
        fetched_at,
    }
}

// ── Top clients ────────────────────────────────────────────────────

/// Ranked blocked clients from a `/api/stats/top_clients` document.
///
/// Accepts the `top_sources_blocked` address-to-count object (in document
/// order) or a `clients` array of `{ip, name, count}` entries.
pub fn top_clients_from_json(doc: &Value) -> TopBlockedClients {
    if let Some(map) = doc.get("top_sources_blocked").and_then(Value::as_object) {
        return TopBlockedClients::from_ranked(map.iter().map(|(address, count)| BlockedClient {
            address: address.clone(),
            count: as_unsigned_count(count),
        }));
    }

    let entries = doc
        .get("clients")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    TopBlockedClients::from_ranked(entries.iter().map(|entry| BlockedClient {
        address: entry
            .get("ip")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned(),
        count: entry.get("count").map_or(0, as_unsigned_count),
    }))
}

// ── History ────────────────────────────────────────────────────────

/// `history[].blocked` from a `/api/history` document, capped to the
/// buffer capacity.
pub fn history_from_json(doc: &Value) -> HistoryBuffer {
    let entries = doc
        .get("history")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    HistoryBuffer::from_counts(
        entries
            .iter()
            .map(|entry| entry.get("blocked").map_or(0, as_unsigned_count)),
    )
}
