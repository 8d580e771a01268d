//! Normalization of raw synced rows into [`SessionRecord`]s.
//!
//! The companion app and the hosted database disagree on casing and are
//! not strict about types, so every field is defaulted here rather than
//! rejected. Only a row with no usable start time is refused, since it
//! cannot be placed on the calendar.

use crate::error::{Result, ThermalError};
use crate::types::{RawSessionRecord, SessionRecord, SessionType};
use chrono::{DateTime, NaiveDateTime, Utc};

/// Parse a timestamp as written by the app or by Postgres.
///
/// Accepts RFC 3339, Postgres `timestamptz` text (`2026-03-02 18:00:00+00`)
/// and zone-less timestamps, which are read as UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(naive.and_utc());
        }
    }
    None
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn id_text(id: &serde_json::Value) -> Option<String> {
    match id {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Turn one raw row into a fully-populated record.
pub fn normalize_record(raw: RawSessionRecord) -> Result<SessionRecord> {
    let raw_id = raw.id.as_ref().and_then(id_text);

    let started_at = raw
        .started_at
        .as_deref()
        .and_then(parse_timestamp)
        .ok_or_else(|| ThermalError::InvalidRecord {
            id: raw_id.clone().unwrap_or_else(|| "<unknown>".into()),
            reason: format!("unusable started_at: {:?}", raw.started_at),
        })?;

    let session_type = raw
        .session_type
        .as_deref()
        .and_then(SessionType::from_label)
        .unwrap_or(SessionType::Sauna);

    let ended_at = raw
        .ended_at
        .as_deref()
        .and_then(parse_timestamp)
        .filter(|end| *end >= started_at);

    let duration_ms = match finite(raw.duration_ms) {
        Some(ms) if ms >= 0.0 => ms.trunc() as u64,
        Some(_) => 0,
        None => ended_at
            .map(|end| (end - started_at).num_milliseconds().max(0) as u64)
            .unwrap_or(0),
    };

    let id = raw_id.unwrap_or_else(|| {
        format!("{}-{}", session_type.as_str(), started_at.timestamp_millis())
    });

    Ok(SessionRecord {
        id,
        user_id: raw.user_id,
        session_type,
        started_at,
        ended_at,
        duration_ms,
        peak_temp_c: finite(raw.peak_temp_c),
        min_temp_c: finite(raw.min_temp_c),
        avg_humidity_pct: finite(raw.avg_humidity_pct),
        hrv_trend: raw.hrv_trend.filter(|v| !v.is_null()),
        total_kcal: finite(raw.total_kcal),
        rlt_active: raw.rlt_active,
        contrast_id: raw.contrast_id,
        safety_warning_count: finite(raw.safety_warning_count)
            .filter(|n| *n >= 0.0)
            .map(|n| n.trunc().min(u32::MAX as f64) as u32),
        ai_insight: raw.ai_insight,
    })
}

/// Split a JSON payload (one row or an array of rows) into raw rows.
///
/// Each row is read on its own, so an entry that is not an object costs
/// only that entry.
pub fn raw_rows_from_json(payload: serde_json::Value) -> Vec<RawSessionRecord> {
    let values = match payload {
        serde_json::Value::Array(values) => values,
        serde_json::Value::Null => Vec::new(),
        other => vec![other],
    };

    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| {
            if !value.is_object() {
                tracing::warn!("Dropping session row {}: not a JSON object", index);
                return None;
            }
            match serde_json::from_value::<RawSessionRecord>(value) {
                Ok(raw) => Some(raw),
                Err(e) => {
                    tracing::warn!("Dropping session row {}: {}", index, e);
                    None
                }
            }
        })
        .collect()
}

/// Normalize a batch, dropping rows that cannot be placed in time.
pub fn normalize_records(raws: Vec<RawSessionRecord>) -> Vec<SessionRecord> {
    let total = raws.len();
    let records: Vec<SessionRecord> = raws
        .into_iter()
        .filter_map(|raw| match normalize_record(raw) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Dropping session row: {}", e);
                None
            }
        })
        .collect();
    if records.len() < total {
        tracing::debug!("Normalized {} of {} session rows", records.len(), total);
    }
    records
}

/// Sort newest-first by start time, breaking ties by id so the order is
/// stable across reads.
pub fn sort_newest_first(records: &mut [SessionRecord]) {
    records.sort_by(|a, b| {
        b.started_at
            .cmp(&a.started_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}
