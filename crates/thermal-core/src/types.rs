use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of thermal session recorded by the companion app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Sauna,
    ColdPlunge,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Sauna => "sauna",
            SessionType::ColdPlunge => "cold_plunge",
        }
    }

    /// Parse a source label. Returns `None` for anything unrecognized.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "sauna" => Some(SessionType::Sauna),
            "cold_plunge" | "cold-plunge" | "coldplunge" | "cold" | "plunge" => {
                Some(SessionType::ColdPlunge)
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for SessionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A completed thermal session, fully populated by normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub session_type: SessionType,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_ms: u64,
    /// Highest ambient temperature (sauna only).
    pub peak_temp_c: Option<f64>,
    /// Lowest water temperature (cold plunge only).
    pub min_temp_c: Option<f64>,

    // Carried through to "recent sessions" untouched.
    pub avg_humidity_pct: Option<f64>,
    pub hrv_trend: Option<serde_json::Value>,
    pub total_kcal: Option<f64>,
    pub rlt_active: Option<bool>,
    pub contrast_id: Option<String>,
    pub safety_warning_count: Option<u32>,
    pub ai_insight: Option<String>,
}

impl SessionRecord {
    pub fn new(
        id: impl Into<String>,
        session_type: SessionType,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: None,
            session_type,
            started_at,
            ended_at: None,
            duration_ms: 0,
            peak_temp_c: None,
            min_temp_c: None,
            avg_humidity_pct: None,
            hrv_trend: None,
            total_kcal: None,
            rlt_active: None,
            contrast_id: None,
            safety_warning_count: None,
            ai_insight: None,
        }
    }

    /// When the session finished, falling back to its start when the
    /// end was never synced.
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.ended_at.unwrap_or(self.started_at)
    }

    /// The temperature that matters for this session's type: peak for
    /// sauna, minimum for cold plunge.
    pub fn trend_temp_c(&self) -> Option<f64> {
        match self.session_type {
            SessionType::Sauna => self.peak_temp_c,
            SessionType::ColdPlunge => self.min_temp_c,
        }
    }
}

/// A session row exactly as the session store hands it over. Every field
/// is optional and a value of the wrong JSON type reads as absent, so one
/// sloppy column never costs the rest of the row. `normalize` turns it into
/// a [`SessionRecord`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSessionRecord {
    pub id: Option<serde_json::Value>,
    #[serde(alias = "userId", deserialize_with = "lenient::text")]
    pub user_id: Option<String>,
    #[serde(alias = "sessionType", deserialize_with = "lenient::text")]
    pub session_type: Option<String>,
    #[serde(alias = "startedAt", deserialize_with = "lenient::text")]
    pub started_at: Option<String>,
    #[serde(alias = "endedAt", deserialize_with = "lenient::text")]
    pub ended_at: Option<String>,
    #[serde(alias = "durationMs", deserialize_with = "lenient::number")]
    pub duration_ms: Option<f64>,
    #[serde(alias = "peakTempC", deserialize_with = "lenient::number")]
    pub peak_temp_c: Option<f64>,
    #[serde(alias = "minTempC", deserialize_with = "lenient::number")]
    pub min_temp_c: Option<f64>,
    #[serde(alias = "avgHumidityPct", deserialize_with = "lenient::number")]
    pub avg_humidity_pct: Option<f64>,
    #[serde(alias = "hrvTrend")]
    pub hrv_trend: Option<serde_json::Value>,
    #[serde(alias = "totalKcal", deserialize_with = "lenient::number")]
    pub total_kcal: Option<f64>,
    #[serde(alias = "rltActive", deserialize_with = "lenient::flag")]
    pub rlt_active: Option<bool>,
    #[serde(alias = "contrastId", deserialize_with = "lenient::text")]
    pub contrast_id: Option<String>,
    #[serde(alias = "safetyWarningCount", deserialize_with = "lenient::number")]
    pub safety_warning_count: Option<f64>,
    #[serde(alias = "aiInsight", deserialize_with = "lenient::text")]
    pub ai_insight: Option<String>,
}

/// Field readers for [`RawSessionRecord`]. Each one takes any JSON value
/// and keeps it only when it can be read as the wanted type.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Strings as-is; numbers as their decimal text.
    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    /// Numbers, plus numeric strings such as `"300000"`.
    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        })
    }

    /// Booleans, plus `"true"`/`"false"` text.
    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Bool(b) => Some(b),
            Value::String(s) => s.trim().parse::<bool>().ok(),
            _ => None,
        })
    }
}
