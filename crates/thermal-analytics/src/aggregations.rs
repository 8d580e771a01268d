//! Dashboard aggregation over thermal sessions.
//!
//! Pure functions: every result depends only on the session list and the
//! `now` handed in. Recent sessions and temperature trends assume the list
//! is newest-first, which every `SessionSource` guarantees.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thermal_core::types::{SessionRecord, SessionType};

/// Number of weekly buckets on the dashboard chart.
pub const WEEKS_IN_WINDOW: usize = 12;
/// Most temperature points plotted.
pub const MAX_TREND_POINTS: usize = 20;
/// Sessions echoed back verbatim as "recent".
pub const RECENT_SESSION_COUNT: usize = 5;
/// Upper bound on the streak walk.
pub const MAX_STREAK_DAYS: u32 = 366;

/// Session counts for one Monday-to-Sunday week (UTC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyBucket {
    pub week_start: NaiveDate,
    pub week_label: String,
    pub sauna_count: u32,
    pub cold_count: u32,
    pub total_count: u32,
}

impl WeeklyBucket {
    pub fn new(week_start: NaiveDate) -> Self {
        Self {
            week_start,
            week_label: week_start.format("%b %-d").to_string(),
            sauna_count: 0,
            cold_count: 0,
            total_count: 0,
        }
    }

    fn record(&mut self, session_type: SessionType) {
        match session_type {
            SessionType::Sauna => self.sauna_count += 1,
            SessionType::ColdPlunge => self.cold_count += 1,
        }
        self.total_count += 1;
    }
}

/// One point on the temperature trend chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TempDataPoint {
    pub date: DateTime<Utc>,
    pub session_type: SessionType,
    pub temp_f: i32,
}

/// Everything the dashboard page renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_sessions: usize,
    pub sauna_count: usize,
    pub cold_count: usize,
    pub current_streak_days: u32,
    pub total_duration_ms: u64,
    pub avg_duration_ms: u64,
    pub weekly_buckets: Vec<WeeklyBucket>,
    pub temp_trends: Vec<TempDataPoint>,
    pub recent_sessions: Vec<SessionRecord>,
}

/// Monday of the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

pub fn celsius_to_fahrenheit(celsius: f64) -> i32 {
    (celsius * 9.0 / 5.0 + 32.0).round() as i32
}

/// Consecutive days, ending today or yesterday, on which a session was
/// completed.
///
/// Days are keyed by the UTC date of completion. Today without a session
/// yet does not break the streak, but it does not count either.
pub fn compute_streak(sessions: &[SessionRecord], now: DateTime<Utc>) -> u32 {
    if sessions.is_empty() {
        return 0;
    }

    let completed_days: HashSet<NaiveDate> = sessions
        .iter()
        .map(|s| s.completed_at().date_naive())
        .collect();

    let today = now.date_naive();
    let mut streak = 0;
    let mut day = today;
    for _ in 0..MAX_STREAK_DAYS {
        if completed_days.contains(&day) {
            streak += 1;
        } else if day != today {
            break;
        }
        day = match day.pred_opt() {
            Some(prev) => prev,
            None => break,
        };
    }

    streak
}

/// Twelve weekly buckets ending with the week of `now`, oldest first.
///
/// Sessions count toward the week they started in; those outside the
/// window are ignored.
pub fn compute_weekly_buckets(sessions: &[SessionRecord], now: DateTime<Utc>) -> Vec<WeeklyBucket> {
    let current_week = week_start(now.date_naive());
    let first_week = current_week - Duration::weeks(WEEKS_IN_WINDOW as i64 - 1);

    let mut buckets: Vec<WeeklyBucket> = (0..WEEKS_IN_WINDOW)
        .map(|i| WeeklyBucket::new(first_week + Duration::weeks(i as i64)))
        .collect();

    for session in sessions {
        let week = week_start(session.started_at.date_naive());
        if week < first_week || week > current_week {
            continue;
        }
        let index = ((week - first_week).num_days() / 7) as usize;
        if let Some(bucket) = buckets.get_mut(index) {
            bucket.record(session.session_type);
        }
    }

    buckets
}

/// Temperature points for the most recent qualifying sessions, oldest first.
///
/// A session qualifies when it carries the temperature that matters for
/// its type (peak for sauna, minimum for cold plunge).
pub fn compute_temp_trends(sessions: &[SessionRecord]) -> Vec<TempDataPoint> {
    let mut points: Vec<TempDataPoint> = sessions
        .iter()
        .filter_map(|s| {
            s.trend_temp_c().map(|c| TempDataPoint {
                date: s.started_at,
                session_type: s.session_type,
                temp_f: celsius_to_fahrenheit(c),
            })
        })
        .take(MAX_TREND_POINTS)
        .collect();
    points.reverse();
    points
}

/// Roll the session list up into the dashboard view-model.
pub fn build_dashboard_stats(sessions: &[SessionRecord], now: DateTime<Utc>) -> DashboardStats {
    let total_sessions = sessions.len();
    let sauna_count = sessions
        .iter()
        .filter(|s| s.session_type == SessionType::Sauna)
        .count();
    let cold_count = total_sessions - sauna_count;

    let total_duration_ms: u64 = sessions.iter().map(|s| s.duration_ms).sum();
    let avg_duration_ms = if total_sessions == 0 {
        0
    } else {
        (total_duration_ms as f64 / total_sessions as f64).round() as u64
    };

    let stats = DashboardStats {
        total_sessions,
        sauna_count,
        cold_count,
        current_streak_days: compute_streak(sessions, now),
        total_duration_ms,
        avg_duration_ms,
        weekly_buckets: compute_weekly_buckets(sessions, now),
        temp_trends: compute_temp_trends(sessions),
        recent_sessions: sessions.iter().take(RECENT_SESSION_COUNT).cloned().collect(),
    };

    tracing::debug!(
        total = stats.total_sessions,
        streak = stats.current_streak_days,
        "Built dashboard stats"
    );

    stats
}
