//! Text and markdown renderings of [`DashboardStats`].

use crate::aggregations::DashboardStats;
use thermal_core::types::SessionType;

/// Format milliseconds as a human-readable duration string.
pub fn format_duration(ms: u64) -> String {
    let seconds = ms / 1000;
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;

    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m", minutes)
    } else {
        format!("{}s", seconds)
    }
}

fn type_label(session_type: SessionType) -> &'static str {
    match session_type {
        SessionType::Sauna => "Sauna",
        SessionType::ColdPlunge => "Cold plunge",
    }
}

/// Report generator for dashboard summaries.
pub struct ReportGenerator;

impl ReportGenerator {
    /// Compact summary suitable for a terminal.
    pub fn text_summary(stats: &DashboardStats) -> String {
        let mut output = String::new();

        if stats.total_sessions == 0 {
            output.push_str("  No sessions yet\n");
            return output;
        }

        output.push_str(&format!(
            "  Sessions: {} ({} sauna, {} cold plunge)\n",
            stats.total_sessions, stats.sauna_count, stats.cold_count
        ));
        output.push_str(&format!(
            "  Streak: {} day{}\n",
            stats.current_streak_days,
            if stats.current_streak_days == 1 { "" } else { "s" }
        ));
        output.push_str(&format!(
            "  Total time: {}  Avg session: {}\n",
            format_duration(stats.total_duration_ms),
            format_duration(stats.avg_duration_ms)
        ));

        if let Some(this_week) = stats.weekly_buckets.last() {
            output.push_str(&format!(
                "  This week: {} sessions ({} sauna, {} cold)\n",
                this_week.total_count, this_week.sauna_count, this_week.cold_count
            ));
        }

        if let Some(latest) = stats.temp_trends.last() {
            output.push_str(&format!(
                "  Latest temp: {}°F ({})\n",
                latest.temp_f,
                type_label(latest.session_type)
            ));
        }

        if let Some(last) = stats.recent_sessions.first() {
            output.push_str(&format!(
                "  Last session: {} on {}\n",
                type_label(last.session_type),
                last.started_at.format("%b %-d, %Y")
            ));
        }

        output
    }

    /// Full markdown report.
    pub fn markdown_report(stats: &DashboardStats) -> String {
        let mut report = String::new();

        report.push_str("# Thermal Session Report\n\n");

        // Overview.
        report.push_str("## Overview\n\n");
        report.push_str(&format!("- **Sessions:** {}\n", stats.total_sessions));
        report.push_str(&format!("- **Sauna:** {}\n", stats.sauna_count));
        report.push_str(&format!("- **Cold Plunge:** {}\n", stats.cold_count));
        report.push_str(&format!(
            "- **Current Streak:** {} days\n",
            stats.current_streak_days
        ));
        report.push_str(&format!(
            "- **Total Time:** {}\n",
            format_duration(stats.total_duration_ms)
        ));
        report.push_str(&format!(
            "- **Avg Session:** {}\n\n",
            format_duration(stats.avg_duration_ms)
        ));

        // Weekly activity table.
        report.push_str("## Weekly Activity\n\n");
        report.push_str("| Week | Sauna | Cold Plunge | Total |\n");
        report.push_str("|------|-------|-------------|-------|\n");
        for bucket in &stats.weekly_buckets {
            report.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                bucket.week_label, bucket.sauna_count, bucket.cold_count, bucket.total_count
            ));
        }
        report.push('\n');

        if !stats.temp_trends.is_empty() {
            report.push_str("## Temperature Trend\n\n");
            report.push_str("| Date | Type | Temp (°F) |\n");
            report.push_str("|------|------|-----------|\n");
            for point in &stats.temp_trends {
                report.push_str(&format!(
                    "| {} | {} | {} |\n",
                    point.date.format("%Y-%m-%d"),
                    type_label(point.session_type),
                    point.temp_f
                ));
            }
            report.push('\n');
        }

        if !stats.recent_sessions.is_empty() {
            report.push_str("## Recent Sessions\n\n");
            for session in &stats.recent_sessions {
                report.push_str(&format!(
                    "- {} {} ({})",
                    session.started_at.format("%Y-%m-%d %H:%M"),
                    type_label(session.session_type),
                    format_duration(session.duration_ms)
                ));
                if let Some(insight) = &session.ai_insight {
                    report.push_str(&format!(" - {}", insight));
                }
                report.push('\n');
            }
            report.push('\n');
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregations::build_dashboard_stats;
    use chrono::{DateTime, TimeZone, Utc};
    use thermal_core::types::SessionRecord;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 4, 12, 0, 0).unwrap()
    }

    fn sample_sessions() -> Vec<SessionRecord> {
        let mut plunge = SessionRecord::new(
            "p1",
            SessionType::ColdPlunge,
            Utc.with_ymd_and_hms(2026, 3, 4, 7, 0, 0).unwrap(),
        );
        plunge.duration_ms = 180_000;
        plunge.min_temp_c = Some(4.0);

        let mut sauna = SessionRecord::new(
            "s1",
            SessionType::Sauna,
            Utc.with_ymd_and_hms(2026, 3, 3, 18, 0, 0).unwrap(),
        );
        sauna.duration_ms = 1_200_000;
        sauna.peak_temp_c = Some(85.0);
        sauna.ai_insight = Some("Hydrate well".into());

        vec![plunge, sauna]
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(45_000), "45s");
        assert_eq!(format_duration(60_000), "1m");
        assert_eq!(format_duration(3_600_000), "1h 0m");
        assert_eq!(format_duration(3_661_000), "1h 1m");
        assert_eq!(format_duration(5_400_000), "1h 30m");
    }

    #[test]
    fn test_text_summary() {
        let stats = build_dashboard_stats(&sample_sessions(), now());
        let summary = ReportGenerator::text_summary(&stats);
        assert!(summary.contains("Sessions: 2 (1 sauna, 1 cold plunge)"));
        assert!(summary.contains("Streak: 2 days"));
        assert!(summary.contains("This week: 2 sessions"));
        assert!(summary.contains("Latest temp: 39°F (Cold plunge)"));
        assert!(summary.contains("Last session: Cold plunge on Mar 4, 2026"));
    }

    #[test]
    fn test_empty_text_summary() {
        let stats = build_dashboard_stats(&[], now());
        let summary = ReportGenerator::text_summary(&stats);
        assert!(summary.contains("No sessions yet"));
    }

    #[test]
    fn test_markdown_report_structure() {
        let stats = build_dashboard_stats(&sample_sessions(), now());
        let report = ReportGenerator::markdown_report(&stats);
        assert!(report.contains("# Thermal Session Report"));
        assert!(report.contains("## Overview"));
        assert!(report.contains("## Weekly Activity"));
        assert!(report.contains("| Mar 2 | 1 | 1 | 2 |"));
        assert!(report.contains("## Temperature Trend"));
        assert!(report.contains("| 2026-03-03 | Sauna | 185 |"));
        assert!(report.contains("Hydrate well"));
    }

    #[test]
    fn test_empty_markdown_report() {
        let stats = build_dashboard_stats(&[], now());
        let report = ReportGenerator::markdown_report(&stats);
        assert!(report.contains("## Weekly Activity"));
        assert!(report.contains("| 0 | 0 | 0 |"));
        assert!(!report.contains("## Temperature Trend"));
        assert!(!report.contains("## Recent Sessions"));
    }
}
