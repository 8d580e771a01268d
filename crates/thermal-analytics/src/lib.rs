//! Aggregation and reporting for thermal-dashboard sessions.
//!
//! Computes the dashboard view-model from session records: completion
//! streaks, weekly activity buckets, temperature trends, and duration
//! totals, plus text and markdown renderings of the result.

pub mod aggregations;
pub mod reports;

pub use aggregations::{
    build_dashboard_stats, compute_streak, compute_temp_trends, compute_weekly_buckets,
    DashboardStats, TempDataPoint, WeeklyBucket,
};
pub use reports::ReportGenerator;
