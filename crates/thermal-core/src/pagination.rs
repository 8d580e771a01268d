//! Boundary checks for session-history paging.

use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: u32 = 50;
pub const MAX_LIMIT: u32 = 100;

/// Page size: positive finite values are truncated and capped at
/// [`MAX_LIMIT`], anything else becomes [`DEFAULT_LIMIT`].
pub fn sanitize_limit(value: Option<f64>) -> u32 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => {
            let truncated = v.trunc();
            if truncated < 1.0 {
                DEFAULT_LIMIT
            } else {
                truncated.min(MAX_LIMIT as f64) as u32
            }
        }
        _ => DEFAULT_LIMIT,
    }
}

/// Row offset: non-negative finite values are truncated, anything else
/// becomes 0. No upper bound.
pub fn sanitize_offset(value: Option<f64>) -> u64 {
    match value {
        Some(v) if v.is_finite() && v >= 0.0 => v.trunc() as u64,
        _ => 0,
    }
}

/// A sanitized `(limit, offset)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: u32,
    pub offset: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl Pagination {
    pub fn new(limit: Option<f64>, offset: Option<f64>) -> Self {
        Self {
            limit: sanitize_limit(limit),
            offset: sanitize_offset(offset),
        }
    }

    /// Build from raw query-string text. Text that does not parse as a
    /// number is treated as absent.
    pub fn from_query(limit: Option<&str>, offset: Option<&str>) -> Self {
        let parse = |s: &str| s.trim().parse::<f64>().ok();
        Self::new(limit.and_then(parse), offset.and_then(parse))
    }
}
