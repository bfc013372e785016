//! Retention planning for `jungle prune`.
//!
//! Both policies are planned here without touching the filesystem; the engine
//! executes the plan one deletion at a time.

use chrono::{DateTime, Utc};

use crate::core::version::Version;

/// A release together with its age, as observed when pruning started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgedRelease {
    pub version: Version,
    pub age_days: i64,
}

/// Ordered deletions for a prune, plus whether the current version stopped it early.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionPlan {
    pub delete: Vec<Version>,
    pub blocked_by_current: bool,
}

/// Whole days elapsed between `modified` and `now`, rounded down.
///
/// Timestamps in the future yield zero or a negative age.
pub fn age_in_days(now: DateTime<Utc>, modified: DateTime<Utc>) -> i64 {
    now.signed_duration_since(modified).num_days()
}

/// Plan deletion of every non-current release older than `max_age_days`.
///
/// A release is expired only when its age strictly exceeds the threshold.
pub fn plan_by_age(releases: &[AgedRelease], current: &Version, max_age_days: u64) -> RetentionPlan {
    let threshold = i64::try_from(max_age_days).unwrap_or(i64::MAX);
    let delete = releases
        .iter()
        .filter(|release| &release.version != current)
        .filter(|release| release.age_days > threshold)
        .map(|release| release.version.clone())
        .collect();
    RetentionPlan {
        delete,
        blocked_by_current: false,
    }
}

/// Plan deletion of the oldest releases until at most `keep` remain.
///
/// `versions` must be sorted ascending. Planning stops as soon as the oldest
/// remaining release is `current`; it is never skipped over.
pub fn plan_by_count(versions: &[Version], current: &Version, keep: usize) -> RetentionPlan {
    let mut plan = RetentionPlan::default();
    let mut remaining = versions.len();
    for version in versions {
        if remaining <= keep {
            break;
        }
        if version == current {
            plan.blocked_by_current = true;
            break;
        }
        plan.delete.push(version.clone());
        remaining -= 1;
    }
    plan
}
