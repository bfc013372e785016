//! Retention policies for `jungle prune`.
//!
//! Plans come from [`crate::core::retention`]; every deletion goes through
//! [`Jungle::delete`], so `current` is re-validated before each removal and
//! can never be the one removed.

use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::core::retention::{AgedRelease, age_in_days, plan_by_age, plan_by_count};
use crate::core::version::Version;
use crate::error::{JungleError, Result};
use crate::io::releases;
use crate::jungle::{Jungle, announce};

/// Which versions a prune may remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retention {
    /// Remove non-current versions older than this many whole days.
    MaxAgeDays(u64),
    /// Remove the oldest versions until at most this many remain.
    KeepLatest(usize),
}

impl Jungle {
    /// Apply a retention policy, returning the deleted versions in deletion order.
    pub fn prune(&self, retention: Retention) -> Result<Vec<Version>> {
        match retention {
            Retention::MaxAgeDays(days) => self.prune_by_age_at(days, Utc::now()),
            Retention::KeepLatest(keep) => self.prune_by_count(keep),
        }
    }

    /// Delete every non-current version whose age exceeds `max_age_days` as of `now`.
    #[instrument(skip_all, fields(max_age_days = max_age_days))]
    pub fn prune_by_age_at(&self, max_age_days: u64, now: DateTime<Utc>) -> Result<Vec<Version>> {
        let current = self.check_current()?;
        let mut aged = Vec::new();
        for version in self.versions()? {
            let modified = releases::modified(&self.release_path(&version))?;
            let age_days = age_in_days(now, modified);
            if version == current {
                announce!(self, version = %version, age_days, "skipping current version");
            } else if age_days <= i64::try_from(max_age_days).unwrap_or(i64::MAX) {
                announce!(self, version = %version, age_days, "keeping version");
            }
            aged.push(AgedRelease { version, age_days });
        }

        let plan = plan_by_age(&aged, &current, max_age_days);
        for version in &plan.delete {
            self.delete(version)?;
        }
        Ok(plan.delete)
    }

    /// Delete the oldest versions until at most `keep` remain.
    ///
    /// Stops with [`JungleError::CannotDeleteCurrent`] once the oldest
    /// remaining version is the active one; versions already removed stay
    /// removed.
    #[instrument(skip_all, fields(keep = keep))]
    pub fn prune_by_count(&self, keep: usize) -> Result<Vec<Version>> {
        let min_keep = self.config().prune.min_keep;
        if keep < min_keep {
            return Err(JungleError::BelowRetentionFloor {
                requested: keep,
                min_keep,
            });
        }

        let current = self.check_current()?;
        let versions = self.versions()?;
        let plan = plan_by_count(&versions, &current, keep);
        for version in &plan.delete {
            self.delete(version)?;
        }
        if plan.blocked_by_current {
            announce!(
                self,
                version = %current,
                remaining = versions.len() - plan.delete.len(),
                keep,
                "current version is the oldest remaining, stopping"
            );
            return Err(JungleError::CannotDeleteCurrent { version: current });
        }
        Ok(plan.delete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::config::{JungleConfig, PruneConfig};
    use crate::test_support::{TestJungle, v};

    fn aged_fixture(current: &str) -> TestJungle {
        let fixture =
            TestJungle::initialised(&["1.0", "1.0b3", "1.2", "2.0"]).expect("fixture");
        for (name, days) in [("1.0", 10), ("1.0b3", 9), ("1.2", 5), ("2.0", 3)] {
            fixture.age_version(name, days).expect("age");
        }
        fixture.jungle().set(&v(current)).expect("set current");
        fixture
    }

    fn remaining(fixture: &TestJungle) -> Vec<Version> {
        fixture.jungle().versions().expect("versions")
    }

    #[test]
    fn age_nine_deletes_only_the_oldest() {
        let fixture = aged_fixture("2.0");
        let deleted = fixture.jungle().prune(Retention::MaxAgeDays(9)).expect("prune");
        assert_eq!(deleted, vec![v("1.0")]);
        assert_eq!(remaining(&fixture), vec![v("1.0b3"), v("1.2"), v("2.0")]);
    }

    #[test]
    fn age_five_deletes_two() {
        let fixture = aged_fixture("2.0");
        let deleted = fixture.jungle().prune(Retention::MaxAgeDays(5)).expect("prune");
        assert_eq!(deleted, vec![v("1.0b3"), v("1.0")]);
        assert_eq!(remaining(&fixture), vec![v("1.2"), v("2.0")]);
    }

    #[test]
    fn age_zero_deletes_everything_but_current() {
        let fixture = aged_fixture("2.0");
        let deleted = fixture.jungle().prune(Retention::MaxAgeDays(0)).expect("prune");
        assert_eq!(deleted, vec![v("1.0b3"), v("1.0"), v("1.2")]);
        assert_eq!(remaining(&fixture), vec![v("2.0")]);
    }

    #[test]
    fn age_spares_an_old_current() {
        let fixture = aged_fixture("1.0");
        let deleted = fixture.jungle().prune(Retention::MaxAgeDays(0)).expect("prune");
        assert_eq!(deleted, vec![v("1.0b3"), v("1.2"), v("2.0")]);
        assert_eq!(remaining(&fixture), vec![v("1.0")]);
        assert_eq!(fixture.jungle().current().expect("current"), v("1.0"));
    }

    #[test]
    fn age_uses_the_supplied_clock() {
        let fixture = aged_fixture("2.0");
        let long_ago = Utc::now() - chrono::TimeDelta::days(30);
        let deleted = fixture
            .jungle()
            .prune_by_age_at(0, long_ago)
            .expect("prune");
        assert!(deleted.is_empty());
        assert_eq!(remaining(&fixture).len(), 4);
    }

    #[test]
    fn count_deletes_two_oldest() {
        let fixture =
            TestJungle::initialised(&["1.0", "1.0b3", "1.1", "1.5", "2.0"]).expect("fixture");
        let deleted = fixture.jungle().prune(Retention::KeepLatest(3)).expect("prune");
        assert_eq!(deleted, vec![v("1.0b3"), v("1.0")]);
        assert_eq!(remaining(&fixture), vec![v("1.1"), v("1.5"), v("2.0")]);
    }

    #[test]
    fn count_aborts_when_current_is_oldest() {
        let fixture =
            TestJungle::initialised(&["1.0", "1.0b3", "1.1", "1.5", "2.0"]).expect("fixture");
        let jungle = fixture.jungle();
        jungle.set(&v("1.0b3")).expect("set");

        let err = jungle.prune(Retention::KeepLatest(3)).unwrap_err();
        assert!(matches!(err, JungleError::CannotDeleteCurrent { ref version } if *version == v("1.0b3")));
        assert_eq!(remaining(&fixture).len(), 5);
    }

    #[test]
    fn count_stops_exactly_before_current() {
        let fixture =
            TestJungle::initialised(&["1.0", "1.0b3", "1.1", "1.5", "2.0"]).expect("fixture");
        let jungle = fixture.jungle();
        jungle.set(&v("1.1")).expect("set");

        let err = jungle.prune(Retention::KeepLatest(2)).unwrap_err();
        assert!(matches!(err, JungleError::CannotDeleteCurrent { .. }));
        assert_eq!(remaining(&fixture), vec![v("1.1"), v("1.5"), v("2.0")]);
    }

    #[test]
    fn count_respects_min_keep() {
        let fixture = TestJungle::initialised(&["1.0", "1.1", "2.0"]).expect("fixture");
        let config = JungleConfig {
            prune: PruneConfig { min_keep: 2 },
            ..JungleConfig::default()
        };
        let jungle = Jungle::with_config(fixture.path(), config).expect("open");

        let err = jungle.prune(Retention::KeepLatest(1)).unwrap_err();
        assert!(matches!(err, JungleError::BelowRetentionFloor { requested: 1, min_keep: 2 }));
        assert_eq!(remaining(&fixture).len(), 3);

        assert_eq!(jungle.prune(Retention::KeepLatest(2)).expect("prune"), vec![v("1.0")]);
    }

    #[test]
    fn prune_requires_valid_current() {
        let fixture = TestJungle::with_versions(&["1.0", "2.0"]).expect("fixture");
        let jungle = fixture.jungle();
        assert!(matches!(
            jungle.prune(Retention::KeepLatest(1)).unwrap_err(),
            JungleError::NoCurrent { .. }
        ));
        assert!(matches!(
            jungle.prune(Retention::MaxAgeDays(0)).unwrap_err(),
            JungleError::NoCurrent { .. }
        ));
        assert_eq!(remaining(&fixture).len(), 2);
    }

    #[test]
    fn verbose_jungle_prunes_the_same() {
        let fixture =
            TestJungle::initialised(&["1.0", "1.1", "2.0"]).expect("fixture");
        let jungle = Jungle::with_config(fixture.path(), JungleConfig::verbose()).expect("open");
        assert_eq!(jungle.prune(Retention::KeepLatest(1)).expect("prune"), vec![v("1.0"), v("1.1")]);
    }
}
