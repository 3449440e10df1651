//! Transactional per-variant, per-day usage counters.

use dashmap::DashMap;
use indexmap::IndexMap;
use time::{Date, OffsetDateTime};
use tracing::info;

use crate::{error::QuizError, quiz::QuizVariant};

/// Daily play ceilings enforced atomically per (variant, UTC day) key.
///
/// The check-and-increment is a single transaction: the map entry lock
/// serializes concurrent callers on the same key, so two requests racing for
/// the last slot cannot both succeed, while different keys never contend.
/// A new day implicitly starts a fresh counter; keys from earlier days are
/// pruned once a fresh day's key is created.
pub struct UsageLimiter {
    limits: IndexMap<QuizVariant, u32>,
    counts: DashMap<(QuizVariant, Date), u32>,
}

impl UsageLimiter {
    /// Create a limiter with the given per-variant ceilings.
    pub fn new(limits: IndexMap<QuizVariant, u32>) -> Self {
        Self {
            limits,
            counts: DashMap::new(),
        }
    }

    /// Consume one play of `variant` for today, returning the new committed
    /// count, or fail without incrementing once the ceiling is reached.
    pub fn check_and_increment(&self, variant: QuizVariant) -> Result<u32, QuizError> {
        self.check_and_increment_on(variant, today_utc())
    }

    /// Day-explicit version of [`Self::check_and_increment`]; also used by
    /// tests to exercise day rollover.
    pub fn check_and_increment_on(&self, variant: QuizVariant, day: Date) -> Result<u32, QuizError> {
        let limit = self.limit_for(variant)?;

        // First play of a fresh key: drop entries from earlier days so the
        // map never grows past the current day's keys.
        if !self.counts.contains_key(&(variant, day)) {
            self.counts.retain(|(_, key_day), _| *key_day >= day);
        }

        // The entry guard holds the shard lock for this key, making the
        // read-compare-increment atomic against concurrent callers.
        let mut entry = self.counts.entry((variant, day)).or_insert(0);
        if *entry >= limit {
            return Err(QuizError::QuotaExceeded {
                variant,
                usage: *entry,
                limit,
            });
        }
        *entry += 1;
        Ok(*entry)
    }

    /// Configured ceilings per variant.
    pub fn limits(&self) -> &IndexMap<QuizVariant, u32> {
        &self.limits
    }

    /// Committed usage counts for today, zero-filled for unused variants.
    pub fn usage_snapshot(&self) -> IndexMap<QuizVariant, u32> {
        self.usage_snapshot_on(today_utc())
    }

    fn usage_snapshot_on(&self, day: Date) -> IndexMap<QuizVariant, u32> {
        self.limits
            .keys()
            .map(|variant| {
                let count = self
                    .counts
                    .get(&(*variant, day))
                    .map(|entry| *entry)
                    .unwrap_or(0);
                (*variant, count)
            })
            .collect()
    }

    /// Administrative override: wipe today's counters for every variant.
    pub fn reset_today(&self) {
        let day = today_utc();
        self.counts.retain(|(_, key_day), _| *key_day != day);
        info!(%day, "usage counters reset by administrator");
    }

    fn limit_for(&self, variant: QuizVariant) -> Result<u32, QuizError> {
        self.limits.get(&variant).copied().ok_or_else(|| {
            QuizError::Validation(format!("no daily limit configured for {variant}"))
        })
    }
}

/// Today's date in the fixed reference timezone (UTC).
pub(crate) fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use time::Month;

    use super::*;

    fn limiter(limit: u32) -> UsageLimiter {
        let limits = QuizVariant::ALL
            .into_iter()
            .map(|variant| (variant, limit))
            .collect();
        UsageLimiter::new(limits)
    }

    fn day(day: u8) -> Date {
        Date::from_calendar_date(2026, Month::August, day).unwrap()
    }

    #[test]
    fn counts_up_to_the_limit_then_rejects() {
        let limiter = limiter(3);

        for expected in 1..=3 {
            let count = limiter
                .check_and_increment_on(QuizVariant::Trivia, day(1))
                .unwrap();
            assert_eq!(count, expected);
        }

        match limiter.check_and_increment_on(QuizVariant::Trivia, day(1)) {
            Err(QuizError::QuotaExceeded {
                variant,
                usage,
                limit,
            }) => {
                assert_eq!(variant, QuizVariant::Trivia);
                assert_eq!(usage, 3);
                assert_eq!(limit, 3);
            }
            other => panic!("expected quota rejection, got {other:?}"),
        }
    }

    #[test]
    fn variants_do_not_share_counters() {
        let limiter = limiter(1);

        limiter
            .check_and_increment_on(QuizVariant::Trivia, day(1))
            .unwrap();
        limiter
            .check_and_increment_on(QuizVariant::SequelSalad, day(1))
            .unwrap();

        assert!(
            limiter
                .check_and_increment_on(QuizVariant::Trivia, day(1))
                .is_err()
        );
    }

    #[test]
    fn a_new_day_starts_fresh() {
        let limiter = limiter(1);

        limiter
            .check_and_increment_on(QuizVariant::BttfTrivia, day(1))
            .unwrap();
        assert!(
            limiter
                .check_and_increment_on(QuizVariant::BttfTrivia, day(1))
                .is_err()
        );

        let count = limiter
            .check_and_increment_on(QuizVariant::BttfTrivia, day(2))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn day_rollover_drops_previous_days_counters() {
        let limiter = limiter(5);

        limiter
            .check_and_increment_on(QuizVariant::Trivia, day(1))
            .unwrap();
        limiter
            .check_and_increment_on(QuizVariant::BttfTrivia, day(1))
            .unwrap();

        limiter
            .check_and_increment_on(QuizVariant::Trivia, day(2))
            .unwrap();

        assert_eq!(limiter.usage_snapshot_on(day(1))[&QuizVariant::Trivia], 0);
        assert_eq!(
            limiter.usage_snapshot_on(day(1))[&QuizVariant::BttfTrivia],
            0
        );
        assert_eq!(limiter.usage_snapshot_on(day(2))[&QuizVariant::Trivia], 1);
    }

    #[test]
    fn snapshot_reflects_committed_state_only() {
        let limiter = limiter(5);

        limiter
            .check_and_increment_on(QuizVariant::TitleDetectives, day(1))
            .unwrap();
        limiter
            .check_and_increment_on(QuizVariant::TitleDetectives, day(1))
            .unwrap();

        let snapshot = limiter.usage_snapshot_on(day(1));
        assert_eq!(snapshot[&QuizVariant::TitleDetectives], 2);
        assert_eq!(snapshot[&QuizVariant::Trivia], 0);
        assert_eq!(snapshot.len(), QuizVariant::ALL.len());
    }

    #[test]
    fn concurrent_racers_for_the_last_slot_see_one_winner() {
        let limit = 8u32;
        let limiter = Arc::new(self::limiter(limit));

        let mut handles = Vec::new();
        for _ in 0..32 {
            let limiter = limiter.clone();
            handles.push(std::thread::spawn(move || {
                limiter
                    .check_and_increment_on(QuizVariant::Trivia, day(1))
                    .is_ok()
            }));
        }

        let successes = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(successes as u32, limit);
    }
}
