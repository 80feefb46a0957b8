//! Brute-force lockout bookkeeping over an account's attempt counters.

use chrono::{DateTime, Duration, Utc};

use super::models::{Account, LockState};

/// Default number of consecutive failures before lockout
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default lockout duration in minutes
pub const DEFAULT_LOCKOUT_MINUTES: i64 = 15;

/// Pure lockout decisions
#[derive(Debug, Clone, Copy)]
pub struct LockoutPolicy {
    max_attempts: u32,
    lockout_duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_ATTEMPTS,
            Duration::minutes(DEFAULT_LOCKOUT_MINUTES),
        )
    }
}

impl LockoutPolicy {
    pub fn new(max_attempts: u32, lockout_duration: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            lockout_duration,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn lockout_duration(&self) -> Duration {
        self.lockout_duration
    }

    /// Lockout duration in whole minutes, for error reporting
    pub fn lockout_minutes(&self) -> i64 {
        self.lockout_duration.num_minutes()
    }

    pub fn is_locked(&self, account: &Account, now: DateTime<Utc>) -> bool {
        matches!(account.lock_state(now), LockState::LockedUntil(_))
    }

    /// Count a failed attempt, locking the account once the threshold is reached.
    ///
    /// Callers reject locked accounts before getting here, so an active
    /// lockout is never extended.
    pub fn record_failure(&self, mut account: Account, now: DateTime<Utc>) -> Account {
        account.failed_attempts = account.failed_attempts.saturating_add(1);

        if account.failed_attempts as i64 >= self.max_attempts as i64 {
            account.locked_until = Some(
                now.checked_add_signed(self.lockout_duration)
                    .unwrap_or(DateTime::<Utc>::MAX_UTC),
            );
        }

        account
    }

    pub fn record_success(&self, mut account: Account) -> Account {
        account.failed_attempts = 0;
        account.locked_until = None;
        account
    }

    /// Whole minutes until the lockout lapses, rounded up. Zero when unlocked.
    pub fn remaining_minutes(&self, account: &Account, now: DateTime<Utc>) -> i64 {
        match account.lock_state(now) {
            LockState::LockedUntil(until) => {
                let millis = (until - now).num_milliseconds();
                (millis + 59_999) / 60_000
            }
            LockState::Unlocked => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::Role;

    fn fresh_account() -> Account {
        Account {
            id: 7,
            email: "a@x.com".to_string(),
            password_hash: String::new(),
            name: None,
            bio: None,
            image: None,
            role: Role::User,
            failed_attempts: 0,
            locked_until: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_failures_below_threshold_do_not_lock() {
        let policy = LockoutPolicy::default();
        let now = Utc::now();

        let mut account = fresh_account();
        for expected in 1..=4 {
            account = policy.record_failure(account, now);
            assert_eq!(account.failed_attempts, expected);
            assert!(account.locked_until.is_none());
            assert!(!policy.is_locked(&account, now));
        }
    }

    #[test]
    fn test_fifth_failure_locks_for_fifteen_minutes() {
        let policy = LockoutPolicy::default();
        let now = Utc::now();

        let mut account = fresh_account();
        for _ in 0..5 {
            account = policy.record_failure(account, now);
        }

        assert_eq!(account.locked_until, Some(now + Duration::minutes(15)));
        assert!(policy.is_locked(&account, now));
        assert!(policy.is_locked(&account, now + Duration::minutes(14)));
        assert!(!policy.is_locked(&account, now + Duration::minutes(15)));
    }

    #[test]
    fn test_success_resets_counters() {
        let policy = LockoutPolicy::default();
        let now = Utc::now();

        let mut account = fresh_account();
        for _ in 0..5 {
            account = policy.record_failure(account, now);
        }

        let account = policy.record_success(account);
        assert_eq!(account.failed_attempts, 0);
        assert!(account.locked_until.is_none());
    }

    #[test]
    fn test_remaining_minutes_rounds_up() {
        let policy = LockoutPolicy::default();
        let now = Utc::now();

        let mut account = fresh_account();
        account.locked_until = Some(now + Duration::seconds(61));
        assert_eq!(policy.remaining_minutes(&account, now), 2);

        account.locked_until = Some(now + Duration::seconds(30));
        assert_eq!(policy.remaining_minutes(&account, now), 1);

        account.locked_until = Some(now - Duration::seconds(30));
        assert_eq!(policy.remaining_minutes(&account, now), 0);
    }

    #[test]
    fn test_oversized_lockout_saturates() {
        let policy = LockoutPolicy::new(1, Duration::weeks(1_000_000_000));
        let now = Utc::now();

        let account = policy.record_failure(fresh_account(), now);
        assert_eq!(account.locked_until, Some(DateTime::<Utc>::MAX_UTC));
        assert!(policy.is_locked(&account, now));
        assert!(policy.remaining_minutes(&account, now) > 0);
    }

    #[test]
    fn test_zero_threshold_is_clamped() {
        let policy = LockoutPolicy::new(0, Duration::minutes(1));
        assert_eq!(policy.max_attempts(), 1);
    }
}
