/// Property-based tests for the lockout policy using proptest
///
/// These tests drive `LockoutPolicy` through random sequences of failed and
/// successful attempts and check the counter and lock invariants hold.
use chrono::{Duration, TimeZone, Utc};
use portfolio::auth::{Account, LockoutPolicy, Role};
use proptest::prelude::*;

fn fresh_account() -> Account {
    Account {
        id: 1,
        email: "a@x.com".to_string(),
        password_hash: String::new(),
        name: None,
        bio: None,
        image: None,
        role: Role::User,
        failed_attempts: 0,
        locked_until: None,
        created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
    }
}

// One login attempt: whether the password was right, and seconds elapsed before it
fn attempt_strategy() -> impl Strategy<Value = (bool, i64)> {
    (any::<bool>(), 0i64..1200)
}

proptest! {
    #[test]
    fn test_lock_happens_exactly_at_threshold(max_attempts in 1u32..10, failures in 0u32..20) {
        let policy = LockoutPolicy::new(max_attempts, Duration::minutes(15));
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();

        let mut account = fresh_account();
        for _ in 0..failures {
            account = policy.record_failure(account, now);
        }

        prop_assert_eq!(account.failed_attempts as u32, failures);
        if failures >= max_attempts {
            prop_assert_eq!(account.locked_until, Some(now + Duration::minutes(15)));
            prop_assert!(policy.is_locked(&account, now));
        } else {
            prop_assert!(account.locked_until.is_none());
            prop_assert!(!policy.is_locked(&account, now));
        }
    }

    #[test]
    fn test_remaining_minutes_bounded(elapsed_secs in 0i64..2000, lockout_minutes in 1i64..60) {
        let policy = LockoutPolicy::new(1, Duration::minutes(lockout_minutes));
        let locked_at = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let account = policy.record_failure(fresh_account(), locked_at);

        let now = locked_at + Duration::seconds(elapsed_secs);
        let remaining = policy.remaining_minutes(&account, now);

        prop_assert!(remaining >= 0);
        prop_assert!(remaining <= lockout_minutes);
        prop_assert_eq!(remaining > 0, policy.is_locked(&account, now));
    }

    // Simulates the login state machine: locked accounts are left untouched,
    // wrong passwords count, a right password resets.
    #[test]
    fn test_attempt_sequences_keep_invariants(attempts in prop::collection::vec(attempt_strategy(), 1..40)) {
        let policy = LockoutPolicy::default();
        let mut now = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let mut account = fresh_account();

        for (correct, wait) in attempts {
            now += Duration::seconds(wait);

            if policy.is_locked(&account, now) {
                let until = account.locked_until;
                prop_assert!(until.is_some_and(|u| u > now));
                continue;
            }

            let before = account.failed_attempts;
            account = if correct {
                policy.record_success(account)
            } else {
                policy.record_failure(account, now)
            };

            if correct {
                prop_assert_eq!(account.failed_attempts, 0);
                prop_assert!(account.locked_until.is_none());
            } else {
                prop_assert_eq!(account.failed_attempts, before + 1);
                if account.failed_attempts >= policy.max_attempts() as i32 {
                    prop_assert_eq!(account.locked_until, Some(now + policy.lockout_duration()));
                }
            }

            // A lock is only ever set alongside a full counter
            if account.locked_until.is_some() {
                prop_assert!(account.failed_attempts >= policy.max_attempts() as i32);
            }
        }
    }
}
