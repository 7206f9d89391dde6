//! Fuzz target for the lockout state machine.
//!
//! Each input byte is one login outcome at a minute offset; the lock
//! invariants must hold after every step.
//!
//! Run with:
//! cargo +nightly fuzz run fuzz_lockout -- -max_total_time=600

#![no_main]

use chrono::{Duration, TimeZone, Utc};
use libfuzzer_sys::fuzz_target;
use noc_accounts::lockout::{is_locked, record_failed_attempt, record_success, LockState};

fuzz_target!(|data: &[u8]| {
    let Some(start) = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).single() else {
        return;
    };
    let mut now = start;
    let mut state = LockState::default();

    for byte in data {
        now += Duration::minutes(i64::from(byte & 0x7f));

        if byte & 0x80 == 0 {
            let before = state;
            state = record_failed_attempt(state, now);
            if is_locked(before, now) {
                assert_eq!(state.locked_until, before.locked_until);
            }
            if let Some(until) = state.locked_until {
                assert!(until <= now + Duration::minutes(30));
            }
        } else {
            state = record_success();
            assert_eq!(state, LockState::default());
            assert!(!is_locked(state, now));
        }
    }
});
