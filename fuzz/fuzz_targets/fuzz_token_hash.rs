//! Fuzz target for reset-token hashing.
//!
//! Run with:
//! cargo +nightly fuzz run fuzz_token_hash -- -max_total_time=600

#![no_main]

use libfuzzer_sys::fuzz_target;
use noc_accounts::tokens::{hash_token, token_matches};

fuzz_target!(|data: &[u8]| {
    let token = String::from_utf8_lossy(data);

    let hash = hash_token(&token);
    assert_eq!(hash.len(), 64);
    assert_eq!(hash, hash_token(&token));
    assert!(token_matches(&token, &hash));
    assert!(!token_matches(&token, &hash[..63]));
});
