//! Fuzz target for incident number parsing.
//!
//! Run with:
//! cargo +nightly fuzz run fuzz_incident_number -- -max_total_time=600

#![no_main]

use libfuzzer_sys::fuzz_target;
use noc_incidents::numbering::{generate_incident_number, parse_incident_number};

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    // Anything that parses must format back to a number that parses the same.
    if let Some((year, month, sequence)) = parse_incident_number(s) {
        assert!((1..=12).contains(&month));
        if (0..=9999).contains(&year) {
            let formatted = generate_incident_number(year, month, sequence);
            assert_eq!(parse_incident_number(&formatted), Some((year, month, sequence)));
        }
    }
});
