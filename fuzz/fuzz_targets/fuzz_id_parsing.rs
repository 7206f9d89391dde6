//! Fuzz target for typed id parsing.
//!
//! Run with:
//! cargo +nightly fuzz run fuzz_id_parsing -- -max_total_time=600

#![no_main]

use libfuzzer_sys::fuzz_target;
use noc_core::{IncidentId, UserId};
use uuid::Uuid;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(id) = s.parse::<IncidentId>() {
            let reparsed: IncidentId = id.to_string().parse().unwrap();
            assert_eq!(id, reparsed);
        }
        let _ = s.parse::<UserId>();
    }

    if data.len() == 16 {
        let uuid = Uuid::from_slice(data).unwrap();
        let id = UserId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), &uuid);
    }
});
