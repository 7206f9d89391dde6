//! Fuzz target for permission and role tokens.
//!
//! Run with:
//! cargo +nightly fuzz run fuzz_permission_parse -- -max_total_time=600

#![no_main]

use libfuzzer_sys::fuzz_target;
use noc_authorization::{has_permission, Actor, Permission, Role};
use noc_core::UserId;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    let permission = Permission::parse(s);
    assert_eq!(permission.as_str(), s);

    // Admin holds every permission, known or not.
    let admin = Actor::new(UserId::new(), Role::Admin);
    assert!(has_permission(&admin, &permission));

    if matches!(permission, Permission::Other(_)) {
        let viewer = Actor::new(UserId::new(), Role::Viewer);
        assert!(!has_permission(&viewer, &permission));
    }

    if let Ok(role) = s.parse::<Role>() {
        assert_eq!(role.as_str().parse::<Role>().ok(), Some(role));
    }
});
