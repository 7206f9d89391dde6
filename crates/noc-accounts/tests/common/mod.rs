//! Shared fixtures for account service tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use noc_accounts::{AuthenticationService, InMemoryUserRepository, NewAccount};
use noc_auth::{JwtTokenIssuer, PasswordHasher};
use noc_authorization::{InMemoryAuditSink, RequestMeta, Role};
use noc_core::FixedClock;

pub const TEST_PRIVATE_KEY: &[u8] = include_bytes!("../../../noc-auth/testdata/signing_key.pem");
pub const TEST_PUBLIC_KEY: &[u8] =
    include_bytes!("../../../noc-auth/testdata/signing_key.pub.pem");

pub struct Fixture {
    pub service: AuthenticationService,
    pub users: Arc<InMemoryUserRepository>,
    pub audit: Arc<InMemoryAuditSink>,
    pub clock: Arc<FixedClock>,
    pub issuer: Arc<JwtTokenIssuer>,
}

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap()
}

pub fn issuer() -> JwtTokenIssuer {
    JwtTokenIssuer::new(TEST_PRIVATE_KEY, TEST_PUBLIC_KEY, "noc-test").unwrap()
}

pub fn fixture() -> Fixture {
    let users = Arc::new(InMemoryUserRepository::new());
    let audit = Arc::new(InMemoryAuditSink::new());
    let clock = Arc::new(FixedClock::at(t0()));
    let issuer = Arc::new(issuer());

    let service = AuthenticationService::new(
        users.clone(),
        issuer.clone(),
        audit.clone(),
        clock.clone(),
    )
    .with_password_hasher(PasswordHasher::with_params(4096, 1, 1).unwrap());

    Fixture {
        service,
        users,
        audit,
        clock,
        issuer,
    }
}

pub fn meta() -> RequestMeta {
    RequestMeta::new(Some("10.20.30.40".parse().unwrap()), Some("noc-tests".to_string()))
}

pub const PASSWORD: &str = "Sup3rSecret!";

pub fn new_account(username: &str, role: Role) -> NewAccount {
    NewAccount {
        username: username.to_string(),
        email: format!("{username}@noc.example"),
        password: PASSWORD.to_string(),
        first_name: "Test".to_string(),
        last_name: "Operator".to_string(),
        role: Some(role),
        department: None,
        phone: None,
    }
}
