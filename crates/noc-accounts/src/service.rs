//! Login, token sessions and credential management.
//!
//! Every refusal records exactly one [`SecurityAuditEvent`] before the error
//! is returned. Successful state changes are audited too.

use std::net::IpAddr;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use noc_auth::{AccessSubject, AuthError, JwtClaims, PasswordHasher, TokenIssuer, TokenPurpose};
use noc_authorization::{RequestMeta, Role, SecurityAction, SecurityAuditEvent, SecurityAuditSink};
use noc_core::{Clock, UserId};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::account::{normalize_identifier, Account};
use crate::error::AccountError;
use crate::lockout::LockoutPolicy;
use crate::repository::UserRepository;
use crate::tokens::{hash_token, token_matches, ResetToken};
use crate::validation::{validate_password_length, NewAccount};

/// Lifetime of a password-reset token.
pub const RESET_TOKEN_TTL_MINUTES: i64 = 60;

/// Credentials presented at login, with request metadata for the audit trail.
#[derive(Clone)]
pub struct LoginRequest {
    /// Username or email.
    pub identifier: String,
    pub password: String,
    pub ip: Option<IpAddr>,
    pub user_agent: Option<String>,
}

impl LoginRequest {
    pub fn new(identifier: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            password: password.into(),
            ip: None,
            user_agent: None,
        }
    }

    #[must_use]
    pub fn with_meta(mut self, meta: &RequestMeta) -> Self {
        self.ip = meta.ip;
        self.user_agent = meta.user_agent.clone();
        self
    }

    fn meta(&self) -> RequestMeta {
        RequestMeta::new(self.ip, self.user_agent.clone())
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("identifier", &self.identifier)
            .field("password", &"[REDACTED]")
            .field("ip", &self.ip)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Access and refresh token issued together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_token: String,
    pub refresh_expires_at: DateTime<Utc>,
}

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub account: Account,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

/// Account authentication service.
#[derive(Clone)]
pub struct AuthenticationService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenIssuer>,
    audit: Arc<dyn SecurityAuditSink>,
    clock: Arc<dyn Clock>,
    hasher: PasswordHasher,
    lockout: LockoutPolicy,
}

impl AuthenticationService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn TokenIssuer>,
        audit: Arc<dyn SecurityAuditSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            tokens,
            audit,
            clock,
            hasher: PasswordHasher::default(),
            lockout: LockoutPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_password_hasher(mut self, hasher: PasswordHasher) -> Self {
        self.hasher = hasher;
        self
    }

    #[must_use]
    pub fn with_lockout_policy(mut self, policy: LockoutPolicy) -> Self {
        self.lockout = policy;
        self
    }

    async fn record(&self, event: SecurityAuditEvent) {
        self.audit.record(event).await;
    }

    fn event(&self, action: SecurityAction, meta: &RequestMeta) -> SecurityAuditEvent {
        SecurityAuditEvent::new(action, self.clock.now()).meta(meta)
    }

    fn issue_pair(&self, account: &Account, now: DateTime<Utc>) -> Result<TokenPair, AccountError> {
        let subject = AccessSubject {
            user_id: account.id,
            username: account.username.clone(),
            email: account.email.clone(),
            role: account.role.as_str().to_string(),
        };

        let access = self.tokens.issue_access(&subject, now)?;
        let refresh = self.tokens.issue_refresh(account.id, now)?;

        Ok(TokenPair {
            access_token: access.token,
            access_expires_at: access.expires_at,
            refresh_token: refresh.token,
            refresh_expires_at: refresh.expires_at,
        })
    }

    /// Authenticate with username/email and password.
    ///
    /// # Errors
    ///
    /// - `InvalidCredentials` for an unknown identifier or a wrong password
    /// - `AccountLocked` while a lock is active (no attempt is counted)
    /// - `AccountInactive` for a deactivated account
    #[instrument(skip(self, request), fields(identifier = %request.identifier))]
    pub async fn login(&self, request: LoginRequest) -> Result<Session, AccountError> {
        let meta = request.meta();
        let now = self.clock.now();

        let Some(mut account) = self.users.find_by_identifier(&request.identifier).await? else {
            debug!("Login attempt for non-existent user");
            self.record(
                self.event(SecurityAction::LoginFailed, &meta)
                    .reason("user_not_found")
                    .details(json!({ "identifier": request.identifier })),
            )
            .await;
            return Err(AccountError::InvalidCredentials);
        };

        if self.lockout.is_locked(account.lock_state(), now) {
            warn!(user_id = %account.id, "Login attempt on locked account");
            self.record(
                self.event(SecurityAction::LoginFailed, &meta)
                    .reason("user_locked")
                    .actor(account.id, Some(account.role)),
            )
            .await;
            // is_locked implies locked_until is set
            let locked_until = account.locked_until.unwrap_or(now);
            return Err(AccountError::AccountLocked { locked_until });
        }

        if !account.is_active {
            warn!(user_id = %account.id, "Login attempt for inactive account");
            self.record(
                self.event(SecurityAction::LoginFailed, &meta)
                    .reason("user_inactive")
                    .actor(account.id, Some(account.role)),
            )
            .await;
            return Err(AccountError::AccountInactive);
        }

        if !self.hasher.verify(&request.password, &account.password_hash)? {
            let state = self.lockout.record_failed_attempt(account.lock_state(), now);
            account.set_lock_state(state);
            self.users.save(&account).await?;

            if self.lockout.is_locked(state, now) {
                warn!(
                    user_id = %account.id,
                    failed_attempts = state.failed_attempts,
                    "Account locked after repeated login failures"
                );
            } else {
                debug!(user_id = %account.id, "Invalid password attempt");
            }

            self.record(
                self.event(SecurityAction::LoginFailed, &meta)
                    .reason("invalid_password")
                    .actor(account.id, Some(account.role))
                    .details(json!({ "login_attempts": state.failed_attempts })),
            )
            .await;
            return Err(AccountError::InvalidCredentials);
        }

        account.set_lock_state(self.lockout.record_success());
        account.last_login = Some(now);
        self.users.save(&account).await?;

        let tokens = self.issue_pair(&account, now)?;

        self.record(
            self.event(SecurityAction::LoginSuccess, &meta)
                .actor(account.id, Some(account.role)),
        )
        .await;
        info!(user_id = %account.id, "User logged in successfully");

        Ok(Session { account, tokens })
    }

    /// Exchange a refresh token for a new pair.
    ///
    /// The old refresh token is not revoked; rotation is stateless.
    #[instrument(skip_all)]
    pub async fn refresh(
        &self,
        refresh_token: &str,
        meta: &RequestMeta,
    ) -> Result<TokenPair, AccountError> {
        let now = self.clock.now();

        let claims = match self.tokens.verify(refresh_token, TokenPurpose::Refresh, now) {
            Ok(claims) => claims,
            Err(e) => {
                debug!(error = %e, "Refresh token rejected");
                self.record(
                    self.event(SecurityAction::RefreshFailed, meta)
                        .reason(token_failure_reason(&e)),
                )
                .await;
                return Err(AccountError::InvalidToken);
            }
        };

        let account = match self.account_for_claims(&claims).await? {
            Ok(account) => account,
            Err((reason, actor)) => {
                let mut event = self.event(SecurityAction::RefreshFailed, meta).reason(reason);
                if let Some((id, role)) = actor {
                    event = event.actor(id, Some(role));
                }
                self.record(event).await;
                return Err(AccountError::InvalidToken);
            }
        };

        let pair = self.issue_pair(&account, now)?;

        self.record(
            self.event(SecurityAction::TokenRefreshed, meta)
                .actor(account.id, Some(account.role)),
        )
        .await;
        debug!(user_id = %account.id, "Token pair refreshed");

        Ok(pair)
    }

    /// Resolve an access token to its current account.
    ///
    /// # Errors
    ///
    /// - `InvalidToken` for a missing, malformed or expired token, or an
    ///   account that no longer exists or is inactive
    /// - `AccountLocked` while the account's lock is active
    #[instrument(skip_all)]
    pub async fn authenticate(
        &self,
        access_token: &str,
        meta: &RequestMeta,
    ) -> Result<Account, AccountError> {
        let now = self.clock.now();

        if access_token.trim().is_empty() {
            self.record(
                self.event(SecurityAction::AuthenticationFailed, meta)
                    .reason("no_token_provided"),
            )
            .await;
            return Err(AccountError::InvalidToken);
        }

        let claims = match self.tokens.verify(access_token, TokenPurpose::Access, now) {
            Ok(claims) => claims,
            Err(e) => {
                self.record(
                    self.event(SecurityAction::AuthenticationFailed, meta)
                        .reason(token_failure_reason(&e)),
                )
                .await;
                return Err(AccountError::InvalidToken);
            }
        };

        let account = match self.account_for_claims(&claims).await? {
            Ok(account) => account,
            Err((reason, actor)) => {
                let mut event = self
                    .event(SecurityAction::AuthenticationFailed, meta)
                    .reason(reason);
                if let Some((id, role)) = actor {
                    event = event.actor(id, Some(role));
                }
                self.record(event).await;
                return Err(AccountError::InvalidToken);
            }
        };

        if let Some(locked_until) = account.locked_until.filter(|until| *until > now) {
            warn!(user_id = %account.id, "Token presented for locked account");
            self.record(
                self.event(SecurityAction::AuthenticationFailed, meta)
                    .reason("user_locked")
                    .actor(account.id, Some(account.role)),
            )
            .await;
            return Err(AccountError::AccountLocked { locked_until });
        }

        Ok(account)
    }

    /// Load the account named by `claims.sub`.
    ///
    /// The inner `Err` carries the audit reason and, when known, the actor.
    async fn account_for_claims(
        &self,
        claims: &JwtClaims,
    ) -> Result<Result<Account, (&'static str, Option<(UserId, Role)>)>, AccountError> {
        let Ok(user_id) = claims.sub.parse::<UserId>() else {
            return Ok(Err(("invalid_subject", None)));
        };

        match self.users.find_by_id(user_id).await? {
            None => Ok(Err(("user_not_found", None))),
            Some(account) if !account.is_active => {
                Ok(Err(("user_inactive", Some((account.id, account.role)))))
            }
            Some(account) => Ok(Ok(account)),
        }
    }

    /// Create an account.
    ///
    /// Username and email are stored lowercased; role defaults to viewer.
    #[instrument(skip(self, input, meta), fields(username = %input.username))]
    pub async fn register(
        &self,
        input: NewAccount,
        meta: &RequestMeta,
    ) -> Result<Account, AccountError> {
        input.validate()?;

        let username = normalize_identifier(&input.username);
        let email = normalize_identifier(&input.email);

        for (field, value) in [("username", &username), ("email", &email)] {
            if self.users.find_by_identifier(value).await?.is_some() {
                return Err(AccountError::Conflict {
                    field: field.to_string(),
                    message: "Username or email already exists".to_string(),
                });
            }
        }

        let account = Account {
            id: UserId::new(),
            username,
            email,
            password_hash: self.hasher.hash(&input.password)?,
            role: input.role.unwrap_or_default(),
            is_active: true,
            first_name: input.first_name,
            last_name: input.last_name,
            department: input.department,
            phone: input
                .phone
                .map(|phone| phone.trim().to_string())
                .filter(|phone| !phone.is_empty()),
            failed_login_attempts: 0,
            locked_until: None,
            last_login: None,
            password_reset_token_hash: None,
            password_reset_expires: None,
            created_at: self.clock.now(),
        };

        self.users.save(&account).await?;

        self.record(
            self.event(SecurityAction::UserRegistered, meta)
                .actor(account.id, Some(account.role))
                .details(json!({
                    "username": account.username,
                    "email": account.email,
                    "role": account.role,
                })),
        )
        .await;
        info!(user_id = %account.id, role = %account.role, "User registered successfully");

        Ok(account)
    }

    /// Replace the password after checking the current one.
    #[instrument(skip(self, current_password, new_password, meta))]
    pub async fn change_password(
        &self,
        account_id: UserId,
        current_password: &str,
        new_password: &str,
        meta: &RequestMeta,
    ) -> Result<(), AccountError> {
        let mut account = self
            .users
            .find_by_id(account_id)
            .await?
            .ok_or(AccountError::NotFound)?;

        if !self.hasher.verify(current_password, &account.password_hash)? {
            warn!(user_id = %account.id, "Password change with wrong current password");
            self.record(
                self.event(SecurityAction::AuthenticationFailed, meta)
                    .reason("invalid_current_password")
                    .actor(account.id, Some(account.role)),
            )
            .await;
            return Err(AccountError::InvalidCredentials);
        }

        validate_password_length(new_password).map_err(AccountError::Validation)?;

        account.password_hash = self.hasher.hash(new_password)?;
        self.users.save(&account).await?;

        self.record(
            self.event(SecurityAction::PasswordChanged, meta)
                .actor(account.id, Some(account.role)),
        )
        .await;
        info!(user_id = %account.id, "Password changed");

        Ok(())
    }

    /// Start a password reset for the account with this email.
    ///
    /// Returns the raw token for delivery, or `None` when no account has the
    /// email. Callers must answer both cases identically.
    #[instrument(skip(self, email, meta))]
    pub async fn request_password_reset(
        &self,
        email: &str,
        meta: &RequestMeta,
    ) -> Result<Option<String>, AccountError> {
        let email = normalize_identifier(email);
        let account = self
            .users
            .find_by_identifier(&email)
            .await?
            .filter(|a| normalize_identifier(&a.email) == email);

        let Some(mut account) = account else {
            debug!("Password reset requested for unknown email");
            return Ok(None);
        };

        let (token, token_hash) = ResetToken::generate().into_parts();
        account.password_reset_token_hash = Some(token_hash);
        account.password_reset_expires =
            Some(self.clock.now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES));
        self.users.save(&account).await?;

        self.record(
            self.event(SecurityAction::PasswordResetRequested, meta)
                .actor(account.id, Some(account.role)),
        )
        .await;
        info!(user_id = %account.id, "Password reset requested");

        Ok(Some(token))
    }

    /// Complete a password reset.
    ///
    /// Clears the token and any lockout on success.
    #[instrument(skip_all)]
    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
        meta: &RequestMeta,
    ) -> Result<(), AccountError> {
        validate_password_length(new_password).map_err(AccountError::Validation)?;

        let now = self.clock.now();
        let candidate = self.users.find_by_reset_token(&hash_token(token)).await?;

        let valid = candidate.filter(|account| {
            let hash_matches = account
                .password_reset_token_hash
                .as_deref()
                .is_some_and(|stored| token_matches(token, stored));
            let unexpired = account.password_reset_expires.is_some_and(|exp| exp > now);
            hash_matches && unexpired
        });

        let Some(mut account) = valid else {
            warn!("Invalid or expired password reset token");
            self.record(
                self.event(SecurityAction::AuthenticationFailed, meta)
                    .reason("invalid_reset_token"),
            )
            .await;
            return Err(AccountError::InvalidToken);
        };

        account.password_hash = self.hasher.hash(new_password)?;
        account.clear_password_reset();
        account.set_lock_state(self.lockout.record_success());
        self.users.save(&account).await?;

        self.record(
            self.event(SecurityAction::PasswordResetCompleted, meta)
                .actor(account.id, Some(account.role)),
        )
        .await;
        info!(user_id = %account.id, "Password reset completed");

        Ok(())
    }

    /// Administrative unlock: clears the failure counter and lock.
    #[instrument(skip(self, meta))]
    pub async fn unlock(
        &self,
        account_id: UserId,
        unlocked_by: Option<UserId>,
        meta: &RequestMeta,
    ) -> Result<Account, AccountError> {
        let mut account = self
            .users
            .find_by_id(account_id)
            .await?
            .ok_or(AccountError::NotFound)?;

        let previous = account.lock_state();
        account.set_lock_state(self.lockout.record_success());
        self.users.save(&account).await?;

        let mut event = self
            .event(SecurityAction::AccountUnlocked, meta)
            .resource(noc_authorization::ResourceType::User, account.id.to_string())
            .details(json!({
                "previous_failed_attempts": previous.failed_attempts,
                "previous_locked_until": previous.locked_until,
            }));
        if let Some(admin) = unlocked_by {
            event = event.actor(admin, None);
        }
        self.record(event).await;
        info!(user_id = %account.id, "Account unlocked");

        Ok(account)
    }

    /// Record a logout. Tokens are stateless, so this never fails.
    #[instrument(skip_all)]
    pub async fn logout(&self, access_token: &str, meta: &RequestMeta) {
        let now = self.clock.now();
        match self.tokens.verify(access_token, TokenPurpose::Access, now) {
            Ok(claims) => {
                let mut event = self.event(SecurityAction::Logout, meta);
                if let Ok(user_id) = claims.sub.parse::<UserId>() {
                    let role = claims.role.as_deref().and_then(|r| r.parse::<Role>().ok());
                    event = event.actor(user_id, role);
                }
                self.record(event).await;
                debug!(subject = %claims.sub, "User logged out");
            }
            Err(e) => debug!(error = %e, "Logout with undecodable token"),
        }
    }
}

fn token_failure_reason(err: &AuthError) -> &'static str {
    match err {
        AuthError::TokenExpired => "token_expired",
        AuthError::WrongPurpose { .. } => "wrong_token_purpose",
        e if e.is_token_rejection() => "invalid_token",
        _ => "token_verification_error",
    }
}
