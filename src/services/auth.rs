use chrono::{DateTime, Utc};
use color_eyre::Result;

use crate::db::models::{AuthUser, Profile};
use crate::db::Db;
use crate::google::GoogleTokenInfo;
use crate::services::tokens::{TokenIssuer, TokenKind, TokenPair};

// ---------------------------------------------------------------------------
// AuthRepository trait (DIP: service defines the abstraction it needs)
// ---------------------------------------------------------------------------

#[cfg_attr(test, mockall::automock)]
pub trait AuthRepository: Send + Sync {
    fn email_exists(&self, email: &str) -> impl std::future::Future<Output = Result<bool>> + Send;

    fn create_user(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> impl std::future::Future<Output = Result<i64>> + Send;

    fn verify_user_password(
        &self,
        email: &str,
        password: &str,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;

    fn find_user_by_email(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Option<AuthUser>>> + Send;

    fn find_or_create_user(
        &self,
        email: &str,
        display_name: &str,
    ) -> impl std::future::Future<Output = Result<(AuthUser, bool)>> + Send;

    fn get_user(
        &self,
        user_id: i64,
    ) -> impl std::future::Future<Output = Result<Option<AuthUser>>> + Send;

    fn get_or_create_profile(
        &self,
        user_id: i64,
    ) -> impl std::future::Future<Output = Result<Profile>> + Send;

    fn ensure_profile_with_avatar(
        &self,
        user_id: i64,
        avatar: Option<String>,
    ) -> impl std::future::Future<Output = Result<Profile>> + Send;

    fn change_password(
        &self,
        user_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;

    fn revoke_token(
        &self,
        jti: &str,
        expires_at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;

    fn is_token_revoked(&self, jti: &str)
        -> impl std::future::Future<Output = Result<bool>> + Send;
}

impl AuthRepository for Db {
    async fn email_exists(&self, email: &str) -> Result<bool> {
        Db::email_exists(self, email).await
    }

    async fn create_user(&self, email: &str, password: &str, display_name: &str) -> Result<i64> {
        Db::create_user(self, email, password, display_name).await
    }

    async fn verify_user_password(&self, email: &str, password: &str) -> Result<bool> {
        Db::verify_user_password(self, email, password).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>> {
        Db::find_user_by_email(self, email).await
    }

    async fn find_or_create_user(
        &self,
        email: &str,
        display_name: &str,
    ) -> Result<(AuthUser, bool)> {
        Db::find_or_create_user(self, email, display_name).await
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<AuthUser>> {
        Db::get_user(self, user_id).await
    }

    async fn get_or_create_profile(&self, user_id: i64) -> Result<Profile> {
        Db::get_or_create_profile(self, user_id).await
    }

    async fn ensure_profile_with_avatar(
        &self,
        user_id: i64,
        avatar: Option<String>,
    ) -> Result<Profile> {
        Db::ensure_profile_with_avatar(self, user_id, avatar.as_deref()).await
    }

    async fn change_password(
        &self,
        user_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> Result<bool> {
        Db::change_password(self, user_id, current_password, new_password).await
    }

    async fn revoke_token(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<bool> {
        Db::revoke_token(self, jti, expires_at).await
    }

    async fn is_token_revoked(&self, jti: &str) -> Result<bool> {
        Db::is_token_revoked(self, jti).await
    }
}

// ---------------------------------------------------------------------------
// IdentityVerifier trait (DIP: service defines the abstraction it needs)
// ---------------------------------------------------------------------------

/// Identity asserted by a verified third-party ID token.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalIdentity {
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
pub trait IdentityVerifier: Send + Sync {
    /// `Ok(None)` means the token was checked and rejected.
    fn verify(
        &self,
        id_token: &str,
    ) -> impl std::future::Future<Output = Result<Option<ExternalIdentity>>> + Send;
}

// ---------------------------------------------------------------------------
// Outcome enums
// ---------------------------------------------------------------------------

/// Tokens plus the user summary returned by every successful sign-in.
#[derive(Debug)]
pub struct AuthSession {
    pub tokens: TokenPair,
    pub user: AuthUser,
    pub profile: Profile,
}

#[derive(Debug)]
pub enum RegisterOutcome {
    Registered(AuthSession),
    /// Required fields were empty.
    EmptyFields,
    /// Email already in use.
    EmailTaken,
    /// Password does not meet the policy. Carries the reason.
    WeakPassword(&'static str),
}

#[derive(Debug)]
pub enum LoginOutcome {
    Success(AuthSession),
    EmptyFields,
    /// Password was incorrect (or email not found).
    InvalidCredentials,
}

#[derive(Debug)]
pub enum GoogleLoginOutcome {
    Success(AuthSession),
    EmptyToken,
    InvalidToken,
}

#[derive(Debug)]
pub enum RefreshOutcome {
    Refreshed(TokenPair),
    EmptyToken,
    InvalidToken,
}

#[derive(Debug)]
pub enum LogoutOutcome {
    LoggedOut,
    EmptyToken,
    InvalidToken,
}

#[derive(Debug)]
pub enum ChangePasswordOutcome {
    Success,
    EmptyFields,
    WeakPassword(&'static str),
    IncorrectPassword,
}

const MIN_PASSWORD_LENGTH: usize = 8;

/// Reason a password is rejected, if any.
pub fn password_problem(password: &str) -> Option<&'static str> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Some("This password is too short. It must contain at least 8 characters.");
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        return Some("This password is entirely numeric.");
    }
    None
}

// ---------------------------------------------------------------------------
// AuthService
// ---------------------------------------------------------------------------

pub struct AuthService<R: AuthRepository = Db, V: IdentityVerifier = GoogleTokenInfo> {
    repo: R,
    verifier: V,
    tokens: TokenIssuer,
}

impl<R: AuthRepository + Clone, V: IdentityVerifier + Clone> Clone for AuthService<R, V> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            verifier: self.verifier.clone(),
            tokens: self.tokens.clone(),
        }
    }
}

impl<R: AuthRepository, V: IdentityVerifier> AuthService<R, V> {
    pub fn new(repo: R, verifier: V, tokens: TokenIssuer) -> Self {
        Self {
            repo,
            verifier,
            tokens,
        }
    }

    fn start_session(&self, user: AuthUser, profile: Profile) -> Result<AuthSession> {
        let tokens = self.tokens.issue_pair(user.id)?;
        Ok(AuthSession {
            tokens,
            user,
            profile,
        })
    }

    pub async fn register(
        &self,
        display_name: &str,
        email: &str,
        password: &str,
    ) -> Result<RegisterOutcome> {
        if email.is_empty() || password.is_empty() || display_name.is_empty() {
            return Ok(RegisterOutcome::EmptyFields);
        }

        if self.repo.email_exists(email).await? {
            return Ok(RegisterOutcome::EmailTaken);
        }

        if let Some(reason) = password_problem(password) {
            return Ok(RegisterOutcome::WeakPassword(reason));
        }

        let user_id = self.repo.create_user(email, password, display_name).await?;
        let profile = self.repo.get_or_create_profile(user_id).await?;
        let user = AuthUser {
            id: user_id,
            email: email.to_string(),
            display_name: display_name.to_string(),
        };

        tracing::info!("new user registered: {email}");
        Ok(RegisterOutcome::Registered(
            self.start_session(user, profile)?,
        ))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome> {
        if email.is_empty() || password.is_empty() {
            return Ok(LoginOutcome::EmptyFields);
        }

        if !self.repo.verify_user_password(email, password).await? {
            tracing::warn!("failed login attempt for {email}");
            return Ok(LoginOutcome::InvalidCredentials);
        }

        let user =
            self.repo.find_user_by_email(email).await?.ok_or_else(|| {
                color_eyre::eyre::eyre!("user not found after password verification")
            })?;

        let profile = self.repo.get_or_create_profile(user.id).await?;

        tracing::info!("user logged in: {email}");
        Ok(LoginOutcome::Success(self.start_session(user, profile)?))
    }

    pub async fn google_login(&self, id_token: &str) -> Result<GoogleLoginOutcome> {
        if id_token.is_empty() {
            return Ok(GoogleLoginOutcome::EmptyToken);
        }

        let Some(identity) = self.verifier.verify(id_token).await? else {
            return Ok(GoogleLoginOutcome::InvalidToken);
        };

        let (user, created) = self
            .repo
            .find_or_create_user(&identity.email, &identity.name)
            .await?;
        if created {
            tracing::info!("created new google account for {}", identity.email);
        }

        let profile = self
            .repo
            .ensure_profile_with_avatar(user.id, identity.picture)
            .await?;

        Ok(GoogleLoginOutcome::Success(
            self.start_session(user, profile)?,
        ))
    }

    /// Exchange a refresh token for a new pair. The presented token is revoked.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshOutcome> {
        if refresh_token.is_empty() {
            return Ok(RefreshOutcome::EmptyToken);
        }

        let claims = match self.tokens.decode(refresh_token, TokenKind::Refresh) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::warn!("invalid refresh token: {e}");
                return Ok(RefreshOutcome::InvalidToken);
            }
        };

        if self.repo.is_token_revoked(&claims.jti).await? {
            tracing::warn!("revoked refresh token presented for user_id={}", claims.sub);
            return Ok(RefreshOutcome::InvalidToken);
        }

        if self.repo.get_user(claims.sub).await?.is_none() {
            return Ok(RefreshOutcome::InvalidToken);
        }

        // A concurrent refresh with the same token loses here.
        if !self.repo.revoke_token(&claims.jti, claims.expires_at()).await? {
            return Ok(RefreshOutcome::InvalidToken);
        }

        Ok(RefreshOutcome::Refreshed(self.tokens.issue_pair(claims.sub)?))
    }

    pub async fn logout(&self, user_id: i64, refresh_token: &str) -> Result<LogoutOutcome> {
        if refresh_token.is_empty() {
            return Ok(LogoutOutcome::EmptyToken);
        }

        let claims = match self.tokens.decode(refresh_token, TokenKind::Refresh) {
            Ok(claims) if claims.sub == user_id => claims,
            Ok(_) => {
                tracing::warn!("user_id={user_id} tried to revoke another user's token");
                return Ok(LogoutOutcome::InvalidToken);
            }
            Err(e) => {
                tracing::warn!("invalid refresh token on logout: {e}");
                return Ok(LogoutOutcome::InvalidToken);
            }
        };

        self.repo.revoke_token(&claims.jti, claims.expires_at()).await?;
        Ok(LogoutOutcome::LoggedOut)
    }

    /// Resolve a bearer access token to its user.
    pub async fn authenticate(&self, access_token: &str) -> Result<Option<AuthUser>> {
        let claims = match self.tokens.decode(access_token, TokenKind::Access) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!("rejected access token: {e}");
                return Ok(None);
            }
        };

        self.repo.get_user(claims.sub).await
    }

    pub async fn profile(&self, user_id: i64) -> Result<Profile> {
        self.repo.get_or_create_profile(user_id).await
    }

    pub async fn change_password(
        &self,
        user_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> Result<ChangePasswordOutcome> {
        if current_password.is_empty() || new_password.is_empty() {
            return Ok(ChangePasswordOutcome::EmptyFields);
        }

        if let Some(reason) = password_problem(new_password) {
            return Ok(ChangePasswordOutcome::WeakPassword(reason));
        }

        let changed = self
            .repo
            .change_password(user_id, current_password, new_password)
            .await?;

        if changed {
            Ok(ChangePasswordOutcome::Success)
        } else {
            Ok(ChangePasswordOutcome::IncorrectPassword)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
