use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Utc};
use color_eyre::Result;

use super::models::AuthUser;
use super::profile::get_or_create_profile;
use super::Db;

impl Db {
    /// Create a password account together with its signup profile.
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<i64> {
        let password_hash = hash_password(password)?;
        let mut tx = self.pool.begin().await?;

        let user_id: i64 = sqlx::query_scalar(
            "INSERT INTO users (email, password_hash, display_name) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(email)
        .bind(&password_hash)
        .bind(display_name)
        .fetch_one(&mut *tx)
        .await?;

        get_or_create_profile(&mut tx, user_id).await?;

        tx.commit().await?;

        tracing::info!("new user created: id={user_id}, email={email}");
        Ok(user_id)
    }

    /// Find the user with this e-mail or create a password-less one.
    /// Returns the user and whether it was created.
    pub async fn find_or_create_user(
        &self,
        email: &str,
        display_name: &str,
    ) -> Result<(AuthUser, bool)> {
        let inserted = sqlx::query(
            "INSERT INTO users (email, display_name) VALUES (?, ?) ON CONFLICT(email) DO NOTHING",
        )
        .bind(email)
        .bind(display_name)
        .execute(&self.pool)
        .await?
        .rows_affected();

        let user = sqlx::query_as::<_, AuthUser>(
            "SELECT id, email, display_name FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        let created = inserted > 0;
        if created {
            tracing::info!("new external user created: id={}, email={email}", user.id);
        }
        Ok((user, created))
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>> {
        let user = sqlx::query_as::<_, AuthUser>(
            "SELECT id, email, display_name FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn get_user(&self, user_id: i64) -> Result<Option<AuthUser>> {
        let user = sqlx::query_as::<_, AuthUser>(
            "SELECT id, email, display_name FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Accounts created through Google have no password and never verify.
    pub async fn verify_user_password(&self, email: &str, password: &str) -> Result<bool> {
        let stored_hash: Option<Option<String>> =
            sqlx::query_scalar("SELECT password_hash FROM users WHERE email = ?")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;

        match stored_hash.flatten() {
            Some(hash) => Ok(verify_password(password, &hash)),
            None => Ok(false),
        }
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = ?)")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    /// Change password for an authenticated user. Verifies current password first.
    pub async fn change_password(
        &self,
        user_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> Result<bool> {
        let stored_hash: Option<Option<String>> =
            sqlx::query_scalar("SELECT password_hash FROM users WHERE id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        let Some(stored_hash) = stored_hash.flatten() else {
            return Ok(false);
        };

        if !verify_password(current_password, &stored_hash) {
            return Ok(false);
        }

        let new_hash = hash_password(new_password)?;
        sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(&new_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        tracing::info!("password changed for user_id={user_id}");
        Ok(true)
    }

    /// Record a refresh token id as unusable. Returns `false` if it already was.
    pub async fn revoke_token(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<bool> {
        let inserted = sqlx::query(
            "INSERT INTO revoked_tokens (jti, expires_at) VALUES (?, ?) \
             ON CONFLICT(jti) DO NOTHING",
        )
        .bind(jti)
        .bind(expires_at)
        .execute(&self.pool)
        .await?
        .rows_affected();

        // Expired entries can never be presented again.
        sqlx::query("DELETE FROM revoked_tokens WHERE expires_at < ?")
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(inserted > 0)
    }

    pub async fn is_token_revoked(&self, jti: &str) -> Result<bool> {
        let revoked: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE jti = ?)")
                .bind(jti)
                .fetch_one(&self.pool)
                .await?;

        Ok(revoked)
    }
}

/// Run argon2 hashing on a dedicated thread with a large stack to avoid
/// stack overflow in debug builds.
fn hash_password(password: &str) -> Result<String> {
    let password = password.to_string();
    std::thread::Builder::new()
        .stack_size(4 * 1024 * 1024) // 4 MB stack
        .spawn(move || {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::default()
                .hash_password(password.as_bytes(), &salt)
                .map(|h| h.to_string())
                .map_err(|e| color_eyre::eyre::eyre!("failed to hash password: {e}"))
        })?
        .join()
        .map_err(|_| color_eyre::eyre::eyre!("hash thread panicked"))?
}

fn verify_password(password: &str, hash: &str) -> bool {
    let password = password.to_string();
    let hash = hash.to_string();
    std::thread::Builder::new()
        .stack_size(4 * 1024 * 1024)
        .spawn(move || {
            let Ok(parsed_hash) = PasswordHash::new(&hash) else {
                return false;
            };
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok()
        })
        .map(|h| h.join().unwrap_or(false))
        .unwrap_or(false)
}
