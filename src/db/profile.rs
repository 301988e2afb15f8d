use color_eyre::Result;
use sqlx::SqliteConnection;

use super::models::Profile;
use super::Db;

/// Fetch the user's profile, inserting one with the signup defaults
/// (xp 10, level 1, coins 5, unlocked level 1) when it does not exist yet.
pub(super) async fn get_or_create_profile(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Profile> {
    let inserted =
        sqlx::query("INSERT INTO profiles (user_id) VALUES (?) ON CONFLICT(user_id) DO NOTHING")
            .bind(user_id)
            .execute(&mut *conn)
            .await?
            .rows_affected();

    if inserted > 0 {
        tracing::info!("profile created for user_id={user_id}");
    }

    let profile = sqlx::query_as::<_, Profile>(
        "SELECT user_id, xp, level, coins, unlocked_level, avatar FROM profiles WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(profile)
}

impl Db {
    pub async fn get_or_create_profile(&self, user_id: i64) -> Result<Profile> {
        let mut conn = self.pool.acquire().await?;
        get_or_create_profile(&mut conn, user_id).await
    }

    /// Create the profile if needed and set its avatar when it was just created
    /// or has none yet. Returns the resulting profile.
    pub async fn ensure_profile_with_avatar(
        &self,
        user_id: i64,
        avatar: Option<&str>,
    ) -> Result<Profile> {
        let mut tx = self.pool.begin().await?;

        let mut profile = get_or_create_profile(&mut tx, user_id).await?;
        if profile.avatar.is_none() && avatar.is_some() {
            sqlx::query("UPDATE profiles SET avatar = ? WHERE user_id = ?")
                .bind(avatar)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
            profile.avatar = avatar.map(str::to_string);
        }

        tx.commit().await?;
        Ok(profile)
    }
}
