use chrono::{DateTime, Utc};
use color_eyre::Result;
use sqlx::{Sqlite, SqliteConnection, Transaction};

use super::models::{Level, LevelStatusRow, ProgressRecord, TopicProgress};
use super::profile::get_or_create_profile;
use super::Db;
use crate::services::progression::{
    self, Answers, ProgressionStore, RewardLedger, SubmissionOutcome,
};

/// A submission's unit of work. Dropping it without [`commit`](Self::commit)
/// rolls everything back.
pub(super) struct SqliteProgressStore {
    tx: Transaction<'static, Sqlite>,
}

impl SqliteProgressStore {
    async fn begin(db: &Db) -> Result<Self> {
        Ok(Self {
            tx: db.pool.begin().await?,
        })
    }

    async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

async fn completed_topics_in_level(
    conn: &mut SqliteConnection,
    user_id: i64,
    level_id: i64,
) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM user_progress p
        JOIN topics t ON t.id = p.topic_id
        WHERE p.user_id = ? AND t.level_id = ? AND p.completed = 1
        "#,
    )
    .bind(user_id)
    .bind(level_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(count)
}

const LEVEL_COLUMNS: &str =
    "id, number, title, description, xp_reward, coin_reward, required_topics";

impl ProgressionStore for SqliteProgressStore {
    async fn record_scores(
        &mut self,
        user_id: i64,
        topic_id: i64,
        correct: i64,
        total: i64,
    ) -> Result<ProgressRecord> {
        // The upsert is the transaction's first statement, so the write lock is
        // held before `completed` is observed.
        let record = sqlx::query_as::<_, ProgressRecord>(
            r#"
            INSERT INTO user_progress (user_id, topic_id, correct_answers, total_questions)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(user_id, topic_id) DO UPDATE SET
              correct_answers = excluded.correct_answers,
              total_questions = excluded.total_questions
            RETURNING user_id, topic_id, completed, correct_answers, total_questions, date_completed
            "#,
        )
        .bind(user_id)
        .bind(topic_id)
        .bind(correct)
        .bind(total)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(record)
    }

    async fn mark_completed(
        &mut self,
        user_id: i64,
        topic_id: i64,
        at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE user_progress SET completed = 1, date_completed = ?
            WHERE user_id = ? AND topic_id = ? AND completed = 0
            "#,
        )
        .bind(at)
        .bind(user_id)
        .bind(topic_id)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn load_ledger(&mut self, user_id: i64) -> Result<RewardLedger> {
        let profile = get_or_create_profile(&mut self.tx, user_id).await?;
        Ok(RewardLedger::from(&profile))
    }

    async fn save_ledger(&mut self, user_id: i64, ledger: RewardLedger) -> Result<()> {
        sqlx::query(
            "UPDATE profiles SET xp = ?, level = ?, coins = ?, unlocked_level = ? \
             WHERE user_id = ?",
        )
        .bind(ledger.xp)
        .bind(ledger.level)
        .bind(ledger.coins)
        .bind(ledger.unlocked_level)
        .bind(user_id)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn level(&mut self, level_id: i64) -> Result<Option<Level>> {
        let sql = format!("SELECT {LEVEL_COLUMNS} FROM levels WHERE id = ?");
        let level = sqlx::query_as::<_, Level>(&sql)
            .bind(level_id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(level)
    }

    async fn level_by_number(&mut self, number: i64) -> Result<Option<Level>> {
        let sql = format!("SELECT {LEVEL_COLUMNS} FROM levels WHERE number = ?");
        let level = sqlx::query_as::<_, Level>(&sql)
            .bind(number)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(level)
    }

    async fn completed_topics_in_level(&mut self, user_id: i64, level_id: i64) -> Result<i64> {
        completed_topics_in_level(&mut self.tx, user_id, level_id).await
    }

    async fn insert_level_completion(&mut self, user_id: i64, level_id: i64) -> Result<bool> {
        let inserted = sqlx::query(
            "INSERT INTO level_completions (user_id, level_id) VALUES (?, ?) \
             ON CONFLICT(user_id, level_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(level_id)
        .execute(&mut *self.tx)
        .await?
        .rows_affected();

        if inserted == 0 {
            tracing::debug!(
                "level completion for user_id={user_id} level_id={level_id} already recorded"
            );
        }
        Ok(inserted > 0)
    }
}

impl Db {
    /// Grade and apply a submission in a single transaction.
    /// Returns `None` when the topic does not exist.
    pub async fn submit_answers(
        &self,
        user_id: i64,
        topic_id: i64,
        answers: &Answers,
    ) -> Result<Option<SubmissionOutcome>> {
        let Some(topic) = self.topic(topic_id).await? else {
            return Ok(None);
        };
        let questions = self.questions_for_topic(topic_id).await?;

        let mut store = SqliteProgressStore::begin(self).await?;
        let outcome = progression::submit(&mut store, user_id, &topic, &questions, answers).await?;
        store.commit().await?;

        Ok(Some(outcome))
    }

    pub async fn progress_record(
        &self,
        user_id: i64,
        topic_id: i64,
    ) -> Result<Option<ProgressRecord>> {
        let record = sqlx::query_as::<_, ProgressRecord>(
            r#"
            SELECT user_id, topic_id, completed, correct_answers, total_questions, date_completed
            FROM user_progress
            WHERE user_id = ? AND topic_id = ?
            "#,
        )
        .bind(user_id)
        .bind(topic_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Whether the user has completed enough topics of the level.
    pub async fn is_level_completed_by(&self, level: &Level, user_id: i64) -> Result<bool> {
        let mut conn = self.pool.acquire().await?;
        let completed = completed_topics_in_level(&mut conn, user_id, level.id).await?;
        Ok(level.is_completed_with(completed))
    }

    pub async fn level_completion_count(&self, user_id: i64, level_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM level_completions WHERE user_id = ? AND level_id = ?",
        )
        .bind(user_id)
        .bind(level_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    pub async fn user_progress(&self, user_id: i64) -> Result<Vec<TopicProgress>> {
        let progress = sqlx::query_as::<_, TopicProgress>(
            r#"
            SELECT
              l.id AS level_id,
              l.number AS level_number,
              l.title AS level_title,
              t.id AS topic_id,
              t.title AS topic_title,
              p.completed AS completed,
              p.correct_answers AS correct_answers,
              p.total_questions AS total_questions,
              p.date_completed AS date_completed
            FROM user_progress p
            JOIN topics t ON t.id = p.topic_id
            JOIN levels l ON l.id = t.level_id
            WHERE p.user_id = ?
            ORDER BY l.number, t."order", t.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(progress)
    }

    pub async fn level_status_rows(&self, user_id: i64) -> Result<Vec<LevelStatusRow>> {
        let rows = sqlx::query_as::<_, LevelStatusRow>(
            r#"
            SELECT
              l.id AS id,
              l.number AS number,
              l.title AS title,
              EXISTS(
                SELECT 1 FROM level_completions c
                WHERE c.level_id = l.id AND c.user_id = ?1
              ) AS completed,
              EXISTS(
                SELECT 1 FROM level_completions c
                JOIN levels prev ON prev.id = c.level_id
                WHERE prev.number = l.number - 1 AND c.user_id = ?1
              ) AS previous_completed
            FROM levels l
            ORDER BY l.number
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
