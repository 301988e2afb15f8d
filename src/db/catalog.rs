use chrono::Utc;
use color_eyre::Result;
use sqlx::types::Json;

use super::models::{Level, LevelSummary, PublicQuestion, Question, Topic, TopicSummary};
use super::Db;
use crate::models::Curriculum;

impl Db {
    pub async fn levels(&self) -> Result<Vec<LevelSummary>> {
        let levels = sqlx::query_as::<_, LevelSummary>(
            r#"
            SELECT
              l.id AS id,
              l.number AS number,
              l.title AS title,
              l.description AS description,
              (SELECT COUNT(*) FROM topics t WHERE t.level_id = l.id) AS topics_count
            FROM levels l
            ORDER BY l.number
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(levels)
    }

    pub async fn level(&self, level_id: i64) -> Result<Option<Level>> {
        let level = sqlx::query_as::<_, Level>(
            r#"
            SELECT id, number, title, description, xp_reward, coin_reward, required_topics
            FROM levels WHERE id = ?
            "#,
        )
        .bind(level_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(level)
    }

    pub async fn topics_for_level(&self, level_id: i64) -> Result<Vec<TopicSummary>> {
        let topics = sqlx::query_as::<_, TopicSummary>(
            r#"
            SELECT
              t.id AS id,
              t.title AS title,
              t.explanation AS explanation,
              t.video_url AS video_url,
              t."order" AS "order",
              (SELECT COUNT(*) FROM questions q WHERE q.topic_id = t.id) AS questions_count
            FROM topics t
            WHERE t.level_id = ?
            ORDER BY t."order", t.id
            "#,
        )
        .bind(level_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(topics)
    }

    pub async fn topic(&self, topic_id: i64) -> Result<Option<Topic>> {
        let topic = sqlx::query_as::<_, Topic>(
            r#"
            SELECT id, level_id, title, explanation, video_url, "order"
            FROM topics WHERE id = ?
            "#,
        )
        .bind(topic_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(topic)
    }

    /// Questions of a topic including their answer keys, for grading.
    pub async fn questions_for_topic(&self, topic_id: i64) -> Result<Vec<Question>> {
        let questions = sqlx::query_as::<_, Question>(
            r#"
            SELECT id, topic_id, question_type, question_text, options, correct_answer
            FROM questions
            WHERE topic_id = ?
            ORDER BY id
            "#,
        )
        .bind(topic_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(questions)
    }

    pub async fn public_questions_for_topic(&self, topic_id: i64) -> Result<Vec<PublicQuestion>> {
        let questions = sqlx::query_as::<_, PublicQuestion>(
            r#"
            SELECT id, question_type, question_text, options
            FROM questions WHERE topic_id = ? ORDER BY id
            "#,
        )
        .bind(topic_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(questions)
    }

    /// Insert every level, coding topic and job of the bundle in one transaction.
    /// Levels and coding topics are matched by their unique number / name so a
    /// bundle can be re-imported to append content.
    pub async fn load_curriculum(&self, curriculum: Curriculum) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let mut question_count = 0usize;
        for level in &curriculum.levels {
            let level_id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO levels
                  (number, title, description, xp_reward, coin_reward, required_topics)
                VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT(number) DO UPDATE SET
                  title = excluded.title,
                  description = excluded.description,
                  xp_reward = excluded.xp_reward,
                  coin_reward = excluded.coin_reward,
                  required_topics = excluded.required_topics
                RETURNING id
                "#,
            )
            .bind(level.number)
            .bind(&level.title)
            .bind(&level.description)
            .bind(level.xp_reward)
            .bind(level.coin_reward)
            .bind(level.required_topics)
            .fetch_one(&mut *tx)
            .await?;

            for topic in &level.topics {
                let topic_id: i64 = sqlx::query_scalar(
                    r#"
                    INSERT INTO topics (level_id, title, explanation, video_url, "order")
                    VALUES (?, ?, ?, ?, ?) RETURNING id
                    "#,
                )
                .bind(level_id)
                .bind(&topic.title)
                .bind(&topic.explanation)
                .bind(&topic.video_url)
                .bind(topic.order)
                .fetch_one(&mut *tx)
                .await?;

                for question in &topic.questions {
                    sqlx::query(
                        r#"
                        INSERT INTO questions
                          (topic_id, question_type, question_text, options, correct_answer)
                        VALUES (?, ?, ?, ?, ?)
                        "#,
                    )
                    .bind(topic_id)
                    .bind(question.question_type.as_str())
                    .bind(&question.question_text)
                    .bind(question.options.as_ref().map(Json))
                    .bind(&question.correct_answer)
                    .execute(&mut *tx)
                    .await?;
                    question_count += 1;
                }
            }
        }

        for coding_topic in &curriculum.coding_topics {
            let topic_id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO coding_topics (name, description) VALUES (?, ?)
                ON CONFLICT(name) DO UPDATE SET description = excluded.description
                RETURNING id
                "#,
            )
            .bind(&coding_topic.name)
            .bind(&coding_topic.description)
            .fetch_one(&mut *tx)
            .await?;

            for problem in &coding_topic.problems {
                sqlx::query(
                    r#"
                    INSERT INTO coding_problems
                      (topic_id, sno, title, explanation, code_snippet, video_url)
                    VALUES (?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(topic_id)
                .bind(problem.sno)
                .bind(&problem.title)
                .bind(&problem.explanation)
                .bind(&problem.code_snippet)
                .bind(&problem.video_url)
                .execute(&mut *tx)
                .await?;
            }
        }

        let today = Utc::now().date_naive();
        for job in &curriculum.jobs {
            sqlx::query(
                r#"
                INSERT INTO job_notifications
                  (title, company, location, experience_level, posted_on, last_date,
                   description, requirements, apply_link, is_active)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&job.title)
            .bind(&job.company)
            .bind(&job.location)
            .bind(job.experience_level.as_str())
            .bind(job.posted_on.unwrap_or(today))
            .bind(job.last_date)
            .bind(&job.description)
            .bind(&job.requirements)
            .bind(&job.apply_link)
            .bind(job.is_active)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            levels = curriculum.levels.len(),
            questions = question_count,
            coding_topics = curriculum.coding_topics.len(),
            jobs = curriculum.jobs.len(),
            "curriculum loaded"
        );
        Ok(())
    }
}
