use color_eyre::Result;

use super::models::{CodingProblem, CodingProblemSummary, CodingTopic};
use super::Db;

impl Db {
    pub async fn coding_topics(&self) -> Result<Vec<CodingTopic>> {
        let topics = sqlx::query_as::<_, CodingTopic>(
            "SELECT id, name, description, created_at FROM coding_topics ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(topics)
    }

    /// Problem summaries of a coding topic ordered by serial number.
    /// An unknown topic simply has no problems.
    pub async fn coding_problems(&self, coding_topic_id: i64) -> Result<Vec<CodingProblemSummary>> {
        let problems = sqlx::query_as::<_, CodingProblemSummary>(
            "SELECT id, title, created_at FROM coding_problems WHERE topic_id = ? ORDER BY sno",
        )
        .bind(coding_topic_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(problems)
    }

    pub async fn coding_problem(&self, problem_id: i64) -> Result<Option<CodingProblem>> {
        let problem = sqlx::query_as::<_, CodingProblem>(
            r#"
            SELECT
              p.id AS id,
              t.name AS topic,
              p.sno AS sno,
              p.title AS title,
              p.explanation AS explanation,
              p.code_snippet AS code_snippet,
              p.video_url AS video_url,
              p.created_at AS created_at
            FROM coding_problems p
            JOIN coding_topics t ON t.id = p.topic_id
            WHERE p.id = ?
            "#,
        )
        .bind(problem_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(problem)
    }
}
