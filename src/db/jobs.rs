use color_eyre::Result;

use super::models::{JobNotification, JobSummary};
use super::Db;

impl Db {
    /// Active job notifications, newest first.
    pub async fn active_jobs(&self) -> Result<Vec<JobSummary>> {
        let jobs = sqlx::query_as::<_, JobSummary>(
            r#"
            SELECT id, title, company, location, experience_level, posted_on, last_date
            FROM job_notifications
            WHERE is_active = 1
            ORDER BY posted_on DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(jobs)
    }

    /// A single job notification. Inactive postings are treated as missing.
    pub async fn active_job(&self, job_id: i64) -> Result<Option<JobNotification>> {
        let job = sqlx::query_as::<_, JobNotification>(
            r#"
            SELECT id, title, company, location, experience_level, posted_on, last_date,
                   description, requirements, apply_link, is_active
            FROM job_notifications
            WHERE id = ? AND is_active = 1
            "#,
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(job)
    }
}
