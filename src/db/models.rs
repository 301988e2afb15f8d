// Database model structs

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::types::Json;

#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
    pub display_name: String,
}

/// Per-user reward state. Doubles as the reward ledger row.
#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
pub struct Profile {
    pub user_id: i64,
    pub xp: i64,
    pub level: i64,
    pub coins: i64,
    pub unlocked_level: i64,
    pub avatar: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
pub struct Level {
    pub id: i64,
    pub number: i64,
    pub title: String,
    pub description: String,
    pub xp_reward: i64,
    pub coin_reward: i64,
    pub required_topics: i64,
}

impl Level {
    /// Whether `completed_topics` finished topics satisfy this level's threshold.
    pub fn is_completed_with(&self, completed_topics: i64) -> bool {
        completed_topics >= self.required_topics
    }
}

#[derive(Serialize, sqlx::FromRow)]
pub struct LevelSummary {
    pub id: i64,
    pub number: i64,
    pub title: String,
    pub description: String,
    pub topics_count: i64,
}

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct Topic {
    pub id: i64,
    pub level_id: i64,
    pub title: String,
    pub explanation: String,
    pub video_url: Option<String>,
    pub order: i64,
}

#[derive(Serialize, sqlx::FromRow)]
pub struct TopicSummary {
    pub id: i64,
    pub title: String,
    pub explanation: String,
    pub video_url: Option<String>,
    pub order: i64,
    pub questions_count: i64,
}

/// A question including its answer key. Never serialized to clients.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Question {
    pub id: i64,
    pub topic_id: i64,
    pub question_type: String,
    pub question_text: String,
    pub options: Option<Json<serde_json::Value>>,
    pub correct_answer: String,
}

#[derive(Serialize, sqlx::FromRow)]
pub struct PublicQuestion {
    pub id: i64,
    pub question_type: String,
    pub question_text: String,
    pub options: Option<Json<serde_json::Value>>,
}

#[derive(Clone, Debug, PartialEq, sqlx::FromRow)]
pub struct ProgressRecord {
    pub user_id: i64,
    pub topic_id: i64,
    pub completed: bool,
    pub correct_answers: i64,
    pub total_questions: i64,
    pub date_completed: Option<DateTime<Utc>>,
}

#[derive(Serialize, sqlx::FromRow)]
pub struct TopicProgress {
    pub level_id: i64,
    pub level_number: i64,
    pub level_title: String,
    pub topic_id: i64,
    pub topic_title: String,
    pub completed: bool,
    pub correct_answers: i64,
    pub total_questions: i64,
    pub date_completed: Option<DateTime<Utc>>,
}

#[derive(sqlx::FromRow)]
pub struct LevelStatusRow {
    pub id: i64,
    pub number: i64,
    pub title: String,
    pub completed: bool,
    pub previous_completed: bool,
}

#[derive(Serialize, sqlx::FromRow)]
pub struct CodingTopic {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, sqlx::FromRow)]
pub struct CodingProblemSummary {
    pub id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, sqlx::FromRow)]
pub struct CodingProblem {
    pub id: i64,
    pub topic: String,
    pub sno: i64,
    pub title: String,
    pub explanation: String,
    pub code_snippet: Option<String>,
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, sqlx::FromRow)]
pub struct JobSummary {
    pub id: i64,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub experience_level: String,
    pub posted_on: NaiveDate,
    pub last_date: Option<NaiveDate>,
}

#[derive(Serialize, sqlx::FromRow)]
pub struct JobNotification {
    pub id: i64,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub experience_level: String,
    pub posted_on: NaiveDate,
    pub last_date: Option<NaiveDate>,
    pub description: String,
    pub requirements: String,
    pub apply_link: Option<String>,
    pub is_active: bool,
}
