use chrono::NaiveDate;
use serde::Deserialize;

/// Content bundle accepted by [`crate::db::Db::load_curriculum`].
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Curriculum {
    pub levels: Vec<LevelSpec>,
    pub coding_topics: Vec<CodingTopicSpec>,
    pub jobs: Vec<JobSpec>,
}

#[derive(Debug, Deserialize)]
pub struct LevelSpec {
    pub number: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_xp_reward")]
    pub xp_reward: i64,
    #[serde(default = "default_coin_reward")]
    pub coin_reward: i64,
    #[serde(default = "default_required_topics")]
    pub required_topics: i64,
    #[serde(default)]
    pub topics: Vec<TopicSpec>,
}

fn default_xp_reward() -> i64 {
    50
}

fn default_coin_reward() -> i64 {
    20
}

fn default_required_topics() -> i64 {
    5
}

#[derive(Debug, Deserialize)]
pub struct TopicSpec {
    pub title: String,
    #[serde(default)]
    pub explanation: String,
    pub video_url: Option<String>,
    #[serde(default = "default_order")]
    pub order: i64,
    #[serde(default)]
    pub questions: Vec<QuestionSpec>,
}

fn default_order() -> i64 {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum QuestionKind {
    #[serde(rename = "MCQ")]
    MultipleChoice,
    #[serde(rename = "OUTPUT")]
    OutputGuess,
    #[serde(rename = "FILL")]
    FillBlank,
}

impl QuestionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionKind::MultipleChoice => "MCQ",
            QuestionKind::OutputGuess => "OUTPUT",
            QuestionKind::FillBlank => "FILL",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct QuestionSpec {
    pub question_type: QuestionKind,
    pub question_text: String,
    pub options: Option<serde_json::Value>,
    pub correct_answer: String,
}

#[derive(Debug, Deserialize)]
pub struct CodingTopicSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub problems: Vec<CodingProblemSpec>,
}

#[derive(Debug, Deserialize)]
pub struct CodingProblemSpec {
    pub sno: i64,
    pub title: String,
    #[serde(default = "default_explanation")]
    pub explanation: String,
    pub code_snippet: Option<String>,
    pub video_url: Option<String>,
}

fn default_explanation() -> String {
    " ".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExperienceLevel {
    Fresher,
    Experienced,
    #[default]
    All,
}

impl ExperienceLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ExperienceLevel::Fresher => "FRESHER",
            ExperienceLevel::Experienced => "EXPERIENCED",
            ExperienceLevel::All => "ALL",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct JobSpec {
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    #[serde(default)]
    pub experience_level: ExperienceLevel,
    /// Defaults to the import date.
    pub posted_on: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: String,
    pub apply_link: Option<String>,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

fn default_is_active() -> bool {
    true
}
