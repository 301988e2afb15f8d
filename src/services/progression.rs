use std::collections::HashMap;

use chrono::{DateTime, Utc};
use color_eyre::{eyre::OptionExt, Result};
use serde::Serialize;

use crate::db::models::{Level, LevelStatusRow, Profile, ProgressRecord, Question, Topic};
use crate::names;

// ---------------------------------------------------------------------------
// Submitted answers
// ---------------------------------------------------------------------------

/// Answers keyed by question id as sent by the client.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Answers(HashMap<String, String>);

impl Answers {
    /// Build answers from a submission body of the form `{"answers": {"<id>": "<answer>"}}`.
    ///
    /// Anything that is not such a mapping yields no answers at all, so every
    /// question is graded as incorrect. Non-string values are stringified.
    pub fn from_payload(payload: &serde_json::Value) -> Self {
        let Some(map) = payload.get("answers").and_then(|a| a.as_object()) else {
            return Self::default();
        };

        let answers = map
            .iter()
            .map(|(id, value)| {
                let value = match value {
                    serde_json::Value::String(s) => s.clone(),
                    serde_json::Value::Null => String::new(),
                    other => other.to_string(),
                };
                (id.clone(), value)
            })
            .collect();

        Self(answers)
    }

    pub fn get(&self, question_id: i64) -> &str {
        self.0
            .get(&question_id.to_string())
            .map(String::as_str)
            .unwrap_or("")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Answers {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// ---------------------------------------------------------------------------
// Quiz grader
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grade {
    pub correct: i64,
    pub total: i64,
}

impl Grade {
    /// An empty topic counts as a full score.
    pub fn is_full_score(&self) -> bool {
        self.correct == self.total
    }
}

fn normalize(answer: &str) -> String {
    answer.trim().to_lowercase()
}

/// Grade every question of a topic. Missing answers count as incorrect.
pub fn grade(questions: &[Question], answers: &Answers) -> Grade {
    let correct = questions
        .iter()
        .filter(|q| normalize(answers.get(q.id)) == normalize(&q.correct_answer))
        .count();

    Grade {
        correct: correct as i64,
        total: questions.len() as i64,
    }
}

// ---------------------------------------------------------------------------
// Reward ledger
// ---------------------------------------------------------------------------

/// Per-user reward state mutated in memory during a submission and persisted once.
///
/// `level` advances with XP while `unlocked_level` only moves when a curriculum
/// level is completed. The two are independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RewardLedger {
    pub xp: i64,
    pub level: i64,
    pub coins: i64,
    pub unlocked_level: i64,
}

impl Default for RewardLedger {
    fn default() -> Self {
        Self {
            xp: names::SIGNUP_XP,
            level: names::SIGNUP_LEVEL,
            coins: names::SIGNUP_COINS,
            unlocked_level: names::SIGNUP_UNLOCKED_LEVEL,
        }
    }
}

impl From<&Profile> for RewardLedger {
    fn from(profile: &Profile) -> Self {
        Self {
            xp: profile.xp,
            level: profile.level,
            coins: profile.coins,
            unlocked_level: profile.unlocked_level,
        }
    }
}

impl RewardLedger {
    /// Add XP and step the level up once for every threshold crossed.
    /// Negative amounts are ignored and totals saturate at `i64::MAX`.
    pub fn add_xp(&mut self, amount: i64) {
        self.xp = self.xp.saturating_add(amount.max(0));
        // Level N advances while xp >= N * XP_PER_LEVEL, so it settles on
        // xp / XP_PER_LEVEL + 1 unless it is already higher.
        let earned = (self.xp / names::XP_PER_LEVEL).saturating_add(1);
        self.level = self.level.max(earned);
    }

    pub fn add_coins(&mut self, amount: i64) {
        self.coins = self.coins.saturating_add(amount.max(0));
    }

    /// Raise the unlocked level high-water mark. Never lowers it.
    pub fn unlock(&mut self, level_number: i64) {
        self.unlocked_level = self.unlocked_level.max(level_number);
    }
}

// ---------------------------------------------------------------------------
// ProgressionStore trait (unit of work the engine runs against)
// ---------------------------------------------------------------------------

/// Storage operations used by [`submit`]. An implementation represents one
/// transaction: nothing it writes may become visible unless the whole
/// submission succeeds.
pub trait ProgressionStore: Send {
    /// Fetch-or-create the progress record and overwrite its scores.
    /// Implementations must take the write lock here, before `completed` is read.
    fn record_scores(
        &mut self,
        user_id: i64,
        topic_id: i64,
        correct: i64,
        total: i64,
    ) -> impl std::future::Future<Output = Result<ProgressRecord>> + Send;

    fn mark_completed(
        &mut self,
        user_id: i64,
        topic_id: i64,
        at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Load the ledger, creating the profile with signup defaults when missing.
    fn load_ledger(
        &mut self,
        user_id: i64,
    ) -> impl std::future::Future<Output = Result<RewardLedger>> + Send;

    fn save_ledger(
        &mut self,
        user_id: i64,
        ledger: RewardLedger,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    fn level(
        &mut self,
        level_id: i64,
    ) -> impl std::future::Future<Output = Result<Option<Level>>> + Send;

    fn level_by_number(
        &mut self,
        number: i64,
    ) -> impl std::future::Future<Output = Result<Option<Level>>> + Send;

    fn completed_topics_in_level(
        &mut self,
        user_id: i64,
        level_id: i64,
    ) -> impl std::future::Future<Output = Result<i64>> + Send;

    /// Insert the (user, level) completion record.
    /// Returns `false` when it already existed.
    fn insert_level_completion(
        &mut self,
        user_id: i64,
        level_id: i64,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;
}

// ---------------------------------------------------------------------------
// Progression engine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// First full-score submission for the topic. Rewards were granted.
    Completed {
        ledger: RewardLedger,
        /// Number of the level this submission finished, if any.
        level_completed: Option<i64>,
    },
    /// Full score, but the topic had been completed before.
    AlreadyCompleted,
    /// Not every answer was correct.
    Partial { correct: i64, total: i64 },
}

impl SubmissionOutcome {
    pub fn message(&self) -> String {
        match self {
            SubmissionOutcome::Completed { .. } => {
                "All answers correct! Topic completed. XP & coins awarded.".to_string()
            }
            SubmissionOutcome::AlreadyCompleted => {
                "All answers correct! Topic was already completed. XP & coins already awarded."
                    .to_string()
            }
            SubmissionOutcome::Partial { correct, total } => {
                format!("You got {correct}/{total} correct. Try again!")
            }
        }
    }
}

/// Grade a submission and apply its consequences to progress and rewards.
pub async fn submit<S: ProgressionStore>(
    store: &mut S,
    user_id: i64,
    topic: &Topic,
    questions: &[Question],
    answers: &Answers,
) -> Result<SubmissionOutcome> {
    let grade = grade(questions, answers);

    let record = store
        .record_scores(user_id, topic.id, grade.correct, grade.total)
        .await?;

    if !grade.is_full_score() {
        tracing::info!(
            user_id,
            topic_id = topic.id,
            correct = grade.correct,
            total = grade.total,
            "partial submission"
        );
        return Ok(SubmissionOutcome::Partial {
            correct: grade.correct,
            total: grade.total,
        });
    }

    if record.completed {
        return Ok(SubmissionOutcome::AlreadyCompleted);
    }

    store.mark_completed(user_id, topic.id, Utc::now()).await?;

    let mut ledger = store.load_ledger(user_id).await?;
    ledger.add_xp(names::TOPIC_XP_REWARD);
    ledger.add_coins(names::TOPIC_COIN_REWARD);

    let level = store
        .level(topic.level_id)
        .await?
        .ok_or_eyre("topic references a missing level")?;
    let level_completed = complete_level(store, user_id, &level, &mut ledger).await?;

    store.save_ledger(user_id, ledger).await?;

    tracing::info!(
        user_id,
        topic_id = topic.id,
        xp = ledger.xp,
        coins = ledger.coins,
        level = ledger.level,
        unlocked_level = ledger.unlocked_level,
        "topic completed"
    );

    Ok(SubmissionOutcome::Completed {
        ledger,
        level_completed: level_completed.then_some(level.number),
    })
}

/// Grant the level reward and unlock the next level the first time the
/// completion threshold is met. Returns whether the level was completed now.
async fn complete_level<S: ProgressionStore>(
    store: &mut S,
    user_id: i64,
    level: &Level,
    ledger: &mut RewardLedger,
) -> Result<bool> {
    let completed_topics = store.completed_topics_in_level(user_id, level.id).await?;
    if !level.is_completed_with(completed_topics) {
        return Ok(false);
    }

    if !store.insert_level_completion(user_id, level.id).await? {
        return Ok(false);
    }

    ledger.add_xp(level.xp_reward);
    ledger.add_coins(level.coin_reward);

    if let Some(next) = store.level_by_number(level.number + 1).await? {
        ledger.unlock(next.number);
    }

    tracing::info!(user_id, level = level.number, "level completed");
    Ok(true)
}

// ---------------------------------------------------------------------------
// Level status view
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct LevelStatus {
    pub id: i64,
    pub number: i64,
    pub title: String,
    pub completed: bool,
    pub unlocked: bool,
}

/// Combine the stored unlock high-water mark with the display-only
/// "previous level completed" fallback.
pub fn level_statuses(unlocked_level: i64, rows: Vec<LevelStatusRow>) -> Vec<LevelStatus> {
    rows.into_iter()
        .map(|row| LevelStatus {
            unlocked: row.number <= unlocked_level || row.previous_completed,
            id: row.id,
            number: row.number,
            title: row.title,
            completed: row.completed,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
