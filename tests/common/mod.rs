#![allow(dead_code)]

use questline::db::Db;
use questline::google::GoogleTokenInfo;
use questline::models::Curriculum;
use questline::services::auth::AuthService;
use questline::services::tokens::TokenIssuer;
use questline::AppState;
use serde_json::json;

pub const TEST_SECRET: &str = "test-secret";

pub async fn create_test_db() -> Db {
    create_test_db_with_url().await.0
}

/// Like [`create_test_db`], also returning the URL so a test can open its
/// own connection to the same file.
pub async fn create_test_db_with_url() -> (Db, String) {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let path =
        std::env::temp_dir().join(format!("questline_test_{}_{}.db", std::process::id(), id));
    // Clean up leftover file from previous runs
    let _ = std::fs::remove_file(&path);
    let url = format!("sqlite://{}", path.display());
    let db = Db::new(&url).await.expect("failed to create test database");
    (db, url)
}

pub fn app_state(db: Db) -> AppState {
    let auth = AuthService::new(
        db.clone(),
        GoogleTokenInfo::new("test-client-id".to_string()),
        TokenIssuer::new(TEST_SECRET),
    );
    AppState { db, auth }
}

/// Two levels. Level 1 needs two topics and pays 50 XP / 20 coins.
/// Topic "Capitals" has one FILL question (answer "Paris"), topic "Output"
/// has one OUTPUT question (answer "4"), topic "Reading" has no questions.
pub fn sample_curriculum() -> Curriculum {
    serde_json::from_value(json!({
        "levels": [
            {
                "number": 1,
                "title": "Basics",
                "description": "Getting started",
                "xp_reward": 50,
                "coin_reward": 20,
                "required_topics": 2,
                "topics": [
                    {
                        "title": "Capitals",
                        "explanation": "Cities",
                        "order": 1,
                        "questions": [
                            {
                                "question_type": "FILL",
                                "question_text": "Capital of France?",
                                "correct_answer": "Paris"
                            }
                        ]
                    },
                    {
                        "title": "Output",
                        "explanation": "Guess the output",
                        "order": 2,
                        "questions": [
                            {
                                "question_type": "OUTPUT",
                                "question_text": "print(2 + 2)",
                                "correct_answer": "4"
                            }
                        ]
                    },
                    {
                        "title": "Reading",
                        "explanation": "Just read",
                        "order": 3
                    }
                ]
            },
            {
                "number": 2,
                "title": "Loops",
                "topics": [
                    {
                        "title": "For loops",
                        "questions": [
                            {
                                "question_type": "MCQ",
                                "question_text": "Which keyword starts a loop?",
                                "options": ["for", "if", "def"],
                                "correct_answer": "for"
                            }
                        ]
                    }
                ]
            }
        ],
        "coding_topics": [
            {
                "name": "Arrays",
                "description": "Array problems",
                "problems": [
                    { "sno": 2, "title": "Rotate array" },
                    { "sno": 1, "title": "Two sum", "code_snippet": "def two_sum(): ..." }
                ]
            }
        ],
        "jobs": [
            {
                "title": "Junior developer",
                "company": "Acme",
                "experience_level": "FRESHER",
                "posted_on": "2026-01-01"
            },
            {
                "title": "Senior developer",
                "company": "Acme",
                "experience_level": "EXPERIENCED",
                "posted_on": "2026-02-01"
            },
            {
                "title": "Closed role",
                "company": "Initech",
                "is_active": false
            }
        ]
    }))
    .expect("sample curriculum should deserialize")
}

pub async fn seeded_db() -> Db {
    let db = create_test_db().await;
    db.load_curriculum(sample_curriculum())
        .await
        .expect("load curriculum");
    db
}

/// Ids of the sample topics, looked up by title.
pub async fn topic_id(db: &Db, level_number: i64, title: &str) -> i64 {
    let levels = db.levels().await.expect("levels");
    let level = levels
        .iter()
        .find(|l| l.number == level_number)
        .expect("level exists");
    db.topics_for_level(level.id)
        .await
        .expect("topics")
        .into_iter()
        .find(|t| t.title == title)
        .expect("topic exists")
        .id
}

pub async fn question_id(db: &Db, topic_id: i64) -> i64 {
    db.questions_for_topic(topic_id).await.expect("questions")[0].id
}

pub async fn create_user(db: &Db, email: &str) -> i64 {
    db.create_user(email, "password123", "Tester")
        .await
        .expect("create user")
}
