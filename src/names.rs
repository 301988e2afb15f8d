pub const REGISTER_URL: &str = "/auth/register";
pub const LOGIN_URL: &str = "/auth/login";
pub const GOOGLE_LOGIN_URL: &str = "/auth/google";
pub const REFRESH_URL: &str = "/auth/refresh";
pub const LOGOUT_URL: &str = "/auth/logout";
pub const CHANGE_PASSWORD_URL: &str = "/auth/change-password";
pub const PROFILE_URL: &str = "/profile";
pub const HEALTH_URL: &str = "/health";

pub const LEVELS_URL: &str = "/levels";
pub const USER_PROGRESS_URL: &str = "/user/progress";
pub const USER_LEVELS_URL: &str = "/user/levels";
pub const CODING_TOPICS_URL: &str = "/coding/topics";
pub const JOBS_URL: &str = "/jobs";

// Route patterns for axum. The `*_url` builders fill in the same patterns.
pub const LEVEL_TOPICS_ROUTE: &str = "/levels/{level_id}/topics";
pub const TOPIC_QUESTIONS_ROUTE: &str = "/topics/{topic_id}/questions";
pub const SUBMIT_ANSWERS_ROUTE: &str = "/topics/{topic_id}/submit";
pub const CODING_PROBLEMS_ROUTE: &str = "/coding/topics/{topic_id}/problems";
pub const CODING_PROBLEM_ROUTE: &str = "/coding/problems/{problem_id}";
pub const JOB_ROUTE: &str = "/jobs/{job_id}";

fn fill(route: &str, param: &str, id: i64) -> String {
    route.replace(&format!("{{{param}}}"), &id.to_string())
}

pub fn level_topics_url(level_id: i64) -> String {
    fill(LEVEL_TOPICS_ROUTE, "level_id", level_id)
}

pub fn topic_questions_url(topic_id: i64) -> String {
    fill(TOPIC_QUESTIONS_ROUTE, "topic_id", topic_id)
}

pub fn submit_answers_url(topic_id: i64) -> String {
    fill(SUBMIT_ANSWERS_ROUTE, "topic_id", topic_id)
}

pub fn coding_problems_url(coding_topic_id: i64) -> String {
    fill(CODING_PROBLEMS_ROUTE, "topic_id", coding_topic_id)
}

pub fn coding_problem_url(problem_id: i64) -> String {
    fill(CODING_PROBLEM_ROUTE, "problem_id", problem_id)
}

pub fn job_url(job_id: i64) -> String {
    fill(JOB_ROUTE, "job_id", job_id)
}

// Signup defaults for a fresh profile (must match the profiles table defaults)
pub const SIGNUP_XP: i64 = 10;
pub const SIGNUP_LEVEL: i64 = 1;
pub const SIGNUP_COINS: i64 = 5;
pub const SIGNUP_UNLOCKED_LEVEL: i64 = 1;

// Rewards
pub const TOPIC_XP_REWARD: i64 = 10;
pub const TOPIC_COIN_REWARD: i64 = 5;
/// XP needed per current level before advancing: level N -> N+1 once xp >= N * 100.
pub const XP_PER_LEVEL: i64 = 100;

// Tokens
pub const ACCESS_TOKEN_TTL_MINUTES: i64 = 5;
pub const REFRESH_TOKEN_TTL_HOURS: i64 = 24;
pub const GOOGLE_ISSUERS: &[&str] = &["accounts.google.com", "https://accounts.google.com"];
