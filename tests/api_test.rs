mod common;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use questline::{names, router};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Body,
) -> (StatusCode, Value) {
    let mut req = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        req = req.header("authorization", format!("Bearer {token}"));
    }

    let resp = app
        .clone()
        .oneshot(req.body(body).expect("request build should succeed"))
        .await
        .expect("router should respond");

    let status = resp.status();
    let bytes = resp
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn post_json(
    app: &Router,
    uri: &str,
    token: Option<&str>,
    body: Value,
) -> (StatusCode, Value) {
    call(app, Method::POST, uri, token, Body::from(body.to_string())).await
}

async fn get(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    call(app, Method::GET, uri, token, Body::empty()).await
}

async fn register(app: &Router, email: &str) -> Value {
    let (status, body) = post_json(
        app,
        names::REGISTER_URL,
        None,
        json!({ "name": "Ada", "email": email, "password": "analytical-engine" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    body
}

fn access(session: &Value) -> &str {
    session["access_token"].as_str().expect("access token")
}

async fn seeded_app() -> (Router, questline::db::Db) {
    let db = common::seeded_db().await;
    (router(common::app_state(db.clone())), db)
}

#[tokio::test]
async fn register_returns_tokens_and_signup_summary() {
    let (app, _) = seeded_app().await;

    let session = register(&app, "ada@example.com").await;
    assert!(session["refresh_token"].is_string());
    assert_eq!(session["user"]["email"], "ada@example.com");
    assert_eq!(session["user"]["name"], "Ada");
    assert_eq!(session["user"]["xp"], 10);
    assert_eq!(session["user"]["coins"], 5);
    assert_eq!(session["user"]["level"], 1);

    let (status, profile) = get(&app, names::PROFILE_URL, Some(access(&session))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["unlocked_level"], 1);
}

#[tokio::test]
async fn register_rejects_duplicates_and_weak_passwords() {
    let (app, _) = seeded_app().await;
    register(&app, "ada@example.com").await;

    let cases = [
        json!({ "name": "Ada", "email": "ada@example.com", "password": "analytical-engine" }),
        json!({ "name": "Bob", "email": "bob@example.com", "password": "short" }),
        json!({ "name": "Bob", "email": "bob@example.com", "password": "1234567890" }),
        json!({ "email": "bob@example.com", "password": "analytical-engine" }),
    ];
    for case in cases {
        let (status, body) = post_json(&app, names::REGISTER_URL, None, case).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn login_checks_credentials() {
    let (app, _) = seeded_app().await;
    register(&app, "ada@example.com").await;

    let (status, body) = post_json(
        &app,
        names::LOGIN_URL,
        None,
        json!({ "email": "ada@example.com", "password": "analytical-engine" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "ada@example.com");

    let (status, _) = post_json(
        &app,
        names::LOGIN_URL,
        None,
        json!({ "email": "ada@example.com", "password": "wrong-password" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_auth_bodies_are_bad_requests() {
    let (app, _) = seeded_app().await;

    for body in ["not json", r#"{"email": 42}"#, r#"{"email": "a@b.com", "pass"#] {
        let (status, resp) =
            call(&app, Method::POST, names::LOGIN_URL, None, Body::from(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {body}");
        assert_eq!(resp["error"], "malformed request body");
    }
}

#[tokio::test]
async fn catalog_hides_answer_keys_and_404s_unknown_ids() {
    let (app, db) = seeded_app().await;
    let capitals = common::topic_id(&db, 1, "Capitals").await;

    let (status, levels) = get(&app, names::LEVELS_URL, None).await;
    assert_eq!(status, StatusCode::OK);
    let level_id = levels[0]["id"].as_i64().unwrap();

    let (status, level) = get(&app, &names::level_topics_url(level_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(level["level_id"], level_id);
    assert_eq!(level["level_number"], 1);
    assert_eq!(level["level_title"], "Basics");
    assert_eq!(level["topics"].as_array().unwrap().len(), 3);

    let (status, topic) = get(&app, &names::topic_questions_url(capitals), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(topic["topic_id"], capitals);
    assert_eq!(topic["topic_title"], "Capitals");
    let question = &topic["questions"][0];
    assert_eq!(question["question_type"], "FILL");
    assert!(question.get("correct_answer").is_none());

    let (status, body) = get(&app, &names::level_topics_url(9999), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");

    let (status, _) = get(&app, &names::topic_questions_url(9999), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn submission_flow_rewards_first_completion_only() {
    let (app, db) = seeded_app().await;
    let session = register(&app, "ada@example.com").await;
    let token = access(&session);

    let capitals = common::topic_id(&db, 1, "Capitals").await;
    let qid = common::question_id(&db, capitals).await;
    let body = json!({ "answers": { qid.to_string(): "  PARIS " } });

    let (status, first) = post_json(
        &app,
        &names::submit_answers_url(capitals),
        Some(token),
        body.clone(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["message"], "All answers correct! Topic completed. XP & coins awarded.");
    assert_eq!(first["xp"], 20);
    assert_eq!(first["coins"], 10);
    assert_eq!(first["level"], 1);
    assert_eq!(first["unlocked_level"], 1);

    let (status, second) = post_json(
        &app,
        &names::submit_answers_url(capitals),
        Some(token),
        body,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let already = "All answers correct! Topic was already completed. \
                   XP & coins already awarded.";
    assert_eq!(second, json!({ "message": already }));

    let (_, body) = get(&app, names::USER_PROGRESS_URL, Some(token)).await;
    assert_eq!(body["user"], "ada@example.com");
    let progress = &body["progress"];
    assert_eq!(progress.as_array().unwrap().len(), 1);
    assert_eq!(progress[0]["level_number"], 1);
    assert_eq!(progress[0]["topic_title"], "Capitals");
    assert_eq!(progress[0]["completed"], true);
}

#[tokio::test]
async fn completing_level_one_unlocks_level_two() {
    let (app, db) = seeded_app().await;
    let session = register(&app, "ada@example.com").await;
    let token = access(&session);

    let capitals = common::topic_id(&db, 1, "Capitals").await;
    let output = common::topic_id(&db, 1, "Output").await;
    let capitals_q = common::question_id(&db, capitals).await;
    let output_q = common::question_id(&db, output).await;

    post_json(
        &app,
        &names::submit_answers_url(capitals),
        Some(token),
        json!({ "answers": { capitals_q.to_string(): "Paris" } }),
    )
    .await;
    // Numeric answers are compared as text.
    let (status, body) = post_json(
        &app,
        &names::submit_answers_url(output),
        Some(token),
        json!({ "answers": { output_q.to_string(): 4 } }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["xp"], 80);
    assert_eq!(body["coins"], 35);
    assert_eq!(body["unlocked_level"], 2);

    let (status, levels) = get(&app, names::USER_LEVELS_URL, Some(token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(levels[0]["completed"], true);
    assert_eq!(levels[1]["completed"], false);
    assert_eq!(levels[1]["unlocked"], true);
}

#[tokio::test]
async fn malformed_submissions_are_graded_as_empty() {
    let (app, db) = seeded_app().await;
    let session = register(&app, "ada@example.com").await;
    let token = access(&session);
    let capitals = common::topic_id(&db, 1, "Capitals").await;
    let uri = names::submit_answers_url(capitals);

    for body in [
        Body::from("not json at all"),
        Body::from(r#"{"answers": ["Paris"]}"#),
        Body::from(r#"{"answers": "Paris"}"#),
        Body::empty(),
    ] {
        let (status, resp) = call(&app, Method::POST, &uri, Some(token), body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resp["message"], "You got 0/1 correct. Try again!");
    }
}

#[tokio::test]
async fn submitting_to_unknown_topic_is_not_found() {
    let (app, _) = seeded_app().await;
    let session = register(&app, "ada@example.com").await;

    let (status, body) = post_json(
        &app,
        &names::submit_answers_url(9999),
        Some(access(&session)),
        json!({ "answers": {} }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");

    let (_, body) = get(&app, names::USER_PROGRESS_URL, Some(access(&session))).await;
    assert_eq!(body["progress"], json!([]));
}

#[tokio::test]
async fn refresh_tokens_rotate_and_cannot_be_reused() {
    let (app, _) = seeded_app().await;
    let session = register(&app, "ada@example.com").await;
    let refresh = session["refresh_token"].as_str().unwrap();

    let (status, rotated) = post_json(
        &app,
        names::REFRESH_URL,
        None,
        json!({ "refresh": refresh }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(rotated["access_token"].is_string());
    assert_ne!(rotated["refresh_token"], session["refresh_token"]);

    let (status, _) = post_json(
        &app,
        names::REFRESH_URL,
        None,
        json!({ "refresh": refresh }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = post_json(&app, names::REFRESH_URL, None, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn logout_revokes_refresh_token() {
    let (app, _) = seeded_app().await;
    let session = register(&app, "ada@example.com").await;
    let token = access(&session);
    let refresh = session["refresh_token"].as_str().unwrap();

    let (status, _) = post_json(&app, names::LOGOUT_URL, Some(token), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_json(
        &app,
        names::LOGOUT_URL,
        Some(token),
        json!({ "refresh": "nope" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = post_json(
        &app,
        names::LOGOUT_URL,
        Some(token),
        json!({ "refresh": refresh }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out successfully.");

    let (status, _) = post_json(
        &app,
        names::REFRESH_URL,
        None,
        json!({ "refresh": refresh }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn change_password_then_login_with_new_one() {
    let (app, _) = seeded_app().await;
    let session = register(&app, "ada@example.com").await;
    let token = access(&session);

    let (status, _) = post_json(
        &app,
        names::CHANGE_PASSWORD_URL,
        Some(token),
        json!({ "current_password": "wrong-password", "new_password": "difference-engine" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_json(
        &app,
        names::CHANGE_PASSWORD_URL,
        Some(token),
        json!({ "current_password": "analytical-engine", "new_password": "difference-engine" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post_json(
        &app,
        names::LOGIN_URL,
        None,
        json!({ "email": "ada@example.com", "password": "difference-engine" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn coding_and_job_routes_serve_seeded_content() {
    let (app, _) = seeded_app().await;

    let (_, topics) = get(&app, names::CODING_TOPICS_URL, None).await;
    let topic_id = topics[0]["id"].as_i64().unwrap();

    let (status, problems) = get(&app, &names::coding_problems_url(topic_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(problems[0]["title"], "Two sum");

    let problem_id = problems[0]["id"].as_i64().unwrap();
    let (status, problem) = get(&app, &names::coding_problem_url(problem_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(problem["topic"], "Arrays");

    let (status, _) = get(&app, &names::coding_problem_url(9999), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, jobs) = get(&app, names::JOBS_URL, None).await;
    assert_eq!(jobs.as_array().unwrap().len(), 2);
    let job_id = jobs[0]["id"].as_i64().unwrap();
    let (status, job) = get(&app, &names::job_url(job_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(job["title"], "Senior developer");

    let (status, _) = get(&app, &names::job_url(9999), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
