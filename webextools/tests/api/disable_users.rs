use crate::helpers::TestApp;
use secrecy::SecretString;
use serde_json::json;
use webex_api::ApiError;
use webextools::cli::{Command, DisableUsersArgs};
use webextools::commands::disable_users::{DisableRun, disable_users};
use webextools::domain::{DisableResult, DisableSummary, UpdateStatus};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

fn emails(list: &[&str]) -> Vec<String> {
    list.iter().map(|e| e.to_string()).collect()
}

fn completed(run: DisableRun) -> Vec<DisableResult> {
    assert!(run.aborted.is_none(), "The run was aborted: {:?}", run.aborted);
    run.results
}

async fn mount_disable(app: &TestApp, id: &str, status: u16) {
    Mock::given(method("PUT"))
        .and(path(format!("/people/{}", id)))
        .and(body_partial_json(json!({"id": id, "loginEnabled": false})))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({
            "id": id,
            "loginEnabled": false,
            "message": "update rejected",
            "trackingId": "ROUTER_1234",
        })))
        .expect(1)
        .mount(&app.server)
        .await;
}

#[tokio::test]
async fn every_user_in_the_csv_is_disabled() {
    // Arrange
    let app = TestApp::spawn().await;
    for (id, email, name) in [
        ("p1", "ann@example.com", "Ann"),
        ("p2", "bob@example.com", "Bob"),
        ("p3", "cid@example.com", "Cid"),
    ] {
        app.mount_person(id, email, name).await;
        mount_disable(&app, id, 200).await;
    }
    let rows = emails(&["ann@example.com", "bob@example.com", "cid@example.com"]);

    // Act
    let run = app
        .with_client(move |client| disable_users(client, &rows, false, |_| {}))
        .await;
    let results = completed(run);

    // Assert
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(DisableResult::is_success));
    assert_eq!(results[1].person_id.as_deref(), Some("p2"));
    assert_eq!(results[1].display_name.as_deref(), Some("Bob"));
}

#[tokio::test]
async fn a_failing_row_does_not_stop_the_following_rows() {
    // Arrange
    let app = TestApp::spawn().await;
    app.mount_person("p1", "ann@example.com", "Ann").await;
    app.mount_person("p2", "bob@example.com", "Bob").await;
    app.mount_person("p3", "cid@example.com", "Cid").await;
    mount_disable(&app, "p1", 200).await;
    mount_disable(&app, "p2", 500).await;
    mount_disable(&app, "p3", 200).await;
    let rows = emails(&["ann@example.com", "bob@example.com", "cid@example.com"]);

    // Act
    let mut seen = vec![];
    let (run, seen) = app
        .with_client(move |client| {
            let run = disable_users(client, &rows, false, |r| seen.push(r.email.clone()));
            (run, seen)
        })
        .await;
    let results = completed(run);

    // Assert
    let statuses: Vec<_> = results.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![UpdateStatus::Success, UpdateStatus::Failed, UpdateStatus::Success]
    );
    assert_eq!(seen, vec!["ann@example.com", "bob@example.com", "cid@example.com"]);
    let error = results[1].error.as_deref().unwrap();
    assert!(error.contains("500"), "unexpected error text: {}", error);
    assert!(error.contains("update rejected"), "unexpected error text: {}", error);
    assert_eq!(results[1].person_id.as_deref(), Some("p2"));
}

#[tokio::test]
async fn unknown_users_and_blank_emails_are_reported_as_failures() {
    // Arrange
    let app = TestApp::spawn().await;
    app.mount_person("p1", "ann@example.com", "Ann").await;
    app.mount_unknown_person("ghost@example.com").await;
    mount_disable(&app, "p1", 200).await;
    let rows = emails(&["ann@example.com", "", "ghost@example.com", "not-an-email"]);

    // Act
    let run = app
        .with_client(move |client| disable_users(client, &rows, false, |_| {}))
        .await;
    let results = completed(run);

    // Assert
    assert_eq!(results.len(), 4);
    assert_eq!(DisableSummary::new(&results), DisableSummary { succeeded: 1, failed: 3 });
    assert_eq!(results[1].error.as_deref(), Some("missing email"));
    assert_eq!(results[2].error.as_deref(), Some("user not found"));
    // Two lookups and one update; invalid rows never reach the API
    assert_eq!(app.request_count().await, 3);
}

#[tokio::test]
async fn a_dry_run_looks_users_up_without_disabling_them() {
    // Arrange
    let app = TestApp::spawn().await;
    app.mount_person("p1", "ann@example.com", "Ann").await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.server)
        .await;
    let rows = emails(&["ann@example.com"]);

    // Act
    let run = app
        .with_client(move |client| disable_users(client, &rows, true, |_| {}))
        .await;
    let results = completed(run);

    // Assert
    assert!(results[0].is_success());
    assert!(results[0].dry_run);
    assert_eq!(results[0].person_id.as_deref(), Some("p1"));
}

#[tokio::test]
async fn a_rejected_token_aborts_the_run() {
    // Arrange
    let app = TestApp::spawn().await;
    Mock::given(method("GET"))
        .and(path("/people"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&app.server)
        .await;
    let rows = emails(&["ann@example.com", "bob@example.com"]);

    // Act
    let run = app
        .with_client(move |client| disable_users(client, &rows, false, |_| {}))
        .await;

    // Assert
    assert!(matches!(run.aborted, Some(ApiError::Unauthorized)), "{:?}", run.aborted);
    assert!(run.results.is_empty());
    assert_eq!(app.request_count().await, 1);
}

#[tokio::test]
async fn the_json_report_reproduces_the_run_counts() {
    // Arrange
    let app = TestApp::spawn().await;
    app.mount_person("p1", "ann@example.com", "Ann").await;
    app.mount_person("p2", "bob@example.com", "Bob").await;
    app.mount_unknown_person("ghost@example.com").await;
    mount_disable(&app, "p1", 200).await;
    mount_disable(&app, "p2", 200).await;
    let file = app.write_file(
        "users.csv",
        "Name,Email,Department\nAnn,ann@example.com,Eng\nBob,bob@example.com,Ops\nGhost,ghost@example.com,None\n",
    );

    // Act
    let command = Command::DisableUsers(DisableUsersArgs {
        file,
        column: "email".into(),
        report: true,
        dry_run: false,
        verbose: 1,
    });
    app.run(command).await.expect("The command failed");

    // Assert
    let reports: Vec<_> = std::fs::read_dir(app.report_dir())
        .expect("No report directory")
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(reports.len(), 1);
    let name = reports[0].file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("disabled_users_report.") && name.ends_with(".json"));

    let parsed = app.read_report();
    assert_eq!(parsed.len(), 3);
    assert_eq!(DisableSummary::new(&parsed), DisableSummary { succeeded: 2, failed: 1 });
    assert_eq!(parsed[2].email, "ghost@example.com");
}

#[tokio::test]
async fn users_disabled_before_a_rejected_token_are_still_reported() {
    // Arrange
    let app = TestApp::spawn().await;
    app.mount_person("p1", "ann@example.com", "Ann").await;
    mount_disable(&app, "p1", 200).await;
    Mock::given(method("GET"))
        .and(path("/people"))
        .and(query_param("email", "bob@example.com"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&app.server)
        .await;
    let file = app.write_file(
        "users.csv",
        "email\nann@example.com\nbob@example.com\ncid@example.com\n",
    );

    // Act
    let command = Command::DisableUsers(DisableUsersArgs {
        file,
        column: "email".into(),
        report: true,
        dry_run: false,
        verbose: 0,
    });
    let result = app.run(command).await;

    // Assert
    let error = result.expect_err("A rejected token must fail the run");
    assert!(
        error.chain().any(|cause| cause.to_string().contains("401")),
        "{:?}",
        error
    );
    let parsed = app.read_report();
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed[0].email, "ann@example.com");
    assert!(parsed[0].is_success());
    // Ann's lookup and update, then Bob's rejected lookup; Cid is never reached
    assert_eq!(app.request_count().await, 3);
}

#[tokio::test]
async fn a_missing_column_is_rejected_before_any_request() {
    // Arrange
    let app = TestApp::spawn().await;
    let file = app.write_file("users.csv", "name,mail\nAnn,ann@example.com\n");

    // Act
    let command = Command::DisableUsers(DisableUsersArgs {
        file,
        column: "email".into(),
        report: true,
        dry_run: false,
        verbose: 0,
    });
    let result = app.run(command).await;

    // Assert
    let error = result.expect_err("A CSV without the column must be rejected");
    assert!(error.to_string().contains("column `email` not found"), "{}", error);
    assert_eq!(app.request_count().await, 0);
    assert!(!app.report_dir().exists());
}

#[tokio::test]
async fn a_missing_file_is_rejected_before_any_request() {
    let app = TestApp::spawn().await;

    let command = Command::DisableUsers(DisableUsersArgs {
        file: app.workdir.path().join("missing.csv"),
        column: "email".into(),
        report: false,
        dry_run: false,
        verbose: 0,
    });

    assert!(app.run(command).await.is_err());
    assert_eq!(app.request_count().await, 0);
}

async fn mount_ann_for_token(app: &TestApp, token: &str) {
    app.mount_person_for_token(token, "p1", "ann@example.com", "Ann")
        .await;
    mount_disable(app, "p1", 200).await;
}

fn ann_only_command(app: &TestApp) -> Command {
    Command::DisableUsers(DisableUsersArgs {
        file: app.write_file("users.csv", "email\nann@example.com\n"),
        column: "email".into(),
        report: true,
        dry_run: false,
        verbose: 0,
    })
}

#[tokio::test]
async fn the_configured_token_wins_over_the_environment_variable() {
    // Arrange
    let app = TestApp::spawn().await;
    mount_ann_for_token(&app, "config-token").await;
    let mut settings = app.settings();
    settings.api.access_token = Some(SecretString::from("config-token".to_owned()));

    // Act
    let command = ann_only_command(&app);
    app.run_with(settings, None, Some("env-token"), command)
        .await
        .expect("The command failed");

    // Assert
    let parsed = app.read_report();
    assert!(parsed[0].is_success(), "{:?}", parsed[0]);
}

#[tokio::test]
async fn the_environment_variable_is_used_without_a_configured_token() {
    // Arrange
    let app = TestApp::spawn().await;
    mount_ann_for_token(&app, "env-token").await;

    // Act
    let command = ann_only_command(&app);
    app.run_with(app.settings(), None, Some("env-token"), command)
        .await
        .expect("The command failed");

    // Assert
    let parsed = app.read_report();
    assert!(parsed[0].is_success(), "{:?}", parsed[0]);
}
