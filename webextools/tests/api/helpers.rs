use once_cell::sync::Lazy;
use secrecy::SecretString;
use serde_json::{Value, json};
use std::path::PathBuf;
use webex_api::WebexClient;
use webex_api::data_processing::read_json;
use webextools::cli::Command;
use webextools::configuration::{
    ApiSettings, LogFormat, LoggingSettings, ReportSettings, Settings,
};
use webextools::domain::DisableResult;
use webextools::startup::Application;
use webextools::telemetry::{get_subscriber, init_subscriber};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_TOKEN: &str = "test-token";

// Ensure that the `tracing` stack is only initialised once using `once_cell`
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(default_filter_level, LogFormat::Pretty, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(default_filter_level, LogFormat::Pretty, std::io::sink);
        init_subscriber(subscriber);
    };
});

pub struct TestApp {
    pub server: MockServer,
    pub workdir: tempfile::TempDir,
}

impl TestApp {
    pub async fn spawn() -> Self {
        // `TRACING` is only executed the first time `initialize` is invoked.
        Lazy::force(&TRACING);

        // Every test gets its own Webex stand-in and scratch directory
        let server = MockServer::start().await;
        let workdir = tempfile::tempdir().expect("Failed to create a temporary directory.");

        Self { server, workdir }
    }

    pub fn settings(&self) -> Settings {
        Settings {
            api: ApiSettings {
                base_url: self.server.uri(),
                timeout_seconds: 5,
                max_retries: 2,
                access_token: None,
            },
            logging: LoggingSettings {
                format: LogFormat::Pretty,
            },
            report: ReportSettings {
                directory: self.report_dir(),
            },
        }
    }

    pub fn report_dir(&self) -> PathBuf {
        self.workdir.path().join("reports")
    }

    pub fn write_file(&self, name: &str, contents: &str) -> PathBuf {
        let file = self.workdir.path().join(name);
        std::fs::write(&file, contents).expect("Failed to write test file.");
        file
    }

    /// Runs a command end to end, as the binary would, with `--token test-token`.
    pub async fn run(&self, command: Command) -> anyhow::Result<()> {
        self.run_with(self.settings(), Some(TEST_TOKEN), None, command)
            .await
    }

    /// Runs a command with the given settings, `--token` value and `WEBEX_TEAMS_ACCESS_TOKEN` value.
    pub async fn run_with(
        &self,
        settings: Settings,
        token: Option<&str>,
        env_token: Option<&str>,
        command: Command,
    ) -> anyhow::Result<()> {
        let token = token.map(|t| SecretString::from(t.to_owned()));
        let env_token = env_token.map(str::to_owned);
        // The blocking client must not run on the async runtime's threads.
        tokio::task::spawn_blocking(move || {
            Application::build(settings, token)
                .with_env_token(env_token)
                .run(command)
        })
        .await
        .expect("Command panicked")
    }

    /// Hands a client connected to the mock server to `f`, on a blocking thread.
    pub async fn with_client<T, F>(&self, f: F) -> T
    where
        F: FnOnce(&WebexClient) -> T + Send + 'static,
        T: Send + 'static,
    {
        let options = self.settings().api.client_options();
        tokio::task::spawn_blocking(move || {
            let client = WebexClient::new(TEST_TOKEN, options).expect("Failed to build client.");
            f(&client)
        })
        .await
        .expect("Client task panicked")
    }

    /// Parses the single disable-users report written to the report directory.
    pub fn read_report(&self) -> Vec<DisableResult> {
        let reports: Vec<_> = std::fs::read_dir(self.report_dir())
            .expect("No report directory")
            .map(|entry| entry.unwrap().path())
            .collect();
        assert_eq!(reports.len(), 1, "Expected exactly one report, found {:?}", reports);
        read_json(&reports[0]).expect("Unreadable report")
    }

    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .expect("Request recording is disabled")
            .len()
    }

    /// Makes `GET /people?email=...` find a single person.
    pub async fn mount_person(&self, id: &str, email: &str, display_name: &str) {
        self.mount_person_for_token(TEST_TOKEN, id, email, display_name)
            .await;
    }

    /// Like `mount_person`, but only for requests bearing `token`.
    pub async fn mount_person_for_token(
        &self,
        token: &str,
        id: &str,
        email: &str,
        display_name: &str,
    ) {
        Mock::given(method("GET"))
            .and(path("/people"))
            .and(query_param("email", email))
            .and(header("Authorization", format!("Bearer {}", token).as_str()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"items": [person_json(id, email, display_name)]})),
            )
            .mount(&self.server)
            .await;
    }

    /// Makes `GET /people?email=...` find nobody.
    pub async fn mount_unknown_person(&self, email: &str) {
        Mock::given(method("GET"))
            .and(path("/people"))
            .and(query_param("email", email))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .mount(&self.server)
            .await;
    }
}

pub fn person_json(id: &str, email: &str, display_name: &str) -> Value {
    json!({
        "id": id,
        "emails": [email],
        "displayName": display_name,
        "orgId": "org-1",
        "licenses": ["messaging"],
        "loginEnabled": true,
    })
}

/// Reads a query parameter of a recorded request.
pub fn query_value(request: &wiremock::Request, key: &str) -> Option<String> {
    request
        .url
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}
