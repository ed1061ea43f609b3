use crate::cli::Command;
use crate::commands::{disable_users, recording_report};
use crate::configuration::Settings;
use crate::token::{TOKEN_ENV_VAR, prompt_for_token, resolve_token};
use secrecy::{ExposeSecret, SecretString};
use webex_api::WebexClient;

/// One invocation of the tool: settings plus the token given on the command line, if any.
pub struct Application {
    settings: Settings,
    token: Option<SecretString>,
    env_token: Option<String>,
}

impl Application {
    pub fn build(settings: Settings, token: Option<SecretString>) -> Self {
        Self {
            settings,
            token,
            env_token: std::env::var(TOKEN_ENV_VAR).ok(),
        }
    }

    /// Replaces the value read from `WEBEX_TEAMS_ACCESS_TOKEN` at build time.
    pub fn with_env_token(mut self, env_token: Option<String>) -> Self {
        self.env_token = env_token;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Resolves the access token and creates the API client. Commands call this only
    /// once their arguments have been validated, so bad input never triggers a prompt.
    pub fn connect(&mut self) -> anyhow::Result<WebexClient> {
        let explicit = self
            .token
            .take()
            .or_else(|| self.settings.api.access_token.take());
        let token = resolve_token(explicit, self.env_token.take(), prompt_for_token)?;
        let client = WebexClient::new(token.expose_secret(), self.settings.api.client_options())?;
        tracing::debug!("Connecting to {}", client.base_url());
        Ok(client)
    }

    pub fn run(mut self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::DisableUsers(args) => disable_users::run(&mut self, &args).map(drop),
            Command::RecordingReport(args) => recording_report::run(&mut self, &args).map(drop),
        }
    }
}
