use secrecy::{ExposeSecret, SecretString};
use std::io;

/// Environment variable consulted when no token is configured explicitly.
pub const TOKEN_ENV_VAR: &str = "WEBEX_TEAMS_ACCESS_TOKEN";

const MAX_PROMPTS: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("the configured access token is empty")]
    Empty,
    #[error("no access token was entered after {0} attempts")]
    NotProvided(usize),
    #[error("failed to read the access token: {0}")]
    Prompt(#[from] io::Error),
}

/// Picks the access token, in order of precedence: an explicitly configured value,
/// the environment variable, then an interactive prompt.
pub fn resolve_token(
    explicit: Option<SecretString>,
    from_env: Option<String>,
    mut prompt: impl FnMut() -> io::Result<String>,
) -> Result<SecretString, TokenError> {
    if let Some(token) = explicit {
        return if token.expose_secret().trim().is_empty() {
            Err(TokenError::Empty)
        } else {
            Ok(SecretString::from(token.expose_secret().trim().to_owned()))
        };
    }

    if let Some(token) = from_env.filter(|t| !t.trim().is_empty()) {
        tracing::debug!("Using the access token from {}", TOKEN_ENV_VAR);
        return Ok(SecretString::from(token.trim().to_owned()));
    }

    for _ in 0..MAX_PROMPTS {
        let token = prompt()?;
        if !token.trim().is_empty() {
            return Ok(SecretString::from(token.trim().to_owned()));
        }
        eprintln!("Invalid token provided, token cannot be empty.");
    }
    Err(TokenError::NotProvided(MAX_PROMPTS))
}

/// Asks for the token on the terminal without echoing it.
pub fn prompt_for_token() -> io::Result<String> {
    rpassword::prompt_password("Enter your Webex API access token: ")
}
