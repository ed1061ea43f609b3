use crate::cli::DisableUsersArgs;
use crate::domain::{DisableResult, DisableSummary, EmailAddress, UpdateStatus};
use crate::error::ConfigError;
use crate::startup::Application;
use anyhow::Context;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use webex_api::data_processing::{FileError, read_csv_column, write_slice_to_file};
use webex_api::people::{disable_person, find_person_by_email};
use webex_api::{ApiError, WebexClient};

/// Reads the email column of the users CSV, one entry per data row.
pub fn load_emails(file: &Path, column: &str) -> Result<Vec<String>, ConfigError> {
    let emails = read_csv_column(file, column).map_err(|source| ConfigError::InputFile {
        path: file.to_owned(),
        source,
    })?;
    if emails.is_empty() {
        return Err(ConfigError::NoUsers(file.to_owned()));
    }
    Ok(emails)
}

/// Outcome of a disable-users run. `aborted` holds the error that stopped the run
/// early; `results` then covers only the rows processed before it.
#[derive(Debug)]
pub struct DisableRun {
    pub results: Vec<DisableResult>,
    pub aborted: Option<ApiError>,
}

/// Disables the Webex user behind each email, in order, producing exactly one result per email.
///
/// A failure on one row is recorded and the next row is processed; only errors that
/// would make every later call fail too (a rejected token) stop the run.
#[tracing::instrument(
    name = "Disabling users",
    skip(client, emails, on_result),
    fields(rows = emails.len())
)]
pub fn disable_users(
    client: &WebexClient,
    emails: &[String],
    dry_run: bool,
    mut on_result: impl FnMut(&DisableResult),
) -> DisableRun {
    let mut results = Vec::with_capacity(emails.len());
    for raw in emails {
        let result = match EmailAddress::parse(raw.clone()) {
            Err(reason) => {
                tracing::warn!("Skipping row with email {:?}: {}", raw, reason);
                DisableResult::failed(raw.as_str(), reason)
            }
            Ok(email) => match disable_user(client, &email, dry_run) {
                Ok(result) => result,
                Err(e) if e.is_fatal() => {
                    tracing::error!("Stopping at {} after {} rows: {}", raw, results.len(), e);
                    return DisableRun {
                        results,
                        aborted: Some(e),
                    };
                }
                Err(e) => {
                    tracing::error!("Unable to look up {}: {}", raw, e);
                    DisableResult::failed(raw.as_str(), e.to_string())
                }
            },
        };
        on_result(&result);
        results.push(result);
    }
    DisableRun {
        results,
        aborted: None,
    }
}

fn disable_user(
    client: &WebexClient,
    email: &EmailAddress,
    dry_run: bool,
) -> Result<DisableResult, ApiError> {
    let Some(person) = find_person_by_email(client, email.as_ref())? else {
        tracing::warn!("No Webex user found for {}", email.as_ref());
        return Ok(DisableResult::failed(email.as_ref(), "user not found"));
    };

    let mut result = DisableResult {
        email: email.as_ref().to_owned(),
        person_id: Some(person.id.clone()),
        display_name: Some(person.display_name.clone()),
        status: UpdateStatus::Success,
        error: None,
        dry_run,
    };
    if dry_run {
        tracing::info!("Dry run, not disabling {} ({})", person.display_name, person.id);
        return Ok(result);
    }

    match disable_person(client, &person) {
        Ok(_) => tracing::info!("Disabled {} ({})", person.display_name, person.id),
        Err(e) if e.is_fatal() => return Err(e),
        Err(e) => {
            tracing::error!("Unable to disable {} ({}): {}", person.display_name, person.id, e);
            result.status = UpdateStatus::Failed;
            result.error = Some(e.to_string());
        }
    }
    Ok(result)
}

pub fn report_filename(now: DateTime<Local>) -> String {
    format!("disabled_users_report.{}.json", now.format("%Y%m%d_%H%M%S"))
}

/// Writes the results as a JSON array into `directory` and returns the file's absolute path.
pub fn write_report(results: &[DisableResult], directory: &Path) -> Result<PathBuf, FileError> {
    std::fs::create_dir_all(directory).map_err(|source| FileError::Io {
        path: directory.to_owned(),
        source,
    })?;
    let path = directory.join(report_filename(Local::now()));
    write_slice_to_file(results, &path)?;
    Ok(std::path::absolute(&path).unwrap_or(path))
}

pub fn run(app: &mut Application, args: &DisableUsersArgs) -> anyhow::Result<DisableSummary> {
    let emails = load_emails(&args.file, &args.column)?;
    let client = app.connect()?;

    let verbose = args.verbose > 0;
    let DisableRun { results, aborted } = disable_users(&client, &emails, args.dry_run, |result| {
        if verbose {
            println!("{}", result);
        }
    });

    // Accounts already disabled are summarized and reported even when the run stopped early.
    let summary = DisableSummary::new(&results);
    if args.dry_run {
        println!("Dry run: {}", summary);
    } else {
        println!("{}", summary);
    }
    if aborted.is_some() {
        println!("Stopped after {} of {} rows", results.len(), emails.len());
    }

    if args.report {
        let path = write_report(&results, &app.settings().report.directory)
            .context("Failed to write the report")?;
        println!("\nReport written to {}\n", path.display());
    }

    match aborted {
        Some(e) => Err(anyhow::Error::new(e).context("Aborted disabling users")),
        None => Ok(summary),
    }
}
