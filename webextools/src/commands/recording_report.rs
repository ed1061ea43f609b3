use crate::cli::RecordingReportArgs;
use crate::domain::{RecordingAccessRow, RecordingRow, ReportPeriod, TimeWindow};
use crate::error::ConfigError;
use crate::startup::Application;
use anyhow::Context;
use chrono::Utc;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use webex_api::data_processing::{records_from, write_records_csv};
use webex_api::recordings::{fetch_access_detail, fetch_access_summary, string_field};
use webex_api::{ApiError, WebexClient};

/// A query window whose request failed; its recordings are missing from the report.
#[derive(Debug, Clone)]
pub struct WindowFailure {
    pub window: TimeWindow,
    pub error: String,
}

/// A recording whose access details could not be retrieved.
#[derive(Debug, Clone)]
pub struct DetailFailure {
    pub recording_id: String,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct RecordingReport {
    /// Summary rows of every window that succeeded, oldest window first.
    pub rows: Vec<RecordingRow>,
    pub windows_queried: usize,
    pub failures: Vec<WindowFailure>,
    /// Recordings skipped by a detailed report.
    pub detail_failures: Vec<DetailFailure>,
}

/// Queries every window in turn and concatenates the results.
///
/// A window that fails is recorded in `failures` and skipped, keeping the rows of
/// the other windows; only a rejected token aborts the whole report.
#[tracing::instrument(
    name = "Collecting recording summaries",
    skip(client, windows),
    fields(windows = windows.len())
)]
pub fn collect_recordings(
    client: &WebexClient,
    windows: &[TimeWindow],
) -> Result<RecordingReport, ApiError> {
    let mut report = RecordingReport::default();
    for window in windows {
        report.windows_queried += 1;
        match fetch_access_summary(client, window) {
            Ok(rows) => {
                tracing::info!("Found {} recordings in {}", rows.len(), window);
                report.rows.extend(rows);
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                tracing::error!("Skipping window {}: {}", window, e);
                report.failures.push(WindowFailure {
                    window: *window,
                    error: e.to_string(),
                });
            }
        }
    }
    Ok(report)
}

/// Expands each recording into one row per view or download.
#[tracing::instrument(
    name = "Collecting recording access details",
    skip(client, recordings),
    fields(recordings = recordings.len())
)]
pub fn collect_access_details(
    client: &WebexClient,
    recordings: &[RecordingRow],
) -> Result<(Vec<RecordingAccessRow>, Vec<DetailFailure>), ApiError> {
    let mut rows = vec![];
    let mut failures = vec![];
    for recording in recordings {
        let recording_id = string_field(recording, "recordingId");
        if recording_id.is_empty() {
            tracing::warn!("Skipping a recording without recordingId: {:?}", recording);
            failures.push(DetailFailure {
                recording_id,
                error: "missing recordingId".to_owned(),
            });
            continue;
        }

        match fetch_access_detail(client, &recording_id) {
            Ok(accesses) if accesses.is_empty() => {
                tracing::info!("No detailed report found for {}", recording_id);
            }
            Ok(accesses) => rows.extend(
                accesses
                    .into_iter()
                    .map(|access| RecordingAccessRow::new(recording, access)),
            ),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                tracing::error!("Skipping details of {}: {}", recording_id, e);
                failures.push(DetailFailure {
                    recording_id,
                    error: e.to_string(),
                });
            }
        }
    }
    Ok((rows, failures))
}

/// The report file name, with `.csv` appended unless already present.
pub fn output_path(write: &Path) -> PathBuf {
    if write
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
    {
        write.to_owned()
    } else {
        let mut name = write.as_os_str().to_owned();
        name.push(".csv");
        PathBuf::from(name)
    }
}

pub fn run(app: &mut Application, args: &RecordingReportArgs) -> anyhow::Result<RecordingReport> {
    run_with_output(app, args, std::io::stdout().lock())
}

/// Runs the report, writing everything meant for stdout to `out`.
pub fn run_with_output(
    app: &mut Application,
    args: &RecordingReportArgs,
    mut out: impl Write,
) -> anyhow::Result<RecordingReport> {
    let range = ReportPeriod::parse(args.period, args.span).map_err(ConfigError::InvalidArgument)?;
    let client = app.connect()?;

    let windows = range.windows(Utc::now());
    tracing::info!(
        "Querying {} days of recordings in {} windows of up to {} days",
        range.period_days(),
        windows.len(),
        range.span_days()
    );
    let mut report =
        collect_recordings(&client, &windows).context("Aborted the recording report")?;
    for failure in &report.failures {
        eprintln!("Failed to query {}: {}", failure.window, failure.error);
    }

    let records = if args.detailed {
        let (rows, failures) = collect_access_details(&client, &report.rows)
            .context("Aborted the recording report")?;
        for failure in &failures {
            eprintln!(
                "Failed to get details of recording {:?}: {}",
                failure.recording_id, failure.error
            );
        }
        report.detail_failures = failures;
        records_from(&rows)?
    } else {
        report.rows.clone()
    };

    if args.detailed {
        eprintln!(
            "{} recordings found, {} windows queried, {} windows failed, {} recordings without details",
            report.rows.len(),
            report.windows_queried,
            report.failures.len(),
            report.detail_failures.len()
        );
    } else {
        eprintln!(
            "{} recordings found, {} windows queried, {} windows failed",
            report.rows.len(),
            report.windows_queried,
            report.failures.len()
        );
    }

    if records.is_empty() {
        writeln!(out, "No recording report found.")?;
        return Ok(report);
    }

    match &args.write {
        Some(write) => {
            let path = output_path(write);
            let file = std::fs::File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_records_csv(&records, BufWriter::new(file))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            writeln!(out, "Report was saved to {}", path.display())?;
        }
        None => write_records_csv(&records, &mut out)?,
    }

    if args.verbose > 0 {
        writeln!(out, "{}", serde_json::to_string_pretty(&records)?)?;
    }
    Ok(report)
}
