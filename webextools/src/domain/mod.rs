mod disable_result;
mod email_address;
mod report_period;

pub use disable_result::{DisableResult, DisableSummary, UpdateStatus};
pub use email_address::EmailAddress;
pub use report_period::ReportPeriod;
pub use webex_api::recordings::{RecordingAccessRow, RecordingRow};
pub use webex_api::time_ranges::TimeWindow;
