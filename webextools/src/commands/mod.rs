pub mod disable_users;
pub mod recording_report;
