use anyhow::Context;
use clap::Parser;
use secrecy::SecretString;
use webextools::cli::Cli;
use webextools::configuration::get_configuration;
use webextools::startup::Application;
use webextools::telemetry::{filter_for_verbosity, get_subscriber, init_subscriber};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Get config settings
    let configuration =
        get_configuration(cli.config.as_deref()).context("Failed to read configuration.")?;

    // Set up tracing telemetry on stderr, keeping stdout for reports.
    let filter = filter_for_verbosity(cli.command.verbosity());
    let subscriber = get_subscriber(filter, configuration.logging.format, std::io::stderr);
    init_subscriber(subscriber);

    Application::build(configuration, cli.token.map(SecretString::from)).run(cli.command)
}
