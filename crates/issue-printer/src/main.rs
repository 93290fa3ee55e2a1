mod archive;
mod cli;
mod color;
mod config;
mod fetch;
mod layout;
mod localize;
mod output;
mod render;
mod selftest;
mod slug;
mod store;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use config::Config;
use fetch::Fetcher;
use github_backend::GitHubClient;
use layout::{Layout, IMAGES_DIR};
use localize::Localizer;
use output::output_error;
use slug::RepoSlug;
use std::process::ExitCode;
use store::DirStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    init_tracing();
    color::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            output_error(&e);
            ExitCode::from(1)
        }
    }
}

/// Diagnostics go to stderr, filtered by RUST_LOG (default: warnings only)
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    if cli.test {
        let all_passed = output::print_selftest(&selftest::run());
        return Ok(if all_passed {
            ExitCode::SUCCESS
        } else {
            ExitCode::from(1)
        });
    }

    let Some(repository) = cli.repository() else {
        Cli::print_usage()?;
        return Ok(ExitCode::SUCCESS);
    };
    let slug: RepoSlug = repository.parse()?;

    // Credentials first: a configuration error must stop us before any I/O
    let config = Config::load()?;

    let layout = Layout::current_dir().context("Failed to resolve working directory")?;
    archive::ensure_target_free(&layout, &slug)?;

    let images = DirStore::open(layout.images_dir())
        .with_context(|| format!("Failed to create {}", layout.images_dir().display()))?;
    let documents = DirStore::open(layout.markdown_dir())
        .with_context(|| format!("Failed to create {}", layout.markdown_dir().display()))?;

    let client =
        GitHubClient::with_base_url(&config.api_url, slug.owner(), slug.repo(), &config.token)
            .with_user_agent(&config.user_agent);
    let localizer = Localizer::new(&images, &client, IMAGES_DIR);
    let fetcher = Fetcher::new(&client, &documents, &localizer, layout.raw_log_path());

    tracing::info!(repository = %slug, root = %layout.root().display(), "fetching issues");
    let report = fetcher.fetch_all(output::print_issue_number)?;

    let archive = archive::finalize(&layout, &slug)?;
    output::print_archived(&archive, &report);
    Ok(ExitCode::SUCCESS)
}
