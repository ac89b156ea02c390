use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use lazydialog::app::App;
use lazydialog::config::{self, KeyResolver};
use lazydialog::overlay::Document;
use lazydialog::{cli, commands, theme};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let _guard = initialize_logging()?;
    info!("Starting lazydialog");

    let args = cli::Args::parse();

    let config = config::load(args.config.as_deref())?;
    let resolver = Arc::new(KeyResolver::new(Arc::new(config.keybindings.clone())));
    let theme_name = args.theme.as_deref().unwrap_or(&config.theme.name);
    let theme = theme::theme_from_name(theme_name).with_palette(&config.theme.palette)?;

    let mut app = App::new(Document::global(), theme, resolver);
    let outcome = commands::run(args.command, &mut app).await?;

    if let Some(output) = &outcome.output {
        println!("{output}");
    }
    info!(affirmative = outcome.affirmative, "Exiting");
    Ok(outcome.exit_code())
}

fn initialize_logging() -> Result<WorkerGuard> {
    let directory = dirs::data_local_dir().map_or_else(
        || std::path::PathBuf::from("logs"),
        |path| path.join("lazydialog").join("logs"),
    );
    std::fs::create_dir_all(&directory)?;

    let file_appender = tracing_appender::rolling::daily(&directory, "lazydialog.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true),
        )
        .init();

    Ok(guard)
}
