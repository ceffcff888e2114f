// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use text_scanner::app::AppModel;
use text_scanner::constants::{app_info, ui};
use text_scanner::i18n;

mod cli;

#[derive(Parser)]
#[command(name = "text-scanner")]
#[command(about = "Text recognition for the COSMIC desktop")]
#[command(version = env!("GIT_VERSION"))]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Recognize the text in an image file and print it
    Recognize {
        /// Image file to read
        file: PathBuf,
    },

    /// Capture a still from the camera
    Capture {
        /// Output file path (default: ~/Pictures/text-scanner/scan_TIMESTAMP_ID.jpg)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run the translation experiment
    Translate {
        /// Text to translate (default: a built-in sample)
        text: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=text_scanner=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Recognize { file }) => Ok(cli::recognize_file(file)?),
        Some(Commands::Capture { output }) => Ok(cli::capture_photo(output)?),
        Some(Commands::Translate { text }) => Ok(cli::translate_text(text)?),
        None => run_gui(),
    }
}

fn run_gui() -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        version = app_info::version(),
        runtime = app_info::runtime_environment(),
        "Starting Text Scanner"
    );

    // Get the system's preferred languages.
    let requested_languages = i18n_embed::DesktopLanguageRequester::requested_languages();

    // Enable localizations to be applied.
    i18n::init(&requested_languages);

    // Settings for configuring the application window and iced runtime.
    let settings = cosmic::app::Settings::default().size_limits(
        cosmic::iced::Limits::NONE
            .min_width(ui::MIN_WINDOW_WIDTH)
            .min_height(ui::MIN_WINDOW_HEIGHT),
    );

    // Starts the application's event loop with `()` as the application's flags.
    cosmic::app::run::<AppModel>(settings, ())?;

    Ok(())
}
