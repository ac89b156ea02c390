use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "lazydialog", version, about = "Modal dialogs for the terminal")]
pub struct Args {
    /// Theme name (e.g., "Catppuccin Latte")
    #[arg(long, global = true)]
    pub theme: Option<String>,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct Text {
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub message: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show a message and wait until it is dismissed
    Alert {
        #[command(flatten)]
        text: Text,
        #[arg(long, default_value = "OK")]
        ok_label: String,
    },
    /// Ask a yes/no question; exits 0 on yes
    Confirm {
        #[command(flatten)]
        text: Text,
        #[arg(long, default_value = "No")]
        no_label: String,
        #[arg(long, default_value = "Yes")]
        yes_label: String,
    },
    /// Ask for one line of text and print it
    Prompt {
        #[command(flatten)]
        text: Text,
        #[arg(long)]
        placeholder: Option<String>,
        /// Initial value
        #[arg(long)]
        value: Option<String>,
        /// Adds a cancel button
        #[arg(long)]
        cancel_label: Option<String>,
        #[arg(long, default_value = "OK")]
        ok_label: String,
    },
    /// Show a form described by a TOML or JSON file and print the result as JSON
    Form { file: PathBuf },
    /// Show a spinner until the time is up or the user quits
    Loading {
        #[arg(long)]
        message: Option<String>,
        #[arg(long)]
        seconds: Option<f64>,
    },
}
