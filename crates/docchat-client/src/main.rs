//! `docchat` – browse and delete chat history from the terminal.

use std::io::{self, BufRead, Write};

use anyhow::Context;
use clap::{Parser, Subcommand};
use docchat_client::{HistoryDisplay, HistoryView, HttpHistoryApi, Route};

#[derive(Parser)]
#[command(name = "docchat")]
#[command(author, version, about = "Browse and delete docchat history", long_about = None)]
struct Cli {
    /// Base URL of docchat-server
    #[arg(long, env = "DOCCHAT_SERVER", default_value = "http://127.0.0.1:3000")]
    server: String,

    /// Session token sent as a bearer credential
    #[arg(long, env = "DOCCHAT_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List your chats, newest first
    List,

    /// Delete one of your chats
    Delete {
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let api = HttpHistoryApi::new(&cli.server, cli.token)?;
    let mut view = HistoryView::new(api, Route::Home);
    view.mount().await;

    match cli.command {
        Commands::List => print_history(&view.display(), &view.header_label()),
        Commands::Delete { id, yes } => {
            view.request_delete(id.clone());
            if yes || confirm(&id)? {
                view.confirm_delete().await?;
                println!("Chat {id} deleted");
                print_history(&view.display(), &view.header_label());
            } else {
                view.cancel_delete();
                println!("Cancelled");
            }
        }
    }
    Ok(())
}

fn confirm(id: &str) -> anyhow::Result<bool> {
    print!(
        "This will permanently delete chat {id} and remove it from the server. Continue? [y/N] "
    );
    io::stdout().flush().context("failed to flush prompt")?;
    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("failed to read answer")?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn print_history(display: &HistoryDisplay, label: &str) {
    println!("History ({label})");
    match display {
        HistoryDisplay::LoginPrompt => println!("Login to save and revisit previous chats!"),
        HistoryDisplay::Skeleton(_) => println!("Loading..."),
        HistoryDisplay::Empty => println!("No chats found"),
        HistoryDisplay::Unavailable(msg) => println!("History unavailable: {msg}"),
        HistoryDisplay::Entries(entries) => {
            for entry in entries {
                let marker = if entry.active { "*" } else { " " };
                println!("{marker} {}  {}", entry.id, entry.title);
            }
        }
    }
}
