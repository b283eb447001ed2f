use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::SlideSyncClient;
use serde::Serialize;
use shared::{
    domain::ElementId,
    protocol::{SaveElementRequest, SubmitResponseRequest},
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(about = "Control and inspect a presentation sync server")]
struct Cli {
    #[arg(long, env = "SLIDESYNC_SERVER_URL", default_value = "http://127.0.0.1:3000")]
    server_url: String,
    #[arg(long, env = "SLIDESYNC_ADMIN_KEY", hide_env_values = true)]
    admin_key: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show server health and counters.
    Health,
    /// Print the current slide.
    Slide,
    /// Announce a slide change.
    SetSlide { name: String },
    /// Print every slide change until interrupted.
    Watch {
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,
    },
    /// List all interactive elements.
    Elements,
    /// Create or overwrite an element.
    SaveElement {
        id: String,
        #[arg(long = "type")]
        kind: String,
        #[arg(long)]
        title: String,
        #[arg(long = "option")]
        options: Vec<String>,
    },
    /// Show one element definition.
    Element { id: String },
    DeleteElement { id: String },
    /// Submit a response on behalf of an audience member.
    Respond {
        element_id: String,
        #[arg(long)]
        user: String,
        #[arg(long, allow_negative_numbers = true)]
        option: Option<i64>,
        #[arg(long)]
        text: Option<String>,
        /// Label of the chosen option, recorded alongside the index.
        #[arg(long)]
        option_text: Option<String>,
    },
    Responses { element_id: String },
    Results { element_id: String },
    /// Clear every recorded response (needs --admin-key).
    ClearResponses,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let cli = Cli::parse();

    let mut client = SlideSyncClient::new(&cli.server_url)
        .with_context(|| format!("invalid server url '{}'", cli.server_url))?;
    if let Some(key) = cli.admin_key {
        client = client.with_admin_key(key);
    }

    match cli.command {
        Command::Health => print_json(&client.health().await?)?,
        Command::Slide => print_json(&client.current_slide().await?)?,
        Command::SetSlide { name } => {
            let ack = client.set_slide(&name).await?;
            info!(slide = %ack.current_slide, "slide announced");
            print_json(&ack)?;
        }
        Command::Watch { interval_ms } => {
            let mut watcher = client.watch_slides(Duration::from_millis(interval_ms));
            loop {
                tokio::select! {
                    change = watcher.next_change() => {
                        let slide = change?;
                        println!("{}\t{}", slide.timestamp.to_rfc3339(), slide.current_slide);
                    }
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
        }
        Command::Elements => print_json(&client.list_elements().await?)?,
        Command::SaveElement {
            id,
            kind,
            title,
            options,
        } => {
            let element = client
                .save_element(&SaveElementRequest {
                    id: Some(id),
                    kind: Some(kind),
                    title: Some(title),
                    options: Some(options),
                })
                .await?;
            print_json(&element)?;
        }
        Command::Element { id } => print_json(&client.element(&ElementId::new(id)).await?)?,
        Command::DeleteElement { id } => {
            print_json(&client.delete_element(&ElementId::new(id)).await?)?
        }
        Command::Respond {
            element_id,
            user,
            option,
            text,
            option_text,
        } => {
            let ack = client
                .submit_response(&SubmitResponseRequest {
                    element_id: Some(element_id),
                    user: Some(user),
                    response: text,
                    option,
                    option_text,
                })
                .await?;
            print_json(&ack)?;
        }
        Command::Responses { element_id } => {
            print_json(&client.responses(&ElementId::new(element_id)).await?)?
        }
        Command::Results { element_id } => {
            print_json(&client.results(&ElementId::new(element_id)).await?)?
        }
        Command::ClearResponses => print_json(&client.clear_responses().await?)?,
    }

    Ok(())
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
