//! Review CLI
//!
//! Terminal front end for the annotation service.
//!
//! # Usage
//!
//! ```bash
//! # Annotate free text, print the HTML overlay
//! tapioca-review annotate "Paris is a city"
//!
//! # Show the next document awaiting review
//! tapioca-review next --format text
//!
//! # Interactive gold-standard review loop
//! tapioca-review review
//! ```

use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tapioca_review::gold::item_choices;
use tapioca_review::types::DOI_BASE_URL;
use tapioca_review::{
    annotate_and_render, render, to_html, Advance, ClientConfig, HttpAnnotationClient, RenderMode,
    RenderNode, RenderTree, ReviewIntent, ReviewSession,
};

#[derive(Parser)]
#[command(name = "tapioca-review")]
#[command(version = "0.1.0")]
#[command(about = "Render entity-linking annotations and review candidate links")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base URL of the annotation service
    #[arg(long, global = true, env = "TAPIOCA_REVIEW_URL")]
    url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "TAPIOCA_REVIEW_TIMEOUT_SECS")]
    timeout: Option<u64>,

    /// Output format for rendered documents
    #[arg(long, short = 'f', global = true, default_value = "html", value_enum)]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Annotate free text (display only)
    Annotate {
        /// Text to annotate, read from stdin when omitted
        text: Option<String>,
    },
    /// Show the next document awaiting review without judging it
    Next,
    /// Review documents interactively until the source is exhausted
    Review {
        /// Stop after this many submitted documents
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Html,
    Text,
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = client_config(&cli)?;
    let client = HttpAnnotationClient::new(config)?;

    match cli.command {
        Commands::Annotate { text } => {
            let text = match text {
                Some(text) => text,
                None => io::read_to_string(io::stdin()).context("failed to read stdin")?,
            };
            let tree = annotate_and_render(&client, &text).await?;
            print_tree(&tree, cli.format)?;
        }
        Commands::Next => {
            use tapioca_review::AnnotationClient;

            match client.fetch_next_document().await? {
                Some(payload) => {
                    println!("# {}{}", DOI_BASE_URL, payload.id);
                    let tree = render(&payload.text, &payload.annotations, RenderMode::Review);
                    print_tree(&tree, cli.format)?;
                }
                None => println!("No documents left to review."),
            }
        }
        Commands::Review { limit } => review(client, limit).await?,
    }
    Ok(())
}

fn client_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = &cli.url {
        config = ClientConfig::new(url, config.timeout)?;
    }
    if let Some(secs) = cli.timeout {
        config.timeout = Duration::from_secs(secs);
    }
    Ok(config)
}

fn print_tree(tree: &RenderTree, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Html => println!("{}", to_html(tree)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(tree)?),
        OutputFormat::Text => print!("{}", text_view(tree)),
    }
    Ok(())
}

/// Mentions in brackets, candidate rows listed after the text
fn text_view(tree: &RenderTree) -> String {
    let mut body = String::new();
    let mut panels = String::new();

    for node in &tree.nodes {
        match node {
            RenderNode::PlainText { content } => body.push_str(content),
            RenderNode::AnnotatedSpan {
                index,
                mention,
                panel,
            } => {
                body.push_str(&format!("[{}]{{{}}}", mention, index));
                panels.push_str(&format!("\n{{{}}} {}\n", index, mention));
                for row in &panel.rows {
                    let marker = if row.predicted { '*' } else { ' ' };
                    panels.push_str(&format!("  {} {}  {}\n", marker, row.label, row.url));
                    if !row.description.is_empty() {
                        panels.push_str(&format!("      {}\n", row.description));
                    }
                    panels.push_str(&format!("      {} | {}", row.scores, row.counts));
                    if let Some(score) = &row.score {
                        panels.push_str(&format!(" | {}", score));
                    }
                    panels.push('\n');
                }
            }
        }
    }

    format!("{}\n{}", body, panels)
}

/// How the reviewer left a document
enum Verdict {
    Judged,
    Skipped,
    EndOfInput,
}

async fn review(client: HttpAnnotationClient, limit: Option<usize>) -> Result<()> {
    let mut session = ReviewSession::new(client);
    let mut lines = io::stdin().lock().lines();

    let mut advance = session.start().await?;
    while advance == Advance::Loaded {
        let Some(tree) = session.tree().cloned() else {
            break;
        };
        if let Some(document) = session.document() {
            println!("\n=== {} ===", document.doi_url());
        }
        print!("{}", text_view(&tree));

        advance = match judge_document(&mut session, &tree, &mut lines).await? {
            Verdict::EndOfInput => break,
            Verdict::Skipped => session.next_doc().await?,
            Verdict::Judged => {
                let judgments = session.judgments()?;
                for ((start, end), choice) in item_choices(&judgments) {
                    println!("{}..{} -> {}", start, end, choice.as_deref().unwrap_or("none"));
                }
                let advance = session.submit().await?;
                if limit.is_some_and(|limit| session.submitted() >= limit) {
                    break;
                }
                match advance {
                    Advance::FetchFailed(err) => {
                        tracing::warn!(error = %err, "judgments stored, retrying the next fetch");
                        session.next_doc().await?
                    }
                    advance => advance,
                }
            }
        };
    }

    println!("\nSubmitted {} document(s).", session.submitted());
    Ok(())
}

/// Prompt for every candidate row and feed the answers to the session.
async fn judge_document(
    session: &mut ReviewSession<HttpAnnotationClient>,
    tree: &RenderTree,
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> Result<Verdict> {
    for panel in tree.panels() {
        for row in &panel.rows {
            print!(
                "{}..{} {} valid? [y/N, s = skip document] ",
                panel.start, panel.end, row.label
            );
            io::stdout().flush()?;

            let Some(answer) = lines.next() else {
                return Ok(Verdict::EndOfInput);
            };
            match answer?.trim() {
                "s" | "S" => return Ok(Verdict::Skipped),
                "y" | "Y" => {
                    session
                        .dispatch(ReviewIntent::Toggle {
                            candidate_id: row.candidate_id.clone(),
                            start: panel.start,
                            end: panel.end,
                            checked: true,
                        })
                        .await?;
                }
                _ => {}
            }
        }
    }
    Ok(Verdict::Judged)
}
