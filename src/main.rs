//! `brainbox` command-line entry point.
//!
//! A thin shell over [`CatalogClient`]: every invocation loads the collection,
//! applies the requested change or query, waits for the remote store to answer
//! and prints one rendered page.
//!
//! # Commands
//!
//! ```text
//! brainbox list                         all items, first page
//! brainbox --type link --sub github.com list
//! brainbox search "borrow checker"      ranked results
//! brainbox add note "Title" --content "..." --tags rust,async
//! brainbox add document "Paper" --file ./paper.pdf
//! brainbox edit <id> link "Title" --url https://...
//! brainbox rm <id>
//! ```
//!
//! Global flags: `--config <file>`, `--type <note|link|document|video>`,
//! `--sub <domain|extension>`, `--page <n>`, `--page-size <8|12|16|24>`.

#![allow(clippy::multiple_crate_versions)]

use brainbox::domain::{parse_tags, FileAttachment};
use brainbox::observability::{init_tracing, shutdown_tracing};
use brainbox::ui::{render, RenderOptions};
use brainbox::{CatalogClient, CatalogError, Config, Event, ItemDraft, ItemId, ItemType};
use clap::{Args, Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Instrument;

#[derive(Debug, Parser)]
#[command(name = "brainbox", version, about = "Browse and search your personal content catalog")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show only items of this type.
    #[arg(long = "type", global = true, value_name = "TYPE")]
    filter_type: Option<ItemType>,

    /// Link domain or document extension, together with --type.
    #[arg(long, global = true)]
    sub: Option<String>,

    /// 1-based page to show.
    #[arg(long, global = true, default_value_t = 1)]
    page: usize,

    /// Items per page.
    #[arg(long, global = true)]
    page_size: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List items.
    List,

    /// Search items by meaning.
    Search { query: String },

    /// Create an item.
    Add(DraftArgs),

    /// Replace an item's fields.
    Edit {
        id: String,
        #[command(flatten)]
        draft: DraftArgs,
    },

    /// Delete an item.
    Rm { id: String },
}

#[derive(Debug, Args)]
struct DraftArgs {
    kind: ItemType,

    title: String,

    /// Comma-separated tags.
    #[arg(long, default_value = "")]
    tags: String,

    /// Note text.
    #[arg(long)]
    content: Option<String>,

    /// Link or video target.
    #[arg(long)]
    url: Option<String>,

    /// Document to upload.
    #[arg(long)]
    file: Option<PathBuf>,
}

impl DraftArgs {
    fn into_draft(self) -> brainbox::Result<ItemDraft> {
        let mut draft = ItemDraft::new(self.title, self.kind).with_tags(parse_tags(&self.tags));
        if let Some(content) = self.content {
            draft = draft.with_content(content);
        }
        if let Some(url) = self.url {
            draft = draft.with_url(url);
        }
        if let Some(path) = self.file {
            draft = draft.with_file(FileAttachment::from_path(&path)?);
        }
        Ok(draft)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("brainbox: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config);

    let span = tracing::debug_span!("cli_run", command = ?cli.command);
    let code = match run(cli, &config).instrument(span).await {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("brainbox: {e}");
            ExitCode::FAILURE
        }
    };
    shutdown_tracing();
    code
}

async fn run(cli: Cli, config: &Config) -> brainbox::Result<ExitCode> {
    let mut client = CatalogClient::from_config(config)?;

    client.send(Event::Refresh)?;
    client.settle().await;

    let mut query = None;
    match cli.command {
        Command::List => {}
        Command::Search { query: q } => query = Some(q),
        Command::Add(args) => {
            client.send(Event::CreateItem(args.into_draft()?))?;
        }
        Command::Edit { id, draft } => {
            client.send(Event::UpdateItem {
                id: ItemId::new(id),
                draft: draft.into_draft()?,
            })?;
        }
        Command::Rm { id } => {
            client.send(Event::DeleteItem(ItemId::new(id)))?;
        }
    }
    client.settle().await;

    if let Some(page_size) = cli.page_size {
        client.send(Event::SetPageSize(page_size))?;
    }
    if let Some(kind) = cli.filter_type {
        client.send(Event::SetPrimaryFilter(Some(kind)))?;
        if let Some(sub) = cli.sub {
            client.send(Event::SetSecondaryFilter { kind, key: Some(sub) })?;
        }
    } else if cli.sub.is_some() {
        return Err(CatalogError::InvalidFilter("--sub requires --type".to_string()));
    }

    if let Some(query) = query {
        client.send(Event::SubmitSearch(query))?;
        client.settle().await;
    }
    client.send(Event::SetPage(cli.page))?;

    let options = RenderOptions {
        ansi: std::io::stdout().is_terminal(),
    };
    render(client.state(), &mut std::io::stdout().lock(), options)?;

    let state = client.state();
    let failed = state.store.error().is_some() || state.search.error().is_some();
    Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}
