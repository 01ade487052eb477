//! CLI entry point for outcli.

use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context as _, Result, anyhow};
use clap::Parser;
use outline_core::{
    Client, Collection, Context, Document, Error, ListStep, RetryPolicy, Temporary, is_temporary,
};
use serde::Serialize;
use tracing::{debug, warn};

mod cli;

use cli::{Args, AttachmentCommand, CollectionCommand, Command, DocumentCommand};

/// Attempts per page before a list command gives up on temporary errors.
const LIST_MAX_ATTEMPTS: u32 = 3;
const LIST_BASE_DELAY: Duration = Duration::from_millis(500);
const LIST_MAX_DELAY: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (warn)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // stdout carries JSON results only
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(command = ?args.command, "CLI arguments parsed");

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            if err.chain().any(is_temporary) {
                eprintln!("This error is temporary; retrying later may succeed.");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    if matches!(args.command, Command::Version) {
        println!("outcli {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let server = args
        .server
        .as_deref()
        .ok_or_else(|| anyhow!("no server given; pass --server or set OUTLINE_SERVER"))?;
    let key = args
        .key
        .clone()
        .ok_or_else(|| anyhow!("no API key given; pass --key or set OUTLINE_API_KEY"))?;

    let client = Client::builder(server, key)
        .request_timeout(Duration::from_secs(args.timeout))
        .build()
        .context("failed to configure client")?;

    let ctx = Context::background();
    let on_interrupt = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling");
            on_interrupt.cancel();
        }
    });

    match args.command {
        Command::Version => Ok(()),
        Command::Collection(command) => collection(&client, &ctx, command).await,
        Command::Document(command) => document(&client, &ctx, command).await,
        Command::Attachment(command) => attachment(&client, &ctx, command).await,
    }
}

async fn collection(client: &Client, ctx: &Context, command: CollectionCommand) -> Result<()> {
    let collections = client.collections();
    match command {
        CollectionCommand::Info { ids } => {
            for id in ids {
                print_json(&collections.get(id).send(ctx).await?)?;
            }
        }
        CollectionCommand::Create {
            name,
            description,
            color,
            permission,
            private,
        } => {
            let mut builder = collections.create(name).private(private);
            if let Some(description) = description {
                builder = builder.description(description);
            }
            if let Some(color) = color {
                builder = builder.color(color);
            }
            if permission.permission_read {
                builder = builder.permission_read();
            } else if permission.permission_read_write {
                builder = builder.permission_read_write();
            }
            print_json(&builder.send(ctx).await?)?;
        }
        CollectionCommand::Docs { ids } => {
            for id in ids {
                print_json(&collections.document_structure(id).send(ctx).await?)?;
            }
        }
        CollectionCommand::List { limit } => {
            collections
                .list()
                .limit(limit)
                .retry_policy(list_retry_policy())
                .send(ctx, print_item::<Collection>)
                .await?;
        }
        CollectionCommand::Update {
            id,
            name,
            description,
            color,
            permission,
        } => {
            let mut builder = collections.update(id);
            if let Some(name) = name {
                builder = builder.name(name);
            }
            if let Some(description) = description {
                builder = builder.description(description);
            }
            if let Some(color) = color {
                builder = builder.color(color);
            }
            if permission.permission_read {
                builder = builder.permission_read();
            } else if permission.permission_read_write {
                builder = builder.permission_read_write();
            }
            print_json(&builder.send(ctx).await?)?;
        }
    }
    Ok(())
}

async fn document(client: &Client, ctx: &Context, command: DocumentCommand) -> Result<()> {
    let documents = client.documents();
    match command {
        DocumentCommand::Create {
            title,
            collection_id,
            text_stdin,
            publish,
            parent,
        } => {
            let mut builder = documents.create(title, collection_id).publish(publish);
            if text_stdin {
                builder = builder.text(read_stdin()?);
            }
            if let Some(parent) = parent {
                builder = builder.parent_document_id(parent);
            }
            print_json(&builder.send(ctx).await?)?;
        }
        DocumentCommand::Get { id, share } => {
            let builder = if share {
                documents.get_by_share_id(id)
            } else {
                documents.get(id)
            };
            print_json(&builder.send(ctx).await?)?;
        }
        DocumentCommand::List {
            collection,
            parent,
            limit,
        } => {
            let mut builder = documents
                .list()
                .limit(limit)
                .retry_policy(list_retry_policy());
            if let Some(collection) = collection {
                builder = builder.collection(collection);
            }
            if let Some(parent) = parent {
                builder = builder.parent(parent);
            }
            builder.send(ctx, print_item::<Document>).await?;
        }
        DocumentCommand::Update {
            id,
            title,
            text_stdin,
            append,
            publish,
        } => {
            let mut builder = documents.update(id).append(append).publish(publish);
            if let Some(title) = title {
                builder = builder.title(title);
            }
            if text_stdin {
                builder = builder.text(read_stdin()?);
            }
            print_json(&builder.send(ctx).await?)?;
        }
    }
    Ok(())
}

async fn attachment(client: &Client, ctx: &Context, command: AttachmentCommand) -> Result<()> {
    match command {
        AttachmentCommand::Create {
            name,
            content_type,
            size,
            document,
        } => {
            let mut builder = client.attachments().create(name, content_type, size);
            if let Some(document) = document {
                builder = builder.document_id(document);
            }
            print_json(&builder.send(ctx).await?)?;
        }
    }
    Ok(())
}

fn list_retry_policy() -> RetryPolicy {
    RetryPolicy::exponential(LIST_MAX_ATTEMPTS, LIST_BASE_DELAY, LIST_MAX_DELAY)
}

/// List callback: prints each item, retries temporary page errors, aborts on the rest.
fn print_item<T: Serialize>(item: Result<T, Error>) -> ListStep<anyhow::Error> {
    match item {
        Ok(value) => match print_json(&value) {
            Ok(()) => ListStep::Continue,
            Err(err) => ListStep::fail(err),
        },
        Err(err) if err.is_temporary() => {
            warn!(error = %err, "temporary failure, retrying page");
            ListStep::Continue
        }
        Err(err) => ListStep::fail(err.into()),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value).context("failed to write JSON")?;
    writeln!(out).context("failed to write JSON")?;
    Ok(())
}

fn read_stdin() -> Result<String> {
    io::read_to_string(io::stdin()).context("failed to read text from stdin")
}
