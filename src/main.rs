//! ticket-desk - Support ticket desk
//!
//! Entry point for the ticket-desk CLI. Parses arguments, loads
//! configuration and dispatches to the command handlers.

use clap::Parser;
use std::process;
use ticket_desk::cli::handlers::{
    HandlerContext, ImportCommandArgs, ListCommandArgs, handle_board_command,
    handle_create_command, handle_delete_command, handle_export_command, handle_import_command,
    handle_list_command, handle_priority_command, handle_show_command, handle_update_command,
};
use ticket_desk::cli::{Cli, Commands, OutputFormatter};
use ticket_desk::config::AppConfig;
use ticket_desk::core::{NewTicket, TicketPatch};
use ticket_desk::error::{Result, TicketDeskError};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let formatter = OutputFormatter::new(cli.json, cli.no_color);
    init_logging(cli.verbose);

    if let Err(e) = run(cli, &formatter).await {
        handle_error(&e, &formatter);
        process::exit(1);
    }
}

/// Log to stderr; `RUST_LOG` wins over `--verbose`
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli, formatter: &OutputFormatter) -> Result<()> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(backend) = cli.backend {
        config.storage.backend = backend;
    }
    if let Some(data_dir) = cli.data_dir {
        config.storage.data_dir = data_dir;
    }

    let ctx = HandlerContext::open(config).await?;
    dispatch_command(cli.command, &ctx, formatter).await
}

async fn dispatch_command(
    command: Commands,
    ctx: &HandlerContext,
    formatter: &OutputFormatter,
) -> Result<()> {
    match command {
        Commands::List {
            search,
            priority,
            sort,
            direction,
            page,
            page_size,
        } => handle_list_command(
            ctx,
            ListCommandArgs {
                search,
                priority,
                sort,
                direction,
                page,
                page_size,
            },
            formatter,
        ),
        Commands::Show { id } => handle_show_command(ctx, &id, formatter),
        Commands::Create {
            name,
            surname,
            company,
            email,
            description,
            priority,
        } => {
            let ticket = NewTicket {
                name,
                surname,
                company,
                email,
                description,
                priority,
            };
            handle_create_command(ctx, ticket, formatter).await
        },
        Commands::Update {
            id,
            name,
            surname,
            company,
            email,
            description,
            priority,
        } => {
            let patch = TicketPatch {
                name,
                surname,
                company,
                email,
                description,
                priority,
            };
            handle_update_command(ctx, &id, patch, formatter).await
        },
        Commands::Priority { id, priority } => {
            handle_priority_command(ctx, &id, priority, formatter).await
        },
        Commands::Delete { id } => handle_delete_command(ctx, &id, formatter).await,
        Commands::Board => handle_board_command(ctx, formatter),
        Commands::Import {
            file,
            content_type,
            duplicates,
            key,
            dry_run,
        } => {
            let args = ImportCommandArgs {
                file,
                content_type,
                duplicates,
                key,
                dry_run,
            };
            handle_import_command(ctx, args, formatter).await
        },
        Commands::Export {
            format,
            no_metadata,
            filename,
            out_dir,
        } => handle_export_command(ctx, format, no_metadata, filename, &out_dir, formatter),
    }
}

/// Show a failure the way users expect: a generic notice, the cause, and a hint
fn handle_error(error: &TicketDeskError, formatter: &OutputFormatter) {
    formatter.error(error.user_notice());
    formatter.error(&error.to_string());

    let suggestion = error.suggestion();
    if let Some(suggestion) = &suggestion {
        formatter.info(&format!("\nSuggestion: {suggestion}"));
    }

    if formatter.is_json() {
        let _ = formatter.print_json(&serde_json::json!({
            "status": "error",
            "notice": error.user_notice(),
            "error": error.to_string(),
            "suggestion": suggestion,
        }));
    }

    if tracing::enabled!(tracing::Level::DEBUG) {
        eprintln!("\nDebug information:");
        eprintln!("{error:?}");
    }
}
