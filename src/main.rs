use clap::{Args, Parser, Subcommand};
use meshdash::Result;
use meshdash::backend::{Backend, HttpBackend, OutgoingMessage};
use meshdash::config::{ConfigFile, DashboardConfig, Overrides};
use meshdash::dashboard::{Dashboard, TableSort};
use meshdash::diagnostics;
use meshdash::node_index::node_id_suggestions;
use meshdash::query::{Mode, Query, evaluate, query_from_args};
use meshdash::record::{self, MessageRecord, NodeRecord};
use meshdash::render::render_dashboard_html;
use meshdash::sync::Cadence;
use meshdash::view::{MessageColumn, NodeColumn, SortSpec};
use meshdash::watch::{self, QueryFileWatch, WatchOptions, open_query_file};

use anyhow::Context;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "meshdash")]
#[command(about = "Dashboard for a mesh-radio relay", long_about = None)]
struct Cli {
    /// JSON config file (CLI flags override its values).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Relay backend base URL.
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Log filter, e.g. `info` or `meshdash=debug`. RUST_LOG wins.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Args)]
struct QueryArgs {
    /// How tokens combine.
    #[arg(long, value_enum, default_value_t = Mode::And)]
    mode: Mode,

    /// Filter token `<property><op><value>`; op is one of = != : !:
    #[arg(short = 'f', long = "filter")]
    filters: Vec<String>,

    /// Query in property filter JSON form. Re-read while watching.
    #[arg(long, conflicts_with = "filters")]
    query_file: Option<PathBuf>,

    /// Start without any filter token.
    #[arg(long)]
    clear_filters: bool,
}

#[derive(Args)]
struct SortArgs {
    /// Message column to sort by, `column[:asc|:desc]`.
    #[arg(long)]
    sort_messages: Option<SortSpec<MessageColumn>>,

    /// Node column to sort by, `column[:asc|:desc]`.
    #[arg(long)]
    sort_nodes: Option<SortSpec<NodeColumn>>,
}

impl SortArgs {
    fn table_sort(&self) -> TableSort {
        TableSort {
            messages: self.sort_messages,
            nodes: self.sort_nodes,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the relay and keep an HTML dashboard up to date.
    Watch {
        #[arg(short = 'o', long)]
        out: PathBuf,

        #[arg(long)]
        message_interval_ms: Option<u64>,

        #[arg(long)]
        node_interval_ms: Option<u64>,

        #[command(flatten)]
        query: QueryArgs,

        #[command(flatten)]
        sort: SortArgs,
    },

    /// Render an HTML dashboard from snapshot files.
    Report {
        #[arg(long)]
        messages: PathBuf,

        #[arg(long)]
        nodes: PathBuf,

        #[arg(short = 'o', long)]
        out: PathBuf,

        #[command(flatten)]
        query: QueryArgs,

        #[command(flatten)]
        sort: SortArgs,
    },

    /// Print the messages of a snapshot file that pass the query, as JSON.
    Filter {
        #[arg(long)]
        messages: PathBuf,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// Send a message through the relay.
    Send {
        /// Node id, or `^all` to broadcast.
        #[arg(long)]
        destination: String,

        #[arg(long)]
        message: String,
    },

    /// List known destinations.
    Nodes,
}

fn resolve_query(args: &QueryArgs) -> Result<(Query, Option<QueryFileWatch>)> {
    if let Some(path) = &args.query_file {
        let (query, watch) = open_query_file(path)?;
        return Ok((query, Some(watch)));
    }
    let query = query_from_args(args.mode, &args.filters, args.clear_filters)?;
    Ok((query, None))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let file = cli.config.as_deref().map(ConfigFile::load).transpose()?;
    let (message_interval_ms, node_interval_ms) = match &cli.cmd {
        Commands::Watch {
            message_interval_ms,
            node_interval_ms,
            ..
        } => (*message_interval_ms, *node_interval_ms),
        _ => (None, None),
    };
    let config = DashboardConfig::resolve(
        file,
        Overrides {
            backend_url: cli.backend.clone(),
            message_interval_ms,
            node_interval_ms,
            log_level: cli.log_level.clone(),
        },
    )?;

    diagnostics::init(&config.log_level);

    match cli.cmd {
        Commands::Watch {
            out, query, sort, ..
        } => {
            let (query, query_file) = resolve_query(&query)?;
            let refresh_secs = config.message_interval.as_secs().max(1);
            let dashboard = Dashboard::new(query)
                .with_sort(sort.table_sort())
                .with_refresh(refresh_secs);

            let backend = Arc::new(HttpBackend::from_config(&config));
            let cadence = Cadence {
                messages: config.message_interval,
                nodes: config.node_interval,
            };

            tracing::info!(backend = %config.backend_url, out = %out.display(), "watching relay");

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("start async runtime")?;
            runtime.block_on(watch::run(
                backend,
                cadence,
                dashboard,
                WatchOptions { out, query_file },
                async {
                    if let Err(err) = tokio::signal::ctrl_c().await {
                        tracing::error!(%err, "cannot listen for Ctrl+C");
                        std::future::pending::<()>().await;
                    }
                },
            ))?;
        }

        Commands::Report {
            messages,
            nodes,
            out,
            query,
            sort,
        } => {
            let (query, _) = resolve_query(&query)?;
            let messages = record::load_snapshot::<MessageRecord>(&messages)?;
            let nodes = record::load_snapshot::<NodeRecord>(&nodes)?;

            let mut dashboard = Dashboard::new(query).with_sort(sort.table_sort());
            dashboard.publish_messages(messages);
            dashboard.publish_nodes(nodes);

            let html = render_dashboard_html(&dashboard.view())?;
            std::fs::write(&out, html).with_context(|| format!("write {}", out.display()))?;
            println!("Wrote {}", out.display());
        }

        Commands::Filter { messages, query } => {
            let (query, _) = resolve_query(&query)?;
            let snapshot = record::load_snapshot::<MessageRecord>(&messages)?;

            let view = evaluate(&snapshot, &query);
            println!("{}", serde_json::to_string_pretty(&view.to_records())?);
            eprintln!("{}", view.count_text());
        }

        Commands::Send {
            destination,
            message,
        } => {
            let outgoing = OutgoingMessage::new(&destination, message)?;

            let backend = HttpBackend::from_config(&config);
            backend.send_message(&outgoing)?;
            tracing::info!(destination = %outgoing.destination, "message sent");
        }

        Commands::Nodes => {
            let backend = HttpBackend::from_config(&config);
            let nodes = backend.fetch_nodes()?;
            for id in node_id_suggestions(&nodes) {
                println!("{id}");
            }
        }
    }

    Ok(())
}
