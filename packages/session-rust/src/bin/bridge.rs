//! Widget Sync Bridge (`widget-sync-bridge`)
//!
//! Runs one widget session against a host speaking length-prefixed frames on
//! stdin/stdout. Logs go to stderr.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use widget_sync_core::{ConfigDefinition, WireFormat};
use widget_sync_session::{
    run_inbound, stdio, BridgeConfig, ChannelOutbox, TracingObserver, WidgetBridge,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Json,
    Msgpack,
}

impl From<FormatArg> for WireFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Json => Self::Json,
            FormatArg::Msgpack => Self::MsgPack,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "widget-sync-bridge", version, about = "Widget config sync bridge")]
struct Args {
    /// JSON file holding the config definition
    #[arg(long, env = "WIDGET_SYNC_SCHEMA")]
    schema: PathBuf,

    /// Run without a host: serve schema defaults and never send anything
    #[arg(long, env = "WIDGET_SYNC_STANDALONE")]
    standalone: bool,

    /// Envelope encoding on stdin/stdout
    #[arg(long, value_enum, default_value = "json", env = "WIDGET_SYNC_FORMAT")]
    format: FormatArg,

    /// Outbound queue capacity
    #[arg(long, default_value_t = 256, env = "WIDGET_SYNC_QUEUE_CAPACITY")]
    queue_capacity: usize,

    /// Emit logs as JSON lines
    #[arg(long, env = "WIDGET_SYNC_LOG_JSON")]
    log_json: bool,

    /// Verbose logging (-v for debug, -vv for trace)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose, args.log_json);

    let raw = std::fs::read_to_string(&args.schema)
        .with_context(|| format!("reading schema {}", args.schema.display()))?;
    let definition: ConfigDefinition =
        serde_json::from_str(&raw).context("parsing config definition")?;

    let config = BridgeConfig {
        embedded: !args.standalone,
        wire_format: args.format.into(),
        outbound_channel_capacity: args.queue_capacity,
        ..BridgeConfig::default()
    };

    let (outbox, outbound) = ChannelOutbox::channel(config.outbound_channel_capacity);
    let bridge = WidgetBridge::new(definition, &config, Arc::new(outbox))
        .context("starting widget session")?;
    bridge.subscribe(Arc::new(TracingObserver));

    tracing::info!(
        embedded = config.embedded,
        format = ?config.wire_format,
        "widget-sync-bridge v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let writer = tokio::spawn(stdio::writer_loop(
        outbound,
        tokio::io::stdout(),
        config.wire_format,
        config.max_outbound_frame,
    ));

    let (frames_tx, frames_rx) = mpsc::channel(config.outbound_channel_capacity);
    let reader = tokio::spawn(stdio::reader_loop(
        tokio::io::stdin(),
        frames_tx,
        config.max_inbound_frame,
    ));

    bridge.mount();
    run_inbound(bridge.clone(), config.wire_format, frames_rx).await;

    reader.await.context("reader task")?.context("reading frames")?;

    // Dropping the last bridge handle closes the outbound queue.
    drop(bridge);
    writer.await.context("writer task")?.context("writing frames")?;

    tracing::info!("host closed the stream; bridge stopped");
    Ok(())
}

fn init_tracing(verbosity: u8, json: bool) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
