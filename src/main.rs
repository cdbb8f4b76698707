//! ctxlog demo
//!
//! Initializes a root logger, fans simulated requests out over worker
//! threads, and exits through the exit-handler registry so remote sinks are
//! drained.
//!
//! # Architecture Overview
//!
//! ```text
//!   init("App") ──▶ ctx { App }
//!                    │
//!                    ├─ with_prefix("Worker") ─▶ ctx { App/Worker }
//!                    │        │
//!                    │        ├─ with_fields({requestID}) ─▶ ctx { App/Worker, requestID }
//!                    │        │          │
//!                    │        │          └─ SubLogger("Db") ─▶ App/Worker/Db
//!                    │        └─ ...
//!                    ▼
//!             Dispatch ──▶ console (text | JSON | discarded)
//!                      └─▶ remote sinks (agent | metadata | credentials)
//! ```

use std::path::PathBuf;
use std::thread;

use clap::Parser;
use ctxlog::config::{self, LoggingConfig};
use ctxlog::{fields, Context, ContextLog, SubLogger};

#[derive(Debug, Parser)]
#[command(name = "ctxlog-demo", about = "Request-scoped structured logging demo")]
struct Args {
    /// TOML configuration file; CTXLOG_* environment variables are applied on top.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Root prefix for every record.
    #[arg(long, default_value = "TestApp")]
    app_name: String,

    /// Simulated requests to fan out.
    #[arg(long, default_value_t = 4)]
    requests: usize,
}

fn load(args: &Args) -> Result<LoggingConfig, config::ConfigError> {
    match &args.config {
        Some(path) => {
            let mut config = config::load_config(path)?;
            config::apply_env_overrides(&mut config, std::env::vars())?;
            config::validate_config(&config).map_err(config::ConfigError::Validation)?;
            Ok(config)
        }
        None => config::from_env(),
    }
}

fn handle_request(ctx: &Context, db: &SubLogger, id: usize) {
    let ctx = ctxlog::with_fields(ctx, fields! { "requestID" => uuid::Uuid::new_v4().to_string(), "n" => id });
    ctxlog::info!(&ctx, "handling request {}", id);

    db.debug(&ctx, "query started");
    if id % 3 == 2 {
        let cause = std::io::Error::new(std::io::ErrorKind::TimedOut, "statement timeout");
        db.errf(&ctx, &cause, format_args!("query for request {id} failed"));
    } else {
        db.infof(&ctx, format_args!("query for request {id} finished"));
    }
}

/// Drain sinks and exit if the demo is interrupted.
fn watch_signals(logger: &ctxlog::Logger) {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            logger.err(&e, "signal watcher not started");
            return;
        }
    };
    thread::spawn(move || runtime.block_on(ctxlog::lifecycle::signals::drain_on_signal()));
}

fn main() {
    let args = Args::parse();
    let config = match load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("ctxlog-demo: {e}");
            std::process::exit(2);
        }
    };

    let (ctx, logger) = ctxlog::init(&args.app_name, &config);
    watch_signals(&logger);
    if let Err(e) = logger.install_tracing_bridge() {
        logger.err(&e, "tracing bridge not installed");
    }
    ctxlog::info(&ctx, "Starting the application!");
    tracing::info!(requests = args.requests, "forwarded through the tracing bridge");

    let workers = ctxlog::with_prefix(&ctx, "Worker");
    ctxlog::warnf(&workers, format_args!("Initialized Worker with '{}'", "Happyness"));

    let db = SubLogger::new_with_prefix("Db").with_fields(fields! { "pool" => "primary" });
    let handles: Vec<_> = (0..args.requests)
        .map(|id| {
            let ctx = workers.clone();
            let db = db.clone();
            thread::spawn(move || handle_request(&ctx, &db, id))
        })
        .collect();
    for handle in handles {
        if handle.join().is_err() {
            logger.error("request worker panicked");
        }
    }

    logger.infof(format_args!("Served {} requests", args.requests));
    logger.exit(0)
}
