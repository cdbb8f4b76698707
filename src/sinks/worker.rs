//! Buffered delivery on a dedicated worker thread.
//!
//! # Batching Strategy
//!
//! - Records are accumulated in a buffer owned by the worker.
//! - **Immediate flush** when a record is warn or error.
//! - **Threshold flush** when the batch reaches `batch_size`.
//! - **Periodic flush** on a `flush_interval` tick.
//! - **Drain flush** on request; the requester is acknowledged afterwards.
//!
//! Each worker runs a single-threaded tokio runtime on its own OS thread, so
//! sinks work the same whether or not the host application runs tokio.

use std::future::Future;
use std::sync::mpsc as std_mpsc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use super::retry::deliver;
use super::{BatchOptions, DeliveryError, DrainError, RemoteSink, SinkError};
use crate::context::LogIdentity;
use crate::logger::{Level, Record};

/// Wire-level delivery of one batch.
pub(crate) trait Transport: Send + 'static {
    async fn send(&mut self, batch: &[Record]) -> Result<(), DeliveryError>;
}

enum Command {
    Record(Record),
    Drain(std_mpsc::SyncSender<()>),
}

/// A [`RemoteSink`] that hands records to a background worker.
#[derive(Debug)]
pub struct BufferedSink {
    name: &'static str,
    tx: mpsc::UnboundedSender<Command>,
}

impl BufferedSink {
    /// Start a worker thread, build its transport there with `connect`, and
    /// wait for the outcome.
    ///
    /// Construction errors from `connect` are returned as-is; the worker only
    /// starts consuming records once the transport exists.
    pub(crate) fn spawn<T, F, Fut>(
        name: &'static str,
        options: BatchOptions,
        diag: LogIdentity,
        connect: F,
    ) -> Result<Self, SinkError>
    where
        T: Transport,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, SinkError>>,
    {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(SinkError::Runtime)?;
        let (tx, rx) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = std_mpsc::sync_channel(1);

        std::thread::Builder::new()
            .name(format!("ctxlog-{name}"))
            .spawn(move || {
                runtime.block_on(async move {
                    match connect().await {
                        Ok(transport) => {
                            let _ = ready_tx.send(Ok(()));
                            run(transport, rx, options, diag).await;
                        }
                        Err(e) => {
                            let _ = ready_tx.send(Err(e));
                        }
                    }
                });
            })
            .map_err(SinkError::Runtime)?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self { name, tx }),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(SinkError::WorkerExited),
        }
    }
}

impl RemoteSink for BufferedSink {
    fn name(&self) -> &str {
        self.name
    }

    fn accept(&self, record: &Record) {
        let _ = self.tx.send(Command::Record(record.clone()));
    }

    fn drain(&self, timeout: Duration) -> Result<(), DrainError> {
        let (ack_tx, ack_rx) = std_mpsc::sync_channel(1);
        self.tx.send(Command::Drain(ack_tx)).map_err(|_| DrainError::Closed)?;
        ack_rx.recv_timeout(timeout).map_err(|e| match e {
            std_mpsc::RecvTimeoutError::Timeout => DrainError::Timeout(timeout),
            std_mpsc::RecvTimeoutError::Disconnected => DrainError::Closed,
        })
    }
}

async fn run<T: Transport>(
    mut transport: T,
    mut rx: mpsc::UnboundedReceiver<Command>,
    options: BatchOptions,
    diag: LogIdentity,
) {
    let mut batch: Vec<Record> = Vec::with_capacity(options.batch_size);
    let mut ticker = tokio::time::interval(options.flush_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            command = rx.recv() => match command {
                Some(Command::Record(record)) => {
                    let urgent = record.level >= Level::Warn;
                    batch.push(record);
                    if urgent || batch.len() >= options.batch_size {
                        flush(&mut transport, &mut batch, &options, &diag).await;
                    }
                }
                Some(Command::Drain(ack)) => {
                    flush(&mut transport, &mut batch, &options, &diag).await;
                    let _ = ack.send(());
                }
                None => {
                    flush(&mut transport, &mut batch, &options, &diag).await;
                    break;
                }
            },
            _ = ticker.tick() => {
                flush(&mut transport, &mut batch, &options, &diag).await;
            }
        }
    }
}

async fn flush<T: Transport>(transport: &mut T, batch: &mut Vec<Record>, options: &BatchOptions, diag: &LogIdentity) {
    if batch.is_empty() {
        return;
    }
    let records = std::mem::take(batch);
    deliver(transport, &records, options.max_retries, diag).await;
}
