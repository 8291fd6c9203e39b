use super::logging::LogLevel;
use crate::domains::logger::{DomainLogger, DynLogger};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

enum Command {
    Log(LogLevel, String),
    Flush(oneshot::Sender<()>),
}

/// Hands messages to a background task so the tick loop never blocks on I/O.
/// Messages are dropped (and counted) when the channel is full.
pub struct BufferedLogger {
    sender: mpsc::Sender<Command>,
    dropped: AtomicUsize,
}

impl BufferedLogger {
    /// Must be called from within a tokio runtime.
    pub fn spawn(downstream: DynLogger, capacity: usize) -> Arc<Self> {
        let (sender, mut receiver) = mpsc::channel::<Command>(capacity.max(1));
        tokio::spawn(async move {
            while let Some(command) = receiver.recv().await {
                match command {
                    Command::Log(LogLevel::Info, msg) => downstream.info(&msg),
                    Command::Log(LogLevel::Warn, msg) => downstream.warn(&msg),
                    Command::Log(LogLevel::Error, msg) => downstream.error(&msg),
                    Command::Flush(done) => {
                        let _ = done.send(());
                    }
                }
            }
        });
        Arc::new(Self {
            sender,
            dropped: AtomicUsize::new(0),
        })
    }

    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Wait until every message queued before this call has reached the
    /// downstream logger.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.sender.send(Command::Flush(done)).await.is_ok() {
            let _ = wait.await;
        }
    }

    fn enqueue(&self, level: LogLevel, msg: &str) {
        if self.sender.try_send(Command::Log(level, msg.to_string())).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}

impl DomainLogger for BufferedLogger {
    fn info(&self, msg: &str) {
        self.enqueue(LogLevel::Info, msg);
    }
    fn warn(&self, msg: &str) {
        self.enqueue(LogLevel::Warn, msg);
    }
    fn error(&self, msg: &str) {
        self.enqueue(LogLevel::Error, msg);
    }
}

pub fn init_buffered_logger(downstream: DynLogger, capacity: usize) -> DynLogger {
    BufferedLogger::spawn(downstream, capacity)
}
