//! Error sink
//!
//! Receives a human-readable message whenever a driver call fails. The adapter owns an
//! `Arc<dyn ErrorSink>` handed in at initialization.

use tracing::error;

pub trait ErrorSink: Send + Sync {
    fn display_error(&self, message: &str);
}

/// Sends every message to the `tracing` error level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ErrorSink for TracingSink {
    fn display_error(&self, message: &str) {
        error!("{}", message);
    }
}

/// Adapts a closure into a sink
pub struct FnSink<F>(pub F);

impl<F> ErrorSink for FnSink<F>
where
    F: Fn(&str) + Send + Sync,
{
    fn display_error(&self, message: &str) {
        (self.0)(message)
    }
}
