//! Operator confirmation.
//!
//! The deploy script pauses until an operator has rebuilt the module with the
//! owner's address. The pause goes through `OperatorPrompt` so it can be
//! driven by a terminal, a flag, or a test.

use std::future::Future;
use std::io;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

pub trait OperatorPrompt {
    /// Show `message` and resolve once the operator confirms.
    fn confirm(&mut self, message: &str) -> impl Future<Output = io::Result<()>> + Send;
}

/// Reads one line from stdin.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinPrompt;

impl OperatorPrompt for StdinPrompt {
    fn confirm(&mut self, message: &str) -> impl Future<Output = io::Result<()>> + Send {
        let message = message.to_string();
        async move {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(message.as_bytes()).await?;
            stdout.write_all(b" ").await?;
            stdout.flush().await?;

            let mut line = String::new();
            let read = BufReader::new(tokio::io::stdin())
                .read_line(&mut line)
                .await?;
            if read == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "stdin closed before confirmation",
                ));
            }
            Ok(())
        }
    }
}

/// Confirms immediately, for non-interactive runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoConfirm;

impl OperatorPrompt for AutoConfirm {
    fn confirm(&mut self, message: &str) -> impl Future<Output = io::Result<()>> + Send {
        tracing::info!(prompt = %message, "Skipping operator confirmation");
        std::future::ready(Ok::<(), io::Error>(()))
    }
}
