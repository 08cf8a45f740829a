//! Line-oriented input shared by the command loop and confirmation prompts.

use std::{io::Write, sync::Arc};

use async_trait::async_trait;
use client_core::ConfirmPrompt;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines},
    sync::Mutex,
};

use crate::surface::TerminalSurface;

type BoxedReader = Box<dyn AsyncBufRead + Send + Unpin>;

#[derive(Clone)]
pub struct LineInput {
    lines: Arc<Mutex<Lines<BoxedReader>>>,
}

impl LineInput {
    pub fn new(reader: impl AsyncBufRead + Send + Unpin + 'static) -> Self {
        let boxed: BoxedReader = Box::new(reader);
        Self {
            lines: Arc::new(Mutex::new(boxed.lines())),
        }
    }

    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }

    /// `None` once input is exhausted.
    pub async fn next_line(&self) -> std::io::Result<Option<String>> {
        self.lines.lock().await.next_line().await
    }
}

/// Asks on the terminal and reads the answer from the shared input.
pub struct LineConfirm<W: Write + Send> {
    input: LineInput,
    surface: Arc<TerminalSurface<W>>,
}

impl<W: Write + Send> LineConfirm<W> {
    pub fn new(input: LineInput, surface: Arc<TerminalSurface<W>>) -> Self {
        Self { input, surface }
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[async_trait]
impl<W: Write + Send + 'static> ConfirmPrompt for LineConfirm<W> {
    async fn confirm(&self, message: &str) -> bool {
        self.surface.prompt(&format!("{message} [y/N] "));
        match self.input.next_line().await {
            Ok(Some(answer)) => is_affirmative(&answer),
            Ok(None) => false,
            Err(err) => {
                tracing::warn!(error = %err, "failed to read confirmation");
                false
            }
        }
    }
}
