use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tokio::sync::mpsc;

use crate::console::console;

/// Collects a line of input from the human operator.
#[async_trait]
pub trait InputCollector: Send + Sync {
    /// Shows `prompt` and waits for the operator's answer.
    /// `Ok(None)` means the input stream is closed.
    async fn collect(&self, prompt: &str) -> Result<Option<String>>;
}

/// Reads trimmed answers line by line from an async reader.
///
/// A background task owns the reader and forwards lines over a channel, so a
/// `collect` dropped mid-wait (a timeout) leaves the reader intact. Once a wait
/// has been abandoned, lines queued before the next prompt belong to the old
/// question and are discarded. Typed-ahead input is otherwise kept.
pub struct LineInput<R> {
    source: Mutex<Option<R>>,
    lines: tokio::sync::Mutex<Option<mpsc::UnboundedReceiver<io::Result<String>>>>,
    abandoned: AtomicBool,
}

/// Operator answers from the process stdin.
pub type TerminalInput = LineInput<BufReader<Stdin>>;

impl<R> LineInput<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    pub fn from_reader(reader: R) -> Self {
        Self {
            source: Mutex::new(Some(reader)),
            lines: tokio::sync::Mutex::new(None),
            abandoned: AtomicBool::new(false),
        }
    }

    fn spawn_reader(&self) -> Result<mpsc::UnboundedReceiver<io::Result<String>>> {
        let reader = self
            .source
            .lock()
            .map_err(|e| anyhow::anyhow!("Failed to lock input source: {}", e))?
            .take()
            .context("Input reader already taken")?;

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            let mut lines = reader.lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if tx.send(Ok(line)).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        let _ = tx.send(Err(e));
                        break;
                    }
                }
            }
        });
        Ok(rx)
    }
}

impl TerminalInput {
    pub fn new() -> Self {
        Self::from_reader(BufReader::new(tokio::io::stdin()))
    }
}

impl Default for TerminalInput {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R> InputCollector for LineInput<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    async fn collect(&self, prompt: &str) -> Result<Option<String>> {
        let mut guard = self.lines.lock().await;
        if guard.is_none() {
            *guard = Some(self.spawn_reader()?);
        }
        let Some(lines) = guard.as_mut() else {
            return Ok(None);
        };

        if self.abandoned.swap(false, Ordering::SeqCst) {
            while let Ok(stale) = lines.try_recv() {
                let stale = stale.context("Failed to read from stdin")?;
                console().debug(&format!("Discarding late answer: '{}'", stale.trim()));
            }
        }

        print!("{}", prompt);
        io::stdout().flush().context("Failed to flush prompt")?;

        self.abandoned.store(true, Ordering::SeqCst);
        let line = lines.recv().await;
        self.abandoned.store(false, Ordering::SeqCst);

        match line {
            Some(line) => Ok(Some(
                line.context("Failed to read from stdin")?.trim().to_string(),
            )),
            None => Ok(None),
        }
    }
}

/// Replays prepared answers in order; closed once they run out.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    answers: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedInput {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// One answer per line of the file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read answers file: {}", path.display()))?;
        Ok(Self::new(content.lines().map(str::trim)))
    }

    /// Prompts shown so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl InputCollector for ScriptedInput {
    async fn collect(&self, prompt: &str) -> Result<Option<String>> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        let mut answers = self
            .answers
            .lock()
            .map_err(|e| anyhow::anyhow!("Failed to lock scripted answers: {}", e))?;
        Ok(answers.pop_front())
    }
}
