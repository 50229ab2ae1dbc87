use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::commands::CommandError;
use crate::console::console;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("Index {index} out of range (valid: 1..={len})")]
    IndexOutOfRange { index: usize, len: usize },
}

impl ContextError {
    /// The same failure, reported against the command that asked for it.
    pub fn for_command(self, command: &str) -> CommandError {
        match self {
            ContextError::IndexOutOfRange { index, len } => {
                CommandError::invalid_index(command, index as i64, len)
            }
        }
    }
}

/// Something the agent has open: a file, a folder, a pasted snippet.
pub trait ContextItem: Send + Sync {
    /// Human-readable summary shown in the numbered listing.
    fn description(&self) -> String;

    /// Where the item comes from (usually a path), if anywhere.
    fn source(&self) -> Option<String>;

    /// Current content of the item.
    fn content(&self) -> Result<String>;

    /// Called by the owning context when the item is closed.
    fn release(&mut self) {}
}

impl fmt::Debug for dyn ContextItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextItem")
            .field("description", &self.description())
            .field("source", &self.source())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct FileContextItem {
    path: PathBuf,
    opened_at: DateTime<Utc>,
}

impl FileContextItem {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            opened_at: Utc::now(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ContextItem for FileContextItem {
    fn description(&self) -> String {
        format!("The current content of the file '{}'", self.path.display())
    }

    fn source(&self) -> Option<String> {
        Some(self.path.display().to_string())
    }

    fn content(&self) -> Result<String> {
        fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read file: {}", self.path.display()))
    }

    fn release(&mut self) {
        console().debug(&format!(
            "Released file '{}' (open since {})",
            self.path.display(),
            self.opened_at.format("%H:%M:%S")
        ));
    }
}

#[derive(Debug, Clone)]
pub struct FolderContextItem {
    path: PathBuf,
}

impl FolderContextItem {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ContextItem for FolderContextItem {
    fn description(&self) -> String {
        format!("The contents of the folder '{}'", self.path.display())
    }

    fn source(&self) -> Option<String> {
        Some(self.path.display().to_string())
    }

    fn content(&self) -> Result<String> {
        let entries = fs::read_dir(&self.path)
            .with_context(|| format!("Failed to read directory: {}", self.path.display()))?;

        let mut lines = Vec::new();
        for entry in entries {
            let entry = entry.context("Failed to read directory entry")?;
            let name = entry.file_name().to_string_lossy().to_string();
            if entry.path().is_dir() {
                lines.push(format!("{}/", name));
            } else {
                lines.push(name);
            }
        }
        lines.sort();
        Ok(lines.join("\n"))
    }
}

#[derive(Debug, Clone)]
pub struct StaticContextItem {
    description: String,
    source: Option<String>,
    content: String,
}

impl StaticContextItem {
    pub fn new(description: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            source: None,
            content: content.into(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl ContextItem for StaticContextItem {
    fn description(&self) -> String {
        self.description.clone()
    }

    fn source(&self) -> Option<String> {
        self.source.clone()
    }

    fn content(&self) -> Result<String> {
        Ok(self.content.clone())
    }
}

/// Ordered list of items an agent has open, addressed 1-based from outside.
#[derive(Debug, Default)]
pub struct AgentContext {
    items: Vec<Box<dyn ContextItem>>,
}

impl AgentContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an item and returns its 1-based index.
    pub fn add(&mut self, item: Box<dyn ContextItem>) -> usize {
        self.items.push(item);
        self.items.len()
    }

    pub fn get(&self, index: usize) -> Option<&dyn ContextItem> {
        index
            .checked_sub(1)
            .and_then(|i| self.items.get(i))
            .map(|item| item.as_ref())
    }

    /// Removes the item at 1-based `index`, releasing it first.
    /// Later items move down by one position.
    pub fn close(&mut self, index: usize) -> Result<Box<dyn ContextItem>, ContextError> {
        if index == 0 || index > self.items.len() {
            return Err(ContextError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }

        let mut item = self.items.remove(index - 1);
        item.release();
        Ok(item)
    }

    pub fn clear(&mut self) {
        for mut item in self.items.drain(..) {
            item.release();
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items paired with their 1-based index.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &dyn ContextItem)> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| (i + 1, item.as_ref()))
    }

    /// Numbered listing with each item's content, for prompt construction.
    /// Items whose content cannot be read are listed with the error instead.
    pub fn format_numbered(&self) -> String {
        self.iter()
            .map(|(index, item)| {
                let body = match item.content() {
                    Ok(content) => content,
                    Err(e) => format!("<unavailable: {}>", e),
                };
                let source = item
                    .source()
                    .map(|s| format!(" ({})", s))
                    .unwrap_or_default();
                format!(
                    "{}. {}{}\n```\n{}\n```",
                    index,
                    item.description(),
                    source,
                    body
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
