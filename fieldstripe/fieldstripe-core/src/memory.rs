//! In-memory stripe store.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{
    error::StripeError,
    schema::{Depth, Field, Path},
    stripe::{Marker, StripeReader, StripeReaderFactory, StripeWriter, StripeWriterFactory, Token},
    value::Value,
};

type Stripes = HashMap<Path, Vec<Token>>;

/// Keeps every stripe as a `Vec<Token>` keyed by the leaf's [`Path`].
///
/// Cloning the store shares the underlying stripes, so a store handed to a
/// builder as factory can still be inspected afterwards.
#[derive(Debug, Clone, Default)]
pub struct MemoryStripeStore {
    stripes: Arc<Mutex<Stripes>>,
}

impl MemoryStripeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Stripes> {
        self.stripes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the stripe stored for `path`.
    pub fn insert(&self, path: Path, tokens: Vec<Token>) {
        self.lock().insert(path, tokens);
    }

    pub fn tokens(&self, path: &Path) -> Option<Vec<Token>> {
        self.lock().get(path).cloned()
    }

    /// Look a stripe up by its dotted path (`"dept.name"`).
    pub fn tokens_by_name(&self, dotted: &str) -> Option<Vec<Token>> {
        self.lock()
            .iter()
            .find(|(path, _)| path.to_string() == dotted)
            .map(|(_, tokens)| tokens.clone())
    }

    pub fn paths(&self) -> Vec<Path> {
        let mut paths: Vec<Path> = self.lock().keys().cloned().collect();
        paths.sort_by_key(|p| p.to_string());
        paths
    }
}

impl StripeWriterFactory for MemoryStripeStore {
    fn create_writer(&mut self, field: &Field) -> Result<Box<dyn StripeWriter>, StripeError> {
        let path = field.path().clone();
        tracing::trace!(stripe = %path, "creating in-memory stripe");
        self.lock().insert(path.clone(), Vec::new());
        Ok(Box::new(MemoryStripeWriter {
            path,
            stripes: Arc::clone(&self.stripes),
        }))
    }
}

impl StripeReaderFactory for MemoryStripeStore {
    fn open_reader(&mut self, field: &Field) -> Result<Box<dyn StripeReader>, StripeError> {
        let tokens = self
            .tokens(field.path())
            .ok_or_else(|| StripeError::NotFound {
                stripe: field.path().to_string(),
            })?;
        Ok(Box::new(MemoryStripeReader::new(tokens)))
    }
}

/// Appends directly into the shared store.
#[derive(Debug)]
pub struct MemoryStripeWriter {
    path: Path,
    stripes: Arc<Mutex<Stripes>>,
}

impl MemoryStripeWriter {
    fn push(&mut self, token: Token) -> Result<(), StripeError> {
        let mut stripes = self.stripes.lock().unwrap_or_else(PoisonError::into_inner);
        stripes.entry(self.path.clone()).or_default().push(token);
        Ok(())
    }
}

impl StripeWriter for MemoryStripeWriter {
    fn write_value(&mut self, value: &Value) -> Result<(), StripeError> {
        self.push(Token::Value(value.clone()))
    }

    fn write_unset(&mut self) -> Result<(), StripeError> {
        self.push(Token::Unset)
    }

    fn write_repeated_value(&mut self) -> Result<(), StripeError> {
        self.push(Token::RepeatedValue)
    }

    fn write_unset_parent(&mut self, depth: Depth) -> Result<(), StripeError> {
        self.push(Token::UnsetParent(depth))
    }

    fn write_repeated_parent(&mut self, depth: Depth) -> Result<(), StripeError> {
        self.push(Token::RepeatedParent(depth))
    }
}

/// Reads a snapshot of a stripe taken when the reader was opened.
#[derive(Debug)]
pub struct MemoryStripeReader {
    tokens: VecDeque<Token>,
}

impl MemoryStripeReader {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: tokens.into(),
        }
    }
}

impl StripeReader for MemoryStripeReader {
    fn peek(&mut self) -> Result<Option<Marker>, StripeError> {
        Ok(self.tokens.front().map(Token::marker))
    }

    fn read_token(&mut self) -> Result<Option<Token>, StripeError> {
        Ok(self.tokens.pop_front())
    }
}
