//! Durable storage for saved contexts.
//!
//! The store is a single YAML document with one top-level `contexts` key that
//! holds the saved records in insertion order. A missing file is an empty
//! store. Every mutation is a full load, modify, rewrite cycle; nothing is
//! cached between calls.

use crate::context::Context;
use serde::Serialize;
use serde_yaml::Value;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, trace, warn};

const CONTEXTS_KEY: &str = "contexts";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to resolve the directory of the contexts file {0:?}")]
    FailedToResolveDirectory(PathBuf),
    #[error("failed to read contexts file: {cause}")]
    FailedToLoadData { cause: std::io::Error },
    #[error("failed to parse contexts file: {cause}")]
    MalformedDocument { cause: String },
    #[error("failed to write contexts file: {cause}")]
    FailedToWriteData { cause: Box<dyn std::error::Error + Send + Sync> },
}

#[derive(Serialize)]
struct ContextDocument<'a> {
    contexts: &'a [Context],
}

/// File-backed collection of saved contexts.
#[derive(Debug, Clone)]
pub struct ContextStore {
    path: PathBuf,
}

impl ContextStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads all saved contexts in file order.
    ///
    /// A structurally malformed document is an error. Individual entries that
    /// cannot be read, or whose ID is invalid, are skipped with a warning.
    pub fn load(&self) -> Result<Vec<Context>, StoreError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(cause) if cause.kind() == std::io::ErrorKind::NotFound => {
                debug!("No contexts file at {}, store is empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(cause) => return Err(StoreError::FailedToLoadData { cause }),
        };
        if data.trim().is_empty() {
            return Ok(Vec::new());
        }

        let document: Value = serde_yaml::from_str(&data).map_err(|e| StoreError::MalformedDocument {
            cause: e.to_string(),
        })?;

        let entries = match document {
            Value::Null => return Ok(Vec::new()),
            Value::Mapping(mut mapping) => match mapping.remove(CONTEXTS_KEY) {
                None => return Ok(Vec::new()),
                Some(Value::Sequence(entries)) => entries,
                Some(value) if is_blank(&value) => return Ok(Vec::new()),
                Some(_) => {
                    return Err(StoreError::MalformedDocument {
                        cause: format!("'{}' must be a list", CONTEXTS_KEY),
                    })
                }
            },
            _ => {
                return Err(StoreError::MalformedDocument {
                    cause: "top level must be a mapping".to_string(),
                })
            }
        };

        let mut contexts = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            match serde_yaml::from_value::<Context>(entry) {
                Ok(context) if Context::validate_id(context.context_id()) => contexts.push(context),
                Ok(context) => {
                    warn!(
                        "Skipping context entry #{} with invalid ID {:?}",
                        index,
                        context.context_id()
                    );
                }
                Err(e) => {
                    warn!("Skipping invalid context entry #{}: {}", index, e);
                }
            }
        }

        trace!("Loaded {} context(s) from {}", contexts.len(), self.path.display());
        Ok(contexts)
    }

    /// Replaces the stored collection with `contexts`.
    ///
    /// The document is written to a temporary file next to the target and
    /// renamed over it, so readers see either the old or the new content.
    pub fn save(&self, contexts: &[Context]) -> Result<(), StoreError> {
        let directory = match self.path.parent() {
            Some(directory) if !directory.as_os_str().is_empty() => directory,
            _ => return Err(StoreError::FailedToResolveDirectory(self.path.clone())),
        };
        fs::create_dir_all(directory).map_err(write_error)?;

        let yaml = serde_yaml::to_string(&ContextDocument { contexts }).map_err(write_error)?;

        let mut file = NamedTempFile::new_in(directory).map_err(write_error)?;
        file.write_all(yaml.as_bytes()).map_err(write_error)?;
        file.as_file().sync_all().map_err(write_error)?;
        file.persist(&self.path).map_err(|e| write_error(e.error))?;

        debug!("Saved {} context(s) to {}", contexts.len(), self.path.display());
        Ok(())
    }

    /// Appends a context. Uniqueness of the ID is the caller's concern.
    pub fn add(&self, context: Context) -> Result<(), StoreError> {
        let mut contexts = self.load()?;
        contexts.push(context);
        self.save(&contexts)
    }

    /// Removes the context with the given ID. Removing an absent ID is a no-op.
    pub fn delete(&self, context_id: &str) -> Result<(), StoreError> {
        let contexts = self.load()?;
        let remaining: Vec<Context> = contexts
            .iter()
            .filter(|context| context.context_id() != context_id)
            .cloned()
            .collect();

        if remaining.len() == contexts.len() {
            debug!("No context with ID {:?} to delete", context_id);
            return Ok(());
        }
        self.save(&remaining)
    }

    /// Case-sensitive lookup by ID.
    pub fn find_by_id(&self, context_id: &str) -> Result<Option<Context>, StoreError> {
        Ok(self
            .load()?
            .into_iter()
            .find(|context| context.context_id() == context_id))
    }

    pub fn exists(&self, context_id: &str) -> Result<bool, StoreError> {
        Ok(self.find_by_id(context_id)?.is_some())
    }
}

/// `null`, `false`, zero, `""` and `{}` all mean "no contexts saved".
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Mapping(mapping) => mapping.is_empty(),
        _ => false,
    }
}

fn write_error<E>(cause: E) -> StoreError
where
    E: std::error::Error + Send + Sync + 'static,
{
    StoreError::FailedToWriteData {
        cause: Box::new(cause),
    }
}
