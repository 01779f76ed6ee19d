//! Directory-backed template registry
//!
//! Every `*.txt` file in the template directory becomes a template named
//! after its file stem. The registered set is swapped as a whole on load
//! and reload, so readers see either the old set or the new one.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, error};

use crate::template::{PromptTemplate, Variables};
use crate::PromptError;

/// File extension of template files
pub const TEMPLATE_EXTENSION: &str = "txt";

type TemplateMap = HashMap<String, Arc<PromptTemplate>>;

/// Registry of compiled templates loaded from a directory
pub struct TemplateStore {
    dir: PathBuf,
    templates: RwLock<Arc<TemplateMap>>,
}

impl TemplateStore {
    /// Create an empty store over `dir` without touching the filesystem
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            templates: RwLock::new(Arc::new(HashMap::new())),
        }
    }

    /// Create a store and load `dir` immediately
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, PromptError> {
        let store = Self::new(dir);
        store.load()?;
        Ok(store)
    }

    /// Template directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Scan the directory and register every template that compiles
    ///
    /// Files that cannot be read or parsed are logged and skipped. Already
    /// registered templates that are not replaced by a file stay
    /// registered. Returns the number of templates loaded from disk.
    pub fn load(&self) -> Result<usize, PromptError> {
        let loaded = self.scan()?;
        let count = loaded.len();

        let mut guard = self.templates.write().unwrap_or_else(PoisonError::into_inner);
        let mut merged: TemplateMap = (**guard).clone();
        merged.extend(loaded);
        *guard = Arc::new(merged);

        debug!(dir = %self.dir.display(), count, "Loaded prompt templates");
        Ok(count)
    }

    /// Drop every registered template and load the directory again
    pub fn reload(&self) -> Result<usize, PromptError> {
        let loaded = self.scan()?;
        let count = loaded.len();

        *self.templates.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(loaded);

        debug!(dir = %self.dir.display(), count, "Reloaded prompt templates");
        Ok(count)
    }

    fn scan(&self) -> Result<TemplateMap, PromptError> {
        let mut paths: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && path.extension().and_then(|ext| ext.to_str()) == Some(TEMPLATE_EXTENSION)
            })
            .collect();
        paths.sort();

        let mut templates = TemplateMap::new();
        for path in paths {
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let compiled = fs::read_to_string(&path)
                .map_err(PromptError::from)
                .and_then(|source| PromptTemplate::compile(name, source));

            match compiled {
                Ok(template) => {
                    debug!(
                        template = name,
                        variables = ?template.variables(),
                        "Registered prompt template"
                    );
                    templates.insert(name.to_string(), Arc::new(template));
                }
                Err(e) => {
                    error!(path = %path.display(), error = %e, "Skipping prompt template");
                }
            }
        }

        Ok(templates)
    }

    fn snapshot(&self) -> Arc<TemplateMap> {
        Arc::clone(&self.templates.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Register a template from source, replacing any of the same name
    pub fn register(
        &self,
        name: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<Arc<PromptTemplate>, PromptError> {
        let template = Arc::new(PromptTemplate::compile(name, source)?);

        let mut guard = self.templates.write().unwrap_or_else(PoisonError::into_inner);
        let mut updated: TemplateMap = (**guard).clone();
        updated.insert(template.name().to_string(), Arc::clone(&template));
        *guard = Arc::new(updated);

        Ok(template)
    }

    /// Look up a template by name
    pub fn get(&self, name: &str) -> Result<Arc<PromptTemplate>, PromptError> {
        self.snapshot()
            .get(name)
            .cloned()
            .ok_or_else(|| PromptError::TemplateNotFound(name.to_string()))
    }

    /// Render the named template against `vars`
    pub fn render(&self, name: &str, vars: &Variables) -> Result<String, PromptError> {
        self.get(name)?.render(vars)
    }

    /// Registered template names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.snapshot().keys().cloned().collect();
        names.sort();
        names
    }

    /// Whether a template is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.snapshot().contains_key(name)
    }

    /// Number of registered templates
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Whether no templates are registered
    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}

impl std::fmt::Debug for TemplateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateStore")
            .field("dir", &self.dir)
            .field("templates", &self.names())
            .finish()
    }
}
