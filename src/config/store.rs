//! In-memory configuration store backed by an INI file.
//!
//! The store is loaded once at construction and only touches the disk again
//! on [`ConfigStore::save`], [`ConfigStore::backup`] or [`ConfigStore::reload`].
//! It is single-threaded: handlers are plain `FnMut` closures and callers
//! that share a store across threads must serialize access themselves.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::Span;

use crate::config::error::ConfigError;
use crate::config::handlers::{invoke, Dispatch, DispatchSummary, HandlerRegistry};
use crate::config::numeric::{parse_numeric, Numeric};
use crate::config::parser::{parse_str, Sections};
use crate::fs_utils;

/// Live section/key/value configuration with per-key change handlers.
pub struct ConfigStore {
    path: PathBuf,
    sections: Sections,
    handlers: HandlerRegistry,
    span: Span,
}

impl ConfigStore {
    /// Load the store from `path` and run every registered handler.
    ///
    /// A missing or unreadable file is logged and yields an empty store.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::with_handlers(path, HandlerRegistry::new(), true)
    }

    /// Load the store from `path` with a pre-built set of handlers.
    ///
    /// When `apply` is set, [`apply_all`](Self::apply_all) runs once right
    /// after parsing.
    pub fn with_handlers(path: impl AsRef<Path>, handlers: HandlerRegistry, apply: bool) -> Self {
        let path = fs_utils::expand_tilde(path);
        let span = tracing::info_span!("configuration", path = %path.display());
        let mut store = Self {
            path,
            sections: Sections::new(),
            handlers,
            span,
        };
        store.load();
        if apply {
            store.apply_all();
        }
        store
    }

    /// Path the store was loaded from, after `~` expansion.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read-only view of every section.
    pub fn sections(&self) -> &Sections {
        &self.sections
    }

    /// Discard all in-memory changes, re-read the file and re-run handlers.
    pub fn reload(&mut self) -> DispatchSummary {
        self.sections.clear();
        self.load();
        self.apply_all()
    }

    /// Register (or replace) the handler for a section-key pair.
    ///
    /// The handler is not invoked until the next dispatch.
    pub fn register_handler<F>(&mut self, section: &str, key: &str, logic: F)
    where
        F: FnMut(&str) -> anyhow::Result<()> + 'static,
    {
        self.handlers.register(section, key, logic);
    }

    // --- Reads ---

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|keys| keys.get(key))
            .map(String::as_str)
    }

    /// Read a value as a number. Anything that is not exactly a numeral of
    /// type `T` yields `None`.
    pub fn get_numeric<T: Numeric>(&self, section: &str, key: &str) -> Option<T> {
        parse_numeric(self.get(section, key)?)
    }

    /// True only when the value is exactly `"on"`.
    pub fn is_on(&self, section: &str, key: &str) -> bool {
        self.get(section, key) == Some("on")
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    pub fn has_value(&self, section: &str, key: &str) -> bool {
        self.get(section, key).is_some()
    }

    /// Section names, in no particular order.
    pub fn get_sections(&self) -> Vec<String> {
        self.sections.keys().cloned().collect()
    }

    /// Key names of `section`, in no particular order. Empty if the section
    /// does not exist.
    pub fn get_keys(&self, section: &str) -> Vec<String> {
        self.sections
            .get(section)
            .map(|keys| keys.keys().cloned().collect())
            .unwrap_or_default()
    }

    // --- Writes ---

    /// Insert or overwrite a value, creating the section if needed.
    ///
    /// With `apply` set the pair's handler runs immediately. Always returns
    /// `true`.
    pub fn set(&mut self, section: &str, key: &str, value: &str, apply: bool) -> bool {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());

        if apply {
            self.apply_for(section, key);
        }

        let _enter = self.span.enter();
        tracing::debug!(section, key, value, "Set config value");
        true
    }

    /// Remove a value. Returns `false` if it was not present.
    ///
    /// Removing the last key of a section removes the section as well.
    pub fn remove(&mut self, section: &str, key: &str) -> bool {
        let Some(keys) = self.sections.get_mut(section) else {
            return false;
        };
        if keys.remove(key).is_none() {
            return false;
        }
        if keys.is_empty() {
            self.sections.remove(section);
        }

        let _enter = self.span.enter();
        tracing::debug!(section, key, "Removed config value");
        true
    }

    // --- Handler dispatch ---

    /// Run the handler of every stored pair once.
    ///
    /// Pairs without a handler are logged and skipped; handler failures are
    /// logged and do not stop the pass.
    pub fn apply_all(&mut self) -> DispatchSummary {
        let _enter = self.span.enter();
        let mut summary = DispatchSummary::default();

        for (section, keys) in &self.sections {
            for (key, value) in keys {
                let outcome = match self.handlers.get_mut(section, key) {
                    Some(logic) => {
                        tracing::debug!(
                            section = %section,
                            key = %key,
                            value = %value,
                            "Running config logic"
                        );
                        match invoke(logic, section, key, value) {
                            Ok(()) => Dispatch::Applied,
                            Err(e) => {
                                tracing::error!(
                                    section = %section,
                                    key = %key,
                                    error = %e,
                                    "Config logic failed"
                                );
                                Dispatch::Failed
                            }
                        }
                    }
                    None => {
                        tracing::warn!(
                            section = %section,
                            key = %key,
                            "No config logic registered for pair"
                        );
                        Dispatch::NoHandler
                    }
                };
                summary.record(outcome);
            }
        }

        summary
    }

    /// Run the handler of a single pair with its current value.
    ///
    /// A missing value or missing handler is a silent no-op.
    pub fn apply_for(&mut self, section: &str, key: &str) -> Dispatch {
        let Some(value) = self.sections.get(section).and_then(|keys| keys.get(key)) else {
            return Dispatch::NoValue;
        };
        let Some(logic) = self.handlers.get_mut(section, key) else {
            return Dispatch::NoHandler;
        };

        let _enter = self.span.enter();
        match invoke(logic, section, key, value) {
            Ok(()) => {
                tracing::debug!(section, key, "Applied config logic");
                Dispatch::Applied
            }
            Err(e) => {
                tracing::error!(section, key, error = %e, "Failed to apply config logic");
                Dispatch::Failed
            }
        }
    }

    // --- Persistence ---

    /// Write the store to `path`, or to its own path when `None`.
    ///
    /// Returns `false` (and logs) if the file cannot be written.
    pub fn save(&self, path: Option<&Path>) -> bool {
        let target = path.unwrap_or(self.path.as_path());
        let _enter = self.span.enter();
        match self.try_save(target) {
            Ok(()) => {
                tracing::info!(path = %target.display(), "Saved configuration");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Unable to save configuration");
                false
            }
        }
    }

    /// Write the store to `path`, creating the file and its parent
    /// directories first.
    pub fn try_save(&self, path: &Path) -> Result<(), ConfigError> {
        fs_utils::create_file(path).map_err(|e| ConfigError::CreateFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        fs::write(path, self.to_ini_string()).map_err(|e| ConfigError::Write {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Copy the on-disk file (not the in-memory state) to `dest`.
    ///
    /// Call [`save`](Self::save) first to capture unsaved edits.
    pub fn backup(&self, dest: &Path) -> bool {
        let _enter = self.span.enter();
        match self.try_backup(dest) {
            Ok(()) => {
                tracing::info!(dest = %dest.display(), "Configuration backed up");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to backup configuration");
                false
            }
        }
    }

    pub fn try_backup(&self, dest: &Path) -> Result<(), ConfigError> {
        fs::copy(&self.path, dest)
            .map(|_| ())
            .map_err(|e| ConfigError::Backup {
                from: self.path.clone(),
                to: dest.to_path_buf(),
                source: e,
            })
    }

    /// Render the store in file form: sections and keys sorted, a blank line
    /// after every section.
    pub fn to_ini_string(&self) -> String {
        self.to_string()
    }

    fn load(&mut self) {
        let _enter = self.span.enter();

        // Only an I/O failure counts as unreadable; stray non-UTF-8 bytes are
        // replaced so the rest of the file still loads.
        let content = match fs::read(&self.path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                let err = ConfigError::Read {
                    path: self.path.clone(),
                    source: e,
                };
                tracing::error!(error = %err, "Unable to open config file");
                return;
            }
        };

        let parsed = parse_str(&content);
        for line in &parsed.malformed {
            tracing::warn!(
                line_number = line.line_number,
                content = %line.content,
                "Invalid line in config file"
            );
        }
        self.sections = parsed.sections;

        tracing::debug!(sections = self.sections.len(), "Loaded configuration");
    }
}

impl fmt::Display for ConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sections: Vec<_> = self.sections.iter().collect();
        sections.sort_by(|a, b| a.0.cmp(b.0));

        for (section, keys) in sections {
            writeln!(f, "[{section}]")?;

            let mut keys: Vec<_> = keys.iter().collect();
            keys.sort_by(|a, b| a.0.cmp(b.0));
            for (key, value) in keys {
                writeln!(f, "{key} = {value}")?;
            }

            writeln!(f)?;
        }

        Ok(())
    }
}

impl fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigStore")
            .field("path", &self.path)
            .field("sections", &self.sections)
            .field("handlers", &self.handlers)
            .finish()
    }
}
