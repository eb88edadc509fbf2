//! Shared test utilities.

#![allow(dead_code)]

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use tempfile::TempDir;

/// Write `content` to `config.ini` inside a fresh temp dir.
pub fn temp_config(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.ini");
    std::fs::write(&config_path, content).expect("Failed to write config");
    (temp_dir, config_path)
}

/// Shared log of `(label, value)` pairs recorded by test handlers.
pub type CallLog = Rc<RefCell<Vec<(String, String)>>>;

pub fn call_log() -> CallLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// Handler that records every value it receives under `label`.
pub fn recorder(log: &CallLog, label: &str) -> impl FnMut(&str) -> anyhow::Result<()> + 'static {
    let log = Rc::clone(log);
    let label = label.to_string();
    move |value| {
        log.borrow_mut().push((label.clone(), value.to_string()));
        Ok(())
    }
}

pub fn sorted(mut items: Vec<String>) -> Vec<String> {
    items.sort();
    items
}
