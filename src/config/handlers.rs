//! Per-key change handlers and their dispatch.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

use crate::config::error::ConfigError;

/// Identity of a single setting: a key inside a section.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SectionKey {
    pub section: String,
    pub key: String,
}

impl SectionKey {
    pub fn new(section: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            key: key.into(),
        }
    }
}

/// Callback run with the current value of its section-key pair.
///
/// Returning `Err` (or panicking) is reported and contained by the store;
/// it never aborts dispatch of other pairs.
pub type ConfigLogic = Box<dyn FnMut(&str) -> anyhow::Result<()>>;

/// Handlers keyed by section-key pair. Registering twice for the same pair
/// replaces the earlier handler.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<SectionKey, ConfigLogic>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration, handy when assembling handlers up front.
    pub fn with<F>(mut self, section: &str, key: &str, logic: F) -> Self
    where
        F: FnMut(&str) -> anyhow::Result<()> + 'static,
    {
        self.register(section, key, logic);
        self
    }

    pub fn register<F>(&mut self, section: &str, key: &str, logic: F)
    where
        F: FnMut(&str) -> anyhow::Result<()> + 'static,
    {
        self.handlers
            .insert(SectionKey::new(section, key), Box::new(logic));
    }

    pub(crate) fn get_mut(&mut self, section: &str, key: &str) -> Option<&mut ConfigLogic> {
        self.handlers.get_mut(&SectionKey::new(section, key))
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("pairs", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Outcome of dispatching a single pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The handler ran and returned `Ok`.
    Applied,
    /// The pair has no stored value.
    NoValue,
    /// No handler is registered for the pair.
    NoHandler,
    /// The handler returned an error or panicked.
    Failed,
}

/// Counts collected by a full dispatch pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub applied: usize,
    pub unhandled: usize,
    pub failed: usize,
}

impl DispatchSummary {
    pub(crate) fn record(&mut self, outcome: Dispatch) {
        match outcome {
            Dispatch::Applied => self.applied += 1,
            Dispatch::NoHandler => self.unhandled += 1,
            Dispatch::Failed => self.failed += 1,
            Dispatch::NoValue => {}
        }
    }
}

/// Run `logic` with `value`, turning both `Err` and panics into a `ConfigError`.
pub(crate) fn invoke(
    logic: &mut ConfigLogic,
    section: &str,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    match panic::catch_unwind(AssertUnwindSafe(|| (*logic)(value))) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(ConfigError::Handler {
            section: section.to_string(),
            key: key.to_string(),
            source: err.into(),
        }),
        Err(payload) => Err(ConfigError::HandlerPanicked {
            section: section.to_string(),
            key: key.to_string(),
            message: panic_message(&*payload),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn section_key_equality_is_exact() {
        assert_eq!(SectionKey::new("a", "b"), SectionKey::new("a", "b"));
        assert_ne!(SectionKey::new("a", "b"), SectionKey::new("b", "a"));
        assert_ne!(SectionKey::new("a", "b"), SectionKey::new("A", "b"));
    }

    #[test]
    fn register_overwrites_previous_handler() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut registry = HandlerRegistry::new();

        let first = Rc::clone(&seen);
        registry.register("s", "k", move |v| {
            first.borrow_mut().push(format!("first:{v}"));
            Ok(())
        });
        let second = Rc::clone(&seen);
        registry.register("s", "k", move |v| {
            second.borrow_mut().push(format!("second:{v}"));
            Ok(())
        });

        assert_eq!(
            format!("{registry:?}"),
            r#"HandlerRegistry { pairs: [SectionKey { section: "s", key: "k" }] }"#
        );
        let logic = registry.get_mut("s", "k").unwrap();
        invoke(logic, "s", "k", "x").unwrap();
        assert_eq!(*seen.borrow(), vec!["second:x".to_string()]);
    }

    #[test]
    fn invoke_reports_handler_error() {
        let mut registry = HandlerRegistry::new().with("s", "k", |_| anyhow::bail!("bad value"));
        let logic = registry.get_mut("s", "k").unwrap();

        let err = invoke(logic, "s", "k", "x").unwrap_err();
        assert!(matches!(err, ConfigError::Handler { .. }));
        assert!(err.to_string().contains("[s].k"));
        assert!(err.to_string().contains("bad value"));
    }

    #[test]
    fn invoke_contains_panics() {
        let mut registry = HandlerRegistry::new().with("s", "k", |v| panic!("boom {v}"));
        let logic = registry.get_mut("s", "k").unwrap();

        match invoke(logic, "s", "k", "x") {
            Err(ConfigError::HandlerPanicked { message, .. }) => assert_eq!(message, "boom x"),
            other => panic!("expected HandlerPanicked, got {other:?}"),
        }
    }

    #[test]
    fn summary_counts_outcomes() {
        let mut summary = DispatchSummary::default();
        summary.record(Dispatch::Applied);
        summary.record(Dispatch::Applied);
        summary.record(Dispatch::NoHandler);
        summary.record(Dispatch::Failed);
        summary.record(Dispatch::NoValue);
        assert_eq!(
            summary,
            DispatchSummary {
                applied: 2,
                unhandled: 1,
                failed: 1,
            }
        );
    }
}
