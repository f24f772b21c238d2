//! Process-wide registry of element tag names.

use std::collections::HashSet;
use std::sync::{Mutex, OnceLock};

static REGISTRY: OnceLock<Mutex<HashSet<String>>> = OnceLock::new();

fn registry() -> &'static Mutex<HashSet<String>> {
    REGISTRY.get_or_init(|| Mutex::new(HashSet::new()))
}

/// Registers `tag`. Returns false (and does nothing) if it is already registered.
pub fn register_element(tag: &str) -> bool {
    let mut tags = registry()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let added = tags.insert(tag.to_string());
    if added {
        log::debug!("Registered <{}> element", tag);
    }
    added
}

pub fn is_registered(tag: &str) -> bool {
    registry()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .contains(tag)
}
