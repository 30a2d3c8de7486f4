//! Logical action queries over an explicit action catalog.
//!
//! The host input layer supplies an [`ActionSource`]; the [`ActionMonitor`]
//! restricts it to the configured catalog so that unknown names are simply
//! inactive and the wrong-input check has a finite set to scan.

use std::fmt;

/// "Is this logical action currently asserted", supplied by the host.
pub trait ActionSource {
    fn is_active(&self, action: &str) -> bool;
}

impl<F> ActionSource for F
where
    F: Fn(&str) -> bool,
{
    fn is_active(&self, action: &str) -> bool {
        self(action)
    }
}

type Predicate = Box<dyn Fn() -> bool + Send + Sync>;

/// Explicit name → predicate mapping for hosts that expose one check per action.
#[derive(Default)]
pub struct PredicateTable {
    entries: Vec<(String, Predicate)>,
}

impl PredicateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the predicate for `action`.
    pub fn with(mut self, action: &str, predicate: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        let name = action.to_ascii_lowercase();
        self.entries.retain(|(existing, _)| *existing != name);
        self.entries.push((name, Box::new(predicate)));
        self
    }

    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

impl ActionSource for PredicateTable {
    fn is_active(&self, action: &str) -> bool {
        self.entries
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(action))
            .is_some_and(|(_, predicate)| predicate())
    }
}

impl fmt::Debug for PredicateTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateTable")
            .field("actions", &self.actions().collect::<Vec<_>>())
            .finish()
    }
}

/// A catalog entry: canonical (lower-case) name plus an optional display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownAction {
    pub name: String,
    pub label: Option<String>,
}

/// Stateless query facade over an [`ActionSource`] and a fixed catalog.
#[derive(Debug)]
pub struct ActionMonitor<S> {
    catalog: Vec<KnownAction>,
    source: S,
}

impl<S: ActionSource> ActionMonitor<S> {
    /// Build a monitor; duplicate names (case-insensitive) keep their first entry.
    pub fn new<I>(catalog: I, source: S) -> Self
    where
        I: IntoIterator<Item = KnownAction>,
    {
        let mut known: Vec<KnownAction> = Vec::new();
        for entry in catalog {
            let name = entry.name.trim().to_ascii_lowercase();
            if name.is_empty() || known.iter().any(|k| k.name == name) {
                continue;
            }
            known.push(KnownAction {
                name,
                label: entry.label,
            });
        }
        Self {
            catalog: known,
            source,
        }
    }

    /// Catalog from bare names, without labels.
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>, source: S) -> Self {
        Self::new(
            names.into_iter().map(|name| KnownAction {
                name: name.to_string(),
                label: None,
            }),
            source,
        )
    }

    /// Whether `action` is known and currently asserted. Unknown names are `false`.
    pub fn is_active(&self, action: &str) -> bool {
        self.canonical(action)
            .is_some_and(|name| self.source.is_active(name))
    }

    /// Asserted known actions, in catalog order.
    pub fn active_actions(&self) -> Vec<&str> {
        self.catalog
            .iter()
            .map(|entry| entry.name.as_str())
            .filter(|name| self.source.is_active(name))
            .collect()
    }

    pub fn any_active(&self) -> bool {
        self.catalog
            .iter()
            .any(|entry| self.source.is_active(&entry.name))
    }

    pub fn catalog(&self) -> &[KnownAction] {
        &self.catalog
    }

    /// Display label for `action`, falling back to the name itself.
    pub fn label_for<'a>(&'a self, action: &'a str) -> &'a str {
        self.catalog
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(action))
            .and_then(|entry| entry.label.as_deref())
            .unwrap_or(action)
    }

    fn canonical(&self, action: &str) -> Option<&str> {
        let action = action.trim();
        self.catalog
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(action))
            .map(|entry| entry.name.as_str())
    }
}
