//! The set of project ledgers a single invocation acts on.

use std::collections::BTreeMap;

use bill_core::{Ledger, ProjectName};
use bill_store::LedgerFile;

use crate::config::{Config, ProjectConfig};

/// One project's ledger and where it is stored.
#[derive(Debug)]
pub struct Project {
    /// Identifier from the configuration.
    pub id: String,
    pub ledger: Ledger,
    file: LedgerFile,
    /// False when the stored document could not be read; such a ledger is
    /// never written back so the original file survives.
    writable: bool,
}

impl Project {
    fn load(id: &str, config: &ProjectConfig) -> Option<Self> {
        let name = match ProjectName::new(config.name.clone().unwrap_or_else(|| id.to_string())) {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!(project = id, error = %e, "skipping project");
                return None;
            }
        };
        if !config.rate.is_finite() {
            tracing::warn!(project = id, rate = config.rate, "skipping project with invalid rate");
            return None;
        }

        let file = LedgerFile::new(config.storage_path());
        let (ledger, writable) = match file.load() {
            Ok(Some(snapshot)) => (Ledger::from_snapshot(name, config.rate, snapshot), true),
            Ok(None) => (Ledger::new(name, config.rate), true),
            Err(e) => {
                tracing::warn!(
                    project = id,
                    error = %e,
                    "could not load ledger, continuing with an empty one that will not be saved"
                );
                (Ledger::new(name, config.rate), false)
            }
        };
        tracing::debug!(
            project = id,
            path = %file.path().display(),
            events = ledger.history().len(),
            running = ledger.current().is_some(),
            "loaded ledger"
        );

        Some(Self {
            id: id.to_string(),
            ledger,
            file,
            writable,
        })
    }

    /// Writes the ledger back if it changed since it was loaded.
    ///
    /// Returns true if a document was written.
    fn flush(&mut self) -> bool {
        if !self.ledger.is_volatile() {
            return false;
        }
        if !self.writable {
            tracing::warn!(
                project = %self.id,
                path = %self.file.path().display(),
                "not saving changes over a ledger file that failed to load"
            );
            return false;
        }

        match self.file.save(&self.ledger.snapshot()) {
            Ok(()) => {
                tracing::debug!(project = %self.id, path = %self.file.path().display(), "saved ledger");
                self.ledger.mark_clean();
                true
            }
            Err(e) => {
                tracing::warn!(project = %self.id, error = %e, "could not save ledger");
                false
            }
        }
    }
}

/// All selected projects, ordered by identifier.
#[derive(Debug, Default)]
pub struct Bill {
    projects: BTreeMap<String, Project>,
}

impl Bill {
    /// Loads every configured project, or only `only` when given.
    ///
    /// Problems are logged and leave the offending project out (or, for an
    /// unreadable ledger, loaded empty and read-only); loading never fails.
    pub fn load(config: &Config, only: Option<&str>) -> Self {
        let selected: Vec<(&String, &ProjectConfig)> = match only {
            Some(id) => match config.projects.get_key_value(id) {
                Some(entry) => vec![entry],
                None => {
                    tracing::warn!(project = id, "no such project in configuration");
                    Vec::new()
                }
            },
            None => config.projects.iter().collect(),
        };

        let projects = selected
            .into_iter()
            .filter_map(|(id, project)| Project::load(id, project).map(|p| (id.clone(), p)))
            .collect();
        Self { projects }
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.values()
    }

    pub fn projects_mut(&mut self) -> impl Iterator<Item = &mut Project> {
        self.projects.values_mut()
    }

    /// Sorts every ledger's history chronologically.
    pub fn sort(&mut self) {
        for project in self.projects_mut() {
            project.ledger.sort();
        }
    }

    /// Writes back every changed ledger.
    ///
    /// Returns how many documents were written.
    pub fn flush(&mut self) -> usize {
        self.projects_mut().map(Project::flush).filter(|&saved| saved).count()
    }
}
