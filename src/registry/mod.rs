pub mod actions;
pub mod unix;
pub mod windows;

use crate::model::Descriptor;
use log::warn;

/// The fixed, ordered set of known resources. Built once, read-only afterwards.
#[derive(Debug)]
pub struct Registry {
    descriptors: Vec<Descriptor>,
}

impl Registry {
    /// Order is display order. A repeated name keeps its first definition.
    pub fn new(descriptors: Vec<Descriptor>) -> Self {
        let mut unique: Vec<Descriptor> = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            if unique.iter().any(|d| d.name == descriptor.name) {
                warn!("duplicate resource {:?} ignored", descriptor.name);
                continue;
            }
            unique.push(descriptor);
        }
        Self {
            descriptors: unique,
        }
    }

    /// The catalogue for the platform we are running on. Never fails: paths that
    /// cannot be resolved come out empty and measure as non-existent.
    pub fn system() -> Self {
        let descriptors = if cfg!(windows) {
            windows::catalogue(&windows::WindowsPaths::resolve())
        } else {
            unix::catalogue(&unix::UnixPaths::resolve())
        };
        Self::new(descriptors)
    }

    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    pub fn get(&self, name: &str) -> Option<&Descriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.descriptors.iter().map(|d| d.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ActionSizing, ResourceKind};
    use std::path::PathBuf;

    #[test]
    fn keeps_order_and_first_duplicate() {
        let registry = Registry::new(vec![
            Descriptor::path("B", PathBuf::from("/b"), "first b"),
            Descriptor::path("A", PathBuf::from("/a"), "a"),
            Descriptor::path("B", PathBuf::from("/b2"), "second b"),
        ]);
        assert_eq!(registry.names().collect::<Vec<_>>(), ["B", "A"]);
        assert_eq!(registry.get("B").map(|d| d.description.as_str()), Some("first b"));
        assert!(registry.get("C").is_none());
    }

    #[test]
    fn system_catalogue_is_well_formed() {
        let registry = Registry::system();
        assert!(!registry.descriptors().is_empty());

        let trash_like: Vec<&Descriptor> = registry
            .descriptors()
            .iter()
            .filter(|d| {
                matches!(
                    d.kind,
                    ResourceKind::ActionBased {
                        sizing: ActionSizing::TrashStores,
                        ..
                    }
                )
            })
            .collect();
        assert_eq!(trash_like.len(), 1);
        assert!(trash_like[0].is_risky());
    }
}
