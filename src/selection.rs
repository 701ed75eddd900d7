use crate::model::Aggregate;
use crate::registry::Registry;

/// Which registry entries are marked for cleanup.
///
/// Individual flags are the only stored state; the aggregate is always computed from
/// them, so "select all" can never feed back into individual toggles.
#[derive(Debug, Clone)]
pub struct Selection {
    entries: Vec<(String, bool)>,
}

impl Selection {
    /// Everything starts unselected, in registry order.
    pub fn new(registry: &Registry) -> Self {
        Self {
            entries: registry.names().map(|n| (n.to_string(), false)).collect(),
        }
    }

    /// Flips one entry. Unknown names are ignored.
    pub fn toggle(&mut self, name: &str) {
        if let Some((_, selected)) = self.entries.iter_mut().find(|(n, _)| n == name) {
            *selected = !*selected;
        }
    }

    pub fn set_all(&mut self, value: bool) {
        for (_, selected) in &mut self.entries {
            *selected = value;
        }
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, s)| n == name && *s)
    }

    pub fn aggregate(&self) -> Aggregate {
        let selected = self.entries.iter().filter(|(_, s)| *s).count();
        if selected == 0 {
            // An empty registry reads as "none" too.
            Aggregate::None
        } else if selected == self.entries.len() {
            Aggregate::All
        } else {
            Aggregate::Partial
        }
    }

    /// Snapshot of the selected names in display order. Later toggles do not touch it.
    pub fn selected_names(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, s)| *s)
            .map(|(n, _)| n.clone())
            .collect()
    }
}
