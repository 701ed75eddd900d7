use crate::allowlist::Allowlist;
use crate::cleaner::Cleaner;
use crate::config::Settings;
use crate::estimator::Estimator;
use crate::executor::{CleanupHandle, Executor};
use crate::model::{Aggregate, DescriptorView, SizeReport};
use crate::refresh::{self, RefreshScheduler, SizeGate};
use crate::registry::Registry;
use crate::selection::Selection;
use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::time::Duration;

/// Everything a presentation layer talks to: the registry, the current selection,
/// sizing, and batch execution.
pub struct Session {
    registry: Arc<Registry>,
    selection: Selection,
    estimator: Estimator,
    executor: Arc<Executor>,
    gate: SizeGate,
}

impl Session {
    pub fn new(settings: &Settings) -> Self {
        let allowlist = Arc::new(Allowlist::load(settings.allowlist.as_deref()));
        Self::with_parts(
            Registry::system(),
            Estimator::new(Arc::clone(&allowlist)),
            Cleaner::new(allowlist),
            settings.item_pause,
        )
    }

    pub fn with_parts(
        registry: Registry,
        estimator: Estimator,
        cleaner: Cleaner,
        item_pause: Duration,
    ) -> Self {
        let registry = Arc::new(registry);
        let gate = SizeGate::default();
        let executor = Arc::new(Executor::new(
            Arc::clone(&registry),
            cleaner,
            estimator.clone(),
            gate.clone(),
            item_pause,
        ));
        Self {
            selection: Selection::new(&registry),
            registry,
            estimator,
            executor,
            gate,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Rows for display, each with a freshly measured size.
    pub fn list_descriptors(&self) -> Vec<DescriptorView> {
        self.views(&self.estimator.snapshot_all(&self.registry))
    }

    /// Pairs a size report with descriptor metadata, in registry order.
    pub fn views(&self, report: &SizeReport) -> Vec<DescriptorView> {
        self.registry
            .descriptors()
            .iter()
            .map(|d| DescriptorView {
                name: d.name.clone(),
                description: d.description.clone(),
                root: d.root().map(Path::to_path_buf),
                risk_message: d.risk_message().map(str::to_string),
                size: report
                    .get(&d.name)
                    .cloned()
                    .unwrap_or_else(|| self.estimator.snapshot(d)),
            })
            .collect()
    }

    pub fn toggle_selection(&mut self, name: &str) {
        self.selection.toggle(name);
    }

    pub fn set_all_selection(&mut self, selected: bool) {
        self.selection.set_all(selected);
    }

    pub fn selection_aggregate(&self) -> Aggregate {
        self.selection.aggregate()
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selection.is_selected(name)
    }

    pub fn selected_names(&self) -> Vec<String> {
        self.selection.selected_names()
    }

    /// Starts a batch over `names` on a worker thread.
    pub fn run_cleanup(&self, names: Vec<String>) -> CleanupHandle {
        self.executor.spawn(names)
    }

    /// Starts a batch over a snapshot of the current selection.
    pub fn run_selected(&self) -> CleanupHandle {
        self.run_cleanup(self.selection.selected_names())
    }

    /// Fresh sizes for every descriptor, or `None` while a batch is running.
    pub fn refresh_tick(&self) -> Option<SizeReport> {
        refresh::tick(&self.registry, &self.estimator, &self.gate)
    }

    pub fn start_refresh(&self, interval: Duration, updates: Sender<SizeReport>) -> RefreshScheduler {
        RefreshScheduler::start(
            Arc::clone(&self.registry),
            self.estimator.clone(),
            self.gate.clone(),
            interval,
            updates,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::trash_stores::{TrashLayout, TrashProbe};
    use crate::executor::CleanupEvent;
    use crate::model::{ActionSizing, Descriptor};
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    fn session(root: &Path) -> Session {
        let allowlist = Arc::new(Allowlist::default());
        let registry = Registry::new(vec![
            Descriptor::path("User Temp", root.to_path_buf(), "temp files"),
            Descriptor::action("DNS Cache", "resolver", ActionSizing::Unsized, || Ok(true)),
            Descriptor::action("Recycle Bin", "trash", ActionSizing::TrashStores, || Ok(true))
                .risky("gone for good"),
        ]);
        Session::with_parts(
            registry,
            Estimator::new(Arc::clone(&allowlist)).with_trash_probe(TrashProbe::new(
                TrashLayout::RecycleBin,
                vec![],
                None,
                None,
            )),
            Cleaner::new(allowlist),
            Duration::ZERO,
        )
    }

    #[test]
    fn list_descriptors_exposes_metadata_and_sizes() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("big.tmp"), vec![0u8; 1536])?;
        let views = session(dir.path()).list_descriptors();

        assert_eq!(views.len(), 3);
        assert_eq!(views[0].size.label(), "User Temp (1.5 KB)");
        assert_eq!(views[1].size.label(), "DNS Cache");
        assert_eq!(views[2].size.label(), "Recycle Bin (0 B)");
        assert!(views[2].is_risky());
        assert_eq!(views[2].risk_message.as_deref(), Some("gone for good"));
        assert!(!views[0].is_risky());
        assert_eq!(views[0].root.as_deref(), Some(dir.path()));
        assert!(views[1].root.is_none());
        Ok(())
    }

    #[test]
    fn selection_surface() -> Result<()> {
        let dir = tempdir()?;
        let mut s = session(dir.path());
        s.set_all_selection(true);
        assert_eq!(s.selection_aggregate(), Aggregate::All);
        s.toggle_selection("DNS Cache");
        assert_eq!(s.selection_aggregate(), Aggregate::Partial);
        assert!(!s.is_selected("DNS Cache"));
        s.toggle_selection("DNS Cache");
        assert_eq!(s.selection_aggregate(), Aggregate::All);
        s.toggle_selection("Not Registered");
        assert_eq!(s.selection_aggregate(), Aggregate::All);
        Ok(())
    }

    #[test]
    fn refresh_after_cleanup_never_grows() -> Result<()> {
        let dir = tempdir()?;
        let sub = dir.path().join("cache");
        fs::create_dir(&sub)?;
        fs::write(dir.path().join("a.tmp"), [0u8; 400])?;
        fs::write(sub.join("b.tmp"), [0u8; 600])?;

        let mut s = session(dir.path());
        let before = s
            .refresh_tick()
            .and_then(|r| r.get("User Temp").map(|x| x.bytes))
            .unwrap_or_default();
        assert_eq!(before, 1000);

        s.toggle_selection("User Temp");
        let handle = s.run_selected();
        // Toggling mid-run must not affect the batch.
        s.set_all_selection(true);
        let events: Vec<CleanupEvent> = handle.events().iter().collect();
        handle.wait()?;

        let finished: Vec<&str> = events
            .iter()
            .filter_map(|e| match e {
                CleanupEvent::Finished { result, .. } => Some(result.name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(finished, ["User Temp"]);

        let after = s
            .refresh_tick()
            .and_then(|r| r.get("User Temp").map(|x| x.bytes))
            .unwrap_or(u64::MAX);
        assert!(after <= before);
        assert_eq!(after, 0);
        Ok(())
    }

    #[test]
    fn run_cleanup_with_nothing_selected() -> Result<()> {
        let dir = tempdir()?;
        let s = session(dir.path());
        let handle = s.run_selected();
        let events: Vec<CleanupEvent> = handle.events().iter().collect();
        let summary = handle.wait()?;
        assert_eq!(events.len(), 1);
        assert_eq!(summary.total, 0);
        assert_eq!(events[0].status_text(), "No items selected for cleanup.");
        Ok(())
    }
}
