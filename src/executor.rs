use crate::cleaner::Cleaner;
use crate::estimator::Estimator;
use crate::model::{CleanupResult, SizeReport};
use crate::refresh::SizeGate;
use crate::registry::Registry;
use anyhow::{Result, anyhow};
use log::{info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub const NOTHING_SELECTED: &str = "No items selected for cleanup.";

#[derive(Debug, Clone)]
pub enum CleanupEvent {
    Started {
        name: String,
        position: usize,
        total: usize,
    },
    Finished {
        result: CleanupResult,
        progress: usize,
        total: usize,
    },
    Completed(BatchSummary),
}

impl CleanupEvent {
    pub fn status_text(&self) -> String {
        match self {
            Self::Started { name, .. } => format!("Cleaning {name}..."),
            Self::Finished { result, .. } => result.status_text(),
            Self::Completed(summary) => summary.message(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub total: usize,
    pub processed: usize,
    pub failed: usize,
    pub cancelled: bool,
    /// Sizes re-measured after the batch; `None` when nothing was selected.
    pub sizes: Option<SizeReport>,
}

impl BatchSummary {
    pub const fn nothing_selected() -> Self {
        Self {
            total: 0,
            processed: 0,
            failed: 0,
            cancelled: false,
            sizes: None,
        }
    }

    pub const fn succeeded(&self) -> usize {
        self.processed - self.failed
    }

    pub fn message(&self) -> String {
        if self.total == 0 {
            NOTHING_SELECTED.to_string()
        } else if self.cancelled {
            format!(
                "Cleanup cancelled after {} of {} items.",
                self.processed, self.total
            )
        } else if self.failed > 0 {
            format!(
                "Cleanup complete! {} of {} items failed.",
                self.failed, self.total
            )
        } else {
            "Cleanup complete!".to_string()
        }
    }
}

/// Stops a batch before its next item.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Processes a batch of descriptors one at a time, in the order given.
pub struct Executor {
    registry: Arc<Registry>,
    cleaner: Cleaner,
    estimator: Estimator,
    gate: SizeGate,
    item_pause: Duration,
}

impl Executor {
    pub const fn new(
        registry: Arc<Registry>,
        cleaner: Cleaner,
        estimator: Estimator,
        gate: SizeGate,
        item_pause: Duration,
    ) -> Self {
        Self {
            registry,
            cleaner,
            estimator,
            gate,
            item_pause,
        }
    }

    /// Runs the batch on the calling thread. Item failures never stop the loop, and
    /// every descriptor is re-measured at the end whatever the outcome.
    pub fn run(
        &self,
        names: &[String],
        cancel: &CancelFlag,
        events: &Sender<CleanupEvent>,
    ) -> BatchSummary {
        if names.is_empty() {
            let summary = BatchSummary::nothing_selected();
            let _ = events.send(CleanupEvent::Completed(summary.clone()));
            return summary;
        }

        let _gate = self.gate.hold();
        let total = names.len();
        let mut processed = 0;
        let mut failed = 0;
        let mut cancelled = false;
        info!("cleaning {total} resources");

        for (position, name) in names.iter().enumerate() {
            if cancel.is_cancelled() {
                info!("cleanup cancelled before {name}");
                cancelled = true;
                break;
            }
            let _ = events.send(CleanupEvent::Started {
                name: name.clone(),
                position,
                total,
            });

            let success = if let Some(descriptor) = self.registry.get(name) {
                self.cleaner.clean(descriptor)
            } else {
                warn!("unknown resource {name:?}");
                false
            };
            processed += 1;
            if !success {
                failed += 1;
            }

            let _ = events.send(CleanupEvent::Finished {
                result: CleanupResult {
                    name: name.clone(),
                    success,
                },
                progress: processed,
                total,
            });

            if !self.item_pause.is_zero() {
                thread::sleep(self.item_pause);
            }
        }

        let summary = BatchSummary {
            total,
            processed,
            failed,
            cancelled,
            sizes: Some(self.estimator.snapshot_all(&self.registry)),
        };
        info!("{}", summary.message());
        let _ = events.send(CleanupEvent::Completed(summary.clone()));
        summary
    }

    /// Runs the batch on a worker thread; events arrive on the returned handle.
    pub fn spawn(self: &Arc<Self>, names: Vec<String>) -> CleanupHandle {
        let (tx, rx) = mpsc::channel();
        let cancel = CancelFlag::default();

        let executor = Arc::clone(self);
        let worker_cancel = cancel.clone();
        let worker = thread::spawn(move || executor.run(&names, &worker_cancel, &tx));

        CleanupHandle {
            events: rx,
            cancel,
            worker,
        }
    }
}

pub struct CleanupHandle {
    events: Receiver<CleanupEvent>,
    cancel: CancelFlag,
    worker: JoinHandle<BatchSummary>,
}

impl CleanupHandle {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub const fn events(&self) -> &Receiver<CleanupEvent> {
        &self.events
    }

    /// Next pending event without blocking. `None` when none is queued yet or the
    /// worker is done and the queue drained.
    pub fn try_next(&self) -> Option<CleanupEvent> {
        match self.events.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    pub fn wait(self) -> Result<BatchSummary> {
        self.worker
            .join()
            .map_err(|_| anyhow!("cleanup worker panicked"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allowlist::Allowlist;
    use crate::cleaner::tests::LockedRemover;
    use crate::estimator::trash_stores::{TrashLayout, TrashProbe};
    use crate::model::{ActionSizing, Descriptor};
    use std::fs;
    use std::path::PathBuf;
    use std::sync::atomic::AtomicUsize;
    use tempfile::tempdir;

    fn executor_for(descriptors: Vec<Descriptor>) -> Arc<Executor> {
        executor_with(descriptors, Cleaner::new(Arc::new(Allowlist::default())))
    }

    fn executor_with(descriptors: Vec<Descriptor>, cleaner: Cleaner) -> Arc<Executor> {
        let estimator = Estimator::new(Arc::new(Allowlist::default())).with_trash_probe(
            TrashProbe::new(TrashLayout::Freedesktop, vec![], None, None),
        );
        Arc::new(Executor::new(
            Arc::new(Registry::new(descriptors)),
            cleaner,
            estimator,
            SizeGate::default(),
            Duration::ZERO,
        ))
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    fn drain(handle: CleanupHandle) -> Result<(Vec<CleanupEvent>, BatchSummary)> {
        let events: Vec<CleanupEvent> = handle.events().iter().collect();
        let summary = handle.wait()?;
        Ok((events, summary))
    }

    fn results(events: &[CleanupEvent]) -> Vec<CleanupResult> {
        events
            .iter()
            .filter_map(|e| match e {
                CleanupEvent::Finished { result, .. } => Some(result.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn empty_selection_reports_nothing_selected() -> Result<()> {
        let exec = executor_for(vec![Descriptor::action(
            "DNS Cache",
            "dns",
            ActionSizing::Unsized,
            || Ok(true),
        )]);
        let (events, summary) = drain(exec.spawn(vec![]))?;

        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], CleanupEvent::Completed(s) if s.total == 0));
        assert!(results(&events).is_empty());
        assert_eq!(summary.message(), NOTHING_SELECTED);
        assert!(summary.sizes.is_none());
        Ok(())
    }

    #[test]
    fn mixed_batch_keeps_order_and_isolates_failure() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("x.tmp"), [0u8; 16])?;
        let exec = executor_for(vec![
            Descriptor::path("Temp", dir.path().to_path_buf(), "temp"),
            Descriptor::action("Broken", "always fails", ActionSizing::Unsized, || {
                Ok(false)
            }),
            Descriptor::action("DNS Cache", "dns", ActionSizing::Unsized, || Ok(true)),
        ]);

        let order = names(&["DNS Cache", "Broken", "Temp"]);
        let (events, summary) = drain(exec.spawn(order.clone()))?;

        let results = results(&events);
        let got: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(got, ["DNS Cache", "Broken", "Temp"]);
        assert_eq!(results.iter().filter(|r| !r.success).count(), 1);
        assert!(!results[1].success);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.succeeded(), 2);
        assert!(!dir.path().join("x.tmp").exists());

        let started: Vec<&str> = events
            .iter()
            .filter_map(|e| match e {
                CleanupEvent::Started { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(started, got);
        assert!(matches!(events.last(), Some(CleanupEvent::Completed(_))));
        Ok(())
    }

    #[test]
    fn progress_is_monotonic_up_to_total() -> Result<()> {
        let exec = executor_for(
            ["A", "B", "C"]
                .iter()
                .map(|n| Descriptor::action(n, "ok", ActionSizing::Unsized, || Ok(true)))
                .collect(),
        );
        let (events, _) = drain(exec.spawn(names(&["A", "B", "C"])))?;
        let progress: Vec<(usize, usize)> = events
            .iter()
            .filter_map(|e| match e {
                CleanupEvent::Finished {
                    progress, total, ..
                } => Some((*progress, *total)),
                _ => None,
            })
            .collect();
        assert_eq!(progress, [(1, 3), (2, 3), (3, 3)]);
        Ok(())
    }

    #[test]
    fn missing_root_succeeds_without_creating_it() -> Result<()> {
        let root = PathBuf::from("/path/to/non/existent/clearway_exec_test_98765");
        let exec = executor_for(vec![Descriptor::path("Ghost", root.clone(), "ghost")]);
        let (events, _) = drain(exec.spawn(names(&["Ghost"])))?;
        assert_eq!(
            results(&events),
            [CleanupResult {
                name: "Ghost".to_string(),
                success: true
            }]
        );
        assert!(!root.exists());
        Ok(())
    }

    #[test]
    fn locked_file_still_reports_success() -> Result<()> {
        let dir = tempdir()?;
        let root = dir.path().to_path_buf();
        for i in 0..4 {
            fs::write(root.join(format!("cache{i}.bin")), [1u8; 32])?;
        }
        let locked = root.join("in-use.lock");
        fs::write(&locked, [1u8; 32])?;

        let cleaner = Cleaner::with_remover(
            Arc::new(Allowlist::default()),
            Arc::new(LockedRemover {
                locked: vec![locked.clone()],
            }),
        );
        let exec = executor_with(vec![Descriptor::path("Cache", root.clone(), "c")], cleaner);
        let (events, summary) = drain(exec.spawn(names(&["Cache"])))?;

        assert!(results(&events)[0].success);
        assert_eq!(summary.failed, 0);
        for i in 0..4 {
            assert!(!root.join(format!("cache{i}.bin")).exists());
        }
        assert!(locked.exists());
        assert_eq!(
            summary.sizes.as_ref().and_then(|s| s.get("Cache")).map(|s| s.bytes),
            Some(32)
        );
        Ok(())
    }

    #[test]
    fn sizes_refresh_even_when_everything_fails() -> Result<()> {
        let exec = executor_for(vec![Descriptor::action(
            "Broken",
            "b",
            ActionSizing::Unsized,
            || Err(anyhow!("no resolver")),
        )]);
        let (_, summary) = drain(exec.spawn(names(&["Broken"])))?;
        assert_eq!(summary.failed, 1);
        assert!(summary.sizes.is_some());
        assert_eq!(summary.message(), "Cleanup complete! 1 of 1 items failed.");
        Ok(())
    }

    #[test]
    fn unknown_name_is_a_failed_item() -> Result<()> {
        let exec = executor_for(vec![Descriptor::action(
            "DNS Cache",
            "dns",
            ActionSizing::Unsized,
            || Ok(true),
        )]);
        let (events, summary) = drain(exec.spawn(names(&["Nope", "DNS Cache"])))?;
        let results = results(&events);
        assert_eq!(results.len(), 2);
        assert!(!results[0].success);
        assert!(results[1].success);
        assert_eq!(summary.failed, 1);
        Ok(())
    }

    #[test]
    fn cancel_stops_before_next_item() -> Result<()> {
        let calls = Arc::new(AtomicUsize::new(0));
        let cancel = CancelFlag::default();

        let counter = Arc::clone(&calls);
        let trip = cancel.clone();
        let first = Descriptor::action("First", "f", ActionSizing::Unsized, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            trip.cancel();
            Ok(true)
        });
        let counter = Arc::clone(&calls);
        let second = Descriptor::action("Second", "s", ActionSizing::Unsized, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        });

        let exec = executor_for(vec![first, second]);
        let (tx, rx) = mpsc::channel();
        let summary = exec.run(&names(&["First", "Second"]), &cancel, &tx);
        drop(tx);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(summary.cancelled);
        assert_eq!(summary.processed, 1);
        assert!(summary.sizes.is_some());
        let events: Vec<CleanupEvent> = rx.iter().collect();
        assert_eq!(results(&events).len(), 1);
        assert!(matches!(events.last(), Some(CleanupEvent::Completed(s)) if s.cancelled));
        Ok(())
    }

    #[test]
    fn batch_holds_size_gate() {
        let gate = SizeGate::default();
        let probe_gate = gate.clone();
        let observed = Arc::new(AtomicBool::new(false));
        let seen = Arc::clone(&observed);
        let exec = Executor::new(
            Arc::new(Registry::new(vec![Descriptor::action(
                "Probe",
                "p",
                ActionSizing::Unsized,
                move || {
                    seen.store(probe_gate.try_hold().is_none(), Ordering::SeqCst);
                    Ok(true)
                },
            )])),
            Cleaner::new(Arc::new(Allowlist::default())),
            Estimator::new(Arc::new(Allowlist::default())),
            gate.clone(),
            Duration::ZERO,
        );
        let (tx, _rx) = mpsc::channel();
        exec.run(&names(&["Probe"]), &CancelFlag::default(), &tx);

        assert!(observed.load(Ordering::SeqCst));
        assert!(gate.try_hold().is_some());
    }

    #[test]
    fn status_texts() {
        let started = CleanupEvent::Started {
            name: "Prefetch".to_string(),
            position: 0,
            total: 1,
        };
        assert_eq!(started.status_text(), "Cleaning Prefetch...");
        let done = CleanupEvent::Completed(BatchSummary {
            total: 2,
            processed: 2,
            failed: 0,
            cancelled: false,
            sizes: None,
        });
        assert_eq!(done.status_text(), "Cleanup complete!");
    }
}
