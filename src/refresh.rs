use crate::estimator::Estimator;
use crate::model::SizeReport;
use crate::registry::Registry;
use log::{debug, trace};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Serializes size refreshes against cleanup batches. A batch holds it for its whole
/// run; refresh ticks only try it and skip when it is taken.
#[derive(Debug, Clone, Default)]
pub struct SizeGate(Arc<Mutex<()>>);

impl SizeGate {
    pub fn hold(&self) -> MutexGuard<'_, ()> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn try_hold(&self) -> Option<MutexGuard<'_, ()>> {
        match self.0.try_lock() {
            Ok(guard) => Some(guard),
            Err(TryLockError::Poisoned(p)) => Some(p.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }
}

/// One refresh pass, or `None` while a cleanup owns the gate.
pub fn tick(registry: &Registry, estimator: &Estimator, gate: &SizeGate) -> Option<SizeReport> {
    let _guard = gate.try_hold()?;
    Some(estimator.snapshot_all(registry))
}

/// Re-estimates every descriptor on a fixed interval and publishes the reports.
/// Stops on `stop()`, on drop, or once the receiving side hangs up.
pub struct RefreshScheduler {
    stop: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl RefreshScheduler {
    pub fn start(
        registry: Arc<Registry>,
        estimator: Estimator,
        gate: SizeGate,
        interval: Duration,
        updates: Sender<SizeReport>,
    ) -> Self {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let worker = thread::spawn(move || {
            loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
                let Some(report) = tick(&registry, &estimator, &gate) else {
                    debug!("cleanup in progress, skipping size refresh");
                    continue;
                };
                trace!("size refresh: {} entries", report.sizes.len());
                if updates.send(report).is_err() {
                    break;
                }
            }
            debug!("size refresh stopped");
        });

        Self {
            stop: Some(stop_tx),
            worker: Some(worker),
        }
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allowlist::Allowlist;
    use crate::estimator::trash_stores::{TrashLayout, TrashProbe};
    use crate::model::Descriptor;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    fn fixture(root: &std::path::Path) -> (Arc<Registry>, Estimator) {
        let registry = Arc::new(Registry::new(vec![Descriptor::path(
            "Temp",
            root.to_path_buf(),
            "temp",
        )]));
        let estimator = Estimator::new(Arc::new(Allowlist::default())).with_trash_probe(
            TrashProbe::new(TrashLayout::Freedesktop, vec![], None, None),
        );
        (registry, estimator)
    }

    #[test]
    fn tick_is_skipped_while_gate_is_held() -> Result<()> {
        let dir = tempdir()?;
        let (registry, estimator) = fixture(dir.path());
        let gate = SizeGate::default();

        let guard = gate.hold();
        assert!(tick(&registry, &estimator, &gate).is_none());
        drop(guard);
        assert!(tick(&registry, &estimator, &gate).is_some());
        Ok(())
    }

    #[test]
    fn scheduler_publishes_fresh_sizes() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("a"), [0u8; 64])?;
        let (registry, estimator) = fixture(dir.path());

        let (tx, rx) = mpsc::channel();
        let scheduler = RefreshScheduler::start(
            registry,
            estimator,
            SizeGate::default(),
            Duration::from_millis(10),
            tx,
        );

        let first = rx.recv_timeout(Duration::from_secs(5))?;
        assert_eq!(first.get("Temp").map(|s| s.bytes), Some(64));

        fs::write(dir.path().join("b"), [0u8; 36])?;
        let mut latest = rx.recv_timeout(Duration::from_secs(5))?;
        while latest.get("Temp").map(|s| s.bytes) != Some(100) {
            latest = rx.recv_timeout(Duration::from_secs(5))?;
        }
        assert!(latest.taken_at > first.taken_at);

        scheduler.stop();
        Ok(())
    }

    #[test]
    fn scheduler_waits_for_gate() -> Result<()> {
        let dir = tempdir()?;
        let (registry, estimator) = fixture(dir.path());
        let gate = SizeGate::default();
        let (tx, rx) = mpsc::channel();

        let guard = gate.hold();
        let scheduler = RefreshScheduler::start(
            registry,
            estimator,
            gate.clone(),
            Duration::from_millis(10),
            tx,
        );
        assert!(rx.recv_timeout(Duration::from_millis(150)).is_err());

        drop(guard);
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
        drop(scheduler);
        Ok(())
    }

    #[test]
    fn drop_stops_worker() -> Result<()> {
        let dir = tempdir()?;
        let (registry, estimator) = fixture(dir.path());
        let (tx, rx) = mpsc::channel();
        let scheduler = RefreshScheduler::start(
            registry,
            estimator,
            SizeGate::default(),
            Duration::from_secs(3600),
            tx,
        );
        drop(scheduler);
        // Worker exited and dropped its sender.
        assert!(matches!(
            rx.recv_timeout(Duration::from_secs(5)),
            Err(RecvTimeoutError::Disconnected)
        ));
        Ok(())
    }
}
