use crate::executor::{CleanupEvent, CleanupHandle};
use crate::model::{Aggregate, DescriptorView, SizeReport};
use crate::refresh::RefreshScheduler;
use crate::session::Session;
use log::debug;
use ratatui::widgets::ListState;
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};
use sysinfo::Disks;

pub enum AppState {
    Browsing,
    Confirming,
    Cleaning,
    Done(String),
}

/// List row 0 is the "Select all" entry; descriptors follow from row 1.
pub const SELECT_ALL_ROW: usize = 0;

pub struct App {
    pub session: Session,
    pub rows: Vec<DescriptorView>,
    pub list_state: ListState,
    pub state: AppState,
    pub disks: Disks,
    pub status: String,
    pub progress: (usize, usize),
    cleanup: Option<CleanupHandle>,
    size_rx: Option<Receiver<SizeReport>>,
    sizes_taken_at: Option<Instant>,
    refresh: Option<RefreshScheduler>,
}

impl App {
    pub fn new(session: Session) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(SELECT_ALL_ROW + 1));
        let rows = session.list_descriptors();
        Self {
            session,
            rows,
            list_state,
            state: AppState::Browsing,
            disks: Disks::new_with_refreshed_list(),
            status: String::new(),
            progress: (0, 0),
            cleanup: None,
            size_rx: None,
            sizes_taken_at: None,
            refresh: None,
        }
    }

    pub fn start_refresh(&mut self, interval: Duration) {
        let (tx, rx) = mpsc::channel();
        self.refresh = Some(self.session.start_refresh(interval, tx));
        self.size_rx = Some(rx);
    }

    pub fn stop_refresh(&mut self) {
        if let Some(scheduler) = self.refresh.take() {
            scheduler.stop();
        }
        self.size_rx = None;
    }

    fn row_count(&self) -> usize {
        self.rows.len() + 1
    }

    pub fn next(&mut self) {
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < self.row_count() => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let i = match self.list_state.selected() {
            Some(0) | None => self.row_count() - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    /// The descriptor under the cursor, if the cursor is not on "Select all".
    pub fn highlighted(&self) -> Option<&DescriptorView> {
        self.list_state
            .selected()
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| self.rows.get(i))
    }

    pub fn toggle(&mut self) {
        if self.is_busy() {
            return;
        }
        match self.list_state.selected() {
            Some(SELECT_ALL_ROW) => self.toggle_all(),
            Some(_) => {
                if let Some(name) = self.highlighted().map(|r| r.name.clone()) {
                    self.session.toggle_selection(&name);
                }
            }
            None => {}
        }
    }

    /// Checks everything unless everything is already checked.
    pub fn toggle_all(&mut self) {
        if self.is_busy() {
            return;
        }
        let select = self.session.selection_aggregate() != Aggregate::All;
        self.session.set_all_selection(select);
    }

    pub fn total_selected_size(&self) -> u64 {
        self.rows
            .iter()
            .filter(|r| self.session.is_selected(&r.name))
            .map(|r| r.size.bytes)
            .sum()
    }

    pub fn selected_risks(&self) -> Vec<(&str, &str)> {
        self.rows
            .iter()
            .filter(|r| self.session.is_selected(&r.name))
            .filter_map(|r| r.risk_message.as_deref().map(|m| (r.name.as_str(), m)))
            .collect()
    }

    /// Enter in browse mode: confirm first unless there is nothing to do.
    pub fn request_clean(&mut self) {
        if self.session.selection_aggregate() == Aggregate::None {
            self.clean_selected();
        } else {
            self.state = AppState::Confirming;
        }
    }

    pub fn clean_selected(&mut self) {
        let handle = self.session.run_selected();
        self.progress = (0, self.session.selected_names().len());
        self.status.clear();
        self.cleanup = Some(handle);
        self.state = AppState::Cleaning;
    }

    pub fn cancel_cleaning(&mut self) {
        if let Some(handle) = &self.cleanup {
            handle.cancel();
            self.status = "Cancelling after the current item...".to_string();
        }
    }

    pub const fn is_busy(&self) -> bool {
        matches!(self.state, AppState::Cleaning)
    }

    pub fn check_cleaning_status(&mut self) {
        let Some(handle) = &self.cleanup else {
            return;
        };

        let mut finished = None;
        while let Some(event) = handle.try_next() {
            self.status = event.status_text();
            match event {
                CleanupEvent::Started { total, .. } => self.progress.1 = total,
                CleanupEvent::Finished {
                    progress, total, ..
                } => self.progress = (progress, total),
                CleanupEvent::Completed(summary) => {
                    finished = Some(summary);
                    break;
                }
            }
        }

        if let Some(summary) = finished {
            if let Some(handle) = self.cleanup.take() {
                let _ = handle.wait();
            }
            let message = summary.message();
            if let Some(report) = summary.sizes {
                self.apply_sizes(report);
            }
            self.disks.refresh(true);
            self.state = AppState::Done(message);
        }
    }

    pub fn check_size_updates(&mut self) {
        let Some(rx) = &self.size_rx else {
            return;
        };
        let reports: Vec<SizeReport> = rx.try_iter().collect();
        for report in reports {
            self.apply_sizes(report);
        }
    }

    /// Re-measures everything now instead of waiting for the next tick.
    pub fn refresh_now(&mut self) {
        if let Some(report) = self.session.refresh_tick() {
            self.apply_sizes(report);
            self.disks.refresh(true);
        }
    }

    /// Applies a report unless a newer one is already on screen.
    pub fn apply_sizes(&mut self, report: SizeReport) {
        if self.sizes_taken_at.is_some_and(|t| report.taken_at <= t) {
            debug!("dropping stale size report");
            return;
        }
        self.sizes_taken_at = Some(report.taken_at);
        self.rows = self.session.views(&report);
    }
}
