//! Build report history

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::Utc;
use tracing::warn;

use crate::errors::AggregatorError;
use crate::report::model::{Completion, Report};

/// Latest reports, swapped as one value
#[derive(Debug, Clone, Default)]
pub struct ReportHistory {
    /// Most recent report, possibly still pending
    pub last: Option<Arc<Report>>,

    /// Most recent finished report
    pub last_complete: Option<Arc<Report>>,

    /// Most recent successful report
    pub last_successful: Option<Arc<Report>>,
}

/// Identifies a started build; consumed when the build completes
#[derive(Debug)]
pub struct ReportHandle {
    report: Arc<Report>,
}

impl ReportHandle {
    pub fn id(&self) -> u64 {
        self.report.id
    }
}

/// Tracks the outcome of every build cycle
pub struct ReportRepository {
    history: ArcSwap<ReportHistory>,
    next_id: AtomicU64,
}

impl ReportRepository {
    pub fn new() -> Self {
        Self {
            history: ArcSwap::from_pointee(ReportHistory::default()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Open a pending report for a new build
    pub fn record_start(&self) -> ReportHandle {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let report = Arc::new(Report::pending(id, Utc::now()));

        self.history.rcu(|history| {
            let mut next = ReportHistory::clone(history);
            // A concurrent start may already have stored a newer id
            if is_older(&next.last, &report) {
                next.last = Some(Arc::clone(&report));
            }
            next
        });

        ReportHandle { report }
    }

    /// Close a report with its terminal outcome
    pub fn record_completion(&self, handle: ReportHandle, completion: Completion) -> Arc<Report> {
        let mut report = Report::clone(&handle.report);
        report.end_time = Some(Utc::now());
        report.outcome = completion.into();
        let report = Arc::new(report);

        self.history.rcu(|history| {
            let mut next = ReportHistory::clone(history);
            if is_same(&next.last, &report) {
                next.last = Some(Arc::clone(&report));
            }
            if is_older(&next.last_complete, &report) {
                next.last_complete = Some(Arc::clone(&report));
            }
            if report.is_successful() && is_older(&next.last_successful, &report) {
                next.last_successful = Some(Arc::clone(&report));
            }
            next
        });

        if !is_same(&self.history.load().last, &report) {
            warn!("Report {} completed after a newer build started", report.id);
        }

        report
    }

    /// Consistent view of all three references
    pub fn history(&self) -> Arc<ReportHistory> {
        self.history.load_full()
    }

    pub fn get_last(&self) -> Result<Arc<Report>, AggregatorError> {
        self.history.load().last.clone().ok_or(AggregatorError::NoReportYet)
    }

    pub fn get_last_complete(&self) -> Result<Arc<Report>, AggregatorError> {
        self.history
            .load()
            .last_complete
            .clone()
            .ok_or(AggregatorError::NoReportYet)
    }

    pub fn get_last_successful(&self) -> Result<Arc<Report>, AggregatorError> {
        self.history
            .load()
            .last_successful
            .clone()
            .ok_or(AggregatorError::NoReportYet)
    }
}

impl Default for ReportRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn is_same(current: &Option<Arc<Report>>, report: &Report) -> bool {
    current.as_ref().is_some_and(|r| r.id == report.id)
}

fn is_older(current: &Option<Arc<Report>>, report: &Report) -> bool {
    current.as_ref().map_or(true, |r| r.id < report.id)
}
