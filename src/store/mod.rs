//! Process-wide patient/report store.
//!
//! The current generation sits behind an `Arc`; readers clone the `Arc` and
//! keep a consistent view for as long as they hold it. Writers (replace and
//! clear) serialize on a separate mutex that an upload holds for its whole
//! pipeline run.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard, RwLock};

use crate::schema::v1::{CleaningStats, Patient, Report, ReportStatus, RiskLevel, StoreStatus};

pub mod materialize;

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub patients: Vec<Patient>,
    pub reports: Vec<Report>,
    pub data_cleaning: Option<CleaningStats>,
}

impl Dataset {
    pub fn status(&self) -> StoreStatus {
        StoreStatus {
            has_data: !self.patients.is_empty(),
            patients_count: self.patients.len() as u64,
            reports_count: self.reports.len() as u64,
            data_cleaning: self.data_cleaning.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportFilter {
    pub risk_level: Option<RiskLevel>,
    pub status: Option<ReportStatus>,
}

impl ReportFilter {
    pub fn matches(&self, report: &Report) -> bool {
        self.risk_level.is_none_or(|level| report.risk_level == level)
            && self.status.is_none_or(|status| report.status == status)
    }
}

#[derive(Debug, Default)]
pub struct PatientStore {
    current: RwLock<Arc<Dataset>>,
    writer: Mutex<()>,
}

impl PatientStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Arc<Dataset> {
        Arc::clone(&*self.current.read())
    }

    pub fn patients(&self) -> Vec<Patient> {
        self.snapshot().patients.clone()
    }

    /// `None` means no such id in the current generation.
    pub fn patient(&self, id: &str) -> Option<Patient> {
        self.snapshot().patients.iter().find(|p| p.id == id).cloned()
    }

    pub fn reports(&self, filter: &ReportFilter) -> Vec<Report> {
        self.snapshot()
            .reports
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect()
    }

    pub fn report(&self, id: &str) -> Option<Report> {
        self.snapshot().reports.iter().find(|r| r.id == id).cloned()
    }

    pub fn status(&self) -> StoreStatus {
        self.snapshot().status()
    }

    /// Blocks until no other writer holds the store.
    pub fn lock_writer(&self) -> StoreWriter<'_> {
        StoreWriter {
            store: self,
            _guard: self.writer.lock(),
        }
    }

    /// Idempotent; returns the (empty) status afterwards.
    pub fn clear(&self) -> StoreStatus {
        self.lock_writer().clear()
    }
}

pub struct StoreWriter<'a> {
    store: &'a PatientStore,
    _guard: MutexGuard<'a, ()>,
}

impl StoreWriter<'_> {
    pub fn replace(&self, dataset: Dataset) {
        *self.store.current.write() = Arc::new(dataset);
    }

    pub fn clear(&self) -> StoreStatus {
        self.replace(Dataset::default());
        StoreStatus::default()
    }
}
