// ABOUTME: Synthetic hospital snapshot generator that feeds the store on a fixed interval.
// ABOUTME: Each snapshot drifts from the previous one: occupancy random-walks, stocks decay and refill.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use surge_core::HospitalSnapshot;

use crate::store::{SnapshotStore, StoreError};

/// Rough share of total OPD traffic per department, used to seed the first
/// snapshot of a run.
const DEPARTMENT_RATIOS: &[(&str, f64)] = &[
    ("emergency", 0.20),
    ("general_medicine", 0.30),
    ("pediatrics", 0.10),
    ("orthopedics", 0.08),
    ("respiratory", 0.12),
    ("cardiology", 0.08),
    ("dermatology", 0.05),
    ("others", 0.07),
];

/// Generates synthetic hospital snapshots and appends them to a store.
/// Runs outside the request path, on its own timer, so readers must only
/// tolerate the store's own consistency policy.
pub struct SnapshotGenerator {
    store: SnapshotStore,
}

impl SnapshotGenerator {
    pub fn new(store: SnapshotStore) -> Self {
        Self { store }
    }

    /// Produce the next snapshot. With a previous snapshot, metrics
    /// random-walk from it within clamped bands; without one, a fresh
    /// baseline is drawn.
    pub fn next_snapshot(&self, last: Option<&HospitalSnapshot>) -> HospitalSnapshot {
        let mut rng = rand::thread_rng();

        let (bed_occupancy_pct, icu_occupancy_pct) = match last {
            Some(prev) => (
                (prev.bed_occupancy_pct + rng.gen_range(-2.0..=2.0)).clamp(50.0, 100.0),
                (prev.icu_occupancy_pct + rng.gen_range(-2.0..=2.0)).clamp(60.0, 100.0),
            ),
            None => (
                rng.gen_range(60.0..=90.0_f64).round(),
                rng.gen_range(70.0..=95.0_f64).round(),
            ),
        };

        let opd_visits_by_department = match last {
            Some(prev) => prev
                .opd_visits_by_department
                .iter()
                .map(|(dept, count)| {
                    let delta = rng.gen_range(-3i64..=5);
                    (dept.clone(), (*count as i64 + delta).max(0) as u32)
                })
                .collect(),
            None => {
                let total = rng.gen_range(80..=240) as f64;
                DEPARTMENT_RATIOS
                    .iter()
                    .map(|(dept, ratio)| (dept.to_string(), (total * ratio).round() as u32))
                    .collect::<BTreeMap<String, u32>>()
            }
        };

        // Consumables drain steadily and refill once they fall below a floor.
        let ppe_stock_pct = drain_and_refill(
            last.map(|p| p.ppe_stock_pct).unwrap_or(85.0),
            rng.gen_range(0.5..=3.0),
            20.0,
            60.0,
        );
        let vaccine_stock_pct = drain_and_refill(
            last.map(|p| p.vaccine_stock_pct).unwrap_or(70.0),
            rng.gen_range(0.2..=2.0),
            15.0,
            50.0,
        );

        let blood_bank_units = match last {
            Some(prev) => {
                let drained = prev.blood_bank_units.saturating_sub(rng.gen_range(0..=2));
                if drained < 30 { drained + 60 } else { drained }
            }
            None => rng.gen_range(80..=140),
        };

        HospitalSnapshot {
            timestamp: Utc::now(),
            bed_occupancy_pct,
            opd_visits_by_department,
            icu_occupancy_pct,
            ppe_stock_pct,
            blood_bank_units,
            vaccine_stock_pct,
        }
    }

    /// Generate one snapshot from the current store tail and append it.
    pub fn tick(&self) -> Result<HospitalSnapshot, StoreError> {
        let last = match self.store.read_latest() {
            Ok(snapshot) => Some(snapshot),
            Err(StoreError::NotFound) => None,
            Err(e) => return Err(e),
        };

        let snapshot = self.next_snapshot(last.as_ref());
        self.store.append(&snapshot)?;
        Ok(snapshot)
    }

    /// Append snapshots forever on a fixed cadence. A failed tick is logged
    /// and skipped; the generator never aborts.
    pub async fn run(self, interval: Duration) {
        tracing::info!(path = %self.store.path().display(), interval_secs = interval.as_secs(), "synthetic generator running");
        let mut ticker = tokio::time::interval(interval);

        loop {
            ticker.tick().await;
            match self.tick() {
                Ok(snapshot) => tracing::debug!(
                    bed_occupancy_pct = snapshot.bed_occupancy_pct,
                    icu_occupancy_pct = snapshot.icu_occupancy_pct,
                    opd_total = snapshot.opd_visits_total(),
                    "appended snapshot"
                ),
                Err(e) => tracing::warn!(error = %e, "generator tick failed"),
            }
        }
    }
}

fn drain_and_refill(current: f64, usage: f64, floor: f64, refill: f64) -> f64 {
    let drained = current - usage;
    if drained < floor {
        (drained + refill).min(100.0)
    } else {
        drained
    }
}
