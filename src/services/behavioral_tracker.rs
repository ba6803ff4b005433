use std::f64::consts::PI;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::models::behavior::{BehaviorSnapshot, BehavioralData, ProductivityData};

// Profile of a slightly overworked employee.
const WORK_HOURS_MEAN: f64 = 9.5;
const WORK_HOURS_STD_DEV: f64 = 1.5;
const BREAK_MINUTES_MEAN: f64 = 30.0;
const BREAK_MINUTES_STD_DEV: f64 = 10.0;
const MEETING_HOURS_MEAN: f64 = 12.0;
const MEETING_HOURS_STD_DEV: f64 = 4.0;
const COMPLETION_RATE_MEAN: f64 = 0.75;
const COMPLETION_RATE_STD_DEV: f64 = 0.1;

const HOURS_PER_DAY: f64 = 24.0;
const HOURS_PER_WEEK: f64 = 168.0;

/// Simulated source of behavioral data.
///
/// Stands in for calendar, chat and issue-tracker integrations; draws come
/// from fixed normal distributions and are clamped to valid ranges.
pub struct BehavioralTracker {
    rng: Mutex<StdRng>,
}

impl Default for BehavioralTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl BehavioralTracker {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn get_work_patterns(&self, employee_id: &str) -> BehavioralData {
        info!(target: "app::behavior", %employee_id, "tracking work patterns");
        self.with_rng(|rng| BehavioralData {
            avg_work_hours_per_day: sample_normal(rng, WORK_HOURS_MEAN, WORK_HOURS_STD_DEV)
                .clamp(0.0, HOURS_PER_DAY),
            avg_break_time_minutes: sample_normal(rng, BREAK_MINUTES_MEAN, BREAK_MINUTES_STD_DEV)
                .max(0.0),
            meeting_hours_per_week: sample_normal(rng, MEETING_HOURS_MEAN, MEETING_HOURS_STD_DEV)
                .clamp(0.0, HOURS_PER_WEEK),
        })
    }

    pub fn get_productivity_metrics(&self, employee_id: &str) -> ProductivityData {
        info!(target: "app::behavior", %employee_id, "tracking productivity");
        self.with_rng(|rng| ProductivityData {
            task_completion_rate: sample_normal(rng, COMPLETION_RATE_MEAN, COMPLETION_RATE_STD_DEV)
                .clamp(0.0, 1.0),
        })
    }

    pub fn snapshot(&self, employee_id: &str) -> BehaviorSnapshot {
        BehaviorSnapshot {
            employee_id: employee_id.to_string(),
            behavioral: self.get_work_patterns(employee_id),
            productivity: self.get_productivity_metrics(employee_id),
        }
    }

    fn with_rng<T>(&self, draw: impl FnOnce(&mut StdRng) -> T) -> T {
        match self.rng.lock() {
            Ok(mut rng) => draw(&mut rng),
            // A panic mid-draw leaves the generator usable.
            Err(poisoned) => draw(&mut poisoned.into_inner()),
        }
    }
}

/// Box-Muller transform.
fn sample_normal<R: Rng>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
    mean + std_dev * z
}
