//! Weighted session allocation.
//!
//! Every subject gets a whole-plan session quota (its target) proportional to
//! its weight, where weak subjects weigh twice as much. Targets are rounded
//! independently, corrected so they add up to the plan's capacity, and then
//! placed greedily day by day, weak subjects first.

use std::collections::HashSet;

use chrono::NaiveDate;

use super::dates::day_range;
use super::{PlanDay, Task};

const NORMAL_WEIGHT: f64 = 1.0;
const WEAK_WEIGHT: f64 = 2.0;
/// Shortest session a plan may contain, in hours.
const MIN_SESSION_HOURS: f64 = 0.01;

/// Intermediate result of an allocation: everything computed before sessions
/// are placed onto days.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    /// Trimmed, non-empty, de-duplicated subjects in input order.
    pub subjects: Vec<String>,
    /// Weight per subject, parallel to `subjects`.
    pub weights: Vec<f64>,
    /// Indices into `subjects`, heaviest first. Ties keep input order.
    pub order: Vec<usize>,
    /// Session quota per subject, parallel to `subjects`.
    pub targets: Vec<usize>,
    pub days: Vec<NaiveDate>,
    pub sessions_per_day: usize,
    pub session_hours: f64,
    pub total_sessions: usize,
    /// `total_sessions - sum(targets)` after correction. Non-zero only when
    /// every target sits at its floor of 1 and there are still too many.
    pub residual: i64,
}

impl Allocation {
    pub fn compute(
        subjects: &[String],
        exam_date: NaiveDate,
        hours_per_day: f64,
        weaknesses: &[String],
        today: NaiveDate,
    ) -> Self {
        let subjects = normalize_subjects(subjects);
        let weak: HashSet<String> = weaknesses
            .iter()
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();

        let weights: Vec<f64> = subjects
            .iter()
            .map(|s| {
                if weak.contains(&s.to_lowercase()) {
                    WEAK_WEIGHT
                } else {
                    NORMAL_WEIGHT
                }
            })
            .collect();
        let total_weight = weights.iter().sum::<f64>().max(1.0);

        let sessions_per_day = sessions_per_day(hours_per_day);
        let session_hours =
            round_cents(hours_per_day / sessions_per_day as f64).max(MIN_SESSION_HOURS);

        let exam_date = exam_date.max(today);
        let days: Vec<NaiveDate> = day_range(today, exam_date).collect();
        let total_sessions = days.len() * sessions_per_day;

        let mut targets: Vec<usize> = weights
            .iter()
            .map(|w| {
                let share = (total_sessions as f64 * w / total_weight).round_ties_even();
                (share as usize).max(1)
            })
            .collect();

        // Stable sort, so equal weights stay in input order.
        let mut order: Vec<usize> = (0..subjects.len()).collect();
        order.sort_by(|&a, &b| weights[b].total_cmp(&weights[a]));

        let residual = correct_targets(&mut targets, &order, total_sessions);
        if residual != 0 {
            tracing::debug!(
                residual = residual,
                subjects = subjects.len(),
                total_sessions = total_sessions,
                "Session targets could not absorb rounding difference"
            );
        }

        Allocation {
            subjects,
            weights,
            order,
            targets,
            days,
            sessions_per_day,
            session_hours,
            total_sessions,
            residual,
        }
    }

    pub fn target_for(&self, subject: &str) -> Option<usize> {
        self.subjects
            .iter()
            .position(|s| s == subject)
            .map(|i| self.targets[i])
    }

    pub fn is_weak(&self, subject: &str) -> bool {
        self.subjects
            .iter()
            .position(|s| s == subject)
            .is_some_and(|i| self.weights[i] > NORMAL_WEIGHT)
    }

    /// Lay the targets out over the day range.
    pub fn place(&self) -> Vec<PlanDay> {
        let n = self.subjects.len();
        let mut remaining = self.targets.clone();
        let mut plan = Vec::with_capacity(self.days.len());

        for (day_index, date) in self.days.iter().enumerate() {
            let mut day = PlanDay::new(*date);
            if n == 0 {
                plan.push(day);
                continue;
            }

            for _ in 0..self.sessions_per_day {
                let picked = self
                    .order
                    .iter()
                    .copied()
                    .find(|&s| remaining[s] > 0)
                    .or_else(|| (0..n).find(|&s| remaining[s] > 0))
                    // Quotas exhausted: rotate by day so the slot is still
                    // filled. Only reachable when targets fell short of capacity.
                    .unwrap_or(day_index % n);

                remaining[picked] = remaining[picked].saturating_sub(1);
                day.tasks
                    .push(Task::pending(self.subjects[picked].clone(), self.session_hours));
            }
            plan.push(day);
        }

        plan
    }
}

/// Build a day-by-day study plan from `today` through `exam_date`.
///
/// Never fails: past exam dates collapse to a single day, fractional hour
/// budgets round to at least one session, and blank or repeated subjects are
/// skipped. With no subjects at all, the days are returned empty.
pub fn allocate(
    subjects: &[String],
    exam_date: NaiveDate,
    hours_per_day: f64,
    weaknesses: &[String],
    today: NaiveDate,
) -> Vec<PlanDay> {
    let allocation = Allocation::compute(subjects, exam_date, hours_per_day, weaknesses, today);
    tracing::debug!(
        days = allocation.days.len(),
        sessions_per_day = allocation.sessions_per_day,
        session_hours = allocation.session_hours,
        subjects = allocation.subjects.len(),
        "Allocating study sessions"
    );
    allocation.place()
}

/// Sessions per day: the hour budget rounded half-to-even, at least one.
pub fn sessions_per_day(hours_per_day: f64) -> usize {
    let rounded = hours_per_day.round_ties_even();
    if rounded.is_finite() && rounded >= 1.0 {
        rounded as usize
    } else {
        1
    }
}

/// Round to two decimals, ties to even. Scales by 100 first, so it can differ
/// from a correctly rounded decimal result for values whose binary form sits
/// right next to a tie.
fn round_cents(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

fn normalize_subjects(subjects: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    subjects
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty() && seen.insert(*s))
        .map(str::to_string)
        .collect()
}

/// Walk subjects in `order`, cycling, nudging targets by one until they sum to
/// `total`. Targets never drop below 1, so when they are all at 1 and still
/// too many, one full idle cycle ends the loop. Returns what is left over.
fn correct_targets(targets: &mut [usize], order: &[usize], total: usize) -> i64 {
    let mut diff = total as i64 - targets.iter().sum::<usize>() as i64;
    if order.is_empty() {
        return diff;
    }

    let mut visit = 0usize;
    let mut idle = 0usize;
    while diff != 0 {
        let s = order[visit % order.len()];
        if diff > 0 {
            targets[s] += 1;
            diff -= 1;
            idle = 0;
        } else if targets[s] > 1 {
            targets[s] -= 1;
            diff += 1;
            idle = 0;
        } else {
            idle += 1;
            if idle >= order.len() {
                break;
            }
        }
        visit += 1;
    }

    diff
}
