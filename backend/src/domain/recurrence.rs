//! Recurrence expansion for repeating tasks.
//!
//! A recurring task is stored once (the master). Its occurrences on other
//! dates are derived on demand as virtual instances that are never
//! persisted. Everything here is pure and total: malformed rules simply do
//! not recur.
//!
//! Month and year rules match the original day of month exactly. A task
//! first scheduled on the 31st therefore skips shorter months, and a
//! Feb 29 yearly task only occurs in leap years.

use chrono::{Datelike, Duration, Months, NaiveDate};

use crate::domain::models::task::{Recurrence, RecurrenceKind, Task};

/// How far past the start date [`upcoming_dates`] is willing to look.
const UPCOMING_HORIZON_MONTHS: u32 = 12;

/// The rule and original date that expansion starts from. Virtual
/// instances and tasks without both have none.
fn expansion_anchor(task: &Task) -> Option<(Recurrence, NaiveDate)> {
    if task.is_repeated_instance {
        return None;
    }
    Some((task.recurrence?, task.scheduled_date?))
}

/// Whether an occurrence of `task` falls on `target`.
pub fn should_appear_on_date(task: &Task, target: NaiveDate) -> bool {
    let Some((rule, original)) = expansion_anchor(task) else {
        return false;
    };

    if target < original {
        return false;
    }
    if target == original {
        return true;
    }
    if rule.end_date.is_some_and(|end| target > end) {
        return false;
    }

    matches_rule(&rule, original, target)
}

/// Whether `target` is an occurrence of `task` other than the original
/// date, i.e. one that is shown as a virtual instance.
pub fn is_virtual_occurrence(task: &Task, target: NaiveDate) -> bool {
    task.scheduled_date != Some(target) && should_appear_on_date(task, target)
}

fn matches_rule(rule: &Recurrence, original: NaiveDate, target: NaiveDate) -> bool {
    let interval = i64::from(rule.interval());
    let days_between = (target - original).num_days();

    match rule.kind {
        RecurrenceKind::Daily => days_between % interval == 0,
        RecurrenceKind::Weekly => days_between % (interval * 7) == 0,
        RecurrenceKind::Monthly => {
            let months_between = month_index(target) - month_index(original);
            target.day() == original.day() && months_between % interval == 0
        }
        RecurrenceKind::Yearly => {
            let years_between = i64::from(target.year() - original.year());
            target.month() == original.month()
                && target.day() == original.day()
                && years_between % interval == 0
        }
    }
}

fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

/// Build the read-only occurrence of `task` on `date`.
///
/// The id is derived from the master id and the date, so expanding the same
/// day twice yields the same instance.
pub fn materialize_instance(task: &Task, date: NaiveDate) -> Task {
    Task {
        id: Task::instance_id(&task.id, date),
        scheduled_date: Some(date),
        is_repeated_instance: true,
        original_task_id: Some(task.id.clone()),
        completed: false,
        completed_at: None,
        ..task.clone()
    }
}

/// Everything scheduled on `date`, in input order.
///
/// One-off tasks are included when their scheduled date matches. Recurring
/// tasks contribute the master itself on their original date and a virtual
/// instance on every later matching date. Inputs that are already virtual
/// instances are ignored.
pub fn tasks_for_date(tasks: &[Task], date: NaiveDate) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| !task.is_repeated_instance)
        .filter_map(|task| {
            if task.is_recurring() {
                if !should_appear_on_date(task, date) {
                    return None;
                }
                if task.scheduled_date == Some(date) {
                    Some(task.clone())
                } else {
                    Some(materialize_instance(task, date))
                }
            } else if task.scheduled_date == Some(date) {
                Some(task.clone())
            } else {
                None
            }
        })
        .collect()
}

/// Lazily list the dates on or after `from` on which `task` occurs.
///
/// Steps are anchored on the task's original date, so every yielded date
/// also satisfies [`should_appear_on_date`]. The sequence ends after
/// `limit` dates, at the rule's end date, or one year past `from`,
/// whichever comes first.
pub fn upcoming_dates(task: &Task, from: NaiveDate, limit: usize) -> UpcomingDates {
    let anchor = expansion_anchor(task);
    let horizon = from
        .checked_add_months(Months::new(UPCOMING_HORIZON_MONTHS))
        .unwrap_or(NaiveDate::MAX);
    let step = anchor.map_or(0, |(rule, original)| first_step(&rule, original, from));

    UpcomingDates {
        anchor,
        from,
        horizon,
        step,
        remaining: limit,
    }
}

/// Index of the first step that could land on or after `from`.
fn first_step(rule: &Recurrence, original: NaiveDate, from: NaiveDate) -> u64 {
    if from <= original {
        return 0;
    }
    let interval = u64::from(rule.interval());
    match rule.kind {
        RecurrenceKind::Daily | RecurrenceKind::Weekly => {
            let span = if rule.kind == RecurrenceKind::Weekly {
                interval * 7
            } else {
                interval
            };
            let days = (from - original).num_days().unsigned_abs();
            days.div_ceil(span)
        }
        RecurrenceKind::Monthly => {
            let months = (month_index(from) - month_index(original)).unsigned_abs();
            months / interval
        }
        RecurrenceKind::Yearly => {
            let years = u64::from((from.year() - original.year()).unsigned_abs());
            years / interval
        }
    }
}

/// Iterator returned by [`upcoming_dates`].
#[derive(Debug, Clone)]
pub struct UpcomingDates {
    anchor: Option<(Recurrence, NaiveDate)>,
    from: NaiveDate,
    horizon: NaiveDate,
    step: u64,
    remaining: usize,
}

impl UpcomingDates {
    /// Candidate date at step `step`, or `None` past the calendar's range.
    fn candidate(rule: &Recurrence, original: NaiveDate, step: u64) -> Option<NaiveDate> {
        let interval = u64::from(rule.interval());
        match rule.kind {
            RecurrenceKind::Daily => {
                let days = i64::try_from(step * interval).ok()?;
                original.checked_add_signed(Duration::days(days))
            }
            RecurrenceKind::Weekly => {
                let days = i64::try_from(step * interval * 7).ok()?;
                original.checked_add_signed(Duration::days(days))
            }
            RecurrenceKind::Monthly => {
                let months = u32::try_from(step * interval).ok()?;
                original.checked_add_months(Months::new(months))
            }
            RecurrenceKind::Yearly => {
                let months = u32::try_from(step * interval * 12).ok()?;
                original.checked_add_months(Months::new(months))
            }
        }
    }
}

impl Iterator for UpcomingDates {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let (rule, original) = self.anchor?;

        while self.remaining > 0 {
            let Some(candidate) = Self::candidate(&rule, original, self.step) else {
                self.anchor = None;
                return None;
            };
            let is_original = self.step == 0;
            self.step += 1;

            let past_end = !is_original && rule.end_date.is_some_and(|end| candidate > end);
            if candidate > self.horizon || past_end {
                self.anchor = None;
                return None;
            }
            if candidate < self.from {
                continue;
            }
            // month arithmetic clamps to the last day of short months
            if candidate.day() != original.day() {
                continue;
            }

            self.remaining -= 1;
            return Some(candidate);
        }

        self.anchor = None;
        None
    }
}
