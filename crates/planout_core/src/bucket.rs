use std::collections::BTreeMap;

use chrono::{Duration, Months, NaiveDate};
use serde::Serialize;

use crate::agenda::{build_agenda, AgendaEntry};
use crate::model::Plan;

/// Length of each granularity regime, measured from the horizon start.
const DAY_SLOTS: i64 = 7;
const WEEK_REGIME_DAYS: i64 = 30;
const MONTH_REGIME_MONTHS: u32 = 6;
const YEAR_REGIME_MONTHS: u32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    Day,
    Week,
    Month,
    Year,
}

/// A closed date range `[start, end]` of the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub kind: SlotKind,
}

impl Slot {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn label(&self) -> String {
        match self.kind {
            SlotKind::Day => self.start.format("%a %b %-d").to_string(),
            SlotKind::Week => format!(
                "{} - {}",
                self.start.format("%b %-d"),
                self.end.format("%b %-d")
            ),
            SlotKind::Month => self.start.format("%B %Y").to_string(),
            SlotKind::Year => format!(
                "{} - {}",
                self.start.format("%b %Y"),
                self.end.format("%b %Y")
            ),
        }
    }
}

/// Contiguous slots from `start`: seven days, then weeks for the rest of the
/// first month, months out to half a year, and years out to two years.
///
/// Every slot ends the day before the next one starts.
pub fn build_slots(start: NaiveDate) -> Vec<Slot> {
    let week_limit = start + Duration::days(WEEK_REGIME_DAYS);
    let (Some(month_limit), Some(year_limit)) = (
        start.checked_add_months(Months::new(MONTH_REGIME_MONTHS)),
        start.checked_add_months(Months::new(YEAR_REGIME_MONTHS)),
    ) else {
        return Vec::new();
    };

    let mut starts: Vec<(NaiveDate, SlotKind)> = Vec::new();
    let mut ptr = start;
    for _ in 0..DAY_SLOTS {
        starts.push((ptr, SlotKind::Day));
        ptr += Duration::days(1);
    }
    while ptr < week_limit {
        starts.push((ptr, SlotKind::Week));
        ptr += Duration::weeks(1);
    }
    while ptr < month_limit {
        starts.push((ptr, SlotKind::Month));
        let Some(next) = ptr.checked_add_months(Months::new(1)) else {
            break;
        };
        ptr = next;
    }
    while ptr < year_limit {
        starts.push((ptr, SlotKind::Year));
        let Some(next) = ptr.checked_add_months(Months::new(12)) else {
            break;
        };
        ptr = next;
    }

    // `ptr` is now the first day past the horizon
    let mut slots = Vec::with_capacity(starts.len());
    for (index, (slot_start, kind)) in starts.iter().enumerate() {
        let next_start = starts.get(index + 1).map_or(ptr, |(next, _)| *next);
        let Some(end) = next_start.pred_opt() else {
            break;
        };
        slots.push(Slot {
            start: *slot_start,
            end,
            kind: *kind,
        });
    }
    slots
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub slot: Slot,
    pub entries: Vec<AgendaEntry>,
}

impl Bucket {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries per plan id, for the aggregated month and year rows.
    pub fn plan_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.plan_id.as_str()).or_insert(0) += 1;
        }
        counts
    }
}

/// Assigns each entry to the slot containing its date. Entries before the
/// first slot or after the last one are dropped.
pub fn bucket(entries: Vec<AgendaEntry>, horizon_start: NaiveDate) -> Vec<Bucket> {
    let mut buckets: Vec<Bucket> = build_slots(horizon_start)
        .into_iter()
        .map(|slot| Bucket {
            slot,
            entries: Vec::new(),
        })
        .collect();

    for entry in entries {
        let date = entry.date();
        let index = buckets.partition_point(|bucket| bucket.slot.end < date);
        match buckets.get_mut(index) {
            Some(bucket) if bucket.slot.contains(date) => bucket.entries.push(entry),
            _ => {}
        }
    }
    buckets
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Timeline {
    pub buckets: Vec<Bucket>,
    pub truncated: bool,
}

/// Projects every plan from `today` to the end of the horizon and buckets
/// the result.
pub fn project_timeline(plans: &[Plan], today: NaiveDate, cap: u32) -> Timeline {
    let horizon_end = build_slots(today)
        .last()
        .map_or(today, |slot| slot.end);
    let agenda = build_agenda(plans, today, horizon_end, cap);
    Timeline {
        buckets: bucket(agenda.entries, today),
        truncated: agenda.truncated,
    }
}
