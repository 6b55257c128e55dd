//! Population-wide summary and performer ranking.
//!
//! Low emissions are the desired outcome, so the "top" performers are the
//! users with the lowest totals (listed ascending) and the "bottom" performers
//! are those with the highest (listed descending). Equal totals are ordered by
//! user id, ascending, in both lists.
//!
//! The population is folded as a stream: only the running sum and count plus
//! two heaps of at most `limit` entries are kept in memory.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, HashMap};

use tracing::warn;

use crate::breakdown::compensated_add;
use crate::model::{AdminSummary, FootprintRecord, LatestFootprint, Performer, UserInfo};

/// Default length of each performer list.
pub const DEFAULT_RANKING_SIZE: usize = 5;

/// Heap entry ranked for the top list. Smaller = better rank.
struct Lowest(Performer);

/// Heap entry ranked for the bottom list. Smaller = better rank.
struct Highest(Performer);

impl Ord for Lowest {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .co2e
            .total_cmp(&other.0.co2e)
            .then_with(|| self.0.user_id.cmp(&other.0.user_id))
    }
}

impl Ord for Highest {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .0
            .co2e
            .total_cmp(&self.0.co2e)
            .then_with(|| self.0.user_id.cmp(&other.0.user_id))
    }
}

macro_rules! ord_boilerplate {
    ($ty:ident) => {
        impl PartialOrd for $ty {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                self.cmp(other) == Ordering::Equal
            }
        }

        impl Eq for $ty {}
    };
}

ord_boilerplate!(Lowest);
ord_boilerplate!(Highest);

/// Streaming fold over one latest footprint per user.
pub struct PopulationAccumulator {
    limit: usize,
    sum: f64,
    compensation: f64,
    users: usize,
    skipped: usize,
    lowest: BinaryHeap<Lowest>,
    highest: BinaryHeap<Highest>,
}

impl PopulationAccumulator {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            sum: 0.0,
            compensation: 0.0,
            users: 0,
            skipped: 0,
            lowest: BinaryHeap::new(),
            highest: BinaryHeap::new(),
        }
    }

    pub fn push(&mut self, latest: LatestFootprint) {
        if !latest.co2e.is_finite() {
            warn!(
                user_id = %latest.user_id,
                co2e = latest.co2e,
                "Ignoring user with non-finite footprint total"
            );
            self.skipped += 1;
            return;
        }

        compensated_add(&mut self.sum, &mut self.compensation, latest.co2e);
        self.users += 1;

        if self.limit == 0 {
            return;
        }

        let performer = Performer::from(latest);
        self.lowest.push(Lowest(performer.clone()));
        if self.lowest.len() > self.limit {
            self.lowest.pop();
        }
        self.highest.push(Highest(performer));
        if self.highest.len() > self.limit {
            self.highest.pop();
        }
    }

    /// Users left out because their total was not a finite number.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn finish(self) -> AdminSummary {
        let global_average = if self.users == 0 {
            0.0
        } else {
            (self.sum + self.compensation) / self.users as f64
        };

        AdminSummary {
            global_average,
            total_users: self.users,
            top_performers: self
                .lowest
                .into_sorted_vec()
                .into_iter()
                .map(|entry| entry.0)
                .collect(),
            bottom_performers: self
                .highest
                .into_sorted_vec()
                .into_iter()
                .map(|entry| entry.0)
                .collect(),
        }
    }
}

impl Default for PopulationAccumulator {
    fn default() -> Self {
        Self::new(DEFAULT_RANKING_SIZE)
    }
}

/// Summarize one latest footprint per user.
///
/// An empty population is a valid state: average 0, no users, empty lists.
pub fn summarize_population(
    latest_per_user: impl IntoIterator<Item = LatestFootprint>,
    limit: usize,
) -> AdminSummary {
    let mut accumulator = PopulationAccumulator::new(limit);
    for latest in latest_per_user {
        accumulator.push(latest);
    }
    accumulator.finish()
}

/// Pick each user's most recent record.
///
/// The latest `date_calculated` wins; records calculated at the same instant
/// are decided by the lexicographically greatest record id. Output is ordered
/// by user id. Users missing from `users` get empty [`UserInfo`].
pub fn select_latest_per_user(
    records: &[FootprintRecord],
    users: &HashMap<String, UserInfo>,
) -> Vec<LatestFootprint> {
    let mut latest: BTreeMap<&str, &FootprintRecord> = BTreeMap::new();
    for record in records {
        latest
            .entry(record.user_id.as_str())
            .and_modify(|current| {
                if (record.date_calculated, &record.id) > (current.date_calculated, &current.id) {
                    *current = record;
                }
            })
            .or_insert(record);
    }

    latest
        .into_iter()
        .map(|(user_id, record)| LatestFootprint {
            user_id: user_id.to_string(),
            co2e: record.results.total_co2e(),
            user_info: users.get(user_id).cloned().unwrap_or_default(),
        })
        .collect()
}
