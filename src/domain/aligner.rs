//! Record aligner: inner join of the odds and stats batches.
//!
//! Joins on the (home, away) identity. Matches present in only one
//! source are dropped silently. Output follows the order of the odds
//! batch, so it is deterministic for a given input.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::records::{MatchRecord, OddsRecord, StatsRecord, TeamPair};

/// How team names are compared across sources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamMatching {
    /// Exact, case-sensitive equality of both names.
    #[default]
    Exact,
    /// Case-folded, whitespace-collapsed equality of both names.
    Normalized,
}

impl TeamMatching {
    fn key(self, teams: &TeamPair) -> (String, String) {
        match self {
            Self::Exact => (teams.home().to_owned(), teams.away().to_owned()),
            Self::Normalized => (normalize_name(teams.home()), normalize_name(teams.away())),
        }
    }
}

/// Lowercase and collapse internal whitespace.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Result of one alignment pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Alignment {
    /// Joined records, in odds-batch order.
    pub records: Vec<MatchRecord>,
    /// Odds records ignored because their identity appeared earlier in the batch.
    pub duplicate_odds: usize,
    /// Stats records ignored because their identity appeared earlier in the batch.
    pub duplicate_stats: usize,
    /// Odds records with no stats counterpart.
    pub unmatched_odds: usize,
}

/// Joins odds and stats on team identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordAligner {
    matching: TeamMatching,
}

impl RecordAligner {
    pub fn new(matching: TeamMatching) -> Self {
        Self { matching }
    }

    pub fn matching(&self) -> TeamMatching {
        self.matching
    }

    /// Inner join of `odds` and `stats`.
    ///
    /// Each input is expected to hold at most one record per identity;
    /// if not, the first occurrence wins and the rest are counted as
    /// duplicates. Either side empty yields an empty alignment.
    pub fn align(&self, odds: &[OddsRecord], stats: &[StatsRecord]) -> Alignment {
        let mut alignment = Alignment::default();
        if odds.is_empty() || stats.is_empty() {
            alignment.unmatched_odds = odds.len();
            return alignment;
        }

        let mut stats_by_key: HashMap<(String, String), &StatsRecord> =
            HashMap::with_capacity(stats.len());
        for record in stats {
            let key = self.matching.key(&record.teams);
            if stats_by_key.contains_key(&key) {
                alignment.duplicate_stats += 1;
            } else {
                stats_by_key.insert(key, record);
            }
        }

        let mut seen = HashSet::with_capacity(odds.len());
        for record in odds {
            let key = self.matching.key(&record.teams);
            if !seen.insert(key.clone()) {
                alignment.duplicate_odds += 1;
                continue;
            }
            match stats_by_key.get(&key) {
                Some(stats) => alignment.records.push(MatchRecord::new(
                    record.teams.clone(),
                    record.prices,
                    stats.shots,
                )),
                None => alignment.unmatched_odds += 1,
            }
        }

        alignment
    }
}
