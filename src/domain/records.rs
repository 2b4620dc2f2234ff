//! Match records for the 1X2 market.
//!
//! `OddsRecord` and `StatsRecord` are produced once per cycle by the
//! two independent sources. `MatchRecord` is their join on the exact
//! (home, away) identity. All three are validated at construction and
//! immutable afterwards.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Separator between home and away names in the display key.
pub const MATCH_KEY_SEPARATOR: &str = " vs ";

/// One of the three outcomes of the 1X2 market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Home win ("1").
    Home,
    /// Draw ("X").
    Draw,
    /// Away win ("2").
    Away,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => write!(f, "home"),
            Self::Draw => write!(f, "draw"),
            Self::Away => write!(f, "away"),
        }
    }
}

/// Match identity: the exact team-name pair as produced upstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamPair {
    home: String,
    away: String,
}

impl TeamPair {
    /// Build an identity. Names are kept verbatim; blank names are rejected.
    pub fn new(home: impl Into<String>, away: impl Into<String>) -> Result<Self, DomainError> {
        let home = home.into();
        let away = away.into();
        if home.trim().is_empty() {
            return Err(DomainError::EmptyTeamName { side: "home" });
        }
        if away.trim().is_empty() {
            return Err(DomainError::EmptyTeamName { side: "away" });
        }
        Ok(Self { home, away })
    }

    pub fn home(&self) -> &str {
        &self.home
    }

    pub fn away(&self) -> &str {
        &self.away
    }

    /// Display key, e.g. `"Arsenal vs Chelsea"`. Never used for joining.
    pub fn match_key(&self) -> String {
        format!("{}{MATCH_KEY_SEPARATOR}{}", self.home, self.away)
    }
}

impl fmt::Display for TeamPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{MATCH_KEY_SEPARATOR}{}", self.home, self.away)
    }
}

/// Decimal prices for the three outcomes, each finite and >= 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomePrices {
    home: f64,
    draw: f64,
    away: f64,
}

impl OutcomePrices {
    /// Validate and build a price triple.
    ///
    /// A price below 1.0 would imply a probability above 1, so it is
    /// rejected here rather than passed on to the model.
    pub fn new(home: f64, draw: f64, away: f64) -> Result<Self, DomainError> {
        for (outcome, value) in [
            (Outcome::Home, home),
            (Outcome::Draw, draw),
            (Outcome::Away, away),
        ] {
            if !value.is_finite() || value < 1.0 {
                return Err(DomainError::InvalidPrice { outcome, value });
            }
        }
        Ok(Self { home, draw, away })
    }

    pub fn home(&self) -> f64 {
        self.home
    }

    pub fn draw(&self) -> f64 {
        self.draw
    }

    pub fn away(&self) -> f64 {
        self.away
    }

    pub fn get(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Home => self.home,
            Outcome::Draw => self.draw,
            Outcome::Away => self.away,
        }
    }

    /// Implied probability `1 / price` for one outcome.
    pub fn implied(&self, outcome: Outcome) -> f64 {
        1.0 / self.get(outcome)
    }

    /// The longest of the three prices.
    pub fn max_price(&self) -> f64 {
        self.home.max(self.draw).max(self.away)
    }

    /// Highest implied probability across the three outcomes (shortest price).
    pub fn best_implied(&self) -> f64 {
        self.implied(Outcome::Home)
            .max(self.implied(Outcome::Draw))
            .max(self.implied(Outcome::Away))
    }
}

/// Shot counts for home and away sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShotCounts {
    pub home: u32,
    pub away: u32,
}

impl ShotCounts {
    pub fn new(home: u32, away: u32) -> Self {
        Self { home, away }
    }

    /// Home shots minus away shots.
    pub fn differential(&self) -> i64 {
        i64::from(self.home) - i64::from(self.away)
    }
}

/// Odds for one match from the odds source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsRecord {
    pub teams: TeamPair,
    pub prices: OutcomePrices,
}

impl OddsRecord {
    pub fn new(teams: TeamPair, prices: OutcomePrices) -> Self {
        Self { teams, prices }
    }
}

/// In-play statistics for one match from the stats source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsRecord {
    pub teams: TeamPair,
    pub shots: ShotCounts,
}

impl StatsRecord {
    pub fn new(teams: TeamPair, shots: ShotCounts) -> Self {
        Self { teams, shots }
    }
}

/// A match present in both sources: the union of their fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub teams: TeamPair,
    pub prices: OutcomePrices,
    pub shots: ShotCounts,
}

impl MatchRecord {
    pub fn new(teams: TeamPair, prices: OutcomePrices, shots: ShotCounts) -> Self {
        Self {
            teams,
            prices,
            shots,
        }
    }

    pub fn match_key(&self) -> String {
        self.teams.match_key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_key_format() {
        let teams = TeamPair::new("A", "B").unwrap();
        assert_eq!(teams.match_key(), "A vs B");
        assert_eq!(teams.to_string(), "A vs B");
    }

    #[test]
    fn test_blank_team_name_rejected() {
        assert_eq!(
            TeamPair::new("  ", "B"),
            Err(DomainError::EmptyTeamName { side: "home" })
        );
        assert_eq!(
            TeamPair::new("A", ""),
            Err(DomainError::EmptyTeamName { side: "away" })
        );
    }

    #[test]
    fn test_team_names_kept_verbatim() {
        let teams = TeamPair::new(" Real Madrid", "Atlético").unwrap();
        assert_eq!(teams.home(), " Real Madrid");
        assert_ne!(teams, TeamPair::new("Real Madrid", "Atlético").unwrap());
    }

    #[test]
    fn test_prices_below_one_rejected() {
        assert!(matches!(
            OutcomePrices::new(0.0, 3.0, 4.0),
            Err(DomainError::InvalidPrice { outcome: Outcome::Home, .. })
        ));
        assert!(matches!(
            OutcomePrices::new(2.0, -3.0, 4.0),
            Err(DomainError::InvalidPrice { outcome: Outcome::Draw, .. })
        ));
        assert!(matches!(
            OutcomePrices::new(2.0, 3.0, 0.95),
            Err(DomainError::InvalidPrice { outcome: Outcome::Away, .. })
        ));
        assert!(OutcomePrices::new(f64::NAN, 3.0, 4.0).is_err());
        assert!(OutcomePrices::new(f64::INFINITY, 3.0, 4.0).is_err());
    }

    #[test]
    fn test_price_of_exactly_one_accepted() {
        let prices = OutcomePrices::new(1.0, 3.0, 4.0).unwrap();
        assert!((prices.implied(Outcome::Home) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_best_implied_and_max_price() {
        let prices = OutcomePrices::new(1.8, 3.5, 4.2).unwrap();
        assert!((prices.best_implied() - 1.0 / 1.8).abs() < 1e-12);
        assert!((prices.max_price() - 4.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shot_differential_signed() {
        assert_eq!(ShotCounts::new(10, 3).differential(), 7);
        assert_eq!(ShotCounts::new(2, 9).differential(), -7);
        assert_eq!(ShotCounts::new(0, 0).differential(), 0);
    }
}
