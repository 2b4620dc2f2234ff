//! Ingest - Raw Source Records to Validated Domain Records
//!
//! Converts the loosely-typed batches from the source ports into
//! `OddsRecord` / `StatsRecord`. A record missing a field, carrying a
//! non-numeric value, or holding a price below 1.0 is dropped and
//! logged; it never aborts the batch.

use serde_json::Value;
use tracing::warn;

use crate::domain::error::DomainError;
use crate::domain::records::{OddsRecord, OutcomePrices, ShotCounts, StatsRecord, TeamPair};
use crate::ports::match_source::{RawOddsRecord, RawStatsRecord};

/// Valid records of one batch plus the number dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Ingested<T> {
  pub records: Vec<T>,
  pub dropped: usize,
}

impl<T> Default for Ingested<T> {
  fn default() -> Self {
    Self {
      records: Vec::new(),
      dropped: 0,
    }
  }
}

/// Validate an odds batch, dropping malformed records.
pub fn ingest_odds(source: &str, batch: &[RawOddsRecord]) -> Ingested<OddsRecord> {
  ingest(source, "odds", batch, parse_odds)
}

/// Validate a stats batch, dropping malformed records.
pub fn ingest_stats(source: &str, batch: &[RawStatsRecord]) -> Ingested<StatsRecord> {
  ingest(source, "stats", batch, parse_stats)
}

fn ingest<R, T>(
  source: &str,
  kind: &'static str,
  batch: &[R],
  parse: fn(&R) -> Result<T, DomainError>,
) -> Ingested<T> {
  let mut out = Ingested {
    records: Vec::with_capacity(batch.len()),
    dropped: 0,
  };
  for (index, raw) in batch.iter().enumerate() {
    match parse(raw) {
      Ok(record) => out.records.push(record),
      Err(e) => {
        out.dropped += 1;
        warn!(source, kind, index, error = %e, "Dropping malformed record");
      }
    }
  }
  out
}

/// Parse one raw odds record.
pub fn parse_odds(raw: &RawOddsRecord) -> Result<OddsRecord, DomainError> {
  let teams = parse_teams(raw.home.as_deref(), raw.away.as_deref())?;
  let prices = OutcomePrices::new(
    parse_number("home_odds", raw.home_odds.as_ref())?,
    parse_number("draw_odds", raw.draw_odds.as_ref())?,
    parse_number("away_odds", raw.away_odds.as_ref())?,
  )?;
  Ok(OddsRecord::new(teams, prices))
}

/// Parse one raw stats record.
pub fn parse_stats(raw: &RawStatsRecord) -> Result<StatsRecord, DomainError> {
  let teams = parse_teams(raw.home.as_deref(), raw.away.as_deref())?;
  let shots = ShotCounts::new(
    parse_count("home_shots", raw.home_shots.as_ref())?,
    parse_count("away_shots", raw.away_shots.as_ref())?,
  );
  Ok(StatsRecord::new(teams, shots))
}

fn parse_teams(home: Option<&str>, away: Option<&str>) -> Result<TeamPair, DomainError> {
  let home = home.ok_or(DomainError::MissingField { field: "home" })?;
  let away = away.ok_or(DomainError::MissingField { field: "away" })?;
  TeamPair::new(home, away)
}

fn parse_number(field: &'static str, value: Option<&Value>) -> Result<f64, DomainError> {
  match value {
    None | Some(Value::Null) => Err(DomainError::MissingField { field }),
    Some(Value::Number(n)) => n.as_f64().ok_or_else(|| DomainError::NotNumeric {
      field,
      raw: n.to_string(),
    }),
    Some(Value::String(s)) => s.trim().parse::<f64>().map_err(|_| DomainError::NotNumeric {
      field,
      raw: s.clone(),
    }),
    Some(other) => Err(DomainError::NotNumeric {
      field,
      raw: other.to_string(),
    }),
  }
}

fn parse_count(field: &'static str, value: Option<&Value>) -> Result<u32, DomainError> {
  let invalid = |raw: String| DomainError::InvalidShotCount { field, raw };
  match value {
    None | Some(Value::Null) => Err(DomainError::MissingField { field }),
    Some(Value::Number(n)) => {
      if let Some(v) = n.as_u64() {
        return u32::try_from(v).map_err(|_| invalid(n.to_string()));
      }
      // Accept integral floats such as 7.0.
      match n.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= f64::from(u32::MAX) => {
          #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
          let v = f as u32;
          Ok(v)
        }
        _ => Err(invalid(n.to_string())),
      }
    }
    Some(Value::String(s)) => s.trim().parse::<u32>().map_err(|_| invalid(s.clone())),
    Some(other) => Err(invalid(other.to_string())),
  }
}
