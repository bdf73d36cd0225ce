//! Observation dates: an integer list or a range pattern.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// Either `[0, 5, 10]` or `"[0:5:50, 75, 100]"`. Ranges `a:step:b`
/// include `b` when it is reached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObservedDates {
    List(Vec<i64>),
    Pattern(String),
}

impl ObservedDates {
    pub fn resolve(&self) -> Result<BTreeSet<i64>> {
        match self {
            ObservedDates::List(dates) => Ok(dates.iter().copied().collect()),
            ObservedDates::Pattern(pattern) => parse_pattern(pattern),
        }
    }
}

fn parse_pattern(pattern: &str) -> Result<BTreeSet<i64>> {
    let inner = pattern
        .trim()
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| {
            SimError::Setup(format!("date pattern {} must be enclosed in [ ]", pattern))
        })?;

    let mut dates = BTreeSet::new();
    for token in inner.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let parts: Vec<&str> = token.split(':').map(str::trim).collect();
        match parts.as_slice() {
            [date] => {
                dates.insert(parse_date(date, pattern)?);
            }
            [min, step, max] => {
                let (min, step, max) = (
                    parse_date(min, pattern)?,
                    parse_date(step, pattern)?,
                    parse_date(max, pattern)?,
                );
                if step <= 0 || max < min {
                    return Err(SimError::Setup(format!(
                        "invalid range {} in date pattern {}",
                        token, pattern
                    )));
                }
                let mut date = min;
                while date <= max {
                    dates.insert(date);
                    date += step;
                }
            }
            _ => {
                return Err(SimError::Setup(format!(
                    "cannot read {} in date pattern {}, expected d or min:step:max",
                    token, pattern
                )))
            }
        }
    }
    Ok(dates)
}

fn parse_date(token: &str, pattern: &str) -> Result<i64> {
    token.parse().map_err(|_| {
        SimError::Setup(format!("{} is not an integer date in pattern {}", token, pattern))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_pattern_includes_max() {
        let dates = ObservedDates::Pattern("[0:5:20, 22, 30]".to_string())
            .resolve()
            .unwrap();
        assert_eq!(dates.into_iter().collect::<Vec<_>>(), vec![0, 5, 10, 15, 20, 22, 30]);
    }

    #[test]
    fn test_untagged_forms() {
        let list: ObservedDates = serde_json::from_str("[3, 1, 3]").unwrap();
        assert_eq!(list.resolve().unwrap().len(), 2);
        let pattern: ObservedDates = serde_json::from_str(r#""[1:2:6]""#).unwrap();
        assert_eq!(pattern.resolve().unwrap().into_iter().collect::<Vec<_>>(), vec![1, 3, 5]);
    }

    #[test]
    fn test_malformed_patterns_rejected() {
        for bad in ["0:1:5", "[0:0:5]", "[5:1:0]", "[a]", "[1:2]"] {
            assert!(
                ObservedDates::Pattern(bad.to_string()).resolve().is_err(),
                "{} should be rejected",
                bad
            );
        }
    }
}
