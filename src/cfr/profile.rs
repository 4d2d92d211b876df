//! Strategy profiles: the time-averaged output of training.
//!
//! A [`StrategyProfile`] maps every visited information key to a probability
//! distribution over that information set's actions. It is built from an
//! [`InfoSetTable`] once training is done and is independent of the table's
//! regret state afterwards.
//!
//! Profiles persist as JSON Lines, one record per information set:
//!
//! ```text
//! {"key":"Qcb","probabilities":[0.66,0.34]}
//! ```
//!
//! Records are written sorted by key. Readers must not rely on the order.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cfr::game::Action;
use crate::cfr::storage::InfoSetTable;

/// Tolerance on the probability sum of a loaded record.
pub const SUM_TOLERANCE: f64 = 1e-6;

/// Errors from building, persisting or querying a profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The destination or source could not be written or read.
    #[error("profile I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// A record is malformed.
    #[error("malformed profile record on line {line}: {reason}")]
    Format {
        /// 1-based line number of the record, 0 for records not read from a stream.
        line: usize,
        /// What is wrong with it.
        reason: String,
    },
    /// The key was never visited during training.
    #[error("no strategy for information set {key:?}")]
    NotFound {
        /// The key that was looked up.
        key: String,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProfileRecord {
    key: String,
    probabilities: Vec<f64>,
}

/// Average strategy for every information set visited during training.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrategyProfile {
    distribution: FxHashMap<String, Vec<f64>>,
}

impl StrategyProfile {
    /// Create an empty profile.
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize every entry's strategy sum into a distribution.
    ///
    /// Entries that never accumulated any weight get a uniform
    /// distribution.
    pub fn from_table<A: Action>(table: &InfoSetTable<A>) -> Self {
        let mut distribution =
            FxHashMap::with_capacity_and_hasher(table.len(), Default::default());

        for (key, entry) in table.iter() {
            if !entry.is_reached() {
                log::warn!("information set {:?} was never reached, using uniform strategy", key);
            }
            distribution.insert(key.clone(), entry.average_strategy());
        }

        Self { distribution }
    }

    /// Probabilities for `key`, in the order of the information set's actions.
    ///
    /// # Errors
    /// [`ProfileError::NotFound`] if `key` was never visited. Callers must
    /// treat that as "no data"; nothing here substitutes a default.
    pub fn lookup(&self, key: &str) -> Result<&[f64], ProfileError> {
        self.distribution
            .get(key)
            .map(Vec::as_slice)
            .ok_or_else(|| ProfileError::NotFound {
                key: key.to_string(),
            })
    }

    /// Add or replace the distribution for `key`.
    ///
    /// # Errors
    /// [`ProfileError::Format`] if `probabilities` is not a distribution.
    pub fn insert(&mut self, key: impl Into<String>, probabilities: Vec<f64>) -> Result<(), ProfileError> {
        check_distribution(&probabilities).map_err(|reason| ProfileError::Format { line: 0, reason })?;
        self.distribution.insert(key.into(), probabilities);
        Ok(())
    }

    /// Number of information sets in the profile.
    pub fn len(&self) -> usize {
        self.distribution.len()
    }

    /// Whether the profile is empty.
    pub fn is_empty(&self) -> bool {
        self.distribution.is_empty()
    }

    /// All information keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.distribution.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Iterate over `(key, probabilities)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.distribution
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Write the profile to a file, replacing it.
    ///
    /// A failed write leaves the file in an undefined state.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ProfileError> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        self.save_to(&mut writer)?;
        writer.flush()?;
        log::debug!("saved {} information sets to {}", self.len(), path.display());
        Ok(())
    }

    /// Write the profile as JSON Lines to any writer.
    pub fn save_to<W: Write>(&self, mut writer: W) -> Result<(), ProfileError> {
        for key in self.keys() {
            let record = ProfileRecord {
                key: key.to_string(),
                probabilities: self.distribution[key].clone(),
            };
            serde_json::to_writer(&mut writer, &record).map_err(std::io::Error::from)?;
            writer.write_all(b"\n")?;
        }
        Ok(())
    }

    /// Read a profile from JSON Lines.
    ///
    /// Blank lines are skipped. A repeated key keeps the last record.
    pub fn load_from<R: BufRead>(reader: R) -> Result<Self, ProfileError> {
        let mut profile = Self::new();

        for (index, line) in reader.lines().enumerate() {
            let number = index + 1;
            let line = match line {
                Ok(line) => line,
                Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                    return Err(ProfileError::Format {
                        line: number,
                        reason: e.to_string(),
                    })
                }
                Err(e) => return Err(e.into()),
            };
            if line.trim().is_empty() {
                continue;
            }

            let record: ProfileRecord =
                serde_json::from_str(&line).map_err(|e| ProfileError::Format {
                    line: number,
                    reason: e.to_string(),
                })?;
            check_distribution(&record.probabilities).map_err(|reason| ProfileError::Format {
                line: number,
                reason,
            })?;
            profile.distribution.insert(record.key, record.probabilities);
        }

        Ok(profile)
    }
}

/// Read a profile previously written with [`StrategyProfile::save`].
pub fn load_strategy_profile(path: impl AsRef<Path>) -> Result<StrategyProfile, ProfileError> {
    let path = path.as_ref();
    let profile = StrategyProfile::load_from(BufReader::new(File::open(path)?))?;
    log::debug!("loaded {} information sets from {}", profile.len(), path.display());
    Ok(profile)
}

fn check_distribution(probabilities: &[f64]) -> Result<(), String> {
    if probabilities.is_empty() {
        return Err("no probabilities".to_string());
    }
    if let Some(p) = probabilities.iter().find(|p| !p.is_finite() || **p < 0.0) {
        return Err(format!("invalid probability {}", p));
    }
    let sum: f64 = probabilities.iter().sum();
    if (sum - 1.0).abs() > SUM_TOLERANCE {
        return Err(format!("probabilities sum to {}", sum));
    }
    Ok(())
}
