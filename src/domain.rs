use std::collections::BTreeSet;
use std::collections::btree_set;
use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::GtopError;

/// A PDB structure code. Opaque and case-sensitive, never empty.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct StructureCode(String);

impl StructureCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StructureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StructureCode {
    type Err = GtopError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().is_empty() {
            return Err(GtopError::InvalidStructureCode);
        }
        Ok(Self(value.to_string()))
    }
}

/// A deduplicated set of structure codes.
///
/// Ordered so that printing and comparing results is deterministic no matter
/// which strategy produced a code first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CodeSet(BTreeSet<StructureCode>);

impl CodeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from raw strings, dropping empty ones.
    pub fn from_raw<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for code in codes {
            set.insert_raw(code.as_ref());
        }
        set
    }

    pub fn insert(&mut self, code: StructureCode) -> bool {
        self.0.insert(code)
    }

    /// Inserts a raw code; empty strings are ignored.
    pub fn insert_raw(&mut self, code: &str) -> bool {
        match code.parse::<StructureCode>() {
            Ok(code) => self.0.insert(code),
            Err(_) => false,
        }
    }

    pub fn contains(&self, code: &str) -> bool {
        self.0.iter().any(|existing| existing.as_str() == code)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_set::Iter<'_, StructureCode> {
        self.0.iter()
    }

    pub fn union(&self, other: &CodeSet) -> CodeSet {
        Self(self.0.union(&other.0).cloned().collect())
    }

    pub fn intersection(&self, other: &CodeSet) -> CodeSet {
        Self(self.0.intersection(&other.0).cloned().collect())
    }

    pub fn absorb(&mut self, other: CodeSet) {
        self.0.extend(other.0);
    }

    pub fn is_subset(&self, other: &CodeSet) -> bool {
        self.0.is_subset(&other.0)
    }

    pub fn is_superset(&self, other: &CodeSet) -> bool {
        self.0.is_superset(&other.0)
    }

    pub fn to_strings(&self) -> Vec<String> {
        self.0.iter().map(|code| code.0.clone()).collect()
    }
}

impl FromIterator<StructureCode> for CodeSet {
    fn from_iter<I: IntoIterator<Item = StructureCode>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for CodeSet {
    type Item = StructureCode;
    type IntoIter = btree_set::IntoIter<StructureCode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a CodeSet {
    type Item = &'a StructureCode;
    type IntoIter = btree_set::Iter<'a, StructureCode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Why a search strategy produced no result set at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unavailable {
    /// The entity lacks the attribute the strategy searches with.
    MissingAttribute(&'static str),
    /// The service gave no usable answer after all attempts.
    NoData,
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unavailable::MissingAttribute(name) => write!(f, "missing {name}"),
            Unavailable::NoData => write!(f, "no data"),
        }
    }
}

/// Result of one search strategy.
///
/// `Unavailable` counts as the empty set when unioned, but is kept apart from
/// a successful search that matched nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyOutcome {
    Found(CodeSet),
    Unavailable(Unavailable),
}

impl StrategyOutcome {
    pub fn is_available(&self) -> bool {
        matches!(self, StrategyOutcome::Found(_))
    }

    pub fn codes(&self) -> Option<&CodeSet> {
        match self {
            StrategyOutcome::Found(codes) => Some(codes),
            StrategyOutcome::Unavailable(_) => None,
        }
    }

    pub fn into_codes(self) -> CodeSet {
        match self {
            StrategyOutcome::Found(codes) => codes,
            StrategyOutcome::Unavailable(_) => CodeSet::new(),
        }
    }
}

/// Unions strategy outcomes, treating unavailable ones as empty.
pub fn union_outcomes<I>(outcomes: I) -> CodeSet
where
    I: IntoIterator<Item = StrategyOutcome>,
{
    let mut combined = CodeSet::new();
    for outcome in outcomes {
        combined.absorb(outcome.into_codes());
    }
    combined
}

/// Case-insensitive species filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Species(String);

impl Species {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, other: &str) -> bool {
        self.0.to_lowercase() == other.to_lowercase()
    }

    /// True when the filter is absent or matches the given species.
    /// A missing species never satisfies a present filter.
    pub fn admits(filter: Option<&Species>, species: Option<&str>) -> bool {
        match (filter, species) {
            (None, _) => true,
            (Some(filter), Some(species)) => filter.matches(species),
            (Some(_), None) => false,
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Species {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Species {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Total number of tries for one logical request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Attempts(u32);

impl Attempts {
    pub const DEFAULT: Attempts = Attempts(5);

    pub fn new(value: i64) -> Result<Self, GtopError> {
        if value < 1 || value > i64::from(u32::MAX) {
            return Err(GtopError::InvalidAttempts(value.to_string()));
        }
        Ok(Self(value as u32))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for Attempts {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<i64> for Attempts {
    type Error = GtopError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Attempts> for i64 {
    fn from(value: Attempts) -> Self {
        i64::from(value.0)
    }
}

impl FromStr for Attempts {
    type Err = GtopError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parsed = value
            .trim()
            .parse::<i64>()
            .map_err(|_| GtopError::InvalidAttempts(value.to_string()))?;
        Self::new(parsed)
    }
}

impl fmt::Display for Attempts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SmilesMode {
    #[default]
    Exact,
    Substructure,
}

impl SmilesMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SmilesMode::Exact => "exact",
            SmilesMode::Substructure => "substructure",
        }
    }
}

impl fmt::Display for SmilesMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SmilesMode {
    type Err = GtopError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "exact" => Ok(SmilesMode::Exact),
            "substructure" => Ok(SmilesMode::Substructure),
            _ => Err(GtopError::InvalidSmilesMode(value.to_string())),
        }
    }
}

/// Minimum similarity for a GtoP SMILES similarity search, within `0..=1`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct SimilarityCutoff(f64);

impl SimilarityCutoff {
    pub const DEFAULT: SimilarityCutoff = SimilarityCutoff(0.8);

    pub fn new(value: f64) -> Result<Self, GtopError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(GtopError::InvalidSimilarityCutoff(value.to_string()));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for SimilarityCutoff {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// How GtoP matches a SMILES string against its own ligands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LigandSmilesSearch {
    Exact,
    Substructure,
    Similarity(SimilarityCutoff),
}

impl LigandSmilesSearch {
    pub fn path_segment(self) -> &'static str {
        match self {
            LigandSmilesSearch::Exact => "exact",
            LigandSmilesSearch::Substructure => "substructure",
            LigandSmilesSearch::Similarity(_) => "similarity",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NameComparator {
    #[default]
    Equals,
    Contains,
}

impl NameComparator {
    /// The comparator spelling the search service expects.
    pub fn as_str(self) -> &'static str {
        match self {
            NameComparator::Equals => "Equals",
            NameComparator::Contains => "Contains",
        }
    }
}

impl fmt::Display for NameComparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NameComparator {
    type Err = GtopError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "equals" => Ok(NameComparator::Equals),
            "contains" => Ok(NameComparator::Contains),
            _ => Err(GtopError::InvalidNameComparator(value.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn code_set_drops_empty_and_duplicates() {
        let set = CodeSet::from_raw(["4IAQ", "", "4IAQ", "  ", "1LS6"]);
        assert_eq!(set.len(), 2);
        assert!(set.contains("4IAQ"));
        assert!(!set.contains(""));
    }

    #[test]
    fn code_set_is_case_sensitive() {
        let set = CodeSet::from_raw(["4iaq", "4IAQ"]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn structure_codes_match_exactly() {
        let padded: StructureCode = " 4IAQ".parse().unwrap();
        assert_eq!(padded.as_str(), " 4IAQ");
        let set = CodeSet::from_raw([" 4IAQ", "4IAQ"]);
        assert_eq!(set.len(), 2);
        assert!(!set.contains("4IAQ ") && set.contains(" 4IAQ"));
        assert_matches!("\t ".parse::<StructureCode>(), Err(GtopError::InvalidStructureCode));
    }

    #[test]
    fn unavailable_unions_as_empty() {
        let combined = union_outcomes([
            StrategyOutcome::Found(CodeSet::from_raw(["1ABC"])),
            StrategyOutcome::Unavailable(Unavailable::NoData),
            StrategyOutcome::Found(CodeSet::new()),
        ]);
        assert_eq!(combined, CodeSet::from_raw(["1ABC"]));
    }

    #[test]
    fn attempts_rejects_non_positive() {
        assert_matches!(Attempts::new(0), Err(GtopError::InvalidAttempts(_)));
        assert_matches!(Attempts::new(-3), Err(GtopError::InvalidAttempts(_)));
        assert_matches!("2.5".parse::<Attempts>(), Err(GtopError::InvalidAttempts(_)));
        assert_eq!(Attempts::new(3).unwrap().get(), 3);
    }

    #[test]
    fn similarity_cutoff_is_bounded() {
        assert_eq!(SimilarityCutoff::default().get(), 0.8);
        assert_eq!(SimilarityCutoff::new(1.0).unwrap().get(), 1.0);
        assert_matches!(
            SimilarityCutoff::new(1.5),
            Err(GtopError::InvalidSimilarityCutoff(_))
        );
        assert_matches!(
            SimilarityCutoff::new(f64::NAN),
            Err(GtopError::InvalidSimilarityCutoff(_))
        );
    }

    #[test]
    fn species_filter_is_case_insensitive() {
        let rat = Species::new("rat");
        assert!(rat.matches("Rat"));
        assert!(Species::admits(None, None));
        assert!(!Species::admits(Some(&rat), None));
        assert!(!Species::admits(Some(&rat), Some("Human")));
    }
}
