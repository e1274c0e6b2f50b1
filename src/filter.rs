//! The filter configuration and the fragment selection it drives.

use std::fmt;
use std::str::FromStr;

use crate::fragment::Fragment;

/// The fragment field that drives color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorAttribute {
    Ancestry,
    Individual,
    MeanPosteriorProbability,
    /// Anything else; colored with the fallback scale.
    Other(String),
}

impl FromStr for ColorAttribute {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Ancestry" => ColorAttribute::Ancestry,
            "Individual" => ColorAttribute::Individual,
            "Mean Posterior Probability" => ColorAttribute::MeanPosteriorProbability,
            other => ColorAttribute::Other(other.to_string()),
        })
    }
}

impl fmt::Display for ColorAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorAttribute::Ancestry => write!(f, "Ancestry"),
            ColorAttribute::Individual => write!(f, "Individual"),
            ColorAttribute::MeanPosteriorProbability => write!(f, "Mean Posterior Probability"),
            ColorAttribute::Other(name) => write!(f, "{}", name),
        }
    }
}

/// The visible genomic window in kilobases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowKb {
    pub start: u64,
    pub end: u64,
}

impl WindowKb {
    pub fn start_bp(&self) -> u64 {
        self.start.saturating_mul(1000)
    }

    pub fn end_bp(&self) -> u64 {
        self.end.saturating_mul(1000)
    }
}

/// An error parsing a `START-END` window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWindowError(String);

impl fmt::Display for ParseWindowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parse window error: {} is not a valid START-END window", self.0)
    }
}

impl std::error::Error for ParseWindowError {}

impl FromStr for WindowKb {
    type Err = ParseWindowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseWindowError(s.to_string());
        let (start, end) = s.split_once('-').ok_or_else(err)?;
        let start: u64 = start.trim().parse().map_err(|_| err())?;
        let end: u64 = end.trim().parse().map_err(|_| err())?;
        if start > end {
            return Err(err());
        }
        Ok(WindowKb { start, end })
    }
}

/// Everything the filter form hands to one render.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfiguration {
    pub individuals: Vec<String>,
    pub chromosomes: Vec<String>,
    pub ancestries: Vec<String>,
    pub min_confidence: f64,
    pub min_length_kb: u64,
    pub window: WindowKb,
    pub color_by: ColorAttribute,
}

impl FilterConfiguration {
    /// The form's initial state, selecting every ancestry in `ancestries`.
    pub fn with_ancestries(ancestries: &[String]) -> Self {
        FilterConfiguration {
            individuals: vec![
                "HGDP00535_unphased".to_string(),
                "HGDP00536_unphased".to_string(),
                "HGDP01149_unphased".to_string(),
            ],
            chromosomes: crate::layout::CANONICAL_CHROMOSOMES
                .iter()
                .map(|c| c.to_string())
                .collect(),
            ancestries: ancestries.to_vec(),
            min_confidence: 0.5,
            min_length_kb: 50,
            window: WindowKb { start: 0, end: 250_000 },
            color_by: ColorAttribute::Ancestry,
        }
    }
}

/// Lowercase and drop all whitespace.
pub fn normalize_label(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Decides which fragments are drawn under one configuration.
#[derive(Debug, Clone)]
pub struct SegmentFilter<'a> {
    config: &'a FilterConfiguration,
    ancestries: Vec<String>,
}

impl<'a> SegmentFilter<'a> {
    pub fn new(config: &'a FilterConfiguration) -> Self {
        SegmentFilter {
            config,
            ancestries: config.ancestries.iter().map(|a| normalize_label(a)).collect(),
        }
    }

    /// The attribute thresholds shared by every track and partition.
    ///
    /// An empty ancestry selection passes nothing. A fragment starting at or
    /// beyond the window end lies wholly right of the plot and is dropped.
    pub fn passes(&self, fragment: &Fragment) -> bool {
        if self.ancestries.is_empty() {
            return false;
        }
        let ancestry_ok = fragment
            .ancestry
            .as_deref()
            .map(normalize_label)
            .map_or(false, |a| self.ancestries.iter().any(|s| *s == a));

        let confidence_ok = fragment
            .confidence
            .map_or(false, |c| c.is_finite() && c >= self.config.min_confidence);

        let window = self.config.window;
        ancestry_ok
            && confidence_ok
            && fragment.length() >= self.config.min_length_kb.saturating_mul(1000)
            && fragment.start >= window.start_bp()
            && (window.end <= window.start || fragment.start < window.end_bp())
    }

    /// Fragments of one (individual, haplotype) partition on one chromosome track.
    pub fn select_partition<'f>(
        &self,
        fragments: &'f [Fragment],
        chromosome: &str,
        partition: (&str, u8),
    ) -> Vec<&'f Fragment> {
        if !self.config.chromosomes.iter().any(|c| c == chromosome) {
            return Vec::new();
        }
        fragments
            .iter()
            .filter(|f| f.chromosome == chromosome && f.partition_key() == partition)
            .filter(|f| self.passes(f))
            .collect()
    }

    /// All fragments that would be drawn on any selected track.
    pub fn select<'f>(&self, fragments: &'f [Fragment]) -> Vec<&'f Fragment> {
        fragments
            .iter()
            .filter(|f| self.config.chromosomes.iter().any(|c| *c == f.chromosome))
            .filter(|f| self.passes(f))
            .collect()
    }
}
