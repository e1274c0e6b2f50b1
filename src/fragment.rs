//! Fragment records and the source they are fetched from.

use log::{debug, info, warn};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

/// An error loading fragments.
#[derive(Debug)]
pub enum Error {
    /// The input could not be read.
    Io(std::io::Error),

    /// The input is not a JSON array of fragment records.
    Json(serde_json::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "i/o error: {}", err),
            Error::Json(err) => write!(f, "invalid fragment records: {}", err),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

/// A single ancestry segment on one haplotype of one chromosome.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Fragment {
    #[serde(rename = "Chromosome", deserialize_with = "chromosome_name")]
    pub chromosome: String,
    #[serde(rename = "Start")]
    pub start: u64,
    #[serde(rename = "End")]
    pub end: u64,
    #[serde(rename = "Haplotype")]
    pub haplotype: u8,
    /// Individual and phase state, e.g. `AB02_phased`.
    #[serde(rename = "Individual_Phase", default)]
    pub individual_phase: String,
    #[serde(rename = "Ancestry", default)]
    pub ancestry: Option<String>,
    /// Mean posterior probability of the ancestry call.
    #[serde(rename = "Mean Post. Prob.", default)]
    pub confidence: Option<f64>,
    #[serde(flatten)]
    pub details: FragmentDetails,
}

/// Descriptive fields shown in the tooltip only.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FragmentDetails {
    #[serde(rename = "Individual")]
    pub individual: Option<String>,
    #[serde(rename = "Dataset")]
    pub dataset: Option<String>,
    #[serde(rename = "Region")]
    pub region: Option<String>,
    #[serde(rename = "Population")]
    pub population: Option<String>,
    #[serde(rename = "Sex")]
    pub sex: Option<String>,
    #[serde(rename = "Phase State")]
    pub phase_state: Option<String>,
    #[serde(rename = "Called Seq.")]
    pub called_sequence: Option<f64>,
    #[serde(rename = "Mutation Rate")]
    pub mutation_rate: Option<f64>,
    #[serde(rename = "SNPs")]
    pub snps: Option<f64>,
    #[serde(rename = "Min. Distance Ancestry")]
    pub min_distance_ancestry: Option<String>,
    #[serde(rename = "Min. Distance Value")]
    pub min_distance_value: Option<f64>,
    #[serde(rename = "Ancestry Z test")]
    pub z_test_ancestry: Option<String>,
    #[serde(rename = "Distance Z test")]
    pub z_test_distance: Option<String>,
    #[serde(rename = "P-val Z test")]
    pub z_test_pvalue: Option<String>,
    #[serde(rename = "Link. DAVC")]
    pub linked_davc: Option<f64>,
    #[serde(rename = "Admixt. Pop. Variants")]
    pub admixed_pop_variants: Option<f64>,
    #[serde(rename = "Vindija")]
    pub vindija: Option<f64>,
    #[serde(rename = "Chagyrskaya")]
    pub chagyrskaya: Option<f64>,
    #[serde(rename = "Altai")]
    pub altai: Option<f64>,
    #[serde(rename = "Denisova")]
    pub denisova: Option<f64>,
    #[serde(rename = "Private Vindija")]
    pub private_vindija: Option<f64>,
    #[serde(rename = "Private Chagyrskaya")]
    pub private_chagyrskaya: Option<f64>,
    #[serde(rename = "Private Altai")]
    pub private_altai: Option<f64>,
    #[serde(rename = "Private Denisova")]
    pub private_denisova: Option<f64>,
    #[serde(rename = "Shared Neanderthal")]
    pub shared_neanderthal: Option<f64>,
    #[serde(rename = "Shared Archaic")]
    pub shared_archaic: Option<f64>,
}

/// Chromosomes arrive either as `"X"` or as a bare number.
fn chromosome_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s.trim().to_string(),
        Raw::Number(n) => n.to_string(),
    })
}

impl Fragment {
    pub fn new(chromosome: &str, start: u64, end: u64, haplotype: u8, individual_phase: &str) -> Self {
        Fragment {
            chromosome: chromosome.to_string(),
            start,
            end,
            haplotype,
            individual_phase: individual_phase.to_string(),
            ancestry: None,
            confidence: None,
            details: FragmentDetails::default(),
        }
    }

    pub fn with_ancestry(mut self, ancestry: &str) -> Self {
        self.ancestry = Some(ancestry.to_string());
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Length in base pairs.
    pub fn length(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// The (individual, haplotype) pair that selects the track partition.
    pub fn partition_key(&self) -> (&str, u8) {
        (self.individual_phase.as_str(), self.haplotype)
    }
}

/// Decode a JSON array of fragment records, skipping records with start > end.
pub fn read_fragments<R: Read>(reader: R) -> Result<Vec<Fragment>, Error> {
    let records: Vec<Fragment> = serde_json::from_reader(reader)?;
    let total = records.len();
    let fragments: Vec<Fragment> = records
        .into_iter()
        .filter(|f| {
            if f.start > f.end {
                warn!(
                    "Skipping fragment {}:{}-{} of {}: start after end",
                    f.chromosome, f.start, f.end, f.individual_phase
                );
                false
            } else {
                true
            }
        })
        .collect();
    debug!("Decoded {} of {} fragment records", fragments.len(), total);
    Ok(fragments)
}

/// Read one identifier per non-empty line.
pub fn load_individuals(path: &Path) -> std::io::Result<Vec<String>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut individuals = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if !line.is_empty() {
            individuals.push(line.to_string());
        }
    }

    Ok(individuals)
}

/// Supplies the fragments of a list of individual/phase identifiers.
pub trait FragmentSource {
    fn fetch(&self, individuals: &[String]) -> Result<Vec<Fragment>, Error>;
}

/// Fragments stored as one JSON array in a file.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        JsonFileSource { path: path.into() }
    }

    fn read_all(&self) -> Result<Vec<Fragment>, Error> {
        let file = File::open(&self.path)?;
        read_fragments(BufReader::new(file))
    }

    /// Every individual/phase identifier present, in file order.
    pub fn individuals(&self) -> Result<Vec<String>, Error> {
        let mut seen = FxHashSet::default();
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|f| seen.insert(f.individual_phase.clone()))
            .map(|f| f.individual_phase)
            .collect())
    }
}

impl FragmentSource for JsonFileSource {
    /// Fragments are returned grouped by identifier, in request order.
    fn fetch(&self, individuals: &[String]) -> Result<Vec<Fragment>, Error> {
        info!("Loading fragments from {:?}...", self.path);
        let all = self.read_all()?;

        let mut result = Vec::new();
        for individual in individuals {
            let before = result.len();
            result.extend(all.iter().filter(|f| &f.individual_phase == individual).cloned());
            if result.len() == before {
                warn!("Missing fragments for {}", individual);
            }
        }

        info!("Found {} fragments for {} individuals", result.len(), individuals.len());
        Ok(result)
    }
}
