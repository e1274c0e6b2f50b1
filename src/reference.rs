//! Static lookup tables the engine is parameterised with.
//!
//! Nothing here is read through a global: a [`ReferenceData`] is built once and
//! handed to the color scale factory and the coordinate mapper.

use log::{debug, warn};
use rustc_hash::FxHashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::color::Color;

/// GRCh37 chromosome lengths in base pairs.
const GRCH37_LENGTHS: [(&str, u64); 23] = [
    ("1", 249_250_621),
    ("2", 243_199_373),
    ("3", 198_022_430),
    ("4", 191_154_276),
    ("5", 180_915_260),
    ("6", 171_115_067),
    ("7", 159_138_663),
    ("8", 146_364_022),
    ("9", 141_213_431),
    ("10", 135_534_747),
    ("11", 135_006_516),
    ("12", 133_851_895),
    ("13", 115_169_878),
    ("14", 107_349_540),
    ("15", 102_531_392),
    ("16", 90_354_753),
    ("17", 81_195_210),
    ("18", 78_077_248),
    ("19", 59_128_983),
    ("20", 63_025_520),
    ("21", 48_129_895),
    ("22", 51_304_566),
    ("X", 155_270_560),
];

/// Ancestry label, palette color, long-form legend name.
const ANCESTRIES: [(&str, &str, &str); 5] = [
    ("Neanderthal", "#1b9e77", "Neanderthal"),
    ("Denisova", "#d95f02", "Denisova"),
    ("Ambiguous", "#7570b3", "Ambiguous archaic"),
    ("AMH", "#e7298a", "Anatomically modern human"),
    ("nonDAVC", "#999999", "Non-DAVC"),
];

/// Immutable lookup tables shared by one render.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    chromosome_lengths: FxHashMap<String, u64>,
    ancestry_colors: FxHashMap<String, Color>,
    long_names: FxHashMap<String, String>,
    ancestry_order: Vec<String>,
}

impl Default for ReferenceData {
    fn default() -> Self {
        let mut ancestry_colors = FxHashMap::default();
        let mut long_names = FxHashMap::default();
        let mut ancestry_order = Vec::with_capacity(ANCESTRIES.len());
        for (label, hex, long) in ANCESTRIES {
            if let Some(color) = Color::parse(hex) {
                ancestry_colors.insert(label.to_string(), color);
            }
            long_names.insert(label.to_string(), long.to_string());
            ancestry_order.push(label.to_string());
        }

        ReferenceData {
            chromosome_lengths: GRCH37_LENGTHS
                .iter()
                .map(|&(name, len)| (name.to_string(), len))
                .collect(),
            ancestry_colors,
            long_names,
            ancestry_order,
        }
    }
}

impl ReferenceData {
    pub fn new(
        chromosome_lengths: FxHashMap<String, u64>,
        ancestry_colors: FxHashMap<String, Color>,
        long_names: FxHashMap<String, String>,
    ) -> Self {
        let mut ancestry_order: Vec<String> = ancestry_colors.keys().cloned().collect();
        ancestry_order.sort();
        ReferenceData {
            chromosome_lengths,
            ancestry_colors,
            long_names,
            ancestry_order,
        }
    }

    pub fn chromosome_length(&self, chrom: &str) -> Option<u64> {
        self.chromosome_lengths.get(chrom).copied()
    }

    pub fn ancestry_color(&self, label: &str) -> Option<Color> {
        self.ancestry_colors.get(label).copied()
    }

    /// Long-form legend name, falling back to the raw label.
    pub fn long_name<'a>(&'a self, label: &'a str) -> &'a str {
        self.long_names.get(label).map(String::as_str).unwrap_or(label)
    }

    /// Every ancestry the palette knows, in palette order.
    pub fn ancestries(&self) -> &[String] {
        &self.ancestry_order
    }

    /// Replace or add palette entries.
    pub fn with_ancestry_colors(mut self, overrides: FxHashMap<String, Color>) -> Self {
        for (label, color) in overrides {
            if !self.ancestry_colors.contains_key(&label) {
                self.ancestry_order.push(label.clone());
            }
            self.ancestry_colors.insert(label, color);
        }
        self
    }
}

/// Read palette overrides: one `label<TAB>color` per line, `#` starts a comment.
///
/// Colors are `#rrggbb`, `r,g,b` or a CSS keyword; unparsable colors are
/// replaced by grey.
pub fn load_ancestry_colors(path: &Path) -> std::io::Result<FxHashMap<String, Color>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut colors = FxHashMap::default();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() >= 2 {
            let color = Color::parse(parts[1]).unwrap_or_else(|| {
                warn!("Unrecognized color {:?} for ancestry {:?}", parts[1], parts[0]);
                Color::Rgb(128, 128, 128)
            });
            colors.insert(parts[0].trim().to_string(), color);
        }
    }

    debug!("Loaded {} ancestry color overrides", colors.len());
    Ok(colors)
}
