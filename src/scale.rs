//! Color scales derived from the fragment set and the coloring attribute.

use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::color::{self, Color, DARKBLUE, LIGHTBLUE, SENTINEL};
use crate::filter::ColorAttribute;
use crate::fragment::Fragment;
use crate::reference::ReferenceData;

/// Domain of the confidence scale.
pub const CONFIDENCE_DOMAIN: (f64, f64) = (0.5, 1.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleMode {
    Discrete,
    Continuous,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    /// The raw attribute value the entry stands for.
    pub key: String,
    pub label: String,
    pub color: Color,
    pub extent: Option<(f64, f64)>,
}

/// A sequential scale between two endpoint colors, clamped to its domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sequential {
    pub domain: (f64, f64),
    pub low: Color,
    pub high: Color,
}

impl Sequential {
    pub fn color_at(&self, value: f64) -> Color {
        let (d0, d1) = self.domain;
        let t = if d1 == d0 { 0.0 } else { (value - d0) / (d1 - d0) };
        color::interpolate_rgb(self.low, self.high, t)
    }
}

#[derive(Debug, Clone)]
enum Mapping {
    Fixed(Color),
    Ancestry(FxHashMap<String, Color>),
    Individual(FxHashMap<String, Color>),
    Confidence(Sequential),
}

/// Fragment → color, plus what the legend needs.
#[derive(Debug, Clone)]
pub struct ColorScale {
    mapping: Mapping,
    pub mode: ScaleMode,
    pub legend: Vec<LegendEntry>,
}

impl ColorScale {
    pub fn color_of(&self, fragment: &Fragment) -> Color {
        match &self.mapping {
            Mapping::Fixed(color) => *color,
            Mapping::Ancestry(colors) => fragment
                .ancestry
                .as_deref()
                .filter(|a| !a.is_empty())
                .and_then(|a| colors.get(a).copied())
                .unwrap_or(SENTINEL),
            Mapping::Individual(colors) => colors
                .get(&fragment.individual_phase)
                .copied()
                .unwrap_or(SENTINEL),
            Mapping::Confidence(scale) => match fragment.confidence {
                Some(v) if v.is_finite() => scale.color_at(v),
                _ => SENTINEL,
            },
        }
    }

    /// The sequential scale behind a continuous color scale.
    pub fn sequential(&self) -> Option<&Sequential> {
        match &self.mapping {
            Mapping::Confidence(scale) => Some(scale),
            _ => None,
        }
    }
}

/// Distinct non-empty values in first-seen order.
fn distinct<'f, I>(values: I) -> Vec<&'f str>
where
    I: Iterator<Item = &'f str>,
{
    let mut seen = FxHashSet::default();
    values.filter(|v| !v.is_empty() && seen.insert(*v)).collect()
}

pub struct ColorScaleFactory<'a> {
    reference: &'a ReferenceData,
}

impl<'a> ColorScaleFactory<'a> {
    pub fn new(reference: &'a ReferenceData) -> Self {
        ColorScaleFactory { reference }
    }

    pub fn derive(&self, fragments: &[Fragment], attribute: &ColorAttribute) -> ColorScale {
        let scale = match attribute {
            ColorAttribute::Ancestry => self.ancestry_scale(fragments),
            ColorAttribute::Individual => individual_scale(fragments),
            ColorAttribute::MeanPosteriorProbability => confidence_scale(),
            ColorAttribute::Other(name) => {
                debug!("No color scale for attribute {:?}; using the fallback", name);
                ColorScale {
                    mapping: Mapping::Fixed(SENTINEL),
                    mode: ScaleMode::Discrete,
                    legend: Vec::new(),
                }
            }
        };
        debug!(
            "Derived {:?} color scale for {} with {} legend entries",
            scale.mode,
            attribute,
            scale.legend.len()
        );
        scale
    }

    fn ancestry_scale(&self, fragments: &[Fragment]) -> ColorScale {
        let labels = distinct(fragments.iter().filter_map(|f| f.ancestry.as_deref()));

        let mut colors = FxHashMap::default();
        let mut legend = Vec::with_capacity(labels.len());
        for label in labels {
            let color = self.reference.ancestry_color(label).unwrap_or(SENTINEL);
            colors.insert(label.to_string(), color);
            legend.push(LegendEntry {
                key: label.to_string(),
                label: self.reference.long_name(label).to_string(),
                color,
                extent: None,
            });
        }

        ColorScale {
            mapping: Mapping::Ancestry(colors),
            mode: ScaleMode::Discrete,
            legend,
        }
    }
}

fn individual_scale(fragments: &[Fragment]) -> ColorScale {
    let ids = distinct(fragments.iter().map(|f| f.individual_phase.as_str()));

    let mut colors = FxHashMap::default();
    let mut legend = Vec::with_capacity(ids.len());
    for id in ids {
        let color = color::identifier_color(id);
        colors.insert(id.to_string(), color);
        legend.push(LegendEntry {
            key: id.to_string(),
            label: id.to_string(),
            color,
            extent: None,
        });
    }

    ColorScale {
        mapping: Mapping::Individual(colors),
        mode: ScaleMode::Discrete,
        legend,
    }
}

fn confidence_scale() -> ColorScale {
    let scale = Sequential {
        domain: CONFIDENCE_DOMAIN,
        low: LIGHTBLUE,
        high: DARKBLUE,
    };
    let (d0, d1) = scale.domain;
    let legend = vec![
        LegendEntry {
            key: "min".to_string(),
            label: format!("Min: {}", d0),
            color: scale.color_at(d0),
            extent: Some(scale.domain),
        },
        LegendEntry {
            key: "max".to_string(),
            label: format!("Max: {}", d1),
            color: scale.color_at(d1),
            extent: Some(scale.domain),
        },
    ];

    ColorScale {
        mapping: Mapping::Confidence(scale),
        mode: ScaleMode::Continuous,
        legend,
    }
}
