//! Screen geometry: the horizontal genomic scale and the vertical track bands.

use log::debug;
use rustc_hash::FxHashSet;

use crate::filter::WindowKb;
use crate::fragment::Fragment;
use crate::reference::ReferenceData;

pub const CANONICAL_CHROMOSOMES: [&str; 23] = [
    "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12", "13", "14", "15", "16", "17",
    "18", "19", "20", "21", "22", "X",
];

/// Vertical gap between chromosome bands.
pub const CHROMOSOME_PADDING: f64 = 10.0;

/// Share of the plot width the scale range covers; the rest is right margin.
const RANGE_FRACTION: f64 = 0.95;

/// Sort chromosomes 1..22 then X; unknown labels keep their relative order at the end.
pub fn canonical_order<S: AsRef<str>>(chromosomes: &[S]) -> Vec<String> {
    let rank = |c: &str| {
        CANONICAL_CHROMOSOMES
            .iter()
            .position(|k| *k == c)
            .unwrap_or(CANONICAL_CHROMOSOMES.len())
    };
    let mut ordered: Vec<String> = chromosomes.iter().map(|c| c.as_ref().to_string()).collect();
    ordered.sort_by_key(|c| rank(c));
    ordered
}

/// Container margins and plot margins of the host page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

const CONTAINER_MARGIN: Margins = Margins { top: 0.0, right: 0.0, bottom: 0.0, left: -10.0 };
pub const PLOT_MARGIN: Margins = Margins { top: 20.0, right: -30.0, bottom: 90.0, left: 75.0 };

/// The drawable surface size and the plot rectangle inside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub width: f64,
    pub height: f64,
    pub plot_width: f64,
    pub plot_height: f64,
    pub margin: Margins,
}

impl PlotArea {
    /// Derive from the hosting container's bounding box.
    pub fn from_container(container_width: f64, container_height: f64) -> Self {
        let width = container_width - CONTAINER_MARGIN.left - CONTAINER_MARGIN.right;
        let height = container_height - CONTAINER_MARGIN.top - CONTAINER_MARGIN.bottom;
        PlotArea {
            width,
            height,
            plot_width: (width - PLOT_MARGIN.left - PLOT_MARGIN.right).max(0.0),
            plot_height: (height - PLOT_MARGIN.top - PLOT_MARGIN.bottom).max(0.0),
            margin: PLOT_MARGIN,
        }
    }
}

/// A linear map from base pairs to pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        LinearScale { domain, range }
    }

    /// Not clamped; positions outside the domain extrapolate.
    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }

    /// Round tick values (1, 2 or 5 × 10^k steps) covering the domain, about `count` of them.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (mut lo, mut hi) = self.domain;
        if !(lo.is_finite() && hi.is_finite()) || count == 0 {
            return Vec::new();
        }
        if lo == hi {
            return vec![lo];
        }
        let reverse = hi < lo;
        if reverse {
            std::mem::swap(&mut lo, &mut hi);
        }

        let step = tick_step(lo, hi, count);
        let first = (lo / step).ceil() as i64;
        let last = (hi / step).floor() as i64;
        let mut ticks: Vec<f64> = (first..=last).map(|i| i as f64 * step).collect();
        if reverse {
            ticks.reverse();
        }
        ticks
    }
}

fn tick_step(lo: f64, hi: f64, count: usize) -> f64 {
    let raw = (hi - lo) / count as f64;
    let power = 10f64.powf(raw.log10().floor());
    let error = raw / power;
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    factor * power
}

/// Vertical slot of one (individual, haplotype) pair inside a band.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub individual_phase: String,
    pub haplotype: u8,
    /// Offset from the top of the band.
    pub offset: f64,
    pub height: f64,
}

/// Vertical band of one chromosome track.
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    pub chromosome: String,
    pub y: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerticalLayout {
    pub bands: Vec<Band>,
    /// Shared by every band.
    pub partitions: Vec<Partition>,
    pub band_height: f64,
    pub partition_height: f64,
}

/// Distinct (individual, haplotype) pairs in first-seen order.
pub fn partition_keys(fragments: &[Fragment]) -> Vec<(String, u8)> {
    let mut seen: FxHashSet<(&str, u8)> = FxHashSet::default();
    fragments
        .iter()
        .filter(|f| seen.insert(f.partition_key()))
        .map(|f| (f.individual_phase.clone(), f.haplotype))
        .collect()
}

/// Turns the configuration and plot size into screen geometry.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateMapper<'a> {
    reference: &'a ReferenceData,
    area: PlotArea,
}

impl<'a> CoordinateMapper<'a> {
    pub fn new(reference: &'a ReferenceData, area: PlotArea) -> Self {
        CoordinateMapper { reference, area }
    }

    pub fn area(&self) -> PlotArea {
        self.area
    }

    pub fn horizontal_scale(&self, window: WindowKb) -> LinearScale {
        LinearScale::new(
            (window.start_bp() as f64, window.end_bp() as f64),
            (0.0, self.area.plot_width * RANGE_FRACTION),
        )
    }

    /// Known length of a chromosome, or the minimum-length threshold when unknown.
    pub fn chromosome_length(&self, chrom: &str, min_length_kb: u64) -> u64 {
        self.reference.chromosome_length(chrom).unwrap_or(min_length_kb)
    }

    pub fn max_chromosome_length(&self, chromosomes: &[String], min_length_kb: u64) -> u64 {
        chromosomes
            .iter()
            .map(|c| self.chromosome_length(c, min_length_kb))
            .max()
            .unwrap_or(min_length_kb)
    }

    pub fn vertical_layout(&self, chromosomes: &[String], fragments: &[Fragment]) -> VerticalLayout {
        let ordered = canonical_order(chromosomes);
        let count = ordered.len();
        if count == 0 {
            return VerticalLayout {
                bands: Vec::new(),
                partitions: Vec::new(),
                band_height: 0.0,
                partition_height: 0.0,
            };
        }

        let band_height = ((self.area.plot_height - (count - 1) as f64 * CHROMOSOME_PADDING)
            / count as f64)
            .max(0.0);
        let bands = ordered
            .into_iter()
            .enumerate()
            .map(|(i, chromosome)| Band {
                chromosome,
                y: i as f64 * (band_height + CHROMOSOME_PADDING),
                height: band_height,
            })
            .collect();

        let keys = partition_keys(fragments);
        let partition_height = if keys.is_empty() {
            0.0
        } else {
            band_height / keys.len() as f64
        };
        let partitions = keys
            .into_iter()
            .enumerate()
            .map(|(k, (individual_phase, haplotype))| Partition {
                individual_phase,
                haplotype,
                offset: k as f64 * partition_height,
                height: partition_height,
            })
            .collect::<Vec<_>>();

        debug!(
            "{} bands of {:.2}px, {} partitions of {:.2}px",
            count,
            band_height,
            partitions.len(),
            partition_height
        );

        VerticalLayout {
            bands,
            partitions,
            band_height,
            partition_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area() -> PlotArea {
        PlotArea::from_container(1000.0, 600.0)
    }

    #[test]
    fn test_canonical_order() {
        assert_eq!(canonical_order(&["2", "X", "1", "22"]), vec!["1", "2", "22", "X"]);
        assert_eq!(
            canonical_order(&["Y", "X", "MT", "3"]),
            vec!["3", "X", "Y", "MT"]
        );
    }

    #[test]
    fn test_plot_area() {
        let area = area();
        assert_eq!(area.width, 1010.0);
        assert_eq!(area.height, 600.0);
        assert_eq!(area.plot_width, 965.0);
        assert_eq!(area.plot_height, 490.0);
        assert_eq!(PlotArea::from_container(10.0, 10.0).plot_height, 0.0);
    }

    #[test]
    fn test_horizontal_scale() {
        let reference = ReferenceData::default();
        let mapper = CoordinateMapper::new(&reference, area());
        let scale = mapper.horizontal_scale(WindowKb { start: 0, end: 1000 });
        assert_eq!(scale.apply(0.0), 0.0);
        assert!((scale.apply(1_000_000.0) - 965.0 * 0.95).abs() < 1e-9);
        assert!((scale.apply(500_000.0) - 965.0 * 0.475).abs() < 1e-9);

        let degenerate = mapper.horizontal_scale(WindowKb { start: 5, end: 5 });
        assert!((degenerate.apply(1.0) - 965.0 * 0.475).abs() < 1e-9);
    }

    #[test]
    fn test_rescaling_preserves_order() {
        let reference = ReferenceData::default();
        let window = WindowKb { start: 100, end: 5000 };
        let segments = [(100_000u64, 150_000u64), (150_000, 150_001), (4_000_000, 6_000_000)];

        for width in [320.0, 800.0, 1920.0] {
            let mapper = CoordinateMapper::new(&reference, PlotArea::from_container(width, 500.0));
            let scale = mapper.horizontal_scale(window);
            let mut previous_end = f64::NEG_INFINITY;
            for (start, end) in segments {
                let (x0, x1) = (scale.apply(start as f64), scale.apply(end as f64));
                assert!(x0 < x1);
                assert!(x0 >= previous_end);
                previous_end = x1;
            }
        }
    }

    #[test]
    fn test_ticks() {
        let scale = LinearScale::new((0.0, 250_000_000.0), (0.0, 900.0));
        let ticks = scale.ticks(10);
        assert_eq!(ticks.first(), Some(&0.0));
        assert_eq!(ticks.last(), Some(&240_000_000.0));
        assert_eq!(ticks[1], 20_000_000.0);
        assert_eq!(LinearScale::new((3.0, 3.0), (0.0, 1.0)).ticks(10), vec![3.0]);
        assert_eq!(LinearScale::new((0.0, 1.0), (0.0, 1.0)).ticks(5).len(), 6);
        assert_eq!(LinearScale::new((900.0, 0.0), (0.0, 1.0)).ticks(3)[0], 800.0);
    }

    #[test]
    fn test_vertical_layout() {
        let reference = ReferenceData::default();
        let mapper = CoordinateMapper::new(&reference, area());
        let fragments = vec![
            Fragment::new("1", 0, 10, 0, "A"),
            Fragment::new("2", 0, 10, 1, "A"),
            Fragment::new("1", 5, 10, 0, "A"),
            Fragment::new("X", 0, 10, 0, "B"),
        ];
        let chromosomes: Vec<String> = vec!["X".into(), "1".into()];
        let layout = mapper.vertical_layout(&chromosomes, &fragments);

        assert_eq!(layout.bands.len(), 2);
        assert_eq!(layout.bands[0].chromosome, "1");
        assert_eq!(layout.band_height, 240.0);
        assert_eq!(layout.bands[1].y, 250.0);

        let keys: Vec<(&str, u8)> = layout
            .partitions
            .iter()
            .map(|p| (p.individual_phase.as_str(), p.haplotype))
            .collect();
        assert_eq!(keys, vec![("A", 0), ("A", 1), ("B", 0)]);
        assert_eq!(layout.partition_height, 80.0);

        let total: f64 = layout.partitions.iter().map(|p| p.height).sum();
        assert!(total <= layout.band_height + 1e-9);
        let last = layout.partitions.last().map(|p| p.offset + p.height).unwrap_or(0.0);
        assert!(last <= layout.band_height + 1e-9);
    }

    #[test]
    fn test_vertical_layout_degenerate() {
        let reference = ReferenceData::default();
        let mapper = CoordinateMapper::new(&reference, area());
        let empty = mapper.vertical_layout(&[], &[]);
        assert!(empty.bands.is_empty());

        let chromosomes: Vec<String> = vec!["1".into()];
        let no_fragments = mapper.vertical_layout(&chromosomes, &[]);
        assert_eq!(no_fragments.bands.len(), 1);
        assert!(no_fragments.partitions.is_empty());
    }

    #[test]
    fn test_chromosome_length_fallback() {
        let reference = ReferenceData::default();
        let mapper = CoordinateMapper::new(&reference, area());
        assert_eq!(mapper.chromosome_length("21", 50), 48_129_895);
        assert_eq!(mapper.chromosome_length("MT", 50), 50);
        let chromosomes: Vec<String> = vec!["21".into(), "MT".into(), "2".into()];
        assert_eq!(mapper.max_chromosome_length(&chromosomes, 50), 243_199_373);
    }
}
