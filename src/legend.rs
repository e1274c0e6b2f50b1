//! The legend row below the axis.

use crate::color::BLACK;
use crate::filter::{normalize_label, ColorAttribute, FilterConfiguration};
use crate::layout::PlotArea;
use crate::scale::{ColorScale, LegendEntry, ScaleMode};
use crate::surface::{estimate_text_width, Anchor, Gradient, GradientStop, Layer, Paint, Shape, Surface};

const OFFSET_BELOW_PLOT: f64 = 45.0;
const SWATCH_SIZE: f64 = 18.0;
const LABEL_GAP: f64 = 6.0;
const ENTRY_SPACING: f64 = 30.0;
const FONT_SIZE: f64 = 12.0;

const GRADIENT_MAX_WIDTH: f64 = 400.0;
const GRADIENT_WIDTH_FRACTION: f64 = 0.7;
const GRADIENT_STOPS: usize = 11;
const GRADIENT_ID: &str = "confidence-gradient";

pub struct LegendRenderer {
    area: PlotArea,
}

impl LegendRenderer {
    pub fn new(area: PlotArea) -> Self {
        LegendRenderer { area }
    }

    /// Draw the legend for `colors` and return how many entries were shown.
    pub fn draw(&self, surface: &mut Surface, colors: &ColorScale, config: &FilterConfiguration) -> usize {
        let y = self.area.plot_height + OFFSET_BELOW_PLOT;
        match colors.mode {
            ScaleMode::Discrete => {
                let entries = visible_entries(&colors.legend, config);
                self.draw_swatches(surface, &entries, y);
                entries.len()
            }
            ScaleMode::Continuous => {
                self.draw_gradient(surface, colors, y);
                colors.legend.len()
            }
        }
    }

    fn draw_swatches(&self, surface: &mut Surface, entries: &[&LegendEntry], y: f64) {
        let mut x = 0.0;
        for entry in entries {
            surface.push(
                Layer::Legend,
                Shape::Rect {
                    x,
                    y,
                    width: SWATCH_SIZE,
                    height: SWATCH_SIZE,
                    fill: Paint::Solid(entry.color),
                    stroke: None,
                },
            );
            let label_x = x + SWATCH_SIZE + LABEL_GAP;
            surface.push(
                Layer::Legend,
                Shape::Text {
                    x: label_x,
                    y: y + SWATCH_SIZE / 2.0,
                    text: entry.label.clone(),
                    anchor: Anchor::Start,
                    font_size: FONT_SIZE,
                    dy: 0.35,
                },
            );
            x = label_x + estimate_text_width(&entry.label, FONT_SIZE) + ENTRY_SPACING;
        }
    }

    fn draw_gradient(&self, surface: &mut Surface, colors: &ColorScale, y: f64) {
        let Some(scale) = colors.sequential() else {
            return;
        };
        let width = GRADIENT_MAX_WIDTH.min(self.area.plot_width * GRADIENT_WIDTH_FRACTION);
        let x = (self.area.plot_width - width) / 2.0;
        let (d0, d1) = scale.domain;

        let stops = (0..GRADIENT_STOPS)
            .map(|i| {
                let offset = i as f64 / (GRADIENT_STOPS - 1) as f64;
                GradientStop {
                    offset,
                    color: scale.color_at(d0 + offset * (d1 - d0)),
                }
            })
            .collect();
        let gradient = surface.add_gradient(Gradient {
            id: GRADIENT_ID.to_string(),
            stops,
        });

        surface.push(
            Layer::Legend,
            Shape::Rect {
                x,
                y,
                width,
                height: SWATCH_SIZE,
                fill: Paint::Gradient(gradient),
                stroke: Some((BLACK, 0.5)),
            },
        );

        let label_y = y + SWATCH_SIZE + 14.0;
        let ends = [(x, Anchor::Start, d0), (x + width, Anchor::End, d1)];
        for (label_x, anchor, value) in ends {
            surface.push(
                Layer::Legend,
                Shape::Text {
                    x: label_x,
                    y: label_y,
                    text: format!("{}", value),
                    anchor,
                    font_size: FONT_SIZE,
                    dy: 0.0,
                },
            );
        }
    }
}

/// Ancestry entries are limited to the selected ancestries; a selection may
/// name either the raw label or its long name.
fn visible_entries<'e>(legend: &'e [LegendEntry], config: &FilterConfiguration) -> Vec<&'e LegendEntry> {
    if config.color_by != ColorAttribute::Ancestry {
        return legend.iter().collect();
    }
    let selected: Vec<String> = config.ancestries.iter().map(|a| normalize_label(a)).collect();
    legend
        .iter()
        .filter(|e| {
            let key = normalize_label(&e.key);
            let label = normalize_label(&e.label);
            selected.iter().any(|s| *s == key || *s == label)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::WindowKb;
    use crate::fragment::Fragment;
    use crate::reference::ReferenceData;
    use crate::scale::ColorScaleFactory;

    fn config(color_by: ColorAttribute, ancestries: &[&str]) -> FilterConfiguration {
        FilterConfiguration {
            individuals: vec!["A".to_string()],
            chromosomes: vec!["1".to_string()],
            ancestries: ancestries.iter().map(|a| a.to_string()).collect(),
            min_confidence: 0.5,
            min_length_kb: 0,
            window: WindowKb { start: 0, end: 1000 },
            color_by,
        }
    }

    fn fragments() -> Vec<Fragment> {
        vec![
            Fragment::new("1", 0, 10, 0, "A").with_ancestry("Neanderthal"),
            Fragment::new("1", 0, 10, 0, "B").with_ancestry("nonDAVC"),
            Fragment::new("1", 0, 10, 0, "C").with_ancestry("Denisova"),
        ]
    }

    fn texts(surface: &Surface) -> Vec<String> {
        surface
            .layer(Layer::Legend)
            .filter_map(|e| match &e.shape {
                Shape::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_ancestry_legend_follows_selection() {
        let reference = ReferenceData::default();
        let area = PlotArea::from_container(1000.0, 600.0);
        let colors = ColorScaleFactory::new(&reference).derive(&fragments(), &ColorAttribute::Ancestry);
        let mut surface = Surface::new();

        let shown = LegendRenderer::new(area).draw(
            &mut surface,
            &colors,
            &config(ColorAttribute::Ancestry, &["neanderthal", "Non-DAVC"]),
        );
        assert_eq!(shown, 2);
        assert_eq!(texts(&surface), vec!["Neanderthal", "Non-DAVC"]);
    }

    #[test]
    fn test_swatches_advance_by_label_width() {
        let reference = ReferenceData::default();
        let area = PlotArea::from_container(1000.0, 600.0);
        let colors = ColorScaleFactory::new(&reference).derive(&fragments(), &ColorAttribute::Individual);
        let mut surface = Surface::new();

        let shown = LegendRenderer::new(area).draw(&mut surface, &colors, &config(ColorAttribute::Individual, &[]));
        assert_eq!(shown, 3);

        let xs: Vec<(f64, f64)> = surface
            .layer(Layer::Legend)
            .filter_map(|e| match &e.shape {
                Shape::Rect { x, y, .. } => Some((*x, *y)),
                _ => None,
            })
            .collect();
        // one-character labels are 7.2px wide
        assert_eq!(xs[0], (0.0, 535.0));
        assert!((xs[1].0 - (24.0 + 7.2 + 30.0)).abs() < 1e-9);
    }

    #[test]
    fn test_continuous_legend() {
        let reference = ReferenceData::default();
        let area = PlotArea::from_container(1000.0, 600.0);
        let colors = ColorScaleFactory::new(&reference)
            .derive(&fragments(), &ColorAttribute::MeanPosteriorProbability);
        let mut surface = Surface::new();

        let shown = LegendRenderer::new(area).draw(
            &mut surface,
            &colors,
            &config(ColorAttribute::MeanPosteriorProbability, &[]),
        );
        assert_eq!(shown, 2);
        assert_eq!(surface.gradients.len(), 1);
        assert_eq!(surface.gradients[0].stops.len(), 11);
        assert_eq!(texts(&surface), vec!["0.5", "1"]);

        let bar = surface
            .layer(Layer::Legend)
            .find_map(|e| match &e.shape {
                Shape::Rect { x, width, fill, .. } => Some((*x, *width, fill.clone())),
                _ => None,
            });
        // 965 * 0.7 exceeds the 400px cap
        assert_eq!(bar, Some((282.5, 400.0, Paint::Gradient(0))));
    }
}
