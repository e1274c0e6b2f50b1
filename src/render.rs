//! Chromosome tracks: backgrounds, labels, fragment rectangles and the axis.

use log::{debug, info};

use crate::color::{BLACK, WHITE};
use crate::filter::{FilterConfiguration, SegmentFilter};
use crate::fragment::Fragment;
use crate::layout::{CoordinateMapper, LinearScale, PlotArea};
use crate::legend::LegendRenderer;
use crate::reference::ReferenceData;
use crate::scale::{ColorScale, ColorScaleFactory};
use crate::surface::{Anchor, Layer, Paint, Shape, Surface};
use crate::tooltip::TooltipContent;

pub const PLACEHOLDER: &str = "No data to display yet.";

const LABEL_FONT_SIZE: f64 = 12.0;
const AXIS_FONT_SIZE: f64 = 10.0;
const TICK_LENGTH: f64 = 6.0;
const TICK_COUNT: usize = 10;

/// Counts from one render pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderSummary {
    pub tracks: usize,
    pub fragments: usize,
    pub legend_entries: usize,
}

/// `1234567` → `1,234,567`.
pub fn format_thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{}", rounded.abs() as u64);
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub struct TrackRenderer<'a> {
    mapper: CoordinateMapper<'a>,
}

impl<'a> TrackRenderer<'a> {
    pub fn new(mapper: CoordinateMapper<'a>) -> Self {
        TrackRenderer { mapper }
    }

    /// Draw every selected chromosome track and the axis below them.
    pub fn draw(
        &self,
        surface: &mut Surface,
        fragments: &[Fragment],
        config: &FilterConfiguration,
        colors: &ColorScale,
    ) -> RenderSummary {
        let area = self.mapper.area();
        let x_scale = self.mapper.horizontal_scale(config.window);
        let range_end = x_scale.range.1;
        surface.clip = Some((-1.0, -1.0, range_end + 2.0, area.plot_height + 2.0));

        let max_length = self
            .mapper
            .max_chromosome_length(&config.chromosomes, config.min_length_kb);
        debug!("Longest selected chromosome: {} bp", max_length);

        let layout = self.mapper.vertical_layout(&config.chromosomes, fragments);
        let filter = SegmentFilter::new(config);
        let mut summary = RenderSummary::default();

        for band in &layout.bands {
            let length = self.mapper.chromosome_length(&band.chromosome, config.min_length_kb);
            surface.push(
                Layer::Tracks,
                Shape::Rect {
                    x: 0.0,
                    y: band.y,
                    width: x_scale.apply(length as f64).max(0.0),
                    height: band.height,
                    fill: Paint::Solid(WHITE),
                    stroke: Some((BLACK, 1.0)),
                },
            );
            surface.push(
                Layer::Labels,
                Shape::Text {
                    x: -10.0,
                    y: band.y + band.height / 2.0,
                    text: band.chromosome.clone(),
                    anchor: Anchor::End,
                    font_size: LABEL_FONT_SIZE,
                    dy: 0.35,
                },
            );

            for partition in &layout.partitions {
                let key = (partition.individual_phase.as_str(), partition.haplotype);
                for fragment in filter.select_partition(fragments, &band.chromosome, key) {
                    let start_x = x_scale.apply(fragment.start as f64);
                    let end_x = x_scale.apply(fragment.end as f64);
                    surface.push_interactive(
                        Layer::Fragments,
                        Shape::Rect {
                            x: start_x,
                            y: band.y + partition.offset,
                            width: end_x - start_x,
                            height: partition.height,
                            fill: Paint::Solid(colors.color_of(fragment)),
                            stroke: None,
                        },
                        TooltipContent::from_fragment(fragment),
                    );
                    summary.fragments += 1;
                }
            }
            summary.tracks += 1;
        }

        draw_axis(surface, &x_scale, area.plot_height);
        summary
    }
}

fn draw_axis(surface: &mut Surface, scale: &LinearScale, y: f64) {
    let (r0, r1) = scale.range;
    surface.push(
        Layer::Axis,
        Shape::Line {
            x1: r0,
            y1: y,
            x2: r1,
            y2: y,
            stroke: BLACK,
            width: 1.0,
        },
    );

    for tick in scale.ticks(TICK_COUNT) {
        let x = scale.apply(tick);
        surface.push(
            Layer::Axis,
            Shape::Line {
                x1: x,
                y1: y,
                x2: x,
                y2: y + TICK_LENGTH,
                stroke: BLACK,
                width: 1.0,
            },
        );
        surface.push(
            Layer::Axis,
            Shape::Text {
                x,
                y: y + TICK_LENGTH + 3.0,
                text: format_thousands(tick),
                anchor: Anchor::Middle,
                font_size: AXIS_FONT_SIZE,
                dy: 0.71,
            },
        );
    }
}

/// Full redraw: clear the surface, then draw tracks, fragments, axis and legend.
///
/// An empty fragment list only shows the placeholder. When no fragment passes
/// the filters the tracks and axis are still drawn and the legend stays empty.
pub fn render(
    surface: &mut Surface,
    fragments: &[Fragment],
    config: &FilterConfiguration,
    reference: &ReferenceData,
    area: PlotArea,
) -> RenderSummary {
    surface.clear(area.width, area.height, (area.margin.left, area.margin.top));

    if fragments.is_empty() {
        info!("No fragments to draw");
        surface.placeholder = Some(PLACEHOLDER.to_string());
        return RenderSummary::default();
    }

    let colors = ColorScaleFactory::new(reference).derive(fragments, &config.color_by);
    let mapper = CoordinateMapper::new(reference, area);
    let mut summary = TrackRenderer::new(mapper).draw(surface, fragments, config, &colors);

    if summary.fragments > 0 {
        summary.legend_entries = LegendRenderer::new(area).draw(surface, &colors, config);
    }

    info!(
        "Drew {} tracks, {} fragments, {} legend entries",
        summary.tracks, summary.fragments, summary.legend_entries
    );
    summary
}
