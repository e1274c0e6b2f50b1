//! The drawing surface: an ordered display list the renderers append to and
//! the exporters serialize.

use crate::color::Color;
use crate::tooltip::TooltipContent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Color),
    /// Index into [`Surface::gradients`].
    Gradient(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient in [0, 1].
    pub offset: f64,
    pub color: Color,
}

/// A horizontal linear gradient.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    pub id: String,
    pub stops: Vec<GradientStop>,
}

impl Gradient {
    /// Color at `t`, interpolated between the surrounding stops.
    pub fn color_at(&self, t: f64) -> Color {
        let Some(first) = self.stops.first() else {
            return crate::color::SENTINEL;
        };
        let mut previous = first;
        for stop in &self.stops {
            if t <= stop.offset {
                let span = stop.offset - previous.offset;
                let local = if span > 0.0 { (t - previous.offset) / span } else { 1.0 };
                return crate::color::interpolate_rgb(previous.color, stop.color, local);
            }
            previous = stop;
        }
        previous.color
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// Chromosome backgrounds; clipped.
    Tracks,
    /// Fragment rectangles; clipped.
    Fragments,
    Labels,
    Axis,
    Legend,
}

impl Layer {
    pub fn is_clipped(&self) -> bool {
        matches!(self, Layer::Tracks | Layer::Fragments)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Paint,
        stroke: Option<(Color, f64)>,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        anchor: Anchor,
        font_size: f64,
        /// Baseline shift in em.
        dy: f64,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        stroke: Color,
        width: f64,
    },
}

/// Pointer hooks attached to an element; they all act on one tooltip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hooks {
    /// Index into [`Surface::tooltips`].
    pub tooltip: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub layer: Layer,
    pub shape: Shape,
    pub hooks: Option<Hooks>,
}

/// The single drawing surface of a view.
#[derive(Debug, Clone, Default)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
    /// Translation from plot coordinates to surface coordinates.
    pub origin: (f64, f64),
    /// Plot-space rectangle (x, y, width, height) the track layers are clipped to.
    pub clip: Option<(f64, f64, f64, f64)>,
    pub elements: Vec<Element>,
    pub gradients: Vec<Gradient>,
    pub tooltips: Vec<TooltipContent>,
    /// Shown instead of the plot when there is nothing to draw.
    pub placeholder: Option<String>,
}

impl Surface {
    pub fn new() -> Self {
        Surface::default()
    }

    /// Drop everything drawn so far and resize.
    pub fn clear(&mut self, width: f64, height: f64, origin: (f64, f64)) {
        self.width = width;
        self.height = height;
        self.origin = origin;
        self.clip = None;
        self.elements.clear();
        self.gradients.clear();
        self.tooltips.clear();
        self.placeholder = None;
    }

    pub fn push(&mut self, layer: Layer, shape: Shape) {
        self.elements.push(Element { layer, shape, hooks: None });
    }

    /// Push a shape carrying pointer hooks for `tooltip`.
    pub fn push_interactive(&mut self, layer: Layer, shape: Shape, tooltip: TooltipContent) {
        let index = self.tooltips.len();
        self.tooltips.push(tooltip);
        self.elements.push(Element {
            layer,
            shape,
            hooks: Some(Hooks { tooltip: index }),
        });
    }

    pub fn add_gradient(&mut self, gradient: Gradient) -> usize {
        self.gradients.push(gradient);
        self.gradients.len() - 1
    }

    pub fn layer(&self, layer: Layer) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(move |e| e.layer == layer)
    }

    /// The topmost hooked element under a point given in surface coordinates.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<Hooks> {
        let (px, py) = (x - self.origin.0, y - self.origin.1);
        if let Some((cx, cy, cw, ch)) = self.clip {
            if px < cx || px > cx + cw || py < cy || py > cy + ch {
                return None;
            }
        }
        self.elements.iter().rev().find_map(|e| match (&e.shape, e.hooks) {
            (Shape::Rect { x, y, width, height, .. }, Some(hooks))
                if px >= *x && px <= x + width && py >= *y && py <= y + height =>
            {
                Some(hooks)
            }
            _ => None,
        })
    }
}

/// Approximate rendered width of `text`; no font metrics are available headless.
pub fn estimate_text_width(text: &str, font_size: f64) -> f64 {
    text.chars().count() as f64 * font_size * 0.6
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Color, BLACK, WHITE};

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Shape {
        Shape::Rect {
            x,
            y,
            width: w,
            height: h,
            fill: Paint::Solid(WHITE),
            stroke: None,
        }
    }

    #[test]
    fn test_clear_removes_everything() {
        let mut surface = Surface::new();
        surface.clear(100.0, 50.0, (5.0, 5.0));
        surface.push(Layer::Tracks, rect(0.0, 0.0, 10.0, 10.0));
        surface.push_interactive(Layer::Fragments, rect(0.0, 0.0, 10.0, 10.0), TooltipContent::default());
        surface.placeholder = Some("nothing".to_string());

        surface.clear(200.0, 80.0, (0.0, 0.0));
        assert!(surface.elements.is_empty());
        assert!(surface.tooltips.is_empty());
        assert!(surface.placeholder.is_none());
        assert_eq!(surface.width, 200.0);
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let mut surface = Surface::new();
        surface.clear(100.0, 100.0, (10.0, 20.0));
        surface.push_interactive(Layer::Fragments, rect(0.0, 0.0, 50.0, 10.0), TooltipContent::default());
        surface.push_interactive(Layer::Fragments, rect(20.0, 0.0, 10.0, 10.0), TooltipContent::default());
        surface.push(Layer::Legend, rect(0.0, 0.0, 100.0, 100.0));

        assert_eq!(surface.hit_test(15.0, 25.0), Some(Hooks { tooltip: 0 }));
        assert_eq!(surface.hit_test(35.0, 25.0), Some(Hooks { tooltip: 1 }));
        assert_eq!(surface.hit_test(95.0, 95.0), None);

        surface.clip = Some((0.0, 0.0, 10.0, 10.0));
        assert_eq!(surface.hit_test(35.0, 25.0), None);
    }

    #[test]
    fn test_gradient_color_at() {
        let gradient = Gradient {
            id: "g".to_string(),
            stops: vec![
                GradientStop { offset: 0.0, color: WHITE },
                GradientStop { offset: 1.0, color: BLACK },
            ],
        };
        assert_eq!(gradient.color_at(0.0), Color::Rgb(255, 255, 255));
        assert_eq!(gradient.color_at(0.5), Color::Rgb(128, 128, 128));
        assert_eq!(gradient.color_at(2.0), BLACK);
    }

    #[test]
    fn test_estimate_text_width() {
        assert_eq!(estimate_text_width("abcd", 10.0), 24.0);
        assert_eq!(estimate_text_width("", 12.0), 0.0);
    }
}
