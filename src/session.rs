//! Host-side view state: fetched fragments, the filter configuration, the
//! viewport, and the policy deciding when the surface is redrawn.
//!
//! Every fetch is tagged with a request generation. A response for anything
//! but the latest generation is dropped, so overlapping fetches can resolve
//! in any order without an older result overwriting a newer one.

use log::{debug, info, warn};

use crate::filter::FilterConfiguration;
use crate::fragment::{Error, Fragment, FragmentSource};
use crate::layout::PlotArea;
use crate::reference::ReferenceData;
use crate::render::{render, RenderSummary};
use crate::surface::Surface;
use crate::tooltip::{PointerEvent, TooltipState};

pub const LOADING: &str = "Loading...";

/// Inner padding of the plot container.
const CONTAINER_PADDING: f64 = 10.0;

/// Columns of a 12-column grid left to the plot while the sidebar shows.
const PLOT_COLUMNS_WITH_SIDEBAR: f64 = 9.0;

/// The plot container's size inside a viewport.
pub fn container_size(viewport: (f64, f64), sidebar_visible: bool) -> (f64, f64) {
    let (width, height) = viewport;
    let columns = if sidebar_visible { PLOT_COLUMNS_WITH_SIDEBAR } else { 12.0 };
    (
        (width * columns / 12.0 - 2.0 * CONTAINER_PADDING).max(0.0),
        (height - 2.0 * CONTAINER_PADDING).max(0.0),
    )
}

/// An issued fetch; hand `token` back to [`ViewSession::complete_fetch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub token: u64,
    pub individuals: Vec<String>,
}

pub struct ViewSession<S> {
    source: S,
    reference: ReferenceData,
    config: FilterConfiguration,
    fragments: Vec<Fragment>,
    viewport: (f64, f64),
    sidebar_visible: bool,
    loading: bool,
    generation: u64,
    surface: Surface,
    hovered: Option<usize>,
    tooltip: TooltipState,
}

impl<S: FragmentSource> ViewSession<S> {
    pub fn new(source: S, reference: ReferenceData, config: FilterConfiguration, viewport: (f64, f64)) -> Self {
        ViewSession {
            source,
            reference,
            config,
            fragments: Vec::new(),
            viewport,
            sidebar_visible: true,
            loading: false,
            generation: 0,
            surface: Surface::new(),
            hovered: None,
            tooltip: TooltipState::default(),
        }
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn config(&self) -> &FilterConfiguration {
        &self.config
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn tooltip(&self) -> &TooltipState {
        &self.tooltip
    }

    pub fn plot_area(&self) -> PlotArea {
        let (width, height) = container_size(self.viewport, self.sidebar_visible);
        PlotArea::from_container(width, height)
    }

    /// Start a fetch for the configured individuals.
    pub fn begin_fetch(&mut self) -> FetchRequest {
        self.generation += 1;
        self.loading = true;
        debug!("Issued fetch generation {}", self.generation);
        FetchRequest {
            token: self.generation,
            individuals: self.config.individuals.clone(),
        }
    }

    /// Accept the outcome of a fetch. Stale generations are discarded and
    /// return `None`; otherwise the surface is redrawn.
    ///
    /// A failed fetch leaves no fragments, so the placeholder is shown.
    pub fn complete_fetch(
        &mut self,
        token: u64,
        result: Result<Vec<Fragment>, Error>,
    ) -> Option<RenderSummary> {
        if token != self.generation {
            debug!("Discarding stale fetch generation {} (latest is {})", token, self.generation);
            return None;
        }
        self.loading = false;
        self.fragments = match result {
            Ok(fragments) => fragments,
            Err(e) => {
                warn!("Fetch failed: {}", e);
                Vec::new()
            }
        };
        Some(self.redraw())
    }

    /// Fetch from the session's source and redraw.
    pub fn apply_filters(&mut self) -> Option<RenderSummary> {
        let request = self.begin_fetch();
        let result = self.source.fetch(&request.individuals);
        self.complete_fetch(request.token, result)
    }

    /// Replace the configuration, redrawing if anything changed.
    pub fn update_config(&mut self, config: FilterConfiguration) -> Option<RenderSummary> {
        if config == self.config {
            return None;
        }
        self.config = config;
        Some(self.redraw())
    }

    pub fn resize(&mut self, width: f64, height: f64) -> Option<RenderSummary> {
        if (width, height) == self.viewport {
            return None;
        }
        self.viewport = (width, height);
        Some(self.redraw())
    }

    pub fn set_sidebar_visible(&mut self, visible: bool) -> Option<RenderSummary> {
        if visible == self.sidebar_visible {
            return None;
        }
        self.sidebar_visible = visible;
        Some(self.redraw())
    }

    /// Clear and rebuild the surface from the current state.
    pub fn redraw(&mut self) -> RenderSummary {
        self.hovered = None;
        self.tooltip = TooltipState::default();

        let area = self.plot_area();
        if self.loading {
            self.surface.clear(area.width, area.height, (area.margin.left, area.margin.top));
            self.surface.placeholder = Some(LOADING.to_string());
            return RenderSummary::default();
        }

        info!("Redrawing {} fragments at {}x{}", self.fragments.len(), area.width, area.height);
        render(&mut self.surface, &self.fragments, &self.config, &self.reference, area)
    }

    /// Feed a pointer position in surface coordinates, or `None` once the
    /// pointer has left the surface.
    pub fn pointer(&mut self, position: Option<(f64, f64)>) -> &TooltipState {
        let hit = position.and_then(|(x, y)| self.surface.hit_test(x, y).map(|h| (h.tooltip, x, y)));
        let event = match (hit, self.hovered) {
            (Some((tooltip, x, y)), Some(current)) if tooltip == current => Some(PointerEvent::Move { x, y }),
            (Some((tooltip, x, y)), _) => Some(PointerEvent::Enter { tooltip, x, y }),
            (None, Some(_)) => Some(PointerEvent::Leave),
            (None, None) => None,
        };
        if let Some(event) = event {
            self.tooltip.handle(event);
            self.hovered = hit.map(|(tooltip, _, _)| tooltip);
        }
        &self.tooltip
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{ColorAttribute, WindowKb};
    use crate::render::PLACEHOLDER;
    use crate::surface::Layer;
    use std::cell::Cell;

    struct FixedSource {
        fail: Cell<bool>,
    }

    impl FragmentSource for FixedSource {
        fn fetch(&self, individuals: &[String]) -> Result<Vec<Fragment>, Error> {
            if self.fail.get() {
                return Err(Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "offline")));
            }
            Ok(individuals
                .iter()
                .map(|i| {
                    Fragment::new("1", 1_000_000, 5_000_000, 0, i)
                        .with_ancestry("Neanderthal")
                        .with_confidence(0.9)
                })
                .collect())
        }
    }

    fn config() -> FilterConfiguration {
        FilterConfiguration {
            individuals: vec!["A_phased".to_string()],
            chromosomes: vec!["1".to_string()],
            ancestries: vec!["Neanderthal".to_string()],
            min_confidence: 0.5,
            min_length_kb: 50,
            window: WindowKb { start: 0, end: 250_000 },
            color_by: ColorAttribute::Ancestry,
        }
    }

    fn session() -> ViewSession<FixedSource> {
        let source = FixedSource { fail: Cell::new(false) };
        ViewSession::new(source, ReferenceData::default(), config(), (1200.0, 800.0))
    }

    #[test]
    fn test_container_size() {
        assert_eq!(container_size((1200.0, 800.0), true), (880.0, 780.0));
        assert_eq!(container_size((1200.0, 800.0), false), (1180.0, 780.0));
        assert_eq!(container_size((10.0, 10.0), true), (0.0, 0.0));
    }

    #[test]
    fn test_apply_filters_draws() {
        let mut session = session();
        let summary = session.apply_filters();
        assert_eq!(summary.map(|s| s.fragments), Some(1));
        assert!(!session.is_loading());
        assert_eq!(session.surface().layer(Layer::Fragments).count(), 1);
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut session = session();
        let first = session.begin_fetch();
        let second = session.begin_fetch();
        assert!(first.token < second.token);

        let late = vec![Fragment::new("1", 0, 1, 0, "old")];
        assert_eq!(session.complete_fetch(first.token, Ok(late)), None);
        assert!(session.is_loading());
        assert!(session.fragments().is_empty());

        let fresh = session.source.fetch(&second.individuals);
        let applied = session.complete_fetch(second.token, fresh);
        assert!(applied.is_some());
        assert!(!session.is_loading());
        assert_eq!(session.fragments()[0].individual_phase, "A_phased");
    }

    #[test]
    fn test_failed_fetch_shows_placeholder() {
        let mut session = session();
        session.apply_filters();
        session.source.fail.set(true);
        session.apply_filters();
        assert!(session.fragments().is_empty());
        assert!(!session.is_loading());
        assert_eq!(session.surface().placeholder.as_deref(), Some(PLACEHOLDER));
        assert!(session.surface().elements.is_empty());
    }

    #[test]
    fn test_redraw_while_loading() {
        let mut session = session();
        session.apply_filters();
        session.begin_fetch();
        session.resize(1000.0, 700.0);
        assert_eq!(session.surface().placeholder.as_deref(), Some(LOADING));
    }

    #[test]
    fn test_redraw_policy() {
        let mut session = session();
        session.apply_filters();

        assert!(session.update_config(config()).is_none());
        let mut changed = config();
        changed.min_confidence = 0.95;
        assert_eq!(session.update_config(changed).map(|s| s.fragments), Some(0));

        let mut changed = config();
        changed.color_by = ColorAttribute::Individual;
        assert!(session.update_config(changed).is_some());

        assert!(session.resize(1200.0, 800.0).is_none());
        assert!(session.resize(900.0, 800.0).is_some());
        assert_eq!(session.surface().width, 900.0 * 0.75 - 20.0 + 10.0);

        assert!(session.set_sidebar_visible(true).is_none());
        assert!(session.set_sidebar_visible(false).is_some());
        assert_eq!(session.surface().width, 900.0 - 20.0 + 10.0);
    }

    #[test]
    fn test_pointer_drives_tooltip() {
        let mut session = session();
        session.apply_filters();
        let area = session.plot_area();
        let rect = session.surface().layer(Layer::Fragments).find_map(|e| match e.shape {
            crate::surface::Shape::Rect { x, y, width, height, .. } => Some((x, y, width, height)),
            _ => None,
        });
        let (x, y, width, height) = rect.unwrap();
        let inside = (area.margin.left + x + width / 2.0, area.margin.top + y + height / 2.0);

        assert!(!session.pointer(None).is_visible());
        let state = *session.pointer(Some(inside));
        assert!(state.is_visible());
        assert_eq!(state.tooltip, Some(0));
        assert_eq!(state.transition_ms, 200);

        let moved = *session.pointer(Some((inside.0 + 1.0, inside.1)));
        assert_eq!(moved.left, inside.0 + 11.0);
        assert_eq!(moved.transition_ms, 200);

        let left = *session.pointer(Some((1.0, 1.0)));
        assert!(!left.is_visible());
        assert_eq!(left.transition_ms, 500);
    }
}
