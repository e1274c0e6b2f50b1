//! Tooltip content for a fragment and the pointer state machine driving it.

use crate::fragment::Fragment;

/// Offset from the pointer to the tooltip's top-left corner.
pub const POINTER_OFFSET: (f64, f64) = (10.0, -28.0);
pub const FADE_IN_MS: u32 = 200;
pub const FADE_OUT_MS: u32 = 500;
pub const VISIBLE_OPACITY: f64 = 0.9;

/// Labelled attribute rows, in display order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TooltipContent {
    pub rows: Vec<(&'static str, String)>,
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "null".to_string())
}

fn number(value: Option<f64>) -> String {
    value.map_or_else(|| "null".to_string(), |v| v.to_string())
}

impl TooltipContent {
    pub fn from_fragment(f: &Fragment) -> Self {
        let d = &f.details;
        let rows = vec![
            ("Individual", text(&d.individual)),
            ("Dataset", text(&d.dataset)),
            ("Region", text(&d.region)),
            ("Population", text(&d.population)),
            ("Chromosome", f.chromosome.clone()),
            ("Haplotype", f.haplotype.to_string()),
            ("Start", f.start.to_string()),
            ("End", f.end.to_string()),
            ("Length", f.length().to_string()),
            ("Mean Post. Prob.", number(f.confidence)),
            ("Called Seq.", number(d.called_sequence)),
            ("Mutation Rate", number(d.mutation_rate)),
            ("SNPs", number(d.snps)),
            ("Ancestry", text(&f.ancestry)),
            ("Min. Distance Ancestry", text(&d.min_distance_ancestry)),
            ("Min. Distance Value", number(d.min_distance_value)),
            ("Ancestry Z test", text(&d.z_test_ancestry)),
            ("Distance Z test", text(&d.z_test_distance)),
            ("P-val Z test", text(&d.z_test_pvalue)),
            ("Link. DAVC", number(d.linked_davc)),
            ("Admixt. Pop. Variants", number(d.admixed_pop_variants)),
            ("Vindija", number(d.vindija)),
            ("Chagyrskaya", number(d.chagyrskaya)),
            ("Altai", number(d.altai)),
            ("Denisova", number(d.denisova)),
            ("Private Vindija", number(d.private_vindija)),
            ("Private Chagyrskaya", number(d.private_chagyrskaya)),
            ("Private Altai", number(d.private_altai)),
            ("Private Denisova", number(d.private_denisova)),
            ("Shared Neanderthal", number(d.shared_neanderthal)),
            ("Shared Archaic", number(d.shared_archaic)),
            ("Sex", text(&d.sex)),
            ("Phase State", text(&d.phase_state)),
            ("Individual_Phase", f.individual_phase.clone()),
        ];
        TooltipContent { rows }
    }

    /// One `Label: value` per line.
    pub fn to_plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|(label, value)| format!("{}: {}", label, value))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Enter { tooltip: usize, x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Leave,
}

/// What the tooltip overlay should look like after an event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TooltipState {
    /// The tooltip whose content is shown; kept while fading out.
    pub tooltip: Option<usize>,
    pub left: f64,
    pub top: f64,
    pub target_opacity: f64,
    pub transition_ms: u32,
}

impl Default for TooltipState {
    fn default() -> Self {
        TooltipState {
            tooltip: None,
            left: 0.0,
            top: 0.0,
            target_opacity: 0.0,
            transition_ms: 0,
        }
    }
}

impl TooltipState {
    pub fn handle(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Enter { tooltip, x, y } => {
                self.tooltip = Some(tooltip);
                self.place(x, y);
                self.target_opacity = VISIBLE_OPACITY;
                self.transition_ms = FADE_IN_MS;
            }
            PointerEvent::Move { x, y } => self.place(x, y),
            PointerEvent::Leave => {
                self.target_opacity = 0.0;
                self.transition_ms = FADE_OUT_MS;
            }
        }
    }

    fn place(&mut self, x: f64, y: f64) {
        self.left = x + POINTER_OFFSET.0;
        self.top = y + POINTER_OFFSET.1;
    }

    pub fn is_visible(&self) -> bool {
        self.target_opacity > 0.0
    }
}
