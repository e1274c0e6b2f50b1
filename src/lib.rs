//! Chromosome-track rendering of genomic ancestry fragments.
//!
//! Fragments are filtered by a [`filter::FilterConfiguration`], laid out on one
//! horizontal track per chromosome with a slot per (individual, haplotype)
//! pair, colored by a scale derived from the fragment set, and drawn into a
//! [`surface::Surface`] that the [`svg`] and [`raster`] modules export.

pub mod color;
pub mod filter;
pub mod fragment;
pub mod layout;
pub mod legend;
pub mod raster;
pub mod reference;
pub mod render;
pub mod scale;
pub mod session;
pub mod surface;
pub mod svg;
pub mod tooltip;
