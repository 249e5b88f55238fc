//! Warbond TUI - terminal chart of compound bond growth
//!
//! Renders one line per bond:
//! - Value after each year at the bond's annual rate
//! - Legend `principal | rate%`
//! - Dismissed with `q`, `Esc` or `Enter`

pub mod chart;
pub mod theme;
pub mod viewer;

pub use chart::GrowthChart;
pub use theme::Theme;
pub use viewer::show;
