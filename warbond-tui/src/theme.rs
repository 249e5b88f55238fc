//! Parrot/neon palette for the growth chart.
//!
//! # Color Palette
//! - **Background**: Near-black / deep charcoal
//! - **Accent**: Electric cyan (title, focus)
//! - **Muted**: Steel blue (axes, hints)
//! - **Series**: cycled per bond, brightest first

use ratatui::style::{Color, Style};

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    /// Near-black background (primary surface)
    pub background: Color,
    /// Electric cyan accent (title, border)
    pub accent: Color,
    /// Steel blue (axes, hints)
    pub muted: Color,
    /// Light gray (axis titles)
    pub text_secondary: Color,
    /// Line colors, cycled when there are more series than entries
    pub series: [Color; 8],
}

impl Default for Theme {
    fn default() -> Self {
        Self::parrot_neon()
    }
}

impl Theme {
    pub fn parrot_neon() -> Self {
        Self {
            background: Color::Rgb(18, 18, 20),
            accent: Color::Rgb(0, 255, 255),
            muted: Color::Rgb(100, 149, 237),
            text_secondary: Color::Rgb(170, 170, 170),
            series: [
                Color::Rgb(0, 255, 255),   // cyan
                Color::Rgb(0, 255, 128),   // neon green
                Color::Rgb(255, 20, 147),  // hot pink
                Color::Rgb(255, 140, 0),   // neon orange
                Color::Rgb(147, 112, 219), // cool purple
                Color::Rgb(255, 255, 0),   // yellow
                Color::Rgb(30, 144, 255),  // dodger blue
                Color::Rgb(255, 99, 71),   // tomato
            ],
        }
    }

    pub fn series_color(&self, index: usize) -> Color {
        self.series[index % self.series.len()]
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }
}
