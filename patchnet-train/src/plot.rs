use patchnet_core::PatchNetError;
use std::fmt::Write;
use std::path::Path;

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 480.0;
const MARGIN: f64 = 56.0;
const TICKS: usize = 5;

/// A titled scatter chart rendered to SVG.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPlot {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<(f64, f64)>,
}

impl ScatterPlot {
    /// Training curve: epochs on the x axis, mean minibatch cost on the y axis.
    pub fn cost_curve(points: Vec<(f64, f64)>) -> Self {
        ScatterPlot {
            title: "epochs vs cost".to_string(),
            x_label: "epochs".to_string(),
            y_label: "cost".to_string(),
            points,
        }
    }

    /// Renders the chart. Non-finite points are skipped; an empty or
    /// degenerate range is widened so the axes stay drawable.
    pub fn render(&self) -> String {
        let finite: Vec<(f64, f64)> = self
            .points
            .iter()
            .copied()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .collect();
        let (x_min, x_max) = bounds(finite.iter().map(|p| p.0));
        let (y_min, y_max) = bounds(finite.iter().map(|p| p.1));
        let plot_w = WIDTH - 2.0 * MARGIN;
        let plot_h = HEIGHT - 2.0 * MARGIN;
        let sx = |x: f64| MARGIN + (x - x_min) / (x_max - x_min) * plot_w;
        let sy = |y: f64| HEIGHT - MARGIN - (y - y_min) / (y_max - y_min) * plot_h;

        // Writing into a String cannot fail.
        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = WIDTH,
            h = HEIGHT
        );
        let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{}" text-anchor="middle" font-family="sans-serif" font-size="16">{}</text>"#,
            WIDTH / 2.0,
            MARGIN / 2.0,
            escape(&self.title)
        );
        let _ = writeln!(
            svg,
            r#"<g stroke="black" stroke-width="1"><line x1="{m}" y1="{b}" x2="{r}" y2="{b}"/><line x1="{m}" y1="{t}" x2="{m}" y2="{b}"/></g>"#,
            m = MARGIN,
            r = WIDTH - MARGIN,
            t = MARGIN,
            b = HEIGHT - MARGIN
        );
        for i in 0..=TICKS {
            let f = i as f64 / TICKS as f64;
            let xv = x_min + f * (x_max - x_min);
            let yv = y_min + f * (y_max - y_min);
            let _ = writeln!(
                svg,
                r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-family="sans-serif" font-size="10">{}</text>"#,
                sx(xv),
                HEIGHT - MARGIN + 14.0,
                tick_label(xv)
            );
            let _ = writeln!(
                svg,
                r#"<text x="{:.1}" y="{:.1}" text-anchor="end" font-family="sans-serif" font-size="10">{}</text>"#,
                MARGIN - 4.0,
                sy(yv) + 3.0,
                tick_label(yv)
            );
        }
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{}" text-anchor="middle" font-family="sans-serif" font-size="12">{}</text>"#,
            WIDTH / 2.0,
            HEIGHT - 12.0,
            escape(&self.x_label)
        );
        let _ = writeln!(
            svg,
            r#"<text x="14" y="{y}" text-anchor="middle" font-family="sans-serif" font-size="12" transform="rotate(-90 14 {y})">{}</text>"#,
            escape(&self.y_label),
            y = HEIGHT / 2.0
        );
        let _ = writeln!(svg, r#"<g fill="steelblue">"#);
        for &(x, y) in &finite {
            let _ = writeln!(svg, r#"<circle cx="{:.2}" cy="{:.2}" r="2"/>"#, sx(x), sy(y));
        }
        let _ = writeln!(svg, "</g>");
        svg.push_str("</svg>\n");
        svg
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PatchNetError> {
        let path = path.as_ref();
        std::fs::write(path, self.render()).map_err(|e| PatchNetError::io(path, e))
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() {
        (0.0, 1.0)
    } else if hi - lo < f64::EPSILON {
        (lo - 0.5, hi + 0.5)
    } else {
        (lo, hi)
    }
}

fn tick_label(v: f64) -> String {
    if v.abs() >= 100.0 {
        format!("{:.0}", v)
    } else {
        format!("{:.3}", v)
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
