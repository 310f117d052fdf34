//! SVG charts
//!
//! Small hand-written renderer for the few chart kinds the reports need:
//! stacked yearly bars, pie, multi-series lines.

use chrono::{Datelike, NaiveDate};
use kpub_store::AnnualCounts;

use crate::markdown::capitalize;

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 480.0;
const LEFT: f64 = 70.0;
const RIGHT: f64 = 20.0;
const TOP: f64 = 60.0;
const BOTTOM: f64 = 50.0;

const TEXT_COLOR: &str = "#333333";
const GRID_COLOR: &str = "#bdc3c7";

/// Bar colors per mission; the last one is reused for the extrapolation.
pub const MISSION_COLORS: [&str; 3] = ["#3498db", "#27ae60", "#95a5a6"];
pub const PIE_COLORS: [&str; 2] = ["#f39c12", "#18bc9c"];
const PALETTE: [&str; 20] = [
    "#1f77b4", "#aec7e8", "#ff7f0e", "#ffbb78", "#2ca02c", "#98df8a", "#d62728", "#ff9896",
    "#9467bd", "#c5b0d5", "#8c564b", "#c49c94", "#e377c2", "#f7b6d2", "#7f7f7f", "#c7c7c7",
    "#bcbd22", "#dbdb8d", "#17becf", "#9edae5",
];

/// Share of the year elapsed at `date`.
pub fn fraction_of_year_passed(date: NaiveDate) -> f64 {
    f64::from(date.ordinal()) / 365.2425
}

/// Papers still expected this year if the rate so far holds.
pub fn extrapolate(current_total: u64, fraction_of_year: f64) -> f64 {
    if fraction_of_year <= 0.0 {
        return 0.0;
    }
    (1.0 / fraction_of_year - 1.0) * current_total as f64
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Round the axis maximum up to a 1/2/5 step.
fn nice_axis(max: f64) -> (f64, f64) {
    if max <= 0.0 {
        return (1.0, 1.0);
    }
    let raw = max / 5.0;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 5.0, 10.0]
        .into_iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw)
        .unwrap_or(10.0 * magnitude)
        .max(1.0);
    ((max / step).ceil() * step, step)
}

struct Svg {
    body: String,
}

impl Svg {
    fn new() -> Self {
        let mut body = String::new();
        body.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{WIDTH}\" height=\"{HEIGHT}\" \
             viewBox=\"0 0 {WIDTH} {HEIGHT}\" font-family=\"Open Sans, sans-serif\">\n"
        ));
        body.push_str(&format!(
            "<rect width=\"{WIDTH}\" height=\"{HEIGHT}\" fill=\"white\"/>\n"
        ));
        Self { body }
    }

    fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: &str, opacity: f64) {
        self.body.push_str(&format!(
            "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{w:.2}\" height=\"{h:.2}\" fill=\"{fill}\" \
             fill-opacity=\"{opacity}\" stroke=\"#eeeeee\" stroke-width=\"0.5\"/>\n"
        ));
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str) {
        self.body.push_str(&format!(
            "<line x1=\"{x1:.2}\" y1=\"{y1:.2}\" x2=\"{x2:.2}\" y2=\"{y2:.2}\" stroke=\"{stroke}\" stroke-width=\"1\"/>\n"
        ));
    }

    fn text(&mut self, x: f64, y: f64, anchor: &str, size: u32, content: &str) {
        self.body.push_str(&format!(
            "<text x=\"{x:.2}\" y=\"{y:.2}\" text-anchor=\"{anchor}\" font-size=\"{size}\" fill=\"{TEXT_COLOR}\">{}</text>\n",
            escape(content)
        ));
    }

    fn polyline(&mut self, points: &[(f64, f64)], stroke: &str, width: f64) {
        let coords: Vec<String> = points.iter().map(|(x, y)| format!("{x:.2},{y:.2}")).collect();
        self.body.push_str(&format!(
            "<polyline points=\"{}\" fill=\"none\" stroke=\"{stroke}\" stroke-width=\"{width}\" stroke-linejoin=\"round\"/>\n",
            coords.join(" ")
        ));
    }

    fn path(&mut self, d: &str, fill: &str) {
        self.body.push_str(&format!(
            "<path d=\"{d}\" fill=\"{fill}\" stroke=\"white\" stroke-width=\"1\"/>\n"
        ));
    }

    fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: &str) {
        self.body.push_str(&format!(
            "<circle cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"{r:.2}\" fill=\"{fill}\"/>\n"
        ));
    }

    /// Horizontal legend above the plot area.
    fn legend(&mut self, entries: &[(String, &str)]) {
        let mut x = LEFT;
        for (label, color) in entries {
            self.rect(x, 18.0, 14.0, 14.0, color, 1.0);
            self.text(x + 20.0, 30.0, "start", 14, label);
            x += 34.0 + 8.0 * label.chars().count() as f64;
        }
    }

    /// Y grid with labels; returns the value-to-pixel scale.
    fn y_axis(&mut self, max: f64, label: &str) -> f64 {
        let (axis_max, step) = nice_axis(max);
        let plot_h = HEIGHT - TOP - BOTTOM;
        let scale = plot_h / axis_max;
        let mut v = 0.0;
        while v <= axis_max + step / 2.0 {
            let y = HEIGHT - BOTTOM - v * scale;
            self.line(LEFT, y, WIDTH - RIGHT, y, GRID_COLOR);
            self.text(LEFT - 8.0, y + 4.0, "end", 12, &format!("{v}"));
            v += step;
        }
        let cy = TOP + plot_h / 2.0;
        self.body.push_str(&format!(
            "<text x=\"16\" y=\"{cy:.2}\" text-anchor=\"middle\" font-size=\"14\" fill=\"{TEXT_COLOR}\" \
             transform=\"rotate(-90 16 {cy:.2})\">{}</text>\n",
            escape(label)
        ));
        scale
    }

    fn finish(mut self) -> String {
        self.body.push_str("</svg>\n");
        self.body
    }
}

/// Show at most ~20 year labels.
fn label_every(n: usize) -> usize {
    n.div_ceil(20).max(1)
}

/// Stacked bars of publications per year, one layer per mission in
/// configured order. `extrapolation` adds an `(year, expected)` bar on top
/// of that year's stack.
pub fn publication_rate_chart(counts: &AnnualCounts, extrapolation: Option<(i32, f64)>) -> String {
    let years = counts.years();
    let mut svg = Svg::new();
    if years.is_empty() {
        svg.text(WIDTH / 2.0, HEIGHT / 2.0, "middle", 16, "No data");
        return svg.finish();
    }

    let extra_for = |year: i32| match extrapolation {
        Some((y, expected)) if y == year => expected,
        _ => 0.0,
    };
    let max = years
        .iter()
        .map(|y| counts.total.get(y).copied().unwrap_or(0) as f64 + extra_for(*y))
        .fold(0.0, f64::max);
    let scale = svg.y_axis(max, "Publications per year");

    let slot = (WIDTH - LEFT - RIGHT) / years.len() as f64;
    let bar_w = slot * 0.75;
    let every = label_every(years.len());
    for (i, year) in years.iter().enumerate() {
        let x = LEFT + i as f64 * slot + (slot - bar_w) / 2.0;
        let mut bottom = 0.0;
        for (m, (_, series)) in counts.per_mission.iter().enumerate() {
            let value = series.get(year).copied().unwrap_or(0) as f64;
            if value > 0.0 {
                let y = HEIGHT - BOTTOM - (bottom + value) * scale;
                svg.rect(x, y, bar_w, value * scale, MISSION_COLORS[m % MISSION_COLORS.len()], 1.0);
            }
            bottom += value;
        }
        let extra = extra_for(*year);
        if extra > 0.0 {
            let y = HEIGHT - BOTTOM - (bottom + extra) * scale;
            svg.rect(x, y, bar_w, extra * scale, MISSION_COLORS[2], 0.6);
        }
        if i % every == 0 {
            svg.text(x + bar_w / 2.0, HEIGHT - BOTTOM + 20.0, "middle", 12, &year.to_string());
        }
    }

    let mut legend: Vec<(String, &str)> = counts
        .per_mission
        .iter()
        .enumerate()
        .map(|(m, (name, _))| (capitalize(name), MISSION_COLORS[m % MISSION_COLORS.len()]))
        .collect();
    if extrapolation.is_some() {
        legend.push(("Extrapolation".to_string(), MISSION_COLORS[2]));
    }
    svg.legend(&legend);
    svg.finish()
}

/// Pie chart with percentage labels, first slice starting at twelve
/// o'clock and going counter-clockwise.
pub fn pie_chart(slices: &[(String, u64)]) -> String {
    let mut svg = Svg::new();
    let total: u64 = slices.iter().map(|(_, n)| n).sum();
    if total == 0 {
        svg.text(WIDTH / 2.0, HEIGHT / 2.0, "middle", 16, "No data");
        return svg.finish();
    }

    let color = |i: usize| {
        PIE_COLORS
            .get(i)
            .copied()
            .unwrap_or(PALETTE[i % PALETTE.len()])
    };
    let (cx, cy, r) = (WIDTH / 2.0, TOP + (HEIGHT - TOP) / 2.0, (HEIGHT - TOP) / 2.0 - 20.0);
    let point = |angle: f64, radius: f64| (cx + radius * angle.cos(), cy - radius * angle.sin());

    let mut start = std::f64::consts::FRAC_PI_2;
    for (i, (_, n)) in slices.iter().enumerate() {
        if *n == 0 {
            continue;
        }
        let share = *n as f64 / total as f64;
        let sweep = share * std::f64::consts::TAU;
        let end = start + sweep;
        if *n == total {
            svg.circle(cx, cy, r, color(i));
        } else {
            let (x1, y1) = point(start, r);
            let (x2, y2) = point(end, r);
            let large = u8::from(sweep > std::f64::consts::PI);
            svg.path(
                &format!("M {cx:.2} {cy:.2} L {x1:.2} {y1:.2} A {r:.2} {r:.2} 0 {large} 0 {x2:.2} {y2:.2} Z"),
                color(i),
            );
        }
        let (lx, ly) = point(start + sweep / 2.0, r * 0.6);
        svg.text(lx, ly + 8.0, "middle", 24, &format!("{:.0}%", share * 100.0));
        start = end;
    }

    let legend: Vec<(String, &str)> = slices
        .iter()
        .enumerate()
        .map(|(i, (label, _))| (capitalize(label), color(i)))
        .collect();
    svg.legend(&legend);
    svg.finish()
}

/// One line of a line chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub points: Vec<(i32, f64)>,
}

impl Series {
    pub fn new(label: impl Into<String>, points: Vec<(i32, f64)>) -> Self {
        Self {
            label: label.into(),
            points,
        }
    }
}

/// Lines over years sharing one y axis.
pub fn line_chart(y_label: &str, series: &[Series]) -> String {
    let mut svg = Svg::new();
    let years = series.iter().flat_map(|s| s.points.iter().map(|(y, _)| *y));
    let (Some(first), Some(last)) = (years.clone().min(), years.max()) else {
        svg.text(WIDTH / 2.0, HEIGHT / 2.0, "middle", 16, "No data");
        return svg.finish();
    };
    let max = series
        .iter()
        .flat_map(|s| s.points.iter().map(|(_, v)| *v))
        .fold(0.0, f64::max);
    let scale = svg.y_axis(max, y_label);

    let span = f64::from((last - first).max(1));
    let plot_w = WIDTH - LEFT - RIGHT - 20.0;
    let x_of = |year: i32| LEFT + 10.0 + f64::from(year - first) / span * plot_w;

    let n_years = usize::try_from(last - first + 1).unwrap_or(1);
    let every = label_every(n_years);
    for (i, year) in (first..=last).enumerate() {
        if i % every == 0 {
            svg.text(x_of(year), HEIGHT - BOTTOM + 20.0, "middle", 12, &year.to_string());
        }
    }

    let mut legend = Vec::with_capacity(series.len());
    for (i, s) in series.iter().enumerate() {
        let color = PALETTE[(i * 2) % PALETTE.len()];
        let points: Vec<(f64, f64)> = s
            .points
            .iter()
            .map(|(year, v)| (x_of(*year), HEIGHT - BOTTOM - v * scale))
            .collect();
        svg.polyline(&points, color, 3.0);
        legend.push((s.label.clone(), color));
    }
    svg.legend(&legend);
    svg.finish()
}
