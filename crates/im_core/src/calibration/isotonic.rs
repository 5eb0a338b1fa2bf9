//! Piecewise-linear isotonic mapping on the 0..100 scale.

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Knot {
    pub x: f64,
    pub y: f64,
}

impl Knot {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Accepts either `"0:0,50:70,100:100"` or a list of `{x, y}` points.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum KnotInput {
    Text(String),
    Points(Vec<Knot>),
}

/// Monotone knot list with `(0,0)` and `(100,100)` present.
///
/// x is strictly increasing and y non-decreasing, so evaluation is
/// non-decreasing everywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "KnotInput", into = "Vec<Knot>")]
pub struct KnotList {
    knots: Vec<Knot>,
}

impl KnotList {
    pub fn new(points: Vec<Knot>) -> Result<Self, ConfigurationError> {
        for k in &points {
            if !k.x.is_finite() || !k.y.is_finite() {
                return Err(ConfigurationError::MalformedKnots(format!(
                    "non-finite knot ({}, {})",
                    k.x, k.y
                )));
            }
            if !(0.0..=100.0).contains(&k.x) || !(0.0..=100.0).contains(&k.y) {
                return Err(ConfigurationError::MalformedKnots(format!(
                    "knot ({}, {}) outside [0, 100]",
                    k.x, k.y
                )));
            }
        }
        for pair in points.windows(2) {
            if pair[1].x <= pair[0].x {
                return Err(ConfigurationError::MalformedKnots(format!(
                    "x must be strictly increasing ({} then {})",
                    pair[0].x, pair[1].x
                )));
            }
            if pair[1].y < pair[0].y {
                return Err(ConfigurationError::MalformedKnots(format!(
                    "y must be non-decreasing ({} then {})",
                    pair[0].y, pair[1].y
                )));
            }
        }

        let mut knots = points;
        if knots.first().map_or(true, |k| k.x > 0.0) {
            knots.insert(0, Knot::new(0.0, 0.0));
        }
        if knots.last().map_or(true, |k| k.x < 100.0) {
            knots.push(Knot::new(100.0, 100.0));
        }
        Ok(Self { knots })
    }

    /// Parse `"x:y,x:y,..."`. Whitespace around tokens is ignored.
    pub fn parse(text: &str) -> Result<Self, ConfigurationError> {
        let mut points = Vec::new();
        for token in text.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let (x, y) = token.split_once(':').ok_or_else(|| {
                ConfigurationError::MalformedKnots(format!("expected x:y, got '{token}'"))
            })?;
            let parse = |v: &str| {
                v.trim().parse::<f64>().map_err(|_| {
                    ConfigurationError::MalformedKnots(format!("'{v}' is not a number"))
                })
            };
            points.push(Knot::new(parse(x)?, parse(y)?));
        }
        Self::new(points)
    }

    pub fn identity() -> Self {
        Self { knots: vec![Knot::new(0.0, 0.0), Knot::new(100.0, 100.0)] }
    }

    pub fn knots(&self) -> &[Knot] {
        &self.knots
    }

    /// Linear interpolation between knots, clamped outside the knot range.
    pub fn evaluate(&self, x: f64) -> f64 {
        let (first, last) = match (self.knots.first(), self.knots.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => return x,
        };
        if x <= first.x {
            return first.y;
        }
        if x >= last.x {
            return last.y;
        }
        for seg in self.knots.windows(2) {
            let (a, b) = (seg[0], seg[1]);
            if x <= b.x {
                let t = (x - a.x) / (b.x - a.x);
                return a.y + t * (b.y - a.y);
            }
        }
        last.y
    }

    pub fn render(&self) -> String {
        self.knots
            .iter()
            .map(|k| format!("{}:{}", k.x, k.y))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl TryFrom<KnotInput> for KnotList {
    type Error = ConfigurationError;

    fn try_from(input: KnotInput) -> Result<Self, Self::Error> {
        match input {
            KnotInput::Text(text) => KnotList::parse(&text),
            KnotInput::Points(points) => KnotList::new(points),
        }
    }
}

impl From<KnotList> for Vec<Knot> {
    fn from(list: KnotList) -> Self {
        list.knots
    }
}

/// Pool-adjacent-violators over `(x, y, weight)` points sorted by x.
///
/// Returns one `(x, y)` per surviving block: x is the weight-averaged
/// position and y the weight-averaged value, non-decreasing in x.
pub fn pava(points: &[(f64, f64, f64)]) -> Vec<(f64, f64)> {
    let mut sorted: Vec<(f64, f64, f64)> =
        points.iter().copied().filter(|p| p.2 > 0.0).collect();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

    // (Σw·y, Σw, Σw·x)
    let mut blocks: Vec<(f64, f64, f64)> =
        sorted.iter().map(|&(x, y, w)| (w * y, w, w * x)).collect();

    let mut i = 0;
    while i + 1 < blocks.len() {
        let mean_i = blocks[i].0 / blocks[i].1;
        let mean_next = blocks[i + 1].0 / blocks[i + 1].1;
        if mean_i > mean_next {
            blocks[i].0 += blocks[i + 1].0;
            blocks[i].1 += blocks[i + 1].1;
            blocks[i].2 += blocks[i + 1].2;
            blocks.remove(i + 1);
            i = i.saturating_sub(1);
        } else {
            i += 1;
        }
    }

    blocks.iter().map(|b| (b.2 / b.1, b.0 / b.1)).collect()
}
