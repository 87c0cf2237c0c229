use std::error;
use std::fmt;
use std::path::Path;

mod builtin;
pub mod workspace;

#[cfg(test)]
mod tests;

// sample resolution used for the generated pgfplots declarations
pub const SAMPLE_COUNT: usize = 100;

// named continuous color scale defined by ordered control points
// positions and channels live in [0, 1]
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    name: String,
    points: Vec<(f64, [f64; 3])>,
}

impl Palette {
    pub fn new<T: ToString>(name: T, points: Vec<(f64, [f64; 3])>) -> Self {
        if points.is_empty() {
            panic!("palette requires at least one control point");
        }

        Palette {
            name: name.to_string(),
            points,
        }
    }

    // look the name up in the given workspace first, then among the built-ins
    pub fn resolve(name: &str, source: Option<&Path>) -> Result<Self, CmapError> {
        if let Some(path) = source {
            let ws = workspace::Workspace::load(path)?;
            if let Some(p) = ws.find_map(name) {
                return Ok(p);
            }
        }

        builtin::named(name).ok_or_else(|| CmapError::UnknownMap(name.to_string()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn eval(&self, t: f64) -> [f64; 3] {
        // clamp the query; scales that don't span [0, 1] hold their end colors
        let t = t.min(1.0).max(0.0);

        let first = self.points[0];
        let last = self.points[self.points.len() - 1];

        if t <= first.0 {
            return first.1;
        }
        if t >= last.0 {
            return last.1;
        }

        let mut prev = first;
        for &(p, c) in self.points.iter().skip(1) {
            if t <= p {
                let span = p - prev.0;
                if span <= 0.0 {
                    return c;
                }

                let f = (t - prev.0) / span;
                return [
                    lerp(prev.1[0], c[0], f),
                    lerp(prev.1[1], c[1], f),
                    lerp(prev.1[2], c[2], f),
                ];
            }
            prev = (p, c);
        }

        last.1
    }

    pub fn sample(&self, count: usize) -> Result<SampledPalette, CmapError> {
        if count < 2 {
            return Err(CmapError::BadSampleCount(count));
        }

        let colors = (0..count)
            .map(|i| self.eval(i as f64 / (count - 1) as f64))
            .collect();

        Ok(SampledPalette {
            name: self.name.clone(),
            colors,
        })
    }
}

fn lerp(a: f64, b: f64, f: f64) -> f64 {
    (a + (b - a) * f).min(1.0).max(0.0)
}

// fixed-resolution realization of a palette, sampled at evenly spaced
// positions with both endpoints included
#[derive(Debug, Clone, PartialEq)]
pub struct SampledPalette {
    name: String,
    colors: Vec<[f64; 3]>,
}

impl SampledPalette {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn colors(&self) -> &[[f64; 3]] {
        &self.colors
    }

    // pgfplots colormap declaration, one comma-terminated node per sample
    pub fn to_pgf(&self) -> String {
        let mut res = format!("colormap={{{}}}{{", self.name);

        let n = self.colors.len();
        for (i, c) in self.colors.iter().enumerate() {
            let pos = i as f64 / (n - 1) as f64;
            res += &format!("\n  rgb({}pt)=({},{},{}),", pos, c[0], c[1], c[2]);
        }

        res + "}"
    }
}

#[derive(Debug, Clone)]
pub enum CmapError {
    SourceNotFound(String),
    BadSource(String),
    UnknownMap(String),
    BadSampleCount(usize),
}

impl error::Error for CmapError {}

impl fmt::Display for CmapError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "CmapError: ")?;
        match self {
            CmapError::SourceNotFound(p) => {
                write!(f, "cannot open color workspace {}", p)
            }
            CmapError::BadSource(msg) => {
                write!(f, "bad color workspace: {}", msg)
            }
            CmapError::UnknownMap(n) => {
                write!(f, "unsupported colormap name: {}", n)
            }
            CmapError::BadSampleCount(c) => {
                write!(f, "invalid sample count: {} (need at least 2)", c)
            }
        }
    }
}
