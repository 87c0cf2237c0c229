use std::error;
use std::fmt;
use std::str::FromStr;

use image::{Rgb, RgbImage, Rgba, RgbaImage};

use crate::cmap::{CmapError, Palette, SAMPLE_COUNT};
use crate::file::NumArray;
use crate::theme::{self, PlotInfo, Theme, ThemeError};


const DEFAULT_IM_SIZE: u32 = 1024;
const DOT_RADIUS: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlotKind {
    Area,
    Scatter,
}

impl PlotKind {
    // shared driver entry point: rasterize the array to <stem>.png and
    // write the matching snippet to <stem>.tex
    pub fn render(
        &self,
        arr: &NumArray,
        stem: &str,
        theme: &Theme,
        map: &Palette,
        cfg: &PlotConfig,
    ) -> Result<(), PlotError> {
        match self {
            PlotKind::Area => area(arr, stem, theme, map, cfg),
            PlotKind::Scatter => scatter(arr, stem, theme, map, cfg),
        }
    }
}

impl FromStr for PlotKind {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self, PlotError> {
        match s {
            "heat" | "area" => Ok(PlotKind::Area),
            "scatter" => Ok(PlotKind::Scatter),
            _ => Err(PlotError::BadStyle(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlotConfig {
    pub x_lim: Option<(f64, f64)>,
    pub y_lim: Option<(f64, f64)>,
    pub val_lim: Option<(f64, f64)>,
    pub x_label: String,
    pub y_label: String,
    // image path as seen from the TeX document, if it differs from stem
    pub tex_path: Option<String>,
    pub im_size: u32,
    pub extra: Vec<(String, String)>,
}

impl Default for PlotConfig {
    fn default() -> Self {
        PlotConfig {
            x_lim: None,
            y_lim: None,
            val_lim: None,
            x_label: "x".to_string(),
            y_label: "y".to_string(),
            tex_path: None,
            im_size: DEFAULT_IM_SIZE,
            extra: Vec::new(),
        }
    }
}

type Extents = ((f64, f64), (f64, f64), (f64, f64));

fn grid_extents(arr: &NumArray, cfg: &PlotConfig) -> Extents {
    let x_lim = cfg.x_lim.unwrap_or((0.0, arr.cols() as f64));
    let y_lim = cfg.y_lim.unwrap_or((0.0, arr.rows() as f64));
    let val_lim = cfg.val_lim.unwrap_or_else(|| arr.value_bounds());

    (x_lim, y_lim, val_lim)
}

fn cloud_extents(arr: &NumArray, cfg: &PlotConfig) -> Extents {
    let x_lim = cfg.x_lim.unwrap_or_else(|| arr.col_bounds(0));
    let y_lim = cfg.y_lim.unwrap_or_else(|| arr.col_bounds(1));
    let val_lim = cfg.val_lim.unwrap_or_else(|| arr.col_bounds(2));

    (x_lim, y_lim, val_lim)
}

fn area(
    arr: &NumArray,
    stem: &str,
    theme: &Theme,
    map: &Palette,
    cfg: &PlotConfig,
) -> Result<(), PlotError> {
    if arr.dim() != 2 || arr.values().is_empty() {
        return Err(PlotError::BadShape(
            "area plots require a nonempty 2d array".to_string(),
        ));
    }

    let (x_lim, y_lim, val_lim) = grid_extents(arr, cfg);

    let (rows, cols) = (arr.rows(), arr.cols());
    let mut img = RgbImage::new(cols as u32, rows as u32);

    // normalize into [0, 1] over the value range, one pixel per cell,
    // row 0 at the top
    let span = val_lim.1 - val_lim.0;
    for r in 0..rows {
        for c in 0..cols {
            let t = if span > 0.0 {
                ((arr.get(r, c) - val_lim.0) / span).min(1.0).max(0.0)
            } else {
                0.0
            };
            img.put_pixel(c as u32, r as u32, to_rgb(map.eval(t)));
        }
    }

    let img_path = format!("{}.png", stem);
    if let Err(e) = img.save(&img_path) {
        eprintln!("could not write image file {}: {}", img_path, e);
        return Ok(());
    }

    compose(stem, theme, map, cfg, x_lim, y_lim, val_lim)
}

fn scatter(
    arr: &NumArray,
    stem: &str,
    theme: &Theme,
    map: &Palette,
    cfg: &PlotConfig,
) -> Result<(), PlotError> {
    if arr.dim() != 2 || arr.cols() != 3 || arr.values().is_empty() {
        return Err(PlotError::BadShape(
            "scatter plots require a nonempty n x 3 array".to_string(),
        ));
    }

    let (x_lim, y_lim, val_lim) = cloud_extents(arr, cfg);

    // bare point cloud on a transparent canvas, no axes or frame
    let size = cfg.im_size.max(1);
    let mut img = RgbaImage::new(size, size);

    let x_span = x_lim.1 - x_lim.0;
    let y_span = y_lim.1 - y_lim.0;
    let v_span = val_lim.1 - val_lim.0;

    for i in 0..arr.rows() {
        let (x, y, v) = (arr.get(i, 0), arr.get(i, 1), arr.get(i, 2));

        // clip against the axis ranges
        if x < x_lim.0 || x > x_lim.1 || y < y_lim.0 || y > y_lim.1 {
            continue;
        }

        let half = (size - 1) as f64 / 2.0;
        let px = if x_span > 0.0 {
            (x - x_lim.0) / x_span * (size - 1) as f64
        } else {
            half
        };
        // flip y so the image appears in the familiar orientation
        let py = if y_span > 0.0 {
            (1.0 - (y - y_lim.0) / y_span) * (size - 1) as f64
        } else {
            half
        };

        let t = if v_span > 0.0 {
            ((v - val_lim.0) / v_span).min(1.0).max(0.0)
        } else {
            0.0
        };

        stamp(&mut img, px.round() as i64, py.round() as i64, to_rgba(map.eval(t)));
    }

    let img_path = format!("{}.png", stem);
    if let Err(e) = img.save(&img_path) {
        eprintln!("could not write image file {}: {}", img_path, e);
        return Ok(());
    }

    compose(stem, theme, map, cfg, x_lim, y_lim, val_lim)
}

fn compose(
    stem: &str,
    theme: &Theme,
    map: &Palette,
    cfg: &PlotConfig,
    x_lim: (f64, f64),
    y_lim: (f64, f64),
    val_lim: (f64, f64),
) -> Result<(), PlotError> {
    let info = PlotInfo {
        data_min: val_lim.0,
        data_max: val_lim.1,
        x_min: x_lim.0,
        x_max: x_lim.1,
        x_label: cfg.x_label.clone(),
        y_min: y_lim.0,
        y_max: y_lim.1,
        y_label: cfg.y_label.clone(),
        image_path: cfg.tex_path.clone().unwrap_or_else(|| stem.to_string()),
        colormap: map.sample(SAMPLE_COUNT)?.to_pgf(),
        extra: cfg.extra.clone(),
    };

    let rendered = theme::render(theme, &info)?;

    // a failed markup write leaves the image behind as degraded output
    let tex_path = format!("{}.tex", stem);
    if let Err(e) = theme::write_markup(&tex_path, &rendered) {
        eprintln!("{}", e);
    }

    Ok(())
}

// small filled disc, clipped at the canvas edges
fn stamp(img: &mut RgbaImage, cx: i64, cy: i64, color: Rgba<u8>) {
    for dx in -DOT_RADIUS..=DOT_RADIUS {
        for dy in -DOT_RADIUS..=DOT_RADIUS {
            if dx * dx + dy * dy > DOT_RADIUS * DOT_RADIUS {
                continue;
            }

            let (x, y) = (cx + dx, cy + dy);
            if x < 0 || y < 0 || x >= img.width() as i64 || y >= img.height() as i64 {
                continue;
            }

            img.put_pixel(x as u32, y as u32, color);
        }
    }
}

fn channel(v: f64) -> u8 {
    (v.min(1.0).max(0.0) * 255.0).round() as u8
}

fn to_rgb(c: [f64; 3]) -> Rgb<u8> {
    Rgb([channel(c[0]), channel(c[1]), channel(c[2])])
}

fn to_rgba(c: [f64; 3]) -> Rgba<u8> {
    Rgba([channel(c[0]), channel(c[1]), channel(c[2]), 255])
}

#[derive(Debug, Clone)]
pub enum PlotError {
    BadShape(String),
    BadStyle(String),
    Cmap(CmapError),
    Theme(ThemeError),
}

impl error::Error for PlotError {}

impl fmt::Display for PlotError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PlotError: ")?;
        match self {
            PlotError::BadShape(msg) => {
                write!(f, "bad array shape: {}", msg)
            }
            PlotError::BadStyle(s) => {
                write!(f, "unimplemented plot style: {}", s)
            }
            PlotError::Cmap(e) => {
                write!(f, "{}", e)
            }
            PlotError::Theme(e) => {
                write!(f, "{}", e)
            }
        }
    }
}

impl From<CmapError> for PlotError {
    fn from(e: CmapError) -> Self {
        PlotError::Cmap(e)
    }
}

impl From<ThemeError> for PlotError {
    fn from(e: ThemeError) -> Self {
        PlotError::Theme(e)
    }
}
