//! Chart rendering for a CTG trace: fixed axes, major grid, series as a polyline.

use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use std::path::Path;

use super::reader::CtgTrace;

/// Axis limits, grid spacing and canvas size shared by every chart.
pub struct ChartStyle;

impl ChartStyle {
    pub const X_MIN: f64 = 0.0;
    pub const X_MAX: f64 = 2500.0;
    pub const Y_MIN: f64 = 50.0;
    pub const Y_MAX: f64 = 200.0;
    pub const X_GRID_STEP: f64 = 30.0;
    pub const Y_GRID_STEP: f64 = 10.0;
    pub const WIDTH: u32 = 2500;
    pub const HEIGHT: u32 = 600;

    const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
    const GRID: Rgb<u8> = Rgb([220, 220, 220]);
    const SERIES: Rgb<u8> = Rgb([31, 119, 180]);
}

/// Pixel column for `x`, or None when outside the x axis.
fn to_px(x: f64) -> Option<i64> {
    if !(ChartStyle::X_MIN..ChartStyle::X_MAX).contains(&x) {
        return None;
    }
    let frac = (x - ChartStyle::X_MIN) / (ChartStyle::X_MAX - ChartStyle::X_MIN);
    Some((frac * f64::from(ChartStyle::WIDTH - 1)).round() as i64)
}

/// Pixel row for `y` (clamped to the y axis; row 0 is the top).
fn to_py(y: f64) -> i64 {
    let y = y.clamp(ChartStyle::Y_MIN, ChartStyle::Y_MAX);
    let frac = (y - ChartStyle::Y_MIN) / (ChartStyle::Y_MAX - ChartStyle::Y_MIN);
    ((1.0 - frac) * f64::from(ChartStyle::HEIGHT - 1)).round() as i64
}

fn put(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

/// Bresenham line between two pixel positions.
fn draw_line(img: &mut RgbImage, (x0, y0): (i64, i64), (x1, y1): (i64, i64), color: Rgb<u8>) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let (mut x, mut y, mut err) = (x0, y0, dx + dy);
    loop {
        put(img, x, y, color);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

fn draw_grid(img: &mut RgbImage) {
    let right = i64::from(img.width()) - 1;
    let bottom = i64::from(img.height()) - 1;
    let mut x = ChartStyle::X_MIN;
    while x < ChartStyle::X_MAX {
        if let Some(px) = to_px(x) {
            draw_line(img, (px, 0), (px, bottom), ChartStyle::GRID);
        }
        x += ChartStyle::X_GRID_STEP;
    }
    let mut y = ChartStyle::Y_MIN;
    while y <= ChartStyle::Y_MAX {
        let py = to_py(y);
        draw_line(img, (0, py), (right, py), ChartStyle::GRID);
        y += ChartStyle::Y_GRID_STEP;
    }
}

/// Draw `trace` onto a fresh canvas. Missing values and points outside the x axis break the line.
pub fn draw_trace(trace: &CtgTrace) -> RgbImage {
    let mut img =
        RgbImage::from_pixel(ChartStyle::WIDTH, ChartStyle::HEIGHT, ChartStyle::BACKGROUND);
    draw_grid(&mut img);

    let mut prev: Option<(i64, i64)> = None;
    for (x, y) in trace.points() {
        let pixel = match (to_px(x), y) {
            (Some(px), Some(y)) => (px, to_py(y)),
            _ => {
                prev = None;
                continue;
            }
        };
        match prev {
            Some(p) => draw_line(&mut img, p, pixel, ChartStyle::SERIES),
            None => put(&mut img, pixel.0, pixel.1, ChartStyle::SERIES),
        }
        prev = Some(pixel);
    }
    img
}

/// Render `trace` as a PNG at `path`.
pub fn render_trace(trace: &CtgTrace, path: &Path) -> Result<()> {
    draw_trace(trace)
        .save(path)
        .with_context(|| format!("save chart {}", path.display()))
}
