//! Initial endpoint lists read from disk.
//!
//! Each row holds one rod as `x1, y1, x2, y2` in image pixels, typically
//! traced from a microscopy frame. Rows are scaled to microns by
//! `pixel_scale` and placed in the mid-plane of the box.

use anyhow::{bail, Context};
use glam::DVec3;
use std::path::Path;

pub type Endpoints = (DVec3, DVec3);

fn to_endpoints(row: [f64; 4], pixel_scale: f64, z: f64) -> Endpoints {
    let [x1, y1, x2, y2] = row;
    (
        DVec3::new(x1 / pixel_scale, y1 / pixel_scale, z),
        DVec3::new(x2 / pixel_scale, y2 / pixel_scale, z),
    )
}

/// Parses comma or whitespace separated rows. Blank lines and `#` comments are
/// skipped, as is a leading header row.
pub fn parse_endpoints_csv(text: &str, pixel_scale: f64, z: f64) -> anyhow::Result<Vec<Endpoints>> {
    let mut rods = Vec::new();
    for (n, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|f| !f.is_empty())
            .collect();
        let values: Result<Vec<f64>, _> = fields.iter().map(|f| f.parse::<f64>()).collect();
        let values = match values {
            Ok(v) => v,
            Err(_) if rods.is_empty() && n == 0 => continue,
            Err(e) => return Err(e).with_context(|| format!("line {}: {line}", n + 1)),
        };
        if values.len() != 4 {
            bail!("line {}: expected 4 values, found {}", n + 1, values.len());
        }
        rods.push(to_endpoints(
            [values[0], values[1], values[2], values[3]],
            pixel_scale,
            z,
        ));
    }
    Ok(rods)
}

/// Parses a JSON array of `[x1, y1, x2, y2]` rows.
pub fn parse_endpoints_json(text: &str, pixel_scale: f64, z: f64) -> anyhow::Result<Vec<Endpoints>> {
    let rows: Vec<[f64; 4]> = serde_json::from_str(text)?;
    Ok(rows
        .into_iter()
        .map(|row| to_endpoints(row, pixel_scale, z))
        .collect())
}

/// Loads an endpoint file, choosing the format by extension.
pub fn load_endpoints<P: AsRef<Path>>(
    path: P,
    pixel_scale: f64,
    z: f64,
) -> anyhow::Result<Vec<Endpoints>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading endpoint file {}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        parse_endpoints_json(&text, pixel_scale, z)
    } else {
        parse_endpoints_csv(&text, pixel_scale, z)
    }
}
