use anyhow::Result;
use serde::{Deserialize, Serialize};

/// RGBA, each component in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba_f(r: f32, g: f32, b: f32, a: f32) -> Color {
        Color { r, g, b, a }
    }
}

/// Tunables for how markings are placed and drawn. Distances are in meters, angles in degrees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkupConfig {
    pub dash_length: f64,
    pub dash_space: f64,
    pub dash_width: f64,
    /// Curves bending less than this are treated as straight, both when measuring arc length
    /// and when chopping up solid lines.
    pub min_angle_delta: f64,
    /// Solid lines are split into pieces no longer than this...
    pub max_solid_length: f64,
    /// ...unless a piece is already shorter than this.
    pub min_solid_length: f64,
    /// Edge length of the box around each marker point used for picking.
    pub marker_size: f64,
    pub dash_color: Color,
}

impl Default for MarkupConfig {
    fn default() -> MarkupConfig {
        MarkupConfig {
            dash_length: 1.5,
            dash_space: 1.5,
            dash_width: 0.15,
            min_angle_delta: 5.0,
            max_solid_length: 10.0,
            min_solid_length: 1.0,
            marker_size: 1.0,
            dash_color: Color::rgba_f(0.1, 0.1, 0.1, 0.5),
        }
    }
}

impl MarkupConfig {
    /// Reads a config from JSON. Missing fields get their default value.
    pub fn load(path: &str) -> Result<MarkupConfig> {
        let cfg: MarkupConfig = abstutil::read_json(path)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.dash_length > 0.0) {
            bail!("dash_length must be positive, not {}", self.dash_length);
        }
        if !(self.dash_space >= 0.0) {
            bail!("dash_space can't be negative, not {}", self.dash_space);
        }
        if !(self.dash_width > 0.0) {
            bail!("dash_width must be positive, not {}", self.dash_width);
        }
        // Solid lines are bisected until pieces drop below this, so it has to be positive.
        if !(self.min_solid_length > 0.0) {
            bail!(
                "min_solid_length must be positive, not {}",
                self.min_solid_length
            );
        }
        if !(self.max_solid_length >= self.min_solid_length) {
            bail!(
                "max_solid_length {} is less than min_solid_length {}",
                self.max_solid_length,
                self.min_solid_length
            );
        }
        if !(self.min_angle_delta >= 0.0) {
            bail!("min_angle_delta can't be negative, not {}", self.min_angle_delta);
        }
        if !(self.marker_size > 0.0) {
            bail!("marker_size must be positive, not {}", self.marker_size);
        }
        Ok(())
    }
}
