//! Window geometry persistence
//!
//! Geometry lives in the config file so it can be read before any database
//! is open. Stored values are clamped to the screen actually present at
//! startup; a malformed value falls back to the default size.

use kestrel_storage::ConfigFile;

use crate::Result;

pub const DEFAULT_WIDTH: u32 = 1116;
pub const DEFAULT_HEIGHT: u32 = 690;

/// Height is capped below the full screen to leave room for the taskbar.
const HEIGHT_FRACTION: f64 = 0.97;

const WIDTH_KEY: &str = "Width";
const HEIGHT_KEY: &str = "Height";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowGeometry {
    pub width: u32,
    pub height: u32,
    pub maximized: bool,
}

pub struct WindowSettings {
    config: ConfigFile,
}

impl WindowSettings {
    pub fn new(config: ConfigFile) -> Self {
        Self { config }
    }

    pub fn save(&self, width: u32, height: u32) -> Result<()> {
        self.config.set(WIDTH_KEY, &width.to_string())?;
        self.config.set(HEIGHT_KEY, &height.to_string())?;
        Ok(())
    }

    /// Read the stored geometry, clamped to the available screen bounds.
    /// Reports maximized only when both dimensions sit at their clamp.
    pub fn read(&self, available_width: u32, available_height: u32) -> Result<WindowGeometry> {
        let mut width = parse_or_default(&self.config.get(WIDTH_KEY)?, DEFAULT_WIDTH);
        let mut height = parse_or_default(&self.config.get(HEIGHT_KEY)?, DEFAULT_HEIGHT);

        let max_height = (available_height as f64 * HEIGHT_FRACTION) as u32;
        if width > available_width {
            width = available_width;
        }
        if height > max_height {
            height = max_height;
        }

        Ok(WindowGeometry {
            width,
            height,
            maximized: width == available_width && height == max_height,
        })
    }
}

fn parse_or_default(value: &str, default: u32) -> u32 {
    match value.parse() {
        Ok(v) => v,
        Err(_) => {
            if !value.is_empty() {
                tracing::warn!(value, default, "malformed window dimension, using default");
            }
            default
        }
    }
}
