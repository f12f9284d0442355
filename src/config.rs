//! Application configuration
//!
//! Defaults match the demo scene. A handful of fields can be overridden from
//! the environment, see [`AppConfig::from_env`].

use log::warn;

pub const ENV_MAX_PIXEL_RATIO: &str = "LANTERN_MAX_PIXEL_RATIO";
pub const ENV_VSYNC: &str = "LANTERN_VSYNC";
pub const ENV_DAMPING: &str = "LANTERN_DAMPING";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub title: String,
    /// Initial logical window size
    pub size: (u32, u32),
    /// Upper bound applied to the device pixel ratio
    pub max_pixel_ratio: f64,
    pub clear_color: wgpu::Color,
    pub vsync: bool,
    /// Orbit damping factor; `None` disables damping
    pub damping: Option<f32>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Lantern".to_string(),
            size: (1200, 800),
            max_pixel_ratio: 2.0,
            clear_color: wgpu::Color::BLACK,
            vsync: true,
            damping: Some(0.05),
        }
    }
}

impl AppConfig {
    /// Defaults with overrides read from the process environment
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides looked up through `lookup`. Unparsable values are
    /// logged and ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_MAX_PIXEL_RATIO) {
            match raw.trim().parse::<f64>() {
                Ok(ratio) if ratio.is_finite() && ratio > 0.0 => self.max_pixel_ratio = ratio,
                _ => warn!("ignoring {}={:?}: expected a positive number", ENV_MAX_PIXEL_RATIO, raw),
            }
        }

        if let Some(raw) = lookup(ENV_VSYNC) {
            match parse_flag(&raw) {
                Some(flag) => self.vsync = flag,
                None => warn!("ignoring {}={:?}: expected a boolean", ENV_VSYNC, raw),
            }
        }

        if let Some(raw) = lookup(ENV_DAMPING) {
            match raw.trim().parse::<f32>() {
                Ok(factor) if factor == 0.0 => self.damping = None,
                Ok(factor) if factor > 0.0 && factor <= 1.0 => self.damping = Some(factor),
                _ => warn!("ignoring {}={:?}: expected a factor in [0, 1]", ENV_DAMPING, raw),
            }
        }

        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_owned();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    pub fn with_max_pixel_ratio(mut self, ratio: f64) -> Self {
        self.max_pixel_ratio = ratio;
        self
    }

    pub fn with_clear_color(mut self, color: wgpu::Color) -> Self {
        self.clear_color = color;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    pub fn with_damping(mut self, damping: Option<f32>) -> Self {
        self.damping = damping;
        self
    }

    pub fn present_mode(&self) -> wgpu::PresentMode {
        if self.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.size, (1200, 800));
        assert_eq!(config.max_pixel_ratio, 2.0);
        assert_eq!(config.damping, Some(0.05));
        assert!(config.vsync);
    }

    #[test]
    fn test_overrides_from_environment() {
        let config = AppConfig::default().with_overrides(lookup(&[
            (ENV_MAX_PIXEL_RATIO, "1.5"),
            (ENV_VSYNC, "off"),
            (ENV_DAMPING, "0.1"),
        ]));
        assert_eq!(config.max_pixel_ratio, 1.5);
        assert!(!config.vsync);
        assert_eq!(config.damping, Some(0.1));
        assert_eq!(config.present_mode(), wgpu::PresentMode::AutoNoVsync);
    }

    #[test]
    fn test_zero_damping_disables_it() {
        let config = AppConfig::default().with_overrides(lookup(&[(ENV_DAMPING, "0")]));
        assert_eq!(config.damping, None);
    }

    #[test]
    fn test_invalid_overrides_are_ignored() {
        let config = AppConfig::default().with_overrides(lookup(&[
            (ENV_MAX_PIXEL_RATIO, "-3"),
            (ENV_VSYNC, "maybe"),
            (ENV_DAMPING, "2.5"),
        ]));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_builders() {
        let config = AppConfig::default()
            .with_title("lights")
            .with_size(640, 480)
            .with_vsync(false)
            .with_damping(None);
        assert_eq!(config.title, "lights");
        assert_eq!(config.size, (640, 480));
        assert!(!config.vsync);
        assert_eq!(config.damping, None);
    }
}
