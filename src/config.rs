use std::env;
use std::path::{Path, PathBuf};

pub const WINDOW_WIDTH: u32 = 800;
pub const WINDOW_HEIGHT: u32 = 600;
pub const DEFAULT_TITLE: &str = "An OpenGL Cookbook.";
pub const DEFAULT_CLEAR_COLOR: (f32, f32, f32, f32) = (0.2, 0.3, 0.3, 1.0);

/// Environment variable that relocates the `assets/` directory.
pub const ASSETS_ENV: &str = "GL_COOKBOOK_ASSETS";
const DEFAULT_ASSET_ROOT: &str = "assets";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub vsync: bool,
    pub asset_root: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            width: WINDOW_WIDTH,
            height: WINDOW_HEIGHT,
            title: DEFAULT_TITLE.to_owned(),
            vsync: true,
            asset_root: PathBuf::from(DEFAULT_ASSET_ROOT),
        }
    }
}

impl AppConfig {
    /// Defaults with the asset root taken from the environment when set.
    pub fn from_env() -> Self {
        let mut config = AppConfig::default();
        if let Some(root) = env::var_os(ASSETS_ENV) {
            config.asset_root = PathBuf::from(root);
        }
        config
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_owned();
        self
    }

    pub fn asset<P: AsRef<Path>>(&self, relative: P) -> PathBuf {
        self.asset_root.join(relative)
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixed_window() {
        let config = AppConfig::default();
        assert_eq!((config.width, config.height), (800, 600));
        assert!(config.vsync);
        assert!((config.aspect_ratio() - 4.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn asset_paths_are_joined_to_root() {
        let config = AppConfig {
            asset_root: PathBuf::from("/tmp/res"),
            ..AppConfig::default()
        };
        assert_eq!(
            config.asset("shaders/lamp-vt.glsl"),
            PathBuf::from("/tmp/res/shaders/lamp-vt.glsl")
        );
    }

    #[test]
    fn title_override() {
        let config = AppConfig::default().with_title("GL Cook Book - Window Creation");
        assert_eq!(config.title, "GL Cook Book - Window Creation");
    }
}
