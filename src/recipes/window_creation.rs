use anyhow::Result;
use glium::{Display, Frame};

use crate::app::{FrameTime, Recipe};
use crate::config::AppConfig;

pub const TITLE: &str = "GL Cook Book - Window Creation";

/// Nothing but the clear color.
pub struct WindowCreation;

pub fn build(_display: &Display, _config: &AppConfig) -> Result<Box<dyn Recipe>> {
    Ok(Box::new(WindowCreation))
}

impl Recipe for WindowCreation {
    fn title(&self) -> &str {
        TITLE
    }

    fn draw(&self, _target: &mut Frame, _frame: &FrameTime) -> Result<()> {
        Ok(())
    }
}
