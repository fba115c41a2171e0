use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// `room_viewer` - an interactive 3D portfolio room.
///
/// Orbit with the left mouse button, zoom with the wheel, and click a frame or
/// project card to open its link.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Optional JSON file describing the social links and project cards.
    ///
    /// When omitted, the built-in room contents are used.
    #[arg(long, env = "ROOM_CONFIG")]
    pub room: Option<PathBuf>,

    /// Edge length in pixels of the procedural ball texture.
    #[arg(long, env = "ROOM_TEXTURE_SIZE", default_value_t = 512)]
    pub texture_size: u32,

    /// Per-pixel jitter amplitude applied to the ball texture.
    #[arg(long, default_value_t = 3)]
    pub jitter: u8,

    /// Keep the office chair still.
    #[arg(long)]
    pub no_spin: bool,

    /// Initial window width in logical pixels.
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Initial window height in logical pixels.
    #[arg(long, default_value_t = 720)]
    pub height: u32,
}

impl Config {
    /// Loads the room file named by `--room`, or the defaults.
    pub fn room_config(&self) -> Result<RoomConfig> {
        match &self.room {
            Some(path) => RoomConfig::load(path),
            None => Ok(RoomConfig::default()),
        }
    }
}

/// A framed social link on the back wall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkFrame {
    pub label: String,
    pub url: String,
    /// Frame backing color (sRGB bytes).
    #[serde(default = "default_frame_color")]
    pub color: [u8; 3],
}

/// A card pinned to the whiteboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectCard {
    pub title: String,
    pub url: String,
}

/// Content of the room that is not geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    pub links: Vec<LinkFrame>,
    pub projects: Vec<ProjectCard>,
    /// Office chair spin speed in radians per second.
    pub chair_spin_rad_per_s: f32,
}

fn default_frame_color() -> [u8; 3] {
    [40, 40, 48]
}

impl Default for RoomConfig {
    fn default() -> Self {
        let link = |label: &str, url: &str, color: [u8; 3]| LinkFrame {
            label: label.into(),
            url: url.into(),
            color,
        };
        let card = |title: &str, url: &str| ProjectCard {
            title: title.into(),
            url: url.into(),
        };
        Self {
            links: vec![
                link("GitHub", "https://github.com/", [36, 41, 47]),
                link("LinkedIn", "https://www.linkedin.com/", [10, 102, 194]),
                link("X", "https://x.com/", [20, 20, 20]),
            ],
            projects: vec![
                card("Room Viewer", "https://github.com/"),
                card("Texture Lab", "https://github.com/"),
                card("Pointer Picking", "https://github.com/"),
                card("Portfolio", "https://github.com/"),
            ],
            chair_spin_rad_per_s: 0.6,
        }
    }
}

impl RoomConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading room config {}", path.display()))?;
        let cfg: RoomConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing room config {}", path.display()))?;
        log::info!(
            "Loaded room config {} ({} links, {} projects)",
            path.display(),
            cfg.links.len(),
            cfg.projects.len()
        );
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips() {
        let cfg = RoomConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: RoomConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg: RoomConfig =
            serde_json::from_str(r#"{ "links": [{ "label": "Blog", "url": "https://example.com" }] }"#)
                .unwrap();
        assert_eq!(cfg.links.len(), 1);
        assert_eq!(cfg.links[0].color, default_frame_color());
        assert_eq!(cfg.projects, RoomConfig::default().projects);
    }

    #[test]
    fn cli_defaults() {
        let cfg = Config::parse_from(["room_viewer"]);
        assert_eq!(cfg.texture_size, 512);
        assert_eq!(cfg.jitter, 3);
        assert!(!cfg.no_spin);
        assert!(cfg.room.is_none());
    }

    #[test]
    fn unreadable_file_is_an_error() {
        assert!(RoomConfig::load(Path::new("/definitely/not/here.json")).is_err());
    }
}
