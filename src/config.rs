use anyhow::Result;
use folio3d_camera::OrbitSettings;
use folio3d_physics::PhysicsSettings;
use serde::{Deserialize, Serialize};
use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "config/scene.toml";

/// Which scene the application assembles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Spinning label sphere that opens a navigation panel.
    #[default]
    Menu,
    /// Furnished room; clicking the desk flies the camera in.
    Room,
    /// Bare sphere that halves its scale on every click.
    Pulse,
}

impl Variant {
    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Menu => "menu",
            Variant::Room => "room",
            Variant::Pulse => "pulse",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "menu" => Ok(Variant::Menu),
            "room" => Ok(Variant::Room),
            "pulse" => Ok(Variant::Pulse),
            other => Err(format!("unknown variant `{other}` (expected menu, room or pulse)")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SceneConfig {
    pub window: WindowSection,
    pub camera: CameraSection,
    pub orbit: OrbitSettings,
    pub physics: PhysicsSettings,
    pub motion: MotionSection,
    pub fountain: FountainSection,
    pub assets: AssetPaths,
    pub menu: MenuSection,
    pub font: FontSection,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WindowSection {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowSection {
    fn default() -> Self {
        Self {
            title: "folio3d".to_string(),
            width: 1280,
            height: 720,
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CameraSection {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Start position for the menu and pulse scenes.
    pub position: [f32; 3],
}

impl Default for CameraSection {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            position: [0.0, 0.0, 5.0],
        }
    }
}

/// Continuous spins, in radians per second.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MotionSection {
    pub menu_spin: f32,
    pub sky_spin: f32,
}

impl Default for MotionSection {
    fn default() -> Self {
        Self {
            menu_spin: -0.6,
            sky_spin: -0.06,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FountainSection {
    pub particle_count: usize,
    pub reset_offset: f32,
    /// Seed for particle placement; fountains derive their own streams from it.
    pub seed: u64,
}

impl Default for FountainSection {
    fn default() -> Self {
        Self {
            particle_count: 200,
            reset_offset: 0.5,
            seed: 0x5eed,
        }
    }
}

/// Asset paths, relative to `root` unless absolute.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetPaths {
    pub root: PathBuf,
    pub desk: PathBuf,
    pub game_system: PathBuf,
    pub portrait: PathBuf,
    pub art: PathBuf,
    pub sky: PathBuf,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
            desk: PathBuf::from("models/desk.glb"),
            game_system: PathBuf::from("models/game_system.glb"),
            portrait: PathBuf::from("me.jpg"),
            art: PathBuf::from("art.jpg"),
            sky: PathBuf::from("nova_sky.png"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MenuSection {
    /// Text wrapped around the menu sphere.
    pub label: String,
    /// Navigation links revealed once the panel is open.
    pub links: Vec<String>,
}

impl Default for MenuSection {
    fn default() -> Self {
        Self {
            label: "MENU.MENU.".to_string(),
            links: vec![
                "About".to_string(),
                "Projects".to_string(),
                "Contact".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FontSection {
    /// TrueType font for text textures; solid fallbacks are used without one.
    pub path: Option<PathBuf>,
}

impl SceneConfig {
    /// Load the scene configuration from the default path.
    pub fn load() -> Self {
        Self::load_from_path(Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<SceneConfig>(&contents) {
                Ok(cfg) => cfg.sanitized(),
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    SceneConfig::default()
                }
            },
            Err(err) => {
                if err.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                } else {
                    warn!("Scene config not found at {}. Using defaults", path.display());
                }
                SceneConfig::default()
            }
        }
    }

    fn sanitized(mut self) -> Self {
        if self.fountain.reset_offset.is_nan() || self.fountain.reset_offset < 0.0 {
            warn!(
                reset_offset = self.fountain.reset_offset,
                "fountain.reset_offset must be non-negative; using 0"
            );
            self.fountain.reset_offset = 0.0;
        }
        self
    }

    /// Save the configuration to an explicit path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        Ok(())
    }

    /// Resolve an asset path against `assets.root`.
    pub fn asset_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.assets.root.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let cfg: SceneConfig = toml::from_str(
            r#"
            [motion]
            menu_spin = -1.2

            [menu]
            links = ["Blog"]
            "#,
        )
        .unwrap();
        assert_eq!(cfg.motion.menu_spin, -1.2);
        assert_eq!(cfg.motion.sky_spin, MotionSection::default().sky_spin);
        assert_eq!(cfg.menu.links, vec!["Blog".to_string()]);
        assert_eq!(cfg.menu.label, "MENU.MENU.");
        assert_eq!(cfg.camera.position, [0.0, 0.0, 5.0]);
        assert_eq!(cfg.physics.step_frequency, 60.0);
    }

    #[test]
    fn missing_or_broken_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert_eq!(SceneConfig::load_from_path(&missing), SceneConfig::default());

        let broken = dir.path().join("broken.toml");
        fs::write(&broken, "[window\nwidth = ").unwrap();
        assert_eq!(SceneConfig::load_from_path(&broken), SceneConfig::default());
    }

    #[test]
    fn negative_fountain_offset_is_clamped_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.toml");
        fs::write(&path, "[fountain]\nreset_offset = -0.3\nparticle_count = 12\n").unwrap();
        let cfg = SceneConfig::load_from_path(&path);
        assert_eq!(cfg.fountain.reset_offset, 0.0);
        assert_eq!(cfg.fountain.particle_count, 12);
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/scene.toml");
        let mut cfg = SceneConfig::default();
        cfg.window.width = 640;
        cfg.font.path = Some(PathBuf::from("fonts/mono.ttf"));
        cfg.save_to_path(&path).unwrap();
        assert_eq!(SceneConfig::load_from_path(&path), cfg);
    }

    #[test]
    fn variant_parses_case_insensitively() {
        assert_eq!("Room".parse::<Variant>(), Ok(Variant::Room));
        assert_eq!("pulse".parse::<Variant>(), Ok(Variant::Pulse));
        assert!("desk".parse::<Variant>().is_err());
        assert_eq!(Variant::Menu.to_string(), "menu");
    }
}
