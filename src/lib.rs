//! folio3d - interactive 3D portfolio scenes
//!
//! Scene assembly, the per-session controller and the frame loop shared by the
//! windowed binary and headless runs.

pub mod app;
pub mod config;
pub mod controller;
pub mod frame;
pub mod headless;
pub mod menu_scene;
pub mod notify;
pub mod room_scene;
pub mod scripted_input;
pub mod state;

pub use config::{SceneConfig, Variant};
pub use controller::{ControllerEvent, SceneController};
