//! One frame of the scene loop.

use anyhow::{Context, Result};
use folio3d_render::SceneRenderer;

use crate::controller::SceneController;

/// Advance the controller by one frame without drawing.
///
/// Order: physics at `now` (seconds since start), continuous spins, active
/// fountains, stage chains, orbit damping. Returns the physics steps taken.
pub fn advance(controller: &mut SceneController, now: f64, dt: f32) -> u32 {
    let steps = controller.step_physics(now);
    controller.apply_spins(dt);
    controller.update_fountains(dt);
    controller.advance_chains(dt);
    controller.update_orbit();
    steps
}

/// Advance one frame, then draw it.
pub fn run_frame(
    controller: &mut SceneController,
    renderer: &mut dyn SceneRenderer,
    now: f64,
    dt: f32,
) -> Result<u32> {
    let steps = advance(controller, now, dt);
    renderer
        .render(controller.frame_view())
        .context("Failed to render frame")?;
    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SceneConfig, Variant};
    use crate::notify::LogNotifier;
    use folio3d_render::NullRenderer;
    use folio3d_scene::assets::FsAssets;

    #[test]
    fn frames_step_physics_at_fixed_rate_and_render() {
        let mut assets = FsAssets::new(std::env::temp_dir().join("folio3d-frame-no-assets"));
        let mut controller = SceneController::new(
            Variant::Pulse,
            &SceneConfig::default(),
            &mut assets,
            Box::new(LogNotifier),
        );
        let mut renderer = NullRenderer::default();

        let dt = 1.0 / 60.0;
        let mut total = 0;
        for frame in 1..=60 {
            total += run_frame(&mut controller, &mut renderer, frame as f64 * dt as f64, dt).unwrap();
        }

        assert_eq!(renderer.frames, 60);
        assert!((57..=59).contains(&total), "took {total} physics steps");
        assert_eq!(controller.physics_steps(), u64::from(total));
    }
}
