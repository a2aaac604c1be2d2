//! Session object: owns one assembled scene and reacts to pointer input and
//! chain progress.

use folio3d_anim::{ChainEvent, ChainState, Direction, Sequencer};
use folio3d_camera::{Camera, OrbitControls};
use folio3d_core::ObjectId;
use folio3d_fx::Fountain;
use folio3d_input::PointerEvent;
use folio3d_physics::{PhysicsClock, PhysicsWorld, RigidBody};
use folio3d_render::FrameView;
use folio3d_scene::assets::{load_font, AssetSource};
use folio3d_scene::Scene;
use folio3d_ui3d::{pointer_to_ndc, CursorStyle, InteractionRouter};
use glam::{Vec2, Vec3};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{SceneConfig, Variant};
use crate::menu_scene::{build_menu, build_pulse, MenuPhase, NavLink};
use crate::notify::Notifier;
use crate::room_scene::{build_room, Panel, RoomPhase};
use crate::state::{SceneState, Target};

/// Continuous rotation about local Y, in radians per second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spin {
    /// Object being rotated.
    pub object: ObjectId,
    /// Angular velocity in rad/s; negative turns clockwise seen from above.
    pub rate: f32,
}

/// Something observable that happened; headless runs write these to the trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ControllerEvent {
    HoverChanged {
        object: Option<ObjectId>,
        name: Option<String>,
    },
    Clicked {
        object: Option<ObjectId>,
        name: Option<String>,
    },
    ChainTriggered {
        chain: &'static str,
        reverse: bool,
    },
    TriggerRejected {
        chain: &'static str,
        reason: String,
    },
    ChainCancelled {
        chain: &'static str,
    },
    StageStarted {
        chain: &'static str,
        index: usize,
        label: &'static str,
    },
    StageCompleted {
        chain: &'static str,
        index: usize,
        label: &'static str,
    },
    ChainCompleted {
        chain: &'static str,
        reverse: bool,
    },
    FountainsActivated {
        count: usize,
    },
    ScaleHalved {
        object: ObjectId,
        scale: f32,
    },
    Notified {
        message: String,
    },
}

enum Behaviour {
    Menu {
        sphere: ObjectId,
        links: Vec<NavLink>,
        phase: MenuPhase,
    },
    Pulse {
        sphere: ObjectId,
    },
    Room {
        desk: Option<ObjectId>,
        panels: Vec<Panel>,
        phase: RoomPhase,
    },
}

/// One interactive session: the assembled scene plus everything that mutates it.
pub struct SceneController {
    variant: Variant,
    state: SceneState,
    behaviour: Behaviour,
    chain: Option<Sequencer<Target>>,
    spins: Vec<Spin>,
    fountains: Vec<Fountain>,
    orbit: OrbitControls,
    physics: PhysicsWorld,
    physics_clock: PhysicsClock,
    router: InteractionRouter,
    viewport: (u32, u32),
    cursor: CursorStyle,
    hovered: Option<ObjectId>,
    notifier: Box<dyn Notifier>,
    events: Vec<ControllerEvent>,
}

impl SceneController {
    /// Assemble the scene for `variant`. Asset problems are logged and
    /// degrade the scene; they never fail construction.
    pub fn new(
        variant: Variant,
        config: &SceneConfig,
        assets: &mut dyn AssetSource,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        let font = config
            .font
            .path
            .as_ref()
            .and_then(|path| match load_font(&config.asset_path(path)) {
                Ok(font) => Some(font),
                Err(err) => {
                    warn!(%err, "font failed to load, text textures will be blank");
                    None
                }
            });

        let mut physics = PhysicsWorld::new(Vec3::new(0.0, config.physics.gravity, 0.0));
        let (state, behaviour, chain, spins, fountains) = match variant {
            Variant::Menu => {
                let layout = build_menu(config, font.as_ref());
                let spin = Spin {
                    object: layout.sphere,
                    rate: config.motion.menu_spin,
                };
                let behaviour = Behaviour::Menu {
                    sphere: layout.sphere,
                    links: layout.links,
                    phase: MenuPhase::Closed,
                };
                (layout.state, behaviour, Some(layout.chain), vec![spin], Vec::new())
            }
            Variant::Pulse => {
                let layout = build_pulse(config, font.as_ref());
                let spin = Spin {
                    object: layout.sphere,
                    rate: config.motion.menu_spin,
                };
                let behaviour = Behaviour::Pulse {
                    sphere: layout.sphere,
                };
                (layout.state, behaviour, None, vec![spin], Vec::new())
            }
            Variant::Room => {
                let layout = build_room(config, assets);
                physics.add_body(RigidBody::fixed(
                    Vec3::new(0.0, -0.05, 0.0),
                    Vec3::new(6.0, 0.05, 6.0),
                ));
                let spin = Spin {
                    object: layout.sky,
                    rate: config.motion.sky_spin,
                };
                let behaviour = Behaviour::Room {
                    desk: layout.desk,
                    panels: layout.panels,
                    phase: RoomPhase::Idle,
                };
                (
                    layout.state,
                    behaviour,
                    Some(layout.chain),
                    vec![spin],
                    layout.fountains,
                )
            }
        };

        info!(
            %variant,
            objects = state.scene.len(),
            textures = state.scene.textures().len(),
            "scene assembled"
        );

        let mut controller = Self {
            variant,
            state,
            behaviour,
            chain,
            spins,
            fountains,
            orbit: OrbitControls::new(config.orbit.clone()),
            physics,
            physics_clock: PhysicsClock::new(&config.physics),
            router: InteractionRouter::new(),
            viewport: (config.window.width, config.window.height),
            cursor: CursorStyle::Default,
            hovered: None,
            notifier,
            events: Vec::new(),
        };
        controller.resize(controller.viewport);
        controller
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn scene(&self) -> &Scene {
        &self.state.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.state.camera
    }

    pub fn fountains(&self) -> &[Fountain] {
        &self.fountains
    }

    pub fn cursor(&self) -> CursorStyle {
        self.cursor
    }

    pub fn hovered(&self) -> Option<ObjectId> {
        self.hovered
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn physics_steps(&self) -> u64 {
        self.physics.steps_taken()
    }

    /// State of the scene's stage chain, if it has one.
    pub fn chain_state(&self) -> Option<ChainState> {
        self.chain.as_ref().map(Sequencer::state)
    }

    pub fn menu_phase(&self) -> Option<MenuPhase> {
        match &self.behaviour {
            Behaviour::Menu { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    pub fn room_phase(&self) -> Option<RoomPhase> {
        match &self.behaviour {
            Behaviour::Room { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    /// Short name of the current phase, for traces.
    pub fn phase_label(&self) -> &'static str {
        match &self.behaviour {
            Behaviour::Menu { phase, .. } => match phase {
                MenuPhase::Closed => "closed",
                MenuPhase::Shrinking => "shrinking",
                MenuPhase::Growing => "growing",
                MenuPhase::Rotating => "rotating",
                MenuPhase::Sliding => "sliding",
                MenuPhase::RevealingLinks => "revealing_links",
                MenuPhase::Open => "open",
                MenuPhase::ShrinkingBack => "shrinking_back",
            },
            Behaviour::Pulse { .. } => "pulse",
            Behaviour::Room { phase, .. } => match phase {
                RoomPhase::Idle => "idle",
                RoomPhase::Approaching => "approaching",
                RoomPhase::RevealingPanels => "revealing_panels",
                RoomPhase::Open => "open",
            },
        }
    }

    /// Take everything that happened since the last call.
    pub fn drain_events(&mut self) -> Vec<ControllerEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn frame_view(&self) -> FrameView<'_> {
        FrameView {
            scene: &self.state.scene,
            camera: &self.state.camera,
            fountains: &self.fountains,
        }
    }

    pub fn resize(&mut self, size: (u32, u32)) {
        self.viewport = size;
        self.state.camera.set_aspect(size.0, size.1);
        debug!(?size, "viewport resized");
    }

    /// Feed one frame's worth of orbit input.
    pub fn orbit_input(&mut self, drag: (f64, f64), wheel: f32) {
        if drag != (0.0, 0.0) {
            self.orbit.drag(drag.0 as f32, drag.1 as f32, self.viewport.1);
        }
        self.orbit.zoom(wheel);
    }

    pub fn pointer(&mut self, event: PointerEvent) {
        let (x, y) = event.position();
        let ndc = pointer_to_ndc(Vec2::new(x as f32, y as f32), self.viewport);
        match event {
            PointerEvent::Move { .. } => self.hover(ndc),
            PointerEvent::Click { .. } => self.click(ndc),
        }
    }

    /// Stop any running chain where it is.
    pub fn cancel_chains(&mut self) {
        let Some(chain) = self.chain.as_mut() else {
            return;
        };
        if !chain.cancel() {
            return;
        }
        let name = chain.name();
        info!(chain = name, "chain cancelled");
        match &mut self.behaviour {
            Behaviour::Menu { phase, links, .. } => {
                *phase = MenuPhase::Closed;
                // A closed menu must not leave links on screen or pickable.
                show_links(&mut self.state.scene, links, false);
                if self.hovered.is_some_and(|id| links.iter().any(|link| link.id == id)) {
                    self.hovered = None;
                    self.cursor = CursorStyle::Default;
                }
            }
            Behaviour::Room { phase, .. } => {
                *phase = RoomPhase::Idle;
                self.orbit.enabled = true;
            }
            Behaviour::Pulse { .. } => {}
        }
        self.events.push(ControllerEvent::ChainCancelled { chain: name });
    }

    fn candidates(&self) -> Vec<ObjectId> {
        match &self.behaviour {
            Behaviour::Menu { sphere, links, .. } => std::iter::once(*sphere)
                .chain(links.iter().map(|link| link.id))
                .collect(),
            Behaviour::Pulse { sphere } => vec![*sphere],
            Behaviour::Room { desk, panels, .. } => desk
                .iter()
                .copied()
                .chain(panels.iter().map(|panel| panel.id))
                .collect(),
        }
    }

    fn object_name(&self, id: Option<ObjectId>) -> Option<String> {
        id.and_then(|id| self.state.scene.object(id))
            .and_then(|object| object.name.clone())
    }

    fn hover(&mut self, ndc: Vec2) {
        let candidates = self.candidates();
        let outcome = self.router.hover(
            ndc,
            &self.state.camera,
            &mut self.state.scene,
            &candidates,
        );
        self.cursor = outcome.cursor;
        let hit = outcome.hit.map(|hit| hit.object);

        if let Behaviour::Room { panels, .. } = &self.behaviour {
            for panel in panels {
                if let Some(fountain) = self.fountains.get_mut(panel.fountain) {
                    fountain.visible = hit == Some(panel.id);
                }
            }
        }

        if hit != self.hovered {
            self.hovered = hit;
            let name = self.object_name(hit);
            debug!(?hit, ?name, "hover changed");
            self.events.push(ControllerEvent::HoverChanged { object: hit, name });
        }
    }

    fn click(&mut self, ndc: Vec2) {
        let candidates = self.candidates();
        let hit = self
            .router
            .pick(ndc, &self.state.camera, &self.state.scene, &candidates)
            .map(|hit| hit.object);
        let name = self.object_name(hit);
        debug!(?hit, ?name, "click");
        self.events.push(ControllerEvent::Clicked {
            object: hit,
            name: name.clone(),
        });
        let Some(hit) = hit else {
            return;
        };

        match &self.behaviour {
            Behaviour::Menu { sphere, links, .. } => {
                if hit == *sphere {
                    self.trigger_chain();
                } else if let Some(link) = links.iter().find(|link| link.id == hit) {
                    let message = format!("You clicked {}", link.name);
                    self.notifier.notify(&message);
                    self.events.push(ControllerEvent::Notified { message });
                }
            }
            Behaviour::Pulse { sphere } => {
                if hit == *sphere {
                    self.halve_scale(hit);
                }
            }
            Behaviour::Room { desk, .. } => {
                if Some(hit) == *desk {
                    self.trigger_chain();
                }
            }
        }
    }

    fn halve_scale(&mut self, id: ObjectId) {
        let Some(object) = self.state.scene.object_mut(id) else {
            return;
        };
        object.transform.scale *= 0.5;
        let scale = object.transform.scale.x;
        debug!(?id, scale, "scale halved");
        self.events.push(ControllerEvent::ScaleHalved { object: id, scale });
    }

    fn trigger_chain(&mut self) {
        let Some(chain) = self.chain.as_mut() else {
            return;
        };
        let name = chain.name();
        match chain.trigger() {
            Ok(direction) => {
                info!(chain = name, ?direction, "chain started");
                if matches!(self.behaviour, Behaviour::Room { .. }) {
                    // The approach tween owns the camera until the chain ends.
                    self.orbit.enabled = false;
                }
                self.events.push(ControllerEvent::ChainTriggered {
                    chain: name,
                    reverse: direction == Direction::Reverse,
                });
            }
            Err(err) => {
                debug!(%err, "trigger rejected");
                self.events.push(ControllerEvent::TriggerRejected {
                    chain: name,
                    reason: err.to_string(),
                });
            }
        }
    }

    /// Fixed-step physics for the time elapsed up to `now` (seconds).
    pub(crate) fn step_physics(&mut self, now: f64) -> u32 {
        self.physics_clock.step(&mut self.physics, now)
    }

    pub(crate) fn apply_spins(&mut self, dt: f32) {
        for spin in &self.spins {
            if let Some(object) = self.state.scene.object_mut(spin.object) {
                object.transform.rotation.y += spin.rate * dt;
            }
        }
    }

    pub(crate) fn update_fountains(&mut self, dt: f32) {
        for fountain in self.fountains.iter_mut().filter(|f| f.active) {
            fountain.update(dt);
        }
    }

    pub(crate) fn advance_chains(&mut self, dt: f32) {
        let Some(chain) = self.chain.as_mut() else {
            return;
        };
        let name = chain.name();
        let events = chain.advance(dt, &mut self.state);
        for event in events {
            self.on_chain_event(name, event);
        }
    }

    pub(crate) fn update_orbit(&mut self) {
        if self.orbit.enabled {
            self.orbit.update(&mut self.state.camera);
        }
    }

    fn on_chain_event(&mut self, chain: &'static str, event: ChainEvent) {
        match event {
            ChainEvent::StageStarted { index, label, .. } => {
                info!(chain, label, "stage started");
                match &mut self.behaviour {
                    Behaviour::Menu { phase, links, .. } => {
                        if let Some(next) = MenuPhase::for_stage(label) {
                            *phase = next;
                            if next.shows_links() {
                                show_links(&mut self.state.scene, links, true);
                            }
                        }
                    }
                    Behaviour::Room { phase, .. } => {
                        if let Some(next) = RoomPhase::for_stage(label) {
                            *phase = next;
                        }
                    }
                    Behaviour::Pulse { .. } => {}
                }
                self.events.push(ControllerEvent::StageStarted { chain, index, label });
            }
            ChainEvent::StageCompleted { index, label, .. } => {
                debug!(chain, label, "stage completed");
                self.events
                    .push(ControllerEvent::StageCompleted { chain, index, label });
            }
            ChainEvent::ChainCompleted { direction } => {
                let reverse = direction == Direction::Reverse;
                info!(chain, reverse, "chain completed");
                self.events
                    .push(ControllerEvent::ChainCompleted { chain, reverse });
                match &mut self.behaviour {
                    Behaviour::Menu { phase, links, .. } => {
                        if reverse {
                            *phase = MenuPhase::Closed;
                            show_links(&mut self.state.scene, links, false);
                        } else {
                            *phase = MenuPhase::Open;
                        }
                    }
                    Behaviour::Room { phase, .. } => {
                        *phase = RoomPhase::Open;
                        self.orbit.enabled = true;
                        for fountain in &mut self.fountains {
                            fountain.active = true;
                        }
                        let count = self.fountains.len();
                        info!(count, "fountains activated");
                        self.events.push(ControllerEvent::FountainsActivated { count });
                    }
                    Behaviour::Pulse { .. } => {}
                }
            }
        }
    }
}

/// Toggle link visibility; hidden links also drop back to their normal texture.
fn show_links(scene: &mut Scene, links: &[NavLink], visible: bool) {
    for link in links {
        let normal = scene
            .object(link.id)
            .and_then(|object| object.hover_textures)
            .map(|pair| pair.normal);
        if let Some(object) = scene.object_mut(link.id) {
            object.visible = visible;
        }
        if let (false, Some(normal)) = (visible, normal) {
            scene.set_texture(link.id, normal);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::LogNotifier;
    use folio3d_scene::assets::FsAssets;

    fn controller(variant: Variant) -> SceneController {
        let dir = std::env::temp_dir().join("folio3d-controller-missing-assets");
        let mut assets = FsAssets::new(dir);
        SceneController::new(
            variant,
            &SceneConfig::default(),
            &mut assets,
            Box::new(LogNotifier),
        )
    }

    #[test]
    fn spins_scale_with_elapsed_time() {
        let mut controller = controller(Variant::Pulse);
        let Behaviour::Pulse { sphere } = controller.behaviour else {
            panic!("pulse behaviour expected");
        };
        controller.apply_spins(0.5);
        controller.apply_spins(0.5);
        let rotation = controller.scene().object(sphere).unwrap().transform.rotation.y;
        assert!((rotation - -0.6).abs() < 1e-6);
    }

    #[test]
    fn room_without_assets_has_no_desk_to_click() {
        let mut controller = controller(Variant::Room);
        assert!(matches!(controller.behaviour, Behaviour::Room { desk: None, .. }));
        controller.pointer(PointerEvent::Click { x: 640.0, y: 360.0 });
        assert_eq!(controller.chain_state(), Some(ChainState::Idle));
        assert_eq!(controller.room_phase(), Some(RoomPhase::Idle));
    }

    #[test]
    fn resize_updates_camera_aspect() {
        let mut controller = controller(Variant::Menu);
        controller.resize((1000, 500));
        assert_eq!(controller.camera().aspect, 2.0);
        assert_eq!(controller.viewport(), (1000, 500));
    }

    #[test]
    fn cancel_without_running_chain_emits_nothing() {
        let mut controller = controller(Variant::Menu);
        controller.cancel_chains();
        assert!(controller.drain_events().is_empty());
    }
}
