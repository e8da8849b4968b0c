//! Input handling.
//!
//! Driving keys are level-triggered and go straight from Bevy's keyboard
//! messages into the car's [`skidpad::InputSampler`]. Everything else
//! (reset, camera toggle, UI toggle, orbit mouse controls) is a
//! `leafwing-input-manager` action.

use bevy::{
    input::{
        ButtonState,
        keyboard::{Key, KeyboardFocusLost, KeyboardInput},
    },
    prelude::*,
};
use bevy_egui::EguiContexts;
use leafwing_input_manager::{plugin::InputManagerSystem, prelude::*};

use crate::{SkidpadSystems, vehicle::Car};

// ============================================================================
// Actions
// ============================================================================

/// Non-driving actions.
#[derive(Actionlike, PartialEq, Eq, Hash, Clone, Copy, Debug, Reflect)]
pub enum DemoAction {
    /// Put the car back on the spawn point (R).
    Reset,
    /// Switch between orbit and follow cameras (C).
    ToggleCameraMode,
    /// Toggle UI visibility (Q).
    ToggleUi,
    /// Mouse movement for the orbit camera.
    #[actionlike(DualAxis)]
    Orbit,
    /// Held to orbit (left mouse button).
    OrbitDrag,
    /// Orbit camera zoom (scroll wheel).
    #[actionlike(Axis)]
    Zoom,
}

/// Create the default input map.
pub fn default_input_map() -> InputMap<DemoAction> {
    InputMap::default()
        .with(DemoAction::Reset, KeyCode::KeyR)
        .with(DemoAction::ToggleCameraMode, KeyCode::KeyC)
        .with(DemoAction::ToggleUi, KeyCode::KeyQ)
        .with_dual_axis(DemoAction::Orbit, MouseMove::default())
        .with(DemoAction::OrbitDrag, MouseButton::Left)
        .with_axis(DemoAction::Zoom, MouseScrollAxis::Y)
}

/// Keyboard-bound actions disabled while egui has keyboard focus.
const KEYBOARD_ACTIONS: &[DemoAction] = &[DemoAction::Reset, DemoAction::ToggleCameraMode];

/// Mouse-bound actions disabled while the pointer is over egui.
const MOUSE_ACTIONS: &[DemoAction] = &[DemoAction::Orbit, DemoAction::OrbitDrag, DemoAction::Zoom];

// ============================================================================
// Plugin
// ============================================================================

/// Plugin that registers actions, input focus management and drive key sampling.
pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(InputManagerPlugin::<DemoAction>::default())
            .add_systems(Startup, spawn_input_entity)
            .add_systems(
                PreUpdate,
                manage_input_focus.after(InputManagerSystem::Update),
            )
            .add_systems(Update, sample_drive_keys.in_set(SkidpadSystems::Input));
    }
}

fn spawn_input_entity(mut commands: Commands) {
    commands.spawn((
        Name::new("Input"),
        default_input_map(),
        ActionState::<DemoAction>::default(),
    ));
}

fn set_actions(action_state: &mut ActionState<DemoAction>, actions: &[DemoAction], enabled: bool) {
    for action in actions {
        if enabled {
            action_state.enable_action(action);
        } else {
            action_state.disable_action(action);
        }
    }
}

/// Disable actions that egui is currently consuming. `ToggleUi` stays enabled.
fn manage_input_focus(
    mut action_query: Query<&mut ActionState<DemoAction>>,
    mut contexts: EguiContexts,
) {
    let (wants_keyboard, wants_pointer) = contexts.ctx_mut().ok().map_or((false, false), |ctx| {
        (ctx.wants_keyboard_input(), ctx.is_pointer_over_area())
    });

    for mut action_state in &mut action_query {
        action_state.enable_action(&DemoAction::ToggleUi);
        set_actions(&mut action_state, KEYBOARD_ACTIONS, !wants_keyboard);
        set_actions(&mut action_state, MOUSE_ACTIONS, !wants_pointer);
    }
}

// ============================================================================
// Drive keys
// ============================================================================

/// Key name for a logical key, as understood by [`skidpad::DriveKey`].
pub fn key_name(key: &Key) -> Option<&str> {
    match key {
        Key::Character(c) => Some(c.as_str()),
        Key::ArrowUp => Some("ArrowUp"),
        Key::ArrowDown => Some("ArrowDown"),
        Key::ArrowLeft => Some("ArrowLeft"),
        Key::ArrowRight => Some("ArrowRight"),
        _ => None,
    }
}

/// Feed keyboard messages to every car's input sampler.
///
/// Keys are released when the window loses focus or egui takes the keyboard,
/// since the matching key-up would never arrive.
fn sample_drive_keys(
    mut keyboard: MessageReader<KeyboardInput>,
    mut focus_lost: MessageReader<KeyboardFocusLost>,
    mut contexts: EguiContexts,
    mut car_query: Query<&mut Car>,
) {
    let egui_wants_keyboard = contexts
        .ctx_mut()
        .ok()
        .is_some_and(|ctx| ctx.wants_keyboard_input());

    if focus_lost.read().count() > 0 || egui_wants_keyboard {
        keyboard.clear();
        for mut car in &mut car_query {
            car.controller.input_mut().release_all();
        }
        return;
    }

    for event in keyboard.read() {
        let Some(name) = key_name(&event.logical_key) else {
            continue;
        };
        for mut car in &mut car_query {
            let input = car.controller.input_mut();
            let response = match event.state {
                ButtonState::Pressed => input.key_down(name),
                ButtonState::Released => input.key_up(name),
            };
            // Browser defaults are already suppressed for the whole canvas;
            // see `prevent_default_event_handling` on the window.
            if response.prevent_default {
                tracing::trace!("Suppressing default action for {name}");
            }
        }
    }
}
