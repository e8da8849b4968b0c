//! The drivable car.
//!
//! A car is a dynamic Avian body carrying a [`Car`] component. The
//! [`skidpad::VehicleController`] inside it samples the keyboard and writes
//! wheel commands into the [`RaycastRig`] every frame; the rig turns those
//! into forces in the fixed physics step.

mod rig;
mod suspension;

use std::f32::consts::FRAC_PI_2;

use avian3d::prelude::*;
use bevy::prelude::*;
use leafwing_input_manager::prelude::*;
use skidpad::{CarConfig, DriveCommand, SpeedSampler, VehicleController};

pub use rig::{AvianRig, RaycastRig};

use crate::{SkidpadSystems, input::DemoAction};

/// Plugin that spawns and drives the car.
pub struct VehiclePlugin;

impl Plugin for VehiclePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ResetRequest>()
            .init_resource::<CarDefinition>()
            .add_systems(Startup, spawn_car)
            .add_systems(FixedPreUpdate, rig::raycast_vehicle_physics)
            .add_systems(
                Update,
                (
                    attach_raycast_rig,
                    request_reset_on_key.in_set(SkidpadSystems::Input),
                    drive_car.in_set(SkidpadSystems::Control),
                    (sample_speed, update_wheel_visuals).in_set(SkidpadSystems::Rigs),
                ),
            );
    }
}

// ============================================================================
// Components and resources
// ============================================================================

/// A drivable car.
#[derive(Component)]
pub struct Car {
    pub controller: VehicleController,
    pub config: CarConfig,
    /// Commands issued on the most recent control tick.
    pub last_command: DriveCommand,
}

/// Speed readout of a car.
#[derive(Component, Default)]
pub struct Speedometer(pub SpeedSampler);

/// Visual for one wheel, parented to the chassis.
#[derive(Component)]
struct WheelVisual {
    index: usize,
}

/// Car description used at spawn.
#[derive(Resource, Default, Clone, Debug)]
pub struct CarDefinition(pub CarConfig);

/// Monotonic reset counter observed by every car.
///
/// Each call to [`ResetRequest::request`] produces exactly one reset.
#[derive(Resource, Default, Debug)]
pub struct ResetRequest {
    counter: u64,
}

impl ResetRequest {
    pub fn request(&mut self) {
        self.counter += 1;
    }

    pub fn counter(&self) -> u64 {
        self.counter
    }
}

// ============================================================================
// Spawning
// ============================================================================

fn spawn_car(
    mut commands: Commands,
    definition: Res<CarDefinition>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let config = definition.0.clone();
    let controller = match VehicleController::new(&config) {
        Ok(controller) => controller,
        Err(e) => {
            tracing::error!("Not spawning car: {e}");
            return;
        }
    };

    let dimensions = &config.dimensions;
    let size = dimensions.chassis_size;
    let spawn = config.spawn_position();

    let body_mesh = meshes.add(Cuboid::new(size.x, size.y * 0.5, size.z));
    let cabin_mesh = meshes.add(Cuboid::new(size.x * 0.8, size.y * 0.4, size.z * 0.45));
    let wheel_mesh = meshes.add(Cylinder::new(dimensions.wheel_radius, dimensions.wheel_width));
    let paint = materials.add(StandardMaterial {
        base_color: Color::srgb(0.8, 0.1, 0.05),
        perceptual_roughness: 0.3,
        metallic: 0.6,
        ..default()
    });
    let glass = materials.add(StandardMaterial {
        base_color: Color::srgb(0.05, 0.05, 0.08),
        perceptual_roughness: 0.1,
        ..default()
    });
    let rubber = materials.add(StandardMaterial {
        base_color: Color::srgb(0.05, 0.05, 0.05),
        perceptual_roughness: 0.9,
        ..default()
    });

    let connection_points = config.wheel_connection_points();
    let allow_sleep = config.chassis.allow_sleep;
    let name = config.name.clone();

    let mut entity = commands.spawn((
        Name::new(name.clone()),
        Transform::from_translation(spawn),
        Visibility::default(),
        RigidBody::Dynamic,
        // Half height keeps the box off the ground over bumps.
        Collider::cuboid(size.x, size.y * 0.5, size.z),
        Mass(config.chassis.mass),
        NoAutoMass,
        LinearDamping(config.chassis.linear_damping),
        AngularDamping(config.chassis.angular_damping),
        Speedometer::default(),
        Car {
            controller,
            config,
            last_command: DriveCommand::default(),
        },
    ));
    if !allow_sleep {
        entity.insert(SleepingDisabled);
    }

    entity.with_children(|parent| {
        parent.spawn((
            Mesh3d(body_mesh),
            MeshMaterial3d(paint.clone()),
            Transform::IDENTITY,
        ));
        parent.spawn((
            Mesh3d(cabin_mesh),
            MeshMaterial3d(glass),
            Transform::from_xyz(0.0, size.y * 0.45, size.z * 0.05),
        ));
        for (index, point) in connection_points.into_iter().enumerate() {
            parent.spawn((
                WheelVisual { index },
                Mesh3d(wheel_mesh.clone()),
                MeshMaterial3d(rubber.clone()),
                Transform::from_translation(point).with_rotation(wheel_axle()),
            ));
        }
    });

    tracing::info!("Spawned {name} at {spawn}");
}

/// Rotation that lays the wheel cylinder on its side.
fn wheel_axle() -> Quat {
    Quat::from_rotation_z(FRAC_PI_2)
}

/// Hand a newly spawned car to the physics rig.
fn attach_raycast_rig(mut commands: Commands, query: Query<Entity, Added<Car>>) {
    for entity in &query {
        commands.entity(entity).insert(RaycastRig::default());
    }
}

// ============================================================================
// Control
// ============================================================================

fn request_reset_on_key(
    action_query: Query<&ActionState<DemoAction>>,
    mut request: ResMut<ResetRequest>,
) {
    let Ok(action_state) = action_query.single() else {
        return;
    };
    if action_state.just_pressed(&DemoAction::Reset) {
        request.request();
    }
}

/// Run the controller of every car against its rig, if the rig exists yet.
#[allow(clippy::type_complexity)]
fn drive_car(
    time: Res<Time>,
    reset: Res<ResetRequest>,
    mut query: Query<(
        &mut Car,
        Option<(
            &mut RaycastRig,
            &mut Transform,
            &mut Position,
            &mut Rotation,
            &mut LinearVelocity,
            &mut AngularVelocity,
        )>,
    )>,
) {
    let dt = time.delta_secs();

    for (mut car, body) in &mut query {
        let mut rig = body.map(
            |(rig, transform, position, rotation, linear_velocity, angular_velocity)| AvianRig {
                rig: rig.into_inner(),
                transform: transform.into_inner(),
                position: position.into_inner(),
                rotation: rotation.into_inner(),
                linear_velocity: linear_velocity.into_inner(),
                angular_velocity: angular_velocity.into_inner(),
            },
        );

        car.controller.observe_reset(reset.counter(), rig.as_mut());
        if let Some(command) = car.controller.tick(dt, rig.as_mut()) {
            car.last_command = command;
        }
    }
}

fn sample_speed(mut query: Query<(&LinearVelocity, &mut Speedometer)>) {
    for (velocity, mut speedometer) in &mut query {
        speedometer.0.record(velocity.0);
    }
}

/// Place wheel meshes at the end of their suspension, steered and spinning.
fn update_wheel_visuals(
    car_query: Query<(&Car, &RaycastRig, &Children)>,
    mut wheel_query: Query<(&WheelVisual, &mut Transform)>,
) {
    for (car, rig, children) in &car_query {
        let points = car.config.wheel_connection_points();
        for child in children.iter() {
            let Ok((wheel, mut transform)) = wheel_query.get_mut(child) else {
                continue;
            };
            let Some(state) = rig.wheels.get(wheel.index) else {
                continue;
            };
            transform.translation = points[wheel.index] - Vec3::Y * state.suspension_length;
            transform.rotation = Quat::from_rotation_y(state.steering)
                * Quat::from_rotation_x(-state.spin)
                * wheel_axle();
        }
    }
}
