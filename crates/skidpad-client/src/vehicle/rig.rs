//! Raycast vehicle rig on top of Avian rigid bodies.
//!
//! The chassis is an ordinary dynamic body. Each wheel is a ray cast down
//! from its connection point; suspension, drive and tire friction forces are
//! converted to velocity changes every fixed step.

use avian3d::prelude::*;
use bevy::prelude::*;
use skidpad::{VehicleRig, config::WHEEL_COUNT};

use super::{
    Car,
    suspension::{
        GroundHit, WheelFrame, angular_velocity_change, box_inverse_inertia,
        grounded_wheel_forces, ray_length, wheel_spin_rate,
    },
};

/// Per-wheel rig state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WheelState {
    /// Engine force requested by the controller, in newtons.
    pub engine_force: f32,
    /// Steering angle requested by the controller, in radians.
    pub steering: f32,
    /// Current suspension length.
    pub suspension_length: f32,
    pub grounded: bool,
    /// Accumulated rolling angle, in radians.
    pub spin: f32,
    /// Rolling rate, in rad/s.
    pub spin_rate: f32,
}

/// Wheel state of a car whose rig is live in the physics world.
///
/// Attached one frame after the car is spawned; the controller treats a car
/// without this component as not ready.
#[derive(Component, Clone, Debug, Default)]
pub struct RaycastRig {
    pub wheels: [WheelState; WHEEL_COUNT],
}

impl RaycastRig {
    /// Number of wheels touching the ground.
    pub fn grounded_wheels(&self) -> usize {
        self.wheels.iter().filter(|w| w.grounded).count()
    }
}

// ============================================================================
// Controller adapter
// ============================================================================

/// Borrowed view of a car body that the controller drives.
///
/// Body mutations are written to both the Avian state and the `Transform`
/// so that a reset is visible in the same frame.
pub struct AvianRig<'a> {
    pub rig: &'a mut RaycastRig,
    pub transform: &'a mut Transform,
    pub position: &'a mut Position,
    pub rotation: &'a mut Rotation,
    pub linear_velocity: &'a mut LinearVelocity,
    pub angular_velocity: &'a mut AngularVelocity,
}

impl VehicleRig for AvianRig<'_> {
    fn apply_engine_force(&mut self, force: f32, wheel: usize) {
        if let Some(state) = self.rig.wheels.get_mut(wheel) {
            state.engine_force = force;
        }
    }

    fn set_steering_value(&mut self, angle: f32, wheel: usize) {
        if let Some(state) = self.rig.wheels.get_mut(wheel) {
            state.steering = angle;
        }
    }

    fn set_position(&mut self, position: Vec3) {
        self.position.0 = position;
        self.transform.translation = position;
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.rotation.0 = rotation;
        self.transform.rotation = rotation;
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.linear_velocity.0 = velocity;
    }

    fn set_angular_velocity(&mut self, angular_velocity: Vec3) {
        self.angular_velocity.0 = angular_velocity;
    }
}

// ============================================================================
// Physics
// ============================================================================

/// Apply wheel forces to every car with a live rig.
#[allow(clippy::type_complexity, clippy::cast_precision_loss)]
pub fn raycast_vehicle_physics(
    time: Res<Time<Fixed>>,
    spatial_query: Res<SpatialQueryPipeline>,
    mut query: Query<(
        Entity,
        &Car,
        &mut RaycastRig,
        &Position,
        &Rotation,
        &mut LinearVelocity,
        &mut AngularVelocity,
    )>,
) {
    let dt = time.delta_secs();
    if dt <= 0.0 {
        return;
    }

    for (entity, car, mut rig, position, rotation, mut linear_velocity, mut angular_velocity) in
        &mut query
    {
        let config = &car.config;
        let wheels = &config.wheels;
        let radius = config.dimensions.wheel_radius;
        let mass = config.chassis.mass;
        let max_length = ray_length(wheels, radius);

        let filter = SpatialQueryFilter::default().with_excluded_entities([entity]);
        let down = Dir3::new(rotation.0 * Vec3::NEG_Y).unwrap_or(Dir3::NEG_Y);

        // Cast every wheel first so friction can be shared between grounded wheels.
        let levers = config
            .wheel_connection_points()
            .map(|point| rotation.0 * point);
        let hits: [Option<GroundHit>; WHEEL_COUNT] = std::array::from_fn(|i| {
            spatial_query
                .cast_ray(position.0 + levers[i], down, max_length, true, &filter)
                .map(|hit| GroundHit {
                    distance: hit.distance,
                    normal: hit.normal,
                })
        });
        let grounded = hits.iter().filter(|hit| hit.is_some()).count();
        let mass_share = mass / grounded.max(1) as f32;

        let mut total_force = Vec3::ZERO;
        let mut total_torque = Vec3::ZERO;

        for (i, state) in rig.wheels.iter_mut().enumerate() {
            let frame = WheelFrame {
                lever: levers[i],
                chassis_rotation: rotation.0,
                steering: state.steering,
                point_velocity: linear_velocity.0 + angular_velocity.0.cross(levers[i]),
            };

            let forward_speed = if let Some(hit) = hits[i] {
                let forces = grounded_wheel_forces(
                    wheels,
                    radius,
                    mass,
                    mass_share,
                    &frame,
                    hit,
                    state.engine_force,
                    dt,
                );
                total_force += forces.force;
                total_torque += forces.torque;
                state.suspension_length = forces.suspension_length;
                forces.forward_speed
            } else {
                state.suspension_length =
                    wheels.suspension_rest_length + wheels.max_suspension_travel;
                0.0
            };

            state.grounded = hits[i].is_some();
            state.spin_rate = wheel_spin_rate(
                wheels,
                radius,
                state.grounded,
                forward_speed,
                state.engine_force,
                state.spin_rate,
            );
            state.spin = (state.spin + state.spin_rate * dt) % std::f32::consts::TAU;
        }

        linear_velocity.0 += total_force / mass * dt;
        let inverse_inertia = box_inverse_inertia(mass, config.dimensions.chassis_size);
        angular_velocity.0 += angular_velocity_change(total_torque, rotation.0, inverse_inertia, dt);
    }
}
