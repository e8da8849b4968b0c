//! Raycast wheel force calculations.
//!
//! Pure functions that can be tested in isolation without Bevy dependencies.
//! All forces are in world space; the caller turns them into velocity changes.

use glam::{Quat, Vec3};
use skidpad::WheelSuspension;

/// Result of a downward wheel ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundHit {
    /// Distance from the connection point to the ground.
    pub distance: f32,
    /// Ground normal.
    pub normal: Vec3,
}

/// Per-wheel values needed to compute forces.
#[derive(Clone, Copy, Debug)]
pub struct WheelFrame {
    /// Connection point relative to the chassis center, in world space.
    pub lever: Vec3,
    /// Chassis rotation.
    pub chassis_rotation: Quat,
    /// Steering angle in radians; positive turns left.
    pub steering: f32,
    /// Chassis velocity at the connection point.
    pub point_velocity: Vec3,
}

/// Forces produced by one grounded wheel.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WheelForces {
    /// Suspension length after clamping to the travel limits.
    pub suspension_length: f32,
    /// Suspension force magnitude along the ground normal.
    pub suspension_force: f32,
    /// Total force on the chassis.
    pub force: Vec3,
    /// Torque about the chassis center.
    pub torque: Vec3,
    /// Wheel speed along its rolling direction.
    pub forward_speed: f32,
}

/// Length of the ray cast below each connection point.
pub fn ray_length(wheels: &WheelSuspension, wheel_radius: f32) -> f32 {
    wheels.suspension_rest_length + wheels.max_suspension_travel + wheel_radius
}

/// Suspension length for a ground hit, clamped to the travel limits.
pub fn suspension_length(wheels: &WheelSuspension, wheel_radius: f32, distance: f32) -> f32 {
    let min = (wheels.suspension_rest_length - wheels.max_suspension_travel).max(0.0);
    let max = wheels.suspension_rest_length + wheels.max_suspension_travel;
    (distance - wheel_radius).clamp(min, max)
}

/// Spring-damper force, scaled by chassis mass and clamped to
/// `[0, max_suspension_force]`.
///
/// `closing_speed` is positive while the suspension compresses.
pub fn suspension_force(
    wheels: &WheelSuspension,
    compression: f32,
    closing_speed: f32,
    chassis_mass: f32,
) -> f32 {
    let damping = if closing_speed > 0.0 {
        wheels.damping_compression
    } else {
        wheels.damping_relaxation
    };
    let force =
        (wheels.suspension_stiffness * compression + damping * closing_speed) * chassis_mass;
    force.clamp(0.0, wheels.max_suspension_force)
}

/// Direction `v` projected onto the plane with normal `normal`.
fn project_on_plane(v: Vec3, normal: Vec3) -> Vec3 {
    (v - normal * v.dot(normal)).normalize_or_zero()
}

/// Compute the forces of one wheel that touches the ground.
///
/// `mass_share` is the chassis mass divided by the number of grounded wheels;
/// lateral friction tries to cancel that share of sideways momentum within
/// one step, limited by `friction_slip * suspension_force`.
#[allow(clippy::too_many_arguments)]
pub fn grounded_wheel_forces(
    wheels: &WheelSuspension,
    wheel_radius: f32,
    chassis_mass: f32,
    mass_share: f32,
    frame: &WheelFrame,
    hit: GroundHit,
    engine_force: f32,
    dt: f32,
) -> WheelForces {
    let length = suspension_length(wheels, wheel_radius, hit.distance);
    let compression = wheels.suspension_rest_length - length;
    let closing_speed = -frame.point_velocity.dot(hit.normal);
    let load = suspension_force(wheels, compression, closing_speed, chassis_mass);

    // Wheel axes after steering, flattened onto the ground.
    let wheel_rotation = frame.chassis_rotation * Quat::from_rotation_y(frame.steering);
    let forward = project_on_plane(wheel_rotation * Vec3::NEG_Z, hit.normal);
    let side = project_on_plane(wheel_rotation * Vec3::X, hit.normal);

    let forward_speed = frame.point_velocity.dot(forward);
    let lateral_speed = frame.point_velocity.dot(side);

    let limit = wheels.friction_slip * load;
    let lateral = if dt > 0.0 {
        (-lateral_speed * mass_share / dt).clamp(-limit, limit)
    } else {
        0.0
    };

    let suspension = hit.normal * load;
    let drive = forward * engine_force;
    let friction = side * lateral;

    // Side forces act closer to the chassis center height to limit body roll.
    let local_lever = frame.chassis_rotation.inverse() * frame.lever;
    let roll_lever = frame.chassis_rotation
        * Vec3::new(
            local_lever.x,
            local_lever.y * wheels.roll_influence,
            local_lever.z,
        );

    WheelForces {
        suspension_length: length,
        suspension_force: load,
        force: suspension + drive + friction,
        torque: frame.lever.cross(suspension + drive) + roll_lever.cross(friction),
        forward_speed,
    }
}

/// Principal inverse inertia of a solid box.
pub fn box_inverse_inertia(mass: f32, size: Vec3) -> Vec3 {
    let s = size * size;
    let inertia = Vec3::new(s.y + s.z, s.x + s.z, s.x + s.y) * (mass / 12.0);
    Vec3::new(
        1.0 / inertia.x.max(1e-3),
        1.0 / inertia.y.max(1e-3),
        1.0 / inertia.z.max(1e-3),
    )
}

/// Angular velocity change for a world-space torque applied for `dt`.
pub fn angular_velocity_change(
    torque: Vec3,
    rotation: Quat,
    local_inverse_inertia: Vec3,
    dt: f32,
) -> Vec3 {
    let local = rotation.inverse() * torque;
    rotation * (local * local_inverse_inertia) * dt
}

/// Wheel spin rate in rad/s.
///
/// Grounded wheels roll with the ground. Airborne driven wheels use the
/// configured sliding spin when enabled, otherwise they keep spinning down.
pub fn wheel_spin_rate(
    wheels: &WheelSuspension,
    wheel_radius: f32,
    grounded: bool,
    forward_speed: f32,
    engine_force: f32,
    previous: f32,
) -> f32 {
    if grounded {
        forward_speed / wheel_radius
    } else if engine_force != 0.0 && wheels.use_custom_sliding_rotational_speed {
        wheels.custom_sliding_rotational_speed
    } else {
        previous * 0.99
    }
}
