//! Static scene: ground, lights, the main camera and its post-processing.

use avian3d::prelude::*;
use bevy::{
    anti_alias::fxaa::Fxaa,
    core_pipeline::tonemapping::Tonemapping,
    light::{CascadeShadowConfigBuilder, light_consts::lux},
    post_process::{
        bloom::Bloom,
        dof::{DepthOfField, DepthOfFieldMode},
    },
    prelude::*,
    render::view::Hdr,
};
use skidpad::{ChaseCamera, ShadowFollow, ShadowFollowConfig};

use crate::{
    SkidpadSystems,
    camera::{ChaseRig, MainCamera, OrbitCamera},
    launch_params::LaunchParams,
    settings::{PostProcessingSettings, Settings},
    shadow::ShadowRig,
    vehicle::Car,
};

/// Side length of the ground plane in meters.
const GROUND_SIZE: f32 = 1000.0;
/// Spacing of the marker grid painted on the ground.
const MARKER_SPACING: f32 = 20.0;
/// Markers per side of the grid.
const MARKER_COUNT: i32 = 15;

/// Plugin for the static scene.
pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(Color::srgb(0.55, 0.7, 0.9)))
            .add_systems(Startup, (spawn_ground, spawn_lights, spawn_camera))
            .add_systems(
                Update,
                (
                    apply_post_processing.run_if(resource_changed::<Settings>),
                    focus_on_car.in_set(SkidpadSystems::Rigs),
                ),
            );
    }
}

fn spawn_ground(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    // Thick slab with its top face at y = 0.
    commands.spawn((
        Name::new("Ground"),
        Mesh3d(meshes.add(Cuboid::new(GROUND_SIZE, 1.0, GROUND_SIZE))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.3, 0.32, 0.3),
            perceptual_roughness: 0.95,
            ..default()
        })),
        Transform::from_xyz(0.0, -0.5, 0.0),
        RigidBody::Static,
        Collider::cuboid(GROUND_SIZE, 1.0, GROUND_SIZE),
    ));

    // Flat markers so motion is visible on the uniform ground.
    let marker_mesh = meshes.add(Cuboid::new(0.6, 0.02, 0.6));
    let marker_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.9, 0.85, 0.2),
        ..default()
    });
    let half = MARKER_COUNT / 2;
    for ix in -half..=half {
        for iz in -half..=half {
            #[allow(clippy::cast_precision_loss)]
            let position = Vec3::new(ix as f32, 0.0, iz as f32) * MARKER_SPACING;
            commands.spawn((
                Mesh3d(marker_mesh.clone()),
                MeshMaterial3d(marker_material.clone()),
                Transform::from_translation(position + Vec3::Y * 0.01),
            ));
        }
    }
}

fn spawn_lights(mut commands: Commands) {
    let follow = match ShadowFollow::new(ShadowFollowConfig::default()) {
        Ok(follow) => follow,
        Err(e) => {
            tracing::error!("Invalid shadow rig configuration: {e}");
            return;
        }
    };
    let offset = follow.config().light_offset;

    commands.spawn((
        Name::new("Sun"),
        DirectionalLight {
            illuminance: lux::AMBIENT_DAYLIGHT,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_translation(offset).looking_at(Vec3::ZERO, Vec3::Y),
        CascadeShadowConfigBuilder {
            num_cascades: 1,
            maximum_distance: follow.config().shadow_distance,
            ..default()
        }
        .build(),
        ShadowRig::new(follow),
    ));
}

fn spawn_camera(mut commands: Commands, params: Res<LaunchParams>) {
    let start = Transform::from_xyz(0.0, 5.0, 12.0).looking_at(Vec3::ZERO, Vec3::Y);

    let mut camera = commands.spawn((
        Name::new("Main Camera"),
        MainCamera,
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: 75.0_f32.to_radians(),
            near: 0.1,
            far: 2000.0,
            ..default()
        }),
        base_effects(),
        AmbientLight {
            color: Color::WHITE,
            brightness: 400.0,
            ..default()
        },
        start,
        OrbitCamera::from_view(start.translation, Vec3::ZERO),
    ));

    match ChaseCamera::new(params.chase.config()) {
        Ok(chase) => {
            camera.insert(ChaseRig { camera: chase });
        }
        Err(e) => tracing::error!("Chase camera disabled: {e}"),
    }

    tracing::info!(
        "Scene setup complete - WASD/arrows to drive, R to reset, C to switch camera, Q to hide UI"
    );
}

// ============================================================================
// Post-processing
// ============================================================================

/// Effects every main camera carries regardless of settings. FXAA runs
/// first in the post-processing chain.
fn base_effects() -> (Hdr, Fxaa, Tonemapping) {
    (Hdr, Fxaa::default(), Tonemapping::AcesFitted)
}

/// Distance at which depth of field is sharp before the car is found.
const DEFAULT_FOCAL_DISTANCE: f32 = 10.0;

fn depth_of_field() -> DepthOfField {
    DepthOfField {
        mode: DepthOfFieldMode::Gaussian,
        focal_distance: DEFAULT_FOCAL_DISTANCE,
        aperture_f_stops: 1.0,
        ..default()
    }
}

fn tonemapping(settings: &PostProcessingSettings) -> Tonemapping {
    if settings.tonemapping {
        Tonemapping::AcesFitted
    } else {
        Tonemapping::None
    }
}

/// Add or remove camera effects to match the settings.
fn apply_post_processing(
    mut commands: Commands,
    settings: Res<Settings>,
    camera_query: Query<(Entity, Has<Bloom>, Has<DepthOfField>), With<MainCamera>>,
) {
    let effects = &settings.post_processing;

    for (entity, has_bloom, has_dof) in &camera_query {
        let mut camera = commands.entity(entity);
        camera.insert(tonemapping(effects));

        match (effects.bloom, has_bloom) {
            (true, false) => {
                camera.insert(Bloom::NATURAL);
            }
            (false, true) => {
                camera.remove::<Bloom>();
            }
            _ => {}
        }

        match (effects.depth_of_field, has_dof) {
            (true, false) => {
                camera.insert(depth_of_field());
            }
            (false, true) => {
                camera.remove::<DepthOfField>();
            }
            _ => {}
        }
    }
}

/// Keep the depth of field focused on the car.
fn focus_on_car(
    car_query: Query<&GlobalTransform, With<Car>>,
    mut camera_query: Query<(&GlobalTransform, &mut DepthOfField), With<MainCamera>>,
) {
    let Some(car) = car_query.iter().next() else {
        return;
    };
    for (camera, mut dof) in &mut camera_query {
        dof.focal_distance = camera.translation().distance(car.translation()).max(0.1);
    }
}
