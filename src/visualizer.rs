//! Top-down 2D visualization.
//!
//! The track mask used for collision sampling is uploaded as a sprite, so that what is drawn is
//! exactly what the collider sees. Cars, wheels, rays and checkpoints are drawn with gizmos.

use bevy::{
    prelude::*,
    render::{
        render_asset::RenderAssetUsages,
        render_resource::{Extent3d, TextureDimension, TextureFormat},
    },
};

use crate::{
    domain::{Car, Fitness, Position, WheelID, World},
    resource::{Session, WorldRes},
    simulator::PLAYER,
};

pub struct Visualizer;

impl Plugin for Visualizer {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(Color::rgb_u8(51, 51, 51)))
            .add_systems(Startup, set_up)
            .add_systems(
                Update,
                (
                    update_track.run_if(resource_exists_and_changed::<Session>),
                    (draw_checkpoints, draw_cars, update_text),
                )
                    .chain()
                    .run_if(resource_exists::<WorldRes>),
            )
            .add_systems(Update, handle_keyboard_input)
            .init_resource::<Scene>();
    }
}

#[derive(Resource)]
pub struct Scene {
    track: Option<Entity>,
    show_text: bool,
    show_rays: bool,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            track: None,
            show_text: true,
            show_rays: true,
        }
    }
}

const CAR_COLORS: [Color; 4] = [
    Color::rgb(0.9, 0.2, 0.2),
    Color::rgb(0.2, 0.5, 0.9),
    Color::rgb(0.3, 0.8, 0.3),
    Color::rgb(0.9, 0.7, 0.1),
];
const INACTIVE_COLOR: Color = Color::rgba(0.5, 0.5, 0.5, 0.6);
const WHEEL_COLOR: Color = Color::rgb(0.1, 0.1, 0.1);
const RAY_COLOR: Color = Color::rgba(1.0, 1.0, 1.0, 0.4);
const CHECKPOINT_COLOR: Color = Color::rgba(1.0, 1.0, 1.0, 0.15);
const NEXT_CHECKPOINT_COLOR: Color = Color::rgba(0.2, 1.0, 0.2, 0.8);

fn set_up(mut commands: Commands) {
    commands.spawn(Camera2dBundle::default());
    create_text(&mut commands);
}

fn create_text(commands: &mut Commands) {
    let text_style = TextStyle {
        font_size: 20.0,
        ..default()
    };
    commands.spawn(
        TextBundle::from_sections(vec![TextSection::new("", text_style.clone())]).with_style(
            Style {
                position_type: PositionType::Absolute,
                bottom: Val::Px(12.0),
                left: Val::Px(12.0),
                ..default()
            },
        ),
    );
}

/// Replaces the track sprite with the mask of the current world.
fn update_track(
    mut scene: ResMut<Scene>,
    mut commands: Commands,
    mut images: ResMut<Assets<Image>>,
    world: Res<WorldRes>,
) {
    if let Some(entity) = scene.track.take() {
        commands.entity(entity).despawn();
    }

    let lookup = world.lookup();
    let image = Image::new(
        Extent3d {
            width: lookup.width(),
            height: lookup.height(),
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        lookup.to_rgba_bytes(),
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::RENDER_WORLD,
    );

    scene.track = Some(
        commands
            .spawn(SpriteBundle {
                texture: images.add(image),
                ..default()
            })
            .id(),
    );
}

fn draw_checkpoints(mut gizmos: Gizmos, world: Res<WorldRes>) {
    let track = world.track();
    let radius = world.collider().checkpoint_radius() as f32;

    let count = track.nodes().len().div_ceil(track.checkpoint_stride());
    for idx in 0..count {
        let position = to_bevy_position(track.checkpoint(idx).position(), &world);
        gizmos.circle_2d(position, radius, CHECKPOINT_COLOR);
    }

    if let Some(car) = world.car(PLAYER).filter(|c| c.is_active()) {
        let checkpoint = world.collider().checkpoint_for(track, car);
        gizmos.circle_2d(
            to_bevy_position(checkpoint.position(), &world),
            checkpoint.radius() as f32,
            NEXT_CHECKPOINT_COLOR,
        );
    }
}

fn draw_cars(mut gizmos: Gizmos, scene: Res<Scene>, world: Res<WorldRes>) {
    // Inactive cars first, so that active cars are drawn on top.
    let (active, inactive): (Vec<_>, Vec<_>) =
        world.cars().iter().enumerate().partition(|(_, c)| c.is_active());

    for (idx, car) in inactive.into_iter().chain(active) {
        let color = if car.is_active() {
            CAR_COLORS[idx % CAR_COLORS.len()]
        } else {
            INACTIVE_COLOR
        };

        if scene.show_rays && car.is_active() {
            let origin = to_bevy_position(car.position(), &world);
            for ray in car.sensors().rays() {
                if let Some(hit) = ray.hit() {
                    gizmos.line_2d(origin, to_bevy_position(hit, &world), RAY_COLOR);
                }
            }
        }

        draw_car(&mut gizmos, car, color, &world);
    }
}

fn draw_car(gizmos: &mut Gizmos, car: &Car, color: Color, world: &World) {
    let config = car.config();
    let corners = car.body_corners();
    gizmos.linestrip_2d(
        corners
            .iter()
            .chain(corners.first())
            .map(|corner| to_bevy_position(*corner, world)),
        color,
    );

    for wheel_id in WheelID::iter() {
        gizmos.rect_2d(
            to_bevy_position(car.wheel(*wheel_id).position(), world),
            to_bevy_rotation(car.wheel_heading(*wheel_id).into()),
            Vec2::new(config.wheel_width as f32, config.wheel_height as f32),
            WHEEL_COLOR,
        );
    }

    // Nose marker
    let nose = car.position() + car.heading().direction() * (config.height / 2.0);
    gizmos.line_2d(
        to_bevy_position(car.position(), world),
        to_bevy_position(nose, world),
        color,
    );
}

fn update_text(mut text: Query<&mut Text>, scene: Res<Scene>, world: Res<WorldRes>) {
    let Ok(mut text) = text.get_single_mut() else {
        return;
    };
    if !scene.show_text {
        text.sections[0].value = String::new();
        return;
    }

    let Some(car) = world.car(PLAYER) else {
        return;
    };
    let steering = car
        .steering_angle()
        .map_or("---".to_string(), |a| format!("{a:5.1}"));
    let fitness = Fitness::default();
    let best = world
        .scores(&fitness)
        .into_iter()
        .fold(f64::NEG_INFINITY, f64::max);
    let status = if car.is_active() {
        "RACING"
    } else {
        "OFF TRACK (R: new track)"
    };
    text.sections[0].value = format!(
        "CP: {}   SCORE: {:6.2} (best {best:6.2})   VEL: {:4.2}   \
         STEER: {steering} deg (CoR {:5.2})   CARS: {}/{}   TICK: {}   {status}",
        car.checkpoints_matched(),
        fitness.score(car),
        car.velocity(),
        car.steering_offset(),
        world.active_cars(),
        world.cars().len(),
        world.ticks(),
    );
}

fn handle_keyboard_input(keys: Res<ButtonInput<KeyCode>>, mut scene: ResMut<Scene>) {
    if keys.just_pressed(KeyCode::KeyT) {
        scene.show_text = !scene.show_text;
    }

    if keys.just_pressed(KeyCode::KeyV) {
        scene.show_rays = !scene.show_rays;
    }
}

/// Maps screen coordinates of the world (origin top left, y down) to Bevy's 2D coordinates
/// (origin at the center, y up).
fn to_bevy_position(position: Position, world: &World) -> Vec2 {
    let track = world.track();
    Vec2::new(
        position.x() as f32 - track.width() as f32 / 2.0,
        track.height() as f32 / 2.0 - position.y() as f32,
    )
}

/// Headings turn clockwise on screen, Bevy rotations counter-clockwise.
fn to_bevy_rotation(heading: f32) -> f32 {
    -heading
}
