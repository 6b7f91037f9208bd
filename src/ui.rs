//! Screen-space UI: the loading placeholder, the HUD strip, the game-over/victory banner and the
//! pause overlay.
//!
//! UI entities are part of Bevy's ECS; once despawned, all associated style/text components are
//! dropped automatically.

use bevy::prelude::*;

use crate::state::GameState;
use crate::world::GameWorld;

/// Registers the loading placeholder, HUD, banner and pause overlay systems.
pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Loading), spawn_loading_banner)
            .add_systems(OnExit(GameState::Loading), despawn_loading_banner)
            .add_systems(Startup, spawn_hud)
            .add_systems(
                Update,
                (update_hud, update_banner).run_if(resource_exists::<GameWorld>),
            )
            .add_systems(OnEnter(GameState::Paused), spawn_pause_menu)
            .add_systems(OnExit(GameState::Paused), despawn_pause_menu);
    }
}

/// Marker on the pause overlay root so it can be despawned as one tree.
#[derive(Component)]
struct PauseMenu;

/// Marker on the placeholder shown until every texture has settled.
#[derive(Component)]
struct LoadingBanner;

/// Which counter a HUD text node shows.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
enum HudField {
    Level,
    Lives,
    Enemies,
}

/// Marker on the centred end-of-run text.
#[derive(Component)]
struct Banner;

const HUD_COLOR: Color = Color::srgb(1.0, 1.0, 1.0);

/// Text for one HUD field, read straight from the world counters.
fn hud_text(field: HudField, world: &GameWorld) -> String {
    match field {
        HudField::Level => format!("LEVEL {}/{}", world.level(), world.total_levels()),
        HudField::Lives => format!("LIVES {}", world.lives()),
        HudField::Enemies => format!("ENEMIES {}", world.remaining_enemies()),
    }
}

/// `None` while the run is still going.
fn banner_text(world: &GameWorld) -> Option<&'static str> {
    if world.game_won() {
        Some("YOU WIN!\nPress R to play again")
    } else if world.is_dead() {
        Some("GAME OVER\nPress R to restart")
    } else {
        None
    }
}

/// Spawns the HUD strip along the top edge and the hidden end-of-run banner. Both live for the
/// whole session; their text is rewritten in place.
fn spawn_hud(mut commands: Commands) {
    commands
        .spawn((
            Name::new("Hud"),
            NodeBundle {
                style: Style {
                    position_type: PositionType::Absolute,
                    width: Val::Percent(100.0),
                    padding: UiRect::all(Val::Px(12.0)),
                    justify_content: JustifyContent::SpaceBetween,
                    ..default()
                },
                ..default()
            },
        ))
        .with_children(|parent| {
            for field in [HudField::Level, HudField::Lives, HudField::Enemies] {
                parent.spawn((
                    field,
                    TextBundle::from_section(
                        "",
                        TextStyle {
                            font_size: 24.0,
                            color: HUD_COLOR,
                            ..default()
                        },
                    ),
                ));
            }
        });

    commands
        .spawn((
            Name::new("BannerRoot"),
            NodeBundle {
                style: Style {
                    position_type: PositionType::Absolute,
                    width: Val::Percent(100.0),
                    height: Val::Percent(100.0),
                    align_items: AlignItems::Center,
                    justify_content: JustifyContent::Center,
                    ..default()
                },
                ..default()
            },
        ))
        .with_children(|parent| {
            parent.spawn((
                Banner,
                TextBundle {
                    text: Text::from_section(
                        "",
                        TextStyle {
                            font_size: 48.0,
                            color: Color::srgb(1.0, 0.9, 0.3),
                            ..default()
                        },
                    )
                    .with_justify(JustifyText::Center),
                    visibility: Visibility::Hidden,
                    ..default()
                },
            ));
        });
}

/// Refreshes the HUD counters whenever the world resource changed this frame.
fn update_hud(world: Res<GameWorld>, mut fields: Query<(&HudField, &mut Text)>) {
    if !world.is_changed() {
        return;
    }
    for (field, mut text) in &mut fields {
        let value = hud_text(*field, &world);
        if let Some(section) = text.sections.first_mut() {
            if section.value != value {
                section.value = value;
            }
        }
    }
}

/// Shows the banner once the run has ended and hides it again after a restart.
fn update_banner(
    world: Res<GameWorld>,
    mut banner: Query<(&mut Text, &mut Visibility), With<Banner>>,
) {
    let Ok((mut text, mut visibility)) = banner.get_single_mut() else {
        return;
    };

    match banner_text(&world) {
        Some(message) => {
            if let Some(section) = text.sections.first_mut() {
                if section.value != message {
                    section.value = message.to_owned();
                }
            }
            *visibility = Visibility::Inherited;
        }
        None => *visibility = Visibility::Hidden,
    }
}

/// Full-screen "Loading" text shown while the asset gate holds the game in `Loading`.
fn spawn_loading_banner(mut commands: Commands) {
    commands
        .spawn((
            LoadingBanner,
            Name::new("LoadingBanner"),
            NodeBundle {
                background_color: BackgroundColor(Color::srgb(0.1, 0.12, 0.1)),
                style: Style {
                    position_type: PositionType::Absolute,
                    width: Val::Percent(100.0),
                    height: Val::Percent(100.0),
                    align_items: AlignItems::Center,
                    justify_content: JustifyContent::Center,
                    ..default()
                },
                z_index: ZIndex::Global(60),
                ..default()
            },
        ))
        .with_children(|parent| {
            parent.spawn(TextBundle::from_section(
                "Loading...",
                TextStyle {
                    font_size: 36.0,
                    color: HUD_COLOR,
                    ..default()
                },
            ));
        });
}

/// Removes the loading placeholder once the game starts playing.
fn despawn_loading_banner(mut commands: Commands, query: Query<Entity, With<LoadingBanner>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}

/// Spawns a full-screen UI node with centered text. Nodes live in the `Ui` world and are rendered
/// by the UI camera automatically.
fn spawn_pause_menu(mut commands: Commands) {
    commands
        .spawn((
            PauseMenu,
            Name::new("PauseMenu"),
            NodeBundle {
                background_color: BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.6)),
                style: Style {
                    position_type: PositionType::Absolute,
                    width: Val::Percent(100.0),
                    height: Val::Percent(100.0),
                    align_items: AlignItems::Center,
                    justify_content: JustifyContent::Center,
                    ..default()
                },
                z_index: ZIndex::Global(50),
                ..default()
            },
        ))
        .with_children(|parent| {
            parent.spawn(TextBundle::from_section(
                "Paused\nPress ESC to resume",
                TextStyle {
                    font_size: 36.0,
                    color: Color::srgba(0.9, 0.9, 0.9, 1.0),
                    ..default()
                },
            ));
        });
}

/// Removes the pause menu overlay on state exit.
fn despawn_pause_menu(mut commands: Commands, query: Query<Entity, With<PauseMenu>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}
