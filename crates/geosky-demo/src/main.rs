//! Headless driver for the sky.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p geosky-demo -- --date-time 2024-06-21T12:00:00Z` to
//! position the sky for the June solstice.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Parser;
use geosky_config::{CliArgs, Config};
use geosky_sky::{
    CullGroup, CullVisitor, Ellipsoid, FileTextureSource, HostView, NodeVisitor, SimpleEphemeris,
    SkyLight, SkyNode, SkyState, ViewId,
};
use glam::DVec3;
use tracing::{info, warn};

/// Scene children are just labels here.
type SceneChild = &'static str;

/// A view with no window behind it.
struct HeadlessView {
    id: ViewId,
    light: Option<SkyLight>,
    clear_color: [f32; 4],
}

impl HeadlessView {
    fn new(id: u64) -> Self {
        Self {
            id: ViewId(id),
            light: None,
            clear_color: [0.2, 0.2, 0.2, 1.0],
        }
    }
}

impl HostView for HeadlessView {
    fn id(&self) -> ViewId {
        self.id
    }

    fn install_sky_light(&mut self, light: &SkyLight) {
        self.light = Some(light.clone());
    }

    fn set_clear_color(&mut self, rgba: [f32; 4]) {
        self.clear_color = rgba;
    }
}

/// A cull pass that logs what it would draw.
struct LoggingCull {
    view: ViewId,
    eye: DVec3,
    clamp: Option<&'static str>,
}

impl CullVisitor<SceneChild> for LoggingCull {
    type ClampCallback = &'static str;

    fn current_view(&self) -> Option<ViewId> {
        Some(self.view)
    }

    fn view_point(&self) -> DVec3 {
        self.eye
    }

    fn take_clamp_projection_callback(&mut self) -> Option<&'static str> {
        self.clamp.take()
    }

    fn set_clamp_projection_callback(&mut self, callback: &'static str) {
        self.clamp = Some(callback);
    }

    fn cull_group(&mut self, group: &CullGroup<'_, SceneChild>) {
        for culled in &group.elements {
            info!(
                "  {:?}: bin {}, {} vertices, at {:.0}",
                culled.element.kind,
                culled.element.render_bin(),
                culled.element.mesh.vertex_count(),
                culled.matrix.w_axis.truncate()
            );
        }
        info!(
            "  light dir {:?}, ambient {:.2}, children {:?}",
            group.light_direction.1,
            group.light.ambient_intensity(),
            group.children
        );
    }
}

impl NodeVisitor<SceneChild> for LoggingCull {
    type Cull = Self;

    fn as_cull_visitor(&mut self) -> Option<&mut Self> {
        Some(self)
    }

    fn traverse_children(&mut self, _: &[SceneChild]) {}
}

fn main() {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = args
        .config
        .clone()
        .or_else(Config::default_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    geosky_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    let textures = FileTextureSource::new(config.sky.data_paths.iter().cloned());
    let ellipsoid = Ellipsoid::from(&config.ellipsoid);
    let state = SkyState::new(ellipsoid, &config.sky, Box::new(SimpleEphemeris), &textures);

    let mut node: SkyNode<SceneChild> = SkyNode::new(state);
    node.add_child("terrain");

    let mut view = HeadlessView::new(1);
    node.state_mut().attach(Some(&mut view), config.sky.light_channel);
    info!(
        "Attached {:?}: light channel {:?}, clear colour {:?}",
        view.id,
        view.light.as_ref().map(|l| l.channel),
        view.clear_color
    );

    report(node.state(), view.id);

    // An eye 10 000 km out on the sun side of the planet.
    let sun_dir = node
        .state()
        .view_data(view.id)
        .map_or(DVec3::Y, |d| d.light_pos);
    let mut cull = LoggingCull {
        view: view.id,
        eye: sun_dir * 1.0e7,
        clamp: Some("scene clamp"),
    };
    info!("Cull pass for {:?}:", view.id);
    node.traverse(&mut cull);
    if cull.clamp.is_none() {
        warn!("Clamp callback was not restored");
    }
}

fn report(state: &SkyState, view: ViewId) {
    let date: DateTime<Utc> = state.date_time();
    info!("Sky at {}", date.to_rfc3339());
    info!(
        "Inner radius {:.0} m, outer {:.0} m, sun distance {:.3e} m, star radius {:.3e} m",
        state.inner_radius(),
        state.outer_radius(),
        state.sun_distance(),
        state.star_radius()
    );
    info!(
        "{} stars; sun {}, moon {}, stars {}",
        state.star_count(),
        visibility(state.sun_visible()),
        visibility(state.moon_visible()),
        visibility(state.stars_visible())
    );
    if let Some(data) = state.view_data(view) {
        info!("Sun direction {:.4}", data.light_pos);
        info!("Moon at {:.0} km", data.moon.translation().length() / 1000.0);
    }
}

fn visibility(visible: bool) -> &'static str {
    if visible { "shown" } else { "hidden" }
}
