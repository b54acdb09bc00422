//! Sky orchestration: construction, date/time propagation and per-view
//! updates.

use chrono::{DateTime, Utc};
use glam::{DMat4, DVec3};

use geosky_config::SkyConfig;

use crate::catalog::load_stars;
use crate::elements::{SkyElements, build_atmosphere, build_moon, build_stars, build_sun};
use crate::ellipsoid::Ellipsoid;
use crate::ephemeris::{Ephemeris, stars_matrix};
use crate::light::{LIGHT_DIRECTION_UNIFORM, SkyLight};
use crate::node::{CullGroup, CulledElement, auto_ambient};
use crate::scattering::SceneLighting;
use crate::texture::TextureSource;
use crate::view::{HostView, PerViewData, PerViewStates, SkyTransform, ViewId, ViewKey};

/// Atmosphere top as a multiple of the inner radius.
pub const OUTER_RADIUS_SCALE: f64 = 1.025;
/// Sun distance as a multiple of the inner radius.
pub const SUN_DISTANCE_SCALE: f64 = 12_000.0;
/// Star sphere radius as a multiple of the sun distance.
pub const STAR_RADIUS_SCALE: f64 = 20_000.0;

/// Clear colour installed on attached views.
const CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// Radius of the star sphere. Falls back to the outer radius when the sun
/// distance is not positive.
pub fn star_radius(sun_distance: f64, outer_radius: f64) -> f64 {
    STAR_RADIUS_SCALE * if sun_distance > 0.0 { sun_distance } else { outer_radius }
}

/// Sun, moon and star placement for one instant.
#[derive(Clone, Copy, Debug)]
struct Placement {
    date_time: DateTime<Utc>,
    sun: DVec3,
    moon: DVec3,
    stars: DMat4,
}

/// The sky's complete state: shared elements, the astronomical constants
/// derived from the ellipsoid, and one [`PerViewData`] per attached view.
pub struct SkyState {
    ellipsoid: Ellipsoid,
    inner_radius: f64,
    outer_radius: f64,
    sun_distance: f64,
    star_radius: f64,
    scene_lighting: SceneLighting,
    elements: SkyElements,
    star_count: usize,
    ephemeris: Box<dyn Ephemeris>,
    date_time: DateTime<Utc>,
    moon_position: DVec3,
    views: PerViewStates,
    sun_visible: bool,
    moon_visible: bool,
    stars_visible: bool,
    auto_ambience: bool,
}

impl SkyState {
    /// Build the sky over `ellipsoid`.
    ///
    /// Construction never fails: an unreadable star file falls back to the
    /// built-in catalog and a missing moon texture hides the moon.
    pub fn new(
        ellipsoid: Ellipsoid,
        config: &SkyConfig,
        ephemeris: Box<dyn Ephemeris>,
        textures: &dyn TextureSource,
    ) -> Self {
        let date_time = match config.start_date_time() {
            Ok(Some(dt)) => dt,
            Ok(None) => Utc::now(),
            Err(err) => {
                log::warn!("{err}; starting from the current time");
                Utc::now()
            }
        };

        let inner_radius = ellipsoid.polar_radius();
        let outer_radius = inner_radius * OUTER_RADIUS_SCALE;
        let sun_distance = inner_radius * SUN_DISTANCE_SCALE;
        let mut default = PerViewData::new(SkyLight::default(), date_time);

        // Order matters: the sun reads the default light, the stars the sun distance.
        let scene_lighting = SceneLighting::new(inner_radius as f32, outer_radius as f32);
        let atmosphere = build_atmosphere(&ellipsoid, outer_radius);

        let sun = build_sun(inner_radius);
        default.sun.matrix = DMat4::from_translation(default.light_pos * sun_distance);

        let moon = build_moon(textures.load(&config.moon_texture));
        let moon_position = ephemeris.moon_position_ecef(&date_time);
        default.set_moon_position(moon_position);
        let moon_visible = config.moon_visible && moon.texture.is_some();
        if config.moon_visible && !moon_visible {
            log::info!("Moon hidden; add a directory containing {} to data_paths", config.moon_texture);
        }

        let star_radius = star_radius(sun_distance, outer_radius);
        let catalog = load_stars(config.star_file.as_deref(), config.resolve_min_star_magnitude());
        let stars = build_stars(&catalog, ephemeris.as_ref(), star_radius);

        default.sun.set_visible(config.sun_visible);
        default.moon.set_visible(moon_visible);
        default.stars.set_visible(config.stars_visible);
        default.set_ambient_brightness(config.ambient_brightness);

        let mut sky = Self {
            ellipsoid,
            inner_radius,
            outer_radius,
            sun_distance,
            star_radius,
            scene_lighting,
            elements: SkyElements {
                atmosphere,
                sun,
                moon,
                stars,
            },
            star_count: catalog.len(),
            ephemeris,
            date_time,
            moon_position,
            views: PerViewStates::new(default),
            sun_visible: config.sun_visible,
            moon_visible,
            stars_visible: config.stars_visible,
            auto_ambience: config.auto_ambience,
        };
        sky.on_date_time();

        log::info!(
            "Sky ready: {} stars, inner radius {:.0} m, sun distance {:.3e} m",
            sky.star_count,
            sky.inner_radius,
            sky.sun_distance
        );
        sky
    }

    // --- Date and time ---

    /// Move the global clock. Views with their own clock are left alone.
    pub fn set_date_time(&mut self, date_time: DateTime<Utc>) {
        self.date_time = date_time;
        self.on_date_time();
    }

    pub fn date_time(&self) -> DateTime<Utc> {
        self.date_time
    }

    /// Give `view` its own clock, detaching it from [`set_date_time`](Self::set_date_time).
    pub fn set_date_time_for_view(&mut self, date_time: DateTime<Utc>, view: ViewId) {
        let placement = self.placement(date_time);
        let sun_distance = self.sun_distance;
        match self.views.get_mut(ViewKey::View(view)) {
            Some(data) => {
                data.follows_global_clock = false;
                place(data, &placement, sun_distance);
            }
            None => log::debug!("set_date_time_for_view: {view:?} is not attached"),
        }
    }

    /// Put `view` back on the global clock and reposition it.
    pub fn follow_global_clock(&mut self, view: ViewId) {
        let placement = self.placement(self.date_time);
        let sun_distance = self.sun_distance;
        if let Some(data) = self.views.get_mut(ViewKey::View(view)) {
            data.follows_global_clock = true;
            place(data, &placement, sun_distance);
        }
    }

    /// Swap the ephemeris and reposition everything for the current time.
    pub fn set_ephemeris(&mut self, ephemeris: Box<dyn Ephemeris>) {
        self.ephemeris = ephemeris;
        self.on_date_time();
    }

    pub fn ephemeris(&self) -> &dyn Ephemeris {
        self.ephemeris.as_ref()
    }

    fn placement(&self, date_time: DateTime<Utc>) -> Placement {
        Placement {
            date_time,
            sun: self
                .ephemeris
                .sun_position_ecef(&date_time)
                .normalize_or_zero(),
            moon: self.ephemeris.moon_position_ecef(&date_time),
            stars: stars_matrix(&date_time),
        }
    }

    fn on_date_time(&mut self) {
        let placement = self.placement(self.date_time);
        self.moon_position = placement.moon;
        let sun_distance = self.sun_distance;
        for data in self
            .views
            .targets_mut(None)
            .filter(|data| data.follows_global_clock)
        {
            place(data, &placement, sun_distance);
        }
    }

    // --- Sun and moon ---

    /// Point the sun along `direction` for `view`, or for the default state
    /// and every attached view when `view` is `None`.
    pub fn set_sun_position(&mut self, direction: DVec3, view: Option<ViewId>) {
        for data in self.views.targets_mut(view) {
            data.set_sun_position(direction, self.sun_distance);
        }
    }

    /// Put the sun straight above a geodetic point (degrees).
    pub fn set_sun_position_lat_lon(&mut self, latitude: f64, longitude: f64, view: Option<ViewId>) {
        let ground = self
            .ellipsoid
            .geodetic_to_ecef(latitude.to_radians(), longitude.to_radians(), 0.0);
        let up = self.ellipsoid.local_up(ground);
        self.set_sun_position(up, view);
    }

    /// Move the moon to an absolute ECEF position.
    pub fn set_moon_position(&mut self, position: DVec3, view: Option<ViewId>) {
        self.moon_position = position;
        for data in self.views.targets_mut(view) {
            data.set_moon_position(position);
        }
    }

    /// Last moon position set globally or computed from the clock.
    pub fn moon_position(&self) -> DVec3 {
        self.moon_position
    }

    // --- Visibility ---

    pub fn set_sun_visible(&mut self, visible: bool) {
        self.sun_visible = visible;
        for data in self.views.targets_mut(None) {
            data.sun.set_visible(visible);
        }
    }

    pub fn set_moon_visible(&mut self, visible: bool) {
        self.moon_visible = visible;
        for data in self.views.targets_mut(None) {
            data.moon.set_visible(visible);
        }
    }

    pub fn set_stars_visible(&mut self, visible: bool) {
        self.stars_visible = visible;
        for data in self.views.targets_mut(None) {
            data.stars.set_visible(visible);
        }
    }

    pub fn sun_visible(&self) -> bool {
        self.sun_visible
    }

    pub fn moon_visible(&self) -> bool {
        self.moon_visible
    }

    pub fn stars_visible(&self) -> bool {
        self.stars_visible
    }

    // --- Ambient light ---

    pub fn set_auto_ambience(&mut self, enabled: bool) {
        self.auto_ambience = enabled;
    }

    pub fn auto_ambience(&self) -> bool {
        self.auto_ambience
    }

    /// Fix the ambient intensity (clamped to `[0, 1]`). Turns auto-ambience off.
    pub fn set_ambient_brightness(&mut self, value: f32, view: Option<ViewId>) {
        for data in self.views.targets_mut(view) {
            data.set_ambient_brightness(value);
        }
        self.auto_ambience = false;
    }

    /// Ambient intensity of `view`, or of the default state when `view` is
    /// `None` or not attached.
    pub fn ambient_brightness(&self, view: Option<ViewId>) -> f32 {
        view.and_then(|id| self.views.get(ViewKey::View(id)))
            .unwrap_or(self.views.default_data())
            .light
            .ambient_intensity()
    }

    // --- Views ---

    /// Attach a host view, creating its state from the default one.
    ///
    /// Attaching the same view again rebuilds its state. `None` is ignored.
    pub fn attach<V: HostView + ?Sized>(&mut self, view: Option<&mut V>, light_channel: u32) {
        let Some(view) = view else {
            return;
        };
        let id = view.id();

        let template = self.views.default_data();
        let mut data = PerViewData::new(template.light.with_channel(light_channel), template.date_time);
        data.light_pos = template.light_pos;
        data.light_dir_uniform = template.light_dir_uniform;
        data.sun = SkyTransform::new(
            DMat4::from_translation(data.light_pos * self.sun_distance),
            self.sun_visible,
        );
        data.moon = SkyTransform::new(template.moon.matrix, self.moon_visible);
        data.stars = SkyTransform::new(template.stars.matrix, self.stars_visible);

        let reattach = self.views.contains(id);
        self.views.insert(id, data);
        self.on_date_time();

        if let Some(data) = self.views.get(ViewKey::View(id)) {
            view.install_sky_light(&data.light);
        }
        view.set_clear_color(CLEAR_COLOR);

        log::debug!(
            "{} {id:?} on light channel {light_channel}",
            if reattach { "Re-attached" } else { "Attached" }
        );
    }

    pub fn view_data(&self, key: impl Into<ViewKey>) -> Option<&PerViewData> {
        self.views.get(key.into())
    }

    pub fn default_view_data(&self) -> &PerViewData {
        self.views.default_data()
    }

    /// Attached views, oldest first.
    pub fn attached_views(&self) -> &[ViewId] {
        self.views.attached()
    }

    // --- Traversal support ---

    /// The state a traversal for `view` draws with.
    pub fn cull_key(&self, view: Option<ViewId>) -> ViewKey {
        self.views.cull_key(view)
    }

    /// Derive ambient light from how directly the eye looks toward the sun.
    pub(crate) fn apply_auto_ambience(&mut self, key: ViewKey, eye: DVec3) {
        if let Some(data) = self.views.get_mut(key) {
            let eye_dot_sun = eye
                .normalize_or_zero()
                .dot(data.light_pos.normalize_or_zero());
            data.light.set_ambient(auto_ambient(eye_dot_sun as f32));
        }
    }

    /// What a cull pass draws for `key`: visible sun, moon and stars under
    /// their transforms, then the atmosphere, then the scene children.
    pub fn cull_group<'a, C>(&'a self, key: ViewKey, children: &'a [C]) -> CullGroup<'a, C> {
        let data = self.views.get(key).unwrap_or(self.views.default_data());
        let transformed = [
            (&self.elements.sun, &data.sun),
            (&self.elements.moon, &data.moon),
            (&self.elements.stars, &data.stars),
        ];
        let mut elements: Vec<CulledElement<'a>> = transformed
            .into_iter()
            .filter(|(_, xform)| xform.is_visible())
            .map(|(element, xform)| CulledElement {
                element,
                matrix: xform.matrix,
            })
            .collect();
        elements.push(CulledElement {
            element: &self.elements.atmosphere,
            matrix: DMat4::IDENTITY,
        });

        CullGroup {
            view: key,
            light: &data.light,
            light_direction: (LIGHT_DIRECTION_UNIFORM, data.light_dir_uniform),
            scene_lighting: &self.scene_lighting,
            elements,
            children,
        }
    }

    // --- Shared data ---

    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    /// Radius of the planet's surface used for shading (the polar radius).
    pub fn inner_radius(&self) -> f64 {
        self.inner_radius
    }

    pub fn outer_radius(&self) -> f64 {
        self.outer_radius
    }

    pub fn sun_distance(&self) -> f64 {
        self.sun_distance
    }

    pub fn star_radius(&self) -> f64 {
        self.star_radius
    }

    pub fn star_count(&self) -> usize {
        self.star_count
    }

    pub fn scene_lighting(&self) -> &SceneLighting {
        &self.scene_lighting
    }

    pub fn elements(&self) -> &SkyElements {
        &self.elements
    }
}

fn place(data: &mut PerViewData, placement: &Placement, sun_distance: f64) {
    data.set_sun_position(placement.sun, sun_distance);
    data.set_moon_position(placement.moon);
    data.stars.matrix = placement.stars;
    data.date_time = placement.date_time;
}
