//! Per-view sky state.
//!
//! Every attached view owns a [`PerViewData`]: its light, the sun/moon/star
//! transforms and their visibility masks, and the date/time it was last
//! positioned for. A distinguished default entry is always present; it is
//! the template new views are cloned from and the state used before any
//! view attaches.

use chrono::{DateTime, Utc};
use glam::{DMat4, DVec3, Vec3};
use rustc_hash::FxHashMap;

use crate::light::SkyLight;

/// Node mask for a visible transform.
pub const MASK_VISIBLE: u32 = !0;
/// Node mask for a hidden transform.
pub const MASK_HIDDEN: u32 = 0;

/// Stable identity of a host view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub u64);

/// Addresses either the default state or one attached view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViewKey {
    Default,
    View(ViewId),
}

impl From<ViewId> for ViewKey {
    fn from(id: ViewId) -> Self {
        Self::View(id)
    }
}

impl From<Option<ViewId>> for ViewKey {
    fn from(id: Option<ViewId>) -> Self {
        id.map_or(Self::Default, Self::View)
    }
}

/// The host-side view a sky attaches to.
pub trait HostView {
    fn id(&self) -> ViewId;

    /// Switch the view to sky lighting driven by `light`.
    fn install_sky_light(&mut self, light: &SkyLight);

    fn set_clear_color(&mut self, rgba: [f32; 4]);
}

/// A matrix transform with a visibility mask.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkyTransform {
    pub matrix: DMat4,
    pub node_mask: u32,
}

impl SkyTransform {
    pub fn new(matrix: DMat4, visible: bool) -> Self {
        Self {
            matrix,
            node_mask: visibility_mask(visible),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.node_mask != MASK_HIDDEN
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.node_mask = visibility_mask(visible);
    }

    /// Translation part of the matrix.
    pub fn translation(&self) -> DVec3 {
        self.matrix.w_axis.truncate()
    }
}

impl Default for SkyTransform {
    fn default() -> Self {
        Self::new(DMat4::IDENTITY, true)
    }
}

pub fn visibility_mask(visible: bool) -> u32 {
    if visible { MASK_VISIBLE } else { MASK_HIDDEN }
}

/// One view's mutable sky state.
#[derive(Clone, Debug)]
pub struct PerViewData {
    pub light: SkyLight,
    /// Sun direction as last set. Not necessarily normalized.
    pub light_pos: DVec3,
    /// Value of the light-direction uniform: `light_pos` normalized.
    pub light_dir_uniform: Vec3,
    pub sun: SkyTransform,
    pub moon: SkyTransform,
    pub stars: SkyTransform,
    pub date_time: DateTime<Utc>,
    /// Cleared when the view is given its own clock.
    pub follows_global_clock: bool,
}

impl PerViewData {
    pub(crate) fn new(light: SkyLight, date_time: DateTime<Utc>) -> Self {
        let light_pos = light.direction();
        Self {
            light_dir_uniform: light_pos.normalize_or_zero().as_vec3(),
            light,
            light_pos,
            sun: SkyTransform::default(),
            moon: SkyTransform::default(),
            stars: SkyTransform::default(),
            date_time,
            follows_global_clock: true,
        }
    }

    /// Point the light, its uniform and the sun transform along `direction`.
    pub(crate) fn set_sun_position(&mut self, direction: DVec3, sun_distance: f64) {
        self.light_pos = direction;
        self.light.set_direction(direction);
        self.light_dir_uniform = direction.normalize_or_zero().as_vec3();
        self.sun.matrix = DMat4::from_translation(direction * sun_distance);
    }

    pub(crate) fn set_moon_position(&mut self, position: DVec3) {
        self.moon.matrix = DMat4::from_translation(position);
    }

    pub(crate) fn set_ambient_brightness(&mut self, value: f32) {
        self.light.set_ambient(value.clamp(0.0, 1.0));
    }
}

/// The default state plus every attached view, in attach order.
#[derive(Clone, Debug)]
pub struct PerViewStates {
    default: PerViewData,
    views: FxHashMap<ViewId, PerViewData>,
    attach_order: Vec<ViewId>,
}

impl PerViewStates {
    pub fn new(default: PerViewData) -> Self {
        Self {
            default,
            views: FxHashMap::default(),
            attach_order: Vec::new(),
        }
    }

    pub fn default_data(&self) -> &PerViewData {
        &self.default
    }

    pub fn get(&self, key: ViewKey) -> Option<&PerViewData> {
        match key {
            ViewKey::Default => Some(&self.default),
            ViewKey::View(id) => self.views.get(&id),
        }
    }

    pub fn get_mut(&mut self, key: ViewKey) -> Option<&mut PerViewData> {
        match key {
            ViewKey::Default => Some(&mut self.default),
            ViewKey::View(id) => self.views.get_mut(&id),
        }
    }

    pub fn contains(&self, id: ViewId) -> bool {
        self.views.contains_key(&id)
    }

    /// Insert or replace a view's state. Re-inserting keeps its attach slot.
    pub fn insert(&mut self, id: ViewId, data: PerViewData) {
        if self.views.insert(id, data).is_none() {
            self.attach_order.push(id);
        }
    }

    /// Attached views, oldest first.
    pub fn attached(&self) -> &[ViewId] {
        &self.attach_order
    }

    /// States an update addressed to `target` applies to: the default and
    /// every attached view when `target` is `None`, otherwise just that view
    /// (nothing if it never attached).
    pub fn targets_mut(
        &mut self,
        target: Option<ViewId>,
    ) -> Box<dyn Iterator<Item = &mut PerViewData> + '_> {
        match target {
            None => Box::new(std::iter::once(&mut self.default).chain(self.views.values_mut())),
            Some(id) => Box::new(self.views.get_mut(&id).into_iter()),
        }
    }

    /// The state a traversal for `view` draws with: the view's own, else the
    /// first attached view's, else the default.
    pub fn cull_key(&self, view: Option<ViewId>) -> ViewKey {
        match view {
            Some(id) if self.views.contains_key(&id) => ViewKey::View(id),
            _ => self
                .attach_order
                .first()
                .map_or(ViewKey::Default, |id| ViewKey::View(*id)),
        }
    }
}
