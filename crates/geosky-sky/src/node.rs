//! Scene-graph adapter for the sky.
//!
//! [`SkyNode`] plugs a [`SkyState`] into a host traversal. Cull traversals
//! get the per-view [`CullGroup`]; every other traversal just visits the
//! node's children.

use std::marker::PhantomData;

use glam::{DMat4, DVec3, Vec3};

use crate::elements::SkyElement;
use crate::light::SkyLight;
use crate::scattering::SceneLighting;
use crate::sky::SkyState;
use crate::view::{ViewId, ViewKey};

const MIN_AMBIENT: f32 = 0.2;
const MAX_AMBIENT: f32 = 0.92;
const MIN_DEVIATION: f32 = -0.2;
const MAX_DEVIATION: f32 = 0.75;

/// Ambient intensity for a given alignment between the eye direction and
/// the sun direction: `[-0.2, 0.75]` maps linearly onto `[0.2, 0.92]`,
/// clamped outside.
pub fn auto_ambient(eye_dot_sun: f32) -> f32 {
    let deviation = eye_dot_sun.clamp(MIN_DEVIATION, MAX_DEVIATION);
    let t = (deviation - MIN_DEVIATION) / (MAX_DEVIATION - MIN_DEVIATION);
    MIN_AMBIENT + t * (MAX_AMBIENT - MIN_AMBIENT)
}

/// A bounding sphere. Negative radius means empty.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingSphere {
    pub center: DVec3,
    pub radius: f64,
}

impl BoundingSphere {
    pub const EMPTY: Self = Self {
        center: DVec3::ZERO,
        radius: -1.0,
    };

    pub fn is_valid(&self) -> bool {
        self.radius >= 0.0
    }
}

/// A sky element with the transform it is drawn under.
#[derive(Clone, Copy, Debug)]
pub struct CulledElement<'a> {
    pub element: &'a SkyElement,
    pub matrix: DMat4,
}

/// Everything one view's cull pass sees below the sky node.
#[derive(Debug)]
pub struct CullGroup<'a, C> {
    /// Which per-view state produced this group.
    pub view: ViewKey,
    pub light: &'a SkyLight,
    /// Light-direction uniform name and value.
    pub light_direction: (&'static str, Vec3),
    pub scene_lighting: &'a SceneLighting,
    /// Visible elements in traversal order.
    pub elements: Vec<CulledElement<'a>>,
    /// The sky node's own scene children, traversed after the elements.
    pub children: &'a [C],
}

/// Host cull traversal.
pub trait CullVisitor<C> {
    /// The host's projection-clamping hook.
    type ClampCallback;

    /// The view being culled, if the host knows it.
    fn current_view(&self) -> Option<ViewId>;

    /// Eye position in world coordinates.
    fn view_point(&self) -> DVec3;

    /// Remove and return the installed clamp callback.
    fn take_clamp_projection_callback(&mut self) -> Option<Self::ClampCallback>;

    fn set_clamp_projection_callback(&mut self, callback: Self::ClampCallback);

    fn cull_group(&mut self, group: &CullGroup<'_, C>);
}

/// Host traversal of any kind.
pub trait NodeVisitor<C> {
    type Cull: CullVisitor<C>;

    /// `Some` during cull traversals.
    fn as_cull_visitor(&mut self) -> Option<&mut Self::Cull>;

    fn traverse_children(&mut self, children: &[C]);
}

/// Cull type for visitors that never cull.
#[derive(Debug)]
pub enum NotCulling {}

impl<C> CullVisitor<C> for NotCulling {
    type ClampCallback = std::convert::Infallible;

    fn current_view(&self) -> Option<ViewId> {
        match *self {}
    }

    fn view_point(&self) -> DVec3 {
        match *self {}
    }

    fn take_clamp_projection_callback(&mut self) -> Option<Self::ClampCallback> {
        match *self {}
    }

    fn set_clamp_projection_callback(&mut self, _: Self::ClampCallback) {
        match *self {}
    }

    fn cull_group(&mut self, _: &CullGroup<'_, C>) {
        match *self {}
    }
}

/// Holds a visitor's clamp callback aside and reinstalls it on drop.
struct ClampSuspended<'v, C, V: CullVisitor<C>> {
    visitor: &'v mut V,
    saved: Option<V::ClampCallback>,
    _children: PhantomData<fn(&C)>,
}

impl<'v, C, V: CullVisitor<C>> ClampSuspended<'v, C, V> {
    fn new(visitor: &'v mut V) -> Self {
        let saved = visitor.take_clamp_projection_callback();
        Self {
            visitor,
            saved,
            _children: PhantomData,
        }
    }
}

impl<C, V: CullVisitor<C>> Drop for ClampSuspended<'_, C, V> {
    fn drop(&mut self) {
        if let Some(callback) = self.saved.take() {
            self.visitor.set_clamp_projection_callback(callback);
        }
    }
}

/// The sky as a scene node with children of type `C`.
pub struct SkyNode<C> {
    state: SkyState,
    children: Vec<C>,
}

impl<C> SkyNode<C> {
    pub fn new(state: SkyState) -> Self {
        Self {
            state,
            children: Vec::new(),
        }
    }

    pub fn state(&self) -> &SkyState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SkyState {
        &mut self.state
    }

    pub fn add_child(&mut self, child: C) {
        self.children.push(child);
    }

    pub fn children(&self) -> &[C] {
        &self.children
    }

    /// Always empty, so the sky never widens the host's near/far range.
    pub fn compute_bound(&self) -> BoundingSphere {
        BoundingSphere::EMPTY
    }

    pub fn traverse<V: NodeVisitor<C>>(&mut self, visitor: &mut V) {
        if let Some(cull) = visitor.as_cull_visitor() {
            self.cull(cull);
        } else {
            visitor.traverse_children(&self.children);
        }
    }

    fn cull<V: CullVisitor<C>>(&mut self, visitor: &mut V) {
        let guard = ClampSuspended::new(visitor);

        let key = self.state.cull_key(guard.visitor.current_view());
        if self.state.auto_ambience() {
            let eye = guard.visitor.view_point();
            self.state.apply_auto_ambience(key, eye);
        }

        let group = self.state.cull_group(key, &self.children);
        guard.visitor.cull_group(&group);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::SkyElementKind;
    use crate::ellipsoid::Ellipsoid;
    use crate::ephemeris::Ephemeris;
    use crate::texture::{SkyTexture, TextureError, TextureSource};
    use crate::view::HostView;
    use chrono::{DateTime, Utc};
    use geosky_config::SkyConfig;

    struct SunOnX;

    impl Ephemeris for SunOnX {
        fn sun_position_ecef(&self, _: &DateTime<Utc>) -> DVec3 {
            DVec3::X
        }

        fn moon_position_ecef(&self, _: &DateTime<Utc>) -> DVec3 {
            DVec3::new(0.0, 3.8e8, 0.0)
        }
    }

    struct Blank;

    impl TextureSource for Blank {
        fn load(&self, name: &str) -> Result<SkyTexture, TextureError> {
            Ok(SkyTexture {
                name: name.into(),
                width: 1,
                height: 1,
                rgba: vec![0; 4],
            })
        }
    }

    struct Window(u64);

    impl HostView for Window {
        fn id(&self) -> ViewId {
            ViewId(self.0)
        }

        fn install_sky_light(&mut self, _: &SkyLight) {}

        fn set_clear_color(&mut self, _: [f32; 4]) {}
    }

    #[derive(Debug, PartialEq)]
    struct Clamp(&'static str);

    /// Records what a cull pass would draw.
    struct Recorder {
        view: Option<ViewId>,
        eye: DVec3,
        clamp: Option<Clamp>,
        clamp_seen_during_cull: Option<bool>,
        drawn: Vec<(ViewKey, Vec<SkyElementKind>, Vec<u32>, f32)>,
    }

    impl Recorder {
        fn new(view: Option<ViewId>) -> Self {
            Self {
                view,
                eye: DVec3::X * 1.0e7,
                clamp: Some(Clamp("near-far")),
                clamp_seen_during_cull: None,
                drawn: Vec::new(),
            }
        }
    }

    impl CullVisitor<u32> for Recorder {
        type ClampCallback = Clamp;

        fn current_view(&self) -> Option<ViewId> {
            self.view
        }

        fn view_point(&self) -> DVec3 {
            self.eye
        }

        fn take_clamp_projection_callback(&mut self) -> Option<Clamp> {
            self.clamp.take()
        }

        fn set_clamp_projection_callback(&mut self, callback: Clamp) {
            self.clamp = Some(callback);
        }

        fn cull_group(&mut self, group: &CullGroup<'_, u32>) {
            self.clamp_seen_during_cull = Some(self.clamp.is_some());
            self.drawn.push((
                group.view,
                group.elements.iter().map(|e| e.element.kind).collect(),
                group.children.to_vec(),
                group.light.ambient_intensity(),
            ));
        }
    }

    impl NodeVisitor<u32> for Recorder {
        type Cull = Self;

        fn as_cull_visitor(&mut self) -> Option<&mut Self> {
            Some(self)
        }

        fn traverse_children(&mut self, _: &[u32]) {
            unreachable!("cull visitor never falls back");
        }
    }

    /// A non-cull traversal that counts children.
    #[derive(Default)]
    struct Updater {
        visited: Vec<u32>,
    }

    impl NodeVisitor<u32> for Updater {
        type Cull = NotCulling;

        fn as_cull_visitor(&mut self) -> Option<&mut NotCulling> {
            None
        }

        fn traverse_children(&mut self, children: &[u32]) {
            self.visited.extend_from_slice(children);
        }
    }

    fn node() -> SkyNode<u32> {
        let config = SkyConfig {
            date_time: Some("2024-01-01T00:00:00Z".into()),
            ..Default::default()
        };
        let state = SkyState::new(Ellipsoid::wgs84(), &config, Box::new(SunOnX), &Blank);
        let mut node = SkyNode::new(state);
        node.add_child(7);
        node.add_child(9);
        node
    }

    #[test]
    fn test_auto_ambient_endpoints_and_clamping() {
        assert!((auto_ambient(-0.2) - 0.2).abs() < 1e-6);
        assert!((auto_ambient(0.75) - 0.92).abs() < 1e-6);
        assert!((auto_ambient(-1.0) - 0.2).abs() < 1e-6);
        assert!((auto_ambient(1.0) - 0.92).abs() < 1e-6);
    }

    #[test]
    fn test_auto_ambient_is_linear_inside_range() {
        let mid = (MIN_DEVIATION + MAX_DEVIATION) / 2.0;
        assert!((auto_ambient(mid) - 0.56).abs() < 1e-5);
        let a = auto_ambient(0.0);
        let b = auto_ambient(0.2);
        let c = auto_ambient(0.4);
        assert!(((b - a) - (c - b)).abs() < 1e-6);
    }

    #[test]
    fn test_bound_is_empty() {
        let node = node();
        assert!(!node.compute_bound().is_valid());
    }

    #[test]
    fn test_non_cull_traversal_visits_children() {
        let mut node = node();
        let mut updater = Updater::default();
        node.traverse(&mut updater);
        assert_eq!(updater.visited, [7, 9]);
    }

    #[test]
    fn test_cull_draws_elements_then_children() {
        let mut node = node();
        let mut window = Window(1);
        node.state_mut().attach(Some(&mut window), 0);

        let mut cull = Recorder::new(Some(ViewId(1)));
        node.traverse(&mut cull);

        let (key, kinds, children, _) = &cull.drawn[0];
        assert_eq!(*key, ViewKey::View(ViewId(1)));
        assert_eq!(
            kinds,
            &[
                SkyElementKind::Sun,
                SkyElementKind::Moon,
                SkyElementKind::Stars,
                SkyElementKind::Atmosphere
            ]
        );
        assert_eq!(children, &[7, 9]);
    }

    #[test]
    fn test_clamp_callback_suspended_and_restored() {
        let mut node = node();
        let mut cull = Recorder::new(None);
        node.traverse(&mut cull);
        assert_eq!(cull.clamp_seen_during_cull, Some(false));
        assert_eq!(cull.clamp, Some(Clamp("near-far")));
    }

    #[test]
    fn test_unknown_view_falls_back_to_first_attached() {
        let mut node = node();
        let (mut first, mut second) = (Window(4), Window(5));
        node.state_mut().attach(Some(&mut first), 0);
        node.state_mut().attach(Some(&mut second), 0);

        let mut cull = Recorder::new(Some(ViewId(77)));
        node.traverse(&mut cull);
        assert_eq!(cull.drawn[0].0, ViewKey::View(ViewId(4)));
    }

    #[test]
    fn test_no_views_uses_default_state() {
        let mut node = node();
        let mut cull = Recorder::new(Some(ViewId(3)));
        node.traverse(&mut cull);
        assert_eq!(cull.drawn[0].0, ViewKey::Default);
    }

    #[test]
    fn test_auto_ambience_follows_eye_and_sun() {
        let mut node = node();
        let mut window = Window(1);
        node.state_mut().attach(Some(&mut window), 0);
        node.state_mut().set_auto_ambience(true);

        // Eye on the sun side: dot = 1, clamped to the maximum.
        let mut cull = Recorder::new(Some(ViewId(1)));
        node.traverse(&mut cull);
        assert!((cull.drawn[0].3 - 0.92).abs() < 1e-6);

        // Eye opposite the sun: dot = -1, clamped to the minimum.
        let mut cull = Recorder::new(Some(ViewId(1)));
        cull.eye = DVec3::NEG_X * 1.0e7;
        node.traverse(&mut cull);
        assert!((cull.drawn[0].3 - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_auto_ambience_off_keeps_configured_ambient() {
        let mut node = node();
        let mut cull = Recorder::new(None);
        node.traverse(&mut cull);
        assert!((cull.drawn[0].3 - 0.2).abs() < 1e-6);
    }
}
