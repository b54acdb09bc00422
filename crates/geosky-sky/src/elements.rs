//! The four sky elements: atmosphere shell, sun billboard, moon and stars.
//!
//! Each element pairs shared, immutable geometry with the render state it
//! draws with. Elements are built once when the sky is created and are then
//! referenced by every view.

use std::sync::Arc;

use glam::Vec3;

use crate::catalog::StarRecord;
use crate::ellipsoid::Ellipsoid;
use crate::ephemeris::Ephemeris;
use crate::mesh::{ColorBinding, SkyMesh, build_disc_mesh, build_ellipsoid_mesh, build_point_cloud};
use crate::scattering::UniformValue;
use crate::texture::{SkyTexture, TextureError};

/// Render bins. Lower bins draw first.
pub const BIN_STARS: i32 = -100_003;
pub const BIN_SUN: i32 = -100_002;
pub const BIN_MOON: i32 = -100_001;
pub const BIN_ATMOSPHERE: i32 = -100_000;

/// Uniform controlling the sun disc's opacity.
pub const SUN_ALPHA_UNIFORM: &str = "atmos_sunAlpha";

/// Sun disc radius as a multiple of the inner radius.
const SUN_DISC_SCALE: f64 = 100.0 * 80.0;

/// Additive blending, `ONE, ONE`.
pub const ADDITIVE_BLENDING: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SkyElementKind {
    Atmosphere,
    Sun,
    Moon,
    Stars,
}

impl SkyElementKind {
    pub fn render_bin(self) -> i32 {
        match self {
            Self::Atmosphere => BIN_ATMOSPHERE,
            Self::Sun => BIN_SUN,
            Self::Moon => BIN_MOON,
            Self::Stars => BIN_STARS,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DepthState {
    pub compare: wgpu::CompareFunction,
    pub write: bool,
}

impl DepthState {
    /// Always pass, never write.
    pub const IGNORE: Self = Self {
        compare: wgpu::CompareFunction::Always,
        write: false,
    };
}

/// Fixed-function state an element draws with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderState {
    pub lighting: bool,
    /// Face to cull, or `None` to draw both sides.
    pub cull_face: Option<wgpu::Face>,
    pub depth: DepthState,
    pub blend: Option<wgpu::BlendState>,
    pub render_bin: i32,
    /// Rasterize points as sprites with shader-controlled size.
    pub point_sprites: bool,
}

/// How a nested pass picks its clip planes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NearFarMode {
    /// Fit near/far to the bounding volumes of the pass contents.
    BoundingVolumes,
}

/// A nested render pass isolating an element's projection from the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NestedPass {
    pub render_bin: i32,
    pub near_far: NearFarMode,
}

impl NestedPass {
    fn in_bin(render_bin: i32) -> Self {
        Self {
            render_bin,
            near_far: NearFarMode::BoundingVolumes,
        }
    }
}

/// Billboard orientation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Billboard {
    /// Rotate about the eye point so `normal` faces the viewer.
    PointRotEye { normal: Vec3 },
}

/// One drawable sky element.
#[derive(Clone, Debug)]
pub struct SkyElement {
    pub kind: SkyElementKind,
    pub mesh: Arc<SkyMesh>,
    pub render_state: RenderState,
    pub pass: NestedPass,
    /// Shader program name. `None` draws with the host's default pipeline.
    pub program: Option<&'static str>,
    pub uniforms: Vec<(&'static str, UniformValue)>,
    pub billboard: Option<Billboard>,
    pub texture: Option<Arc<SkyTexture>>,
}

impl SkyElement {
    pub fn render_bin(&self) -> i32 {
        self.render_state.render_bin
    }
}

/// The complete set of elements, shared by all views.
#[derive(Clone, Debug)]
pub struct SkyElements {
    pub atmosphere: SkyElement,
    pub sun: SkyElement,
    pub moon: SkyElement,
    pub stars: SkyElement,
}

impl SkyElements {
    pub fn get(&self, kind: SkyElementKind) -> &SkyElement {
        match kind {
            SkyElementKind::Atmosphere => &self.atmosphere,
            SkyElementKind::Sun => &self.sun,
            SkyElementKind::Moon => &self.moon,
            SkyElementKind::Stars => &self.stars,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SkyElement> {
        [&self.atmosphere, &self.sun, &self.moon, &self.stars].into_iter()
    }
}

/// An outward-facing shell at `outer_radius`, shaded by the scattering
/// shaders and added onto whatever is behind it.
pub fn build_atmosphere(ellipsoid: &Ellipsoid, outer_radius: f64) -> SkyElement {
    let mesh = build_ellipsoid_mesh(ellipsoid, outer_radius, false);
    SkyElement {
        kind: SkyElementKind::Atmosphere,
        mesh: Arc::new(mesh),
        render_state: RenderState {
            lighting: false,
            cull_face: Some(wgpu::Face::Back),
            depth: DepthState::IGNORE,
            blend: Some(ADDITIVE_BLENDING),
            render_bin: BIN_ATMOSPHERE,
            point_sprites: false,
        },
        pass: NestedPass::in_bin(BIN_ATMOSPHERE),
        program: Some("sky_atmosphere"),
        uniforms: Vec::new(),
        billboard: None,
        texture: None,
    }
}

/// The sun's billboard disc, sized from the inner radius.
pub fn build_sun(inner_radius: f64) -> SkyElement {
    let mesh = build_disc_mesh(inner_radius * SUN_DISC_SCALE);
    SkyElement {
        kind: SkyElementKind::Sun,
        mesh: Arc::new(mesh),
        render_state: RenderState {
            lighting: false,
            cull_face: None,
            depth: DepthState::IGNORE,
            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            render_bin: BIN_SUN,
            point_sprites: false,
        },
        pass: NestedPass::in_bin(BIN_SUN),
        program: Some("sky_sun"),
        uniforms: vec![(SUN_ALPHA_UNIFORM, UniformValue::Float(1.0))],
        billboard: Some(Billboard::PointRotEye { normal: Vec3::Z }),
        texture: None,
    }
}

/// The moon: a textured, lit ellipsoid on the lunar figure.
///
/// A texture failure is not fatal; the element is built untextured and the
/// caller decides whether to hide it.
pub fn build_moon(texture: Result<SkyTexture, TextureError>) -> SkyElement {
    let lunar = Ellipsoid::moon();
    let mut mesh = build_ellipsoid_mesh(&lunar, lunar.equatorial_radius(), true);
    mesh.colors = ColorBinding::Overall([1.0, 1.0, 1.0, 1.0]);

    let texture = match texture {
        Ok(texture) => Some(Arc::new(texture)),
        Err(err) => {
            log::warn!("Couldn't load moon texture: {err}");
            None
        }
    };

    SkyElement {
        kind: SkyElementKind::Moon,
        mesh: Arc::new(mesh),
        render_state: RenderState {
            lighting: true,
            cull_face: Some(wgpu::Face::Back),
            depth: DepthState::IGNORE,
            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            render_bin: BIN_MOON,
            point_sprites: false,
        },
        pass: NestedPass::in_bin(BIN_MOON),
        program: None,
        uniforms: Vec::new(),
        billboard: None,
        texture,
    }
}

/// A point cloud of `stars` placed on a sphere of `star_radius`.
pub fn build_stars(stars: &[StarRecord], ephemeris: &dyn Ephemeris, star_radius: f64) -> SkyElement {
    let positions = stars
        .iter()
        .map(|s| {
            ephemeris
                .position_from_ra_decl(s.right_ascension, s.declination, star_radius)
                .as_vec3()
        })
        .collect();
    let mesh = build_point_cloud(positions, star_colors(stars));

    SkyElement {
        kind: SkyElementKind::Stars,
        mesh: Arc::new(mesh),
        render_state: RenderState {
            lighting: false,
            cull_face: None,
            depth: DepthState::IGNORE,
            blend: Some(ADDITIVE_BLENDING),
            render_bin: BIN_STARS,
            point_sprites: true,
        },
        pass: NestedPass::in_bin(BIN_STARS),
        program: Some("sky_stars"),
        uniforms: Vec::new(),
        billboard: None,
        texture: None,
    }
}

/// Grey levels for each star: magnitude mapped linearly from the catalog's
/// `[min, max]` onto `[0, 1]`. A catalog with a single magnitude maps to 1.
pub fn star_colors(stars: &[StarRecord]) -> Vec<[f32; 4]> {
    let (min, max) = stars.iter().fold((f64::MAX, f64::MIN), |(lo, hi), s| {
        (lo.min(s.magnitude), hi.max(s.magnitude))
    });
    let range = max - min;
    stars
        .iter()
        .map(|s| {
            let c = if range > 0.0 && range.is_finite() {
                ((s.magnitude - min) / range) as f32
            } else {
                1.0
            };
            [c, c, c, 1.0]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::SimpleEphemeris;

    fn star(name: &str, ra: f64, decl: f64, magnitude: f64) -> StarRecord {
        StarRecord {
            name: name.to_string(),
            right_ascension: ra,
            declination: decl,
            magnitude,
        }
    }

    #[test]
    fn test_bins_are_strictly_ordered() {
        assert!(BIN_STARS < BIN_SUN);
        assert!(BIN_SUN < BIN_MOON);
        assert!(BIN_MOON < BIN_ATMOSPHERE);
        for kind in [
            SkyElementKind::Atmosphere,
            SkyElementKind::Sun,
            SkyElementKind::Moon,
            SkyElementKind::Stars,
        ] {
            assert!(kind.render_bin() < 0);
        }
    }

    #[test]
    fn test_atmosphere_state() {
        let e = Ellipsoid::wgs84();
        let atmos = build_atmosphere(&e, e.polar_radius() * 1.025);
        assert_eq!(atmos.render_bin(), BIN_ATMOSPHERE);
        assert_eq!(atmos.pass.render_bin, BIN_ATMOSPHERE);
        assert_eq!(atmos.pass.near_far, NearFarMode::BoundingVolumes);
        assert_eq!(atmos.render_state.depth, DepthState::IGNORE);
        assert_eq!(atmos.render_state.blend, Some(ADDITIVE_BLENDING));
        assert_eq!(atmos.render_state.cull_face, Some(wgpu::Face::Back));
        assert!(!atmos.render_state.lighting);
        assert!(atmos.mesh.normals.is_none());
    }

    #[test]
    fn test_sun_is_billboard_disc() {
        let sun = build_sun(1000.0);
        assert_eq!(sun.billboard, Some(Billboard::PointRotEye { normal: Vec3::Z }));
        assert_eq!(sun.render_bin(), BIN_SUN);
        assert_eq!(sun.render_state.cull_face, None);
        assert_eq!(sun.uniforms, vec![(SUN_ALPHA_UNIFORM, UniformValue::Float(1.0))]);
        let rim = sun.mesh.positions[1].length();
        assert!((rim - 8_000_000.0).abs() < 1.0, "disc radius {rim}");
    }

    #[test]
    fn test_moon_without_texture_still_builds() {
        let moon = build_moon(Err(TextureError::NotFound {
            name: "moon.jpg".into(),
            searched: vec![],
        }));
        assert!(moon.texture.is_none());
        assert!(moon.render_state.lighting);
        assert_eq!(moon.render_state.blend, Some(wgpu::BlendState::ALPHA_BLENDING));
        assert_eq!(moon.mesh.colors, ColorBinding::Overall([1.0; 4]));
        assert!(moon.mesh.tex_coords.is_some());
    }

    #[test]
    fn test_moon_uses_lunar_radius() {
        let moon = build_moon(Ok(SkyTexture {
            name: "moon".into(),
            width: 1,
            height: 1,
            rgba: vec![255; 4],
        }));
        assert!(moon.texture.is_some());
        let max = moon
            .mesh
            .positions
            .iter()
            .map(|p| p.length())
            .fold(0.0f32, f32::max);
        assert!((max - 1_738_140.0).abs() < 10.0, "moon radius {max}");
    }

    #[test]
    fn test_star_colors_normalize_magnitude_range() {
        let stars = [star("a", 0.0, 0.0, -1.0), star("b", 0.0, 0.0, 1.0), star("c", 0.0, 0.0, 3.0)];
        let colors = star_colors(&stars);
        assert_eq!(colors[0], [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(colors[1], [0.5, 0.5, 0.5, 1.0]);
        assert_eq!(colors[2], [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_star_colors_single_magnitude() {
        let stars = [star("a", 1.0, 2.0, 2.0), star("b", 3.0, 4.0, 2.0)];
        assert!(star_colors(&stars).iter().all(|c| *c == [1.0; 4]));
        assert!(star_colors(&[]).is_empty());
    }

    #[test]
    fn test_star_colors_stay_finite_for_unbounded_magnitudes() {
        let stars = [star("a", 0.0, 0.0, 1.0), star("b", 0.0, 0.0, f64::INFINITY)];
        for color in star_colors(&stars) {
            assert!(color.iter().all(|c| c.is_finite()), "color {color:?}");
        }
    }

    #[test]
    fn test_stars_sit_on_star_sphere() {
        let stars = [star("a", 0.0, 0.0, 1.0), star("b", 6.0, 45.0, 2.0)];
        let element = build_stars(&stars, &SimpleEphemeris, 1.0e6);
        assert_eq!(element.mesh.topology, wgpu::PrimitiveTopology::PointList);
        assert_eq!(element.mesh.vertex_count(), 2);
        assert!(element.render_state.point_sprites);
        for p in &element.mesh.positions {
            assert!((p.length() - 1.0e6).abs() < 1.0);
        }
    }
}
