//! The sky light: a directional light positioned at the sun.
//!
//! [`SkyLight`] is the CPU-side light a host view installs, and
//! [`SkyLightUniform`] is its GPU-side representation.

use bytemuck::{Pod, Zeroable};
use glam::{DVec3, DVec4, Vec4};

/// Name of the shader uniform carrying the normalized light direction.
pub const LIGHT_DIRECTION_UNIFORM: &str = "atmos_v3LightDir";

/// Ambient intensity of a freshly built light.
pub const DEFAULT_AMBIENT: f32 = 0.2;

/// A directional light with fixed-function style colour terms.
#[derive(Clone, Debug, PartialEq)]
pub struct SkyLight {
    /// Light slot in the host's lighting system.
    pub channel: u32,
    /// Homogeneous position. `w` is always zero (directional).
    pub position: DVec4,
    pub ambient: Vec4,
    pub diffuse: Vec4,
    pub specular: Vec4,
}

impl Default for SkyLight {
    fn default() -> Self {
        Self {
            channel: 0,
            position: DVec4::new(0.0, 1.0, 0.0, 0.0),
            ambient: Vec4::new(DEFAULT_AMBIENT, DEFAULT_AMBIENT, DEFAULT_AMBIENT, 1.0),
            diffuse: Vec4::ONE,
            specular: Vec4::new(0.0, 0.0, 0.0, 1.0),
        }
    }
}

impl SkyLight {
    /// A copy of this light bound to another channel.
    pub fn with_channel(&self, channel: u32) -> Self {
        Self {
            channel,
            ..self.clone()
        }
    }

    /// Point the light along `direction`. The vector is stored as given.
    pub fn set_direction(&mut self, direction: DVec3) {
        self.position = direction.extend(0.0);
    }

    pub fn direction(&self) -> DVec3 {
        self.position.truncate()
    }

    /// Set a grey ambient term of the given intensity.
    pub fn set_ambient(&mut self, intensity: f32) {
        self.ambient = Vec4::new(intensity, intensity, intensity, 1.0);
    }

    /// Ambient intensity, read from the red channel.
    pub fn ambient_intensity(&self) -> f32 {
        self.ambient.x
    }

    pub fn to_uniform(&self) -> SkyLightUniform {
        let dir = self.direction().normalize_or_zero().as_vec3();
        SkyLightUniform {
            direction: [dir.x, dir.y, dir.z, 0.0],
            ambient: self.ambient.to_array(),
            diffuse: self.diffuse.to_array(),
            specular: self.specular.to_array(),
        }
    }
}

/// GPU-side light, 64 bytes, std140-compatible.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct SkyLightUniform {
    /// xyz = normalized direction toward the sun, w = 0.
    pub direction: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
}
