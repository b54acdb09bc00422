//! Ground and sky scattering constants shared by the scene-lighting and
//! atmosphere shaders.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use std::f32::consts::PI;

/// A typed shader uniform value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Vec3(Vec3),
}

/// Rayleigh/Mie scattering parameters for a planet with the given inner
/// (surface) and outer (atmosphere top) radii.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneLighting {
    pub inner_radius: f32,
    pub outer_radius: f32,
    /// Wavelengths of the red, green and blue channels in micrometers.
    pub wavelengths: Vec3,
    /// Rayleigh scattering constant.
    pub kr: f32,
    /// Mie scattering constant.
    pub km: f32,
    /// Sun brightness.
    pub e_sun: f32,
    /// Mie phase asymmetry.
    pub mie_phase: f32,
    pub rayleigh_scale_depth: f32,
    pub samples: i32,
    pub weather: f32,
}

impl SceneLighting {
    pub fn new(inner_radius: f32, outer_radius: f32) -> Self {
        Self {
            inner_radius,
            outer_radius,
            wavelengths: Vec3::new(0.65, 0.57, 0.475),
            kr: 0.0025,
            km: 0.0015,
            e_sun: 15.0,
            mie_phase: -0.095,
            rayleigh_scale_depth: 0.25,
            samples: 2,
            weather: 1.0,
        }
    }

    /// `1 / λ⁴` per channel.
    pub fn inv_wavelength(&self) -> Vec3 {
        Vec3::ONE / self.wavelengths.powf(4.0)
    }

    /// `1 / (outer - inner)`.
    pub fn scale(&self) -> f32 {
        1.0 / (self.outer_radius - self.inner_radius)
    }

    /// Named uniforms in the order the lighting shaders declare them.
    pub fn uniforms(&self) -> Vec<(&'static str, UniformValue)> {
        use UniformValue::*;
        let scale = self.scale();
        vec![
            ("atmos_v3InvWavelength", Vec3(self.inv_wavelength())),
            ("atmos_fInnerRadius", Float(self.inner_radius)),
            ("atmos_fInnerRadius2", Float(self.inner_radius * self.inner_radius)),
            ("atmos_fOuterRadius", Float(self.outer_radius)),
            ("atmos_fOuterRadius2", Float(self.outer_radius * self.outer_radius)),
            ("atmos_fKrESun", Float(self.kr * self.e_sun)),
            ("atmos_fKmESun", Float(self.km * self.e_sun)),
            ("atmos_fKr4PI", Float(self.kr * 4.0 * PI)),
            ("atmos_fKm4PI", Float(self.km * 4.0 * PI)),
            ("atmos_fScale", Float(scale)),
            ("atmos_fScaleDepth", Float(self.rayleigh_scale_depth)),
            (
                "atmos_fScaleOverScaleDepth",
                Float(scale / self.rayleigh_scale_depth),
            ),
            ("atmos_g", Float(self.mie_phase)),
            ("atmos_g2", Float(self.mie_phase * self.mie_phase)),
            ("atmos_nSamples", Int(self.samples)),
            ("atmos_fSamples", Float(self.samples as f32)),
            ("atmos_fWeather", Float(self.weather)),
        ]
    }

    pub fn to_uniform(&self) -> SceneLightingUniform {
        let scale = self.scale();
        SceneLightingUniform {
            inv_wavelength: self.inv_wavelength().to_array(),
            inner_radius: self.inner_radius,
            inner_radius2: self.inner_radius * self.inner_radius,
            outer_radius: self.outer_radius,
            outer_radius2: self.outer_radius * self.outer_radius,
            kr_esun: self.kr * self.e_sun,
            km_esun: self.km * self.e_sun,
            kr_4pi: self.kr * 4.0 * PI,
            km_4pi: self.km * 4.0 * PI,
            scale,
            scale_depth: self.rayleigh_scale_depth,
            scale_over_scale_depth: scale / self.rayleigh_scale_depth,
            g: self.mie_phase,
            g2: self.mie_phase * self.mie_phase,
            n_samples: self.samples,
            f_samples: self.samples as f32,
            weather: self.weather,
            _padding: 0.0,
        }
    }
}

/// GPU-side scattering block. Matches the WGSL struct layout (80 bytes).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct SceneLightingUniform {
    /// (offset 0)
    pub inv_wavelength: [f32; 3],
    /// (offset 12)
    pub inner_radius: f32,
    pub inner_radius2: f32,
    pub outer_radius: f32,
    pub outer_radius2: f32,
    pub kr_esun: f32,
    /// (offset 32)
    pub km_esun: f32,
    pub kr_4pi: f32,
    pub km_4pi: f32,
    pub scale: f32,
    /// (offset 48)
    pub scale_depth: f32,
    pub scale_over_scale_depth: f32,
    pub g: f32,
    pub g2: f32,
    /// (offset 64)
    pub n_samples: i32,
    pub f_samples: f32,
    pub weather: f32,
    pub _padding: f32,
}
