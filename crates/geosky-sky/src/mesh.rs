//! CPU-side sky geometry: ellipsoid shells, billboard discs and point clouds.
//!
//! Builders here are pure functions of their inputs. The resulting
//! [`SkyMesh`] values are shared read-only between every attached view.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

use crate::ellipsoid::Ellipsoid;

/// Latitude tessellation of ellipsoid meshes. Longitude uses twice as many.
pub const ELLIPSOID_LAT_SEGMENTS: u32 = 100;

/// Number of fan triangles in a disc mesh.
pub const DISC_SEGMENTS: u32 = 48;

/// How colours are supplied for a mesh.
#[derive(Clone, Debug, PartialEq)]
pub enum ColorBinding {
    /// No colour array; shaders use their own.
    None,
    /// One colour for every vertex.
    Overall([f32; 4]),
    /// One colour per vertex, parallel to `positions`.
    PerVertex(Vec<[f32; 4]>),
}

/// Indexed (or point) geometry in single precision.
#[derive(Clone, Debug)]
pub struct SkyMesh {
    pub topology: wgpu::PrimitiveTopology,
    pub positions: Vec<Vec3>,
    /// Per-vertex outward normals, when requested.
    pub normals: Option<Vec<Vec3>>,
    /// Per-vertex texture coordinates, when requested.
    pub tex_coords: Option<Vec<Vec2>>,
    pub colors: ColorBinding,
    /// Triangle list indices. Empty for point clouds.
    pub indices: Vec<u32>,
}

impl SkyMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        match self.topology {
            wgpu::PrimitiveTopology::TriangleList => self.indices.len() / 3,
            _ => 0,
        }
    }

    /// Iterate the index triples of a triangle list.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Interleave attributes into GPU vertices. Missing attributes are zeroed,
    /// missing colours are white.
    pub fn to_vertices(&self) -> Vec<SkyVertex> {
        self.positions
            .iter()
            .enumerate()
            .map(|(i, position)| SkyVertex {
                position: position.to_array(),
                normal: self
                    .normals
                    .as_ref()
                    .map_or([0.0; 3], |n| n[i].to_array()),
                uv: self
                    .tex_coords
                    .as_ref()
                    .map_or([0.0; 2], |t| t[i].to_array()),
                color: match &self.colors {
                    ColorBinding::None => [1.0; 4],
                    ColorBinding::Overall(c) => *c,
                    ColorBinding::PerVertex(c) => c[i],
                },
            })
            .collect()
    }
}

/// Interleaved GPU vertex shared by every sky element.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct SkyVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl SkyVertex {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<SkyVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x3,
                offset: 0,
                shader_location: 0,
            },
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x3,
                offset: 12,
                shader_location: 1,
            },
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x2,
                offset: 24,
                shader_location: 2,
            },
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x4,
                offset: 32,
                shader_location: 3,
            },
        ],
    };
}

/// Build a lat/lon shell over `ellipsoid` whose equator sits at `radius`.
///
/// Uses [`ELLIPSOID_LAT_SEGMENTS`] latitude rows and twice as many longitude
/// columns.
pub fn build_ellipsoid_mesh(
    ellipsoid: &Ellipsoid,
    radius: f64,
    with_tex_coords_and_normals: bool,
) -> SkyMesh {
    build_ellipsoid_mesh_with_segments(
        ellipsoid,
        radius,
        with_tex_coords_and_normals,
        ELLIPSOID_LAT_SEGMENTS,
    )
}

/// [`build_ellipsoid_mesh`] with an explicit latitude segment count.
///
/// Produces `(lat_segments + 1) * 2 * lat_segments` vertices and
/// `lat_segments * 2 * lat_segments * 6` indices. The longitude seam wraps
/// back to column zero rather than duplicating vertices.
pub fn build_ellipsoid_mesh_with_segments(
    ellipsoid: &Ellipsoid,
    radius: f64,
    with_tex_coords_and_normals: bool,
    lat_segments: u32,
) -> SkyMesh {
    let height = radius - ellipsoid.equatorial_radius();
    let lon_segments = 2 * lat_segments;
    let segment_size = 180.0 / lat_segments as f64;
    let vertex_count = ((lat_segments + 1) * lon_segments) as usize;

    let mut positions = Vec::with_capacity(vertex_count);
    let mut normals = with_tex_coords_and_normals.then(|| Vec::with_capacity(vertex_count));
    let mut tex_coords = with_tex_coords_and_normals.then(|| Vec::with_capacity(vertex_count));
    let mut indices = Vec::with_capacity((lat_segments * lon_segments * 6) as usize);

    for y in 0..=lat_segments {
        let lat = -90.0 + segment_size * y as f64;
        for x in 0..lon_segments {
            let lon = -180.0 + segment_size * x as f64;
            let p = ellipsoid.geodetic_to_ecef(lat.to_radians(), lon.to_radians(), height);
            positions.push(p.as_vec3());

            if let Some(tex_coords) = tex_coords.as_mut() {
                let s = (lon + 180.0) / 360.0;
                let t = (lat + 90.0) / 180.0;
                tex_coords.push(Vec2::new(s as f32, t as f32));
            }
            if let Some(normals) = normals.as_mut() {
                normals.push(p.normalize_or_zero().as_vec3());
            }

            if y < lat_segments {
                let x_next = if x < lon_segments - 1 { x + 1 } else { 0 };
                let y_next = y + 1;
                indices.extend_from_slice(&[
                    y * lon_segments + x,
                    y_next * lon_segments + x,
                    y * lon_segments + x_next,
                    y * lon_segments + x_next,
                    y_next * lon_segments + x,
                    y_next * lon_segments + x_next,
                ]);
            }
        }
    }

    SkyMesh {
        topology: wgpu::PrimitiveTopology::TriangleList,
        positions,
        normals,
        tex_coords,
        colors: ColorBinding::None,
        indices,
    }
}

/// Build a filled disc of [`DISC_SEGMENTS`] fan triangles in the local XY
/// plane, centred on the origin. Vertex 0 is the fan centre.
pub fn build_disc_mesh(radius: f64) -> SkyMesh {
    let delta = 360.0 / DISC_SEGMENTS as f64;

    let mut positions = Vec::with_capacity(1 + DISC_SEGMENTS as usize);
    let mut indices = Vec::with_capacity(3 * DISC_SEGMENTS as usize);
    positions.push(Vec3::ZERO);

    for i in 0..DISC_SEGMENTS {
        let angle = (delta * i as f64).to_radians();
        positions.push(Vec3::new(
            (radius * angle.cos()) as f32,
            (radius * angle.sin()) as f32,
            0.0,
        ));

        let i_next = if i < DISC_SEGMENTS - 1 { i + 1 } else { 0 };
        indices.extend_from_slice(&[0, 1 + i_next, 1 + i]);
    }

    SkyMesh {
        topology: wgpu::PrimitiveTopology::TriangleList,
        positions,
        normals: None,
        tex_coords: None,
        colors: ColorBinding::None,
        indices,
    }
}

/// Build an unindexed point cloud with per-vertex colours.
pub fn build_point_cloud(positions: Vec<Vec3>, colors: Vec<[f32; 4]>) -> SkyMesh {
    debug_assert_eq!(positions.len(), colors.len());
    SkyMesh {
        topology: wgpu::PrimitiveTopology::PointList,
        positions,
        normals: None,
        tex_coords: None,
        colors: ColorBinding::PerVertex(colors),
        indices: Vec::new(),
    }
}
