//! Procedural sky for geospatial scenes: atmosphere, sun, moon and stars
//! positioned from a simulated date/time, with independent state per view.

pub mod catalog;
mod default_stars;
pub mod elements;
pub mod ellipsoid;
pub mod ephemeris;
pub mod gpu;
pub mod light;
pub mod mesh;
pub mod node;
pub mod scattering;
pub mod sky;
pub mod texture;
pub mod view;

pub use catalog::{CatalogError, StarRecord, default_stars, load_stars, parse_star_catalog};
pub use elements::{SkyElement, SkyElementKind, SkyElements};
pub use ellipsoid::Ellipsoid;
pub use ephemeris::{Ephemeris, SimpleEphemeris, star_rotation_angle, stars_matrix};
pub use gpu::{MeshBuffers, SkyMeshBuffers};
pub use light::SkyLight;
pub use mesh::{SkyMesh, SkyVertex, build_disc_mesh, build_ellipsoid_mesh};
pub use node::{
    BoundingSphere, CullGroup, CullVisitor, CulledElement, NodeVisitor, NotCulling, SkyNode,
    auto_ambient,
};
pub use scattering::{SceneLighting, SceneLightingUniform, UniformValue};
pub use sky::SkyState;
pub use texture::{FileTextureSource, NoTextures, SkyTexture, TextureError, TextureSource};
pub use view::{HostView, PerViewData, SkyTransform, ViewId, ViewKey};
