//! GPU buffers for the shared sky geometry.

use crate::elements::{SkyElement, SkyElements};
use crate::mesh::SkyMesh;

/// Vertex (and, for indexed meshes, index) buffers of one element.
pub struct MeshBuffers {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: Option<wgpu::Buffer>,
    pub vertex_count: u32,
    pub index_count: u32,
    pub topology: wgpu::PrimitiveTopology,
}

impl MeshBuffers {
    pub fn upload(device: &wgpu::Device, label: &str, mesh: &SkyMesh) -> Self {
        use wgpu::util::DeviceExt;

        let vertices = mesh.to_vertices();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-vertices")),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let index_buffer = (!mesh.indices.is_empty()).then(|| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label}-indices")),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            })
        });

        Self {
            vertex_buffer,
            index_buffer,
            vertex_count: vertices.len() as u32,
            index_count: mesh.indices.len() as u32,
            topology: mesh.topology,
        }
    }

    /// Bind and draw into a pass whose pipeline uses [`SkyVertex::LAYOUT`](crate::mesh::SkyVertex::LAYOUT).
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        match &self.index_buffer {
            Some(index_buffer) => {
                render_pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..self.index_count, 0, 0..1);
            }
            None => render_pass.draw(0..self.vertex_count, 0..1),
        }
    }
}

/// GPU copies of all four element meshes. Uploaded once and shared by views.
pub struct SkyMeshBuffers {
    pub atmosphere: MeshBuffers,
    pub sun: MeshBuffers,
    pub moon: MeshBuffers,
    pub stars: MeshBuffers,
}

impl SkyMeshBuffers {
    pub fn upload(device: &wgpu::Device, elements: &SkyElements) -> Self {
        let upload = |name: &str, element: &SkyElement| MeshBuffers::upload(device, name, &element.mesh);
        let buffers = Self {
            atmosphere: upload("sky-atmosphere", &elements.atmosphere),
            sun: upload("sky-sun", &elements.sun),
            moon: upload("sky-moon", &elements.moon),
            stars: upload("sky-stars", &elements.stars),
        };
        log::debug!(
            "Uploaded sky geometry: {} vertices",
            buffers.atmosphere.vertex_count
                + buffers.sun.vertex_count
                + buffers.moon.vertex_count
                + buffers.stars.vertex_count
        );
        buffers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ellipsoid::Ellipsoid;
    use crate::ephemeris::SimpleEphemeris;
    use crate::sky::SkyState;
    use crate::texture::NoTextures;

    fn create_test_device() -> Option<wgpu::Device> {
        // Returns None on machines without an adapter.
        pollster::block_on(async {
            let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
                backends: wgpu::Backends::all(),
                ..Default::default()
            });

            let adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::default(),
                    force_fallback_adapter: false,
                    compatible_surface: None,
                })
                .await
                .ok()?;

            let (device, _queue) = adapter
                .request_device(&wgpu::DeviceDescriptor::default())
                .await
                .ok()?;

            Some(device)
        })
    }

    #[test]
    fn test_upload_matches_mesh_sizes() {
        let Some(device) = create_test_device() else {
            return;
        };
        let sky = SkyState::new(
            Ellipsoid::wgs84(),
            &geosky_config::SkyConfig::default(),
            Box::new(SimpleEphemeris),
            &NoTextures,
        );
        let elements = sky.elements();
        let buffers = SkyMeshBuffers::upload(&device, elements);

        assert_eq!(buffers.sun.vertex_count, 49);
        assert_eq!(buffers.sun.index_count, 48 * 3);
        assert_eq!(
            buffers.atmosphere.vertex_count as usize,
            elements.atmosphere.mesh.vertex_count()
        );
        assert!(buffers.stars.index_buffer.is_none());
        assert_eq!(buffers.stars.vertex_count as usize, sky.star_count());
        assert_eq!(
            buffers.moon.vertex_buffer.size(),
            (elements.moon.mesh.vertex_count() * std::mem::size_of::<crate::mesh::SkyVertex>())
                as u64
        );
    }
}
