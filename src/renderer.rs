// renderer.rs: wgpu sphere renderer with an egui overlay

use std::sync::Arc;

use anyhow::{anyhow, Context};
use glam::{Mat4, Vec3};
use image::{GenericImage, Rgba, RgbaImage};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::mesh::{SphereMesh, SphereVertex};
use crate::texture::SphereSurface;
use crate::viewer::{view_matrix, Projection, SceneBackend};

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct CameraUniform {
    view_proj: [[f32; 4]; 4],
}

struct PreparedUi {
    primitives: Vec<egui::ClippedPrimitive>,
    free: Vec<egui::TextureId>,
    pixels_per_point: f32,
}

struct SphereBuffers {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

pub struct Renderer {
    surface: wgpu::Surface,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,
    render_pipeline: wgpu::RenderPipeline,

    texture_bind_group_layout: wgpu::BindGroupLayout,
    diffuse_bind_group: wgpu::BindGroup,
    texture: wgpu::Texture,
    sampler: wgpu::Sampler,

    projection: Mat4,
    view: Mat4,
    camera_buffer: wgpu::Buffer,
    sphere: Option<SphereBuffers>,

    pub egui_ctx: egui::Context,
    pub egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
    pending_ui: Option<PreparedUi>,

    // declared last: the surface must be dropped before its window
    window: Arc<Window>,
}

/// Scales images beyond the GPU limit and pads short ones at the top so the
/// texture is at least 2:1.
fn fit_equirect(img: RgbaImage, max_dimension: u32) -> RgbaImage {
    let (src_w, src_h) = img.dimensions();

    let img = if src_w > max_dimension || src_h > max_dimension {
        let scale = (max_dimension as f32 / src_w.max(src_h) as f32).min(1.0);
        let new_w = ((src_w as f32 * scale) as u32).max(1);
        let new_h = ((src_h as f32 * scale) as u32).max(1);
        log::warn!(
            "{}",
            crate::i18n::tr_with(
                "gpu.image_too_large_scaled",
                &[
                    ("src_w", src_w.to_string()),
                    ("src_h", src_h.to_string()),
                    ("max", max_dimension.to_string()),
                    ("new_w", new_w.to_string()),
                    ("new_h", new_h.to_string()),
                ]
            )
        );
        image::DynamicImage::ImageRgba8(img)
            .resize(new_w, new_h, image::imageops::FilterType::Lanczos3)
            .to_rgba8()
    } else {
        img
    };

    let (w, h) = img.dimensions();
    let target_h = w / 2;
    if target_h > 0 && h < target_h {
        let mut canvas = RgbaImage::from_pixel(w, target_h, Rgba([0, 0, 0, 255]));
        // y offset keeps the copy in bounds
        let _ = canvas.copy_from(&img, 0, target_h - h);
        canvas
    } else {
        img
    }
}

fn create_surface_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    camera_buffer: &wgpu::Buffer,
    sampler: &wgpu::Sampler,
    img: &RgbaImage,
) -> (wgpu::Texture, wgpu::BindGroup) {
    let (width, height) = img.dimensions();
    let texture_size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        size: texture_size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        label: Some("sphere_texture"),
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        img,
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        texture_size,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry { binding: 0, resource: camera_buffer.as_entire_binding() },
            wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::TextureView(&view) },
            wgpu::BindGroupEntry { binding: 2, resource: wgpu::BindingResource::Sampler(sampler) },
        ],
        label: Some("sphere_bind_group"),
    });

    (texture, bind_group)
}

impl Renderer {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // The window is kept alive by the Arc held in `Self`.
        let surface = unsafe { instance.create_surface(window.as_ref()) }
            .context("cannot create drawing surface")?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow!("no compatible graphics adapter"))?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    features: wgpu::Features::empty(),
                    limits: wgpu::Limits::default().using_resolution(adapter.limits()),
                    label: None,
                },
                None,
            )
            .await
            .context("cannot open graphics device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| anyhow!("surface reports no texture formats"))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let camera_uniform = CameraUniform {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
        };
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[camera_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let texture_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
            label: Some("sphere_bind_group_layout"),
        });

        // black until the background request completes
        let placeholder = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]));
        let (texture, diffuse_bind_group) = create_surface_texture(
            &device,
            &queue,
            &texture_bind_group_layout,
            &camera_buffer,
            &sampler,
            &placeholder,
        );

        let shader = device.create_shader_module(wgpu::include_wgsl!("shader_sphere.wgsl"));
        let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sphere Pipeline Layout"),
            bind_group_layouts: &[&texture_bind_group_layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Sphere Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[SphereVertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // the inverted sphere's faces point at the camera
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        });

        let egui_ctx = egui::Context::default();
        let mut egui_state = egui_winit::State::new(window.as_ref());
        egui_state.set_pixels_per_point(window.scale_factor() as f32);
        let egui_renderer = egui_wgpu::Renderer::new(&device, config.format, None, 1);

        log::info!("renderer ready: {:?}, {}x{}", config.format, config.width, config.height);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            render_pipeline,
            texture_bind_group_layout,
            diffuse_bind_group,
            texture,
            sampler,
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            camera_buffer,
            sphere: None,
            egui_ctx,
            egui_state,
            egui_renderer,
            pending_ui: None,
            window,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    fn write_camera(&mut self) {
        let uniform = CameraUniform {
            view_proj: (self.projection * self.view).to_cols_array_2d(),
        };
        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[uniform]));
    }

    fn upload_surface(&mut self, img: RgbaImage) {
        let img = fit_equirect(img, self.device.limits().max_texture_dimension_2d);
        let (texture, bind_group) = create_surface_texture(
            &self.device,
            &self.queue,
            &self.texture_bind_group_layout,
            &self.camera_buffer,
            &self.sampler,
            &img,
        );
        self.texture.destroy();
        self.texture = texture;
        self.diffuse_bind_group = bind_group;
    }

    /// Runs the UI for the coming frame. Texture updates are uploaded now;
    /// the tessellated shapes are drawn by the next `render_frame`.
    pub fn prepare_ui(&mut self, run_ui: impl FnOnce(&egui::Context)) {
        let raw_input = self.egui_state.take_egui_input(&self.window);
        let full_output = self.egui_ctx.run(raw_input, run_ui);

        self.egui_state
            .handle_platform_output(&self.window, &self.egui_ctx, full_output.platform_output);
        let primitives = self.egui_ctx.tessellate(full_output.shapes);

        for (id, delta) in &full_output.textures_delta.set {
            self.egui_renderer.update_texture(&self.device, &self.queue, *id, delta);
        }

        let mut free = full_output.textures_delta.free;
        if let Some(stale) = self.pending_ui.take() {
            free.extend(stale.free);
        }

        self.pending_ui = Some(PreparedUi {
            primitives,
            free,
            pixels_per_point: self.window.scale_factor() as f32,
        });
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Sphere Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: true,
                    },
                })],
                depth_stencil_attachment: None,
            });

            if let Some(sphere) = &self.sphere {
                render_pass.set_pipeline(&self.render_pipeline);
                render_pass.set_bind_group(0, &self.diffuse_bind_group, &[]);
                render_pass.set_vertex_buffer(0, sphere.vertices.slice(..));
                render_pass.set_index_buffer(sphere.indices.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..sphere.index_count, 0, 0..1);
            }
        }

        let ui = self.pending_ui.take();
        if let Some(ui) = &ui {
            let screen_descriptor = egui_wgpu::renderer::ScreenDescriptor {
                size_in_pixels: [self.config.width, self.config.height],
                pixels_per_point: ui.pixels_per_point,
            };

            self.egui_renderer.update_buffers(
                &self.device,
                &self.queue,
                &mut encoder,
                &ui.primitives,
                &screen_descriptor,
            );

            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations { load: wgpu::LoadOp::Load, store: true },
                })],
                depth_stencil_attachment: None,
            });
            self.egui_renderer.render(&mut render_pass, &ui.primitives, &screen_descriptor);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        if let Some(ui) = ui {
            for id in &ui.free {
                self.egui_renderer.free_texture(id);
            }
        }

        Ok(())
    }
}

impl SceneBackend for Renderer {
    type Error = wgpu::SurfaceError;

    fn set_projection(&mut self, projection: &Projection) {
        self.projection = projection.matrix();
        self.write_camera();
    }

    fn set_sphere(&mut self, mesh: &SphereMesh) {
        let vertices = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sphere Vertices"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let indices = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sphere Indices"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        self.sphere = Some(SphereBuffers {
            vertices,
            indices,
            index_count: mesh.indices.len() as u32,
        });
    }

    fn set_sphere_surface(&mut self, surface: SphereSurface) {
        match surface {
            SphereSurface::Texture(img) => self.upload_surface(img),
            color @ SphereSurface::Color(_) => self.upload_surface(color.to_rgba()),
        }
    }

    fn look_at(&mut self, target: Vec3) {
        self.view = view_matrix(target);
        self.write_camera();
    }

    fn render_frame(&mut self) -> Result<(), Self::Error> {
        self.render()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_images_are_padded_to_two_by_one() {
        let img = RgbaImage::from_pixel(8, 2, Rgba([200, 0, 0, 255]));
        let fitted = fit_equirect(img, 8192);
        assert_eq!(fitted.dimensions(), (8, 4));
        assert_eq!(fitted.get_pixel(0, 0).0, [0, 0, 0, 255]);
        assert_eq!(fitted.get_pixel(0, 3).0, [200, 0, 0, 255]);
    }

    #[test]
    fn oversized_images_are_scaled_to_the_limit() {
        let img = RgbaImage::from_pixel(64, 32, Rgba([1, 2, 3, 255]));
        let fitted = fit_equirect(img, 16);
        assert_eq!(fitted.dimensions(), (16, 8));
    }

    #[test]
    fn colour_swatch_is_left_alone() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([0x1a, 0x1a, 0x2e, 255]));
        assert_eq!(fit_equirect(img, 16).dimensions(), (1, 1));
    }
}
