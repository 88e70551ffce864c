//! Full-quad WGSL stages.

use std::borrow::Cow;

use wgpu::util::DeviceExt;

use crate::FilterError;
use crate::backend::TextureId;
use crate::geometry::{Quad, QuadVertex, TexCoords};
use crate::stage::Stage;
use crate::wgpu_backend::WgpuBackend;

/// Declarations shared by every shader stage. The stage's own source is
/// appended and must define the fragment entry point `fs`.
pub const SHADER_PRELUDE: &str = r#"
struct Uniforms {
    texel_size: vec2f,
    params: vec2f,
}

struct VertexOutput {
    @builtin(position) position: vec4f,
    @location(0) tex_coord: vec2f,
}

@group(0) @binding(0) var<uniform> u: Uniforms;
@group(0) @binding(1) var input_texture: texture_2d<f32>;
@group(0) @binding(2) var input_sampler: sampler;

@vertex
fn vs(@location(0) position: vec2f, @location(1) tex_coord: vec2f) -> VertexOutput {
    var out: VertexOutput;
    out.position = vec4f(position, 0.0, 1.0);
    out.tex_coord = tex_coord;
    return out;
}
"#;

/// Uniforms visible to every shader stage.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct StageUniforms {
    /// Size of one output pixel in texture coordinates.
    pub texel_size: [f32; 2],
    /// Stage-specific parameters.
    pub params: [f32; 2],
}

struct Pipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

/// A stage that runs one WGSL fragment shader over a full quad.
///
/// The fragment source sees the declarations in [`SHADER_PRELUDE`]:
///
/// ```wgsl
/// @fragment
/// fn fs(in: VertexOutput) -> @location(0) vec4f {
///     return textureSample(input_texture, input_sampler, in.tex_coord);
/// }
/// ```
pub struct ShaderStage {
    label: String,
    fragment: Cow<'static, str>,
    params: [f32; 2],
    width: u32,
    height: u32,
    pipeline: Option<Pipeline>,
}

impl ShaderStage {
    pub fn new(label: impl Into<String>, fragment: impl Into<Cow<'static, str>>) -> Self {
        Self {
            label: label.into(),
            fragment: fragment.into(),
            params: [0.0; 2],
            width: 1,
            height: 1,
            pipeline: None,
        }
    }

    pub fn params(&self) -> [f32; 2] {
        self.params
    }

    /// Sets `u.params`. Takes effect on the next draw.
    pub fn set_params(&mut self, params: [f32; 2]) {
        self.params = params;
    }

    /// The full WGSL module compiled for this stage.
    pub fn source(&self) -> String {
        format!("{SHADER_PRELUDE}\n{}", self.fragment)
    }

    pub fn uniforms(&self) -> StageUniforms {
        StageUniforms {
            texel_size: [1.0 / self.width.max(1) as f32, 1.0 / self.height.max(1) as f32],
            params: self.params,
        }
    }

    fn build_pipeline(&self, backend: &WgpuBackend) -> Result<Pipeline, FilterError> {
        let device = &backend.gpu().device;
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&self.label),
            source: wgpu::ShaderSource::Wgsl(self.source().into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&self.label),
            entries: &[
                // Uniforms
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Input texture
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                // Sampler
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&self.label),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&self.label),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                buffers: &[QuadVertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: backend.format(),
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            // Offscreen draws mirror the quad, so winding is not fixed.
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(FilterError::Shader {
                label: self.label.clone(),
                message: err.to_string(),
            });
        }

        Ok(Pipeline {
            pipeline,
            bind_group_layout,
        })
    }
}

impl Stage<WgpuBackend> for ShaderStage {
    fn label(&self) -> &str {
        &self.label
    }

    fn init(&mut self, backend: &mut WgpuBackend) -> Result<(), FilterError> {
        self.pipeline = Some(self.build_pipeline(backend)?);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn draw(
        &mut self,
        backend: &mut WgpuBackend,
        input: TextureId,
        geometry: &Quad,
        tex_coords: &TexCoords,
    ) -> Result<(), FilterError> {
        let Some(pipeline) = &self.pipeline else {
            return Err(FilterError::Stage {
                label: self.label.clone(),
                message: "drawn before init".into(),
            });
        };

        // Per-draw buffers: queue writes would land before the whole frame,
        // not before this pass.
        let device = &backend.gpu().device;
        let vertices = backend.quad_vertices(geometry, tex_coords);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&self.label),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&self.label),
            contents: bytemuck::cast_slice(&[self.uniforms()]),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&self.label),
            layout: &pipeline.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(backend.view(input)?),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(backend.sampler(input)),
                },
            ],
        });

        backend.encode_pass(&self.label, |pass| {
            pass.set_pipeline(&pipeline.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.set_vertex_buffer(0, vertex_buffer.slice(..));
            pass.draw(0..4, 0..1);
        })?;
        Ok(())
    }

    fn release(&mut self, _backend: &mut WgpuBackend) {
        self.pipeline = None;
    }

    fn output_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PASSTHROUGH: &str = r#"
@fragment
fn fs(in: VertexOutput) -> @location(0) vec4f {
    return textureSample(input_texture, input_sampler, in.tex_coord);
}
"#;

    #[test]
    fn source_appends_fragment_to_prelude() {
        let stage = ShaderStage::new("passthrough", PASSTHROUGH);
        let source = stage.source();
        assert!(source.starts_with(SHADER_PRELUDE));
        assert!(source.contains("fn fs("));
        assert!(source.contains("fn vs("));
    }

    #[test]
    fn uniforms_follow_size_and_params() {
        let mut stage = ShaderStage::new("passthrough", PASSTHROUGH);
        stage.resize(4, 8);
        stage.set_params([2.0, 0.5]);

        let uniforms = stage.uniforms();
        assert_eq!(uniforms.texel_size, [0.25, 0.125]);
        assert_eq!(uniforms.params, [2.0, 0.5]);
        assert_eq!(std::mem::size_of::<StageUniforms>(), 16);
        assert_eq!(stage.output_size(), (4, 8));
    }

    #[test]
    fn zero_size_does_not_divide_by_zero() {
        let mut stage = ShaderStage::new("passthrough", PASSTHROUGH);
        stage.resize(0, 0);
        assert_eq!(stage.uniforms().texel_size, [1.0, 1.0]);
    }
}
