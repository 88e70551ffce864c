//! Built-in shader stages.

use crate::FilterError;
use crate::backend::TextureId;
use crate::geometry::{Quad, TexCoords};
use crate::shader_stage::ShaderStage;
use crate::stage::Stage;
use crate::wgpu_backend::WgpuBackend;

const GRAYSCALE: &str = r#"
const LUMINANCE = vec3f(0.2125, 0.7154, 0.0721);

@fragment
fn fs(in: VertexOutput) -> @location(0) vec4f {
    let color = textureSample(input_texture, input_sampler, in.tex_coord);
    return vec4f(vec3f(dot(color.rgb, LUMINANCE)), color.a);
}
"#;

const INVERT: &str = r#"
@fragment
fn fs(in: VertexOutput) -> @location(0) vec4f {
    let color = textureSample(input_texture, input_sampler, in.tex_coord);
    return vec4f(1.0 - color.rgb, color.a);
}
"#;

// Expects grayscale input; only the red channel is read.
const SOBEL_THRESHOLD: &str = r#"
fn intensity(uv: vec2f) -> f32 {
    return textureSample(input_texture, input_sampler, uv).r;
}

@fragment
fn fs(in: VertexOutput) -> @location(0) vec4f {
    let offset = u.texel_size * u.params.x;
    let dx = vec2f(offset.x, 0.0);
    let dy = vec2f(0.0, offset.y);
    let uv = in.tex_coord;

    let top_left = intensity(uv - dx - dy);
    let top = intensity(uv - dy);
    let top_right = intensity(uv + dx - dy);
    let left = intensity(uv - dx);
    let right = intensity(uv + dx);
    let bottom_left = intensity(uv - dx + dy);
    let bottom = intensity(uv + dy);
    let bottom_right = intensity(uv + dx + dy);

    let h = -top_left - 2.0 * top - top_right + bottom_left + 2.0 * bottom + bottom_right;
    let v = -bottom_left - 2.0 * left - top_left + bottom_right + 2.0 * right + top_right;
    let magnitude = step(u.params.y, 1.0 - length(vec2f(h, v)));
    return vec4f(vec3f(magnitude), 1.0);
}
"#;

/// Implements [`Stage`] for a newtype over [`ShaderStage`] stored in `.0`.
macro_rules! shader_stage_newtype {
    ($name:ident) => {
        impl Stage<WgpuBackend> for $name {
            fn label(&self) -> &str {
                self.0.label()
            }

            fn init(&mut self, backend: &mut WgpuBackend) -> Result<(), FilterError> {
                self.0.init(backend)
            }

            fn resize(&mut self, width: u32, height: u32) {
                self.0.resize(width, height);
            }

            fn draw(
                &mut self,
                backend: &mut WgpuBackend,
                input: TextureId,
                geometry: &Quad,
                tex_coords: &TexCoords,
            ) -> Result<(), FilterError> {
                self.0.draw(backend, input, geometry, tex_coords)
            }

            fn release(&mut self, backend: &mut WgpuBackend) {
                self.0.release(backend);
            }

            fn output_size(&self) -> (u32, u32) {
                self.0.output_size()
            }
        }
    };
}

/// Converts to luminance, keeping alpha.
pub struct GrayscaleStage(ShaderStage);

impl GrayscaleStage {
    pub fn new() -> Self {
        Self(ShaderStage::new("grayscale", GRAYSCALE))
    }
}

impl Default for GrayscaleStage {
    fn default() -> Self {
        Self::new()
    }
}

shader_stage_newtype!(GrayscaleStage);

/// Inverts color channels, keeping alpha.
pub struct InvertStage(ShaderStage);

impl InvertStage {
    pub fn new() -> Self {
        Self(ShaderStage::new("invert", INVERT))
    }
}

impl Default for InvertStage {
    fn default() -> Self {
        Self::new()
    }
}

shader_stage_newtype!(InvertStage);

/// Sobel edge detection with a hard threshold: edges come out black on white.
///
/// `line_size` scales the sampling distance in pixels; `threshold` is the
/// cutoff applied to the inverted gradient magnitude.
pub struct SobelThresholdStage(ShaderStage);

impl SobelThresholdStage {
    pub const DEFAULT_LINE_SIZE: f32 = 1.0;
    pub const DEFAULT_THRESHOLD: f32 = 0.9;

    pub fn new() -> Self {
        let mut stage = ShaderStage::new("sobel threshold", SOBEL_THRESHOLD);
        stage.set_params([Self::DEFAULT_LINE_SIZE, Self::DEFAULT_THRESHOLD]);
        Self(stage)
    }

    pub fn line_size(&self) -> f32 {
        self.0.params()[0]
    }

    pub fn set_line_size(&mut self, line_size: f32) {
        let [_, threshold] = self.0.params();
        self.0.set_params([line_size, threshold]);
    }

    pub fn threshold(&self) -> f32 {
        self.0.params()[1]
    }

    pub fn set_threshold(&mut self, threshold: f32) {
        let [line_size, _] = self.0.params();
        self.0.set_params([line_size, threshold]);
    }
}

impl Default for SobelThresholdStage {
    fn default() -> Self {
        Self::new()
    }
}

shader_stage_newtype!(SobelThresholdStage);
