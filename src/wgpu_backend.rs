//! [`GraphicsBackend`] implementation on wgpu.
//!
//! wgpu has no bindable framebuffer state, so the backend emulates it:
//! `bind_target` / `unbind_target` only select which texture the next render
//! pass writes to, and `clear` is folded into that pass as its load op.
//! Stages record their passes through [`WgpuBackend::encode_pass`] between
//! [`begin_frame`](WgpuBackend::begin_frame) and
//! [`finish_frame`](WgpuBackend::finish_frame).
//!
//! # Orientation
//!
//! Offscreen targets store their rows bottom-up: a stage drawing into one
//! negates clip-space Y (see [`WgpuBackend::quad_vertices`]). Sampling such a
//! target with the canonical coordinates therefore mirrors it vertically,
//! which is what the filter group's last-stage flip compensates for. The
//! default output is written top-down like any uploaded image.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::BackendError;
use crate::backend::{FilterMode, GraphicsBackend, TargetId, TextureId, TextureParams, WrapMode};
use crate::geometry::{Quad, QuadVertex, TexCoords};
use crate::gpu::GpuContext;

/// GPU storage behind a texture id.
struct Storage {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

#[derive(Default)]
struct TextureSlot {
    storage: Option<Storage>,
    sampler: Option<wgpu::Sampler>,
}

/// Texture and render-target bookkeeping for a [`GpuContext`].
pub struct WgpuBackend {
    gpu: GpuContext,
    next_id: u32,
    textures: HashMap<TextureId, TextureSlot>,
    targets: HashMap<TargetId, Option<TextureId>>,
    bound: Option<TargetId>,
    default_output: Option<TextureId>,
    pending_clear: Option<wgpu::Color>,
    encoder: Option<wgpu::CommandEncoder>,
    default_sampler: wgpu::Sampler,
}

impl WgpuBackend {
    pub fn new(gpu: GpuContext) -> Self {
        let default_sampler = create_sampler(&gpu.device, TextureParams::default());
        Self {
            gpu,
            next_id: 1,
            textures: HashMap::new(),
            targets: HashMap::new(),
            bound: None,
            default_output: None,
            pending_clear: None,
            encoder: None,
            default_sampler,
        }
    }

    pub fn gpu(&self) -> &GpuContext {
        &self.gpu
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.gpu.format()
    }

    /// Whether draws currently go to an offscreen target rather than the
    /// default output.
    pub fn is_offscreen_bound(&self) -> bool {
        self.bound.is_some()
    }

    /// Selects the texture that draws go to while no target is bound.
    pub fn set_default_output(&mut self, texture: TextureId) {
        self.default_output = Some(texture);
    }

    pub fn default_output(&self) -> Option<TextureId> {
        self.default_output
    }

    /// The view of a texture with storage, for binding as a shader input.
    pub fn view(&self, texture: TextureId) -> Result<&wgpu::TextureView, BackendError> {
        self.storage(texture).map(|storage| &storage.view)
    }

    /// The sampler set for `texture`, or linear clamped sampling if none was set.
    pub fn sampler(&self, texture: TextureId) -> &wgpu::Sampler {
        self.textures
            .get(&texture)
            .and_then(|slot| slot.sampler.as_ref())
            .unwrap_or(&self.default_sampler)
    }

    pub fn texture_size(&self, texture: TextureId) -> Option<(u32, u32)> {
        self.storage(texture)
            .ok()
            .map(|storage| (storage.width, storage.height))
    }

    /// Vertices for a quad draw into the currently selected output.
    pub fn quad_vertices(&self, geometry: &Quad, tex_coords: &TexCoords) -> [QuadVertex; 4] {
        quad_vertices(self.is_offscreen_bound(), geometry, tex_coords)
    }

    /// Starts recording a frame. Any unfinished frame is submitted first.
    pub fn begin_frame(&mut self) {
        if self.encoder.is_some() {
            self.finish_frame();
        }
        self.encoder = Some(
            self.gpu
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("filterkit frame"),
                }),
        );
    }

    /// Submits everything recorded since [`begin_frame`](Self::begin_frame).
    pub fn finish_frame(&mut self) {
        self.flush_clear();
        if let Some(encoder) = self.encoder.take() {
            self.gpu.queue.submit(std::iter::once(encoder.finish()));
        }
    }

    /// Records one render pass into the current output.
    ///
    /// A clear requested since the last pass becomes this pass's load op.
    pub fn encode_pass<F>(&mut self, label: &str, record: F) -> Result<(), BackendError>
    where
        F: FnOnce(&mut wgpu::RenderPass<'_>),
    {
        let view = output_view(&self.textures, &self.targets, self.bound, self.default_output)?;
        let encoder = self.encoder.as_mut().ok_or(BackendError::NoFrame)?;
        let load = match self.pending_clear.take() {
            Some(color) => wgpu::LoadOp::Clear(color),
            None => wgpu::LoadOp::Load,
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        record(&mut pass);
        Ok(())
    }

    /// Uploads an RGBA8 image into a new texture with default sampling.
    pub fn upload_rgba(&mut self, image: &image::RgbaImage) -> Result<TextureId, BackendError> {
        let (width, height) = image.dimensions();
        let texture = self.create_texture()?;
        if let Err(err) = self
            .allocate_texture(texture, width, height)
            .and_then(|()| self.set_texture_params(texture, TextureParams::default()))
        {
            self.delete_texture(texture);
            return Err(err);
        }

        let mut pixels = image.as_raw().clone();
        if is_bgra(self.format()) {
            swap_red_blue(&mut pixels);
        }

        let storage = self.storage(texture)?;
        self.gpu.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &storage.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        Ok(texture)
    }

    /// Registers a texture created elsewhere on the same device.
    ///
    /// It must have `TEXTURE_BINDING` usage to be drawn from, and
    /// `RENDER_ATTACHMENT` to be drawn into.
    pub fn import_texture(&mut self, texture: wgpu::Texture) -> TextureId {
        let id = TextureId(self.next_id());
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let (width, height) = (texture.width(), texture.height());
        self.textures.insert(
            id,
            TextureSlot {
                storage: Some(Storage {
                    texture,
                    view,
                    width,
                    height,
                }),
                sampler: None,
            },
        );
        id
    }

    /// Copies a texture back to the CPU, blocking until the GPU is done.
    ///
    /// Call after [`finish_frame`](Self::finish_frame); commands still being
    /// recorded are not included.
    pub fn read_rgba(&self, texture: TextureId) -> Result<image::RgbaImage, BackendError> {
        let storage = self.storage(texture)?;
        let (width, height) = (storage.width, storage.height);
        let unpadded = width * 4;
        let padded = padded_bytes_per_row(width);

        let buffer = self.gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("filterkit readback"),
            size: u64::from(padded) * u64::from(height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("filterkit readback"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &storage.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.gpu.queue.submit(std::iter::once(encoder.finish()));

        let slice = buffer.slice(..);
        let (sender, receiver) = futures_intrusive::channel::shared::oneshot_channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            // The receiver only goes away if this function already returned.
            let _ = sender.send(result);
        });
        self.gpu
            .device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|err| BackendError::Readback(err.to_string()))?;
        pollster::block_on(receiver.receive())
            .ok_or_else(|| BackendError::Readback("mapping callback dropped".into()))?
            .map_err(|err| BackendError::Readback(err.to_string()))?;

        let mut pixels = Vec::with_capacity((unpadded * height) as usize);
        {
            let data = slice.get_mapped_range();
            for row in data.chunks_exact(padded as usize) {
                pixels.extend_from_slice(&row[..unpadded as usize]);
            }
        }
        buffer.unmap();

        if is_bgra(storage.texture.format()) {
            swap_red_blue(&mut pixels);
        }
        image::RgbaImage::from_raw(width, height, pixels)
            .ok_or_else(|| BackendError::Readback("pixel buffer size mismatch".into()))
    }

    fn storage(&self, texture: TextureId) -> Result<&Storage, BackendError> {
        self.textures
            .get(&texture)
            .ok_or(BackendError::UnknownTexture(texture))?
            .storage
            .as_ref()
            .ok_or(BackendError::NoStorage(texture))
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Turns a clear that no pass consumed into a pass of its own.
    fn flush_clear(&mut self) {
        let Some(color) = self.pending_clear else {
            return;
        };
        if let Err(err) = self.encode_pass("filterkit clear", |_| {}) {
            warn!(?color, error = %err, "dropping clear with nowhere to go");
            self.pending_clear = None;
        }
    }

    fn create_storage(&self, width: u32, height: u32) -> Result<Storage, BackendError> {
        let max = self.gpu.max_texture_size();
        if width == 0 || height == 0 || width > max || height > max {
            return Err(BackendError::AllocationFailed {
                what: "texture",
                width,
                height,
                reason: format!("size must be between 1 and {max}"),
            });
        }

        let device = &self.gpu.device;
        device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("filterkit texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.format(),
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let validation = pollster::block_on(device.pop_error_scope());
        let out_of_memory = pollster::block_on(device.pop_error_scope());
        if let Some(err) = validation.or(out_of_memory) {
            return Err(BackendError::AllocationFailed {
                what: "texture",
                width,
                height,
                reason: err.to_string(),
            });
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(Storage {
            texture,
            view,
            width,
            height,
        })
    }
}

impl GraphicsBackend for WgpuBackend {
    fn create_texture(&mut self) -> Result<TextureId, BackendError> {
        let id = TextureId(self.next_id());
        self.textures.insert(id, TextureSlot::default());
        Ok(id)
    }

    fn allocate_texture(
        &mut self,
        texture: TextureId,
        width: u32,
        height: u32,
    ) -> Result<(), BackendError> {
        if !self.textures.contains_key(&texture) {
            return Err(BackendError::UnknownTexture(texture));
        }
        let storage = self.create_storage(width, height)?;
        if let Some(slot) = self.textures.get_mut(&texture) {
            slot.storage = Some(storage);
        }
        debug!(?texture, width, height, "allocated texture");
        Ok(())
    }

    fn set_texture_params(
        &mut self,
        texture: TextureId,
        params: TextureParams,
    ) -> Result<(), BackendError> {
        let sampler = create_sampler(&self.gpu.device, params);
        let slot = self
            .textures
            .get_mut(&texture)
            .ok_or(BackendError::UnknownTexture(texture))?;
        slot.sampler = Some(sampler);
        Ok(())
    }

    fn delete_texture(&mut self, texture: TextureId) {
        if let Some(slot) = self.textures.remove(&texture) {
            if let Some(storage) = slot.storage {
                storage.texture.destroy();
            }
        }
        if self.default_output == Some(texture) {
            self.default_output = None;
        }
    }

    fn create_target(&mut self) -> Result<TargetId, BackendError> {
        let id = TargetId(self.next_id());
        self.targets.insert(id, None);
        Ok(id)
    }

    fn attach_texture(&mut self, target: TargetId, texture: TextureId) -> Result<(), BackendError> {
        self.storage(texture)?;
        let attachment = self
            .targets
            .get_mut(&target)
            .ok_or(BackendError::UnknownTarget(target))?;
        *attachment = Some(texture);
        Ok(())
    }

    fn delete_target(&mut self, target: TargetId) {
        self.targets.remove(&target);
        if self.bound == Some(target) {
            self.bound = None;
        }
    }

    fn bind_target(&mut self, target: TargetId) {
        self.flush_clear();
        self.bound = Some(target);
    }

    fn unbind_target(&mut self) {
        self.flush_clear();
        self.bound = None;
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.pending_clear = Some(to_color(color));
    }
}

fn output_view<'a>(
    textures: &'a HashMap<TextureId, TextureSlot>,
    targets: &HashMap<TargetId, Option<TextureId>>,
    bound: Option<TargetId>,
    default_output: Option<TextureId>,
) -> Result<&'a wgpu::TextureView, BackendError> {
    let texture = match bound {
        Some(target) => targets
            .get(&target)
            .copied()
            .flatten()
            .ok_or(BackendError::UnknownTarget(target))?,
        None => default_output.ok_or(BackendError::NoOutput)?,
    };
    textures
        .get(&texture)
        .ok_or(BackendError::UnknownTexture(texture))?
        .storage
        .as_ref()
        .map(|storage| &storage.view)
        .ok_or(BackendError::NoStorage(texture))
}

/// Offscreen targets are written bottom-up, so their quads are mirrored in Y.
fn quad_vertices(offscreen: bool, geometry: &Quad, tex_coords: &TexCoords) -> [QuadVertex; 4] {
    if offscreen {
        geometry.flipped_y().with_tex_coords(tex_coords)
    } else {
        geometry.with_tex_coords(tex_coords)
    }
}

fn create_sampler(device: &wgpu::Device, params: TextureParams) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("filterkit sampler"),
        address_mode_u: address_mode(params.wrap_u),
        address_mode_v: address_mode(params.wrap_v),
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: filter_mode(params.mag_filter),
        min_filter: filter_mode(params.min_filter),
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}

fn address_mode(mode: WrapMode) -> wgpu::AddressMode {
    match mode {
        WrapMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
        WrapMode::Repeat => wgpu::AddressMode::Repeat,
    }
}

fn filter_mode(mode: FilterMode) -> wgpu::FilterMode {
    match mode {
        FilterMode::Nearest => wgpu::FilterMode::Nearest,
        FilterMode::Linear => wgpu::FilterMode::Linear,
    }
}

fn to_color([r, g, b, a]: [f32; 4]) -> wgpu::Color {
    wgpu::Color {
        r: f64::from(r),
        g: f64::from(g),
        b: f64::from(b),
        a: f64::from(a),
    }
}

/// Row pitch for a buffer copy of a `width`-pixel RGBA8 row.
fn padded_bytes_per_row(width: u32) -> u32 {
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    (width * 4).div_ceil(align) * align
}

fn is_bgra(format: wgpu::TextureFormat) -> bool {
    matches!(
        format,
        wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb
    )
}

fn swap_red_blue(pixels: &mut [u8]) {
    for pixel in pixels.chunks_exact_mut(4) {
        pixel.swap(0, 2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_padded_to_copy_alignment() {
        assert_eq!(padded_bytes_per_row(1), 256);
        assert_eq!(padded_bytes_per_row(64), 256);
        assert_eq!(padded_bytes_per_row(65), 512);
        assert_eq!(padded_bytes_per_row(640), 2560);
    }

    #[test]
    fn texture_params_map_to_wgpu() {
        assert_eq!(address_mode(WrapMode::Repeat), wgpu::AddressMode::Repeat);
        assert_eq!(
            address_mode(WrapMode::ClampToEdge),
            wgpu::AddressMode::ClampToEdge
        );
        assert_eq!(filter_mode(FilterMode::Nearest), wgpu::FilterMode::Nearest);
        assert_eq!(filter_mode(FilterMode::Linear), wgpu::FilterMode::Linear);
    }

    #[test]
    fn bgra_swizzle_swaps_red_and_blue() {
        let mut pixels = vec![1, 2, 3, 4, 5, 6, 7, 8];
        swap_red_blue(&mut pixels);
        assert_eq!(pixels, [3, 2, 1, 4, 7, 6, 5, 8]);
        assert!(is_bgra(wgpu::TextureFormat::Bgra8Unorm));
        assert!(!is_bgra(wgpu::TextureFormat::Rgba8Unorm));
    }

    #[test]
    fn transparent_clear_is_all_zero() {
        let color = to_color(crate::backend::TRANSPARENT);
        assert_eq!(color, wgpu::Color::TRANSPARENT);
    }

    #[test]
    fn unbound_output_requires_default() {
        let textures = HashMap::new();
        let targets = HashMap::new();
        assert!(matches!(
            output_view(&textures, &targets, None, None),
            Err(BackendError::NoOutput)
        ));
        assert!(matches!(
            output_view(&textures, &targets, Some(TargetId(3)), None),
            Err(BackendError::UnknownTarget(TargetId(3)))
        ));
        assert!(matches!(
            output_view(&textures, &targets, None, Some(TextureId(9))),
            Err(BackendError::UnknownTexture(TextureId(9)))
        ));
    }

    #[test]
    fn offscreen_quads_are_mirrored_vertically() {
        let onscreen = quad_vertices(false, &Quad::CUBE, &TexCoords::NO_ROTATION);
        let offscreen = quad_vertices(true, &Quad::CUBE, &TexCoords::NO_ROTATION);

        for (on, off) in onscreen.iter().zip(&offscreen) {
            assert_eq!(off.position, [on.position[0], -on.position[1]]);
            assert_eq!(off.tex_coord, on.tex_coord);
        }
        assert_eq!(onscreen[0].position, [-1.0, -1.0]);
    }

    mod gpu {
        use super::*;
        use crate::filter::Filter;
        use crate::group::{DrawStatus, FilterGroup};
        use crate::gpu::GpuConfig;
        use crate::shader_stage::ShaderStage;

        const PASSTHROUGH: &str = r#"
@fragment
fn fs(in: VertexOutput) -> @location(0) vec4f {
    return textureSample(input_texture, input_sampler, in.tex_coord);
}
"#;

        const RED: image::Rgba<u8> = image::Rgba([255, 0, 0, 255]);
        const GREEN: image::Rgba<u8> = image::Rgba([0, 255, 0, 255]);
        const BLUE: image::Rgba<u8> = image::Rgba([0, 0, 255, 255]);

        /// `None` on machines without any usable adapter.
        fn backend() -> Option<WgpuBackend> {
            GpuContext::new(GpuConfig::new().backends(wgpu::Backends::all()))
                .ok()
                .map(WgpuBackend::new)
        }

        /// Red top row, green left column below it, blue elsewhere.
        fn marked_image() -> image::RgbaImage {
            image::RgbaImage::from_fn(4, 4, |x, y| match (x, y) {
                (_, 0) => RED,
                (0, _) => GREEN,
                _ => BLUE,
            })
        }

        fn output_texture(backend: &mut WgpuBackend) -> TextureId {
            let output = backend.create_texture().unwrap();
            backend.allocate_texture(output, 4, 4).unwrap();
            backend.set_default_output(output);
            output
        }

        fn passthrough_group(count: usize) -> FilterGroup<WgpuBackend> {
            FilterGroup::with_filters(
                (0..count).map(|i| Filter::stage(ShaderStage::new(format!("pass{i}"), PASSTHROUGH))),
            )
        }

        fn run(
            backend: &mut WgpuBackend,
            group: &FilterGroup<WgpuBackend>,
            input: TextureId,
        ) -> DrawStatus {
            group.init(backend).unwrap();
            group.resize(4, 4);
            backend.begin_frame();
            let status = group
                .draw(backend, input, &Quad::CUBE, &TexCoords::NO_ROTATION)
                .unwrap();
            backend.finish_frame();
            status
        }

        #[test]
        fn pipelines_of_any_length_keep_the_image_upright() {
            let Some(mut backend) = backend() else {
                return;
            };
            let source = marked_image();
            let input = backend.upload_rgba(&source).unwrap();
            let output = output_texture(&mut backend);

            for count in 1..=4 {
                let group = passthrough_group(count);
                assert_eq!(run(&mut backend, &group, input), DrawStatus::Drawn);

                let result = backend.read_rgba(output).unwrap();
                assert_eq!(result, source, "count = {count}");
                group.destroy(&mut backend);
            }
        }

        #[test]
        fn clear_without_a_pass_still_reaches_the_output() {
            let Some(mut backend) = backend() else {
                return;
            };
            let output = output_texture(&mut backend);

            backend.begin_frame();
            backend.clear([1.0, 0.0, 0.0, 1.0]);
            backend.finish_frame();

            let result = backend.read_rgba(output).unwrap();
            assert!(result.pixels().all(|pixel| *pixel == RED));
        }

        #[test]
        fn clear_pending_at_unbind_lands_in_the_bound_target() {
            let Some(mut backend) = backend() else {
                return;
            };
            let output = output_texture(&mut backend);
            let target_texture = backend.create_texture().unwrap();
            backend.allocate_texture(target_texture, 4, 4).unwrap();
            let target = backend.create_target().unwrap();
            backend.attach_texture(target, target_texture).unwrap();

            backend.begin_frame();
            backend.clear([0.0, 0.0, 1.0, 1.0]);
            backend.bind_target(target);
            backend.clear([0.0, 1.0, 0.0, 1.0]);
            backend.unbind_target();
            backend.finish_frame();

            let target_pixels = backend.read_rgba(target_texture).unwrap();
            assert!(target_pixels.pixels().all(|pixel| *pixel == GREEN));
            let output_pixels = backend.read_rgba(output).unwrap();
            assert!(output_pixels.pixels().all(|pixel| *pixel == BLUE));
        }

        #[test]
        fn imported_texture_can_be_drawn_into() {
            let Some(mut backend) = backend() else {
                return;
            };
            let source = marked_image();
            let input = backend.upload_rgba(&source).unwrap();
            let texture = backend.gpu().device.create_texture(&wgpu::TextureDescriptor {
                label: Some("imported"),
                size: wgpu::Extent3d {
                    width: 4,
                    height: 4,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: backend.format(),
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                    | wgpu::TextureUsages::TEXTURE_BINDING
                    | wgpu::TextureUsages::COPY_SRC,
                view_formats: &[],
            });
            let imported = backend.import_texture(texture);
            assert_eq!(backend.texture_size(imported), Some((4, 4)));
            backend.set_default_output(imported);

            let group = passthrough_group(2);
            assert_eq!(run(&mut backend, &group, input), DrawStatus::Drawn);
            assert_eq!(backend.read_rgba(imported).unwrap(), source);
        }
    }
}
