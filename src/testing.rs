//! Recording doubles for the backend and stage interfaces.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::backend::{GraphicsBackend, TargetId, TextureId, TextureParams};
use crate::geometry::{Quad, TexCoords};
use crate::stage::Stage;
use crate::{BackendError, FilterError};

#[derive(Clone, Debug, PartialEq)]
pub struct DrawCall {
    pub label: String,
    pub input: TextureId,
    pub bound: Option<TargetId>,
    pub geometry: Quad,
    pub tex_coords: TexCoords,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    CreateTexture(TextureId),
    AllocateTexture(TextureId, u32, u32),
    SetParams(TextureId, TextureParams),
    DeleteTexture(TextureId),
    CreateTarget(TargetId),
    Attach(TargetId, TextureId),
    DeleteTarget(TargetId),
    Bind(TargetId),
    Unbind,
    Clear([f32; 4]),
    Draw(DrawCall),
}

/// A backend that records every call and hands out sequential handles.
pub struct RecordingBackend {
    pub calls: Vec<Call>,
    pub bound: Option<TargetId>,
    /// Deletions of handles that were not live.
    pub stray_deletes: usize,
    next_id: u32,
    textures: HashMap<TextureId, Option<(u32, u32)>>,
    params: HashMap<TextureId, TextureParams>,
    targets: HashSet<TargetId>,
    allocations_left: Option<usize>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            bound: None,
            stray_deletes: 0,
            next_id: 1,
            textures: HashMap::new(),
            params: HashMap::new(),
            targets: HashSet::new(),
            allocations_left: None,
        }
    }

    /// Lets `count` more texture allocations succeed, then fails the rest.
    pub fn fail_allocations_after(&mut self, count: usize) {
        self.allocations_left = Some(count);
    }

    pub fn allow_allocations(&mut self) {
        self.allocations_left = None;
    }

    pub fn targets_created(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, Call::CreateTarget(_)))
            .count()
    }

    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    pub fn live_targets(&self) -> usize {
        self.targets.len()
    }

    pub fn texture_size(&self, texture: TextureId) -> Option<(u32, u32)> {
        self.textures.get(&texture).copied().flatten()
    }

    pub fn texture_params(&self, texture: TextureId) -> Option<TextureParams> {
        self.params.get(&texture).copied()
    }

    pub fn draws(&self) -> Vec<DrawCall> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Draw(draw) => Some(draw.clone()),
                _ => None,
            })
            .collect()
    }

    /// `(target, texture)` pairs of live targets, in attach order.
    pub fn attached_textures(&self) -> Vec<(TargetId, TextureId)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Attach(target, texture) if self.targets.contains(target) => {
                    Some((*target, *texture))
                }
                _ => None,
            })
            .collect()
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl GraphicsBackend for RecordingBackend {
    fn create_texture(&mut self) -> Result<TextureId, BackendError> {
        let texture = TextureId(self.next_id());
        self.textures.insert(texture, None);
        self.calls.push(Call::CreateTexture(texture));
        Ok(texture)
    }

    fn allocate_texture(
        &mut self,
        texture: TextureId,
        width: u32,
        height: u32,
    ) -> Result<(), BackendError> {
        if let Some(left) = &mut self.allocations_left {
            if *left == 0 {
                return Err(BackendError::AllocationFailed {
                    what: "texture",
                    width,
                    height,
                    reason: "out of memory".into(),
                });
            }
            *left -= 1;
        }
        let slot = self
            .textures
            .get_mut(&texture)
            .ok_or(BackendError::UnknownTexture(texture))?;
        *slot = Some((width, height));
        self.calls.push(Call::AllocateTexture(texture, width, height));
        Ok(())
    }

    fn set_texture_params(
        &mut self,
        texture: TextureId,
        params: TextureParams,
    ) -> Result<(), BackendError> {
        if !self.textures.contains_key(&texture) {
            return Err(BackendError::UnknownTexture(texture));
        }
        self.params.insert(texture, params);
        self.calls.push(Call::SetParams(texture, params));
        Ok(())
    }

    fn delete_texture(&mut self, texture: TextureId) {
        if self.textures.remove(&texture).is_none() {
            self.stray_deletes += 1;
        }
        self.params.remove(&texture);
        self.calls.push(Call::DeleteTexture(texture));
    }

    fn create_target(&mut self) -> Result<TargetId, BackendError> {
        let target = TargetId(self.next_id());
        self.targets.insert(target);
        self.calls.push(Call::CreateTarget(target));
        Ok(target)
    }

    fn attach_texture(&mut self, target: TargetId, texture: TextureId) -> Result<(), BackendError> {
        if !self.targets.contains(&target) {
            return Err(BackendError::UnknownTarget(target));
        }
        self.calls.push(Call::Attach(target, texture));
        Ok(())
    }

    fn delete_target(&mut self, target: TargetId) {
        if !self.targets.remove(&target) {
            self.stray_deletes += 1;
        }
        self.calls.push(Call::DeleteTarget(target));
    }

    fn bind_target(&mut self, target: TargetId) {
        self.bound = Some(target);
        self.calls.push(Call::Bind(target));
    }

    fn unbind_target(&mut self) {
        self.bound = None;
        self.calls.push(Call::Unbind);
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.calls.push(Call::Clear(color));
    }
}

/// Counters shared between a [`RecordingStage`] and the test that made it.
#[derive(Debug, Default)]
pub struct StageLog {
    pub inits: usize,
    pub releases: usize,
    pub draws: Vec<TextureId>,
}

/// A stage that records its lifecycle and draws into the backend's call log.
pub struct RecordingStage {
    label: String,
    width: u32,
    height: u32,
    fail_draw: bool,
    log: Arc<Mutex<StageLog>>,
}

impl RecordingStage {
    pub fn new(label: &str, width: u32, height: u32) -> (Self, Arc<Mutex<StageLog>>) {
        let log = Arc::new(Mutex::new(StageLog::default()));
        let stage = Self {
            label: label.to_owned(),
            width,
            height,
            fail_draw: false,
            log: Arc::clone(&log),
        };
        (stage, log)
    }

    /// Makes every draw fail.
    pub fn failing(mut self) -> Self {
        self.fail_draw = true;
        self
    }
}

impl Stage<RecordingBackend> for RecordingStage {
    fn label(&self) -> &str {
        &self.label
    }

    fn init(&mut self, _backend: &mut RecordingBackend) -> Result<(), FilterError> {
        self.log.lock().inits += 1;
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn draw(
        &mut self,
        backend: &mut RecordingBackend,
        input: TextureId,
        geometry: &Quad,
        tex_coords: &TexCoords,
    ) -> Result<(), FilterError> {
        if self.fail_draw {
            return Err(FilterError::Stage {
                label: self.label.clone(),
                message: "draw failed".into(),
            });
        }
        self.log.lock().draws.push(input);
        backend.calls.push(Call::Draw(DrawCall {
            label: self.label.clone(),
            input,
            bound: backend.bound,
            geometry: *geometry,
            tex_coords: *tex_coords,
        }));
        Ok(())
    }

    fn release(&mut self, _backend: &mut RecordingBackend) {
        self.log.lock().releases += 1;
    }

    fn output_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
