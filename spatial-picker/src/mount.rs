use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use egui::Vec2;

use crate::BackendError;

/// Reference to the on-screen container the map widget renders into.
///
/// Clones share the attached flag, so the host can detach the container while
/// the element and the map backend still hold a reference.
#[derive(Debug, Clone)]
pub struct MountPoint {
    id: String,
    size: Vec2,
    attached: Arc<AtomicBool>,
}

impl MountPoint {
    pub fn new(id: impl Into<String>, size: Vec2) -> Self {
        Self {
            id: id.into(),
            size,
            attached: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }

    pub fn detach(&self) {
        self.attached.store(false, Ordering::Release);
    }

    /// The map widget measures its container on construction, so it must be
    /// attached and have a layout size.
    pub fn ensure_measurable(&self) -> Result<(), BackendError> {
        if !self.is_attached() {
            return Err(BackendError::Detached(self.id.clone()));
        }
        if self.size.x <= 0.0 || self.size.y <= 0.0 {
            return Err(BackendError::ZeroSizedMountPoint {
                id: self.id.clone(),
                width: self.size.x,
                height: self.size.y,
            });
        }
        Ok(())
    }
}
