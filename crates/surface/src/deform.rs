use crate::geometry::Geometry;
use glam::Vec3;
use std::f32::consts::PI;

/// Base vertices closer to the origin than this cannot be re-projected.
pub const MIN_RADIAL_LENGTH: f32 = 1e-6;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SurfaceError {
    #[error("vertex {index} at {position:?} is too close to the origin to displace")]
    DegenerateVertex { index: usize, position: Vec3 },
    #[error("vertex {index} has a non-finite coordinate")]
    NonFiniteVertex { index: usize },
    #[error("output buffer holds {actual} vertices, base has {expected}")]
    MismatchedBuffers { expected: usize, actual: usize },
    #[error("radius must be positive and finite, got {0}")]
    InvalidRadius(f32),
}

/// Time-varying radial offset: `amplitude · sin(f·x + t) · cos(f·y + t)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ripple {
    pub amplitude: f32,
    pub frequency: f32,
}

impl Default for Ripple {
    fn default() -> Self {
        Self {
            amplitude: 0.3,
            frequency: PI,
        }
    }
}

impl Ripple {
    pub fn with_amplitude(amplitude: f32) -> Self {
        Self {
            amplitude,
            ..Self::default()
        }
    }

    pub fn offset(&self, base: Vec3, time: f32) -> f32 {
        self.amplitude
            * (self.frequency * base.x + time).sin()
            * (self.frequency * base.y + time).cos()
    }
}

/// Re-project every base vertex to distance `radius + ripple offset` from the
/// origin, writing into `out`.
pub fn displace(
    base: &[Vec3],
    radius: f32,
    ripple: &Ripple,
    time: f32,
    out: &mut [Vec3],
) -> Result<(), SurfaceError> {
    if out.len() != base.len() {
        return Err(SurfaceError::MismatchedBuffers {
            expected: base.len(),
            actual: out.len(),
        });
    }
    for (live, &position) in out.iter_mut().zip(base) {
        let scale = (radius + ripple.offset(position, time)) / position.length();
        *live = position * scale;
    }
    Ok(())
}

/// A mesh whose live vertex buffer is recomputed from an immutable base every
/// frame. The dirty flag tells the renderer the live buffer needs uploading.
#[derive(Debug, Clone)]
pub struct DeformableMesh {
    base: Vec<Vec3>,
    live: Vec<Vec3>,
    radius: f32,
    ripple: Ripple,
    dirty: bool,
}

impl DeformableMesh {
    /// Capture `geometry`'s positions as the base buffer.
    ///
    /// Rejects vertices at the origin, where the radial direction is undefined.
    pub fn new(geometry: &Geometry, radius: f32, ripple: Ripple) -> Result<Self, SurfaceError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(SurfaceError::InvalidRadius(radius));
        }
        for (index, position) in geometry.positions.iter().enumerate() {
            if !position.is_finite() {
                return Err(SurfaceError::NonFiniteVertex { index });
            }
            if position.length() < MIN_RADIAL_LENGTH {
                return Err(SurfaceError::DegenerateVertex {
                    index,
                    position: *position,
                });
            }
        }
        let base = geometry.positions.clone();
        tracing::debug!(vertices = base.len(), radius, "deformable mesh created");
        Ok(Self {
            live: base.clone(),
            base,
            radius,
            ripple,
            dirty: true,
        })
    }

    /// Overwrite the live buffer for `time` (seconds) and mark it dirty.
    pub fn compute_frame(&mut self, time: f32) {
        // Lengths match by construction, so this cannot fail.
        if let Err(err) = displace(&self.base, self.radius, &self.ripple, time, &mut self.live) {
            tracing::error!(%err, "displacement skipped");
            return;
        }
        self.dirty = true;
    }

    pub fn base_positions(&self) -> &[Vec3] {
        &self.base
    }

    pub fn live_positions(&self) -> &[Vec3] {
        &self.live
    }

    pub fn vertex_count(&self) -> usize {
        self.base.len()
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn ripple(&self) -> &Ripple {
        &self.ripple
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Return and clear the dirty flag; call once the live buffer is uploaded.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}
