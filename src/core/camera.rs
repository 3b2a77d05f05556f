//! Camera state for the isometric city view

use std::f32::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::{Result, Vec2};

/// Allowed ranges for the camera zoom ("distance") and perspective angle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraLimits {
    pub min_distance: f32,
    pub max_distance: f32,
    /// Radians
    pub min_angle: f32,
    /// Radians
    pub max_angle: f32,
}

impl CameraLimits {
    /// Create validated limits.
    ///
    /// Distances must be positive and the angle range must lie strictly inside
    /// `(0, PI/2)`, otherwise the inverse projection would be singular.
    pub fn new(min_distance: f32, max_distance: f32, min_angle: f32, max_angle: f32) -> Result<Self> {
        let limits = Self { min_distance, max_distance, min_angle, max_angle };
        limits.validate()?;
        Ok(limits)
    }

    /// Check the limits for internal consistency.
    pub fn validate(&self) -> Result<()> {
        let values = [self.min_distance, self.max_distance, self.min_angle, self.max_angle];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidCameraLimits("limits must be finite".into()));
        }
        if self.min_distance <= 0.0 || self.min_distance > self.max_distance {
            return Err(Error::InvalidCameraLimits(format!(
                "distance range [{}, {}] must be positive and ordered",
                self.min_distance, self.max_distance
            )));
        }
        if self.min_angle <= 0.0 || self.max_angle >= FRAC_PI_2 || self.min_angle > self.max_angle {
            return Err(Error::InvalidCameraLimits(format!(
                "angle range [{}, {}] must be ordered and inside (0, pi/2)",
                self.min_angle, self.max_angle
            )));
        }
        Ok(())
    }

    pub fn clamp_distance(&self, distance: f32) -> f32 {
        distance.clamp(self.min_distance, self.max_distance)
    }

    pub fn clamp_angle(&self, angle: f32) -> f32 {
        angle.clamp(self.min_angle, self.max_angle)
    }
}

impl Default for CameraLimits {
    fn default() -> Self {
        Self {
            min_distance: 0.5,
            max_distance: 2.0,
            min_angle: 0.3,
            max_angle: std::f32::consts::FRAC_PI_4,
        }
    }
}

/// A partial camera write. Unset fields are left untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CameraUpdate {
    pub offset: Option<Vec2>,
    pub distance: Option<f32>,
    pub angle: Option<f32>,
}

impl CameraUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(mut self, offset: Vec2) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn distance(mut self, distance: f32) -> Self {
        self.distance = Some(distance);
        self
    }

    pub fn angle(mut self, angle: f32) -> Self {
        self.angle = Some(angle);
        self
    }

    /// Whether the update carries no fields at all
    pub fn is_empty(&self) -> bool {
        self.offset.is_none() && self.distance.is_none() && self.angle.is_none()
    }
}

/// Pan/zoom/tilt state of the isometric camera.
///
/// Every effective mutation sets the dirty flag and bumps the revision. The
/// viewport recompute is the only consumer that clears the flag.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CameraState {
    /// Screen-space translation in pixels
    offset: Vec2,
    /// Zoom factor scaling the projected tile size
    distance: f32,
    /// Perspective angle in radians
    angle: f32,
    limits: CameraLimits,
    #[serde(skip, default = "dirty_on_load")]
    dirty: bool,
    #[serde(skip)]
    revision: u64,
}

fn dirty_on_load() -> bool {
    true
}

impl CameraState {
    /// Create a camera with the given limits, centered on distance 1.0 and the
    /// steepest allowed angle. The initial state is dirty.
    pub fn new(limits: CameraLimits) -> Self {
        Self {
            offset: Vec2::ZERO,
            distance: limits.clamp_distance(1.0),
            angle: limits.max_angle,
            limits,
            dirty: true,
            revision: 0,
        }
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn limits(&self) -> &CameraLimits {
        &self.limits
    }

    /// Whether the camera changed since the last consumed recompute
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of effective mutations applied so far
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Force a recompute on the next frame (e.g. after a screen resize)
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
        self.revision += 1;
    }

    /// Clear the dirty flag. Called by the viewport recompute once it has run.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Apply a partial update.
    ///
    /// Distance and angle are clamped to the configured limits; a write whose
    /// clamped value equals the current value is a no-op. Non-finite values are
    /// ignored. Returns whether anything changed.
    pub fn apply(&mut self, update: CameraUpdate) -> bool {
        let mut changed = false;

        if let Some(offset) = update.offset {
            if !offset.is_finite() {
                log::warn!("Ignoring non-finite camera offset {:?}", offset);
            } else if offset != self.offset {
                self.offset = offset;
                changed = true;
            }
        }

        if let Some(distance) = update.distance {
            if !distance.is_finite() {
                log::warn!("Ignoring non-finite camera distance {}", distance);
            } else {
                let clamped = self.limits.clamp_distance(distance);
                if clamped != self.distance {
                    self.distance = clamped;
                    changed = true;
                }
            }
        }

        if let Some(angle) = update.angle {
            if !angle.is_finite() {
                log::warn!("Ignoring non-finite camera angle {}", angle);
            } else {
                let clamped = self.limits.clamp_angle(angle);
                if clamped != self.angle {
                    self.angle = clamped;
                    changed = true;
                }
            }
        }

        if changed {
            self.mark_dirty();
        }
        changed
    }

    /// Translate the camera by a pixel delta
    pub fn pan(&mut self, delta: Vec2) -> bool {
        self.apply(CameraUpdate::new().offset(self.offset + delta))
    }

    /// Change the zoom factor by a delta (clamped)
    pub fn zoom_by(&mut self, delta: f32) -> bool {
        self.apply(CameraUpdate::new().distance(self.distance + delta))
    }

    /// Change the perspective angle by a delta in radians (clamped)
    pub fn tilt_by(&mut self, delta: f32) -> bool {
        self.apply(CameraUpdate::new().angle(self.angle + delta))
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self::new(CameraLimits::default())
    }
}
