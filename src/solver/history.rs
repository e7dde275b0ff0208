//! Recorded frames of a run
//!
//! [`History`] is the hand-off between the solver and whatever renders or
//! analyses a simulation: a finite, ordered sequence of fields that all share
//! one shape, each tagged with its step index and simulated time.
//!
//! [`Animation`] pairs a history with the frame interval a rendering
//! collaborator should use. No numerical work happens here.

use std::collections::HashMap;
use std::time::Duration;

use crate::error::{Result, SimulationError};
use crate::physics::Field;

// =================================================================================================
// Snapshot
// =================================================================================================

/// One recorded frame
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Number of steps taken when the frame was recorded
    pub step: usize,

    /// Simulated time, `step · dt`
    pub time: f64,

    pub field: Field,
}

// =================================================================================================
// History
// =================================================================================================

/// Ordered frames recorded every `stride` steps
///
/// A stride of `0` disables recording. Metadata holds free-form context
/// (stepper name, time step, boundary) for diagnostics.
///
/// # Examples
///
/// ```rust
/// use pde_rs::physics::Field;
/// use pde_rs::solver::{History, Snapshot};
///
/// let mut history = History::new(10);
/// history.push(Snapshot { step: 0, time: 0.0, field: Field::zeros((4, 4)).unwrap() }).unwrap();
/// history.push(Snapshot { step: 10, time: 1.0, field: Field::zeros((4, 4)).unwrap() }).unwrap();
///
/// assert_eq!(history.len(), 2);
/// assert_eq!(history.times(), vec![0.0, 1.0]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    stride: usize,
    frames: Vec<Snapshot>,
    metadata: HashMap<String, String>,
}

impl History {
    // ====================================== constructors =======================================

    pub fn new(stride: usize) -> Self {
        Self {
            stride,
            frames: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    // ======================================== Recording ========================================

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn set_stride(&mut self, stride: usize) {
        self.stride = stride;
    }

    /// Whether frames are recorded at all
    pub fn is_enabled(&self) -> bool {
        self.stride > 0
    }

    /// Whether the frame after `step` steps falls on the stride
    pub(crate) fn should_record(&self, step: usize) -> bool {
        self.stride > 0 && step % self.stride == 0
    }

    /// Append a frame
    ///
    /// Fails with `ShapeMismatch` when the field shape differs from the
    /// frames already recorded.
    pub fn push(&mut self, snapshot: Snapshot) -> Result<()> {
        if let Some(first) = self.frames.first()
            && first.field.shape() != snapshot.field.shape()
        {
            return Err(SimulationError::ShapeMismatch {
                expected: first.field.shape(),
                actual: snapshot.field.shape(),
            });
        }
        self.frames.push(snapshot);
        Ok(())
    }

    /// Drop every frame; stride and metadata are kept
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    // ========================================= Queries =========================================

    pub fn frames(&self) -> &[Snapshot] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn last(&self) -> Option<&Snapshot> {
        self.frames.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Snapshot> {
        self.frames.iter()
    }

    /// Simulated time of every frame
    pub fn times(&self) -> Vec<f64> {
        self.frames.iter().map(|frame| frame.time).collect()
    }

    /// Step index of every frame
    pub fn steps(&self) -> Vec<usize> {
        self.frames.iter().map(|frame| frame.step).collect()
    }

    /// Consume the history and return its fields
    pub fn into_fields(self) -> Vec<Field> {
        self.frames.into_iter().map(|frame| frame.field).collect()
    }

    // ======================================== Metadata =========================================

    pub fn add_metadata(&mut self, key: &str, value: &str) {
        self.metadata.insert(key.to_string(), value.to_string());
    }

    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a Snapshot;
    type IntoIter = std::slice::Iter<'a, Snapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

// =================================================================================================
// Animation
// =================================================================================================

/// Frames plus playback interval, handed to a rendering collaborator
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub history: History,
    pub interval: Duration,
}

impl Animation {
    pub fn frame_count(&self) -> usize {
        self.history.len()
    }

    /// Playback length, `frames · interval`
    pub fn duration(&self) -> Duration {
        self.interval * self.history.len() as u32
    }
}

// =================================================================================================
// Tests
// =================================================================================================
