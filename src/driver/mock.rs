//! In-memory driver that records what it was asked to do.
//!
//! Used by the test suites and by `--dry-run`. The recording lives behind a
//! shared handle so it stays observable after the driver is boxed and moved
//! into the station.

use std::sync::{Arc, Mutex, MutexGuard};

use log::info;

use super::{check_layers, DisplayDriver, DriverError};
use crate::ink::InkLayer;
use crate::panel::PanelModel;

/// Per-operation call counters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DriverCalls {
    pub initialize: usize,
    pub clear: usize,
    pub push: usize,
    pub sleep: usize,
}

#[derive(Debug, Default)]
struct Recording {
    calls: DriverCalls,
    last_frame: Option<Vec<InkLayer>>,
    fail_push: bool,
    fail_initialize: bool,
}

#[derive(Clone, Debug)]
pub struct RecordingDriver {
    panel: &'static PanelModel,
    recording: Arc<Mutex<Recording>>,
}

impl RecordingDriver {
    pub fn new(panel: &'static PanelModel) -> Self {
        Self {
            panel,
            recording: Arc::new(Mutex::new(Recording::default())),
        }
    }

    fn recording(&self) -> MutexGuard<'_, Recording> {
        self.recording.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn calls(&self) -> DriverCalls {
        self.recording().calls.clone()
    }

    /// Layers of the last successful push.
    pub fn last_frame(&self) -> Option<Vec<InkLayer>> {
        self.recording().last_frame.clone()
    }

    /// Make every following push fail with a hardware error.
    pub fn fail_pushes(&self, fail: bool) {
        self.recording().fail_push = fail;
    }

    /// Make every following initialize fail with a hardware error.
    pub fn fail_initializes(&self, fail: bool) {
        self.recording().fail_initialize = fail;
    }
}

impl DisplayDriver for RecordingDriver {
    fn initialize(&mut self) -> Result<(), DriverError> {
        let mut recording = self.recording();
        recording.calls.initialize += 1;
        if recording.fail_initialize {
            return Err(DriverError::Hardware("simulated wake-up failure".to_string()));
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DriverError> {
        self.recording().calls.clear += 1;
        Ok(())
    }

    fn push(&mut self, layers: &[InkLayer]) -> Result<(), DriverError> {
        let mut recording = self.recording();
        recording.calls.push += 1;
        if recording.fail_push {
            return Err(DriverError::Hardware("simulated push failure".to_string()));
        }
        check_layers(self.panel, layers)?;

        let counts: Vec<usize> = layers.iter().map(InkLayer::ink_count).collect();
        info!("dry run: {} layer(s), ink pixels {:?}", layers.len(), counts);
        recording.last_frame = Some(layers.to_vec());
        Ok(())
    }

    fn sleep(&mut self) -> Result<(), DriverError> {
        self.recording().calls.sleep += 1;
        Ok(())
    }

    fn native_width(&self) -> u32 {
        self.panel.width
    }

    fn native_height(&self) -> u32 {
        self.panel.height
    }
}
