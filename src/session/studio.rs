//! The frame loop.
//!
//! One [`Studio::tick`] is one frame: snapshot the parameters, compute the frame delta, build the
//! plan, draw the live surface and hand the result to the capture controller. `tick` takes
//! `&mut self`, so a frame can never start while another is still running.

use std::time::{Duration, Instant};

use crate::animation::scheduler::{FrameDelta, compute_frame_delta};
use crate::capture::controller::{CaptureController, CaptureRequest, StartOutcome};
use crate::encode::recorder::{DefaultRecorderFactory, RecorderFactory};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::WavebandsResult;
use crate::pattern::params::RenderParameters;
use crate::pattern::plan::PatternPlan;
use crate::render::artifact::Artifact;
use crate::render::frame::FrameRGBA;
use crate::render::live::LiveCanvas;
use crate::render::raster::RasterExporter;
use crate::render::vector::VectorExporter;
use crate::session::store::ParameterStore;

/// Inputs of the most recently drawn frame.
#[derive(Clone, Debug, PartialEq)]
struct DrawnFrame {
    index: FrameIndex,
    params: RenderParameters,
    delta: FrameDelta,
}

pub struct Studio {
    store: ParameterStore,
    live: LiveCanvas,
    raster: RasterExporter,
    vector: VectorExporter,
    capture: CaptureController,
    next_frame: FrameIndex,
    drawn: Option<DrawnFrame>,
}

impl Studio {
    pub fn new(store: ParameterStore, recorders: Box<dyn RecorderFactory>) -> Self {
        let capture = CaptureController::new(recorders, store.animation().enabled);
        Self {
            store,
            live: LiveCanvas::new(),
            raster: RasterExporter::new(),
            vector: VectorExporter::new(),
            capture,
            next_frame: FrameIndex(0),
            drawn: None,
        }
    }

    /// Studio recording through the best encoder found on this system.
    pub fn with_default_recorder(store: ParameterStore) -> Self {
        Self::new(store, Box::new(DefaultRecorderFactory::negotiate()))
    }

    pub fn store(&self) -> &ParameterStore {
        &self.store
    }

    /// Mutable access for the control surface. Changes take effect on the next tick.
    pub fn store_mut(&mut self) -> &mut ParameterStore {
        &mut self.store
    }

    pub fn capture(&self) -> &CaptureController {
        &self.capture
    }

    /// Index the next tick will draw.
    pub fn next_frame(&self) -> FrameIndex {
        self.next_frame
    }

    /// Last drawn live frame.
    pub fn frame(&self) -> Option<&FrameRGBA> {
        self.live.frame()
    }

    pub fn live(&self) -> &LiveCanvas {
        &self.live
    }

    /// Run one frame at time `now`.
    ///
    /// Without animation the surface is only redrawn when the parameters changed; the capture
    /// controller still sees every tick.
    pub fn tick(&mut self, now: Instant) -> WavebandsResult<FrameIndex> {
        let index = self.next_frame;
        let params = self.store.snapshot();
        let animation = *self.store.animation();
        self.capture.set_animation_enabled(animation.enabled);

        let delta = compute_frame_delta(&animation.at(index), params.layer_count());
        let unchanged = self
            .drawn
            .as_ref()
            .is_some_and(|d| !animation.enabled && d.params == params && d.delta == delta);

        if !unchanged {
            let plan = PatternPlan::build(&params, &delta);
            self.live.draw(&plan)?;
            self.drawn = Some(DrawnFrame {
                index,
                params,
                delta,
            });
        }

        if let Some(frame) = self.live.frame() {
            self.capture.on_frame(frame, now);
        }
        self.next_frame = index.next();
        Ok(index)
    }

    /// Plan for the frame currently on screen, including its animation delta.
    pub fn current_plan(&self) -> PatternPlan {
        match &self.drawn {
            Some(d) => PatternPlan::build(&d.params, &d.delta),
            None => {
                let params = self.store.snapshot();
                let state = self.store.animation().at(self.next_frame);
                PatternPlan::build(&params, &compute_frame_delta(&state, params.layer_count()))
            }
        }
    }

    /// Index of the frame currently on screen.
    pub fn current_frame(&self) -> Option<FrameIndex> {
        self.drawn.as_ref().map(|d| d.index)
    }

    /// Still image of the current frame at `scale`.
    pub fn export_raster(&mut self, scale: u32) -> WavebandsResult<Artifact> {
        let plan = self.current_plan();
        self.raster.export(&plan, scale)
    }

    /// Vector document of the current frame.
    pub fn export_vector(&self) -> Artifact {
        self.vector.export(&self.current_plan())
    }

    /// Start recording with the configured loop duration and frame rate.
    pub fn start_capture(&mut self, now: Instant) -> StartOutcome {
        let animation = *self.store.animation();
        self.capture.set_animation_enabled(animation.enabled);
        let canvas = self.store.params().canvas;
        let request = CaptureRequest {
            duration: Duration::try_from_secs_f64(animation.loop_seconds.max(0.0))
                .unwrap_or(Duration::MAX),
            fps: animation.fps,
            width: canvas.width,
            height: canvas.height,
        };
        self.capture.start(request, now)
    }

    pub fn stop_capture(&mut self, now: Instant) {
        self.capture.stop(now);
    }

    /// Advance capture timers without drawing.
    pub fn poll_capture(&mut self, now: Instant) {
        self.capture.poll(now);
    }

    pub fn take_capture_artifact(&mut self) -> Option<Artifact> {
        self.capture.take_artifact()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/studio.rs"]
mod tests;
