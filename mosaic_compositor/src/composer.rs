// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The composition loop.
//!
//! [`VideoComposer::spawn`] starts a dedicated thread that owns the GPU
//! context for its whole life. The thread sets up the backend and one
//! [`InputSlot`] per input, hands the producer surfaces back to the caller,
//! then runs one tick per output frame:
//!
//! 1. **Collect**: await every slot in index order, latching each producer's
//!    newest frame. A slow producer stalls the whole tick.
//! 2. **Render**: build a [`RenderPlan`] with one tile per slot and draw it.
//! 3. **Present**: stamp the frame with the [`OutputClock`] and swap.
//!
//! The output clock advances by exactly one interval per presented frame,
//! whatever the producers' own rates are.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{Sender, bounded};
use mosaic_core::layout::TileLayout;
use mosaic_core::surface::SurfaceSize;
use mosaic_core::time::HostTime;
use mosaic_core::timing::OutputClock;
use mosaic_core::trace::{
    FrameSummaryBuilder, PhaseBeginEvent, PhaseEndEvent, PhaseKind, PresentEvent,
    SlotLatchedEvent, TickBeginEvent, TraceSink, Tracer,
};
use mosaic_core::transform::Mat4;
use mosaic_render::{ClearColor, FrameListener, GpuBackend, RenderPlan, TileDraw};
use parking_lot::Mutex;
use tracing::{debug, error, info, trace, warn};

use crate::config::ComposerConfig;
use crate::error::{BackendStage, ComposeError};
use crate::gate::FrameGate;
use crate::slot::{FrameAwait, InputSlot};

/// Lifecycle of a [`VideoComposer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComposerState {
    /// The composition thread has not started yet.
    Uninitialized,
    /// The composition thread is creating the backend and input slots.
    SettingUp,
    /// Setup succeeded; producer surfaces are available.
    Ready,
    /// The tick loop is running.
    Running,
    /// The tick loop has exited.
    Stopped,
}

/// Final statistics of a composition run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComposerReport {
    /// Output frames presented.
    pub frames_presented: u64,
    /// Timestamp of the last presented frame.
    pub last_presentation_time: Option<HostTime>,
    /// Producer frames latched per slot, catch-up drains included.
    pub frames_latched: Vec<u64>,
}

#[derive(Debug)]
struct Shared {
    cancel: AtomicBool,
    frames_presented: AtomicU64,
    state: Mutex<ComposerState>,
}

impl Shared {
    fn set_state(&self, state: ComposerState) {
        *self.state.lock() = state;
    }
}

struct SetupDone<P> {
    surfaces: Vec<P>,
    gates: Vec<Arc<FrameGate>>,
}

/// A running composition loop and the producer surfaces feeding it.
///
/// `P` is the backend's producer surface type.
///
/// Dropping a `VideoComposer` shuts it down; call [`shutdown`](Self::shutdown)
/// to observe the outcome.
pub struct VideoComposer<P> {
    config: ComposerConfig,
    layout: TileLayout,
    surfaces: Vec<P>,
    gates: Vec<Arc<FrameGate>>,
    shared: Arc<Shared>,
    handle: Option<JoinHandle<Result<ComposerReport, ComposeError>>>,
}

impl<P> VideoComposer<P>
where
    P: Clone + Send + 'static,
{
    /// Starts a composition thread and waits until its setup has finished.
    ///
    /// `make_backend` runs on the composition thread and creates the GPU
    /// context. Any setup failure is returned here, after the thread has
    /// exited; no partially set up composer is ever handed out.
    pub fn spawn<B, F>(config: ComposerConfig, make_backend: F) -> Result<Self, ComposeError>
    where
        B: GpuBackend<ProducerSurface = P> + 'static,
        F: FnOnce(&ComposerConfig) -> Result<B, B::Error> + Send + 'static,
    {
        Self::spawn_inner(config, make_backend, None)
    }

    /// Like [`spawn`](Self::spawn), dispatching loop events to `sink`.
    ///
    /// Events are only emitted when the `trace` feature is enabled.
    pub fn spawn_traced<B, F>(
        config: ComposerConfig,
        make_backend: F,
        sink: Box<dyn TraceSink + Send>,
    ) -> Result<Self, ComposeError>
    where
        B: GpuBackend<ProducerSurface = P> + 'static,
        F: FnOnce(&ComposerConfig) -> Result<B, B::Error> + Send + 'static,
    {
        Self::spawn_inner(config, make_backend, Some(sink))
    }

    fn spawn_inner<B, F>(
        config: ComposerConfig,
        make_backend: F,
        sink: Option<Box<dyn TraceSink + Send>>,
    ) -> Result<Self, ComposeError>
    where
        B: GpuBackend<ProducerSurface = P> + 'static,
        F: FnOnce(&ComposerConfig) -> Result<B, B::Error> + Send + 'static,
    {
        config.validate()?;
        let size = SurfaceSize::new(config.width, config.height)?;
        let layout = TileLayout::new(config.instances, size)?;
        let clock = OutputClock::from_fps(config.fps)?;

        let shared = Arc::new(Shared {
            cancel: AtomicBool::new(false),
            frames_presented: AtomicU64::new(0),
            state: Mutex::new(ComposerState::Uninitialized),
        });

        let (setup_tx, setup_rx) = bounded::<SetupDone<P>>(1);
        let thread_ctx = LoopContext {
            config: config.clone(),
            layout: layout.clone(),
            clock,
            shared: Arc::clone(&shared),
            sink,
        };
        let handle = thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || thread_ctx.run(make_backend, setup_tx))?;

        match setup_rx.recv() {
            Ok(done) => {
                info!(
                    instances = config.instances,
                    width = config.width,
                    height = config.height,
                    fps = config.fps,
                    "composer ready"
                );
                Ok(Self {
                    config,
                    layout,
                    surfaces: done.surfaces,
                    gates: done.gates,
                    shared,
                    handle: Some(handle),
                })
            }
            // The thread dropped the sender without reporting success.
            Err(_) => match handle.join() {
                Ok(Err(err)) => Err(err),
                Ok(Ok(_)) => Err(ComposeError::SetupAborted),
                Err(_) => Err(ComposeError::ThreadPanicked),
            },
        }
    }

    /// Producer surface feeding input `index`, or `None` if out of range.
    #[must_use]
    pub fn input_surface(&self, index: usize) -> Option<P> {
        self.surfaces.get(index).cloned()
    }

    /// All producer surfaces in slot order.
    #[must_use]
    pub fn input_surfaces(&self) -> &[P] {
        &self.surfaces
    }

    /// The configuration this composer was started with.
    #[must_use]
    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Tile placement of every input.
    #[must_use]
    pub fn layout(&self) -> &TileLayout {
        &self.layout
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ComposerState {
        *self.shared.state.lock()
    }

    /// Output frames presented so far.
    #[must_use]
    pub fn frames_presented(&self) -> u64 {
        self.shared.frames_presented.load(Ordering::Acquire)
    }

    /// Whether the composition thread has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Stops the loop, unblocking every producer, and waits for the thread.
    ///
    /// Returns the run's report, or the error that ended the loop.
    pub fn shutdown(mut self) -> Result<ComposerReport, ComposeError> {
        self.stop().unwrap_or_else(|| Ok(ComposerReport::default()))
    }
}

impl<P> fmt::Debug for VideoComposer<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoComposer")
            .field("config", &self.config)
            .field("inputs", &self.surfaces.len())
            .field("state", &*self.shared.state.lock())
            .field(
                "frames_presented",
                &self.shared.frames_presented.load(Ordering::Relaxed),
            )
            .finish_non_exhaustive()
    }
}

impl<P> VideoComposer<P> {
    fn stop(&mut self) -> Option<Result<ComposerReport, ComposeError>> {
        let handle = self.handle.take()?;
        self.shared.cancel.store(true, Ordering::Release);
        for gate in &self.gates {
            gate.release();
        }
        let result = handle.join().unwrap_or(Err(ComposeError::ThreadPanicked));
        match &result {
            Ok(report) => info!(frames = report.frames_presented, "composer stopped"),
            Err(err) => debug!(%err, "composer stopped with error"),
        }
        Some(result)
    }
}

impl<P> Drop for VideoComposer<P> {
    fn drop(&mut self) {
        if let Some(Err(err)) = self.stop() {
            error!(%err, "composition loop failed");
        }
    }
}

/// Everything the composition thread owns.
struct LoopContext {
    config: ComposerConfig,
    layout: TileLayout,
    clock: OutputClock,
    shared: Arc<Shared>,
    sink: Option<Box<dyn TraceSink + Send>>,
}

impl LoopContext {
    fn run<B, F, P>(
        mut self,
        make_backend: F,
        setup_tx: Sender<SetupDone<P>>,
    ) -> Result<ComposerReport, ComposeError>
    where
        B: GpuBackend<ProducerSurface = P>,
        F: FnOnce(&ComposerConfig) -> Result<B, B::Error>,
    {
        self.shared.set_state(ComposerState::SettingUp);
        let (mut backend, mut slots, surfaces) = match self.setup(make_backend) {
            Ok(parts) => parts,
            Err(err) => {
                error!(%err, "composer setup failed");
                self.shared.set_state(ComposerState::Stopped);
                return Err(err);
            }
        };

        self.shared.set_state(ComposerState::Ready);
        let gates = slots.iter().map(|s| Arc::clone(s.gate())).collect();
        if setup_tx.send(SetupDone { surfaces, gates }).is_err() {
            self.shared.set_state(ComposerState::Stopped);
            return Err(ComposeError::SetupAborted);
        }

        self.shared.set_state(ComposerState::Running);
        let result = self.tick_loop(&mut backend, &mut slots);

        // Producers may still be blocked on a full gate.
        for slot in &slots {
            slot.release();
        }
        self.shared.set_state(ComposerState::Stopped);

        if let Err(err) = &result {
            error!(%err, "composition loop terminated");
        }
        result
    }

    fn setup<B, F>(
        &self,
        make_backend: F,
    ) -> Result<(B, Vec<InputSlot>, Vec<B::ProducerSurface>), ComposeError>
    where
        B: GpuBackend,
        F: FnOnce(&ComposerConfig) -> Result<B, B::Error>,
    {
        let config = &self.config;
        let mut backend = make_backend(config)
            .map_err(|e| ComposeError::backend(BackendStage::CreateContext, e))?;
        backend
            .make_current()
            .map_err(|e| ComposeError::backend(BackendStage::MakeCurrent, e))?;
        backend
            .compile_program()
            .map_err(|e| ComposeError::backend(BackendStage::CompileProgram, e))?;

        let size = self.layout.size();
        let mut slots = Vec::with_capacity(self.layout.len());
        let mut surfaces = Vec::with_capacity(self.layout.len());
        for index in 0..config.instances {
            let texture = backend
                .create_texture()
                .map_err(|e| ComposeError::backend(BackendStage::CreateTexture, e))?;
            let slot = InputSlot::new(
                index,
                texture,
                size,
                config.gate_capacity,
                config.poll_interval,
            );
            let listener: Arc<dyn FrameListener> = Arc::new(slot.notifier());
            let surface = backend
                .create_input_surface(texture, size, listener)
                .map_err(|e| ComposeError::backend(BackendStage::CreateInputSurface, e))?;
            debug!(slot = index, ?texture, "input slot created");
            slots.push(slot);
            surfaces.push(surface);
        }
        Ok((backend, slots, surfaces))
    }

    fn tick_loop<B: GpuBackend>(
        &mut self,
        backend: &mut B,
        slots: &mut [InputSlot],
    ) -> Result<ComposerReport, ComposeError> {
        let epoch = Instant::now();
        let now = || HostTime(u64::try_from(epoch.elapsed().as_nanos()).unwrap_or(u64::MAX));

        let mvp = Mat4::from_rotation_z_degrees(self.config.rotation_degrees);
        let mut plan = RenderPlan::with_capacity(slots.len(), mvp, ClearColor::KEY_GREEN);
        let mut last_presentation_time = None;
        let mut tracer =
            Tracer::from_option(self.sink.as_deref_mut().map(|sink| sink as &mut dyn TraceSink));

        'ticks: loop {
            if self.shared.cancel.load(Ordering::Acquire) {
                break;
            }
            let frame_index = self.clock.frame_index();
            let presentation_time = self.clock.now();
            let tick = TickBeginEvent {
                frame_index,
                presentation_time,
                now: now(),
            };
            tracer.tick_begin(&tick);
            let mut summary = FrameSummaryBuilder::new(&tick);
            let mut phase = PhaseTimer {
                tracer: &mut tracer,
                summary: &mut summary,
                frame_index,
            };

            phase.begin(PhaseKind::Collect, now());
            for slot in slots.iter_mut() {
                let outcome = slot
                    .await_frame(backend)
                    .map_err(|e| ComposeError::backend(BackendStage::LatchFrame, e))?;
                match outcome {
                    FrameAwait::Latched { frames } => {
                        phase.summary.slot_latched(frames);
                        phase.tracer.slot_latched(&SlotLatchedEvent {
                            frame_index,
                            slot: slot.index(),
                            frames,
                            timestamp: now(),
                        });
                    }
                    FrameAwait::Released => {
                        if !self.shared.cancel.load(Ordering::Acquire) {
                            warn!(slot = slot.index(), "input released mid-tick, stopping");
                        }
                        break 'ticks;
                    }
                }
            }
            phase.end(PhaseKind::Collect, now());

            phase.begin(PhaseKind::Render, now());
            plan.reset(frame_index, presentation_time);
            for (slot, viewport) in slots.iter().zip(self.layout.tiles()) {
                plan.push(TileDraw {
                    slot: slot.index(),
                    texture: slot.texture(),
                    viewport: *viewport,
                    texture_transform: slot.transform(),
                });
            }
            backend
                .draw(&plan)
                .map_err(|e| ComposeError::backend(BackendStage::Draw, e))?;
            phase.end(PhaseKind::Render, now());

            phase.begin(PhaseKind::Present, now());
            backend
                .set_presentation_time(presentation_time)
                .map_err(|e| ComposeError::backend(BackendStage::SetPresentationTime, e))?;
            backend
                .swap_buffers()
                .map_err(|e| ComposeError::backend(BackendStage::SwapBuffers, e))?;
            let presented_at = now();
            phase.end(PhaseKind::Present, presented_at);

            tracer.present(&PresentEvent {
                frame_index,
                presentation_time,
                presented_at,
            });
            self.shared.frames_presented.fetch_add(1, Ordering::AcqRel);
            last_presentation_time = Some(presentation_time);
            self.clock.advance();
            tracer.frame_summary(&summary.finish());
            trace!(frame_index, pts = presentation_time.ticks(), "frame presented");
        }

        Ok(ComposerReport {
            frames_presented: self.shared.frames_presented.load(Ordering::Acquire),
            last_presentation_time,
            frames_latched: slots.iter().map(InputSlot::frames_latched).collect(),
        })
    }
}

/// Emits phase events to the tracer and the tick summary together.
struct PhaseTimer<'t, 'a> {
    tracer: &'t mut Tracer<'a>,
    summary: &'t mut FrameSummaryBuilder,
    frame_index: u64,
}

impl PhaseTimer<'_, '_> {
    fn begin(&mut self, phase: PhaseKind, timestamp: HostTime) {
        self.summary.phase_begin(phase, timestamp);
        self.tracer.phase_begin(&PhaseBeginEvent {
            frame_index: self.frame_index,
            phase,
            timestamp,
        });
    }

    fn end(&mut self, phase: PhaseKind, timestamp: HostTime) {
        self.summary.phase_end(phase, timestamp);
        self.tracer.phase_end(&PhaseEndEvent {
            frame_index: self.frame_index,
            phase,
            timestamp,
        });
    }
}
