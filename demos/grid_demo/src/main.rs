// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Composites simulated producers into a tiled headless output.
//!
//! Each producer runs on its own thread at its own frame rate and draws a
//! solid color that cycles over time. The composer presents at
//! [`OUTPUT_FPS`] and can only go as fast as its slowest input. After
//! [`FRAME_COUNT`] output frames the demo shuts down, prints the first tick
//! through a [`PrettyPrintSink`] and writes a Chrome trace to `trace.json`.
//!
//! Set `RUST_LOG=debug` to see catch-up drains as fast producers build a
//! backlog.

use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use mosaic_backend_headless::{HeadlessBackend, HeadlessOutput, HeadlessProducer, Rgba};
use mosaic_compositor::{ComposerConfig, VideoComposer};
use mosaic_core::surface::SurfaceSize;
use mosaic_core::time::Timebase;
use mosaic_debug::pretty::PrettyPrintSink;
use mosaic_debug::recorder::{RecorderSink, decode};
use mosaic_debug::shared::SharedSink;
use tracing::info;
use tracing_subscriber::EnvFilter;

const WIDTH: u32 = 640;
const HEIGHT: u32 = 360;
const OUTPUT_FPS: f32 = 30.0;
const INSTANCES: u32 = 6;
const FRAME_COUNT: u64 = 90;
const TRACE_PATH: &str = "trace.json";

/// Frame rate of producer `index`: 30, 36, 42, ... frames per second.
fn producer_fps(index: usize) -> f64 {
    30.0 + 6.0 * index as f64
}

fn color(index: usize, frame: u64) -> Rgba {
    let phase = u8::try_from(frame % 64).unwrap_or(0) * 4;
    match index % 3 {
        0 => [phase, 64, 255 - phase, 255],
        1 => [255 - phase, phase, 64, 255],
        _ => [64, 255 - phase, phase, 255],
    }
}

fn spawn_producer(
    index: usize,
    surface: HeadlessProducer,
    stop: Arc<AtomicBool>,
) -> std::io::Result<JoinHandle<u64>> {
    let period = Duration::from_secs_f64(1.0 / producer_fps(index));
    thread::Builder::new()
        .name(format!("producer-{index}"))
        .spawn(move || {
            let mut frame = 0;
            while !stop.load(Ordering::Relaxed) {
                surface.submit_solid(color(index, frame));
                frame += 1;
                thread::sleep(period);
            }
            frame
        })
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_thread_names(true)
        .init();

    let config = ComposerConfig::new(WIDTH, HEIGHT, OUTPUT_FPS, INSTANCES)
        .with_poll_interval(Duration::from_millis(2));
    let output = HeadlessOutput::with_retention(SurfaceSize::new(WIDTH, HEIGHT)?, 1);
    let recorder = SharedSink::new(RecorderSink::new());

    let target = output.clone();
    let composer = VideoComposer::spawn_traced(
        config,
        move |_| HeadlessBackend::new(target),
        Box::new(recorder.clone()),
    )?;

    let stop = Arc::new(AtomicBool::new(false));
    let producers = composer
        .input_surfaces()
        .iter()
        .cloned()
        .enumerate()
        .map(|(index, surface)| spawn_producer(index, surface, Arc::clone(&stop)))
        .collect::<Result<Vec<_>, _>>()?;

    let reached = output.wait_for_frames(FRAME_COUNT, Duration::from_secs(30));
    stop.store(true, Ordering::Relaxed);
    let report = composer.shutdown()?;
    for (index, producer) in producers.into_iter().enumerate() {
        let submitted = producer.join().map_err(|_| "producer thread panicked")?;
        info!(
            producer = index,
            fps = producer_fps(index),
            submitted,
            latched = report.frames_latched.get(index).copied().unwrap_or(0),
            "producer finished"
        );
    }
    info!(
        reached,
        frames = report.frames_presented,
        last_pts_ns = report.last_presentation_time.map(|t| t.ticks()),
        "composer finished"
    );

    let recorder = recorder
        .try_into_inner()
        .map_err(|_| "trace sink still shared")?;

    let mut pretty = PrettyPrintSink::stderr(Timebase::NANOS);
    for event in decode(recorder.as_bytes()).take_while(|e| e.frame_index() == 0) {
        event.replay(&mut pretty);
    }

    let mut writer = BufWriter::new(File::create(TRACE_PATH)?);
    mosaic_debug::chrome::export(recorder.as_bytes(), Timebase::NANOS, &mut writer)?;
    info!(path = TRACE_PATH, "wrote Chrome trace");
    Ok(())
}
