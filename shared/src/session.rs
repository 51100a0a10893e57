//! The drawing client's canvas state: one vector canvas, its undo timeline,
//! the active tool and the sink that hears about every committed mutation.

use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info, warn};

use crate::color::Rgba;
use crate::config::CanvasConfig;
use crate::error::CanvasError;
use crate::fill::{fill_pixels, FillOutcome};
use crate::history::{HistoryEntry, HistoryTimeline, INITIAL_LABEL};
use crate::pixels::{EncodedImage, ImageFormat};
use crate::scene::VectorCanvas;
use crate::tool::{ToolMode, ToolState};
use crate::upload::{Mutation, MutationSink};
use crate::Point;

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

/// Milliseconds since the Unix epoch.
pub type Clock = fn() -> u64;

pub fn system_clock() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

const DRAW_LABEL: &str = "draw path";
const ERASE_LABEL: &str = "eraser";
const MODIFY_LABEL: &str = "modify object";
const FILL_LABEL: &str = "fill";

/// Identifies the one fill allowed between encode and commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FillTicket(u64);

/// A filled raster waiting for the host to decode it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingFill {
    pub ticket: FillTicket,
    pub image: EncodedImage,
    /// Pixels that joined the flood region, before dilation.
    pub pixels: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FillStart {
    /// An earlier fill still holds the ticket.
    Busy,
    OutOfRange,
    SameColor,
    Ready(PendingFill),
}

pub struct CanvasSession<C: VectorCanvas, N: MutationSink> {
    canvas: C,
    sink: N,
    timeline: HistoryTimeline,
    tools: ToolState,
    config: CanvasConfig,
    clock: Clock,
    next_ticket: u64,
    in_flight: Option<FillTicket>,
}

impl<C: VectorCanvas, N: MutationSink> CanvasSession<C, N> {
    /// Takes over an initialized canvas and records its current scene as the
    /// initial timeline entry. Nothing is uploaded.
    pub fn new(
        mut canvas: C,
        mut sink: N,
        config: CanvasConfig,
        clock: Clock,
    ) -> Result<Self, CanvasError> {
        let tools = ToolState::new(config.brush_color, config.background, config.brush_width);
        apply_tools(&mut canvas, &tools);
        let initial = HistoryEntry::new(canvas.serialize_scene()?, INITIAL_LABEL, clock());
        let timeline = HistoryTimeline::new(initial, config.history_limit);
        sink.history_changed(&timeline);
        Ok(Self {
            canvas,
            sink,
            timeline,
            tools,
            config,
            clock,
            next_ticket: 1,
            in_flight: None,
        })
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }

    pub fn timeline(&self) -> &HistoryTimeline {
        &self.timeline
    }

    pub fn tools(&self) -> &ToolState {
        &self.tools
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn sink(&self) -> &N {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut N {
        &mut self.sink
    }

    pub fn can_undo(&self) -> bool {
        self.timeline.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.timeline.can_redo()
    }

    /// Snapshots the live scene onto the timeline. Returns false when the
    /// scene could not be serialized; the timeline is then untouched.
    pub fn push_history(&mut self, label: &str) -> bool {
        let snapshot = match self.canvas.serialize_scene() {
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!("history push {label:?} dropped: {error}");
                return false;
            }
        };
        self.timeline
            .push(HistoryEntry::new(snapshot, label, (self.clock)()));
        self.sink.history_changed(&self.timeline);
        true
    }

    fn record(&mut self, mutation: Mutation, label: &str) -> bool {
        if !self.push_history(label) {
            return false;
        }
        self.sink.notify_mutated(mutation.tag());
        true
    }

    /// A free-draw stroke finished.
    pub fn on_path_created(&mut self) -> bool {
        match self.tools.mode() {
            ToolMode::Eraser => self.record(Mutation::Erase, ERASE_LABEL),
            ToolMode::Brush | ToolMode::Fill => self.record(Mutation::Draw, DRAW_LABEL),
        }
    }

    /// An object was moved, scaled or rotated.
    pub fn on_object_modified(&mut self) -> bool {
        self.record(Mutation::Modify, MODIFY_LABEL)
    }

    pub fn undo(&mut self) -> bool {
        if !self.timeline.can_undo() {
            return false;
        }
        let previous = self.timeline.current_index();
        self.timeline.undo();
        self.show_current(previous, Mutation::Undo)
    }

    pub fn redo(&mut self) -> bool {
        if !self.timeline.can_redo() {
            return false;
        }
        let previous = self.timeline.current_index();
        self.timeline.redo();
        self.show_current(previous, Mutation::Redo)
    }

    /// Shows entry `index` without discarding anything after it.
    pub fn jump_history(&mut self, index: usize) -> bool {
        if index >= self.timeline.len() {
            debug!("history jump to {index} ignored, {} entries", self.timeline.len());
            return false;
        }
        let previous = self.timeline.current_index();
        self.timeline.jump(index);
        self.show_current(previous, Mutation::JumpHistory)
    }

    fn show_current(&mut self, previous: usize, mutation: Mutation) -> bool {
        self.cancel_fill();
        let snapshot = self.timeline.current().snapshot.clone();
        if let Err(error) = self.canvas.load_scene(&snapshot) {
            warn!(
                "{} failed to restore entry {}: {error}",
                mutation.tag(),
                self.timeline.current_index()
            );
            self.timeline.restore_cursor(previous);
            return false;
        }
        apply_tools(&mut self.canvas, &self.tools);
        self.canvas.render();
        self.sink.history_changed(&self.timeline);
        self.sink.notify_mutated(mutation.tag());
        true
    }

    /// Blanks the canvas, restarts the timeline and restores the default tools.
    pub fn reset_history(&mut self) -> bool {
        self.cancel_fill();
        self.canvas.clear(self.config.background);
        self.tools = ToolState::new(
            self.config.brush_color,
            self.config.background,
            self.config.brush_width,
        );
        apply_tools(&mut self.canvas, &self.tools);
        self.canvas.render();
        let snapshot = match self.canvas.serialize_scene() {
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!("reset could not snapshot the blank canvas: {error}");
                return false;
            }
        };
        self.timeline
            .reset(HistoryEntry::new(snapshot, INITIAL_LABEL, (self.clock)()));
        self.sink.history_changed(&self.timeline);
        self.sink.notify_mutated(Mutation::Reset.tag());
        true
    }

    pub fn set_brush_color(&mut self, color: Rgba) {
        self.tools.select_color(color);
        apply_tools(&mut self.canvas, &self.tools);
    }

    pub fn set_brush_width(&mut self, width: f32) {
        self.tools.set_width(width);
        apply_tools(&mut self.canvas, &self.tools);
    }

    pub fn set_eraser_mode(&mut self) {
        self.set_mode(ToolMode::Eraser);
    }

    pub fn set_fill_mode(&mut self) {
        self.set_mode(ToolMode::Fill);
    }

    pub fn restore_brush_mode(&mut self) {
        self.set_mode(ToolMode::Brush);
    }

    pub fn toggle_eraser(&mut self) -> ToolMode {
        let mode = self.tools.toggle(ToolMode::Eraser);
        apply_tools(&mut self.canvas, &self.tools);
        mode
    }

    pub fn toggle_fill(&mut self) -> ToolMode {
        let mode = self.tools.toggle(ToolMode::Fill);
        apply_tools(&mut self.canvas, &self.tools);
        mode
    }

    fn set_mode(&mut self, mode: ToolMode) {
        self.tools.set_mode(mode);
        debug!("tool mode {}", mode.name());
        apply_tools(&mut self.canvas, &self.tools);
    }

    pub fn fill_in_flight(&self) -> Option<FillTicket> {
        self.in_flight
    }

    /// First half of a paint-bucket click: rasterize, flood, dilate and encode.
    ///
    /// On `Ready` the ticket is held until [`Self::commit_fill`],
    /// [`Self::abandon_fill`] or any timeline navigation.
    pub fn on_fill_click(&mut self, point: Point) -> Result<FillStart, CanvasError> {
        if let Some(ticket) = self.in_flight {
            debug!("fill click ignored, {ticket:?} still in flight");
            return Ok(FillStart::Busy);
        }
        let mut buffer = self.canvas.rasterize()?;
        let (x, y) = point.to_pixel();
        let options = self.config.fill_options(self.tools.brush_color());
        match fill_pixels(&mut buffer, x, y, options) {
            FillOutcome::OutOfRange => {
                info!("fill at ({x}, {y}) is outside the canvas");
                Ok(FillStart::OutOfRange)
            }
            FillOutcome::SameColor => {
                info!("fill at ({x}, {y}) already has the fill color");
                Ok(FillStart::SameColor)
            }
            FillOutcome::Filled { pixels } => {
                let image = buffer.encode_png()?;
                let ticket = FillTicket(self.next_ticket);
                self.next_ticket += 1;
                self.in_flight = Some(ticket);
                debug!("fill at ({x}, {y}) covered {pixels} pixels, {ticket:?} issued");
                Ok(FillStart::Ready(PendingFill {
                    ticket,
                    image,
                    pixels,
                }))
            }
        }
    }

    /// Second half: flatten the scene onto the filled image and record it.
    /// Stale tickets are ignored.
    pub fn commit_fill(&mut self, pending: &PendingFill) -> bool {
        match self.try_commit(pending) {
            Ok(committed) => committed,
            Err(error) => {
                warn!("fill commit failed: {error}");
                false
            }
        }
    }

    fn try_commit(&mut self, pending: &PendingFill) -> Result<bool, CanvasError> {
        if self.in_flight != Some(pending.ticket) {
            debug!("stale {:?} dropped", pending.ticket);
            return Ok(false);
        }
        self.in_flight = None;
        self.canvas.set_background_image(&pending.image)?;
        for index in (0..self.canvas.object_count()).rev() {
            self.canvas.remove_object(index);
        }
        self.canvas.clear_background_color();
        self.canvas.render();
        Ok(self.record(Mutation::Fill, FILL_LABEL))
    }

    /// The host could not decode the filled image.
    pub fn abandon_fill(&mut self, ticket: FillTicket, error: &CanvasError) {
        if self.in_flight == Some(ticket) {
            self.in_flight = None;
            warn!("fill abandoned: {error}");
        }
    }

    pub fn cancel_fill(&mut self) -> Option<FillTicket> {
        let cancelled = self.in_flight.take();
        if let Some(ticket) = cancelled {
            debug!("{ticket:?} cancelled");
        }
        cancelled
    }

    /// Both fill phases back to back, for canvases that decode synchronously.
    pub fn fill_at(&mut self, point: Point) -> Result<FillOutcome, CanvasError> {
        match self.on_fill_click(point)? {
            FillStart::Busy => Err(CanvasError::FillInFlight),
            FillStart::OutOfRange => Ok(FillOutcome::OutOfRange),
            FillStart::SameColor => Ok(FillOutcome::SameColor),
            FillStart::Ready(pending) => {
                if let Err(error) = self.try_commit(&pending) {
                    self.in_flight = None;
                    return Err(error);
                }
                Ok(FillOutcome::Filled {
                    pixels: pending.pixels,
                })
            }
        }
    }

    /// Renders the live scene for uploads and downloads.
    pub fn export_image(&mut self, format: ImageFormat) -> Result<EncodedImage, CanvasError> {
        self.canvas.rasterize()?.encode(format)
    }
}

fn apply_tools<C: VectorCanvas>(canvas: &mut C, tools: &ToolState) {
    canvas.set_drawing_mode(tools.mode().draws());
    canvas.set_brush_color(tools.stroke_color());
    canvas.set_brush_width(tools.brush_width());
}
