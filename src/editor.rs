// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! The annotation editor state machine.
//!
//! All lane/trigger mutation flows through [`AnnotationEditor`]: drawing new
//! annotations click by click, dragging vertices, selection, deletion,
//! property edits, and wholesale replacement on config load. The editor is
//! either idle or drawing exactly one in-progress annotation; the
//! in-progress annotation keeps only committed vertices in its collection
//! while the mutable preview point lives separately and joins the committed
//! sequence when a click fixes it.

use crate::models::annotation::{AnnotationId, AnnotationMut, AnnotationRef, Lane, Point, Trigger};
use crate::models::config::VideoSize;
use crate::util::geometry::{hit_test, Hit};
use crate::util::mapper::DisplayMapper;

/// Active drawing tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Lane,
    Trigger,
}

/// Annotation collections plus the transient editor references.
#[derive(Debug, Default)]
pub struct EditorState {
    pub lanes: Vec<Lane>,
    pub triggers: Vec<Trigger>,
    pub selected: Option<AnnotationId>,
    pub video_size: VideoSize,
}

/// The one annotation currently receiving pointer-driven preview updates.
#[derive(Debug, Clone, Copy)]
struct InProgress {
    id: AnnotationId,
    preview: Point,
}

/// Vertex drag sub-mode of the idle state.
#[derive(Debug, Clone, Copy)]
struct DraggedVertex {
    id: AnnotationId,
    index: usize,
}

/// Snapshot of both collections for undo/redo.
#[derive(Debug, Clone)]
struct Snapshot {
    lanes: Vec<Lane>,
    triggers: Vec<Trigger>,
}

/// Bounded undo/redo stacks of annotation snapshots.
struct History {
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    max_size: usize,
}

impl History {
    fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size: 50,
        }
    }

    /// Save the current state before making a change.
    fn push(&mut self, snapshot: Snapshot) {
        self.undo_stack.push(snapshot);
        if self.undo_stack.len() > self.max_size {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    /// Drop the most recent snapshot; used when the change it was taken for
    /// ends up discarded (cancelled drawing).
    fn discard_last(&mut self) {
        self.undo_stack.pop();
    }

    fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        Some(previous)
    }

    fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(current);
        Some(next)
    }

    fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

/// Controller owning the editor state. The UI translates pointer events into
/// the entry points below; nothing else mutates the collections.
pub struct AnnotationEditor {
    state: EditorState,
    tool: Tool,
    next_id: u64,
    lane_counter: u32,
    trigger_counter: u32,
    in_progress: Option<InProgress>,
    dragging: Option<DraggedVertex>,
    history: History,
}

impl Default for AnnotationEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationEditor {
    pub fn new() -> Self {
        Self {
            state: EditorState::default(),
            tool: Tool::Lane,
            next_id: 0,
            lane_counter: 0,
            trigger_counter: 0,
            in_progress: None,
            dragging: None,
            history: History::new(),
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn is_drawing(&self) -> bool {
        self.in_progress.is_some()
    }

    /// Preview point of the in-progress annotation, if one is being drawn.
    pub fn preview_of(&self, id: AnnotationId) -> Option<Point> {
        self.in_progress
            .filter(|ip| ip.id == id)
            .map(|ip| ip.preview)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn alloc_id(&mut self) -> AnnotationId {
        self.next_id += 1;
        AnnotationId(self.next_id)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            lanes: self.state.lanes.clone(),
            triggers: self.state.triggers.clone(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.state.lanes = snapshot.lanes;
        self.state.triggers = snapshot.triggers;
        self.state.selected = None;
        self.in_progress = None;
        self.dragging = None;
    }

    /// Look up an annotation by id.
    pub fn annotation(&self, id: AnnotationId) -> Option<AnnotationRef<'_>> {
        self.state
            .lanes
            .iter()
            .find(|l| l.id == id.0)
            .map(AnnotationRef::Lane)
            .or_else(|| {
                self.state
                    .triggers
                    .iter()
                    .find(|t| t.id == id.0)
                    .map(AnnotationRef::Trigger)
            })
    }

    fn annotation_mut(&mut self, id: AnnotationId) -> Option<AnnotationMut<'_>> {
        if let Some(lane) = self.state.lanes.iter_mut().find(|l| l.id == id.0) {
            return Some(AnnotationMut::Lane(lane));
        }
        self.state
            .triggers
            .iter_mut()
            .find(|t| t.id == id.0)
            .map(AnnotationMut::Trigger)
    }

    /// Mutable view of the selected annotation, for property edits.
    pub fn selected_mut(&mut self) -> Option<AnnotationMut<'_>> {
        let id = self.state.selected?;
        self.annotation_mut(id)
    }

    // --- drawing state machine ---------------------------------------------

    /// Primary click on the canvas, in display coordinates.
    ///
    /// Drawing: fixes the preview point as a committed vertex. Idle: selects
    /// whatever the click hits, or starts a new annotation of the active
    /// tool kind on empty space.
    pub fn primary_click(&mut self, mapper: &DisplayMapper, cursor: Point) {
        if let Some(ip) = self.in_progress {
            let vertex = mapper.to_natural(cursor);
            if let Some(mut ann) = self.annotation_mut(ip.id) {
                ann.points_mut().push(vertex);
            }
            // The preview keeps tracking the cursor from the new vertex.
            self.in_progress = Some(InProgress {
                id: ip.id,
                preview: vertex,
            });
            return;
        }

        // Selection tests take precedence over starting a new annotation.
        if let Some(hit) = hit_test(&self.state.lanes, &self.state.triggers, mapper, cursor) {
            self.state.selected = Some(hit.id());
            return;
        }

        self.start_drawing(mapper.to_natural(cursor));
    }

    fn start_drawing(&mut self, origin: Point) {
        self.history.push(self.snapshot());
        let id = self.alloc_id();
        match self.tool {
            Tool::Lane => {
                self.lane_counter += 1;
                let mut lane = Lane::new(id.0, self.lane_counter);
                lane.points.push(origin);
                self.state.lanes.push(lane);
            }
            Tool::Trigger => {
                self.trigger_counter += 1;
                let mut trigger = Trigger::new(id.0, self.trigger_counter);
                trigger.points.push(origin);
                self.state.triggers.push(trigger);
            }
        }
        self.state.selected = Some(id);
        self.in_progress = Some(InProgress {
            id,
            preview: origin,
        });
        log::info!("started drawing {:?} {}", self.tool, id.0);
    }

    /// Pointer motion. Only the preview point moves; no vertex is added.
    pub fn pointer_move(&mut self, mapper: &DisplayMapper, cursor: Point) {
        if let Some(ip) = &mut self.in_progress {
            ip.preview = mapper.to_natural(cursor);
        }
    }

    /// Pointer press while idle: a press on a control point enters the
    /// vertex-drag sub-mode. Returns whether the press was consumed.
    pub fn pointer_press(&mut self, mapper: &DisplayMapper, cursor: Point) -> bool {
        if self.in_progress.is_some() {
            return false;
        }
        let hit = hit_test(&self.state.lanes, &self.state.triggers, mapper, cursor);
        if let Some(Hit::Vertex { id, index }) = hit {
            self.history.push(self.snapshot());
            self.state.selected = Some(id);
            self.dragging = Some(DraggedVertex { id, index });
            return true;
        }
        false
    }

    /// Pointer motion with the button held: moves the dragged vertex.
    pub fn pointer_drag(&mut self, mapper: &DisplayMapper, cursor: Point) {
        let Some(drag) = self.dragging else { return };
        let position = mapper.to_natural(cursor);
        if let Some(mut ann) = self.annotation_mut(drag.id) {
            let points = ann.points_mut();
            if let Some(vertex) = points.get_mut(drag.index) {
                *vertex = position;
            }
        }
    }

    /// Pointer release ends a vertex drag.
    pub fn pointer_release(&mut self) {
        self.dragging = None;
    }

    /// Complete the in-progress annotation (double-click or secondary
    /// click). The preview point is not part of the committed shape; an
    /// annotation left with fewer than two vertices is discarded.
    pub fn complete_drawing(&mut self) {
        let Some(ip) = self.in_progress.take() else {
            return;
        };
        let committed = self
            .annotation(ip.id)
            .map(|a| a.points().len())
            .unwrap_or(0);
        if committed < 2 {
            self.discard(ip.id);
            log::info!("discarded degenerate annotation {}", ip.id.0);
        } else {
            log::info!("committed annotation {} with {committed} vertices", ip.id.0);
        }
    }

    /// Abandon the in-progress annotation entirely (Escape).
    pub fn cancel_drawing(&mut self) {
        if let Some(ip) = self.in_progress.take() {
            self.discard(ip.id);
            log::info!("cancelled drawing {}", ip.id.0);
        }
    }

    /// Remove a never-committed annotation and the history snapshot taken
    /// when drawing started.
    fn discard(&mut self, id: AnnotationId) {
        self.state.lanes.retain(|l| l.id != id.0);
        self.state.triggers.retain(|t| t.id != id.0);
        if self.state.selected == Some(id) {
            self.state.selected = None;
        }
        self.history.discard_last();
    }

    /// Switch the active tool. Switching mid-draw abandons the in-progress
    /// annotation, the same as Escape; committed annotations are untouched.
    pub fn set_tool(&mut self, tool: Tool) {
        if self.tool == tool {
            return;
        }
        self.cancel_drawing();
        self.tool = tool;
    }

    // --- selection and mutation --------------------------------------------

    pub fn select(&mut self, id: AnnotationId) {
        if self.annotation(id).is_some() {
            self.state.selected = Some(id);
        }
    }

    pub fn deselect(&mut self) {
        self.state.selected = None;
    }

    /// Delete an annotation. The caller is responsible for user
    /// confirmation; this only mutates state.
    pub fn delete(&mut self, id: AnnotationId) -> bool {
        if self.annotation(id).is_none() {
            return false;
        }
        // Deleting the annotation being drawn is just a cancel.
        if self.in_progress.map(|ip| ip.id) == Some(id) {
            self.cancel_drawing();
            return true;
        }
        self.history.push(self.snapshot());
        self.state.lanes.retain(|l| l.id != id.0);
        self.state.triggers.retain(|t| t.id != id.0);
        if self.state.selected == Some(id) {
            self.state.selected = None;
        }
        if self.dragging.map(|d| d.id) == Some(id) {
            self.dragging = None;
        }
        log::info!("deleted annotation {}", id.0);
        true
    }

    /// Remove every annotation. Caller confirms first.
    pub fn clear_all(&mut self) {
        if self.state.lanes.is_empty() && self.state.triggers.is_empty() {
            return;
        }
        self.history.push(self.snapshot());
        self.state.lanes.clear();
        self.state.triggers.clear();
        self.state.selected = None;
        self.in_progress = None;
        self.dragging = None;
        log::info!("cleared all annotations");
    }

    pub fn undo(&mut self) {
        self.cancel_drawing();
        if let Some(previous) = self.history.undo(self.snapshot()) {
            self.restore(previous);
            log::info!("undo");
        }
    }

    pub fn redo(&mut self) {
        self.cancel_drawing();
        if let Some(next) = self.history.redo(self.snapshot()) {
            self.restore(next);
            log::info!("redo");
        }
    }

    // --- load/replace -------------------------------------------------------

    /// Replace the annotation set wholesale, as on config load.
    ///
    /// Ids are reassigned (they are not persisted), counters are reseeded,
    /// and all transient state including history is reset. The live video
    /// size wins over the payload's unless the live size is still unknown.
    pub fn replace_contents(
        &mut self,
        mut lanes: Vec<Lane>,
        mut triggers: Vec<Trigger>,
        payload_size: VideoSize,
    ) {
        self.next_id = 0;
        for lane in &mut lanes {
            self.next_id += 1;
            lane.id = self.next_id;
        }
        for trigger in &mut triggers {
            self.next_id += 1;
            trigger.id = self.next_id;
        }
        self.lane_counter = lanes.iter().map(|l| l.number).max().unwrap_or(0);
        self.trigger_counter = triggers.len() as u32;

        if !self.state.video_size.is_known() && payload_size.is_known() {
            self.state.video_size = payload_size;
        }
        log::info!(
            "loaded {} lanes and {} triggers",
            lanes.len(),
            triggers.len()
        );
        self.state.lanes = lanes;
        self.state.triggers = triggers;
        self.state.selected = None;
        self.in_progress = None;
        self.dragging = None;
        self.history.clear();
    }

    /// Adopt the media's own natural size; live metadata always wins over a
    /// size loaded from a config.
    pub fn set_video_size(&mut self, width: u32, height: u32) {
        self.state.video_size = VideoSize::new(width, height);
    }
}
