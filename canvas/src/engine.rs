use serde::{Deserialize, Serialize};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::camera::{Camera, Point};
use crate::codegen;
use crate::doc::{Block, BlockId, DocError, DocStore};
use crate::geometry::{self, ContainerSize};
use crate::graph;
use crate::hit;
use crate::input::{InputState, PointerEvent, PointerTarget};
use crate::layout::Layout;
use crate::render;
use crate::scene::{self, Scene};
use crate::snap::{self, SnapCandidate};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Cursor shown while nothing is held.
pub const CURSOR_GRAB: &str = "grab";
/// Cursor shown while panning or dragging.
pub const CURSOR_GRABBING: &str = "grabbing";

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The block list changed; carries the regenerated program text.
    CodeChanged(String),
    SetCursor(String),
    RenderNeeded,
}

/// The complete, serializable editor state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorState {
    pub doc: DocStore,
    pub camera: Camera,
    pub input: InputState,
}

/// Apply one pointer event to `state`, returning the next state and the
/// actions the host should perform.
#[must_use]
pub fn step(state: EditorState, layout: &Layout, event: PointerEvent) -> (EditorState, Vec<Action>) {
    let mut core = EngineCore::with_state(state, *layout);
    let actions = core.handle(event);
    (core.state, actions)
}

/// Core engine state — all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
pub struct EngineCore {
    pub state: EditorState,
    pub layout: Layout,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub dpr: f64,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::with_state(EditorState::default(), Layout::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_layout(layout: Layout) -> Self {
        Self::with_state(EditorState::default(), layout)
    }

    #[must_use]
    pub fn with_state(state: EditorState, layout: Layout) -> Self {
        Self { state, layout, viewport_width: 0.0, viewport_height: 0.0, dpr: 1.0 }
    }

    // --- Data inputs ---

    /// Replace all blocks with a seed set and cancel any gesture.
    ///
    /// # Errors
    ///
    /// Returns [`DocError`] if the seed has duplicate ids or broken relations;
    /// the current state is left untouched.
    pub fn load_seed(&mut self, blocks: Vec<Block>) -> Result<Vec<Action>, DocError> {
        self.state.doc = DocStore::from_blocks(blocks)?;
        self.state.input = InputState::Idle;
        tracing::debug!(blocks = self.state.doc.len(), "seed loaded");
        Ok(self.changed())
    }

    /// Insert or replace a block supplied from outside the editor.
    ///
    /// # Errors
    ///
    /// Returns [`DocError`] if the block would break the relation invariants;
    /// the current state is left untouched.
    pub fn insert_block(&mut self, block: Block) -> Result<Vec<Action>, DocError> {
        let mut doc = self.state.doc.clone();
        doc.insert(block);
        doc.check_invariants()?;
        self.state.doc = doc;
        Ok(self.changed())
    }

    /// Remove a block, splicing its predecessor (or container) to its successor.
    ///
    /// A removed container's nested chain is left floating. An in-progress drag
    /// of the block is abandoned. Unknown ids are a no-op.
    pub fn remove_block(&mut self, id: BlockId) -> Vec<Action> {
        let doc = &mut self.state.doc;
        let Some(next) = doc.get(id).map(|b| b.next) else {
            return Vec::new();
        };
        if let Some(prev) = doc.predecessor_of(id) {
            if let Some(block) = doc.get_mut(prev) {
                block.next = next;
            }
        } else if let Some(container) = doc.container_of(id) {
            if let Some(block) = doc.get_mut(container) {
                block.set_child(next);
            }
        }
        doc.remove(id);

        if self.state.input.dragged_block() == Some(id) {
            self.state.input = InputState::Idle;
        }
        tracing::debug!(block = id, "block removed");
        self.changed()
    }

    /// Update viewport dimensions and device pixel ratio.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.viewport_width = width_css;
        self.viewport_height = height_css;
        self.dpr = dpr;
    }

    // --- Input events ---

    /// Dispatch a pointer event to the matching handler.
    pub fn handle(&mut self, event: PointerEvent) -> Vec<Action> {
        match event {
            PointerEvent::Down { at, target } => self.on_pointer_down(at, target),
            PointerEvent::Move { at } => self.on_pointer_move(at),
            PointerEvent::Up => self.on_pointer_up(),
        }
    }

    /// Start panning (canvas) or dragging (block). A press on a container's
    /// body starts nothing.
    ///
    /// Dragging a block first detaches it from its predecessor and, if it was
    /// the first block nested in a container, from that container.
    pub fn on_pointer_down(&mut self, at: Point, target: PointerTarget) -> Vec<Action> {
        let pan = self.state.camera.pan();
        match target {
            PointerTarget::Canvas => {
                self.state.input = InputState::Panning { anchor: at.minus(pan) };
                vec![Action::SetCursor(CURSOR_GRABBING.into())]
            }
            PointerTarget::ContainerBody(id) => {
                tracing::debug!(block = id, "pointer-down on container body ignored");
                Vec::new()
            }
            PointerTarget::Block(id) => {
                let Some(origin) = self.state.doc.get(id).map(Block::position) else {
                    tracing::debug!(block = id, "pointer-down on unknown block");
                    return Vec::new();
                };
                let detached = graph::detach(&mut self.state.doc, id);
                let grab_offset = at.minus(pan).minus(origin);
                self.state.input = InputState::DraggingBlock { id, grab_offset, snap: None };
                tracing::debug!(block = id, detached, "drag started");

                let mut actions = vec![Action::SetCursor(CURSOR_GRABBING.into())];
                if detached {
                    actions.extend(self.changed());
                } else {
                    actions.push(Action::RenderNeeded);
                }
                actions
            }
        }
    }

    /// Pan the camera, or move the dragged group and refresh its snap candidate.
    pub fn on_pointer_move(&mut self, at: Point) -> Vec<Action> {
        match self.state.input {
            InputState::Idle => Vec::new(),
            InputState::Panning { anchor } => {
                self.state.camera.set_pan(at.minus(anchor));
                vec![Action::RenderNeeded]
            }
            InputState::DraggingBlock { id, grab_offset, .. } => self.drag_to(id, grab_offset, at),
        }
    }

    /// Finish the current gesture.
    ///
    /// A dragged block lands, in priority order: inside the first container
    /// whose interior it overlaps, on its snap candidate, or floating where it is.
    pub fn on_pointer_up(&mut self) -> Vec<Action> {
        match std::mem::take(&mut self.state.input) {
            InputState::Idle => Vec::new(),
            InputState::Panning { .. } => vec![Action::SetCursor(CURSOR_GRAB.into())],
            InputState::DraggingBlock { id, snap, .. } => {
                let mut actions = vec![Action::SetCursor(CURSOR_GRAB.into())];
                if self.drop_block(id, snap) {
                    actions.extend(self.changed());
                } else {
                    actions.push(Action::RenderNeeded);
                }
                actions
            }
        }
    }

    fn drag_to(&mut self, id: BlockId, grab_offset: Point, at: Point) -> Vec<Action> {
        let doc = &mut self.state.doc;
        let Some(origin) = doc.get(id).map(Block::position) else {
            return Vec::new();
        };
        let target = at.minus(grab_offset).minus(self.state.camera.pan());
        let delta = target.minus(origin);

        let carried = graph::carried_blocks(doc, id);
        doc.translate(&[id], delta);
        doc.translate(&carried, delta);

        let snap = snap::find_snap_candidate(doc, &self.layout, id, &carried);
        self.state.input = InputState::DraggingBlock { id, grab_offset, snap };

        if delta.is_zero() { vec![Action::RenderNeeded] } else { self.changed() }
    }

    fn drop_block(&mut self, id: BlockId, snap: Option<SnapCandidate>) -> bool {
        if !self.state.doc.contains(id) {
            return false;
        }
        // Blocks inserted mid-drag may have linked to the dragged block.
        let detached = graph::detach(&mut self.state.doc, id);
        if detached {
            tracing::debug!(block = id, "dragged block was relinked mid-drag; detached again");
        }
        if let Some(container) = self.drop_container(id) {
            return self.insert_into_container(id, container) || detached;
        }
        if let Some(candidate) = snap {
            return snap::apply_snap(&mut self.state.doc, &self.layout, id, candidate) || detached;
        }
        tracing::debug!(block = id, "dropped floating");
        detached
    }

    /// First container (ascending id) whose interior the dragged block overlaps,
    /// excluding the dragged block and everything it carries.
    fn drop_container(&self, id: BlockId) -> Option<BlockId> {
        let doc = &self.state.doc;
        let block = doc.get(id)?;
        let size = geometry::block_size(doc, block, &self.layout);
        let carried = graph::carried_blocks(doc, id);
        doc.iter()
            .filter(|c| c.is_container() && c.id != id && !carried.contains(&c.id))
            .find(|c| geometry::overlaps(block.position(), size, doc, c, &self.layout))
            .map(|c| c.id)
    }

    /// Append `id` to the end of `container_id`'s nested chain.
    ///
    /// The block's own successors are cut loose and stay where they were
    /// dropped; blocks nested inside it move along.
    fn insert_into_container(&mut self, id: BlockId, container_id: BlockId) -> bool {
        let layout = self.layout;
        let doc = &mut self.state.doc;
        if let Some(block) = doc.get_mut(id) {
            block.next = None;
        }
        let Some(container) = doc.get(container_id) else {
            return false;
        };

        let nested = graph::nested_descendants(doc, container_id);
        let last = nested.last().copied();
        let slot = match last.and_then(|l| doc.get(l)) {
            Some(last_block) => Point::new(
                container.x + layout.block_padding,
                geometry::block_rect(doc, last_block, &layout).bottom(),
            ),
            None => geometry::first_slot(container, &layout),
        };

        let link_from = last.unwrap_or(container_id);
        if let Some(block) = doc.get_mut(link_from) {
            if link_from == container_id {
                block.set_child(Some(id));
            } else {
                block.next = Some(id);
            }
        }

        let Some(origin) = doc.get(id).map(Block::position) else {
            return false;
        };
        let delta = slot.minus(origin);
        let carried = graph::carried_blocks(doc, id);
        doc.translate(&[id], delta);
        doc.translate(&carried, delta);
        tracing::debug!(block = id, container = container_id, index = nested.len(), "dropped into container");
        true
    }

    fn changed(&self) -> Vec<Action> {
        vec![Action::CodeChanged(self.code()), Action::RenderNeeded]
    }

    // --- Queries ---

    /// What a pointer-down at `screen` would land on.
    #[must_use]
    pub fn pointer_target_at(&self, screen: Point) -> PointerTarget {
        let world = self.state.camera.screen_to_world(screen);
        if let Some(id) = hit::hit_test(&self.state.doc, &self.layout, world) {
            return PointerTarget::Block(id);
        }
        hit::container_body_at(&self.state.doc, &self.layout, world)
            .map_or(PointerTarget::Canvas, PointerTarget::ContainerBody)
    }

    #[must_use]
    pub fn doc(&self) -> &DocStore {
        &self.state.doc
    }

    /// Look up a block by id.
    #[must_use]
    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.state.doc.get(id)
    }

    /// The current camera state.
    #[must_use]
    pub fn camera(&self) -> Camera {
        self.state.camera
    }

    /// Program text for the current block list.
    #[must_use]
    pub fn code(&self) -> String {
        codegen::generate_code(&self.state.doc)
    }

    /// Derived size of a container block; `None` for stackables and unknown ids.
    #[must_use]
    pub fn container_size(&self, id: BlockId) -> Option<ContainerSize> {
        let block = self.state.doc.get(id).filter(|b| b.is_container())?;
        Some(geometry::container_size(&self.state.doc, block, &self.layout))
    }

    #[must_use]
    pub fn dragged_block(&self) -> Option<BlockId> {
        self.state.input.dragged_block()
    }

    #[must_use]
    pub fn snap_candidate(&self) -> Option<SnapCandidate> {
        self.state.input.snap_candidate()
    }

    #[must_use]
    pub fn is_panning(&self) -> bool {
        self.state.input.is_panning()
    }

    /// The drawable projection of the current state.
    #[must_use]
    pub fn scene(&self) -> Scene {
        scene::build_scene(&self.state, &self.layout)
    }
}

/// The full canvas engine. Wraps `EngineCore` and owns the browser canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    pub core: EngineCore,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement, layout: Layout) -> Self {
        let mut core = EngineCore::with_layout(layout);
        core.set_viewport(f64::from(canvas.width()), f64::from(canvas.height()), 1.0);
        Self { canvas, core }
    }

    // --- Delegated data inputs ---

    /// # Errors
    ///
    /// See [`EngineCore::load_seed`].
    pub fn load_seed(&mut self, blocks: Vec<Block>) -> Result<Vec<Action>, DocError> {
        self.core.load_seed(blocks)
    }

    /// # Errors
    ///
    /// See [`EngineCore::insert_block`].
    pub fn insert_block(&mut self, block: Block) -> Result<Vec<Action>, DocError> {
        self.core.insert_block(block)
    }

    pub fn remove_block(&mut self, id: BlockId) -> Vec<Action> {
        self.core.remove_block(id)
    }

    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.core.set_viewport(width_css, height_css, dpr);
    }

    // --- Input events ---

    /// Pointer-down in screen coordinates; the target is found by hit-testing.
    pub fn on_pointer_down(&mut self, screen_pt: Point) -> Vec<Action> {
        let target = self.core.pointer_target_at(screen_pt);
        self.core.on_pointer_down(screen_pt, target)
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point) -> Vec<Action> {
        self.core.on_pointer_move(screen_pt)
    }

    pub fn on_pointer_up(&mut self) -> Vec<Action> {
        self.core.on_pointer_up()
    }

    // --- Render ---

    /// Draw the current state to the canvas.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the 2D context cannot be obtained or a draw call fails.
    pub fn render(&self) -> Result<(), JsValue> {
        let Some(ctx) = self.canvas.get_context("2d")? else {
            return Ok(());
        };
        let ctx = ctx.dyn_into::<CanvasRenderingContext2d>()?;
        render::draw(
            &ctx,
            &self.core.scene(),
            &self.core.camera(),
            &self.core.layout,
            self.core.viewport_width,
            self.core.viewport_height,
            self.core.dpr,
        )
    }

    // --- Delegated queries ---

    #[must_use]
    pub fn code(&self) -> String {
        self.core.code()
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.core.camera()
    }

    #[must_use]
    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.core.block(id)
    }
}
