#![allow(clippy::float_cmp)]

use super::*;
use crate::doc::default_seed;
use crate::snap::SnapEdge;

// =============================================================
// Helpers
// =============================================================

fn engine(blocks: Vec<Block>) -> EngineCore {
    let mut core = EngineCore::new();
    core.load_seed(blocks).unwrap();
    core
}

fn pos(core: &EngineCore, id: BlockId) -> Point {
    core.block(id).unwrap().position()
}

fn next_of(core: &EngineCore, id: BlockId) -> Option<BlockId> {
    core.block(id).unwrap().next
}

/// Grab `id` 10px inside its top-left corner and move it so its origin lands on `to`.
fn drag_without_release(core: &mut EngineCore, id: BlockId, to: Point) {
    let grab = Point::new(10.0, 10.0);
    let at = pos(core, id).plus(grab).plus(core.camera().pan());
    core.on_pointer_down(at, PointerTarget::Block(id));
    core.on_pointer_move(to.plus(grab).plus(core.camera().pan()));
}

fn drag(core: &mut EngineCore, id: BlockId, to: Point) -> Vec<Action> {
    drag_without_release(core, id, to);
    core.on_pointer_up()
}

fn has_code_changed(actions: &[Action]) -> bool {
    actions.iter().any(|a| matches!(a, Action::CodeChanged(_)))
}

fn three_statements() -> Vec<Block> {
    vec![
        Block::stackable(1, "s1", 0.0, 0.0),
        Block::stackable(2, "s2", 0.0, 200.0),
        Block::stackable(3, "s3", 0.0, 400.0),
    ]
}

/// Deterministic xorshift64 for the randomized gesture test.
struct Rng(u64);

impl Rng {
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    #[allow(clippy::cast_precision_loss)]
    fn coord(&mut self, max: u64) -> f64 {
        (self.next_u64() % max) as f64
    }
}

// =============================================================
// Seed and data inputs
// =============================================================

#[test]
fn new_engine_is_empty_and_idle() {
    let core = EngineCore::new();
    assert!(core.doc().is_empty());
    assert_eq!(core.state.input, InputState::Idle);
    assert_eq!(core.code(), "");
}

#[test]
fn load_seed_emits_code() {
    let mut core = EngineCore::new();
    let actions = core.load_seed(default_seed()).unwrap();
    assert_eq!(actions[0], Action::CodeChanged(codegen::generate_code(core.doc())));
    assert_eq!(actions[1], Action::RenderNeeded);
    assert_eq!(core.doc().len(), 4);
}

#[test]
fn load_seed_rejects_duplicates_and_keeps_state() {
    let mut core = engine(default_seed());
    let err = core
        .load_seed(vec![Block::stackable(1, "a", 0.0, 0.0), Block::stackable(1, "b", 0.0, 0.0)])
        .unwrap_err();
    assert_eq!(err, DocError::DuplicateId(1));
    assert_eq!(core.doc().len(), 4);
}

#[test]
fn load_seed_cancels_gesture() {
    let mut core = engine(three_statements());
    core.on_pointer_down(Point::new(5.0, 5.0), PointerTarget::Block(1));
    core.load_seed(three_statements()).unwrap();
    assert_eq!(core.state.input, InputState::Idle);
}

#[test]
fn insert_block_adds_and_regenerates_code() {
    let mut core = engine(three_statements());
    let actions = core.insert_block(Block::stackable(4, "s0", 0.0, -100.0)).unwrap();
    assert_eq!(actions[0], Action::CodeChanged("s0;\ns1;\ns2;\ns3;".into()));
}

#[test]
fn insert_block_rejecting_cycle_leaves_doc_untouched() {
    let mut core = engine(vec![Block::stackable(1, "a", 0.0, 0.0).with_next(2), Block::stackable(2, "b", 0.0, 50.0)]);
    let err = core.insert_block(Block::stackable(2, "b", 0.0, 50.0).with_next(1)).unwrap_err();
    assert!(matches!(err, DocError::Cycle(_)));
    assert_eq!(next_of(&core, 2), None);
}

#[test]
fn remove_block_splices_chain() {
    let mut core = engine(vec![
        Block::stackable(1, "a", 0.0, 0.0).with_next(2),
        Block::stackable(2, "b", 0.0, 50.0).with_next(3),
        Block::stackable(3, "c", 0.0, 100.0),
    ]);
    let actions = core.remove_block(2);
    assert!(has_code_changed(&actions));
    assert_eq!(next_of(&core, 1), Some(3));
    assert!(core.block(2).is_none());
}

#[test]
fn remove_first_nested_block_advances_container_child() {
    let mut core = engine(vec![
        Block::container(1, "loop", 0.0, 0.0).with_child(2),
        Block::stackable(2, "a", 15.0, 55.0).with_next(3),
        Block::stackable(3, "b", 15.0, 105.0),
    ]);
    core.remove_block(2);
    assert_eq!(core.block(1).unwrap().child(), Some(3));
    assert!(core.doc().check_invariants().is_ok());
}

#[test]
fn remove_unknown_block_is_noop() {
    let mut core = engine(three_statements());
    assert!(core.remove_block(99).is_empty());
    assert_eq!(core.doc().len(), 3);
}

// =============================================================
// Snapping
// =============================================================

#[test]
fn snapping_builds_a_program_in_order() {
    let mut core = engine(three_statements());

    drag_without_release(&mut core, 2, Point::new(5.0, 55.0));
    assert_eq!(core.snap_candidate(), Some(SnapCandidate { target: 1, edge: SnapEdge::Top }));
    let actions = core.on_pointer_up();
    assert!(has_code_changed(&actions));
    assert_eq!(pos(&core, 2), Point::new(0.0, 50.0));
    assert_eq!(next_of(&core, 1), Some(2));

    drag(&mut core, 3, Point::new(3.0, 103.0));
    assert_eq!(pos(&core, 3), Point::new(0.0, 100.0));
    assert_eq!(next_of(&core, 2), Some(3));
    assert_eq!(core.code(), "s1;\ns2;\ns3;");
}

#[test]
fn snapping_above_a_free_block() {
    let mut core = engine(three_statements());
    drag_without_release(&mut core, 2, Point::new(5.0, -52.0));
    assert_eq!(core.snap_candidate(), Some(SnapCandidate { target: 1, edge: SnapEdge::Bottom }));
    core.on_pointer_up();
    assert_eq!(pos(&core, 2), Point::new(0.0, -50.0));
    assert_eq!(next_of(&core, 2), Some(1));
    assert_eq!(core.code(), "s2;\ns1;\ns3;");
}

#[test]
fn no_snap_beyond_threshold() {
    let mut core = engine(three_statements());
    drag_without_release(&mut core, 2, Point::new(31.0, 55.0));
    assert_eq!(core.snap_candidate(), None);
    let actions = core.on_pointer_up();
    assert!(actions.contains(&Action::RenderNeeded));
    assert_eq!(pos(&core, 2), Point::new(31.0, 55.0));
    assert_eq!(next_of(&core, 1), None);
}

#[test]
fn snapped_chain_moves_with_its_head() {
    let mut core = engine(vec![
        Block::stackable(1, "a", 0.0, 0.0).with_next(2),
        Block::stackable(2, "b", 0.0, 50.0),
        Block::stackable(3, "c", 300.0, 300.0),
    ]);
    drag(&mut core, 1, Point::new(305.0, 355.0));
    assert_eq!(pos(&core, 1), Point::new(300.0, 350.0));
    assert_eq!(pos(&core, 2), Point::new(300.0, 400.0));
    assert_eq!(next_of(&core, 3), Some(1));
    assert_eq!(next_of(&core, 1), Some(2));
    assert_eq!(core.code(), "c;\na;\nb;");
}

#[test]
fn stale_snap_target_leaves_block_floating() {
    let mut core = engine(three_statements());
    drag_without_release(&mut core, 2, Point::new(5.0, 55.0));
    assert!(core.snap_candidate().is_some());

    core.remove_block(1);
    let actions = core.on_pointer_up();
    assert_eq!(actions, vec![Action::SetCursor(CURSOR_GRAB.into()), Action::RenderNeeded]);
    assert_eq!(pos(&core, 2), Point::new(5.0, 55.0));
    assert_eq!(next_of(&core, 2), None);
}

#[test]
fn block_linked_to_dragged_block_mid_drag_is_cut_on_snap() {
    let mut core = engine(three_statements());
    drag_without_release(&mut core, 2, Point::new(5.0, 55.0));
    core.insert_block(Block::stackable(9, "x", 900.0, 900.0).with_next(2)).unwrap();

    let actions = core.on_pointer_up();
    assert!(has_code_changed(&actions));
    core.doc().check_invariants().unwrap();
    assert_eq!(next_of(&core, 1), Some(2));
    assert_eq!(next_of(&core, 9), None);
    assert_eq!(pos(&core, 2), Point::new(0.0, 50.0));
}

#[test]
fn block_linked_to_dragged_block_mid_drag_is_cut_when_floating() {
    let mut core = engine(three_statements());
    drag_without_release(&mut core, 2, Point::new(500.0, 500.0));
    core.insert_block(Block::stackable(9, "x", 900.0, 900.0).with_next(2)).unwrap();

    let actions = core.on_pointer_up();
    assert!(has_code_changed(&actions));
    core.doc().check_invariants().unwrap();
    assert_eq!(next_of(&core, 9), None);
    assert_eq!(pos(&core, 2), Point::new(500.0, 500.0));
}

// =============================================================
// Containers
// =============================================================

#[test]
fn empty_container_has_one_slot() {
    let core = engine(default_seed());
    let size = core.container_size(4).unwrap();
    assert_eq!(size.height, 120.0);
    assert_eq!(size.width, 250.0);
    assert_eq!(size.child_count, 0);
    assert!(core.container_size(1).is_none());
    assert!(core.container_size(99).is_none());
}

#[test]
fn drop_into_empty_container() {
    let mut core = engine(vec![Block::stackable(1, "d", 0.0, 300.0), Block::container(2, "loop", 400.0, 0.0)]);
    drag(&mut core, 1, Point::new(420.0, 60.0));
    assert_eq!(pos(&core, 1), Point::new(415.0, 55.0));
    assert_eq!(core.block(2).unwrap().child(), Some(1));
    assert_eq!(core.container_size(2).unwrap().child_count, 1);
    assert_eq!(core.container_size(2).unwrap().height, 120.0);
    assert_eq!(core.code(), "loop;\nd;");
}

#[test]
fn drop_appends_below_last_nested_block() {
    let mut core = engine(vec![
        Block::container(1, "loop", 0.0, 0.0).with_child(2),
        Block::stackable(2, "a", 15.0, 55.0),
        Block::stackable(3, "b", 400.0, 400.0),
    ]);
    drag(&mut core, 3, Point::new(20.0, 80.0));
    assert_eq!(pos(&core, 3), Point::new(15.0, 105.0));
    assert_eq!(next_of(&core, 2), Some(3));
    assert_eq!(core.container_size(1).unwrap().height, 170.0);
}

#[test]
fn container_drop_wins_over_snap() {
    let mut core = engine(vec![
        Block::container(1, "loop", 0.0, 0.0),
        Block::stackable(2, "a", 300.0, 300.0),
        Block::stackable(3, "s", 15.0, 5.0),
    ]);
    drag(&mut core, 2, Point::new(20.0, 60.0));
    assert_eq!(core.block(1).unwrap().child(), Some(2));
    assert_eq!(next_of(&core, 3), None);
}

#[test]
fn containment_cuts_dragged_successors_loose() {
    let mut core = engine(vec![
        Block::stackable(1, "a", 0.0, 300.0).with_next(2),
        Block::stackable(2, "b", 0.0, 350.0),
        Block::container(3, "loop", 400.0, 0.0),
    ]);
    drag(&mut core, 1, Point::new(420.0, 60.0));
    assert_eq!(core.block(3).unwrap().child(), Some(1));
    assert_eq!(next_of(&core, 1), None);
    assert_eq!(pos(&core, 2), Point::new(420.0, 110.0));
    assert!(core.doc().check_invariants().is_ok());
}

#[test]
fn container_moves_rigidly_with_nested_blocks() {
    let mut core = engine(vec![
        Block::container(1, "loop", 400.0, 0.0).with_child(2),
        Block::stackable(2, "d", 415.0, 55.0),
    ]);
    drag(&mut core, 1, Point::new(100.0, 300.0));
    assert_eq!(pos(&core, 1), Point::new(100.0, 300.0));
    assert_eq!(pos(&core, 2), Point::new(115.0, 355.0));
    assert_eq!(core.block(1).unwrap().child(), Some(2));
}

#[test]
fn container_with_successor_moves_both_chains_once() {
    let mut core = engine(vec![
        Block::container(1, "loop", 0.0, 0.0).with_child(2).with_next(3),
        Block::stackable(2, "body", 15.0, 55.0),
        Block::stackable(3, "after", 0.0, 120.0),
    ]);
    drag(&mut core, 1, Point::new(300.0, 300.0));
    assert_eq!(pos(&core, 1), Point::new(300.0, 300.0));
    assert_eq!(pos(&core, 2), Point::new(315.0, 355.0));
    assert_eq!(pos(&core, 3), Point::new(300.0, 420.0));
    assert_eq!(core.block(1).unwrap().child(), Some(2));
    assert_eq!(next_of(&core, 1), Some(3));
    assert_eq!(core.code(), "loop;\nbody;\nafter;");
}

#[test]
fn container_linking_dragged_block_mid_drag_is_cut_on_container_drop() {
    let mut core = engine(vec![Block::stackable(1, "d", 0.0, 300.0), Block::container(2, "loop", 400.0, 0.0)]);
    drag_without_release(&mut core, 1, Point::new(420.0, 60.0));
    core.insert_block(Block::container(9, "other", 900.0, 900.0).with_child(1)).unwrap();

    core.on_pointer_up();
    core.doc().check_invariants().unwrap();
    assert_eq!(core.block(2).unwrap().child(), Some(1));
    assert_eq!(core.block(9).unwrap().child(), None);
    assert_eq!(pos(&core, 1), Point::new(415.0, 55.0));
}

#[test]
fn dragging_first_nested_block_out_advances_child() {
    let mut core = engine(vec![
        Block::container(1, "loop", 0.0, 0.0).with_child(2),
        Block::stackable(2, "a", 15.0, 55.0).with_next(3),
        Block::stackable(3, "b", 15.0, 105.0),
    ]);
    drag(&mut core, 2, Point::new(500.0, 500.0));
    assert_eq!(core.block(1).unwrap().child(), Some(3));
    assert_eq!(next_of(&core, 2), None);
    assert_eq!(core.container_size(1).unwrap().child_count, 1);
}

// =============================================================
// Pointer-down detach
// =============================================================

#[test]
fn pointer_down_detaches_from_predecessor() {
    let mut core = engine(vec![Block::stackable(1, "a", 0.0, 0.0).with_next(2), Block::stackable(2, "b", 0.0, 50.0)]);
    let actions = core.on_pointer_down(Point::new(10.0, 60.0), PointerTarget::Block(2));
    assert_eq!(next_of(&core, 1), None);
    assert_eq!(actions[0], Action::SetCursor(CURSOR_GRABBING.into()));
    assert_eq!(actions[1], Action::CodeChanged("a;\nb;".into()));
    assert_eq!(core.dragged_block(), Some(2));
    assert_eq!(core.state.input.drag_anchor_offset(), Some(Point::new(10.0, 10.0)));
}

#[test]
fn detach_is_idempotent_across_presses() {
    let mut core = engine(vec![Block::stackable(1, "a", 0.0, 0.0).with_next(2), Block::stackable(2, "b", 0.0, 50.0)]);
    core.on_pointer_down(Point::new(10.0, 60.0), PointerTarget::Block(2));
    core.on_pointer_up();
    let doc = core.doc().clone();
    let actions = core.on_pointer_down(Point::new(10.0, 60.0), PointerTarget::Block(2));
    assert!(!has_code_changed(&actions));
    assert_eq!(core.doc(), &doc);
}

#[test]
fn pointer_down_on_unknown_block_does_nothing() {
    let mut core = engine(three_statements());
    assert!(core.on_pointer_down(Point::new(0.0, 0.0), PointerTarget::Block(42)).is_empty());
    assert_eq!(core.state.input, InputState::Idle);
}

#[test]
fn move_and_up_while_idle_do_nothing() {
    let mut core = engine(three_statements());
    assert!(core.on_pointer_move(Point::new(10.0, 10.0)).is_empty());
    assert!(core.on_pointer_up().is_empty());
}

#[test]
fn zero_delta_move_only_requests_render() {
    let mut core = engine(three_statements());
    core.on_pointer_down(Point::new(10.0, 10.0), PointerTarget::Block(1));
    assert_eq!(core.on_pointer_move(Point::new(10.0, 10.0)), vec![Action::RenderNeeded]);
}

// =============================================================
// Panning
// =============================================================

#[test]
fn canvas_drag_pans_camera() {
    let mut core = engine(default_seed());
    let down = core.on_pointer_down(Point::new(100.0, 100.0), PointerTarget::Canvas);
    assert_eq!(down, vec![Action::SetCursor(CURSOR_GRABBING.into())]);
    assert!(core.is_panning());

    assert_eq!(core.on_pointer_move(Point::new(150.0, 130.0)), vec![Action::RenderNeeded]);
    assert_eq!(core.camera().pan(), Point::new(50.0, 30.0));

    assert_eq!(core.on_pointer_up(), vec![Action::SetCursor(CURSOR_GRAB.into())]);
    assert!(!core.is_panning());
    assert_eq!(pos(&core, 1), Point::new(50.0, 50.0));
}

#[test]
fn pointer_target_accounts_for_pan() {
    let mut core = engine(default_seed());
    assert_eq!(core.pointer_target_at(Point::new(60.0, 70.0)), PointerTarget::Block(1));
    core.state.camera.set_pan(Point::new(50.0, 30.0));
    assert_eq!(core.pointer_target_at(Point::new(60.0, 70.0)), PointerTarget::Canvas);
    assert_eq!(core.pointer_target_at(Point::new(110.0, 100.0)), PointerTarget::Block(1));
}

#[test]
fn container_body_press_neither_pans_nor_drags() {
    let mut core = engine(default_seed());
    let at = Point::new(320.0, 130.0);
    assert_eq!(core.pointer_target_at(at), PointerTarget::ContainerBody(4));

    assert!(core.on_pointer_down(at, PointerTarget::ContainerBody(4)).is_empty());
    assert_eq!(core.state.input, InputState::Idle);
    assert!(core.on_pointer_move(Point::new(400.0, 300.0)).is_empty());
    assert!(core.on_pointer_up().is_empty());
    assert_eq!(core.camera().pan(), Point::new(0.0, 0.0));
    assert_eq!(pos(&core, 4), Point::new(300.0, 50.0));
}

#[test]
fn container_header_still_grabs() {
    let core = engine(default_seed());
    assert_eq!(core.pointer_target_at(Point::new(320.0, 60.0)), PointerTarget::Block(4));
}

#[test]
fn drag_under_pan_keeps_grab_offset() {
    let mut core = engine(three_statements());
    core.state.camera.set_pan(Point::new(100.0, 0.0));
    core.on_pointer_down(Point::new(110.0, 410.0), PointerTarget::Block(3));
    core.on_pointer_move(Point::new(310.0, 510.0));
    assert_eq!(pos(&core, 3), Point::new(200.0, 500.0));
}

// =============================================================
// step() and invariants
// =============================================================

#[test]
fn step_is_deterministic_and_leaves_input_untouched() {
    let core = engine(three_statements());
    let state = core.state.clone();
    let event = PointerEvent::Down { at: Point::new(10.0, 210.0), target: PointerTarget::Block(2) };

    let (a, actions_a) = step(state.clone(), &Layout::default(), event);
    let (b, actions_b) = step(state.clone(), &Layout::default(), event);
    assert_eq!(a, b);
    assert_eq!(actions_a, actions_b);
    assert_eq!(state, core.state);
    assert_eq!(a.input.dragged_block(), Some(2));
}

#[test]
fn step_idle_move_is_identity() {
    let core = engine(default_seed());
    let (next, actions) = step(core.state.clone(), &Layout::default(), PointerEvent::Move { at: Point::new(1.0, 1.0) });
    assert_eq!(next, core.state);
    assert!(actions.is_empty());
}

#[test]
fn editor_state_serde_round_trip_mid_drag() {
    let mut core = engine(default_seed());
    drag_without_release(&mut core, 1, Point::new(55.0, 60.0));
    let json = serde_json::to_string(&core.state).unwrap();
    let back: EditorState = serde_json::from_str(&json).unwrap();
    assert_eq!(back, core.state);
}

/// Loose stackables and two empty containers, close enough that aimed drags
/// land within snapping range.
fn scattered_blocks() -> Vec<Block> {
    vec![
        Block::stackable(1, "a", 0.0, 0.0),
        Block::stackable(2, "b", 0.0, 150.0),
        Block::stackable(3, "c", 250.0, 0.0),
        Block::stackable(4, "d", 250.0, 150.0),
        Block::stackable(5, "e", 0.0, 300.0),
        Block::container(6, "loop", 500.0, 0.0),
        Block::container(7, "branch", 500.0, 250.0),
    ]
}

fn link_counts(doc: &DocStore) -> (usize, usize) {
    let nexts = doc.iter().filter(|b| b.next.is_some()).count();
    let children = doc.iter().filter(|b| b.child().is_some()).count();
    (nexts, children)
}

/// Screen point that puts the dragged block's origin just below, just above,
/// or inside `target`, off by less than the snap threshold.
fn aim_near(core: &EngineCore, rng: &mut Rng, target: BlockId, grab_offset: Point) -> Point {
    let doc = core.doc();
    let other = doc.get(target).unwrap();
    let jitter = Point::new(rng.coord(40) - 20.0, rng.coord(40) - 20.0);
    let origin = match rng.next_u64() % 3 {
        0 => Point::new(other.x, geometry::block_rect(doc, other, &core.layout).bottom()),
        1 => Point::new(other.x, other.y - core.layout.block_height),
        _ if other.is_container() => geometry::first_slot(other, &core.layout),
        _ => Point::new(other.x, other.y - core.layout.block_height),
    };
    origin.plus(jitter).plus(grab_offset).plus(core.camera().pan())
}

#[test]
fn random_gestures_preserve_invariants() {
    let mut core = engine(scattered_blocks());
    let mut rng = Rng(0x9E37_79B9_7F4A_7C15);
    let ids: Vec<BlockId> = core.doc().ids();
    let pick = |rng: &mut Rng| ids[usize::try_from(rng.next_u64()).unwrap() % ids.len()];
    let (mut snaps, mut nests) = (0, 0);

    for _ in 0..3000 {
        let event = match rng.next_u64() % 4 {
            0 if rng.next_u64() % 6 == 0 => {
                PointerEvent::Down { at: Point::new(rng.coord(600), rng.coord(600)), target: PointerTarget::Canvas }
            }
            0 => {
                let id = pick(&mut rng);
                let at = pos(&core, id).plus(Point::new(10.0, 10.0)).plus(core.camera().pan());
                PointerEvent::Down { at, target: PointerTarget::Block(id) }
            }
            1 | 2 => match core.state.input {
                InputState::DraggingBlock { id, grab_offset, .. } => {
                    let target = pick(&mut rng);
                    if target == id {
                        continue;
                    }
                    PointerEvent::Move { at: aim_near(&core, &mut rng, target, grab_offset) }
                }
                _ => PointerEvent::Move { at: Point::new(rng.coord(600), rng.coord(600)) },
            },
            _ => PointerEvent::Up,
        };

        let dropped = core.state.input.dragged_block().filter(|_| matches!(event, PointerEvent::Up));
        let before = link_counts(core.doc());
        let actions = core.handle(event);
        let after = link_counts(core.doc());

        core.doc().check_invariants().unwrap();
        for action in actions {
            if let Action::CodeChanged(code) = action {
                assert_eq!(code, core.code());
                assert_eq!(code.lines().count(), core.doc().len());
            }
        }
        if let Some(id) = dropped {
            if after.0 > before.0 {
                snaps += 1;
            }
            if core.doc().enclosing_container(id).is_some() {
                nests += 1;
            }
        }
    }

    assert!(snaps > 0, "no drop formed a next link");
    assert!(nests > 0, "no drop landed inside a container");
    let (nexts, children) = link_counts(core.doc());
    assert!(nexts + children > 0);
}
