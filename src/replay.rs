//! Driving an [`EngineCore`] through a scripted event sequence.

#[cfg(test)]
#[path = "replay_test.rs"]
mod replay_test;

use canvas::camera::Point;
use canvas::doc::DocError;
use canvas::engine::{Action, EngineCore};
use canvas::input::PointerTarget;

use crate::script::ScriptEvent;

/// One replayed event and what the engine asked the host to do.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    pub event: ScriptEvent,
    /// Pointer target actually used for a `down`, after hit testing.
    pub target: Option<PointerTarget>,
    pub actions: Vec<Action>,
}

/// Outcome of a full replay.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayReport {
    pub steps: Vec<StepRecord>,
    /// Number of `CodeChanged` actions emitted across all steps.
    pub code_emissions: usize,
    pub final_code: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("step {step}: insert rejected: {source}")]
    Insert {
        step: usize,
        #[source]
        source: DocError,
    },
}

/// Feed `events` to `core` in order.
///
/// # Errors
///
/// Returns [`ReplayError::Insert`] if a scripted insert would break the block
/// relations; earlier steps stay applied.
pub fn replay(core: &mut EngineCore, events: &[ScriptEvent]) -> Result<ReplayReport, ReplayError> {
    let mut steps = Vec::with_capacity(events.len());

    for (index, event) in events.iter().enumerate() {
        let step = index + 1;
        let mut target = None;
        let actions = match event {
            ScriptEvent::Down { x, y, target: scripted } => {
                let at = Point::new(*x, *y);
                let resolved = scripted.unwrap_or_else(|| core.pointer_target_at(at));
                target = Some(resolved);
                core.on_pointer_down(at, resolved)
            }
            ScriptEvent::Move { x, y } => core.on_pointer_move(Point::new(*x, *y)),
            ScriptEvent::Up => core.on_pointer_up(),
            ScriptEvent::Remove { id } => core.remove_block(*id),
            ScriptEvent::Insert { block } => {
                core.insert_block(block.clone()).map_err(|source| ReplayError::Insert { step, source })?
            }
        };
        tracing::debug!(step, ?event, actions = actions.len(), "replayed");
        steps.push(StepRecord { event: event.clone(), target, actions });
    }

    let code_emissions = steps
        .iter()
        .flat_map(|s| &s.actions)
        .filter(|a| matches!(a, Action::CodeChanged(_)))
        .count();
    Ok(ReplayReport { steps, code_emissions, final_code: core.code() })
}
