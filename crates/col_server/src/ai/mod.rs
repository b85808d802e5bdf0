//! Server-side AI.
//!
//! Each AI unit carries at most one [`Mission`]. The [`AiController`] steps
//! every mission once per turn, strictly one unit after another in id
//! order, and drops missions that report completion.

mod mission;
mod travel;

use std::collections::BTreeMap;

use col_core::error::Result;
use col_core::game::Game;
use col_core::objects::ObjectId;
use rand::Rng;

pub use col_core::game::MoveType;
pub use mission::{InvalidReason, Mission, MissionKind, MissionStep};
pub use travel::{direction_between, move_randomly_turn, travel_to_target};

/// What one AI turn did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AiTurnReport {
    /// Missions stepped.
    pub ran: usize,
    /// Missions that completed and were removed.
    pub completed: usize,
}

/// Owns and runs the missions of every AI unit.
#[derive(Debug, Clone, Default)]
pub struct AiController {
    missions: BTreeMap<ObjectId, Mission>,
}

impl AiController {
    /// Create a controller with no missions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of active missions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.missions.len()
    }

    /// Whether no missions are active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.missions.is_empty()
    }

    /// The mission of a unit.
    #[must_use]
    pub fn mission(&self, unit: ObjectId) -> Option<&Mission> {
        self.missions.get(&unit)
    }

    /// Give a unit a mission.
    ///
    /// A unit's current mission is only replaced if it is one-time.
    /// Returns whether the mission was assigned.
    pub fn assign(&mut self, mission: Mission) -> bool {
        let unit = mission.unit();
        if let Some(current) = self.missions.get(&unit) {
            if !current.is_one_time() {
                tracing::trace!(unit, current = ?current.kind(), "Mission kept");
                return false;
            }
        }
        tracing::debug!(unit, kind = ?mission.kind(), "Mission assigned");
        self.missions.insert(unit, mission);
        true
    }

    /// Give every AI unit without a mission an idle-at-settlement mission.
    /// Returns how many were assigned.
    pub fn assign_idle_missions(&mut self, game: &Game) -> usize {
        let mut assigned = 0;
        for object in game.objects().iter() {
            let Some(unit) = &object.unit else {
                continue;
            };
            let ai = game.objects().player(unit.owner).is_some_and(|p| p.ai);
            if ai && !self.missions.contains_key(&object.id) {
                self.missions
                    .insert(object.id, Mission::idle_at_settlement(object.id));
                assigned += 1;
            }
        }
        assigned
    }

    /// Step every mission once, in unit id order.
    pub fn run_turn<R: Rng>(&mut self, game: &mut Game, rng: &mut R) -> Result<AiTurnReport> {
        let mut report = AiTurnReport::default();
        let units: Vec<ObjectId> = self.missions.keys().copied().collect();

        for unit in units {
            let Some(mission) = self.missions.get_mut(&unit) else {
                continue;
            };
            let step = mission.step(game, rng)?;
            report.ran += 1;
            if step == MissionStep::Complete {
                self.missions.remove(&unit);
                report.completed += 1;
            }
        }

        tracing::debug!(
            turn = game.turn(),
            ran = report.ran,
            completed = report.completed,
            "AI turn finished"
        );
        Ok(report)
    }
}
