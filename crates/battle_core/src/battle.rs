//! The battle orchestrator: spawning, input intake, and the frame loop.
//!
//! [`Battle`] owns one [`GameState`] and drives it one frame at a time.
//! Each frame advances timeline entries in ascending unit-id order,
//! opens decisions for matured waits, executes matured intents, and
//! folds the resulting effects immediately. Given the same context,
//! initial state and input sequence, every run produces identical
//! states and identical effect streams.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::ai;
use crate::data::{EnemyTemplate, PlayerData};
use crate::decision::{open_decision, take_submission, DecisionId};
use crate::effect::{self, Effect};
use crate::error::{GameError, Result};
use crate::executor;
use crate::intent::{ActionState, BattleAction, UserInput};
use crate::math::{Fixed, Vec2Fixed};
use crate::state::{BattleContext, BattleMode, GameState};
use crate::timeline::TimelinePos;
use crate::units::{Unit, UnitId, UnitKind};

/// One running battle: exclusive state plus shared read-only context.
#[derive(Debug)]
pub struct Battle {
    state: GameState,
    ctx: Arc<BattleContext>,
}

impl Battle {
    /// Create an empty battle over the given context.
    #[must_use]
    pub fn new(ctx: Arc<BattleContext>) -> Self {
        Self {
            state: GameState::default(),
            ctx,
        }
    }

    /// Resume a battle from a previously captured state.
    #[must_use]
    pub fn from_state(state: GameState, ctx: Arc<BattleContext>) -> Self {
        Self { state, ctx }
    }

    /// Read-only view of the battle state.
    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// The shared context this battle runs over.
    #[must_use]
    pub fn context(&self) -> &BattleContext {
        &self.ctx
    }

    /// Switch between battle and exploration mode.
    pub fn set_mode(&mut self, mode: BattleMode) {
        self.state.mode = mode;
    }

    /// Spawn a player unit from roster data.
    ///
    /// Every referenced skill must exist in the skill book.
    pub fn spawn_player(&mut self, data: &PlayerData) -> Result<UnitId> {
        for skill in &data.skills {
            if !self.ctx.skills.contains(skill) {
                return Err(GameError::UnknownSkill {
                    skill: skill.clone(),
                    unit: data.name.clone(),
                });
            }
        }

        let unit = Unit {
            id: 0, // assigned below
            name: data.name.clone(),
            size: Fixed::from_num(data.size),
            pos: Vec2Fixed::new(Fixed::from_num(data.pos.0), Fixed::from_num(data.pos.1)),
            current_hp: data.current_hp.min(data.max_hp),
            max_hp: data.max_hp,
            stats: data.stats,
            skills: data.skills.clone(),
            kind: UnitKind::Player,
            statuses: Vec::new(),
        };
        Ok(self.insert_unit(unit))
    }

    /// Stamp an enemy out of a template at the given position.
    pub fn spawn_enemy(&mut self, template: &EnemyTemplate, pos: Vec2Fixed) -> Result<UnitId> {
        for skill in &template.skills {
            if !self.ctx.skills.contains(skill) {
                return Err(GameError::UnknownSkill {
                    skill: skill.clone(),
                    unit: template.name.clone(),
                });
            }
        }

        let unit = Unit {
            id: 0,
            name: template.name.clone(),
            size: Fixed::from_num(template.size),
            pos,
            current_hp: template.max_hp,
            max_hp: template.max_hp,
            stats: template.stats,
            skills: template.skills.clone(),
            kind: UnitKind::Enemy {
                ai_type: template.ai_type.clone(),
            },
            statuses: Vec::new(),
        };
        Ok(self.insert_unit(unit))
    }

    fn insert_unit(&mut self, mut unit: Unit) -> UnitId {
        let id = self.state.next_unit_id;
        self.state.next_unit_id += 1;
        unit.id = id;
        tracing::debug!(unit = id, name = %unit.name, "unit spawned");
        self.state.units.insert(id, unit);
        self.state.timeline.insert(
            id,
            TimelinePos::Wait {
                value: self.ctx.config.timeline_wait_frames,
            },
        );
        id
    }

    /// Submit player input answering a pending decision.
    ///
    /// Always returns effects, never errors: a stale id or invalid
    /// action becomes an `InvalidAction` effect with no state change
    /// beyond consuming the decision. A rejected action leaves the unit
    /// at wait zero, so a fresh decision opens on the next frame.
    pub fn submit_decision(&mut self, decision_id: DecisionId, action: &BattleAction) -> Vec<Effect> {
        let Some(unit_id) = take_submission(&mut self.state, decision_id) else {
            tracing::debug!(decision = %decision_id, "stale decision submission");
            return vec![Effect::InvalidAction {
                message: crate::intent::InvalidReason::StaleDecision.to_string(),
            }];
        };

        match crate::intent::resolve(unit_id, action, &self.state, &self.ctx) {
            Ok(resolution) => {
                self.commit(unit_id, decision_id, action.clone(), resolution.intent, resolution.act_frames);
                resolution.effects
            }
            Err(reason) => {
                tracing::debug!(unit = unit_id, %reason, "action rejected");
                vec![Effect::InvalidAction {
                    message: reason.to_string(),
                }]
            }
        }
    }

    fn commit(
        &mut self,
        unit_id: UnitId,
        decision_id: DecisionId,
        action: BattleAction,
        intent: ActionState,
        act_frames: u32,
    ) {
        self.state.intents.insert(unit_id, intent);
        self.state
            .timeline
            .insert(unit_id, TimelinePos::acting(act_frames));
        self.state.inputs.insert(
            unit_id,
            UserInput {
                pending_decision_id: decision_id,
                action,
            },
        );
    }

    /// Process a batch of inputs, then advance one frame.
    ///
    /// This is the single entry point a driving loop needs: call it once
    /// per simulated frame with whatever inputs arrived since the last
    /// call. Effects are returned in emission order, inputs first.
    pub fn step(&mut self, inputs: &[(DecisionId, BattleAction)]) -> Vec<Effect> {
        let mut effects = Vec::new();
        for (decision_id, action) in inputs {
            effects.extend(self.submit_decision(*decision_id, action));
        }
        effects.extend(self.advance_frame());
        effects
    }

    /// Advance the simulation by exactly one frame.
    ///
    /// The frame counter always advances; timeline processing only runs
    /// in battle mode.
    pub fn advance_frame(&mut self) -> Vec<Effect> {
        self.state.frame += 1;
        if self.state.mode != BattleMode::Battle {
            return Vec::new();
        }

        self.tick_statuses();

        let mut effects = Vec::new();
        for unit_id in self.state.sorted_unit_ids() {
            // An earlier actor this frame may have killed this unit.
            let Some(pos) = self.state.timeline.get(&unit_id).copied() else {
                continue;
            };
            match pos {
                TimelinePos::Wait { value } => {
                    // A unit with an open decision is frozen, even if a
                    // setback raised its wait; the countdown resumes
                    // only once the decision resolves.
                    if self.state.pending_decisions.contains_key(&unit_id) {
                        continue;
                    }
                    let value = value.saturating_sub(1);
                    self.state
                        .timeline
                        .insert(unit_id, TimelinePos::Wait { value });
                    if value == 0 {
                        self.open_or_decide(unit_id, &mut effects);
                    }
                }
                TimelinePos::Act { current, target } => {
                    let current = current + 1;
                    if current < target {
                        self.state
                            .timeline
                            .insert(unit_id, TimelinePos::Act { current, target });
                    } else {
                        effects.extend(self.execute_intent(unit_id));
                    }
                }
            }
        }
        if cfg!(debug_assertions) {
            tracing::trace!(frame = self.state.frame, hash = self.state_hash(), "frame advanced");
        }
        effects
    }

    /// A unit's wait matured: open a decision for players, or decide
    /// immediately for enemies.
    fn open_or_decide(&mut self, unit_id: UnitId, effects: &mut Vec<Effect>) {
        if self.state.pending_decisions.contains_key(&unit_id)
            || self.state.intents.contains_key(&unit_id)
        {
            return;
        }
        let Some(unit) = self.state.unit(unit_id) else {
            return;
        };

        match unit.kind {
            UnitKind::Player => {
                open_decision(&mut self.state, unit_id);
            }
            UnitKind::Enemy { .. } => {
                let decision_id = open_decision(&mut self.state, unit_id);
                match ai::decide(unit_id, &self.state, &self.ctx) {
                    Some(action) => {
                        let submitted = self.submit_decision(decision_id, &action);
                        // A rejected AI action falls through to a
                        // passive turn instead of spinning at wait zero.
                        let rejected = submitted
                            .iter()
                            .any(|e| matches!(e, Effect::InvalidAction { .. }));
                        effects.extend(submitted);
                        if rejected {
                            self.commit_passive(unit_id);
                        }
                    }
                    None => {
                        self.state.pending_decisions.remove(&unit_id);
                        self.commit_passive(unit_id);
                    }
                }
            }
        }
    }

    fn commit_passive(&mut self, unit_id: UnitId) {
        let act_frames = self.ctx.config.frames(self.ctx.config.base_cooldown_ms);
        self.state.intents.insert(unit_id, ActionState::Passive);
        self.state
            .timeline
            .insert(unit_id, TimelinePos::acting(act_frames));
    }

    /// Execute a matured intent, fold its effects, and start the
    /// post-action cooldown.
    fn execute_intent(&mut self, unit_id: UnitId) -> Vec<Effect> {
        let Some(intent) = self.state.intents.get(&unit_id).cloned() else {
            // An acting entry without an intent is a scheduler bug.
            debug_assert!(false, "acting unit {unit_id} has no intent");
            self.state.timeline.insert(
                unit_id,
                TimelinePos::Wait {
                    value: self.ctx.config.timeline_wait_frames,
                },
            );
            return Vec::new();
        };

        let effects = executor::execute(unit_id, &intent, &self.state, &self.ctx);
        effect::apply(&mut self.state, &effects);

        // The actor can die to its own blast radius.
        if self.state.units.contains_key(&unit_id) {
            let cooldown = self.cooldown_frames(&intent);
            self.state
                .timeline
                .insert(unit_id, TimelinePos::Wait { value: cooldown });
            self.state.intents.remove(&unit_id);
            self.state.inputs.remove(&unit_id);
        }
        effects
    }

    /// Post-action wait, derived from what was just executed.
    fn cooldown_frames(&self, intent: &ActionState) -> u32 {
        let config = &self.ctx.config;
        match intent {
            ActionState::Passive => config.timeline_wait_frames,
            ActionState::Move { .. } => {
                config.frames(config.base_cooldown_ms + config.movement_startup_ms)
            }
            ActionState::TargetUnit { skill, .. } | ActionState::TargetPoint { skill, .. } => {
                match self.ctx.skills.get(skill) {
                    Some(definition) => config.frames(
                        config.base_cooldown_ms
                            + definition.time.cooldown_ms
                            + definition.time.recharge_ms,
                    ),
                    None => config.frames(config.base_cooldown_ms),
                }
            }
        }
    }

    /// Tick status durations, dropping expired statuses.
    fn tick_statuses(&mut self) {
        for unit_id in self.state.sorted_unit_ids() {
            if let Some(unit) = self.state.unit_mut(unit_id) {
                for status in &mut unit.statuses {
                    status.remaining_frames = status.remaining_frames.saturating_sub(1);
                }
                unit.statuses.retain(|s| s.remaining_frames > 0);
            }
        }
    }

    /// Deterministic hash of the simulation-relevant state, for replay
    /// verification and desync detection.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.state.frame.hash(&mut hasher);
        for unit_id in self.state.sorted_unit_ids() {
            let unit = &self.state.units[&unit_id];
            unit_id.hash(&mut hasher);
            unit.pos.x.to_bits().hash(&mut hasher);
            unit.pos.y.to_bits().hash(&mut hasher);
            unit.current_hp.hash(&mut hasher);
            unit.statuses.hash(&mut hasher);
            match self.state.timeline.get(&unit_id) {
                Some(TimelinePos::Wait { value }) => {
                    0u8.hash(&mut hasher);
                    value.hash(&mut hasher);
                }
                Some(TimelinePos::Act { current, target }) => {
                    1u8.hash(&mut hasher);
                    current.hash(&mut hasher);
                    target.hash(&mut hasher);
                }
                None => 2u8.hash(&mut hasher),
            }
        }
        hasher.finish()
    }

    /// Serialize the battle state for persistence or replay capture.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(&self.state)
            .map_err(|e| GameError::InvalidState(format!("serialize failed: {e}")))
    }

    /// Restore a battle from serialized state and a context.
    pub fn deserialize(bytes: &[u8], ctx: Arc<BattleContext>) -> Result<Self> {
        let state: GameState = bincode::deserialize(bytes)
            .map_err(|e| GameError::InvalidState(format!("deserialize failed: {e}")))?;
        Ok(Self::from_state(state, ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{
        Relation, Skill, SkillBook, SkillEffect, SkillTarget, SkillTime, StatScale,
    };
    use crate::intent::ActionTarget;
    use crate::map::BattleMap;
    use crate::planner::GridPlanner;
    use crate::state::BattleConfig;
    use crate::units::{Stats, StatusEffect, StatusKind};

    fn slash() -> Skill {
        Skill {
            name: "slash".into(),
            range: 64,
            cost: 0,
            time: SkillTime {
                startup_ms: 500,
                cooldown_ms: 500,
                recharge_ms: 0,
            },
            target: SkillTarget::Single {
                valid: Relation::Enemy,
            },
            effects: vec![SkillEffect::Damage {
                amount: 10,
                scale: StatScale::default(),
            }],
        }
    }

    fn shove() -> Skill {
        Skill {
            name: "shove".into(),
            range: 64,
            cost: 0,
            time: SkillTime {
                startup_ms: 500,
                cooldown_ms: 0,
                recharge_ms: 0,
            },
            target: SkillTarget::Radius {
                size: 64,
                affects: crate::data::Affects::Enemy,
            },
            effects: vec![SkillEffect::Setback { amount: 30 }],
        }
    }

    fn test_ctx() -> Arc<BattleContext> {
        let map = BattleMap::new("arena", 16, 16, Fixed::from_num(16));
        Arc::new(BattleContext {
            config: BattleConfig {
                fps: 30,
                timeline_wait_frames: 3,
                movement_startup_ms: 500,
                base_cooldown_ms: 1000,
            },
            skills: SkillBook::new(vec![slash(), shove()]),
            planner: Box::new(GridPlanner::new(map.clone())),
            map,
        })
    }

    fn player(name: &str, pos: (i32, i32)) -> PlayerData {
        PlayerData {
            id: name.to_lowercase(),
            name: name.into(),
            size: 8,
            pos,
            current_hp: 30,
            max_hp: 30,
            stats: Stats {
                movement: 4,
                ..Stats::default()
            },
            skills: vec!["slash".into()],
        }
    }

    fn goblin() -> EnemyTemplate {
        EnemyTemplate {
            type_id: "goblin".into(),
            name: "Goblin".into(),
            size: 8,
            max_hp: 15,
            stats: Stats {
                movement: 3,
                ..Stats::default()
            },
            skills: vec!["slash".into()],
            ai_type: Some("aggressive".into()),
        }
    }

    /// Run frames until the given player has a pending decision.
    fn run_until_decision(battle: &mut Battle, unit: UnitId, max_frames: u32) -> DecisionId {
        for _ in 0..max_frames {
            battle.advance_frame();
            if let Some(pending) = battle.state().pending_decisions.get(&unit) {
                return pending.id;
            }
        }
        panic!("no decision opened for unit {unit} within {max_frames} frames");
    }

    #[test]
    fn test_spawn_rejects_unknown_skill() {
        let mut battle = Battle::new(test_ctx());
        let mut data = player("Ayla", (24, 24));
        data.skills.push("meteor".into());
        assert!(matches!(
            battle.spawn_player(&data),
            Err(GameError::UnknownSkill { .. })
        ));
    }

    #[test]
    fn test_spawned_unit_starts_waiting() {
        let mut battle = Battle::new(test_ctx());
        let id = battle.spawn_player(&player("Ayla", (24, 24))).unwrap();
        assert_eq!(
            battle.state().timeline[&id],
            TimelinePos::Wait { value: 3 }
        );
    }

    #[test]
    fn test_decision_opens_when_wait_matures() {
        let mut battle = Battle::new(test_ctx());
        let id = battle.spawn_player(&player("Ayla", (24, 24))).unwrap();
        battle.advance_frame();
        battle.advance_frame();
        assert!(battle.state().pending_decisions.is_empty());
        battle.advance_frame();
        assert!(battle.state().pending_decisions.contains_key(&id));
    }

    #[test]
    fn test_full_skill_turn_damages_target() {
        let mut battle = Battle::new(test_ctx());
        let attacker = battle.spawn_player(&player("Ayla", (24, 24))).unwrap();
        let victim = battle
            .spawn_enemy(
                &EnemyTemplate {
                    ai_type: None,
                    ..goblin()
                },
                Vec2Fixed::new(Fixed::from_num(40), Fixed::from_num(24)),
            )
            .unwrap();

        let decision = run_until_decision(&mut battle, attacker, 10);
        let action = BattleAction::Skill {
            skill: "slash".into(),
            target: ActionTarget::Unit(victim),
        };
        let effects = battle.submit_decision(decision, &action);
        assert!(matches!(
            effects.as_slice(),
            [Effect::SkillTarget { .. }]
        ));
        // 500ms startup at 30fps = 15 frames.
        assert_eq!(
            battle.state().timeline[&attacker],
            TimelinePos::Act { current: 0, target: 15 }
        );

        let mut hp_changes = Vec::new();
        for _ in 0..15 {
            hp_changes.extend(
                battle
                    .advance_frame()
                    .into_iter()
                    .filter(|e| matches!(e, Effect::HpChange { .. })),
            );
        }
        assert_eq!(
            hp_changes,
            vec![Effect::HpChange {
                actor: attacker,
                target: victim,
                amount: -10
            }]
        );
        assert_eq!(battle.state().unit(victim).unwrap().current_hp, 5);

        // Post-action cooldown: base 1000ms + skill cooldown 500ms = 45 frames.
        assert_eq!(
            battle.state().timeline[&attacker],
            TimelinePos::Wait { value: 45 }
        );
        assert!(!battle.state().intents.contains_key(&attacker));
        assert!(!battle.state().inputs.contains_key(&attacker));
    }

    #[test]
    fn test_stale_submission_is_invalid() {
        let mut battle = Battle::new(test_ctx());
        let id = battle.spawn_player(&player("Ayla", (24, 24))).unwrap();
        let decision = run_until_decision(&mut battle, id, 10);

        let action = BattleAction::Move {
            target: Vec2Fixed::new(Fixed::from_num(40), Fixed::from_num(24)),
        };
        battle.submit_decision(decision, &action);
        // Same id again: the decision was consumed.
        let before = battle.state().clone();
        let effects = battle.submit_decision(decision, &action);
        assert!(matches!(
            effects.as_slice(),
            [Effect::InvalidAction { .. }]
        ));
        assert_eq!(battle.state(), &before);
    }

    #[test]
    fn test_pending_unit_stays_frozen() {
        let mut battle = Battle::new(test_ctx());
        let id = battle.spawn_player(&player("Ayla", (24, 24))).unwrap();
        let decision = run_until_decision(&mut battle, id, 10);

        for _ in 0..10 {
            battle.advance_frame();
        }
        // No decrement below zero, no act entry, same open decision.
        assert_eq!(battle.state().timeline[&id], TimelinePos::Wait { value: 0 });
        assert_eq!(battle.state().pending_decisions[&id].id, decision);
        assert!(!battle.state().intents.contains_key(&id));
    }

    #[test]
    fn test_setback_on_pending_unit_does_not_restart_wait() {
        let mut battle = Battle::new(test_ctx());
        let target = battle.spawn_player(&player("Ayla", (24, 24))).unwrap();
        battle
            .spawn_enemy(
                &EnemyTemplate {
                    skills: vec!["shove".into()],
                    ..goblin()
                },
                Vec2Fixed::new(Fixed::from_num(40), Fixed::from_num(24)),
            )
            .unwrap();

        let decision = run_until_decision(&mut battle, target, 10);

        // Run until the enemy's shove lands on the frozen player.
        let mut landed = false;
        for _ in 0..40 {
            let effects = battle.advance_frame();
            if effects.iter().any(|e| matches!(e, Effect::Setback { .. })) {
                landed = true;
                break;
            }
        }
        assert!(landed, "enemy never shoved");
        assert_eq!(
            battle.state().timeline[&target],
            TimelinePos::Wait { value: 30 }
        );
        assert!(battle.state().pending_decisions.contains_key(&target));

        // The raised wait must not count down while the decision is open.
        battle.advance_frame();
        battle.advance_frame();
        assert_eq!(
            battle.state().timeline[&target],
            TimelinePos::Wait { value: 30 }
        );
        assert_eq!(battle.state().pending_decisions[&target].id, decision);
    }

    #[test]
    fn test_rejected_action_reopens_next_frame() {
        let mut battle = Battle::new(test_ctx());
        let id = battle.spawn_player(&player("Ayla", (24, 24))).unwrap();
        let first = run_until_decision(&mut battle, id, 10);

        let bad = BattleAction::Skill {
            skill: "meteor".into(),
            target: ActionTarget::Unit(id),
        };
        let effects = battle.submit_decision(first, &bad);
        assert!(matches!(
            effects.as_slice(),
            [Effect::InvalidAction { .. }]
        ));
        assert!(battle.state().pending_decisions.is_empty());

        battle.advance_frame();
        let reopened = battle.state().pending_decisions[&id].id;
        assert_ne!(reopened, first);
    }

    #[test]
    fn test_enemy_ai_acts_on_its_own() {
        let mut battle = Battle::new(test_ctx());
        let target = battle.spawn_player(&player("Ayla", (24, 24))).unwrap();
        let enemy = battle
            .spawn_enemy(&goblin(), Vec2Fixed::new(Fixed::from_num(40), Fixed::from_num(24)))
            .unwrap();

        // Run until the enemy's slash lands.
        let mut landed = false;
        for _ in 0..40 {
            for effect in battle.advance_frame() {
                if let Effect::HpChange { actor, target: t, amount } = effect {
                    assert_eq!((actor, t, amount), (enemy, target, -10));
                    landed = true;
                }
            }
            if landed {
                break;
            }
        }
        assert!(landed, "enemy never attacked");
        assert_eq!(battle.state().unit(target).unwrap().current_hp, 20);
    }

    #[test]
    fn test_passive_enemy_cycles_without_acting() {
        let mut battle = Battle::new(test_ctx());
        battle.spawn_player(&player("Ayla", (24, 24))).unwrap();
        let enemy = battle
            .spawn_enemy(
                &EnemyTemplate {
                    ai_type: None,
                    ..goblin()
                },
                Vec2Fixed::new(Fixed::from_num(40), Fixed::from_num(24)),
            )
            .unwrap();

        for _ in 0..20 {
            let effects = battle.advance_frame();
            assert!(effects
                .iter()
                .all(|e| !matches!(e, Effect::HpChange { .. })));
        }
        // The enemy is back on a wait cycle, not stuck at zero.
        assert!(battle.state().timeline.contains_key(&enemy));
        assert!(!battle.state().pending_decisions.contains_key(&enemy));
    }

    #[test]
    fn test_explore_mode_freezes_timeline() {
        let mut battle = Battle::new(test_ctx());
        let id = battle.spawn_player(&player("Ayla", (24, 24))).unwrap();
        battle.set_mode(BattleMode::Explore);

        for _ in 0..10 {
            assert!(battle.advance_frame().is_empty());
        }
        assert_eq!(battle.state().frame, 10);
        assert_eq!(
            battle.state().timeline[&id],
            TimelinePos::Wait { value: 3 }
        );
    }

    #[test]
    fn test_step_processes_inputs_then_advances() {
        let mut battle = Battle::new(test_ctx());
        let id = battle.spawn_player(&player("Ayla", (24, 24))).unwrap();
        let decision = run_until_decision(&mut battle, id, 10);
        let frame_before = battle.state().frame;

        let action = BattleAction::Move {
            target: Vec2Fixed::new(Fixed::from_num(40), Fixed::from_num(24)),
        };
        battle.step(&[(decision, action)]);
        assert_eq!(battle.state().frame, frame_before + 1);
        assert!(matches!(
            battle.state().timeline[&id],
            TimelinePos::Act { .. }
        ));
    }

    #[test]
    fn test_identical_runs_hash_identically() {
        let setup = || {
            let mut battle = Battle::new(test_ctx());
            battle.spawn_player(&player("Ayla", (24, 24))).unwrap();
            battle
                .spawn_enemy(&goblin(), Vec2Fixed::new(Fixed::from_num(60), Fixed::from_num(24)))
                .unwrap();
            battle
        };
        let result = battle_test_utils::determinism::verify_determinism(
            3,
            60,
            setup,
            |battle| {
                battle.advance_frame();
            },
            Battle::state_hash,
        );
        result.assert_deterministic();
    }

    #[test]
    fn test_state_hash_covers_status_fields() {
        let ctx = test_ctx();
        let mut battle = Battle::new(ctx.clone());
        let id = battle.spawn_player(&player("Ayla", (24, 24))).unwrap();
        let plain_hash = battle.state_hash();

        let mut blinded_state = battle.state().clone();
        if let Some(unit) = blinded_state.unit_mut(id) {
            unit.statuses.push(StatusEffect {
                kind: StatusKind::Blind { severity: 1 },
                remaining_frames: 10,
            });
        }
        let blinded = Battle::from_state(blinded_state.clone(), ctx.clone());
        assert_ne!(blinded.state_hash(), plain_hash);

        // Same status count, different remaining duration.
        let mut expiring_state = blinded_state;
        if let Some(unit) = expiring_state.unit_mut(id) {
            unit.statuses[0].remaining_frames = 5;
        }
        let expiring = Battle::from_state(expiring_state, ctx);
        assert_ne!(expiring.state_hash(), blinded.state_hash());
    }

    #[test]
    fn test_serialize_round_trip() {
        let ctx = test_ctx();
        let mut battle = Battle::new(ctx.clone());
        battle.spawn_player(&player("Ayla", (24, 24))).unwrap();
        battle
            .spawn_enemy(&goblin(), Vec2Fixed::new(Fixed::from_num(60), Fixed::from_num(24)))
            .unwrap();
        for _ in 0..10 {
            battle.advance_frame();
        }

        let bytes = battle.serialize().unwrap();
        let restored = Battle::deserialize(&bytes, ctx).unwrap();
        assert_eq!(restored.state(), battle.state());
        assert_eq!(restored.state_hash(), battle.state_hash());
    }
}
