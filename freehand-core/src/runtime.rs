//! Gesture Runtime State Machine
//!
//! ## Overview
//!
//! [`GestureRuntime`] owns the gesture list, the selected skeleton, the
//! listeners and a clock. The host calls [`GestureRuntime::update`] once per
//! frame with the current hands; everything else happens inside that call.
//!
//! ## States
//!
//! ```text
//!  Idle ──(stage 0 ≥ recognition)──► Dwelling ──(dwell elapsed)──► Holding
//!   ▲                                   │                            │
//!   └──────(confidence ≤ release)───────┘                            │
//!   ▲                                                                │
//!   └──────────(rule with no valid target)───── transition rules ◄───┘
//!                                                     │
//!                                    next stage: Dwelling or Holding
//! ```
//!
//! - **Idle**: score stage 0 of every gesture. The highest score that also
//!   meets its own recognition threshold wins; ties keep the earlier gesture.
//! - **Dwelling**: the stage must stay above its release threshold until the
//!   dwell time has passed, or the gesture is released.
//! - **Holding**: armed rules are checked in priority order
//!   Start, NextPoseRecognized, Release. The first that holds fires. If none
//!   does, a path sample is offered and Holding is reported.
//!
//! The update that crosses the dwell boundary fires Start and snapshots the
//! working points for every stage the current one can lead to. Rules are
//! first checked on the following update.
//!
//! ## Invariants
//!
//! - At most one gesture is active. A new one can only be recognized after
//!   the active one is released or stopped.
//! - Path samples are never taken before the stage's dwell time.
//! - A transition to a stage index outside the gesture ends the gesture.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::errors::{GestureError, GestureResult};
use crate::events::{GestureEvent, GestureEventKind, ListenerId, ListenerRegistry};
use crate::gesture::Gesture;
use crate::math::{BasisCache, Vector3};
use crate::pose::{Hand, Hands};
use crate::skeleton::{Platform, SkeletonModel};
use crate::stage::{RecognizedHand, StageTarget, TransitionCondition};
use crate::time::{delta_ms, TimeSource, Timestamp};

/// Per-platform gesture recognizer
pub struct GestureRuntime {
    platform: Platform,
    skeleton: SkeletonModel,
    gestures: Vec<Gesture>,
    active: bool,
    active_gesture: Option<usize>,
    last_update: Option<Timestamp>,
    basis: BasisCache,
    listeners: ListenerRegistry,
    clock: Box<dyn TimeSource>,
}

impl GestureRuntime {
    /// Runtime bound to a platform, reading time from `clock`
    ///
    /// `custom` is only consulted for [`Platform::Custom`], which fails
    /// without it. The runtime starts inactive.
    pub fn new(
        platform: Platform,
        custom: Option<SkeletonModel>,
        clock: Box<dyn TimeSource>,
    ) -> GestureResult<Self> {
        let skeleton = platform.skeleton(custom)?;
        log_debug!(
            "gesture runtime bound to {} ({} bones), {} clock at {}ms",
            platform.name(),
            skeleton.bone_count(),
            if clock.is_wall_clock() { "wall" } else { "host" },
            clock.precision_ms()
        );

        Ok(Self {
            platform,
            skeleton,
            gestures: Vec::new(),
            active: false,
            active_gesture: None,
            last_update: None,
            basis: BasisCache::new(),
            listeners: ListenerRegistry::new(),
            clock,
        })
    }

    /// Runtime reading the system clock
    #[cfg(feature = "std")]
    pub fn with_system_clock(platform: Platform, custom: Option<SkeletonModel>) -> GestureResult<Self> {
        Self::new(platform, custom, Box::new(crate::time::SystemTime))
    }

    /// Rebind to another platform
    ///
    /// On success every gesture, every stage-local listener and all state is
    /// dropped and the runtime is inactive; global listeners stay. On error
    /// nothing changes.
    pub fn set_platform(&mut self, platform: Platform, custom: Option<SkeletonModel>) -> GestureResult<()> {
        let skeleton = platform.skeleton(custom)?;
        log_debug!(
            "gesture runtime rebound from {} to {} ({} bones)",
            self.platform.name(),
            platform.name(),
            skeleton.bone_count()
        );

        self.platform = platform;
        self.skeleton = skeleton;
        self.gestures.clear();
        self.active = false;
        self.active_gesture = None;
        self.last_update = None;
        self.basis = BasisCache::new();
        self.listeners.clear_local();
        Ok(())
    }

    /// Selected platform
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Skeleton every pose must follow
    pub fn skeleton(&self) -> &SkeletonModel {
        &self.skeleton
    }

    /// Clock the runtime reads
    pub fn clock(&self) -> &dyn TimeSource {
        self.clock.as_ref()
    }

    /// Turn processing on or off; turning it off stops the active gesture
    pub fn set_active(&mut self, active: bool) {
        if !active {
            self.stop_current_gesture();
        }
        if self.active != active {
            log_debug!("gesture runtime {}", if active { "activated" } else { "deactivated" });
        }
        self.active = active;
    }

    /// True if updates are processed
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Append a gesture; returns its index
    pub fn add_gesture(&mut self, gesture: Gesture) -> usize {
        log_debug!("gesture '{}' added with {} stages", gesture.name, gesture.stage_count());
        self.gestures.push(gesture);
        self.gestures.len() - 1
    }

    /// All gestures in recognition priority order
    pub fn gestures(&self) -> &[Gesture] {
        &self.gestures
    }

    /// Gesture by index
    pub fn gesture(&self, index: usize) -> Option<&Gesture> {
        self.gestures.get(index)
    }

    /// Mutable gesture by index
    pub fn gesture_mut(&mut self, index: usize) -> Option<&mut Gesture> {
        self.gestures.get_mut(index)
    }

    /// First gesture with the given name
    pub fn gesture_by_name(&self, name: &str) -> Option<&Gesture> {
        self.gestures.iter().find(|g| g.name == name)
    }

    /// Index of the first gesture with the given name
    pub fn gesture_index(&self, name: &str) -> Option<usize> {
        self.gestures.iter().position(|g| g.name == name)
    }

    /// Index of the active gesture
    pub fn active_gesture_index(&self) -> Option<usize> {
        self.active_gesture
    }

    /// Active gesture
    pub fn active_gesture(&self) -> Option<&Gesture> {
        self.active_gesture.and_then(|i| self.gestures.get(i))
    }

    /// Current stage of the active gesture
    pub fn active_stage_index(&self) -> Option<usize> {
        self.active_gesture().and_then(Gesture::current_stage)
    }

    /// Time of the last processed update
    pub fn last_update(&self) -> Option<Timestamp> {
        self.last_update
    }

    /// Listen for one kind of event on every gesture and stage
    pub fn add_listener<F>(&mut self, kind: GestureEventKind, listener: F) -> ListenerId
    where
        F: FnMut(&GestureEvent) + 'static,
    {
        self.listeners.add_global(kind, Box::new(listener))
    }

    /// Listen for one kind of event on one stage
    pub fn add_stage_listener<F>(
        &mut self,
        gesture: usize,
        stage: usize,
        kind: GestureEventKind,
        listener: F,
    ) -> GestureResult<ListenerId>
    where
        F: FnMut(&GestureEvent) + 'static,
    {
        let target = self
            .gestures
            .get(gesture)
            .ok_or(GestureError::GestureIndexOutOfRange {
                index: gesture,
                count: self.gestures.len(),
            })?;
        if stage >= target.stage_count() {
            return Err(GestureError::StageIndexOutOfRange {
                index: stage,
                count: target.stage_count(),
            });
        }

        Ok(self.listeners.add_local(gesture, stage, kind, Box::new(listener)))
    }

    /// Remove a global or stage-local listener; false if unknown
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Number of registered listeners, global and stage-local
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Process one frame of tracking data
    ///
    /// Does nothing while inactive or without gestures.
    pub fn update(&mut self, hands: &Hands, look: Option<Vector3>) {
        if !self.active || self.gestures.is_empty() {
            return;
        }

        let now = self.clock.now();
        let previous = self.last_update.replace(now);

        match self.active_gesture {
            None => self.recognize(hands, look, now),
            Some(index) => self.advance(index, hands, look, now, previous),
        }
    }

    /// Fire the active stage's Cue rule; returns whether a transition ran
    pub fn give_cue(&mut self, hands: &Hands, look: Option<Vector3>) -> bool {
        let Some(index) = self.active_gesture else {
            return false;
        };
        let target = self
            .gestures
            .get(index)
            .and_then(Gesture::active_stage)
            .and_then(|stage| stage.transition(TransitionCondition::Cue));

        match target {
            Some(target) => {
                let now = self.clock.now();
                log_debug!("cue on gesture {}", index);
                self.transition(index, target, hands, look, now);
                true
            }
            None => false,
        }
    }

    /// Release the active gesture, if any
    ///
    /// The Released event carries no hand positions.
    pub fn stop_current_gesture(&mut self) {
        if self.active_gesture.is_some() {
            let now = self.clock.now();
            log_debug!("forced stop");
            self.stop(&Hands::none(), now);
        }
    }

    fn recognize(&mut self, hands: &Hands, look: Option<Vector3>, now: Timestamp) {
        let mut best: Option<(usize, RecognizedHand)> = None;
        let mut best_score = 0.0;

        for (index, gesture) in self.gestures.iter().enumerate() {
            let Some(stage) = gesture.stages.first() else {
                continue;
            };
            let confidence = stage.confidence(hands, look, &mut self.basis);
            if confidence.score >= stage.recognition_confidence() && confidence.score > best_score {
                best_score = confidence.score;
                best = Some((index, confidence.recognized_hand));
            }
        }

        if let Some((index, recognized)) = best {
            self.activate(index, recognized, hands, now);
        }
    }

    fn activate(&mut self, index: usize, recognized: RecognizedHand, hands: &Hands, now: Timestamp) {
        let Some(gesture) = self.gestures.get_mut(index) else {
            return;
        };
        gesture.begin(now);
        let dwell = match gesture.stages.first_mut() {
            Some(stage) => {
                stage.adopt_recognized_hand(recognized);
                stage.dwell_time_ms()
            }
            None => return,
        };
        log_debug!("gesture '{}' recognized", gesture.name);
        self.active_gesture = Some(index);

        self.emit(GestureEventKind::Recognized, index, hands, now);
        if dwell == 0 {
            self.start_stage(index, hands, now);
        }
    }

    fn advance(
        &mut self,
        index: usize,
        hands: &Hands,
        look: Option<Vector3>,
        now: Timestamp,
        previous: Option<Timestamp>,
    ) {
        let Some(stage) = self.gestures.get(index).and_then(Gesture::active_stage) else {
            self.stop(hands, now);
            return;
        };

        let dwell = stage.dwell_time_ms();
        let recognized_at = stage.recognition_time().unwrap_or(now);
        let elapsed = delta_ms(recognized_at, now);

        if dwell > 0 && elapsed < dwell {
            let confidence = stage.confidence(hands, look, &mut self.basis);
            if confidence.score <= stage.release_confidence() {
                log_debug!("released during dwell at {:.3}", confidence.score);
                self.stop(hands, now);
            } else {
                log_trace!("dwelling {}/{}ms", elapsed, dwell);
                self.emit(GestureEventKind::Dwelling, index, hands, now);
            }
            return;
        }

        let previous_elapsed = previous.map_or(0, |t| delta_ms(recognized_at, t));
        if dwell > 0 && previous_elapsed < dwell {
            self.start_stage(index, hands, now);
            return;
        }

        match self.holding_rule(index, hands, look, elapsed) {
            Some(target) => self.transition(index, target, hands, look, now),
            None => {
                self.record_path(index, hands, now);
                log_trace!("holding for {}ms", elapsed);
                self.emit(GestureEventKind::Holding, index, hands, now);
            }
        }
    }

    fn holding_rule(
        &mut self,
        index: usize,
        hands: &Hands,
        look: Option<Vector3>,
        elapsed: u64,
    ) -> Option<StageTarget> {
        let gesture = self.gestures.get(index)?;
        let stage = gesture.active_stage()?;

        if let Some(target) = stage.transition(TransitionCondition::Start) {
            return Some(target);
        }

        if let Some(StageTarget::Stage(next)) = stage.transition(TransitionCondition::NextPoseRecognized) {
            if next >= 1 {
                if let Some(next_stage) = gesture.stages.get(next) {
                    let confidence = next_stage.confidence(hands, look, &mut self.basis);
                    if confidence.score >= next_stage.recognition_confidence() {
                        return Some(StageTarget::Stage(next));
                    }
                }
            }
        }

        if let Some(target) = stage.transition(TransitionCondition::Release) {
            let eligible_after = stage
                .dwell_time_ms()
                .saturating_add(stage.release_waiting_time_ms());
            if elapsed >= eligible_after {
                let confidence = stage.confidence(hands, look, &mut self.basis);
                if confidence.score <= stage.release_confidence() {
                    return Some(target);
                }
            }
        }

        None
    }

    fn transition(
        &mut self,
        index: usize,
        target: StageTarget,
        hands: &Hands,
        look: Option<Vector3>,
        now: Timestamp,
    ) {
        self.emit(GestureEventKind::StageTransition, index, hands, now);

        let stage_count = self.gestures.get(index).map_or(0, Gesture::stage_count);
        let next = match target {
            StageTarget::Stage(next) if next < stage_count => next,
            _ => {
                log_debug!("transition to {:?} ends the gesture", target);
                self.stop(hands, now);
                return;
            }
        };

        let Some(gesture) = self.gestures.get_mut(index) else {
            return;
        };
        let recognized = gesture.stages[next].confidence(hands, look, &mut self.basis).recognized_hand;
        gesture.enter_stage(next, now);
        let stage = &mut gesture.stages[next];
        stage.adopt_recognized_hand(recognized);
        let dwell = stage.dwell_time_ms();
        log_debug!("gesture '{}' moved to stage {}", gesture.name, next);

        self.emit(GestureEventKind::Recognized, index, hands, now);
        if dwell == 0 {
            self.start_stage(index, hands, now);
        }
    }

    fn start_stage(&mut self, index: usize, hands: &Hands, now: Timestamp) {
        let Some(gesture) = self.gestures.get_mut(index) else {
            return;
        };
        let Some(current) = gesture.active_stage() else {
            return;
        };

        let left = current.hand_position(hands, Hand::Left);
        let right = current.hand_position(hands, Hand::Right);
        let targets = TransitionCondition::ALL.map(|condition| current.transition(condition));

        for target in targets.into_iter().flatten() {
            if let StageTarget::Stage(next) = target {
                if let Some(stage) = gesture.stages.get_mut(next) {
                    stage.set_start_positions(left, right);
                }
            }
        }

        log_debug!("gesture '{}' stage started", gesture.name);
        self.record_path(index, hands, now);
        self.emit(GestureEventKind::Start, index, hands, now);
    }

    fn record_path(&mut self, index: usize, hands: &Hands, now: Timestamp) {
        let Some(gesture) = self.gestures.get_mut(index) else {
            return;
        };

        let elapsed = gesture.millis_since_stage_recognized(now);
        let point = match gesture.active_stage() {
            Some(stage) if stage.record_path && elapsed >= stage.dwell_time_ms() => {
                stage.manipulation_position(hands)
            }
            _ => None,
        };

        if let Some(point) = point {
            gesture.path_mut().add_node(point, now);
        }
    }

    fn stop(&mut self, hands: &Hands, now: Timestamp) {
        let Some(index) = self.active_gesture.take() else {
            return;
        };
        let Some(gesture) = self.gestures.get_mut(index) else {
            return;
        };

        let event = match gesture.current_stage() {
            Some(stage) => Some(GestureEvent::capture(
                GestureEventKind::Released,
                index,
                stage,
                gesture,
                hands,
                now,
            )),
            None => None,
        };
        log_debug!("gesture '{}' released", gesture.name);
        gesture.finish();

        if let Some(event) = event {
            self.listeners.dispatch(&event);
        }
    }

    fn emit(&mut self, kind: GestureEventKind, index: usize, hands: &Hands, now: Timestamp) {
        let Some(gesture) = self.gestures.get(index) else {
            return;
        };
        let Some(stage) = gesture.current_stage() else {
            return;
        };

        let event = GestureEvent::capture(kind, index, stage, gesture, hands, now);
        self.listeners.dispatch(&event);
    }
}

impl core::fmt::Debug for GestureRuntime {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GestureRuntime")
            .field("platform", &self.platform)
            .field("gestures", &self.gestures.len())
            .field("active", &self.active)
            .field("active_gesture", &self.active_gesture)
            .field("last_update", &self.last_update)
            .field("wall_clock", &self.clock.is_wall_clock())
            .field("clock_precision_ms", &self.clock.precision_ms())
            .field("listeners", &self.listeners)
            .finish()
    }
}
