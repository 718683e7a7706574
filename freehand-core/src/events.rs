//! Gesture Events and Listener Dispatch
//!
//! ## Overview
//!
//! The runtime reports everything it does through six event kinds, delivered
//! synchronously from inside [`GestureRuntime::update`](crate::GestureRuntime::update),
//! [`give_cue`](crate::GestureRuntime::give_cue) and
//! [`stop_current_gesture`](crate::GestureRuntime::stop_current_gesture).
//!
//! ## Lifecycle
//!
//! ```text
//!            Recognized
//!                │
//!        ┌───────┴────────┐
//!   dwell > 0         dwell == 0
//!        │                │
//!    Dwelling* ───► Start ◄┘
//!        │           │
//!    Released     Holding* ──► StageTransition ──► Recognized (next stage)
//!                    │                │
//!                 Released        Released (no valid target)
//! ```
//!
//! `*` repeats once per update.
//!
//! ## Listener Sets
//!
//! Every event goes to two independent sets of listeners:
//!
//! - **Global**: registered on the runtime, notified for every gesture and stage
//! - **Stage-local**: registered for one `(gesture, stage)` pair
//!
//! Global listeners run first, then stage-local ones, each set in
//! registration order. Listeners receive the event by reference and cannot
//! reach back into the runtime.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use crate::constants::UNTRACKED_HAND_DISTANCE;
use crate::gesture::Gesture;
use crate::math::Vector3;
use crate::path::Path;
use crate::pose::{Hand, Hands};
use crate::time::Timestamp;

/// Kind of lifecycle event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum GestureEventKind {
    /// A stage's pose was recognized
    Recognized = 0,
    /// Recognized stage is waiting out its dwell time
    Dwelling = 1,
    /// Dwell time is over; the stage is now being performed
    Start = 2,
    /// Stage is still being performed
    Holding = 3,
    /// A transition rule fired on this stage
    StageTransition = 4,
    /// Gesture ended
    Released = 5,
}

impl GestureEventKind {
    /// All kinds in lifecycle order
    pub const ALL: [GestureEventKind; 6] = [
        GestureEventKind::Recognized,
        GestureEventKind::Dwelling,
        GestureEventKind::Start,
        GestureEventKind::Holding,
        GestureEventKind::StageTransition,
        GestureEventKind::Released,
    ];

    /// Lowercase name for logs
    pub const fn name(&self) -> &'static str {
        match self {
            GestureEventKind::Recognized => "recognized",
            GestureEventKind::Dwelling => "dwelling",
            GestureEventKind::Start => "start",
            GestureEventKind::Holding => "holding",
            GestureEventKind::StageTransition => "stage_transition",
            GestureEventKind::Released => "released",
        }
    }
}

/// Snapshot of a gesture at the moment an event fired
#[derive(Debug, Clone, PartialEq)]
pub struct GestureEvent {
    /// What happened
    pub kind: GestureEventKind,
    /// Index of the gesture in the runtime
    pub gesture_index: usize,
    /// Stage the event belongs to
    pub stage_index: usize,
    /// Gesture name
    pub gesture_name: String,
    /// Dwell time of the stage
    pub dwell_time_ms: u64,
    /// Milliseconds since the stage was recognized
    pub millis_since_stage: u64,
    /// Milliseconds since the gesture was recognized
    pub millis_since_gesture: u64,
    /// Left working point, `None` if untracked
    pub left_position: Option<Vector3>,
    /// Right working point, `None` if untracked
    pub right_position: Option<Vector3>,
    /// Distance between the working points, `f32::MAX` unless both are tracked
    pub hand_distance: f32,
    /// Path recorded so far
    pub path: Path,
}

impl GestureEvent {
    pub(crate) fn capture(
        kind: GestureEventKind,
        gesture_index: usize,
        stage_index: usize,
        gesture: &Gesture,
        hands: &Hands,
        now: Timestamp,
    ) -> Self {
        let stage = gesture.stages.get(stage_index);
        let left_position = stage.and_then(|s| s.hand_position(hands, Hand::Left));
        let right_position = stage.and_then(|s| s.hand_position(hands, Hand::Right));
        let hand_distance = match (left_position, right_position) {
            (Some(l), Some(r)) => l.distance(r),
            _ => UNTRACKED_HAND_DISTANCE,
        };
        let millis_since_stage = stage
            .and_then(|s| s.recognition_time())
            .map_or(0, |t| crate::time::delta_ms(t, now));

        Self {
            kind,
            gesture_index,
            stage_index,
            gesture_name: gesture.name.clone(),
            dwell_time_ms: stage.map_or(0, |s| s.dwell_time_ms()),
            millis_since_stage,
            millis_since_gesture: gesture.millis_since_gesture_recognized(now),
            left_position,
            right_position,
            hand_distance,
            path: gesture.path().clone(),
        }
    }

    /// Position of one hand's working point
    pub fn position(&self, hand: Hand) -> Option<Vector3> {
        match hand {
            Hand::Left => self.left_position,
            Hand::Right => self.right_position,
        }
    }

    /// True if both working points are known
    pub fn both_hands_tracked(&self) -> bool {
        self.left_position.is_some() && self.right_position.is_some()
    }
}

/// Callback invoked for matching events
pub type Listener = Box<dyn FnMut(&GestureEvent)>;

/// Handle returned on registration, used for removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

struct Registration {
    id: ListenerId,
    kind: GestureEventKind,
    scope: Option<(usize, usize)>,
    callback: Listener,
}

/// Global and stage-local listener lists
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    next_id: u64,
    global: Vec<Registration>,
    local: Vec<Registration>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn add_global(&mut self, kind: GestureEventKind, callback: Listener) -> ListenerId {
        let id = self.next_id();
        self.global.push(Registration {
            id,
            kind,
            scope: None,
            callback,
        });
        id
    }

    pub fn add_local(
        &mut self,
        gesture: usize,
        stage: usize,
        kind: GestureEventKind,
        callback: Listener,
    ) -> ListenerId {
        let id = self.next_id();
        self.local.push(Registration {
            id,
            kind,
            scope: Some((gesture, stage)),
            callback,
        });
        id
    }

    /// Remove from either set; false if the id is unknown
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.global.len() + self.local.len();
        self.global.retain(|r| r.id != id);
        self.local.retain(|r| r.id != id);
        before != self.global.len() + self.local.len()
    }

    pub fn clear_local(&mut self) {
        self.local.clear();
    }

    pub fn len(&self) -> usize {
        self.global.len() + self.local.len()
    }

    pub fn dispatch(&mut self, event: &GestureEvent) {
        let scope = Some((event.gesture_index, event.stage_index));

        for registration in self.global.iter_mut().filter(|r| r.kind == event.kind) {
            (registration.callback)(event);
        }
        for registration in self
            .local
            .iter_mut()
            .filter(|r| r.kind == event.kind && r.scope == scope)
        {
            (registration.callback)(event);
        }
    }
}

impl core::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("global", &self.global.len())
            .field("local", &self.local.len())
            .finish()
    }
}
