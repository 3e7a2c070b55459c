use std::time::Duration;

use egui::{PointerButton, Pos2, Rect};

use crate::debug::DebugEventLog;
use crate::model::{FolderId, MoveRequest};

use super::clock::{Clock, SystemClock};
use super::move_command::{DropTarget, build_move_request};
use super::options::DragOptions;
use super::zone::{DropZone, classify};

/// A folder row found under the pointer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeHit {
    pub target: DropTarget,
    pub rect: Rect,
    pub has_children: bool,
    pub expanded: bool,
}

/// Maps a pointer position to the folder row under it.
pub trait HitTest {
    fn hit(&self, pointer: Pos2) -> Option<NodeHit>;
}

impl<F> HitTest for F
where
    F: Fn(Pos2) -> Option<NodeHit>,
{
    fn hit(&self, pointer: Pos2) -> Option<NodeHit> {
        self(pointer)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DragPhase {
    #[default]
    Idle,

    /// Pressed on a folder, waiting for the distance or hold threshold.
    PendingActivation,

    /// Dragging: the ghost is shown and drop zones are tracked.
    Active,

    /// Released; waiting out the click grace period.
    Finalizing,
}

/// Observable drag bookkeeping.
///
/// `is_dragging` is only set while [`DragPhase::Active`]; `drop_type` is only set while
/// `hovered_id` is.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DragState {
    pub dragged_id: Option<FolderId>,
    pub start_pointer: Pos2,
    pub current_pointer: Pos2,
    pub is_dragging: bool,
    pub has_dragged: bool,
    pub hovered_id: Option<FolderId>,
    pub drop_type: Option<DropZone>,
}

/// Something the owner of the session has to react to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragEvent {
    Activated { folder: FolderId },

    /// The pointer rested on the middle band of a collapsed folder long enough to open it.
    AutoExpand { folder: FolderId },

    Dropped(MoveRequest),

    /// The click grace period is over and the session is idle again.
    Settled,
}

#[derive(Clone, Copy, Debug)]
struct AutoExpandTimer {
    folder: FolderId,
    deadline: Duration,
}

/// Owns one pointer-driven drag lifecycle at a time:
/// `Idle → PendingActivation → Active → Finalizing → Idle`.
///
/// The session never reads input by itself. The owner feeds it pointer events and calls
/// [`Self::tick`] once per frame; all timers are deadlines on the injected [`Clock`].
#[derive(Debug)]
pub struct DragSession<C: Clock = SystemClock> {
    options: DragOptions,
    clock: C,
    phase: DragPhase,
    state: DragState,
    label: String,

    activation_deadline: Option<Duration>,
    auto_expand: Option<AutoExpandTimer>,
    auto_expanded: Option<FolderId>,
    grace_deadline: Option<Duration>,

    listeners_attached: bool,
    next_id: u64,
    session_id: u64,
    debug_log: DebugEventLog,
}

impl Default for DragSession<SystemClock> {
    fn default() -> Self {
        Self::new(DragOptions::default(), SystemClock::default())
    }
}

impl<C: Clock> DragSession<C> {
    pub fn new(options: DragOptions, clock: C) -> Self {
        let debug_log = DebugEventLog::new("egui_folder_tree::drag", options.debug_event_log_capacity);
        Self {
            options,
            clock,
            phase: DragPhase::Idle,
            state: DragState::default(),
            label: String::new(),
            activation_deadline: None,
            auto_expand: None,
            auto_expanded: None,
            grace_deadline: None,
            listeners_attached: false,
            next_id: 1,
            session_id: 0,
            debug_log,
        }
    }

    pub fn options(&self) -> &DragOptions {
        &self.options
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn debug_log(&self) -> &DebugEventLog {
        &self.debug_log
    }

    /// True between press and finalize/cancel: the owner should read global pointer input
    /// only while this holds.
    pub fn listeners_attached(&self) -> bool {
        self.listeners_attached
    }

    pub fn is_dragging(&self) -> bool {
        self.state.is_dragging
    }

    /// Hovered folder and its drop zone, for painting the insert line.
    pub fn drop_indicator(&self) -> Option<(FolderId, DropZone)> {
        Some((self.state.hovered_id?, self.state.drop_type?))
    }

    /// Where to draw the floating label while a drag is active.
    pub fn ghost(&self) -> Option<(Pos2, &str)> {
        (self.phase == DragPhase::Active)
            .then(|| (self.state.current_pointer + self.options.ghost_offset, self.label.as_str()))
    }

    /// Time until the earliest outstanding timer fires, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        let now = self.clock.now();
        [
            self.activation_deadline,
            self.auto_expand.map(|t| t.deadline),
            self.grace_deadline,
        ]
        .into_iter()
        .flatten()
        .min()
        .map(|deadline| deadline.saturating_sub(now))
    }

    /// Primary-button press on a folder row. Returns `true` if a new session started.
    pub fn pointer_down(
        &mut self,
        folder: FolderId,
        label: impl Into<String>,
        pointer: Pos2,
        button: PointerButton,
    ) -> bool {
        if button != PointerButton::Primary {
            return false;
        }
        match self.phase {
            DragPhase::PendingActivation | DragPhase::Active => return false,
            DragPhase::Finalizing => self.settle(),
            DragPhase::Idle => {}
        }

        let id = self.next_id;
        self.next_id = id.saturating_add(1);
        self.session_id = id;

        self.phase = DragPhase::PendingActivation;
        self.state = DragState {
            dragged_id: Some(folder),
            start_pointer: pointer,
            current_pointer: pointer,
            ..Default::default()
        };
        self.label = label.into();
        self.activation_deadline = Some(self.clock.now() + self.options.activation_delay());
        self.listeners_attached = true;

        self.debug_log.push(format!(
            "session {id} PENDING folder={folder} at=({:.1},{:.1})",
            pointer.x, pointer.y
        ));
        true
    }

    /// Pointer moved anywhere while listeners are attached.
    pub fn pointer_move(&mut self, pointer: Pos2, hits: &impl HitTest) -> Option<DragEvent> {
        match self.phase {
            DragPhase::Idle | DragPhase::Finalizing => None,
            DragPhase::PendingActivation => {
                self.state.current_pointer = pointer;
                let distance = self.state.start_pointer.distance(pointer);
                let timed_out = self
                    .activation_deadline
                    .is_some_and(|deadline| self.clock.now() >= deadline);
                if !self.options.distance_activates(distance) && !timed_out {
                    return None;
                }

                let reason = if timed_out { "hold" } else { "distance" };
                let event = self.activate(reason);
                self.update_hover(pointer, hits);
                event
            }
            DragPhase::Active => {
                self.state.current_pointer = pointer;
                self.update_hover(pointer, hits);
                self.poll_auto_expand(self.clock.now())
            }
        }
    }

    /// Advance timers. Call once per frame, even when the pointer is still.
    pub fn tick(&mut self) -> Option<DragEvent> {
        let now = self.clock.now();
        match self.phase {
            DragPhase::Idle => None,
            DragPhase::PendingActivation => {
                let deadline = self.activation_deadline?;
                (now >= deadline).then(|| self.activate("hold")).flatten()
            }
            DragPhase::Active => self.poll_auto_expand(now),
            DragPhase::Finalizing => {
                let deadline = self.grace_deadline?;
                if now < deadline {
                    return None;
                }
                self.settle();
                Some(DragEvent::Settled)
            }
        }
    }

    /// Pointer released. Yields [`DragEvent::Dropped`] when an active drag ends over another
    /// folder.
    pub fn pointer_up(&mut self, pointer: Pos2, hits: &impl HitTest) -> Option<DragEvent> {
        match self.phase {
            DragPhase::Idle | DragPhase::Finalizing => None,
            DragPhase::PendingActivation => {
                // Never activated: a plain click, nothing to suppress.
                self.debug_log
                    .push(format!("session {} CLICK (not activated)", self.session_id));
                self.reset();
                None
            }
            DragPhase::Active => {
                self.state.current_pointer = pointer;
                let request = self.state.dragged_id.and_then(|dragged| {
                    let hit = hits.hit(pointer)?;
                    build_move_request(dragged, hit.target, classify(pointer, hit.rect))
                });

                self.clear_timers();
                self.listeners_attached = false;
                self.phase = DragPhase::Finalizing;
                self.state.is_dragging = false;
                self.state.hovered_id = None;
                self.state.drop_type = None;
                self.grace_deadline = Some(self.clock.now() + self.options.click_grace());

                match request {
                    Some(request) => {
                        self.debug_log.push(format!(
                            "session {} DROP folder={} parent={:?} order_index={}",
                            self.session_id,
                            request.folder_id(),
                            request.target_parent_id(),
                            request.order_index()
                        ));
                        Some(DragEvent::Dropped(request))
                    }
                    None => {
                        self.debug_log
                            .push(format!("session {} RELEASE without target", self.session_id));
                        None
                    }
                }
            }
        }
    }

    /// Abort the current session (Escape, widget teardown). Returns `true` if one was running.
    pub fn cancel(&mut self) -> bool {
        if self.phase == DragPhase::Idle {
            return false;
        }
        self.debug_log
            .push(format!("session {} CANCEL phase={:?}", self.session_id, self.phase));
        self.reset();
        true
    }

    /// Click gate for folder rows. Returns `false` for the one click that follows a drag;
    /// the swallowed click clears `has_dragged`.
    pub fn filter_click(&mut self, folder: FolderId) -> bool {
        if !(self.state.is_dragging || self.state.has_dragged) {
            return true;
        }
        self.state.has_dragged = false;
        self.debug_log.push(format!(
            "session {} CLICK suppressed folder={folder}",
            self.session_id
        ));
        false
    }

    fn activate(&mut self, reason: &str) -> Option<DragEvent> {
        let folder = self.state.dragged_id?;
        self.activation_deadline = None;
        self.phase = DragPhase::Active;
        self.state.is_dragging = true;
        self.state.has_dragged = true;
        self.debug_log.push(format!(
            "session {} ACTIVE folder={folder} reason={reason}",
            self.session_id
        ));
        Some(DragEvent::Activated { folder })
    }

    fn update_hover(&mut self, pointer: Pos2, hits: &impl HitTest) {
        let hit = hits
            .hit(pointer)
            .filter(|hit| Some(hit.target.id) != self.state.dragged_id);

        let Some(hit) = hit else {
            self.state.hovered_id = None;
            self.state.drop_type = None;
            self.auto_expanded = None;
            self.cancel_auto_expand("left");
            return;
        };

        let folder = hit.target.id;
        let zone = classify(pointer, hit.rect);
        if self.state.hovered_id != Some(folder) {
            self.auto_expanded = None;
        }
        self.state.hovered_id = Some(folder);
        self.state.drop_type = Some(zone);

        let wants_expand = zone == DropZone::Into
            && hit.has_children
            && !hit.expanded
            && self.auto_expanded != Some(folder);
        if !wants_expand {
            self.cancel_auto_expand("zone");
            return;
        }

        if self.auto_expand.is_some_and(|timer| timer.folder == folder) {
            return;
        }
        self.auto_expand = Some(AutoExpandTimer {
            folder,
            deadline: self.clock.now() + self.options.auto_expand_delay(),
        });
        self.debug_log.push(format!(
            "session {} AUTO_EXPAND armed folder={folder}",
            self.session_id
        ));
    }

    fn poll_auto_expand(&mut self, now: Duration) -> Option<DragEvent> {
        let timer = self.auto_expand?;
        if now < timer.deadline {
            return None;
        }
        self.auto_expand = None;
        self.auto_expanded = Some(timer.folder);
        self.debug_log.push(format!(
            "session {} AUTO_EXPAND fired folder={}",
            self.session_id, timer.folder
        ));
        Some(DragEvent::AutoExpand {
            folder: timer.folder,
        })
    }

    fn cancel_auto_expand(&mut self, why: &str) {
        if let Some(timer) = self.auto_expand.take() {
            self.debug_log.push(format!(
                "session {} AUTO_EXPAND cancelled folder={} ({why})",
                self.session_id, timer.folder
            ));
        }
    }

    fn clear_timers(&mut self) {
        self.activation_deadline = None;
        self.auto_expand = None;
        self.auto_expanded = None;
        self.grace_deadline = None;
    }

    fn settle(&mut self) {
        self.debug_log
            .push(format!("session {} END", self.session_id));
        self.reset();
    }

    fn reset(&mut self) {
        self.clear_timers();
        self.listeners_attached = false;
        self.phase = DragPhase::Idle;
        self.state = DragState::default();
        self.label.clear();
    }
}
