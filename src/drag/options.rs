use std::time::Duration;

use egui::Vec2;

/// Options for [`super::DragSession`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DragOptions {
    /// Pointer distance (in points) from the press position that activates a pending drag.
    ///
    /// Movement of exactly this distance activates.
    pub activation_distance: f32,

    /// Hold time (in milliseconds) after which a pending drag activates even without movement.
    pub activation_delay_ms: u64,

    /// Hover time (in milliseconds) over the middle band of a collapsed folder before it opens.
    pub auto_expand_delay_ms: u64,

    /// Time (in milliseconds) the session stays in `Finalizing` after a drop.
    ///
    /// During this window the click that follows the release is swallowed.
    pub click_grace_ms: u64,

    /// Offset of the floating ghost label relative to the pointer.
    pub ghost_offset: Vec2,

    /// Maximum number of lines kept in the drag debug event log.
    pub debug_event_log_capacity: usize,
}

impl Default for DragOptions {
    fn default() -> Self {
        Self {
            activation_distance: 10.0,
            activation_delay_ms: 200,
            auto_expand_delay_ms: 600,
            click_grace_ms: 100,
            ghost_offset: Vec2::new(10.0, -10.0),
            debug_event_log_capacity: 200,
        }
    }
}

impl DragOptions {
    #[inline]
    pub fn activation_delay(&self) -> Duration {
        Duration::from_millis(self.activation_delay_ms)
    }

    #[inline]
    pub fn auto_expand_delay(&self) -> Duration {
        Duration::from_millis(self.auto_expand_delay_ms)
    }

    #[inline]
    pub fn click_grace(&self) -> Duration {
        Duration::from_millis(self.click_grace_ms)
    }

    pub(crate) fn distance_activates(&self, distance: f32) -> bool {
        distance >= self.activation_distance
    }
}
