#[cfg(test)]
#[path = "scroll_trigger_test.rs"]
mod tests;

use super::Viewport;
use crate::domain::models::Region;
use crate::domain::models::TriggerPosition;
use crate::domain::models::TriggerState;

/// An installed observation of the target region against the trigger line.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Observer {
    target: Region,
    start: f64,
}

/// Calls back once, the first time a target region scrolls past a trigger
/// line, and then stays inert until it is dropped.
///
/// At most one observer is installed at any time. It is only installed while
/// the trigger is mounted, enabled, attached to a target and still `Armed`.
pub struct ScrollTrigger {
    position: TriggerPosition,
    enabled: bool,
    mounted: bool,
    target: Option<Region>,
    state: TriggerState,
    observer: Option<Observer>,
}

impl ScrollTrigger {
    pub fn new(position: TriggerPosition, enabled: bool) -> ScrollTrigger {
        let mut trigger = ScrollTrigger {
            position,
            enabled,
            mounted: true,
            target: None,
            state: TriggerState::Armed,
            observer: None,
        };
        trigger.sync_observer();

        return trigger;
    }

    pub fn state(&self) -> TriggerState {
        return self.state;
    }

    pub fn is_observing(&self) -> bool {
        return self.observer.is_some();
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }

        self.enabled = enabled;
        self.sync_observer();
    }

    /// Attaches the target region, or moves it when the layout changes.
    pub fn attach(&mut self, target: Region) {
        self.target = Some(target);
        self.sync_observer();
    }

    pub fn detach(&mut self) {
        self.target = None;
        self.sync_observer();
    }

    /// Tears the observer down for good. Later calls to `observe` do nothing.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.sync_observer();
    }

    fn sync_observer(&mut self) {
        let wanted = match self.target {
            Some(target)
                if self.mounted && self.enabled && self.state == TriggerState::Armed =>
            {
                Some(Observer {
                    target,
                    start: target.edge(self.position.edge),
                })
            }
            _ => None,
        };

        if wanted == self.observer {
            return;
        }

        if let Some(observer) = self.observer.take() {
            tracing::debug!(target_top = observer.target.top, "Killed scroll observer");
        }
        if let Some(observer) = wanted {
            tracing::debug!(
                target_top = observer.target.top,
                position = self.position.to_string(),
                "Installed scroll observer"
            );
        }
        self.observer = wanted;
    }

    /// Reports a scroll position. Runs `on_trigger` and returns `true` only
    /// for the observation that first finds the target's edge at or above the
    /// trigger line.
    pub fn observe<F: FnOnce()>(&mut self, viewport: &Viewport, on_trigger: F) -> bool {
        let observer = match self.observer {
            Some(observer) => observer,
            None => return false,
        };

        if observer.start > viewport.line(self.position.viewport_percent) {
            return false;
        }

        self.state = TriggerState::Fired;
        self.sync_observer();
        tracing::debug!(position = viewport.position, "Scroll trigger fired");

        on_trigger();
        return true;
    }
}

impl Drop for ScrollTrigger {
    fn drop(&mut self) {
        self.unmount();
    }
}
