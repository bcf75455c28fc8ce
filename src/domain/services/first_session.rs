#[cfg(test)]
#[path = "first_session_test.rs"]
mod tests;

use super::HubStore;
use super::ScrollTrigger;
use super::Viewport;
use crate::domain::models::OnboardingState;
use crate::domain::models::Region;
use crate::domain::models::TriggerPosition;

/// Decides whether the hub introduction modal should be shown.
///
/// Whether this is a first session is read from the hub store once, when the
/// gate is mounted, and afterwards only ever moves from true to false. Changes
/// to the stored flag made elsewhere are not picked up until the next mount.
pub struct FirstSession<'a> {
    store: &'a mut HubStore,
    state: OnboardingState,
}

impl<'a> FirstSession<'a> {
    pub fn mount(store: &'a mut HubStore) -> FirstSession<'a> {
        let state = OnboardingState::initial(store.has_seen_intro());
        tracing::debug!(state = state.to_string(), "Mounted first session gate");

        return FirstSession { store, state };
    }

    pub fn state(&self) -> OnboardingState {
        return self.state;
    }

    pub fn is_first_session(&self) -> bool {
        return matches!(
            self.state,
            OnboardingState::Pending | OnboardingState::ModalShown
        );
    }

    pub fn should_show_modal(&self) -> bool {
        return self.state == OnboardingState::ModalShown;
    }

    pub fn has_seen_intro(&self) -> bool {
        return self.store.has_seen_intro();
    }

    /// Shows the modal if this is still a first session. Calling it again
    /// while the modal is up changes nothing.
    pub fn trigger_modal(&mut self) {
        if self.state != OnboardingState::Pending {
            return;
        }

        self.state = OnboardingState::ModalShown;
        tracing::debug!("Showing first session modal");
    }

    /// Records that the intro has been seen and ends the first session for
    /// this mount.
    pub fn dismiss(&mut self) {
        self.store.set_has_seen_intro(true);
        self.state = OnboardingState::Dismissed;
        tracing::debug!("Dismissed first session");
    }

    pub fn dismiss_modal(&mut self) {
        self.dismiss();
    }

    /// Debug escape hatch that makes the current mount a first session again.
    pub fn reset(&mut self) {
        self.store.set_has_seen_intro(false);
        if self.state != OnboardingState::ModalShown {
            self.state = OnboardingState::Pending;
        }
        tracing::debug!(state = self.state.to_string(), "Reset first session");
    }
}

/// The first session gate wired to the scroll trigger watching the hub
/// section, the way the landing page mounts them together.
///
/// The trigger fires at most once per mount. After `FirstSession::reset` on a
/// mount whose trigger already fired, the modal comes back on the next mount.
pub struct Onboarding<'a> {
    gate: FirstSession<'a>,
    trigger: ScrollTrigger,
}

impl<'a> Onboarding<'a> {
    pub fn mount(store: &'a mut HubStore, position: TriggerPosition) -> Onboarding<'a> {
        let gate = FirstSession::mount(store);
        let trigger = ScrollTrigger::new(position, gate.is_first_session());

        return Onboarding { gate, trigger };
    }

    pub fn gate(&self) -> &FirstSession<'a> {
        return &self.gate;
    }

    pub fn gate_mut(&mut self) -> &mut FirstSession<'a> {
        return &mut self.gate;
    }

    pub fn trigger(&self) -> &ScrollTrigger {
        return &self.trigger;
    }

    pub fn attach(&mut self, section: Region) {
        self.trigger.attach(section);
    }

    /// Feeds a scroll position through the trigger. Returns `true` when this
    /// position is the one that brought the modal up.
    pub fn scroll(&mut self, viewport: &Viewport) -> bool {
        self.trigger.set_enabled(self.gate.is_first_session());

        let gate = &mut self.gate;
        let fired = self.trigger.observe(viewport, || gate.trigger_modal());

        return fired && gate.should_show_modal();
    }

    pub fn dismiss(&mut self) {
        self.gate.dismiss_modal();
        self.trigger.set_enabled(false);
    }
}
