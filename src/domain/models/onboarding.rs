/// Lifecycle of the first-session introduction modal within one mount.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum OnboardingState {
    /// The intro was already seen before this mount.
    NotFirstSession,
    /// First session, waiting for the trigger.
    Pending,
    ModalShown,
    /// Terminal for the mount.
    Dismissed,
}

impl OnboardingState {
    pub fn initial(has_seen_intro: bool) -> OnboardingState {
        if has_seen_intro {
            return OnboardingState::NotFirstSession;
        }

        return OnboardingState::Pending;
    }
}

/// Lifecycle of a one-shot scroll trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum TriggerState {
    Armed,
    Fired,
}
