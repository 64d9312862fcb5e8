//! Submission lifecycle state machine

/// Where a form's submission currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

/// Inputs that move the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionEvent {
    /// User pressed submit
    Submit,
    ValidationFailed,
    ValidationPassed,
    /// Endpoint answered `success: true`
    Accepted,
    /// Rejection, exhausted retries or a failed challenge
    Failed,
}

impl SubmissionState {
    /// Next state for `event`, or `None` if the event is not valid here
    pub fn on(self, event: SubmissionEvent) -> Option<Self> {
        use SubmissionEvent as E;
        use SubmissionState as S;

        match (self, event) {
            (S::Idle | S::Succeeded | S::Failed, E::Submit) => Some(S::Validating),
            (S::Validating, E::ValidationFailed) => Some(S::Idle),
            (S::Validating, E::ValidationPassed) => Some(S::Submitting),
            (S::Submitting, E::Accepted) => Some(S::Succeeded),
            (S::Submitting, E::Failed) => Some(S::Failed),
            _ => None,
        }
    }

    /// A submission is between validation and its network outcome
    pub fn is_busy(&self) -> bool {
        matches!(self, SubmissionState::Validating | SubmissionState::Submitting)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Submitting => "submitting",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}
