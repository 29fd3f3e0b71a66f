/// Identifier for one question/answer turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TurnId(pub u64);

impl TurnId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Lifecycle of the controller's single in-flight turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnPhase {
    #[default]
    Idle,
    /// Request sent, placeholder shows the typing indicator.
    AwaitingFirstChunk(TurnId),
    /// At least one answer chunk has been rendered.
    Streaming(TurnId),
}

/// State transition input for the turn lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnTransition {
    Start(TurnId),
    FirstChunk(TurnId),
    Finish(TurnId),
    ResetToIdle,
}

/// Rejection reason for illegal turn transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRejection {
    AlreadyActive { active: TurnId, attempted: TurnId },
    NoActiveTurn,
    TurnMismatch { active: TurnId, attempted: TurnId },
}

pub type TurnTransitionResult = Result<TurnPhase, TurnRejection>;

impl TurnPhase {
    pub fn active_turn(&self) -> Option<TurnId> {
        match self {
            Self::AwaitingFirstChunk(turn) | Self::Streaming(turn) => Some(*turn),
            Self::Idle => None,
        }
    }

    /// True from submission until the turn finishes, whatever the outcome.
    pub fn is_busy(&self) -> bool {
        self.active_turn().is_some()
    }

    /// Applies one transition deterministically.
    ///
    /// Only an idle controller may start a turn. `FirstChunk` and `Finish`
    /// must name the active turn exactly.
    pub fn apply(&self, transition: TurnTransition) -> TurnTransitionResult {
        match transition {
            TurnTransition::Start(turn) => self.apply_start(turn),
            TurnTransition::FirstChunk(turn) => self.apply_first_chunk(turn),
            TurnTransition::Finish(turn) => self.apply_finish(turn),
            TurnTransition::ResetToIdle => Ok(Self::Idle),
        }
    }

    fn apply_start(&self, turn: TurnId) -> TurnTransitionResult {
        match self {
            Self::Idle => Ok(Self::AwaitingFirstChunk(turn)),
            Self::AwaitingFirstChunk(active) | Self::Streaming(active) => {
                Err(TurnRejection::AlreadyActive {
                    active: *active,
                    attempted: turn,
                })
            }
        }
    }

    fn apply_first_chunk(&self, turn: TurnId) -> TurnTransitionResult {
        match self {
            Self::AwaitingFirstChunk(active) | Self::Streaming(active) if *active == turn => {
                Ok(Self::Streaming(turn))
            }
            Self::AwaitingFirstChunk(active) | Self::Streaming(active) => {
                Err(TurnRejection::TurnMismatch {
                    active: *active,
                    attempted: turn,
                })
            }
            Self::Idle => Err(TurnRejection::NoActiveTurn),
        }
    }

    fn apply_finish(&self, turn: TurnId) -> TurnTransitionResult {
        match self {
            Self::AwaitingFirstChunk(active) | Self::Streaming(active) if *active == turn => {
                Ok(Self::Idle)
            }
            Self::AwaitingFirstChunk(active) | Self::Streaming(active) => {
                Err(TurnRejection::TurnMismatch {
                    active: *active,
                    attempted: turn,
                })
            }
            Self::Idle => Err(TurnRejection::NoActiveTurn),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIRST: TurnId = TurnId::new(1);
    const SECOND: TurnId = TurnId::new(2);

    #[test]
    fn full_turn_walks_through_every_phase() {
        let phase = TurnPhase::Idle;
        let phase = phase.apply(TurnTransition::Start(FIRST)).unwrap();
        assert_eq!(phase, TurnPhase::AwaitingFirstChunk(FIRST));
        assert!(phase.is_busy());

        let phase = phase.apply(TurnTransition::FirstChunk(FIRST)).unwrap();
        assert_eq!(phase, TurnPhase::Streaming(FIRST));

        let phase = phase.apply(TurnTransition::FirstChunk(FIRST)).unwrap();
        assert_eq!(phase, TurnPhase::Streaming(FIRST));

        let phase = phase.apply(TurnTransition::Finish(FIRST)).unwrap();
        assert_eq!(phase, TurnPhase::Idle);
        assert!(!phase.is_busy());
    }

    #[test]
    fn second_start_is_rejected_while_busy() {
        let phase = TurnPhase::Streaming(FIRST);
        assert_eq!(
            phase.apply(TurnTransition::Start(SECOND)),
            Err(TurnRejection::AlreadyActive {
                active: FIRST,
                attempted: SECOND,
            })
        );
    }

    #[test]
    fn finish_for_another_turn_is_rejected() {
        let phase = TurnPhase::AwaitingFirstChunk(FIRST);
        assert_eq!(
            phase.apply(TurnTransition::Finish(SECOND)),
            Err(TurnRejection::TurnMismatch {
                active: FIRST,
                attempted: SECOND,
            })
        );
        assert_eq!(
            TurnPhase::Idle.apply(TurnTransition::Finish(FIRST)),
            Err(TurnRejection::NoActiveTurn)
        );
    }

    #[test]
    fn finish_is_allowed_before_any_chunk() {
        let phase = TurnPhase::AwaitingFirstChunk(FIRST);
        assert_eq!(phase.apply(TurnTransition::Finish(FIRST)), Ok(TurnPhase::Idle));
    }

    #[test]
    fn reset_to_idle_always_succeeds() {
        assert_eq!(
            TurnPhase::Streaming(FIRST).apply(TurnTransition::ResetToIdle),
            Ok(TurnPhase::Idle)
        );
    }
}
