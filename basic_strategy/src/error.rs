use thiserror::Error;

/// Rule sets the engine refuses to solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("unsupported number of decks: {0} (expected one of 1, 2, 4, 6, 8)")]
    UnsupportedNumberOfDecks(u8),

    #[error("surrender against an Ace requires surrender to be allowed")]
    SurrenderVsAceWithoutSurrender,

    #[error("resplitting Aces requires splitting Aces to be allowed")]
    ResplitAcesWithoutSplitAces,
}
