pub mod calculation;
mod error;
pub mod shoe;
mod statearray;
pub mod strategy;

use serde::Serialize;
use serde_enum_str::{Deserialize_enum_str, Serialize_enum_str};
use strum_macros::EnumIter;

pub use calculation::{
    ActionExpectations, DealerOutcome, DealerOutcomeDistribution, DealerOutcomeSolver,
    HandCategory, HandState, PlayerHandEvaluator,
};
pub use error::RuleError;
pub use shoe::ShoeModel;
pub use statearray::{CardCount, StateArray};
pub use strategy::{
    HandDescriptor, StrategyCell, StrategyCharts, StrategyRow, StrategyTableBuilder, StrategyTables,
};

/// Dealer up cards in the column order of the strategy charts. Card value 1 is the Ace.
pub const DEALER_UP_CARDS: [u8; 10] = [2, 3, 4, 5, 6, 7, 8, 9, 10, 1];

/// Deck counts a `Rule` may use.
pub const SUPPORTED_NUMBER_OF_DECKS: [u8; 5] = [1, 2, 4, 6, 8];

/// Splits allowed along one line of play. Both hands of a split may resplit on
/// their own, so one original hand grows to at most 2^MAX_SPLIT_DEPTH = 4 hands.
pub const MAX_SPLIT_DEPTH: u8 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Rule {
    pub number_of_decks: u8,
    pub continuous_shuffle: bool,
    pub dealer_hit_on_soft17: bool,
    pub no_hole_card: bool,
    pub allow_split_aces: bool,
    pub allow_resplit_aces: bool,
    pub allow_das: bool,
    pub allow_surrender: bool,
    pub allow_surrender_vs_ace: bool,
    pub one_card_after_split_aces: bool,
}

impl Default for Rule {
    /// 6 decks, dealer stands on soft 17, hole card with peek, DAS, split aces once
    /// with one card each, no surrender.
    fn default() -> Self {
        Rule {
            number_of_decks: 6,
            continuous_shuffle: false,
            dealer_hit_on_soft17: false,
            no_hole_card: false,
            allow_split_aces: true,
            allow_resplit_aces: false,
            allow_das: true,
            allow_surrender: false,
            allow_surrender_vs_ace: false,
            one_card_after_split_aces: true,
        }
    }
}

impl Rule {
    /// Checks value ranges and cross-field consistency.
    pub fn validate(&self) -> Result<(), RuleError> {
        if !SUPPORTED_NUMBER_OF_DECKS.contains(&self.number_of_decks) {
            return Err(RuleError::UnsupportedNumberOfDecks(self.number_of_decks));
        }
        if self.allow_surrender_vs_ace && !self.allow_surrender {
            return Err(RuleError::SurrenderVsAceWithoutSurrender);
        }
        if self.allow_resplit_aces && !self.allow_split_aces {
            return Err(RuleError::ResplitAcesWithoutSplitAces);
        }
        Ok(())
    }

    /// The card that would complete a dealer natural under `dealer_up_card`, if any.
    pub fn blackjack_hole_card(dealer_up_card: u8) -> Option<u8> {
        match dealer_up_card {
            1 => Some(10),
            10 => Some(1),
            _ => None,
        }
    }

    /// The hole card the dealer has already checked for and ruled out before the
    /// player acts. `None` under the no-hole-card rule.
    pub fn peeked_hole_card(&self, dealer_up_card: u8) -> Option<u8> {
        if self.no_hole_card {
            None
        } else {
            Self::blackjack_hole_card(dealer_up_card)
        }
    }
}

/// Player actions, declared in tie-break priority order (first wins on equal EV).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, Serialize_enum_str,
    Deserialize_enum_str,
)]
pub enum Action {
    #[serde(rename = "R")]
    Surrender,
    #[serde(rename = "P")]
    Split,
    #[serde(rename = "D")]
    Double,
    #[serde(rename = "H")]
    Hit,
    #[serde(rename = "S")]
    Stand,
}

impl Action {
    pub fn symbol(&self) -> char {
        match self {
            Action::Surrender => 'R',
            Action::Split => 'P',
            Action::Double => 'D',
            Action::Hit => 'H',
            Action::Stand => 'S',
        }
    }
}

/// Chart label of a card value: "A" for 1, the number otherwise.
pub fn card_label(card_value: u8) -> String {
    match card_value {
        1 => String::from("A"),
        2..=10 => card_value.to_string(),
        _ => panic!("Invalid card value {card_value}! It must be in [1, 10]"),
    }
}
