use crate::{CardCount, Rule};

/// The probability law every draw in the solvers goes through.
///
/// `Depleting` follows the exact composition of the shoe handed to it; each
/// recursion branch owns its copy, so removing a card never leaks into sibling
/// branches. `WithReplacement` models a continuous shuffling machine: every draw
/// uses the proportions of the full shoe and removing a card changes nothing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShoeModel {
    Depleting,
    WithReplacement { proportions: [f64; 10] },
}

impl ShoeModel {
    pub fn new(rule: &Rule) -> ShoeModel {
        if rule.continuous_shuffle {
            Self::with_replacement(&CardCount::with_number_of_decks(rule.number_of_decks))
        } else {
            ShoeModel::Depleting
        }
    }

    pub fn with_replacement(initial: &CardCount) -> ShoeModel {
        let mut proportions = [0.0; 10];
        for card_value in 1..=10 {
            proportions[(card_value - 1) as usize] = initial.get_proportion(card_value);
        }
        ShoeModel::WithReplacement { proportions }
    }

    pub fn is_depleting(&self) -> bool {
        matches!(self, ShoeModel::Depleting)
    }

    pub fn probability_of(&self, card_value: u8, shoe: &CardCount) -> f64 {
        match self {
            ShoeModel::Depleting => shoe.get_proportion(card_value),
            ShoeModel::WithReplacement { proportions } => proportions[(card_value - 1) as usize],
        }
    }

    /// Probability of drawing `card_value` given that the card is known not to be
    /// `excluded`.
    pub fn probability_excluding(&self, card_value: u8, excluded: u8, shoe: &CardCount) -> f64 {
        if card_value == excluded {
            return 0.0;
        }
        let remaining = 1.0 - self.probability_of(excluded, shoe);
        if remaining <= 0.0 {
            panic!("Every card left in the shoe has value {excluded}");
        }
        self.probability_of(card_value, shoe) / remaining
    }

    /// The shoe after drawing one card of `card_value`.
    ///
    /// Panics under the depleting law if no such card is left.
    pub fn with_card_removed(&self, card_value: u8, shoe: &CardCount) -> CardCount {
        let mut next_shoe = *shoe;
        if self.is_depleting() {
            next_shoe.remove_card(card_value);
        }
        next_shoe
    }
}
