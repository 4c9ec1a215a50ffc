use crate::Rule;
use serde::Serialize;

/// Adds a card to a running total, counting an Ace as 11 whenever that does not
/// bust and demoting an 11-valued Ace once the total passes 21.
pub(crate) fn add_card_value(total: u8, soft: bool, card_value: u8) -> (u8, bool) {
    let (mut total, mut soft) = {
        if card_value == 1 && total + 11 <= 21 {
            (total + 11, true)
        } else {
            (total + card_value, soft)
        }
    };
    if soft && total > 21 {
        total -= 10;
        soft = false;
    }
    (total, soft)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum HandCategory {
    Hard,
    Soft,
    Pair,
}

/// A player hand at a decision point.
///
/// Only what matters for the remaining decisions is kept: the best total, whether
/// an Ace is still counted as 11, the pair rank while the hand can still be split,
/// and the restrictions inherited from splitting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HandState {
    pub total: u8,
    pub soft: bool,
    pub card_count: u8,
    pub pair_rank: Option<u8>,
    pub split_depth: u8,
    pub eligible_for_double: bool,
    /// Split Aces under the one-card rule: no hit and no double.
    pub one_card_only: bool,
}

impl HandState {
    /// The original two-card hand. Two cards of the same value form a pair.
    pub fn from_cards(card0: u8, card1: u8) -> HandState {
        if card0 == 0 || card0 > 10 || card1 == 0 || card1 > 10 {
            panic!("Invalid hand card! It must be in [1, 10]")
        }
        let (total, soft) = add_card_value(0, false, card0);
        let (total, soft) = add_card_value(total, soft, card1);
        HandState {
            total,
            soft,
            card_count: 2,
            pair_rank: (card0 == card1).then_some(card0),
            split_depth: 0,
            eligible_for_double: true,
            one_card_only: false,
        }
    }

    /// One of the hands created by splitting a pair of `pair_rank`, after it has
    /// received its second card.
    pub fn split_hand(pair_rank: u8, card_value: u8, split_depth: u8, rule: &Rule) -> HandState {
        let (total, soft) = add_card_value(0, false, pair_rank);
        let (total, soft) = add_card_value(total, soft, card_value);
        let one_card_only = pair_rank == 1 && rule.one_card_after_split_aces;
        HandState {
            total,
            soft,
            card_count: 2,
            pair_rank: (card_value == pair_rank).then_some(pair_rank),
            split_depth,
            eligible_for_double: rule.allow_das && !one_card_only,
            one_card_only,
        }
    }

    pub fn after_hit(&self, card_value: u8) -> HandState {
        let (total, soft) = add_card_value(self.total, self.soft, card_value);
        HandState {
            total,
            soft,
            card_count: self.card_count + 1,
            pair_rank: None,
            split_depth: self.split_depth,
            eligible_for_double: false,
            one_card_only: false,
        }
    }

    /// The same cards played as a plain total, without the option to split.
    pub fn without_pair(self) -> HandState {
        HandState {
            pair_rank: None,
            ..self
        }
    }

    pub fn category(&self) -> HandCategory {
        if self.pair_rank.is_some() {
            HandCategory::Pair
        } else if self.soft {
            HandCategory::Soft
        } else {
            HandCategory::Hard
        }
    }

    pub fn bust(&self) -> bool {
        self.total > 21
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ace_counting() {
        assert_eq!(add_card_value(0, false, 1), (11, true));
        assert_eq!(add_card_value(11, true, 1), (12, true));
        assert_eq!(add_card_value(16, true, 6), (12, false));
        assert_eq!(add_card_value(15, false, 1), (16, false));
        assert_eq!(add_card_value(20, true, 1), (21, true));
        assert_eq!(add_card_value(12, false, 10), (22, false));
    }

    #[test]
    fn initial_hands() {
        let hand = HandState::from_cards(10, 6);
        assert_eq!((hand.total, hand.soft), (16, false));
        assert_eq!(hand.category(), HandCategory::Hard);

        let hand = HandState::from_cards(1, 7);
        assert_eq!((hand.total, hand.soft), (18, true));
        assert_eq!(hand.category(), HandCategory::Soft);

        let hand = HandState::from_cards(1, 1);
        assert_eq!((hand.total, hand.soft), (12, true));
        assert_eq!(hand.category(), HandCategory::Pair);
        assert_eq!(hand.pair_rank, Some(1));

        let hand = HandState::from_cards(10, 10).without_pair();
        assert_eq!(hand.category(), HandCategory::Hard);
        assert_eq!(hand.total, 20);
    }

    #[test]
    fn hitting_drops_pair_and_double() {
        let hand = HandState::from_cards(8, 8).after_hit(10);
        assert!(hand.bust());
        assert_eq!(hand.card_count, 3);
        assert_eq!(hand.pair_rank, None);
        assert!(!hand.eligible_for_double);

        let hand = HandState::from_cards(1, 5).after_hit(9);
        assert_eq!((hand.total, hand.soft), (15, false));
    }

    #[test]
    fn split_hands_inherit_restrictions() {
        let rule = Rule::default();
        let hand = HandState::split_hand(1, 10, 1, &rule);
        assert_eq!((hand.total, hand.soft), (21, true));
        assert!(hand.one_card_only);
        assert!(!hand.eligible_for_double);

        let hand = HandState::split_hand(8, 8, 1, &rule);
        assert_eq!(hand.pair_rank, Some(8));
        assert!(hand.eligible_for_double);

        let no_das = Rule {
            allow_das: false,
            ..Default::default()
        };
        assert!(!HandState::split_hand(8, 3, 1, &no_das).eligible_for_double);
    }
}
