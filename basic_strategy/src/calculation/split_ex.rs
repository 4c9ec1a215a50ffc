use super::{HandState, PlayerHandEvaluator};
use crate::CardCount;

impl<'a> PlayerHandEvaluator<'a> {
    /// EV of splitting a pair of `pair_rank` held at `split_depth`.
    ///
    /// The two resulting hands are played independently from the same shoe, so the
    /// EV is twice that of one hand receiving its second card. Each resulting hand is
    /// at `split_depth + 1` and may split again if the rule permits.
    ///
    /// Panics if the pair cannot be split.
    pub fn split_ev(
        &mut self,
        pair_rank: u8,
        split_depth: u8,
        dealer_up_card: u8,
        shoe: &CardCount,
    ) -> f64 {
        if !self.can_split(pair_rank, split_depth) {
            panic!("A pair of {pair_rank} cannot be split at depth {split_depth}");
        }
        let state = (pair_rank, split_depth, dealer_up_card);
        if let Some(ex) = self.split_expectations.get(state, shoe) {
            return *ex;
        }

        let rule = *self.rule;
        let shoe_model = self.shoe_model;
        let mut ex = 0.0;
        for card_value in 1..=10 {
            let p = shoe_model.probability_of(card_value, shoe);
            if p == 0.0 {
                continue;
            }
            let hand = HandState::split_hand(pair_rank, card_value, split_depth + 1, &rule);
            let next_shoe = shoe_model.with_card_removed(card_value, shoe);
            ex += p * self.max_expectation(&hand, dealer_up_card, &next_shoe);
        }
        let ex = 2.0 * ex;

        self.split_expectations.insert(state, shoe, ex);
        ex
    }
}
