use super::{ActionExpectations, DealerOutcomeDistribution, DealerOutcomeSolver, HandState};
use crate::{Action, CardCount, Rule, ShoeModel, StateArray, MAX_SPLIT_DEPTH};
use strum::IntoEnumIterator;

/// Expected values of the player's actions against one dealer up card.
///
/// Every EV is per unit of the initial bet. All memos are keyed on the exact shoe
/// the state is reached with, so one evaluator can be reused for every hand played
/// against the same up card.
pub struct PlayerHandEvaluator<'a> {
    pub(super) rule: &'a Rule,
    pub(super) shoe_model: ShoeModel,
    pub(super) dealer: DealerOutcomeSolver<'a>,

    // (hand, dealer up card) -> best EV of the hand from here on.
    pub(super) max_expectations: StateArray<(HandState, u8), f64>,
    // (pair rank, split depth, dealer up card) -> EV of splitting.
    pub(super) split_expectations: StateArray<(u8, u8, u8), f64>,
}

impl<'a> PlayerHandEvaluator<'a> {
    /// Panics if the rule does not validate.
    pub fn new(rule: &'a Rule) -> Self {
        if let Err(e) = rule.validate() {
            panic!("Invalid rule: {e}");
        }
        let shoe_model = ShoeModel::new(rule);
        Self {
            rule,
            shoe_model,
            dealer: DealerOutcomeSolver::new(rule, shoe_model),
            max_expectations: StateArray::new(),
            split_expectations: StateArray::new(),
        }
    }

    pub fn rule(&self) -> &Rule {
        self.rule
    }

    pub fn shoe_model(&self) -> ShoeModel {
        self.shoe_model
    }

    /// Legal actions, in priority order. A busted hand has none; a total of 21 can
    /// only stand, or split if it is still a pair.
    pub fn legal_actions(&self, hand: &HandState, dealer_up_card: u8) -> Vec<Action> {
        Action::iter()
            .filter(|action| self.is_legal(*action, hand, dealer_up_card))
            .collect()
    }

    fn is_legal(&self, action: Action, hand: &HandState, dealer_up_card: u8) -> bool {
        if hand.bust() {
            return false;
        }
        match action {
            Action::Surrender => {
                self.rule.allow_surrender
                    && hand.split_depth == 0
                    && hand.card_count == 2
                    && hand.total < 21
                    && (dealer_up_card != 1 || self.rule.allow_surrender_vs_ace)
            }
            Action::Split => hand
                .pair_rank
                .is_some_and(|pair_rank| self.can_split(pair_rank, hand.split_depth)),
            Action::Double => {
                hand.eligible_for_double
                    && !hand.one_card_only
                    && hand.card_count == 2
                    && hand.total < 21
            }
            Action::Hit => !hand.one_card_only && hand.total < 21,
            Action::Stand => true,
        }
    }

    /// Whether a pair of `pair_rank` at `split_depth` may be split once more.
    pub fn can_split(&self, pair_rank: u8, split_depth: u8) -> bool {
        if split_depth >= MAX_SPLIT_DEPTH {
            return false;
        }
        if pair_rank == 1 {
            self.rule.allow_split_aces && (split_depth == 0 || self.rule.allow_resplit_aces)
        } else {
            true
        }
    }

    /// EV of every legal action. `shoe` must already exclude the player's cards and
    /// the dealer up card.
    pub fn evaluate(
        &mut self,
        hand: &HandState,
        dealer_up_card: u8,
        shoe: &CardCount,
    ) -> ActionExpectations {
        let mut ex = ActionExpectations::default();
        for action in self.legal_actions(hand, dealer_up_card) {
            let action_ex = match action {
                Action::Surrender => self.surrender_ev(),
                Action::Split => match hand.pair_rank {
                    Some(pair_rank) => {
                        self.split_ev(pair_rank, hand.split_depth, dealer_up_card, shoe)
                    }
                    None => continue,
                },
                Action::Double => self.double_ev(hand, dealer_up_card, shoe),
                Action::Hit => self.hit_ev(hand, dealer_up_card, shoe),
                Action::Stand => self.stand_ev_against(hand, dealer_up_card, shoe),
            };
            ex.set(action, action_ex);
        }
        ex
    }

    /// The optimal action and its EV.
    ///
    /// Panics on a busted hand.
    pub fn best_action(
        &mut self,
        hand: &HandState,
        dealer_up_card: u8,
        shoe: &CardCount,
    ) -> (Action, f64) {
        match self.evaluate(hand, dealer_up_card, shoe).best() {
            Some(best) => best,
            None => panic!("No legal action for a busted hand"),
        }
    }

    /// EV of standing on `player_total` against a final dealer distribution.
    ///
    /// Panics if the player has busted.
    pub fn stand_ev(player_total: u8, dealer_odds: &DealerOutcomeDistribution) -> f64 {
        if player_total > 21 {
            panic!("Cannot stand on a busted total of {player_total}");
        }
        dealer_odds.p_worse_than_player(player_total) - dealer_odds.p_better_than_player(player_total)
    }

    pub fn stand_ev_against(&mut self, hand: &HandState, dealer_up_card: u8, shoe: &CardCount) -> f64 {
        let dealer_odds = self.dealer.distribution_for_player(dealer_up_card, shoe);
        Self::stand_ev(hand.total, &dealer_odds)
    }

    pub fn hit_ev(&mut self, hand: &HandState, dealer_up_card: u8, shoe: &CardCount) -> f64 {
        let shoe_model = self.shoe_model;
        let mut ex = 0.0;
        for card_value in 1..=10 {
            let p = shoe_model.probability_of(card_value, shoe);
            if p == 0.0 {
                continue;
            }
            let next_hand = hand.after_hit(card_value);
            let next_shoe = shoe_model.with_card_removed(card_value, shoe);
            ex += p * self.max_expectation(&next_hand, dealer_up_card, &next_shoe);
        }
        ex
    }

    /// One more card, then a forced stand, at twice the wager.
    pub fn double_ev(&mut self, hand: &HandState, dealer_up_card: u8, shoe: &CardCount) -> f64 {
        let shoe_model = self.shoe_model;
        let mut ex = 0.0;
        for card_value in 1..=10 {
            let p = shoe_model.probability_of(card_value, shoe);
            if p == 0.0 {
                continue;
            }
            let next_hand = hand.after_hit(card_value);
            let next_ex = if next_hand.bust() {
                -1.0
            } else {
                let next_shoe = shoe_model.with_card_removed(card_value, shoe);
                self.stand_ev_against(&next_hand, dealer_up_card, &next_shoe)
            };
            ex += p * next_ex;
        }
        2.0 * ex
    }

    pub fn surrender_ev(&self) -> f64 {
        -0.5
    }

    /// Best EV over the legal actions of the hand; -1 once busted.
    pub fn max_expectation(&mut self, hand: &HandState, dealer_up_card: u8, shoe: &CardCount) -> f64 {
        if hand.bust() {
            return -1.0;
        }
        let state = (*hand, dealer_up_card);
        if let Some(ex) = self.max_expectations.get(state, shoe) {
            return *ex;
        }

        let ex = match self.evaluate(hand, dealer_up_card, shoe).best() {
            Some((_, ex)) => ex,
            None => -1.0,
        };
        self.max_expectations.insert(state, shoe, ex);
        ex
    }

    pub fn cache_len(&self) -> usize {
        self.max_expectations.len() + self.split_expectations.len()
    }

    pub fn dealer_cache_len(&self) -> usize {
        self.dealer.cache_len()
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{csm_rule, full_shoe_without};
    use super::*;

    fn best_of(rule: &Rule, card0: u8, card1: u8, dealer_up_card: u8) -> (Action, f64) {
        let mut evaluator = PlayerHandEvaluator::new(rule);
        let hand = HandState::from_cards(card0, card1);
        let shoe = full_shoe_without(rule, &[card0, card1, dealer_up_card]);
        evaluator.best_action(&hand, dealer_up_card, &shoe)
    }

    #[test]
    fn canonical_cells() {
        let rule = Rule::default();
        assert_eq!(best_of(&rule, 10, 6, 10).0, Action::Hit);
        assert_eq!(best_of(&rule, 2, 9, 10).0, Action::Double);
        assert_eq!(best_of(&rule, 10, 6, 1).0, Action::Hit);
        assert_eq!(best_of(&rule, 10, 7, 10).0, Action::Stand);
        assert_eq!(best_of(&rule, 9, 9, 7).0, Action::Stand);
    }

    #[test]
    fn known_expectations_with_depleting_shoe() {
        let rule = Rule::default();
        let mut evaluator = PlayerHandEvaluator::new(&rule);
        let hand = HandState::from_cards(10, 6);
        let shoe = full_shoe_without(&rule, &[10, 6, 10]);
        let ex = evaluator.evaluate(&hand, 10, &shoe);
        assert!((ex.stand.unwrap() - -0.540954).abs() < 1e-5);
        assert!((ex.hit.unwrap() - -0.534707).abs() < 1e-5);
        assert!((ex.double.unwrap() - -1.069415).abs() < 1e-5);
        assert_eq!(ex.surrender, None);
        assert_eq!(ex.split, None);

        let hand = HandState::from_cards(2, 9);
        let shoe = full_shoe_without(&rule, &[2, 9, 10]);
        let ex = evaluator.evaluate(&hand, 10, &shoe);
        assert!((ex.double.unwrap() - 0.174265).abs() < 1e-5);
        assert!((ex.hit.unwrap() - 0.117185).abs() < 1e-5);
    }

    #[test]
    fn known_expectations_with_replacement() {
        let rule = csm_rule();
        let mut evaluator = PlayerHandEvaluator::new(&rule);
        let shoe = CardCount::with_number_of_decks(rule.number_of_decks);

        let ex = evaluator.evaluate(&HandState::from_cards(10, 6), 10, &shoe);
        assert!((ex.stand.unwrap() - -0.54043).abs() < 1e-5);
        assert!((ex.hit.unwrap() - -0.539826).abs() < 1e-5);

        let ex = evaluator.evaluate(&HandState::from_cards(2, 9), 10, &shoe);
        assert!((ex.double.unwrap() - 0.179689).abs() < 1e-5);

        let ex = evaluator.evaluate(&HandState::from_cards(10, 10).without_pair(), 6, &shoe);
        assert!((ex.stand.unwrap() - 0.703959).abs() < 1e-5);
        assert_eq!(ex.best().unwrap().0, Action::Stand);
    }

    #[test]
    fn no_hole_card_changes_doubles() {
        let rule = Rule {
            no_hole_card: true,
            ..Default::default()
        };
        let (action, ex) = best_of(&rule, 2, 9, 10);
        assert_eq!(action, Action::Hit);
        assert!((ex - 0.030285).abs() < 1e-5);
    }

    #[test]
    fn surrender() {
        let rule = Rule {
            allow_surrender: true,
            ..Default::default()
        };
        // Not against an Ace unless allowed.
        let (action, _) = best_of(&rule, 10, 6, 1);
        assert_eq!(action, Action::Hit);

        let rule = Rule {
            allow_surrender: true,
            allow_surrender_vs_ace: true,
            ..Default::default()
        };
        assert_eq!(best_of(&rule, 10, 6, 1), (Action::Surrender, -0.5));

        let evaluator = PlayerHandEvaluator::new(&rule);
        let dealt = HandState::from_cards(10, 6);
        assert!(evaluator
            .legal_actions(&dealt, 10)
            .contains(&Action::Surrender));
        assert!(!evaluator
            .legal_actions(&dealt.after_hit(2), 10)
            .contains(&Action::Surrender));
        let split = HandState::split_hand(8, 8, 1, &rule);
        assert!(!evaluator.legal_actions(&split, 10).contains(&Action::Surrender));
    }

    #[test]
    fn twenty_one_only_stands() {
        let rule = Rule::default();
        let evaluator = PlayerHandEvaluator::new(&rule);

        let hand = HandState::from_cards(7, 4).after_hit(10);
        assert_eq!(hand.total, 21);
        assert_eq!(evaluator.legal_actions(&hand, 6), vec![Action::Stand]);

        let no_one_card_rule = Rule {
            one_card_after_split_aces: false,
            ..Default::default()
        };
        let evaluator = PlayerHandEvaluator::new(&no_one_card_rule);
        let hand = HandState::split_hand(10, 1, 1, &no_one_card_rule);
        assert_eq!(evaluator.legal_actions(&hand, 6), vec![Action::Stand]);
    }

    #[test]
    fn split_aces_take_one_card() {
        let rule = Rule::default();
        let evaluator = PlayerHandEvaluator::new(&rule);
        let hand = HandState::split_hand(1, 1, 1, &rule);
        assert_eq!(evaluator.legal_actions(&hand, 6), vec![Action::Stand]);
        let hand = HandState::split_hand(1, 5, 1, &rule);
        assert_eq!(evaluator.legal_actions(&hand, 6), vec![Action::Stand]);

        let rule = Rule {
            allow_resplit_aces: true,
            ..Default::default()
        };
        let evaluator = PlayerHandEvaluator::new(&rule);
        let hand = HandState::split_hand(1, 1, 1, &rule);
        assert_eq!(
            evaluator.legal_actions(&hand, 6),
            vec![Action::Split, Action::Stand]
        );
        let hand = HandState::split_hand(1, 1, MAX_SPLIT_DEPTH, &rule);
        assert_eq!(evaluator.legal_actions(&hand, 6), vec![Action::Stand]);
    }

    #[test]
    fn split_depth_limits() {
        let rule = Rule::default();
        let evaluator = PlayerHandEvaluator::new(&rule);
        assert!(evaluator.can_split(8, 0));
        assert!(evaluator.can_split(8, MAX_SPLIT_DEPTH - 1));
        assert!(!evaluator.can_split(8, MAX_SPLIT_DEPTH));
        assert!(evaluator.can_split(1, 0));
        assert!(!evaluator.can_split(1, 1));

        let rule = Rule {
            allow_split_aces: false,
            ..Default::default()
        };
        let evaluator = PlayerHandEvaluator::new(&rule);
        assert!(!evaluator.can_split(1, 0));
    }

    #[test]
    fn busted_hands_lose() {
        let rule = csm_rule();
        let mut evaluator = PlayerHandEvaluator::new(&rule);
        let shoe = CardCount::with_number_of_decks(6);
        let hand = HandState::from_cards(10, 6).after_hit(10);
        assert!(evaluator.legal_actions(&hand, 6).is_empty());
        assert_eq!(evaluator.max_expectation(&hand, 6, &shoe), -1.0);
    }

    #[test]
    #[should_panic(expected = "busted total")]
    fn standing_on_bust_panics() {
        PlayerHandEvaluator::stand_ev(22, &DealerOutcomeDistribution::default());
    }

    #[test]
    #[should_panic(expected = "Invalid rule")]
    fn invalid_rule_panics() {
        let rule = Rule {
            number_of_decks: 5,
            ..Default::default()
        };
        PlayerHandEvaluator::new(&rule);
    }

    #[test]
    fn memo_is_reused() {
        let rule = csm_rule();
        let mut evaluator = PlayerHandEvaluator::new(&rule);
        let shoe = CardCount::with_number_of_decks(6);
        let hand = HandState::from_cards(10, 2);
        let first = evaluator.hit_ev(&hand, 6, &shoe);
        let cached = evaluator.cache_len();
        assert!(cached > 0);
        assert!(evaluator.dealer_cache_len() > 0);
        assert_eq!(evaluator.hit_ev(&hand, 6, &shoe), first);
        assert_eq!(evaluator.cache_len(), cached);
    }
}
