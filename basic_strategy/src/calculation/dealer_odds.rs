use super::add_card_value;
use crate::{CardCount, Rule, ShoeModel, StateArray};
use strum_macros::EnumIter;

const PROBABILITY_TOLERANCE: f64 = 1e-9;

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter)]
pub enum DealerOutcome {
    Total17 = 0,
    Total18,
    Total19,
    Total20,
    Total21,
    Bust,
    /// 21 with the first two cards.
    Blackjack,
}

impl DealerOutcome {
    fn with_total(total: u8) -> DealerOutcome {
        match total {
            17 => DealerOutcome::Total17,
            18 => DealerOutcome::Total18,
            19 => DealerOutcome::Total19,
            20 => DealerOutcome::Total20,
            21 => DealerOutcome::Total21,
            _ => panic!("Dealer cannot stand on {total}"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DealerOutcomeDistribution {
    probabilities: [f64; 7],
}

impl DealerOutcomeDistribution {
    pub fn probability(&self, outcome: DealerOutcome) -> f64 {
        self.probabilities[outcome as usize]
    }

    pub fn p_bust(&self) -> f64 {
        self.probability(DealerOutcome::Bust)
    }

    pub fn p_blackjack(&self) -> f64 {
        self.probability(DealerOutcome::Blackjack)
    }

    pub fn total_mass(&self) -> f64 {
        self.probabilities.iter().sum()
    }

    /// Probability that the dealer ends up with a hand the player's total beats.
    pub fn p_worse_than_player(&self, player_total: u8) -> f64 {
        let beaten: f64 = (17..=21)
            .filter(|dealer_total| *dealer_total < player_total)
            .map(|dealer_total| self.probability(DealerOutcome::with_total(dealer_total)))
            .sum();
        self.p_bust() + beaten
    }

    /// Probability that the dealer ends up with a hand beating the player's total.
    /// A dealer blackjack beats every player total.
    pub fn p_better_than_player(&self, player_total: u8) -> f64 {
        let better: f64 = (17..=21)
            .filter(|dealer_total| *dealer_total > player_total)
            .map(|dealer_total| self.probability(DealerOutcome::with_total(dealer_total)))
            .sum();
        self.p_blackjack() + better
    }

    fn end_with(outcome: DealerOutcome) -> Self {
        let mut odds = Self::default();
        odds.probabilities[outcome as usize] = 1.0;
        odds
    }

    fn add_assign_with_p(&mut self, rhs: &Self, p: f64) {
        for i in 0..self.probabilities.len() {
            self.probabilities[i] += rhs.probabilities[i] * p;
        }
    }
}

/// Probability of each final dealer hand given the up card and the shoe the
/// dealer draws from.
///
/// The shoe handed in must already exclude the up card and every card the player
/// holds. The first card drawn is the hole card; that is the only draw that can
/// make a blackjack.
pub struct DealerOutcomeSolver<'a> {
    rule: &'a Rule,
    shoe_model: ShoeModel,

    // (dealer total, soft) -> outcome after the dealer keeps drawing.
    drawing_odds: StateArray<(u8, bool), DealerOutcomeDistribution>,
    // (up card, blackjack excluded) -> outcome from the up card alone.
    final_odds: StateArray<(u8, bool), DealerOutcomeDistribution>,
}

impl<'a> DealerOutcomeSolver<'a> {
    pub fn new(rule: &'a Rule, shoe_model: ShoeModel) -> Self {
        Self {
            rule,
            shoe_model,
            drawing_odds: StateArray::new(),
            final_odds: StateArray::new(),
        }
    }

    /// Distribution including the dealer's blackjack.
    pub fn distribution(&mut self, dealer_up_card: u8, shoe: &CardCount) -> DealerOutcomeDistribution {
        self.solve(dealer_up_card, None, shoe)
    }

    /// Distribution given that the dealer does not hold a blackjack, i.e. after a
    /// peek under the up card came back clean.
    pub fn distribution_without_blackjack(
        &mut self,
        dealer_up_card: u8,
        shoe: &CardCount,
    ) -> DealerOutcomeDistribution {
        self.solve(dealer_up_card, Rule::blackjack_hole_card(dealer_up_card), shoe)
    }

    /// Distribution the player's EVs are computed against: conditioned on no dealer
    /// blackjack under the hole-card rule, unconditioned without a hole card, where
    /// doubled and split wagers are still exposed to a dealer blackjack.
    pub fn distribution_for_player(
        &mut self,
        dealer_up_card: u8,
        shoe: &CardCount,
    ) -> DealerOutcomeDistribution {
        self.solve(dealer_up_card, self.rule.peeked_hole_card(dealer_up_card), shoe)
    }

    /// Probability that the two-card deal gives the dealer a blackjack. Every
    /// unconditioned distribution is checked against it.
    pub fn blackjack_probability(&self, dealer_up_card: u8, shoe: &CardCount) -> f64 {
        match Rule::blackjack_hole_card(dealer_up_card) {
            Some(hole_card) => self.shoe_model.probability_of(hole_card, shoe),
            None => 0.0,
        }
    }

    pub fn cache_len(&self) -> usize {
        self.drawing_odds.len() + self.final_odds.len()
    }

    fn solve(
        &mut self,
        dealer_up_card: u8,
        impossible_hole_card: Option<u8>,
        shoe: &CardCount,
    ) -> DealerOutcomeDistribution {
        if dealer_up_card == 0 || dealer_up_card > 10 {
            panic!("Invalid dealer up card! It must be in [1, 10]")
        }
        let state = (dealer_up_card, impossible_hole_card.is_some());
        if let Some(odds) = self.final_odds.get(state, shoe) {
            return *odds;
        }

        let (up_total, up_soft) = add_card_value(0, false, dealer_up_card);
        let mut odds = DealerOutcomeDistribution::default();
        for hole_card in 1..=10 {
            let p = match impossible_hole_card {
                Some(excluded) => self
                    .shoe_model
                    .probability_excluding(hole_card, excluded, shoe),
                None => self.shoe_model.probability_of(hole_card, shoe),
            };
            if p == 0.0 {
                continue;
            }

            let (total, soft) = add_card_value(up_total, up_soft, hole_card);
            let next_state_odds = if total == 21 {
                DealerOutcomeDistribution::end_with(DealerOutcome::Blackjack)
            } else {
                let next_shoe = self.shoe_model.with_card_removed(hole_card, shoe);
                self.dealer_draws(total, soft, &next_shoe)
            };
            odds.add_assign_with_p(&next_state_odds, p);
        }

        let mass = odds.total_mass();
        if (mass - 1.0).abs() > PROBABILITY_TOLERANCE {
            panic!("Dealer outcome probabilities sum to {mass} for up card {dealer_up_card}");
        }
        let expected_blackjack = match impossible_hole_card {
            Some(_) => 0.0,
            None => self.blackjack_probability(dealer_up_card, shoe),
        };
        if (odds.p_blackjack() - expected_blackjack).abs() > PROBABILITY_TOLERANCE {
            panic!(
                "Dealer blackjack mass {} does not match the two-card deal {expected_blackjack} for up card {dealer_up_card}",
                odds.p_blackjack()
            );
        }

        self.final_odds.insert(state, shoe, odds);
        odds
    }

    fn dealer_draws(&mut self, total: u8, soft: bool, shoe: &CardCount) -> DealerOutcomeDistribution {
        // Case 1: Dealer must stand.
        if total > 21 {
            return DealerOutcomeDistribution::end_with(DealerOutcome::Bust);
        }
        if total > 17 || (total == 17 && !(soft && self.rule.dealer_hit_on_soft17)) {
            return DealerOutcomeDistribution::end_with(DealerOutcome::with_total(total));
        }

        if let Some(odds) = self.drawing_odds.get((total, soft), shoe) {
            return *odds;
        }

        // Case 2: Dealer must hit.
        let mut odds = DealerOutcomeDistribution::default();
        for card_value in 1..=10 {
            let p = self.shoe_model.probability_of(card_value, shoe);
            if p == 0.0 {
                continue;
            }

            let (next_total, next_soft) = add_card_value(total, soft, card_value);
            let next_shoe = self.shoe_model.with_card_removed(card_value, shoe);
            let next_state_odds = self.dealer_draws(next_total, next_soft, &next_shoe);
            odds.add_assign_with_p(&next_state_odds, p);
        }

        self.drawing_odds.insert((total, soft), shoe, odds);
        odds
    }
}
