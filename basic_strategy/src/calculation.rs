use crate::Action;
use serde::Serialize;
use strum::IntoEnumIterator;

mod dealer_odds;
mod hand;
mod player_ex;
mod split_ex;

pub use dealer_odds::{DealerOutcome, DealerOutcomeDistribution, DealerOutcomeSolver};
pub(crate) use hand::add_card_value;
pub use hand::{HandCategory, HandState};
pub use player_ex::PlayerHandEvaluator;

/// Expected value per unit of initial bet for every action legal in a situation.
/// Illegal actions are `None`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ActionExpectations {
    pub surrender: Option<f64>,
    pub split: Option<f64>,
    pub double: Option<f64>,
    pub hit: Option<f64>,
    pub stand: Option<f64>,
}

impl ActionExpectations {
    pub fn get(&self, action: Action) -> Option<f64> {
        match action {
            Action::Surrender => self.surrender,
            Action::Split => self.split,
            Action::Double => self.double,
            Action::Hit => self.hit,
            Action::Stand => self.stand,
        }
    }

    pub fn set(&mut self, action: Action, ex: f64) {
        let slot = match action {
            Action::Surrender => &mut self.surrender,
            Action::Split => &mut self.split,
            Action::Double => &mut self.double,
            Action::Hit => &mut self.hit,
            Action::Stand => &mut self.stand,
        };
        *slot = Some(ex);
    }

    /// The legal actions with their EVs, in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (Action, f64)> + '_ {
        Action::iter().filter_map(|action| self.get(action).map(|ex| (action, ex)))
    }

    /// The highest EV. On equal EVs the action earlier in priority order wins.
    pub fn best(&self) -> Option<(Action, f64)> {
        let mut best: Option<(Action, f64)> = None;
        for (action, ex) in self.iter() {
            match best {
                Some((_, max_ex)) if max_ex >= ex => {}
                _ => best = Some((action, ex)),
            }
        }
        best
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{CardCount, Rule};

    pub(crate) fn csm_rule() -> Rule {
        Rule {
            continuous_shuffle: true,
            ..Default::default()
        }
    }

    /// The full shoe of `rule` minus `cards`, as the shoe the first decision is
    /// taken with.
    pub(crate) fn full_shoe_without(rule: &Rule, cards: &[u8]) -> CardCount {
        let mut shoe = CardCount::with_number_of_decks(rule.number_of_decks);
        if !rule.continuous_shuffle {
            for card in cards {
                shoe.remove_card(*card);
            }
        }
        shoe
    }

    #[test]
    fn best_prefers_earlier_action_on_ties() {
        let mut ex = ActionExpectations::default();
        assert_eq!(ex.best(), None);
        assert!(ex.is_empty());

        ex.set(Action::Stand, -0.25);
        ex.set(Action::Hit, -0.25);
        assert_eq!(ex.best(), Some((Action::Hit, -0.25)));

        ex.set(Action::Surrender, -0.5);
        ex.set(Action::Double, 0.1);
        assert_eq!(ex.best(), Some((Action::Double, 0.1)));
        assert_eq!(ex.len(), 4);
        assert_eq!(ex.split, None);
    }

    #[test]
    fn iter_follows_priority_order() {
        let mut ex = ActionExpectations::default();
        ex.set(Action::Stand, 0.0);
        ex.set(Action::Split, 0.0);
        ex.set(Action::Surrender, -0.5);
        let actions: Vec<Action> = ex.iter().map(|(action, _)| action).collect();
        assert_eq!(actions, vec![Action::Surrender, Action::Split, Action::Stand]);
    }
}
