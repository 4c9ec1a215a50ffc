use crate::{
    card_label, Action, ActionExpectations, CardCount, HandCategory, HandState,
    PlayerHandEvaluator, Rule, DEALER_UP_CARDS,
};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info, trace};

const HARD_TOTALS: std::ops::RangeInclusive<u8> = 5..=20;
const SOFT_TOTALS: std::ops::RangeInclusive<u8> = 13..=20;
const PAIR_RANKS: [u8; 10] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10];

/// A row of the charts: a hard or soft total, or the rank of a pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct HandDescriptor {
    pub category: HandCategory,
    pub key: u8,
}

impl HandDescriptor {
    pub fn label(&self) -> String {
        match self.category {
            HandCategory::Pair => card_label(self.key),
            HandCategory::Hard | HandCategory::Soft => self.key.to_string(),
        }
    }

    /// The two cards dealt for this row.
    pub fn representative_cards(&self) -> (u8, u8) {
        match self.category {
            HandCategory::Hard if self.key <= 11 => (2, self.key - 2),
            HandCategory::Hard => (10, self.key - 10),
            HandCategory::Soft => (1, self.key - 11),
            HandCategory::Pair => (self.key, self.key),
        }
    }

    pub fn initial_hand(&self) -> HandState {
        let (card0, card1) = self.representative_cards();
        let hand = HandState::from_cards(card0, card1);
        match self.category {
            // Hard 20 is dealt as 10-10 but played without the split.
            HandCategory::Pair => hand,
            HandCategory::Hard | HandCategory::Soft => hand.without_pair(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct StrategyCell {
    pub hand: HandDescriptor,
    pub dealer_up_card: u8,
    pub action: Action,
    pub expectations: ActionExpectations,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StrategyRow {
    pub hand: HandDescriptor,
    /// One cell per dealer up card, in `DEALER_UP_CARDS` order.
    pub cells: Vec<StrategyCell>,
}

/// Chart form of the tables: row label -> up card label -> action.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StrategyCharts {
    pub rule: Rule,
    pub hard: BTreeMap<String, BTreeMap<String, Action>>,
    pub soft: BTreeMap<String, BTreeMap<String, Action>>,
    pub pairs: BTreeMap<String, BTreeMap<String, Action>>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StrategyTables {
    pub rule: Rule,
    pub hard: Vec<StrategyRow>,
    pub soft: Vec<StrategyRow>,
    pub pairs: Vec<StrategyRow>,
}

impl StrategyTables {
    pub fn rows(&self, category: HandCategory) -> &[StrategyRow] {
        match category {
            HandCategory::Hard => &self.hard,
            HandCategory::Soft => &self.soft,
            HandCategory::Pair => &self.pairs,
        }
    }

    pub fn cell(&self, category: HandCategory, key: u8, dealer_up_card: u8) -> Option<&StrategyCell> {
        self.rows(category)
            .iter()
            .find(|row| row.hand.key == key)?
            .cells
            .iter()
            .find(|cell| cell.dealer_up_card == dealer_up_card)
    }

    pub fn action(&self, category: HandCategory, key: u8, dealer_up_card: u8) -> Option<Action> {
        self.cell(category, key, dealer_up_card).map(|cell| cell.action)
    }

    pub fn cell_count(&self) -> usize {
        [&self.hard, &self.soft, &self.pairs]
            .iter()
            .flat_map(|rows| rows.iter())
            .map(|row| row.cells.len())
            .sum()
    }

    pub fn charts(&self) -> StrategyCharts {
        fn chart(rows: &[StrategyRow]) -> BTreeMap<String, BTreeMap<String, Action>> {
            rows.iter()
                .map(|row| {
                    let actions = row
                        .cells
                        .iter()
                        .map(|cell| (card_label(cell.dealer_up_card), cell.action))
                        .collect();
                    (row.hand.label(), actions)
                })
                .collect()
        }

        StrategyCharts {
            rule: self.rule,
            hard: chart(&self.hard),
            soft: chart(&self.soft),
            pairs: chart(&self.pairs),
        }
    }
}

pub struct StrategyTableBuilder {
    rule: Rule,
}

impl StrategyTableBuilder {
    /// Panics if the rule does not validate.
    pub fn new(rule: Rule) -> Self {
        if let Err(e) = rule.validate() {
            panic!("Invalid rule: {e}");
        }
        Self { rule }
    }

    /// Every chart row: hard 5 to 20, soft 13 to 20, then pairs of A and 2 to 10.
    pub fn hands() -> Vec<HandDescriptor> {
        let hard = HARD_TOTALS.map(|key| HandDescriptor {
            category: HandCategory::Hard,
            key,
        });
        let soft = SOFT_TOTALS.map(|key| HandDescriptor {
            category: HandCategory::Soft,
            key,
        });
        let pairs = PAIR_RANKS.into_iter().map(|key| HandDescriptor {
            category: HandCategory::Pair,
            key,
        });
        hard.chain(soft).chain(pairs).collect()
    }

    pub fn build(&self) -> StrategyTables {
        let start = Instant::now();
        info!(rule = ?self.rule, "building strategy tables");

        let hands = Self::hands();
        let columns: Vec<Vec<StrategyCell>> = DEALER_UP_CARDS
            .par_iter()
            .map(|dealer_up_card| self.solve_column(*dealer_up_card, &hands))
            .collect();

        let mut tables = StrategyTables {
            rule: self.rule,
            hard: Vec::new(),
            soft: Vec::new(),
            pairs: Vec::new(),
        };
        for (i, hand) in hands.iter().enumerate() {
            let row = StrategyRow {
                hand: *hand,
                cells: columns.iter().map(|column| column[i]).collect(),
            };
            match hand.category {
                HandCategory::Hard => tables.hard.push(row),
                HandCategory::Soft => tables.soft.push(row),
                HandCategory::Pair => tables.pairs.push(row),
            }
        }

        info!(
            cells = tables.cell_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "strategy tables built"
        );
        tables
    }

    fn solve_column(&self, dealer_up_card: u8, hands: &[HandDescriptor]) -> Vec<StrategyCell> {
        let start = Instant::now();
        let mut evaluator = PlayerHandEvaluator::new(&self.rule);
        let cells: Vec<StrategyCell> = hands
            .iter()
            .map(|hand| self.solve_cell(&mut evaluator, hand, dealer_up_card))
            .collect();
        debug!(
            dealer_up_card,
            player_states = evaluator.cache_len(),
            dealer_states = evaluator.dealer_cache_len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "solved up card column"
        );
        cells
    }

    fn solve_cell(
        &self,
        evaluator: &mut PlayerHandEvaluator,
        hand: &HandDescriptor,
        dealer_up_card: u8,
    ) -> StrategyCell {
        let (card0, card1) = hand.representative_cards();
        let shoe_model = evaluator.shoe_model();
        let mut shoe = CardCount::with_number_of_decks(self.rule.number_of_decks);
        for card_value in [card0, card1, dealer_up_card] {
            shoe = shoe_model.with_card_removed(card_value, &shoe);
        }

        let expectations = evaluator.evaluate(&hand.initial_hand(), dealer_up_card, &shoe);
        let (action, ex) = match expectations.best() {
            Some(best) => best,
            None => panic!("No legal action for {:?} {}", hand.category, hand.label()),
        };
        trace!(
            category = ?hand.category,
            hand = %hand.label(),
            dealer_up_card,
            ?action,
            ex,
            "solved cell"
        );

        StrategyCell {
            hand: *hand,
            dealer_up_card,
            action,
            expectations,
        }
    }
}
