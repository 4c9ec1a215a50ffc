use std::collections::HashMap;
use std::hash::Hash;
use std::ops::Index;

const BITS_PER_CARD_VALUE: u32 = 12;
const MAX_CARDS_PER_VALUE: u16 = (1 << BITS_PER_CARD_VALUE) - 1;
const SIGNATURE_UNITS: [u128; 10] = get_signature_units();

const fn get_signature_units() -> [u128; 10] {
    let mut ret: [u128; 10] = [0; 10];

    let mut i = 0;
    while i < ret.len() {
        ret[i] = 1u128 << (BITS_PER_CARD_VALUE * i as u32);
        i += 1;
    }

    ret
}

/// The number of cards of each card value (from 1 to 10 inclusive, 1 being the Ace
/// and 10 covering 10/J/Q/K) left in a shoe.
///
/// The signature packs the whole count vector into 12-bit lanes of a `u128`, so two
/// compositions share a signature exactly when they hold the same cards. It is kept
/// up to date on every add/remove and is what the solvers memoize on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CardCount {
    counts: [u16; 10],
    signature: u128,
    total: u16,
}

impl CardCount {
    /// Panics if a count does not fit in a signature lane.
    pub fn new(counts: &[u16; 10]) -> CardCount {
        let mut card_count = CardCount {
            counts: *counts,
            signature: 0,
            total: 0,
        };

        card_count.propagate_counts();

        card_count
    }

    pub fn with_number_of_decks(number_of_decks: u8) -> CardCount {
        let mut counts = [number_of_decks as u16 * 4; 10];
        counts[9] = number_of_decks as u16 * 16;
        Self::new(&counts)
    }

    /// Add a card of given card value.
    ///
    /// Note that this method won't check if the card value is valid.
    pub fn add_card(&mut self, card_value: u8) {
        let index = (card_value - 1) as usize;
        if self.counts[index] == MAX_CARDS_PER_VALUE {
            panic!("Too many cards of value {card_value} for a shoe signature");
        }
        self.counts[index] += 1;
        self.signature += SIGNATURE_UNITS[index];
        self.total += 1;
    }

    /// Remove a card of given card value.
    ///
    /// Panics if no card of this value is left.
    pub fn remove_card(&mut self, card_value: u8) {
        let index = (card_value - 1) as usize;
        if self.counts[index] == 0 {
            panic!("Cannot remove a card of value {card_value}: none left in the shoe");
        }
        self.counts[index] -= 1;
        self.signature -= SIGNATURE_UNITS[index];
        self.total -= 1;
    }

    pub fn get_total(&self) -> u16 {
        self.total
    }

    pub fn signature(&self) -> u128 {
        self.signature
    }

    /// Proportion of the remaining cards that have the given value.
    pub fn get_proportion(&self, card_value: u8) -> f64 {
        if self.total == 0 {
            panic!("Cannot draw from an empty shoe");
        }
        self[card_value] as f64 / self.total as f64
    }

    fn propagate_counts(&mut self) {
        self.signature = 0;
        self.total = 0;
        for i in 0..self.counts.len() {
            if self.counts[i] > MAX_CARDS_PER_VALUE {
                panic!(
                    "Too many cards of value {} for a shoe signature: {}",
                    i + 1,
                    self.counts[i]
                );
            }
            self.signature += (self.counts[i] as u128) * SIGNATURE_UNITS[i];
            self.total += self.counts[i];
        }
    }
}

impl Index<u8> for CardCount {
    type Output = u16;
    fn index(&self, index: u8) -> &Self::Output {
        &self.counts[(index - 1) as usize]
    }
}

/// Memoization table indexed by a solver state together with the shoe the state
/// was reached with.
#[derive(Debug, Clone)]
pub struct StateArray<K, T> {
    data: HashMap<(K, u128), T>,
}

impl<K: Eq + Hash, T> StateArray<K, T> {
    pub fn new() -> StateArray<K, T> {
        StateArray {
            data: HashMap::new(),
        }
    }

    pub fn get(&self, key: K, shoe: &CardCount) -> Option<&T> {
        self.data.get(&(key, shoe.signature))
    }

    pub fn insert(&mut self, key: K, shoe: &CardCount, value: T) {
        self.data.insert((key, shoe.signature), value);
    }

    pub fn contains_state(&self, key: K, shoe: &CardCount) -> bool {
        self.data.contains_key(&(key, shoe.signature))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<K: Eq + Hash, T> Default for StateArray<K, T> {
    fn default() -> Self {
        Self::new()
    }
}
