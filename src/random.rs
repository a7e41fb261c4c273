use std::collections::BTreeMap;

use fastrand::Rng;
use tracing::debug;

use crate::{machine::Symbol, math, Machine};

/// The alphabet `a`, `b`, `c`, ... of the given size. Sizes beyond 26 continue with
/// `a1`, `b1`, ...
pub fn alphabet_of_size(symbols: usize) -> Vec<Symbol> {
    (0..symbols)
        .map(|i| {
            let letter = (b'a' + (i % 26) as u8) as char;
            match i / 26 {
                0 => letter.to_string(),
                n => format!("{letter}{n}"),
            }
        })
        .collect()
}

/// Parameters for [`generate_random_machine`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RandomMachineConfig {
    /// Number of states.
    pub states: usize,
    /// Number of symbols in the alphabet.
    pub symbols: usize,
    /// Probability that a given state reads a given symbol into a given target state.
    pub density: f64,
    /// Probability that a given state has an epsilon transition into a given target state.
    pub epsilon: f64,
    /// Probability that a state is accepting.
    pub accepting: f64,
    /// Number of initial states, at most `states`.
    pub initial: usize,
}

impl Default for RandomMachineConfig {
    fn default() -> Self {
        Self {
            states: 4,
            symbols: 2,
            density: 0.3,
            epsilon: 0.05,
            accepting: 0.3,
            initial: 1,
        }
    }
}

/// Generates a random, in general nondeterministic machine. For every pair of states and every
/// symbol, a transition is inserted with probability `density`, and an epsilon transition
/// with probability `epsilon`. Transitions between the same pair of states share one link.
/// The first `initial` states are initial.
pub fn generate_random_machine(config: &RandomMachineConfig, rng: &mut Rng) -> Machine {
    let alphabet = alphabet_of_size(config.symbols);
    let mut machine = Machine::new("m1");
    machine.set_alphabet(alphabet.clone(), Some(config.epsilon > 0.0));

    let nodes = (0..config.states)
        .map(|i| {
            let position = ((i % 5) as f64 * 100.0, (i / 5) as f64 * 100.0);
            machine.add_node(
                position,
                format!("q{i}"),
                i < config.initial,
                rng.f64() < config.accepting,
            )
        })
        .collect::<Vec<_>>();

    for &source in &nodes {
        for &target in &nodes {
            let input = alphabet
                .iter()
                .filter(|_| rng.f64() < config.density)
                .cloned()
                .collect::<Vec<_>>();
            let has_epsilon = rng.f64() < config.epsilon;
            if !input.is_empty() || has_epsilon {
                machine.join(source, target, input, BTreeMap::new(), has_epsilon);
            }
        }
    }
    debug!(
        "generated random machine with {} states and {} links",
        machine.node_count(),
        machine.link_count()
    );
    machine
}

/// Generates a random complete deterministic machine with `size` states by drawing a target
/// for every state and symbol and marking each state accepting with probability one half.
/// The first state is initial. Depending on the drawn transitions, some states may be
/// unreachable.
pub fn generate_random_dfa(symbols: usize, size: usize, rng: &mut Rng) -> Machine {
    let alphabet = alphabet_of_size(symbols);
    let mut machine = Machine::new("m1");
    machine.set_alphabet(alphabet.clone(), Some(false));
    let nodes = (0..size)
        .map(|i| machine.add_node((i as f64 * 100.0, 0.0), format!("q{i}"), i == 0, rng.bool()))
        .collect::<Vec<_>>();
    for &source in &nodes {
        for symbol in &alphabet {
            let target = nodes[rng.usize(..size)];
            machine.join(source, target, [symbol.clone()], BTreeMap::new(), false);
        }
    }
    machine
}

/// Generates a random word over `alphabet` whose length is drawn uniformly from
/// `min_len..=max_len`.
pub fn generate_random_word(
    alphabet: &[Symbol],
    min_len: usize,
    max_len: usize,
    rng: &mut Rng,
) -> Vec<Symbol> {
    if alphabet.is_empty() {
        return vec![];
    }
    let length = rng.usize(min_len..=max_len);
    (0..length)
        .map(|_| alphabet[rng.usize(..alphabet.len())].clone())
        .collect()
}

/// Generates `number` distinct random words over `alphabet`, see [`generate_random_word`].
/// Asking for more words than there are in the range never returns.
pub fn generate_random_words(
    alphabet: &[Symbol],
    min_len: usize,
    max_len: usize,
    number: usize,
    rng: &mut Rng,
) -> math::Set<Vec<Symbol>> {
    let mut words = math::Set::with_capacity_and_hasher(number, Default::default());
    while words.len() < number {
        words.insert(generate_random_word(alphabet, min_len, max_len, rng));
    }
    words
}
