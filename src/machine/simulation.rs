use std::collections::VecDeque;

use itertools::Itertools;
use tracing::trace;

use super::{LinkId, Machine, Node, NodeId, StateSet};
use crate::math::Set;

/// The result of closing a set of states under epsilon transitions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Closure {
    /// All states in the closure, including the ones it started from.
    pub states: StateSet,
    /// The epsilon links that were traversed, in the order they were discovered.
    pub links: Vec<LinkId>,
}

/// The result of reading one symbol from a set of states.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Step {
    /// The states after reading the symbol and closing under epsilon transitions.
    pub states: StateSet,
    /// The links that read the symbol.
    pub symbol_links: Vec<LinkId>,
    /// The epsilon links that were followed afterwards.
    pub epsilon_links: Vec<LinkId>,
}

impl Step {
    /// All links used in this step, epsilon links last.
    pub fn links(&self) -> impl Iterator<Item = LinkId> + '_ {
        self.symbol_links
            .iter()
            .chain(self.epsilon_links.iter())
            .copied()
    }
}

/// These functions never modify the machine, they compute with explicitly given state sets.
impl Machine {
    /// The set of all initial states, without following epsilon transitions.
    pub fn initial_states(&self) -> StateSet {
        self.nodes
            .values()
            .filter(|n| n.is_initial)
            .map(|n| n.id)
            .collect()
    }

    /// Returns true if at least one of the states is accepting. This is false for an empty set.
    pub fn is_accepting_set(&self, states: &StateSet) -> bool {
        states
            .iter()
            .filter_map(|s| self.nodes.get(s))
            .any(|n| n.is_accepting)
    }

    /// Computes all states reachable from `states` using only epsilon transitions.
    ///
    /// This is a breadth-first search that never enqueues a state twice, so epsilon cycles
    /// are harmless.
    pub fn epsilon_closure(&self, states: &StateSet) -> Closure {
        let mut seen: Set<NodeId> = states.iter().copied().collect();
        let mut queue: VecDeque<NodeId> = states.iter().copied().collect();
        let mut closure = Closure {
            states: states.clone(),
            links: vec![],
        };

        while let Some(node) = queue.pop_front() {
            for link in self.outgoing(node).filter(|l| l.has_epsilon) {
                closure.links.push(link.id);
                if seen.insert(link.target) {
                    trace!("epsilon link {} leads to new state {}", link.id, link.target);
                    closure.states.insert(link.target);
                    queue.push_back(link.target);
                }
            }
        }
        closure
    }

    /// All states reachable from one of `states` by reading `symbol`, together with the links
    /// that were used. Epsilon transitions are not followed.
    pub fn successors(&self, states: &StateSet, symbol: &str) -> (StateSet, Vec<LinkId>) {
        let mut targets = StateSet::new();
        let mut links = vec![];
        for &state in states {
            let (nodes, used) = self.reachable(state, symbol);
            targets.extend(nodes);
            links.extend(used);
        }
        (targets, links)
    }

    /// Reads `symbol` from `states` and closes the result under epsilon transitions.
    pub fn step_from(&self, states: &StateSet, symbol: &str) -> Step {
        let (targets, symbol_links) = self.successors(states, symbol);
        let Closure { states, links } = self.epsilon_closure(&targets);
        Step {
            states,
            symbol_links,
            epsilon_links: links,
        }
    }

    /// The epsilon closure of the initial states, which is where every execution begins.
    pub fn start(&self) -> Closure {
        self.epsilon_closure(&self.initial_states())
    }

    /// Runs the machine on `input` starting from the initial states and returns the set of
    /// states it ends up in. Stops early once the set becomes empty.
    pub fn run<I, S>(&self, input: I) -> StateSet
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut states = self.start().states;
        for symbol in input {
            if states.is_empty() {
                break;
            }
            states = self.step_from(&states, symbol.as_ref()).states;
        }
        states
    }

    /// Returns true if running the machine on `input` ends in an accepting state. Unlike
    /// [`Self::accepts`] this leaves the cursor untouched.
    pub fn accepts_pure<I, S>(&self, input: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.is_accepting_set(&self.run(input))
    }
}

/// The interactive execution state of a machine: the states it is currently in and the links
/// used by the most recent move. The presentation layer highlights these.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cursor {
    current: StateSet,
    links_used: Vec<LinkId>,
    epsilon_links_used: Vec<LinkId>,
    non_eps_links_used: Vec<LinkId>,
}

impl Cursor {
    /// The states the machine is currently in.
    pub fn current(&self) -> &StateSet {
        &self.current
    }

    /// All links used by the most recent move.
    pub fn links_used(&self) -> &[LinkId] {
        &self.links_used
    }

    /// The epsilon links used by the most recent move.
    pub fn epsilon_links_used(&self) -> &[LinkId] {
        &self.epsilon_links_used
    }

    /// The links that read a symbol in the most recent move.
    pub fn non_eps_links_used(&self) -> &[LinkId] {
        &self.non_eps_links_used
    }

    pub(super) fn forget(&mut self, node: NodeId) {
        self.current.remove(&node);
    }

    fn apply(&mut self, step: Step) {
        self.links_used = step.links().collect();
        self.current = step.states;
        self.non_eps_links_used = step.symbol_links;
        self.epsilon_links_used = step.epsilon_links;
    }
}

/// Stateful wrappers around the pure functions that move the [`Cursor`].
impl Machine {
    /// The cursor of the ongoing execution.
    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Puts the machine into its initial states and follows epsilon transitions from there.
    pub fn set_to_initial_state(&mut self) {
        self.set_to_state(self.initial_states());
    }

    /// Puts the machine into exactly the given states and follows epsilon transitions from
    /// there. Unknown ids are ignored.
    pub fn set_to_state<I: IntoIterator<Item = NodeId>>(&mut self, states: I) {
        let states = states
            .into_iter()
            .filter(|s| self.nodes.contains_key(s))
            .collect();
        self.cursor.apply(Step {
            states,
            ..Default::default()
        });
        self.follow_epsilon_transitions();
    }

    /// Extends the current states by everything reachable via epsilon transitions and returns
    /// the epsilon links that were traversed.
    pub fn follow_epsilon_transitions(&mut self) -> Vec<LinkId> {
        let Closure { states, links } = self.epsilon_closure(&self.cursor.current);
        self.cursor.current = states;
        self.cursor.epsilon_links_used = links.clone();
        self.cursor.links_used = self
            .cursor
            .non_eps_links_used
            .iter()
            .chain(links.iter())
            .copied()
            .collect();
        links
    }

    /// Reads one symbol from the current states and returns the links used.
    pub fn step(&mut self, symbol: &str) -> Vec<LinkId> {
        let step = self.step_from(&self.cursor.current, symbol);
        trace!(
            "machine {} moved on {symbol} to {{{}}}",
            self.id,
            step.states.iter().join(", ")
        );
        self.cursor.apply(step);
        self.cursor.links_used.clone()
    }

    /// Returns true if the machine is currently in at least one accepting state.
    pub fn is_in_accepting_state(&self) -> bool {
        self.is_accepting_set(&self.cursor.current)
    }

    /// Resets the machine, reads `input` and returns whether it is accepted. This moves the
    /// cursor, use [`Self::accepts_pure`] to keep it in place.
    pub fn accepts<I, S>(&mut self, input: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set_to_initial_state();
        for symbol in input {
            if self.cursor.current.is_empty() {
                return false;
            }
            self.step(symbol.as_ref());
        }
        self.is_in_accepting_state()
    }

    /// The ids of the states the machine is currently in.
    pub fn current_state(&self) -> Vec<NodeId> {
        self.cursor.current.iter().copied().collect()
    }

    /// The nodes the machine is currently in.
    pub fn current_node_list(&self) -> Vec<&Node> {
        self.cursor
            .current
            .iter()
            .filter_map(|s| self.nodes.get(s))
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::BTreeMap;

    use itertools::Itertools;

    use super::*;
    use crate::machine::Symbol;

    fn syms(s: &str) -> Vec<Symbol> {
        s.chars().map(|c| c.to_string()).collect()
    }

    /// All words over `alphabet` up to length `max`.
    pub(crate) fn words(alphabet: &[&str], max: usize) -> Vec<Vec<String>> {
        (1..=max)
            .flat_map(|len| {
                (0..len)
                    .map(|_| alphabet.iter().map(|s| s.to_string()))
                    .multi_cartesian_product()
                    .collect_vec()
            })
            .chain(std::iter::once(vec![]))
            .collect()
    }

    /// The machine accepting all words over `a` and `b` that end in `a`.
    pub(crate) fn ends_in_a() -> Machine {
        let mut m = Machine::new("m1");
        m.set_alphabet(["a", "b"], None);
        let s = m.add_node((0.0, 0.0), "S", true, false);
        let f = m.add_node((100.0, 0.0), "F", false, true);
        m.add_link(s, s, syms("b"), BTreeMap::new(), false).unwrap();
        m.add_link(s, f, syms("a"), BTreeMap::new(), false).unwrap();
        m.add_link(f, f, syms("a"), BTreeMap::new(), false).unwrap();
        m.add_link(f, s, syms("b"), BTreeMap::new(), false).unwrap();
        m
    }

    #[test_log::test]
    fn accepts_words_ending_in_a() {
        let mut m = ends_in_a();
        assert!(m.accepts(["a"]));
        assert!(!m.accepts(["b"]));
        assert!(m.accepts(["b", "a"]));
        assert!(!m.accepts(Vec::<&str>::new()));
        assert!(m.accepts_pure(syms("abba")));
        assert!(!m.accepts_pure(syms("abab")));
    }

    #[test]
    fn epsilon_closure_reaches_accepting_state() {
        let mut m = Machine::new("m1");
        let s = m.add_node((0.0, 0.0), "S", true, false);
        let f = m.add_node((0.0, 0.0), "F", false, true);
        let eps = m.add_link(s, f, vec![], BTreeMap::new(), true).unwrap();
        m.set_to_initial_state();
        assert!(m.is_in_accepting_state());
        assert_eq!(m.current_state(), vec![s, f]);
        assert_eq!(m.cursor().epsilon_links_used(), [eps]);
    }

    #[test]
    fn epsilon_cycles_terminate() {
        let mut m = Machine::new("m1");
        let a = m.add_node((0.0, 0.0), "", true, false);
        let b = m.add_node((0.0, 0.0), "", false, false);
        let c = m.add_node((0.0, 0.0), "", false, true);
        m.add_link(a, b, vec![], BTreeMap::new(), true).unwrap();
        m.add_link(b, a, vec![], BTreeMap::new(), true).unwrap();
        m.add_link(b, c, vec![], BTreeMap::new(), true).unwrap();
        m.add_link(c, c, vec![], BTreeMap::new(), true).unwrap();
        let closure = m.start();
        assert_eq!(closure.states, StateSet::from([a, b, c]));
        assert_eq!(closure.links.len(), 4);
    }

    #[test]
    fn empty_state_set_short_circuits() {
        let mut m = ends_in_a();
        assert!(!m.accepts(["c", "a"]));
        assert!(m.current_state().is_empty());
        assert!(!m.is_in_accepting_state());
    }

    #[test]
    fn step_records_links() {
        let mut m = ends_in_a();
        m.set_to_initial_state();
        let used = m.step("a");
        assert_eq!(used.len(), 1);
        assert_eq!(m.cursor().non_eps_links_used(), used.as_slice());
        assert!(m.cursor().epsilon_links_used().is_empty());
        assert_eq!(m.current_node_list()[0].name(), "F");
    }

    #[test]
    fn cursor_keeps_symbol_and_epsilon_links_of_a_step() {
        let mut m = Machine::new("m1");
        m.set_alphabet(["a"], None);
        let s = m.add_node((0.0, 0.0), "S", true, false);
        let mid = m.add_node((0.0, 0.0), "M", false, false);
        let f = m.add_node((0.0, 0.0), "F", false, true);
        let read = m.add_link(s, mid, syms("a"), BTreeMap::new(), false).unwrap();
        let eps = m.add_link(mid, f, vec![], BTreeMap::new(), true).unwrap();
        m.set_to_initial_state();
        m.step("a");
        assert_eq!(m.current_state(), vec![mid, f]);
        assert_eq!(m.cursor().links_used(), [read, eps]);
        assert_eq!(m.cursor().non_eps_links_used(), [read]);
        assert_eq!(m.cursor().epsilon_links_used(), [eps]);
        assert!(m.is_in_accepting_state());
    }
}
