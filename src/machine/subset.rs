use std::collections::BTreeMap;

use itertools::Itertools;
use tracing::{debug, trace};

use super::{Machine, NodeId, StateSet, Symbol};
use crate::math::{Map, OrderedMap};

/// A state of the deterministic machine under construction.
struct Subset {
    name: String,
    is_initial: bool,
    is_accepting: bool,
    position: (f64, f64),
    successors: Vec<(Symbol, StateSet)>,
}

impl Machine {
    /// The name of the deterministic state standing for `states`. A single state keeps its
    /// name, larger sets are named `{a, b, ...}` unless one of their members is unnamed.
    fn subset_name(&self, states: &StateSet) -> String {
        let names = states
            .iter()
            .filter_map(|s| self.nodes.get(s))
            .map(|n| n.name.as_str())
            .collect_vec();
        match names.as_slice() {
            [single] => single.to_string(),
            names if names.iter().any(|n| n.is_empty()) => String::new(),
            names => format!("{{{}}}", names.join(", ")),
        }
    }

    fn subset_position(&self, states: &StateSet) -> (f64, f64) {
        let (count, x, y) = states
            .iter()
            .filter_map(|s| self.nodes.get(s))
            .fold((0usize, 0.0, 0.0), |(c, x, y), n| (c + 1, x + n.x, y + n.y));
        if count == 0 {
            (0.0, 0.0)
        } else {
            (x / count as f64, y / count as f64)
        }
    }

    /// Turns the machine into an equivalent deterministic one using the subset construction.
    ///
    /// Every set of states that is reachable from the epsilon closure of the initial states
    /// becomes one state, which is accepting if any of its members is. Reading a symbol that
    /// leads to the empty set has no transition, so the result is in general not completely
    /// specified. The alphabet is enforced first and transducer output is lost. A machine
    /// without initial states ends up with no states at all.
    pub fn convert_to_dfa(&mut self) {
        self.enforce_alphabet();
        let start = self.start().states;

        let mut subsets: OrderedMap<StateSet, Subset> = OrderedMap::default();
        let mut pending = vec![];
        if !start.is_empty() {
            pending.push(start.clone());
        }

        while let Some(states) = pending.pop() {
            if subsets.contains_key(&states) {
                continue;
            }
            let mut successors = vec![];
            for symbol in &self.alphabet {
                let next = self.step_from(&states, symbol).states;
                if !next.is_empty() {
                    pending.push(next.clone());
                    successors.push((symbol.clone(), next));
                }
            }
            trace!(
                "subset {{{}}} has {} successors",
                states.iter().join(", "),
                successors.len()
            );
            let subset = Subset {
                name: self.subset_name(&states),
                is_initial: states == start,
                is_accepting: self.is_accepting_set(&states),
                position: self.subset_position(&states),
                successors,
            };
            subsets.insert(states, subset);
        }

        let before = self.node_count();
        self.delete_all_nodes();
        let mut ids: Map<&StateSet, NodeId> = Map::default();
        for (states, subset) in &subsets {
            let id = self.add_node(
                subset.position,
                subset.name.clone(),
                subset.is_initial,
                subset.is_accepting,
            );
            ids.insert(states, id);
        }
        for (states, subset) in &subsets {
            let Some(&source) = ids.get(states) else {
                continue;
            };
            for (symbol, next) in &subset.successors {
                if let Some(&target) = ids.get(next) {
                    self.join(source, target, [symbol.clone()], BTreeMap::new(), false);
                }
            }
        }
        debug!(
            "determinized machine {} from {before} to {} states",
            self.id,
            self.node_count()
        );
    }

    /// Returns true if no state has an epsilon transition and no state has two transitions
    /// on the same symbol.
    pub fn is_deterministic(&self) -> bool {
        self.initial_node_count() <= 1
            && self.nodes.keys().all(|&node| {
                let mut seen = crate::math::Set::default();
                self.outgoing(node)
                    .all(|l| !l.has_epsilon && l.input.iter().all(|s| seen.insert(s)))
            })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use itertools::Itertools;

    use super::*;
    use crate::machine::simulation::tests::{ends_in_a, words};

    /// Accepts words over `a`, `b` whose third-to-last symbol is `a`.
    fn third_last_is_a() -> Machine {
        let mut m = Machine::new("m1");
        m.set_alphabet(["a", "b"], None);
        let q = (0..4)
            .map(|i| m.add_node((i as f64 * 10.0, 0.0), format!("q{i}"), i == 0, i == 3))
            .collect_vec();
        m.add_link(q[0], q[0], vec!["a".into(), "b".into()], BTreeMap::new(), false)
            .unwrap();
        m.add_link(q[0], q[1], vec!["a".into()], BTreeMap::new(), false)
            .unwrap();
        m.add_link(q[1], q[2], vec!["a".into(), "b".into()], BTreeMap::new(), false)
            .unwrap();
        m.add_link(q[2], q[3], vec!["a".into(), "b".into()], BTreeMap::new(), false)
            .unwrap();
        m
    }

    #[test_log::test]
    fn determinization_preserves_language() {
        let nfa = third_last_is_a();
        assert!(!nfa.is_deterministic());
        let mut dfa = nfa.clone();
        dfa.convert_to_dfa();
        assert!(dfa.is_deterministic());
        assert_eq!(dfa.node_count(), 8);
        for word in words(&["a", "b"], 6) {
            assert_eq!(nfa.accepts_pure(&word), dfa.accepts_pure(&word), "{word:?}");
        }
    }

    #[test]
    fn subsets_are_named_after_members() {
        let mut m = third_last_is_a();
        m.convert_to_dfa();
        let names = m.nodes().map(|n| n.name().to_string()).collect_vec();
        assert_eq!(names[0], "q0");
        assert!(names.contains(&"{q0, q1}".to_string()));
        assert!(names.contains(&"{q0, q1, q2, q3}".to_string()));
        let initial = m.nodes().filter(|n| n.is_initial()).collect_vec();
        assert_eq!(initial.len(), 1);
        assert_eq!(initial[0].position(), (0.0, 0.0));
    }

    #[test]
    fn unnamed_member_clears_name() {
        let mut m = Machine::new("m1");
        m.set_alphabet(["a"], None);
        let s = m.add_node((0.0, 0.0), "s", true, false);
        let t = m.add_node((10.0, 20.0), "", true, true);
        m.add_link(s, t, vec!["a".into()], BTreeMap::new(), false)
            .unwrap();
        m.convert_to_dfa();
        let start = m.nodes().find(|n| n.is_initial()).unwrap();
        assert_eq!(start.name(), "");
        assert_eq!(start.position(), (5.0, 10.0));
        assert!(start.is_accepting());
    }

    #[test]
    fn epsilon_links_are_removed() {
        let mut m = Machine::new("m1");
        m.set_alphabet(["a"], Some(true));
        let s = m.add_node((0.0, 0.0), "S", true, false);
        let f = m.add_node((0.0, 0.0), "F", false, true);
        m.add_link(s, f, vec![], BTreeMap::new(), true).unwrap();
        m.add_link(f, s, vec!["a".into()], BTreeMap::new(), false)
            .unwrap();
        m.convert_to_dfa();
        assert_eq!(m.node_count(), 1);
        assert!(m.links().all(|l| !l.has_epsilon()));
        assert!(m.accepts(Vec::<&str>::new()));
        assert!(m.accepts(["a", "a"]));
    }

    #[test]
    fn no_initial_state_gives_empty_machine() {
        let mut m = ends_in_a();
        for id in m.node_ids() {
            if m.node(id).unwrap().is_initial() {
                m.toggle_initial(id).unwrap();
            }
        }
        m.convert_to_dfa();
        assert_eq!(m.node_count(), 0);
        assert_eq!(m.link_count(), 0);
    }

    #[test]
    fn parallel_symbols_share_a_link() {
        let mut m = ends_in_a();
        m.convert_to_dfa();
        assert_eq!(m.node_count(), 2);
        assert!(m.links().any(|l| l.is_reflexive()));
        for node in m.nodes() {
            assert!(m.outgoing(node.id()).count() <= 2);
        }
    }
}
