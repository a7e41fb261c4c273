use std::collections::VecDeque;

use tracing::trace;

use super::{Machine, NodeId, Symbol};
use crate::math::Map;

impl Machine {
    /// Returns one of the shortest words the machine accepts, or `None` if it accepts nothing.
    /// An empty word means the empty input is accepted.
    ///
    /// The search runs from the epsilon closure of the initial states. Epsilon links cost
    /// nothing and are explored first, every other link adds the first of its input symbols
    /// to the word. The cursor is not touched.
    pub fn get_accepted_sequence(&self) -> Option<Vec<Symbol>> {
        if self.accepting_node_count() == 0 {
            return None;
        }
        let mut paths: Map<NodeId, Vec<Symbol>> = Map::default();
        let mut queue = VecDeque::new();
        for state in self.start().states {
            paths.insert(state, vec![]);
            queue.push_back(state);
        }

        while let Some(node) = queue.pop_front() {
            let Some(path) = paths.get(&node).cloned() else {
                continue;
            };
            if self.node(node).is_some_and(|n| n.is_accepting) {
                trace!("found accepted word of length {} ending in {node}", path.len());
                return Some(path);
            }
            for link in self.outgoing(node) {
                let (candidate, free) = if link.has_epsilon {
                    (path.clone(), true)
                } else if let Some(symbol) = link.input.first() {
                    let mut longer = path.clone();
                    longer.push(symbol.clone());
                    (longer, false)
                } else {
                    continue;
                };
                let shorter = paths
                    .get(&link.target)
                    .map_or(true, |known| candidate.len() < known.len());
                if shorter {
                    paths.insert(link.target, candidate);
                    if free {
                        queue.push_front(link.target);
                    } else {
                        queue.push_back(link.target);
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::machine::simulation::tests::ends_in_a;

    #[test]
    fn shortest_word_is_found() {
        let mut m = ends_in_a();
        assert_eq!(m.get_accepted_sequence(), Some(vec!["a".to_string()]));

        let mut chain = Machine::new("m1");
        chain.set_alphabet(["a", "b"], Some(true));
        let n = (0..4)
            .map(|i| chain.add_node((0.0, 0.0), "", i == 0, i == 3))
            .collect::<Vec<_>>();
        chain
            .add_link(n[0], n[1], vec!["b".into(), "a".into()], BTreeMap::new(), false)
            .unwrap();
        chain
            .add_link(n[1], n[2], vec!["b".into()], BTreeMap::new(), false)
            .unwrap();
        chain
            .add_link(n[2], n[3], vec![], BTreeMap::new(), true)
            .unwrap();
        chain
            .add_link(n[0], n[3], vec!["a".into(), "b".into()], BTreeMap::new(), false)
            .unwrap();
        assert_eq!(chain.get_accepted_sequence(), Some(vec!["a".to_string()]));

        m.set_to_initial_state();
        m.step("a");
        let before = m.current_state();
        m.get_accepted_sequence();
        assert_eq!(m.current_state(), before);
    }

    #[test]
    fn epsilon_paths_are_free() {
        let mut m = Machine::new("m1");
        m.set_alphabet(["a"], Some(true));
        let s = m.add_node((0.0, 0.0), "", true, false);
        let t = m.add_node((0.0, 0.0), "", false, false);
        let u = m.add_node((0.0, 0.0), "", false, true);
        m.add_link(s, t, vec![], BTreeMap::new(), true).unwrap();
        m.add_link(t, u, vec!["a".into()], BTreeMap::new(), false)
            .unwrap();
        m.add_link(s, u, vec!["a".into()], BTreeMap::new(), false)
            .unwrap();
        assert_eq!(m.get_accepted_sequence(), Some(vec!["a".to_string()]));

        m.add_link(t, u, vec![], BTreeMap::new(), true).unwrap();
        assert_eq!(m.get_accepted_sequence(), Some(vec![]));
    }

    #[test]
    fn nothing_accepted() {
        let mut m = ends_in_a();
        let f = m.nodes().find(|n| n.is_accepting()).unwrap().id();
        for link in m.links_to(f) {
            m.delete_link(link).unwrap();
        }
        assert_eq!(m.get_accepted_sequence(), None);
        assert_eq!(Machine::new("m2").get_accepted_sequence(), None);
    }
}
