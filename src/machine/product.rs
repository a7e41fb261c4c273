use std::collections::BTreeMap;

use tracing::{debug, trace};

use super::{Completion, Machine, NodeId, Symbol};
use crate::math::Map;

impl Machine {
    /// The unique state reached from `node` on `symbol` in a complete deterministic machine.
    fn successor(&self, node: NodeId, symbol: &str) -> Option<NodeId> {
        self.outgoing(node).find(|l| l.reads(symbol)).map(|l| l.target)
    }

    /// Copies the machine and turns the copy into a minimal, completely specified machine.
    fn complete_minimal_copy(&self, id: &str) -> Machine {
        let mut copy = self.scratch_copy(id);
        copy.minimize();
        copy.completely_specify(Completion::Blackhole);
        copy
    }

    /// Builds the product of `self` and `other`, a machine that accepts exactly the words both
    /// of them accept.
    ///
    /// Despite the name the result is the *intersection* of the two languages: a pair of
    /// states is accepting only if both components are. Together with
    /// [`Self::complement`] this answers whether one language contains words the other one
    /// lacks. Both operands are minimized and completed on private copies and stay unchanged.
    /// Only symbols both alphabets share are kept, so words with other symbols are rejected.
    pub fn get_union_with(&self, other: &Machine) -> Machine {
        let first = self.complete_minimal_copy("temp1");
        let second = other.complete_minimal_copy("temp2");

        let alphabet: Vec<Symbol> = first
            .alphabet
            .iter()
            .filter(|s| second.alphabet.contains(s))
            .cloned()
            .collect();
        let mut product = Machine::new("u1");
        product.set_alphabet(alphabet.clone(), None);

        let start = match (first.initial_states().first(), second.initial_states().first()) {
            (Some(&a), Some(&b)) => (a, b),
            _ => return product,
        };

        let mut states: Map<(NodeId, NodeId), NodeId> = Map::default();
        let mut pending = vec![start];
        let mut transitions = vec![];
        while let Some(pair @ (a, b)) = pending.pop() {
            if states.contains_key(&pair) {
                continue;
            }
            let (Some(left), Some(right)) = (first.node(a), second.node(b)) else {
                continue;
            };
            let id = product.add_node(
                (0.0, 0.0),
                "",
                left.is_initial && right.is_initial,
                left.is_accepting && right.is_accepting,
            );
            states.insert(pair, id);
            for symbol in &alphabet {
                if let (Some(x), Some(y)) =
                    (first.successor(a, symbol), second.successor(b, symbol))
                {
                    pending.push((x, y));
                    transitions.push((pair, (x, y), symbol.clone()));
                }
            }
            trace!("added product state {id} for ({a}, {b})");
        }

        for (source, target, symbol) in transitions {
            if let (Some(&s), Some(&t)) = (states.get(&source), states.get(&target)) {
                product.join(s, t, [symbol], BTreeMap::new(), false);
            }
        }
        debug!(
            "product of {} and {} has {} states",
            self.id,
            other.id,
            product.node_count()
        );
        product
    }
}
