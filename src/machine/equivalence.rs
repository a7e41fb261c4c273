use itertools::Itertools;
use tracing::debug;

use super::{Machine, NodeId};
use crate::{
    math::{Map, Set},
    MachineError,
};

impl Machine {
    /// Decides whether `self` and `other` accept the same language.
    ///
    /// Both machines are minimized on private copies. Minimal machines for the same language
    /// are identical up to renaming, so after some quick comparisons of their sizes the two
    /// copies are walked in lockstep from their initial states, checking that corresponding
    /// states agree on acceptance and on which symbols have a transition.
    ///
    /// Fails with [`MachineError::InitialStateCount`] if a non-empty minimized copy does not
    /// have exactly one initial state, which would mean the minimization is broken.
    pub fn is_equivalent_to(&self, other: &Machine) -> Result<bool, MachineError> {
        let mut left = self.scratch_copy("temp1");
        let mut right = other.scratch_copy("temp2");
        left.minimize();
        right.minimize();

        let same_shape = left.node_count() == right.node_count()
            && left.link_count() == right.link_count()
            && left.accepting_node_count() == right.accepting_node_count()
            && left.alphabet.iter().collect::<Set<_>>()
                == right.alphabet.iter().collect::<Set<_>>();
        if !same_shape {
            debug!(
                "minimized {} and {} differ in size or alphabet",
                self.id, other.id
            );
            return Ok(false);
        }
        if left.node_count() == 0 {
            return Ok(true);
        }

        let start = |m: &Machine| -> Result<NodeId, MachineError> {
            match m.initial_states().into_iter().collect_vec().as_slice() {
                [single] => Ok(*single),
                states => Err(MachineError::InitialStateCount(states.len())),
            }
        };
        let (a, b) = (start(&left)?, start(&right)?);

        let mut mapping: Map<NodeId, NodeId> = Map::default();
        let mut pending = vec![(a, b)];
        while let Some((a, b)) = pending.pop() {
            if let Some(&mapped) = mapping.get(&a) {
                if mapped != b {
                    return Ok(false);
                }
                continue;
            }
            let (Some(x), Some(y)) = (left.node(a), right.node(b)) else {
                return Ok(false);
            };
            if x.is_accepting != y.is_accepting || x.outgoing.len() != y.outgoing.len() {
                return Ok(false);
            }
            for symbol in &left.alphabet {
                let l = left.outgoing(a).find(|l| l.reads(symbol));
                let r = right.outgoing(b).find(|l| l.reads(symbol));
                match (l, r) {
                    (None, None) => {}
                    (Some(l), Some(r)) => match (l.is_reflexive(), r.is_reflexive()) {
                        (true, true) => {}
                        (false, false) => pending.push((l.target, r.target)),
                        _ => return Ok(false),
                    },
                    _ => return Ok(false),
                }
            }
            mapping.insert(a, b);
        }
        Ok(true)
    }
}
