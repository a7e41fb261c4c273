use std::{collections::BTreeMap, fmt::Display, str::FromStr};

use itertools::Itertools;
use tracing::debug;

use super::{LinkId, Machine, NodeId};
use crate::MachineError;

/// Name of the sink state added by [`Completion::Blackhole`].
pub const BLACKHOLE_NAME: &str = "🚮";

/// How [`Machine::completely_specify`] fills in missing transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Completion {
    /// Missing transitions lead to a fresh non-accepting sink state.
    Blackhole,
    /// Missing transitions loop back to the state they start in.
    Ignore,
}

impl FromStr for Completion {
    type Err = MachineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blackhole" => Ok(Completion::Blackhole),
            "ignore" => Ok(Completion::Ignore),
            other => Err(MachineError::UnknownCompletionMode(other.to_string())),
        }
    }
}

impl Display for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Completion::Blackhole => write!(f, "blackhole"),
            Completion::Ignore => write!(f, "ignore"),
        }
    }
}

impl Machine {
    /// Replaces the two given states by a single one that has all their transitions.
    ///
    /// The new state is named `{name1, name2}`, sits halfway between the two and is initial
    /// (accepting) only if both were. Links that end up between the same pair of states are
    /// combined. Merging a state with itself does nothing.
    pub fn merge_nodes(&mut self, first: NodeId, second: NodeId) -> Result<NodeId, MachineError> {
        let a = self.node(first).ok_or(MachineError::NoSuchNode(first))?.clone();
        let b = self.node(second).ok_or(MachineError::NoSuchNode(second))?.clone();
        if first == second {
            return Ok(first);
        }
        self.enforce_alphabet();

        let touching = self
            .links
            .values()
            .filter(|l| [first, second].contains(&l.source) || [first, second].contains(&l.target))
            .cloned()
            .collect_vec();
        self.delete_node(first)?;
        self.delete_node(second)?;

        let merged = self.add_node(
            ((a.x + b.x) / 2.0, (a.y + b.y) / 2.0),
            format!("{{{}, {}}}", a.name, b.name),
            a.is_initial && b.is_initial,
            a.is_accepting && b.is_accepting,
        );
        let relocate = |n: NodeId| if n == first || n == second { merged } else { n };
        for link in touching {
            self.join(
                relocate(link.source),
                relocate(link.target),
                link.input,
                link.output,
                link.has_epsilon,
            );
        }
        Ok(merged)
    }

    /// Reverses the machine: initial and accepting flags are swapped and every link changes
    /// direction. Links are reversed one by one without being combined, so two states that
    /// were connected in both directions end up with two parallel links.
    pub fn reverse(&mut self) {
        for node in self.nodes.values_mut() {
            std::mem::swap(&mut node.is_initial, &mut node.is_accepting);
            node.outgoing.clear();
        }
        let links = std::mem::take(&mut self.links);
        for (_, link) in links {
            self.insert_link(link.target, link.source, link.input, link.output, link.has_epsilon);
        }
    }

    /// Reverses a single link. A link from a state to itself is left alone. If there already
    /// is a link in the opposite direction, the input of this link is added to it and this
    /// link is removed. Returns the id of the link that now goes the other way.
    pub fn reverse_link(&mut self, link: LinkId) -> Result<LinkId, MachineError> {
        let current = self.link(link).ok_or(MachineError::NoSuchLink(link))?.clone();
        if current.is_reflexive() {
            return Ok(link);
        }
        let reversed = match self.link_to(current.target, current.source) {
            Some(existing) => {
                self.add_input(existing, current.input, current.has_epsilon)?;
                existing
            }
            None => self.insert_link(
                current.target,
                current.source,
                current.input,
                current.output,
                current.has_epsilon,
            ),
        };
        self.delete_link(link)?;
        Ok(reversed)
    }

    /// Returns true if every state has a transition for every symbol of the alphabet.
    pub fn is_completely_specified(&self) -> bool {
        self.nodes.keys().all(|&node| {
            self.alphabet
                .iter()
                .all(|symbol| self.outgoing(node).any(|l| l.reads(symbol)))
        })
    }

    /// Adds transitions so that every state has one for every symbol of the alphabet. See
    /// [`Completion`] for where they lead. Does nothing if the machine is already completely
    /// specified, so applying it twice adds no second sink.
    pub fn completely_specify(&mut self, mode: Completion) {
        if self.is_completely_specified() {
            return;
        }
        let sink = match mode {
            Completion::Blackhole => {
                Some(self.add_node((150.0, 150.0), BLACKHOLE_NAME, false, false))
            }
            Completion::Ignore => None,
        };
        for node in self.node_ids() {
            let missing = self
                .alphabet
                .iter()
                .filter(|symbol| !self.outgoing(node).any(|l| l.reads(symbol)))
                .cloned()
                .collect_vec();
            if !missing.is_empty() {
                self.join(node, sink.unwrap_or(node), missing, BTreeMap::new(), false);
            }
        }
    }

    /// Turns the machine into the minimal deterministic machine for its language by reversing
    /// and determinizing twice. The result has no dead states, so it is not necessarily
    /// completely specified. A machine accepting nothing ends up with no states.
    pub fn minimize(&mut self) {
        let before = self.node_count();
        self.reverse();
        self.convert_to_dfa();
        self.reverse();
        self.convert_to_dfa();
        debug!(
            "minimized machine {} from {before} to {} states",
            self.id,
            self.node_count()
        );
    }

    /// Changes the machine to accept exactly the words it rejected before, by determinizing,
    /// adding a sink state for missing transitions and flipping every accepting flag.
    pub fn complement(&mut self) {
        self.convert_to_dfa();
        if self.nodes.is_empty() {
            // the empty language, whose complement is everything
            let sink = self.add_node((150.0, 150.0), BLACKHOLE_NAME, true, false);
            if !self.alphabet.is_empty() {
                self.join(sink, sink, self.alphabet.clone(), BTreeMap::new(), false);
            }
        }
        self.completely_specify(Completion::Blackhole);
        for node in self.nodes.values_mut() {
            node.is_accepting = !node.is_accepting;
        }
    }
}
