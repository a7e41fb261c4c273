use std::collections::BTreeMap;

use itertools::Itertools;
use tracing::{trace, warn};

use crate::{math::OrderedSet, MachineError};

mod id;
pub use id::{DefaultIdType, LinkId, NodeId};
use id::IdCounter;

mod node;
pub use node::Node;

mod link;
pub use link::{Link, Symbol};

/// Stepwise execution: epsilon closure, steps on symbols and the interactive cursor.
pub mod simulation;
pub use simulation::{Closure, Cursor, Step};

/// Recording of executions for animation.
pub mod trace;

/// The declarative description of a machine and conversion from and to it.
pub mod spec;

mod subset;

mod structure;
pub use structure::{Completion, BLACKHOLE_NAME};

mod product;

mod equivalence;

mod search;

mod table;

/// A set of states the machine is in at the same time. Iteration is in ascending id order,
/// which makes it usable as a canonical key for the subset construction.
pub type StateSet = OrderedSet<NodeId>;

/// A finite state machine, possibly nondeterministic, with epsilon transitions and output.
///
/// The machine owns all of its [`Node`]s and [`Link`]s, they are created and destroyed only
/// through its methods. Besides the graph it stores the alphabet, whether epsilon transitions
/// are allowed, whether it is a transducer and a [`Cursor`] that tracks an ongoing execution.
///
/// Mutating methods take `&mut self` and therefore have exclusive access for their duration.
/// When a machine is shared between threads, wrap it in a lock and hold the lock for the
/// whole of one operation.
#[derive(Clone, Debug)]
pub struct Machine {
    id: String,
    nodes: BTreeMap<NodeId, Node>,
    links: BTreeMap<LinkId, Link>,
    alphabet: Vec<Symbol>,
    output_alphabet: Vec<Symbol>,
    allow_epsilon: bool,
    is_transducer: bool,
    cursor: Cursor,
    node_ids: IdCounter,
    link_ids: IdCounter,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new("m1")
    }
}

impl Machine {
    /// Creates an empty machine with the given id. The alphabet is empty and epsilon
    /// transitions are allowed.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            nodes: BTreeMap::new(),
            links: BTreeMap::new(),
            alphabet: vec![],
            output_alphabet: vec![],
            allow_epsilon: true,
            is_transducer: false,
            cursor: Cursor::default(),
            node_ids: IdCounter::default(),
            link_ids: IdCounter::default(),
        }
    }

    /// The id of the machine, e.g. `m1`.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns a copy of `self` with a different id that algorithms are free to mutate.
    pub(crate) fn scratch_copy(&self, id: &str) -> Machine {
        let mut copy = self.clone();
        copy.id = id.to_string();
        copy.cursor = Cursor::default();
        copy
    }

    /// The input alphabet. The order only matters for display.
    pub fn alphabet(&self) -> &[Symbol] {
        &self.alphabet
    }

    /// The symbols a transducer may emit. Empty means unrestricted.
    pub fn output_alphabet(&self) -> &[Symbol] {
        &self.output_alphabet
    }

    /// Whether links may be epsilon transitions.
    pub fn allow_epsilon(&self) -> bool {
        self.allow_epsilon
    }

    /// Whether links emit output (Mealy semantics).
    pub fn is_transducer(&self) -> bool {
        self.is_transducer
    }

    /// Marks the machine as a transducer or as a plain acceptor.
    pub fn set_transducer(&mut self, is_transducer: bool) {
        self.is_transducer = is_transducer;
    }

    /// Replaces the alphabet and, if given, whether epsilon transitions are allowed.
    ///
    /// Note that this immediately edits every link of the machine: input symbols that are no
    /// longer part of the alphabet are removed and epsilon flags are cleared when epsilon is
    /// no longer allowed. This happens without further notice, see [`Self::enforce_alphabet`].
    pub fn set_alphabet<I, S>(&mut self, alphabet: I, allow_epsilon: Option<bool>)
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        if let Some(allow) = allow_epsilon {
            self.allow_epsilon = allow;
        }
        self.alphabet = alphabet.into_iter().map(Into::into).collect();
        self.enforce_alphabet();
    }

    /// Replaces the output alphabet of a transducer and removes all outputs that are no
    /// longer part of it. An empty output alphabet does not restrict the outputs.
    pub fn set_output_alphabet<I, S>(&mut self, output_alphabet: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        self.output_alphabet = output_alphabet.into_iter().map(Into::into).collect();
        self.enforce_alphabet();
    }

    /// Removes from all links the input symbols that are not in the alphabet, outputs that are
    /// not in the output alphabet and epsilon flags if epsilon is not allowed.
    ///
    /// This filters instead of failing: offending data is dropped and only logged.
    pub fn enforce_alphabet(&mut self) {
        let (alphabet, allow_epsilon, outputs) =
            (&self.alphabet, self.allow_epsilon, &self.output_alphabet);
        for link in self.links.values_mut() {
            if link.enforce_alphabet(alphabet, allow_epsilon, outputs) {
                warn!(
                    "dropped symbols from link {} that are not permitted by the alphabet",
                    link.id
                );
            }
        }
    }

    /// Adds a new node and returns its id.
    pub fn add_node(
        &mut self,
        position: (f64, f64),
        name: impl Into<String>,
        is_initial: bool,
        is_accepting: bool,
    ) -> NodeId {
        let id = self.node_ids.next();
        self.nodes
            .insert(id, Node::new(id, position, name, is_initial, is_accepting));
        id
    }

    /// Adds a link from `source` to `target`. This always creates a new link, even if the
    /// two nodes are already connected, see [`Self::connect`] for a merging variant.
    pub fn add_link<I: IntoIterator<Item = Symbol>>(
        &mut self,
        source: NodeId,
        target: NodeId,
        input: I,
        output: BTreeMap<Symbol, Symbol>,
        has_epsilon: bool,
    ) -> Result<LinkId, MachineError> {
        self.require_node(source)?;
        self.require_node(target)?;
        Ok(self.insert_link(source, target, input, output, has_epsilon))
    }

    /// Makes `source` lead to `target` on the given input. If a link between the two already
    /// exists, the input is added to it, otherwise a new link is created. This keeps at most
    /// one link per direction between two nodes.
    pub fn connect<I: IntoIterator<Item = Symbol>>(
        &mut self,
        source: NodeId,
        target: NodeId,
        input: I,
        has_epsilon: bool,
    ) -> Result<LinkId, MachineError> {
        self.require_node(source)?;
        self.require_node(target)?;
        Ok(self.join(source, target, input, BTreeMap::new(), has_epsilon))
    }

    /// Like [`Self::connect`] but assumes both nodes exist and also merges outputs.
    pub(crate) fn join<I: IntoIterator<Item = Symbol>>(
        &mut self,
        source: NodeId,
        target: NodeId,
        input: I,
        output: BTreeMap<Symbol, Symbol>,
        has_epsilon: bool,
    ) -> LinkId {
        match self.link_to(source, target) {
            Some(existing) => {
                if let Some(link) = self.links.get_mut(&existing) {
                    link.add_input(input, has_epsilon);
                    for (i, o) in output {
                        link.output.entry(i).or_insert(o);
                    }
                }
                existing
            }
            None => self.insert_link(source, target, input, output, has_epsilon),
        }
    }

    pub(crate) fn insert_link<I: IntoIterator<Item = Symbol>>(
        &mut self,
        source: NodeId,
        target: NodeId,
        input: I,
        output: BTreeMap<Symbol, Symbol>,
        has_epsilon: bool,
    ) -> LinkId {
        let id = self.link_ids.next();
        let link = Link::new(id, source, target, input, output, has_epsilon);
        if let Some(node) = self.nodes.get_mut(&source) {
            node.outgoing.push(id);
        }
        self.links.insert(id, link);
        id
    }

    /// Removes a link from the machine and returns it.
    pub fn delete_link(&mut self, link: LinkId) -> Result<Link, MachineError> {
        let removed = self
            .links
            .remove(&link)
            .ok_or(MachineError::NoSuchLink(link))?;
        if let Some(source) = self.nodes.get_mut(&removed.source) {
            source.detach(link);
        }
        Ok(removed)
    }

    /// Removes a node together with all links leaving or entering it.
    pub fn delete_node(&mut self, node: NodeId) -> Result<Node, MachineError> {
        let removed = self.nodes.remove(&node).ok_or(MachineError::NoSuchNode(node))?;
        let touching = self
            .links
            .values()
            .filter(|l| l.source == node || l.target == node)
            .map(|l| l.id)
            .collect_vec();
        for link in touching {
            self.links.remove(&link);
        }
        for other in self.nodes.values_mut() {
            other.outgoing.retain(|l| self.links.contains_key(l));
        }
        self.cursor.forget(node);
        trace!("deleted node {node} from machine {}", self.id);
        Ok(removed)
    }

    /// Removes every node and link.
    pub fn delete_all_nodes(&mut self) {
        self.nodes.clear();
        self.links.clear();
        self.cursor = Cursor::default();
    }

    /// Flips whether the node is accepting.
    pub fn toggle_accepting(&mut self, node: NodeId) -> Result<(), MachineError> {
        let node = self.node_mut(node)?;
        node.is_accepting = !node.is_accepting;
        Ok(())
    }

    /// Flips whether the node is initial.
    pub fn toggle_initial(&mut self, node: NodeId) -> Result<(), MachineError> {
        let node = self.node_mut(node)?;
        node.is_initial = !node.is_initial;
        Ok(())
    }

    /// Renames a node.
    pub fn set_name(&mut self, node: NodeId, name: impl Into<String>) -> Result<(), MachineError> {
        self.node_mut(node)?.name = name.into();
        Ok(())
    }

    /// Moves a node to a new display position.
    pub fn set_position(&mut self, node: NodeId, (x, y): (f64, f64)) -> Result<(), MachineError> {
        let node = self.node_mut(node)?;
        node.x = x;
        node.y = y;
        Ok(())
    }

    /// Replaces the input of a link. Duplicates are removed.
    pub fn set_input<I: IntoIterator<Item = Symbol>>(
        &mut self,
        link: LinkId,
        input: I,
        has_epsilon: bool,
    ) -> Result<(), MachineError> {
        self.link_mut(link)?.set_input(input, has_epsilon);
        Ok(())
    }

    /// Adds symbols to the input of a link.
    pub fn add_input<I: IntoIterator<Item = Symbol>>(
        &mut self,
        link: LinkId,
        input: I,
        has_epsilon: bool,
    ) -> Result<(), MachineError> {
        self.link_mut(link)?.add_input(input, has_epsilon);
        Ok(())
    }

    /// Replaces the output of a link of a transducer.
    pub fn set_output(
        &mut self,
        link: LinkId,
        output: BTreeMap<Symbol, Symbol>,
    ) -> Result<(), MachineError> {
        self.link_mut(link)?.output = output;
        Ok(())
    }

    /// Returns the node with the given id.
    pub fn node(&self, node: NodeId) -> Option<&Node> {
        self.nodes.get(&node)
    }

    /// Returns the link with the given id.
    pub fn link(&self, link: LinkId) -> Option<&Link> {
        self.links.get(&link)
    }

    fn node_mut(&mut self, node: NodeId) -> Result<&mut Node, MachineError> {
        self.nodes.get_mut(&node).ok_or(MachineError::NoSuchNode(node))
    }

    fn link_mut(&mut self, link: LinkId) -> Result<&mut Link, MachineError> {
        self.links.get_mut(&link).ok_or(MachineError::NoSuchLink(link))
    }

    fn require_node(&self, node: NodeId) -> Result<(), MachineError> {
        if self.nodes.contains_key(&node) {
            Ok(())
        } else {
            Err(MachineError::NoSuchNode(node))
        }
    }

    /// Iterates over all nodes in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.values()
    }

    /// Iterates over all links in ascending id order.
    pub fn links(&self) -> impl Iterator<Item = &Link> + '_ {
        self.links.values()
    }

    /// The ids of all nodes.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys().copied().collect()
    }

    /// Iterates over the links leaving `node`.
    pub fn outgoing(&self, node: NodeId) -> impl Iterator<Item = &Link> + '_ {
        self.nodes
            .get(&node)
            .into_iter()
            .flat_map(|n| n.outgoing.iter())
            .filter_map(|l| self.links.get(l))
    }

    /// Ids of the epsilon links leaving `node`.
    pub fn epsilon_links(&self, node: NodeId) -> Vec<LinkId> {
        self.outgoing(node)
            .filter(|l| l.has_epsilon)
            .map(|l| l.id)
            .collect()
    }

    /// The nodes reachable from `node` by reading `symbol` (epsilon links are not followed)
    /// together with the links that lead there.
    pub fn reachable(&self, node: NodeId, symbol: &str) -> (Vec<NodeId>, Vec<LinkId>) {
        self.outgoing(node)
            .filter(|l| l.reads(symbol))
            .map(|l| (l.target, l.id))
            .unzip()
    }

    /// The first link from `source` to `target`, if there is one.
    pub fn link_to(&self, source: NodeId, target: NodeId) -> Option<LinkId> {
        self.outgoing(source)
            .find(|l| l.target == target)
            .map(|l| l.id)
    }

    /// Returns true if there is a link from `source` to `target`.
    pub fn has_link_to(&self, source: NodeId, target: NodeId) -> bool {
        self.link_to(source, target).is_some()
    }

    /// All links entering `target`.
    pub fn links_to(&self, target: NodeId) -> Vec<LinkId> {
        self.links
            .values()
            .filter(|l| l.target == target)
            .map(|l| l.id)
            .collect()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of links.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Number of accepting nodes.
    pub fn accepting_node_count(&self) -> usize {
        self.nodes.values().filter(|n| n.is_accepting).count()
    }

    /// Number of initial nodes.
    pub fn initial_node_count(&self) -> usize {
        self.nodes.values().filter(|n| n.is_initial).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn sym(s: &str) -> Vec<Symbol> {
        vec![s.to_string()]
    }

    #[test]
    fn deleting_node_removes_links() {
        let mut m = Machine::new("m1");
        let a = m.add_node((0.0, 0.0), "a", true, false);
        let b = m.add_node((10.0, 0.0), "b", false, true);
        let c = m.add_node((20.0, 0.0), "c", false, false);
        let ab = m.add_link(a, b, sym("x"), BTreeMap::new(), false).unwrap();
        m.add_link(b, c, sym("x"), BTreeMap::new(), false).unwrap();
        m.add_link(c, a, sym("y"), BTreeMap::new(), false).unwrap();

        m.delete_node(c).unwrap();
        assert_eq!(m.node_count(), 2);
        assert_eq!(m.link_count(), 1);
        assert_eq!(m.node(a).unwrap().outgoing_links(), [ab]);
        assert!(m.node(b).unwrap().outgoing_links().is_empty());
        assert_eq!(m.delete_node(c), Err(MachineError::NoSuchNode(c)));

        let d = m.add_node((0.0, 0.0), "", false, false);
        assert!(d > c, "ids are never reused");
    }

    #[test]
    fn connect_merges_parallel_links() {
        let mut m = Machine::new("m1");
        let a = m.add_node((0.0, 0.0), "", true, false);
        let b = m.add_node((0.0, 0.0), "", false, true);
        let first = m.connect(a, b, sym("x"), false).unwrap();
        let second = m.connect(a, b, sym("y"), true).unwrap();
        assert_eq!(first, second);
        assert_eq!(m.link_count(), 1);
        let link = m.link(first).unwrap();
        assert_eq!(link.input(), ["x", "y"]);
        assert!(link.has_epsilon());
        assert!(m.connect(a, NodeId(42), sym("x"), false).is_err());
    }

    #[test]
    fn alphabet_change_filters_links() {
        let mut m = Machine::new("m1");
        let a = m.add_node((0.0, 0.0), "", true, false);
        let l = m
            .add_link(
                a,
                a,
                vec!["a".into(), "b".into()],
                BTreeMap::from([("b".to_string(), "1".to_string())]),
                true,
            )
            .unwrap();
        m.set_alphabet(["a", "c"], Some(false));
        let link = m.link(l).unwrap();
        assert_eq!(link.input(), ["a"]);
        assert!(!link.has_epsilon());
        assert!(link.output().is_empty());
        assert!(!m.allow_epsilon());
    }

    #[test]
    fn output_alphabet_change_filters_outputs() {
        let mut m = Machine::new("m1");
        m.set_transducer(true);
        m.set_alphabet(["a", "b"], None);
        let s = m.add_node((0.0, 0.0), "", true, false);
        let t = m.add_node((0.0, 0.0), "", false, true);
        let l = m
            .add_link(
                s,
                t,
                vec!["a".into(), "b".into()],
                BTreeMap::from([
                    ("a".to_string(), "0".to_string()),
                    ("b".to_string(), "1".to_string()),
                ]),
                false,
            )
            .unwrap();
        m.set_output_alphabet(["1", "2"]);
        assert_eq!(m.output_alphabet(), ["1", "2"]);
        let link = m.link(l).unwrap();
        assert_eq!(link.input(), ["a", "b"]);
        assert_eq!(link.output_for("a"), None);
        assert_eq!(link.output_for("b").map(String::as_str), Some("1"));

        m.set_output_alphabet(Vec::<Symbol>::new());
        m.set_output(l, BTreeMap::from([("a".to_string(), "9".to_string())]))
            .unwrap();
        m.enforce_alphabet();
        assert_eq!(m.link(l).unwrap().output_for("a").map(String::as_str), Some("9"));
    }

    #[test]
    fn toggles_and_counts() {
        let mut m = Machine::new("m1");
        let a = m.add_node((0.0, 0.0), "", false, false);
        m.toggle_initial(a).unwrap();
        m.toggle_accepting(a).unwrap();
        assert_eq!(m.initial_node_count(), 1);
        assert_eq!(m.accepting_node_count(), 1);
        m.toggle_accepting(a).unwrap();
        assert_eq!(m.accepting_node_count(), 0);
        m.set_name(a, "start").unwrap();
        assert_eq!(m.node(a).unwrap().name(), "start");
    }
}
