use std::collections::BTreeMap;

use itertools::Itertools;

use super::{LinkId, NodeId};
use crate::MachineError;

/// Input and output symbols are arbitrary strings, e.g. `"a"` or `"coin"`.
pub type Symbol = String;

/// A transition between two nodes of a [`Machine`](super::Machine).
///
/// The input of a link is a set of symbols, it is kept sorted and free of duplicates. A link
/// may additionally be an epsilon transition, in which case it can be taken without reading
/// any input. For transducers, `output` maps input symbols to the symbol that is emitted when
/// the link is taken on that input. A link without input and without epsilon is allowed, it
/// is simply never taken.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
    pub(super) id: LinkId,
    pub(super) source: NodeId,
    pub(super) target: NodeId,
    pub(super) input: Vec<Symbol>,
    pub(super) has_epsilon: bool,
    pub(super) output: BTreeMap<Symbol, Symbol>,
}

fn normalize<I: IntoIterator<Item = Symbol>>(input: I) -> Vec<Symbol> {
    input.into_iter().sorted().dedup().collect()
}

impl Link {
    pub(super) fn new<I: IntoIterator<Item = Symbol>>(
        id: LinkId,
        source: NodeId,
        target: NodeId,
        input: I,
        output: BTreeMap<Symbol, Symbol>,
        has_epsilon: bool,
    ) -> Self {
        Self {
            id,
            source,
            target,
            input: normalize(input),
            has_epsilon,
            output,
        }
    }

    /// The id of this link.
    pub fn id(&self) -> LinkId {
        self.id
    }

    /// The node this link leaves from.
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// The node this link leads to.
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// The input symbols on which this link can be taken, sorted and without duplicates.
    pub fn input(&self) -> &[Symbol] {
        &self.input
    }

    /// Whether the link can be taken without reading input.
    pub fn has_epsilon(&self) -> bool {
        self.has_epsilon
    }

    /// The output emitted per input symbol, only meaningful for transducers.
    pub fn output(&self) -> &BTreeMap<Symbol, Symbol> {
        &self.output
    }

    /// The output emitted when taking this link on `symbol`, if any.
    pub fn output_for(&self, symbol: &str) -> Option<&Symbol> {
        self.output.get(symbol)
    }

    /// Returns true if the link can be taken on reading `symbol`.
    pub fn reads(&self, symbol: &str) -> bool {
        self.input.iter().any(|s| s == symbol)
    }

    /// Returns true if the link can be taken at all, i.e. it has input or is an epsilon link.
    pub fn is_labelled(&self) -> bool {
        self.has_epsilon || !self.input.is_empty()
    }

    /// Returns true if the link leads from a node back to itself.
    pub fn is_reflexive(&self) -> bool {
        self.source == self.target
    }

    /// Returns the position of `symbol` in the input of this link. This is used to highlight
    /// the symbol that was consumed when a link carries more than one.
    pub fn input_index_of(&self, symbol: &str) -> Result<usize, MachineError> {
        self.input
            .iter()
            .position(|s| s == symbol)
            .ok_or_else(|| MachineError::SymbolNotOnLink {
                symbol: symbol.to_string(),
                link: self.id,
            })
    }

    pub(super) fn set_input<I>(&mut self, input: I, has_epsilon: bool)
    where
        I: IntoIterator<Item = Symbol>,
    {
        self.input = normalize(input);
        self.has_epsilon = has_epsilon;
    }

    pub(super) fn add_input<I>(&mut self, input: I, has_epsilon: bool)
    where
        I: IntoIterator<Item = Symbol>,
    {
        let combined = self.input.drain(..).chain(input).collect_vec();
        let has_epsilon = self.has_epsilon || has_epsilon;
        self.set_input(combined, has_epsilon);
    }

    /// Drops every input symbol not in `alphabet`, every output that no longer belongs to an
    /// input symbol or is not in a non-empty `output_alphabet`, and the epsilon flag if
    /// epsilon transitions are not allowed. Returns true if anything was removed.
    pub(super) fn enforce_alphabet(
        &mut self,
        alphabet: &[Symbol],
        allow_epsilon: bool,
        output_alphabet: &[Symbol],
    ) -> bool {
        let before = (self.input.len(), self.output.len(), self.has_epsilon);
        self.input.retain(|s| alphabet.contains(s));
        let input = &self.input;
        self.output.retain(|i, o| {
            input.contains(i) && (output_alphabet.is_empty() || output_alphabet.contains(o))
        });
        self.has_epsilon = self.has_epsilon && allow_epsilon;
        before != (self.input.len(), self.output.len(), self.has_epsilon)
    }
}
