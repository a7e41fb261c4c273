use super::{LinkId, NodeId};

/// A state of a [`Machine`](super::Machine). It stores whether the state is initial and/or
/// accepting, a display name and position, as well as the ids of the links leaving it.
/// The position is carried along for the presentation layer and has no influence on any
/// of the algorithms.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub(super) id: NodeId,
    pub(super) name: String,
    pub(super) is_initial: bool,
    pub(super) is_accepting: bool,
    pub(super) x: f64,
    pub(super) y: f64,
    pub(super) outgoing: Vec<LinkId>,
}

impl Node {
    pub(super) fn new(
        id: NodeId,
        (x, y): (f64, f64),
        name: impl Into<String>,
        is_initial: bool,
        is_accepting: bool,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            is_initial,
            is_accepting,
            x,
            y,
            outgoing: vec![],
        }
    }

    /// The id of this node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The display name, which is empty for unnamed states.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the machine may start in this state.
    pub fn is_initial(&self) -> bool {
        self.is_initial
    }

    /// Whether reaching this state means the input is accepted.
    pub fn is_accepting(&self) -> bool {
        self.is_accepting
    }

    /// The display position as `(x, y)`.
    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// Ids of all links leaving this node, in the order they were added.
    pub fn outgoing_links(&self) -> &[LinkId] {
        &self.outgoing
    }

    pub(super) fn detach(&mut self, link: LinkId) {
        self.outgoing.retain(|&l| l != link);
    }
}
