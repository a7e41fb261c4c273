use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Cursor, Machine, NodeId, Symbol};
use crate::{math::Bijection, SpecError};

fn is_false(b: &bool) -> bool {
    !*b
}

fn yes() -> bool {
    true
}

/// A state in a [`MachineSpec`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSpec {
    /// Identifier that links refer to. It only has meaning within the spec.
    pub id: String,
    /// Horizontal display position.
    #[serde(default)]
    pub x: f64,
    /// Vertical display position.
    #[serde(default)]
    pub y: f64,
    /// Display name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Whether the state is initial.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_init: bool,
    /// Whether the state is accepting.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_acc: bool,
}

/// A transition in a [`MachineSpec`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSpec {
    /// Spec id of the source node.
    pub from: String,
    /// Spec id of the target node.
    pub to: String,
    /// The input symbols.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub input: Vec<Symbol>,
    /// Output per input symbol, for transducers.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub output: BTreeMap<Symbol, Symbol>,
    /// Whether the link is an epsilon transition.
    #[serde(default, skip_serializing_if = "is_false")]
    pub has_eps: bool,
}

/// Machine-wide settings of a [`MachineSpec`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attributes {
    /// The input alphabet.
    #[serde(default)]
    pub alphabet: Vec<Symbol>,
    /// Whether epsilon transitions are allowed.
    #[serde(default = "yes")]
    pub allow_epsilon: bool,
    /// Whether links emit output.
    #[serde(default)]
    pub is_transducer: bool,
    /// The symbols a transducer may emit.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub output_alphabet: Vec<Symbol>,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            alphabet: vec![],
            allow_epsilon: true,
            is_transducer: false,
            output_alphabet: vec![],
        }
    }
}

/// Declarative description of a machine, as exchanged with the presentation layer.
///
/// ```json
/// {"nodes": [{"id": "A", "x": 10, "y": 20, "isInit": true},
///            {"id": "B", "x": 90, "y": 20, "isAcc": true}],
///  "links": [{"from": "A", "to": "B", "input": ["a"]}],
///  "attributes": {"alphabet": ["a", "b"], "allowEpsilon": true, "isTransducer": false}}
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MachineSpec {
    /// The states.
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    /// The transitions between them.
    #[serde(default)]
    pub links: Vec<LinkSpec>,
    /// Alphabet and flags.
    #[serde(default)]
    pub attributes: Attributes,
}

impl MachineSpec {
    /// Parses a spec from JSON text.
    pub fn from_json(json: &str) -> Result<Self, SpecError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the spec to JSON text.
    pub fn to_json(&self) -> Result<String, SpecError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Looks up a node by its spec id.
    pub fn node(&self, id: &str) -> Option<&NodeSpec> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// Parses an alphabet entered as JSON text, e.g. `["a", "b"]`.
pub fn parse_alphabet(text: &str) -> Result<Vec<Symbol>, SpecError> {
    match serde_json::from_str::<serde_json::Value>(text)? {
        serde_json::Value::Array(items) => Ok(items
            .into_iter()
            .map(|item| match item {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .collect()),
        _ => Err(SpecError::AlphabetNotArray),
    }
}

/// The spec id of the `n`-th node: `A`..`Z`, then `AA`, `AB`, and so on.
fn spec_id(mut n: usize) -> String {
    let mut id = vec![];
    loop {
        id.push(b'A' + (n % 26) as u8);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    id.reverse();
    String::from_utf8_lossy(&id).into_owned()
}

impl Machine {
    /// Creates a machine with the given id from a spec.
    pub fn from_spec(id: impl Into<String>, spec: &MachineSpec) -> Result<Self, SpecError> {
        let mut machine = Machine::new(id);
        machine.build(spec)?;
        Ok(machine)
    }

    /// Replaces the whole content of the machine by what `spec` describes.
    ///
    /// The spec is validated before anything is changed, so on error the machine is left as it
    /// was. Link input is taken as given, it is not filtered by the alphabet. Internal ids
    /// keep counting up from where they were, ids of deleted nodes are never reused.
    pub fn build(&mut self, spec: &MachineSpec) -> Result<(), SpecError> {
        let mut seen = crate::math::Set::default();
        for node in &spec.nodes {
            if !seen.insert(node.id.as_str()) {
                return Err(SpecError::DuplicateNode(node.id.clone()));
            }
        }
        if let Some(bad) = spec
            .links
            .iter()
            .flat_map(|l| [&l.from, &l.to])
            .find(|id| !seen.contains(id.as_str()))
        {
            return Err(SpecError::UnknownNode(bad.clone()));
        }

        self.nodes.clear();
        self.links.clear();
        self.cursor = Cursor::default();
        self.alphabet = spec.attributes.alphabet.clone();
        self.allow_epsilon = spec.attributes.allow_epsilon;
        self.is_transducer = spec.attributes.is_transducer;
        self.output_alphabet = spec.attributes.output_alphabet.clone();

        let mut ids: Bijection<String, NodeId> = Bijection::new();
        for node in &spec.nodes {
            let id = self.add_node((node.x, node.y), node.name.clone(), node.is_init, node.is_acc);
            ids.insert(node.id.clone(), id);
        }
        for link in &spec.links {
            let (Some(&from), Some(&to)) = (ids.get_by_left(&link.from), ids.get_by_left(&link.to))
            else {
                return Err(SpecError::UnknownNode(link.from.clone()));
            };
            self.insert_link(from, to, link.input.clone(), link.output.clone(), link.has_eps);
        }
        debug!(
            "built machine {} with {} nodes and {} links",
            self.id,
            self.node_count(),
            self.link_count()
        );
        Ok(())
    }

    /// Describes the machine as a spec. Nodes get the ids `A`, `B`, ... in the order of their
    /// internal ids, positions are rounded and default values are left out.
    pub fn get_spec(&self) -> MachineSpec {
        let ids: Bijection<NodeId, String> = self
            .nodes
            .keys()
            .enumerate()
            .map(|(i, &id)| (id, spec_id(i)))
            .collect();
        let name_of = |id: &NodeId| ids.get_by_left(id).cloned().unwrap_or_default();

        MachineSpec {
            nodes: self
                .nodes
                .values()
                .map(|n| NodeSpec {
                    id: name_of(&n.id),
                    x: n.x.round(),
                    y: n.y.round(),
                    name: n.name.clone(),
                    is_init: n.is_initial,
                    is_acc: n.is_accepting,
                })
                .collect(),
            links: self
                .links
                .values()
                .map(|l| LinkSpec {
                    from: name_of(&l.source),
                    to: name_of(&l.target),
                    input: l.input.clone(),
                    output: l.output.clone(),
                    has_eps: l.has_epsilon,
                })
                .collect(),
            attributes: Attributes {
                alphabet: self.alphabet.clone(),
                allow_epsilon: self.allow_epsilon,
                is_transducer: self.is_transducer,
                output_alphabet: self.output_alphabet.clone(),
            },
        }
    }
}
