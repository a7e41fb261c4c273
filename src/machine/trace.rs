use serde::Serialize;

use super::{LinkId, Machine, NodeId, Symbol};
use crate::MachineError;

/// How a link was traversed during one step of a [`Trace`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Traversal {
    /// The link was followed as an epsilon transition.
    Epsilon,
    /// The link read the input symbol at position `index` of its input list.
    Input {
        /// Position of the consumed symbol in [`Link::input`](super::Link::input).
        index: usize,
    },
}

/// A link that was used in one step of a [`Trace`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LinkUse {
    /// The link that was used.
    pub link: LinkId,
    /// How it was used.
    #[serde(flatten)]
    pub traversal: Traversal,
}

/// A recording of an execution, one snapshot per consumed symbol.
///
/// `states[0]` and `links[0]` describe the start of the execution (the initial states and the
/// epsilon links leading out of them), `states[i]` and `links[i]` the situation after reading
/// `input[i - 1]`. If the machine gets stuck before the input is consumed, the recording ends
/// there, so there may be fewer than `input.len() + 1` snapshots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trace {
    /// The machine that was executed.
    pub machine_id: String,
    /// The input sequence.
    pub input: Vec<Symbol>,
    /// The symbol used to join `input` for display. Empty unless the caller knows how the
    /// input was split.
    pub input_separator: String,
    /// The active states per snapshot.
    pub states: Vec<Vec<NodeId>>,
    /// The links used to get to each snapshot.
    pub links: Vec<Vec<LinkUse>>,
    /// Whether the input is accepted.
    pub does_accept: bool,
    /// For transducers, the output emitted so far per snapshot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Vec<Vec<Symbol>>>,
}

impl Trace {
    /// The number of recorded snapshots.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns true if nothing was recorded, which never happens for a trace obtained from
    /// [`Machine::get_trace`].
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl Machine {
    /// Replays the execution on `input` from the initial states and records every step.
    ///
    /// The cursor ends up where the execution stopped. Fails only if a link reported as used
    /// does not carry the symbol it was used for, which would mean the simulation and the
    /// graph disagree.
    pub fn get_trace<I, S>(&mut self, input: I) -> Result<Trace, MachineError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let input: Vec<Symbol> = input.into_iter().map(|s| s.as_ref().to_string()).collect();
        let epsilon = |link: &LinkId| LinkUse {
            link: *link,
            traversal: Traversal::Epsilon,
        };

        self.set_to_initial_state();
        let mut trace = Trace {
            machine_id: self.id.clone(),
            input: input.clone(),
            input_separator: String::new(),
            states: vec![self.current_state()],
            links: vec![self.cursor.epsilon_links_used().iter().map(epsilon).collect()],
            does_accept: false,
            output: None,
        };
        let mut emitted: Vec<Symbol> = vec![];
        let mut output = vec![emitted.clone()];

        for symbol in &input {
            if self.cursor.current().is_empty() {
                break;
            }
            self.step(symbol);
            trace.states.push(self.current_state());

            let mut used: Vec<LinkUse> = self
                .cursor
                .epsilon_links_used()
                .iter()
                .map(epsilon)
                .collect();
            for id in self.cursor.non_eps_links_used() {
                let link = self.links.get(id).ok_or(MachineError::NoSuchLink(*id))?;
                used.push(LinkUse {
                    link: *id,
                    traversal: Traversal::Input {
                        index: link.input_index_of(symbol)?,
                    },
                });
            }
            trace.links.push(used);

            if self.is_transducer {
                if let Some(out) = self
                    .cursor
                    .non_eps_links_used()
                    .iter()
                    .filter_map(|id| self.links.get(id))
                    .find_map(|l| l.output_for(symbol))
                {
                    emitted.push(out.clone());
                }
                output.push(emitted.clone());
            }
        }

        trace.does_accept = self.is_in_accepting_state();
        if self.is_transducer {
            trace.output = Some(output);
        }
        Ok(trace)
    }
}
