//! Model and algorithms for finite state machines as they are drawn in an interactive
//! automata course.
//!
//! A [`Machine`] is an object graph of states ([`Node`]s) connected by transitions ([`Link`]s).
//! Each link carries a set of input symbols, may additionally be taken without reading
//! any input (an epsilon transition) and, if the machine is a transducer, maps each of its
//! input symbols to an output symbol (Mealy semantics). Nodes and links live in an arena
//! owned by the machine and are addressed through small integer ids ([`NodeId`], [`LinkId`]),
//! which remain stable for the lifetime of the machine.
//!
//! On top of that model the crate implements
//! - nondeterministic simulation with epsilon closure, both as pure functions on sets of
//!   states and through an interactive cursor, together with trace recording,
//! - conversion into a deterministic machine via the subset construction,
//! - Brzozowski minimization (reverse, determinize, reverse, determinize),
//! - complementation, the product construction and language equivalence,
//! - a search for a shortest accepted input sequence.
//!
//! A machine can be built from and serialized into a declarative [`MachineSpec`], which is
//! the form exchanged with the presentation layer. The [`question`] module grades a learner's
//! machines against exercise descriptions and the [`Workbench`] ties machines and the active
//! question together into one session object.
//!
//! Mutating operations assume exclusive access to the machine for the duration of the call.
//! Nothing in this crate spawns threads or blocks; all algorithms run to completion before
//! they return.
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// The prelude is supposed to make using this package easier. Including everything, i.e.
/// `use fsm::prelude::*;` should be enough to use the package.
pub mod prelude {
    pub use super::{
        error::{MachineError, QuestionError, SpecError},
        machine::{
            spec::{parse_alphabet, Attributes, LinkSpec, MachineSpec, NodeSpec},
            trace::{LinkUse, Trace, Traversal},
            Closure, Completion, Cursor, Link, LinkId, Machine, Node, NodeId, StateSet, Step,
            Symbol,
        },
        math,
        question::{
            parse_input, Answer, Definition, DefinitionLink, Feedback, InputTarget, Question,
            QuestionKind,
        },
        workbench::Workbench,
    };
}

/// Type aliases for the collections used throughout the crate.
pub mod math;

/// Error types of the crate.
pub mod error;
pub use error::{MachineError, QuestionError, SpecError};

/// The automaton model: states, transitions and all algorithms operating on them.
pub mod machine;
pub use machine::{Link, LinkId, Machine, Node, NodeId};
pub use machine::spec::MachineSpec;

/// Grading of exercises against the machines a learner has built.
pub mod question;

/// A session object owning the machines that are worked on and the active question.
pub mod workbench;
pub use workbench::Workbench;

/// Implements the generation of random machines.
#[cfg(feature = "random")]
pub mod random;
