use thiserror::Error;

use crate::machine::{LinkId, NodeId, Symbol};

/// Errors raised by operations on a [`Machine`](crate::Machine). These signal that a caller
/// broke a precondition, the machine is left unchanged whenever one of them is returned.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum MachineError {
    /// The given node does not (or no longer) exist in the machine.
    #[error("node {0} does not exist")]
    NoSuchNode(NodeId),
    /// The given link does not (or no longer) exist in the machine.
    #[error("link {0} does not exist")]
    NoSuchLink(LinkId),
    /// A symbol was looked up on a link whose input does not contain it.
    #[error("symbol `{symbol}` not found in link {link}")]
    SymbolNotOnLink {
        /// The symbol that was looked up.
        symbol: Symbol,
        /// The link that was searched.
        link: LinkId,
    },
    /// Equivalence checking requires minimized machines to have a single initial state.
    #[error("minimized machine should have exactly one initial state, found {0}")]
    InitialStateCount(usize),
    /// The name of a completion mode could not be parsed.
    #[error("unexpected completion mode `{0}`, expected `blackhole` or `ignore`")]
    UnknownCompletionMode(String),
}

/// Errors that occur when reading a declarative machine description or alphabet given by
/// the presentation layer.
#[derive(Debug, Error)]
pub enum SpecError {
    /// The text is not valid JSON or does not have the expected shape.
    #[error("could not parse specification: {0}")]
    Json(#[from] serde_json::Error),
    /// A link refers to a node id that is not declared.
    #[error("link refers to unknown node `{0}`")]
    UnknownNode(String),
    /// Two nodes are declared with the same id.
    #[error("node id `{0}` is declared more than once")]
    DuplicateNode(String),
    /// An alphabet has to be given as an array of strings.
    #[error("alphabet must be an array, e.g. [\"a\", \"b\"]")]
    AlphabetNotArray,
}

/// Errors raised while grading a question.
#[derive(Debug, Error)]
pub enum QuestionError {
    /// No question has been set up.
    #[error("no question has been set up")]
    NoQuestion,
    /// The question needs a machine to work on but there is none.
    #[error("there is no machine to check")]
    NoMachine,
    /// The submitted answer does not have the shape the question expects.
    #[error("expected {expected} as answer")]
    AnswerMismatch {
        /// Description of the expected answer.
        expected: &'static str,
    },
    /// A question definition refers to a state name that does not exist.
    #[error("question refers to unknown state `{0}`")]
    UnknownState(String),
    /// An operation on one of the machines failed.
    #[error(transparent)]
    Machine(#[from] MachineError),
    /// A machine given as part of the question could not be built.
    #[error(transparent)]
    Spec(#[from] SpecError),
}
