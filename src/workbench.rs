//! A session of the teaching tool: the machines the learner is working on together with the
//! question they are answering.

use tracing::info;

use crate::{
    machine::{trace::Trace, Symbol},
    question::{parse_input, Answer, Feedback, Question},
    Machine, MachineError, MachineSpec, QuestionError, SpecError,
};

/// Owns the machines of a session and the active question. Machines get the ids `m1`, `m2`,
/// ... in the order they are added. Ids of deleted machines are not handed out again.
#[derive(Clone, Debug, Default)]
pub struct Workbench {
    machines: Vec<Machine>,
    question: Option<Question>,
    current_input: Vec<Symbol>,
    added: usize,
}

impl Workbench {
    /// Creates an empty session without a question.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a machine built from `spec` and returns it.
    pub fn add_machine(&mut self, spec: &MachineSpec) -> Result<&mut Machine, SpecError> {
        let machine = Machine::from_spec(format!("m{}", self.added + 1), spec)?;
        self.added += 1;
        info!("added machine {}", machine.id());
        let index = self.machines.len();
        self.machines.push(machine);
        Ok(&mut self.machines[index])
    }

    /// Removes the machine with the given id.
    pub fn delete_machine(&mut self, id: &str) -> Option<Machine> {
        let index = self.machines.iter().position(|m| m.id() == id)?;
        Some(self.machines.remove(index))
    }

    /// Looks up a machine by id.
    pub fn machine(&self, id: &str) -> Option<&Machine> {
        self.machines.iter().find(|m| m.id() == id)
    }

    /// Looks up a machine by id for editing.
    pub fn machine_mut(&mut self, id: &str) -> Option<&mut Machine> {
        self.machines.iter_mut().find(|m| m.id() == id)
    }

    /// All machines in the order they were added.
    pub fn machines(&self) -> &[Machine] {
        &self.machines
    }

    /// The specs of all machines.
    pub fn machine_list(&self) -> Vec<MachineSpec> {
        self.machines.iter().map(Machine::get_spec).collect()
    }

    /// Makes `question` the active question and clears the input given so far.
    pub fn set_up_question(&mut self, question: Question) {
        info!("set up {} question", question.type_name());
        self.question = Some(question);
        self.current_input.clear();
    }

    /// The active question.
    pub fn question(&self) -> Option<&Question> {
        self.question.as_ref()
    }

    /// Whether the machines may be edited. Without a question everything is allowed.
    pub fn allows_editing(&self) -> bool {
        self.question.as_ref().map_or(true, Question::allows_editing)
    }

    /// Splits text into symbols, using the split symbol of the active question if there is one.
    pub fn parse_input(&self, input: &str) -> Vec<Symbol> {
        match &self.question {
            Some(question) => question.parse_input(input),
            None => parse_input(input, ""),
        }
    }

    /// Grades the machines against the active question.
    pub fn check_answer(&mut self, answer: Option<&Answer>) -> Result<Feedback, QuestionError> {
        let question = self.question.as_ref().ok_or(QuestionError::NoQuestion)?;
        let feedback = question.check(&mut self.machines, answer)?;
        info!(
            "{} answer to {} question",
            if feedback.all_correct() { "correct" } else { "incorrect" },
            question.type_name()
        );
        Ok(feedback)
    }

    /// The input given so far in a give-input question.
    pub fn current_input(&self) -> &[Symbol] {
        &self.current_input
    }

    /// Appends a symbol to the input, runs every machine on the whole input and grades the
    /// result. Returns the traces for display together with the feedback.
    pub fn give_input(
        &mut self,
        symbol: impl Into<Symbol>,
    ) -> Result<(Vec<Trace>, Feedback), QuestionError> {
        self.current_input.push(symbol.into());
        let input = self.current_input.clone();
        let traces = self.traces(&input)?;
        let feedback = self.check_answer(None)?;
        Ok((traces, feedback))
    }

    /// Clears the input given so far and puts every machine back into its initial states.
    pub fn reset_input(&mut self) -> Result<Vec<Trace>, MachineError> {
        self.current_input.clear();
        self.traces(&[])
    }

    /// Runs every machine on `input` and returns the traces, tagged with the split symbol of
    /// the active question. The cursors of the machines end up where the executions stopped.
    pub fn traces(&mut self, input: &[Symbol]) -> Result<Vec<Trace>, MachineError> {
        let separator = self
            .question
            .as_ref()
            .map(|q| q.split_symbol.clone())
            .unwrap_or_default();
        self.machines
            .iter_mut()
            .map(|m| {
                let mut trace = m.get_trace(input)?;
                trace.input_separator = separator.clone();
                Ok(trace)
            })
            .collect()
    }
}
