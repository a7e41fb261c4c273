//! Grading of exercises. A [`Question`] describes what the learner is asked to do, the
//! learner answers by building machines and possibly by submitting an [`Answer`], and
//! [`Question::check`] turns both into [`Feedback`].

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    machine::{NodeId, StateSet, Symbol},
    math::{Map, Set},
    Machine, MachineSpec, QuestionError,
};

/// Splits an input string into symbols. With an empty `split_symbol` every character is a
/// symbol. Spaces are removed and empty symbols dropped, so `"a, b,,c"` split on `","` gives
/// `["a", "b", "c"]`.
pub fn parse_input(input: &str, split_symbol: &str) -> Vec<Symbol> {
    input
        .split(split_symbol)
        .map(|s| s.replace(' ', ""))
        .filter(|s| !s.is_empty())
        .collect()
}

/// Where the machines should end up in a give-input question.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputTarget {
    /// No target, the question is only for exploration.
    None,
    /// Every machine should be in an accepting state.
    Accept,
}

/// A transition required by a satisfy-definition question, given by state names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionLink {
    /// Name of the source state.
    pub from: String,
    /// Name of the target state.
    pub to: String,
    /// The symbol read.
    pub symbol: Symbol,
}

/// The formal definition a machine has to match in a satisfy-definition question.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Definition {
    /// Names of all states.
    pub states: Vec<String>,
    /// Names of the accepting states.
    pub accepting_states: Vec<String>,
    /// Names of the initial states.
    pub initial_states: Vec<String>,
    /// All transitions.
    pub links: Vec<DefinitionLink>,
}

/// The kinds of questions, each with the data needed to grade it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum QuestionKind {
    /// Say for each sequence whether the given machine accepts it.
    DoesAccept {
        /// The sequences, as unsplit strings.
        sequences: Vec<String>,
    },
    /// Build a machine that accepts the same language as the target.
    GiveEquivalent {
        /// The machine to match.
        target_machine_spec: MachineSpec,
    },
    /// Feed symbols to the machines until they reach the target.
    GiveInput {
        /// What the machines should reach.
        target: InputTarget,
    },
    /// Give words of the given lengths that the machine accepts.
    GiveList {
        /// Required length of each word.
        lengths: Vec<usize>,
    },
    /// Build a machine with exactly the given states and transitions.
    SatisfyDefinition {
        /// The definition to match.
        definition: Definition,
    },
    /// Build a machine that accepts and rejects the listed sequences.
    SatisfyList {
        /// Sequences that have to be accepted.
        #[serde(default)]
        should_accept: Vec<String>,
        /// Sequences that have to be rejected.
        #[serde(default)]
        should_reject: Vec<String>,
    },
    /// Select the states the machine is in after reading the sequences.
    SelectStates {
        /// The input read before the part shown to the learner.
        initial_sequence: Vec<Symbol>,
        /// The input the learner has to follow.
        target_sequence: Vec<Symbol>,
    },
}

/// An exercise for the learner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Separates symbols when input is given as text. Empty means one symbol per character.
    #[serde(default)]
    pub split_symbol: String,
    /// What is asked.
    #[serde(flatten)]
    pub kind: QuestionKind,
}

/// What the learner submits in addition to the machines, if the question asks for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    /// One flag per sequence, for does-accept questions.
    Flags(Vec<bool>),
    /// One string per requested word, for give-list questions.
    Strings(Vec<String>),
    /// The selected states, for select-states questions.
    States(Vec<NodeId>),
}

impl Answer {
    fn flags(&self) -> Result<&[bool], QuestionError> {
        match self {
            Answer::Flags(flags) => Ok(flags),
            Answer::Strings(v) if v.is_empty() => Ok(&[]),
            Answer::States(v) if v.is_empty() => Ok(&[]),
            _ => Err(QuestionError::AnswerMismatch {
                expected: "a list of booleans",
            }),
        }
    }

    fn strings(&self) -> Result<&[String], QuestionError> {
        match self {
            Answer::Strings(strings) => Ok(strings),
            Answer::Flags(v) if v.is_empty() => Ok(&[]),
            Answer::States(v) if v.is_empty() => Ok(&[]),
            _ => Err(QuestionError::AnswerMismatch {
                expected: "a list of strings",
            }),
        }
    }

    fn states(&self) -> Result<&[NodeId], QuestionError> {
        match self {
            Answer::States(states) => Ok(states),
            Answer::Flags(v) if v.is_empty() => Ok(&[]),
            Answer::Strings(v) if v.is_empty() => Ok(&[]),
            _ => Err(QuestionError::AnswerMismatch {
                expected: "a list of state ids",
            }),
        }
    }
}

/// The result of grading, with details depending on the kind of question.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(
    tag = "type",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
#[allow(missing_docs)]
pub enum Feedback {
    DoesAccept {
        all_correct_flag: bool,
        /// Whether each given flag was right.
        is_correct_list: Vec<bool>,
    },
    GiveEquivalent {
        all_correct_flag: bool,
        message: String,
        /// A shortest word on which the machine is wrong.
        #[serde(skip_serializing_if = "Option::is_none")]
        incorrect_sequence: Option<Vec<Symbol>>,
        /// Whether that word should have been accepted.
        #[serde(skip_serializing_if = "Option::is_none")]
        should_accept_incorrect: Option<bool>,
    },
    GiveInput {
        all_correct_flag: bool,
    },
    GiveList {
        all_correct_flag: bool,
        input: Vec<String>,
        /// One message per entry, empty for correct entries.
        messages: Vec<String>,
        is_correct_list: Vec<bool>,
    },
    SatisfyDefinition {
        all_correct_flag: bool,
        message: String,
    },
    SatisfyList {
        all_correct_flag: bool,
        accept_list: Vec<bool>,
        reject_list: Vec<bool>,
    },
    SelectStates {
        all_correct_flag: bool,
        initial_input: Vec<Symbol>,
        subsequent_input: Vec<Symbol>,
    },
}

impl Feedback {
    /// Whether the answer is entirely correct.
    pub fn all_correct(&self) -> bool {
        match self {
            Feedback::DoesAccept { all_correct_flag, .. }
            | Feedback::GiveEquivalent { all_correct_flag, .. }
            | Feedback::GiveInput { all_correct_flag }
            | Feedback::GiveList { all_correct_flag, .. }
            | Feedback::SatisfyDefinition { all_correct_flag, .. }
            | Feedback::SatisfyList { all_correct_flag, .. }
            | Feedback::SelectStates { all_correct_flag, .. } => *all_correct_flag,
        }
    }

    /// The message shown to the learner, for the kinds that have one.
    pub fn message(&self) -> Option<&str> {
        match self {
            Feedback::GiveEquivalent { message, .. }
            | Feedback::SatisfyDefinition { message, .. } => Some(message),
            _ => None,
        }
    }
}

impl Question {
    /// Creates a question with the given kind and split symbol.
    pub fn new(kind: QuestionKind, split_symbol: impl Into<String>) -> Self {
        Self {
            split_symbol: split_symbol.into(),
            kind,
        }
    }

    /// Parses a question from JSON text.
    pub fn from_json(json: &str) -> Result<Self, QuestionError> {
        serde_json::from_str(json).map_err(|e| QuestionError::Spec(e.into()))
    }

    /// The name of the kind, as used in the JSON form.
    pub fn type_name(&self) -> &'static str {
        match self.kind {
            QuestionKind::DoesAccept { .. } => "does-accept",
            QuestionKind::GiveEquivalent { .. } => "give-equivalent",
            QuestionKind::GiveInput { .. } => "give-input",
            QuestionKind::GiveList { .. } => "give-list",
            QuestionKind::SatisfyDefinition { .. } => "satisfy-definition",
            QuestionKind::SatisfyList { .. } => "satisfy-list",
            QuestionKind::SelectStates { .. } => "select-states",
        }
    }

    /// Whether the learner may edit the machines. Questions about a given machine forbid it.
    pub fn allows_editing(&self) -> bool {
        !matches!(
            self.kind,
            QuestionKind::GiveList { .. }
                | QuestionKind::SelectStates { .. }
                | QuestionKind::DoesAccept { .. }
                | QuestionKind::GiveInput { .. }
        )
    }

    /// Splits text into symbols using the split symbol of this question.
    pub fn parse_input(&self, input: &str) -> Vec<Symbol> {
        parse_input(input, &self.split_symbol)
    }

    /// Joins symbols into text using the split symbol of this question.
    pub fn join(&self, sequence: &[Symbol]) -> String {
        sequence.join(&self.split_symbol)
    }

    /// Grades the machines and the optional answer.
    ///
    /// Most kinds only look at the first machine, give-input looks at all of them and at
    /// their cursors, which the caller has to have moved along the input given so far.
    /// Machines may be run as part of grading, which moves their cursors.
    pub fn check(
        &self,
        machines: &mut [Machine],
        answer: Option<&Answer>,
    ) -> Result<Feedback, QuestionError> {
        debug!("checking {} question", self.type_name());
        if let QuestionKind::GiveInput { target } = &self.kind {
            let all_correct_flag = match target {
                InputTarget::None => false,
                InputTarget::Accept => machines.iter().all(|m| m.is_in_accepting_state()),
            };
            return Ok(Feedback::GiveInput { all_correct_flag });
        }

        let machine = machines.first_mut().ok_or(QuestionError::NoMachine)?;
        match &self.kind {
            QuestionKind::DoesAccept { sequences } => {
                let flags = answer.map(Answer::flags).transpose()?.unwrap_or_default();
                Ok(self.check_does_accept(machine, sequences, flags))
            }
            QuestionKind::GiveEquivalent {
                target_machine_spec,
            } => self.check_give_equivalent(machine, target_machine_spec),
            QuestionKind::GiveList { lengths } => {
                let strings = answer.map(Answer::strings).transpose()?.unwrap_or_default();
                Ok(self.check_give_list(machine, lengths, strings))
            }
            QuestionKind::SatisfyDefinition { definition } => {
                check_satisfy_definition(machine, definition)
            }
            QuestionKind::SatisfyList {
                should_accept,
                should_reject,
            } => Ok(self.check_satisfy_list(machine, should_accept, should_reject)),
            QuestionKind::SelectStates {
                initial_sequence,
                target_sequence,
            } => {
                let selected = answer.map(Answer::states).transpose()?.unwrap_or_default();
                Ok(check_select_states(
                    machine,
                    initial_sequence,
                    target_sequence,
                    selected,
                ))
            }
            QuestionKind::GiveInput { .. } => Ok(Feedback::GiveInput {
                all_correct_flag: false,
            }),
        }
    }

    fn check_does_accept(
        &self,
        machine: &mut Machine,
        sequences: &[String],
        flags: &[bool],
    ) -> Feedback {
        let is_correct_list = sequences
            .iter()
            .enumerate()
            .map(|(i, sequence)| {
                let accepted = machine.accepts(self.parse_input(sequence));
                flags.get(i) == Some(&accepted)
            })
            .collect_vec();
        Feedback::DoesAccept {
            all_correct_flag: is_correct_list.iter().all(|&c| c),
            is_correct_list,
        }
    }

    fn check_give_equivalent(
        &self,
        machine: &Machine,
        target_spec: &MachineSpec,
    ) -> Result<Feedback, QuestionError> {
        let target = Machine::from_spec("tgt", target_spec)?;
        let wrong = |message: &str| Feedback::GiveEquivalent {
            all_correct_flag: false,
            message: message.to_string(),
            incorrect_sequence: None,
            should_accept_incorrect: None,
        };
        if machine.accepting_node_count() == 0 {
            return Ok(wrong("Machine must have an accepting state."));
        }
        if machine.initial_node_count() == 0 {
            return Ok(wrong("Machine must have an initial state."));
        }
        if machine.is_equivalent_to(&target)? {
            return Ok(Feedback::GiveEquivalent {
                all_correct_flag: true,
                message: String::new(),
                incorrect_sequence: None,
                should_accept_incorrect: None,
            });
        }

        // words the target accepts but the machine rejects, then the other way around
        let mut complement = machine.scratch_copy("m1c");
        complement.complement();
        let mut target_complement = target.scratch_copy("t1c");
        target_complement.complement();
        let witnesses = [
            (complement.get_union_with(&target), true, "accept"),
            (machine.get_union_with(&target_complement), false, "reject"),
        ];
        for (difference, should_accept, verb) in witnesses {
            if let Some(sequence) = difference.get_accepted_sequence() {
                let message = if sequence.is_empty() {
                    format!("Incorrect – the machine should {verb} the empty string")
                } else {
                    format!("Incorrect – the machine should {verb} ‘{}’", self.join(&sequence))
                };
                return Ok(Feedback::GiveEquivalent {
                    all_correct_flag: false,
                    message,
                    incorrect_sequence: Some(sequence),
                    should_accept_incorrect: Some(should_accept),
                });
            }
        }
        Ok(wrong(""))
    }

    fn check_give_list(
        &self,
        machine: &mut Machine,
        lengths: &[usize],
        answers: &[String],
    ) -> Feedback {
        let mut seen: Set<&str> = Set::default();
        let mut messages = vec![String::new(); lengths.len()];
        let mut is_correct_list = vec![true; lengths.len()];
        let input = (0..lengths.len())
            .map(|i| answers.get(i).cloned().unwrap_or_default())
            .collect_vec();

        for (index, (string, &expected)) in input.iter().zip(lengths).enumerate() {
            let sequence = self.parse_input(string);
            let message = if sequence.len() != expected {
                format!(
                    "Incorrect length – expected {expected} but got {}.",
                    sequence.len()
                )
            } else if !seen.insert(string.as_str()) {
                "Incorrect – duplicate entry.".to_string()
            } else if let Some(symbol) = sequence
                .iter()
                .find(|s| !machine.alphabet().contains(*s))
            {
                format!("Incorrect – '{symbol}' is not in the machine's alphabet.")
            } else if !machine.accepts(&sequence) {
                "Incorrect – not accepted by machine.".to_string()
            } else {
                continue;
            };
            messages[index] = message;
            is_correct_list[index] = false;
        }

        Feedback::GiveList {
            all_correct_flag: is_correct_list.iter().all(|&c| c),
            input,
            messages,
            is_correct_list,
        }
    }

    fn check_satisfy_list(
        &self,
        machine: &mut Machine,
        should_accept: &[String],
        should_reject: &[String],
    ) -> Feedback {
        let accept_list = should_accept
            .iter()
            .map(|s| machine.accepts(self.parse_input(s)))
            .collect_vec();
        let reject_list = should_reject
            .iter()
            .map(|s| !machine.accepts(self.parse_input(s)))
            .collect_vec();
        Feedback::SatisfyList {
            all_correct_flag: accept_list.iter().chain(&reject_list).all(|&c| c),
            accept_list,
            reject_list,
        }
    }
}

fn check_satisfy_definition(
    machine: &Machine,
    definition: &Definition,
) -> Result<Feedback, QuestionError> {
    let verdict = |message: Option<String>| {
        Ok(Feedback::SatisfyDefinition {
            all_correct_flag: message.is_none(),
            message: message.unwrap_or_default(),
        })
    };

    let node_count = machine.node_count();
    if node_count != definition.states.len() {
        return verdict(Some(format!(
            "Incorrect – the machine should have {} states but it has {node_count} states.",
            definition.states.len()
        )));
    }

    let names = machine.nodes().map(|n| n.name()).collect_vec();
    if let Some(missing) = definition.states.iter().find(|s| !names.contains(&s.as_str())) {
        return verdict(Some(format!(
            "Incorrect – the machine should have a state named ‘{missing}’."
        )));
    }

    let accepting = machine
        .nodes()
        .filter(|n| n.is_accepting())
        .map(|n| n.name())
        .collect_vec();
    if accepting.len() != definition.accepting_states.len() {
        return verdict(Some(format!(
            "Incorrect – the machine should have {} accepting states but it has {} accepting states.",
            definition.accepting_states.len(),
            accepting.len()
        )));
    }
    if let Some(missing) = definition
        .accepting_states
        .iter()
        .find(|s| !accepting.contains(&s.as_str()))
    {
        return verdict(Some(format!(
            "Incorrect – state ‘{missing}’ should be an accepting state."
        )));
    }

    let initial = machine
        .nodes()
        .filter(|n| n.is_initial())
        .map(|n| n.name())
        .collect_vec();
    if initial.len() != definition.initial_states.len() {
        return verdict(Some(format!(
            "Incorrect – the machine should have {} initial states but it has {} initial states.",
            definition.initial_states.len(),
            initial.len()
        )));
    }
    if let Some(missing) = definition
        .initial_states
        .iter()
        .find(|s| !initial.contains(&s.as_str()))
    {
        return verdict(Some(format!(
            "Incorrect – state ‘{missing}’ should be an initial state."
        )));
    }

    // with duplicate names the last state wins
    let by_name: Map<&str, NodeId> = machine.nodes().map(|n| (n.name(), n.id())).collect();
    let lookup = |name: &str| {
        by_name
            .get(name)
            .copied()
            .ok_or_else(|| QuestionError::UnknownState(name.to_string()))
    };
    for link in &definition.links {
        let (from, to) = (lookup(&link.from)?, lookup(&link.to)?);
        if !machine.reachable(from, &link.symbol).0.contains(&to) {
            return verdict(Some(format!(
                "Incorrect – there should be a link from state ‘{}’ to ‘{}’ for ‘{}’.",
                link.from, link.to, link.symbol
            )));
        }
    }

    for link in machine.links() {
        let name_of = |id| machine.node(id).map(|n| n.name()).unwrap_or_default();
        let (from, to) = (name_of(link.source()), name_of(link.target()));
        for symbol in link.input() {
            let expected = definition
                .links
                .iter()
                .any(|l| l.from == from && l.to == to && &l.symbol == symbol);
            if !expected {
                return verdict(Some(format!(
                    "Incorrect – there should not be a link from state ‘{from}’ to ‘{to}’ for ‘{symbol}’."
                )));
            }
        }
    }

    verdict(None)
}

fn check_select_states(
    machine: &mut Machine,
    initial_sequence: &[Symbol],
    target_sequence: &[Symbol],
    selected: &[NodeId],
) -> Feedback {
    machine.accepts(initial_sequence.iter().chain(target_sequence));
    let reached: &StateSet = machine.cursor().current();
    let selected: StateSet = selected.iter().copied().collect();
    Feedback::SelectStates {
        all_correct_flag: *reached == selected,
        initial_input: initial_sequence.to_vec(),
        subsequent_input: target_sequence.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn ends_in_a() -> Machine {
        let json = r#"{"nodes":[{"id":"A","x":0,"y":0,"isInit":true,"name":"S"},
                                {"id":"B","x":0,"y":0,"isAcc":true,"name":"F"}],
            "links":[{"from":"A","to":"A","input":["b"]},{"from":"A","to":"B","input":["a"]},
                     {"from":"B","to":"B","input":["a"]},{"from":"B","to":"A","input":["b"]}],
            "attributes":{"alphabet":["a","b"]}}"#;
        Machine::from_spec("m1", &MachineSpec::from_json(json).unwrap()).unwrap()
    }

    fn a_machine(plus: bool) -> Machine {
        let mut m = Machine::new("m1");
        m.set_alphabet(["a"], None);
        let s = m.add_node((0.0, 0.0), "", true, !plus);
        let f = m.add_node((0.0, 0.0), "", false, true);
        m.add_link(s, f, vec!["a".into()], BTreeMap::new(), false)
            .unwrap();
        m.add_link(f, f, vec!["a".into()], BTreeMap::new(), false)
            .unwrap();
        m
    }

    #[test]
    fn input_parsing() {
        assert_eq!(parse_input("ab b", ""), ["a", "b", "b"]);
        assert_eq!(parse_input("coin, push,,coin", ","), ["coin", "push", "coin"]);
        assert!(parse_input("", ",").is_empty());
    }

    #[test]
    fn questions_parse_from_json() {
        let q = Question::from_json(
            r#"{"type":"satisfy-list","splitSymbol":",","shouldAccept":["a"],"text":"ignored"}"#,
        )
        .unwrap();
        assert_eq!(
            q.kind,
            QuestionKind::SatisfyList {
                should_accept: vec!["a".into()],
                should_reject: vec![]
            }
        );
        assert!(q.allows_editing());
        let q = Question::from_json(r#"{"type":"give-input","target":"accept"}"#).unwrap();
        assert!(!q.allows_editing());
        assert_eq!(q.split_symbol, "");
        assert!(Question::from_json(r#"{"type":"dfa-convert"}"#).is_err());
    }

    #[test]
    fn does_accept() {
        let q = Question::new(
            QuestionKind::DoesAccept {
                sequences: vec!["a".into(), "ab".into(), "".into()],
            },
            "",
        );
        let mut machines = [ends_in_a()];
        let answer = Answer::Flags(vec![true, false, false]);
        let feedback = q.check(&mut machines, Some(&answer)).unwrap();
        assert!(feedback.all_correct());

        let answer = Answer::Flags(vec![true, true]);
        let feedback = q.check(&mut machines, Some(&answer)).unwrap();
        assert_eq!(
            feedback,
            Feedback::DoesAccept {
                all_correct_flag: false,
                is_correct_list: vec![true, false, false]
            }
        );
        assert!(q
            .check(&mut machines, Some(&Answer::Strings(vec!["x".into()])))
            .is_err());
    }

    #[test]
    fn give_equivalent_finds_empty_counterexample() {
        let q = Question::new(
            QuestionKind::GiveEquivalent {
                target_machine_spec: a_machine(false).get_spec(),
            },
            "",
        );
        let mut machines = [a_machine(true)];
        let feedback = q.check(&mut machines, None).unwrap();
        assert_eq!(
            feedback,
            Feedback::GiveEquivalent {
                all_correct_flag: false,
                message: "Incorrect – the machine should accept the empty string".into(),
                incorrect_sequence: Some(vec![]),
                should_accept_incorrect: Some(true),
            }
        );

        let q = Question::new(
            QuestionKind::GiveEquivalent {
                target_machine_spec: a_machine(true).get_spec(),
            },
            "",
        );
        let mut machines = [a_machine(false)];
        let feedback = q.check(&mut machines, None).unwrap();
        assert_eq!(
            feedback.message(),
            Some("Incorrect – the machine should reject the empty string")
        );

        let mut machines = [a_machine(true)];
        assert!(q.check(&mut machines, None).unwrap().all_correct());
    }

    #[test]
    fn give_equivalent_joins_counterexample() {
        let mut target = ends_in_a();
        target.set_alphabet(["a", "b"], None);
        let q = Question::new(
            QuestionKind::GiveEquivalent {
                target_machine_spec: target.get_spec(),
            },
            ",",
        );
        let mut wrong = ends_in_a();
        let f = wrong.node_ids()[1];
        let s = wrong.node_ids()[0];
        let fs = wrong.link_to(f, s).unwrap();
        wrong.delete_link(fs).unwrap();
        let feedback = q.check(std::slice::from_mut(&mut wrong), None).unwrap();
        assert_eq!(
            feedback.message(),
            Some("Incorrect – the machine should accept ‘a,b,a’")
        );

        let mut no_accepting = Machine::new("m1");
        no_accepting.add_node((0.0, 0.0), "", true, false);
        let feedback = q
            .check(std::slice::from_mut(&mut no_accepting), None)
            .unwrap();
        assert_eq!(feedback.message(), Some("Machine must have an accepting state."));
    }

    #[test]
    fn give_list_messages() {
        let q = Question::new(QuestionKind::GiveList { lengths: vec![1, 2, 2, 2, 3] }, "");
        let mut machines = [ends_in_a()];
        let answer = Answer::Strings(vec![
            "a".into(),
            "ba".into(),
            "ba".into(),
            "ca".into(),
            "bbb".into(),
        ]);
        let Feedback::GiveList {
            all_correct_flag,
            messages,
            is_correct_list,
            ..
        } = q.check(&mut machines, Some(&answer)).unwrap()
        else {
            panic!("wrong feedback kind");
        };
        assert!(!all_correct_flag);
        assert_eq!(is_correct_list, [true, true, false, false, false]);
        assert_eq!(messages[2], "Incorrect – duplicate entry.");
        assert_eq!(messages[3], "Incorrect – 'c' is not in the machine's alphabet.");
        assert_eq!(messages[4], "Incorrect – not accepted by machine.");

        let short = Answer::Strings(vec!["aa".into()]);
        let Feedback::GiveList { messages, .. } = q.check(&mut machines, Some(&short)).unwrap()
        else {
            panic!("wrong feedback kind");
        };
        assert_eq!(messages[0], "Incorrect length – expected 1 but got 2.");
        assert_eq!(messages[1], "Incorrect length – expected 2 but got 0.");
    }

    #[test]
    fn satisfy_definition() {
        let mut definition = Definition {
            states: vec!["S".into(), "F".into()],
            accepting_states: vec!["F".into()],
            initial_states: vec!["S".into()],
            links: [("S", "S", "b"), ("S", "F", "a"), ("F", "F", "a"), ("F", "S", "b")]
                .into_iter()
                .map(|(from, to, symbol)| DefinitionLink {
                    from: from.into(),
                    to: to.into(),
                    symbol: symbol.into(),
                })
                .collect(),
        };
        let mut machines = [ends_in_a()];
        let check = |d: &Definition, machines: &mut [Machine]| {
            Question::new(
                QuestionKind::SatisfyDefinition {
                    definition: d.clone(),
                },
                "",
            )
            .check(machines, None)
            .unwrap()
        };
        assert!(check(&definition, &mut machines).all_correct());

        definition.links.pop();
        assert_eq!(
            check(&definition, &mut machines).message(),
            Some("Incorrect – there should not be a link from state ‘F’ to ‘S’ for ‘b’.")
        );

        definition.accepting_states = vec!["S".into()];
        assert_eq!(
            check(&definition, &mut machines).message(),
            Some("Incorrect – state ‘S’ should be an accepting state.")
        );

        definition.states.push("X".into());
        assert_eq!(
            check(&definition, &mut machines).message(),
            Some("Incorrect – the machine should have 3 states but it has 2 states.")
        );
    }

    #[test]
    fn satisfy_list_and_select_states() {
        let q = Question::new(
            QuestionKind::SatisfyList {
                should_accept: vec!["a".into(), "b a".into()],
                should_reject: vec!["".into(), "ab".into(), "aa".into()],
            },
            "",
        );
        let mut machines = [ends_in_a()];
        assert_eq!(
            q.check(&mut machines, None).unwrap(),
            Feedback::SatisfyList {
                all_correct_flag: false,
                accept_list: vec![true, true],
                reject_list: vec![true, true, false],
            }
        );

        let q = Question::new(
            QuestionKind::SelectStates {
                initial_sequence: vec!["b".into()],
                target_sequence: vec!["a".into()],
            },
            "",
        );
        let f = machines[0].node_ids()[1];
        let answer = Answer::States(vec![f]);
        assert!(q.check(&mut machines, Some(&answer)).unwrap().all_correct());
        let nothing = Answer::States(vec![]);
        assert!(!q.check(&mut machines, Some(&nothing)).unwrap().all_correct());
    }

    #[test]
    fn give_input_uses_cursors() {
        let q = Question::new(
            QuestionKind::GiveInput {
                target: InputTarget::Accept,
            },
            "",
        );
        let mut machines = [ends_in_a(), ends_in_a()];
        machines[0].accepts(["a"]);
        machines[1].accepts(["b"]);
        assert!(!q.check(&mut machines, None).unwrap().all_correct());
        machines[1].accepts(["b", "a"]);
        assert!(q.check(&mut machines, None).unwrap().all_correct());
        assert!(q.check(&mut [], None).unwrap() == Feedback::GiveInput { all_correct_flag: true });
    }

    #[test]
    fn feedback_serializes_in_camel_case() {
        let json = serde_json::to_value(Feedback::SatisfyList {
            all_correct_flag: true,
            accept_list: vec![],
            reject_list: vec![],
        })
        .unwrap();
        assert_eq!(json["type"], "satisfy-list");
        assert_eq!(json["allCorrectFlag"], true);
        assert!(json.get("acceptList").is_some());
    }
}
