use itertools::Itertools;

use super::{Machine, NodeId};

impl Machine {
    fn state_label(&self, node: NodeId) -> String {
        let Some(n) = self.node(node) else {
            return node.to_string();
        };
        let marker = match (n.is_initial, n.is_accepting) {
            (true, true) => "→*",
            (true, false) => "→",
            (false, true) => "*",
            (false, false) => "",
        };
        if n.name.is_empty() {
            format!("{marker}{node}")
        } else {
            format!("{marker}{node} {}", n.name)
        }
    }

    /// Renders the transition table of the machine, with one row per state and one column per
    /// symbol. Initial states are marked with `→`, accepting states with `*`. A cell lists
    /// every target state, `-` means there is no transition. If the machine has epsilon
    /// transitions, they get an extra column `ε`.
    pub fn transition_table(&self) -> String {
        let has_epsilon = self.links.values().any(|l| l.has_epsilon);
        let mut builder = tabled::builder::Builder::default();
        builder.push_record(
            std::iter::once("State".to_string())
                .chain(self.alphabet.iter().cloned())
                .chain(has_epsilon.then(|| "ε".to_string())),
        );

        let cell = |targets: Vec<NodeId>| {
            if targets.is_empty() {
                "-".to_string()
            } else {
                targets.into_iter().sorted().dedup().join(", ")
            }
        };
        for &node in self.nodes.keys() {
            let mut row = vec![self.state_label(node)];
            for symbol in &self.alphabet {
                row.push(cell(self.reachable(node, symbol).0));
            }
            if has_epsilon {
                row.push(cell(
                    self.outgoing(node)
                        .filter(|l| l.has_epsilon)
                        .map(|l| l.target)
                        .collect(),
                ));
            }
            builder.push_record(row);
        }

        builder
            .build()
            .with(tabled::settings::Style::rounded())
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::machine::{simulation::tests::ends_in_a, Machine};

    #[test]
    fn table_lists_targets() {
        let table = ends_in_a().transition_table();
        let lines: Vec<_> = table.lines().collect();
        assert!(lines[1].contains("State"));
        assert!(table.contains("→N0 S"));
        assert!(table.contains("*N1 F"));
        assert!(!table.contains('ε'));
    }

    #[test]
    fn epsilon_column_and_missing_transitions() {
        let mut m = Machine::new("m1");
        m.set_alphabet(["a"], Some(true));
        let s = m.add_node((0.0, 0.0), "", true, true);
        let t = m.add_node((0.0, 0.0), "", false, false);
        m.add_link(s, t, vec![], BTreeMap::new(), true).unwrap();
        let table = m.transition_table();
        assert!(table.contains('ε'));
        assert!(table.contains("→*N0"));
        assert!(table.contains('-'));
    }
}
