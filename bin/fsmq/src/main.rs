use std::io::Read;

use anyhow::Context;
use fsm::prelude::*;

use tracing::{debug, info, trace};
use tracing_subscriber::{filter, prelude::*};

use clap::{Arg, ArgMatches, Command};

fn cli() -> clap::Command {
    let input = || Arg::new("input").required(true).help("input sequence, split by --split");
    Command::new("fsmq")
    .about("Queries and transforms finite state machines given as JSON specs")
    .subcommand_required(true)
    .arg(
        Arg::new("verbosity")
        .short('v')
        .long("verbosity")
        .num_args(0..=1)
        .require_equals(true)
        .value_parser(["info", "debug", "trace"])
        .default_missing_value("info")
    )
    .arg(
        Arg::new("machine")
        .short('m')
        .long("machine")
        .global(true)
        .help("file containing the machine spec, read from stdin if absent")
    )
    .arg(
        Arg::new("split")
        .short('s')
        .long("split")
        .global(true)
        .default_value("")
        .help("symbol separating the symbols of an input sequence, empty means one per character")
    )
    .subcommand(Command::new("dfa").about("converts the machine into a deterministic one"))
    .subcommand(Command::new("minimize").about("minimizes the machine"))
    .subcommand(Command::new("reverse").about("reverses the machine"))
    .subcommand(Command::new("complement").about("complements the machine"))
    .subcommand(
        Command::new("complete")
        .about("adds missing transitions")
        .arg(
            Arg::new("mode")
            .long("mode")
            .value_parser(["blackhole", "ignore"])
            .default_value("blackhole")
        )
    )
    .subcommand(Command::new("accepts").about("decides whether the input is accepted").arg(input()))
    .subcommand(Command::new("trace").about("records the execution on the input").arg(input()))
    .subcommand(
        Command::new("equivalent")
        .about("decides whether the machine accepts the same language as another one")
        .arg(Arg::new("other").required(true).help("file containing the other machine spec"))
    )
    .subcommand(Command::new("witness").about("prints a shortest accepted sequence"))
    .subcommand(Command::new("table").about("prints the transition table"))
    .subcommand(
        Command::new("check")
        .about("grades the machine against a question")
        .arg(Arg::new("question").required(true).help("file containing the question"))
        .arg(Arg::new("answer").help("answer as JSON, e.g. [true, false]"))
    )
}

fn setup_logging(matches: &ArgMatches) {
    let level = match matches
        .try_get_one::<String>("verbosity")
        .ok()
        .flatten()
        .map(|m| m.as_str())
    {
        Some("trace") => filter::LevelFilter::TRACE,
        Some("debug") => filter::LevelFilter::DEBUG,
        Some("info") => filter::LevelFilter::INFO,
        _ => filter::LevelFilter::WARN,
    };

    let stderr_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(stderr_log.with_filter(level))
        .init();

    trace!("setup {level} logging");
}

fn read_machine(path: Option<&String>) -> anyhow::Result<Machine> {
    let text = match path {
        Some(path) => {
            debug!("reading machine from {path}");
            std::fs::read_to_string(path).with_context(|| format!("could not read {path}"))?
        }
        None => {
            debug!("reading machine from stdin");
            let mut text = String::new();
            std::io::stdin().lock().read_to_string(&mut text)?;
            text
        }
    };
    Ok(Machine::from_spec("m1", &MachineSpec::from_json(&text)?)?)
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    let mut machine = read_machine(matches.get_one::<String>("machine"))?;
    let split = matches
        .get_one::<String>("split")
        .map(String::as_str)
        .unwrap_or_default();
    info!(
        "read machine with {} states and {} links",
        machine.node_count(),
        machine.link_count()
    );

    match matches.subcommand() {
        Some(("dfa", _)) => {
            machine.convert_to_dfa();
            print_json(&machine.get_spec())
        }
        Some(("minimize", _)) => {
            machine.minimize();
            print_json(&machine.get_spec())
        }
        Some(("reverse", _)) => {
            machine.reverse();
            print_json(&machine.get_spec())
        }
        Some(("complement", _)) => {
            machine.complement();
            print_json(&machine.get_spec())
        }
        Some(("complete", sub)) => {
            let mode: Completion = sub
                .get_one::<String>("mode")
                .map(String::as_str)
                .unwrap_or("blackhole")
                .parse()?;
            machine.completely_specify(mode);
            print_json(&machine.get_spec())
        }
        Some(("accepts", sub)) => {
            let input = parse_input(
                sub.get_one::<String>("input").map_or("", String::as_str),
                split,
            );
            print_json(&machine.accepts(input))
        }
        Some(("trace", sub)) => {
            let input = parse_input(
                sub.get_one::<String>("input").map_or("", String::as_str),
                split,
            );
            let mut trace = machine.get_trace(input)?;
            trace.input_separator = split.to_string();
            print_json(&trace)
        }
        Some(("equivalent", sub)) => {
            let other = read_machine(sub.get_one::<String>("other"))?;
            print_json(&machine.is_equivalent_to(&other)?)
        }
        Some(("witness", _)) => print_json(&machine.get_accepted_sequence()),
        Some(("table", _)) => {
            print!("{}", machine.transition_table());
            Ok(())
        }
        Some(("check", sub)) => {
            let path = sub
                .get_one::<String>("question")
                .context("missing question")?;
            let question = Question::from_json(&std::fs::read_to_string(path)?)?;
            let answer: Option<Answer> = sub
                .get_one::<String>("answer")
                .map(|a| serde_json::from_str(a))
                .transpose()?;
            let mut bench = Workbench::new();
            bench.add_machine(&machine.get_spec())?;
            bench.set_up_question(question);
            print_json(&bench.check_answer(answer.as_ref())?)
        }
        _ => unreachable!(),
    }
}

pub fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();

    setup_logging(&matches);

    run(&matches)
}
