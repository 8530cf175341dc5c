//! Program listing and parameter command.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use clap::Args;
use pulsar_core::{ParamDescriptor, ParamKind, ParamValue, Program};
use pulsar_programs::ProgramList;

/// Sample rate the listed programs are built at. Parameters do not depend on it.
const LISTING_SAMPLE_RATE: f32 = 48_000.0;

#[derive(Args)]
pub struct ProgramsArgs {
    /// Show the parameters of one program
    #[arg(value_name = "PROGRAM")]
    program: Option<String>,
}

pub fn run(args: ProgramsArgs) -> anyhow::Result<()> {
    let programs = ProgramList::standard(LISTING_SAMPLE_RATE);

    if let Some(name) = &args.program {
        let index = ProgramList::index_of(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown program: {}", name))?;
        let program = programs
            .get(index)
            .ok_or_else(|| anyhow::anyhow!("Program {} is not built", index))?;
        print_params(program.as_ref());
        return Ok(());
    }

    println!("Available Programs");
    println!("==================");
    println!();
    for (index, program) in programs.iter().enumerate() {
        let count = program.param_count();
        let extras = if program.animation().is_some() {
            ", animated"
        } else {
            ""
        };
        println!(
            "  {:2}  {:16}  {} parameter{}{}",
            index,
            program.name(),
            count,
            if count == 1 { "" } else { "s" },
            extras
        );
    }
    println!();
    println!("Use 'pulsar-sim programs <PROGRAM>' for parameter details.");
    Ok(())
}

fn print_params(program: &dyn Program) {
    let name = program.name();
    println!("{}", name);
    println!("{}", "=".repeat(name.len()));
    println!();

    if program.param_count() == 0 {
        println!("No parameters. The pot is read directly.");
        return;
    }

    println!("  {:3}  {:14}  {:24}  {}", "#", "Name", "Range", "Default");
    println!("  {:3}  {:14}  {:24}  {}", "-", "----", "-----", "-------");
    for index in 0..program.param_count() {
        let Some(desc) = program.param_info(index) else {
            continue;
        };
        println!(
            "  {:3}  {:14}  {:24}  {}",
            index,
            desc.name,
            kind_text(desc.kind),
            value_text(&desc, desc.default)
        );
    }
}

/// Accepted values of a parameter, for display.
pub fn kind_text(kind: ParamKind) -> String {
    match kind {
        ParamKind::Bool => "On / Off".to_string(),
        ParamKind::Int { min, max } => format!("{}..{}", min, max),
        ParamKind::Float { min, max } => format!("{}..{}", min, max),
        ParamKind::Choice(labels) => labels.join(" / "),
    }
}

/// A parameter value, using its label where there is one.
pub fn value_text(desc: &ParamDescriptor, value: ParamValue) -> String {
    if let Some(label) = desc.label(value) {
        return label.to_string();
    }
    match value {
        ParamValue::Bool(b) => b.to_string(),
        ParamValue::Int(v) => v.to_string(),
        ParamValue::Float(v) => v.to_string(),
        ParamValue::Choice(i) => i.to_string(),
    }
}
