//! irkit Driver
//!
//! Command-line front end that builds sample functions with the irkit
//! builder API, numbers them and prints their textual form.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use irkit_ir::{
    AtomicOp, AtomicOrdering, Const, FuncAttr, Function, Linkage, Param, ParamAttr, Type, Value,
    ValueRef,
};
use log::info;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(Parser)]
#[command(name = "irkit")]
#[command(about = "Build and print LLVM IR functions")]
#[command(version = "0.1.0")]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Atomic counter increment built from memory instructions
    Counter {
        /// Function name
        #[arg(long, default_value = "bump")]
        name: String,

        /// Ordering of the atomic operations
        #[arg(long, default_value = "seq_cst")]
        ordering: AtomicOrdering,

        /// Print only the declaration
        #[arg(long)]
        declare: bool,

        /// Skip local ID assignment
        #[arg(long)]
        no_number: bool,

        /// What to print
        #[arg(long, value_enum, default_value_t = Emit::Text)]
        emit: Emit,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Emit {
    /// Textual IR
    Text,
    /// Inferred instruction result types as JSON
    Types,
}

#[derive(Serialize)]
struct InstType {
    ident: String,
    opcode: &'static str,
    #[serde(rename = "type")]
    ty: Type,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::init();
    }

    match cli.command {
        Commands::Counter { name, ordering, declare, no_number, emit, output } => {
            let function = build_counter(&name, ordering, !declare);
            if !no_number {
                function.assign_ids()?;
            }
            let text = match emit {
                Emit::Text => function.def()?,
                Emit::Types => inferred_types(&function)?,
            };
            write_output(&text, output.as_deref())?;
        }
    }

    Ok(())
}

/// `i64 @name(i64* %counter, i64 %delta)`: stores the delta in a stack slot,
/// adds it atomically and returns the previous value. The trailing
/// compare-exchange resets the counter to zero if it still holds that
/// previous value.
fn build_counter(name: &str, ordering: AtomicOrdering, with_body: bool) -> Function {
    let mut function = Function::new(
        name,
        Type::i64(),
        vec![
            Param::new("counter", Type::ptr(Type::i64())).with_attr(ParamAttr::NonNull),
            Param::new("", Type::i64()),
        ],
    );
    function.func_attrs.push(FuncAttr::NoUnwind);
    if !with_body {
        function.linkage = Some(Linkage::External);
        return function;
    }
    function.linkage = Some(Linkage::Internal);

    let counter: ValueRef = function.params()[0].clone();
    let delta: ValueRef = function.params()[1].clone();

    let entry = function.new_block("");
    let slot = entry.new_alloca(Type::i64());
    entry.new_store(delta, slot.clone());
    let loaded = entry.new_load(slot);
    let old = entry.new_atomic_rmw(AtomicOp::Add, counter.clone(), loaded, ordering);
    entry.new_fence(ordering);
    entry.new_cmpxchg(
        counter,
        old.clone(),
        Rc::new(Const::i64(0)),
        ordering,
        AtomicOrdering::Monotonic,
    );
    entry.new_ret(Some(old));
    function
}

fn inferred_types(function: &Function) -> Result<String> {
    let mut types = Vec::new();
    for block in function.blocks() {
        for inst in block.insts().iter().filter(|inst| !inst.is_void()) {
            types.push(InstType {
                ident: inst.ident(),
                opcode: inst.opcode(),
                ty: inst.ty()?,
            });
        }
    }
    Ok(serde_json::to_string_pretty(&types)?)
}

fn write_output(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, format!("{text}\n"))
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("wrote {}", path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}
