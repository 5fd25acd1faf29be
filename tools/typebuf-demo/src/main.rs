// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! typebuf-demo - Push sample values into a TypedBuffer and dispatch over them
//!
//! Stores a few ints, a double and a color, prints them through per-type
//! handlers, then rewrites every int in place and prints again.

use clap::Parser;
use typebuf::{BufferConfig, DispatchVisitor, Storable, TypedBuffer};

/// Demonstrate typed storage and dispatch
#[derive(Parser, Debug)]
#[command(name = "typebuf-demo")]
#[command(version = "0.1.0")]
#[command(about = "Push sample values into a TypedBuffer and dispatch over them")]
struct Args {
    /// Print-only passes to run after the mutating pass
    #[arg(short, long, default_value_t = 1)]
    passes: u32,

    /// Byte stride of the debug dump (default 1, a word at every byte)
    #[arg(long)]
    dump_stride: Option<usize>,

    /// Refuse to grow the buffer past this many bytes
    #[arg(long)]
    max_capacity: Option<usize>,

    /// Skip the debug dump
    #[arg(long)]
    no_dump: bool,
}

#[derive(Debug, Clone, Copy)]
#[repr(C)]
struct Color {
    red: u8,
    green: u8,
    blue: u8,
}

// SAFETY: three u8 fields, no padding, any bit pattern is a valid color.
unsafe impl Storable for Color {}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn config_from(args: &Args) -> Result<BufferConfig, typebuf::BufferError> {
    let mut config = BufferConfig::from_env()?;
    if let Some(stride) = args.dump_stride {
        config = config.with_dump_stride(stride);
    }
    if let Some(max) = args.max_capacity {
        config = config.with_max_capacity(max);
    }
    Ok(config)
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut buffer = TypedBuffer::with_config(config_from(args)?)?;

    buffer.append(5i32)?;
    buffer.append(10i32)?;
    buffer.append(15.46f64)?;
    buffer.append(Color {
        red: 255,
        green: 0,
        blue: 0,
    })?;
    buffer.append(99i32)?;
    log::info!(
        "stored {} values in {} of {} bytes",
        buffer.len(),
        buffer.used_bytes(),
        buffer.capacity()
    );

    if !args.no_dump {
        println!("{}", buffer.debug_dump());
    }
    println!();

    let mut visitor = DispatchVisitor::new(&mut buffer);
    visitor.register::<i32, _>(|v| println!("int: {}", v));
    visitor.register::<f64, _>(|v| println!("double: {}", v));
    visitor.register::<Color, _>(|c| println!("Color: {} {} {}", c.red, c.green, c.blue));
    visitor.dispatch()?;

    println!("----");

    // with modifying
    visitor.register::<i32, _>(|v| {
        *v = -1;
        println!("int: {}", v);
    });
    visitor.dispatch()?;

    for _ in 0..args.passes {
        println!("----");
        visitor.register::<i32, _>(|v| println!("It's int type with value {}", v));
        let stats = visitor.dispatch()?;
        log::info!(
            "pass: {} visited, {} matched, {} skipped",
            stats.visited,
            stats.matched,
            stats.skipped
        );
    }
    drop(visitor);

    if !args.no_dump {
        println!("----");
        println!("{}", buffer.debug_dump());
    }
    Ok(())
}
