// Copyright 2026 the Execution Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Profiling adapters for `si_emulator` (currently Tracy).
//!
//! This crate is `std`-only and keeps `si_emulator` itself free of profiling dependencies.
//! It listens for work-group scope callbacks and emits one profiler zone per work group.
//!
//! ## Backend
//! This crate currently supports the Tracy backend via `tracy-client`. Without a running
//! `tracy_client::Client` the sink records nothing.
//!
//! ## Example
//! ```ignore
//! use si_emulator_profiling::{KernelNameResolver, ProfilingTraceSink};
//!
//! let _client = tracy_client::Client::start();
//! let mut sink = ProfilingTraceSink::with_resolver(KernelNameResolver::default());
//! emulator.run(&kernel, &ndrange, Some(&mut sink))?;
//! # Ok::<(), si_emulator::EmulatorError>(())
//! ```

mod resolver;
mod sink;

pub use resolver::{DefaultLabelResolver, KernelNameResolver, LabelResolver};
pub use sink::ProfilingTraceSink;
