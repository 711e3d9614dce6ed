#![crate_name = "leakanalyzer"]
#![crate_type = "lib"]

//! # Leakanalyzer
//!
//! A streaming heuristic which tells persistent, growing allocation patterns apart from transient spikes.
//!
//! ## Introduction
//!
//! Leakanalyzer doesn't track single allocations, object graphs or call stacks:
//! it only looks at **how many live instances of each class of allocations exist**,
//! sampled periodically by the caller.
//!
//! A class may be an allocation size bucket ([`SizeClass`]), the function which created the instances ([`CallSite`]),
//! or anything implementing [`ValueType`].
//!
//! Each time a new ranked snapshot is submitted to the [`LeakAnalyzer`]:
//!
//! 1. the growth of each class since the previous snapshot is ranked;
//! 2. the classes at the top of the ranking, before the first drop by more than 50%, are suspected;
//! 3. suspected classes gain a point, while classes which weren't suspected lose all of their points;
//! 4. classes which have gathered `score_threshold` points are reported as leak suspects.
//!
//! ### Why do I need this?
//!
//! Even in Rust, memory leaks can occur, especially when storing data in maps or vectors along time without cleaning them up.
//! Memory usage grows anyway in a healthy program, though, so seeing it grow once doesn't tell much.
//!
//! What leaks have in common is that they **keep growing, cycle after cycle, much faster than anything else**.
//! That's what the [`LeakAnalyzer`] looks for.
//!
//! ## Usage
//!
//! ### Cargo.toml
//!
//! Add the following to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! leakanalyzer = "0.1"
//! ```
//!
//! ### Setup
//!
//! The easiest way to get snapshots is to **set the allocator** to [`SizeClassAllocator`],
//! which counts the live allocations of each size class:
//!
//! ```rust
//! use leakanalyzer::SizeClassAllocator;
//!
//! #[global_allocator]
//! static ALLOCATOR: SizeClassAllocator = SizeClassAllocator::init();
//! ```
//!
//! If you'd rather know **where** instances are created, you can record them in a [`CallSiteTable`],
//! which resolves the call site of each instance from the backtrace.
//!
//! Any other source of ranked snapshots works too: see [`SnapshotSource`] and [`from_fn`].
//!
//! ### Analyzing
//!
//! Then create a [`LeakAnalyzer`] and sample the allocator periodically:
//!
//! ```rust,no_run
//! use leakanalyzer::{LeakAnalyzer, SizeClass, SizeClassAllocator};
//!
//! #[global_allocator]
//! static ALLOCATOR: SizeClassAllocator = SizeClassAllocator::init();
//!
//! fn main() {
//!     let mut analyzer = LeakAnalyzer::<SizeClass>::new(16, 4).expect("valid config");
//!     let mut source = &ALLOCATOR;
//!
//!     loop {
//!         std::thread::sleep(std::time::Duration::from_secs(10));
//!         analyzer.sample(&mut source);
//!
//!         for suspect in analyzer.suspects() {
//!             println!("allocations of {suspect} bytes are leaking");
//!         }
//!     }
//! }
//! ```
//!
//! The state of the analyzer can be rendered with [`LeakAnalyzer::dump`]:
//!
//! ```text
//! ***** Top 2 sizes *****
//!         64:       3000 (      1000)
//!         16:         10 (         0)
//! Suspected sizes: 64
//! ```
//!
//! ## Logging
//!
//! The analyzer logs the intermediate state of each cycle with [`tracing`]:
//! deltas and current suspects at `TRACE` level, suspicion scores at `DEBUG` level,
//! and a `WARN` event each time a new leak suspect is reported.
//!
//! ## Threading
//!
//! The [`LeakAnalyzer`] is a plain single-threaded reducer: if snapshots are submitted from several threads,
//! put it behind a [`std::sync::Mutex`].
//!

#![doc(html_playground_url = "https://play.rust-lang.org")]

mod alloc;
mod analyzer;
mod callsite;
mod config;
mod ranked;
mod report;
mod source;
mod value;

pub use self::alloc::SizeClassAllocator;
pub use self::analyzer::LeakAnalyzer;
pub use self::callsite::CallSiteTable;
pub use self::config::{
    AnalyzerConfig, ConfigError, DEFAULT_RANKING_SIZE, DEFAULT_SCORE_THRESHOLD,
};
pub use self::ranked::{Entry, RankedList};
pub use self::report::Report;
pub use self::source::{FromFn, SnapshotSource, from_fn};
pub use self::value::{CallSite, SizeClass, ValueType};
