//! # frontier_engine - parallel best-first chess analysis
//!
//! The engine grows an explicit tree of positions in a shared
//! fixed-capacity arena. Many worker threads expand it concurrently:
//! each worker drains a private priority queue ordered by a score that
//! accumulates eval loss and depth bias along the path from the root,
//! rebuilds a popped node's board by replaying its parent chain,
//! generates the legal replies, publishes the children lock-free, and
//! backtracks the minimax eval (with forced-mate distance accounting)
//! toward the root.
//!
//! Typical use:
//!
//! ```rust,no_run
//! use frontier_engine::{Engine, Position};
//!
//! let mut engine = Engine::init(1_000_000, 10_000_000, 4, 500).unwrap();
//! engine.setup_evaluation(30, &Position::starting());
//! engine.evaluate_time(1_000);
//! for choice in engine.output().choices {
//!     println!("{} {}", choice.text, choice.eval_milli());
//! }
//! ```

pub mod arena;
pub mod board;
pub mod constants;
pub mod error;
pub mod evaluation;
pub mod legality;
pub mod move_gen;
pub mod output;
pub mod queue;
pub mod search;
pub mod stats;
pub mod types;

pub use error::{EngineError, EngineResult};
pub use legality::{test_check, test_legality};
pub use output::{OutputReport, RootChoice};
pub use search::Engine;
pub use stats::StatsSnapshot;
pub use types::{Board, GameState, Position, Side};
