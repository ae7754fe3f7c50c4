//! # Etna EVM
//!
//! A gas-metered, stack-based interpreter for EVM bytecode, covering the
//! Frontier and Homestead instruction sets with configurable fork
//! policies (EIP-150 call gas cap, EIP-158/161 empty-account rules,
//! EIP-160 EXP repricing, EIP-170 code size limit, EIP-684 create
//! collisions).
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                           VM                               │
//! │  ┌─────────────┐  ┌─────────────┐  ┌────────────────────┐  │
//! │  │  CallFrame  │  │   Memory    │  │       Stack        │  │
//! │  └─────────────┘  └─────────────┘  └────────────────────┘  │
//! │                                                            │
//! │  ┌─────────────┐  ┌─────────────┐  ┌────────────────────┐  │
//! │  │  Substate   │  │ GasSchedule │  │    Environment     │  │
//! │  └─────────────┘  └─────────────┘  └────────────────────┘  │
//! └────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌────────────────────────────────────────────────────────────┐
//! │                        World trait                         │
//! │              (account state, storage, code)                │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key components
//!
//! - [`vm::VM`]: the fetch-decode-execute driver; CREATE/CALL recurse
//!   into child machines with cloned worlds
//! - [`call_frame::CallFrame`]: per-frame stack, memory, PC and gas
//! - [`db::World`]: the account-state interface the embedder implements
//! - [`config::EvmConfig`] / [`gas_schedule::GasSchedule`]: fork policy
//!   and fee tables
//!
//! Execution is single-threaded, synchronous and deterministic: identical
//! inputs produce bit-identical [`vm::ExecutionReport`]s.

pub mod call_frame;
pub mod config;
pub mod constants;
pub mod db;
pub mod environment;
pub mod errors;
pub mod gas_cost;
pub mod gas_schedule;
pub mod memory;
pub mod opcode_handlers;
pub mod opcodes;
pub mod program;
pub mod utils;
pub mod vm;

pub use config::EvmConfig;
pub use db::{InMemoryWorld, World};
pub use environment::Environment;
pub use errors::{ExceptionalHalt, InternalError, VMError};
pub use gas_schedule::GasSchedule;
pub use opcodes::Opcode;
pub use program::Program;
pub use vm::{ExecutionReport, InternalTransaction, Substate, VM};
