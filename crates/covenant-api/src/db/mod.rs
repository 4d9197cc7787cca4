//! # Storage Layer
//!
//! Thin, runtime-checked `sqlx` queries over Postgres. Every function takes
//! an `impl PgExecutor` so coordinator code can pass either the pool or an
//! open transaction — the transaction is what gives the coordinator's
//! atomic section its all-or-nothing guarantee (§5).

pub mod agents;
pub mod attestations;
pub mod batches;
pub mod pool;
pub mod principals;
pub mod rule_history;
pub mod rules;
