//! Intervalo - checkpoint interval calculator for trace event streams
//!
//! This library consumes an ordered stream of timestamped trace events and
//! produces, per process, named numeric series of elapsed time between
//! matched checkpoint events. It correlates events belonging to the same
//! logical request across threads, tolerates missing checkpoints, and runs
//! online in a single forward pass.

pub mod calculator;
pub mod checkpoint;
pub mod cli;
pub mod correlate;
pub mod event;
pub mod report;
pub mod round;
pub mod series;
pub mod source;
