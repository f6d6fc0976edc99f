//! # Architecture Abstraction Layer
//!
//! Hardware tick sources and GPIO ports for the supported boards.
//! Currently implements the Cortex-M4 (STM32F4) port; other boards add
//! sibling modules implementing `TickSource` and `GpioPort`.

pub mod cortex_m4;
