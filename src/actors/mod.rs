//! Actor-based monitoring runtime
//!
//! Two independent lines of execution, each an async task communicating
//! via Tokio channels:
//!
//! ```text
//!        ┌─────────────────┐
//!        │  main (binary)  │
//!        └────────┬────────┘
//!                 │ spawns
//!        ┌────────┴─────────────┐
//!        │                      │
//! ┌──────▼───────┐      ┌───────▼────────┐
//! │ MonitorActor │      │ MessageBusActor│
//! │ (scheduler)  │──────▶ (MQTT client)  │
//! └──────┬───────┘ mpsc └───────┬────────┘
//!        │                      │
//!   readings store         broker socket
//! ```
//!
//! The monitor actor runs one evaluation cycle to completion before
//! sleeping again, so cycles never overlap. The bus actor owns the one
//! broker connection, drives the receive loop, and supervises reconnects;
//! it is the only place connection state changes.
//!
//! ## Communication Patterns
//!
//! 1. **Commands**: each actor has an mpsc command channel
//! 2. **State**: the bus actor publishes connection state on a watch channel
//! 3. **Request/Response**: oneshot channels for synchronous queries

pub mod bus;
pub mod messages;
pub mod monitor;
