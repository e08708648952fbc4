//! Structured diagnostics for the placement cost engine.
//!
//! Engine entry points receive a [`DiagnosticSink`] by reference and emit
//! [`Diagnostic`] values into it instead of printing. Each diagnostic carries a
//! [`Severity`], a [`DiagnosticCode`], and an optional subject naming what it is
//! about (a net, a channel span). [`TerminalRenderer`] formats them for humans;
//! diagnostics are also `Serialize` for machine-readable output.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
