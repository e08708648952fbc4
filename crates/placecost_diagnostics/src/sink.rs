//! Diagnostic accumulator shared between the engine and its driver.

use crate::code::DiagnosticCode;
use crate::diagnostic::Diagnostic;
use std::sync::Mutex;

#[derive(Default)]
struct Collected {
    diagnostics: Vec<Diagnostic>,
    errors: usize,
}

/// Collects diagnostics emitted through a shared reference.
///
/// Engine entry points take `&DiagnosticSink` so that a caller can run several
/// engines against one sink, or give a throwaway sink to a cross-check whose
/// notes it does not want reported. The error count is kept across
/// [`take_all`](Self::take_all), so a driver can drain diagnostics for
/// rendering and still decide its exit status afterwards.
#[derive(Default)]
pub struct DiagnosticSink {
    inner: Mutex<Collected>,
}

impl DiagnosticSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a diagnostic.
    pub fn emit(&self, diag: Diagnostic) {
        let mut inner = self.inner.lock().unwrap();
        if diag.severity.is_error() {
            inner.errors += 1;
        }
        inner.diagnostics.push(diag);
    }

    /// Whether any error has been emitted since the sink was created.
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// Number of errors emitted since the sink was created.
    pub fn error_count(&self) -> usize {
        self.inner.lock().unwrap().errors
    }

    /// Number of currently held diagnostics carrying `code`.
    pub fn count_code(&self, code: DiagnosticCode) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.diagnostics.iter().filter(|d| d.code == code).count()
    }

    /// Drains the held diagnostics in emission order.
    pub fn take_all(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.inner.lock().unwrap().diagnostics)
    }

    /// Copies the held diagnostics without draining them.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.inner.lock().unwrap().diagnostics.clone()
    }
}
