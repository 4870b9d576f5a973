//! xlt session - state shared by every unit of a translation run.
//!
//! A [`TranslationSession`] is created once per run and passed by reference
//! to every pass. It owns the process-wide tables that outlive single
//! compilation units:
//! - per-file string literal pools ([`LiteralPool`])
//! - the registry of test-case types ([`TestCaseRegistry`])
//! - classification diagnostics collected across units
//!
//! Both tables are sharded concurrent maps, so units can be processed on a
//! rayon pool while sharing one session.

mod classify;
mod escape;
mod literal;
mod options;
mod registry;

use std::sync::Once;

use parking_lot::Mutex;
use rayon::prelude::*;
use tracing::debug;
use xlt_ir::{CompilationUnit, TreeVisitor, ValidationError};

pub use classify::{LifecycleNamingError, NamingConventions, TestMethodClassifier};
pub use escape::{CppEscaper, TextEscaper};
pub use literal::{LiteralId, LiteralPool, LiteralText, RenderedLiteral, UnitLiterals};
pub use options::{SessionOptions, VALIDATE_ENV};
pub use registry::{
    ClassificationDiagnostic, ClassificationReport, TestCaseRegistry, NAMING_CONVENTIONS,
};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing subscriber for debug output.
///
/// Only takes effect if `RUST_LOG` is set. Safe to call multiple times.
///
/// Example: `RUST_LOG=xlt_ir=debug,xlt_session=trace`
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

/// Shared state of one translation run.
pub struct TranslationSession {
    options: SessionOptions,
    literals: LiteralPool,
    test_cases: TestCaseRegistry,
    diagnostics: Mutex<Vec<ClassificationDiagnostic>>,
    escaper: Box<dyn TextEscaper + Send + Sync>,
}

impl TranslationSession {
    pub fn new(options: SessionOptions) -> Self {
        Self::with_escaper(options, CppEscaper)
    }

    /// A session rendering literals with a custom escaper.
    pub fn with_escaper(
        options: SessionOptions,
        escaper: impl TextEscaper + Send + Sync + 'static,
    ) -> Self {
        TranslationSession {
            options,
            literals: LiteralPool::new(),
            test_cases: TestCaseRegistry::new(),
            diagnostics: Mutex::new(Vec::new()),
            escaper: Box::new(escaper),
        }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn literals(&self) -> &LiteralPool {
        &self.literals
    }

    pub fn test_cases(&self) -> &TestCaseRegistry {
        &self.test_cases
    }

    /// Intern `text` for `unit`'s file and render it with the session escaper.
    pub fn string_constant(&self, unit: &CompilationUnit, text: &str) -> RenderedLiteral {
        unit.string_constant(&self.literals, text, self.escaper.as_ref())
    }

    /// Run one visitor pass over `unit`, validating afterwards if enabled.
    #[tracing::instrument(level = "debug", skip_all, fields(file = %unit.source_file_path()))]
    pub fn run_pass<V: TreeVisitor + ?Sized>(
        &self,
        unit: &mut CompilationUnit,
        visitor: &mut V,
    ) -> Result<(), ValidationError> {
        unit.accept(visitor);
        if self.options.validate_after_pass {
            unit.validate()?;
            debug!("tree valid after pass");
        }
        Ok(())
    }

    /// Classify one unit into the session registry.
    pub fn classify_unit<C: TestMethodClassifier + ?Sized>(
        &self,
        unit: &CompilationUnit,
        classifier: &C,
    ) -> ClassificationReport {
        let report = self.test_cases.classify_unit(unit, classifier);
        if !report.diagnostics.is_empty() {
            self.diagnostics
                .lock()
                .extend(report.diagnostics.iter().cloned());
        }
        report
    }

    /// Classify many units in parallel.
    ///
    /// The registry ends up the same as with sequential classification; the
    /// merged report follows the order of `units`.
    #[tracing::instrument(level = "debug", skip_all, fields(units = units.len()))]
    pub fn classify_units<C: TestMethodClassifier + Sync + ?Sized>(
        &self,
        units: &[CompilationUnit],
        classifier: &C,
    ) -> ClassificationReport {
        units
            .par_iter()
            .map(|unit| self.classify_unit(unit, classifier))
            .collect::<Vec<_>>()
            .into_iter()
            .fold(ClassificationReport::default(), |mut merged, report| {
                merged.merge(report);
                merged
            })
    }

    /// Classification diagnostics recorded so far, across all units.
    pub fn diagnostics(&self) -> Vec<ClassificationDiagnostic> {
        self.diagnostics.lock().clone()
    }
}

impl Default for TranslationSession {
    fn default() -> Self {
        Self::new(SessionOptions::default())
    }
}

impl std::fmt::Debug for TranslationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationSession")
            .field("options", &self.options)
            .field("literals", &self.literals)
            .field("test_cases", &self.test_cases.len())
            .finish_non_exhaustive()
    }
}
