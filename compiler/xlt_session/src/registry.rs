//! Cross-unit registry of test-case types.
//!
//! Filled while units are classified, possibly from many threads at once,
//! and read during emission. It must be complete before any unit that
//! depends on it is emitted.

use std::fmt;

use dashmap::DashSet;
use tracing::{debug, warn};
use xlt_ir::{CompilationUnit, MethodDeclaration, NodeId, Span, TypeDeclaration, TypeIdentity};

use crate::classify::{LifecycleNamingError, TestMethodClassifier};

/// Naming conventions a test-case type must follow.
pub const NAMING_CONVENTIONS: [&str; 3] = [
    "test method names must start with `test`",
    "the method annotated @Before must be named `setUp`",
    "the method annotated @After must be named `tearDown`",
];

/// A type left out of the registry because it broke the naming conventions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassificationDiagnostic {
    /// Source file of the unit declaring the type.
    pub file: String,
    pub type_identity: TypeIdentity,
    /// Span of the type declaration.
    pub span: Span,
    pub error: LifecycleNamingError,
}

impl ClassificationDiagnostic {
    /// Conventions to remind the user of.
    pub fn notes(&self) -> &'static [&'static str] {
        &NAMING_CONVENTIONS
    }
}

impl fmt::Display for ClassificationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "testcase conversion error in {} ({}): {}",
            self.file, self.type_identity, self.error
        )
    }
}

/// Outcome of classifying one unit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassificationReport {
    /// Types registered as test cases, in declaration order.
    pub registered: Vec<TypeIdentity>,
    /// Types skipped because of a naming error.
    pub diagnostics: Vec<ClassificationDiagnostic>,
}

impl ClassificationReport {
    /// Fold another report into this one.
    pub fn merge(&mut self, other: ClassificationReport) {
        self.registered.extend(other.registered);
        self.diagnostics.extend(other.diagnostics);
    }
}

/// Set of types classified as test cases.
#[derive(Debug, Default)]
pub struct TestCaseRegistry {
    classes: DashSet<TypeIdentity>,
}

impl TestCaseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify the top-level types of `unit` and register the test cases.
    ///
    /// A naming error skips the offending type and classification carries
    /// on with the next one.
    #[tracing::instrument(level = "debug", skip_all, fields(file = %unit.source_file_path()))]
    pub fn classify_unit<C: TestMethodClassifier + ?Sized>(
        &self,
        unit: &CompilationUnit,
        classifier: &C,
    ) -> ClassificationReport {
        let mut report = ClassificationReport::default();
        for &ty in unit.types() {
            let Some(decl) = unit.tree().data(ty).and_then(|data| data.as_type_declaration())
            else {
                continue;
            };
            match is_test_case(unit, decl, classifier) {
                Ok(true) => {
                    debug!(ty = %decl.identity, "registered test case");
                    self.classes.insert(decl.identity.clone());
                    report.registered.push(decl.identity.clone());
                }
                Ok(false) => {}
                Err(error) => {
                    warn!(
                        file = unit.source_file_path(),
                        ty = %decl.identity,
                        %error,
                        "testcase conversion error"
                    );
                    report.diagnostics.push(ClassificationDiagnostic {
                        file: unit.source_file_path().to_owned(),
                        type_identity: decl.identity.clone(),
                        span: unit.tree().span(ty).unwrap_or(Span::DUMMY),
                        error,
                    });
                }
            }
        }
        report
    }

    /// Register a type directly. Returns `false` if it was already present.
    pub fn register(&self, identity: TypeIdentity) -> bool {
        self.classes.insert(identity)
    }

    pub fn is_registered(&self, identity: &TypeIdentity) -> bool {
        self.classes.contains(identity)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Registered identities, sorted.
    pub fn identities(&self) -> Vec<TypeIdentity> {
        let mut identities: Vec<TypeIdentity> =
            self.classes.iter().map(|entry| entry.key().clone()).collect();
        identities.sort();
        identities
    }
}

/// Whether any method member of `decl` is a test method.
///
/// Stops at the first naming error.
fn is_test_case<C: TestMethodClassifier + ?Sized>(
    unit: &CompilationUnit,
    decl: &TypeDeclaration,
    classifier: &C,
) -> Result<bool, LifecycleNamingError> {
    let mut any_test = false;
    for member in decl.members().iter() {
        if let Some(method) = method_of(unit, member) {
            any_test |= classifier.classify(unit, method)?;
        }
    }
    Ok(any_test)
}

fn method_of(unit: &CompilationUnit, id: NodeId) -> Option<&MethodDeclaration> {
    unit.tree().data(id)?.as_method_declaration()
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
