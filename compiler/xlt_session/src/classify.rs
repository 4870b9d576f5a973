//! Test-method classification.
//!
//! A type is a test case when at least one of its methods is a test method.
//! Lifecycle methods must follow the JUnit 3 naming the generated runner
//! calls; breaking that naming is a recoverable error for the whole type.

use xlt_ir::{CompilationUnit, MethodDeclaration};

/// A lifecycle method whose name the generated runner cannot call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleNamingError {
    #[error("test method `{method}` must be named `test*`")]
    TestName { method: String },
    #[error("method `{method}` annotated @Before must be named `setUp`")]
    SetUpName { method: String },
    #[error("method `{method}` annotated @After must be named `tearDown`")]
    TearDownName { method: String },
}

impl LifecycleNamingError {
    /// Name of the offending method.
    pub fn method(&self) -> &str {
        match self {
            LifecycleNamingError::TestName { method }
            | LifecycleNamingError::SetUpName { method }
            | LifecycleNamingError::TearDownName { method } => method,
        }
    }
}

/// Decides whether a method makes its type a test case.
pub trait TestMethodClassifier {
    fn classify(
        &self,
        unit: &CompilationUnit,
        method: &MethodDeclaration,
    ) -> Result<bool, LifecycleNamingError>;
}

/// JUnit naming rules.
///
/// - `@Test` methods are tests and must be named `test*`
/// - un-annotated `test*` methods are tests
/// - `@Before` methods must be named `setUp`, `@After` ones `tearDown`
///
/// Constructors are never tests.
#[derive(Copy, Clone, Debug, Default)]
pub struct NamingConventions;

impl TestMethodClassifier for NamingConventions {
    fn classify(
        &self,
        _unit: &CompilationUnit,
        method: &MethodDeclaration,
    ) -> Result<bool, LifecycleNamingError> {
        let name = method.name.as_str();
        if method.is_annotated("Before") && name != "setUp" {
            return Err(LifecycleNamingError::SetUpName {
                method: name.to_owned(),
            });
        }
        if method.is_annotated("After") && name != "tearDown" {
            return Err(LifecycleNamingError::TearDownName {
                method: name.to_owned(),
            });
        }
        if method.is_annotated("Test") {
            if !name.starts_with("test") {
                return Err(LifecycleNamingError::TestName {
                    method: name.to_owned(),
                });
            }
            return Ok(true);
        }
        Ok(!method.is_constructor && name.starts_with("test"))
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn classify(method: &MethodDeclaration) -> Result<bool, LifecycleNamingError> {
        let unit = CompilationUnit::synthetic("T").unwrap();
        NamingConventions.classify(&unit, method)
    }

    #[test]
    fn test_annotated_test_method() {
        let method = MethodDeclaration::new("testAdd").with_annotation("@Test");
        assert_eq!(classify(&method), Ok(true));
    }

    #[test]
    fn test_annotated_method_with_wrong_name() {
        let method = MethodDeclaration::new("checkAdd").with_annotation("org.junit.Test");
        let err = classify(&method).unwrap_err();
        assert_eq!(
            err,
            LifecycleNamingError::TestName {
                method: "checkAdd".to_owned()
            }
        );
        assert_eq!(err.method(), "checkAdd");
    }

    #[test]
    fn test_unannotated_test_prefix() {
        assert_eq!(classify(&MethodDeclaration::new("testSub")), Ok(true));
        assert_eq!(classify(&MethodDeclaration::new("helper")), Ok(false));
    }

    #[test]
    fn test_constructor_is_not_a_test() {
        let mut method = MethodDeclaration::new("test");
        method.is_constructor = true;
        assert_eq!(classify(&method), Ok(false));
    }

    #[test]
    fn test_lifecycle_names() {
        let set_up = MethodDeclaration::new("setUp").with_annotation("Before");
        assert_eq!(classify(&set_up), Ok(false));
        let tear_down = MethodDeclaration::new("tearDown").with_annotation("After");
        assert_eq!(classify(&tear_down), Ok(false));

        let init = MethodDeclaration::new("init").with_annotation("Before");
        assert!(matches!(
            classify(&init),
            Err(LifecycleNamingError::SetUpName { .. })
        ));
        let cleanup = MethodDeclaration::new("cleanup").with_annotation("@After");
        assert!(matches!(
            classify(&cleanup),
            Err(LifecycleNamingError::TearDownName { .. })
        ));
    }
}
