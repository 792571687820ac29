//! Error classification: maps a finished command to exactly one [`ErrorType`].
//!
//! Order of checks: timeout, clean exit, then stderr phrase categories in
//! [`Precedence`] order, then the `runtime_error` catch-all. Within each
//! category the phrases of the shell's own dialect are tried before the
//! generic ones.

pub mod phrases;

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::SkillError;
use crate::platform::PlatformContext;
use crate::result::RawExecutionResult;

pub use phrases::{Dialect, PhraseTable, Signal};

/// Outcome classification. Exactly one per result.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    None,
    CommandNotFound,
    PermissionDenied,
    SyntaxError,
    RuntimeError,
    Timeout,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::CommandNotFound => "command_not_found",
            Self::PermissionDenied => "permission_denied",
            Self::SyntaxError => "syntax_error",
            Self::RuntimeError => "runtime_error",
            Self::Timeout => "timeout",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure categories recognised from stderr text.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    CommandNotFound,
    PermissionDenied,
    SyntaxError,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::CommandNotFound,
        Category::PermissionDenied,
        Category::SyntaxError,
    ];

    pub fn error_type(&self) -> ErrorType {
        match self {
            Self::CommandNotFound => ErrorType::CommandNotFound,
            Self::PermissionDenied => ErrorType::PermissionDenied,
            Self::SyntaxError => ErrorType::SyntaxError,
        }
    }
}

/// Order in which categories are tried when stderr matches more than one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Precedence(Vec<Category>);

impl Precedence {
    /// Accepts only a permutation of all three categories.
    pub fn new(order: Vec<Category>) -> Result<Self, SkillError> {
        if order.len() != Category::ALL.len() {
            return Err(SkillError::InvalidPrecedence(format!(
                "expected {} categories, got {}",
                Category::ALL.len(),
                order.len()
            )));
        }
        if let Some(missing) = Category::ALL.iter().find(|c| !order.contains(c)) {
            return Err(SkillError::InvalidPrecedence(format!(
                "missing category {missing:?}"
            )));
        }
        Ok(Self(order))
    }

    pub fn categories(&self) -> &[Category] {
        &self.0
    }
}

impl Default for Precedence {
    fn default() -> Self {
        Self(Category::ALL.to_vec())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ErrorClassifier {
    precedence: Precedence,
    phrases: PhraseTable,
}

impl ErrorClassifier {
    pub fn new(precedence: Precedence) -> Self {
        Self {
            precedence,
            phrases: PhraseTable::default(),
        }
    }

    pub fn with_phrases(mut self, phrases: PhraseTable) -> Self {
        self.phrases = phrases;
        self
    }

    pub fn precedence(&self) -> &Precedence {
        &self.precedence
    }

    pub fn classify(
        &self,
        exit_code: i32,
        stderr: &str,
        timed_out: bool,
        ctx: &PlatformContext,
    ) -> ErrorType {
        // Exit code is unreliable after a forced kill.
        if timed_out {
            return ErrorType::Timeout;
        }
        if exit_code == 0 {
            return ErrorType::None;
        }

        let lowered = stderr.to_lowercase();
        let dialect = Dialect::for_context(ctx);

        for category in self.precedence.categories() {
            if self.phrases.matches(dialect, *category, exit_code, &lowered)
                || self
                    .phrases
                    .matches(Dialect::Generic, *category, exit_code, &lowered)
            {
                return category.error_type();
            }
        }

        ErrorType::RuntimeError
    }

    pub fn classify_raw(&self, raw: &RawExecutionResult, ctx: &PlatformContext) -> ErrorType {
        self.classify(raw.exit_code, &raw.stderr, raw.timed_out, ctx)
    }
}

/// Classify with the default precedence and the built-in phrase table.
pub fn classify(raw: &RawExecutionResult, ctx: &PlatformContext) -> ErrorType {
    ErrorClassifier::default().classify_raw(raw, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Platform, Shell};

    fn linux() -> PlatformContext {
        PlatformContext::new(Platform::Linux, Shell::Bash)
    }

    #[test]
    fn precedence_rejects_duplicates_and_short_lists() {
        assert!(Precedence::new(vec![Category::SyntaxError]).is_err());
        assert!(
            Precedence::new(vec![
                Category::SyntaxError,
                Category::SyntaxError,
                Category::PermissionDenied
            ])
            .is_err()
        );
        assert!(
            Precedence::new(vec![
                Category::SyntaxError,
                Category::CommandNotFound,
                Category::PermissionDenied
            ])
            .is_ok()
        );
    }

    #[test]
    fn timeout_wins_over_clean_exit() {
        let c = ErrorClassifier::default();
        assert_eq!(c.classify(0, "", true, &linux()), ErrorType::Timeout);
    }

    #[test]
    fn clean_exit_ignores_stderr_noise() {
        let c = ErrorClassifier::default();
        assert_eq!(
            c.classify(0, "warning: permission denied on cache", false, &linux()),
            ErrorType::None
        );
    }

    #[test]
    fn custom_precedence_changes_overlap_resolution() {
        let stderr = "sh: deploy.sh: Permission denied\nsyntax error near unexpected token";
        let default = ErrorClassifier::default();
        assert_eq!(
            default.classify(2, stderr, false, &linux()),
            ErrorType::PermissionDenied
        );

        let syntax_first = ErrorClassifier::new(
            Precedence::new(vec![
                Category::SyntaxError,
                Category::PermissionDenied,
                Category::CommandNotFound,
            ])
            .unwrap(),
        );
        assert_eq!(
            syntax_first.classify(2, stderr, false, &linux()),
            ErrorType::SyntaxError
        );
    }
}
