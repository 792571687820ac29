use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::classify::Category;
use crate::platform::{Platform, PlatformContext};

/// A shell's `<shell>: [line N: ]<target>: no such file or directory` line.
/// Only the shell (or `env`/`exec`) reporting it means the executable itself
/// is missing; `cat: x: No such file...` is an ordinary path error. Redirect
/// and `source` targets produce the same line, so the exit code decides.
static SHELL_ENOENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^\s*(?:\S*/)?(?:bash|sh|dash|zsh|ksh|ash|env|exec):(?:\s*line\s+\d+:|\s*\d+:)?\s*[^:\n]+:\s*no such file or directory",
    )
    .expect("valid regex")
});

/// Error-message vocabulary of a shell family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Posix,
    Cmd,
    PowerShell,
    /// Phrases tried for every shell after its own dialect.
    Generic,
}

impl Dialect {
    /// `cmd` outside Windows has no vocabulary of its own and gets only the generic set.
    pub fn for_context(ctx: &PlatformContext) -> Self {
        if ctx.shell.is_posix() {
            Self::Posix
        } else if ctx.shell.is_powershell() {
            Self::PowerShell
        } else if ctx.platform == Platform::Windows || ctx.platform == Platform::Unknown {
            Self::Cmd
        } else {
            Self::Generic
        }
    }
}

/// Exit code a POSIX shell returns when it cannot find or run the command.
pub const EXIT_NOT_FOUND: i32 = 127;

/// Exit code of a command that never launched.
pub const EXIT_LAUNCH_FAILED: i32 = -1;

/// One way a failed command can signal a category. Matched against lowercased stderr.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// Case-insensitive substring.
    Phrase(String),
    /// "no such file or directory" reported by the shell about the command it
    /// tried to run. Requires exit 127 (or a failed launch).
    ShellMissingExecutable,
}

impl Signal {
    pub fn phrase(text: &str) -> Self {
        Self::Phrase(text.to_lowercase())
    }

    fn matches(&self, exit_code: i32, lowered: &str) -> bool {
        match self {
            Self::Phrase(p) => lowered.contains(p.as_str()),
            Self::ShellMissingExecutable => {
                matches!(exit_code, EXIT_NOT_FOUND | EXIT_LAUNCH_FAILED)
                    && SHELL_ENOENT_RE.is_match(lowered)
            }
        }
    }
}

/// Phrase sets keyed by `(dialect, category)`.
#[derive(Debug, Clone)]
pub struct PhraseTable {
    entries: HashMap<(Dialect, Category), Vec<Signal>>,
}

impl PhraseTable {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn builtin() -> Self {
        let mut table = Self::empty();

        table.extend(
            Dialect::Generic,
            Category::CommandNotFound,
            &[
                "command not found",
                "not recognized as an internal or external command",
            ],
        );
        table.insert(
            Dialect::Generic,
            Category::CommandNotFound,
            Signal::ShellMissingExecutable,
        );
        table.extend(
            Dialect::Generic,
            Category::PermissionDenied,
            &["permission denied", "access is denied", "operation not permitted"],
        );
        table.extend(
            Dialect::Generic,
            Category::SyntaxError,
            &[
                "syntax error",
                "unexpected token",
                "is not recognized as a cmdlet",
                "parse error",
            ],
        );

        // dash/busybox: "sh: 1: foo: not found"
        table.extend(Dialect::Posix, Category::CommandNotFound, &[": not found"]);
        table.extend(
            Dialect::Posix,
            Category::SyntaxError,
            &["unexpected end of file", "bad substitution"],
        );

        table.extend(
            Dialect::Cmd,
            Category::SyntaxError,
            &[
                "the syntax of the command is incorrect",
                "was unexpected at this time",
            ],
        );

        table.extend(
            Dialect::PowerShell,
            Category::CommandNotFound,
            &[
                "is not recognized as the name of a cmdlet",
                "commandnotfoundexception",
            ],
        );
        table.extend(
            Dialect::PowerShell,
            Category::PermissionDenied,
            &["unauthorizedaccessexception", "permissiondenied"],
        );
        table.extend(
            Dialect::PowerShell,
            Category::SyntaxError,
            &[
                "parsererror",
                "missing expression",
                "the string is missing the terminator",
            ],
        );

        table
    }

    pub fn insert(&mut self, dialect: Dialect, category: Category, signal: Signal) {
        self.entries.entry((dialect, category)).or_default().push(signal);
    }

    pub fn extend(&mut self, dialect: Dialect, category: Category, phrases: &[&str]) {
        for phrase in phrases {
            self.insert(dialect, category, Signal::phrase(phrase));
        }
    }

    pub fn lookup(&self, dialect: Dialect, category: Category) -> &[Signal] {
        self.entries
            .get(&(dialect, category))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// `lowered` must already be lowercased.
    pub fn matches(
        &self,
        dialect: Dialect,
        category: Category,
        exit_code: i32,
        lowered: &str,
    ) -> bool {
        self.lookup(dialect, category)
            .iter()
            .any(|signal| signal.matches(exit_code, lowered))
    }
}

impl Default for PhraseTable {
    fn default() -> Self {
        Self::builtin()
    }
}
