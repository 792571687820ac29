use crate::classify::{ErrorClassifier, ErrorType};
use crate::extract::Pipeline;
use crate::platform::PlatformContext;
use crate::result::{ParsedResult, RawExecutionResult};

/// Turns a finished command into a [`ParsedResult`].
///
/// Pure: no I/O, no shared state, same inputs always give the same output,
/// so one instance can serve any number of concurrent callers.
#[derive(Default)]
pub struct Interpreter {
    classifier: ErrorClassifier,
    pipeline: Pipeline,
}

impl Interpreter {
    pub fn new(classifier: ErrorClassifier) -> Self {
        Self {
            classifier,
            pipeline: Pipeline::default(),
        }
    }

    pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn interpret(&self, raw: &RawExecutionResult, ctx: &PlatformContext) -> ParsedResult {
        let error_type = self.classifier.classify_raw(raw, ctx);
        let success = raw.success();
        debug_assert_eq!(success, error_type == ErrorType::None);
        debug_assert_eq!(raw.timed_out, error_type == ErrorType::Timeout);

        let extraction = self.pipeline.run(&raw.stdout);

        tracing::debug!(
            exit_code = raw.exit_code,
            timed_out = raw.timed_out,
            %error_type,
            format = ?extraction.as_ref().map(|e| e.format),
            "interpreted command result"
        );

        ParsedResult {
            exit_code: raw.exit_code,
            stdout: raw.stdout.clone(),
            stderr: raw.stderr.clone(),
            success,
            platform: ctx.platform,
            shell: ctx.shell,
            error_type,
            parsed_data: extraction.map(|e| e.data),
        }
    }
}

/// Interpret with default precedence, phrases and extractors.
pub fn interpret(raw: &RawExecutionResult, ctx: &PlatformContext) -> ParsedResult {
    Interpreter::default().interpret(raw, ctx)
}
