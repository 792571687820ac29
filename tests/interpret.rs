//! End-to-end interpretation: raw result in, ParsedResult out.

use bash_skill::classify::{Category, ErrorClassifier, ErrorType, Precedence};
use bash_skill::extract::Pipeline;
use bash_skill::interpret::{Interpreter, interpret};
use bash_skill::platform::{Platform, PlatformContext, Shell};
use bash_skill::result::RawExecutionResult;
use proptest::prelude::*;
use serde_json::json;

fn linux_bash() -> PlatformContext {
    PlatformContext::new(Platform::Linux, Shell::Bash)
}

#[test]
fn successful_json_command() {
    let raw = RawExecutionResult::new(0, "{\"pods\": 3}\n", "", false);
    let parsed = interpret(&raw, &linux_bash());
    assert!(parsed.success);
    assert_eq!(parsed.error_type, ErrorType::None);
    assert_eq!(parsed.parsed_data, Some(json!({"pods": 3})));
    assert_eq!(parsed.platform, Platform::Linux);
    assert_eq!(parsed.shell, Shell::Bash);
    assert_eq!(parsed.stdout, "{\"pods\": 3}\n");
}

#[test]
fn failed_command_still_extracts_stdout() {
    let raw = RawExecutionResult::new(1, "A=1\nB=2\n", "boom", false);
    let parsed = interpret(&raw, &linux_bash());
    assert!(!parsed.success);
    assert_eq!(parsed.error_type, ErrorType::RuntimeError);
    assert_eq!(parsed.parsed_data, Some(json!({"A": "1", "B": "2"})));
}

#[test]
fn timed_out_result_keeps_partial_fields() {
    let raw = RawExecutionResult::timed_out(2);
    let parsed = interpret(&raw, &linux_bash());
    assert!(!parsed.success);
    assert_eq!(parsed.error_type, ErrorType::Timeout);
    assert_eq!(parsed.exit_code, -1);
    assert_eq!(parsed.parsed_data, None);
}

#[test]
fn json_shape_omits_absent_parsed_data() {
    let raw = RawExecutionResult::new(0, "hello\n", "", false);
    let value = serde_json::to_value(interpret(&raw, &linux_bash())).unwrap();
    assert_eq!(
        value,
        json!({
            "exit_code": 0,
            "stdout": "hello\n",
            "stderr": "",
            "success": true,
            "platform": "Linux",
            "shell": "bash",
            "error_type": "none"
        })
    );
}

#[test]
fn json_shape_includes_parsed_data() {
    let raw = RawExecutionResult::new(127, "", "bash: foo: command not found", false);
    let value = serde_json::to_value(interpret(&raw, &linux_bash())).unwrap();
    assert_eq!(value["error_type"], "command_not_found");
    assert_eq!(value["success"], false);
    assert!(value.get("parsed_data").is_none());

    let raw = RawExecutionResult::new(0, "[1,2]", "", false);
    let value = serde_json::to_value(interpret(&raw, &linux_bash())).unwrap();
    assert_eq!(value["parsed_data"], json!([1, 2]));
}

#[test]
fn summary_lists_fields_and_error_type() {
    let raw = RawExecutionResult::new(127, "", "bash: foo: command not found", false);
    let summary = interpret(&raw, &linux_bash()).summary();
    assert!(summary.starts_with("Exit Code: 127\nPlatform: Linux\nShell: bash\nSuccess: false"));
    assert!(summary.contains("Error Type: command_not_found"));
    assert!(summary.contains("Stderr:\nbash: foo: command not found"));
    assert!(!summary.contains("Stdout:"));
}

#[test]
fn summary_shows_parsed_data_and_hides_none_error_type() {
    let raw = RawExecutionResult::new(0, "NAME=foo\nVERSION=1.2\n", "", false);
    let summary = interpret(&raw, &linux_bash()).summary();
    assert!(!summary.contains("Error Type"));
    assert!(summary.contains("Parsed Data:\n{\n  \"NAME\": \"foo\""));
}

#[test]
fn custom_precedence_flows_through_interpreter() {
    let interpreter = Interpreter::new(ErrorClassifier::new(
        Precedence::new(vec![
            Category::SyntaxError,
            Category::CommandNotFound,
            Category::PermissionDenied,
        ])
        .unwrap(),
    ));
    let raw = RawExecutionResult::new(2, "", "Permission denied\nsyntax error", false);
    assert_eq!(
        interpreter.interpret(&raw, &linux_bash()).error_type,
        ErrorType::SyntaxError
    );
    assert_eq!(
        interpret(&raw, &linux_bash()).error_type,
        ErrorType::PermissionDenied
    );
}

#[test]
fn empty_pipeline_disables_extraction() {
    let interpreter = Interpreter::default().with_pipeline(Pipeline::new(Vec::new()));
    let raw = RawExecutionResult::new(0, "{\"pods\": 3}\n", "", false);
    let parsed = interpreter.interpret(&raw, &linux_bash());
    assert!(parsed.success);
    assert_eq!(parsed.parsed_data, None);
    assert_eq!(
        interpret(&raw, &linux_bash()).parsed_data,
        Some(json!({"pods": 3}))
    );
}

#[test]
fn launch_failure_reads_as_command_not_found() {
    let err = bash_skill::error::SkillError::Spawn {
        shell: "pwsh".to_string(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
    };
    let raw = RawExecutionResult::launch_failed(&err);
    let parsed = interpret(&raw, &PlatformContext::new(Platform::Windows, Shell::Pwsh));
    assert_eq!(parsed.exit_code, -1);
    assert_eq!(parsed.error_type, ErrorType::CommandNotFound);
}

fn any_context() -> impl Strategy<Value = PlatformContext> {
    (
        prop::sample::select(vec![
            Platform::Windows,
            Platform::Linux,
            Platform::Darwin,
            Platform::Unknown,
        ]),
        prop::sample::select(Shell::ALL.to_vec()),
    )
        .prop_map(|(platform, shell)| PlatformContext::new(platform, shell))
}

fn any_stream() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("bash: foo: command not found".to_string()),
        Just("Permission denied".to_string()),
        Just("syntax error near unexpected token".to_string()),
        Just("NAME=foo\nVERSION=1.2\n".to_string()),
        Just("{\"a\": 1}".to_string()),
        ".{0,80}",
    ]
}

proptest! {
    #[test]
    fn success_iff_clean_exit(
        exit_code in -2i32..300,
        timed_out in any::<bool>(),
        stdout in any_stream(),
        stderr in any_stream(),
        ctx in any_context(),
    ) {
        let raw = RawExecutionResult::new(exit_code, stdout, stderr, timed_out);
        let parsed = interpret(&raw, &ctx);
        prop_assert_eq!(parsed.success, exit_code == 0 && !timed_out);
        prop_assert_eq!(parsed.success, parsed.error_type == ErrorType::None);
        prop_assert_eq!(timed_out, parsed.error_type == ErrorType::Timeout);
    }

    #[test]
    fn interpretation_is_deterministic(
        exit_code in -2i32..300,
        timed_out in any::<bool>(),
        stdout in any_stream(),
        stderr in any_stream(),
        ctx in any_context(),
    ) {
        let raw = RawExecutionResult::new(exit_code, stdout, stderr, timed_out);
        prop_assert_eq!(interpret(&raw, &ctx), interpret(&raw, &ctx));
    }

    #[test]
    fn raw_fields_pass_through(
        exit_code in any::<i32>(),
        stdout in ".{0,120}",
        stderr in ".{0,120}",
    ) {
        let raw = RawExecutionResult::new(exit_code, stdout.clone(), stderr.clone(), false);
        let parsed = interpret(&raw, &linux_bash());
        prop_assert_eq!(parsed.exit_code, exit_code);
        prop_assert_eq!(parsed.stdout, stdout);
        prop_assert_eq!(parsed.stderr, stderr);
    }
}
