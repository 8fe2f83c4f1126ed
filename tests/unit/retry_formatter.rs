use std::time::Duration;

use reqwest::StatusCode;
use skillbridge_extractor::fetcher::retry_formatter::{
    extract_error_type, RetryContext, RetryErrorType,
};
use skillbridge_extractor::fetcher::FetcherError;

fn sample_context(error_type: RetryErrorType) -> RetryContext {
    RetryContext::new(
        2,
        3,
        error_type,
        Duration::from_secs(2),
        "Healthcare",
        3,
        "HTTP 503: busy",
        "https://sb-api.azurewebsites.us/Location/Lookup",
    )
}

#[test]
fn format_retry_captures_attempt_and_wait() {
    let ctx = sample_context(RetryErrorType::ServerError(500));
    assert_eq!(
        ctx.format_retry(),
        "Retrying (attempt 2/3) after internal server error - waiting 2.0 seconds... (Healthcare page 4)"
    );
}

#[test]
fn format_success_includes_page_context() {
    let ctx = sample_context(RetryErrorType::NetworkTimeout);
    let message = ctx.format_success();
    assert!(message.contains("Retry attempt 2/3 succeeded"));
    assert!(message.ends_with("(Healthcare page 4)"));
}

#[test]
fn format_failure_lists_suggestions() {
    let ctx = sample_context(RetryErrorType::ServerError(503));
    let output = ctx.format_failure();
    assert!(output.starts_with("[FAILED] Page 4 failed after 3 attempts"));
    assert!(output.contains("  Last error: HTTP 503: busy"));
    assert!(output.contains("  Job family: Healthcare"));
    assert!(output.contains("  Endpoint: https://sb-api.azurewebsites.us/Location/Lookup"));
    assert!(output.contains("    - The listing service may be down"));
    assert!(output.contains("Try increasing --max-retries (current: 3)"));
}

#[test]
fn format_failure_without_category() {
    let ctx = RetryContext::new(
        1,
        1,
        RetryErrorType::NetworkGeneric,
        Duration::ZERO,
        "",
        0,
        "reset",
        "scripted",
    );
    assert!(ctx.format_failure().contains("Job family: unknown"));
    assert!(ctx.format_retry().ends_with("(page 1)"));
}

#[test]
fn extract_error_type_prioritizes_status() {
    assert_eq!(
        extract_error_type(Some(StatusCode::TOO_MANY_REQUESTS), None),
        RetryErrorType::RateLimit
    );
    assert_eq!(
        extract_error_type(Some(StatusCode::BAD_GATEWAY), None),
        RetryErrorType::ServerError(502)
    );
    assert_eq!(
        extract_error_type(Some(StatusCode::NOT_FOUND), None),
        RetryErrorType::ClientError(404)
    );
    assert_eq!(extract_error_type(None, None), RetryErrorType::NetworkGeneric);
}

#[test]
fn classify_fetcher_errors() {
    let cases = [
        (FetcherError::Timeout("t".into()), RetryErrorType::NetworkTimeout),
        (FetcherError::ConnectionFailed("c".into()), RetryErrorType::NetworkOffline),
        (FetcherError::ParseError("p".into()), RetryErrorType::MalformedResponse),
        (FetcherError::NetworkError("n".into()), RetryErrorType::NetworkGeneric),
        (
            FetcherError::HttpStatus { status: 429, body: String::new() },
            RetryErrorType::RateLimit,
        ),
        (
            FetcherError::HttpStatus { status: 504, body: String::new() },
            RetryErrorType::ServerError(504),
        ),
    ];

    for (err, expected) in cases {
        assert_eq!(RetryErrorType::from_fetcher_error(&err), expected, "{err}");
    }
}

#[test]
fn descriptions_for_common_statuses() {
    assert_eq!(RetryErrorType::ServerError(503).description(), "service unavailable");
    assert_eq!(RetryErrorType::ClientError(403).description(), "access denied");
    assert_eq!(RetryErrorType::MalformedResponse.description(), "malformed response");
}
