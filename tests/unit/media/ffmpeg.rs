use super::*;

#[test]
fn parses_ffprobe_frame_rates() {
    assert_eq!(parse_ff_ratio("30/1"), Some((30, 1)));
    assert_eq!(parse_ff_ratio("30000/1001"), Some((30000, 1001)));
    assert_eq!(parse_ff_ratio("25"), Some((25, 1)));
    assert_eq!(parse_ff_ratio("0/0"), None);
    assert_eq!(parse_ff_ratio("abc"), None);
}

#[test]
fn seconds_are_formatted_with_fixed_precision() {
    assert_eq!(ff_secs(1.5), "1.500000");
    assert_eq!(ff_secs(0.0), "0.000000");
}

#[test]
fn missing_program_goes_through_error_mapper() {
    let cmd = Command::new("reelcast-definitely-not-a-real-binary");
    let err = run_captured(cmd, ReelError::composition).unwrap_err();
    assert!(matches!(err, ReelError::Composition(ref m) if m.contains("failed to run")));
}
