use super::*;

#[test]
fn defaults_match_the_short_video_preset() {
    let cfg = RenderConfig::default();
    assert_eq!(cfg.corner_radius, 12);
    assert_eq!(cfg.radius_for(true), 18);
    assert_eq!(cfg.radius_for(false), 12);
    assert_eq!(cfg.margin_for(true), 16);
    assert_eq!(cfg.margin_for(false), 24);
    assert_eq!(cfg.fps, 60);
    assert!((cfg.max_total_secs - 59.5).abs() < 1e-12);
    assert_eq!(cfg.short_source_policy, ShortSourcePolicy::Fail);
    cfg.validate().unwrap();
}

#[test]
fn partial_json_fills_defaults() {
    let cfg = RenderConfig::from_json_str(
        r#"{ "background_path": "bg.mp4", "fps": 30, "short_source_policy": "clamp", "seed": 9 }"#,
    )
    .unwrap();
    assert_eq!(cfg.fps, 30);
    assert_eq!(cfg.seed, Some(9));
    assert_eq!(cfg.short_source_policy, ShortSourcePolicy::Clamp);
    assert_eq!(cfg.background_path().unwrap(), Path::new("bg.mp4"));
    assert_eq!(cfg.audio_codec, "aac");
}

#[test]
fn unknown_fields_are_rejected() {
    let err = RenderConfig::from_json_str(r#"{ "fpss": 30 }"#).unwrap_err();
    assert!(matches!(err, ReelError::Serde(_)));
}

#[test]
fn validation_catches_bad_values() {
    let bad = [
        RenderConfig {
            fps: 0,
            ..RenderConfig::default()
        },
        RenderConfig {
            background_opacity: 1.5,
            ..RenderConfig::default()
        },
        RenderConfig {
            max_total_secs: f64::NAN,
            ..RenderConfig::default()
        },
        RenderConfig {
            audio_codec: " ".to_string(),
            ..RenderConfig::default()
        },
        RenderConfig {
            container: "../mp4".to_string(),
            ..RenderConfig::default()
        },
        RenderConfig {
            expected_canvas: Some(Canvas::new(0, 1920)),
            ..RenderConfig::default()
        },
    ];
    for cfg in bad {
        assert!(matches!(cfg.validate(), Err(ReelError::Validation(_))));
    }
}

#[test]
fn missing_background_is_a_validation_error() {
    let cfg = RenderConfig::default();
    assert!(matches!(
        cfg.background_path(),
        Err(ReelError::Validation(_))
    ));
}
