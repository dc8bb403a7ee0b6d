use super::*;

#[test]
fn test_defaults_follow_limits() {
    let options = SolverOptions::default();
    assert_eq!(options.max_instantiation_depth, limits::MAX_INSTANTIATION_DEPTH);
    assert_eq!(options.max_distribution_size, limits::MAX_DISTRIBUTION_SIZE);
    assert!(options.strict_function_types);
}

#[test]
fn test_from_json_reads_camel_case_and_fills_defaults() {
    let options = SolverOptions::from_json(
        r#"{ "maxInstantiationDepth": 8, "strictFunctionTypes": false }"#,
    )
    .expect("valid options");
    assert_eq!(options.max_instantiation_depth, 8);
    assert!(!options.strict_function_types);
    assert_eq!(
        options.max_subtype_depth,
        limits::MAX_SUBTYPE_DEPTH,
        "unspecified fields keep their defaults"
    );
}

#[test]
fn test_from_json_rejects_invalid_values() {
    let err = SolverOptions::from_json(r#"{ "maxInstantiationDepth": 0 }"#)
        .expect_err("zero depth is rejected");
    assert!(err.to_string().contains("maxInstantiationDepth"), "got {err}");

    let err = SolverOptions::from_json("{ not json").expect_err("malformed JSON");
    assert!(err.to_string().contains("failed to parse"), "got {err:#}");
}

#[test]
fn test_from_file_reports_path() {
    let missing = Path::new("/nonexistent/condtype-options.json");
    let err = SolverOptions::from_file(missing).expect_err("missing file");
    assert!(format!("{err:#}").contains("condtype-options.json"), "got {err:#}");
}

#[test]
fn test_depth_override() {
    let options = SolverOptions::default()
        .with_depth_override(" 12 ")
        .expect("numeric override");
    assert_eq!(options.max_instantiation_depth, 12);

    assert!(SolverOptions::default().with_depth_override("deep").is_err());
    assert!(SolverOptions::default().with_depth_override("0").is_err());
}

#[test]
fn test_json_round_trip_uses_camel_case() {
    let json = serde_json::to_string(&SolverOptions::default()).expect("serialize");
    assert!(json.contains("\"maxDistributionSize\""), "got {json}");
}
