#[test]
fn serialize_deserialize_picker_config() {
    let config = spatial_picker::PickerConfig::default();
    let serialized = serde_json::to_string(&config).unwrap();
    let deserialized: spatial_picker::PickerConfig = serde_json::from_str(&serialized).unwrap();
    assert_eq!(config, deserialized);
}

#[test]
fn missing_fields_use_defaults() {
    let config: spatial_picker::PickerConfig =
        serde_json::from_str(r#"{"name": "Survey", "initial_zoom": 5}"#).unwrap();
    assert_eq!(config.name, "Survey");
    assert_eq!(config.initial_zoom, 5);
    assert_eq!(config.initial_center, spatial_picker::DEFAULT_CENTER);
    assert_eq!(config.map_height, 200.0);
}

#[test]
fn invalid_center_is_rejected() {
    let result = serde_json::from_str::<spatial_picker::PickerConfig>(
        r#"{"initial_center": {"lat": 120.0, "lng": 0.0}}"#,
    );
    assert!(result.is_err());
}
