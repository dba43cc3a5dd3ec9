use super::*;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "splat_reveal_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

#[test]
fn capture_then_apply_restores_tunables() {
    let mut tuned = ParamStore::default();
    tuned.set(ParamKey::Speed, &ParamValue::Scalar(3.25)).unwrap();
    tuned
        .set(ParamKey::DotTint, &ParamValue::Text("#ff8000".to_owned()))
        .unwrap();
    let saved = Settings::capture(tuned.params(), EffectKind::Fade);
    assert_eq!(saved.values["speed"], 3.25);
    assert_eq!(saved.dot_tint, "#ff8000");
    assert!(!saved.values.contains_key("dispersive_motion_speed"));

    let mut fresh = ParamStore::default();
    saved.apply(&mut fresh);
    assert_eq!(fresh.params().speed, 3.25);
    assert_eq!(fresh.params().dot_tint.to_hex(), "#ff8000");
}

#[test]
fn hidden_motion_is_forced_off() {
    let mut store = ParamStore::default();
    store
        .set(ParamKey::DispersiveMotionSpeed, &ParamValue::Scalar(2.0))
        .unwrap();
    let mut saved = Settings::default();
    saved
        .values
        .insert("dispersive_motion_speed".to_owned(), 2.0);
    saved.apply(&mut store);
    assert_eq!(store.params().dispersive_motion_speed, 0.0);
}

#[test]
fn unknown_and_invalid_entries_are_skipped() {
    let json = r##"{"values":{"speed":2.0,"warp_factor":9.0,"point_cloud_density":5.0},"dot_tint":"#zzzzzz"}"##;
    let saved = Settings::from_json(json).unwrap();
    let mut store = ParamStore::default();
    let changes = saved.apply(&mut store);
    assert_eq!(store.params().speed, 2.0);
    assert_eq!(store.params().point_cloud_density, 1.0);
    assert_eq!(store.params().dot_tint, EffectParams::default().dot_tint);
    assert!(changes.iter().all(|c| c.key != ParamKey::DotTint));
    assert_eq!(saved.effect, EffectKind::Radial);
}

#[test]
fn memory_store_round_trip() {
    let mut backend = MemoryStore::default();
    assert!(Settings::load_from(&backend).unwrap().is_none());
    let saved = Settings::capture(&EffectParams::default(), EffectKind::Instant);
    saved.save_to(&mut backend).unwrap();
    assert_eq!(Settings::load_from(&backend).unwrap(), Some(saved));
}

#[test]
fn json_file_store_writes_one_file_per_key() {
    let dir = temp_dir("settings");
    let mut backend = JsonFileStore::new(&dir);
    assert!(backend.load(SETTINGS_KEY).unwrap().is_none());
    Settings::default().save_to(&mut backend).unwrap();
    assert!(dir.join("reveal-settings.json").is_file());
    let loaded = Settings::load_from(&backend).unwrap().unwrap();
    assert_eq!(loaded, Settings::default());
    assert!(backend.save("../escape", "{}").is_err());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn corrupt_document_is_a_serde_error() {
    let mut backend = MemoryStore::default();
    backend.save(SETTINGS_KEY, "{not json").unwrap();
    let err = Settings::load_from(&backend).unwrap_err();
    assert!(err.to_string().starts_with("serialization error:"));
}
