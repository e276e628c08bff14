use fastswitch_core::discovery::{
    AuxiliaryRegistry, FixtureFile, OwnerProcess, SourceError, StaticTabSource, StaticWindowSource, TabSource,
    WindowSource,
};
use fastswitch_core::model::SourceRef;

#[test]
fn window_fixture_is_deterministic() {
    let source = StaticWindowSource::deterministic_fixture();
    let first = source.enumerate().unwrap();
    let second = source.enumerate().unwrap();

    assert_eq!(source.source_name(), "static");
    assert_eq!(first, second);
    assert_eq!(first.len(), 4);
    assert_eq!(first[0].native_key, Some(11));
    assert_eq!(first[3].source_ref, SourceRef::Window { pid: 303, handle: 31 });
}

#[test]
fn unknown_owner_is_inaccessible() {
    let source = StaticWindowSource::deterministic_fixture();
    let stranger = OwnerProcess::new(999, "Ghost", "com.example.ghost");

    assert!(matches!(
        source.enumerate_owner(&stranger),
        Err(SourceError::Inaccessible { pid: 999, .. })
    ));
}

#[test]
fn tab_fixture_is_deterministic() {
    let source = StaticTabSource::deterministic_fixture();
    let tabs = source.enumerate_tabs().unwrap();

    assert_eq!(source.app_id(), "com.apple.Safari");
    assert_eq!(tabs.len(), 2);
    assert_eq!(tabs[1].tab_index, 2);
}

#[test]
fn registry_only_activates_running_apps() {
    let registry = AuxiliaryRegistry::new()
        .with_source(Box::new(StaticTabSource::deterministic_fixture()))
        .with_source(Box::new(StaticTabSource::new("com.apple.Notes", "Notes", Vec::new())));
    let owners = StaticWindowSource::deterministic_fixture().owners().unwrap();

    assert_eq!(registry.len(), 2);
    let active: Vec<&str> = registry.active_for(&owners).map(|(source, _)| source.app_id()).collect();
    assert_eq!(active, vec!["com.apple.Safari"]);

    let sub_items = registry.enumerate_sub_items(&owners);
    assert_eq!(sub_items.len(), 2);
    assert!(sub_items.iter().all(|raw| raw.native_key.is_none() && raw.sub_item.is_some()));
}

#[test]
fn registering_same_app_replaces_source() {
    let mut registry = AuxiliaryRegistry::new();
    registry.register(Box::new(StaticTabSource::deterministic_fixture()));
    registry.register(Box::new(StaticTabSource::new("com.apple.Safari", "Safari", Vec::new())));

    assert_eq!(registry.len(), 1);
    let owners = vec![OwnerProcess::new(1, "Safari", "com.apple.Safari")];
    assert!(registry.enumerate_sub_items(&owners).is_empty());
}

#[test]
fn fixture_file_loads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fixture.json");
    std::fs::write(
        &path,
        r#"{"owners":[{"pid":5,"name":"Notes","app_id":"com.apple.Notes","windows":[{"title":"Groceries","handle":50}]}]}"#,
    )
    .unwrap();

    let fixture = FixtureFile::load(&path).unwrap();
    let windows = fixture.window_source().enumerate().unwrap();
    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0].title, "Groceries");
    assert!(fixture.auxiliary_registry().is_empty());
}

#[test]
fn missing_fixture_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        FixtureFile::load(&dir.path().join("absent.json")),
        Err(SourceError::Fixture(_))
    ));
}
