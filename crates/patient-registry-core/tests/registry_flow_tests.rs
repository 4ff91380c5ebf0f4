//! End-to-end registry flows through the FFI surface.

use anyhow::Result;

use patient_registry_core::{
    open_registry, open_registry_fallback_only, open_registry_in_memory, RegistryError,
};

fn temp_paths(dir: &tempfile::TempDir) -> (String, String) {
    (
        dir.path().join("registry.db").to_string_lossy().into_owned(),
        dir.path().join("mirror.json").to_string_lossy().into_owned(),
    )
}

#[test]
fn test_fresh_registry_lists_seed_rows() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let (_, mirror_path) = temp_paths(&dir);
    let registry = open_registry_in_memory(mirror_path).unwrap();

    let patients = registry.list_patients().unwrap();
    assert_eq!(patients.len(), 3);
    assert_eq!(patients[0].name, "John Doe");
    assert_eq!(patients[2].phone_number, "555-456-7890");
    assert!(!registry.using_fallback().unwrap());
    Ok(())
}

#[test]
fn test_register_and_delete_flow() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let (_, mirror_path) = temp_paths(&dir);
    let registry = open_registry_in_memory(mirror_path).unwrap();

    let added = registry
        .register_patient("Alice Gray".into(), 29, "Female".into(), "555-222-3333".into())
        .unwrap();
    assert_eq!(added.id, 4); // three seeds + one

    registry.delete_patient(2).unwrap();

    let ids: Vec<i64> = registry
        .list_patients()
        .unwrap()
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, vec![1, 3, 4]);

    // next id is max + 1, not a reused gap
    let next = registry
        .register_patient("Bob Stone".into(), 61, "Male".into(), "555-444-5555".into())
        .unwrap();
    assert_eq!(next.id, 5);
    Ok(())
}

#[test]
fn test_register_rejects_blank_fields() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let (_, mirror_path) = temp_paths(&dir);
    let registry = open_registry_in_memory(mirror_path).unwrap();

    let err = registry
        .register_patient("".into(), 29, "Female".into(), "555-222-3333".into())
        .unwrap_err();
    assert!(matches!(err, RegistryError::Validation(_)));

    // list state untouched
    assert_eq!(registry.list_patients().unwrap().len(), 3);
    Ok(())
}

#[test]
fn test_seeding_idempotent_across_sessions() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let (db_path, mirror_path) = temp_paths(&dir);

    {
        let registry = open_registry(db_path.clone(), mirror_path.clone()).unwrap();
        assert_eq!(registry.list_patients().unwrap().len(), 3);
    }
    let registry = open_registry(db_path, mirror_path).unwrap();
    assert_eq!(registry.list_patients().unwrap().len(), 3);
    Ok(())
}

#[test]
fn test_query_panel_round_trip() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let (_, mirror_path) = temp_paths(&dir);
    let registry = open_registry_in_memory(mirror_path).unwrap();

    let result = registry
        .run_query("SELECT * FROM patient WHERE age >= 40".into())
        .unwrap();
    assert_eq!(
        result.columns,
        vec!["id", "name", "age", "gender", "phone_number"]
    );
    assert_eq!(result.rows.len(), 2);
    assert_eq!(result.rows[0].cells[1].as_deref(), Some("John Doe"));
    assert_eq!(result.rows[0].cells[2].as_deref(), Some("45"));

    let err = registry.run_query("select bogus from patient".into()).unwrap_err();
    assert!(matches!(err, RegistryError::InvalidColumn(_)));
    assert!(err.to_string().contains("bogus"));

    let err = registry
        .run_query("select * from patient where foo = 'x'".into())
        .unwrap_err();
    assert!(matches!(err, RegistryError::UnsupportedQuery(_)));
    Ok(())
}

#[test]
fn test_query_with_no_matches_has_empty_columns() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let (_, mirror_path) = temp_paths(&dir);
    let registry = open_registry_in_memory(mirror_path).unwrap();

    let result = registry
        .run_query("select * from patient where id = 99".into())
        .unwrap();
    assert!(result.columns.is_empty());
    assert!(result.rows.is_empty());
    Ok(())
}

#[test]
fn test_fallback_only_session_persists() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let (_, mirror_path) = temp_paths(&dir);

    {
        let registry = open_registry_fallback_only(mirror_path.clone()).unwrap();
        assert!(registry.using_fallback().unwrap());
        assert!(registry.list_patients().unwrap().is_empty());

        registry
            .register_patient("Offline Olive".into(), 40, "Female".into(), "555-777-8888".into())
            .unwrap();
    }

    let registry = open_registry_fallback_only(mirror_path).unwrap();
    let patients = registry.list_patients().unwrap();
    assert_eq!(patients.len(), 1);
    assert_eq!(patients[0].id, 1);
    assert_eq!(patients[0].name, "Offline Olive");
    Ok(())
}

#[test]
fn test_query_requires_database() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let (_, mirror_path) = temp_paths(&dir);
    let registry = open_registry_fallback_only(mirror_path).unwrap();

    let err = registry.run_query("select * from patient".into()).unwrap_err();
    assert!(matches!(err, RegistryError::StoreFailed(_)));
    Ok(())
}

#[test]
fn test_refresh_polling_lifecycle() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let (db_path, mirror_path) = temp_paths(&dir);
    let registry = open_registry(db_path, mirror_path).unwrap();

    registry.start_refresh(10).unwrap();
    registry.start_refresh(10).unwrap(); // second start is a no-op

    registry
        .register_patient("Polled Pat".into(), 50, "Other".into(), "555-999-0000".into())
        .unwrap();
    std::thread::sleep(std::time::Duration::from_millis(50));

    registry.stop_refresh().unwrap();
    registry.stop_refresh().unwrap(); // idempotent

    let patients = registry.list_patients().unwrap();
    assert_eq!(patients.len(), 4);
    assert_eq!(patients[3].name, "Polled Pat");
    Ok(())
}
