//! End-to-end resolution over the filesystem store.
//!
//! Lays out a creator library, a program stored as sub-collections and a
//! client override document on disk, then checks the full pipeline:
//! template load → resolution → snapshot → drift after a library edit.

use regimen_model::{Outcome, ResolutionGap, VersionSnapshot};
use regimen_resolver::{RegimenConfig, Resolver};
use regimen_store::{FsStore, StoreLayout};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write(root: &Path, path: &str, body: Value) {
    let file = root.join(format!("{path}.json"));
    fs::create_dir_all(file.parent().unwrap()).unwrap();
    fs::write(file, serde_json::to_vec_pretty(&body).unwrap()).unwrap();
}

fn seed(root: &Path) {
    // Library
    write(
        root,
        "creator_libraries/coach/modules/strength",
        json!({ "title": "Strength block", "version": 3, "sessionRefs": ["lower", "upper"] }),
    );
    write(
        root,
        "creator_libraries/coach/sessions/lower",
        json!({ "title": "Lower body", "image_url": "lower.png", "version": 5 }),
    );
    write(
        root,
        "creator_libraries/coach/sessions/upper",
        json!({ "title": "Upper body", "version": 2 }),
    );
    write(
        root,
        "creator_libraries/coach/sessions/lower/exercises/squat",
        json!({ "order": 0, "name": "Back squat" }),
    );
    write(
        root,
        "creator_libraries/coach/sessions/lower/exercises/rdl",
        json!({ "order": 1, "name": "Romanian deadlift" }),
    );
    for (id, order, reps) in [("s1", 0, 5), ("s2", 1, 5), ("s3", 2, 5)] {
        write(
            root,
            &format!("creator_libraries/coach/sessions/lower/exercises/squat/sets/{id}"),
            json!({ "order": order, "reps": reps }),
        );
    }

    // Program
    write(
        root,
        "courses/spring",
        json!({ "creator_id": "coach", "title": "Spring cycle" }),
    );
    write(
        root,
        "courses/spring/modules/week1",
        json!({ "order": 0, "libraryModuleRef": "strength" }),
    );
    write(
        root,
        "courses/spring/modules/week1/sessions/lower",
        json!({ "order": 0, "librarySessionRef": "lower", "title": "Leg day" }),
    );
    write(
        root,
        "courses/spring/modules/week1/sessions/conditioning",
        json!({ "order": 2, "title": "Conditioning" }),
    );
    write(
        root,
        "courses/spring/modules/week1/sessions/conditioning/exercises/row",
        json!({ "order": 0, "name": "Row 500m" }),
    );

    // Client
    write(
        root,
        "client_programs/athlete_spring",
        json!({
            "title": "",
            "modules": {
                "week1": {
                    "sessions": {
                        "lower": {
                            "title": "",
                            "image_url": "",
                            "exercises": { "squat": { "sets": { "s3": { "reps": 3 } } } }
                        },
                        "bonus": { "title": "Not part of the program" }
                    }
                }
            }
        }),
    );
}

#[tokio::test]
async fn resolves_program_stored_on_disk() {
    let dir = tempdir().unwrap();
    seed(dir.path());
    let resolver = Resolver::new(FsStore::new(dir.path()));

    let template = resolver
        .load_program_template("spring")
        .await
        .unwrap()
        .expect("program exists");
    assert_eq!(template.outcome(), Outcome::Resolved);

    let resolved = resolver
        .resolve_client_program("athlete", "spring", template.value)
        .await
        .unwrap();
    assert!(resolved.is_complete(), "unexpected gaps: {:?}", resolved.gaps);
    let program = resolved.value;

    assert_eq!(program.id, "spring");
    assert_eq!(program.title.as_deref(), Some("Spring cycle"));

    let week1 = program.module("week1").unwrap();
    assert_eq!(week1.title.as_deref(), Some("Strength block"));
    let ids: Vec<&str> = week1.sessions.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["lower", "upper", "conditioning"]);

    let lower = week1.session("lower").unwrap();
    assert_eq!(lower.title.as_deref(), Some("Leg day"));
    assert_eq!(lower.image_url.as_deref(), Some(""));
    let squat = lower.exercise("squat").unwrap();
    let reps: Vec<Value> = squat.sets.iter().map(|s| s.fields["reps"].clone()).collect();
    assert_eq!(reps, vec![json!(5), json!(5), json!(3)]);
    assert!(lower.exercise("rdl").unwrap().sets.is_empty());

    let conditioning = week1.session("conditioning").unwrap();
    assert_eq!(conditioning.exercises.len(), 1);
    assert_eq!(conditioning.exercises[0].fields["name"], json!("Row 500m"));

    assert!(week1.session("bonus").is_none());
}

#[tokio::test]
async fn corrupt_client_document_degrades_to_no_overrides() {
    let dir = tempdir().unwrap();
    seed(dir.path());
    fs::write(
        dir.path().join("client_programs/athlete_spring.json"),
        b"{ not json",
    )
    .unwrap();
    let resolver = Resolver::new(FsStore::new(dir.path()));

    let template = resolver
        .load_program_template("spring")
        .await
        .unwrap()
        .unwrap()
        .value;
    let resolved = resolver
        .resolve_client_program("athlete", "spring", template)
        .await
        .unwrap();

    assert!(matches!(
        resolved.gaps.as_slice(),
        [ResolutionGap::ClientOverridesUnavailable { path, .. }] if path == "client_programs/athlete_spring"
    ));
    let lower = resolved.value.module("week1").unwrap().session("lower").unwrap();
    assert_eq!(lower.image_url.as_deref(), Some("lower.png"));
}

#[tokio::test]
async fn snapshot_then_drift_after_library_edit() {
    let dir = tempdir().unwrap();
    seed(dir.path());
    let resolver = Resolver::new(FsStore::new(dir.path()));

    let template = resolver
        .load_program_template("spring")
        .await
        .unwrap()
        .unwrap()
        .value;
    let program = resolver
        .resolve_client_program("athlete", "spring", template)
        .await
        .unwrap()
        .value;

    let snapshot = resolver
        .extract_library_versions("coach", &program.modules)
        .await;
    assert_eq!(
        serde_json::to_value(&snapshot).unwrap(),
        json!({ "modules": { "strength": 3 }, "sessions": { "lower": 5, "upper": 2 } })
    );

    let stored: VersionSnapshot =
        serde_json::from_str(&serde_json::to_string(&snapshot).unwrap()).unwrap();
    let fresh = resolver
        .check_library_versions_changed("coach", &stored)
        .await;
    assert!(!fresh.needs_update);

    write(
        dir.path(),
        "creator_libraries/coach/sessions/upper",
        json!({ "title": "Upper body", "version": 3 }),
    );
    fs::remove_file(
        dir.path()
            .join("creator_libraries/coach/modules/strength.json"),
    )
    .unwrap();

    let drift = resolver
        .check_library_versions_changed("coach", &stored)
        .await;
    assert!(drift.needs_update);
    assert_eq!(drift.changed_sessions.len(), 1);
    assert_eq!(drift.changed_sessions[0].session_id, "upper");
    assert_eq!(drift.changed_sessions[0].old_version, 2);
    assert_eq!(drift.changed_sessions[0].new_version, 3);
    assert_eq!(drift.unknown_modules, vec!["strength"]);
}

#[tokio::test]
async fn custom_layout_from_config() {
    let dir = tempdir().unwrap();
    write(
        dir.path(),
        "programs/p1",
        json!({ "title": "Standalone only", "modules": [{ "id": "m1", "title": "Warmup" }] }),
    );
    let config = RegimenConfig::from_json(r#"{ "layout": { "programs": "programs" } }"#).unwrap();
    assert_eq!(config.layout.libraries, StoreLayout::default().libraries);
    let resolver = Resolver::with_config(FsStore::new(dir.path()), config);

    let template = resolver
        .load_program_template("p1")
        .await
        .unwrap()
        .unwrap()
        .value;
    let resolved = resolver
        .resolve_client_program("u", "p1", template)
        .await
        .unwrap();

    assert_eq!(resolved.value.title.as_deref(), Some("Standalone only"));
    assert_eq!(resolved.missing_paths(), vec!["programs/p1"]);
}
