use credit_ahp::config::ScoringConfig;
use credit_ahp::scoring::{
    ApplicantBatchImporter, CreditScoringService, EngineOptions, HierarchyDefinition,
    ScoringEngine, TracingObserver,
};
use std::sync::Arc;

fn farmer_service() -> CreditScoringService {
    CreditScoringService::with_observer(
        &HierarchyDefinition::farmer_credit(),
        EngineOptions::from(&ScoringConfig::default()),
        Arc::new(TracingObserver),
    )
    .expect("standard hierarchy loads")
}

#[test]
fn batch_of_applicants_is_scored_against_the_farmer_hierarchy() {
    let csv = "applicant,U1A1,U2B1,U2B2,U3C1,U4D1\n\
farmer-001,5,5,5,5,5\n\
farmer-002,1,2,1,2,1\n\
farmer-003,5,5,4,,5\n";

    let service = farmer_service();
    let rows = ApplicantBatchImporter::from_reader(csv.as_bytes()).expect("import succeeds");
    let verdicts: Vec<_> = rows
        .iter()
        .map(|row| (row.applicant.as_str(), service.evaluate(&row.scores)))
        .collect();

    assert_eq!(verdicts.len(), 3);

    let (name, top) = &verdicts[0];
    assert_eq!(*name, "farmer-001");
    assert!(top.eligible);
    assert!((top.score.expect("scored") - 100.0).abs() < 1e-9);

    let (_, low) = &verdicts[1];
    assert!(!low.eligible);
    assert!(low.score.expect("scored") < 70.0);

    let (_, partial) = &verdicts[2];
    assert!(partial.eligible);
    assert_eq!(
        partial
            .breakdown
            .as_ref()
            .map(|breakdown| breakdown.categories.len()),
        Some(3)
    );
}

#[test]
fn hierarchy_files_drive_the_engine() {
    let definition = HierarchyDefinition::farmer_credit();
    let path = std::env::temp_dir().join(format!(
        "credit-ahp-hierarchy-{}.json",
        std::process::id()
    ));
    std::fs::write(
        &path,
        serde_json::to_vec_pretty(&definition).expect("definition serializes"),
    )
    .expect("write definition");

    let loaded = HierarchyDefinition::from_path(&path).expect("definition loads");
    std::fs::remove_file(&path).ok();

    let engine =
        ScoringEngine::construct(&loaded, &EngineOptions::default()).expect("engine builds");
    assert_eq!(loaded.name, definition.name);
    assert_eq!(loaded.categories.len(), definition.categories.len());
    assert_eq!(engine.consistency_summary().len(), 4);
    assert_eq!(engine.consistency_summary()[0], "U1: CONSISTENT (CR = 0.032)");
}

#[test]
fn derived_top_level_weights_come_from_a_matrix() {
    let json = r#"{
        "name": "derived-pilot",
        "categories": [
            {
                "code": "U1",
                "label": "Family background",
                "leaf_letter": "A",
                "leaves": ["Age range", "Farming experience"],
                "matrix": [[1.0, 3.0], [0.3333333333333333, 1.0]]
            },
            {
                "code": "U2",
                "label": "Willingness to repay",
                "leaf_letter": "B",
                "leaves": ["Repayment history"],
                "matrix": [[1.0]]
            }
        ],
        "top_level": {
            "mode": "derived",
            "matrix": [[1.0, 0.25], [4.0, 1.0]]
        }
    }"#;

    let definition = HierarchyDefinition::from_reader(json.as_bytes()).expect("parses");
    let engine =
        ScoringEngine::construct(&definition, &EngineOptions::default()).expect("engine builds");

    assert!(engine.is_usable());
    assert_eq!(engine.consistency_summary()[0], "Main: CONSISTENT (CR = 0.000)");
    assert!((engine.category_weight("U2").expect("weighted") - 0.8).abs() < 1e-12);
    assert!((engine.leaf_weight("U1A1").expect("weighted").leaf_weight - 0.75).abs() < 1e-9);
}

#[test]
fn unreadable_definitions_surface_load_errors() {
    let err = HierarchyDefinition::from_reader("{\"name\": \"broken\"".as_bytes()).unwrap_err();
    assert!(err.to_string().starts_with("invalid hierarchy definition"));
}
