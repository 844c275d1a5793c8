use std::sync::Arc;

use super::common::*;

use crate::matrix::RandomIndexTable;
use crate::scoring::engine::EngineOptions;
use crate::scoring::hierarchy::{HierarchyDefinition, HierarchyError};
use crate::scoring::observer::GateOutcome;
use crate::scoring::service::{CreditScoringService, ServiceError};

#[test]
fn reload_swaps_the_published_engine() {
    let service =
        CreditScoringService::new(&HierarchyDefinition::farmer_credit(), EngineOptions::default())
            .expect("standard hierarchy loads");
    let before = service.current();
    assert_eq!(before.name(), "farmer-credit");

    let published = service
        .reload(&two_category_definition())
        .expect("replacement loads");

    assert_eq!(published.consistency_summary().len(), 2);
    assert!(Arc::ptr_eq(&published, &service.current()));
    assert_eq!(service.current().name(), "two-category");
    assert_eq!(service.evaluate(&uniform_scores(5.0)).score, Some(100.0));

    // Snapshots taken before the reload keep serving the old weights.
    assert_eq!(before.leaf_ids().len(), 21);
}

#[test]
fn structural_errors_keep_the_current_engine() {
    let service =
        CreditScoringService::new(&two_category_definition(), EngineOptions::default())
            .expect("hierarchy loads");

    let mut broken = two_category_definition();
    broken.categories.clear();

    let err = service.reload(&broken).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Hierarchy(HierarchyError::NoCategories)
    ));
    assert_eq!(service.current().name(), "two-category");
    assert!(service.evaluate(&uniform_scores(3.5)).eligible);
}

#[test]
fn inconsistent_replacement_is_published_but_refuses_to_score() {
    let service =
        CreditScoringService::new(&two_category_definition(), EngineOptions::default())
            .expect("hierarchy loads");

    let published = service
        .reload(&inconsistent_definition())
        .expect("structure is valid");
    let summary = published.consistency_summary();

    assert!(!published.is_usable());
    assert!(summary[1].contains("INCONSISTENT"));
    let verdict = service.evaluate(&scores(&[("U1A1", 5.0)]));
    assert_eq!(verdict.reason_code(), Some("inconsistent_configuration"));
    assert_eq!(service.consistency_summary(), summary);
}

#[test]
fn observer_is_reused_for_reloads() {
    let observer = recording_observer();
    let service = CreditScoringService::with_observer(
        &two_category_definition(),
        EngineOptions::default(),
        observer.clone(),
    )
    .expect("hierarchy loads");

    service
        .reload(&inconsistent_definition())
        .expect("structure is valid");

    assert_eq!(observer.checked().len(), 4);
    assert_eq!(
        observer.outcomes(),
        vec![
            GateOutcome::Usable { leaves: 4 },
            GateOutcome::Disabled {
                failing: vec!["U3".to_string()],
            },
        ]
    );
}

#[test]
fn options_are_kept_for_reloads_and_analysis() {
    let options = EngineOptions {
        random_index: RandomIndexTable::new(1.45),
    };
    let service = Arc::new(
        CreditScoringService::new(&two_category_definition(), options).expect("hierarchy loads"),
    );

    assert_eq!(service.options().random_index.fallback(), 1.45);
}

#[test]
fn reload_reports_the_engine_it_published_even_after_a_later_swap() {
    let service =
        CreditScoringService::new(&two_category_definition(), EngineOptions::default())
            .expect("hierarchy loads");

    let first = service
        .reload(&inconsistent_definition())
        .expect("structure is valid");
    let second = service
        .reload(&derived_definition())
        .expect("structure is valid");

    assert_eq!(first.name(), "inconsistent");
    assert!(!first.is_usable());
    assert_eq!(second.name(), "derived");
    assert!(second.is_usable());
    assert!(Arc::ptr_eq(&second, &service.current()));
}
