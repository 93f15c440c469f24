//! Read-only operations

use enrollkv::error::EnrollError;

use super::{create, setup, Fixture};

fn names(students: &[enrollkv::Student]) -> Vec<&str> {
    students.iter().map(|s| s.name.as_str()).collect()
}

fn seeded() -> Fixture {
    let fx = setup();
    create(&fx, "Alice", "CS", "2022-09-01");
    create(&fx, "bob", "Physics", "2021-01-15");
    create(&fx, "Carol", "CS", "2023-02-10");
    create(&fx, "Dave", "Math", "2022-12-31");
    create(&fx, "Eve", "CS", "2022-05-20");
    fx
}

// =============================================================================
// Lookups
// =============================================================================

#[test]
fn test_list_in_store_order() {
    let fx = seeded();

    assert_eq!(names(&fx.service.list().unwrap()), vec!["Alice", "bob", "Carol", "Dave", "Eve"]);
}

#[test]
fn test_get_missing() {
    let fx = seeded();

    let err = fx.service.get("s999").unwrap_err();
    assert!(matches!(err, EnrollError::NotFound(_)));
    assert!(err.to_string().ends_with("Student with id=s999 not found"));
}

#[test]
fn test_get_by_email() {
    let fx = seeded();

    assert_eq!(fx.service.get_by_email("carol@uni.edu").unwrap().name, "Carol");

    // Exact, case-sensitive match
    let err = fx.service.get_by_email("CAROL@uni.edu").unwrap_err();
    assert!(matches!(err, EnrollError::NotFound(_)));
}

// =============================================================================
// Filters
// =============================================================================

#[test]
fn test_filter_by_major_is_exact() {
    let fx = seeded();

    let cs = fx.service.filter_by_major("CS").unwrap();
    assert_eq!(names(&cs), vec!["Alice", "Carol", "Eve"]);
    assert!(cs.iter().all(|s| s.major == "CS"));

    assert!(fx.service.filter_by_major("cs").unwrap().is_empty());
    assert!(fx.service.filter_by_major("Art").unwrap().is_empty());
}

#[test]
fn test_filter_by_date_range_inclusive() {
    let fx = seeded();

    let found = fx.service.filter_by_date_range("2022-05-20", "2022-12-31").unwrap();
    assert_eq!(names(&found), vec!["Alice", "Dave", "Eve"]);

    assert!(fx.service.filter_by_date_range("2030-01-01", "2031-01-01").unwrap().is_empty());
}

#[test]
fn test_filter_by_year() {
    let fx = seeded();

    assert_eq!(names(&fx.service.filter_by_year(2022).unwrap()), vec!["Alice", "Dave", "Eve"]);
    assert!(fx.service.filter_by_year(1999).unwrap().is_empty());
}

#[test]
fn test_filter_by_major_and_year() {
    let fx = seeded();

    let found = fx.service.filter_by_major_and_year("CS", 2022).unwrap();
    assert_eq!(names(&found), vec!["Alice", "Eve"]);
}

#[test]
fn test_search_by_name_ignores_case() {
    let fx = seeded();

    assert_eq!(names(&fx.service.search_by_name("BO").unwrap()), vec!["bob"]);
    assert_eq!(names(&fx.service.search_by_name("e").unwrap()), vec!["Alice", "Dave", "Eve"]);
    assert_eq!(fx.service.search_by_name("").unwrap().len(), 5);
}

#[test]
fn test_count_by_major() {
    let fx = seeded();

    assert_eq!(fx.service.count_by_major("CS").unwrap(), 3);
    assert_eq!(fx.service.count_by_major("Art").unwrap(), 0);
}

// =============================================================================
// Pagination and Sorting
// =============================================================================

#[test]
fn test_paginate_windows() {
    let fx = seeded();
    let all = fx.service.list().unwrap();

    assert_eq!(fx.service.paginate(1, 2).unwrap(), all[0..2].to_vec());
    assert_eq!(fx.service.paginate(2, 2).unwrap(), all[2..4].to_vec());
    assert_eq!(fx.service.paginate(3, 2).unwrap(), all[4..5].to_vec());
    assert!(fx.service.paginate(4, 2).unwrap().is_empty());
    assert_eq!(fx.service.paginate(1, 100).unwrap(), all);
}

#[test]
fn test_paginate_rejects_non_positive() {
    let fx = seeded();

    for (page, size) in [(0, 2), (1, 0), (-1, 2), (1, -5)] {
        let err = fx.service.paginate(page, size).unwrap_err();
        assert!(matches!(err, EnrollError::Validation(_)));
    }
}

#[test]
fn test_sorted_by_name() {
    let fx = seeded();

    let sorted = fx.service.sorted_by_name().unwrap();
    assert_eq!(names(&sorted), vec!["Alice", "bob", "Carol", "Dave", "Eve"]);
    assert_eq!(fx.service.list().unwrap().len(), 5);
}

#[test]
fn test_sorted_by_name_is_stable() {
    let fx = setup();
    let first = create(&fx, "Sam", "CS", "2022-09-01");
    create(&fx, "Ann", "Math", "2022-09-01");
    let second = create(&fx, "Sam", "Physics", "2022-09-01");

    let sorted = fx.service.sorted_by_name().unwrap();
    let ids: Vec<&str> = sorted.iter().map(|s| s.id.as_str()).collect();

    assert_eq!(ids, vec!["s002", first.id.as_str(), second.id.as_str()]);
}

// =============================================================================
// Scenario
// =============================================================================

#[test]
fn test_major_change_scenario() {
    let fx = setup();
    let alice = create(&fx, "Alice", "CS", "2022-09-01");
    create(&fx, "Bob", "Math", "2021-09-01");

    assert_eq!(names(&fx.service.filter_by_year(2022).unwrap()), vec!["Alice"]);
    assert_eq!(names(&fx.service.search_by_name("ali").unwrap()), vec!["Alice"]);

    fx.clock.advance(1);
    fx.service.update_major(&alice.id, "Physics").unwrap();

    assert_eq!(fx.service.count_by_major("CS").unwrap(), 0);
    assert_eq!(fx.service.count_by_major("Physics").unwrap(), 1);
}

#[test]
fn test_queries_on_empty_store() {
    let fx = setup();

    assert!(fx.service.list().unwrap().is_empty());
    assert!(fx.service.sorted_by_name().unwrap().is_empty());
    assert!(fx.service.paginate(1, 10).unwrap().is_empty());
    assert_eq!(fx.service.count_by_major("CS").unwrap(), 0);
}
