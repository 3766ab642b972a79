// Tests for the reference catalog

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;
use tercet_core::{BatchInsert, Catalog, CatalogError, CatalogStore, Reference};

fn create_test_catalog() -> (TempDir, Catalog) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let catalog = Catalog::open(&db_path).unwrap();
    (temp_dir, catalog)
}

fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

// ============================================================================
// Database Creation Tests
// ============================================================================

#[test]
fn test_catalog_creation() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    let catalog = Catalog::open(&db_path);
    assert!(catalog.is_ok());
    assert!(db_path.exists());
}

#[test]
fn test_catalog_exists_and_drop() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    assert!(!Catalog::exists(&db_path));

    {
        let _catalog = Catalog::open(&db_path).unwrap();
    }
    assert!(Catalog::exists(&db_path));

    Catalog::drop(&db_path).unwrap();
    assert!(!Catalog::exists(&db_path));
}

#[test]
fn test_catalog_persists_across_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    {
        let catalog = Catalog::open(&db_path).unwrap();
        catalog.insert("abc").unwrap();
        catalog.insert("def").unwrap();
        catalog.mark_visited("abc").unwrap();
    }

    let catalog = Catalog::open(&db_path).unwrap();
    assert_eq!(
        catalog.list().unwrap(),
        vec![
            Reference {
                id: "abc".to_string(),
                visited: true
            },
            Reference {
                id: "def".to_string(),
                visited: false
            },
        ]
    );
}

// ============================================================================
// Insert Tests
// ============================================================================

#[test]
fn test_insert_starts_unvisited() {
    let (_temp_dir, catalog) = create_test_catalog();

    catalog.insert("abc").unwrap();

    assert_eq!(catalog.len().unwrap(), 1);
    assert_eq!(catalog.is_visited("abc").unwrap(), Some(false));
    assert_eq!(catalog.is_visited("missing").unwrap(), None);
}

#[test]
fn test_insert_duplicate_fails() {
    let (_temp_dir, catalog) = create_test_catalog();

    catalog.insert("abc").unwrap();
    let result = catalog.insert("abc");

    assert!(matches!(result, Err(CatalogError::DuplicateKey(id)) if id == "abc"));
    assert_eq!(catalog.len().unwrap(), 1);
}

#[test]
fn test_insert_batch_reports_duplicates() {
    let (_temp_dir, catalog) = create_test_catalog();
    catalog.insert("b").unwrap();

    let report = catalog.insert_batch(&ids(&["a", "b", "c", "a"])).unwrap();

    assert_eq!(
        report,
        BatchInsert {
            inserted: 2,
            duplicates: ids(&["b", "a"]),
        }
    );
    assert_eq!(catalog.len().unwrap(), 3);
}

#[test]
fn test_insert_batch_empty() {
    let (_temp_dir, catalog) = create_test_catalog();

    let report = catalog.insert_batch(&[]).unwrap();

    assert_eq!(report, BatchInsert::default());
    assert!(catalog.is_empty().unwrap());
}

// ============================================================================
// Pick Tests
// ============================================================================

#[test]
fn test_pick_on_empty_catalog_is_none() {
    let (_temp_dir, catalog) = create_test_catalog();
    assert_eq!(catalog.pick_unvisited().unwrap(), None);
}

#[test]
fn test_pick_never_returns_visited() {
    let (_temp_dir, catalog) = create_test_catalog();
    catalog
        .insert_batch(&ids(&["a", "b", "c", "d", "e"]))
        .unwrap();
    for id in ["a", "c", "e"] {
        catalog.mark_visited(id).unwrap();
    }

    for _ in 0..50 {
        let picked = catalog.pick_unvisited().unwrap().unwrap();
        assert!(picked == "b" || picked == "d", "picked visited '{}'", picked);
    }
    assert_eq!(catalog.unvisited_count().unwrap(), 2);
}

#[test]
fn test_pick_eventually_covers_all_unvisited() {
    let (_temp_dir, catalog) = create_test_catalog();
    catalog.insert_batch(&ids(&["a", "b", "c"])).unwrap();

    let mut seen = HashSet::new();
    for _ in 0..200 {
        seen.insert(catalog.pick_unvisited().unwrap().unwrap());
    }
    assert_eq!(seen.len(), 3);
}

#[test]
fn test_exhaustion_resets_and_picks() {
    let (_temp_dir, catalog) = create_test_catalog();
    catalog.insert_batch(&ids(&["a", "b"])).unwrap();
    catalog.mark_visited("a").unwrap();
    catalog.mark_visited("b").unwrap();
    assert_eq!(catalog.unvisited_count().unwrap(), 0);

    let picked = catalog.pick_unvisited().unwrap();

    assert!(picked.is_some());
    assert_eq!(catalog.unvisited_count().unwrap(), 2);
}

#[test]
fn test_mark_then_pick_excludes_id() {
    let (_temp_dir, catalog) = create_test_catalog();
    catalog.insert_batch(&ids(&["a", "b"])).unwrap();

    catalog.mark_visited("a").unwrap();

    for _ in 0..20 {
        assert_eq!(catalog.pick_unvisited().unwrap().as_deref(), Some("b"));
    }
}

#[test]
fn test_last_unvisited_marked_then_reappears_after_reset() {
    let (_temp_dir, catalog) = create_test_catalog();
    catalog.insert("only").unwrap();

    catalog.mark_visited("only").unwrap();

    assert_eq!(catalog.pick_unvisited().unwrap().as_deref(), Some("only"));
    assert_eq!(catalog.is_visited("only").unwrap(), Some(false));
}

#[test]
fn test_full_tour_visits_everything_once() {
    let (_temp_dir, catalog) = create_test_catalog();
    let all = ids(&["a", "b", "c", "d"]);
    catalog.insert_batch(&all).unwrap();

    let mut toured = Vec::new();
    for _ in 0..all.len() {
        let picked = catalog.pick_unvisited().unwrap().unwrap();
        catalog.mark_visited(&picked).unwrap();
        toured.push(picked);
    }
    toured.sort();

    assert_eq!(toured, all);
    assert_eq!(catalog.unvisited_count().unwrap(), 0);
}

// ============================================================================
// Mark / Reset Tests
// ============================================================================

#[test]
fn test_mark_visited_returns_rows() {
    let (_temp_dir, catalog) = create_test_catalog();
    catalog.insert("abc").unwrap();

    assert_eq!(catalog.mark_visited("abc").unwrap(), 1);
    assert_eq!(catalog.mark_visited("abc").unwrap(), 1);
    assert_eq!(catalog.is_visited("abc").unwrap(), Some(true));
}

#[test]
fn test_mark_unknown_id_is_not_fatal() {
    let (_temp_dir, catalog) = create_test_catalog();
    catalog.insert("abc").unwrap();

    assert_eq!(catalog.mark_visited("nope").unwrap(), 0);
    assert_eq!(catalog.is_visited("abc").unwrap(), Some(false));
}

#[test]
fn test_reset_visited() {
    let (_temp_dir, catalog) = create_test_catalog();
    catalog.insert_batch(&ids(&["a", "b", "c"])).unwrap();
    catalog.mark_visited("a").unwrap();
    catalog.mark_visited("b").unwrap();

    assert_eq!(catalog.reset_visited().unwrap(), 3);
    assert_eq!(catalog.unvisited_count().unwrap(), 3);
}

// ============================================================================
// Concurrency Tests
// ============================================================================

#[test]
fn test_concurrent_pick_and_mark() {
    let (_temp_dir, catalog) = create_test_catalog();
    catalog
        .insert_batch(&ids(&["a", "b", "c", "d", "e", "f"]))
        .unwrap();
    let catalog = Arc::new(catalog);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let catalog = Arc::clone(&catalog);
            thread::spawn(move || {
                for _ in 0..25 {
                    let picked = catalog
                        .pick_unvisited()
                        .expect("pick failed")
                        .expect("non-empty catalog returned nothing");
                    assert_eq!(catalog.mark_visited(&picked).unwrap(), 1);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(catalog.len().unwrap(), 6);
}
