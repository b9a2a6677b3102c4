//! Integration tests for the SQLite record store
//!
//! Tests database operations against an in-memory SQLite database created
//! and seeded by the embedded migrations.

use chrono::Utc;

use caseflow_assistant::config::DatabaseConfig;
use caseflow_assistant::records::{CaseRecord, ClaimRecord, RecordStore, SqliteRecordStore};

/// Create an in-memory store instance for testing
async fn create_test_store() -> SqliteRecordStore {
    SqliteRecordStore::new_in_memory()
        .await
        .expect("Failed to create in-memory store")
}

fn sample_case(case_number: &str) -> CaseRecord {
    CaseRecord {
        case_number: case_number.to_string(),
        description: "Report export hangs at 90 percent".to_string(),
        comments: "Reproduced on two tenants.".to_string(),
        created_at: Utc::now(),
    }
}

fn sample_claim(claim_number: &str) -> ClaimRecord {
    ClaimRecord {
        claim_number: claim_number.to_string(),
        case_number: "123456".to_string(),
        base_rate: 75,
        units: 2,
        discount: 10,
        calculated_amount: 140,
        expected_amount: 150,
        created_at: Utc::now(),
    }
}

#[cfg(test)]
mod case_tests {
    use super::*;

    #[tokio::test]
    async fn test_seed_data_lists_three_cases() {
        let store = create_test_store().await;

        let cases = store.list_cases().await.unwrap();

        assert_eq!(cases.len(), 3);
        let numbers: Vec<&str> = cases.iter().map(|c| c.case_number.as_str()).collect();
        assert_eq!(numbers, vec!["MR123456", "MR654321", "MR789012"]);
    }

    #[tokio::test]
    async fn test_fetch_seeded_case() {
        let store = create_test_store().await;

        let case = store.fetch_case("MR123456").await.unwrap();

        assert!(case.is_some(), "Seeded case should exist");
        let case = case.unwrap();
        assert_eq!(case.description, "System crash when exporting reports");
        assert_eq!(case.comments, "Issue occurs after patch update.");
    }

    #[tokio::test]
    async fn test_fetch_nonexistent_case() {
        let store = create_test_store().await;

        let result = store.fetch_case("MR000000").await.unwrap();

        assert!(result.is_none(), "Should return None for unknown case");
    }

    #[tokio::test]
    async fn test_insert_and_fetch_case() {
        let store = create_test_store().await;

        let case = sample_case("MR222333");
        store.insert_case(&case).await.unwrap();

        let retrieved = store.fetch_case("MR222333").await.unwrap().unwrap();
        assert_eq!(retrieved.case_number, case.case_number);
        assert_eq!(retrieved.description, case.description);
        assert_eq!(retrieved.comments, case.comments);
    }
}

#[cfg(test)]
mod claim_tests {
    use super::*;

    #[tokio::test]
    async fn test_seed_data_lists_four_claims() {
        let store = create_test_store().await;

        let claims = store.list_claims().await.unwrap();

        assert_eq!(claims.len(), 4);
        assert_eq!(claims[0].claim_number, "CL123456");
    }

    #[tokio::test]
    async fn test_fetch_seeded_claim_amounts() {
        let store = create_test_store().await;

        let claim = store.fetch_claim("CL123456").await.unwrap().unwrap();

        assert_eq!(claim.base_rate, 100);
        assert_eq!(claim.units, 3);
        assert_eq!(claim.discount, 50);
        assert_eq!(claim.calculated_amount, 250);
        assert_eq!(claim.expected_amount, 300);
    }

    #[tokio::test]
    async fn test_fetch_nonexistent_claim() {
        let store = create_test_store().await;

        let result = store.fetch_claim("CL000000").await.unwrap();

        assert!(result.is_none(), "Should return None for unknown claim");
    }

    #[tokio::test]
    async fn test_claims_for_case_filters_by_case_number() {
        let store = create_test_store().await;

        let claims = store.list_claims_for_case("123456").await.unwrap();

        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].claim_number, "CL654321");
    }

    #[tokio::test]
    async fn test_claims_for_unknown_case_is_empty() {
        let store = create_test_store().await;

        let claims = store.list_claims_for_case("999999").await.unwrap();

        assert!(claims.is_empty());
    }

    #[tokio::test]
    async fn test_insert_and_fetch_claim() {
        let store = create_test_store().await;

        let claim = sample_claim("CL900001");
        store.insert_claim(&claim).await.unwrap();

        let retrieved = store.fetch_claim("CL900001").await.unwrap().unwrap();
        assert_eq!(retrieved.case_number, "123456");
        assert_eq!(retrieved.calculated_amount, 140);

        // The new claim now shows up in its case's claim list too
        let for_case = store.list_claims_for_case("123456").await.unwrap();
        assert_eq!(for_case.len(), 2);
    }
}

#[cfg(test)]
mod file_backed_tests {
    use super::*;

    #[tokio::test]
    async fn test_store_creates_database_file_and_parent_dirs() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = DatabaseConfig {
            path: dir.path().join("nested").join("records.db"),
            max_connections: 2,
        };

        let store = SqliteRecordStore::new(&config)
            .await
            .expect("Failed to open file-backed store");

        assert!(config.path.exists(), "Database file should be created");

        // Migrations seeded the reference data
        let case = store.fetch_case("MR654321").await.unwrap();
        assert!(case.is_some());
    }

    #[tokio::test]
    async fn test_reopen_preserves_inserted_records() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = DatabaseConfig {
            path: dir.path().join("records.db"),
            max_connections: 2,
        };

        let store = SqliteRecordStore::new(&config).await.unwrap();
        store.insert_case(&sample_case("MR555000")).await.unwrap();
        store.pool().close().await;
        drop(store);

        let reopened = SqliteRecordStore::new(&config).await.unwrap();
        let case = reopened.fetch_case("MR555000").await.unwrap();

        assert!(case.is_some(), "Inserted case should survive a reopen");
    }
}

#[cfg(test)]
mod concurrent_access_tests {
    use super::*;

    #[tokio::test]
    async fn test_concurrent_case_inserts() {
        let store = create_test_store().await;

        let handles: Vec<_> = (0..5)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    let case = sample_case(&format!("MR88000{}", i));
                    store.insert_case(&case).await
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }

        let cases = store.list_cases().await.unwrap();
        assert_eq!(cases.len(), 8, "3 seeded + 5 inserted");
    }
}
