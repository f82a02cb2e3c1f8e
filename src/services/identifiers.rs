//! Sequential identifier generation

use chrono::{Datelike, Utc};

use crate::{
    error::AppResult,
    identifiers::{format_identifier, IdentifierKind},
    repository::Repository,
};

/// Issues `QT-<year>-<seq>` / `BK-<year>-<seq>` codes from the per-year
/// counters. Each call reserves a value, so codes are never reused even when
/// the insert that follows fails.
#[derive(Clone)]
pub struct IdentifierGenerator {
    repository: Repository,
}

impl IdentifierGenerator {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Next code for the current calendar year (UTC)
    pub async fn next(&self, kind: IdentifierKind) -> AppResult<String> {
        self.next_for_year(kind, Utc::now().year()).await
    }

    pub async fn next_for_year(&self, kind: IdentifierKind, year: i32) -> AppResult<String> {
        let sequence = self.repository.sequences.next_value(kind, year).await?;
        let code = format_identifier(kind, year, sequence);
        tracing::debug!(%kind, year, sequence, code = %code, "Issued identifier");
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::identifiers::identifier_from_count;
    use crate::repository::memory::MemoryStore;

    #[tokio::test]
    async fn test_serialized_codes_strictly_increase() {
        let generator = IdentifierGenerator::new(Repository::in_memory());
        let mut codes = Vec::new();
        for _ in 0..5 {
            codes.push(
                generator
                    .next_for_year(IdentifierKind::Quotation, 2025)
                    .await
                    .unwrap(),
            );
        }
        assert_eq!(
            codes,
            vec!["QT-2025-001", "QT-2025-002", "QT-2025-003", "QT-2025-004", "QT-2025-005"]
        );
    }

    #[tokio::test]
    async fn test_concurrent_calls_get_distinct_codes() {
        let store = Arc::new(MemoryStore::new());
        store.seed_sequence(IdentifierKind::Quotation, 2025, 5).await;
        let generator = IdentifierGenerator::new(Repository::from_memory(store));

        // The count-based derivation hands out the same code twice
        assert_eq!(
            identifier_from_count(IdentifierKind::Quotation, 2025, 5),
            identifier_from_count(IdentifierKind::Quotation, 2025, 5)
        );

        let (a, b) = tokio::join!(
            generator.next_for_year(IdentifierKind::Quotation, 2025),
            generator.next_for_year(IdentifierKind::Quotation, 2025),
        );
        let mut codes = vec![a.unwrap(), b.unwrap()];
        codes.sort();
        assert_eq!(codes, vec!["QT-2025-006", "QT-2025-007"]);
    }

    #[tokio::test]
    async fn test_many_tasks_never_collide() {
        let generator = IdentifierGenerator::new(Repository::in_memory());
        let handles: Vec<_> = (0..20)
            .map(|_| {
                let generator = generator.clone();
                tokio::spawn(async move { generator.next_for_year(IdentifierKind::Booking, 2025).await })
            })
            .collect();

        let mut codes = Vec::new();
        for handle in handles {
            codes.push(handle.await.unwrap().unwrap());
        }
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), 20);
        assert_eq!(codes.first().map(String::as_str), Some("BK-2025-001"));
        assert_eq!(codes.last().map(String::as_str), Some("BK-2025-020"));
    }

    #[tokio::test]
    async fn test_years_and_kinds_count_separately() {
        let generator = IdentifierGenerator::new(Repository::in_memory());
        let q = generator.next_for_year(IdentifierKind::Quotation, 2025).await.unwrap();
        let b = generator.next_for_year(IdentifierKind::Booking, 2025).await.unwrap();
        let next_year = generator.next_for_year(IdentifierKind::Quotation, 2026).await.unwrap();
        assert_eq!(q, "QT-2025-001");
        assert_eq!(b, "BK-2025-001");
        assert_eq!(next_year, "QT-2026-001");
    }
}
