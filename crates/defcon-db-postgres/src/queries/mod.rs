//! SQL query modules for the PostgreSQL storage backend.
//!
//! Each module owns one table. Upserts use `ON CONFLICT ... DO UPDATE ...
//! WHERE <row differs>` so an identical write touches nothing and returns no
//! row; `xmax = 0` on the returned row distinguishes insert from update.

pub mod components;
pub mod instances;
pub mod plugins;

use defcon_storage::UpsertOutcome;

/// Interprets the `RETURNING (xmax = 0)` result of a conditional upsert.
pub(crate) fn upsert_outcome(inserted: Option<bool>) -> UpsertOutcome {
    match inserted {
        Some(true) => UpsertOutcome::Created,
        Some(false) => UpsertOutcome::Updated,
        None => UpsertOutcome::Unchanged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_outcome() {
        assert_eq!(upsert_outcome(Some(true)), UpsertOutcome::Created);
        assert_eq!(upsert_outcome(Some(false)), UpsertOutcome::Updated);
        assert_eq!(upsert_outcome(None), UpsertOutcome::Unchanged);
    }
}
