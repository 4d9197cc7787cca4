//! # Principal Storage & Quota Accounting

use sqlx::{PgExecutor, Postgres, Transaction};

use covenant_core::PrincipalId;

/// Lock a principal's row for the duration of the coordinator's transaction
/// and report whether it has issuance headroom left this period.
///
/// The row lock taken here is what makes the later [`increment`] race-free
/// against concurrent issuance for the same principal — the precondition
/// check and the eventual debit share one lock scope even though they are
/// program-order steps apart (§4.5, §5).
pub async fn lock_and_check_quota(
    tx: &mut Transaction<'_, Postgres>,
    principal_id: PrincipalId,
) -> Result<bool, sqlx::Error> {
    let row: Option<(i64, i64)> = sqlx::query_as(
        "SELECT monthly_issued_count, monthly_quota_limit FROM principals WHERE id = $1 FOR UPDATE",
    )
    .bind(principal_id.as_uuid())
    .fetch_optional(&mut **tx)
    .await?;

    Ok(match row {
        Some((issued, limit)) => issued < limit,
        None => false,
    })
}

/// Debit one unit from a principal's monthly issuance counter. Only valid
/// after [`lock_and_check_quota`] returned `true` in the same transaction.
pub async fn increment<'e, E>(executor: E, principal_id: PrincipalId) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query("UPDATE principals SET monthly_issued_count = monthly_issued_count + 1 WHERE id = $1")
        .bind(principal_id.as_uuid())
        .execute(executor)
        .await?;

    Ok(())
}
