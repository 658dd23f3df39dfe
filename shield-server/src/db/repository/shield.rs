//! Shield Repository

use super::{RepoError, RepoResult};
use shared::models::{Page, Shield, ShieldCreate, SortDirection, SortField};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, street, client, amount, paid, created_at, paid_at, photo_url";

fn validate_create(data: &ShieldCreate) -> RepoResult<()> {
    if data.street.trim().is_empty() || data.client.trim().is_empty() {
        return Err(RepoError::Validation("Street and client are required".into()));
    }
    if !data.amount.is_finite() || data.amount <= 0.0 {
        return Err(RepoError::Validation(format!(
            "Amount must be a positive number: {}",
            data.amount
        )));
    }
    Ok(())
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Shield>> {
    let shield = sqlx::query_as::<_, Shield>(&format!("SELECT {COLUMNS} FROM shields WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(shield)
}

/// Fetch a shield, failing with `NotFound` if absent
pub async fn get(pool: &SqlitePool, id: i64) -> RepoResult<Shield> {
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Shield {id} not found")))
}

pub async fn create(pool: &SqlitePool, data: ShieldCreate) -> RepoResult<Shield> {
    validate_create(&data)?;

    let now = shared::util::now_millis();
    let shield = sqlx::query_as::<_, Shield>(&format!(
        "INSERT INTO shields (street, client, amount, paid, created_at, paid_at, photo_url) \
         VALUES (?1, ?2, ?3, 0, ?4, NULL, ?5) RETURNING {COLUMNS}"
    ))
    .bind(data.street.trim())
    .bind(data.client.trim())
    .bind(data.amount)
    .bind(now)
    .bind(data.photo_url)
    .fetch_one(pool)
    .await?;

    Ok(shield)
}

/// One page of shields sorted by `field`, ties broken by id in the same direction
///
/// `page` is 1-indexed; values below 1 are treated as 1. Pages past the end
/// come back empty with the real total.
pub async fn list(
    pool: &SqlitePool,
    field: SortField,
    direction: SortDirection,
    page: u32,
    page_size: u32,
) -> RepoResult<Page<Shield>> {
    let page = page.max(1);
    let offset = (page as i64 - 1) * page_size as i64;
    let dir = direction.as_sql();

    // Column and direction come from closed enums, never from user text
    let sql = format!(
        "SELECT {COLUMNS} FROM shields ORDER BY {col} {dir}, id {dir} LIMIT ? OFFSET ?",
        col = field.column(),
    );
    let items = sqlx::query_as::<_, Shield>(&sql)
        .bind(page_size as i64)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    let total = count(pool).await?;

    Ok(Page {
        items,
        total,
        page,
        page_size,
    })
}

/// Flip `paid`; `paid_at` becomes now on false→true and NULL on true→false
pub async fn toggle_paid(pool: &SqlitePool, id: i64) -> RepoResult<Shield> {
    let now = shared::util::now_millis();

    // Single statement: the right-hand side sees the pre-update row
    let shield = sqlx::query_as::<_, Shield>(&format!(
        "UPDATE shields SET paid = NOT paid, paid_at = CASE WHEN paid THEN NULL ELSE ?1 END \
         WHERE id = ?2 RETURNING {COLUMNS}"
    ))
    .bind(now)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    shield.ok_or_else(|| RepoError::NotFound(format!("Shield {id} not found")))
}

/// Delete a shield and return the removed row
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<Shield> {
    let shield = sqlx::query_as::<_, Shield>(&format!(
        "DELETE FROM shields WHERE id = ? RETURNING {COLUMNS}"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    shield.ok_or_else(|| RepoError::NotFound(format!("Shield {id} not found")))
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shields")
        .fetch_one(pool)
        .await?;
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use shared::models::PAGE_SIZE;

    async fn test_pool() -> SqlitePool {
        DbService::in_memory().await.unwrap().pool
    }

    fn payload(street: &str, amount: f64) -> ShieldCreate {
        ShieldCreate {
            street: street.to_string(),
            client: "ACME".to_string(),
            amount,
            photo_url: None,
        }
    }

    #[tokio::test]
    async fn test_create_starts_unpaid() {
        let pool = test_pool().await;
        let shield = create(&pool, payload("  Main St  ", 120.5)).await.unwrap();

        assert!(shield.id > 0);
        assert_eq!(shield.street, "Main St");
        assert!(!shield.paid);
        assert!(shield.paid_at.is_none());
        assert!(shield.created_at > 0);
        assert_eq!(count(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_amount() {
        let pool = test_pool().await;

        for amount in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let err = create(&pool, payload("Main St", amount)).await.unwrap_err();
            assert!(matches!(err, RepoError::Validation(_)));
        }
        let err = create(&pool, payload("   ", 10.0)).await.unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));

        assert_eq!(count(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let pool = test_pool().await;
        let err = get(&pool, 99).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_toggle_paid_twice_restores_state() {
        let pool = test_pool().await;
        let shield = create(&pool, payload("Main St", 10.0)).await.unwrap();

        let paid = toggle_paid(&pool, shield.id).await.unwrap();
        assert!(paid.paid);
        assert!(paid.paid_at.is_some());

        let unpaid = toggle_paid(&pool, shield.id).await.unwrap();
        assert!(!unpaid.paid);
        assert!(unpaid.paid_at.is_none());
    }

    #[tokio::test]
    async fn test_toggle_missing() {
        let pool = test_pool().await;
        let err = toggle_paid(&pool, 7).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_returns_row() {
        let pool = test_pool().await;
        let mut data = payload("Main St", 10.0);
        data.photo_url = Some("shield_20240101_000000_000.png".into());
        let shield = create(&pool, data).await.unwrap();

        let removed = delete(&pool, shield.id).await.unwrap();
        assert_eq!(removed.photo_url.as_deref(), Some("shield_20240101_000000_000.png"));
        assert_eq!(count(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_missing_leaves_count() {
        let pool = test_pool().await;
        create(&pool, payload("Main St", 10.0)).await.unwrap();

        let err = delete(&pool, 42).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
        assert_eq!(count(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let pool = test_pool().await;
        for i in 0..45 {
            create(&pool, payload(&format!("Street {i}"), 1.0 + i as f64))
                .await
                .unwrap();
        }

        let mut sizes = Vec::new();
        for page in 1..=4 {
            let result = list(&pool, SortField::CreatedAt, SortDirection::Desc, page, PAGE_SIZE)
                .await
                .unwrap();
            assert_eq!(result.total, 45);
            sizes.push(result.items.len());
        }
        assert_eq!(sizes, vec![20, 20, 5, 0]);

        // Page 0 is treated as page 1
        let first = list(&pool, SortField::CreatedAt, SortDirection::Desc, 0, PAGE_SIZE)
            .await
            .unwrap();
        assert_eq!(first.page, 1);
        assert_eq!(first.items.len(), 20);
    }

    #[tokio::test]
    async fn test_list_pages_do_not_overlap() {
        let pool = test_pool().await;
        // Equal amounts everywhere: the id tie-break keeps pages disjoint
        for i in 0..25 {
            create(&pool, payload(&format!("Street {i}"), 5.0)).await.unwrap();
        }

        let p1 = list(&pool, SortField::Amount, SortDirection::Asc, 1, PAGE_SIZE)
            .await
            .unwrap();
        let p2 = list(&pool, SortField::Amount, SortDirection::Asc, 2, PAGE_SIZE)
            .await
            .unwrap();
        let mut ids: Vec<i64> = p1.items.iter().chain(&p2.items).map(|s| s.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 25);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_list_amount_desc() {
        let pool = test_pool().await;
        for amount in [10.0, 50.0, 30.0] {
            create(&pool, payload("Main St", amount)).await.unwrap();
        }

        let result = list(&pool, SortField::Amount, SortDirection::Desc, 1, PAGE_SIZE)
            .await
            .unwrap();
        let amounts: Vec<f64> = result.items.iter().map(|s| s.amount).collect();
        assert_eq!(amounts, vec![50.0, 30.0, 10.0]);
    }

    #[tokio::test]
    async fn test_list_paid_first() {
        let pool = test_pool().await;
        let a = create(&pool, payload("A", 1.0)).await.unwrap();
        let b = create(&pool, payload("B", 2.0)).await.unwrap();
        toggle_paid(&pool, a.id).await.unwrap();

        let result = list(&pool, SortField::Paid, SortDirection::Desc, 1, PAGE_SIZE)
            .await
            .unwrap();
        assert_eq!(result.items[0].id, a.id);
        assert_eq!(result.items[1].id, b.id);
    }
}
