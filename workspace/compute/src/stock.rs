//! Stock rules: a product's current stock is the sum of inward movements
//! minus the sum of outward movements.

use model::entities::product;
use model::entities::stock_movement::{self, MovementDirection};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect, Set,
};
use tracing::{debug, instrument, trace};

use crate::error::{ComputeError, Result};

/// Net stock level from partitioned movement totals.
pub fn stock_level(inward: Decimal, outward: Decimal) -> Decimal {
    inward - outward
}

async fn direction_total<C>(
    conn: &C,
    product_id: i32,
    direction: MovementDirection,
) -> Result<Decimal>
where
    C: ConnectionTrait,
{
    let total: Option<Option<Decimal>> = stock_movement::Entity::find()
        .select_only()
        .column_as(stock_movement::Column::Quantity.sum(), "total")
        .filter(stock_movement::Column::ProductId.eq(product_id))
        .filter(stock_movement::Column::Direction.eq(direction))
        .into_tuple()
        .one(conn)
        .await?;

    Ok(total.flatten().unwrap_or(Decimal::ZERO))
}

/// Recomputes and stores the product's current stock from its movements.
/// Movement quantities are validated as strictly positive before they are
/// written; this rule performs no validation of its own.
#[instrument(skip(conn))]
pub async fn recompute_product_stock<C>(conn: &C, product_id: i32) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    trace!("Recomputing stock for product_id={}", product_id);

    let product = product::Entity::find_by_id(product_id)
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| ComputeError::not_found("product", product_id))?;

    let inward = direction_total(conn, product_id, MovementDirection::In).await?;
    let outward = direction_total(conn, product_id, MovementDirection::Out).await?;
    let current_stock = stock_level(inward, outward);

    debug!(
        "Product {} ({}): in={}, out={}, stock={}",
        product.code, product_id, inward, outward, current_stock
    );

    let mut active: product::ActiveModel = product.into();
    active.current_stock = Set(current_stock);
    Ok(active.update(conn).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn stock_level_is_in_minus_out() {
        assert_eq!(
            stock_level(Decimal::new(1_000, 2), Decimal::new(300, 2)),
            Decimal::new(700, 2)
        );
        assert_eq!(stock_level(Decimal::ZERO, Decimal::ZERO), Decimal::ZERO);
    }

    #[tokio::test]
    async fn empty_movement_set_yields_zero() {
        let db = testing::setup_db().await;
        let (product, _) = testing::insert_product(&db, "P-1").await;

        let updated = recompute_product_stock(&db, product.id).await.unwrap();
        assert_eq!(updated.current_stock, Decimal::ZERO);
    }

    #[tokio::test]
    async fn inward_ten_outward_three_leaves_seven() {
        let db = testing::setup_db().await;
        let (product, warehouse) = testing::insert_product(&db, "P-1").await;
        testing::insert_movement(
            &db,
            product.id,
            warehouse,
            MovementDirection::In,
            Decimal::new(1_000, 2),
        )
        .await;
        testing::insert_movement(
            &db,
            product.id,
            warehouse,
            MovementDirection::Out,
            Decimal::new(300, 2),
        )
        .await;

        let updated = recompute_product_stock(&db, product.id).await.unwrap();
        assert_eq!(updated.current_stock, Decimal::new(700, 2));
    }

    #[tokio::test]
    async fn unknown_product_is_reported() {
        let db = testing::setup_db().await;
        let err = recompute_product_stock(&db, 42).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
