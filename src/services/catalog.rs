use std::sync::Arc;

use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, SqlErr,
    TransactionTrait,
};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::{
    db::DbPool,
    entities::{category, product},
    errors::ServiceError,
    events::{Event, EventSender},
};

/// Provider reference assigned to products created through this store.
const DEFAULT_PROVIDER_ID: i32 = 1;

/// One product⋈category row from the grouped listing query.
#[derive(Debug, Clone, FromQueryResult)]
struct GroupedRow {
    category_name: String,
    category_slug: String,
    id: String,
    name: String,
    images: Option<String>,
    price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedItem {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub price: Decimal,
}

/// Products of one category, in store order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryGroup {
    pub category: String,
    pub slug: String,
    pub items: Vec<GroupedItem>,
}

/// Inventory-facing projection ordered by SKU.
#[derive(Debug, Clone, PartialEq, Serialize, FromQueryResult)]
pub struct StockRow {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    pub category: String,
    pub description: Option<String>,
    pub images: Option<String>,
    pub status: Option<String>,
    pub ingredients: Option<String>,
    pub nutrition_info: Option<String>,
}

/// Full product row joined with its category name. Returned by the menu
/// listing, search, and the detail lookup.
#[derive(Debug, Clone, PartialEq, Serialize, FromQueryResult)]
pub struct ProductDetails {
    pub id: String,
    pub name: String,
    pub category_id: i32,
    pub price: Decimal,
    pub stock: i32,
    pub description: Option<String>,
    pub status: Option<String>,
    pub images: Option<String>,
    pub ingredients: Option<String>,
    pub nutrition_info: Option<String>,
    pub provide_id: i32,
    pub category: String,
}

#[derive(Debug, Clone)]
pub struct CreateProductInput {
    pub sku: String,
    pub name: String,
    pub category: String,
    pub slug: String,
    pub price: Decimal,
    pub stock: i32,
    pub description: Option<String>,
    pub status: Option<String>,
    pub image: Option<String>,
    pub ingredients: Option<String>,
    pub nutrition_info: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpdateProductInput {
    pub sku: String,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    pub description: Option<String>,
    pub status: Option<String>,
    pub image: Option<String>,
    pub ingredients: Option<String>,
    pub nutrition_info: Option<String>,
}

/// Catalog store: product records grouped by category, with the category
/// lifecycle bound to product existence.
#[derive(Clone)]
pub struct CatalogService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl CatalogService {
    /// Creates a new catalog service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Lists every product grouped under its category, ordered by category
    /// name then product name.
    ///
    /// Grouping is by category-name equality, accumulated into a lookup, so
    /// repeated names coalesce even if the source rows were not adjacent.
    #[instrument(skip(self))]
    pub async fn list_grouped_by_category(&self) -> Result<Vec<CategoryGroup>, ServiceError> {
        let db = &*self.db_pool;

        let rows = product::Entity::find()
            .join(JoinType::InnerJoin, product::Relation::Category.def())
            .select_only()
            .column_as(category::Column::Name, "category_name")
            .column_as(category::Column::Slug, "category_slug")
            .column(product::Column::Id)
            .column(product::Column::Name)
            .column(product::Column::Images)
            .column(product::Column::Price)
            .order_by_asc(category::Column::Name)
            .order_by_asc(product::Column::Name)
            .into_model::<GroupedRow>()
            .all(db)
            .await?;

        Ok(group_by_category(rows))
    }

    /// Flat inventory projection ordered by SKU.
    #[instrument(skip(self))]
    pub async fn list_stock(&self) -> Result<Vec<StockRow>, ServiceError> {
        let db = &*self.db_pool;

        let rows = product::Entity::find()
            .join(JoinType::InnerJoin, product::Relation::Category.def())
            .select_only()
            .column(product::Column::Id)
            .column(product::Column::Name)
            .column(product::Column::Price)
            .column(product::Column::Stock)
            .column_as(category::Column::Name, "category")
            .column(product::Column::Description)
            .column(product::Column::Images)
            .column(product::Column::Status)
            .column(product::Column::Ingredients)
            .column(product::Column::NutritionInfo)
            .order_by_asc(product::Column::Id)
            .into_model::<StockRow>()
            .all(db)
            .await?;

        Ok(rows)
    }

    /// Menu listing: every product with its category name, ordered by
    /// product name.
    #[instrument(skip(self))]
    pub async fn list_menu(&self) -> Result<Vec<ProductDetails>, ServiceError> {
        let db = &*self.db_pool;

        let rows = product::Entity::find()
            .join(JoinType::InnerJoin, product::Relation::Category.def())
            .column_as(category::Column::Name, "category")
            .order_by_asc(product::Column::Name)
            .into_model::<ProductDetails>()
            .all(db)
            .await?;

        Ok(rows)
    }

    /// Case-insensitive partial match on product name.
    #[instrument(skip(self))]
    pub async fn search(&self, keyword: &str) -> Result<Vec<ProductDetails>, ServiceError> {
        let db = &*self.db_pool;

        let pattern = format!("%{}%", keyword.to_lowercase());

        let rows = product::Entity::find()
            .join(JoinType::InnerJoin, product::Relation::Category.def())
            .column_as(category::Column::Name, "category")
            .filter(
                Expr::expr(Func::lower(Expr::col((
                    product::Entity,
                    product::Column::Name,
                ))))
                .like(pattern),
            )
            .order_by_asc(product::Column::Name)
            .into_model::<ProductDetails>()
            .all(db)
            .await?;

        Ok(rows)
    }

    /// Inserts a product, resolving its category by name first: an existing
    /// category is reused, a missing one is created with the supplied slug.
    /// Both statements run in one transaction so no orphan category can be
    /// left behind by a failed product insert.
    #[instrument(skip(self, input), fields(sku = %input.sku))]
    pub async fn add_product(&self, input: CreateProductInput) -> Result<(), ServiceError> {
        let txn = self.db_pool.begin().await?;

        let (category_id, category_created) = self
            .resolve_category(&txn, &input.category, &input.slug)
            .await?;

        let item = product::ActiveModel {
            id: Set(input.sku.clone()),
            name: Set(input.name),
            category_id: Set(category_id),
            price: Set(input.price),
            stock: Set(input.stock),
            description: Set(input.description),
            status: Set(input.status),
            images: Set(input.image),
            ingredients: Set(input.ingredients),
            nutrition_info: Set(input.nutrition_info),
            provide_id: Set(DEFAULT_PROVIDER_ID),
        };
        item.insert(&txn).await?;

        txn.commit().await?;

        if category_created {
            self.event_sender
                .send(Event::CategoryCreated(category_id))
                .await
                .map_err(ServiceError::EventError)?;
        }
        self.event_sender
            .send(Event::ProductAdded(input.sku.clone()))
            .await
            .map_err(ServiceError::EventError)?;

        info!(sku = %input.sku, category_id, "product added");

        Ok(())
    }

    /// Get-or-create by unique category name.
    ///
    /// Two concurrent inserts of the same new name race at the unique
    /// constraint; the loser retries the lookup instead of failing, so both
    /// callers converge on one row.
    async fn resolve_category<C>(
        &self,
        conn: &C,
        name: &str,
        slug: &str,
    ) -> Result<(i32, bool), ServiceError>
    where
        C: ConnectionTrait,
    {
        if let Some(existing) = category::Entity::find()
            .filter(category::Column::Name.eq(name))
            .one(conn)
            .await?
        {
            return Ok((existing.id, false));
        }

        let fresh = category::ActiveModel {
            name: Set(name.to_string()),
            slug: Set(slug.to_string()),
            ..Default::default()
        };

        match fresh.insert(conn).await {
            Ok(created) => {
                info!(category_id = created.id, category = %name, "category created");
                Ok((created.id, true))
            }
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                let existing = category::Entity::find()
                    .filter(category::Column::Name.eq(name))
                    .one(conn)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::InternalError(format!(
                            "category '{}' vanished after unique violation",
                            name
                        ))
                    })?;
                Ok((existing.id, false))
            }
            Err(err) => Err(ServiceError::DatabaseError(err)),
        }
    }

    /// Deletes a product, then removes its category if no other product
    /// still references it.
    ///
    /// The orphan check runs after the delete has committed, so it reads
    /// consistent post-delete state. Deleting an unknown SKU is a no-op.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: &str) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let Some(item) = product::Entity::find_by_id(id).one(db).await? else {
            debug!(sku = %id, "delete requested for unknown product");
            return Ok(());
        };

        let category_id = item.category_id;
        product::Entity::delete_by_id(id).exec(db).await?;

        let remaining = product::Entity::find()
            .filter(product::Column::CategoryId.eq(category_id))
            .count(db)
            .await?;

        if remaining == 0 {
            category::Entity::delete_by_id(category_id).exec(db).await?;
            info!(category_id, "removed orphaned category");
            self.event_sender
                .send(Event::CategoryRemoved(category_id))
                .await
                .map_err(ServiceError::EventError)?;
        }

        self.event_sender
            .send(Event::ProductDeleted(id.to_string()))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(())
    }

    /// Fetches one product with its category name.
    #[instrument(skip(self))]
    pub async fn get_details(&self, id: &str) -> Result<Option<ProductDetails>, ServiceError> {
        let db = &*self.db_pool;

        let details = product::Entity::find_by_id(id)
            .join(JoinType::InnerJoin, product::Relation::Category.def())
            .column_as(category::Column::Name, "category")
            .into_model::<ProductDetails>()
            .one(db)
            .await?;

        Ok(details)
    }

    /// Field-level update of the mutable product attributes, keyed by SKU.
    /// Returns the post-update row.
    #[instrument(skip(self, input), fields(sku = %input.sku))]
    pub async fn update(&self, input: UpdateProductInput) -> Result<product::Model, ServiceError> {
        let db = &*self.db_pool;

        let item = product::Entity::find_by_id(input.sku.clone())
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product '{}' not found", input.sku)))?;

        let mut item: product::ActiveModel = item.into();
        item.name = Set(input.name);
        item.price = Set(input.price);
        item.description = Set(input.description);
        item.stock = Set(input.stock);
        item.status = Set(input.status);
        item.images = Set(input.image);
        item.ingredients = Set(input.ingredients);
        item.nutrition_info = Set(input.nutrition_info);

        let updated = item.update(db).await?;

        self.event_sender
            .send(Event::ProductUpdated(updated.id.clone()))
            .await
            .map_err(ServiceError::EventError)?;

        info!(sku = %updated.id, "product updated");

        Ok(updated)
    }
}

/// Coalesces flat join rows into per-category groups by name equality,
/// preserving first-seen category order and row order within a group.
fn group_by_category(rows: Vec<GroupedRow>) -> Vec<CategoryGroup> {
    let mut groups: Vec<CategoryGroup> = Vec::new();

    for row in rows {
        let item = GroupedItem {
            id: row.id,
            name: row.name,
            image: row.images,
            price: row.price,
        };

        match groups
            .iter_mut()
            .find(|group| group.category == row.category_name)
        {
            Some(group) => group.items.push(item),
            None => groups.push(CategoryGroup {
                category: row.category_name,
                slug: row.category_slug,
                items: vec![item],
            }),
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row(category: &str, slug: &str, sku: &str, name: &str) -> GroupedRow {
        GroupedRow {
            category_name: category.to_string(),
            category_slug: slug.to_string(),
            id: sku.to_string(),
            name: name.to_string(),
            images: None,
            price: dec!(3.50),
        }
    }

    #[test]
    fn grouping_coalesces_non_adjacent_rows() {
        // Same category appearing on both sides of another must still form
        // a single group.
        let rows = vec![
            row("Bread", "bread", "B-1", "Baguette"),
            row("Cake", "cake", "C-1", "Carrot Cake"),
            row("Bread", "bread", "B-2", "Sourdough"),
        ];

        let groups = group_by_category(rows);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].category, "Bread");
        assert_eq!(groups[0].items.len(), 2);
        assert_eq!(groups[1].category, "Cake");
        assert_eq!(groups[1].items.len(), 1);
    }

    #[test]
    fn grouping_preserves_row_order_within_group() {
        let rows = vec![
            row("Bread", "bread", "B-1", "Baguette"),
            row("Bread", "bread", "B-2", "Sourdough"),
        ];

        let groups = group_by_category(rows);

        assert_eq!(groups[0].items[0].name, "Baguette");
        assert_eq!(groups[0].items[1].name, "Sourdough");
    }

    #[test]
    fn grouping_of_empty_input_is_empty() {
        assert!(group_by_category(Vec::new()).is_empty());
    }
}
