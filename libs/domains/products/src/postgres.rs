use async_trait::async_trait;
use sea_orm::sea_query::{Expr, ExprTrait, Func, LikeExpr};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Select,
};

use crate::{
    entity::{favorite, product, product_image},
    error::ProductResult,
    models::{Page, PageRequest, Product, ProductImage},
    repository::{FavoriteRepository, ProductImageRepository, ProductRepository},
};

pub struct PgProductRepository {
    db: DatabaseConnection,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn fetch_page(
        &self,
        query: Select<product::Entity>,
        page: PageRequest,
    ) -> ProductResult<Page<Product>> {
        let paginator = query
            .order_by_asc(product::Column::Id)
            .paginate(&self.db, page.size);

        let total = paginator.num_items().await?;
        if page.checked_offset().is_none() {
            return Ok(Page::new(Vec::new(), total, page));
        }
        let models = paginator.fetch_page(page.page).await?;

        Ok(Page::new(
            models.into_iter().map(Into::into).collect(),
            total,
            page,
        ))
    }
}

/// Escape LIKE metacharacters so `term` matches literally under `ESCAPE '\'`
pub(crate) fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub(crate) fn active_products(active: bool) -> Select<product::Entity> {
    product::Entity::find().filter(product::Column::IsActive.eq(active))
}

/// `lower(title) LIKE '%term%' ESCAPE '\'` over products with the given flag
pub(crate) fn title_search(active: bool, title: &str) -> Select<product::Entity> {
    let pattern = format!("%{}%", escape_like(&title.to_lowercase()));

    active_products(active).filter(
        Expr::expr(Func::lower(Expr::col(product::Column::Title)))
            .like(LikeExpr::new(pattern).escape('\\')),
    )
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn list_active(&self, page: PageRequest) -> ProductResult<Page<Product>> {
        self.fetch_page(active_products(true), page).await
    }

    async fn search_by_title(
        &self,
        active: bool,
        title: &str,
        page: PageRequest,
    ) -> ProductResult<Page<Product>> {
        self.fetch_page(title_search(active, title), page).await
    }

    async fn list_all_active(&self) -> ProductResult<Vec<Product>> {
        let models = active_products(true)
            .order_by_asc(product::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_active_by_id(&self, id: i64) -> ProductResult<Option<Product>> {
        let model = product::Entity::find_by_id(id)
            .filter(product::Column::IsActive.eq(true))
            .one(&self.db)
            .await?;

        Ok(model.map(Into::into))
    }
}

pub struct PgProductImageRepository {
    db: DatabaseConnection,
}

impl PgProductImageRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductImageRepository for PgProductImageRepository {
    async fn find_by_product_id(&self, product_id: i64) -> ProductResult<Vec<ProductImage>> {
        let models = product_image::Entity::find()
            .filter(product_image::Column::ProductId.eq(product_id))
            .order_by_asc(product_image::Column::SortOrder)
            .order_by_asc(product_image::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }
}

pub struct PgFavoriteRepository {
    db: DatabaseConnection,
}

impl PgFavoriteRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FavoriteRepository for PgFavoriteRepository {
    async fn count_by_product(&self, product_id: i64) -> ProductResult<u64> {
        let count = favorite::Entity::find()
            .filter(favorite::Column::ProductId.eq(product_id))
            .count(&self.db)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProductError;
    use chrono::{FixedOffset, TimeZone};
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, QueryTrait, RuntimeErr, Value};
    use std::collections::BTreeMap;

    fn model(id: i64, title: &str) -> product::Model {
        let ts = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
            .unwrap();
        product::Model {
            id,
            title: title.to_string(),
            description: "desc".to_string(),
            price: 25.5,
            condition: "good".to_string(),
            brand: Some("Acme".to_string()),
            size: None,
            category_id: Some(3),
            is_active: true,
            created_at: ts,
            updated_at: ts,
        }
    }

    fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("shoes"), "shoes");
    }

    #[test]
    fn test_title_search_sql_is_case_insensitive_and_escaped() {
        let sql = title_search(true, "Shoes")
            .build(DatabaseBackend::Postgres)
            .to_string();

        assert!(sql.contains("LOWER("), "{sql}");
        assert!(sql.contains("LIKE"), "{sql}");
        assert!(sql.contains("ESCAPE"), "{sql}");
        assert!(sql.contains("%shoes%"), "{sql}");
        assert!(sql.contains("\"is_active\" = TRUE"), "{sql}");
    }

    #[tokio::test]
    async fn test_list_active_builds_page_metadata() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![count_row(3)]])
            .append_query_results([vec![model(1, "Red Shoes"), model(2, "Blue Shoes")]])
            .into_connection();
        let repo = PgProductRepository::new(db);

        let page = repo.list_active(PageRequest::new(0, 2)).await.unwrap();

        assert_eq!(page.content.len(), 2);
        assert_eq!(page.content[0].title, "Red Shoes");
        assert_eq!(page.content[0].brand.as_deref(), Some("Acme"));
        assert_eq!(page.total_elements, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.size, 2);
    }

    #[tokio::test]
    async fn test_list_active_far_past_the_end_is_empty() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![count_row(3)]])
            .into_connection();
        let repo = PgProductRepository::new(db);

        let request = PageRequest::new(u64::MAX / 2, 20);
        let page = repo.list_active(request).await.unwrap();

        assert!(page.content.is_empty());
        assert_eq!(page.total_elements, 3);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.current_page, u64::MAX / 2);
    }

    #[tokio::test]
    async fn test_search_far_past_the_end_is_empty() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![count_row(2)]])
            .into_connection();
        let repo = PgProductRepository::new(db);

        let page = repo
            .search_by_title(true, "shoes", PageRequest::new(i64::MAX as u64, 2))
            .await
            .unwrap();

        assert!(page.content.is_empty());
        assert_eq!(page.total_elements, 2);
    }

    #[tokio::test]
    async fn test_find_active_by_id_none() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<product::Model>::new()])
            .into_connection();
        let repo = PgProductRepository::new(db);

        assert!(repo.find_active_by_id(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_connection_failure_is_store_unavailable() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Conn(RuntimeErr::Internal(
                "connection refused".to_string(),
            ))])
            .into_connection();
        let repo = PgProductRepository::new(db);

        let err = repo.list_all_active().await.unwrap_err();
        assert!(matches!(err, ProductError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn test_image_rows_map_to_domain() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![product_image::Model {
                id: 7,
                product_id: 1,
                file_name: "front.jpg".to_string(),
                content_type: "image/jpeg".to_string(),
                sort_order: 0,
            }]])
            .into_connection();
        let repo = PgProductImageRepository::new(db);

        let images = repo.find_by_product_id(1).await.unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].file_name, "front.jpg");
    }

    #[tokio::test]
    async fn test_favorite_count() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![count_row(4)]])
            .into_connection();
        let repo = PgFavoriteRepository::new(db);

        assert_eq!(repo.count_by_product(1).await.unwrap(), 4);
    }
}
