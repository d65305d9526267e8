use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::ProductResult;
use crate::models::{Page, PageRequest, Product, ProductImage};

/// Read access to products
///
/// Every method only ever returns products in ascending `id` order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Active products, paginated
    async fn list_active(&self, page: PageRequest) -> ProductResult<Page<Product>>;

    /// Products with `is_active == active` whose title contains `title`,
    /// ignoring case. `%`, `_` and `\` in `title` match literally.
    async fn search_by_title(
        &self,
        active: bool,
        title: &str,
        page: PageRequest,
    ) -> ProductResult<Page<Product>>;

    /// Every active product, unpaginated
    async fn list_all_active(&self) -> ProductResult<Vec<Product>>;

    /// The product with this id, if it exists and is active
    async fn find_active_by_id(&self, id: i64) -> ProductResult<Option<Product>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductImageRepository: Send + Sync {
    /// Images of a product ordered by `(sort_order, id)`
    async fn find_by_product_id(&self, product_id: i64) -> ProductResult<Vec<ProductImage>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    /// Number of users who favorited the product
    async fn count_by_product(&self, product_id: i64) -> ProductResult<u64>;
}

/// In-memory implementation of ProductRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<BTreeMap<i64, Product>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a product by id
    pub async fn insert(&self, product: Product) {
        self.products.write().await.insert(product.id, product);
    }

    async fn active_matching<P>(&self, predicate: P) -> Vec<Product>
    where
        P: Fn(&Product) -> bool,
    {
        self.products
            .read()
            .await
            .values()
            .filter(|p| predicate(p))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list_active(&self, page: PageRequest) -> ProductResult<Page<Product>> {
        let products = self.active_matching(|p| p.is_active).await;
        Ok(Page::from_items(products, page))
    }

    async fn search_by_title(
        &self,
        active: bool,
        title: &str,
        page: PageRequest,
    ) -> ProductResult<Page<Product>> {
        let needle = title.to_lowercase();
        let products = self
            .active_matching(|p| p.is_active == active && p.title.to_lowercase().contains(&needle))
            .await;
        Ok(Page::from_items(products, page))
    }

    async fn list_all_active(&self) -> ProductResult<Vec<Product>> {
        Ok(self.active_matching(|p| p.is_active).await)
    }

    async fn find_active_by_id(&self, id: i64) -> ProductResult<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.get(&id).filter(|p| p.is_active).cloned())
    }
}

/// In-memory implementation of ProductImageRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductImageRepository {
    images: Arc<RwLock<Vec<ProductImage>>>,
}

impl InMemoryProductImageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, image: ProductImage) {
        self.images.write().await.push(image);
    }
}

#[async_trait]
impl ProductImageRepository for InMemoryProductImageRepository {
    async fn find_by_product_id(&self, product_id: i64) -> ProductResult<Vec<ProductImage>> {
        let mut images: Vec<ProductImage> = self
            .images
            .read()
            .await
            .iter()
            .filter(|image| image.product_id == product_id)
            .cloned()
            .collect();
        images.sort_by_key(|image| (image.sort_order, image.id));
        Ok(images)
    }
}

/// In-memory implementation of FavoriteRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryFavoriteRepository {
    /// (user_id, product_id)
    favorites: Arc<RwLock<HashSet<(i64, i64)>>>,
}

impl InMemoryFavoriteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a favorite; repeating the same pair has no effect
    pub async fn add(&self, user_id: i64, product_id: i64) {
        self.favorites.write().await.insert((user_id, product_id));
    }
}

#[async_trait]
impl FavoriteRepository for InMemoryFavoriteRepository {
    async fn count_by_product(&self, product_id: i64) -> ProductResult<u64> {
        let favorites = self.favorites.read().await;
        Ok(favorites.iter().filter(|(_, p)| *p == product_id).count() as u64)
    }
}
