use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::error::{ProductError, ProductResult};
use crate::models::{Page, Product, ProductListQuery, ProductListView};
use crate::repository::{FavoriteRepository, ProductImageRepository, ProductRepository};

/// Catalog read logic over the product, image and favorite stores
pub struct ProductService<R, I, F>
where
    R: ProductRepository,
    I: ProductImageRepository,
    F: FavoriteRepository,
{
    products: Arc<R>,
    images: Arc<I>,
    favorites: Arc<F>,
}

impl<R, I, F> Clone for ProductService<R, I, F>
where
    R: ProductRepository,
    I: ProductImageRepository,
    F: FavoriteRepository,
{
    fn clone(&self) -> Self {
        Self {
            products: Arc::clone(&self.products),
            images: Arc::clone(&self.images),
            favorites: Arc::clone(&self.favorites),
        }
    }
}

impl<R, I, F> ProductService<R, I, F>
where
    R: ProductRepository,
    I: ProductImageRepository,
    F: FavoriteRepository,
{
    pub fn new(products: R, images: I, favorites: F) -> Self {
        Self {
            products: Arc::new(products),
            images: Arc::new(images),
            favorites: Arc::new(favorites),
        }
    }

    /// List active products, optionally narrowed by a title search.
    ///
    /// Category, price, condition, brand and size filters, and the sort, are
    /// accepted but not applied.
    #[instrument(skip(self, query), fields(search = ?query.search, page = ?query.page))]
    pub async fn list_products(&self, query: &ProductListQuery) -> ProductResult<Page<Product>> {
        let page = query.page_request();

        if query.has_unapplied_filters() {
            debug!(
                category_id = ?query.category_id,
                min_price = ?query.min_price,
                max_price = ?query.max_price,
                condition = ?query.condition,
                brand = ?query.brand,
                size = ?query.clothing_size(),
                sort_by = ?query.sort_by,
                sort_order = ?query.sort_order,
                "Ignoring listing filters and sort"
            );
        }

        match query.search_term() {
            Some(term) => {
                info!(term, "Searching products by title");
                self.products.search_by_title(true, term, page).await
            }
            None => self.products.list_active(page).await,
        }
    }

    /// Products matching an uploaded photo.
    ///
    /// The image is not analysed yet: every active product is returned.
    #[instrument(skip(self, image), fields(image_bytes = image.len()))]
    pub async fn find_products_by_image(&self, image: &[u8]) -> ProductResult<Vec<Product>> {
        let products = self.products.list_all_active().await?;
        info!(count = products.len(), "Image search returned active products");
        Ok(products)
    }

    /// Attach images and the favorite count to a product
    #[instrument(skip(self, product), fields(product_id = product.id))]
    pub async fn to_list_view(&self, product: Product) -> ProductResult<ProductListView> {
        let images = self.images.find_by_product_id(product.id).await?;
        let favorite_count = self.favorites.count_by_product(product.id).await?;
        Ok(ProductListView::new(product, images, favorite_count))
    }

    /// [`to_list_view`](Self::to_list_view) for each product, in order
    pub async fn to_list_views(&self, products: Vec<Product>) -> ProductResult<Vec<ProductListView>> {
        let mut views = Vec::with_capacity(products.len());
        for product in products {
            views.push(self.to_list_view(product).await?);
        }
        Ok(views)
    }

    /// A single active product with its images and favorite count
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: i64) -> ProductResult<ProductListView> {
        let product = self
            .products
            .find_active_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))?;

        self.to_list_view(product).await
    }
}
