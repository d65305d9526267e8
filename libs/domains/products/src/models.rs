use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Page size used when the client sends none, or 0
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Largest page a client can ask for
pub const MAX_PAGE_SIZE: u64 = 2000;

/// A listed item for sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub price: f64,
    /// Free-form condition label, e.g. "very_good"
    pub condition: String,
    pub brand: Option<String>,
    /// Clothing/shoe size label
    pub size: Option<String>,
    pub category_id: Option<i64>,
    /// Inactive products are never returned by the catalog
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Image metadata attached to a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub id: i64,
    pub product_id: i64,
    pub file_name: String,
    pub content_type: String,
    pub sort_order: i32,
}

/// Product as rendered in listings: the product plus its images and
/// favorite count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductListView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub condition: String,
    pub brand: Option<String>,
    pub size: Option<String>,
    pub category_id: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Ordered by `sortOrder`, then id
    pub images: Vec<ProductImage>,
    pub favorite_count: u64,
}

impl ProductListView {
    pub fn new(product: Product, images: Vec<ProductImage>, favorite_count: u64) -> Self {
        Self {
            id: product.id,
            title: product.title,
            description: product.description,
            price: product.price,
            condition: product.condition,
            brand: product.brand,
            size: product.size,
            category_id: product.category_id,
            is_active: product.is_active,
            created_at: product.created_at,
            updated_at: product.updated_at,
            images,
            favorite_count,
        }
    }
}

/// Zero-based page request with a normalized size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub size: u64,
}

impl PageRequest {
    /// `size` of 0 becomes [`DEFAULT_PAGE_SIZE`]; anything above
    /// [`MAX_PAGE_SIZE`] is clamped.
    pub fn new(page: u64, size: u64) -> Self {
        let size = match size {
            0 => DEFAULT_PAGE_SIZE,
            s => s.min(MAX_PAGE_SIZE),
        };
        Self { page, size }
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.size)
    }

    /// Row offset, or `None` when it does not fit a SQL `BIGINT`
    pub fn checked_offset(&self) -> Option<u64> {
        self.page
            .checked_mul(self.size)
            .filter(|offset| i64::try_from(*offset).is_ok())
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE)
    }
}

/// One page of results plus the totals the client needs to paginate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u64,
    /// Zero-based
    pub current_page: u64,
    /// Requested page size, not the length of `content`
    pub size: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, total_elements: u64, request: PageRequest) -> Self {
        Self {
            content,
            total_elements,
            total_pages: total_elements.div_ceil(request.size),
            current_page: request.page,
            size: request.size,
        }
    }

    /// Slice `items` (already filtered and ordered) into the requested page
    pub fn from_items(items: Vec<T>, request: PageRequest) -> Self {
        let total = items.len() as u64;
        let content = items
            .into_iter()
            .skip(usize::try_from(request.offset()).unwrap_or(usize::MAX))
            .take(request.size as usize)
            .collect();
        Self::new(content, total, request)
    }

    /// Same page metadata around different content
    pub fn with_content<U>(self, content: Vec<U>) -> Page<U> {
        Page {
            content,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            current_page: self.current_page,
            size: self.size,
        }
    }
}

/// Query parameters of `GET /products`
///
/// Only `search`, `page` and the page size affect the result today; the
/// remaining filters and the sort are accepted for client compatibility.
///
/// The mobile client sends the page size as `size`, the same key as the
/// clothing-size filter. A numeric `size` is read as the page size; anything
/// else is the (unapplied) clothing filter.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductListQuery {
    pub category_id: Option<i64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub condition: Option<String>,
    pub brand: Option<String>,
    /// Page size when numeric, clothing size filter otherwise
    pub size: Option<String>,
    /// Case-insensitive substring of the title
    pub search: Option<String>,
    /// Zero-based page index (default 0)
    pub page: Option<u64>,
    /// Page size (default 20, max 2000); a numeric `size` wins
    pub page_size: Option<u64>,
    /// `price`, `createdAt` or `favoriteCount`
    pub sort_by: Option<String>,
    /// `asc` or `desc`
    pub sort_order: Option<String>,
}

impl ProductListQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(
            self.page.unwrap_or(0),
            self.numeric_size()
                .or(self.page_size)
                .unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }

    fn numeric_size(&self) -> Option<u64> {
        self.size.as_deref().and_then(|size| size.parse().ok())
    }

    /// The clothing size filter, when `size` is not a page size
    pub fn clothing_size(&self) -> Option<&str> {
        self.size
            .as_deref()
            .filter(|_| self.numeric_size().is_none())
    }

    /// The search term exactly as sent, unless it is empty
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().filter(|term| !term.is_empty())
    }

    /// True when any filter or sort the catalog does not apply yet was sent
    pub fn has_unapplied_filters(&self) -> bool {
        self.category_id.is_some()
            || self.min_price.is_some()
            || self.max_price.is_some()
            || self.condition.is_some()
            || self.brand.is_some()
            || self.clothing_size().is_some()
            || self.sort_by.is_some()
            || self.sort_order.is_some()
    }
}

/// Body of `POST /products/search-by-image`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ImageSearchResponse {
    pub products: Vec<ProductListView>,
}

/// Multipart form of `POST /products/search-by-image`
#[derive(ToSchema)]
pub struct ImageUpload {
    /// The photo to search with
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_normalizes_size() {
        assert_eq!(PageRequest::new(0, 0).size, DEFAULT_PAGE_SIZE);
        assert_eq!(PageRequest::new(0, 5000).size, MAX_PAGE_SIZE);
        assert_eq!(PageRequest::new(3, 10).offset(), 30);
    }

    #[test]
    fn test_page_metadata() {
        let page = Page::new(vec![1, 2], 5, PageRequest::new(1, 2));
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 1);
        assert_eq!(page.size, 2);

        let empty: Page<i32> = Page::new(vec![], 0, PageRequest::default());
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn test_page_from_items_slices() {
        let page = Page::from_items((1..=5).collect(), PageRequest::new(2, 2));
        assert_eq!(page.content, vec![5]);
        assert_eq!(page.total_elements, 5);

        let past_end = Page::from_items((1..=5).collect::<Vec<i32>>(), PageRequest::new(9, 2));
        assert!(past_end.content.is_empty());
        assert_eq!(past_end.total_pages, 3);
    }

    #[test]
    fn test_page_serializes_camel_case() {
        let page = Page::new(vec!["a"], 1, PageRequest::default());
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["totalElements"], 1);
        assert_eq!(json["totalPages"], 1);
        assert_eq!(json["currentPage"], 0);
        assert_eq!(json["size"], 20);
    }

    #[test]
    fn test_search_term_is_kept_verbatim() {
        let query = ProductListQuery {
            search: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(query.search_term(), None);

        let query = ProductListQuery {
            search: Some(" shoes ".to_string()),
            ..Default::default()
        };
        assert_eq!(query.search_term(), Some(" shoes "));

        let query = ProductListQuery {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(query.search_term(), Some("   "));
    }

    #[test]
    fn test_numeric_size_is_the_page_size() {
        let query = ProductListQuery {
            size: Some("1".to_string()),
            page_size: Some(50),
            ..Default::default()
        };
        assert_eq!(query.page_request(), PageRequest::new(0, 1));
        assert_eq!(query.clothing_size(), None);
        assert!(!query.has_unapplied_filters());

        let query = ProductListQuery {
            size: Some("XL".to_string()),
            ..Default::default()
        };
        assert_eq!(query.page_request(), PageRequest::default());
        assert_eq!(query.clothing_size(), Some("XL"));
        assert!(query.has_unapplied_filters());
    }

    #[test]
    fn test_checked_offset_rejects_overflow() {
        assert_eq!(PageRequest::new(3, 10).checked_offset(), Some(30));
        assert_eq!(PageRequest::new(u64::MAX / 2, 20).checked_offset(), None);
        assert_eq!(PageRequest::new(i64::MAX as u64, 2).checked_offset(), None);
    }

    #[test]
    fn test_query_deserializes_client_parameters() {
        let query: ProductListQuery =
            serde_json::from_value(serde_json::json!({
                "categoryId": 4,
                "minPrice": 10.0,
                "size": "M",
                "pageSize": 50,
                "sortBy": "price"
            }))
            .unwrap();

        assert_eq!(query.category_id, Some(4));
        assert_eq!(query.size.as_deref(), Some("M"));
        assert_eq!(query.page_request(), PageRequest::new(0, 50));
        assert!(query.has_unapplied_filters());
    }
}
