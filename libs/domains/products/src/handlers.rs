use axum::{
    Json, Router,
    body::Bytes,
    extract::{
        DefaultBodyLimit, Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
    routing::{get, post},
};
use axum_helpers::{
    ErrorResponse, IdPath, QueryParams,
    errors::responses::{
        BadRequestPathResponse, BadRequestQueryResponse, InternalServerErrorResponse,
        NotFoundResponse, ServiceUnavailableResponse,
    },
};
use std::sync::Arc;
use tracing::debug;
use utoipa::OpenApi;

use crate::error::{ProductError, ProductResult, UploadErrorBody};
use crate::models::{
    ImageSearchResponse, ImageUpload, Page, ProductImage, ProductListQuery, ProductListView,
};
use crate::repository::{FavoriteRepository, ProductImageRepository, ProductRepository};
use crate::service::ProductService;

pub const TAG: &str = "products";

/// Multipart field carrying the photo
pub const IMAGE_FIELD: &str = "image";

/// Upper bound for an image search request body
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// OpenAPI documentation for the Products API
#[derive(OpenApi)]
#[openapi(
    paths(list_products, get_product, search_by_image),
    components(
        schemas(
            ProductListView,
            ProductImage,
            Page<ProductListView>,
            ImageSearchResponse,
            ImageUpload,
            UploadErrorBody,
            ErrorResponse
        ),
        responses(
            BadRequestQueryResponse,
            BadRequestPathResponse,
            NotFoundResponse,
            ServiceUnavailableResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Product catalog: listing, search and image search")
    )
)]
pub struct ApiDoc;

type SharedService<R, I, F> = Arc<ProductService<R, I, F>>;

/// Create the products router
pub fn router<R, I, F>(service: ProductService<R, I, F>) -> Router
where
    R: ProductRepository + 'static,
    I: ProductImageRepository + 'static,
    F: FavoriteRepository + 'static,
{
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_products::<R, I, F>))
        .route("/{id}", get(get_product::<R, I, F>))
        .route(
            "/search-by-image",
            post(search_by_image::<R, I, F>).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES)),
        )
        .with_state(shared_service)
}

/// List active products
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(ProductListQuery),
    responses(
        (status = 200, description = "Page of active products", body = Page<ProductListView>),
        (status = 400, response = BadRequestQueryResponse),
        (status = 500, response = InternalServerErrorResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn list_products<R, I, F>(
    State(service): State<SharedService<R, I, F>>,
    QueryParams(query): QueryParams<ProductListQuery>,
) -> ProductResult<Json<Page<ProductListView>>>
where
    R: ProductRepository,
    I: ProductImageRepository,
    F: FavoriteRepository,
{
    let mut page = service.list_products(&query).await?;
    let products = std::mem::take(&mut page.content);
    let views = service.to_list_views(products).await?;
    Ok(Json(page.with_content(views)))
}

/// Get an active product by id
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = ProductListView),
        (status = 400, response = BadRequestPathResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<R, I, F>(
    State(service): State<SharedService<R, I, F>>,
    IdPath(id): IdPath,
) -> ProductResult<Json<ProductListView>>
where
    R: ProductRepository,
    I: ProductImageRepository,
    F: FavoriteRepository,
{
    let product = service.get_product(id).await?;
    Ok(Json(product))
}

/// Find products that look like the uploaded photo
#[utoipa::path(
    post,
    path = "/search-by-image",
    tag = TAG,
    request_body(content = ImageUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Matching products", body = ImageSearchResponse),
        (status = 400, description = "No image received", body = UploadErrorBody,
            example = json!({"error": "Aucune image reçue"})),
        (status = 413, description = "Image larger than 10 MiB", body = ErrorResponse),
        (status = 500, response = InternalServerErrorResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn search_by_image<R, I, F>(
    State(service): State<SharedService<R, I, F>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ProductResult<Json<ImageSearchResponse>>
where
    R: ProductRepository,
    I: ProductImageRepository,
    F: FavoriteRepository,
{
    let image = read_image(multipart).await?;

    let products = service.find_products_by_image(&image).await?;
    let products = service.to_list_views(products).await?;

    Ok(Json(ImageSearchResponse { products }))
}

/// The bytes of the first `image` field. Anything unreadable, absent or
/// empty is [`ProductError::MissingImage`]; a body over
/// [`MAX_IMAGE_BYTES`] is [`ProductError::ImageTooLarge`].
async fn read_image(multipart: Result<Multipart, MultipartRejection>) -> ProductResult<Bytes> {
    let mut multipart = multipart.map_err(|e| {
        debug!(error = %e, "Image search body is not multipart");
        ProductError::MissingImage
    })?;

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some(IMAGE_FIELD) => {
                let bytes = field.bytes().await.map_err(upload_error)?;

                if bytes.is_empty() {
                    return Err(ProductError::MissingImage);
                }
                return Ok(bytes);
            }
            Ok(Some(_)) => continue,
            Ok(None) => return Err(ProductError::MissingImage),
            Err(e) => return Err(upload_error(e)),
        }
    }
}

fn upload_error(err: MultipartError) -> ProductError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        debug!(error = %err, "Image search body over the size limit");
        return ProductError::ImageTooLarge {
            limit: MAX_IMAGE_BYTES,
        };
    }

    debug!(error = %err, "Failed to read image search body");
    ProductError::MissingImage
}
