//! Handler tests for the Products domain
//!
//! These drive the products router with in-memory repositories:
//! - Query parsing and pagination
//! - Response shape (camelCase, images, favorite counts)
//! - Status codes and error bodies
//! - Multipart handling of the image search

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::Utc;
use domain_products::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use test_utils::TestDataBuilder;
use tower::ServiceExt; // For oneshot()

const BOUNDARY: &str = "catalog-boundary";

fn product(id: i64, title: &str, is_active: bool) -> Product {
    let now = Utc::now();
    Product {
        id,
        title: title.to_string(),
        description: format!("{title} in good shape"),
        price: 10.0 * id as f64,
        condition: "good".to_string(),
        brand: Some("Souk".to_string()),
        size: Some("M".to_string()),
        category_id: Some(1),
        is_active,
        created_at: now,
        updated_at: now,
    }
}

fn image(id: i64, product_id: i64, sort_order: i32) -> ProductImage {
    ProductImage {
        id,
        product_id,
        file_name: format!("{product_id}-{id}.jpg"),
        content_type: "image/jpeg".to_string(),
        sort_order,
    }
}

/// Red Shoes (1), Blue Shoes (2), Hidden Shoes (3, inactive), Green Hat (4).
/// Red Shoes has two images and two favorites.
async fn seeded_app(builder: &TestDataBuilder) -> Router {
    let products = InMemoryProductRepository::new();
    products.insert(product(1, "Red Shoes", true)).await;
    products.insert(product(2, "Blue Shoes", true)).await;
    products.insert(product(3, "Hidden Shoes", false)).await;
    products.insert(product(4, "Green Hat", true)).await;

    let images = InMemoryProductImageRepository::new();
    images.insert(image(11, 1, 1)).await;
    images.insert(image(10, 1, 0)).await;

    let favorites = InMemoryFavoriteRepository::new();
    favorites.add(builder.nth_user_id(1), 1).await;
    favorites.add(builder.nth_user_id(2), 1).await;

    handlers::router(ProductService::new(products, images, favorites))
}

async fn json_body(body: Body) -> Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn image_upload(field: &str, content: &[u8]) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"photo.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/search-by-image")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn ids(body: &Value, key: &str) -> Vec<i64> {
    body[key]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect()
}

// ============================================================================
// GET /
// ============================================================================

#[tokio::test]
async fn test_list_returns_active_products_in_id_order() {
    let builder = TestDataBuilder::from_test_name("list_active");
    let app = seeded_app(&builder).await;

    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response.into_body()).await;
    assert_eq!(ids(&body, "content"), vec![1, 2, 4]);
    assert_eq!(body["totalElements"], 3);
    assert_eq!(body["totalPages"], 1);
    assert_eq!(body["currentPage"], 0);
    assert_eq!(body["size"], 20);
}

#[tokio::test]
async fn test_list_enriches_with_images_and_favorites() {
    let builder = TestDataBuilder::from_test_name("list_enriched");
    let app = seeded_app(&builder).await;

    let body = json_body(app.oneshot(get("/")).await.unwrap().into_body()).await;

    let red = &body["content"][0];
    assert_eq!(red["title"], "Red Shoes");
    assert_eq!(red["favoriteCount"], 2);
    assert_eq!(red["isActive"], true);
    assert_eq!(red["images"][0]["id"], 10);
    assert_eq!(red["images"][1]["id"], 11);

    let blue = &body["content"][1];
    assert_eq!(blue["favoriteCount"], 0);
    assert_eq!(blue["images"], json!([]));
}

#[tokio::test]
async fn test_search_is_case_insensitive_and_skips_inactive() {
    let builder = TestDataBuilder::from_test_name("search_case");

    for term in ["shoes", "SHOES", "sHoEs"] {
        let app = seeded_app(&builder).await;
        let response = app
            .oneshot(get(&format!("/?search={term}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response.into_body()).await;
        assert_eq!(ids(&body, "content"), vec![1, 2], "search term {term:?}");
        assert_eq!(body["totalElements"], 2);
    }
}

#[tokio::test]
async fn test_empty_search_lists_everything() {
    let builder = TestDataBuilder::from_test_name("empty_search");
    let app = seeded_app(&builder).await;

    let body = json_body(app.oneshot(get("/?search=")).await.unwrap().into_body()).await;
    assert_eq!(ids(&body, "content"), vec![1, 2, 4]);
}

#[tokio::test]
async fn test_search_term_is_matched_verbatim() {
    let builder = TestDataBuilder::from_test_name("verbatim_search");

    // Surrounding spaces are part of the term: no title ends in "shoes ".
    let app = seeded_app(&builder).await;
    let body = json_body(
        app.oneshot(get("/?search=%20shoes%20"))
            .await
            .unwrap()
            .into_body(),
    )
    .await;
    assert_eq!(ids(&body, "content"), Vec::<i64>::new());

    let app = seeded_app(&builder).await;
    let body = json_body(app.oneshot(get("/?search=%20shoes")).await.unwrap().into_body()).await;
    assert_eq!(ids(&body, "content"), vec![1, 2]);
}

#[tokio::test]
async fn test_search_without_matches_is_an_empty_page() {
    let builder = TestDataBuilder::from_test_name("search_no_match");
    let app = seeded_app(&builder).await;

    let response = app.oneshot(get("/?search=umbrella")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response.into_body()).await;
    assert_eq!(body["content"], json!([]));
    assert_eq!(body["totalElements"], 0);
    assert_eq!(body["totalPages"], 0);
    assert_eq!(body["currentPage"], 0);
    assert_eq!(body["size"], 20);
}

#[tokio::test]
async fn test_repeated_listing_and_search_are_identical() {
    let builder = TestDataBuilder::from_test_name("repeated_listing");
    let app = seeded_app(&builder).await;

    for uri in ["/?page=0&size=2", "/?search=shoes&size=1&page=1"] {
        let first = json_body(app.clone().oneshot(get(uri)).await.unwrap().into_body()).await;
        let second = json_body(app.clone().oneshot(get(uri)).await.unwrap().into_body()).await;
        assert_eq!(first, second, "{uri}");
    }
}

#[tokio::test]
async fn test_numeric_size_sets_the_page_size() {
    let builder = TestDataBuilder::from_test_name("size_param");
    let app = seeded_app(&builder).await;

    let body = json_body(app.oneshot(get("/?page=0&size=1")).await.unwrap().into_body()).await;

    assert_eq!(ids(&body, "content"), vec![1]);
    assert_eq!(body["size"], 1);
    assert_eq!(body["totalElements"], 3);
    assert_eq!(body["totalPages"], 3);
}

#[tokio::test]
async fn test_huge_page_is_empty() {
    let builder = TestDataBuilder::from_test_name("huge_page");
    let app = seeded_app(&builder).await;

    let response = app
        .oneshot(get("/?page=1000000000000000000"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response.into_body()).await;
    assert_eq!(body["content"], json!([]));
    assert_eq!(body["totalElements"], 3);
}

#[tokio::test]
async fn test_pagination_with_page_size() {
    let builder = TestDataBuilder::from_test_name("pagination");
    let app = seeded_app(&builder).await;

    let body = json_body(
        app.oneshot(get("/?page=1&pageSize=2"))
            .await
            .unwrap()
            .into_body(),
    )
    .await;

    assert_eq!(ids(&body, "content"), vec![4]);
    assert_eq!(body["totalElements"], 3);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["currentPage"], 1);
    assert_eq!(body["size"], 2);
}

#[tokio::test]
async fn test_unapplied_filters_do_not_change_results() {
    let builder = TestDataBuilder::from_test_name("unapplied_filters");
    let app = seeded_app(&builder).await;

    let body = json_body(
        app.oneshot(get(
            "/?categoryId=99&minPrice=500&maxPrice=1&condition=new&brand=None&size=XS&sortBy=price&sortOrder=desc",
        ))
        .await
        .unwrap()
        .into_body(),
    )
    .await;

    assert_eq!(ids(&body, "content"), vec![1, 2, 4]);
}

#[tokio::test]
async fn test_invalid_query_is_rejected() {
    let builder = TestDataBuilder::from_test_name("invalid_query");
    let app = seeded_app(&builder).await;

    let response = app.oneshot(get("/?page=first")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response.into_body()).await;
    assert_eq!(body["error"], "INVALID_QUERY");
}

// ============================================================================
// GET /{id}
// ============================================================================

#[tokio::test]
async fn test_get_product_returns_enriched_view() {
    let builder = TestDataBuilder::from_test_name("get_product");
    let app = seeded_app(&builder).await;

    let response = app.oneshot(get("/1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response.into_body()).await;
    assert_eq!(body["id"], 1);
    assert_eq!(body["favoriteCount"], 2);
    assert_eq!(body["images"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_get_inactive_or_unknown_product_is_404() {
    let builder = TestDataBuilder::from_test_name("get_404");

    for uri in ["/3", "/999"] {
        let app = seeded_app(&builder).await;
        let response = app.oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");

        let body = json_body(response.into_body()).await;
        assert_eq!(body["error"], "NOT_FOUND");
    }
}

#[tokio::test]
async fn test_get_with_non_numeric_id_is_400() {
    let builder = TestDataBuilder::from_test_name("get_400");
    let app = seeded_app(&builder).await;

    let response = app.oneshot(get("/abc")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response.into_body()).await;
    assert_eq!(body["error"], "INVALID_PATH_PARAMETER");
}

// ============================================================================
// POST /search-by-image
// ============================================================================

#[tokio::test]
async fn test_image_search_returns_all_active_products() {
    let builder = TestDataBuilder::from_test_name("image_search");
    let app = seeded_app(&builder).await;

    let response = app
        .oneshot(image_upload("image", b"\xff\xd8\xff\xe0fake-jpeg"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response.into_body()).await;
    assert_eq!(ids(&body, "products"), vec![1, 2, 4]);
    assert_eq!(body["products"][0]["favoriteCount"], 2);
    assert_eq!(body["products"][0]["images"][0]["sortOrder"], 0);
}

#[tokio::test]
async fn test_image_search_ignores_image_content() {
    let builder = TestDataBuilder::from_test_name("image_idempotent");

    let first = json_body(
        seeded_app(&builder)
            .await
            .oneshot(image_upload("image", b"first photo"))
            .await
            .unwrap()
            .into_body(),
    )
    .await;
    let second = json_body(
        seeded_app(&builder)
            .await
            .oneshot(image_upload("image", b"a completely different photo"))
            .await
            .unwrap()
            .into_body(),
    )
    .await;

    assert_eq!(ids(&first, "products"), ids(&second, "products"));
}

#[tokio::test]
async fn test_image_search_without_image_is_400() {
    let builder = TestDataBuilder::from_test_name("image_missing");
    let expected = json!({"error": NO_IMAGE_RECEIVED});

    let empty = seeded_app(&builder)
        .await
        .oneshot(image_upload("image", b""))
        .await
        .unwrap();
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(empty.into_body()).await, expected);

    let wrong_field = seeded_app(&builder)
        .await
        .oneshot(image_upload("file", b"\xff\xd8"))
        .await
        .unwrap();
    assert_eq!(wrong_field.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(wrong_field.into_body()).await, expected);

    let not_multipart = Request::builder()
        .method("POST")
        .uri("/search-by-image")
        .body(Body::empty())
        .unwrap();
    let response = seeded_app(&builder)
        .await
        .oneshot(not_multipart)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response.into_body()).await, expected);
}

#[tokio::test]
async fn test_image_search_rejects_get() {
    let builder = TestDataBuilder::from_test_name("image_get");
    let app = seeded_app(&builder).await;

    let response = app.oneshot(get("/search-by-image")).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
