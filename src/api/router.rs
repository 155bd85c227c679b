//! HTTP router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! The page and health check sit at the root; form endpoints under `/api/`.
//!
//! Layers (outermost → innermost): Cache-Control → body limit → handler.

use axum::extract::DefaultBodyLimit;
use axum::http::header::CACHE_CONTROL;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::types::AppState;
use crate::config::ServerConfig;

/// Build the application router from a server configuration.
pub fn app_router(config: ServerConfig) -> Router {
    build_router(AppState::new(config))
}

fn build_router(state: AppState) -> Router {
    let body_limit = state.config.body_limit();

    let api = Router::new()
        .route("/registration", get(endpoints::registration::check))
        .route("/preview", post(endpoints::preview::render))
        .route("/report", post(endpoints::report::download));

    Router::new()
        .route("/", get(endpoints::page::index))
        .route("/health", get(endpoints::health::check))
        .nest("/api", api)
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use image::{Rgb, RgbImage};
    use tower::ServiceExt;

    use crate::upload::encode_png;

    const BOUNDARY: &str = "pixelcalc-test-boundary";

    enum Part<'a> {
        Text(&'a str, &'a str),
        File(&'a str, Vec<u8>),
    }

    fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n")
                            .as_bytes(),
                    );
                    body.extend_from_slice(value.as_bytes());
                }
                Part::File(name, bytes) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{name}.png\"\r\n\
                             Content-Type: image/png\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(bytes);
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn post_form(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn red_png() -> Vec<u8> {
        encode_png(&RgbImage::from_pixel(10, 10, Rgb([255, 0, 0]))).unwrap()
    }

    async fn send(request: Request<Body>) -> Response {
        app_router(ServerConfig::default())
            .oneshot(request)
            .await
            .unwrap()
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        to_bytes(response.into_body(), 64 * 1024 * 1024)
            .await
            .unwrap()
            .to_vec()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let response = send(get_request("/health")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CACHE_CONTROL], "no-store");
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], crate::config::APP_VERSION);
    }

    #[tokio::test]
    async fn index_serves_html() {
        let response = send(get_request("/")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[CONTENT_TYPE].to_str().unwrap().to_string();
        assert!(content_type.starts_with("text/html"));
        let html = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(html.contains("Registration Number"));
    }

    #[tokio::test]
    async fn registration_check_reports_validity() {
        let json = body_json(send(get_request("/api/registration?value=2023-AG-0001")).await).await;
        assert_eq!(json["valid"], true);

        let json = body_json(send(get_request("/api/registration?value=abcd-AG-1234")).await).await;
        assert_eq!(json["valid"], false);
        assert_eq!(
            json["message"],
            crate::registration::INVALID_REGISTRATION_MESSAGE
        );
    }

    #[tokio::test]
    async fn report_single_addition_has_two_pages_and_download_headers() {
        let response = send(post_form(
            "/api/report",
            &[
                Part::Text("name", "Ayesha Khan"),
                Part::Text("registration", "2023-AG-0001"),
                Part::File("image", red_png()),
                Part::Text("operation", "Addition"),
                Part::Text("value", "10"),
            ],
        ))
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[CONTENT_DISPOSITION],
            "attachment; filename=\"2023-AG-0001_image_processing.pdf\""
        );
        assert_eq!(response.headers()[CACHE_CONTROL], "no-store");

        let bytes = body_bytes(response).await;
        assert!(bytes.starts_with(b"%PDF"));
        let doc = lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[tokio::test]
    async fn report_rejects_invalid_registration() {
        let response = send(post_form(
            "/api/report",
            &[
                Part::Text("name", "Ayesha Khan"),
                Part::Text("registration", "2023-ag-1"),
                Part::File("image", red_png()),
                Part::Text("operation", "Addition"),
            ],
        ))
        .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "INVALID_REGISTRATION");
    }

    #[tokio::test]
    async fn report_rejects_empty_selection() {
        let response = send(post_form(
            "/api/report",
            &[
                Part::Text("name", "Ayesha Khan"),
                Part::Text("registration", "2023-AG-0001"),
                Part::File("image", red_png()),
            ],
        ))
        .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "NO_OPERATION");
        assert_eq!(
            json["error"]["message"],
            "Please select at least one operation"
        );
    }

    #[tokio::test]
    async fn report_requires_image() {
        let response = send(post_form(
            "/api/report",
            &[
                Part::Text("name", "Ayesha Khan"),
                Part::Text("registration", "2023-AG-0001"),
                Part::Text("select_all", "on"),
            ],
        ))
        .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "MISSING_IMAGE");
    }

    #[tokio::test]
    async fn preview_returns_results_in_checklist_order() {
        let response = send(post_form(
            "/api/preview",
            &[
                Part::Text("name", "Ayesha Khan"),
                Part::Text("registration", "2023-AG-0001"),
                Part::File("image", red_png()),
                Part::Text("operation", "Division"),
                Part::Text("operation", "Addition"),
                Part::Text("value", "10"),
            ],
        ))
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["mode"], "single");
        let results = json["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["operation"], "Addition");
        assert_eq!(results[1]["operation"], "Division");
        assert_eq!(results[0]["width"], 10);
        assert!(!results[0]["png_base64"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn preview_pair_mode_uses_weight() {
        let blue = encode_png(&RgbImage::from_pixel(4, 4, Rgb([0, 0, 255]))).unwrap();
        let response = send(post_form(
            "/api/preview",
            &[
                Part::Text("name", "Bilal"),
                Part::Text("registration", "2021-AG-4321"),
                Part::File("image", red_png()),
                Part::File("image2", blue),
                Part::Text("select_all", "true"),
                Part::Text("weight", "0.25"),
            ],
        ))
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["mode"], "pair");
        assert_eq!(json["parameter"]["kind"], "weight");
        let results = json["results"].as_array().unwrap();
        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|r| r["width"] == 10 && r["height"] == 10));
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let response = send(get_request("/api/nope")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
