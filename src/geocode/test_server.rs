//! In-process stand-in for the Nominatim `/reverse` endpoint.

use std::collections::HashMap;
use std::time::Duration;

use axum::{
    extract::Query,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

/// Serve `router` on an ephemeral local port and return its `/reverse` URL
pub async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{}/reverse", addr)
}

/// A fake geocoder whose behaviour is chosen by the integer part of `lat`:
///
/// - `1`: 500 status
/// - `2`: malformed body
/// - `3`: sleeps past any short client timeout
/// - `4`: `{"error": ...}` with no address
/// - `5`: requires a User-Agent, else 403
/// - otherwise: road/suburb derived from the query
pub fn scripted() -> Router {
    Router::new().route("/reverse", get(scripted_reverse))
}

async fn scripted_reverse(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if params.get("format").map(String::as_str) != Some("json")
        || params.get("addressdetails").map(String::as_str) != Some("1")
    {
        return (StatusCode::BAD_REQUEST, "missing format parameters").into_response();
    }

    let lat: f64 = params.get("lat").and_then(|v| v.parse().ok()).unwrap_or(0.0);
    let lon = params.get("lon").cloned().unwrap_or_default();

    match lat.trunc() as i64 {
        1 => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        2 => (StatusCode::OK, "<html>not json</html>").into_response(),
        3 => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            (StatusCode::OK, "{}").into_response()
        }
        4 => axum::Json(serde_json::json!({ "error": "Unable to geocode" })).into_response(),
        5 if !headers.contains_key("user-agent") => {
            (StatusCode::FORBIDDEN, "no user agent").into_response()
        }
        _ => axum::Json(serde_json::json!({
            "address": {
                "road": format!("Rua {}", params.get("lat").cloned().unwrap_or_default()),
                "suburb": format!("Bairro {}", lon),
            }
        }))
        .into_response(),
    }
}
