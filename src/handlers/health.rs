use axum::response::Html;
use axum::Json;

pub async fn index() -> Html<&'static str> {
    Html("<h1 style='text-align: center'>METROHYVE API</h1>")
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
