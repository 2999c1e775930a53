use axum::{
    Json, Router,
    http::StatusCode,
    routing::get,
};

use std::sync::Arc;

use crate::{Error, goods, hunters, merchants, transactions};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Any route outside the four resource families answers 501, matching the
/// catch-all the service always had.
async fn not_implemented() -> (StatusCode, Json<Error>) {
    (
        StatusCode::NOT_IMPLEMENTED,
        Json(Error {
            error: "Not Implemented".to_string(),
        }),
    )
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/goods", get(goods::list).post(goods::create))
        .route(
            "/goods/{id}",
            get(goods::get)
                .patch(goods::update)
                .delete(goods::remove),
        )
        .route("/hunters", get(hunters::list).post(hunters::create))
        .route(
            "/hunters/{id}",
            get(hunters::get)
                .patch(hunters::update)
                .delete(hunters::remove),
        )
        .route("/merchants", get(merchants::list).post(merchants::create))
        .route(
            "/merchants/{id}",
            get(merchants::get)
                .patch(merchants::update)
                .delete(merchants::remove),
        )
        .route(
            "/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route(
            "/transactions/{id}",
            get(transactions::get)
                .patch(transactions::update)
                .delete(transactions::remove),
        )
        .fallback(not_implemented)
        .with_state(state)
}

pub async fn run(engine: Engine) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::{Request, header};
    use http_body_util::BodyExt;
    use migration::MigratorTrait;
    use sea_orm::Database;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn test_router() -> Router {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let engine = Engine::builder().database(db).build();
        router(ServerState {
            engine: Arc::new(engine),
        })
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn unknown_route_answers_501() {
        let app = test_router().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/no/such/route")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Not Implemented");
    }

    #[tokio::test]
    async fn good_create_and_get_round_trip() {
        let app = test_router().await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/goods",
                json!({
                    "name": "Silver Sword",
                    "description": "A fine blade of meteorite silver",
                    "material": "silver",
                    "weight": 3.5,
                    "stock": 10,
                    "value": 500,
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/goods/{}", created["id"].as_str().unwrap()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let fetched = body_json(response).await;
        assert_eq!(fetched["name"], "Silver Sword");
        assert_eq!(fetched["stock"], 10);
    }

    #[tokio::test]
    async fn duplicate_good_answers_409() {
        let app = test_router().await;
        let payload = json!({
            "name": "Silver Sword",
            "description": "A fine blade of meteorite silver",
            "material": "silver",
            "weight": 3.5,
            "stock": 10,
            "value": 500,
        });

        let response = app
            .clone()
            .oneshot(json_request("POST", "/goods", payload.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(json_request("POST", "/goods", payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn unknown_good_answers_404() {
        let app = test_router().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/goods/{}", uuid::Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn sell_transaction_creates_good_and_answers_201() {
        let app = test_router().await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/transactions",
                json!({
                    "goods": [{"name": "Mahakaman Ale", "amount": 5}],
                    "involved_name": "Hattori",
                    "involved_type": "merchant",
                    "direction": "sell",
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let tx = body_json(response).await;
        assert_eq!(tx["total_value"], 500);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/goods?name=Mahakaman%20Ale")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let goods = body_json(response).await;
        assert_eq!(goods[0]["stock"], 5);
    }

    #[tokio::test]
    async fn role_direction_mismatch_answers_422() {
        let app = test_router().await;

        let response = app
            .oneshot(json_request(
                "POST",
                "/transactions",
                json!({
                    "goods": [{"name": "Mahakaman Ale", "amount": 5}],
                    "involved_name": "Geralt",
                    "involved_type": "hunter",
                    "direction": "sell",
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn buy_with_no_processable_goods_answers_404() {
        let app = test_router().await;

        let response = app
            .oneshot(json_request(
                "POST",
                "/transactions",
                json!({
                    "goods": [{"name": "Ghost Oil", "amount": 1}],
                    "involved_name": "Geralt",
                    "involved_type": "hunter",
                    "direction": "buy",
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
