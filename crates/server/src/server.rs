use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, patch, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use std::sync::Arc;

use crate::{
    catalog, clients, events, invoices, permissions, quotes, recipes, revenue, staff, user,
};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

async fn auth(
    auth_header: TypedHeader<Authorization<Basic>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user: Option<user::Model> = user::Entity::find()
        .filter(user::Column::Username.eq(auth_header.username()))
        .filter(user::Column::Password.eq(auth_header.password()))
        .filter(user::Column::Archived.eq(false))
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let Some(user) = user else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/quote", post(quotes::price))
        .route("/clients", post(clients::create).get(clients::list))
        .route(
            "/clients/{id}",
            patch(clients::update).delete(clients::archive),
        )
        .route(
            "/packages",
            post(catalog::package_create).get(catalog::package_list),
        )
        .route(
            "/packages/{id}",
            patch(catalog::package_update).delete(catalog::package_archive),
        )
        .route(
            "/upcharges",
            post(catalog::upcharge_create).get(catalog::upcharge_list),
        )
        .route(
            "/upcharges/{id}",
            patch(catalog::upcharge_update).delete(catalog::upcharge_archive),
        )
        .route(
            "/ingredients",
            post(recipes::ingredient_create).get(recipes::ingredient_list),
        )
        .route(
            "/ingredients/{id}",
            patch(recipes::ingredient_update_cost).delete(recipes::ingredient_archive),
        )
        .route(
            "/ingredients/{id}/stock",
            post(recipes::ingredient_adjust_stock),
        )
        .route("/recipes", post(recipes::create).get(recipes::list))
        .route(
            "/recipes/{id}",
            get(recipes::get_detail)
                .patch(recipes::set_items)
                .delete(recipes::archive),
        )
        .route("/recipes/{id}/cost", get(recipes::cost))
        .route("/events", post(events::book).get(events::list))
        .route("/events/{id}", get(events::get_detail).patch(events::update))
        .route("/events/{id}/status", post(events::set_status))
        .route("/events/{id}/cancel", post(events::cancel))
        .route("/revenue", post(revenue::record).get(revenue::list))
        .route("/revenue/{id}", delete(revenue::delete_record))
        .route("/reports/revenue", get(revenue::report))
        .route("/reports/revenue.csv", get(revenue::report_csv))
        .route("/invoices", post(invoices::issue).get(invoices::list))
        .route("/invoices/{id}", get(invoices::get_detail))
        .route("/invoices/{id}/pay", post(invoices::pay))
        .route("/invoices/{id}/void", post(invoices::void_invoice))
        .route("/permissions/audit", get(permissions::audit))
        .route(
            "/permissions/{role}",
            get(permissions::get_role).put(permissions::set_role),
        )
        .route("/staff", post(staff::create).get(staff::list))
        .route("/staff/{username}", delete(staff::archive))
        .route("/staff/{username}/role", post(staff::set_role))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run(engine: Engine, db: DatabaseConnection) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, db, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        db,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, db, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use base64::Engine as _;
    use http_body_util::BodyExt;
    use migration::MigratorTrait;
    use sea_orm::{ActiveValue, Database, EntityTrait};
    use tower::ServiceExt;

    use super::*;

    async fn state_with_admin() -> ServerState {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();

        let admin = user::ActiveModel {
            username: ActiveValue::Set("alice".to_string()),
            password: ActiveValue::Set("password".to_string()),
            role: ActiveValue::Set("admin".to_string()),
            archived: ActiveValue::Set(false),
        };
        user::Entity::insert(admin).exec(&db).await.unwrap();

        let engine = Engine::builder().database(db.clone()).build().await.unwrap();
        ServerState {
            engine: Arc::new(engine),
            db,
        }
    }

    fn basic_auth(username: &str, password: &str) -> String {
        let token =
            base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
        format!("Basic {token}")
    }

    fn json_request(method: &str, uri: &str, auth: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, auth)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn wrong_credentials_rejected() {
        let state = state_with_admin().await;
        let app = router(state);

        let request = Request::builder()
            .uri("/clients")
            .header(header::AUTHORIZATION, basic_auth("alice", "wrong"))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn list_clients_empty_ok() {
        let state = state_with_admin().await;
        let app = router(state);

        let request = Request::builder()
            .uri("/clients")
            .header(header::AUTHORIZATION, basic_auth("alice", "password"))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["clients"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn quote_round_trip() {
        let state = state_with_admin().await;
        let app = router(state);
        let auth = basic_auth("alice", "password");

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/packages",
                &auth,
                serde_json::json!({
                    "name": "Gala",
                    "adult_price_minor": 6000,
                    "child_price_minor": 3000,
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let package: serde_json::Value = serde_json::from_slice(&body).unwrap();

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/upcharges",
                &auth,
                serde_json::json!({ "name": "Seafood", "amount_minor": 700 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let upcharge: serde_json::Value = serde_json::from_slice(&body).unwrap();

        let response = app
            .oneshot(json_request(
                "POST",
                "/quote",
                &auth,
                serde_json::json!({
                    "package_id": package["id"],
                    "adult_count": 10,
                    "child_count": 2,
                    "upcharge_ids": [upcharge["id"]],
                    "gratuity_percent": 20,
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let quote: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(quote["subtotal_minor"], 74400);
        assert_eq!(quote["gratuity_minor"], 14880);
        assert_eq!(quote["total_minor"], 89280);
    }
}
