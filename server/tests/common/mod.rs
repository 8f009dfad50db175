use actix_http::Request;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App};
use agenthub_server::auth::{generate_token, Claims};
use agenthub_server::config::{AppConfig, AuthConfig, DatabaseConfig, ServerConfig};
use agenthub_server::database::{Database, DEFAULT_CATEGORIES};
use agenthub_server::handlers::AppState;
use agenthub_server::routes::configure_routes;
use std::sync::Arc;
use std::time::SystemTime;
use tempfile::NamedTempFile;

/// Stands in for the shared secret the identity provider signs with.
pub const JWT_SECRET: &str = "integration-test-secret";

pub struct TestApp<S> {
    pub db: Arc<Database>,
    pub app: S,
    _db_file: NamedTempFile,
}

pub async fn setup_test_app() -> anyhow::Result<
    TestApp<impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>>,
> {
    let db_file = NamedTempFile::new()?;
    let db = Arc::new(Database::new(&db_file.path().to_path_buf())?);
    db.seed_categories(DEFAULT_CATEGORIES)?;

    let config = AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseConfig {
            path: db_file.path().to_path_buf(),
        },
        auth: Some(AuthConfig {
            jwt_secret: Some(JWT_SECRET.to_string()),
        }),
    };

    let app_state = web::Data::new(AppState {
        database: Arc::clone(&db),
        start_time: SystemTime::now(),
        config: Arc::new(config),
    });

    let app =
        test::init_service(App::new().app_data(app_state).configure(configure_routes)).await;

    Ok(TestApp {
        db,
        app,
        _db_file: db_file,
    })
}

/// Mints an Authorization header value for a fabricated identity, the way
/// the external identity provider would.
pub fn bearer(caller_id: &str, display_name: &str) -> String {
    let claims = Claims::new(caller_id, display_name);
    let token = generate_token(&claims, JWT_SECRET).expect("failed to mint test token");
    format!("Bearer {}", token)
}

/// Request body passing every boundary validation.
pub fn valid_agent_body(name: &str, category_id: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "description": "a helpful persona",
        "instructions": "i".repeat(200),
        "seed": "s".repeat(200),
        "avatar_ref": "avatars/test.png",
        "category_id": category_id,
    })
}

/// Creates an agent through the API and returns its id.
pub async fn create_agent_via_api<S>(
    app: &S,
    auth_header: &str,
    name: &str,
    category_id: &str,
) -> anyhow::Result<String>
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::post()
        .uri("/api/agents")
        .insert_header(("Authorization", auth_header))
        .set_json(valid_agent_body(name, category_id))
        .to_request();

    let resp = test::call_service(app, req).await;
    anyhow::ensure!(
        resp.status().is_success(),
        "agent creation failed with {}",
        resp.status()
    );

    let body: serde_json::Value = serde_json::from_slice(&test::read_body(resp).await)?;
    Ok(body["agent"]["id"]
        .as_str()
        .expect("agent id missing from response")
        .to_string())
}

/// Fetches the seeded categories and returns the id of the named one.
pub async fn category_id_by_name<S>(app: &S, name: &str) -> anyhow::Result<String>
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::get()
        .uri("/api/categories")
        .to_request();
    let resp = test::call_service(app, req).await;
    anyhow::ensure!(resp.status().is_success());

    let body: serde_json::Value = serde_json::from_slice(&test::read_body(resp).await)?;
    let id = body["categories"]
        .as_array()
        .expect("categories array")
        .iter()
        .find(|c| c["name"] == name)
        .and_then(|c| c["id"].as_str())
        .unwrap_or_else(|| panic!("category {} not seeded", name))
        .to_string();

    Ok(id)
}
