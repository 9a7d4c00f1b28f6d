use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{http::header, test, web, App};
use dotenv::dotenv;
use serde_json::json;
use sqlx::PgPool;
use taskdeck::auth::AuthMiddleware;
use taskdeck::config::Config;
use taskdeck::db;
use taskdeck::models::Task;
use taskdeck::routes::{self, health};
use uuid::Uuid;

const TEST_JWT_SECRET: &str = "taskdeck-test-secret";

fn test_config() -> Config {
    Config {
        database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests"),
        jwt_secret: TEST_JWT_SECRET.to_string(),
        server_port: 8080,
        server_host: "127.0.0.1".to_string(),
    }
}

async fn test_pool() -> PgPool {
    dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test DB");
    db::init_schema(&pool)
        .await
        .expect("Failed to initialize schema");
    pool
}

async fn cleanup_user(pool: &PgPool, username: &str) {
    let _ = sqlx::query("DELETE FROM users WHERE username = $1")
        .bind(username)
        .execute(pool)
        .await;
}

macro_rules! test_app {
    ($pool:expr, $config:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($pool.clone()))
                .app_data(web::Data::new($config))
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header()
                        .max_age(3600),
                )
                .wrap(Logger::default())
                .service(health::health)
                .service(
                    web::scope("/api")
                        .wrap(AuthMiddleware::new(TEST_JWT_SECRET))
                        .configure(routes::config),
                ),
        )
        .await
    };
}

async fn register_and_login(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    username: &str,
    password: &str,
) -> String {
    let req_register = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&json!({ "username": username, "password": password }))
        .to_request();
    let resp_register = test::call_service(app, req_register).await;
    assert!(
        resp_register.status().is_success(),
        "Failed to register {}",
        username
    );

    let req_login = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(&json!({ "username": username, "password": password }))
        .to_request();
    let resp_login = test::call_service(app, req_login).await;
    assert!(
        resp_login.status().is_success(),
        "Failed to login {}",
        username
    );
    let token_response: taskdeck::auth::TokenResponse = test::read_body_json(resp_login).await;
    token_response.token
}

async fn create_task(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    token: &str,
    title: &str,
) -> Task {
    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .append_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .set_json(&json!({ "title": title }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(
        resp.status(),
        actix_web::http::StatusCode::CREATED,
        "Failed to create task {}",
        title
    );
    test::read_body_json(resp).await
}

async fn list_tasks(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    token: &str,
) -> Vec<Task> {
    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .append_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    test::read_body_json(resp).await
}

async fn reorder(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    token: &str,
    task_ids: &[Uuid],
) -> actix_web::http::StatusCode {
    let req = test::TestRequest::post()
        .uri("/api/tasks/reorder")
        .append_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .set_json(&json!({ "taskIds": task_ids }))
        .to_request();
    let resp = test::call_service(app, req).await;
    resp.status()
}

#[actix_rt::test]
async fn test_reorder_end_to_end() {
    let pool = test_pool().await;
    let app = test_app!(pool, test_config());

    let username = "reorder_user";
    cleanup_user(&pool, username).await;
    let token = register_and_login(&app, username, "PasswordReorder123!").await;

    let t1 = create_task(&app, &token, "T1").await;
    let t2 = create_task(&app, &token, "T2").await;
    let t3 = create_task(&app, &token, "T3").await;
    assert_eq!((t1.position, t2.position, t3.position), (0, 1, 2));

    let status = reorder(&app, &token, &[t3.id, t1.id, t2.id]).await;
    assert_eq!(status, actix_web::http::StatusCode::OK);

    let tasks = list_tasks(&app, &token).await;
    let titles: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
    let positions: Vec<i32> = tasks.iter().map(|t| t.position).collect();
    assert_eq!(titles, vec!["T3", "T1", "T2"]);
    assert_eq!(positions, vec![0, 1, 2]);

    cleanup_user(&pool, username).await;
}

#[actix_rt::test]
async fn test_reorder_is_idempotent() {
    let pool = test_pool().await;
    let app = test_app!(pool, test_config());

    let username = "reorder_twice_user";
    cleanup_user(&pool, username).await;
    let token = register_and_login(&app, username, "PasswordTwice123!").await;

    let t1 = create_task(&app, &token, "T1").await;
    let t2 = create_task(&app, &token, "T2").await;
    let t3 = create_task(&app, &token, "T3").await;

    let order = [t2.id, t3.id, t1.id];
    assert_eq!(
        reorder(&app, &token, &order).await,
        actix_web::http::StatusCode::OK
    );
    let after_first: Vec<(Uuid, i32)> = list_tasks(&app, &token)
        .await
        .iter()
        .map(|t| (t.id, t.position))
        .collect();

    assert_eq!(
        reorder(&app, &token, &order).await,
        actix_web::http::StatusCode::OK
    );
    let after_second: Vec<(Uuid, i32)> = list_tasks(&app, &token)
        .await
        .iter()
        .map(|t| (t.id, t.position))
        .collect();

    assert_eq!(after_first, after_second);

    cleanup_user(&pool, username).await;
}

#[actix_rt::test]
async fn test_reorder_rolls_back_when_a_task_is_not_owned() {
    let pool = test_pool().await;
    let app = test_app!(pool, test_config());

    let user_a = "reorder_owner_a";
    let user_b = "reorder_other_b";
    cleanup_user(&pool, user_a).await;
    cleanup_user(&pool, user_b).await;

    let token_a = register_and_login(&app, user_a, "PasswordRoA123!").await;
    let token_b = register_and_login(&app, user_b, "PasswordRoB123!").await;

    let _a1 = create_task(&app, &token_a, "A1").await;
    let a2 = create_task(&app, &token_a, "A2").await;
    let b1 = create_task(&app, &token_b, "B1").await;

    let before: Vec<(Uuid, i32)> = list_tasks(&app, &token_a)
        .await
        .iter()
        .map(|t| (t.id, t.position))
        .collect();

    // Same length as A's task set, but one id belongs to B: the whole batch
    // must roll back.
    let status = reorder(&app, &token_a, &[a2.id, b1.id]).await;
    assert_eq!(status, actix_web::http::StatusCode::NOT_FOUND);

    let after: Vec<(Uuid, i32)> = list_tasks(&app, &token_a)
        .await
        .iter()
        .map(|t| (t.id, t.position))
        .collect();
    assert_eq!(before, after, "No position may change on a failed reorder");

    // B's task is untouched as well
    let b_tasks = list_tasks(&app, &token_b).await;
    assert_eq!(b_tasks.len(), 1);
    assert_eq!(b_tasks[0].id, b1.id);
    assert_eq!(b_tasks[0].position, b1.position);

    cleanup_user(&pool, user_a).await;
    cleanup_user(&pool, user_b).await;
}

#[actix_rt::test]
async fn test_reorder_rejects_incomplete_list() {
    let pool = test_pool().await;
    let app = test_app!(pool, test_config());

    let username = "reorder_subset_user";
    cleanup_user(&pool, username).await;
    let token = register_and_login(&app, username, "PasswordSubset123!").await;

    let t1 = create_task(&app, &token, "T1").await;
    let t2 = create_task(&app, &token, "T2").await;
    let _t3 = create_task(&app, &token, "T3").await;

    let status = reorder(&app, &token, &[t2.id, t1.id]).await;
    assert_eq!(status, actix_web::http::StatusCode::BAD_REQUEST);

    let positions: Vec<i32> = list_tasks(&app, &token)
        .await
        .iter()
        .map(|t| t.position)
        .collect();
    assert_eq!(positions, vec![0, 1, 2]);

    cleanup_user(&pool, username).await;
}

#[actix_rt::test]
async fn test_reorder_rejects_duplicate_ids() {
    let pool = test_pool().await;
    let app = test_app!(pool, test_config());

    let username = "reorder_dup_user";
    cleanup_user(&pool, username).await;
    let token = register_and_login(&app, username, "PasswordDup123!").await;

    let t1 = create_task(&app, &token, "T1").await;
    let _t2 = create_task(&app, &token, "T2").await;

    let status = reorder(&app, &token, &[t1.id, t1.id]).await;
    assert_eq!(status, actix_web::http::StatusCode::BAD_REQUEST);

    let positions: Vec<i32> = list_tasks(&app, &token)
        .await
        .iter()
        .map(|t| t.position)
        .collect();
    assert_eq!(positions, vec![0, 1]);

    cleanup_user(&pool, username).await;
}
