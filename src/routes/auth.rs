use crate::{
    auth::{
        generate_token, hash_password, verify_password, LoginRequest, MessageResponse,
        RegisterRequest, TokenResponse,
    },
    config::Config,
    error::AppError,
    models::User,
};
use actix_web::{post, web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

/// Register a new user
///
/// Hashes the password and creates the account. The username must not be
/// taken already.
#[post("/register")]
pub async fn register(
    pool: web::Data<PgPool>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    // Validate input
    register_data.validate()?;

    // Check if username already exists
    let existing_user =
        sqlx::query_scalar::<_, i32>("SELECT id FROM users WHERE username = $1")
            .bind(&register_data.username)
            .fetch_optional(&**pool)
            .await?;

    if existing_user.is_some() {
        return Err(AppError::Conflict("Username already taken".into()));
    }

    // Hash password
    let password_hash = hash_password(&register_data.password)?;

    // Insert new user. A concurrent registration of the same username loses
    // the unique-index race and surfaces as Conflict via From<sqlx::Error>.
    sqlx::query("INSERT INTO users (username, password_hash) VALUES ($1, $2)")
        .bind(&register_data.username)
        .bind(&password_hash)
        .execute(&**pool)
        .await?;

    Ok(HttpResponse::Created().json(MessageResponse {
        message: "User created successfully".to_string(),
    }))
}

/// Login user
///
/// Authenticates a user and returns a bearer token. Unknown usernames and
/// wrong passwords produce the same response, so the endpoint cannot be used
/// to probe which usernames exist.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    // Validate input
    login_data.validate()?;

    // Get user from database
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, password_hash, created_at FROM users WHERE username = $1",
    )
    .bind(&login_data.username)
    .fetch_optional(&**pool)
    .await?;

    let user = match user {
        Some(user) => user,
        None => return Err(AppError::Unauthorized("Invalid username or password".into())),
    };

    if !verify_password(&login_data.password, &user.password_hash)? {
        return Err(AppError::Unauthorized("Invalid username or password".into()));
    }

    let token = generate_token(user.id, &config.jwt_secret)?;

    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}
