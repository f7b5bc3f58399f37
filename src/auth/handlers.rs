use crate::{
    auth::{
        auth::AuthUser,
        jwt::{generate_access_token, generate_refresh_token, verify_token},
        password::{hash_password, verify_password},
    },
    config::Config,
    models::{LoginReqDto, RegisterReq, TokenType, UserSql},
};
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error, info, instrument};

use crate::utils::email_cache;
use crate::utils::email_filter;

/// Company login id: "OI" + first two letters of the first and last name
/// + joining year + a 4-digit per-year serial, e.g. OIJODO20250001.
fn login_id_prefix(full_name: &str) -> String {
    let parts: Vec<&str> = full_name.split_whitespace().collect();
    let first = parts.first().copied().unwrap_or("XX");
    let last = if parts.len() > 1 {
        parts[parts.len() - 1]
    } else {
        "XX"
    };

    let mut code = String::from("OI");
    code.extend(first.chars().take(2).flat_map(|c| c.to_uppercase()));
    code.extend(last.chars().take(2).flat_map(|c| c.to_uppercase()));
    code
}

async fn generate_login_id(
    full_name: &str,
    year: i32,
    pool: &MySqlPool,
) -> Result<String, sqlx::Error> {
    let existing: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE YEAR(created_at) = ?")
            .bind(year)
            .fetch_one(pool)
            .await?;

    Ok(format!(
        "{}{}{:04}",
        login_id_prefix(full_name),
        year,
        existing + 1
    ))
}

/// Inserts a new user and keeps the email filter/cache populated
async fn insert_user(req: &RegisterReq, login_id: &str, pool: &MySqlPool) -> Result<(), HttpResponse> {
    let hashed = match hash_password(&req.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "Password hashing failed");
            return Err(HttpResponse::InternalServerError().json(json!({
                "error": "Failed to register user"
            })));
        }
    };

    let result = sqlx::query(
        r#"
        INSERT INTO users (email, password_hash, full_name, phone, role_id, login_id)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(req.email.trim().to_lowercase())
    .bind(hashed)
    .bind(req.full_name.trim())
    .bind(&req.phone)
    .bind(req.role_id)
    .bind(login_id)
    .execute(pool)
    .await;

    match result {
        Ok(_) => {
            // keep the fast-path structures in sync with the insert
            email_filter::insert(&req.email);
            email_cache::mark_taken(&req.email).await;
            Ok(())
        }
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code() == Some("23000".into()) {
                    return Err(HttpResponse::Conflict().json(json!({
                        "error": "Email already registered"
                    })));
                }
            }

            error!(error = %e, "Failed to insert user");
            Err(HttpResponse::InternalServerError().json(json!({
                "error": "Failed to register user"
            })))
        }
    }
}

/// true  => email AVAILABLE
/// false => email TAKEN
pub async fn is_email_available(email: &str, pool: &MySqlPool) -> bool {
    let email = email.to_lowercase();

    // 1. Cuckoo filter - fast negative
    if !email_filter::might_exist(&email) {
        return true;
    }

    // 2. Moka cache - fast positive
    if email_cache::is_taken(&email).await {
        return false;
    }

    // 3. Database fallback
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = ? LIMIT 1)")
            .bind(&email)
            .fetch_one(pool)
            .await
            .unwrap_or(true); // fail-safe

    !exists
}

/// Register a new user account. HR Officers and Admins only; a unique
/// login id is derived from the name and the registration year.
pub async fn register(
    auth: AuthUser,
    user: web::Json<RegisterReq>,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr()?;

    let email = user.email.trim();

    if email.is_empty() || user.password.is_empty() || user.full_name.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "Email, password and full name must not be empty"
        })));
    }

    if crate::model::role::Role::from_id(user.role_id).is_none() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "Invalid role"
        })));
    }

    if !is_email_available(email, pool.get_ref()).await {
        return Ok(HttpResponse::Conflict().json(json!({
            "error": "Email already registered"
        })));
    }

    let year = chrono::Utc::now().year();
    let login_id = generate_login_id(&user.full_name, year, pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to generate login id");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    match insert_user(&user, &login_id, pool.get_ref()).await {
        Ok(_) => Ok(HttpResponse::Created().json(json!({
            "message": "User registered successfully",
            "login_id": login_id
        }))),
        Err(err_resp) => Ok(err_resp),
    }
}

#[derive(Serialize, Deserialize)]
struct LoginResponse {
    access_token: String,
    refresh_token: String,
}

#[instrument(
    name = "auth_login",
    skip(pool, config, user),
    fields(email = %user.email)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Login request received");

    if user.email.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty email or password");
        return HttpResponse::BadRequest().body("Email or password required");
    }

    debug!("Fetching user from database");

    let db_user = match sqlx::query_as::<_, UserSql>(
        r#"
        SELECT u.id, u.email, u.password_hash, u.role_id, e.id AS employee_id
        FROM users u
        LEFT JOIN employees e ON e.user_id = u.id
        WHERE u.email = ? AND u.is_active = TRUE
        "#,
    )
    .bind(user.email.trim().to_lowercase())
    .fetch_optional(pool.get_ref())
    .await
    {
        Ok(Some(user)) => {
            debug!(user_id = user.id, "User found");
            user
        }
        Ok(None) => {
            info!("Invalid credentials: user not found");
            return HttpResponse::Unauthorized().body("Invalid credentials");
        }
        Err(e) => {
            error!(error = %e, "Database error while fetching user");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if let Err(e) = verify_password(&user.password, &db_user.password_hash) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return HttpResponse::Unauthorized().body("Invalid credentials");
    }

    debug!("Password verified, generating tokens");

    let access_token = match generate_access_token(
        db_user.id,
        db_user.email.clone(),
        db_user.role_id,
        db_user.employee_id,
        &config.jwt_secret,
        config.access_token_ttl,
    ) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to encode access token");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let (refresh_token, refresh_claims) = match generate_refresh_token(
        db_user.id,
        db_user.email.clone(),
        db_user.role_id,
        db_user.employee_id,
        &config.jwt_secret,
        config.refresh_token_ttl,
    ) {
        Ok(pair) => pair,
        Err(e) => {
            error!(error = %e, "Failed to encode refresh token");
            return HttpResponse::InternalServerError().finish();
        }
    };

    debug!(
        user_id = db_user.id,
        jti = %refresh_claims.jti,
        "Storing refresh token"
    );

    if let Err(e) = sqlx::query(
        r#"
        INSERT INTO refresh_tokens (user_id, jti, expires_at)
        VALUES (?, ?, FROM_UNIXTIME(?))
        "#,
    )
    .bind(db_user.id)
    .bind(&refresh_claims.jti)
    .bind(refresh_claims.exp as i64)
    .execute(pool.get_ref())
    .await
    {
        error!(error = %e, "Failed to store refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    if let Err(e) = sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = ?")
        .bind(db_user.id)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, "Failed to update last_login_at");
        // intentionally not failing login
    }

    info!("Login successful");

    HttpResponse::Ok().json(LoginResponse {
        access_token,
        refresh_token,
    })
}

pub async fn refresh_token(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    let header = match req.headers().get("Authorization") {
        Some(h) => h.to_str().unwrap_or(""),
        None => return HttpResponse::Unauthorized().body("No token"),
    };

    let token = match header.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return HttpResponse::Unauthorized().body("Invalid token"),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return HttpResponse::Unauthorized().finish(),
    };

    if claims.token_type != TokenType::Refresh {
        return HttpResponse::Unauthorized().finish();
    }

    let record = match sqlx::query_as::<_, (u64, u64, bool)>(
        r#"
        SELECT id, user_id, revoked
        FROM refresh_tokens
        WHERE jti = ?
        "#,
    )
    .bind(&claims.jti)
    .fetch_optional(pool.get_ref())
    .await
    {
        Ok(Some((id, user_id, revoked))) if !revoked => (id, user_id),
        Ok(_) => return HttpResponse::Unauthorized().finish(),
        Err(e) => {
            error!(error = %e, "Failed to look up refresh token");
            return HttpResponse::InternalServerError().finish();
        }
    };

    // revoke old refresh token before issuing a new one
    if let Err(e) = sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE id = ?")
        .bind(record.0)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, "Failed to revoke refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    let (new_refresh_token, new_claims) = match generate_refresh_token(
        claims.user_id,
        claims.sub.clone(),
        claims.role,
        claims.employee_id,
        &config.jwt_secret,
        config.refresh_token_ttl,
    ) {
        Ok(pair) => pair,
        Err(e) => {
            error!(error = %e, "Failed to encode refresh token");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if let Err(e) = sqlx::query(
        r#"
        INSERT INTO refresh_tokens (user_id, jti, expires_at)
        VALUES (?, ?, FROM_UNIXTIME(?))
        "#,
    )
    .bind(record.1)
    .bind(&new_claims.jti)
    .bind(new_claims.exp as i64)
    .execute(pool.get_ref())
    .await
    {
        error!(error = %e, "Failed to store refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    let access_token = match generate_access_token(
        claims.user_id,
        claims.sub.clone(),
        claims.role,
        claims.employee_id,
        &config.jwt_secret,
        config.access_token_ttl,
    ) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to encode access token");
            return HttpResponse::InternalServerError().finish();
        }
    };

    HttpResponse::Ok().json(serde_json::json!({
        "access_token": access_token,
        "refresh_token": new_refresh_token
    }))
}

pub async fn logout(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    let header = match req.headers().get("Authorization") {
        Some(h) => h.to_str().unwrap_or(""),
        None => return HttpResponse::NoContent().finish(),
    };

    let token = match header.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return HttpResponse::NoContent().finish(),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return HttpResponse::NoContent().finish(),
    };

    // only refresh tokens can logout
    if claims.token_type != TokenType::Refresh {
        return HttpResponse::NoContent().finish();
    }

    // revoke refresh token (idempotent)
    let _ = sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE jti = ?")
        .bind(&claims.jti)
        .execute(pool.get_ref())
        .await;

    // success even if the token didn't exist
    HttpResponse::NoContent().finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_id_prefix_uses_first_and_last_name() {
        assert_eq!(login_id_prefix("John Doe"), "OIJODO");
        assert_eq!(login_id_prefix("Ada Marie Lovelace"), "OIADLO");
    }

    #[test]
    fn login_id_prefix_pads_single_names() {
        assert_eq!(login_id_prefix("Prince"), "OIPRXX");
        assert_eq!(login_id_prefix(""), "OIXXXX");
    }
}
