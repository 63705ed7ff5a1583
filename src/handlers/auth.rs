use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;

use crate::auth::middleware::AuthenticatedUser;
use crate::db::users;
use crate::error::ApiError;
use crate::models::users::{CompleteProfile, Roles, UserResponse};

/// GET /api/auth/me — return the currently authenticated user's profile.
pub async fn me(user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(UserResponse::from(user.0))
}

/// POST /api/auth/complete-profile — set username, role, display_name after
/// first login. This is also how a guest account becomes an owner account.
pub async fn complete_profile(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    body: web::Json<CompleteProfile>,
) -> Result<HttpResponse, ApiError> {
    let input = body.into_inner();
    // Guests may become owners here; admin is never self-assigned.
    if input.role == Some(Roles::Admin) {
        return Err(ApiError::NotAuthorized(
            "the admin role cannot be self-assigned".to_string(),
        ));
    }

    let updated = users::complete_profile(db.get_ref(), user.0.id, input).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(updated)))
}
