//! User and authentication routes
//!
//! Thin adapters from HTTP to `AuthService`; status codes come from
//! `ApiError`.

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Form, Json, Router,
};
use mini_blog_shared::{
    AccessToken, LoginForm, MessageResponse, PasswordChange, PasswordResetConfirm,
    PasswordResetRequest, PasswordResetToken, UserCreate, UserOut,
};

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_me))
        .route("/create", post(create_user))
        .route("/token", post(login_for_access_token))
        .route("/password", put(change_password))
        .route("/password-reset", post(request_password_reset))
        .route("/password-reset/confirm", post(confirm_password_reset))
}

/// Get the currently logged-in user
///
/// GET /users and GET /users/
pub(super) async fn get_me(AuthUser(user): AuthUser) -> Json<UserOut> {
    Json(UserOut::from(&user))
}

/// Register a new user
///
/// POST /users/create
async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<UserCreate>,
) -> ApiResult<(StatusCode, Json<UserOut>)> {
    let user = state.auth().register(req).await?;
    Ok((StatusCode::CREATED, Json(UserOut::from(&user))))
}

/// Exchange username and password for an access token
///
/// POST /users/token (form encoded)
async fn login_for_access_token(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> ApiResult<Json<AccessToken>> {
    let token = state.auth().login(&form.username, &form.password).await?;
    Ok(Json(token))
}

/// Change the password of the logged-in user
///
/// PUT /users/password
async fn change_password(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<PasswordChange>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .auth()
        .change_password(&req.current_password, &req.new_password, &user)
        .await?;
    Ok(Json(MessageResponse::new("Password changed")))
}

/// Issue a password-reset token
///
/// POST /users/password-reset
async fn request_password_reset(
    State(state): State<AppState>,
    Json(req): Json<PasswordResetRequest>,
) -> ApiResult<(StatusCode, Json<PasswordResetToken>)> {
    let token = state.auth().request_reset(&req.username).await?;
    Ok((StatusCode::CREATED, Json(PasswordResetToken { token })))
}

/// Consume a password-reset token
///
/// POST /users/password-reset/confirm
async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(req): Json<PasswordResetConfirm>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .auth()
        .complete_reset(&req.token, &req.new_password)
        .await?;
    Ok(Json(MessageResponse::new("Password reset")))
}
