use axum::{
    extract::State,
    response::{Html, Json, Redirect},
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{ChangePasswordForm, LoginForm, ProfileResponse, RegisterForm},
        password::{hash_password, verify_password},
        repo::{is_unique_violation, User},
    },
    error::AppError,
    session::{removal_cookie, session_cookie, CurrentUser, Session, SessionToken, UserSnapshot},
    state::AppState,
    todos,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(login_page))
        .route("/register", get(register_page).post(register))
        .route("/login", post(login))
        .route("/logout", get(logout))
}

pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route(
            "/change-password",
            get(change_password_page).post(change_password),
        )
        .route("/request-data", get(request_data))
        .route("/delete-account", post(delete_account))
        .route("/delete-user", post(delete_user))
}

// Anonymous entry points. View rendering proper lives outside this service;
// these bodies are just enough for a browser to land on.

async fn login_page() -> Html<&'static str> {
    Html("<h1>taskboard</h1><p>log in or <a href=\"/register\">register</a></p>")
}

async fn register_page() -> Html<&'static str> {
    Html("<h1>taskboard</h1><p>create an account</p>")
}

async fn change_password_page(CurrentUser(_user): CurrentUser) -> Html<&'static str> {
    Html("<h1>change password</h1>")
}

#[instrument(skip(state, jar, form))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    if form.user_name.is_empty() || form.user_pass.is_empty() {
        return Err(AppError::Validation(
            "Username and password required".into(),
        ));
    }

    let user = match User::find_by_name(&state.db, &form.user_name).await? {
        Some(u) => u,
        None => {
            warn!(user_name = %form.user_name, "login unknown username");
            return Err(AppError::Unauthorized);
        }
    };

    if !verify_password(&form.user_pass, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthorized);
    }

    let snapshot = UserSnapshot {
        id: user.id,
        name: user.user_name.clone(),
    };
    let session = Session::create(&state.db, &snapshot, state.config.session.ttl_minutes).await?;

    info!(user_id = %user.id, user_name = %user.user_name, "user logged in");
    let cookie = session_cookie(
        &state.config.session.cookie_name,
        session.token,
        state.config.session.ttl_minutes,
    );
    Ok((jar.add(cookie), Redirect::to("/dashboard")))
}

#[instrument(skip(state, jar, form))]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    if form.user_name.is_empty() || form.user_pass.is_empty() {
        return Err(AppError::Validation(
            "Username and password required".into(),
        ));
    }

    // Fast path only; the unique index is the authoritative check.
    if User::find_by_name(&state.db, &form.user_name).await?.is_some() {
        warn!(user_name = %form.user_name, "username already taken");
        return Err(AppError::Conflict("Username already taken".into()));
    }

    let hash = hash_password(&form.user_pass)?;
    let user = match User::create(&state.db, &form.user_name, &hash).await {
        Ok(u) => u,
        Err(e) if is_unique_violation(&e) => {
            warn!(user_name = %form.user_name, "username taken in insert race");
            return Err(AppError::Conflict("Username already taken".into()));
        }
        Err(e) => return Err(e.into()),
    };

    let snapshot = UserSnapshot {
        id: user.id,
        name: user.user_name.clone(),
    };
    let session = Session::create(&state.db, &snapshot, state.config.session.ttl_minutes).await?;

    info!(user_id = %user.id, user_name = %user.user_name, "user registered");
    let cookie = session_cookie(
        &state.config.session.cookie_name,
        session.token,
        state.config.session.ttl_minutes,
    );
    Ok((jar.add(cookie), Redirect::to("/dashboard")))
}

/// Logout carries no auth gate: an anonymous or stale client still gets its
/// cookie cleared and lands back on the entry point.
#[instrument(skip(state, jar))]
pub async fn logout(
    State(state): State<AppState>,
    SessionToken(token): SessionToken,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AppError> {
    if let Some(token) = token {
        Session::destroy(&state.db, token).await?;
    }
    let jar = jar.remove(removal_cookie(&state.config.session.cookie_name));
    Ok((jar, Redirect::to("/")))
}

#[instrument]
pub async fn dashboard(CurrentUser(user): CurrentUser) -> Json<UserSnapshot> {
    Json(user)
}

#[instrument(skip(state, jar, form))]
pub async fn change_password(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    SessionToken(token): SessionToken,
    jar: CookieJar,
    Form(form): Form<ChangePasswordForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    if form.old_password.is_empty() || form.new_password.is_empty() {
        return Err(AppError::Validation(
            "Both old and new passwords are required".into(),
        ));
    }

    // The session snapshot can outlive the record; re-read before mutating.
    let record = User::find_by_id(&state.db, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    if !verify_password(&form.old_password, &record.password_hash)? {
        warn!(user_id = %user.id, "change-password old password mismatch");
        return Err(AppError::Unauthorized);
    }

    let new_hash = hash_password(&form.new_password)?;
    User::update_password_hash(&state.db, user.id, &new_hash).await?;

    // Credential rotated: the current session must not survive it.
    if let Some(token) = token {
        Session::destroy(&state.db, token).await?;
    }
    info!(user_id = %user.id, "password changed, session destroyed");
    let jar = jar.remove(removal_cookie(&state.config.session.cookie_name));
    Ok((jar, Redirect::to("/")))
}

#[instrument(skip(state))]
pub async fn request_data(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let record = User::find_by_id(&state.db, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(Json(ProfileResponse {
        user_id: record.id,
        user_name: record.user_name,
        role: record.role,
        created_at: record.created_at,
    }))
}

/// Full account teardown: tasks first, then the user record, then the
/// session. A failure mid-cascade leaves the session bound, so the client
/// can observe that the deletion did not complete.
#[instrument(skip(state, jar))]
pub async fn delete_account(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    SessionToken(token): SessionToken,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AppError> {
    let removed = todos::repo::Task::delete_all_by_owner(&state.db, user.id).await?;
    User::delete(&state.db, user.id).await?;
    if let Some(token) = token {
        Session::destroy(&state.db, token).await?;
    }
    info!(user_id = %user.id, tasks_removed = removed, "account deleted");
    let jar = jar.remove(removal_cookie(&state.config.session.cookie_name));
    Ok((jar, Redirect::to("/")))
}

/// Removes the user record only; owned tasks are left behind.
#[instrument(skip(state, jar))]
pub async fn delete_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    SessionToken(token): SessionToken,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AppError> {
    User::delete(&state.db, user.id).await?;
    if let Some(token) = token {
        Session::destroy(&state.db, token).await?;
    }
    info!(user_id = %user.id, "user record deleted");
    let jar = jar.remove(removal_cookie(&state.config.session.cookie_name));
    Ok((jar, Redirect::to("/")))
}
