use model::{
    user::{Credentials, Role, RoleUpdate, Signup, User},
    WithId,
};
use serde_json::Value;
use utility::id::Id;

use crate::{
    client::BackendClient,
    fleet::driver_for_user,
    model::auth::LoginResponse,
    session::{Session, SessionManager},
    ApiError, ApiResult,
};

/// Logs in and stores the new session in `sessions`.
pub async fn login(
    client: &BackendClient,
    sessions: &SessionManager,
    credentials: &Credentials,
) -> ApiResult<Session> {
    credentials.validate()?;
    let response: LoginResponse = client
        .post("login/", credentials)
        .await
        .map_err(ApiError::into_rejection)?;
    let user = response.into_user().map_err(ApiError::Rejected)?;

    let mut session = Session::new(user);
    if session.role() == Role::Driver {
        session.driver = driver_for_user(client, session.user_id())
            .await?
            .map(|driver| driver.id);
    }
    sessions.set(session.clone()).await;
    Ok(session)
}

pub async fn signup(client: &BackendClient, signup: &Signup) -> ApiResult<()> {
    signup.validate()?;
    let _: Value = client
        .post("signup/", signup)
        .await
        .map_err(ApiError::into_rejection)?;
    log::info!("Signed up '{}'.", signup.name);
    Ok(())
}

pub async fn logout(sessions: &SessionManager) {
    sessions.clear().await;
}

/// Changes the role of a user. If it is the logged in user, the session
/// follows.
pub async fn set_role(
    client: &BackendClient,
    sessions: &SessionManager,
    user: &Id<User>,
    role: Role,
) -> ApiResult<WithId<User>> {
    let updated: WithId<User> = client
        .patch(&format!("users/{user}/"), &RoleUpdate { role })
        .await?;
    if let Some(session) = sessions.current().await {
        if session.user_id() == user {
            sessions.set_role(role).await?;
        }
    }
    Ok(updated)
}
