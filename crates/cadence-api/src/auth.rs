use tracing::{info, warn};

use cadence_session::SessionStore;
use cadence_storage::KeyValueStore;
use cadence_types::api::LoginResponse;
use cadence_types::models::UserRecord;

use crate::client::ApiClient;
use crate::error::ApiError;

/// Second login step: trade the mailed code for a session.
pub async fn sign_in_with_otp<S: KeyValueStore>(
    api: &ApiClient,
    session: &mut SessionStore<S>,
    username: &str,
    otp: &str,
) -> Result<UserRecord, ApiError> {
    let response = api.verify_otp(username, otp).await?;
    adopt(session, response)
}

/// Account recovery: a verified magic link signs the user in directly.
pub async fn sign_in_with_magic_link<S: KeyValueStore>(
    api: &ApiClient,
    session: &mut SessionStore<S>,
    link_token: &str,
) -> Result<UserRecord, ApiError> {
    let response = api.verify_magic_link(link_token).await?;
    adopt(session, response)
}

/// Tell the server, then forget the session locally no matter what it said.
pub async fn sign_out<S: KeyValueStore>(api: &ApiClient, session: &mut SessionStore<S>) {
    if session.is_authenticated() {
        if let Err(e) = api.logout().await {
            warn!(error = %e, "Server logout failed; clearing local session anyway");
        }
    }
    session.logout();
}

/// A response missing either half leaves the session untouched.
fn adopt<S: KeyValueStore>(
    session: &mut SessionStore<S>,
    response: LoginResponse,
) -> Result<UserRecord, ApiError> {
    if !response.is_complete() {
        warn!("Login response missing token or user id");
        return Err(ApiError::IncompleteLogin);
    }

    let (user, token) = response.into_parts();
    info!(username = %user.username, "Server accepted credentials");
    session.login(user.clone(), token);
    Ok(user)
}
