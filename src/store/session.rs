use serde::Deserialize;

/// An authenticated store session with an explicit lifecycle: opened by
/// [`RestStore::sign_in`](crate::store::RestStore::sign_in), renewed by
/// `refresh`, ended by `sign_out`. Passed to every user-scoped operation
/// instead of living in ambient global state.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: TokenUser,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenUser {
    pub id: String,
}

impl From<TokenResponse> for Session {
    fn from(response: TokenResponse) -> Self {
        Session {
            user_id: response.user.id,
            access_token: response.access_token,
            refresh_token: response.refresh_token,
        }
    }
}
