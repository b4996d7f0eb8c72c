use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnonymousTokenResponse {
    pub anonymous_token: String,
}
