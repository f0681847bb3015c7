use serde::{Deserialize, Deserializer};

/// Claims read from a verified directory-issued JWT.
///
/// NOTE:
/// - `aud` may be a string or an array; both end up as a list (first entry wins for checks).
/// - `roles` is normally an array; a lone string is accepted as a single role.
/// - v1.0 tokens carry the calling app in `appid`, v2.0 tokens in `azp`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenClaims {
    pub iss: String,
    #[serde(default, deserialize_with = "string_or_list")]
    pub aud: Vec<String>,

    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub appid: Option<String>,
    #[serde(default)]
    pub azp: Option<String>,
    #[serde(default)]
    pub tid: Option<String>,

    #[serde(default, deserialize_with = "string_or_list")]
    pub roles: Vec<String>,

    pub exp: u64,
    #[serde(default)]
    pub nbf: Option<u64>,
}

impl TokenClaims {
    /// Application id of the token's caller (`appid`, falling back to `azp`).
    pub fn app_id(&self) -> Option<&str> {
        [self.appid.as_deref(), self.azp.as_deref()]
            .into_iter()
            .flatten()
            .find(|id| !id.trim().is_empty())
    }

    pub fn first_audience(&self) -> Option<&str> {
        self.aud.first().map(String::as_str)
    }
}

fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::One(value)) => vec![value],
        Some(Raw::Many(values)) => values,
        None => Vec::new(),
    })
}
