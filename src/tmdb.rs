use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::config::TmdbConfig;
use crate::error::TmdbError;

pub type TmdbResult<T> = std::result::Result<T, TmdbError>;

#[async_trait]
pub trait TmdbApi: Send + Sync {
    async fn fetch_person_detail(&self, person_id: u32) -> TmdbResult<PersonRecord>;
    async fn fetch_person_credits(&self, person_id: u32) -> TmdbResult<PersonCredits>;
    async fn fetch_movie_detail(&self, movie_id: u32) -> TmdbResult<MovieDetailRecord>;
    async fn fetch_movie_credits(&self, movie_id: u32) -> TmdbResult<MovieCredits>;
}

/// One movie a person appears in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditRecord {
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub release_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_average: f64,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overview: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genre_ids: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewCredit {
    #[serde(flatten)]
    pub credit: CreditRecord,
    #[serde(default, deserialize_with = "null_as_default")]
    pub job: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub department: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonCredits {
    #[serde(default)]
    pub cast: Vec<CreditRecord>,
    #[serde(default)]
    pub crew: Vec<CrewCredit>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRecord {
    pub id: u32,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub biography: String,
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(default)]
    pub deathday: Option<String>,
    #[serde(default)]
    pub place_of_birth: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub known_for_department: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetailRecord {
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub release_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overview: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_average: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub runtime: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub tagline: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieCastMember {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieCredits {
    #[serde(default)]
    pub cast: Vec<MovieCastMember>,
}

// TMDB sends explicit nulls for fields it has no value for.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    pub fn new(config: &TmdbConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> TmdbResult<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(endpoint, "TMDB request");
        let res = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|source| TmdbError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;
        let status = res.status();
        let text = res.text().await.map_err(|source| TmdbError::Transport {
            endpoint: endpoint.to_string(),
            source,
        })?;
        if !status.is_success() {
            return Err(TmdbError::HttpStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body: text,
            });
        }
        serde_json::from_str(&text).map_err(|source| TmdbError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }
}

#[async_trait]
impl TmdbApi for TmdbClient {
    async fn fetch_person_detail(&self, person_id: u32) -> TmdbResult<PersonRecord> {
        self.get_json(&format!("/person/{person_id}")).await
    }

    async fn fetch_person_credits(&self, person_id: u32) -> TmdbResult<PersonCredits> {
        self.get_json(&format!("/person/{person_id}/movie_credits"))
            .await
    }

    async fn fetch_movie_detail(&self, movie_id: u32) -> TmdbResult<MovieDetailRecord> {
        self.get_json(&format!("/movie/{movie_id}")).await
    }

    async fn fetch_movie_credits(&self, movie_id: u32) -> TmdbResult<MovieCredits> {
        self.get_json(&format!("/movie/{movie_id}/credits")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn credit_with_null_release_date_decodes_empty() {
        let value = json!({
            "id": 238,
            "title": "The Godfather",
            "character": "Tom Hagen",
            "release_date": null,
            "vote_average": 8.7,
            "poster_path": null
        });
        let credit: CreditRecord = serde_json::from_value(value).expect("credit deserialize");
        assert_eq!(credit.release_date, "");
        assert_eq!(credit.character.as_deref(), Some("Tom Hagen"));
        assert_eq!(credit.poster_path, None);
        assert!(credit.genre_ids.is_empty());
    }

    #[test]
    fn crew_credit_flattens_movie_fields() {
        let value = json!({
            "cast": [],
            "crew": [{
                "id": 11,
                "title": "The Apostle",
                "release_date": "1997-12-19",
                "vote_average": 6.9,
                "job": "Director",
                "department": "Directing"
            }]
        });
        let credits: PersonCredits = serde_json::from_value(value).expect("credits deserialize");
        assert_eq!(credits.crew.len(), 1);
        assert_eq!(credits.crew[0].credit.title, "The Apostle");
        assert_eq!(credits.crew[0].job, "Director");
    }

    #[test]
    fn movie_detail_null_runtime_is_zero() {
        let value = json!({
            "id": 1,
            "title": "Untitled",
            "runtime": null,
            "genres": [{ "id": 18, "name": "Drama" }],
            "tagline": ""
        });
        let detail: MovieDetailRecord = serde_json::from_value(value).expect("detail deserialize");
        assert_eq!(detail.runtime, 0);
        assert_eq!(detail.genres[0].name, "Drama");
        assert_eq!(detail.vote_average, 0.0);
    }

    #[test]
    fn missing_title_is_a_decode_error() {
        let value = json!({ "id": 1 });
        assert!(serde_json::from_value::<CreditRecord>(value).is_err());
    }
}
