//! Session store client for the hosted Postgres database's REST interface.

use crate::error::Result;
use crate::normalize::{normalize_records, raw_rows_from_json, sort_newest_first};
use crate::store::{SessionQuery, SessionSource};
use crate::types::SessionRecord;
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

pub struct RestSessionStore {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl RestSessionStore {
    pub fn new(base_url: &str, table: &str, api_key: Option<String>) -> Result<Self> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base.join(&format!("rest/v1/{}", table))?;
        Ok(Self {
            client: Client::new(),
            endpoint,
            api_key,
        })
    }

    /// Full request URL for a query, ordered newest-first by start time.
    pub fn request_url(&self, query: &SessionQuery) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("select", "*")
                .append_pair("order", "started_at.desc")
                .append_pair("limit", &query.limit.to_string())
                .append_pair("offset", &query.offset.to_string());
            if let Some(user_id) = &query.user_id {
                pairs.append_pair("user_id", &format!("eq.{}", user_id));
            }
        }
        url
    }
}

#[async_trait]
impl SessionSource for RestSessionStore {
    async fn fetch(&self, query: &SessionQuery) -> Result<Vec<SessionRecord>> {
        let url = self.request_url(query);
        tracing::debug!("Fetching sessions from {}", url);

        let mut request = self.client.get(url);
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key).bearer_auth(key);
        }

        let payload: serde_json::Value = request
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut records = normalize_records(raw_rows_from_json(payload));
        sort_newest_first(&mut records);
        Ok(records)
    }

    fn name(&self) -> &str {
        "rest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(user: Option<&str>) -> SessionQuery {
        SessionQuery {
            user_id: user.map(String::from),
            limit: 25,
            offset: 50,
        }
    }

    #[test]
    fn test_request_url() {
        let store = RestSessionStore::new("https://db.example.com", "sessions", None).unwrap();
        let url = store.request_url(&query(None));
        assert_eq!(url.path(), "/rest/v1/sessions");
        assert_eq!(
            url.query(),
            Some("select=*&order=started_at.desc&limit=25&offset=50")
        );
    }

    #[test]
    fn test_request_url_with_user_and_base_path() {
        let store =
            RestSessionStore::new("https://example.com/project", "thermal_sessions", None).unwrap();
        let url = store.request_url(&query(Some("user-42")));
        assert_eq!(url.path(), "/project/rest/v1/thermal_sessions");
        let user = url
            .query_pairs()
            .find(|(k, _)| k == "user_id")
            .map(|(_, v)| v.into_owned());
        assert_eq!(user.as_deref(), Some("eq.user-42"));
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(RestSessionStore::new("not a url", "sessions", None).is_err());
    }
}
