use ::http::StatusCode;
use reqwest::Response;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;

use crate::domain::todo::{Todo, TodoId};
use crate::http::types::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server answered with a non-success status; `message` is its `error` field.
    #[error("{message}")]
    Api { status: StatusCode, message: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Fields to change in a `PUT /todos/{id}`; `None` fields are not sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TodoChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// `Some(None)` is sent as `null` and clears the description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// HTTP client for the `/todos` API.
#[derive(Clone)]
pub struct TodoClient {
    http: reqwest::Client,
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http: reqwest::Client::new(), base_url }
    }

    pub async fn list(&self) -> Result<Vec<Todo>, ClientError> {
        decode(self.http.get(self.url("/todos")).send().await?).await
    }

    pub async fn get(&self, id: TodoId) -> Result<Todo, ClientError> {
        decode(self.http.get(self.url(&format!("/todos/{id}"))).send().await?).await
    }

    pub async fn create(&self, title: &str, description: Option<&str>) -> Result<Todo, ClientError> {
        let body = json!({ "title": title, "description": description });
        decode(self.http.post(self.url("/todos")).json(&body).send().await?).await
    }

    pub async fn update(&self, id: TodoId, changes: &TodoChanges) -> Result<Todo, ClientError> {
        decode(self.http.put(self.url(&format!("/todos/{id}"))).json(changes).send().await?).await
    }

    pub async fn delete(&self, id: TodoId) -> Result<(), ClientError> {
        check(self.http.delete(self.url(&format!("/todos/{id}"))).send().await?).await?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    Ok(check(response).await?.json().await?)
}

async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = match response.json::<ApiError>().await {
        Ok(body) => body.error,
        Err(_) => status.canonical_reason().unwrap_or("Request failed").to_string(),
    };
    Err(ClientError::Api { status, message })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changes_omit_unset_fields() {
        let changes = TodoChanges { completed: Some(true), ..Default::default() };
        assert_eq!(serde_json::to_value(&changes).unwrap(), json!({ "completed": true }));
    }

    #[test]
    fn cleared_description_is_sent_as_null() {
        let changes = TodoChanges { title: Some("t".into()), description: Some(None), completed: None };
        assert_eq!(serde_json::to_value(&changes).unwrap(), json!({ "title": "t", "description": null }));
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let client = TodoClient::new("http://localhost:3000/");
        assert_eq!(client.url("/todos"), "http://localhost:3000/todos");
    }
}
