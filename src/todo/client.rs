//! Thin HTTP client for the todo API.

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::Value;
use url::Url;

use super::model::{Todo, TodoInput};

pub struct TodoClient {
    client: reqwest::Client,
    base: Url,
}

impl TodoClient {
    pub fn new(base: &str) -> Result<Self> {
        let base = Url::parse(base).with_context(|| format!("invalid base url: {base}"))?;
        Ok(Self {
            client: reqwest::Client::new(),
            base,
        })
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base.join(path).with_context(|| format!("invalid path: {path}"))
    }

    fn todo_url(&self, id: &str) -> Result<Url> {
        self.url(&format!("todos/{id}"))
    }

    pub async fn welcome(&self) -> Result<Value> {
        let resp = self.client.get(self.url("")?).send().await.context("GET /")?;
        if !resp.status().is_success() {
            anyhow::bail!("GET / returned status: {}", resp.status());
        }
        resp.json().await.context("parse welcome")
    }

    pub async fn list(&self) -> Result<Vec<Todo>> {
        let resp = self.client.get(self.url("todos/")?).send().await.context("GET /todos/")?;
        if !resp.status().is_success() {
            anyhow::bail!("GET /todos/ returned status: {}", resp.status());
        }
        resp.json().await.context("parse todo list")
    }

    pub async fn create(&self, input: &TodoInput) -> Result<Todo> {
        let resp = self
            .client
            .post(self.url("todos/")?)
            .json(input)
            .send()
            .await
            .context("POST /todos/")?;
        if resp.status() != StatusCode::CREATED {
            anyhow::bail!("POST /todos/ returned status: {}", resp.status());
        }
        resp.json().await.context("parse created todo")
    }

    /// `Ok(None)` on 404.
    pub async fn get(&self, id: &str) -> Result<Option<Todo>> {
        let resp = self.client.get(self.todo_url(id)?).send().await.context("GET /todos/:id")?;
        match resp.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => Ok(Some(resp.json().await.context("parse todo")?)),
            s => anyhow::bail!("GET /todos/{id} returned status: {s}"),
        }
    }

    pub async fn update(&self, id: &str, input: &TodoInput) -> Result<Todo> {
        let resp = self
            .client
            .put(self.todo_url(id)?)
            .json(input)
            .send()
            .await
            .context("PUT /todos/:id")?;
        if !resp.status().is_success() {
            anyhow::bail!("PUT /todos/{id} returned status: {}", resp.status());
        }
        resp.json().await.context("parse updated todo")
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let resp = self.client.delete(self.todo_url(id)?).send().await.context("DELETE /todos/:id")?;
        if resp.status() != StatusCode::NO_CONTENT {
            anyhow::bail!("DELETE /todos/{id} returned status: {}", resp.status());
        }
        Ok(())
    }
}
