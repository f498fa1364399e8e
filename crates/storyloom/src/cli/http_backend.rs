//! HTTP implementation of the storage backend.
//!
//! Talks JSON to a Storyloom server under a base URL such as
//! `http://localhost:8000/api`. Every call is scoped to a workspace (project)
//! with the `workspaceId` query parameter or body field.

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use storyloom_core::backend::{BoxFuture, CharacterProfile, Project, StorageBackend, WorldFact};
use storyloom_core::error::{Result, StoryloomError};
use storyloom_core::manuscript::{ManuscriptChapter, normalize_manuscript_chapters};
use storyloom_core::merge::BackendScene;
use storyloom_core::utils::slugify;

#[derive(Deserialize)]
struct ChaptersEnvelope {
    #[serde(default)]
    chapters: Vec<Value>,
}

#[derive(Deserialize)]
struct ScenesEnvelope {
    #[serde(default)]
    scenes: Vec<Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveManuscriptRequest<'a> {
    workspace_id: &'a str,
    chapters: &'a [ManuscriptChapter],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveScenesRequest<'a> {
    workspace_id: &'a str,
    scenes: &'a [BackendScene],
}

#[derive(Serialize)]
struct CreateProjectRequest<'a> {
    name: &'a str,
}

/// Backend served by a Storyloom HTTP server.
pub struct HttpBackend {
    base_url: String,
    client: Client,
}

impl HttpBackend {
    /// Create a client for `base_url` (trailing slashes are ignored).
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn scoped_url(&self, path: &str, workspace_id: &str) -> String {
        format!(
            "{}?workspaceId={}",
            self.url(path),
            urlencoding::encode(workspace_id)
        )
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response> {
        let response = request.send().await.map_err(|e| {
            StoryloomError::backend(format!("Failed to connect to {}: {}", self.base_url, e))
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        log::debug!("[HttpBackend] Request failed with {}: {}", status, body);
        Err(StoryloomError::backend(format!("{} - {}", status, body)))
    }

    async fn request_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| StoryloomError::backend(format!("Invalid response: {}", e)))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T> {
        log::debug!("[HttpBackend] GET {}", url);
        self.request_json(self.client.get(url)).await
    }

    async fn delete(&self, url: String) -> Result<()> {
        log::debug!("[HttpBackend] DELETE {}", url);
        self.send(self.client.request(Method::DELETE, url)).await?;
        Ok(())
    }
}

impl StorageBackend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    fn list_projects(&self) -> BoxFuture<'_, Result<Vec<Project>>> {
        Box::pin(async move { self.get_json(self.url("/projects/")).await })
    }

    fn create_project<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Project>> {
        Box::pin(async move {
            let request = self
                .client
                .post(self.url("/projects/"))
                .json(&CreateProjectRequest { name });
            let response = request.send().await.map_err(|e| {
                StoryloomError::backend(format!("Failed to connect to {}: {}", self.base_url, e))
            })?;
            if response.status() == StatusCode::CONFLICT {
                return Err(StoryloomError::ProjectExists(slugify(name)));
            }
            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(StoryloomError::backend(format!("{} - {}", status, body)));
            }
            response
                .json::<Project>()
                .await
                .map_err(|e| StoryloomError::backend(format!("Invalid response: {}", e)))
        })
    }

    fn load_manuscript<'a>(
        &'a self,
        workspace_id: &'a str,
    ) -> BoxFuture<'a, Result<Vec<ManuscriptChapter>>> {
        Box::pin(async move {
            let envelope: ChaptersEnvelope = self
                .get_json(self.scoped_url("/storage/manuscript", workspace_id))
                .await?;
            Ok(normalize_manuscript_chapters(&envelope.chapters))
        })
    }

    fn save_manuscript<'a>(
        &'a self,
        chapters: &'a [ManuscriptChapter],
        workspace_id: &'a str,
    ) -> BoxFuture<'a, Result<Vec<ManuscriptChapter>>> {
        Box::pin(async move {
            let request = self
                .client
                .put(self.url("/storage/manuscript"))
                .json(&SaveManuscriptRequest {
                    workspace_id,
                    chapters,
                });
            let envelope: ChaptersEnvelope = self.request_json(request).await?;
            Ok(normalize_manuscript_chapters(&envelope.chapters))
        })
    }

    fn load_scenes<'a>(&'a self, workspace_id: &'a str) -> BoxFuture<'a, Result<Vec<Value>>> {
        Box::pin(async move {
            let envelope: ScenesEnvelope = self
                .get_json(self.scoped_url("/storage/scenes", workspace_id))
                .await?;
            Ok(envelope.scenes)
        })
    }

    fn save_scenes<'a>(
        &'a self,
        scenes: &'a [BackendScene],
        workspace_id: &'a str,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let request = self
                .client
                .put(self.url("/storage/scenes"))
                .json(&SaveScenesRequest {
                    workspace_id,
                    scenes,
                });
            self.send(request).await?;
            Ok(())
        })
    }

    fn delete_scenes<'a>(
        &'a self,
        chapter_id: i64,
        workspace_id: &'a str,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.delete(self.scoped_url(&format!("/storage/scenes/{}", chapter_id), workspace_id))
                .await
        })
    }

    fn list_characters<'a>(
        &'a self,
        workspace_id: &'a str,
    ) -> BoxFuture<'a, Result<Vec<CharacterProfile>>> {
        Box::pin(async move { self.get_json(self.scoped_url("/characters", workspace_id)).await })
    }

    fn save_character<'a>(
        &'a self,
        character: &'a CharacterProfile,
        workspace_id: &'a str,
    ) -> BoxFuture<'a, Result<CharacterProfile>> {
        Box::pin(async move {
            let request = self
                .client
                .post(self.scoped_url("/characters", workspace_id))
                .json(character);
            self.request_json(request).await
        })
    }

    fn delete_character<'a>(&'a self, id: i64, workspace_id: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.delete(self.scoped_url(&format!("/characters/{}", id), workspace_id))
                .await
        })
    }

    fn list_world_facts<'a>(
        &'a self,
        workspace_id: &'a str,
    ) -> BoxFuture<'a, Result<Vec<WorldFact>>> {
        Box::pin(async move { self.get_json(self.scoped_url("/worlds", workspace_id)).await })
    }

    fn save_world_fact<'a>(
        &'a self,
        fact: &'a WorldFact,
        workspace_id: &'a str,
    ) -> BoxFuture<'a, Result<WorldFact>> {
        Box::pin(async move {
            let request = self
                .client
                .post(self.scoped_url("/worlds", workspace_id))
                .json(fact);
            self.request_json(request).await
        })
    }

    fn delete_world_fact<'a>(&'a self, id: i64, workspace_id: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.delete(self.scoped_url(&format!("/worlds/{}", id), workspace_id))
                .await
        })
    }
}
