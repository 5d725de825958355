/// HTTP client for the board API
///
/// Every request carries the acting user in `X-User-Id` and this
/// client's websocket connection id in `X-Connection-Id`, so the server
/// can skip echoing our own mutations back over our socket.

use async_trait::async_trait;
use boardcast_shared::models::activity::ActivityPage;
use boardcast_shared::models::board::{Board, BoardSnapshot};
use boardcast_shared::models::list::List;
use boardcast_shared::models::task::{PositionUpdate, Task};
use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::activity::{ActivityError, ActivityFetcher};

/// API client errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: StatusCode, body: String },
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize)]
struct TitleBody<'a> {
    title: &'a str,
}

#[derive(Serialize)]
struct ContentBody<'a> {
    content: &'a str,
}

#[derive(Serialize)]
struct AssignBody {
    assignee_id: Option<Uuid>,
}

#[derive(Serialize)]
struct ReorderBody<'a> {
    updates: &'a [PositionUpdate],
}

/// Client for the board HTTP API
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    user_id: Uuid,
    connection_id: Uuid,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, user_id: Uuid, connection_id: Uuid) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            user_id,
            connection_id,
        }
    }

    /// The connection id sent with every request
    pub fn connection_id(&self) -> Uuid {
        self.connection_id
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header("x-user-id", self.user_id.to_string())
            .header("x-connection-id", self.connection_id.to_string())
    }

    async fn check<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> ApiResult<T> {
        let status = resp.status();
        if status.is_success() {
            Ok(resp.json().await?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(ApiError::Status { status, body })
        }
    }

    /// Fetches the full state of a board: lists, tasks, members
    pub async fn board_snapshot(&self, board_id: Uuid) -> ApiResult<BoardSnapshot> {
        let resp = self
            .request(reqwest::Method::GET, &format!("/v1/boards/{}", board_id))
            .send()
            .await?;
        Self::check(resp).await
    }

    /// Lists boards visible to the acting user
    pub async fn list_boards(&self) -> ApiResult<Vec<Board>> {
        let resp = self.request(reqwest::Method::GET, "/v1/boards").send().await?;
        Self::check(resp).await
    }

    pub async fn create_board(&self, title: &str) -> ApiResult<Board> {
        let resp = self
            .request(reqwest::Method::POST, "/v1/boards")
            .json(&TitleBody { title })
            .send()
            .await?;
        Self::check(resp).await
    }

    pub async fn join_board(&self, board_id: Uuid) -> ApiResult<serde_json::Value> {
        let resp = self
            .request(reqwest::Method::POST, &format!("/v1/boards/{}/join", board_id))
            .send()
            .await?;
        Self::check(resp).await
    }

    pub async fn create_list(&self, board_id: Uuid, title: &str) -> ApiResult<List> {
        let resp = self
            .request(reqwest::Method::POST, &format!("/v1/boards/{}/lists", board_id))
            .json(&TitleBody { title })
            .send()
            .await?;
        Self::check(resp).await
    }

    pub async fn create_task(&self, list_id: Uuid, content: &str) -> ApiResult<Task> {
        let resp = self
            .request(reqwest::Method::POST, &format!("/v1/lists/{}/tasks", list_id))
            .json(&ContentBody { content })
            .send()
            .await?;
        Self::check(resp).await
    }

    pub async fn update_task_content(&self, task_id: Uuid, content: &str) -> ApiResult<Task> {
        let resp = self
            .request(reqwest::Method::PATCH, &format!("/v1/tasks/{}/content", task_id))
            .json(&ContentBody { content })
            .send()
            .await?;
        Self::check(resp).await
    }

    pub async fn assign_task(&self, task_id: Uuid, assignee_id: Option<Uuid>) -> ApiResult<Task> {
        let resp = self
            .request(reqwest::Method::PATCH, &format!("/v1/tasks/{}/assignee", task_id))
            .json(&AssignBody { assignee_id })
            .send()
            .await?;
        Self::check(resp).await
    }

    pub async fn delete_task(&self, task_id: Uuid) -> ApiResult<serde_json::Value> {
        let resp = self
            .request(reqwest::Method::DELETE, &format!("/v1/tasks/{}", task_id))
            .send()
            .await?;
        Self::check(resp).await
    }

    /// Submits a drag-reorder batch produced by the planner
    pub async fn reorder_tasks(
        &self,
        board_id: Uuid,
        updates: &[PositionUpdate],
    ) -> ApiResult<serde_json::Value> {
        let resp = self
            .request(reqwest::Method::POST, &format!("/v1/boards/{}/reorder", board_id))
            .json(&ReorderBody { updates })
            .send()
            .await?;
        Self::check(resp).await
    }

    /// Fetches one page of board history
    pub async fn activities(
        &self,
        board_id: Uuid,
        page: u32,
        page_size: u32,
    ) -> ApiResult<ActivityPage> {
        let resp = self
            .request(
                reqwest::Method::GET,
                &format!("/v1/boards/{}/activities?page={}&page_size={}", board_id, page, page_size),
            )
            .send()
            .await?;
        Self::check(resp).await
    }
}

#[async_trait]
impl ActivityFetcher for ApiClient {
    async fn fetch_page(
        &self,
        board_id: Uuid,
        page: u32,
        page_size: u32,
    ) -> Result<ActivityPage, ActivityError> {
        self.activities(board_id, page, page_size)
            .await
            .map_err(|e| ActivityError::Fetch(e.to_string()))
    }
}
