/// Integration tests for the board API
///
/// These tests verify the full system works end-to-end:
/// - Board, list, and task endpoints with actor identification
/// - Authorization (owner, member, outsider)
/// - Drag-reorder persistence and event fan-out through the relay hub
/// - Activity logging and paginated history
///
/// A running PostgreSQL database is required; set DATABASE_URL.

mod common;

use axum::http::StatusCode;
use boardcast_server::hub::ConnectionId;
use boardcast_shared::events::BoardEvent;
use boardcast_shared::models::task::Task;
use common::TestContext;
use serde_json::json;

#[tokio::test]
async fn test_create_board_and_snapshot() {
    let mut ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx
        .request("POST", "/v1/boards", Some(ctx.owner.id), Some(json!({ "title": "Roadmap" })))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Roadmap");
    let board_id = body["id"].as_str().unwrap().to_string();

    let (status, snapshot) = ctx
        .request("GET", &format!("/v1/boards/{}", board_id), Some(ctx.owner.id), None)
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snapshot["board"]["id"], board_id.as_str());
    assert!(snapshot["lists"].as_array().unwrap().is_empty());

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_missing_actor_header_is_unauthorized() {
    let mut ctx = TestContext::new().await.unwrap();

    let (status, _) = ctx
        .request("GET", &format!("/v1/boards/{}", ctx.board.id), None, None)
        .await
        .unwrap();
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_outsider_is_forbidden() {
    let mut ctx = TestContext::new().await.unwrap();
    let outsider = ctx.outsider.id;
    let board_id = ctx.board.id;

    let (status, _) = ctx
        .request("GET", &format!("/v1/boards/{}", board_id), Some(outsider), None)
        .await
        .unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);

    let list = ctx.seed_list("Backlog").await.unwrap();
    let (status, _) = ctx
        .request(
            "POST",
            &format!("/v1/lists/{}/tasks", list.id),
            Some(outsider),
            Some(json!({ "content": "sneaky" })),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_member_can_mutate_after_join() {
    let mut ctx = TestContext::new().await.unwrap();
    let board_id = ctx.board.id;
    let outsider = ctx.outsider.id;

    // Outsiders can join any board they know the id of
    let (status, _) = ctx
        .request("POST", &format!("/v1/boards/{}/join", board_id), Some(outsider), None)
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);

    // Joining again is a no-op that still succeeds
    let (status, _) = ctx
        .request("POST", &format!("/v1/boards/{}/join", board_id), Some(outsider), None)
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);

    let (status, body) = ctx
        .request(
            "POST",
            &format!("/v1/boards/{}/lists", board_id),
            Some(outsider),
            Some(json!({ "title": "New Member Ideas" })),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "New Member Ideas");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_delete_board_requires_owner() {
    let mut ctx = TestContext::new().await.unwrap();
    let board_id = ctx.board.id;
    let member = ctx.member.id;
    let owner = ctx.owner.id;

    let (status, _) = ctx
        .request("DELETE", &format!("/v1/boards/{}", board_id), Some(member), None)
        .await
        .unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx
        .request("DELETE", &format!("/v1/boards/{}", board_id), Some(owner), None)
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_empty_title_fails_validation() {
    let mut ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx
        .request("POST", "/v1/boards", Some(ctx.owner.id), Some(json!({ "title": "" })))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_task_creation_logs_activity() {
    let mut ctx = TestContext::new().await.unwrap();
    let board_id = ctx.board.id;
    let owner = ctx.owner.id;
    let list = ctx.seed_list("Doing").await.unwrap();

    let (status, task) = ctx
        .request(
            "POST",
            &format!("/v1/lists/{}/tasks", list.id),
            Some(owner),
            Some(json!({ "content": "ship it" })),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    // Creator becomes the initial assignee
    assert_eq!(task["assignee_id"], owner.to_string());

    let (status, page) = ctx
        .request(
            "GET",
            &format!("/v1/boards/{}/activities?page=1&page_size=20", board_id),
            Some(owner),
            None,
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    let items = page["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["action"], "created task \"ship it\"");
    assert_eq!(items[0]["user_name"], "Test Owner");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_reorder_persists_and_fans_out() {
    let mut ctx = TestContext::new().await.unwrap();
    let board_id = ctx.board.id;
    let owner = ctx.owner.id;

    let todo = ctx.seed_list("Todo").await.unwrap();
    let done = ctx.seed_list("Done").await.unwrap();
    let t1 = ctx.seed_task(todo.id, "first").await.unwrap();
    let t2 = ctx.seed_task(todo.id, "second").await.unwrap();

    // A second client sits in the board's room
    let watcher = ConnectionId::new();
    let (_guard, mut events) = ctx.state.hub().join(board_id, watcher);

    // Move "first" to Done; "second" closes the gap
    let (status, _) = ctx
        .request(
            "POST",
            &format!("/v1/boards/{}/reorder", board_id),
            Some(owner),
            Some(json!({
                "updates": [
                    { "task_id": t1.id, "list_id": done.id, "position": 0.0 },
                    { "task_id": t2.id, "list_id": todo.id, "position": 0.0 },
                ]
            })),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);

    // Placements committed
    let moved = Task::find_by_id(&ctx.db, t1.id).await.unwrap().unwrap();
    assert_eq!(moved.list_id, done.id);
    let closed = Task::find_by_id(&ctx.db, t2.id).await.unwrap().unwrap();
    assert_eq!(closed.list_id, todo.id);
    assert_eq!(closed.position, 0.0);

    // The watcher saw the batch, the coarse signal, and the history signal
    let mut names = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let BoardEvent::TaskMoved { updates, .. } = &event {
            assert_eq!(updates.len(), 2);
        }
        names.push(event.name().to_string());
    }
    assert_eq!(names, vec!["task-moved", "board-updated", "activity-updated"]);

    // The cross-list move was logged with the task's prior content
    let (_, page) = ctx
        .request(
            "GET",
            &format!("/v1/boards/{}/activities?page=1&page_size=20", board_id),
            Some(owner),
            None,
        )
        .await
        .unwrap();
    let actions: Vec<&str> = page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["action"].as_str().unwrap())
        .collect();
    assert!(actions.contains(&"moved task \"first\" to another list"));

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_reorder_skips_originating_connection() {
    let mut ctx = TestContext::new().await.unwrap();
    let board_id = ctx.board.id;
    let owner = ctx.owner.id;

    let list = ctx.seed_list("Todo").await.unwrap();
    let task = ctx.seed_task(list.id, "solo").await.unwrap();

    let originator = ConnectionId::new();
    let (_g1, mut origin_events) = ctx.state.hub().join(board_id, originator);
    let watcher = ConnectionId::new();
    let (_g2, mut watcher_events) = ctx.state.hub().join(board_id, watcher);

    // Drive the coordinator directly with the originating connection
    ctx.state
        .coordinator()
        .reorder_tasks(
            owner,
            board_id,
            vec![boardcast_shared::models::task::PositionUpdate {
                task_id: task.id,
                list_id: list.id,
                position: 5.0,
            }],
            Some(originator),
        )
        .await
        .unwrap();

    assert!(origin_events.try_recv().is_err());
    assert!(watcher_events.try_recv().is_ok());

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_activity_pagination() {
    let mut ctx = TestContext::new().await.unwrap();
    let board_id = ctx.board.id;
    let owner = ctx.owner.id;
    let list = ctx.seed_list("Todo").await.unwrap();

    for i in 0..5 {
        let (status, _) = ctx
            .request(
                "POST",
                &format!("/v1/lists/{}/tasks", list.id),
                Some(owner),
                Some(json!({ "content": format!("task {}", i) })),
            )
            .await
            .unwrap();
        assert_eq!(status, StatusCode::OK);
    }

    let (status, page) = ctx
        .request(
            "GET",
            &format!("/v1/boards/{}/activities?page=1&page_size=2", board_id),
            Some(owner),
            None,
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["items"].as_array().unwrap().len(), 2);
    assert_eq!(page["total"], 5);
    assert_eq!(page["total_pages"], 3);
    // Newest first
    assert_eq!(page["items"][0]["action"], "created task \"task 4\"");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_task_history_view() {
    let mut ctx = TestContext::new().await.unwrap();
    let owner = ctx.owner.id;
    let list = ctx.seed_list("Todo").await.unwrap();

    let (_, task) = ctx
        .request(
            "POST",
            &format!("/v1/lists/{}/tasks", list.id),
            Some(owner),
            Some(json!({ "content": "draft" })),
        )
        .await
        .unwrap();
    let task_id = task["id"].as_str().unwrap().to_string();

    let (_, _) = ctx
        .request(
            "PATCH",
            &format!("/v1/tasks/{}/content", task_id),
            Some(owner),
            Some(json!({ "content": "final" })),
        )
        .await
        .unwrap();

    let (status, entries) = ctx
        .request(
            "GET",
            &format!("/v1/tasks/{}/activities?limit=10", task_id),
            Some(owner),
            None,
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["action"], "updated task to \"final\"");
    assert_eq!(entries[1]["action"], "created task \"draft\"");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_deleting_list_removes_tasks_and_history() {
    let mut ctx = TestContext::new().await.unwrap();
    let board_id = ctx.board.id;
    let owner = ctx.owner.id;
    let list = ctx.seed_list("Doomed").await.unwrap();

    let mut task_ids = Vec::new();
    for content in ["alpha", "beta"] {
        let (status, task) = ctx
            .request(
                "POST",
                &format!("/v1/lists/{}/tasks", list.id),
                Some(owner),
                Some(json!({ "content": content })),
            )
            .await
            .unwrap();
        assert_eq!(status, StatusCode::OK);
        task_ids.push(task["id"].as_str().unwrap().parse::<uuid::Uuid>().unwrap());
    }

    let watcher = ConnectionId::new();
    let (_guard, mut events) = ctx.state.hub().join(board_id, watcher);

    let (status, _) = ctx
        .request("DELETE", &format!("/v1/lists/{}", list.id), Some(owner), None)
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);

    // The list's tasks went with it
    for task_id in task_ids {
        assert!(Task::find_by_id(&ctx.db, task_id).await.unwrap().is_none());
    }

    // So did their history
    let (_, page) = ctx
        .request(
            "GET",
            &format!("/v1/boards/{}/activities?page=1&page_size=20", board_id),
            Some(owner),
            None,
        )
        .await
        .unwrap();
    assert_eq!(page["total"], 0);

    let mut names = Vec::new();
    while let Ok(event) = events.try_recv() {
        names.push(event.name().to_string());
    }
    assert_eq!(names, vec!["list-deleted", "board-updated", "activity-updated"]);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_deleting_task_removes_history() {
    let mut ctx = TestContext::new().await.unwrap();
    let board_id = ctx.board.id;
    let owner = ctx.owner.id;
    let list = ctx.seed_list("Todo").await.unwrap();

    let (_, task) = ctx
        .request(
            "POST",
            &format!("/v1/lists/{}/tasks", list.id),
            Some(owner),
            Some(json!({ "content": "doomed" })),
        )
        .await
        .unwrap();
    let task_id = task["id"].as_str().unwrap().to_string();

    let (status, _) = ctx
        .request("DELETE", &format!("/v1/tasks/{}", task_id), Some(owner), None)
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);

    let (_, page) = ctx
        .request(
            "GET",
            &format!("/v1/boards/{}/activities?page=1&page_size=20", board_id),
            Some(owner),
            None,
        )
        .await
        .unwrap();
    assert_eq!(page["total"], 0);

    ctx.cleanup().await.unwrap();
}
