use serde_json::json;
use trusty_rusty_todo_web::backend::{
    AppSyncClient, AuthMode, BackendError, BackendQueryError, TodoBackend,
};
use trusty_rusty_todo_web::models::CreateTodoInput;
use trusty_rusty_todo_web::session::Session;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client(server: &MockServer) -> AppSyncClient {
    AppSyncClient::new(format!("{}/graphql", server.uri()), "da2-test-key").unwrap()
}

#[tokio::test]
async fn test_list_todos_with_api_key() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("x-api-key", "da2-test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "listTodos": {
                    "items": [
                        {"id": "1", "name": "Buy milk", "description": "2% milk",
                         "createdAt": "2021-03-01T10:00:00.000Z", "updatedAt": "2021-03-01T10:00:00.000Z"},
                        {"id": "2", "name": "Walk dog", "description": null}
                    ],
                    "nextToken": null
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let todos = client(&server).await.list_todos(&AuthMode::ApiKey).await.unwrap();
    assert_eq!(todos.len(), 2);
    assert_eq!(todos[0].name, "Buy milk");
    assert!(todos[0].created_at.is_some());
    assert_eq!(todos[1].description, "");
}

#[tokio::test]
async fn test_list_todos_graphql_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"listTodos": null},
            "errors": [{"message": "Not Authorized to access listTodos on type Query", "errorType": "Unauthorized"}]
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .await
        .list_todos(&AuthMode::ApiKey)
        .await
        .unwrap_err();
    match err {
        BackendQueryError::Backend(BackendError::GraphQl(errors)) => {
            assert_eq!(
                errors.first_message(),
                "Not Authorized to access listTodos on type Query"
            );
        }
        other => panic!("expected GraphQL error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_list_todos_http_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let err = client(&server)
        .await
        .list_todos(&AuthMode::ApiKey)
        .await
        .unwrap_err();
    match err {
        BackendQueryError::Backend(BackendError::Status { status, body }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "unavailable");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_todo_with_user_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("authorization", "user-access-token"))
        .and(body_partial_json(json!({
            "variables": {"input": {"name": "Buy milk", "description": "2% milk"}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"createTodo": {"id": "abc123", "name": "Buy milk", "description": "2% milk"}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let input = CreateTodoInput::new("Buy milk".to_string(), "2% milk".to_string()).unwrap();
    let auth = AuthMode::UserPool(Session::new("alice", "user-access-token"));
    let todo = client(&server).await.create_todo(&input, &auth).await.unwrap();
    assert_eq!(todo.id, "abc123");
}

#[tokio::test]
async fn test_create_todo_reports_first_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"createTodo": null},
            "errors": [
                {"message": "Invalid input", "path": ["createTodo"], "errorType": "DynamoDB:ConditionalCheckFailedException"},
                {"message": "Second failure"}
            ]
        })))
        .mount(&server)
        .await;

    let input = CreateTodoInput::new("x".to_string(), String::new()).unwrap();
    let auth = AuthMode::UserPool(Session::new("alice", "token"));
    let err = client(&server).await.create_todo(&input, &auth).await.unwrap_err();
    assert_eq!(err.message(), "Invalid input");
    assert_eq!(err.errors().map(|e| e.len()), Some(2));
}

#[tokio::test]
async fn test_unauthorized_status_with_error_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "errors": [{"errorType": "UnauthorizedException", "message": "Valid authorization header not provided."}]
        })))
        .mount(&server)
        .await;

    let input = CreateTodoInput::new("x".to_string(), String::new()).unwrap();
    let auth = AuthMode::UserPool(Session::new("alice", "expired"));
    let err = client(&server).await.create_todo(&input, &auth).await.unwrap_err();
    assert_eq!(err.message(), "Valid authorization header not provided.");
}

#[tokio::test]
async fn test_get_todo_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(json!({"variables": {"id": "missing"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"getTodo": null}
        })))
        .mount(&server)
        .await;

    let todo = client(&server)
        .await
        .get_todo("missing", &AuthMode::ApiKey)
        .await
        .unwrap();
    assert!(todo.is_none());
}
