//! Generic CRUD routing.
//!
//! Every entity implements [`Resource`] and declares which operations it
//! exposes; [`resource_routes`] mounts exactly those handlers:
//!
//! | Method | Path            | Operation  |
//! |--------|-----------------|------------|
//! | GET    | collection      | `list`     |
//! | POST   | collection      | `create`   |
//! | GET    | collection/{id} | `retrieve` |
//! | PATCH  | collection/{id} | `update`   |
//! | DELETE | collection/{id} | `destroy`  |

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::State,
    http::{Method, StatusCode, Uri},
    routing::MethodRouter,
    Json, Router,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppQuery, ItemPath, Scoped};
use crate::core::permissions::Permission;
use crate::features::auth::guards::{deny, Guard};
use crate::features::auth::model::{Actor, AuthenticatedUser};
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// Which verbs a resource answers; the rest are not routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operations {
    pub list: bool,
    pub retrieve: bool,
    pub create: bool,
    pub update: bool,
    pub destroy: bool,
}

impl Operations {
    pub const ALL: Self = Self {
        list: true,
        retrieve: true,
        create: true,
        update: true,
        destroy: true,
    };

    pub const LIST_CREATE_DESTROY: Self = Self {
        list: true,
        retrieve: false,
        create: true,
        update: false,
        destroy: true,
    };

    fn has_item_routes(&self) -> bool {
        self.retrieve || self.update || self.destroy
    }
}

/// Scope of a top-level collection (no path parameters)
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Unscoped {}

/// Filter type for resources without query filters
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct NoFilter {}

/// Create/update payload for operations a resource does not expose
#[derive(Debug, Deserialize, Validate)]
pub struct Unsupported {}

#[async_trait]
pub trait Resource: Send + Sync + Sized + 'static {
    /// Path parameters of the collection route
    type Scope: DeserializeOwned + Default + Send + Sync + 'static;
    /// Path parameters of the item route (scope included)
    type Key: DeserializeOwned + Send + Sync + 'static;
    type Filter: DeserializeOwned + Send + Sync + 'static;
    type Create: DeserializeOwned + Validate + Send + 'static;
    type Update: DeserializeOwned + Validate + Send + 'static;
    type Output: Serialize + Send + 'static;
    type Permission: Permission + Default;

    /// Human readable name used in error messages
    const NAME: &'static str;
    const OPERATIONS: Operations;

    async fn list(
        &self,
        scope: &Self::Scope,
        filter: &Self::Filter,
        page: &PaginationQuery,
    ) -> Result<(Vec<Self::Output>, i64)>;

    async fn retrieve(&self, _key: &Self::Key) -> Result<Self::Output> {
        Err(not_supported::<Self>("retrieve"))
    }

    async fn create(
        &self,
        _actor: &AuthenticatedUser,
        _scope: &Self::Scope,
        _input: Self::Create,
    ) -> Result<Self::Output> {
        Err(not_supported::<Self>("create"))
    }

    async fn update(&self, _key: &Self::Key, _input: Self::Update) -> Result<Self::Output> {
        Err(not_supported::<Self>("update"))
    }

    async fn destroy(&self, _key: &Self::Key) -> Result<()> {
        Err(not_supported::<Self>("destroy"))
    }

    /// Author of the object for object-level permission checks.
    /// Must fail with `NotFound` when the object does not exist.
    async fn owner(&self, _key: &Self::Key) -> Result<Option<i64>> {
        Ok(None)
    }
}

fn not_supported<R: Resource>(operation: &str) -> AppError {
    AppError::MethodNotAllowed(format!("{} does not support {}", R::NAME, operation))
}

/// Mount the operations `R` declares under the given collection and item paths.
pub fn resource_routes<R: Resource>(
    collection_path: &str,
    item_path: &str,
    resource: Arc<R>,
) -> Router {
    let ops = R::OPERATIONS;

    let mut collection: MethodRouter<Arc<R>> = MethodRouter::new();
    if ops.list {
        collection = collection.get(list_handler::<R>);
    }
    if ops.create {
        collection = collection.post(create_handler::<R>);
    }

    let mut router = Router::new().route(collection_path, collection.fallback(method_not_allowed));

    if ops.has_item_routes() {
        let mut item: MethodRouter<Arc<R>> = MethodRouter::new();
        if ops.retrieve {
            item = item.get(retrieve_handler::<R>);
        }
        if ops.update {
            item = item.patch(update_handler::<R>);
        }
        if ops.destroy {
            item = item.delete(destroy_handler::<R>);
        }
        router = router.route(item_path, item.fallback(method_not_allowed));
    }

    router.with_state(resource)
}

/// Fallback for verbs a route does not answer, in the JSON error envelope
pub async fn method_not_allowed(method: Method, uri: Uri) -> AppError {
    AppError::MethodNotAllowed(format!("Method {} is not allowed on {}", method, uri.path()))
}

async fn authorize_object<R: Resource>(
    resource: &R,
    actor: &Actor,
    method: &Method,
    key: &R::Key,
) -> Result<()> {
    let owner = resource.owner(key).await?;
    if !R::Permission::default().has_object_permission(actor, method, owner) {
        return Err(deny(actor));
    }
    Ok(())
}

fn require_user(actor: Actor) -> Result<AuthenticatedUser> {
    match actor {
        Actor::User(user) => Ok(user),
        Actor::Anonymous => Err(AppError::Unauthorized(
            "Authentication credentials were not provided".to_string(),
        )),
    }
}

async fn list_handler<R: Resource>(
    State(resource): State<Arc<R>>,
    Guard(_actor, _): Guard<R::Permission>,
    Scoped(scope): Scoped<R::Scope>,
    AppQuery(filter): AppQuery<R::Filter>,
    AppQuery(page): AppQuery<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<R::Output>>>> {
    let (items, total) = resource.list(&scope, &filter, &page).await?;
    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta::paginated(total, &page)),
    )))
}

async fn retrieve_handler<R: Resource>(
    State(resource): State<Arc<R>>,
    Guard(_actor, _): Guard<R::Permission>,
    ItemPath(key): ItemPath<R::Key>,
) -> Result<Json<ApiResponse<R::Output>>> {
    let item = resource.retrieve(&key).await?;
    Ok(Json(ApiResponse::success(Some(item), None, None)))
}

async fn create_handler<R: Resource>(
    State(resource): State<Arc<R>>,
    Guard(actor, _): Guard<R::Permission>,
    Scoped(scope): Scoped<R::Scope>,
    AppJson(input): AppJson<R::Create>,
) -> Result<(StatusCode, Json<ApiResponse<R::Output>>)> {
    let user = require_user(actor)?;
    input.validate()?;

    let created = resource.create(&user, &scope, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(created), None, None)),
    ))
}

async fn update_handler<R: Resource>(
    State(resource): State<Arc<R>>,
    Guard(actor, _): Guard<R::Permission>,
    ItemPath(key): ItemPath<R::Key>,
    AppJson(input): AppJson<R::Update>,
) -> Result<Json<ApiResponse<R::Output>>> {
    authorize_object(resource.as_ref(), &actor, &Method::PATCH, &key).await?;
    input.validate()?;

    let updated = resource.update(&key, input).await?;
    Ok(Json(ApiResponse::success(Some(updated), None, None)))
}

async fn destroy_handler<R: Resource>(
    State(resource): State<Arc<R>>,
    Guard(actor, _): Guard<R::Permission>,
    ItemPath(key): ItemPath<R::Key>,
) -> Result<StatusCode> {
    authorize_object(resource.as_ref(), &actor, &Method::DELETE, &key).await?;

    resource.destroy(&key).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use axum_test::TestServer;
    use fake::{faker::lorem::en::Sentence, Fake};
    use serde_json::{json, Value};

    use super::*;
    use crate::core::permissions::{ReadOnlyOrAdmin, ReadOnlyOrAuthorOrStaff};
    use crate::features::users::models::Role;
    use crate::shared::test_helpers::{create_superuser, create_user, with_auth};

    #[derive(Debug, Clone, Serialize)]
    struct Note {
        id: i64,
        author_id: i64,
        text: String,
    }

    #[derive(Debug, Deserialize, Validate)]
    struct NoteInput {
        #[validate(length(min = 1, max = 20))]
        text: String,
    }

    #[derive(Debug, Deserialize)]
    struct NoteKey {
        id: i64,
    }

    #[derive(Default)]
    struct Notes {
        items: Mutex<Vec<Note>>,
    }

    impl Notes {
        fn with(notes: Vec<Note>) -> Arc<Self> {
            Arc::new(Self {
                items: Mutex::new(notes),
            })
        }

        fn find(&self, id: i64) -> Result<Note> {
            self.items
                .lock()
                .unwrap()
                .iter()
                .find(|n| n.id == id)
                .cloned()
                .ok_or_else(|| AppError::NotFound(format!("Note {} not found", id)))
        }
    }

    #[async_trait]
    impl Resource for Notes {
        type Scope = Unscoped;
        type Key = NoteKey;
        type Filter = NoFilter;
        type Create = NoteInput;
        type Update = NoteInput;
        type Output = Note;
        type Permission = ReadOnlyOrAuthorOrStaff;

        const NAME: &'static str = "Note";
        const OPERATIONS: Operations = Operations::ALL;

        async fn list(
            &self,
            _scope: &Unscoped,
            _filter: &NoFilter,
            page: &PaginationQuery,
        ) -> Result<(Vec<Note>, i64)> {
            let items = self.items.lock().unwrap();
            let page_items = items
                .iter()
                .skip(page.offset() as usize)
                .take(page.limit() as usize)
                .cloned()
                .collect();
            Ok((page_items, items.len() as i64))
        }

        async fn retrieve(&self, key: &NoteKey) -> Result<Note> {
            self.find(key.id)
        }

        async fn create(
            &self,
            actor: &AuthenticatedUser,
            _scope: &Unscoped,
            input: NoteInput,
        ) -> Result<Note> {
            let mut items = self.items.lock().unwrap();
            let note = Note {
                id: items.len() as i64 + 1,
                author_id: actor.id,
                text: input.text,
            };
            items.push(note.clone());
            Ok(note)
        }

        async fn update(&self, key: &NoteKey, input: NoteInput) -> Result<Note> {
            let mut items = self.items.lock().unwrap();
            let note = items
                .iter_mut()
                .find(|n| n.id == key.id)
                .ok_or_else(|| AppError::NotFound("Note not found".to_string()))?;
            note.text = input.text;
            Ok(note.clone())
        }

        async fn destroy(&self, key: &NoteKey) -> Result<()> {
            self.items.lock().unwrap().retain(|n| n.id != key.id);
            Ok(())
        }

        async fn owner(&self, key: &NoteKey) -> Result<Option<i64>> {
            Ok(Some(self.find(key.id)?.author_id))
        }
    }

    /// Admin-only writes, list/create/destroy only
    struct Tags(Notes);

    #[async_trait]
    impl Resource for Tags {
        type Scope = Unscoped;
        type Key = NoteKey;
        type Filter = NoFilter;
        type Create = NoteInput;
        type Update = Unsupported;
        type Output = Note;
        type Permission = ReadOnlyOrAdmin;

        const NAME: &'static str = "Tag";
        const OPERATIONS: Operations = Operations::LIST_CREATE_DESTROY;

        async fn list(
            &self,
            scope: &Unscoped,
            filter: &NoFilter,
            page: &PaginationQuery,
        ) -> Result<(Vec<Note>, i64)> {
            self.0.list(scope, filter, page).await
        }

        async fn create(
            &self,
            actor: &AuthenticatedUser,
            scope: &Unscoped,
            input: NoteInput,
        ) -> Result<Note> {
            self.0.create(actor, scope, input).await
        }

        async fn destroy(&self, key: &NoteKey) -> Result<()> {
            self.0.find(key.id)?;
            self.0.destroy(key).await
        }
    }

    fn seeded_notes() -> Arc<Notes> {
        Notes::with(vec![
            Note {
                id: 1,
                author_id: 1,
                text: "first".to_string(),
            },
            Note {
                id: 2,
                author_id: 2,
                text: "second".to_string(),
            },
        ])
    }

    fn notes_server(notes: Arc<Notes>, user: Option<AuthenticatedUser>) -> TestServer {
        let router = resource_routes("/notes", "/notes/{id}", notes);
        let router = match user {
            Some(user) => with_auth(router, user),
            None => router,
        };
        TestServer::new(router).unwrap()
    }

    fn tags_server(user: Option<AuthenticatedUser>) -> TestServer {
        let router = resource_routes("/tags", "/tags/{id}", Arc::new(Tags(Notes::default())));
        let router = match user {
            Some(user) => with_auth(router, user),
            None => router,
        };
        TestServer::new(router).unwrap()
    }

    #[tokio::test]
    async fn test_anonymous_can_list_and_retrieve() {
        let server = notes_server(seeded_notes(), None);

        let response = server.get("/notes").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"].as_array().unwrap().len(), 2);
        assert_eq!(body["meta"]["total"], 2);

        let response = server.get("/notes/2").await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["data"]["text"], "second");
    }

    #[tokio::test]
    async fn test_list_is_paginated() {
        let server = notes_server(seeded_notes(), None);

        let body: Value = server
            .get("/notes")
            .add_query_param("page", 2)
            .add_query_param("page_size", 1)
            .await
            .json();

        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["id"], 2);
        assert_eq!(body["meta"]["page"], 2);
        assert_eq!(body["meta"]["page_size"], 1);
    }

    #[tokio::test]
    async fn test_huge_page_returns_empty_list() {
        let server = notes_server(seeded_notes(), None);

        let response = server
            .get("/notes")
            .add_query_param("page", i64::MAX)
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert!(body["data"].as_array().unwrap().is_empty());
        assert_eq!(body["meta"]["total"], 2);
    }

    #[tokio::test]
    async fn test_anonymous_write_is_unauthorized() {
        let server = notes_server(seeded_notes(), None);

        server
            .post("/notes")
            .json(&json!({"text": "hello"}))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .delete("/notes/1")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_authenticated_create_records_author() {
        let server = notes_server(seeded_notes(), Some(create_user(7, Role::User)));
        let text: String = Sentence(1..3).fake::<String>().chars().take(20).collect();

        let response = server.post("/notes").json(&json!({ "text": text })).await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["data"]["author_id"], 7);
        assert_eq!(body["data"]["text"], text.as_str());
    }

    #[tokio::test]
    async fn test_invalid_payload_is_rejected() {
        let server = notes_server(seeded_notes(), Some(create_user(7, Role::User)));

        let response = server.post("/notes").json(&json!({ "text": "" })).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["success"], false);

        server
            .post("/notes")
            .json(&json!({ "text": "x".repeat(21) }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        server
            .post("/notes")
            .json(&json!({ "body": "wrong field" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_non_author_cannot_modify() {
        let notes = seeded_notes();
        let server = notes_server(Arc::clone(&notes), Some(create_user(2, Role::User)));

        server
            .patch("/notes/1")
            .json(&json!({ "text": "hijacked" }))
            .await
            .assert_status(StatusCode::FORBIDDEN);
        server
            .delete("/notes/1")
            .await
            .assert_status(StatusCode::FORBIDDEN);

        assert_eq!(notes.find(1).unwrap().text, "first");
    }

    #[tokio::test]
    async fn test_author_and_moderator_can_modify() {
        let notes = seeded_notes();

        let author = notes_server(Arc::clone(&notes), Some(create_user(1, Role::User)));
        author
            .patch("/notes/1")
            .json(&json!({ "text": "edited" }))
            .await
            .assert_status_ok();
        assert_eq!(notes.find(1).unwrap().text, "edited");

        let moderator = notes_server(Arc::clone(&notes), Some(create_user(5, Role::Moderator)));
        moderator
            .delete("/notes/2")
            .await
            .assert_status(StatusCode::NO_CONTENT);
        assert!(notes.find(2).is_err());
    }

    #[tokio::test]
    async fn test_missing_object_is_not_found_before_permission() {
        let server = notes_server(seeded_notes(), Some(create_user(2, Role::User)));

        server
            .delete("/notes/42")
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .get("/notes/not-a-number")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_admin_only_resource() {
        tags_server(None)
            .post("/tags")
            .json(&json!({ "text": "rock" }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        tags_server(Some(create_user(1, Role::User)))
            .post("/tags")
            .json(&json!({ "text": "rock" }))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        tags_server(Some(create_user(2, Role::Moderator)))
            .post("/tags")
            .json(&json!({ "text": "rock" }))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        let admin = tags_server(Some(create_user(3, Role::Admin)));
        admin
            .post("/tags")
            .json(&json!({ "text": "rock" }))
            .await
            .assert_status(StatusCode::CREATED);
        admin.get("/tags").await.assert_status_ok();
        admin
            .delete("/tags/1")
            .await
            .assert_status(StatusCode::NO_CONTENT);

        tags_server(Some(create_superuser()))
            .post("/tags")
            .json(&json!({ "text": "jazz" }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_undeclared_operations_are_not_routed() {
        let admin = tags_server(Some(create_user(3, Role::Admin)));

        admin
            .get("/tags/1")
            .await
            .assert_status(StatusCode::METHOD_NOT_ALLOWED);
        let response = admin.patch("/tags/1").json(&json!({})).await;
        response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().unwrap().contains("PATCH"));

        admin
            .put("/tags")
            .json(&json!({ "text": "rock" }))
            .await
            .assert_status(StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_malformed_query_uses_error_envelope() {
        let server = notes_server(seeded_notes(), None);

        let response = server.get("/notes").add_query_param("page", "abc").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid query parameters"));
    }
}
