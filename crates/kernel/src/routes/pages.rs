//! Page routes: tree, navigation, view, add/edit form values and save.

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::http::Uri;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_sessions::Session;
use tracing::{error, info};
use uuid::Uuid;

use super::helpers::{current_user_id, flash, require_login};
use crate::error::{AppError, AppResult};
use crate::form::StickyForms;
use crate::menu::{Breadcrumbs, MenuItem, MenuRegistry};
use crate::messages::MessageKind;
use crate::models::{Page, PageRevision};
use crate::pages::{
    PAGE_FORM, PAGES_NAV_MENU, PageFormValues, SaveError, TreeEntry, navigation_tree,
    prepare_form_vars, prepare_parent_breadcrumbs, register_navigation_tree, save_page,
};
use crate::state::AppState;

fn owner_url(container_id: Uuid) -> String {
    format!("/pages/owner/{container_id}/tree")
}

async fn load_page(state: &AppState, id: Uuid) -> AppResult<Page> {
    state
        .store()
        .find_page(id)
        .await?
        .filter(Page::is_page)
        .ok_or(AppError::NotFound)
}

/// GET /pages/owner/{container_id}/tree
async fn tree(
    State(state): State<AppState>,
    Path(container_id): Path<Uuid>,
) -> AppResult<Json<Vec<TreeEntry>>> {
    Ok(Json(navigation_tree(state.store(), container_id).await?))
}

#[derive(Debug, Deserialize)]
struct NavigationQuery {
    selected: Option<Uuid>,
}

/// The container's page tree as `pages_nav` menu items.
///
/// GET /pages/owner/{container_id}/navigation?selected=
async fn navigation(
    State(state): State<AppState>,
    Path(container_id): Path<Uuid>,
    Query(query): Query<NavigationQuery>,
) -> AppResult<Json<Vec<MenuItem>>> {
    let selected = match query.selected {
        Some(id) => state.store().find_page(id).await?,
        None => None,
    };

    let mut menus = MenuRegistry::new();
    register_navigation_tree(state.store(), &mut menus, container_id, selected.as_ref())
        .await?;

    Ok(Json(menus.items(PAGES_NAV_MENU).to_vec()))
}

#[derive(Debug, Serialize)]
struct PageView {
    page: Page,
    breadcrumbs: Breadcrumbs,
    navigation: Vec<MenuItem>,
    /// Names of the navigation items to expand to reach this page.
    expanded: Vec<String>,
    subpages: Vec<MenuItem>,
}

/// GET /pages/view/{id}
async fn view(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Json<PageView>> {
    let page = load_page(&state, id).await?;

    let mut breadcrumbs = Breadcrumbs::new();
    breadcrumbs.push("Pages", Some(owner_url(page.container_id)));
    prepare_parent_breadcrumbs(state.store(), &page, &mut breadcrumbs).await?;
    breadcrumbs.push(page.display_name(), None);

    let mut menus = MenuRegistry::new();
    register_navigation_tree(state.store(), &mut menus, page.container_id, Some(&page)).await?;

    let (expanded, subpages) = match menus.menu(PAGES_NAV_MENU) {
        Some(menu) => (
            menu.selected_trail()
                .into_iter()
                .map(|item| item.name.clone())
                .collect(),
            menu.children_of(&page.id.to_string())
                .into_iter()
                .cloned()
                .collect(),
        ),
        None => (Vec::new(), Vec::new()),
    };

    Ok(Json(PageView {
        page,
        breadcrumbs,
        navigation: menus.items(PAGES_NAV_MENU).to_vec(),
        expanded,
        subpages,
    }))
}

/// Hydrate form values, consuming any sticky values left in the session.
async fn form_values(
    session: &Session,
    page: Option<&Page>,
    parent_id: Option<Uuid>,
    revision: Option<&PageRevision>,
    page_owner: Option<Uuid>,
) -> AppResult<PageFormValues> {
    let mut sticky = StickyForms::load(session).await?;
    let values = prepare_form_vars(page, parent_id, revision, page_owner, &mut sticky);
    sticky.save(session).await?;
    Ok(values)
}

#[derive(Debug, Deserialize)]
struct AddQuery {
    parent_id: Option<Uuid>,
}

/// GET /pages/add/{container_id}?parent_id=
async fn add_form(
    State(state): State<AppState>,
    session: Session,
    uri: Uri,
    Path(container_id): Path<Uuid>,
    Query(query): Query<AddQuery>,
) -> Response {
    if let Err(redirect) = require_login(&session, &uri).await {
        return redirect;
    }

    let result: AppResult<PageFormValues> = async {
        if state.store().find_container(container_id).await?.is_none() {
            return Err(AppError::NotFound);
        }
        form_values(&session, None, query.parent_id, None, Some(container_id)).await
    }
    .await;

    match result {
        Ok(values) => Json(values).into_response(),
        Err(e) => e.into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct EditQuery {
    revision: Option<Uuid>,
}

/// GET /pages/edit/{id}?revision=
async fn edit_form(
    State(state): State<AppState>,
    session: Session,
    uri: Uri,
    Path(id): Path<Uuid>,
    Query(query): Query<EditQuery>,
) -> Response {
    if let Err(redirect) = require_login(&session, &uri).await {
        return redirect;
    }

    let result: AppResult<PageFormValues> = async {
        let page = load_page(&state, id).await?;
        let revision = match query.revision {
            Some(revision_id) => state.store().find_revision(revision_id).await?,
            None => None,
        };
        form_values(
            &session,
            Some(&page),
            None,
            revision.as_ref(),
            Some(page.container_id),
        )
        .await
    }
    .await;

    match result {
        Ok(values) => Json(values).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Where to send the user back to after a failed save.
fn form_url(values: &BTreeMap<String, String>) -> String {
    let id = |name: &str| values.get(name).and_then(|v| v.trim().parse::<Uuid>().ok());

    if let Some(page_id) = id("id") {
        return format!("/pages/edit/{page_id}");
    }
    match (id("container_id"), id("parent_id")) {
        (Some(container_id), Some(parent_id)) => {
            format!("/pages/add/{container_id}?parent_id={parent_id}")
        }
        (Some(container_id), None) => format!("/pages/add/{container_id}"),
        (None, _) => "/".to_string(),
    }
}

/// POST /pages/save (form data)
/// - 401 without a logged-in user
/// - 303 to the saved page on success
/// - On failure the submission is kept as sticky form values and the user is
///   sent back to the form
async fn save(
    State(state): State<AppState>,
    session: Session,
    Form(values): Form<BTreeMap<String, String>>,
) -> Response {
    let Some(author_id) = current_user_id(&session).await else {
        return AppError::Unauthorized.into_response();
    };

    match save_page(state.store(), author_id, &values).await {
        Ok(page) => {
            flash(&session, MessageKind::Success, "The page has been saved.").await;
            Redirect::to(&page.url()).into_response()
        }
        Err(e) => {
            let message = match &e {
                SaveError::Store(inner) => {
                    error!(error = %inner, "failed to save page");
                    "The page could not be saved.".to_string()
                }
                other => {
                    info!(reason = %other, "page submission rejected");
                    other.to_string()
                }
            };

            if let Err(e) = keep_sticky(&session, &values).await {
                return AppError::from(e).into_response();
            }
            flash(&session, MessageKind::Error, &message).await;
            Redirect::to(&form_url(&values)).into_response()
        }
    }
}

async fn keep_sticky(session: &Session, values: &BTreeMap<String, String>) -> anyhow::Result<()> {
    let mut sticky = StickyForms::load(session).await?;
    sticky.make_sticky(
        PAGE_FORM,
        values
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    );
    sticky.save(session).await
}

/// Create the pages router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pages/owner/{container_id}/tree", get(tree))
        .route("/pages/owner/{container_id}/navigation", get(navigation))
        .route("/pages/view/{id}", get(view))
        .route("/pages/add/{container_id}", get(add_form))
        .route("/pages/edit/{id}", get(edit_form))
        .route("/pages/save", post(save))
}
