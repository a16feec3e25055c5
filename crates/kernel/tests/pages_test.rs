#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Navigation tree, breadcrumbs, menu registration and page saving against
//! the in-memory content store.

use std::collections::{BTreeMap, HashMap, HashSet};

use uuid::Uuid;

use folio_kernel::content_store::ContentStore;
use folio_kernel::menu::{Breadcrumbs, MenuRegistry};
use folio_kernel::models::{AccessLevel, ContainerKind, Page};
use folio_kernel::pages::{
    PAGES_NAV_MENU, SaveError, TreeEntry, navigation_tree, parent_breadcrumbs,
    prepare_parent_breadcrumbs, register_navigation_tree, save_page,
};
use folio_test_utils::{MemoryContentStore, test_page};

/// Group with two top-level pages:
///
/// ```text
/// Alpha
/// ├── Alpha 1
/// │   └── Alpha 1a
/// └── Alpha 2
///     └── Alpha 2a
/// Beta
/// ```
struct Fixture {
    store: MemoryContentStore,
    container: Uuid,
    pages: HashMap<&'static str, Page>,
}

impl Fixture {
    fn new() -> Self {
        let store = MemoryContentStore::new();
        let container = store.add_container(ContainerKind::Group);
        let mut pages = HashMap::new();

        let alpha = store.add_page(test_page(container, "Alpha"));
        let alpha1 = store.add_page(test_page(container, "Alpha 1").with_parent(alpha.id));
        let alpha2 = store.add_page(test_page(container, "Alpha 2").with_parent(alpha.id));
        let alpha1a = store.add_page(test_page(container, "Alpha 1a").with_parent(alpha1.id));
        let alpha2a = store.add_page(test_page(container, "Alpha 2a").with_parent(alpha2.id));
        let beta = store.add_page(test_page(container, "Beta"));

        pages.insert("alpha", alpha);
        pages.insert("alpha1", alpha1);
        pages.insert("alpha2", alpha2);
        pages.insert("alpha1a", alpha1a);
        pages.insert("alpha2a", alpha2a);
        pages.insert("beta", beta);

        Self {
            store,
            container,
            pages,
        }
    }

    fn id(&self, name: &str) -> Uuid {
        self.pages[name].id
    }
}

fn titles(tree: &[TreeEntry]) -> Vec<&str> {
    tree.iter().map(|e| e.title.as_str()).collect()
}

// =============================================================================
// Navigation tree
// =============================================================================

#[tokio::test]
async fn unknown_container_yields_empty_tree() {
    let fixture = Fixture::new();
    let tree = navigation_tree(&fixture.store, Uuid::now_v7()).await.unwrap();
    assert!(tree.is_empty());

    // A page ID is not a container either.
    let tree = navigation_tree(&fixture.store, fixture.id("alpha"))
        .await
        .unwrap();
    assert!(tree.is_empty());
}

#[tokio::test]
async fn empty_container_yields_empty_tree() {
    let store = MemoryContentStore::new();
    let container = store.add_container(ContainerKind::User);
    assert!(navigation_tree(&store, container).await.unwrap().is_empty());
}

#[tokio::test]
async fn subtrees_are_emitted_as_blocks_in_stack_order() {
    let fixture = Fixture::new();
    let tree = navigation_tree(&fixture.store, fixture.container)
        .await
        .unwrap();

    // Siblings come out in store order; the last-pushed sibling's subtree is
    // expanded first.
    assert_eq!(
        titles(&tree),
        ["Alpha", "Alpha 1", "Alpha 2", "Alpha 2a", "Alpha 1a", "Beta"]
    );
}

#[tokio::test]
async fn depth_and_parent_follow_the_hierarchy() {
    let fixture = Fixture::new();
    let tree = navigation_tree(&fixture.store, fixture.container)
        .await
        .unwrap();

    let by_id: HashMap<Uuid, &TreeEntry> = tree.iter().map(|e| (e.id, e)).collect();
    assert_eq!(by_id.len(), tree.len(), "each page appears once");

    for entry in &tree {
        match entry.parent_id {
            None => assert_eq!(entry.depth, 0, "{} is top-level", entry.title),
            Some(parent) => {
                let parent = by_id[&parent];
                assert_eq!(entry.depth, parent.depth + 1, "{}", entry.title);
            }
        }
        assert_eq!(entry.url, format!("/pages/view/{}", entry.id));
    }

    assert_eq!(by_id[&fixture.id("alpha1a")].depth, 2);
    assert_eq!(
        by_id[&fixture.id("alpha1a")].parent_id,
        Some(fixture.id("alpha1"))
    );
}

#[tokio::test]
async fn every_top_level_subtree_is_contiguous() {
    let fixture = Fixture::new();
    let tree = navigation_tree(&fixture.store, fixture.container)
        .await
        .unwrap();

    let roots: Vec<usize> = tree
        .iter()
        .enumerate()
        .filter(|(_, e)| e.depth == 0)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(roots, [0, 5]);
}

#[tokio::test]
async fn non_page_nodes_are_left_out() {
    let fixture = Fixture::new();
    fixture
        .store
        .add_page(test_page(fixture.container, "Blog post").with_kind("blog"));
    fixture.store.add_page(
        test_page(fixture.container, "Comment")
            .with_kind("comment")
            .with_parent(fixture.id("beta")),
    );

    let tree = navigation_tree(&fixture.store, fixture.container)
        .await
        .unwrap();
    assert_eq!(tree.len(), 6);
    assert!(titles(&tree).iter().all(|t| *t != "Blog post" && *t != "Comment"));
}

#[tokio::test]
async fn pages_from_other_containers_are_left_out() {
    let fixture = Fixture::new();
    let other = fixture.store.add_container(ContainerKind::Group);
    fixture.store.add_page(test_page(other, "Elsewhere"));

    let tree = navigation_tree(&fixture.store, fixture.container)
        .await
        .unwrap();
    assert!(!titles(&tree).contains(&"Elsewhere"));
}

#[tokio::test]
async fn a_page_reached_twice_is_emitted_once() {
    let fixture = Fixture::new();
    // The same node linked under a second parent.
    let shared = fixture.store.add_page(
        test_page(fixture.container, "Shared").with_parent(fixture.id("alpha2a")),
    );
    fixture.store.add_page(
        test_page(fixture.container, "Shared")
            .with_id(shared.id)
            .with_parent(fixture.id("beta")),
    );

    let tree = navigation_tree(&fixture.store, fixture.container)
        .await
        .unwrap();

    let ids: Vec<Uuid> = tree.iter().map(|e| e.id).collect();
    let unique: HashSet<Uuid> = ids.iter().copied().collect();
    assert_eq!(ids.len(), unique.len());
    assert_eq!(ids.iter().filter(|id| **id == shared.id).count(), 1);
}

// =============================================================================
// Breadcrumbs
// =============================================================================

#[tokio::test]
async fn breadcrumbs_list_ancestors_outermost_first() {
    let fixture = Fixture::new();
    let leaf = &fixture.pages["alpha1a"];

    let crumbs = parent_breadcrumbs(&fixture.store, leaf).await.unwrap();
    let texts: Vec<&str> = crumbs.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, ["Alpha", "Alpha 1"]);
    assert_eq!(
        crumbs[0].href.as_deref(),
        Some(format!("/pages/view/{}", fixture.id("alpha")).as_str())
    );
}

#[tokio::test]
async fn top_level_page_has_no_parent_breadcrumbs() {
    let fixture = Fixture::new();
    let crumbs = parent_breadcrumbs(&fixture.store, &fixture.pages["beta"])
        .await
        .unwrap();
    assert!(crumbs.is_empty());
}

#[tokio::test]
async fn breadcrumbs_stop_at_a_non_page_parent() {
    let fixture = Fixture::new();
    let blog = fixture
        .store
        .add_page(test_page(fixture.container, "Blog").with_kind("blog"));
    let mid = fixture
        .store
        .add_page(test_page(fixture.container, "Mid").with_parent(blog.id));
    let leaf = fixture
        .store
        .add_page(test_page(fixture.container, "Leaf").with_parent(mid.id));

    let crumbs = parent_breadcrumbs(&fixture.store, &leaf).await.unwrap();
    let texts: Vec<&str> = crumbs.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, ["Mid"]);
}

#[tokio::test]
async fn breadcrumbs_stop_at_a_missing_parent() {
    let fixture = Fixture::new();
    let orphan = fixture
        .store
        .add_page(test_page(fixture.container, "Orphan").with_parent(Uuid::now_v7()));

    let crumbs = parent_breadcrumbs(&fixture.store, &orphan).await.unwrap();
    assert!(crumbs.is_empty());
}

#[tokio::test]
async fn cyclic_ancestry_terminates() {
    let store = MemoryContentStore::new();
    let container = store.add_container(ContainerKind::Group);
    let a_id = Uuid::now_v7();
    let b_id = Uuid::now_v7();
    let a = store.add_page(test_page(container, "A").with_id(a_id).with_parent(b_id));
    store.add_page(test_page(container, "B").with_id(b_id).with_parent(a_id));

    let crumbs = parent_breadcrumbs(&store, &a).await.unwrap();
    let texts: Vec<&str> = crumbs.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, ["B"]);
}

#[tokio::test]
async fn prepare_parent_breadcrumbs_appends_to_trail() {
    let fixture = Fixture::new();
    let mut trail = Breadcrumbs::new();
    trail.push("Pages", Some("/pages".to_string()));

    prepare_parent_breadcrumbs(&fixture.store, &fixture.pages["alpha2a"], &mut trail)
        .await
        .unwrap();

    let texts: Vec<&str> = trail.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, ["Pages", "Alpha", "Alpha 2"]);
}

// =============================================================================
// Menu registration
// =============================================================================

#[tokio::test]
async fn navigation_menu_mirrors_the_tree() {
    let fixture = Fixture::new();
    let selected = &fixture.pages["alpha2"];
    let mut menus = MenuRegistry::new();

    register_navigation_tree(&fixture.store, &mut menus, fixture.container, Some(selected))
        .await
        .unwrap();

    let menu = menus.menu(PAGES_NAV_MENU).unwrap();
    assert_eq!(menu.items().len(), 6);

    let roots: Vec<&str> = menu.roots().iter().map(|i| i.text.as_str()).collect();
    assert_eq!(roots, ["Alpha", "Beta"]);

    let item = menu.get(&fixture.id("alpha2a").to_string()).unwrap();
    assert_eq!(
        item.parent_name.as_deref(),
        Some(fixture.id("alpha2").to_string().as_str())
    );

    let chosen = menu.selected().unwrap();
    assert_eq!(chosen.name, selected.id.to_string());
    assert_eq!(menu.items().iter().filter(|i| i.selected).count(), 1);
}

#[tokio::test]
async fn empty_tree_registers_nothing() {
    let store = MemoryContentStore::new();
    let container = store.add_container(ContainerKind::User);
    let mut menus = MenuRegistry::new();

    register_navigation_tree(&store, &mut menus, container, None)
        .await
        .unwrap();
    assert!(menus.items(PAGES_NAV_MENU).is_empty());
}

// =============================================================================
// Saving
// =============================================================================

fn form(fields: &[(&str, &str)]) -> BTreeMap<String, String> {
    fields
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn new_page_is_saved_with_a_revision() {
    let fixture = Fixture::new();
    let author = Uuid::now_v7();
    let container = fixture.container.to_string();
    let parent = fixture.id("beta").to_string();

    let page = save_page(
        &fixture.store,
        author,
        &form(&[
            ("title", "  Setup  "),
            ("description", "How to set up"),
            ("tags", "guide, setup"),
            ("access", "logged_in"),
            ("write_access", "0"),
            ("container_id", &container),
            ("parent_id", &parent),
        ]),
    )
    .await
    .unwrap();

    assert_eq!(page.title, "Setup");
    assert_eq!(page.tags, ["guide", "setup"]);
    assert_eq!(page.access, AccessLevel::LoggedIn);
    assert_eq!(page.write_access, AccessLevel::Private);
    assert_eq!(page.parent_id, Some(fixture.id("beta")));
    assert_eq!(page.owner_id, author);
    assert_eq!(fixture.store.revisions_of(page.id).len(), 1);

    let tree = navigation_tree(&fixture.store, fixture.container)
        .await
        .unwrap();
    let entry = tree.iter().find(|e| e.id == page.id).unwrap();
    assert_eq!(entry.depth, 1);
}

#[tokio::test]
async fn blank_title_is_rejected() {
    let fixture = Fixture::new();
    let container = fixture.container.to_string();
    let result = save_page(
        &fixture.store,
        Uuid::now_v7(),
        &form(&[("title", "   "), ("container_id", &container)]),
    )
    .await;
    assert!(matches!(result, Err(SaveError::MissingTitle)));
}

#[tokio::test]
async fn unknown_container_is_rejected() {
    let fixture = Fixture::new();
    let bogus = Uuid::now_v7().to_string();
    let result = save_page(
        &fixture.store,
        Uuid::now_v7(),
        &form(&[("title", "T"), ("container_id", &bogus)]),
    )
    .await;
    assert!(matches!(result, Err(SaveError::InvalidContainer)));
}

#[tokio::test]
async fn parent_must_be_an_existing_page() {
    let fixture = Fixture::new();
    let container = fixture.container.to_string();
    let missing = Uuid::now_v7().to_string();
    let result = save_page(
        &fixture.store,
        Uuid::now_v7(),
        &form(&[
            ("title", "T"),
            ("container_id", &container),
            ("parent_id", &missing),
        ]),
    )
    .await;
    assert!(matches!(result, Err(SaveError::ParentNotFound)));

    let blog = fixture
        .store
        .add_page(test_page(fixture.container, "Blog").with_kind("blog"));
    let blog_id = blog.id.to_string();
    let result = save_page(
        &fixture.store,
        Uuid::now_v7(),
        &form(&[
            ("title", "T"),
            ("container_id", &container),
            ("parent_id", &blog_id),
        ]),
    )
    .await;
    assert!(matches!(result, Err(SaveError::ParentNotFound)));
}

#[tokio::test]
async fn page_cannot_move_under_itself_or_a_descendant() {
    let fixture = Fixture::new();
    let alpha = fixture.id("alpha").to_string();

    for new_parent in ["alpha", "alpha1", "alpha2a"] {
        let parent = fixture.id(new_parent).to_string();
        let result = save_page(
            &fixture.store,
            Uuid::now_v7(),
            &form(&[("id", &alpha), ("title", "Alpha"), ("parent_id", &parent)]),
        )
        .await;
        assert!(
            matches!(result, Err(SaveError::ParentCycle)),
            "moving under {new_parent}"
        );
    }

    // The hierarchy is untouched.
    assert_eq!(fixture.store.page(fixture.id("alpha")).unwrap().parent_id, None);
}

#[tokio::test]
async fn page_can_move_to_another_branch() {
    let fixture = Fixture::new();
    let alpha1 = fixture.id("alpha1").to_string();
    let beta = fixture.id("beta").to_string();

    let moved = save_page(
        &fixture.store,
        Uuid::now_v7(),
        &form(&[("id", &alpha1), ("title", "Alpha 1"), ("parent_id", &beta)]),
    )
    .await
    .unwrap();
    assert_eq!(moved.parent_id, Some(fixture.id("beta")));
    // Container falls back to the existing page's.
    assert_eq!(moved.container_id, fixture.container);

    let tree = navigation_tree(&fixture.store, fixture.container)
        .await
        .unwrap();
    assert_eq!(
        titles(&tree),
        ["Alpha", "Alpha 2", "Alpha 2a", "Beta", "Alpha 1", "Alpha 1a"]
    );
}

#[tokio::test]
async fn editing_a_missing_page_is_rejected() {
    let fixture = Fixture::new();
    let missing = Uuid::now_v7().to_string();
    let result = save_page(
        &fixture.store,
        Uuid::now_v7(),
        &form(&[("id", &missing), ("title", "T")]),
    )
    .await;
    assert!(matches!(result, Err(SaveError::PageNotFound)));
}

#[tokio::test]
async fn invalid_access_is_rejected() {
    let fixture = Fixture::new();
    let container = fixture.container.to_string();
    let result = save_page(
        &fixture.store,
        Uuid::now_v7(),
        &form(&[
            ("title", "T"),
            ("container_id", &container),
            ("access", "friends"),
        ]),
    )
    .await;
    assert!(matches!(result, Err(SaveError::InvalidField("access"))));
}

#[tokio::test]
async fn store_reports_saved_page() {
    let fixture = Fixture::new();
    let container = fixture.container.to_string();
    let page = save_page(
        &fixture.store,
        Uuid::now_v7(),
        &form(&[("title", "Fresh"), ("container_id", &container)]),
    )
    .await
    .unwrap();

    let loaded = fixture.store.find_page(page.id).await.unwrap().unwrap();
    assert_eq!(loaded, page);
    assert_eq!(loaded.parent_id, None);
}
