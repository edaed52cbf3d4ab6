//! BDD step definitions for navigation feature

use cucumber::{given, then, when};
use serde_json::{json, Value};

use config_editor::{ConfigEditorError, LinkBuilder, RowAction, SchemaRegistry, ViewTarget};

use crate::world::EditorWorld;

fn parse_action(label: &str) -> RowAction {
    match label {
        "Edit" => RowAction::Edit,
        "Advanced" => RowAction::AdvancedEdit,
        "Delete" => RowAction::Delete,
        other => panic!("Unknown action: {}", other),
    }
}

#[given(expr = "a configuration API at {string}")]
fn configuration_api(world: &mut EditorWorld, base_url: String) {
    world.start(&base_url);
}

#[given(regex = r"^the API lists (\d+) (\w+) (records|templates)$")]
fn api_lists(world: &mut EditorWorld, count: usize, kind: String, listing: String) {
    let registry = SchemaRegistry::builtin().unwrap();
    let descriptor = registry.describe(&kind).unwrap();
    let target = ViewTarget::new(kind.clone(), listing == "templates");
    let key = descriptor.identity_property(target.is_template);

    let records: Vec<Value> = (1..=count)
        .map(|i| {
            json!({
                key: format!("{}-{}", kind, i),
                "meta": {"object_type": kind, "filename": "objects.cfg", "inherited_attributes": {}}
            })
        })
        .collect();
    let url = LinkBuilder::new(&world.base_url).list(&target);
    world
        .api
        .serve_list(url, json!({"success": true, "data": records}));
}

#[when(expr = "I navigate to {string}")]
async fn navigate(world: &mut EditorWorld, token: String) {
    world.last_error = world.editor().on_navigate(&token).await.err();
}

#[when(expr = "I start navigating to {string}")]
fn start_navigation(world: &mut EditorWorld, token: String) {
    let pending = world.editor().begin_navigation(&token).unwrap();
    world.pending.push(pending);
}

#[when("the pending navigations complete in reverse order")]
async fn complete_in_reverse(world: &mut EditorWorld) {
    let http = world.editor().http();
    while let Some(pending) = world.pending.pop() {
        let fetched = pending.fetch(http.as_ref()).await;
        match world.editor().complete_navigation(fetched) {
            Ok(()) => {}
            Err(ConfigEditorError::StaleResponse { .. }) => world.stale_responses += 1,
            Err(other) => panic!("Unexpected navigation error: {}", other),
        }
    }
}

#[when(regex = r#"^I click "(\w+)" on the row (\{.*\})$"#)]
fn click_row_action(world: &mut EditorWorld, label: String, row: String) {
    let row: Value = serde_json::from_str(&row).unwrap();
    let link = world
        .editor()
        .on_row_action(parse_action(&label), row.as_object().unwrap())
        .unwrap();
    world.link = Some(link);
}

#[then(regex = r"^the view shows (\w+) (instances|templates)$")]
fn view_shows(world: &mut EditorWorld, kind: String, listing: String) {
    let view = world.editor().current_view().expect("no view displayed");
    assert_eq!(view.target, ViewTarget::new(kind, listing == "templates"));
}

#[then(expr = "the column bindings are {string}")]
fn column_bindings(world: &mut EditorWorld, expected: String) {
    let bindings: Vec<String> = world
        .editor()
        .widget()
        .columns()
        .iter()
        .map(|c| c.data.clone())
        .collect();
    assert_eq!(bindings.join(", "), expected);
}

#[then(expr = "the column titles are {string}")]
fn column_titles(world: &mut EditorWorld, expected: String) {
    let titles: Vec<String> = world
        .editor()
        .widget()
        .columns()
        .iter()
        .map(|c| c.title.clone())
        .collect();
    assert_eq!(titles.join(", "), expected);
}

#[then(expr = "the list was fetched from {string}")]
fn list_fetched_from(world: &mut EditorWorld, url: String) {
    assert!(
        world.api.requested().contains(&url),
        "Expected a request to '{}', got {:?}",
        url,
        world.api.requested()
    );
}

#[then(regex = r"^the table has (\d+) rows?$")]
fn table_rows(world: &mut EditorWorld, count: usize) {
    assert_eq!(world.editor().widget().row_count(), count);
}

#[then(expr = "the navigation fails because kind {string} is not registered")]
fn navigation_schema_not_found(world: &mut EditorWorld, kind: String) {
    match world.last_error.as_ref() {
        Some(ConfigEditorError::SchemaNotFound(missing)) => assert_eq!(missing, &kind),
        other => panic!("Expected SchemaNotFound, got {:?}", other),
    }
}

#[then(regex = r"^(\d+) responses? (?:was|were) dropped as stale$")]
fn stale_dropped(world: &mut EditorWorld, count: usize) {
    assert_eq!(world.stale_responses, count);
}

#[then(expr = "the link is {string}")]
fn link_is(world: &mut EditorWorld, expected: String) {
    assert_eq!(world.link.as_deref(), Some(expected.as_str()));
}
