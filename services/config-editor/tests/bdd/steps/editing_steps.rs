//! BDD step definitions for editing feature

use cucumber::{given, then, when};
use serde_json::{json, Value};

use config_editor::values::split_multi_value;

use crate::world::EditorWorld;

#[given(expr = "an open {word} record {string} with address {string}")]
fn open_record(world: &mut EditorWorld, kind: String, id: String, address: String) {
    let key = format!("{}_name", kind);
    let record = json!({
        key: id,
        "address": address,
        "meta": {"object_type": kind, "filename": "hosts.cfg", "inherited_attributes": {"check_period": "24x7"}}
    });
    world.entity = Some(world.editor().open_entity(record).unwrap());
}

#[when(expr = "I set {string} to {string}")]
fn set_attribute(world: &mut EditorWorld, name: String, value: String) {
    let entity = world.entity.as_mut().expect("no open record");
    world.last_outcome = Some(entity.set_attribute(&name, Some(Value::String(value))));
}

#[when(expr = "I set {string} to the list {string}")]
fn set_list_attribute(world: &mut EditorWorld, name: String, values: String) {
    let items: Vec<Value> = split_multi_value(&values)
        .into_iter()
        .map(Value::String)
        .collect();
    let entity = world.entity.as_mut().expect("no open record");
    world.last_outcome = Some(entity.set_attribute(&name, Some(Value::Array(items))));
}

#[when(expr = "I clear {string}")]
fn clear_attribute(world: &mut EditorWorld, name: String) {
    let entity = world.entity.as_mut().expect("no open record");
    world.last_outcome = Some(entity.set_attribute(&name, None));
}

#[when("I submit the record")]
async fn submit_record(world: &mut EditorWorld) {
    let entity = world.entity.take().expect("no open record");
    let submitted = world.editor().submit(&entity).await.unwrap();
    world.submitted = Some(submitted);
    world.entity = Some(entity);
}

#[then("nothing is submitted")]
fn nothing_submitted(world: &mut EditorWorld) {
    assert_eq!(world.submitted, Some(None));
    assert!(world.api.posted().is_empty());
}

#[then("the change was not recorded")]
fn change_not_recorded(world: &mut EditorWorld) {
    let outcome = world.last_outcome.expect("no attribute was set");
    assert!(!outcome.changed);
}

#[then("the attribute was flagged as unknown")]
fn flagged_unknown(world: &mut EditorWorld) {
    let outcome = world.last_outcome.expect("no attribute was set");
    assert!(outcome.changed);
    assert!(outcome.unknown_attribute);
}

#[then("the record is dirty")]
fn record_dirty(world: &mut EditorWorld) {
    let entity = world.entity.as_ref().expect("no open record");
    assert!(entity.is_dirty());
}

#[then("the record is not dirty")]
fn record_clean(world: &mut EditorWorld) {
    let entity = world.entity.as_ref().expect("no open record");
    assert!(!entity.is_dirty());
}

#[then(expr = "the effective value of {string} is {string}")]
fn effective_value(world: &mut EditorWorld, name: String, expected: String) {
    let entity = world.entity.as_ref().expect("no open record");
    assert_eq!(entity.effective_attribute(&name), Some(&Value::String(expected)));
}

#[then(expr = "the API received a POST to {string}")]
fn received_post(world: &mut EditorWorld, url: String) {
    let posted = world.api.posted();
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].0, url);
}

fn last_body(world: &EditorWorld) -> Value {
    world
        .api
        .posted()
        .pop()
        .map(|(_, body)| body)
        .expect("nothing was posted")
}

#[then(expr = "the payload sets {string} to {string}")]
fn payload_sets(world: &mut EditorWorld, name: String, expected: String) {
    assert_eq!(last_body(world)[name.as_str()], Value::String(expected));
}

#[then(expr = "the payload removes {string}")]
fn payload_removes(world: &mut EditorWorld, name: String) {
    let body = last_body(world);
    assert_eq!(body.get(name.as_str()), Some(&Value::Null));
}

#[then(expr = "the payload does not contain {string}")]
fn payload_lacks(world: &mut EditorWorld, name: String) {
    assert!(last_body(world).get(name.as_str()).is_none());
}

#[then(expr = "the payload meta has object type {string} and id {string}")]
fn payload_meta(world: &mut EditorWorld, object_type: String, id: String) {
    let body = last_body(world);
    assert_eq!(body["meta"]["object_type"], Value::String(object_type));
    assert_eq!(body["meta"]["id"], Value::String(id));
}
