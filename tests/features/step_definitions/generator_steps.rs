//! Generator step definitions

use cucumber::{gherkin::Step, given, then, when};
use serde_json::Value;

use crate::common::{generator_uri, GeneratorFactory, GENERATORS_URI};
use crate::features::support::TestWorld;

fn docstring_json(step: &Step) -> Value {
    let doc = step.docstring.as_deref().expect("Step needs a JSON docstring");
    serde_json::from_str(doc).expect("Docstring is not valid JSON")
}

fn current_uri(world: &TestWorld) -> String {
    generator_uri(world.current_generator.expect("No generator in this scenario"))
}

#[given(expr = "a generator named {string} exists")]
async fn generator_exists(world: &mut TestWorld, name: String) {
    let db = world.app().await.state.db.clone();
    let generator = GeneratorFactory::new().with_name(&name).insert(&db).await;
    world.current_generator = Some(generator.id);
}

#[when("I list the generators")]
async fn list_generators(world: &mut TestWorld) {
    let response = world.app().await.get(GENERATORS_URI).await;
    world.last_response = Some(response);
}

#[when("I create a generator with:")]
async fn create_generator(world: &mut TestWorld, step: &Step) {
    let body = docstring_json(step);
    let response = world.app().await.post_json(GENERATORS_URI, body).await;
    world.last_response = Some(response);
    world.remember_generator();
}

#[when("I fetch the generator")]
async fn fetch_generator(world: &mut TestWorld) {
    let uri = current_uri(world);
    let response = world.app().await.get(&uri).await;
    world.last_response = Some(response);
}

#[when(expr = "I fetch generator {string}")]
async fn fetch_generator_by_id(world: &mut TestWorld, id: String) {
    let response = world.app().await.get(&generator_uri(id)).await;
    world.last_response = Some(response);
}

#[when("I update the generator with:")]
async fn update_generator(world: &mut TestWorld, step: &Step) {
    let uri = current_uri(world);
    let body = docstring_json(step);
    let response = world.app().await.put_json(&uri, body).await;
    world.last_response = Some(response);
}

#[when(expr = "I update generator {string} with:")]
async fn update_generator_by_id(world: &mut TestWorld, id: String, step: &Step) {
    let body = docstring_json(step);
    let response = world.app().await.put_json(&generator_uri(id), body).await;
    world.last_response = Some(response);
}

#[then(expr = "the response should list {int} generator(s)")]
async fn lists_generators(world: &mut TestWorld, count: usize) {
    let data = world.data();
    assert_eq!(data.as_array().map(Vec::len), Some(count));
}

#[then(expr = "the generator {string} should be {string}")]
async fn generator_field(world: &mut TestWorld, field: String, expected: String) {
    let data = world.data();
    let actual = match &data[&field] {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    assert_eq!(actual, expected, "field {}", field);
}

#[then(expr = "the generator {string} should be set")]
async fn generator_field_set(world: &mut TestWorld, field: String) {
    assert!(!world.data()[&field].is_null(), "{} is null", field);
}

#[then("the generator should have an id")]
async fn generator_has_id(world: &mut TestWorld) {
    assert!(world.data()["id"].as_i64().is_some_and(|id| id > 0));
}
