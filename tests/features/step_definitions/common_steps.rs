//! Common step definitions used across features

use cucumber::{given, then};
use serde_json::Value;

use crate::features::support::TestWorld;

#[given("a running license manager")]
async fn running_license_manager(world: &mut TestWorld) {
    world.app().await;
}

#[given(expr = "route {string} is disabled")]
async fn route_disabled(world: &mut TestWorld, code: String) {
    assert!(world.app.is_none(), "Route flags must be set before the first request");
    world.disabled_routes.push(code);
}

#[given("failures are reported with conventional statuses")]
async fn conventional_statuses(world: &mut TestWorld) {
    assert!(world.app.is_none(), "Status policy must be set before the first request");
    world.conventional_status = true;
}

#[given(expr = "I am acting as user {int}")]
async fn acting_as(world: &mut TestWorld, actor: i64) {
    assert!(world.app.is_none(), "Actor must be set before the first request");
    world.actor = Some(actor);
}

#[then(expr = "the response status should be {int}")]
async fn response_status(world: &mut TestWorld, status: u16) {
    assert_eq!(world.response().status.as_u16(), status, "{}", world.response().text());
}

#[then("the response should be a success")]
async fn response_success(world: &mut TestWorld) {
    let json: Value = world.response().json();
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], Value::Null);
}

#[then(expr = "the error should be {string} with message {string}")]
async fn response_error(world: &mut TestWorld, kind: String, message: String) {
    world.response().assert_error(&kind, &message);
}

#[then(expr = "the response should name route {string}")]
async fn response_route(world: &mut TestWorld, route: String) {
    world.response().assert_route(&route);
}
