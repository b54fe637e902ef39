use super::*;
use crate::state::test_helpers::test_app_state;

#[test]
fn router_assembles_with_every_route() {
    // Handler signatures are checked when the routes are registered; a lazy
    // pool keeps this free of any live database.
    let _app = app(test_app_state());
}

#[tokio::test]
async fn healthz_answers_ok() {
    assert_eq!(healthz().await, StatusCode::OK);
}
