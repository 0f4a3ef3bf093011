use std::sync::Arc;
use instaaid_shared::state_machine::login_flow::{LoginFlow, LoginState, Route};
use instaaid_shared::utilities::storage::{keys, KeyValueStore};
use instaaid_shared::utilities::test::{
    temp_store_path, InMemoryIdentityProvider, StubDriverApi, StubExchange, StubProfileResponse,
};

const CODE: &str = "482913";

fn flow_with(api: StubDriverApi) -> (Arc<InMemoryIdentityProvider>, Arc<StubDriverApi>, LoginFlow) {
    let provider = Arc::new(InMemoryIdentityProvider::accepting(CODE));
    let api = Arc::new(api);
    let store = KeyValueStore::open(temp_store_path()).unwrap();
    let flow = LoginFlow::new(provider.clone(), api.clone(), store, "IN", 60);
    (provider, api, flow)
}

fn accepting(profile: StubProfileResponse) -> StubDriverApi {
    StubDriverApi::new(
        StubExchange::Accept {
            access_token: "tok".to_string(),
        },
        profile,
    )
}

#[tokio::test]
async fn complete_profile_routes_to_dashboard() {
    let (_, _, mut flow) = flow_with(accepting(StubProfileResponse::Complete));

    flow.submit_phone("9876543210").await;
    flow.submit_code(CODE).await;

    assert_eq!(*flow.state(), LoginState::Routed(Route::Dashboard));
    assert_eq!(flow.storage().get_str(keys::ACCESS_TOKEN), Some("tok".to_string()));
    assert_eq!(flow.storage().get_str(keys::ROLE), Some("driver".to_string()));
}

#[tokio::test]
async fn unregistered_driver_routes_to_profile_form() {
    let (_, _, mut flow) = flow_with(accepting(StubProfileResponse::NotRegistered));

    flow.submit_phone("9876543210").await;
    flow.submit_code(CODE).await;

    assert_eq!(*flow.state(), LoginState::Routed(Route::ProfileForm));
    // Session credentials are stored even though the profile is missing.
    assert_eq!(flow.storage().get_str(keys::ACCESS_TOKEN), Some("tok".to_string()));
}

#[tokio::test]
async fn incomplete_profile_routes_to_profile_form() {
    let (_, _, mut flow) = flow_with(accepting(StubProfileResponse::Incomplete));

    flow.submit_phone("9876543210").await;
    flow.submit_code(CODE).await;

    assert_eq!(*flow.state(), LoginState::Routed(Route::ProfileForm));
}

#[tokio::test]
async fn probe_failure_defaults_to_profile_form() {
    let (_, api, mut flow) = flow_with(accepting(StubProfileResponse::NetworkError));

    flow.submit_phone("9876543210").await;
    flow.submit_code(CODE).await;

    assert_eq!(api.profile_calls(), 1);
    assert_eq!(*flow.state(), LoginState::Routed(Route::ProfileForm));
}

#[tokio::test]
async fn expired_backend_exchange_fails_without_persisting() {
    let (_, api, mut flow) = flow_with(StubDriverApi::new(
        StubExchange::Expired,
        StubProfileResponse::Complete,
    ));

    flow.submit_phone("9876543210").await;
    flow.submit_code(CODE).await;

    assert_eq!(api.exchange_calls(), 1);
    assert_eq!(api.profile_calls(), 0);
    assert!(matches!(flow.state(), LoginState::Failed { .. }));
    assert!(flow.storage().get_str(keys::ACCESS_TOKEN).is_none());
}

#[tokio::test]
async fn rejected_exchange_never_writes_tokens() {
    let (_, _, mut flow) = flow_with(StubDriverApi::new(
        StubExchange::Rejected,
        StubProfileResponse::Complete,
    ));

    flow.submit_phone("9876543210").await;
    flow.submit_code(CODE).await;

    assert!(matches!(flow.state(), LoginState::Failed { .. }));
    assert!(flow.storage().get_str(keys::ACCESS_TOKEN).is_none());
    assert!(flow.storage().get_str(keys::REFRESH_TOKEN).is_none());
}

#[tokio::test]
async fn empty_access_token_never_persisted() {
    let (_, api, mut flow) = flow_with(StubDriverApi::new(
        StubExchange::EmptyToken,
        StubProfileResponse::Complete,
    ));

    flow.submit_phone("9876543210").await;
    flow.submit_code(CODE).await;

    assert_eq!(api.profile_calls(), 0);
    assert!(matches!(flow.state(), LoginState::Failed { .. }));
    assert!(flow.storage().get_str(keys::ACCESS_TOKEN).is_none());
}

#[tokio::test]
async fn short_code_never_reaches_the_network() {
    let (provider, api, mut flow) = flow_with(accepting(StubProfileResponse::Complete));

    flow.submit_phone("9876543210").await;
    flow.submit_code("4829").await;

    assert_eq!(provider.confirm_calls(), 0);
    assert_eq!(api.exchange_calls(), 0);
    assert_eq!(*flow.state(), LoginState::AwaitingCode);
}

#[tokio::test]
async fn duplicate_submission_verifies_once() {
    let (provider, _, mut flow) = flow_with(accepting(StubProfileResponse::Complete));

    flow.submit_phone("9876543210").await;
    flow.submit_code(CODE).await;
    // Re-render or double-tap replays the same code after routing.
    flow.submit_code(CODE).await;

    assert_eq!(provider.confirm_calls(), 1);
    assert_eq!(*flow.state(), LoginState::Routed(Route::Dashboard));
}

#[tokio::test]
async fn example_scenario_new_driver() {
    // Phone 9876543210 formats to +919876543210; the code verifies; the
    // backend issues "tok"; the profile probe 404s; the flow lands on
    // the profile form with the token stored.
    let (_, _, mut flow) = flow_with(accepting(StubProfileResponse::NotRegistered));

    flow.submit_phone("9876543210").await;
    assert_eq!(flow.phone(), Some("+919876543210"));

    flow.submit_code(CODE).await;
    assert_eq!(*flow.state(), LoginState::Routed(Route::ProfileForm));
    assert_eq!(flow.storage().get_str(keys::ACCESS_TOKEN), Some("tok".to_string()));
}
