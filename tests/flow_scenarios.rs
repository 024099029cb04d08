//! End-to-end scenarios for the guided shopping flow, driven against a mock
//! recommendation backend.

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use boutique_chat::client::{Channel, RecommendationClient};
use boutique_chat::flow::{self, Choice, ShoppingFlow, ShoppingState, Step};
use boutique_chat::options::CatalogOption;

async fn mock_shopping(server: &MockServer, instruction: &str, content: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_json(json!({"choice": "2", "input": instruction})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": content})))
        .mount(server)
        .await;
}

fn client_for(server: &MockServer) -> RecommendationClient {
    RecommendationClient::new(&format!("{}/api/chat", server.uri()))
}

/// Run one controller turn: plan the selection, issue the request, feed the
/// outcome back. Mirrors what the widget shell does around its task handle.
async fn drive(flow: &mut ShoppingFlow, client: &RecommendationClient, choice: Choice) {
    if let Some(plan) = flow.select(&choice) {
        match client.request(Channel::Shopping, &plan.instruction).await {
            Ok(content) => flow.commit(&plan, &content),
            Err(_) => flow.fail(),
        }
    }
}

fn pick(id: &str, name: &str) -> Choice {
    Choice::Catalog(CatalogOption::new(id, name))
}

#[tokio::test]
async fn happy_path_ends_with_product_entry_and_control_tokens() {
    let server = MockServer::start().await;
    mock_shopping(&server, "get_categories", json!([{"id": "c1", "name": "Shirts"}])).await;
    mock_shopping(&server, "get_sizes c1", json!([{"id": "s1", "name": "M"}])).await;
    mock_shopping(&server, "get_colors c1 s1", json!([{"id": "k1", "name": "Blue"}])).await;
    mock_shopping(
        &server,
        "find_products c1 s1 k1",
        json!([{"name": "Blue Shirt", "recommendation": "Best seller"}]),
    )
    .await;
    let client = client_for(&server);

    let mut flow = ShoppingFlow::new();
    let entry = flow.begin().expect("entry plans the category fetch");
    let content = client
        .request(Channel::Shopping, &entry.instruction)
        .await
        .expect("category fetch succeeds");
    flow.commit(&entry, &content);
    assert_eq!(flow.choices(), &[pick("c1", "Shirts")]);

    drive(&mut flow, &client, pick("c1", "Shirts")).await;
    assert_eq!(flow.state().step, Step::Size);
    drive(&mut flow, &client, pick("s1", "M")).await;
    assert_eq!(flow.state().step, Step::Color);
    drive(&mut flow, &client, pick("k1", "Blue")).await;

    assert_eq!(flow.state().step, Step::Product);
    assert_eq!(flow.choices(), &[Choice::Continue, Choice::Quit]);

    let entries = flow.transcript().entries();
    let product = entries
        .iter()
        .find(|m| m.is_product)
        .expect("a product entry was appended");
    assert_eq!(product.content, "Blue Shirt / Best seller");
    assert_eq!(entries.last().unwrap().content, flow::PRODUCTS_FOLLOW_UP);
}

#[tokio::test]
async fn product_instruction_encodes_ids_in_selection_order() {
    let server = MockServer::start().await;
    mock_shopping(&server, "get_sizes cat-9", json!([{"id": "sz-2", "name": "L"}])).await;
    mock_shopping(&server, "get_colors cat-9 sz-2", json!([{"id": "col-5", "name": "Red"}])).await;

    // Exactly one product request, with the three ids in selection order
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_json(json!({"choice": "2", "input": "find_products cat-9 sz-2 col-5"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": []})))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server);

    let mut flow = ShoppingFlow::new();
    drive(&mut flow, &client, pick("cat-9", "Hats")).await;
    drive(&mut flow, &client, pick("sz-2", "L")).await;
    drive(&mut flow, &client, pick("col-5", "Red")).await;

    assert_eq!(flow.state().step, Step::Product);
    server.verify().await;
}

#[tokio::test]
async fn empty_product_list_apologizes_but_still_offers_another_pass() {
    let server = MockServer::start().await;
    mock_shopping(&server, "get_sizes c1", json!(["M"])).await;
    mock_shopping(&server, "get_colors c1 M", json!(["Blue"])).await;
    mock_shopping(&server, "find_products c1 M Blue", json!([])).await;
    let client = client_for(&server);

    let mut flow = ShoppingFlow::new();
    drive(&mut flow, &client, pick("c1", "Shirts")).await;
    drive(&mut flow, &client, pick("M", "M")).await;
    let before = flow.transcript().len();
    drive(&mut flow, &client, pick("Blue", "Blue")).await;

    assert_eq!(flow.state().step, Step::Product);
    assert_eq!(flow.choices(), &[Choice::Continue, Choice::Quit]);
    // one user entry for the pick, one apology - nothing else
    assert_eq!(flow.transcript().len(), before + 2);
    assert_eq!(flow.transcript().last().unwrap().content, flow::NO_PRODUCTS);
    assert!(flow.transcript().entries().iter().all(|m| !m.is_product));
}

#[tokio::test]
async fn quitting_mid_flow_farewells_and_resets() {
    let server = MockServer::start().await;
    mock_shopping(&server, "get_sizes c1", json!([{"id": "s1", "name": "M"}])).await;
    let client = client_for(&server);

    let mut flow = ShoppingFlow::new();
    drive(&mut flow, &client, pick("c1", "Shirts")).await;
    assert_eq!(flow.state().step, Step::Size);

    drive(&mut flow, &client, Choice::Quit).await;

    assert_eq!(flow.state(), &ShoppingState::new());
    assert!(flow.choices().is_empty());
    assert_eq!(flow.transcript().last().unwrap().content, flow::FAREWELL);
}

#[tokio::test]
async fn transport_failure_leaves_state_uncommitted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let client = client_for(&server);

    let mut flow = ShoppingFlow::new();
    let before = flow.transcript().len();
    drive(&mut flow, &client, pick("c1", "Shirts")).await;

    // The category assignment was never committed
    assert_eq!(flow.state(), &ShoppingState::new());
    assert!(flow.state().category.is_none());
    assert!(flow.choices().is_empty());
    assert_eq!(flow.transcript().len(), before + 2);
    assert_eq!(flow.transcript().last().unwrap().content, flow::APOLOGY);
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_failure_too() {
    // Port 9 is discard/unassigned; nothing is listening there
    let client = RecommendationClient::new("http://127.0.0.1:9/api/chat");

    let mut flow = ShoppingFlow::new();
    drive(&mut flow, &client, pick("c1", "Shirts")).await;

    assert_eq!(flow.state(), &ShoppingState::new());
    assert_eq!(flow.transcript().last().unwrap().content, flow::APOLOGY);
}

#[tokio::test]
async fn continue_after_results_restarts_with_fresh_categories() {
    let server = MockServer::start().await;
    mock_shopping(&server, "get_categories", json!([{"id": "c1", "name": "Shirts"}])).await;
    mock_shopping(&server, "get_sizes c1", json!([{"id": "s1", "name": "M"}])).await;
    mock_shopping(&server, "get_colors c1 s1", json!([{"id": "k1", "name": "Blue"}])).await;
    mock_shopping(
        &server,
        "find_products c1 s1 k1",
        json!([{"name": "Blue Shirt", "recommendation": "Best seller"}]),
    )
    .await;
    let client = client_for(&server);

    let mut flow = ShoppingFlow::new();
    drive(&mut flow, &client, pick("c1", "Shirts")).await;
    drive(&mut flow, &client, pick("s1", "M")).await;
    drive(&mut flow, &client, pick("k1", "Blue")).await;
    assert_eq!(flow.state().step, Step::Product);

    drive(&mut flow, &client, Choice::Continue).await;

    assert_eq!(flow.state(), &ShoppingState::new());
    assert_eq!(flow.choices(), &[pick("c1", "Shirts")]);
    assert_eq!(
        flow.transcript().last().unwrap().content,
        "What type of product are you looking for today?"
    );
}

#[tokio::test]
async fn keyed_map_options_surface_in_enumeration_order() {
    let server = MockServer::start().await;
    mock_shopping(
        &server,
        "get_sizes c1",
        serde_json::from_str(r#"{"s1": "Small", "s2": "Medium"}"#).unwrap(),
    )
    .await;
    let client = client_for(&server);

    let mut flow = ShoppingFlow::new();
    drive(&mut flow, &client, pick("c1", "Shirts")).await;

    assert_eq!(
        flow.choices(),
        &[pick("s1", "Small"), pick("s2", "Medium")]
    );
}

#[tokio::test]
async fn malformed_options_payload_degrades_to_no_options() {
    let server = MockServer::start().await;
    mock_shopping(&server, "get_sizes c1", json!("not an options payload")).await;
    let client = client_for(&server);

    let mut flow = ShoppingFlow::new();
    drive(&mut flow, &client, pick("c1", "Shirts")).await;

    // The request itself succeeded, so the transition commits - with nothing
    // left to offer.
    assert_eq!(flow.state().step, Step::Size);
    assert!(flow.choices().is_empty());
}

#[tokio::test]
async fn general_chat_round_trip_returns_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_json(json!({"choice": "1", "input": "do you ship to Portugal?"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"content": "We ship worldwide within 5 days."})),
        )
        .mount(&server)
        .await;
    let client = client_for(&server);

    let reply = client.chat("do you ship to Portugal?").await.unwrap();
    assert_eq!(reply, "We ship worldwide within 5 days.");
}
