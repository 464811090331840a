use countries_client::{
    Client, Error, HttpTransport, MockDispatcher, RawFetch, Transport,
    presentation::{CountryCard, CountryList, ListState},
    queries::{self, Country},
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, method, path},
};

// Test fixture standing in for the remote countries API
struct TestFixture {
    server: MockServer,
}

impl TestFixture {
    async fn setup() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/graphql", self.server.uri())
    }

    // Answer one operation with a canned body
    async fn respond(&self, operation_name: &str, template: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_partial_json(json!({ "operationName": operation_name })))
            .respond_with(template)
            .mount(&self.server)
            .await;
    }

    fn mocked_client(&self) -> Client {
        Client::builder(self.endpoint()).with_mock_dispatcher().build()
    }

    fn plain_client(&self) -> Client {
        Client::builder(self.endpoint()).build()
    }

    async fn mounted_list(&self, client: Client) -> CountryList {
        let mut list = CountryList::new(client, 20);
        assert!(list.is_loading());
        list.mount().await;
        list
    }

    async fn request_bodies(&self) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|request| serde_json::from_slice(&request.body).unwrap())
            .collect()
    }
}

fn country(code: &str, name: &str, emoji: &str) -> Value {
    json!({
        "code": code,
        "name": name,
        "capital": null,
        "currency": null,
        "emoji": emoji
    })
}

fn countries(entries: Vec<Value>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "data": { "countries": entries } }))
}

// An address nothing listens on
fn closed_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/graphql", addr)
}

#[tokio::test]
async fn list_shows_result_count_from_extensions() {
    let fixture = TestFixture::setup().await;
    fixture
        .respond(
            "GetCountries",
            countries(vec![
                country("AD", "Andorra", "🇦🇩"),
                country("AE", "United Arab Emirates", "🇦🇪"),
                country("AF", "Afghanistan", "🇦🇫"),
            ]),
        )
        .await;

    let list = fixture.mounted_list(fixture.mocked_client()).await;

    let data = list.data().expect("list should be ready");
    assert_eq!(data.no_of_results(), Some(3));
    assert_eq!(data.extensions().unwrap()["noOfResults"], json!(3));
    assert_eq!(list.header(), "Countries Around the World (3)");
    assert_eq!(list.cards().len(), 3);
    assert!(list.error().is_none());

    let bodies = fixture.request_bodies().await;
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["operationName"], "GetCountries");
    assert!(bodies[0]["query"].as_str().unwrap().contains("countries"));
}

#[tokio::test]
async fn empty_list_omits_count() {
    let fixture = TestFixture::setup().await;
    fixture.respond("GetCountries", countries(vec![])).await;

    let list = fixture.mounted_list(fixture.mocked_client()).await;

    assert_eq!(list.data().unwrap().no_of_results(), Some(0));
    assert_eq!(list.header(), "Countries Around the World");
    assert!(list.render().starts_with("Countries Around the World\n"));
}

#[tokio::test]
async fn network_failure_puts_list_in_failed_state() {
    let client = Client::builder(closed_endpoint())
        .with_mock_dispatcher()
        .build();

    let mut list = CountryList::new(client, 20);
    list.mount().await;

    let error = list.error().expect("list should have failed");
    assert!(matches!(error, Error::Transport { .. }));
    assert!(list.data().is_none());
    assert!(
        list.render()
            .starts_with(&format!("Error loading countries\n{}", error.message()))
    );
}

#[tokio::test]
async fn non_success_status_is_not_augmented() {
    let fixture = TestFixture::setup().await;
    fixture
        .respond(
            "GetCountries",
            ResponseTemplate::new(500).set_body_json(json!({ "data": { "countries": [] } })),
        )
        .await;

    let dispatcher = MockDispatcher::with_default_handlers(HttpTransport::new(fixture.endpoint()));
    let error = dispatcher
        .fetch(&queries::get_countries().unwrap())
        .await
        .unwrap_err();

    assert!(matches!(error, Error::Status(status) if status.as_u16() == 500));
}

#[tokio::test]
async fn malformed_payload_fails_query() {
    let fixture = TestFixture::setup().await;
    fixture
        .respond(
            "GetCountries",
            ResponseTemplate::new(200).set_body_raw("<html>oops</html>", "text/html"),
        )
        .await;

    let list = fixture.mounted_list(fixture.mocked_client()).await;

    assert!(matches!(list.state(), ListState::Failed(Error::MalformedPayload(_))));
}

#[tokio::test]
async fn detail_query_exposes_languages_in_order() {
    let fixture = TestFixture::setup().await;
    fixture
        .respond(
            "GetCountry",
            ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "country": {
                        "code": "CH",
                        "name": "Switzerland",
                        "capital": "Bern",
                        "currency": "CHE,CHF,CHW",
                        "emoji": "🇨🇭",
                        "languages": [
                            { "code": "de", "name": "German" },
                            { "code": "fr", "name": "French" },
                            { "code": "it", "name": "Italian" }
                        ]
                    }
                }
            })),
        )
        .await;
    let client = fixture.mocked_client();

    let response = client
        .query(queries::get_country("CH").unwrap())
        .await
        .unwrap();
    let data = response.into_data().unwrap();
    assert_eq!(data.no_of_results(), Some(0));
    assert_eq!(
        data.get("country").unwrap()["languages"],
        json!([
            { "code": "de", "name": "German" },
            { "code": "fr", "name": "French" },
            { "code": "it", "name": "Italian" }
        ])
    );

    let country: Country =
        serde_json::from_value(country("CH", "Switzerland", "🇨🇭")).unwrap();
    let mut card = CountryCard::new(country);
    card.load_details(&client).await;
    assert!(card.languages().is_none(), "hidden cards must not query");

    card.toggle_details();
    card.load_details(&client).await;

    assert_eq!(card.button_label(), "Hide Details");
    let languages: Vec<_> = card
        .languages()
        .unwrap()
        .iter()
        .map(|language| (language.code.as_str(), language.name.as_str()))
        .collect();
    assert_eq!(
        languages,
        vec![("de", "German"), ("fr", "French"), ("it", "Italian")]
    );
    assert!(
        card.render()
            .ends_with("  Languages:\n    - German\n    - French\n    - Italian\n")
    );

    let bodies = fixture.request_bodies().await;
    assert_eq!(bodies.len(), 2);
    assert_eq!(bodies[1]["variables"], json!({ "code": "CH" }));
}

#[tokio::test]
async fn partial_errors_are_fatal_for_the_list() {
    let fixture = TestFixture::setup().await;
    fixture
        .respond(
            "GetCountries",
            ResponseTemplate::new(200).set_body_json(json!({
                "data": { "countries": [country("AD", "Andorra", "🇦🇩")] },
                "errors": [{ "message": "Cannot query field \"capitol\"", "path": ["countries"] }]
            })),
        )
        .await;
    let client = fixture.mocked_client();

    let response = client
        .query(queries::get_countries().unwrap())
        .await
        .unwrap();
    assert_eq!(response.data.as_ref().unwrap().no_of_results(), Some(1));
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].details["path"], json!(["countries"]));

    let list = fixture.mounted_list(client).await;
    let error = list.error().expect("errors should fail the list");
    assert!(matches!(error, Error::GraphQL(errors) if errors.len() == 1));
    assert_eq!(error.message(), "Cannot query field \"capitol\"");
}

#[tokio::test]
async fn without_dispatcher_no_extensions_are_attached() {
    let fixture = TestFixture::setup().await;
    fixture
        .respond("GetCountries", countries(vec![country("AD", "Andorra", "🇦🇩")]))
        .await;

    let list = fixture.mounted_list(fixture.plain_client()).await;

    let data = list.data().unwrap();
    assert!(data.extensions().is_none());
    assert_eq!(list.header(), "Countries Around the World");
    assert_eq!(list.countries().len(), 1);
}

#[tokio::test]
async fn upstream_extensions_survive_augmentation() {
    let fixture = TestFixture::setup().await;
    fixture
        .respond(
            "GetCountries",
            ResponseTemplate::new(200).set_body_json(json!({
                "data": { "countries": [country("AD", "Andorra", "🇦🇩")] },
                "extensions": { "cost": { "requested": 2 } }
            })),
        )
        .await;

    let response = fixture
        .mocked_client()
        .query(queries::get_countries().unwrap())
        .await
        .unwrap();

    let data = response.data.unwrap();
    assert_eq!(
        Value::Object(data.extensions().unwrap().clone()),
        json!({ "cost": { "requested": 2 }, "noOfResults": 1 })
    );
}

#[tokio::test]
async fn raw_fetch_skips_augmentation() {
    let fixture = TestFixture::setup().await;
    fixture
        .respond("GetCountries", countries(vec![country("AD", "Andorra", "🇦🇩")]))
        .await;

    let envelope = HttpTransport::new(fixture.endpoint())
        .raw_fetch(&queries::get_countries().unwrap())
        .await
        .unwrap();

    assert!(envelope.extensions.is_empty());
    assert_eq!(envelope.data.unwrap().get("countries").unwrap().as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn mount_transitions_once() {
    let fixture = TestFixture::setup().await;
    fixture
        .respond("GetCountries", countries(vec![country("AD", "Andorra", "🇦🇩")]))
        .await;

    let mut list = fixture.mounted_list(fixture.mocked_client()).await;
    list.mount().await;

    assert_eq!(fixture.request_bodies().await.len(), 1);
    assert!(matches!(list.state(), ListState::Ready { .. }));
}
