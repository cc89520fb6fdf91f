//! End-to-end tests of the request pipeline with fake providers

use rumbo_core::{
    Error, HistoryEntry, KeywordClassifier, Orchestrator, OrchestratorConfig, Query,
    RequestHandler, Synthesizer,
};
use rumbo_llm::MockProvider;
use rumbo_tools::commerce::{
    CommerceError, CommerceProvider, PaymentIntent, PaymentIntentRequest, PricingPolicy,
    ProductSpec,
};
use rumbo_tools::maps::{Place, PlaceSearch, PlaceSearchResult};
use rumbo_tools::{register_builtins, ToolRegistry};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct FakePlaces {
    fail: bool,
    searches: Mutex<Vec<String>>,
    themed: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl PlaceSearch for FakePlaces {
    fn name(&self) -> &str {
        "fake-places"
    }

    async fn search_places(&self, destination: &str) -> rumbo_tools::Result<PlaceSearchResult> {
        self.searches.lock().unwrap().push(destination.to_string());
        if self.fail {
            return Err(rumbo_tools::Error::Execution("maps down".to_string()));
        }
        Ok(PlaceSearchResult::Places(vec![
            Place {
                name: "Coliseo".to_string(),
                address: "Piazza del Colosseo, Roma".to_string(),
                rating: Some(4.7),
                place_id: Some("pid-coliseo".to_string()),
                maps_url: None,
            },
            Place {
                name: "Fontana di Trevi".to_string(),
                address: "Piazza di Trevi, Roma".to_string(),
                rating: Some(4.8),
                place_id: Some("pid-trevi".to_string()),
                maps_url: None,
            },
        ]))
    }

    async fn search_destinations(&self, query: &str) -> rumbo_tools::Result<PlaceSearchResult> {
        self.themed.lock().unwrap().push(query.to_string());
        if self.fail {
            return Err(rumbo_tools::Error::Execution("maps down".to_string()));
        }
        Ok(PlaceSearchResult::Places(vec![Place {
            name: "Holbox".to_string(),
            address: "Isla Holbox, Quintana Roo, México".to_string(),
            rating: Some(4.6),
            place_id: None,
            maps_url: None,
        }]))
    }
}

#[derive(Default)]
struct FakeCommerce {
    fail: bool,
    products: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl CommerceProvider for FakeCommerce {
    fn name(&self) -> &str {
        "fake-commerce"
    }

    async fn publish_product(&self, product: &ProductSpec) -> Result<String, CommerceError> {
        if self.fail {
            return Err(CommerceError::Api {
                status: 503,
                message: "unavailable".to_string(),
            });
        }
        let mut products = self.products.lock().unwrap();
        products.push(product.name.clone());
        Ok(format!("https://buy.test/link_{}", products.len()))
    }

    async fn create_payment_intent(
        &self,
        _request: &PaymentIntentRequest,
    ) -> Result<PaymentIntent, CommerceError> {
        Err(CommerceError::NotConfigured("payments are not part of this test".to_string()))
    }
}

struct Pipeline {
    handler: RequestHandler,
    places: Arc<FakePlaces>,
    commerce: Arc<FakeCommerce>,
}

fn pipeline_with(places: FakePlaces, commerce: FakeCommerce, synthesizer: Synthesizer) -> Pipeline {
    let places = Arc::new(places);
    let commerce = Arc::new(commerce);

    let mut registry = ToolRegistry::new();
    register_builtins(
        &mut registry,
        places.clone(),
        commerce.clone(),
        PricingPolicy::default(),
    );
    let orchestrator = Orchestrator::new(
        Arc::new(registry),
        Arc::new(KeywordClassifier::new()),
        OrchestratorConfig::default(),
    );

    Pipeline {
        handler: RequestHandler::new(Arc::new(orchestrator), synthesizer),
        places,
        commerce,
    }
}

fn pipeline() -> Pipeline {
    pipeline_with(
        FakePlaces::default(),
        FakeCommerce::default(),
        Synthesizer::new(),
    )
}

#[tokio::test]
async fn test_roma_purchase_end_to_end() {
    let pipeline = pipeline();
    let response = pipeline
        .handler
        .handle(Query::new("quiero reservar un viaje a Roma").with_conversation_id("conv-1"))
        .await
        .unwrap();

    let reply = &response.response;
    assert_eq!(reply.matches(r#"class="travel-button""#).count(), 1);
    assert_eq!(reply.matches(r#"class="travel-button-small""#).count(), 2);
    assert!(reply.contains("Coliseo"));
    assert!(reply.contains("Paquete Completo a Roma"));
    assert!(response.trace_id.starts_with("trace_"));
    assert_eq!(response.conversation_id.as_deref(), Some("conv-1"));

    assert_eq!(
        *pipeline.commerce.products.lock().unwrap(),
        vec![
            "Vuelo a Roma".to_string(),
            "Hotel en Roma (3 noches)".to_string(),
            "Paquete completo a Roma".to_string(),
        ]
    );
    assert_eq!(*pipeline.places.searches.lock().unwrap(), vec!["Roma".to_string()]);
}

#[tokio::test]
async fn test_unrelated_query_calls_nothing() {
    let pipeline = pipeline();
    let response = pipeline
        .handler
        .handle(Query::new("cómo funcionan los aviones"))
        .await
        .unwrap();

    assert!(response.response.contains("especializado en viajes"));
    assert!(pipeline.places.searches.lock().unwrap().is_empty());
    assert!(pipeline.commerce.products.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_vague_query_suggests_destinations() {
    let pipeline = pipeline();
    let response = pipeline
        .handler
        .handle(Query::new("recomiéndame un destino de playa"))
        .await
        .unwrap();

    let suggestions = response
        .response
        .lines()
        .filter(|line| line.starts_with("- **"))
        .count();
    assert!((2..=3).contains(&suggestions), "{}", response.response);
    assert!(!response.response.contains("travel-button"));
    assert!(pipeline.commerce.products.lock().unwrap().is_empty());
    assert!(pipeline.places.searches.lock().unwrap().is_empty());
    assert!(response.response.contains("Holbox"));
    assert!(!pipeline.places.themed.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_vague_query_after_long_history_still_suggests() {
    let pipeline = pipeline();
    let query = Query::new("recomiéndame un destino diferente").with_history(vec![
        HistoryEntry::new("user", "ya fui a Holbox, Cancún, Bali, Punta Cana y Tulum"),
        HistoryEntry::new("assistant", "Nueva York, Tokio, Barcelona, Buenos Aires"),
        HistoryEntry::new("assistant", "Patagonia, Costa Rica, Queenstown, Islandia"),
        HistoryEntry::new("assistant", "Roma, Cusco, Kioto, Estambul"),
    ]);
    let response = pipeline.handler.handle(query).await.unwrap();

    let suggestions = response
        .response
        .lines()
        .filter(|line| line.starts_with("- **"))
        .count();
    assert!((2..=3).contains(&suggestions), "{}", response.response);
}

#[tokio::test]
async fn test_vague_query_with_maps_down_is_an_error() {
    let pipeline = pipeline_with(
        FakePlaces {
            fail: true,
            ..Default::default()
        },
        FakeCommerce::default(),
        Synthesizer::new(),
    );

    let err = pipeline
        .handler
        .handle(Query::new("recomiéndame un destino de playa"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::AllProvidersFailed { attempted: 1, .. }));
    assert!(!pipeline.places.themed.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_repeated_destination_spellings_publish_once() {
    let pipeline = pipeline();
    let response = pipeline
        .handler
        .handle(Query::new("quiero reservar un viaje a Paris, o mejor dicho paris"))
        .await
        .unwrap();

    assert_eq!(
        *pipeline.commerce.products.lock().unwrap(),
        vec![
            "Vuelo a París".to_string(),
            "Hotel en París (3 noches)".to_string(),
            "Paquete completo a París".to_string(),
        ]
    );
    assert_eq!(*pipeline.places.searches.lock().unwrap(), vec!["París".to_string()]);
    assert_eq!(response.response.matches(r#"class="travel-button""#).count(), 1);
}

#[tokio::test]
async fn test_informational_places_before_offers() {
    let pipeline = pipeline();
    let response = pipeline
        .handler
        .handle(Query::new("háblame de Roma"))
        .await
        .unwrap();

    let reply = &response.response;
    let places = reply.find("Lugares destacados en Roma").unwrap();
    let offer = reply.find("Paquete Completo a Roma").unwrap();
    assert!(places < offer);
}

#[tokio::test]
async fn test_follow_up_uses_history_destination() {
    let pipeline = pipeline();
    let query = Query::new("¿cuánto cuesta?").with_history(vec![
        HistoryEntry::new("user", "háblame de Roma"),
        HistoryEntry::new("assistant", "Roma es maravillosa"),
    ]);
    let response = pipeline.handler.handle(query).await.unwrap();
    assert!(response.response.contains("Paquete Completo a Roma"));
}

#[tokio::test]
async fn test_same_query_is_structurally_idempotent() {
    let pipeline = pipeline();
    let first = pipeline.handler.handle(Query::new("háblame de Roma")).await.unwrap();
    let second = pipeline.handler.handle(Query::new("háblame de Roma")).await.unwrap();

    // payment links differ per call; everything else must match
    let without_links = |text: &str| -> Vec<String> {
        text.lines()
            .filter(|line| !line.contains("href="))
            .map(str::to_string)
            .collect()
    };
    assert_eq!(without_links(&first.response), without_links(&second.response));
    assert_eq!(
        first.response.matches("href=").count(),
        second.response.matches("href=").count()
    );
    assert_ne!(first.trace_id, second.trace_id);
}

#[tokio::test]
async fn test_validation_errors() {
    let pipeline = pipeline();

    let blank = pipeline.handler.handle(Query::new("   ")).await.unwrap_err();
    assert!(blank.is_validation());

    let bad_history = Query::new("hola").with_history(vec![HistoryEntry::new(" ", "x")]);
    let err = pipeline.handler.handle(bad_history).await.unwrap_err();
    assert!(matches!(err, Error::Validation(msg) if msg.contains("history[0]")));
}

#[tokio::test]
async fn test_total_failure_is_an_error() {
    let pipeline = pipeline_with(
        FakePlaces {
            fail: true,
            ..Default::default()
        },
        FakeCommerce {
            fail: true,
            ..Default::default()
        },
        Synthesizer::new(),
    );

    let err = pipeline
        .handler
        .handle(Query::new("háblame de Roma"))
        .await
        .unwrap_err();
    match err {
        Error::AllProvidersFailed { trace_id, attempted } => {
            assert!(trace_id.starts_with("trace_"));
            assert_eq!(attempted, 2);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_total_failure_with_llm_still_answers() {
    let llm = MockProvider::new().with_default_reply("Roma es una ciudad eterna, llena de historia.");
    let pipeline = pipeline_with(
        FakePlaces {
            fail: true,
            ..Default::default()
        },
        FakeCommerce {
            fail: true,
            ..Default::default()
        },
        Synthesizer::new().with_llm(Arc::new(llm)),
    );

    let response = pipeline
        .handler
        .handle(Query::new("háblame de Roma"))
        .await
        .unwrap();
    assert!(response.response.starts_with("Roma es una ciudad eterna"));
    assert!(response.response.contains("⚠️"));
}

#[tokio::test]
async fn test_total_failure_with_failing_llm_is_an_error() {
    let llm = MockProvider::new();
    llm.push_failure("llm unavailable");
    let pipeline = pipeline_with(
        FakePlaces {
            fail: true,
            ..Default::default()
        },
        FakeCommerce {
            fail: true,
            ..Default::default()
        },
        Synthesizer::new().with_llm(Arc::new(llm.clone())),
    );

    let err = pipeline
        .handler
        .handle(Query::new("háblame de Roma"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::AllProvidersFailed { attempted: 2, .. }));
    assert!(!llm.requests().is_empty());
}
