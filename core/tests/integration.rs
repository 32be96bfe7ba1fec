//! End-to-end generation against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives `AdService` over real
//! HTTP through a ureq-backed `HttpTransport`. Validates request shaping,
//! response normalization and store updates together, including restart from
//! disk.

use std::sync::{Arc, Mutex};

use adgen_core::{
    AdConfig, AdError, AdService, FileStorage, HttpMethod, HttpRequest, HttpResponse, HttpTransport,
    ManualFields, MemoryStorage, ProductRecordStore, TransportError, PLACEHOLDER_IMAGE_URL,
};

/// Executes requests with ureq.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data, letting the core classify them.
struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl HttpTransport for UreqTransport {
    fn execute(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        let result = match (req.method, req.body) {
            (HttpMethod::Post, Some(body)) => self
                .agent
                .post(&req.path)
                .content_type("application/json")
                .send(body.as_bytes()),
            (HttpMethod::Post, None) => self.agent.post(&req.path).send_empty(),
        };
        let mut response = result.map_err(|e| TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string().unwrap_or_default();
        Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body,
        })
    }
}

/// Start the mock server on a random port and return its base URL.
fn start_mock_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn config(base_url: &str) -> AdConfig {
    AdConfig::default().with_base_url(base_url)
}

#[test]
fn generation_lifecycle() {
    let base_url = start_mock_server();
    let service = AdService::from_config(&config(&base_url), UreqTransport::new(), Arc::new(MemoryStorage::new()));

    let seen = Arc::new(Mutex::new(Vec::new()));
    {
        let seen = Arc::clone(&seen);
        service.on_product_data_changed(move |p| seen.lock().unwrap().push(p.product_name().to_string()));
    }

    // Step 1: nothing generated yet.
    assert!(service.current_product().is_none());

    // Step 2: generate from a product URL.
    let scraped = service
        .request_ad_from_url("https://acme.com/products/rocket-skates")
        .unwrap();
    assert_eq!(scraped.brand_name(), "Acme");
    assert_eq!(scraped.product_name(), "Rocket skates");
    assert_eq!(scraped.ad_copy(), "Meet the Rocket skates from Acme, made for 9-18.");
    assert_eq!(scraped.image_url(), Some(PLACEHOLDER_IMAGE_URL));
    assert_eq!(scraped.product_description(), "");
    assert_eq!(service.current_product(), Some(scraped.clone()));

    // Step 3: generate from manual fields; replaces the record.
    let fields = ManualFields::new("Globex", "Hammock")
        .with_target_audience("campers")
        .with_selling_points("Holds 200kg.");
    let manual = service.request_ad_from_fields(&fields).unwrap();
    assert_eq!(manual.brand_name(), "Globex");
    assert_eq!(manual.product_name(), "Hammock");
    assert_eq!(manual.target_audience(), "campers");
    assert_eq!(manual.ad_copy(), "Meet the Hammock from Globex, made for campers. Holds 200kg.");
    assert_eq!(manual.image_url(), Some(PLACEHOLDER_IMAGE_URL));
    assert_eq!(service.current_product(), Some(manual.clone()));

    // Step 4: server error keeps the manual record.
    let err = service.request_ad_from_url("https://error.test/p").unwrap_err();
    assert!(matches!(err, AdError::RequestFailed { status: Some(500), .. }));
    assert_eq!(service.current_product(), Some(manual.clone()));

    // Step 5: missing adCopy keeps the manual record.
    let err = service.request_ad_from_url("https://malformed.test/p").unwrap_err();
    assert!(matches!(err, AdError::MalformedResponse(_)));

    // Step 6: non-JSON body keeps the manual record.
    let err = service.request_ad_from_url("https://garbage.test/p").unwrap_err();
    assert!(matches!(err, AdError::MalformedResponse(_)));
    assert_eq!(service.current_product(), Some(manual));

    // Only the two successful generations were published.
    assert_eq!(*seen.lock().unwrap(), vec!["Rocket skates", "Hammock"]);
}

#[test]
fn unreachable_server_is_request_failed() {
    // Bind then drop to get a port with nothing listening.
    let addr = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
    let service = AdService::from_config(
        &config(&format!("http://{addr}")),
        UreqTransport::new(),
        Arc::new(MemoryStorage::new()),
    );

    let err = service.request_ad_from_url("https://acme.com/p").unwrap_err();
    assert!(matches!(err, AdError::RequestFailed { status: None, .. }));
    assert!(service.current_product().is_none());
}

#[test]
fn record_survives_restart() {
    let base_url = start_mock_server();
    let dir = tempfile::TempDir::new().unwrap();

    let generated = {
        let service = AdService::from_config(
            &config(&base_url),
            UreqTransport::new(),
            Arc::new(FileStorage::new(dir.path())),
        );
        service
            .request_ad_from_fields(&ManualFields::new("Acme", "Widget"))
            .unwrap()
    };

    let reopened = ProductRecordStore::new(Arc::new(FileStorage::new(dir.path())));
    assert_eq!(reopened.current(), Some(generated));
}
