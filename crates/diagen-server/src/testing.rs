//! Router test helpers: a scripted AI provider and a fake renderer.

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use diagen_ai::{
    AiProvider, ChatRequest, EffectiveCredential, Orchestrator, Provider, ProviderError,
    ProviderRegistry,
};
use diagen_config::{ExportConfig, ProvidersConfig};
use diagen_export::{Exporter, PdfCapabilities};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use crate::app::create_router;
use crate::state::AppState;

/// `OpenAI` stand-in answering every call with the same text.
struct Scripted {
    reply: String,
    keys: Mutex<Vec<String>>,
}

impl Provider for Scripted {
    fn id(&self) -> AiProvider {
        AiProvider::OpenAi
    }

    fn max_tokens(&self) -> u32 {
        2000
    }

    fn complete(
        &self,
        credential: &EffectiveCredential,
        _request: &ChatRequest,
    ) -> Result<String, ProviderError> {
        self.keys.lock().unwrap().push(credential.api_key.clone());
        Ok(self.reply.clone())
    }
}

/// Application wired to a scripted provider and a copying renderer.
pub(crate) struct TestApp {
    _scripts: TempDir,
    adapter: Arc<Scripted>,
    state: Arc<AppState>,
}

impl TestApp {
    /// App whose server-side `OpenAI` key is `server-openai`.
    pub(crate) fn new(reply: &str) -> Self {
        let mut providers = ProvidersConfig::default();
        providers.openai.api_key = Some("server-openai".to_owned());
        providers.claude.api_key = Some("server-claude".to_owned());
        Self::with_providers(reply, providers)
    }

    /// App without any server-side keys.
    pub(crate) fn without_keys(reply: &str) -> Self {
        Self::with_providers(reply, ProvidersConfig::default())
    }

    fn with_providers(reply: &str, providers: ProvidersConfig) -> Self {
        let adapter = Arc::new(Scripted {
            reply: reply.to_owned(),
            keys: Mutex::new(Vec::new()),
        });
        let registry = ProviderRegistry::new().register(Arc::clone(&adapter) as Arc<dyn Provider>);

        let scripts = TempDir::new().unwrap();
        let script = scripts.path().join("render.sh");
        std::fs::write(
            &script,
            "while [ $# -gt 0 ]; do\n\
             case \"$1\" in -i) i=\"$2\"; shift 2 ;; -o) o=\"$2\"; shift 2 ;; *) shift ;; esac\n\
             done\ncp \"$i\" \"$o\"\n",
        )
        .unwrap();
        let export = ExportConfig {
            renderer: "sh".to_owned(),
            renderer_args: vec![script.display().to_string()],
            ..ExportConfig::default()
        };
        let pdf = PdfCapabilities {
            raster_wrap: false,
            html_engine: None,
        };

        let state = Arc::new(AppState {
            orchestrator: Arc::new(Orchestrator::new(registry, providers)),
            exporter: Exporter::with_capabilities(&export, pdf),
            version: "0.0.0-test".to_owned(),
        });

        Self {
            _scripts: scripts,
            adapter,
            state,
        }
    }

    pub(crate) fn router(&self) -> Router {
        create_router(Arc::clone(&self.state))
    }

    /// API keys seen by the provider, in call order.
    pub(crate) fn seen_keys(&self) -> Vec<String> {
        self.adapter.keys.lock().unwrap().clone()
    }
}

/// Buffered response.
pub(crate) struct RawResponse {
    pub(crate) status: StatusCode,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Vec<u8>,
}

impl RawResponse {
    pub(crate) fn header(&self, name: &str) -> &str {
        self.headers.get(name).unwrap().to_str().unwrap()
    }

    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

async fn send(router: Router, request: Request<Body>) -> RawResponse {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();
    RawResponse {
        status,
        headers,
        body,
    }
}

pub(crate) async fn get_raw(router: Router, uri: &str) -> RawResponse {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    send(router, request).await
}

pub(crate) async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
    let response = get_raw(router, uri).await;
    (response.status, response.json())
}

pub(crate) async fn post_raw(router: Router, uri: &str, body: Value) -> RawResponse {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}

pub(crate) async fn post_json(
    router: Router,
    uri: &str,
    headers: &[(&str, &str)],
    body: Value,
) -> (StatusCode, Value) {
    let mut request = Request::post(uri).header("content-type", "application/json");
    for (name, value) in headers {
        request = request.header(*name, *value);
    }
    let request = request.body(Body::from(body.to_string())).unwrap();
    let response = send(router, request).await;
    (response.status, response.json())
}
