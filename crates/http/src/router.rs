//! Router builder for the HTTP server

use axum::{
    error_handling::HandleErrorLayer, extract::Request, http::HeaderValue, routing::get,
    BoxError, Router,
};
use std::time::Duration;
use tower::{timeout::TimeoutLayer, ServiceBuilder};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};

use crate::error::AppError;
use uuid::{Timestamp, Uuid};

use bookstore_kernel::ModuleRegistry;

/// Builder for constructing the main HTTP router
pub struct RouterBuilder {
    router: Router,
}

impl RouterBuilder {
    /// Create a new router builder
    pub fn new() -> Self {
        Self {
            router: Router::new(),
        }
    }

    /// Add a route to the router
    pub fn route(mut self, path: &str, route: axum::routing::MethodRouter) -> Self {
        self.router = self.router.route(path, route);
        self
    }

    /// Mount a module's router under `/api/{module_name}`
    pub fn mount_module(mut self, module_name: &str, module_router: Router) -> Self {
        let api_path = format!("/api/{}", module_name);
        self.router = self.router.nest(&api_path, module_router);
        self
    }

    /// Add tracing middleware
    pub fn with_tracing(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        );
        self
    }

    /// Add CORS middleware
    pub fn with_cors(mut self) -> Self {
        self.router = self.router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
        self
    }

    /// Add request ID middleware; the id is echoed back in `x-request-id`
    pub fn with_request_id(mut self) -> Self {
        self.router = self
            .router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7));
        self
    }

    /// Add timeout middleware; an expired request answers 500 `{"message"}`
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.router = self.router.layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(move |err: BoxError| async move {
                    timeout_error(err, timeout_ms)
                }))
                .layer(TimeoutLayer::new(Duration::from_millis(timeout_ms))),
        );
        self
    }

    /// Add OpenAPI documentation by collecting specs from all modules
    pub fn with_openapi(mut self, registry: &ModuleRegistry) -> Self {
        let openapi_spec = merge_openapi(registry);

        // Deserialize our JSON spec into a proper utoipa OpenApi object
        // so SwaggerUI can serve it
        let openapi_obj: utoipa::openapi::OpenApi = serde_json::from_value(openapi_spec.clone())
            .unwrap_or_else(|err| {
                tracing::warn!(error = %err, "merged OpenAPI document rejected; serving empty spec");
                utoipa::openapi::OpenApiBuilder::new()
                    .info(
                        utoipa::openapi::InfoBuilder::new()
                            .title("Bookstore API")
                            .version("1.0.0")
                            .build(),
                    )
                    .build()
            });

        self.router = self.router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi_obj),
        );

        // Raw JSON spec for external consumers
        self.router = self.router.route(
            "/docs/openapi.json",
            get(move || async move { axum::Json(openapi_spec.clone()) }),
        );

        self
    }

    /// Build the final router
    pub fn build(self) -> Router {
        self.router
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Merge every module's OpenAPI fragment into one document, prefixing module
/// paths with `/api/{module_name}`.
pub fn merge_openapi(registry: &ModuleRegistry) -> serde_json::Value {
    let mut openapi_spec = serde_json::json!({
        "openapi": "3.1.0",
        "info": {
            "title": "Bookstore API",
            "version": "1.0.0",
            "description": "Book CRUD over MongoDB and MySQL"
        },
        "paths": {},
        "components": {
            "schemas": {}
        }
    });

    openapi_spec["components"]["schemas"]["ErrorResponse"] = serde_json::json!({
        "type": "object",
        "properties": {
            "message": {
                "type": "string"
            }
        },
        "required": ["message"]
    });

    openapi_spec["paths"]["/healthz"] = serde_json::json!({
        "get": {
            "summary": "Health check",
            "responses": {
                "200": {
                    "description": "OK",
                    "content": {
                        "text/plain": {
                            "schema": {
                                "type": "string"
                            }
                        }
                    }
                }
            }
        }
    });

    for module in registry.modules() {
        let Some(module_spec) = module.openapi() else {
            continue;
        };

        if let Some(paths) = module_spec.get("paths").and_then(|p| p.as_object()) {
            for (path, path_item) in paths {
                let prefixed_path = format!("/api/{}{}", module.name(), path);
                openapi_spec["paths"][prefixed_path] = path_item.clone();
            }
        }

        if let Some(schemas) = module_spec
            .get("components")
            .and_then(|c| c.get("schemas"))
            .and_then(|s| s.as_object())
        {
            for (schema_name, schema_def) in schemas {
                openapi_spec["components"]["schemas"][schema_name] = schema_def.clone();
            }
        }
    }

    openapi_spec
}

fn timeout_error(err: BoxError, timeout_ms: u64) -> AppError {
    if err.is::<tower::timeout::error::Elapsed>() {
        AppError::internal(format!("request timed out after {timeout_ms} ms"))
    } else {
        AppError::internal(err)
    }
}

/// Request ID generator producing time-ordered UUIDs
#[derive(Clone, Copy, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let timestamp = Timestamp::now(uuid::NoContext);
        let request_id = Uuid::new_v7(timestamp)
            .to_string()
            .parse::<HeaderValue>()
            .ok()?;
        Some(RequestId::new(request_id))
    }
}
