use axum::Router;
use gantry::kernel::server::{ApiState, system_router};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

#[derive(OpenApi)]
#[openapi(info(title = "Gantry API"))]
struct ApiDoc;

/// System routes with their API reference, followed by the routers of resolved modules.
#[allow(unreachable_pub)]
pub fn init(state: ApiState, modules: Vec<Router>) -> Router {
    let api = ApiDoc::openapi();

    // Separate the OpenAPI routes and the API documentation object
    let (openapi_routes, api_doc) =
        OpenApiRouter::with_openapi(api).merge(system_router()).with_state(state).split_for_parts();

    // Create the Scalar UI routes
    let scalar_routes = Scalar::with_url("/api", api_doc);

    modules
        .into_iter()
        .fold(Router::new().merge(openapi_routes).merge(scalar_routes), Router::merge)
        .layer(TraceLayer::new_for_http())
}
