use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    info(
        title = "Campus Events API",
        version = "0.1.0",
        description = "Campus events and clubs: listing, similarity search, calendar export, submissions and moderation"
    ),
    servers(
        (url = "/api", description = "API base path")
    ),
    nest(
        (path = "/auth", api = domain_users::ApiDoc),
        (path = "/events", api = domain_events::ApiDoc),
        (path = "/clubs", api = domain_clubs::ApiDoc)
    )
)]
pub struct ApiDoc;
