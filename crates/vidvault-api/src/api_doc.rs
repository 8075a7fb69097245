//! OpenAPI documentation, served at `/api/openapi.json` and rendered by RapiDoc at `/docs`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use crate::setup::routes::health;
use vidvault_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vidvault API",
        version = "0.1.0",
        description = "Upload video files to a single blob container and list what has been stored."
    ),
    paths(
        health::health_check,
        handlers::video_upload::upload_videos,
        handlers::video_list::list_videos,
    ),
    components(
        schemas(
            health::HealthResponse,
            handlers::video_upload::UploadResponse,
            handlers::video_list::VideoListResponse,
            models::UploadedVideo,
            models::UploadFailure,
            models::VideoListItem,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "videos", description = "Video upload and listing"),
        (name = "health", description = "Liveness and storage configuration status")
    )
)]
pub struct ApiDoc;
