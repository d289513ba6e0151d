use crate::{handler, model};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::health_check,
        handler::add_handler,
        handler::subtract_handler,
        handler::multiply_handler,
        handler::determinant_handler,
        handler::transpose_handler,
        handler::inverse_handler,
        handler::history_handler,
        handler::clear_history_handler,
        handler::get_settings_handler,
        handler::update_settings_handler,
    ),
    components(
        schemas(
            model::BinaryOperationRequest,
            model::UnaryOperationRequest,
            model::OperationResponse,
            model::StepResponse,
            model::ResultValueResponse,
            model::HistoryEntryResponse,
            model::PreferencesSchema,
            model::StatusResponse,
            model::ErrorResponse,
        )
    ),
    tags(
        (name = "Matrix Operations", description = "Matrix arithmetic with step-by-step explanations"),
        (name = "History", description = "Recently performed operations"),
        (name = "Settings", description = "Display preferences")
    ),
    info(
        title = "Matrix Calculator API",
        version = "0.1.0",
        description = "An API for matrix operations that explains every result step by step.",
        license(
            name = "MIT/Apache-2.0",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
