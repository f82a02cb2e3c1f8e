//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, bookings, customers, equipment, health, quotations, settings, stats};

/// Registers the JWT bearer scheme referenced by `security(("bearer_auth" = []))`
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "RentFlow API",
        version = "1.0.0",
        description = "Equipment rental back-office REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        auth::change_password,
        auth::register,
        // Equipment
        equipment::list_equipment,
        equipment::get_equipment,
        equipment::create_equipment,
        equipment::update_equipment,
        equipment::delete_equipment,
        // Customers
        customers::list_customers,
        customers::get_customer,
        customers::create_customer,
        customers::update_customer,
        customers::delete_customer,
        // Quotations
        quotations::list_quotations,
        quotations::get_quotation,
        quotations::create_quotation,
        quotations::send_quotation,
        quotations::accept_quotation,
        quotations::decline_quotation,
        quotations::quotation_pdf,
        // Bookings
        bookings::list_bookings,
        bookings::get_booking,
        bookings::create_booking,
        bookings::start_booking,
        bookings::complete_booking,
        bookings::cancel_booking,
        bookings::override_booking_status,
        bookings::booking_pdf,
        // Stats
        stats::get_stats,
        // Settings
        settings::get_settings,
        settings::update_settings,
        settings::upload_logo,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            crate::models::user::Role,
            crate::models::user::RegisterUser,
            crate::models::user::ChangePassword,
            // Equipment
            crate::models::equipment::Equipment,
            crate::models::equipment::EquipmentStatus,
            crate::models::equipment::CreateEquipment,
            crate::models::equipment::UpdateEquipment,
            // Customers
            crate::models::customer::Customer,
            crate::models::customer::CreateCustomer,
            crate::models::customer::UpdateCustomer,
            // Quotations
            crate::models::quotation::Quotation,
            crate::models::quotation::QuotationStatus,
            crate::models::quotation::QuotationItem,
            crate::models::quotation::LineItemRequest,
            crate::models::quotation::CreateQuotation,
            // Bookings
            crate::models::booking::Booking,
            crate::models::booking::BookingStatus,
            crate::models::booking::BookingItem,
            crate::models::booking::CreateBooking,
            crate::models::booking::BookingStatusUpdate,
            // Stats
            crate::models::stats::DashboardStats,
            crate::models::stats::EquipmentStats,
            crate::models::stats::QuotationStats,
            crate::models::stats::BookingStats,
            // Settings
            crate::models::settings::Settings,
            crate::models::settings::UpdateSettings,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "equipment", description = "Equipment catalogue"),
        (name = "customers", description = "Customer records"),
        (name = "quotations", description = "Quotations and their lifecycle"),
        (name = "bookings", description = "Bookings and rental lifecycle"),
        (name = "stats", description = "Dashboard statistics"),
        (name = "settings", description = "Business settings")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_lifecycle_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/quotations/{id}/accept"));
        assert!(doc.paths.paths.contains_key("/bookings/{id}/status"));

        let equipment = &doc.paths.paths["/equipment/{id}"];
        let update = equipment
            .operations
            .get(&utoipa::openapi::PathItemType::Put)
            .expect("update operation");
        assert!(update.responses.responses.contains_key("400"));
        assert!(update.responses.responses.contains_key("404"));
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
