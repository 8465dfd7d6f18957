use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    domain::{
        slots::TimeSlot,
        status::BookingStatus,
        tier::{MembershipStatus, Tier},
    },
    dto::{
        auth::{
            LoginRequest, LoginResponse, MeResponse, PasswordResetConfirmRequest,
            PasswordResetRequest, PasswordResetTokenResponse, RegisterRequest,
        },
        bookings::{
            Availability, BookingList, CreateBookingRequest, SlotAvailability,
            UpdateBookingStatusRequest,
        },
        customers::{CustomerList, ImportResult},
        dashboard::{CustomerDashboard, DailyRevenue, OwnerDashboard, StaffDashboard},
        memberships::{
            CreateMembershipRequest, DiscountInfo, MembershipList, TierInfo,
            UpdateMembershipStatusRequest,
        },
        reports::{RevenueReport, RevenueRow},
        stock::{AdjustStockRequest, CreateStockRequest, StockList, UpdateStockRequest},
    },
    middleware::auth::Role,
    models::{Booking, Customer, Membership, StockItem},
    response::{ApiResponse, ErrorResponse, Meta},
    routes::{auth, bookings, customers, dashboard, health, memberships, reports, stock},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
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
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::logout,
        auth::me,
        auth::create_password_reset,
        auth::confirm_password_reset,
        bookings::availability,
        bookings::list_bookings,
        bookings::create_booking,
        bookings::get_booking,
        bookings::update_booking_status,
        bookings::delete_booking,
        memberships::list_tiers,
        memberships::my_discount,
        memberships::list_memberships,
        memberships::create_membership,
        memberships::get_membership,
        memberships::update_membership_status,
        memberships::delete_membership,
        stock::list_stock,
        stock::list_low_stock,
        stock::create_stock,
        stock::get_stock,
        stock::update_stock,
        stock::delete_stock,
        stock::adjust_stock,
        customers::list_customers,
        customers::get_customer,
        customers::import_customers,
        customers::export_customers,
        reports::revenue,
        reports::revenue_csv,
        dashboard::owner,
        dashboard::staff,
        dashboard::customer
    ),
    components(
        schemas(
            Role,
            BookingStatus,
            Tier,
            MembershipStatus,
            TimeSlot,
            Booking,
            Membership,
            Customer,
            StockItem,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            MeResponse,
            PasswordResetRequest,
            PasswordResetTokenResponse,
            PasswordResetConfirmRequest,
            CreateBookingRequest,
            UpdateBookingStatusRequest,
            BookingList,
            SlotAvailability,
            Availability,
            CreateMembershipRequest,
            UpdateMembershipStatusRequest,
            MembershipList,
            TierInfo,
            DiscountInfo,
            CreateStockRequest,
            UpdateStockRequest,
            AdjustStockRequest,
            StockList,
            CustomerList,
            ImportResult,
            RevenueRow,
            RevenueReport,
            DailyRevenue,
            OwnerDashboard,
            StaffDashboard,
            CustomerDashboard,
            Meta,
            ErrorResponse,
            ApiResponse<Booking>,
            ApiResponse<BookingList>,
            ApiResponse<Availability>,
            ApiResponse<Membership>,
            ApiResponse<MembershipList>,
            ApiResponse<StockList>,
            ApiResponse<RevenueReport>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Login, registration and password reset"),
        (name = "Bookings", description = "Court slots and bookings"),
        (name = "Memberships", description = "Membership tiers and discounts"),
        (name = "Stock", description = "Inventory endpoints"),
        (name = "Customers", description = "Customers and CRM CSV sync"),
        (name = "Reports", description = "Revenue reports"),
        (name = "Dashboard", description = "Role dashboards"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
