//! Integration tests for booking API DTOs
//!
//! These cover request validation and model-to-response conversion. Full
//! HTTP round-trips require a database; see the flow tests in
//! lectio-services.

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use lectio_api::dto::{
        ApiResponse, BookingResponse, CreateBookingRequest, PaginationParams,
        PublicBookingRequest, ReservationResponse,
    };
    use lectio_core::models::{Reservation, ReservationStatus};
    use lectio_services::booking::{BookingConfirmation, CreateBooking, CreatePublicBooking};
    use rust_decimal_macros::dec;
    use uuid::Uuid;
    use validator::Validate;

    fn staff_request(cycle_count: i32) -> CreateBookingRequest {
        CreateBookingRequest {
            student_id: 1,
            branch_id: 2,
            plan_id: 3,
            seat_id: Some(10),
            locker_id: None,
            fee_ids: vec![5, 6],
            cycle_count,
            start_date: None,
            existing_payment_id: None,
            manual_payment: None,
        }
    }

    fn public_request(email: Option<&str>) -> PublicBookingRequest {
        PublicBookingRequest {
            full_name: "Maria Quispe".to_string(),
            phone: "51999888777".to_string(),
            email: email.map(String::from),
            branch_id: 2,
            plan_id: 3,
            seat_id: Some(10),
            locker_id: None,
            fee_ids: Vec::new(),
            cycle_count: 1,
            start_date: None,
            coupon_code: Some("WELCOME".to_string()),
            gateway_provider: "niubiz".to_string(),
            manual_proof: None,
        }
    }

    #[test]
    fn test_booking_request_validation() {
        assert!(staff_request(1).validate().is_ok());
        assert!(staff_request(36).validate().is_ok());
        assert!(staff_request(0).validate().is_err());
        assert!(staff_request(37).validate().is_err());
    }

    #[test]
    fn test_booking_request_conversion() {
        let cmd: CreateBooking = staff_request(2).into();

        assert_eq!(cmd.student_id, 1);
        assert_eq!(cmd.branch_id, 2);
        assert_eq!(cmd.plan_id, 3);
        assert_eq!(cmd.seat_id, Some(10));
        assert_eq!(cmd.fee_ids, vec![5, 6]);
        assert_eq!(cmd.cycle_count, 2);
        assert!(cmd.manual_payment.is_none());
    }

    #[test]
    fn test_public_request_validation() {
        assert!(public_request(None).validate().is_ok());
        assert!(public_request(Some("maria@example.com")).validate().is_ok());
        assert!(public_request(Some("not-an-email")).validate().is_err());

        let mut blank_phone = public_request(None);
        blank_phone.phone = "123".to_string();
        assert!(blank_phone.validate().is_err());

        let mut blank_gateway = public_request(None);
        blank_gateway.gateway_provider = String::new();
        assert!(blank_gateway.validate().is_err());
    }

    #[test]
    fn test_public_request_conversion() {
        let cmd: CreatePublicBooking = public_request(Some("maria@example.com")).into();

        assert_eq!(cmd.contact.full_name, "Maria Quispe");
        assert_eq!(cmd.contact.phone, "51999888777");
        assert_eq!(cmd.contact.email.as_deref(), Some("maria@example.com"));
        assert_eq!(cmd.coupon_code.as_deref(), Some("WELCOME"));
        assert_eq!(cmd.gateway_provider, "niubiz");
    }

    #[test]
    fn test_booking_response_conversion() {
        let reservation_id = Uuid::new_v4();
        let payment_id = Uuid::new_v4();

        let confirmation = BookingConfirmation {
            reservation_ids: vec![reservation_id],
            payment_id,
            invoice_no: "INV-20240301-A1B2C3".to_string(),
            amount: dec!(1000.00),
            discount: dec!(0.00),
            seat_label: Some("A-12".to_string()),
        };

        let response = BookingResponse::from(confirmation);

        assert_eq!(response.reservation_ids, vec![reservation_id]);
        assert_eq!(response.payment_id, payment_id);
        assert_eq!(response.invoice_no, "INV-20240301-A1B2C3");
        assert_eq!(response.amount, dec!(1000.00));
        assert_eq!(response.seat_label.as_deref(), Some("A-12"));
    }

    #[test]
    fn test_reservation_response_conversion() {
        let reservation = Reservation {
            id: Uuid::new_v4(),
            student_id: 1,
            branch_id: 2,
            plan_id: 3,
            seat_id: Some(10),
            locker_id: None,
            status: ReservationStatus::Active,
            start_date: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap(),
            amount: dec!(1000.00),
            has_locker: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let response = ReservationResponse::from(reservation.clone());

        assert_eq!(response.id, reservation.id);
        assert_eq!(response.status, "active");
        assert_eq!(response.amount, dec!(1000.00));
        assert!(!response.has_locker);
    }

    #[test]
    fn test_pagination_offset_calculation() {
        let params = PaginationParams {
            page: 1,
            per_page: 10,
        };
        assert_eq!(params.offset(), 0);

        let params = PaginationParams {
            page: 3,
            per_page: 20,
        };
        assert_eq!(params.offset(), 40);
        assert_eq!(params.limit(), 20);
    }

    #[test]
    fn test_api_response_creation() {
        let response = ApiResponse::success("test data");
        assert_eq!(response.data, "test data");
        assert!(response.message.is_none());

        let response = ApiResponse::with_message("data", "Operation successful");
        assert_eq!(response.data, "data");
        assert_eq!(response.message, Some("Operation successful".to_string()));
    }

    #[test]
    fn test_paginated_response() {
        let params = PaginationParams {
            page: 2,
            per_page: 25,
        };

        let data = vec![1, 2, 3, 4, 5];
        let response = params.paginate(data, 100);

        assert_eq!(response.data.len(), 5);
        assert_eq!(response.pagination.total, 100);
        assert_eq!(response.pagination.page, 2);
        assert_eq!(response.pagination.total_pages, 4);
    }
}
