//! End-to-end booking flow tests
//!
//! These exercise the full orchestrator against a real database. Run with:
//!
//! ```text
//! DATABASE_URL=postgresql://localhost/lectio_test \
//!     cargo test -p lectio-services -- --ignored
//! ```
//!
//! The database must have the migrations applied.

use std::sync::Arc;

use chrono::{DateTime, Duration, Months, TimeZone, Utc};
use lectio_core::config::BookingConfig;
use lectio_core::AppError;
use lectio_db::{PgReservationRepository, PgStudentRepository};
use lectio_services::booking::{CreateBooking, ManualPayment};
use lectio_services::{
    AppBookingService, BookingService, DbIdentityResolver, LogReceiptDispatcher, RejectAllCoupons,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sqlx::PgPool;
use uuid::Uuid;

async fn test_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for flow tests");
    lectio_db::create_pool(&url, Some(5)).await.expect("pool")
}

fn booking_service(pool: &PgPool) -> AppBookingService {
    let students = Arc::new(PgStudentRepository::new(pool.clone()));
    BookingService::new(
        pool.clone(),
        Arc::new(PgReservationRepository::new(pool.clone())),
        Arc::clone(&students),
        Arc::new(RejectAllCoupons),
        Arc::new(LogReceiptDispatcher),
        Arc::new(DbIdentityResolver::new(students)),
        BookingConfig::default(),
    )
}

fn unique_token() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

async fn insert_branch(pool: &PgPool) -> i32 {
    sqlx::query_scalar("INSERT INTO branches (name, code) VALUES ($1, $2) RETURNING id")
        .bind("Flow Test Branch")
        .bind(format!("FT-{}", unique_token()))
        .fetch_one(pool)
        .await
        .expect("insert branch")
}

async fn insert_student(pool: &PgPool) -> i32 {
    sqlx::query_scalar("INSERT INTO students (full_name, phone) VALUES ($1, $2) RETURNING id")
        .bind("Flow Test Student")
        .bind(format!("51-{}", unique_token()))
        .fetch_one(pool)
        .await
        .expect("insert student")
}

async fn insert_monthly_plan(pool: &PgPool, price: Decimal) -> i32 {
    sqlx::query_scalar(
        "INSERT INTO plans (name, price, duration, duration_unit) \
         VALUES ($1, $2, 1, 'months') RETURNING id",
    )
    .bind(format!("Monthly {}", unique_token()))
    .bind(price)
    .fetch_one(pool)
    .await
    .expect("insert plan")
}

async fn insert_seat(pool: &PgPool, branch_id: i32) -> i32 {
    sqlx::query_scalar(
        "INSERT INTO resources (branch_id, kind, label) VALUES ($1, 'seat', $2) RETURNING id",
    )
    .bind(branch_id)
    .bind(format!("S-{}", unique_token()))
    .fetch_one(pool)
    .await
    .expect("insert seat")
}

async fn insert_active_reservation(
    pool: &PgPool,
    student_id: i32,
    branch_id: i32,
    plan_id: i32,
    seat_id: i32,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) {
    sqlx::query(
        "INSERT INTO reservations \
         (id, student_id, branch_id, plan_id, seat_id, status, start_date, end_date, amount) \
         VALUES ($1, $2, $3, $4, $5, 'active', $6, $7, $8)",
    )
    .bind(Uuid::new_v4())
    .bind(student_id)
    .bind(branch_id)
    .bind(plan_id)
    .bind(seat_id)
    .bind(start)
    .bind(end)
    .bind(dec!(1000.00))
    .execute(pool)
    .await
    .expect("insert reservation");
}

fn staff_booking(student_id: i32, branch_id: i32, plan_id: i32, seat_id: i32) -> CreateBooking {
    CreateBooking {
        student_id,
        branch_id,
        plan_id,
        seat_id: Some(seat_id),
        locker_id: None,
        fee_ids: Vec::new(),
        cycle_count: 1,
        start_date: Some(date(2024, 3, 1)),
        existing_payment_id: None,
        manual_payment: Some(ManualPayment {
            amount: dec!(1000.00),
            discount: dec!(0.00),
            method: Some("cash".to_string()),
        }),
    }
}

#[tokio::test]
#[ignore] // Requires database
async fn test_simple_booking_creates_reservation_and_payment() {
    let pool = test_pool().await;
    let service = booking_service(&pool);

    let branch_id = insert_branch(&pool).await;
    let student_id = insert_student(&pool).await;
    let plan_id = insert_monthly_plan(&pool, dec!(1000.00)).await;
    let seat_id = insert_seat(&pool, branch_id).await;

    let confirmation = service
        .create_booking(staff_booking(student_id, branch_id, plan_id, seat_id))
        .await
        .expect("booking should succeed");

    assert_eq!(confirmation.reservation_ids.len(), 1);
    assert_eq!(confirmation.amount, dec!(1000.00));
    assert_eq!(confirmation.discount, dec!(0.00));

    let (start, end, status, amount): (DateTime<Utc>, DateTime<Utc>, String, Decimal) =
        sqlx::query_as("SELECT start_date, end_date, status, amount FROM reservations WHERE id = $1")
            .bind(confirmation.reservation_ids[0])
            .fetch_one(&pool)
            .await
            .expect("reservation row");

    assert_eq!(start, date(2024, 3, 1));
    assert_eq!(end, date(2024, 4, 1));
    assert_eq!(status, "active");
    assert_eq!(amount, dec!(1000.00));

    let (payment_status, linked): (String, Option<Uuid>) =
        sqlx::query_as("SELECT status, reservation_id FROM payments WHERE id = $1")
            .bind(confirmation.payment_id)
            .fetch_one(&pool)
            .await
            .expect("payment row");

    assert_eq!(payment_status, "completed");
    assert_eq!(linked, Some(confirmation.reservation_ids[0]));

    let (current_branch,): (Option<i32>,) =
        sqlx::query_as("SELECT current_branch_id FROM students WHERE id = $1")
            .bind(student_id)
            .fetch_one(&pool)
            .await
            .expect("student row");

    assert_eq!(current_branch, Some(branch_id));
}

#[tokio::test]
#[ignore] // Requires database
async fn test_conflicting_booking_writes_nothing() {
    let pool = test_pool().await;
    let service = booking_service(&pool);

    let branch_id = insert_branch(&pool).await;
    let holder_id = insert_student(&pool).await;
    let student_id = insert_student(&pool).await;
    let plan_id = insert_monthly_plan(&pool, dec!(1000.00)).await;
    let seat_id = insert_seat(&pool, branch_id).await;

    // Another student already holds the seat over Feb 15 - Mar 15
    insert_active_reservation(
        &pool,
        holder_id,
        branch_id,
        plan_id,
        seat_id,
        date(2024, 2, 15),
        date(2024, 3, 15),
    )
    .await;

    let result = service
        .create_booking(staff_booking(student_id, branch_id, plan_id, seat_id))
        .await;

    assert!(matches!(result, Err(AppError::ResourceUnavailable(_))));

    let (reservations,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM reservations WHERE student_id = $1")
            .bind(student_id)
            .fetch_one(&pool)
            .await
            .expect("count");
    assert_eq!(reservations, 0);

    let (payments,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM payments WHERE student_id = $1")
            .bind(student_id)
            .fetch_one(&pool)
            .await
            .expect("count");
    assert_eq!(payments, 0);
}

#[tokio::test]
#[ignore] // Requires database
async fn test_renewal_chains_from_open_reservation_end() {
    let pool = test_pool().await;
    let service = booking_service(&pool);

    let branch_id = insert_branch(&pool).await;
    let student_id = insert_student(&pool).await;
    let plan_id = insert_monthly_plan(&pool, dec!(1000.00)).await;
    let seat_id = insert_seat(&pool, branch_id).await;

    // Open reservation ending 30 days from now; the requested (past) start
    // date must be ignored in favour of this end.
    let open_end = Utc::now() + Duration::days(30);
    insert_active_reservation(
        &pool,
        student_id,
        branch_id,
        plan_id,
        seat_id,
        Utc::now() - Duration::days(1),
        open_end,
    )
    .await;

    let mut cmd = staff_booking(student_id, branch_id, plan_id, seat_id);
    cmd.cycle_count = 2;
    cmd.manual_payment = Some(ManualPayment {
        amount: dec!(2000.00),
        discount: dec!(0.00),
        method: None,
    });

    let confirmation = service.create_booking(cmd).await.expect("renewal should succeed");
    assert_eq!(confirmation.reservation_ids.len(), 2);

    let rows: Vec<(DateTime<Utc>, DateTime<Utc>)> = sqlx::query_as(
        "SELECT start_date, end_date FROM reservations WHERE id = ANY($1) ORDER BY start_date",
    )
    .bind(&confirmation.reservation_ids)
    .fetch_all(&pool)
    .await
    .expect("rows");

    let second_start = open_end.checked_add_months(Months::new(1)).unwrap();
    assert_eq!(rows[0].0, open_end);
    assert_eq!(rows[0].1, second_start);
    assert_eq!(rows[1].0, second_start);
    assert_eq!(rows[1].1, open_end.checked_add_months(Months::new(2)).unwrap());
}

#[tokio::test]
#[ignore] // Requires database
async fn test_racing_bookings_on_same_seat_only_one_wins() {
    let pool = test_pool().await;
    let service = booking_service(&pool);

    let branch_id = insert_branch(&pool).await;
    let first_student = insert_student(&pool).await;
    let second_student = insert_student(&pool).await;
    let plan_id = insert_monthly_plan(&pool, dec!(1000.00)).await;
    let seat_id = insert_seat(&pool, branch_id).await;

    // Same seat, same future window, two different students: the resource
    // row lock serializes the commits and the in-transaction re-check must
    // reject whichever lands second.
    let start = Utc::now() + Duration::days(1);
    let mut first_cmd = staff_booking(first_student, branch_id, plan_id, seat_id);
    first_cmd.start_date = Some(start);
    let mut second_cmd = staff_booking(second_student, branch_id, plan_id, seat_id);
    second_cmd.start_date = Some(start);

    let (first, second) = tokio::join!(
        service.create_booking(first_cmd),
        service.create_booking(second_cmd)
    );

    let successes = [&first, &second].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one racing booking may win");

    let loser = if first.is_err() { first } else { second };
    assert!(matches!(loser, Err(AppError::ResourceUnavailable(_))));

    let (open_count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM reservations \
         WHERE seat_id = $1 AND status IN ('pending', 'active')",
    )
    .bind(seat_id)
    .fetch_one(&pool)
    .await
    .expect("count");
    assert_eq!(open_count, 1);
}
