//! Repository implementations for Lectio Booking

pub mod branch_repo;
pub mod fee_repo;
pub mod payment_repo;
pub mod plan_repo;
pub mod reservation_repo;
pub mod resource_repo;
pub mod student_repo;

pub use branch_repo::PgBranchRepository;
pub use fee_repo::PgFeeRepository;
pub use payment_repo::PgPaymentRepository;
pub use plan_repo::PgPlanRepository;
pub use reservation_repo::PgReservationRepository;
pub use resource_repo::PgResourceRepository;
pub use student_repo::PgStudentRepository;
