pub mod sqlite_availability_repo;
pub mod sqlite_booking_repo;
pub mod sqlite_connection_repo;
pub mod sqlite_link_repo;
pub mod sqlite_service_repo;
pub mod sqlite_settings_repo;
