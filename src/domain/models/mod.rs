pub mod availability;
pub mod booking;
pub mod calendar;
pub mod public_link;
pub mod service;
pub mod settings;
