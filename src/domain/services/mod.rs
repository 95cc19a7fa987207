pub mod connections;
pub mod lifecycle;
pub mod public_link;
pub mod scheduling;
pub mod slots;
