pub mod collaborators;
pub mod crypto;
pub mod factory;
pub mod providers;
pub mod repositories;
