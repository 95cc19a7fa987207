pub mod google;
pub mod microsoft;
