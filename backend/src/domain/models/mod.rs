pub mod draw_settings;
pub mod member;
pub mod payment_claim;
pub mod ticket;
