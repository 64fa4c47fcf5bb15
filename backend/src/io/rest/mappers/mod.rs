//! DTO mappers between domain models and the `shared` crate.

pub mod claim_mapper;
pub mod draw_mapper;
pub mod member_mapper;
pub mod ticket_mapper;
