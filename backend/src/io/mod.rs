//! # IO Module
//!
//! Interface layer exposing the domain to the UI collaborator over REST.

pub mod rest;
