//! Core types and trait definitions for the helpdesk ticket store.
//!
//! Tickets, their validation rules, and the [`store::TicketStore`] trait.
//! No HTTP or database code lives here.

#![allow(async_fn_in_trait)]

pub mod error;
pub mod store;
pub mod ticket;
pub mod validate;

pub use error::{DomainError, Error, Result};
