//! Core business logic - catalog maintenance and the cost engine.
//!
//! Data flows one way: [`resolver`] → [`dedup`] → [`association`] → [`costing`], with
//! [`unit_of_work`] holding the transaction the whole sequence runs in. The entity modules
//! ([`material`], [`product`], [`service`], [`worker`], [`process`]) drive those steps from their
//! create, update and delete flows.

pub mod association;
pub mod catalog;
pub mod costing;
pub mod dedup;
pub mod material;
pub mod process;
pub mod product;
pub mod resolver;
pub mod service;
pub mod unit_of_work;
pub mod validate;
pub mod worker;
