//! Client library for the clusto resource-management service
//!
//! [`ClustoClient`] talks to the service over HTTP; [`EntityProxy`] stands in
//! for one remote entity and caches what the service last told it.

pub mod client;
pub mod config;
pub mod config_discovery;
pub mod entity;
pub mod logging;

pub use client::{
    ActionArgs, ArgValue, ClustoClient, ClustoError, EntityQuery, RawResponse, Result,
};
pub use entity::{AttrFilter, Attribute, Descriptor, EntityProxy};
