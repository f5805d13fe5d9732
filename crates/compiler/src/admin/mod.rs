//! Administration and governance binding over a built scope graph.
//!
//! Administrations attach to bound objects through an extension interface
//! (capability). Every instance backing an administered bound name must expose
//! that capability; the first capability whose type is-a the requested type
//! supplies the instance's extractor. Governance references are resolved
//! against the office governance list into a dense per-administration table.

mod administration;
mod governance;

pub(crate) use administration::{AdministrationBinder, VisibleObjects};
pub(crate) use governance::bind_governances;
