//! gRPC server implementation for the inventory service.

pub mod convert;
pub mod inventory_svc;

#[cfg(test)]
mod inventory_svc_tests;

pub use inventory_svc::InventoryServiceImpl;
