//! gRPC server implementation for the payment service.

pub mod payment_svc;

pub use payment_svc::PaymentServiceImpl;
