//! Payment processing.

use tracing::info;
use uuid::Uuid;

use rocket_core::{ErrorCode, Result, ServiceError};

/// Supported payment methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    Card,
    Sbp,
    CreditCard,
    InvestorMoney,
}

impl PaymentMethod {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Card => "CARD",
            Self::Sbp => "SBP",
            Self::CreditCard => "CREDIT_CARD",
            Self::InvestorMoney => "INVESTOR_MONEY",
        }
    }
}

#[derive(Debug, Default)]
pub struct PaymentService;

impl PaymentService {
    pub const fn new() -> Self {
        Self
    }

    /// Accept a payment and return its transaction id.
    pub fn pay_order(
        &self,
        order_uuid: Uuid,
        user_uuid: Uuid,
        method: Option<PaymentMethod>,
    ) -> Result<Uuid> {
        if order_uuid.is_nil() || user_uuid.is_nil() {
            return Err(ServiceError::new(
                ErrorCode::InvalidArgument,
                "order_uuid and user_uuid must not be nil",
            ));
        }
        let method = method.ok_or_else(|| {
            ServiceError::new(ErrorCode::InvalidArgument, "payment method is required")
        })?;

        let transaction_uuid = Uuid::new_v4();
        info!(
            order_uuid = %order_uuid,
            user_uuid = %user_uuid,
            payment_method = method.as_str(),
            transaction_uuid = %transaction_uuid,
            "Payment accepted"
        );
        Ok(transaction_uuid)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn each_payment_gets_a_fresh_transaction() {
        let svc = PaymentService::new();
        let (order, user) = (Uuid::new_v4(), Uuid::new_v4());
        let a = svc.pay_order(order, user, Some(PaymentMethod::Card)).unwrap();
        let b = svc.pay_order(order, user, Some(PaymentMethod::Sbp)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn missing_method_is_invalid() {
        let err = PaymentService::new()
            .pay_order(Uuid::new_v4(), Uuid::new_v4(), None)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidArgument);
    }

    #[test]
    fn nil_ids_are_invalid() {
        let err = PaymentService::new()
            .pay_order(Uuid::nil(), Uuid::new_v4(), Some(PaymentMethod::Card))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidArgument);
    }
}
