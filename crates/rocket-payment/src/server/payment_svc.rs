//! PaymentService gRPC implementation.

use tonic::{Request, Response, Status};
use tracing::instrument;

use rocket_core::convert::parse_uuid;
use rocket_proto::v1::payment_service_server::PaymentService as PaymentServiceRpc;
use rocket_proto::v1::{self, PayOrderRequest, PayOrderResponse};

use crate::service::{PaymentMethod, PaymentService};

/// Map the wire enum; `UNKNOWN` and out-of-range values map to `None`.
pub fn method_from_proto(value: i32) -> Option<PaymentMethod> {
    match v1::PaymentMethod::try_from(value).ok()? {
        v1::PaymentMethod::Card => Some(PaymentMethod::Card),
        v1::PaymentMethod::Sbp => Some(PaymentMethod::Sbp),
        v1::PaymentMethod::CreditCard => Some(PaymentMethod::CreditCard),
        v1::PaymentMethod::InvestorMoney => Some(PaymentMethod::InvestorMoney),
        v1::PaymentMethod::Unknown => None,
    }
}

#[derive(Default)]
pub struct PaymentServiceImpl {
    payments: PaymentService,
}

impl PaymentServiceImpl {
    pub const fn new(payments: PaymentService) -> Self {
        Self { payments }
    }
}

#[tonic::async_trait]
impl PaymentServiceRpc for PaymentServiceImpl {
    #[instrument(skip(self, request), fields(rpc = "PayOrder"))]
    async fn pay_order(
        &self,
        request: Request<PayOrderRequest>,
    ) -> Result<Response<PayOrderResponse>, Status> {
        let req = request.into_inner();
        let order_uuid = parse_uuid(&req.order_uuid, "order_uuid")?;
        let user_uuid = parse_uuid(&req.user_uuid, "user_uuid")?;
        let transaction_uuid =
            self.payments
                .pay_order(order_uuid, user_uuid, method_from_proto(req.payment_method))?;
        Ok(Response::new(PayOrderResponse {
            transaction_uuid: transaction_uuid.to_string(),
        }))
    }
}
