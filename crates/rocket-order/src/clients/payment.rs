//! Payment gRPC client.

use std::time::Duration;

use tonic::transport::Channel;
use uuid::Uuid;

use rocket_proto::v1;
use rocket_proto::v1::PayOrderRequest;
use rocket_proto::v1::payment_service_client::PaymentServiceClient;

use super::{ClientError, PaymentClient, lazy_channel, response_uuid};
use crate::model::PaymentMethod;

const fn method_to_proto(method: PaymentMethod) -> v1::PaymentMethod {
    match method {
        PaymentMethod::Card => v1::PaymentMethod::Card,
        PaymentMethod::Sbp => v1::PaymentMethod::Sbp,
        PaymentMethod::CreditCard => v1::PaymentMethod::CreditCard,
        PaymentMethod::InvestorMoney => v1::PaymentMethod::InvestorMoney,
    }
}

#[derive(Clone)]
pub struct GrpcPaymentClient {
    client: PaymentServiceClient<Channel>,
}

impl GrpcPaymentClient {
    pub fn connect_lazy(addr: &str, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            client: PaymentServiceClient::new(lazy_channel(addr, timeout)?),
        })
    }
}

#[tonic::async_trait]
impl PaymentClient for GrpcPaymentClient {
    async fn pay_order(
        &self,
        order_uuid: Uuid,
        user_uuid: Uuid,
        method: PaymentMethod,
    ) -> Result<Uuid, ClientError> {
        let request = PayOrderRequest {
            order_uuid: order_uuid.to_string(),
            user_uuid: user_uuid.to_string(),
            payment_method: method_to_proto(method) as i32,
        };

        let response = self.client.clone().pay_order(request).await?.into_inner();
        response_uuid(&response.transaction_uuid, "transaction_uuid")
    }
}
