//! Order lifecycle: create, pay, cancel and assemble.
//!
//! Every status change reads the stored order, checks the state machine,
//! then writes with a status predicate so concurrent mutators of the same
//! order cannot both win.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use rocket_core::db::{DatabaseError, unix_timestamp};
use rocket_core::events::{OrderPaidEvent, ShipAssembledEvent};
use rocket_core::{ErrorCode, Result, ServiceError};

use crate::clients::{ClientError, InventoryClient, PaymentClient};
use crate::events::OrderEventPublisher;
use crate::model::{Order, OrderDraft, OrderStatus, PaymentMethod, StatusChange, Transition};
use crate::repository::OrderRepository;

fn database_error(e: DatabaseError) -> ServiceError {
    error!(error = %e, "Order storage failed");
    ErrorCode::DatabaseError.into()
}

fn inventory_error(e: ClientError) -> ServiceError {
    match e {
        ClientError::Remote(err) => {
            warn!(code = %err.code, "Inventory rejected the part lookup");
            err
        }
        ClientError::Transport(msg) => {
            error!(error = %msg, "Inventory unreachable");
            ErrorCode::InventoryUnavailable.into()
        }
        ClientError::InvalidResponse(msg) => {
            error!(error = %msg, "Inventory sent an invalid response");
            ErrorCode::InternalError.into()
        }
    }
}

fn payment_error(e: ClientError) -> ServiceError {
    match e {
        ClientError::Remote(err)
            if matches!(err.code, ErrorCode::InvalidArgument | ErrorCode::Cancelled) =>
        {
            err
        }
        other => {
            warn!(error = %other, "Payment failed");
            ErrorCode::PaymentFailed.into()
        }
    }
}

/// Error for a guarded write that found the order in another state.
fn transition_conflict(current: OrderStatus, transition: Transition) -> ServiceError {
    match current.apply(transition) {
        Err(code) => code.into(),
        Ok(_) => ErrorCode::OrderInvalidTransition.into(),
    }
}

pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    inventory: Arc<dyn InventoryClient>,
    payments: Arc<dyn PaymentClient>,
    events: OrderEventPublisher,
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        inventory: Arc<dyn InventoryClient>,
        payments: Arc<dyn PaymentClient>,
        events: OrderEventPublisher,
    ) -> Self {
        Self {
            orders,
            inventory,
            payments,
            events,
        }
    }

    /// Price the requested parts and store a new `PENDING_PAYMENT` order.
    ///
    /// Every distinct requested id must resolve in the inventory; there
    /// are no partial orders. The total is the sum of the returned parts'
    /// prices, in inventory order.
    #[instrument(skip(self, draft), fields(user_uuid = %draft.user_uuid))]
    pub async fn create_order(&self, draft: OrderDraft) -> Result<Order> {
        if draft.user_uuid.is_nil() {
            return Err(ServiceError::new(
                ErrorCode::InvalidArgument,
                "user_uuid must not be nil",
            ));
        }
        if draft.part_uuids.is_empty() {
            return Err(ErrorCode::PartsNotSpecified.into());
        }

        let mut requested = HashSet::with_capacity(draft.part_uuids.len());
        let distinct: Vec<Uuid> = draft
            .part_uuids
            .iter()
            .copied()
            .filter(|id| requested.insert(*id))
            .collect();

        let parts = self
            .inventory
            .list_parts(&distinct)
            .await
            .map_err(inventory_error)?;
        let found: HashSet<Uuid> = parts.iter().map(|p| p.part_uuid).collect();
        let missing = requested.difference(&found).count();
        if missing > 0 {
            warn!(missing, requested = requested.len(), "Order references unknown parts");
            return Err(ErrorCode::PartsNotFound.into());
        }

        let total_price: f64 = parts
            .iter()
            .filter(|p| requested.contains(&p.part_uuid))
            .map(|p| p.price)
            .sum();

        let order = Order::new(draft, total_price, unix_timestamp());
        self.orders
            .insert_order(&order)
            .await
            .map_err(database_error)?;

        info!(
            order_uuid = %order.order_uuid,
            total_price,
            parts = order.part_uuids.len(),
            "Order created"
        );
        Ok(order)
    }

    pub async fn get_order(&self, order_uuid: Uuid) -> Result<Order> {
        self.orders
            .get_order(order_uuid)
            .await
            .map_err(database_error)?
            .ok_or_else(|| ErrorCode::OrderNotFound.into())
    }

    /// Charge the order, mark it `PAID`, then emit `OrderPaid`.
    ///
    /// The event goes out only after the status change is durable. A failed
    /// publish is deferred to the outbox and does not fail the call.
    #[instrument(skip(self), fields(order_uuid = %order_uuid))]
    pub async fn pay_order(&self, order_uuid: Uuid, method: PaymentMethod) -> Result<Uuid> {
        let order = self.get_order(order_uuid).await?;
        order.status.apply(Transition::Pay)?;

        let transaction_uuid = self
            .payments
            .pay_order(order.order_uuid, order.user_uuid, method)
            .await
            .map_err(payment_error)?;

        let change = StatusChange::Paid {
            transaction_uuid,
            payment_method: method,
        };
        let applied = self
            .orders
            .apply_change(order_uuid, &change, unix_timestamp())
            .await
            .map_err(|e| {
                error!(
                    %order_uuid,
                    %transaction_uuid,
                    error = %e,
                    "Payment captured but the order update failed"
                );
                ServiceError::from(ErrorCode::DatabaseError)
            })?;
        if !applied {
            let current = self.get_order(order_uuid).await?;
            error!(
                %order_uuid,
                %transaction_uuid,
                status = %current.status,
                "Payment captured but the order changed concurrently"
            );
            return Err(transition_conflict(current.status, Transition::Pay));
        }
        info!(%transaction_uuid, method = %method, "Order paid");

        let event = OrderPaidEvent::new(
            order_uuid,
            order.user_uuid,
            method.as_str(),
            transaction_uuid,
        );
        self.events.order_paid(&event).await;

        Ok(transaction_uuid)
    }

    #[instrument(skip(self), fields(order_uuid = %order_uuid))]
    pub async fn cancel_order(&self, order_uuid: Uuid) -> Result<()> {
        let order = self.get_order(order_uuid).await?;
        order.status.apply(Transition::Cancel)?;

        let applied = self
            .orders
            .apply_change(order_uuid, &StatusChange::Cancelled, unix_timestamp())
            .await
            .map_err(database_error)?;
        if !applied {
            let current = self.get_order(order_uuid).await?;
            return Err(transition_conflict(current.status, Transition::Cancel));
        }

        info!("Order cancelled");
        Ok(())
    }

    /// Mark a paid order `ASSEMBLED`. Redelivered events for an already
    /// assembled order succeed without changes.
    #[instrument(skip(self, event), fields(order_uuid = %event.order_uuid))]
    pub async fn on_ship_assembled(&self, event: &ShipAssembledEvent) -> Result<()> {
        let order = self.get_order(event.order_uuid).await?;
        if order.user_uuid != event.user_uuid {
            warn!(
                order_user = %order.user_uuid,
                event_user = %event.user_uuid,
                "ShipAssembled user does not match the order"
            );
        }

        if order.status.apply(Transition::Assemble)?.is_none() {
            debug!(event_uuid = %event.event_uuid, "Order already assembled");
            return Ok(());
        }

        let applied = self
            .orders
            .apply_change(event.order_uuid, &StatusChange::Assembled, unix_timestamp())
            .await
            .map_err(database_error)?;
        if !applied {
            let current = self.get_order(event.order_uuid).await?;
            if current.status == OrderStatus::Assembled {
                return Ok(());
            }
            return Err(transition_conflict(current.status, Transition::Assemble));
        }

        info!(build_time_sec = event.build_time_sec, "Order assembled");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::{Harness, P1, P2, P3};
    use rocket_core::events::DomainEvent;

    fn draft(parts: &[Uuid]) -> OrderDraft {
        OrderDraft {
            user_uuid: Uuid::new_v4(),
            part_uuids: parts.to_vec(),
        }
    }

    #[tokio::test]
    async fn create_sums_prices_and_awaits_payment() {
        let h = Harness::new().await;
        let order = h.service.create_order(draft(&[P1, P2])).await.unwrap();

        assert_eq!(order.status, OrderStatus::PendingPayment);
        assert!((order.total_price - 300.0).abs() < f64::EPSILON);
        assert_eq!(h.service.get_order(order.order_uuid).await.unwrap(), order);
    }

    #[tokio::test]
    async fn repeated_ids_must_resolve_but_are_priced_once() {
        let h = Harness::new().await;
        let order = h.service.create_order(draft(&[P1, P1, P3])).await.unwrap();

        assert_eq!(order.part_uuids, vec![P1, P1, P3]);
        assert!((order.total_price - 150.0).abs() < f64::EPSILON);
        assert_eq!(h.inventory.last_request().await, vec![P1, P3]);
    }

    #[tokio::test]
    async fn empty_parts_are_rejected() {
        let h = Harness::new().await;
        let err = h.service.create_order(draft(&[])).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PartsNotSpecified);
    }

    #[tokio::test]
    async fn nil_user_is_rejected() {
        let h = Harness::new().await;
        let err = h
            .service
            .create_order(OrderDraft {
                user_uuid: Uuid::nil(),
                part_uuids: vec![P1],
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidArgument);
    }

    #[tokio::test]
    async fn partial_inventory_creates_nothing() {
        let h = Harness::new().await;
        let err = h
            .service
            .create_order(draft(&[P1, Uuid::new_v4()]))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PartsNotFound);
        assert_eq!(h.db.count_orders().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unreachable_inventory_is_reported() {
        let h = Harness::new().await;
        h.inventory.set_unavailable(true);
        let err = h.service.create_order(draft(&[P1])).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InventoryUnavailable);
    }

    #[tokio::test]
    async fn unknown_order_is_not_found() {
        let h = Harness::new().await;
        let err = h.service.get_order(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderNotFound);
    }

    #[tokio::test]
    async fn pay_marks_paid_and_publishes() {
        let h = Harness::new().await;
        let order = h.service.create_order(draft(&[P1, P2])).await.unwrap();

        let txn = h
            .service
            .pay_order(order.order_uuid, PaymentMethod::Card)
            .await
            .unwrap();

        let stored = h.service.get_order(order.order_uuid).await.unwrap();
        assert_eq!(stored.status, OrderStatus::Paid);
        assert_eq!(stored.transaction_uuid, Some(txn));
        assert_eq!(stored.payment_method, Some(PaymentMethod::Card));

        let sent = h.producer.sent().await;
        assert_eq!(sent.len(), 1);
        let event = OrderPaidEvent::decode(&sent[0].2).unwrap();
        assert_eq!(event.order_uuid, order.order_uuid);
        assert_eq!(event.user_uuid, order.user_uuid);
        assert_eq!(event.transaction_uuid, txn);
        assert_eq!(event.payment_method, "CARD");
    }

    #[tokio::test]
    async fn paying_twice_is_rejected_without_charging() {
        let h = Harness::new().await;
        let order = h.service.create_order(draft(&[P1])).await.unwrap();
        h.service
            .pay_order(order.order_uuid, PaymentMethod::Sbp)
            .await
            .unwrap();

        let err = h
            .service
            .pay_order(order.order_uuid, PaymentMethod::Sbp)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderAlreadyPaid);
        assert_eq!(h.payments.calls(), 1);
    }

    #[tokio::test]
    async fn payment_failure_leaves_order_pending() {
        let h = Harness::new().await;
        let order = h.service.create_order(draft(&[P1])).await.unwrap();
        h.payments.set_failing(true);

        let err = h
            .service
            .pay_order(order.order_uuid, PaymentMethod::Card)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentFailed);

        let stored = h.service.get_order(order.order_uuid).await.unwrap();
        assert_eq!(stored.status, OrderStatus::PendingPayment);
        assert!(h.producer.sent().await.is_empty());
    }

    #[tokio::test]
    async fn publish_failure_keeps_order_paid_and_fills_outbox() {
        let h = Harness::new().await;
        let order = h.service.create_order(draft(&[P1])).await.unwrap();
        h.producer.set_failing(true);

        h.service
            .pay_order(order.order_uuid, PaymentMethod::Card)
            .await
            .unwrap();

        let stored = h.service.get_order(order.order_uuid).await.unwrap();
        assert_eq!(stored.status, OrderStatus::Paid);
        let pending = h.db.pending_events(10).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].msg_key, order.order_uuid.to_string());
    }

    #[tokio::test]
    async fn persist_failure_after_payment_is_a_database_error() {
        let h = Harness::new().await;
        let order = h.service.create_order(draft(&[P1])).await.unwrap();
        h.orders.set_failing_writes(true);

        let err = h
            .service
            .pay_order(order.order_uuid, PaymentMethod::Card)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(h.payments.calls(), 1);
        assert!(h.producer.sent().await.is_empty());
        assert!(h.db.pending_events(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn cancel_then_cancel_again() {
        let h = Harness::new().await;
        let order = h.service.create_order(draft(&[P3])).await.unwrap();

        h.service.cancel_order(order.order_uuid).await.unwrap();
        let stored = h.service.get_order(order.order_uuid).await.unwrap();
        assert_eq!(stored.status, OrderStatus::Cancelled);

        let err = h.service.cancel_order(order.order_uuid).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderCancelled);

        let err = h
            .service
            .pay_order(order.order_uuid, PaymentMethod::Card)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderCancelled);
    }

    #[tokio::test]
    async fn cancel_after_pay_is_forbidden() {
        let h = Harness::new().await;
        let order = h.service.create_order(draft(&[P1])).await.unwrap();
        h.service
            .pay_order(order.order_uuid, PaymentMethod::Card)
            .await
            .unwrap();

        let err = h.service.cancel_order(order.order_uuid).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderAlreadyPaid);
    }

    #[tokio::test]
    async fn assemble_is_idempotent() {
        let h = Harness::new().await;
        let order = h.service.create_order(draft(&[P1])).await.unwrap();
        h.service
            .pay_order(order.order_uuid, PaymentMethod::Card)
            .await
            .unwrap();

        let event = ShipAssembledEvent::new(order.order_uuid, order.user_uuid, 3);
        h.service.on_ship_assembled(&event).await.unwrap();
        h.service.on_ship_assembled(&event).await.unwrap();

        let stored = h.service.get_order(order.order_uuid).await.unwrap();
        assert_eq!(stored.status, OrderStatus::Assembled);
    }

    #[tokio::test]
    async fn assemble_requires_payment() {
        let h = Harness::new().await;
        let order = h.service.create_order(draft(&[P1])).await.unwrap();

        let event = ShipAssembledEvent::new(order.order_uuid, order.user_uuid, 3);
        let err = h.service.on_ship_assembled(&event).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderInvalidTransition);
    }

    #[tokio::test]
    async fn assemble_unknown_order_fails() {
        let h = Harness::new().await;
        let event = ShipAssembledEvent::new(Uuid::new_v4(), Uuid::new_v4(), 3);
        let err = h.service.on_ship_assembled(&event).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderNotFound);
    }
}
