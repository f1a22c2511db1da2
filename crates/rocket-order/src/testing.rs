//! In-memory collaborators for the order service tests.
#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::sync::Mutex;
use uuid::Uuid;

use rocket_core::bus::{BusError, MessageMeta, Producer};
use rocket_core::db::DatabaseError;
use rocket_core::{ErrorCode, ServiceError};

use crate::clients::{
    CatalogPart, ClientError, IamClient, InventoryClient, PaymentClient, SessionIdentity,
};
use crate::events::OrderEventPublisher;
use crate::model::{Order, PaymentMethod, StatusChange};
use crate::repository::OrderRepository;
use crate::service::OrderService;
use crate::storage::OrderDatabase;

pub const P1: Uuid = Uuid::from_u128(0x5a1e_0001_0000_4000_8000_0000_0000_0001);
pub const P2: Uuid = Uuid::from_u128(0x5a1e_0001_0000_4000_8000_0000_0000_0002);
pub const P3: Uuid = Uuid::from_u128(0x5a1e_0001_0000_4000_8000_0000_0000_0003);

pub const SESSION: &str = "4c0f7f1e-8a51-4b0e-9d2a-6c1f3e5b7a90";
pub const USER: Uuid = Uuid::from_u128(0x0a57_0001_0000_4000_8000_0000_0000_0001);

/// Catalog with P1 @100, P2 @200, P3 @50.
pub struct FakeInventory {
    parts: HashMap<Uuid, CatalogPart>,
    unavailable: AtomicBool,
    last_request: Mutex<Vec<Uuid>>,
}

impl Default for FakeInventory {
    fn default() -> Self {
        let parts = [(P1, "Raptor Engine", 100.0), (P2, "RD-180", 200.0), (P3, "LOX Tank", 50.0)]
            .into_iter()
            .map(|(id, name, price)| {
                (
                    id,
                    CatalogPart {
                        part_uuid: id,
                        name: name.into(),
                        price,
                    },
                )
            })
            .collect();
        Self {
            parts,
            unavailable: AtomicBool::new(false),
            last_request: Mutex::new(Vec::new()),
        }
    }
}

impl FakeInventory {
    pub fn set_unavailable(&self, value: bool) {
        self.unavailable.store(value, Ordering::SeqCst);
    }

    pub async fn last_request(&self) -> Vec<Uuid> {
        self.last_request.lock().await.clone()
    }
}

#[tonic::async_trait]
impl InventoryClient for FakeInventory {
    async fn list_parts(&self, part_uuids: &[Uuid]) -> Result<Vec<CatalogPart>, ClientError> {
        *self.last_request.lock().await = part_uuids.to_vec();
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ClientError::Transport("connection refused".into()));
        }
        Ok(part_uuids
            .iter()
            .filter_map(|id| self.parts.get(id).cloned())
            .collect())
    }
}

#[derive(Default)]
pub struct FakePayment {
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl FakePayment {
    pub fn set_failing(&self, value: bool) {
        self.failing.store(value, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[tonic::async_trait]
impl PaymentClient for FakePayment {
    async fn pay_order(
        &self,
        _order_uuid: Uuid,
        _user_uuid: Uuid,
        _method: PaymentMethod,
    ) -> Result<Uuid, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ClientError::Remote(ServiceError::new(
                ErrorCode::InternalError,
                "card declined",
            )));
        }
        Ok(Uuid::new_v4())
    }
}

/// Knows a single session, [`SESSION`] for [`USER`].
#[derive(Default)]
pub struct FakeIam {
    broken: AtomicBool,
}

impl FakeIam {
    pub fn set_broken(&self, value: bool) {
        self.broken.store(value, Ordering::SeqCst);
    }
}

#[tonic::async_trait]
impl IamClient for FakeIam {
    async fn whoami(&self, session_uuid: &str) -> Result<SessionIdentity, ClientError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(ClientError::Transport("iam down".into()));
        }
        if session_uuid != SESSION {
            return Err(ClientError::Remote(ErrorCode::SessionNotFound.into()));
        }
        Ok(SessionIdentity {
            session_uuid: Uuid::parse_str(SESSION).unwrap(),
            user_uuid: USER,
            login: "astro_01".into(),
        })
    }
}

/// Producer that records what it was asked to publish.
#[derive(Default)]
pub struct RecordingProducer {
    sent: Mutex<Vec<(String, String, Vec<u8>)>>,
    failing: AtomicBool,
}

impl RecordingProducer {
    pub fn set_failing(&self, value: bool) {
        self.failing.store(value, Ordering::SeqCst);
    }

    pub async fn sent(&self) -> Vec<(String, String, Vec<u8>)> {
        self.sent.lock().await.clone()
    }
}

#[tonic::async_trait]
impl Producer for RecordingProducer {
    async fn publish(
        &self,
        topic: &str,
        key: &str,
        payload: &[u8],
    ) -> Result<MessageMeta, BusError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(BusError::RetriesExhausted {
                topic: topic.to_string(),
                attempts: 4,
                last_error: "database is locked".into(),
            });
        }
        let mut sent = self.sent.lock().await;
        sent.push((topic.to_string(), key.to_string(), payload.to_vec()));
        Ok(MessageMeta {
            topic: topic.to_string(),
            partition: 0,
            offset: i64::try_from(sent.len()).unwrap() - 1,
            key: key.to_string(),
        })
    }
}

/// Order store whose status writes can be made to fail.
pub struct FlakyOrders {
    inner: OrderDatabase,
    failing_writes: AtomicBool,
}

impl FlakyOrders {
    pub fn set_failing_writes(&self, value: bool) {
        self.failing_writes.store(value, Ordering::SeqCst);
    }
}

#[tonic::async_trait]
impl OrderRepository for FlakyOrders {
    async fn insert_order(&self, order: &Order) -> Result<(), DatabaseError> {
        self.inner.insert_order(order).await
    }

    async fn get_order(&self, order_uuid: Uuid) -> Result<Option<Order>, DatabaseError> {
        self.inner.get_order(order_uuid).await
    }

    async fn apply_change(
        &self,
        order_uuid: Uuid,
        change: &StatusChange,
        at: i64,
    ) -> Result<bool, DatabaseError> {
        if self.failing_writes.load(Ordering::SeqCst) {
            return Err(DatabaseError::Busy("database is locked".into()));
        }
        self.inner.apply_change(order_uuid, change, at).await
    }
}

/// An order service over an in-memory database and fake collaborators.
pub struct Harness {
    pub service: Arc<OrderService>,
    pub db: OrderDatabase,
    pub orders: Arc<FlakyOrders>,
    pub inventory: Arc<FakeInventory>,
    pub payments: Arc<FakePayment>,
    pub producer: Arc<RecordingProducer>,
    pub iam: Arc<FakeIam>,
}

impl Harness {
    pub async fn new() -> Self {
        let db = OrderDatabase::open_in_memory().await.unwrap();
        let orders = Arc::new(FlakyOrders {
            inner: db.clone(),
            failing_writes: AtomicBool::new(false),
        });
        let inventory = Arc::new(FakeInventory::default());
        let payments = Arc::new(FakePayment::default());
        let producer = Arc::new(RecordingProducer::default());

        let events = OrderEventPublisher::new(producer.clone(), Arc::new(db.clone()), "order.paid");
        let service = Arc::new(OrderService::new(
            orders.clone(),
            inventory.clone(),
            payments.clone(),
            events,
        ));

        Self {
            service,
            db,
            orders,
            inventory,
            payments,
            producer,
            iam: Arc::new(FakeIam::default()),
        }
    }
}
