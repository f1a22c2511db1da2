//! Order saga against real IAM, inventory and payment servers and an
//! on-disk event log shared with the assembly worker.
#![allow(clippy::unwrap_used)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tower::ServiceExt;
use uuid::Uuid;

use rocket_assembly::worker::AssemblyHandler;
use rocket_core::ErrorCode;
use rocket_core::bus::{ConsumerConfig, EventLog, GroupConsumer, LogProducer, ProducerConfig};
use rocket_core::db::unix_timestamp;
use rocket_core::events::{DomainEvent, OrderPaidEvent};
use rocket_proto::v1::auth_service_client::AuthServiceClient;
use rocket_proto::v1::auth_service_server::AuthServiceServer;
use rocket_proto::v1::inventory_service_server::InventoryServiceServer;
use rocket_proto::v1::payment_service_server::PaymentServiceServer;
use rocket_proto::v1::user_service_client::UserServiceClient;
use rocket_proto::v1::user_service_server::UserServiceServer;
use rocket_proto::v1::{LoginRequest, RegisterRequest, UserInfo};

use rocket_iam::app::{Iam, IamSettings};
use rocket_iam::auth::HashParams;
use rocket_iam::storage::IamDatabase;
use rocket_inventory::repository::InMemoryPartRepository;
use rocket_inventory::seed::demo_catalog;
use rocket_inventory::server::InventoryServiceImpl;
use rocket_inventory::service::PartService;
use rocket_payment::server::PaymentServiceImpl;

use rocket_order::clients::{GrpcIamClient, GrpcInventoryClient, GrpcPaymentClient};
use rocket_order::events::{OrderEventPublisher, ShipAssembledHandler};
use rocket_order::http::{AppState, SESSION_HEADER, Timeouts, router};
use rocket_order::model::{OrderDraft, OrderStatus, PaymentMethod};
use rocket_order::service::OrderService;
use rocket_order::storage::OrderDatabase;

const RAPTOR: Uuid = Uuid::from_u128(0x5a1e_0001_0000_4000_8000_0000_0000_0001);
const RD_180: Uuid = Uuid::from_u128(0x5a1e_0001_0000_4000_8000_0000_0000_0002);

const TIMEOUT: Duration = Duration::from_secs(5);

async fn listen() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    (listener, format!("http://{addr}"))
}

async fn spawn_iam() -> String {
    let iam = Iam::build(
        IamDatabase::open_in_memory().await.unwrap(),
        &IamSettings {
            session_ttl: Duration::from_secs(3600),
            cache_max_capacity: 100,
            access_secret: b"a".to_vec(),
            refresh_secret: b"r".to_vec(),
            access_ttl: Duration::from_secs(60),
            refresh_ttl: Duration::from_secs(600),
            hash_params: HashParams::light(),
        },
    );
    let (listener, endpoint) = listen().await;
    let router = Server::builder()
        .add_service(AuthServiceServer::new(iam.auth_service()))
        .add_service(UserServiceServer::new(iam.user_service()));
    tokio::spawn(router.serve_with_incoming(TcpListenerStream::new(listener)));
    endpoint
}

async fn spawn_inventory() -> String {
    let repo = InMemoryPartRepository::with_parts(demo_catalog(unix_timestamp()));
    let parts = Arc::new(PartService::new(Arc::new(repo)));
    let (listener, endpoint) = listen().await;
    let router = Server::builder()
        .add_service(InventoryServiceServer::new(InventoryServiceImpl::new(parts)));
    tokio::spawn(router.serve_with_incoming(TcpListenerStream::new(listener)));
    endpoint
}

async fn spawn_payment() -> String {
    let (listener, endpoint) = listen().await;
    let router =
        Server::builder().add_service(PaymentServiceServer::new(PaymentServiceImpl::default()));
    tokio::spawn(router.serve_with_incoming(TcpListenerStream::new(listener)));
    endpoint
}

struct Stack {
    orders: Arc<OrderService>,
    db: OrderDatabase,
    log: EventLog,
    producer: Arc<LogProducer>,
    iam: Arc<GrpcIamClient>,
    iam_endpoint: String,
    _dir: tempfile::TempDir,
}

impl Stack {
    async fn start() -> Self {
        let iam_endpoint = spawn_iam().await;
        let inventory_endpoint = spawn_inventory().await;
        let payment_endpoint = spawn_payment().await;

        let dir = tempfile::tempdir().unwrap();
        let log = EventLog::open(&dir.path().join("bus.db"), 2).await.unwrap();
        let producer = Arc::new(LogProducer::new(log.clone(), ProducerConfig::default()).unwrap());
        let db = OrderDatabase::open_in_memory().await.unwrap();

        let events =
            OrderEventPublisher::new(producer.clone(), Arc::new(db.clone()), "order.paid");
        let orders = Arc::new(OrderService::new(
            Arc::new(db.clone()),
            Arc::new(GrpcInventoryClient::connect_lazy(&inventory_endpoint, TIMEOUT).unwrap()),
            Arc::new(GrpcPaymentClient::connect_lazy(&payment_endpoint, TIMEOUT).unwrap()),
            events,
        ));
        let iam = Arc::new(GrpcIamClient::connect_lazy(&iam_endpoint, TIMEOUT).unwrap());

        Self {
            orders,
            db,
            log,
            producer,
            iam,
            iam_endpoint,
            _dir: dir,
        }
    }

    /// Register a user and open a session for them.
    async fn login(&self) -> (Uuid, String) {
        let mut users = UserServiceClient::connect(self.iam_endpoint.clone())
            .await
            .unwrap();
        let mut auth = AuthServiceClient::connect(self.iam_endpoint.clone())
            .await
            .unwrap();

        let user_uuid = users
            .register(RegisterRequest {
                info: Some(UserInfo {
                    login: "astro_01".into(),
                    email: "astro@rocket.factory".into(),
                    notification_methods: vec![],
                }),
                password: "StrongP@ss123!".into(),
            })
            .await
            .unwrap()
            .into_inner()
            .user_uuid;
        let session_uuid = auth
            .login(LoginRequest {
                login: "astro_01".into(),
                password: "StrongP@ss123!".into(),
            })
            .await
            .unwrap()
            .into_inner()
            .session_uuid;

        (Uuid::parse_str(&user_uuid).unwrap(), session_uuid)
    }

    async fn draft(&self, part_uuids: Vec<Uuid>) -> rocket_core::Result<rocket_order::model::Order> {
        self.orders
            .create_order(OrderDraft {
                user_uuid: Uuid::new_v4(),
                part_uuids,
            })
            .await
    }
}

#[tokio::test]
async fn paid_order_is_assembled() {
    let stack = Stack::start().await;

    let order = stack.draft(vec![RAPTOR, RD_180]).await.unwrap();
    assert!((order.total_price - 300.0).abs() < f64::EPSILON);
    assert_eq!(order.status, OrderStatus::PendingPayment);

    let txn = stack
        .orders
        .pay_order(order.order_uuid, PaymentMethod::Card)
        .await
        .unwrap();
    let paid = stack.orders.get_order(order.order_uuid).await.unwrap();
    assert_eq!(paid.status, OrderStatus::Paid);
    assert_eq!(paid.transaction_uuid, Some(txn));
    assert_eq!(paid.payment_method, Some(PaymentMethod::Card));

    let published = stack.log.topic_messages("order.paid").await.unwrap();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].msg_key, order.order_uuid.to_string());
    let event = OrderPaidEvent::decode(&published[0].payload).unwrap();
    assert_eq!(event.transaction_uuid, txn);

    let assembly = GroupConsumer::new(
        stack.log.clone(),
        ConsumerConfig::new("assembly-service", "order.paid", 3),
        Arc::new(AssemblyHandler::new(
            stack.producer.clone(),
            "ship.assembled",
            0..=0,
        )),
    )
    .unwrap();
    assert_eq!(assembly.poll_once().await.unwrap().delivered, 1);

    let order_consumer = GroupConsumer::new(
        stack.log.clone(),
        ConsumerConfig::new("order-service", "ship.assembled", 3),
        Arc::new(ShipAssembledHandler::new(stack.orders.clone())),
    )
    .unwrap();
    assert_eq!(order_consumer.poll_once().await.unwrap().delivered, 1);

    let assembled = stack.orders.get_order(order.order_uuid).await.unwrap();
    assert_eq!(assembled.status, OrderStatus::Assembled);
    assert_eq!(assembled.transaction_uuid, Some(txn));
}

#[tokio::test]
async fn pending_order_cancels_once() {
    let stack = Stack::start().await;
    let order = stack.draft(vec![RAPTOR]).await.unwrap();

    stack.orders.cancel_order(order.order_uuid).await.unwrap();
    let err = stack.orders.cancel_order(order.order_uuid).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderCancelled);

    let err = stack
        .orders
        .pay_order(order.order_uuid, PaymentMethod::Sbp)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderCancelled);
    assert!(stack.log.topic_messages("order.paid").await.unwrap().is_empty());
}

#[tokio::test]
async fn paid_order_cannot_be_cancelled() {
    let stack = Stack::start().await;
    let order = stack.draft(vec![RD_180]).await.unwrap();
    stack
        .orders
        .pay_order(order.order_uuid, PaymentMethod::InvestorMoney)
        .await
        .unwrap();

    let err = stack.orders.cancel_order(order.order_uuid).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderAlreadyPaid);
    let stored = stack.orders.get_order(order.order_uuid).await.unwrap();
    assert_eq!(stored.status, OrderStatus::Paid);
}

#[tokio::test]
async fn unknown_part_creates_nothing() {
    let stack = Stack::start().await;
    let err = stack
        .draft(vec![RAPTOR, Uuid::new_v4()])
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PartsNotFound);
    assert_eq!(stack.db.count_orders().await.unwrap(), 0);
}

#[tokio::test]
async fn http_session_is_checked_against_iam() {
    let stack = Stack::start().await;
    let (user_uuid, session_uuid) = stack.login().await;
    let app = router(
        AppState {
            orders: stack.orders.clone(),
            iam: stack.iam.clone(),
        },
        Timeouts {
            read: TIMEOUT,
            request: TIMEOUT,
        },
    );

    let body = serde_json::json!({ "part_uuids": [RAPTOR] }).to_string();
    let response = app
        .clone()
        .oneshot(
            Request::post("/api/v1/orders")
                .header(SESSION_HEADER, &session_uuid)
                .header("content-type", "application/json")
                .body(Body::from(body.clone()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: serde_json::Value =
        serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await.unwrap())
            .unwrap();
    let order_uuid = Uuid::parse_str(created["order_uuid"].as_str().unwrap()).unwrap();
    let order = stack.orders.get_order(order_uuid).await.unwrap();
    assert_eq!(order.user_uuid, user_uuid);

    let response = app
        .oneshot(
            Request::post("/api/v1/orders")
                .header(SESSION_HEADER, Uuid::new_v4().to_string())
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
