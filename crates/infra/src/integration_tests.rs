//! Integration tests for the full order-creation pipeline.
//!
//! Tests: Command → Handler → InMemoryOrderingStore → InMemoryDispatcher
//!
//! Verifies:
//! - A valid command persists buyer + order in one commit and dispatches
//!   events afterwards, creation events first
//! - Payment-method de-duplication across orders by the same identity
//! - A conflicting concurrent buyer write surfaces as a commit failure

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};

    use orderflow_app::{
        BuyerRepository, CreateOrderCommand, CreateOrderError, CreateOrderHandler, OrderRepository,
        OrderingEvent, StoreError, UnitOfWork,
    };
    use orderflow_buyers::BuyerEvent;
    use orderflow_core::{AggregateRoot, BuyerId, CardTypeId, OrderId, PaymentMethodId};
    use orderflow_events::{EventDispatcher, InMemoryDispatcher, Subscription};
    use orderflow_orders::{Address, Order, OrderEvent, OrderStatus};

    use crate::identity::StaticIdentity;
    use crate::in_memory::InMemoryOrderingStore;

    fn setup(
        identity: StaticIdentity,
    ) -> (
        InMemoryOrderingStore,
        CreateOrderHandler<Arc<InMemoryDispatcher<OrderingEvent>>>,
        Subscription<OrderingEvent>,
    ) {
        orderflow_observability::init();

        let store = InMemoryOrderingStore::new();
        let dispatcher = Arc::new(InMemoryDispatcher::new());
        let subscription = dispatcher.subscribe();
        let handler = CreateOrderHandler::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(identity),
            dispatcher,
        );
        (store, handler, subscription)
    }

    fn fake_command() -> CreateOrderCommand {
        CreateOrderCommand {
            street: "street".to_string(),
            city: "city".to_string(),
            state: "state".to_string(),
            country: "country".to_string(),
            zip_code: "zipcode".to_string(),
            card_number: "1234".to_string(),
            card_expiration: Utc::now() + Duration::days(365),
            card_security_number: "123".to_string(),
            card_holder_name: "XXX".to_string(),
            card_type_id: CardTypeId(0),
        }
    }

    fn started_order_id(subscription: &Subscription<OrderingEvent>) -> OrderId {
        loop {
            match subscription.try_recv().expect("expected a dispatched event") {
                OrderingEvent::Order(OrderEvent::OrderStarted(e)) => return e.order_id,
                _ => continue,
            }
        }
    }

    #[tokio::test]
    async fn valid_command_persists_order_and_dispatches_events() {
        let (store, handler, subscription) = setup(StaticIdentity::new("1234"));

        let created = handler.handle(fake_command()).await.unwrap();
        assert!(created);

        // Creation events arrive in raise order: verification, then start.
        let first = subscription.try_recv().unwrap();
        let verified = match first {
            OrderingEvent::Buyer(BuyerEvent::PaymentMethodVerified(e)) => e,
            other => panic!("expected PaymentMethodVerified first, got {other:?}"),
        };
        let second = subscription.try_recv().unwrap();
        let started = match second {
            OrderingEvent::Order(OrderEvent::OrderStarted(e)) => e,
            other => panic!("expected OrderStarted second, got {other:?}"),
        };
        assert_eq!(started.order_id, verified.order_id);
        assert_eq!(started.payment_method_id, verified.payment_method_id);

        // The committed order is readable and Submitted.
        let order = store.get(started.order_id).await.unwrap().expect("order committed");
        assert_eq!(order.status(), OrderStatus::Submitted);
        assert_eq!(order.buyer_id(), verified.buyer_id);
        assert_eq!(order.address().street(), "street");

        // Buyer and payment method committed in the same transaction.
        let buyer = store
            .find_by_identity("1234")
            .await
            .unwrap()
            .expect("buyer committed");
        assert_eq!(buyer.payment_methods().len(), 1);
        assert!(buyer.pending_events().is_empty());
    }

    #[tokio::test]
    async fn same_identity_and_card_reuse_one_payment_method() {
        let (store, handler, subscription) = setup(StaticIdentity::new("1234"));
        let command = fake_command();

        assert!(handler.handle(command.clone()).await.unwrap());
        assert!(handler.handle(command).await.unwrap());

        assert_eq!(store.committed_buyer_count(), 1);
        assert_eq!(store.committed_order_count(), 2);

        let buyer = store.find_by_identity("1234").await.unwrap().unwrap();
        assert_eq!(buyer.payment_methods().len(), 1);

        // Both orders reference the same stored method.
        let first_order = started_order_id(&subscription);
        let second_order = started_order_id(&subscription);
        assert_ne!(first_order, second_order);

        let method_id = buyer.payment_methods()[0].id_typed();
        for order_id in [first_order, second_order] {
            let order = store.get(order_id).await.unwrap().unwrap();
            assert_eq!(order.payment_method_id(), method_id);
        }
    }

    #[tokio::test]
    async fn staged_changes_are_invisible_until_commit() {
        let (store, _handler, _subscription) = setup(StaticIdentity::new("1234"));

        let address = Address::new("street", "city", "state", "country", "zipcode").unwrap();
        let order = Order::new(
            OrderId::new(),
            address,
            BuyerId::new(),
            PaymentMethodId::new(),
            CardTypeId(0),
            "1234",
            "XXX",
            Utc::now() + Duration::days(365),
            Utc::now(),
        );
        let order_id = order.id_typed();

        OrderRepository::add(&store, order).await.unwrap();
        assert!(store.get(order_id).await.unwrap().is_none());

        assert_eq!(store.save_changes().await.unwrap(), 1);
        assert!(store.get(order_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn concurrent_buyer_writes_surface_as_commit_failure() {
        let (store, handler, _subscription) = setup(StaticIdentity::new("1234"));
        assert!(handler.handle(fake_command()).await.unwrap());

        // Two readers load the same buyer row.
        let mut first = store.find_by_identity("1234").await.unwrap().unwrap();
        let mut second = store.find_by_identity("1234").await.unwrap().unwrap();

        let expiration = Utc::now() + Duration::days(365);
        first.verify_or_add_payment_method(
            OrderId::new(),
            "card a",
            "5555",
            "123",
            "AAA",
            expiration,
            CardTypeId(1),
            Utc::now(),
        );
        second.verify_or_add_payment_method(
            OrderId::new(),
            "card b",
            "6666",
            "123",
            "BBB",
            expiration,
            CardTypeId(2),
            Utc::now(),
        );

        BuyerRepository::update(&store, first).await.unwrap();
        assert_eq!(store.save_changes().await.unwrap(), 1);

        // The second writer is stale; its commit must fail, not lose data.
        BuyerRepository::update(&store, second).await.unwrap();
        let err = store.save_changes().await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        // The aborted batch was discarded entirely.
        assert_eq!(store.save_changes().await.unwrap(), 0);
        let buyer = store.find_by_identity("1234").await.unwrap().unwrap();
        assert_eq!(buyer.payment_methods().len(), 2);
    }

    #[tokio::test]
    async fn empty_unit_of_work_commits_zero_rows() {
        let (store, _handler, _subscription) = setup(StaticIdentity::new("1234"));
        assert_eq!(store.save_changes().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn anonymous_caller_cannot_create_orders() {
        let (store, handler, _subscription) = setup(StaticIdentity::anonymous());

        let err = handler.handle(fake_command()).await.unwrap_err();
        assert!(matches!(err, CreateOrderError::MissingIdentity));
        assert_eq!(store.committed_order_count(), 0);
    }
}
