//! Tests for checkout creation and webhook dispatch.

use std::sync::Arc;

use super::*;
use crate::domain::ports::{MockPaymentProvider, MockUserRepository, UserPersistenceError};
use crate::domain::{
    CheckoutSettings, ErrorCode, SubscriptionStatus, UserDetails, UserDraft,
};
use chrono::{TimeZone, Utc};
use rstest::rstest;

const SIGNATURE: &str = "t=1700000000,v1=abc";

fn checkout_settings() -> CheckoutSettings {
    CheckoutSettings {
        price_id: "price_123".to_owned(),
        success_url: "http://localhost:3000/success?session_id={CHECKOUT_SESSION_ID}".to_owned(),
        cancel_url: "http://localhost:3000/cancel".to_owned(),
    }
}

fn make_service(
    repo: MockUserRepository,
    payments: MockPaymentProvider,
) -> UserService<MockUserRepository, MockPaymentProvider> {
    UserService::new(Arc::new(repo), Arc::new(payments), checkout_settings())
}

fn user_with(id: i64, subscription: SubscriptionState) -> User {
    let details = UserDetails::try_from(UserDraft {
        name: "Ana".to_owned(),
        email: "ana@x.com".to_owned(),
    })
    .expect("valid details");
    User::new(UserId::new(id), details, subscription)
}

fn snapshot(status: &str) -> SubscriptionSnapshot {
    SubscriptionSnapshot {
        id: "sub_1".to_owned(),
        customer_ref: "cus_1".to_owned(),
        status: SubscriptionStatus::from(status),
        current_period_end: Utc.timestamp_opt(1_735_689_600, 0).single(),
    }
}

fn session() -> CheckoutSession {
    CheckoutSession {
        id: "cs_1".to_owned(),
        url: "https://checkout.example/cs_1".to_owned(),
    }
}

#[tokio::test]
async fn checkout_rejects_active_subscription_without_provider_call() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id().times(1).return_once(|id| {
        Ok(Some(user_with(
            id.as_i64(),
            SubscriptionState {
                customer_ref: Some("cus_1".to_owned()),
                status: SubscriptionStatus::Active,
                ..SubscriptionState::default()
            },
        )))
    });
    let mut payments = MockPaymentProvider::new();
    payments.expect_create_customer().never();
    payments.expect_create_checkout_session().never();

    let service = make_service(repo, payments);
    let error = service
        .create_checkout_session(UserId::new(1))
        .await
        .expect_err("already active");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(
        error.details().and_then(|d| d.get("code")),
        Some(&serde_json::json!("subscription_already_active"))
    );
}

#[tokio::test]
async fn checkout_reports_missing_user() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id().times(1).return_once(|_| Ok(None));
    let mut payments = MockPaymentProvider::new();
    payments.expect_create_checkout_session().never();

    let service = make_service(repo, payments);
    let error = service
        .create_checkout_session(UserId::new(42))
        .await
        .expect_err("missing user");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn checkout_creates_and_persists_customer_when_missing() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(|id| Ok(Some(user_with(id.as_i64(), SubscriptionState::default()))));
    repo.expect_update_subscription()
        .withf(|id, state| {
            *id == UserId::new(1)
                && state.customer_ref.as_deref() == Some("cus_new")
                && state.status == SubscriptionStatus::Inactive
        })
        .times(1)
        .return_once(|_, _| Ok(()));

    let mut payments = MockPaymentProvider::new();
    payments
        .expect_create_customer()
        .withf(|name, email, key| name == "Ana" && email == "ana@x.com" && key == "customer-user-1")
        .times(1)
        .return_once(|_, _, _| Ok("cus_new".to_owned()));
    payments
        .expect_create_checkout_session()
        .withf(|request| {
            request.customer_ref == "cus_new"
                && request.price_id == "price_123"
                && request.quantity == 1
        })
        .times(1)
        .return_once(|_| Ok(session()));

    let service = make_service(repo, payments);
    let created = service
        .create_checkout_session(UserId::new(1))
        .await
        .expect("checkout created");
    assert_eq!(created.url, "https://checkout.example/cs_1");
}

#[tokio::test]
async fn checkout_reuses_existing_customer() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id().times(1).return_once(|id| {
        Ok(Some(user_with(
            id.as_i64(),
            SubscriptionState {
                customer_ref: Some("cus_existing".to_owned()),
                status: SubscriptionStatus::Canceled,
                ..SubscriptionState::default()
            },
        )))
    });
    repo.expect_update_subscription().never();

    let mut payments = MockPaymentProvider::new();
    payments.expect_create_customer().never();
    payments
        .expect_create_checkout_session()
        .withf(|request| request.customer_ref == "cus_existing")
        .times(1)
        .return_once(|_| Ok(session()));

    let service = make_service(repo, payments);
    service
        .create_checkout_session(UserId::new(1))
        .await
        .expect("checkout created");
}

#[tokio::test]
async fn checkout_stops_when_customer_cannot_be_persisted() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(|id| Ok(Some(user_with(id.as_i64(), SubscriptionState::default()))));
    repo.expect_update_subscription()
        .times(1)
        .return_once(|_, _| Err(UserPersistenceError::query("write failed")));

    let mut payments = MockPaymentProvider::new();
    payments
        .expect_create_customer()
        .times(1)
        .return_once(|_, _, _| Ok("cus_new".to_owned()));
    payments.expect_create_checkout_session().never();

    let service = make_service(repo, payments);
    let error = service
        .create_checkout_session(UserId::new(1))
        .await
        .expect_err("persist failure");
    assert_eq!(error.code(), ErrorCode::InternalError);
}

#[tokio::test]
async fn webhook_with_bad_signature_touches_nothing() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_customer_ref().never();
    repo.expect_update_subscription().never();

    let mut payments = MockPaymentProvider::new();
    payments
        .expect_verify_webhook()
        .times(1)
        .return_once(|_, _| Err(PaymentProviderError::signature_invalid("mismatch")));

    let service = make_service(repo, payments);
    let error = service
        .handle_provider_webhook(b"{}", SIGNATURE)
        .await
        .expect_err("verification fails");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        error.details().and_then(|d| d.get("code")),
        Some(&serde_json::json!("webhook_verification_failed"))
    );
}

#[tokio::test]
async fn webhook_with_undecodable_payload_is_internal() {
    let mut payments = MockPaymentProvider::new();
    payments
        .expect_verify_webhook()
        .times(1)
        .return_once(|_, _| Err(PaymentProviderError::invalid_payload("not json")));

    let service = make_service(MockUserRepository::new(), payments);
    let error = service
        .handle_provider_webhook(b"nope", SIGNATURE)
        .await
        .expect_err("payload invalid");
    assert_eq!(error.code(), ErrorCode::InternalError);
}

#[rstest]
#[case::updated(ProviderEvent::SubscriptionUpdated(snapshot("past_due")), "past_due")]
#[case::deleted(ProviderEvent::SubscriptionDeleted(snapshot("canceled")), "canceled")]
#[tokio::test]
async fn subscription_events_mirror_status(#[case] event: ProviderEvent, #[case] status: &str) {
    let expected = SubscriptionStatus::from(status);
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_customer_ref()
        .withf(|customer| customer == "cus_1")
        .times(1)
        .return_once(|_| {
            Ok(Some(user_with(
                9,
                SubscriptionState {
                    customer_ref: Some("cus_1".to_owned()),
                    subscription_ref: Some("sub_1".to_owned()),
                    status: SubscriptionStatus::Active,
                    current_period_end: None,
                },
            )))
        });
    repo.expect_update_subscription()
        .withf(move |id, state| {
            *id == UserId::new(9)
                && state.status == expected
                && state.customer_ref.as_deref() == Some("cus_1")
                && state.current_period_end.is_some()
        })
        .times(1)
        .return_once(|_, _| Ok(()));

    let mut payments = MockPaymentProvider::new();
    payments
        .expect_verify_webhook()
        .times(1)
        .return_once(move |_, _| Ok(event));

    let service = make_service(repo, payments);
    service
        .handle_provider_webhook(b"{}", SIGNATURE)
        .await
        .expect("event applied");
}

#[tokio::test]
async fn subscription_update_for_unknown_customer_is_noop() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_customer_ref()
        .times(1)
        .return_once(|_| Ok(None));
    repo.expect_update_subscription().never();

    let mut payments = MockPaymentProvider::new();
    payments
        .expect_verify_webhook()
        .times(1)
        .return_once(|_, _| Ok(ProviderEvent::SubscriptionUpdated(snapshot("active"))));

    let service = make_service(repo, payments);
    service
        .handle_provider_webhook(b"{}", SIGNATURE)
        .await
        .expect("silently ignored");
}

#[tokio::test]
async fn checkout_completed_fetches_subscription_and_mirrors_it() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_customer_ref()
        .withf(|customer| customer == "cus_1")
        .times(1)
        .return_once(|_| {
            Ok(Some(user_with(
                4,
                SubscriptionState {
                    customer_ref: Some("cus_1".to_owned()),
                    ..SubscriptionState::default()
                },
            )))
        });
    repo.expect_update_subscription()
        .withf(|id, state| {
            *id == UserId::new(4)
                && state.subscription_ref.as_deref() == Some("sub_1")
                && state.status == SubscriptionStatus::Active
        })
        .times(1)
        .return_once(|_, _| Ok(()));

    let mut payments = MockPaymentProvider::new();
    payments.expect_verify_webhook().times(1).return_once(|_, _| {
        Ok(ProviderEvent::CheckoutCompleted {
            customer_ref: Some("cus_1".to_owned()),
            subscription_ref: Some("sub_1".to_owned()),
        })
    });
    payments
        .expect_fetch_subscription()
        .withf(|subscription| subscription == "sub_1")
        .times(1)
        .return_once(|_| Ok(snapshot("active")));

    let service = make_service(repo, payments);
    service
        .handle_provider_webhook(b"{}", SIGNATURE)
        .await
        .expect("checkout applied");
}

#[tokio::test]
async fn checkout_completed_without_subscription_is_ignored() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_customer_ref().never();

    let mut payments = MockPaymentProvider::new();
    payments.expect_verify_webhook().times(1).return_once(|_, _| {
        Ok(ProviderEvent::CheckoutCompleted {
            customer_ref: Some("cus_1".to_owned()),
            subscription_ref: None,
        })
    });
    payments.expect_fetch_subscription().never();

    let service = make_service(repo, payments);
    service
        .handle_provider_webhook(b"{}", SIGNATURE)
        .await
        .expect("ignored");
}

#[tokio::test]
async fn unrecognized_events_are_accepted() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_customer_ref().never();
    repo.expect_update_subscription().never();

    let mut payments = MockPaymentProvider::new();
    payments.expect_verify_webhook().times(1).return_once(|_, _| {
        Ok(ProviderEvent::Unrecognized {
            event_type: "invoice.paid".to_owned(),
        })
    });

    let service = make_service(repo, payments);
    service
        .handle_provider_webhook(b"{}", SIGNATURE)
        .await
        .expect("accepted");
}
