mod common;

use std::sync::Mutex;

use async_trait::async_trait;
use ottsonly_client::error::{Error, Field, Result};
use ottsonly_client::flows::{Destination, Navigation, PaymentMethod, PurchaseDialog};
use ottsonly_client::products::{Plan, Product};
use ottsonly_client::referrals::ReferralDashboard;
use ottsonly_client::subscriptions::Subscription;
use ottsonly_client::sync::{DisplayedBalance, ProfileSource};
use ottsonly_client::wallet::{CheckoutOptions, GatewayOutcome, PaymentGateway, VerifyPaymentRequest};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{cache_profile, signed_in_client, user_json};

fn plan(platform: &str, price: f64) -> Plan {
    Plan::from(&Product {
        id: "prod_1".to_string(),
        platform_name: platform.to_string(),
        plan_name: "Family".to_string(),
        price,
        duration_days: 30,
        stock: 10,
        is_active: true,
        description: Some("Ad-free • Background play".to_string()),
        created_at: None,
    })
}

async fn mount_order(server: &MockServer, subscription_id: &str) {
    Mock::given(method("POST"))
        .and(path("/orders/"))
        .and(body_json(json!({ "product_id": "prod_1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "order_1",
            "product_id": "prod_1",
            "amount": 100.0,
            "status": "completed",
            "subscription_id": subscription_id
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_me(server: &MockServer, balance: f64) {
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(balance)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_wallet_short_of_price_blocks_purchase_until_card() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/orders/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (client, _) = signed_in_client(&mock_server, "tok");
    let flow = client.purchase_flow();

    let mut dialog = PurchaseDialog::new(plan("Netflix", 100.0), 50.0);
    dialog.accept_terms(true);

    assert!(!flow.can_confirm(&dialog));
    assert!(dialog.warning().is_some());
    let err = flow.confirm(&dialog).await.unwrap_err();
    assert_eq!(err.field(), Some(Field::PaymentMethod));

    dialog.select_payment_method(PaymentMethod::Card);
    assert!(flow.can_confirm(&dialog));
    assert!(dialog.warning().is_none());
}

#[tokio::test]
async fn test_youtube_purchase_navigates_to_gmail_request() {
    let mock_server = MockServer::start().await;
    mount_order(&mock_server, "sub_9").await;
    mount_me(&mock_server, 350.0).await;

    let (client, _) = signed_in_client(&mock_server, "tok");
    let mut dialog = PurchaseDialog::new(plan("YouTube Premium", 100.0), 500.0);
    dialog.accept_terms(true);

    let outcome = client.purchase_flow().confirm(&dialog).await.unwrap();

    assert_eq!(outcome.message, "Successfully purchased Family for YouTube Premium!");
    // The server's figure, not 500 - 100
    assert_eq!(outcome.profile.balance(), DisplayedBalance::Confirmed(350.0));
    match outcome.navigation {
        Navigation::YoutubeGmailRequest(state) => {
            assert_eq!(state.order_id, "order_1");
            assert_eq!(state.subscription_id.as_deref(), Some("sub_9"));
            assert_eq!(state.user_id.as_deref(), Some("user_1"));
            assert_eq!(state.username.as_deref(), Some("Asha"));
            assert_eq!(state.plan_name, "Family");
            assert_eq!(state.amount, 100.0);
        }
        other => panic!("unexpected navigation {:?}", other),
    }
    assert!(!client.purchase_flow().is_processing());
}

#[tokio::test]
async fn test_other_purchase_navigates_to_subscriptions() {
    let mock_server = MockServer::start().await;
    mount_order(&mock_server, "sub_1").await;
    mount_me(&mock_server, 0.0).await;

    let (client, _) = signed_in_client(&mock_server, "tok");
    let mut dialog = PurchaseDialog::new(plan("Netflix", 100.0), 100.0);
    dialog.accept_terms(true);

    let outcome = client.purchase_flow().confirm(&dialog).await.unwrap();
    assert_eq!(outcome.navigation, Navigation::MySubscriptions);
}

#[tokio::test]
async fn test_purchase_with_failed_refresh_leaves_balance_pending() {
    let mock_server = MockServer::start().await;
    mount_order(&mock_server, "sub_1").await;

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(500).set_body_string("down"))
        .mount(&mock_server)
        .await;

    let (client, store) = signed_in_client(&mock_server, "tok");
    cache_profile(&store, user_json(500.0));

    let mut dialog = PurchaseDialog::new(plan("Netflix", 100.0), 500.0);
    dialog.accept_terms(true);

    let outcome = client.purchase_flow().confirm(&dialog).await.unwrap();

    assert_eq!(outcome.profile.source, ProfileSource::Cached);
    // The saved 500 predates the order and must not read as confirmed
    let balance = outcome.profile.balance();
    assert!(!balance.is_confirmed());
    assert_eq!(balance, DisplayedBalance::RefreshPending { last_confirmed: 500.0 });
}

#[tokio::test]
async fn test_purchase_without_any_profile_shows_no_balance() {
    let mock_server = MockServer::start().await;
    mount_order(&mock_server, "sub_1").await;

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "detail": "Token expired" })))
        .mount(&mock_server)
        .await;

    let (client, _) = signed_in_client(&mock_server, "tok");
    let mut dialog = PurchaseDialog::new(plan("Netflix", 100.0), 100.0);
    dialog.accept_terms(true);

    let outcome = client.purchase_flow().confirm(&dialog).await.unwrap();

    assert_eq!(outcome.profile.source, ProfileSource::Default);
    assert_eq!(outcome.profile.balance(), DisplayedBalance::Unknown);
    assert_eq!(outcome.profile.balance().amount(), None);
}

#[tokio::test]
async fn test_server_rejection_clears_busy_flag() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/orders/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "detail": "Out of stock" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, _) = signed_in_client(&mock_server, "tok");
    let mut dialog = PurchaseDialog::new(plan("Netflix", 100.0), 500.0);
    dialog.accept_terms(true);

    let err = client.purchase_flow().confirm(&dialog).await.unwrap_err();
    assert_eq!(err.message(), "Out of stock");
    assert!(!client.purchase_flow().is_processing());
}

fn dashboard(withdrawable: f64) -> ReferralDashboard {
    serde_json::from_value(json!({
        "referral_code": "ASHA10",
        "withdrawable_balance": withdrawable
    }))
    .unwrap()
}

#[tokio::test]
async fn test_invalid_withdrawals_never_reach_the_server() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/referrals/withdraw"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (client, _) = signed_in_client(&mock_server, "tok");
    let flow = client.withdrawal_flow();
    let upi = Destination::Upi("asha@okaxis".to_string());

    assert!(flow.submit(99.0, &upi, &dashboard(500.0)).await.is_err());
    assert!(flow.submit(600.0, &upi, &dashboard(500.0)).await.is_err());
    assert!(flow
        .submit(200.0, &Destination::Upi(String::new()), &dashboard(500.0))
        .await
        .is_err());
}

#[tokio::test]
async fn test_withdrawal_posts_amount_and_upi() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/referrals/withdraw"))
        .and(body_json(json!({ "amount": 150.0, "upi_id": "asha@okaxis" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Withdrawal request submitted",
            "request_id": "wd_1",
            "amount": 150.0,
            "upi_id": "asha@okaxis",
            "status": "pending"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/referrals/dashboard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "withdrawable_balance": 50.0 })))
        .mount(&mock_server)
        .await;

    mount_me(&mock_server, 0.0).await;

    let (client, _) = signed_in_client(&mock_server, "tok");
    let outcome = client
        .withdrawal_flow()
        .submit(150.0, &Destination::Upi("asha@okaxis".to_string()), &dashboard(200.0))
        .await
        .unwrap();

    assert_eq!(outcome.receipt.request_id.as_deref(), Some("wd_1"));
    assert_eq!(outcome.dashboard.unwrap().withdrawable_balance, 50.0);
}

fn youtube_subscription(email: Option<&str>, count: u32, max: u32) -> Subscription {
    serde_json::from_value(json!({
        "id": "sub_9",
        "platform_name": "YouTube Premium",
        "plan_name": "Family",
        "status": "active",
        "start_date": "2024-01-01T00:00:00",
        "end_date": "2024-02-01T00:00:00",
        "youtube_email": email,
        "youtube_email_edit_count": count,
        "youtube_email_max_edits": max
    }))
    .unwrap()
}

#[tokio::test]
async fn test_gmail_edits_are_gated_locally() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/subscriptions/sub_9/update-youtube-email"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (client, _) = signed_in_client(&mock_server, "tok");
    let flow = client.youtube_email_flow();

    let exhausted = youtube_subscription(Some("asha@gmail.com"), 1, 1);
    let err = flow.edit(&exhausted, "ravi@gmail.com").await.unwrap_err();
    assert_eq!(err.field(), Some(Field::Email));

    let editable = youtube_subscription(Some("asha@gmail.com"), 0, 1);
    let err = flow.edit(&editable, "asha@gmail.com").await.unwrap_err();
    assert_eq!(err.message(), "New Gmail must be different from current Gmail");

    let err = flow.edit(&editable, "asha@outlook.com").await.unwrap_err();
    assert_eq!(
        err.message(),
        "Please enter a valid Gmail address (must end with @gmail.com)"
    );

    let err = flow.submit(None, "asha@gmail.com").await.unwrap_err();
    assert_eq!(err.message(), "Subscription ID not found. Please contact support.");
}

#[tokio::test]
async fn test_gmail_edit_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/subscriptions/sub_9/update-youtube-email"))
        .and(body_json(json!({ "email": "ravi@gmail.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "YouTube email updated successfully",
            "subscription": {
                "id": "sub_9",
                "youtube_email": "ravi@gmail.com",
                "youtube_email_edit_count": 1,
                "youtube_email_max_edits": 1
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, _) = signed_in_client(&mock_server, "tok");
    let update = client
        .youtube_email_flow()
        .edit(&youtube_subscription(Some("asha@gmail.com"), 0, 1), "ravi@gmail.com")
        .await
        .unwrap();

    assert_eq!(update.subscription.youtube_email_edit_count, Some(1));
}

/// Records the options it was opened with and answers with a fixed outcome
struct FakeGateway {
    outcome: GatewayOutcome,
    seen: Mutex<Option<CheckoutOptions>>,
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn checkout(&self, options: &CheckoutOptions) -> Result<GatewayOutcome> {
        *self.seen.lock().unwrap() = Some(options.clone());
        Ok(self.outcome.clone())
    }
}

async fn mount_add_money(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/wallet/add-money"))
        .and(body_json(json!({ "amount": 499.5 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "order_id": "order_rzp_1",
            "amount": 499.5,
            "currency": "INR",
            "razorpay_key": "rzp_test_key"
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_top_up_verifies_gateway_fields() {
    let mock_server = MockServer::start().await;
    mount_add_money(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/wallet/verify-payment"))
        .and(body_json(json!({
            "razorpay_order_id": "order_rzp_1",
            "razorpay_payment_id": "pay_1",
            "razorpay_signature": "sig_1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "Payment verified" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    mount_me(&mock_server, 999.5).await;

    let (client, _) = signed_in_client(&mock_server, "tok");
    let gateway = FakeGateway {
        outcome: GatewayOutcome::Paid(VerifyPaymentRequest {
            razorpay_order_id: "order_rzp_1".to_string(),
            razorpay_payment_id: "pay_1".to_string(),
            razorpay_signature: "sig_1".to_string(),
        }),
        seen: Mutex::new(None),
    };

    let outcome = client.top_up_flow().add_money(499.5, &gateway).await.unwrap();

    let options = gateway.seen.lock().unwrap().clone().unwrap();
    assert_eq!(options.amount, 49_950);
    assert_eq!(options.currency, "INR");
    assert_eq!(options.order_id, "order_rzp_1");
    assert_eq!(outcome.message, "Successfully added ₹499.50 to your wallet!");
    assert_eq!(outcome.profile.balance(), DisplayedBalance::Confirmed(999.5));
}

#[tokio::test]
async fn test_dismissed_checkout_is_not_verified() {
    let mock_server = MockServer::start().await;
    mount_add_money(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/wallet/verify-payment"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (client, _) = signed_in_client(&mock_server, "tok");
    let gateway = FakeGateway {
        outcome: GatewayOutcome::Dismissed,
        seen: Mutex::new(None),
    };

    let err = client.top_up_flow().add_money(499.5, &gateway).await.unwrap_err();
    assert!(matches!(err, Error::Gateway(_)));
    assert!(!client.top_up_flow().is_processing());
}
