//! Whole checkout flows against the wired application state.

#![allow(clippy::unwrap_used)]

use verdant_core::CurrencyCode;
use verdant_integration_tests::TestContext;
use verdant_storefront::checkout::{
    CardDetails, CheckoutError, CheckoutForm, CheckoutPhase, PaymentMethod, SubmitOutcome,
};

fn form(method: PaymentMethod) -> CheckoutForm {
    CheckoutForm {
        name: "Grace Hopper".to_string(),
        email: "grace@example.com".to_string(),
        address: "1 Harbor Way".to_string(),
        city: "Arlington".to_string(),
        postal_code: "22201".to_string(),
        payment_method: method,
        card: None,
    }
}

#[tokio::test]
async fn test_empty_cart_cannot_check_out() {
    let mut ctx = TestContext::new();

    let err = ctx
        .state
        .checkout
        .submit(&form(PaymentMethod::Cash), &mut ctx.state.cart, &ctx.state.currency)
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::EmptyCart));
}

#[tokio::test]
async fn test_validation_reports_every_bad_field() {
    let mut ctx = TestContext::new();
    let milk = ctx.product("Whole Milk Gallon");
    ctx.state.cart.add_item(milk);

    let bad = CheckoutForm {
        name: "G".to_string(),
        email: "grace@".to_string(),
        address: "1 H".to_string(),
        city: "A".to_string(),
        postal_code: "2220".to_string(),
        payment_method: PaymentMethod::Card,
        card: Some(CardDetails {
            number: "4242-4242-4242-4242".to_string(),
            expiry: "13/27".to_string(),
            cvc: "12".to_string(),
        }),
    };

    let err = ctx
        .state
        .checkout
        .submit(&bad, &mut ctx.state.cart, &ctx.state.currency)
        .await
        .unwrap_err();

    let CheckoutError::Validation(errors) = err else {
        panic!("expected validation failure");
    };
    for field in [
        "name",
        "email",
        "address",
        "city",
        "postal_code",
        "card_number",
        "card_expiry",
        "card_cvc",
    ] {
        assert!(errors.field(field).is_some(), "missing message for {field}");
    }
    assert_eq!(ctx.state.checkout.phase(), CheckoutPhase::Editing);
    assert!(!ctx.state.cart.is_empty());
}

#[tokio::test]
async fn test_postal_code_boundaries() {
    let mut ctx = TestContext::new();
    let milk = ctx.product("Whole Milk Gallon");
    ctx.state.cart.add_item(milk);

    let ok = CheckoutForm {
        postal_code: "12345".to_string(),
        ..form(PaymentMethod::Cash)
    };
    assert!(ok.validate().is_ok());

    for bad in ["1234", "123456", "12 45", "1234a"] {
        let form = CheckoutForm {
            postal_code: bad.to_string(),
            ..form(PaymentMethod::Cash)
        };
        assert!(form.validate().is_err(), "postal {bad:?} should fail");
    }
}

#[tokio::test]
async fn test_cash_checkout_places_order_and_clears_cart() {
    let mut ctx = TestContext::new();
    let bread = ctx.product("Sourdough Bread Loaf");
    ctx.state.cart.add_item(bread.clone());
    ctx.state.cart.add_item(bread);

    let outcome = ctx
        .state
        .checkout
        .submit(&form(PaymentMethod::Cash), &mut ctx.state.cart, &ctx.state.currency)
        .await
        .unwrap();

    let SubmitOutcome::Completed(confirmation) = outcome else {
        panic!("expected a completed order");
    };
    assert_eq!(confirmation.payment_method, PaymentMethod::Cash);
    assert_eq!(confirmation.total.to_string(), "$12.50");
    assert!(ctx.state.cart.is_empty());
    assert_eq!(ctx.state.checkout.phase(), CheckoutPhase::Succeeded);

    // No payment intent for cash orders.
    assert!(ctx.gateway.requests().is_empty());

    // The emptied cart is what a new session sees.
    let reopened = ctx.reopen();
    assert!(reopened.state.cart.is_empty());
}

#[tokio::test]
async fn test_card_checkout_requests_intent_then_confirms() {
    let mut ctx = TestContext::new();
    let plugs = ctx.product("Premium Spark Plugs");
    ctx.state.cart.add_item(plugs);

    let outcome = ctx
        .state
        .checkout
        .submit(&form(PaymentMethod::Card), &mut ctx.state.cart, &ctx.state.currency)
        .await
        .unwrap();

    let SubmitOutcome::CardPaymentPending { client_secret } = outcome else {
        panic!("expected a pending card payment");
    };
    assert_eq!(client_secret, "pi_test_secret_4500");
    assert_eq!(ctx.gateway.requests(), vec![(4500, CurrencyCode::USD)]);
    assert!(!ctx.state.cart.is_empty());

    let confirmation = ctx
        .state
        .checkout
        .confirm_card_payment(&mut ctx.state.cart, &ctx.state.currency)
        .unwrap();
    assert_eq!(confirmation.payment_method, PaymentMethod::Card);
    assert!(ctx.state.cart.is_empty());
}

#[tokio::test]
async fn test_cart_change_invalidates_held_intent() {
    let mut ctx = TestContext::new();
    let plugs = ctx.product("Premium Spark Plugs");
    let milk = ctx.product("Whole Milk Gallon");
    ctx.state.cart.add_item(plugs);

    ctx.state
        .checkout
        .submit(&form(PaymentMethod::Card), &mut ctx.state.cart, &ctx.state.currency)
        .await
        .unwrap();

    // Shopper edits the cart while the provider UI is open.
    ctx.state.cart.add_item(milk);

    let err = ctx
        .state
        .checkout
        .confirm_card_payment(&mut ctx.state.cart, &ctx.state.currency)
        .unwrap_err();
    assert!(matches!(err, CheckoutError::StaleIntent));

    // Resubmitting requests a fresh intent for the new total.
    let outcome = ctx
        .state
        .checkout
        .submit(&form(PaymentMethod::Card), &mut ctx.state.cart, &ctx.state.currency)
        .await
        .unwrap();
    let SubmitOutcome::CardPaymentPending { client_secret } = outcome else {
        panic!("expected a pending card payment");
    };
    assert_eq!(client_secret, "pi_test_secret_4850");
    assert_eq!(ctx.gateway.requests().len(), 2);
}

#[tokio::test]
async fn test_gateway_outage_keeps_cart_and_form_editable() {
    let mut ctx = TestContext::new();
    let plugs = ctx.product("Premium Spark Plugs");
    ctx.state.cart.add_item(plugs);
    ctx.gateway.set_fail(true);

    let err = ctx
        .state
        .checkout
        .submit(&form(PaymentMethod::Card), &mut ctx.state.cart, &ctx.state.currency)
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::Payment(_)));
    assert_eq!(ctx.state.checkout.phase(), CheckoutPhase::Editing);
    assert!(!ctx.state.cart.is_empty());

    // Cash remains available as a fallback.
    let outcome = ctx
        .state
        .checkout
        .submit(&form(PaymentMethod::Cash), &mut ctx.state.cart, &ctx.state.currency)
        .await
        .unwrap();
    assert!(matches!(outcome, SubmitOutcome::Completed(_)));
}

#[tokio::test]
async fn test_order_total_reflects_active_currency() {
    let mut ctx = TestContext::new();
    let bread = ctx.product("Sourdough Bread Loaf");
    ctx.state.cart.add_item(bread);
    ctx.state.currency.set_currency("EUR");

    let outcome = ctx
        .state
        .checkout
        .submit(&form(PaymentMethod::Cash), &mut ctx.state.cart, &ctx.state.currency)
        .await
        .unwrap();

    let SubmitOutcome::Completed(confirmation) = outcome else {
        panic!("expected a completed order");
    };
    // 6.25 USD at the 0.92 EUR rate.
    assert_eq!(confirmation.total.to_string(), "€5.75");
}
