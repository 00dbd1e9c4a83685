//! Upsell suggestions resolved against the cart and catalog.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use verdant_integration_tests::{FakeRecommender, TestContext};
use verdant_storefront::services::upsell::{Upsell, UpsellRequest};

#[tokio::test]
async fn test_suggestions_match_catalog_products() {
    let recommender = Arc::new(FakeRecommender::returning(&[
        "Wireless Headphones",
        "Smartphone X",
    ]));
    let mut ctx = TestContext::with_recommender(recommender);
    let laptop = ctx.product("Laptop Pro");
    ctx.state.cart.add_item(laptop);

    let request = UpsellRequest::from_cart(&ctx.state.cart).unwrap();
    assert_eq!(request.item_names(), ["Laptop Pro"]);

    let response = ctx.state.upsell.fetch(&request).await;
    let resolved = ctx
        .state
        .upsell
        .resolve(&response, &ctx.state.cart, &ctx.state.catalog);

    let Upsell::Suggestions(products) = resolved else {
        panic!("expected suggestions");
    };
    let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Wireless Headphones", "Smartphone X"]);
}

#[tokio::test]
async fn test_unknown_and_in_cart_names_are_dropped() {
    let recommender = Arc::new(FakeRecommender::returning(&[
        "Laptop Pro",
        "Artisanal Cheese Board",
        "Sourdough Bread Loaf",
    ]));
    let mut ctx = TestContext::with_recommender(recommender);
    let laptop = ctx.product("Laptop Pro");
    ctx.state.cart.add_item(laptop);

    let request = UpsellRequest::from_cart(&ctx.state.cart).unwrap();
    let response = ctx.state.upsell.fetch(&request).await;
    let resolved = ctx
        .state
        .upsell
        .resolve(&response, &ctx.state.cart, &ctx.state.catalog);

    let Upsell::Suggestions(products) = resolved else {
        panic!("expected suggestions");
    };
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "Sourdough Bread Loaf");
}

#[tokio::test]
async fn test_empty_cart_never_requests() {
    let ctx = TestContext::new();
    assert!(UpsellRequest::from_cart(&ctx.state.cart).is_none());
}

#[tokio::test]
async fn test_recommender_failure_collapses_to_no_suggestions() {
    let mut ctx = TestContext::with_recommender(Arc::new(FakeRecommender::failing()));
    let apples = ctx.product("Organic Gala Apples");
    ctx.state.cart.add_item(apples);

    let request = UpsellRequest::from_cart(&ctx.state.cart).unwrap();
    let response = ctx.state.upsell.fetch(&request).await;
    let resolved = ctx
        .state
        .upsell
        .resolve(&response, &ctx.state.cart, &ctx.state.catalog);

    assert_eq!(resolved, Upsell::NoSuggestions);
}

#[tokio::test]
async fn test_no_catalog_match_collapses_to_no_suggestions() {
    let recommender = Arc::new(FakeRecommender::returning(&["Quantum Toaster"]));
    let mut ctx = TestContext::with_recommender(recommender);
    let milk = ctx.product("Whole Milk Gallon");
    ctx.state.cart.add_item(milk);

    let request = UpsellRequest::from_cart(&ctx.state.cart).unwrap();
    let response = ctx.state.upsell.fetch(&request).await;
    let resolved = ctx
        .state
        .upsell
        .resolve(&response, &ctx.state.cart, &ctx.state.catalog);

    assert_eq!(resolved, Upsell::NoSuggestions);
}

#[tokio::test]
async fn test_cart_edits_during_fetch_discard_the_response() {
    let recommender = Arc::new(FakeRecommender::returning(&["Wireless Headphones"]));
    let mut ctx = TestContext::with_recommender(recommender);
    let laptop = ctx.product("Laptop Pro");
    let bread = ctx.product("Sourdough Bread Loaf");
    ctx.state.cart.add_item(laptop);

    let request = UpsellRequest::from_cart(&ctx.state.cart).unwrap();
    let response = ctx.state.upsell.fetch(&request).await;

    // Shopper keeps shopping while the fetch is in flight.
    ctx.state.cart.add_item(bread);

    let resolved = ctx
        .state
        .upsell
        .resolve(&response, &ctx.state.cart, &ctx.state.catalog);
    assert_eq!(resolved, Upsell::Stale);
}
