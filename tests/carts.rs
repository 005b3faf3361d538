mod common;

use common::spawn_app;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn active_cart_starts_empty() {
    let app = spawn_app().await;
    let token = app
        .register_and_login("cart_user0", "Muzion15", "Customer")
        .await;

    let response = app
        .client
        .get(format!("{}/api/carts/current", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send get cart request");
    assert_eq!(response.status(), StatusCode::OK);

    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse cart JSON");
    assert_eq!(body["paid"], json!(false));
    assert_eq!(body["total"], json!(0.0));
    assert_eq!(body["products"], json!([]));
}

#[tokio::test]
async fn add_to_cart_rejects_missing_and_out_of_stock_products() {
    let app = spawn_app().await;
    let manager = app
        .register_and_login("cart_mgr1", "Muzion15", "Manager")
        .await;
    let token = app
        .register_and_login("cart_user1", "Muzion15", "Customer")
        .await;
    app.seed_product(&manager, "SoldOutPhone", 0, 99.0).await;

    let response = app
        .client
        .post(format!("{}/api/carts/current/items", app.address))
        .bearer_auth(&token)
        .json(&json!({ "model": "NoSuchModel" }))
        .send()
        .await
        .expect("Failed to send add request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .client
        .post(format!("{}/api/carts/current/items", app.address))
        .bearer_auth(&token)
        .json(&json!({ "model": "SoldOutPhone" }))
        .send()
        .await
        .expect("Failed to send add request");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // neither attempt created a line item
    let cart = app
        .client
        .get(format!("{}/api/carts/current", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send get cart request")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse cart JSON");
    assert_eq!(cart["products"], json!([]));
}

#[tokio::test]
async fn repeated_adds_merge_into_one_line() {
    let app = spawn_app().await;
    let manager = app
        .register_and_login("cart_mgr2", "Muzion15", "Manager")
        .await;
    let token = app
        .register_and_login("cart_user2", "Muzion15", "Customer")
        .await;
    app.seed_product(&manager, "PhoneA", 10, 25.0).await;

    for _ in 0..3 {
        let response = app
            .client
            .post(format!("{}/api/carts/current/items", app.address))
            .bearer_auth(&token)
            .json(&json!({ "model": "PhoneA" }))
            .send()
            .await
            .expect("Failed to send add request");
        assert_eq!(response.status(), StatusCode::OK);
    }

    let cart = app
        .client
        .get(format!("{}/api/carts/current", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send get cart request")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse cart JSON");
    let products = cart["products"].as_array().expect("products array");
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["quantity"], json!(3));
    assert_eq!(cart["total"], json!(75.0));
}

#[tokio::test]
async fn checkout_of_empty_cart_is_a_conflict() {
    let app = spawn_app().await;
    let manager = app
        .register_and_login("cart_mgr3", "Muzion15", "Manager")
        .await;
    let token = app
        .register_and_login("cart_user3", "Muzion15", "Customer")
        .await;
    app.seed_product(&manager, "PhoneB", 5, 10.0).await;

    // no cart at all yet
    let response = app
        .client
        .patch(format!("{}/api/carts/current", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send checkout request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // cart exists but was emptied
    app.client
        .post(format!("{}/api/carts/current/items", app.address))
        .bearer_auth(&token)
        .json(&json!({ "model": "PhoneB" }))
        .send()
        .await
        .expect("Failed to send add request");
    app.client
        .delete(format!("{}/api/carts/current", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send clear request");

    let response = app
        .client
        .patch(format!("{}/api/carts/current", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send checkout request");
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// One unit in stock, price 20. Add, check out, then the product is
// exhausted and the paid cart moved to history.
#[tokio::test]
async fn single_unit_purchase_exhausts_stock() {
    let app = spawn_app().await;
    let manager = app
        .register_and_login("cart_mgr4", "Muzion15", "Manager")
        .await;
    let token = app
        .register_and_login("cart_user4", "Muzion15", "Customer")
        .await;
    app.seed_product(&manager, "X", 1, 20.0).await;

    let response = app
        .client
        .post(format!("{}/api/carts/current/items", app.address))
        .bearer_auth(&token)
        .json(&json!({ "model": "X" }))
        .send()
        .await
        .expect("Failed to send add request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .client
        .patch(format!("{}/api/carts/current", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send checkout request");
    assert_eq!(response.status(), StatusCode::OK);

    // stock went to zero
    let products = app
        .client
        .get(format!(
            "{}/api/products?grouping=model&model=X",
            app.address
        ))
        .bearer_auth(&manager)
        .send()
        .await
        .expect("Failed to send get products request")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse products JSON");
    assert_eq!(products[0]["quantity"], json!(0));

    // active cart is a fresh empty one
    let cart = app
        .client
        .get(format!("{}/api/carts/current", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send get cart request")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse cart JSON");
    assert_eq!(cart["paid"], json!(false));
    assert_eq!(cart["products"], json!([]));

    // the paid cart shows up in history with its total intact
    let history = app
        .client
        .get(format!("{}/api/carts/history", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send history request")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse history JSON");
    let history = history.as_array().expect("history array");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["paid"], json!(true));
    assert_eq!(history[0]["total"], json!(20.0));
    assert!(history[0]["payment_date"].is_string());

    // a second add now fails on empty stock
    let response = app
        .client
        .post(format!("{}/api/carts/current/items", app.address))
        .bearer_auth(&token)
        .json(&json!({ "model": "X" }))
        .send()
        .await
        .expect("Failed to send add request");
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// Two customers race for the last unit. Whoever checks out first wins;
// the loser's checkout must be rejected, not partially applied.
#[tokio::test]
async fn second_checkout_for_the_last_unit_fails() {
    let app = spawn_app().await;
    let manager = app
        .register_and_login("cart_mgr5", "Muzion15", "Manager")
        .await;
    let first = app
        .register_and_login("cart_user5a", "Muzion15", "Customer")
        .await;
    let second = app
        .register_and_login("cart_user5b", "Muzion15", "Customer")
        .await;
    app.seed_product(&manager, "LastUnit", 1, 20.0).await;

    for token in [&first, &second] {
        let response = app
            .client
            .post(format!("{}/api/carts/current/items", app.address))
            .bearer_auth(token)
            .json(&json!({ "model": "LastUnit" }))
            .send()
            .await
            .expect("Failed to send add request");
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .client
        .patch(format!("{}/api/carts/current", app.address))
        .bearer_auth(&first)
        .send()
        .await
        .expect("Failed to send checkout request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .client
        .patch(format!("{}/api/carts/current", app.address))
        .bearer_auth(&second)
        .send()
        .await
        .expect("Failed to send checkout request");
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn remove_one_unit_walks_the_line_down() {
    let app = spawn_app().await;
    let manager = app
        .register_and_login("cart_mgr6", "Muzion15", "Manager")
        .await;
    let token = app
        .register_and_login("cart_user6", "Muzion15", "Customer")
        .await;
    app.seed_product(&manager, "PhoneC", 5, 15.0).await;

    for _ in 0..2 {
        app.client
            .post(format!("{}/api/carts/current/items", app.address))
            .bearer_auth(&token)
            .json(&json!({ "model": "PhoneC" }))
            .send()
            .await
            .expect("Failed to send add request");
    }

    let response = app
        .client
        .delete(format!("{}/api/carts/current/items/PhoneC", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send remove request");
    assert_eq!(response.status(), StatusCode::OK);

    let cart = app
        .client
        .get(format!("{}/api/carts/current", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send get cart request")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse cart JSON");
    assert_eq!(cart["products"][0]["quantity"], json!(1));
    assert_eq!(cart["total"], json!(15.0));

    let response = app
        .client
        .delete(format!("{}/api/carts/current/items/PhoneC", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send remove request");
    assert_eq!(response.status(), StatusCode::OK);

    // line is gone; one more removal reports the cart as effectively absent
    let response = app
        .client
        .delete(format!("{}/api/carts/current/items/PhoneC", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send remove request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cart_routes_are_customer_only() {
    let app = spawn_app().await;
    let manager = app
        .register_and_login("cart_mgr7", "Muzion15", "Manager")
        .await;

    let response = app
        .client
        .get(format!("{}/api/carts/current", app.address))
        .bearer_auth(&manager)
        .send()
        .await
        .expect("Failed to send get cart request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn staff_can_list_and_wipe_all_carts() {
    let app = spawn_app().await;
    let manager = app
        .register_and_login("cart_mgr8", "Muzion15", "Manager")
        .await;
    let token = app
        .register_and_login("cart_user8", "Muzion15", "Customer")
        .await;
    app.seed_product(&manager, "PhoneD", 5, 10.0).await;

    app.client
        .post(format!("{}/api/carts/current/items", app.address))
        .bearer_auth(&token)
        .json(&json!({ "model": "PhoneD" }))
        .send()
        .await
        .expect("Failed to send add request");

    let all = app
        .client
        .get(format!("{}/api/carts", app.address))
        .bearer_auth(&manager)
        .send()
        .await
        .expect("Failed to send list carts request");
    assert_eq!(all.status(), StatusCode::OK);
    let all = all
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse carts JSON");
    assert_eq!(all.as_array().expect("carts array").len(), 1);

    let response = app
        .client
        .delete(format!("{}/api/carts", app.address))
        .bearer_auth(&manager)
        .send()
        .await
        .expect("Failed to send delete carts request");
    assert_eq!(response.status(), StatusCode::OK);

    let cart = app
        .client
        .get(format!("{}/api/carts/current", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send get cart request")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse cart JSON");
    assert_eq!(cart["products"], json!([]));
}
