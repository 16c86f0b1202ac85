use actix_web::http::StatusCode;
use actix_web::{test, App};
use p2p_auction::rpc::{AuctionRpc, RpcError, CLOSE_AUCTION, OPEN_AUCTION, PLACE_BID};
use p2p_auction::web::app::{configure_app, init_app_state};
use p2p_auction::web::types::ServerIdentity;
use serde_json::{json, Value};
#[path="utils/mod.rs"] mod utils;
use utils::*;

fn payload(value: Value) -> Vec<u8> {
    serde_json::to_vec(&value).unwrap()
}

fn decode(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap()
}

#[tokio::test]
async fn open_auction_returns_the_created_auction() {
    let rpc = AuctionRpc::new(sample_ledger());

    let response = rpc
        .respond(OPEN_AUCTION, &payload(json!({"auctionId": "1", "item": "Pic#1", "price": 75})))
        .await
        .unwrap();

    assert_eq!(
        decode(&response),
        json!({"auctionId": "1", "item": "Pic#1", "price": 75.0, "bids": []})
    );
}

#[tokio::test]
async fn open_auction_fails_out_of_band() {
    let rpc = AuctionRpc::new(ledger_with_sample_auction().await);

    let duplicate = rpc
        .open_auction(&payload(json!({"auctionId": "1", "item": "Pic#1", "price": 75})))
        .await;
    assert!(matches!(duplicate, Err(RpcError::Ledger(_))));

    let malformed = rpc.open_auction(b"not json").await;
    assert!(malformed.is_err());
}

#[tokio::test]
async fn place_bid_reports_success_in_band() {
    let rpc = AuctionRpc::new(ledger_with_sample_auction().await);

    let response = rpc
        .respond(PLACE_BID, &payload(json!({"auctionId": "1", "bidder": "Client#2", "amount": 80})))
        .await
        .unwrap();

    assert_eq!(decode(&response), json!({"status": "Bid placed successfully"}));
    assert_eq!(rpc.ledger().current("1").await.unwrap().bids, vec![bid_1()]);
}

#[tokio::test]
async fn place_bid_reports_every_failure_in_band() {
    let rpc = AuctionRpc::new(ledger_with_sample_auction().await);

    let cases = vec![
        (json!({"auctionId": "42", "bidder": "Client#2", "amount": 80}), "Auction not found"),
        (json!({"auctionId": "", "bidder": "Client#2", "amount": 80}), "Invalid auctionId"),
        (json!({"auctionId": 1, "bidder": "Client#2", "amount": 80}), "Invalid auctionId"),
        (json!({"auctionId": "1", "amount": 80}), "Invalid bidder"),
        (json!({"auctionId": "1", "bidder": "Client#2", "amount": "80"}), "Invalid amount"),
        (json!({"auctionId": "1", "bidder": "Client#2", "amount": null}), "Invalid amount"),
    ];

    for (request, message) in cases {
        let response = rpc.place_bid(&payload(request.clone())).await;
        assert_eq!(decode(&response), json!({ "error": message }), "request {}", request);
    }

    let garbage = decode(&rpc.place_bid(b"{").await);
    assert!(garbage["error"].as_str().unwrap().starts_with("Malformed request"));

    assert_eq!(rpc.ledger().log_length().await.unwrap(), 1);
}

#[tokio::test]
async fn close_auction_returns_sorted_bids_and_winner() {
    let ledger = ledger_with_sample_auction().await;
    ledger.place_bid("1", "Client#2", 80.0).await.unwrap();
    ledger.place_bid("1", "Client#3", 72.0).await.unwrap();
    let rpc = AuctionRpc::new(ledger);

    let response = rpc
        .respond(CLOSE_AUCTION, &payload(json!({"auctionId": "1"})))
        .await
        .unwrap();

    assert_eq!(
        decode(&response),
        json!({
            "auctionId": "1",
            "item": "Pic#1",
            "price": 75.0,
            "bids": [
                {"bidder": "Client#3", "amount": 72.0},
                {"bidder": "Client#2", "amount": 80.0}
            ],
            "winner": {"bidder": "Client#2", "amount": 80.0}
        })
    );
}

#[tokio::test]
async fn close_unknown_auction_fails_out_of_band() {
    let rpc = AuctionRpc::new(sample_ledger());

    let err = rpc
        .close_auction(&payload(json!({"auctionId": "1"})))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Auction not found");
}

#[tokio::test]
async fn unknown_method_is_rejected() {
    let rpc = AuctionRpc::new(sample_ledger());
    let err = rpc.respond("deleteAuction", b"{}").await.unwrap_err();
    assert!(matches!(err, RpcError::UnknownMethod(ref m) if m == "deleteAuction"));
}

#[actix_web::test]
async fn http_place_bid_always_answers_ok() {
    let state = init_app_state(ledger_with_sample_auction().await, ServerIdentity::generate("local"));
    let app = test::init_service(App::new().app_data(state).configure(configure_app)).await;

    let req = test::TestRequest::post()
        .uri("/rpc/placeBid")
        .set_payload(json!({"auctionId": "42", "bidder": "Client#2", "amount": 80}).to_string())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"error": "Auction not found"}));
}

#[actix_web::test]
async fn http_status_codes_follow_the_failure() {
    let state = init_app_state(ledger_with_sample_auction().await, ServerIdentity::generate("local"));
    let app = test::init_service(App::new().app_data(state).configure(configure_app)).await;

    let cases = vec![
        ("/rpc/closeAuction", json!({"auctionId": "42"}), StatusCode::NOT_FOUND),
        ("/rpc/closeAuction", json!({"id": "1"}), StatusCode::BAD_REQUEST),
        ("/rpc/openAuction", json!({"auctionId": "1", "item": "Pic#1", "price": 1}), StatusCode::CONFLICT),
        ("/rpc/openAuction", json!({"auctionId": "", "item": "Pic#1", "price": 1}), StatusCode::BAD_REQUEST),
        ("/rpc/bidTwice", json!({}), StatusCode::NOT_FOUND),
    ];

    for (uri, request, status) in cases {
        let req = test::TestRequest::post()
            .uri(uri)
            .set_payload(request.to_string())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), status, "{} {}", uri, request);

        let body: Value = test::read_body_json(resp).await;
        assert!(body["message"].is_string(), "{} {}", uri, request);
    }
}

#[actix_web::test]
async fn http_identity_is_exposed() {
    let identity = ServerIdentity::generate("http://127.0.0.1:8080");
    let state = init_app_state(sample_ledger(), identity.clone());
    let app = test::init_service(App::new().app_data(state).configure(configure_app)).await;

    let req = test::TestRequest::get().uri("/identity").to_request();
    let body: ServerIdentity = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body, identity);
}
