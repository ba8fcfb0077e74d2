use actix_web::body::MessageBody;
use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use backend::auth::USER_ID_HEADER;
use backend::config::Config;
use backend::ledger::{Ledger, LedgerState};
use backend::store::Store;
use serde_json::{json, Value};
use tempfile::TempDir;
use uuid::Uuid;

const BOUNDARY: &str = "foodbridge-test-boundary";

/// Builds the full application on an in-memory database, with pictures
/// written under the given temporary directory.
macro_rules! app {
    ($dir:expr) => {{
        let config = Config {
            upload_dir: $dir.path().join("images"),
            ..Config::default()
        };
        std::fs::create_dir_all(&config.upload_dir).unwrap();
        let store = Store::open_in_memory().unwrap();
        let (ledger, _worker) = LedgerState::start(Ledger::new(store), 16).unwrap();
        let ledger = web::Data::new(ledger);
        let config = web::Data::new(config);
        test::init_service(
            App::new().configure(move |cfg| backend::configure_app(cfg, ledger, config)),
        )
        .await
    }};
}

async fn read<B: MessageBody>(resp: ServiceResponse<B>) -> (StatusCode, Value) {
    let status = resp.status();
    let body = test::read_body(resp).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, value)
}

fn multipart(donation: &Value, picture: Option<(&str, &[u8])>) -> test::TestRequest {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"json\"\r\n\
             Content-Type: application/json\r\n\r\n{donation}\r\n"
        )
        .as_bytes(),
    );
    if let Some((filename, bytes)) = picture {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"picture\"; \
                 filename=\"{filename}\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    test::TestRequest::post()
        .uri("/api/donations")
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(body)
}

fn donation_body(quantity: f64, lat: Option<f64>, long: Option<f64>) -> Value {
    json!({
        "quantity": quantity,
        "shelfLife": "2 days",
        "location": { "name": "Corner bakery", "lat": lat, "long": long },
    })
}

fn request_body(quantity: f64) -> Value {
    json!({
        "receiverName": "Hope Shelter",
        "receiverPhone": "+91 98765 43210",
        "receiverAddress": "12 Church Street",
        "receiverLocation": { "name": "Hope Shelter", "lat": 12.9740, "long": 77.6080 },
        "quantity": quantity,
    })
}

fn as_user(req: test::TestRequest, user: Uuid) -> test::TestRequest {
    req.insert_header((USER_ID_HEADER, user.to_string()))
}

#[actix_web::test]
async fn donation_is_created_pending_and_fetched() {
    let dir = TempDir::new().unwrap();
    let app = app!(dir);
    let donor = Uuid::new_v4();

    let req = as_user(multipart(&donation_body(5.0, Some(12.97), Some(77.60)), None), donor);
    let (status, body) = read(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["msg"], "Donation request sent successfully");
    let saved = &body["savedDonation"];
    assert_eq!(saved["status"], "pending");
    assert_eq!(saved["needVolunteer"], false);
    assert_eq!(saved["donorId"], donor.to_string());
    assert_eq!(saved["pictureUrl"], Value::Null);

    let id = saved["id"].as_str().unwrap();
    let req = test::TestRequest::get().uri(&format!("/api/donations/{id}"));
    let (status, body) = read(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["donation"]["quantity"], 5.0);
}

#[actix_web::test]
async fn uploaded_picture_is_stored_by_digest_and_served() {
    let dir = TempDir::new().unwrap();
    let app = app!(dir);
    let picture: &[u8] = b"\x89PNG\r\n\x1a\nnot-really-a-png";

    let req = as_user(
        multipart(&donation_body(1.0, None, None), Some(("Bread.PNG", picture))),
        Uuid::new_v4(),
    );
    let (status, body) = read(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(status, StatusCode::CREATED);

    let mut hasher = md5::Context::new();
    hasher.consume(picture);
    let expected = format!("/images/{:x}.png", hasher.finalize());
    assert_eq!(body["savedDonation"]["pictureUrl"], expected.as_str());

    let resp = test::call_service(&app, test::TestRequest::get().uri(&expected).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(&test::read_body(resp).await[..], picture);
}

#[actix_web::test]
async fn non_image_upload_is_rejected() {
    let dir = TempDir::new().unwrap();
    let app = app!(dir);

    let req = as_user(
        multipart(&donation_body(1.0, None, None), Some(("notes.txt", &b"hello"[..]))),
        Uuid::new_v4(),
    );
    let (status, body) = read(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["msg"], "Error creating donation");
}

#[actix_web::test]
async fn acting_user_is_required() {
    let dir = TempDir::new().unwrap();
    let app = app!(dir);

    let req = multipart(&donation_body(1.0, None, None), None);
    let (status, body) = read(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["msg"], "Unauthorized");

    let req = test::TestRequest::get()
        .uri("/api/donations/donor")
        .insert_header((USER_ID_HEADER, "someone"));
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn invalid_input_is_a_bad_request() {
    let dir = TempDir::new().unwrap();
    let app = app!(dir);
    let donor = Uuid::new_v4();

    let mut body = donation_body(1.0, None, None);
    body["receiverId"] = json!("not-a-uuid");
    let req = as_user(multipart(&body, None), donor);
    let (status, body) = read(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid receiverId");

    let req = as_user(multipart(&donation_body(0.0, None, None), None), donor);
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get().uri("/api/donations/123");
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn unknown_ids_are_not_found() {
    let dir = TempDir::new().unwrap();
    let app = app!(dir);
    let missing = Uuid::new_v4();

    let req = test::TestRequest::get().uri(&format!("/api/donations/{missing}"));
    let (status, body) = read(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["msg"], "Donation not found");

    let req = test::TestRequest::post()
        .uri(&format!("/api/requests/{missing}/donate"))
        .set_json(json!({ "quantityDonated": 1.0 }));
    let (status, body) = read(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["msg"], "Request not found");
}

#[actix_web::test]
async fn donating_to_a_request_decrements_then_closes_it() {
    let dir = TempDir::new().unwrap();
    let app = app!(dir);

    let req = as_user(
        test::TestRequest::post().uri("/api/requests").set_json(request_body(10.0)),
        Uuid::new_v4(),
    );
    let (status, body) = read(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["savedRequest"]["id"].as_str().unwrap().to_string();

    let donate = |quantity: f64| {
        test::TestRequest::post()
            .uri(&format!("/api/requests/{id}/donate"))
            .set_json(json!({ "quantityDonated": quantity }))
            .to_request()
    };

    let (status, body) = read(test::call_service(&app, donate(4.0)).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["msg"], "Donation successfully added");
    assert_eq!(body["remainingQuantity"], 6.0);
    assert_eq!(body["requestClosed"], false);

    let (_, body) = read(test::call_service(&app, donate(6.0)).await).await;
    assert_eq!(body["msg"], "Donation fully completed, request closed");
    assert_eq!(body["remainingQuantity"], 0.0);
    assert_eq!(body["requestClosed"], true);

    // Closed requests stay readable but drop out of the active list.
    let req = test::TestRequest::get().uri(&format!("/api/requests/{id}"));
    let (status, body) = read(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["request"]["isActive"], false);
    assert_eq!(body["request"]["quantity"], 0.0);

    let req = test::TestRequest::get().uri("/api/requests");
    let (_, body) = read(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(body["requests"], json!([]));

    let (status, _) = read(test::call_service(&app, donate(-1.0)).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn accepting_a_donation_reconciles_the_receivers_request() {
    let dir = TempDir::new().unwrap();
    let app = app!(dir);
    let receiver = Uuid::new_v4();

    let req = as_user(
        test::TestRequest::post().uri("/api/requests").set_json(request_body(10.0)),
        receiver,
    );
    let (_, body) = read(test::call_service(&app, req.to_request()).await).await;
    let request_id = body["savedRequest"]["id"].as_str().unwrap().to_string();

    let req = as_user(multipart(&donation_body(4.0, None, None), None), Uuid::new_v4());
    let (_, body) = read(test::call_service(&app, req.to_request()).await).await;
    let donation_id = body["savedDonation"]["id"].as_str().unwrap().to_string();

    let accept = as_user(
        test::TestRequest::put()
            .uri(&format!("/api/donations/{donation_id}/accept"))
            .set_json(json!({ "volunteer": false })),
        receiver,
    );
    let (status, body) = read(test::call_service(&app, accept.to_request()).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updatedDonation"]["status"], "self_pickup");
    assert_eq!(body["updatedDonation"]["receiverId"], receiver.to_string());
    assert_eq!(body["updatedDonation"]["requestId"], request_id.as_str());
    assert_eq!(body["reconciliation"]["remainingQuantity"], 6.0);
    assert_eq!(body["reconciliation"]["requestClosed"], false);

    // A second accept would reconcile twice; it is refused and changes nothing.
    let again = as_user(
        test::TestRequest::put()
            .uri(&format!("/api/donations/{donation_id}/accept"))
            .set_json(json!({ "volunteer": false })),
        receiver,
    );
    let (status, _) = read(test::call_service(&app, again.to_request()).await).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let req = test::TestRequest::get().uri(&format!("/api/requests/{request_id}"));
    let (_, body) = read(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(body["request"]["quantity"], 6.0);
}

#[actix_web::test]
async fn volunteer_flow_runs_to_completion() {
    let dir = TempDir::new().unwrap();
    let app = app!(dir);
    let volunteer = Uuid::new_v4();

    let req = as_user(multipart(&donation_body(2.0, None, None), None), Uuid::new_v4());
    let (_, body) = read(test::call_service(&app, req.to_request()).await).await;
    let id = body["savedDonation"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::put().uri(&format!("/api/donations/{id}/need-volunteer"));
    let (_, body) = read(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(body["donation"]["needVolunteer"], true);

    // No request to pair with: the donation is accepted without reconciliation.
    let req = as_user(
        test::TestRequest::put()
            .uri(&format!("/api/donations/{id}/accept"))
            .set_json(json!({ "volunteer": true })),
        Uuid::new_v4(),
    );
    let (_, body) = read(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(body["updatedDonation"]["status"], "assigning_volunteer");
    assert_eq!(body["reconciliation"], Value::Null);

    let req = as_user(
        test::TestRequest::put().uri(&format!("/api/donations/{id}/assign-volunteer")),
        volunteer,
    );
    let (status, body) = read(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updatedDonation"]["status"], "volunteer_assigned");
    assert_eq!(body["updatedDonation"]["volunteerId"], volunteer.to_string());

    let req = test::TestRequest::put().uri(&format!("/api/donations/{id}/confirm-pickup"));
    let (status, body) = read(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["donation"]["status"], "completed");
}

#[actix_web::test]
async fn status_updates_are_validated() {
    let dir = TempDir::new().unwrap();
    let app = app!(dir);

    let req = as_user(multipart(&donation_body(2.0, None, None), None), Uuid::new_v4());
    let (_, body) = read(test::call_service(&app, req.to_request()).await).await;
    let id = body["savedDonation"]["id"].as_str().unwrap().to_string();

    let update = |status: &str| {
        test::TestRequest::put()
            .uri(&format!("/api/donations/{id}/status"))
            .set_json(json!({ "status": status }))
            .to_request()
    };

    let (status, _) = read(test::call_service(&app, update("teleported")).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = read(test::call_service(&app, update("completed")).await).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Only accepting a donation can put it into the post-accept states.
    for target in ["self_pickup", "assigning_volunteer"] {
        let (status, _) = read(test::call_service(&app, update(target)).await).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    let (status, body) = read(test::call_service(&app, update("rejected")).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["donation"]["status"], "rejected");

    // Self delivery is forced regardless of the current state.
    let req = test::TestRequest::put().uri(&format!("/api/donations/{id}/self-volunteer"));
    let (status, body) = read(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["donation"]["status"], "pickbydonor");
}

#[actix_web::test]
async fn nearby_lists_accepted_donations_with_coordinates() {
    let dir = TempDir::new().unwrap();
    let app = app!(dir);
    let donor = Uuid::new_v4();

    let mut ids = Vec::new();
    for body in [
        donation_body(1.0, Some(12.9766), Some(77.6050)),
        donation_body(1.0, Some(12.9766), None),
        donation_body(1.0, Some(13.0500), Some(77.6050)),
    ] {
        let req = as_user(multipart(&body, None), donor);
        let (_, body) = read(test::call_service(&app, req.to_request()).await).await;
        let id = body["savedDonation"]["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::put()
            .uri(&format!("/api/donations/{id}/status"))
            .set_json(json!({ "status": "accepted" }));
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        ids.push(id);
    }

    let req = test::TestRequest::post()
        .uri("/api/donations/nearby")
        .set_json(json!({ "lat": 12.9756, "long": 77.6050 }));
    let (status, body) = read(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(status, StatusCode::OK);
    let found: Vec<&str> = body["donations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["id"].as_str().unwrap())
        .collect();
    assert_eq!(found, vec![ids[0].as_str()]);

    let req = test::TestRequest::post()
        .uri("/api/donations/nearby")
        .set_json(json!({ "lat": 12.9756 }));
    let (status, body) = read(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Current location (lat and long) is required");
}

#[actix_web::test]
async fn donor_history_and_deletion() {
    let dir = TempDir::new().unwrap();
    let app = app!(dir);
    let donor = Uuid::new_v4();

    let history = || as_user(test::TestRequest::get().uri("/api/donations/donor"), donor).to_request();
    let (status, _) = read(test::call_service(&app, history()).await).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let req = as_user(multipart(&donation_body(3.0, None, None), None), donor);
    let (_, body) = read(test::call_service(&app, req.to_request()).await).await;
    let id = body["savedDonation"]["id"].as_str().unwrap().to_string();

    let (status, body) = read(test::call_service(&app, history()).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["msg"], "No donations with the required status found");
    assert_eq!(body["donations"], json!([]));

    let req = test::TestRequest::put()
        .uri(&format!("/api/donations/{id}/status"))
        .set_json(json!({ "status": "rejected" }));
    test::call_service(&app, req.to_request()).await;

    let (_, body) = read(test::call_service(&app, history()).await).await;
    assert_eq!(body["msg"], "Fetched Donations with required status");
    assert_eq!(body["donations"][0]["id"], id.as_str());

    let req = test::TestRequest::delete().uri(&format!("/api/donations/{id}"));
    let (status, body) = read(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deletedDonation"]["id"], id.as_str());

    let req = test::TestRequest::get().uri(&format!("/api/donations/{id}"));
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn duplicate_json_part_is_rejected() {
    let dir = TempDir::new().unwrap();
    let app = app!(dir);

    let part = |donation: &Value| {
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"json\"\r\n\
             Content-Type: application/json\r\n\r\n{donation}\r\n"
        )
    };
    let body = format!(
        "{}{}--{BOUNDARY}--\r\n",
        part(&donation_body(1.0, None, None)),
        part(&donation_body(9.0, None, None)),
    );
    let req = as_user(
        test::TestRequest::post()
            .uri("/api/donations")
            .insert_header((
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(body),
        Uuid::new_v4(),
    );
    let (status, body) = read(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "duplicate `json` part");
}

#[actix_web::test]
async fn failed_picture_write_leaves_no_donation() {
    let dir = TempDir::new().unwrap();
    let app = app!(dir);
    let donor = Uuid::new_v4();

    // A plain file where the upload directory should be.
    let images = dir.path().join("images");
    std::fs::remove_dir_all(&images).unwrap();
    std::fs::write(&images, b"blocked").unwrap();

    let req = as_user(
        multipart(&donation_body(1.0, None, None), Some(("bread.png", &b"png"[..]))),
        donor,
    );
    let (status, body) = read(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["msg"], "Error storing picture");

    let req = as_user(test::TestRequest::get().uri("/api/donations/donor"), donor);
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn foreign_request_cannot_be_reconciled() {
    let dir = TempDir::new().unwrap();
    let app = app!(dir);
    let owner = Uuid::new_v4();

    let req = as_user(
        test::TestRequest::post().uri("/api/requests").set_json(request_body(10.0)),
        owner,
    );
    let (_, body) = read(test::call_service(&app, req.to_request()).await).await;
    let request_id = body["savedRequest"]["id"].as_str().unwrap().to_string();

    let req = as_user(multipart(&donation_body(10.0, None, None), None), Uuid::new_v4());
    let (_, body) = read(test::call_service(&app, req.to_request()).await).await;
    let donation_id = body["savedDonation"]["id"].as_str().unwrap().to_string();

    let req = as_user(
        test::TestRequest::put()
            .uri(&format!("/api/donations/{donation_id}/accept"))
            .set_json(json!({ "volunteer": false, "requestId": request_id })),
        Uuid::new_v4(),
    );
    let (status, body) = read(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Request belongs to another receiver");

    let req = test::TestRequest::get().uri(&format!("/api/requests/{request_id}"));
    let (_, body) = read(test::call_service(&app, req.to_request()).await).await;
    assert_eq!(body["request"]["quantity"], 10.0);
    assert_eq!(body["request"]["isActive"], true);
}
