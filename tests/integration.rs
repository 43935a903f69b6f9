use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use duty_tracker::api::rest::router;
use duty_tracker::auth::{JwtService, Role};
use duty_tracker::state::AppState;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

const DUTY_LOCATION: &str = "28.6129166,77.2246388";

struct TestApp {
    app: axum::Router,
    state: Arc<AppState>,
    admin: String,
}

fn setup() -> TestApp {
    let state = Arc::new(AppState::new(JwtService::new("integration-secret", 60)));
    let admin = state.jwt.issue(Uuid::new_v4(), Role::Admin, None).unwrap();
    TestApp {
        app: router(state.clone()),
        state,
        admin,
    }
}

impl TestApp {
    fn personnel_token(&self, personnel_id: &str) -> String {
        let id = Uuid::parse_str(personnel_id).unwrap();
        self.state
            .jwt
            .issue(Uuid::new_v4(), Role::Personnel, Some(id))
            .unwrap()
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        (status, body_json(response).await)
    }

    async fn create_duty(&self) -> String {
        let (status, body) = self
            .send(json_request(
                "POST",
                "/duty",
                Some(&self.admin),
                json!({
                    "title": "Independence Day",
                    "description": "Crowd control at the parade route",
                    "venue": "Red Fort",
                    "location": DUTY_LOCATION,
                    "start_time": "2024-08-15T04:00:00Z",
                    "end_time": "2024-08-15T14:00:00Z",
                    "note": "Report to the control room"
                }),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["data"]["id"].as_str().unwrap().to_string()
    }

    async fn create_shift(&self, duty: &str, start: &str, end: &str) -> String {
        let (status, body) = self
            .send(json_request(
                "POST",
                "/shift",
                Some(&self.admin),
                json!({
                    "shift_name": format!("{start} to {end}"),
                    "duty": duty,
                    "start_time": start,
                    "end_time": end
                }),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["data"]["id"].as_str().unwrap().to_string()
    }

    async fn create_personnel(&self, sid: &str) -> String {
        let (status, body) = self
            .send(json_request(
                "POST",
                "/personnel",
                Some(&self.admin),
                personnel_body(sid),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["data"]["id"].as_str().unwrap().to_string()
    }

    async fn register_hardware(&self, hardware_id: &str, secret: &str) -> String {
        let (status, body) = self
            .send(json_request(
                "POST",
                "/hardware",
                Some(&self.admin),
                json!({
                    "hardware_id": hardware_id,
                    "secret": secret,
                    "name": format!("Gate reader {hardware_id}"),
                    "description": "North gate",
                    "type": "rfid"
                }),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["data"]["id"].as_str().unwrap().to_string()
    }

    async fn add_personnel(&self, shift: &str, personnel: &[&String]) -> Value {
        let (status, body) = self
            .send(json_request(
                "POST",
                &format!("/shift/{shift}/add_personnel"),
                Some(&self.admin),
                json!({ "personnel_array": personnel }),
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
        body["data"].clone()
    }

    async fn add_hardware(&self, shift: &str, hardware: &[&String]) -> Value {
        let (status, body) = self
            .send(json_request(
                "POST",
                &format!("/shift/{shift}/add_hardware"),
                Some(&self.admin),
                json!({ "hardware_array": hardware }),
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
        body["data"].clone()
    }
}

fn personnel_body(sid: &str) -> Value {
    json!({
        "sid": sid,
        "official_name": format!("Officer {sid}"),
        "designation": "Constable",
        "dob": "1991-02-11",
        "blood_group": "B+",
        "posted_at": "Kotwali",
        "address": "Delhi"
    })
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn health_returns_ok() {
    let test = setup();
    let (status, body) = test.send(get_request("/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["duties"], 0);
    assert_eq!(body["shifts"], 0);
    assert_eq!(body["personnel"], 0);
    assert_eq!(body["hardware"], 0);
}

#[tokio::test]
async fn metrics_returns_prometheus_format() {
    let test = setup();
    let duty = test.create_duty().await;
    let shift = test
        .create_shift(&duty, "2024-08-15T04:00:00Z", "2024-08-15T08:00:00Z")
        .await;
    let (status, _) = test
        .send(get_request(&format!("/shift/{shift}/report"), Some(&test.admin)))
        .await;
    assert_eq!(status, StatusCode::OK);

    let response = test
        .app
        .clone()
        .oneshot(get_request("/metrics", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.contains("text/plain"));

    let body = body_string(response).await;
    assert!(body.contains("report_latency_seconds"));
}

#[tokio::test]
async fn unknown_route_uses_error_envelope() {
    let test = setup();
    let (status, body) = test.send(get_request("/nope", None)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["status"], 404);
    assert_eq!(body["message"], "Not Found");
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn create_duty_returns_envelope() {
    let test = setup();
    let (status, body) = test
        .send(json_request(
            "POST",
            "/duty",
            Some(&test.admin),
            json!({
                "title": "Marathon",
                "description": "Route marshalling",
                "venue": "India Gate",
                "location": DUTY_LOCATION,
                "start_time": "2024-08-15T04:00:00Z",
                "end_time": "2024-08-15T14:00:00Z",
                "note": "",
                "police_station": "Tilak Marg"
            }),
        ))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], 201);
    assert_eq!(body["message"], "Duty created successfully");
    assert_eq!(body["data"]["title"], "Marathon");
    assert_eq!(body["data"]["police_station"], "Tilak Marg");
    assert_eq!(body["data"]["shifts"], json!([]));
}

#[tokio::test]
async fn malformed_location_is_unprocessable() {
    let test = setup();
    let (status, body) = test
        .send(json_request(
            "POST",
            "/duty",
            Some(&test.admin),
            json!({
                "title": "Marathon",
                "description": "Route marshalling",
                "venue": "India Gate",
                "location": "somewhere near the gate",
                "start_time": "2024-08-15T04:00:00Z",
                "end_time": "2024-08-15T14:00:00Z",
                "note": ""
            }),
        ))
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert!(body["errors"]["location"].is_array());
}

#[tokio::test]
async fn inverted_shift_window_is_unprocessable() {
    let test = setup();
    let duty = test.create_duty().await;
    let (status, _) = test
        .send(json_request(
            "POST",
            "/shift",
            Some(&test.admin),
            json!({
                "shift_name": "Backwards",
                "duty": duty,
                "start_time": "2024-08-15T10:00:00Z",
                "end_time": "2024-08-15T08:00:00Z"
            }),
        ))
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn shift_under_unknown_duty_is_not_found() {
    let test = setup();
    let (status, body) = test
        .send(json_request(
            "POST",
            "/shift",
            Some(&test.admin),
            json!({
                "shift_name": "Orphan",
                "duty": Uuid::new_v4(),
                "start_time": "2024-08-15T04:00:00Z",
                "end_time": "2024-08-15T08:00:00Z"
            }),
        ))
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Duty not found");
    assert_eq!(test.state.shifts.len(), 0);
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let test = setup();
    let (status, body) = test
        .send(json_request("POST", "/duty", None, json!({})))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized");
}

#[tokio::test]
async fn tampered_token_is_unauthorized() {
    let test = setup();
    let foreign = JwtService::new("someone-else", 60)
        .issue(Uuid::new_v4(), Role::Admin, None)
        .unwrap();
    let (status, body) = test.send(get_request("/personnel", Some(&foreign))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");
}

#[tokio::test]
async fn personnel_cannot_use_admin_routes() {
    let test = setup();
    let personnel = test.create_personnel("P-100").await;
    let token = test.personnel_token(&personnel);

    let (status, _) = test
        .send(json_request(
            "POST",
            "/personnel",
            Some(&token),
            personnel_body("P-101"),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let duty = test.create_duty().await;
    let shift = test
        .create_shift(&duty, "2024-08-15T04:00:00Z", "2024-08-15T08:00:00Z")
        .await;
    let (status, _) = test
        .send(get_request(&format!("/shift/{shift}/report"), Some(&token)))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn supervisors_run_rosters_but_not_registries() {
    let test = setup();
    let sp = test.state.jwt.issue(Uuid::new_v4(), Role::Sp, None).unwrap();

    let (status, _) = test.send(get_request("/personnel", Some(&sp))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = test
        .send(json_request("POST", "/personnel", Some(&sp), personnel_body("P-1")))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn duplicate_sid_is_conflict() {
    let test = setup();
    test.create_personnel("P-200").await;

    let (status, body) = test
        .send(json_request(
            "POST",
            "/personnel",
            Some(&test.admin),
            personnel_body("P-200"),
        ))
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "sid already exists");
    assert_eq!(test.state.personnel.len(), 1);
    assert_eq!(test.state.users.len(), 1);
}

#[tokio::test]
async fn personnel_are_listed_by_sid_and_fetched_by_sid() {
    let test = setup();
    for sid in ["P-3", "P-1", "P-2"] {
        test.create_personnel(sid).await;
    }

    let (status, body) = test
        .send(get_request("/personnel?page=1&limit=2", Some(&test.admin)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalPages"], 2);
    assert_eq!(body["data"]["currentPage"], 1);
    assert_eq!(body["data"]["personnel"][0]["sid"], "P-1");
    assert_eq!(body["data"]["personnel"][1]["sid"], "P-2");

    let (status, body) = test
        .send(get_request("/personnel/P-3", Some(&test.admin)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["official_name"], "Officer P-3");

    let (status, _) = test
        .send(get_request("/personnel/P-404", Some(&test.admin)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn personnel_responses_carry_the_login_account() {
    let test = setup();
    test.create_personnel("P-7").await;

    let (status, body) = test
        .send(get_request("/personnel/P-7", Some(&test.admin)))
        .await;
    assert_eq!(status, StatusCode::OK);
    let account = &body["data"]["user"];
    assert_eq!(account["username"], "P-7");
    assert_eq!(account["name"], "Officer P-7");
    assert_eq!(account["role"], "personnel");
    assert!(account["last_login"].is_null());

    let (_, body) = test
        .send(get_request("/personnel", Some(&test.admin)))
        .await;
    assert_eq!(body["data"]["personnel"][0]["user"]["username"], "P-7");
}

#[tokio::test]
async fn personnel_search_matches_name_or_sid_ignoring_case() {
    let test = setup();
    for sid in ["DL-01", "DL-02", "UP-01"] {
        test.create_personnel(sid).await;
    }

    let (status, body) = test
        .send(get_request("/personnel/search?q=dl&page=1&limit=10", Some(&test.admin)))
        .await;
    assert_eq!(status, StatusCode::OK);
    let sids: Vec<&str> = body["data"]["personnel"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["sid"].as_str().unwrap())
        .collect();
    assert_eq!(sids, vec!["DL-01", "DL-02"]);
    assert_eq!(body["data"]["totalPages"], 1);

    let (_, body) = test
        .send(get_request("/personnel/search?q=OFFICER%20UP", Some(&test.admin)))
        .await;
    assert_eq!(body["data"]["personnel"][0]["sid"], "UP-01");

    let (status, _) = test
        .send(get_request("/personnel/search?q=", Some(&test.admin)))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn deleting_personnel_removes_its_login_account() {
    let test = setup();
    test.create_personnel("P-8").await;
    test.create_personnel("P-9").await;

    let request = Request::builder()
        .method("DELETE")
        .uri("/personnel/P-8")
        .header("authorization", format!("Bearer {}", test.admin))
        .body(Body::empty())
        .unwrap();
    let (status, body) = test.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["personnel"]["sid"], "P-8");
    assert_eq!(body["data"]["user"]["username"], "P-8");
    assert_eq!(test.state.personnel.len(), 1);
    assert_eq!(test.state.users.len(), 1);

    let request = Request::builder()
        .method("DELETE")
        .uri("/personnel/P-8")
        .header("authorization", format!("Bearer {}", test.admin))
        .body(Body::empty())
        .unwrap();
    let (status, _) = test.send(request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn bulk_delete_reports_unknown_sids() {
    let test = setup();
    for sid in ["B-1", "B-2", "B-3"] {
        test.create_personnel(sid).await;
    }

    let (status, body) = test
        .send(json_request(
            "DELETE",
            "/personnel/bulk_delete",
            Some(&test.admin),
            json!({ "sids": ["B-1", "B-3", "B-404", "B-1"] }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted"], json!(["B-1", "B-3"]));
    assert_eq!(body["data"]["not_found"], json!(["B-404"]));
    assert_eq!(test.state.personnel.len(), 1);
    assert_eq!(test.state.users.len(), 1);

    let sp = test.state.jwt.issue(Uuid::new_v4(), Role::Sp, None).unwrap();
    let (status, _) = test
        .send(json_request(
            "DELETE",
            "/personnel/bulk_delete",
            Some(&sp),
            json!({ "sids": ["B-2"] }),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn huge_page_number_returns_an_empty_page() {
    let test = setup();
    test.create_personnel("P-1").await;

    let (status, body) = test
        .send(get_request(
            "/personnel?page=18446744073709551615&limit=10",
            Some(&test.admin),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["personnel"], json!([]));
}

#[tokio::test]
async fn registered_hardware_hides_its_secret() {
    let test = setup();
    test.register_hardware("RDR-1", "reader-secret").await;

    let (status, body) = test
        .send(json_request(
            "POST",
            "/hardware",
            Some(&test.admin),
            json!({
                "hardware_id": "RDR-1",
                "secret": "another-secret",
                "name": "Duplicate",
                "type": "rfid"
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "hardware_id already exists");

    let (status, body) = test
        .send(get_request("/hardware", Some(&test.admin)))
        .await;
    assert_eq!(status, StatusCode::OK);
    let unit = &body["data"]["hardware"][0];
    assert_eq!(unit["hardware_id"], "RDR-1");
    assert_eq!(unit["status"], "idle");
    assert_eq!(unit["type"], "rfid");
    assert!(unit.get("secret").is_none());
}

#[tokio::test]
async fn overlapping_shift_assignment_is_rejected() {
    let test = setup();
    let duty = test.create_duty().await;
    let morning = test
        .create_shift(&duty, "2024-08-15T04:00:00Z", "2024-08-15T08:00:00Z")
        .await;
    let overlapping = test
        .create_shift(&duty, "2024-08-15T07:00:00Z", "2024-08-15T11:00:00Z")
        .await;
    let touching = test
        .create_shift(&duty, "2024-08-15T08:00:00Z", "2024-08-15T12:00:00Z")
        .await;
    let person = test.create_personnel("P-300").await;
    let stranger = Uuid::new_v4().to_string();

    let added = test.add_personnel(&morning, &[&person]).await;
    assert_eq!(added["sid_added"], json!([person]));

    let clash = test.add_personnel(&overlapping, &[&person, &stranger]).await;
    assert_eq!(clash["sid_added"], json!([]));
    assert_eq!(clash["sid_not_added"], json!([stranger]));
    let rejected = &clash["sid_not_added_because_clashing_shifts"][0];
    assert_eq!(rejected["sid"], person);
    assert_eq!(rejected["clashing_shift"], morning);
    assert_eq!(rejected["clashing_shift_duty"], duty);

    let back_to_back = test.add_personnel(&touching, &[&person]).await;
    assert_eq!(back_to_back["sid_added"], json!([person]));

    let again = test.add_personnel(&morning, &[&person]).await;
    assert_eq!(again["sid_added"], json!([]));
    assert_eq!(again["sid_already_assigned"], json!([person]));
}

#[tokio::test]
async fn available_personnel_excludes_booked_people() {
    let test = setup();
    let duty = test.create_duty().await;
    let morning = test
        .create_shift(&duty, "2024-08-15T04:00:00Z", "2024-08-15T08:00:00Z")
        .await;
    let overlapping = test
        .create_shift(&duty, "2024-08-15T06:00:00Z", "2024-08-15T10:00:00Z")
        .await;
    let booked = test.create_personnel("P-1").await;
    test.create_personnel("P-2").await;
    test.add_personnel(&morning, &[&booked]).await;

    let (status, body) = test
        .send(get_request(
            &format!("/shift/{overlapping}/availablePersonnel"),
            Some(&test.admin),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    let sids: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["sid"].as_str().unwrap())
        .collect();
    assert_eq!(sids, vec!["P-2"]);
}

#[tokio::test]
async fn hardware_is_attached_to_one_shift_at_a_time() {
    let test = setup();
    let duty = test.create_duty().await;
    let first = test
        .create_shift(&duty, "2024-08-15T04:00:00Z", "2024-08-15T08:00:00Z")
        .await;
    let second = test
        .create_shift(&duty, "2024-08-15T09:00:00Z", "2024-08-15T12:00:00Z")
        .await;
    let reader = test.register_hardware("RDR-9", "reader-secret").await;

    let attached = test.add_hardware(&first, &[&reader]).await;
    assert_eq!(attached["hardware_added"], json!([reader]));

    let refused = test.add_hardware(&second, &[&reader]).await;
    assert_eq!(refused["hardware_added"], json!([]));
    assert_eq!(refused["hardware_not_added"], json!([reader]));

    let (status, body) = test
        .send(json_request(
            "POST",
            &format!("/shift/{first}/remove_hardware"),
            Some(&test.admin),
            json!({ "hardware_array": [reader] }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["hardware_removed"], json!([reader]));

    let moved = test.add_hardware(&second, &[&reader]).await;
    assert_eq!(moved["hardware_added"], json!([reader]));
}

#[tokio::test]
async fn gps_before_start_is_rejected() {
    let test = setup();
    let duty = test.create_duty().await;
    let shift = test
        .create_shift(&duty, "2024-08-15T04:00:00Z", "2024-08-15T08:00:00Z")
        .await;
    let person = test.create_personnel("P-400").await;
    test.add_personnel(&shift, &[&person]).await;
    let token = test.personnel_token(&person);

    let (status, body) = test
        .send(json_request(
            "POST",
            &format!("/duty/{shift}/push_gps_data"),
            Some(&token),
            json!({
                "latitude": 28.6129166,
                "longitude": 77.2246388,
                "timestamp": "2024-08-15T04:05:00Z"
            }),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Duty not started yet.");
}

#[tokio::test]
async fn rfid_push_with_wrong_secret_is_unauthorized() {
    let test = setup();
    test.register_hardware("RDR-7", "reader-secret").await;

    let (status, body) = test
        .send(json_request(
            "POST",
            "/hardware/pushData",
            None,
            json!({
                "hardware_id": "RDR-7",
                "secret": "guessed-secret",
                "timestamp": "2024-08-15T04:05:00Z",
                "data": Uuid::new_v4()
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Secret mismatch");

    let (status, body) = test
        .send(json_request(
            "POST",
            "/hardware/pushData",
            None,
            json!({
                "hardware_id": "RDR-7",
                "secret": "reader-secret",
                "timestamp": "2024-08-15T04:05:00Z",
                "data": Uuid::new_v4()
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Hardware not attached to any shift");
}

#[tokio::test]
async fn duty_round_trip_produces_present_report() {
    let test = setup();
    let duty = test.create_duty().await;
    let shift = test
        .create_shift(&duty, "2024-08-15T04:00:00Z", "2024-08-15T08:00:00Z")
        .await;
    let person = test.create_personnel("P-500").await;
    let reader = test.register_hardware("RDR-5", "reader-secret").await;
    test.add_personnel(&shift, &[&person]).await;
    test.add_hardware(&shift, &[&reader]).await;
    let token = test.personnel_token(&person);

    let (status, body) = test.send(get_request("/duty", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["shifts"], json!([]));

    let (status, body) = test
        .send(get_request(
            "/duty?start_time=2024-08-15T00:00:00Z&end_time=2024-08-16T00:00:00Z",
            Some(&token),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["shifts"][0]["id"], shift);
    assert_eq!(body["data"]["shifts"][0]["duty"]["id"], duty);

    let (status, _) = test
        .send(json_request(
            "POST",
            &format!("/duty/{shift}/start_duty"),
            Some(&token),
            json!({ "time": "2024-08-15T04:00:00Z" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = test
        .send(json_request(
            "POST",
            &format!("/duty/{shift}/push_gps_data"),
            Some(&token),
            json!({
                "latitude": 28.6129166,
                "longitude": 77.2246388,
                "timestamp": "2024-08-15T04:10:00Z"
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = test
        .send(json_request(
            "POST",
            &format!("/duty/{shift}/push_gps_data_bulk"),
            Some(&token),
            json!({
                "gps_data": [
                    { "latitude": 28.6130, "longitude": 77.2247, "timestamp": "2024-08-15T04:20:00Z" },
                    { "latitude": 28.6128, "longitude": 77.2245, "timestamp": "2024-08-15T04:30:00Z" }
                ]
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    for timestamp in ["2024-08-15T04:05:00Z", "2024-08-15T04:45:00Z"] {
        let (status, body) = test
            .send(json_request(
                "POST",
                "/hardware/pushData",
                None,
                json!({
                    "hardware_id": "RDR-5",
                    "secret": "reader-secret",
                    "timestamp": timestamp,
                    "data": person
                }),
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Data pushed successfully");
    }

    let (status, body) = test
        .send(json_request(
            "POST",
            &format!("/duty/{shift}/post_issue"),
            Some(&token),
            json!({ "issue_category": "crowd", "description": "Barricade down at gate 2" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["reported_by"], person);
    assert_eq!(body["data"]["description"], "Barricade down at gate 2");

    let (status, _) = test
        .send(json_request(
            "POST",
            &format!("/duty/{shift}/stop_duty"),
            Some(&token),
            json!({ "time": "2024-08-15T08:00:00Z" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = test
        .send(get_request(&format!("/shift/{shift}/report"), Some(&test.admin)))
        .await;
    assert_eq!(status, StatusCode::OK);

    let report = &body["data"];
    assert_eq!(report["personnel_count"], 1);
    assert_eq!(report["hardware_count"], 1);
    assert_eq!(report["issue_count"], 1);

    let attendance = &report["personnel"][0];
    assert_eq!(attendance["status"], "Present");
    assert_eq!(attendance["duty_status"], "completed");
    assert_eq!(attendance["gps_count"], 3);
    assert_eq!(attendance["rfid_count"], 2);
    assert_eq!(attendance["start_time"], "2024-08-15T04:05:00Z");
    assert_eq!(attendance["end_time"], "2024-08-15T04:45:00Z");
    assert_eq!(attendance["score_breakdown"]["rfid_score"], 2.0);

    let score = attendance["score"].as_f64().unwrap();
    assert!((0.0..=100.0).contains(&score));
    assert!(score > 90.0);

    let (status, body) = test
        .send(json_request(
            "POST",
            &format!("/duty/{shift}/push_gps_data"),
            Some(&token),
            json!({
                "latitude": 28.6129166,
                "longitude": 77.2246388,
                "timestamp": "2024-08-15T08:10:00Z"
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Duty already stopped");
}

#[tokio::test]
async fn deleting_a_shift_frees_its_hardware() {
    let test = setup();
    let duty = test.create_duty().await;
    let shift = test
        .create_shift(&duty, "2024-08-15T04:00:00Z", "2024-08-15T08:00:00Z")
        .await;
    let reader = test.register_hardware("RDR-2", "reader-secret").await;
    test.add_hardware(&shift, &[&reader]).await;

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/shift/{shift}"))
        .header("authorization", format!("Bearer {}", test.admin))
        .body(Body::empty())
        .unwrap();
    let (status, _) = test.send(request).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = test
        .send(get_request(&format!("/shift/{shift}/report"), Some(&test.admin)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = test
        .send(get_request("/hardware", Some(&test.admin)))
        .await;
    assert_eq!(body["data"]["hardware"][0]["status"], "idle");
    assert!(body["data"]["hardware"][0]["attached_to_shift"].is_null());

    let duty_id = Uuid::parse_str(&duty).unwrap();
    assert!(test.state.duties.get(&duty_id).unwrap().shifts.is_empty());
}
