//! End-to-end scenarios against the mock demo server.
//!
//! # Design
//! One mock server is started on a random port for the whole test binary and
//! shared, together with the request shape and response expectation, through
//! a lazily initialised fixture. Every test drives the synchronous client
//! over real HTTP.

use std::io::{Read, Write};
use std::sync::OnceLock;

use apicheck_core::cases::CaseError;
use apicheck_core::{
    load_rows, run_cases, telemetry, AssertionError, Call, Client, ClientConfig, ConfigError,
    ContentType, Error, Expectation, LogConfig, RequestShape, ResponseExpectation, TransportError,
};
use pretty_assertions::assert_eq;
use serde::Deserialize;

struct Fixture {
    base_url: String,
    request_shape: RequestShape,
    response_expectation: ResponseExpectation,
}

fn fixture() -> &'static Fixture {
    static FIXTURE: OnceLock<Fixture> = OnceLock::new();
    FIXTURE.get_or_init(|| {
        telemetry::init_tracing("info");

        let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = std_listener.local_addr().unwrap();
        std_listener.set_nonblocking(true).unwrap();

        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
                mock_server::run(listener).await
            })
            .unwrap();
        });

        let base_url = format!("http://{addr}");
        Fixture {
            request_shape: RequestShape::builder()
                .set_base_uri(format!("{base_url}/"))
                .build(),
            response_expectation: ResponseExpectation::builder()
                .expect_status_code(200)
                .expect_content_type(ContentType::Json)
                .build(),
            base_url,
        }
    })
}

fn users_url() -> String {
    format!("{}/users/{{userId}}", fixture().base_url)
}

#[test]
fn get_user_data_verify_name() {
    let client = Client::new();
    let resp = client
        .send(&Call::get(format!("{}/users/1", fixture().base_url)))
        .unwrap();

    Expectation::body("name", "Leanne Graham").verify(&resp).unwrap();
}

#[test]
fn log_all_request_data() {
    let client = Client::new().logging(LogConfig::requests());
    let resp = client
        .send(&Call::get(format!("{}/users/1", fixture().base_url)))
        .unwrap();

    Expectation::body("name", "Leanne Graham").verify(&resp).unwrap();
}

#[test]
fn log_all_response_data() {
    let client = Client::new().logging(LogConfig::responses());
    let resp = client
        .send(&Call::get(format!("{}/users/1", fixture().base_url)))
        .unwrap();

    Expectation::body("name", "Leanne Graham").verify(&resp).unwrap();
}

#[test]
fn verify_status_code_and_content_type() {
    let client = Client::new();
    let resp = client
        .send(&Call::get(format!("{}/users/1", fixture().base_url)))
        .unwrap();

    Expectation::status_code(200).verify(&resp).unwrap();
    Expectation::content_type(ContentType::Json).verify(&resp).unwrap();
}

#[test]
fn use_query_parameter() {
    let client = Client::new().logging(LogConfig::requests());
    let resp = client
        .send(&Call::get(&fixture().base_url).query_param("text", "testcase"))
        .unwrap();

    Expectation::body("md5", "7489a25fc99976f06fecb807991c61cf")
        .verify(&resp)
        .unwrap();
}

#[test]
fn use_path_parameter() {
    let client = Client::new().logging(LogConfig::requests());
    let resp = client
        .send(&Call::get(users_url()).path_param("userId", 1))
        .unwrap();

    Expectation::body("name", "Leanne Graham").verify(&resp).unwrap();
}

#[derive(Debug, Deserialize)]
struct UserRow {
    user_id: u32,
    expected_name: String,
}

#[test]
fn check_name_for_user() {
    let rows: Vec<UserRow> = load_rows(include_str!("../../test-vectors/users.json")).unwrap();
    assert_eq!(rows.len(), 3);

    let client = Client::new();
    let report = run_cases(&rows, |row| {
        let resp = client.send(&Call::get(users_url()).path_param("userId", row.user_id))?;
        Expectation::body("name", row.expected_name.as_str()).verify(&resp)?;
        Ok(())
    });

    assert_eq!(report.passed(), 3);
    report.into_result().unwrap();
}

#[test]
fn data_driven_rows_fail_independently() {
    let rows = [(1, "Leanne Graham"), (2, "Leanne Graham"), (3, "Clementine Bauch")];
    let client = Client::new();

    let report = run_cases(&rows, |(id, name)| {
        let resp = client.send(&Call::get(users_url()).path_param("userId", id))?;
        Expectation::body("name", *name).verify(&resp)?;
        Ok(())
    });

    let passed: Vec<bool> = report.outcomes().iter().map(|o| o.passed()).collect();
    assert_eq!(passed, vec![true, false, true]);
    let failures = report.into_result().unwrap_err();
    assert!(matches!(
        &failures.failures[0].result,
        Err(CaseError::Failed(Error::Assertion(AssertionError::BodyField { actual, .. })))
            if actual == "Ervin Howell"
    ));
}

#[test]
fn shared_response_expectation() {
    let fx = fixture();
    let client = Client::new();
    let resp = client
        .send_and_verify(
            &Call::get(format!("{}/users/1", fx.base_url)),
            &fx.response_expectation,
        )
        .unwrap();

    Expectation::body("name", "Leanne Graham").verify(&resp).unwrap();
}

#[test]
fn shared_request_shape() {
    let fx = fixture();
    let client = Client::new().logging(LogConfig::requests());
    let call = Call::get("/users/1").shape(&fx.request_shape);

    assert_eq!(call.build().unwrap().url, format!("{}/users/1", fx.base_url));
    let resp = client.send(&call).unwrap();
    Expectation::status_code(200).verify(&resp).unwrap();
}

#[test]
fn nested_fields_and_query_filters() {
    let fx = fixture();
    let client = Client::new();
    let expectation = ResponseExpectation::builder()
        .add_expectation(&fx.response_expectation)
        .expect_body("[0].name", "Ervin Howell")
        .expect_body("[0].address.geo.lat", "-43.9509")
        .expect_body("[0].company.catchPhrase", "Proactive didactic contingency")
        .build();

    client
        .send_and_verify(
            &Call::get("/users").shape(&fx.request_shape).query_param("username", "Antonette"),
            &expectation,
        )
        .unwrap();
}

#[test]
fn wrong_name_is_an_assertion_error() {
    let client = Client::new().logging(LogConfig::if_validation_fails());
    let expectation = ResponseExpectation::builder()
        .expect_body("name", "Ervin Howell")
        .build();

    let err = client
        .send_and_verify(&Call::get(users_url()).path_param("userId", 1), &expectation)
        .unwrap_err();

    match err {
        Error::Assertion(AssertionError::BodyField {
            path,
            expected,
            actual,
        }) => {
            assert_eq!(path, "name");
            assert_eq!(expected, "Ervin Howell");
            assert_eq!(actual, "Leanne Graham");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn unknown_user_fails_shared_expectation() {
    let fx = fixture();
    let err = Client::new()
        .send_and_verify(
            &Call::get(users_url()).path_param("userId", 99),
            &fx.response_expectation,
        )
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Assertion(AssertionError::StatusCode {
            expected: 200,
            actual: 404
        })
    ));
}

#[test]
fn missing_path_param_is_a_config_error() {
    let err = Client::new().send(&Call::get(users_url())).unwrap_err();

    assert!(matches!(err, Error::Config(ConfigError::MissingPathParam { .. })));
}

#[test]
fn closed_port_is_a_transport_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = Client::with_config(&ClientConfig::default());

    let err = client
        .send(&Call::get(format!("http://127.0.0.1:{port}/users/1")))
        .unwrap_err();

    assert!(err.is_transport());
    assert!(!err.is_assertion());
    assert!(matches!(
        err,
        Error::Transport(TransportError::ConnectionRefused { .. } | TransportError::ConnectionFailed { .. })
    ));
}

/// Serve a single canned HTTP/1.1 response on a fresh port.
fn serve_once(content_type: &str, body: &'static [u8]) -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let head = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );
    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        stream.write_all(head.as_bytes()).unwrap();
        stream.write_all(body).unwrap();
    });
    format!("http://{addr}/img")
}

#[test]
fn binary_body_is_a_response_not_a_transport_error() {
    let url = serve_once("application/octet-stream", &[0x89, 0x50, 0xff, 0xfe]);
    let expectation = ResponseExpectation::builder()
        .expect_status_code(200)
        .expect_content_type(ContentType::Binary)
        .build();

    let resp = Client::new().send_and_verify(&Call::get(url), &expectation).unwrap();

    assert_eq!(resp.status, 200);
    assert!(matches!(
        Expectation::body("name", "x").verify(&resp),
        Err(AssertionError::BodyNotJson { .. })
    ));
}

#[test]
fn repeated_calls_give_identical_outcomes() {
    let fx = fixture();
    let client = Client::new();
    let call = Call::get(&fx.base_url).query_param("text", "testcase");

    let first = client.send(&call).unwrap();
    let second = client.send(&call).unwrap();

    assert_eq!(first.status, second.status);
    assert_eq!(first.json().unwrap(), second.json().unwrap());
    for resp in [&first, &second] {
        Expectation::body("md5", "7489a25fc99976f06fecb807991c61cf")
            .verify(resp)
            .unwrap();
    }
}

#[test]
fn shapes_are_shared_across_threads() {
    let fx = fixture();
    let handles: Vec<_> = (1..=3u32)
        .map(|id| {
            std::thread::spawn(move || {
                let client = Client::new();
                client.send_and_verify(
                    &Call::get("/users/{userId}")
                        .shape(&fx.request_shape)
                        .path_param("userId", id),
                    &fx.response_expectation,
                )
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap().status, 200);
    }
}
