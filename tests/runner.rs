//! End-to-end checks of several targets against local servers

mod common;

use common::{days_from_now, generate_ca, generate_leaf, spawn_server, Script};
use sslexpiry::config::Settings;
use sslexpiry::models::{Outcome, Target};
use sslexpiry::runner::{self, RunConfig};

#[tokio::test]
async fn test_run_ranks_most_urgent_first() {
    let ca = generate_ca("Test CA");

    let healthy = generate_leaf(&ca, "localhost", days_from_now(-1), days_from_now(200));
    let (healthy_addr, _healthy_server) =
        spawn_server(vec![healthy.der()], healthy.private_key(), Script::Tls).await;

    let expiring = generate_leaf(&ca, "localhost", days_from_now(-80), days_from_now(10));
    let (expiring_addr, _expiring_server) =
        spawn_server(vec![expiring.der()], expiring.private_key(), Script::Smtp).await;

    let closed = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let closed_port = closed.local_addr().unwrap().port();
    drop(closed);

    let specs = [
        format!("localhost:{}", healthy_addr.port()),
        format!("localhost:{}/smtp", expiring_addr.port()),
        format!("127.0.0.1:{}", closed_port),
    ];
    let targets: Vec<Target> = specs.iter().map(|s| s.parse().unwrap()).collect();

    let settings = Settings {
        timeout_secs: 10,
        ..Settings::default()
    };
    let mut config = RunConfig::new(settings);
    config.ca = Some(vec![ca.der()]);

    let report = runner::run(&targets, &config).await;
    let labels: Vec<&str> = report.iter().map(|(label, _)| label.as_str()).collect();

    assert_eq!(labels, vec![&*specs[2], &*specs[1], &*specs[0]]);
    assert!(report[0].1.is_connection_failure());
    match &report[1].1 {
        Outcome::Policy(e) => {
            assert!(!e.severe);
            assert!(e.message.starts_with("Certificate expiry date is"));
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert!(matches!(report[2].1, Outcome::SafeUntil(_)));
}

#[tokio::test]
async fn test_unknown_port_is_a_per_target_failure() {
    let targets: Vec<Target> = vec!["example.invalid:gopher".parse().unwrap()];
    let config = RunConfig::new(Settings::default());

    let report = runner::run(&targets, &config).await;

    assert_eq!(report.len(), 1);
    assert_eq!(report[0].1, Outcome::connection("Unknown port gopher"));
}
