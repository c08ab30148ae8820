use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::sync::{mpsc, watch};

use crate::adapter::{SensorAdapter, SensorConfig, SensorUpdate};
use crate::error::DecodeError;
use crate::measurement::{Measurement, MeasurementData};
use crate::receiver::Receiver;
use crate::store::MeasurementStore;

fn sample(sensor_id: &str, temperature: f32) -> Measurement {
    Measurement {
        sensor_id: sensor_id.to_string(),
        sensor_time: 1_724_880_000,
        measurement_id: format!("{sensor_id}-0001"),
        measurement_data: MeasurementData {
            temperature,
            humidity: 48.25,
            pressure: 1013.5,
        },
    }
}

fn config(serial: &str) -> SensorConfig {
    SensorConfig {
        serial: serial.to_string(),
        name: format!("Sensor {serial}"),
        model: "TH-1".to_string(),
    }
}

#[test]
fn decode_encode_round_trip_preserves_all_fields() {
    let original = Measurement {
        sensor_id: "greenhouse-07".to_string(),
        sensor_time: -3_600,
        measurement_id: "m-42".to_string(),
        measurement_data: MeasurementData {
            temperature: -12.625,
            humidity: 0.0,
            pressure: 987.125,
        },
    };

    let encoded = original.encode().expect("encode failed");
    let decoded = Measurement::decode(&encoded).expect("decode failed");
    assert_eq!(decoded, original);
}

#[test]
fn decode_accepts_the_wire_field_names() {
    let payload = br#"{
        "sensor_id": "S1",
        "sensor_time": 1724880000,
        "measurement_id": "abc",
        "measurement_data": {"temperature": 21.5, "humidity": 40.0, "pressure": 1001.0}
    }"#;

    let measurement = Measurement::decode(payload).expect("decode failed");
    assert_eq!(measurement.sensor_id, "S1");
    assert_eq!(measurement.measurement_data.temperature, 21.5);
}

#[test]
fn decode_rejects_malformed_payloads() {
    let cases: &[&[u8]] = &[
        b"",
        b"not json at all",
        b"{\"sensor_id\": \"S1\"}",
        b"{\"sensor_id\": 7, \"sensor_time\": 0, \"measurement_id\": \"x\", \
          \"measurement_data\": {\"temperature\": 1.0, \"humidity\": 1.0, \"pressure\": 1.0}}",
        // truncated mid-object
        b"{\"sensor_id\": \"S1\", \"sensor_time\": 17",
        // non-UTF8 bytes
        &[0xff, 0xfe, 0x00, 0x80],
    ];

    for payload in cases {
        assert!(
            Measurement::decode(payload).is_err(),
            "payload {payload:?} unexpectedly decoded"
        );
    }
}

#[test]
fn decode_rejects_empty_sensor_id() {
    let mut measurement = sample("S1", 20.0);
    measurement.sensor_id.clear();
    let payload = measurement.encode().expect("encode failed");
    assert!(matches!(
        Measurement::decode(&payload),
        Err(DecodeError::EmptySensorId)
    ));
}

#[test]
fn put_overwrites_without_merging() {
    let store = MeasurementStore::new();
    store.put(sample("S1", 18.0));
    store.put(sample("S1", 22.5));

    let latest = store.get("S1").expect("missing entry");
    assert_eq!(latest.measurement_data.temperature, 22.5);
    assert_eq!(store.len(), 1);
}

#[test]
fn put_keeps_an_older_sensor_time_that_arrives_later() {
    // Arrival order wins; sensor_time is never consulted.
    let mut first = sample("S1", 18.0);
    first.sensor_time = 200;
    let mut second = sample("S1", 19.0);
    second.sensor_time = 100;

    let store = MeasurementStore::new();
    store.put(first);
    store.put(second);
    assert_eq!(store.get("S1").expect("missing entry").sensor_time, 100);
}

#[test]
fn adapter_reports_inactive_default_before_any_measurement() {
    let store = Arc::new(MeasurementStore::new());
    let adapter = SensorAdapter::new(config("S1"), store);

    let state = adapter.current_state();
    assert_eq!(state.value, 0.0);
    assert!(!state.active);
    assert!(!state.fault);
}

#[test]
fn adapter_reports_stored_temperature_once_present() {
    let store = Arc::new(MeasurementStore::new());
    store.put(sample("S1", 21.5));
    let adapter = SensorAdapter::new(config("S1"), store);

    let state = adapter.current_state();
    assert_eq!(state.value, 21.5);
    assert!(state.active);
    assert!(!state.fault);
}

#[test]
fn adapter_only_sees_its_own_serial() {
    let store = Arc::new(MeasurementStore::new());
    store.put(sample("S2", 30.0));
    let adapter = SensorAdapter::new(config("S1"), store);
    assert!(!adapter.current_state().active);
}

#[test]
fn concurrent_writers_and_readers_never_tear_records() {
    const WRITERS: usize = 8;
    const ROUNDS: usize = 500;

    let store = Arc::new(MeasurementStore::new());

    std::thread::scope(|scope| {
        for writer in 0..WRITERS {
            let store = Arc::clone(&store);
            scope.spawn(move || {
                let serial = format!("S{writer}");
                for round in 0..ROUNDS {
                    let mut measurement = sample(&serial, writer as f32);
                    measurement.sensor_time = round as i64;
                    store.put(measurement);
                }
            });
        }
        for _ in 0..WRITERS {
            let store = Arc::clone(&store);
            scope.spawn(move || {
                for _ in 0..ROUNDS {
                    for writer in 0..WRITERS {
                        let serial = format!("S{writer}");
                        if let Some(measurement) = store.get(&serial) {
                            // A torn read would mix fields from
                            // different writers.
                            assert_eq!(measurement.sensor_id, serial);
                            assert_eq!(
                                measurement.measurement_data.temperature,
                                writer as f32
                            );
                        }
                    }
                }
            });
        }
    });

    // Every writer's final round must have landed.
    for writer in 0..WRITERS {
        let serial = format!("S{writer}");
        let latest = store.get(&serial).expect("writer's entry missing");
        assert_eq!(latest.sensor_time, (ROUNDS - 1) as i64);
    }
}

#[tokio::test(start_paused = true)]
async fn push_task_emits_on_cadence_and_stops_on_signal() {
    let store = Arc::new(MeasurementStore::new());
    store.put(sample("S1", 21.5));
    let adapter = SensorAdapter::new(config("S1"), Arc::clone(&store));

    let (sink, mut updates) = mpsc::channel::<SensorUpdate>(8);
    let (stop_tx, stop_rx) = watch::channel(false);
    let handle = adapter.spawn_push(sink, Duration::from_secs(60), stop_rx);

    let update = updates.recv().await.expect("first push missing");
    assert_eq!(update.serial, "S1");
    assert_eq!(update.state.value, 21.5);
    assert!(update.state.active);

    stop_tx.send(true).expect("push task gone before signal");
    handle.await.expect("push task panicked");

    // The task dropped its sender without sending anything further.
    assert!(updates.recv().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn push_task_exits_when_transport_side_closes() {
    let store = Arc::new(MeasurementStore::new());
    let adapter = SensorAdapter::new(config("S1"), store);

    let (sink, updates) = mpsc::channel::<SensorUpdate>(1);
    let (_stop_tx, stop_rx) = watch::channel(false);
    let handle = adapter.spawn_push(sink, Duration::from_secs(60), stop_rx);

    drop(updates);
    handle.await.expect("push task panicked");
}

#[tokio::test]
async fn receiver_stores_valid_datagrams_and_survives_garbage() {
    let store = Arc::new(MeasurementStore::new());
    let receiver = Receiver::bind((Ipv4Addr::LOCALHOST, 0), Arc::clone(&store))
        .await
        .expect("bind failed");
    let addr = receiver.local_addr().expect("no local addr");

    let (stop_tx, stop_rx) = watch::channel(false);
    let handle = tokio::spawn(receiver.run(stop_rx));

    let sender = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("sender bind failed");
    sender
        .send_to(b"definitely not a measurement", addr)
        .await
        .expect("send failed");
    sender
        .send_to(&sample("S1", 21.5).encode().expect("encode failed"), addr)
        .await
        .expect("send failed");

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        if let Some(measurement) = store.get("S1") {
            assert_eq!(measurement.measurement_data.temperature, 21.5);
            break;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "measurement never reached the store"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    stop_tx.send(true).expect("receiver gone before signal");
    handle.await.expect("receiver task panicked");
}
