use chrono::{DateTime, TimeZone, Utc};
use database::MemoryStore;
use geofence::{
    ingest::{IngestConfig, IngestService},
    GeofenceError,
};
use model::{
    breach::{Severity, Transition},
    location::LocationSample,
    zone::{GeoPoint, RiskLevel, Zone, ZoneKind, ZoneShape},
    DateTimeRange,
};
use utility::id::Id;

const SAFE_CENTER: (f64, f64) = (17.2403, 78.4294);
const FAR_AWAY: (f64, f64) = (17.5000, 78.9000);

fn safe_zone() -> Zone {
    Zone {
        name: "Ramoji film city".to_owned(),
        kind: ZoneKind::Safe,
        shape: ZoneShape::Circle {
            center: GeoPoint::new(SAFE_CENTER.0, SAFE_CENTER.1),
            radius_m: 2_000.0,
        },
        category: Some("attraction".to_owned()),
        risk_level: None,
        active: true,
    }
}

fn restricted_zone(risk_level: RiskLevel) -> Zone {
    Zone {
        name: "Old quarry".to_owned(),
        kind: ZoneKind::Restricted,
        shape: ZoneShape::Circle {
            center: GeoPoint::new(FAR_AWAY.0, FAR_AWAY.1),
            radius_m: 500.0,
        },
        category: Some("industrial".to_owned()),
        risk_level: Some(risk_level),
        active: true,
    }
}

fn ts(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 7, 1, 9, minute, 0).unwrap()
}

fn sample(tourist: &str, lat: f64, lon: f64, minute: u32) -> LocationSample {
    LocationSample {
        tourist_id: Id::from(tourist),
        timestamp: ts(minute),
        latitude: lat,
        longitude: lon,
        accuracy_m: None,
        battery_pct: None,
    }
}

async fn engine() -> (MemoryStore, IngestService<MemoryStore>) {
    let store = MemoryStore::new();
    let service = IngestService::new(store.clone(), IngestConfig::default())
        .await
        .unwrap();
    (store, service)
}

#[tokio::test]
async fn entering_a_safe_zone_emits_one_low_entry() {
    let (_, service) = engine().await;
    service
        .registry()
        .create(Id::from("film-city"), safe_zone())
        .await
        .unwrap();

    let outcome = service
        .submit(sample("t1", SAFE_CENTER.0, SAFE_CENTER.1, 0))
        .await
        .unwrap();

    assert!(outcome.accepted);
    assert_eq!(outcome.events.len(), 1);
    let event = &outcome.events[0];
    assert_eq!(event.transition, Transition::Entered);
    assert_eq!(event.severity, Severity::Low);
    assert_eq!(event.zone_id, Id::from("film-city"));
    assert_eq!(event.zone_kind, ZoneKind::Safe);
}

#[tokio::test]
async fn entering_a_critical_restricted_zone_is_critical() {
    let (_, service) = engine().await;
    service
        .registry()
        .create(Id::from("quarry"), restricted_zone(RiskLevel::Critical))
        .await
        .unwrap();

    // start outside any zone
    let outcome = service
        .submit(sample("t1", SAFE_CENTER.0, SAFE_CENTER.1, 0))
        .await
        .unwrap();
    assert!(outcome.events.is_empty());

    let outcome = service
        .submit(sample("t1", FAR_AWAY.0, FAR_AWAY.1, 1))
        .await
        .unwrap();
    assert_eq!(outcome.events.len(), 1);
    assert_eq!(outcome.events[0].transition, Transition::Entered);
    assert_eq!(outcome.events[0].severity, Severity::Critical);
}

#[tokio::test]
async fn leaving_all_zones_emits_only_the_exit() {
    let (_, service) = engine().await;
    service
        .registry()
        .create(Id::from("film-city"), safe_zone())
        .await
        .unwrap();

    service
        .submit(sample("t1", SAFE_CENTER.0, SAFE_CENTER.1, 0))
        .await
        .unwrap();
    let outcome = service
        .submit(sample("t1", FAR_AWAY.0, FAR_AWAY.1, 1))
        .await
        .unwrap();

    assert_eq!(outcome.events.len(), 1);
    assert_eq!(outcome.events[0].transition, Transition::Exited);
    assert_eq!(outcome.events[0].severity, Severity::Low);
    assert_eq!(outcome.events[0].zone_id, Id::from("film-city"));
}

#[tokio::test]
async fn invalid_coordinates_are_rejected_without_side_effects() {
    let (store, service) = engine().await;
    service
        .registry()
        .create(Id::from("film-city"), safe_zone())
        .await
        .unwrap();

    let result = service.submit(sample("t1", 95.0, 78.4294, 0)).await;
    assert!(matches!(
        result,
        Err(GeofenceError::InvalidCoordinate { latitude, .. }) if latitude == 95.0
    ));

    // nothing was persisted, no membership was created
    use geofence::storage::SampleStore;
    let window = DateTimeRange::new(ts(0), ts(59));
    assert!(store.samples_between(&window, None).await.unwrap().is_empty());
    assert!(service.alerts_since(0).await.unwrap().is_empty());
}

#[tokio::test]
async fn out_of_order_samples_are_archived_but_ignored() {
    let (store, service) = engine().await;
    service
        .registry()
        .create(Id::from("film-city"), safe_zone())
        .await
        .unwrap();

    service
        .submit(sample("t1", SAFE_CENTER.0, SAFE_CENTER.1, 10))
        .await
        .unwrap();
    let stale = service.submit(sample("t1", FAR_AWAY.0, FAR_AWAY.1, 5)).await;
    assert!(matches!(stale, Err(GeofenceError::OutOfOrderSample { .. })));

    // the stale sample is kept for audit ...
    use geofence::storage::{MembershipStore, SampleStore};
    let window = DateTimeRange::new(ts(0), ts(59));
    assert_eq!(store.samples_between(&window, None).await.unwrap().len(), 2);

    // ... but membership still reflects the newer sample
    let state = store
        .get_membership(&Id::from("t1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(state.last_timestamp, ts(10));
    assert!(state.occupies(&Id::from("film-city")));
    // no exit event was fabricated
    assert_eq!(service.alerts_since(0).await.unwrap().len(), 1);
}

#[tokio::test]
async fn identical_resubmission_is_a_no_op() {
    let (_, service) = engine().await;
    service
        .registry()
        .create(Id::from("film-city"), safe_zone())
        .await
        .unwrap();

    let first = service
        .submit(sample("t1", SAFE_CENTER.0, SAFE_CENTER.1, 0))
        .await
        .unwrap();
    assert_eq!(first.events.len(), 1);

    // equal timestamp is in-order (non-decreasing); same position, so the
    // diff is empty and no duplicate entry event is produced
    let second = service
        .submit(sample("t1", SAFE_CENTER.0, SAFE_CENTER.1, 0))
        .await
        .unwrap();
    assert!(second.accepted);
    assert!(second.events.is_empty());
    assert_eq!(service.alerts_since(0).await.unwrap().len(), 1);
}

#[tokio::test]
async fn registration_policy_rejects_unknown_tourists() {
    let store = MemoryStore::new();
    let config = IngestConfig {
        require_registration: true,
        ..IngestConfig::default()
    };
    let service = IngestService::new(store, config).await.unwrap();

    let rejected = service
        .submit(sample("stranger", SAFE_CENTER.0, SAFE_CENTER.1, 0))
        .await;
    assert!(matches!(rejected, Err(GeofenceError::UnknownTourist(_))));

    service.register(&Id::from("stranger")).await.unwrap();
    let accepted = service
        .submit(sample("stranger", SAFE_CENTER.0, SAFE_CENTER.1, 1))
        .await
        .unwrap();
    assert!(accepted.accepted);
}

#[tokio::test]
async fn deactivated_zones_stop_matching_but_still_classify_exits() {
    let (_, service) = engine().await;
    service
        .registry()
        .create(Id::from("film-city"), safe_zone())
        .await
        .unwrap();

    service
        .submit(sample("t1", SAFE_CENTER.0, SAFE_CENTER.1, 0))
        .await
        .unwrap();
    service
        .registry()
        .deactivate(&Id::from("film-city"))
        .await
        .unwrap();

    // same position, but the zone is no longer active: the tourist exits
    let outcome = service
        .submit(sample("t1", SAFE_CENTER.0, SAFE_CENTER.1, 1))
        .await
        .unwrap();
    assert_eq!(outcome.events.len(), 1);
    assert_eq!(outcome.events[0].transition, Transition::Exited);
    assert_eq!(outcome.events[0].zone_kind, ZoneKind::Safe);

    // audit lookup still works
    let zone = service.registry().get(&Id::from("film-city")).await.unwrap();
    assert!(!zone.content.active);
}

#[tokio::test]
async fn zone_creation_rejects_duplicates_and_bad_shapes() {
    let (_, service) = engine().await;
    service
        .registry()
        .create(Id::from("film-city"), safe_zone())
        .await
        .unwrap();

    let duplicate = service
        .registry()
        .create(Id::from("film-city"), safe_zone())
        .await;
    assert!(matches!(duplicate, Err(GeofenceError::DuplicateZone(_))));

    let mut flat = safe_zone();
    flat.shape = ZoneShape::Circle {
        center: GeoPoint::new(SAFE_CENTER.0, SAFE_CENTER.1),
        radius_m: 0.0,
    };
    let rejected = service.registry().create(Id::from("flat"), flat).await;
    assert!(matches!(rejected, Err(GeofenceError::InvalidZoneShape(_))));
    assert_eq!(service.registry().list_active(None).len(), 1);
}

#[tokio::test]
async fn polygon_zones_participate_in_detection() {
    let (_, service) = engine().await;
    let polygon = Zone {
        name: "Market triangle".to_owned(),
        kind: ZoneKind::Restricted,
        shape: ZoneShape::Polygon {
            ring: vec![
                GeoPoint::new(17.20, 78.40),
                GeoPoint::new(17.20, 78.50),
                GeoPoint::new(17.30, 78.45),
            ],
        },
        category: Some("crime_prone".to_owned()),
        risk_level: Some(RiskLevel::High),
        active: true,
    };
    service
        .registry()
        .create(Id::from("market"), polygon)
        .await
        .unwrap();

    let inside = service.submit(sample("t1", 17.22, 78.45, 0)).await.unwrap();
    assert_eq!(inside.events.len(), 1);
    assert_eq!(inside.events[0].severity, Severity::High);

    let outside = service.submit(sample("t1", 17.22, 78.60, 1)).await.unwrap();
    assert_eq!(outside.events.len(), 1);
    assert_eq!(outside.events[0].transition, Transition::Exited);
}

#[tokio::test]
async fn alert_replay_follows_the_cursor() {
    let (_, service) = engine().await;
    service
        .registry()
        .create(Id::from("film-city"), safe_zone())
        .await
        .unwrap();

    service
        .submit(sample("t1", SAFE_CENTER.0, SAFE_CENTER.1, 0))
        .await
        .unwrap();
    service
        .submit(sample("t2", SAFE_CENTER.0, SAFE_CENTER.1, 0))
        .await
        .unwrap();

    let all = service.alerts_since(0).await.unwrap();
    assert_eq!(all.len(), 2);
    let ids = all.iter().map(|event| event.event_id).collect::<Vec<_>>();
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));

    let tail = service.alerts_since(ids[0]).await.unwrap();
    assert_eq!(tail.len(), 1);
    assert_eq!(tail[0].event_id, ids[1]);
}

#[tokio::test]
async fn analytics_summarize_occupancy_and_breaches() {
    let (_, service) = engine().await;
    service
        .registry()
        .create(Id::from("film-city"), safe_zone())
        .await
        .unwrap();
    service
        .registry()
        .create(Id::from("quarry"), restricted_zone(RiskLevel::Medium))
        .await
        .unwrap();

    service
        .submit(sample("t1", SAFE_CENTER.0, SAFE_CENTER.1, 0))
        .await
        .unwrap();
    service
        .submit(sample("t1", FAR_AWAY.0, FAR_AWAY.1, 5))
        .await
        .unwrap();
    service
        .submit(sample("t2", SAFE_CENTER.0, SAFE_CENTER.1, 6))
        .await
        .unwrap();

    let window = DateTimeRange::new(ts(0), ts(59));
    let occupancy = service
        .analytics()
        .occupancy(window, None)
        .await
        .unwrap();
    assert!(occupancy.warnings.is_empty());
    let film_city = occupancy
        .counts
        .iter()
        .find(|entry| entry.zone_id == Id::from("film-city"))
        .unwrap();
    assert_eq!(film_city.samples, 2);
    let quarry = occupancy
        .counts
        .iter()
        .find(|entry| entry.zone_id == Id::from("quarry"))
        .unwrap();
    assert_eq!(quarry.samples, 1);

    let breaches = service
        .analytics()
        .breach_summary(DateTimeRange::new(ts(0), ts(59)), None)
        .await
        .unwrap();
    let quarry_breaches = breaches
        .counts
        .iter()
        .find(|entry| entry.zone_id == Id::from("quarry"))
        .unwrap();
    assert_eq!(quarry_breaches.total, 1);
    assert_eq!(quarry_breaches.by_severity[0].severity, Severity::Medium);

    let history = service
        .analytics()
        .tourist_history(&Id::from("t1"), DateTimeRange::new(ts(0), ts(59)))
        .await
        .unwrap();
    // t1: entered film-city, exited film-city, entered quarry
    assert_eq!(history.len(), 3);
}

#[tokio::test]
async fn malformed_analytics_window_degrades_to_a_warning() {
    let (_, service) = engine().await;
    let backwards = DateTimeRange::new(ts(30), ts(0));
    let report = service
        .analytics()
        .occupancy(backwards, None)
        .await
        .unwrap();
    assert!(report.counts.is_empty());
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("malformed time window"));
}

#[tokio::test]
async fn tourists_are_processed_independently_and_in_order() {
    let (_, service) = engine().await;
    service
        .registry()
        .create(Id::from("film-city"), safe_zone())
        .await
        .unwrap();

    let service = std::sync::Arc::new(service);
    let mut handles = Vec::new();
    for i in 0..8 {
        let service = service.clone();
        let tourist = format!("t{i}");
        handles.push(tokio::spawn(async move {
            for minute in 0..5u32 {
                let (lat, lon) = if minute % 2 == 0 {
                    SAFE_CENTER
                } else {
                    FAR_AWAY
                };
                service
                    .submit(sample(&tourist, lat, lon, minute))
                    .await
                    .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // every tourist bounced in and out: 3 entries and 2 exits each
    let events = service.alerts_since(0).await.unwrap();
    assert_eq!(events.len(), 8 * 5);
    let ids = events.iter().map(|event| event.event_id).collect::<Vec<_>>();
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
}
