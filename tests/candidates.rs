mod common;

use matchbook::database::ProfileStore;
use matchbook::error::Error;
use matchbook::models::{Gender, GeoPoint, Preferences, Profile};
use matchbook::services::{candidate_service, profile_service};
use matchbook::state::AppState;

use common::{born_aged, harness, new_profile, prefs};

async fn register_at(
    state: &AppState,
    email: &str,
    name: &str,
    gender: Gender,
    age: i32,
    location: GeoPoint,
) -> Profile {
    let mut input = new_profile(email, name, gender, born_aged(age, 100));
    input.location = location;
    profile_service::register_profile(state, input).await.unwrap()
}

fn amsterdam() -> GeoPoint {
    GeoPoint {
        longitude: 4.9041,
        latitude: 52.3676,
    }
}

// ~12 km north-east of the Amsterdam fixture point.
fn zaandam() -> GeoPoint {
    GeoPoint {
        longitude: 5.0,
        latitude: 52.46,
    }
}

// ~57 km south, outside a 50 km radius but inside its bounding box.
fn rotterdam() -> GeoPoint {
    GeoPoint {
        longitude: 4.4792,
        latitude: 51.9225,
    }
}

#[tokio::test]
async fn requester_never_appears_in_own_results() {
    let h = harness().await;

    // The requester matches her own criteria in every other way.
    let requester = register_at(
        &h.state,
        "req@example.com",
        "Req",
        Gender::Female,
        27,
        amsterdam(),
    )
    .await;
    register_at(
        &h.state,
        "other@example.com",
        "Other",
        Gender::Female,
        27,
        zaandam(),
    )
    .await;

    let results = candidate_service::find_candidates(
        &h.state,
        &requester.id,
        &prefs(vec![Gender::Female], 20, 30),
        0,
        20,
    )
    .await
    .unwrap();

    assert_eq!(results.len(), 1);
    assert!(results.iter().all(|p| p.id != requester.id));
}

#[tokio::test]
async fn filters_compose_like_the_reference_scenario() {
    let h = harness().await;

    let requester = register_at(
        &h.state,
        "req@example.com",
        "Req",
        Gender::Male,
        30,
        amsterdam(),
    )
    .await;

    // Must appear: female, 27, ~12 km away, visible and active.
    let hit = register_at(
        &h.state,
        "hit@example.com",
        "Hit",
        Gender::Female,
        27,
        zaandam(),
    )
    .await;

    // Otherwise identical but deactivated.
    let inactive = register_at(
        &h.state,
        "inactive@example.com",
        "Inactive",
        Gender::Female,
        27,
        zaandam(),
    )
    .await;
    profile_service::update_profile(
        &h.state,
        &inactive.id,
        profile_service::ProfileUpdate {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    // Hidden by their own visibility flag.
    let mut hidden = new_profile("hidden@example.com", "Hidden", Gender::Female, born_aged(27, 100));
    hidden.location = zaandam();
    hidden.preferences = Some(Preferences {
        show_me: false,
        ..Preferences::default()
    });
    profile_service::register_profile(&h.state, hidden).await.unwrap();

    // Wrong gender, too old, too far.
    register_at(&h.state, "male@example.com", "M", Gender::Male, 27, zaandam()).await;
    register_at(&h.state, "old@example.com", "Old", Gender::Female, 45, zaandam()).await;
    register_at(
        &h.state,
        "far@example.com",
        "Far",
        Gender::Female,
        27,
        rotterdam(),
    )
    .await;

    let preferences = Preferences {
        genders: vec![Gender::Female],
        min_age: 20,
        max_age: 30,
        max_distance_km: Some(50.0),
        show_me: true,
    };
    let results = candidate_service::find_candidates(&h.state, &requester.id, &preferences, 0, 20)
        .await
        .unwrap();

    let ids: Vec<&str> = results.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec![hit.id.as_str()]);
}

#[tokio::test]
async fn exact_age_range_respects_birthday_boundaries() {
    let h = harness().await;

    let requester = register_at(
        &h.state,
        "req@example.com",
        "Req",
        Gender::Male,
        30,
        amsterdam(),
    )
    .await;

    // Turned 25 yesterday and today: both exactly 25.
    let mut input = new_profile(
        "yesterday@example.com",
        "Yesterday",
        Gender::Female,
        born_aged(25, 1),
    );
    input.location = zaandam();
    let yesterday = profile_service::register_profile(&h.state, input).await.unwrap();
    let mut input = new_profile(
        "today@example.com",
        "Today",
        Gender::Female,
        born_aged(25, 0),
    );
    input.location = zaandam();
    let today_25 = profile_service::register_profile(&h.state, input).await.unwrap();

    // Turns 25 tomorrow: still 24.
    let mut input = new_profile(
        "tomorrow@example.com",
        "Tomorrow",
        Gender::Female,
        born_aged(25, -1),
    );
    input.location = zaandam();
    profile_service::register_profile(&h.state, input).await.unwrap();

    // Turned 26 today: just aged out.
    let mut input = new_profile(
        "aged-out@example.com",
        "AgedOut",
        Gender::Female,
        born_aged(26, 0),
    );
    input.location = zaandam();
    profile_service::register_profile(&h.state, input).await.unwrap();

    let results = candidate_service::find_candidates(
        &h.state,
        &requester.id,
        &prefs(vec![Gender::Female], 25, 25),
        0,
        20,
    )
    .await
    .unwrap();

    let mut ids: Vec<&str> = results.iter().map(|p| p.id.as_str()).collect();
    ids.sort();
    let mut expected = vec![yesterday.id.as_str(), today_25.id.as_str()];
    expected.sort();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn empty_gender_preference_fails_before_any_store_query() {
    let h = harness().await;

    let result = candidate_service::find_candidates(
        &h.state,
        "whoever",
        &prefs(vec![], 20, 30),
        0,
        20,
    )
    .await;

    assert!(matches!(result, Err(Error::Validation(_))));
    assert_eq!(h.calls.total(), 0, "validation must run before store access");
}

#[tokio::test]
async fn unknown_requester_is_not_found() {
    let h = harness().await;

    let result = candidate_service::find_candidates(
        &h.state,
        "no-such-id",
        &prefs(vec![Gender::Female], 20, 30),
        0,
        20,
    )
    .await;
    assert!(matches!(result, Err(Error::NotFound { .. })));
}

#[tokio::test]
async fn unbounded_distance_skips_geo_filtering() {
    let h = harness().await;

    let requester = register_at(
        &h.state,
        "req@example.com",
        "Req",
        Gender::Male,
        30,
        amsterdam(),
    )
    .await;
    let far = register_at(
        &h.state,
        "far@example.com",
        "Far",
        Gender::Female,
        27,
        rotterdam(),
    )
    .await;

    let results = candidate_service::find_candidates(
        &h.state,
        &requester.id,
        &prefs(vec![Gender::Female], 20, 30),
        0,
        20,
    )
    .await
    .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, far.id);

    // The same candidate disappears once a 50 km cap applies.
    let capped = Preferences {
        max_distance_km: Some(50.0),
        ..prefs(vec![Gender::Female], 20, 30)
    };
    let results = candidate_service::find_candidates(&h.state, &requester.id, &capped, 0, 20)
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn no_matches_is_an_empty_page_not_an_error() {
    let h = harness().await;

    let requester = register_at(
        &h.state,
        "req@example.com",
        "Req",
        Gender::Male,
        30,
        amsterdam(),
    )
    .await;

    let results = candidate_service::find_candidates(
        &h.state,
        &requester.id,
        &prefs(vec![Gender::NonBinary], 20, 30),
        0,
        20,
    )
    .await
    .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn pagination_is_stable_and_disjoint() {
    let h = harness().await;

    let requester = register_at(
        &h.state,
        "req@example.com",
        "Req",
        Gender::Male,
        30,
        amsterdam(),
    )
    .await;
    for i in 0..5 {
        register_at(
            &h.state,
            &format!("c{}@example.com", i),
            &format!("C{}", i),
            Gender::Female,
            25 + i,
            zaandam(),
        )
        .await;
    }

    let preferences = prefs(vec![Gender::Female], 20, 40);

    let page0 = candidate_service::find_candidates(&h.state, &requester.id, &preferences, 0, 2)
        .await
        .unwrap();
    let page0_again =
        candidate_service::find_candidates(&h.state, &requester.id, &preferences, 0, 2)
            .await
            .unwrap();
    let page1 = candidate_service::find_candidates(&h.state, &requester.id, &preferences, 1, 2)
        .await
        .unwrap();
    let page2 = candidate_service::find_candidates(&h.state, &requester.id, &preferences, 2, 2)
        .await
        .unwrap();
    let page3 = candidate_service::find_candidates(&h.state, &requester.id, &preferences, 3, 2)
        .await
        .unwrap();

    let ids = |page: &[Profile]| page.iter().map(|p| p.id.clone()).collect::<Vec<_>>();
    assert_eq!(ids(&page0), ids(&page0_again), "same page, same data, same order");
    assert_eq!(page0.len(), 2);
    assert_eq!(page1.len(), 2);
    assert_eq!(page2.len(), 1);
    assert!(page3.is_empty());

    let mut all = ids(&page0);
    all.extend(ids(&page1));
    all.extend(ids(&page2));
    let mut sorted = all.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(all.len(), 5, "pages must not overlap");
    assert_eq!(sorted, all, "results must be ordered by id ascending");
}

#[tokio::test]
async fn candidate_search_bumps_requester_last_active() {
    let h = harness().await;

    let requester = register_at(
        &h.state,
        "req@example.com",
        "Req",
        Gender::Male,
        30,
        amsterdam(),
    )
    .await;

    candidate_service::find_candidates(
        &h.state,
        &requester.id,
        &prefs(vec![Gender::Female], 20, 30),
        0,
        20,
    )
    .await
    .unwrap();

    let stored = h
        .state
        .store
        .find_by_id(&requester.id)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.last_active_at >= requester.last_active_at);
}
