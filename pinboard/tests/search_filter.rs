mod support;

use pinboard::{
    AccessId, EntityStore, FilterCondition, Guid, SearchRequest, SetsError, build_search_query, pinboard_write_accesses,
    search::{Join, TextField},
    types::FRIEND_RELATIONSHIP,
};
use support::{ADMIN, FRIEND, OWNER, POST, STRANGER, add_set, seeded_host, user};

fn result_guids(host: &pinboard::MemoryHost, viewer: u64, query: Option<&str>, mine: bool) -> Vec<u64> {
    let viewer = user(viewer);
    let set_query = build_search_query(host, Some(&viewer), Guid::new(20), query, mine).expect("query should build");
    host.query_sets(&set_query)
        .expect("query should run")
        .iter()
        .map(|set| set.guid.get())
        .collect()
}

/// Sets by the owner (20-23) and by the stranger (30-31), newest first by guid.
fn listing_host() -> pinboard::MemoryHost {
    let mut host = seeded_host();
    add_set(&mut host, 20, OWNER, "Root board", AccessId::Public, 1);
    add_set(&mut host, 21, OWNER, "Vacation photos", AccessId::Private, 2);
    add_set(&mut host, 22, OWNER, "Recipes", AccessId::Friends, 3);
    add_set(&mut host, 23, OWNER, "Club", AccessId::Collection(7), 4);
    add_set(&mut host, 30, STRANGER, "Public wall", AccessId::Public, 5);
    add_set(&mut host, 31, STRANGER, "Stranger notes", AccessId::Private, 6);
    host
}

#[test]
fn vacation_search_builds_full_non_admin_query() {
    let host = listing_host();
    let viewer = user(FRIEND);

    let set_query = build_search_query(&host, Some(&viewer), Guid::new(20), Some("vacation"), false).unwrap();

    let writable = pinboard_write_accesses(&host, Some(&viewer)).unwrap();
    assert_eq!(
        set_query.conditions,
        vec![
            FilterCondition::or([
                FilterCondition::write_access_in(writable),
                FilterCondition::and([
                    FilterCondition::write_access_in([AccessId::Friends]),
                    FilterCondition::owner_related_to(FRIEND_RELATIONSHIP, Guid::new(FRIEND)),
                ]),
                FilterCondition::owner_in([Guid::new(FRIEND)]),
            ]),
            FilterCondition::guid_not(Guid::new(20)),
            FilterCondition::text_contains([TextField::Title, TextField::Description], "vacation"),
        ]
    );
    assert!(set_query.joins.contains(&Join::ObjectsEntity));
    assert!(set_query.joins.contains(&Join::WriteAccessMetadata));
    assert_eq!(set_query.owner_guids, None);
}

#[test]
fn friend_sees_public_and_friends_sets_but_not_private_ones() {
    let host = listing_host();
    assert_eq!(result_guids(&host, FRIEND, None, false), vec![22, 30]);
}

#[test]
fn stranger_sees_public_sets_and_their_own() {
    let host = listing_host();
    assert_eq!(result_guids(&host, STRANGER, None, false), vec![30, 31]);
}

#[test]
fn collection_members_see_collection_sets() {
    let mut host = listing_host();
    host.add_collection_member(7, Guid::new(STRANGER));
    assert_eq!(result_guids(&host, STRANGER, None, false), vec![23, 30, 31]);
}

#[test]
fn administrators_see_every_set_except_the_root() {
    let host = listing_host();
    let guids = result_guids(&host, ADMIN, None, false);
    assert_eq!(guids, vec![21, 22, 23, 30, 31]);

    let admin = user(ADMIN);
    let set_query = build_search_query(&host, Some(&admin), Guid::new(20), None, false).unwrap();
    assert!(!set_query.joins.contains(&Join::WriteAccessMetadata));
}

#[test]
fn mine_only_lists_own_sets_without_root() {
    let host = listing_host();
    assert_eq!(result_guids(&host, OWNER, None, true), vec![21, 22, 23]);
}

#[test]
fn text_query_matches_title_or_description_case_insensitively() {
    let mut host = listing_host();
    add_set(&mut host, 24, OWNER, "Beach", AccessId::Private, 7);
    if let Some(pinboard::types::Entity::Set(mut set)) = host.resolve_entity(Guid::new(24)).unwrap() {
        set.description = "Pictures from our VACATION".to_string();
        host.insert(pinboard::types::Entity::Set(set));
    }
    assert_eq!(result_guids(&host, OWNER, Some("Vacation"), true), vec![21, 24]);
}

#[test]
fn listing_is_capped_at_five_newest() {
    let mut host = seeded_host();
    add_set(&mut host, 20, OWNER, "Root", AccessId::Public, 0);
    for guid in 40..48 {
        add_set(&mut host, guid, OWNER, "Board", AccessId::Private, guid as i64);
    }
    assert_eq!(result_guids(&host, OWNER, None, true), vec![40, 41, 42, 43, 44]);
}

#[test]
fn anonymous_viewer_sees_public_sets_only() {
    let host = listing_host();
    let set_query = build_search_query(&host, None, Guid::new(20), None, false).unwrap();
    let guids: Vec<u64> = host
        .query_sets(&set_query)
        .unwrap()
        .iter()
        .map(|set| set.guid.get())
        .collect();
    assert_eq!(guids, vec![30]);
    assert_eq!(pinboard_write_accesses(&host, None).unwrap(), vec![AccessId::Public]);
}

#[test]
fn search_can_be_rooted_at_any_entity() {
    let host = listing_host();
    let viewer = user(OWNER);
    let set_query = build_search_query(&host, Some(&viewer), Guid::new(POST), None, true).unwrap();
    assert_eq!(set_query.target_entity_guid, Some(Guid::new(POST)));
    assert_eq!(host.query_sets(&set_query).unwrap().len(), 4);
}

#[test]
fn request_parameters_drive_the_builder() {
    let host = listing_host();
    let request: SearchRequest =
        serde_json::from_str(r#"{"entity_guid": 20, "query": "", "filter_mine": "false"}"#).unwrap();
    let viewer = user(STRANGER);
    let set_query = request.build(&host, Some(&viewer)).unwrap();
    assert_eq!(set_query.owner_guids, None);
    assert_eq!(host.query_sets(&set_query).unwrap().len(), 2);

    let missing: SearchRequest = serde_json::from_str(r#"{"entity_guid": 404}"#).unwrap();
    assert!(matches!(
        missing.build(&host, Some(&viewer)),
        Err(SetsError::InvalidEntity { .. })
    ));
}
