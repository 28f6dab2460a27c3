use std::path::PathBuf;

use pinboard::{EntityStore, Guid, MemoryHost, PinManager, SearchRequest, Session, SetsError, UserEntity};

fn demo_host() -> MemoryHost {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../demos/fixture.json");
    MemoryHost::load(&path).expect("demo fixture should load")
}

fn demo_user(host: &MemoryHost, guid: u64) -> UserEntity {
    host.resolve_entity(Guid::new(guid))
        .unwrap()
        .and_then(|entity| entity.as_user().cloned())
        .expect("demo user")
}

#[test]
fn ben_can_pin_into_friends_logged_in_and_club_sets() {
    let host = demo_host();
    let ben = demo_user(&host, 2);
    let request = SearchRequest {
        entity_guid: Some(Guid::new(10)),
        query: None,
        filter_mine: Some("false".to_string()),
    };

    let query = request.build(&host, Some(&ben)).unwrap();
    let guids: Vec<u64> = host
        .query_sets(&query)
        .unwrap()
        .iter()
        .map(|set| set.guid.get())
        .collect();
    assert_eq!(guids, vec![23, 22, 21]);
}

#[test]
fn ben_pins_his_post_but_not_into_a_private_set() {
    let mut host = demo_host();
    let session = Session::logged_in(demo_user(&host, 2));
    let mut manager = PinManager::new(&mut host, &session);

    assert!(manager.pin(Guid::new(10), Guid::new(21), None).unwrap());
    assert!(matches!(
        manager.pin(Guid::new(10), Guid::new(20), None),
        Err(SetsError::CannotEdit { .. })
    ));
}
