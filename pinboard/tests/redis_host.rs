//! Runs against a live Redis: `REDIS_URL=redis://127.0.0.1/ cargo test -- --ignored`.

mod support;

use pinboard::{
    AccessId, EntityStore, Guid, PINNED_RELATIONSHIP, PinManager, RedisHost, SET_SUBTYPE, Session,
    build_search_query, host::Fixture,
};
use redis::Commands;
use serial_test::serial;
use support::{FRIEND, OWNER, POST, STRANGER, add_set, seeded_host, user};

fn redis_url() -> String {
    std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1/".to_string())
}

fn connect(prefix: &str) -> RedisHost {
    let host = RedisHost::connect(&redis_url(), prefix).expect("redis should be reachable");
    host.cleanup().expect("cleanup should succeed");
    host
}

fn fixture() -> Fixture {
    let mut memory = seeded_host();
    add_set(&mut memory, 20, OWNER, "Root", AccessId::Public, 1);
    add_set(&mut memory, 21, OWNER, "Vacation", AccessId::Friends, 2);
    add_set(&mut memory, 30, STRANGER, "Wall", AccessId::Public, 3);
    memory.to_fixture()
}

#[test]
#[ignore = "requires a running Redis instance"]
#[serial]
fn pins_round_trip_through_redis() {
    let mut host = connect("pinboard_test_pins");
    host.import(&fixture()).expect("import should succeed");
    let session = Session::logged_in(user(FRIEND));

    let mut manager = PinManager::new(&mut host, &session);
    assert!(manager.pin(Guid::new(POST), Guid::new(21), None).unwrap());
    assert!(!manager.pin(Guid::new(POST), Guid::new(21), None).unwrap());
    assert!(manager.is_pinned(Guid::new(POST), Guid::new(21)).unwrap());
    assert!(manager.unpin(Guid::new(POST), Guid::new(21), None).unwrap());
    assert!(
        !host
            .check_relationship(Guid::new(POST), PINNED_RELATIONSHIP, Guid::new(21))
            .unwrap()
    );

    host.cleanup().unwrap();
}

#[test]
#[ignore = "requires a running Redis instance"]
#[serial]
fn search_executes_against_redis_index() {
    let mut host = connect("pinboard_test_search");
    host.import(&fixture()).expect("import should succeed");
    let viewer = user(FRIEND);

    let set_query = build_search_query(&host, Some(&viewer), Guid::new(20), None, false).unwrap();
    let guids: Vec<u64> = host
        .query_sets(&set_query)
        .unwrap()
        .iter()
        .map(|set| set.guid.get())
        .collect();
    assert_eq!(guids, vec![21, 30]);

    host.cleanup().unwrap();
}

#[test]
#[ignore = "requires a running Redis instance"]
#[serial]
fn overwriting_a_set_with_content_drops_it_from_the_index() {
    let mut host = connect("pinboard_test_index");
    host.import(&fixture()).expect("import should succeed");
    host.put_entity(&support::post(21, OWNER)).unwrap();

    let mut conn = redis::Client::open(redis_url()).unwrap().get_connection().unwrap();
    let indexed: Vec<u64> = conn.smembers(host.key_context().subtype_index(SET_SUBTYPE)).unwrap();
    assert!(!indexed.contains(&21));
    assert!(indexed.contains(&20));

    host.cleanup().unwrap();
}
