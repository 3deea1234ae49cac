use bbsnet::net::pending::{list_pending, MAX_PEND_NAMES};
use bbsnet::net::{create_pend, rename_pend, NetError, PendingName};
use std::collections::HashSet;
use std::io::ErrorKind;

#[test]
fn concurrent_writers_never_share_a_name() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let dir = tmp.path();

    let names: Vec<String> = std::thread::scope(|s| {
        let workers: Vec<_> = (0..8)
            .map(|w| {
                s.spawn(move || {
                    let mut mine = Vec::new();
                    for i in 0..25 {
                        let pend = create_pend(dir, w % 2 == 0, 2).expect("claim");
                        std::fs::write(dir.join(&pend), format!("{}-{}", w, i)).expect("write");
                        mine.push(rename_pend(dir, &pend, 2).expect("publish"));
                    }
                    mine
                })
            })
            .collect();
        workers.into_iter().flat_map(|h| h.join().unwrap()).collect()
    });

    let unique: HashSet<&String> = names.iter().collect();
    assert_eq!(unique.len(), 200);
    assert_eq!(list_pending(dir).unwrap().len(), 200);

    // Every published file still holds what its writer put there.
    let mut contents = HashSet::new();
    for n in &names {
        contents.insert(std::fs::read_to_string(dir.join(n)).unwrap());
    }
    assert_eq!(contents.len(), 200);
}

#[test]
fn flag_follows_the_in_progress_name() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let local = create_pend(tmp.path(), true, 5).unwrap();
    let remote = create_pend(tmp.path(), false, 5).unwrap();
    assert!(local.starts_with("p0-5-"));
    assert!(remote.starts_with("p1-5-"));

    let published = rename_pend(tmp.path(), &local, 5).unwrap();
    assert_eq!(published, "p0-5-0.net");
    assert_eq!(
        PendingName::parse(&published),
        Some(PendingName::Published { local: true, app_id: 5, number: 0 })
    );
}

#[test]
fn full_name_space_is_reported_and_source_kept() {
    let tmp = tempfile::tempdir().expect("tempdir");
    for n in 0..MAX_PEND_NAMES {
        std::fs::write(tmp.path().join(format!("p1-2-{}.net", n)), b"").unwrap();
    }
    let pend = create_pend(tmp.path(), false, 2).unwrap();

    let err = rename_pend(tmp.path(), &pend, 2).unwrap_err();
    assert!(matches!(err, NetError::Io(ref e) if e.kind() == ErrorKind::AlreadyExists));
    assert!(tmp.path().join(&pend).exists());
}

#[test]
fn published_names_are_not_accepted_for_renaming() {
    let tmp = tempfile::tempdir().expect("tempdir");
    std::fs::write(tmp.path().join("p1-2-0.net"), b"").unwrap();
    let err = rename_pend(tmp.path(), "p1-2-0.net", 2).unwrap_err();
    assert!(matches!(err, NetError::Io(ref e) if e.kind() == ErrorKind::InvalidInput));
}
