use beacon_db_types::traits::CheckpointStateDatabase;
use beacon_primitives::Checkpoint;
use beacon_test_utils::make_root;

pub fn test_put_and_get_state_blob(db: &impl CheckpointStateDatabase) {
    let cp = Checkpoint::new(20, make_root(1));
    let blob = vec![1, 2, 3, 4];

    let inserted = db.put_state_blob(cp, blob.clone()).expect("test: put");
    assert!(inserted);

    let retrieved = db.get_state_blob(cp).expect("test: get").unwrap();
    assert_eq!(retrieved, blob);
}

pub fn test_get_missing_state_blob(db: &impl CheckpointStateDatabase) {
    let cp = Checkpoint::new(3, make_root(9));
    let res = db.get_state_blob(cp).expect("test: get");
    assert!(res.is_none());
}

pub fn test_put_does_not_overwrite(db: &impl CheckpointStateDatabase) {
    let cp = Checkpoint::new(20, make_root(1));

    assert!(db.put_state_blob(cp, vec![1]).expect("test: put first"));
    assert!(!db.put_state_blob(cp, vec![2]).expect("test: put second"));

    let retrieved = db.get_state_blob(cp).expect("test: get").unwrap();
    assert_eq!(retrieved, vec![1]);
}

pub fn test_delete_state_blob(db: &impl CheckpointStateDatabase) {
    let cp = Checkpoint::new(20, make_root(1));
    db.put_state_blob(cp, vec![5; 16]).expect("test: put");

    assert!(db.del_state_blob(cp).expect("test: delete"));
    assert!(db.get_state_blob(cp).expect("test: get").is_none());

    // Deleting again is fine, there's just nothing there.
    assert!(!db.del_state_blob(cp).expect("test: delete again"));
}

pub fn test_same_root_different_epochs(db: &impl CheckpointStateDatabase) {
    let root = make_root(7);
    let cp20 = Checkpoint::new(20, root);
    let cp21 = Checkpoint::new(21, root);

    db.put_state_blob(cp20, vec![20]).expect("test: put 20");
    db.put_state_blob(cp21, vec![21]).expect("test: put 21");

    assert_eq!(db.get_state_blob(cp20).unwrap().unwrap(), vec![20]);
    assert_eq!(db.get_state_blob(cp21).unwrap().unwrap(), vec![21]);

    db.del_state_blob(cp20).expect("test: delete");
    assert!(db.get_state_blob(cp20).unwrap().is_none());
    assert_eq!(db.get_state_blob(cp21).unwrap().unwrap(), vec![21]);
}

pub fn test_blob_checkpoints_ordered_by_epoch(db: &impl CheckpointStateDatabase) {
    // Insert out of order, with roots that sort opposite to epochs.
    let cps = [
        Checkpoint::new(300, make_root(1)),
        Checkpoint::new(2, make_root(200)),
        Checkpoint::new(45, make_root(3)),
        Checkpoint::new(45, make_root(2)),
    ];
    for cp in cps {
        db.put_state_blob(cp, vec![0]).expect("test: put");
    }

    let listed = db.get_blob_checkpoints().expect("test: list");
    let epochs: Vec<_> = listed.iter().map(|cp| cp.epoch()).collect();
    assert_eq!(epochs, vec![2, 45, 45, 300]);
}

pub fn test_del_blobs_before_epoch(db: &impl CheckpointStateDatabase) {
    for epoch in 3..=12u64 {
        let cp = Checkpoint::new(epoch, make_root(epoch as u8));
        db.put_state_blob(cp, vec![epoch as u8]).expect("test: put");
    }

    let deleted = db.del_blobs_before_epoch(10).expect("test: delete range");
    let deleted_epochs: Vec<_> = deleted.iter().map(|cp| cp.epoch()).collect();
    assert_eq!(deleted_epochs, (3..10).collect::<Vec<_>>());

    let remaining: Vec<_> = db
        .get_blob_checkpoints()
        .expect("test: list")
        .iter()
        .map(|cp| cp.epoch())
        .collect();
    assert_eq!(remaining, vec![10, 11, 12]);

    // nothing left below 10
    assert!(db.del_blobs_before_epoch(10).unwrap().is_empty());
}

#[macro_export]
macro_rules! checkpoint_state_db_tests {
    ($setup_expr:expr) => {
        #[test]
        fn test_put_and_get_state_blob() {
            let db = $setup_expr;
            $crate::checkpoint_state_tests::test_put_and_get_state_blob(&db);
        }

        #[test]
        fn test_get_missing_state_blob() {
            let db = $setup_expr;
            $crate::checkpoint_state_tests::test_get_missing_state_blob(&db);
        }

        #[test]
        fn test_put_does_not_overwrite() {
            let db = $setup_expr;
            $crate::checkpoint_state_tests::test_put_does_not_overwrite(&db);
        }

        #[test]
        fn test_delete_state_blob() {
            let db = $setup_expr;
            $crate::checkpoint_state_tests::test_delete_state_blob(&db);
        }

        #[test]
        fn test_same_root_different_epochs() {
            let db = $setup_expr;
            $crate::checkpoint_state_tests::test_same_root_different_epochs(&db);
        }

        #[test]
        fn test_blob_checkpoints_ordered_by_epoch() {
            let db = $setup_expr;
            $crate::checkpoint_state_tests::test_blob_checkpoints_ordered_by_epoch(&db);
        }

        #[test]
        fn test_del_blobs_before_epoch() {
            let db = $setup_expr;
            $crate::checkpoint_state_tests::test_del_blobs_before_epoch(&db);
        }
    };
}
