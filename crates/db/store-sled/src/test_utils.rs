use crate::CheckpointStateDBSled;

pub fn get_test_sled_db() -> sled::Db {
    sled::Config::new().temporary(true).open().unwrap()
}

pub fn get_test_checkpoint_state_db() -> CheckpointStateDBSled {
    CheckpointStateDBSled::new(&get_test_sled_db()).unwrap()
}
