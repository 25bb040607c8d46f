use crate::BlockState;

#[test]
fn test_default_state() {
    assert_eq!(BlockState::default(), BlockState::Unseen);
}

#[test]
fn test_is_connected() {
    assert!(BlockState::Best.is_connected());
    assert!(BlockState::Connected.is_connected());
    assert!(!BlockState::Pending.is_connected());
    assert!(!BlockState::Unseen.is_connected());
}
