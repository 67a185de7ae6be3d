use super::*;

#[test]
fn default_is_anonymous() {
    let state = AuthState::default();
    assert_eq!(state.phase(), Phase::Anonymous);
    assert!(!state.is_authenticated());
    assert_eq!(state.epoch, 0);
}

#[test]
fn sign_in_bumps_epoch_once_per_new_session() {
    let mut state = AuthState::default();
    assert!(state.sign_in(Session::with_token("t1")));
    assert_eq!(state.epoch, 1);
    assert!(!state.sign_in(Session::with_token("t1")));
    assert_eq!(state.epoch, 1);
    assert!(state.sign_in(Session::with_token("t2")));
    assert_eq!(state.epoch, 2);
    assert!(state.is_authenticated());
}

#[test]
fn sign_out_only_transitions_from_authenticated() {
    let mut state = AuthState::default();
    assert!(!state.sign_out());
    assert_eq!(state.epoch, 0);

    state.sign_in(Session::with_token("t1"));
    assert!(state.sign_out());
    assert_eq!(state.epoch, 2);
    assert_eq!(state.phase(), Phase::Anonymous);
}
