use super::*;

fn signed_in(posts: Vec<Post>) -> AppState {
    let mut state = AppState::default();
    reduce(&mut state, Action::LoggedIn(Session::with_token("t1")));
    reduce(&mut state, Action::PostsRequested);
    reduce(&mut state, Action::PostsLoaded(posts));
    state
}

// =============================================================================
// session edges
// =============================================================================

#[test]
fn login_persists_and_marks_fetch_due() {
    let mut state = AppState::default();
    let effects = reduce(&mut state, Action::LoggedIn(Session::with_token("t1")));
    assert_eq!(effects, vec![Effect::PersistSession(Session::with_token("t1"))]);
    assert!(state.auth.is_authenticated());
    assert!(state.posts.fetch_due);
}

#[test]
fn repeated_login_with_same_session_writes_nothing() {
    let mut state = AppState::default();
    reduce(&mut state, Action::LoggedIn(Session::with_token("t1")));
    reduce(&mut state, Action::PostsRequested);
    let effects = reduce(&mut state, Action::LoggedIn(Session::with_token("t1")));
    assert!(effects.is_empty());
    assert!(!state.posts.fetch_due);
}

#[test]
fn login_as_another_user_drops_previous_posts() {
    let mut state = signed_in(vec![Post::new("p1", "one")]);
    reduce(&mut state, Action::MutationStarted(Id::from("p1")));

    let effects = reduce(&mut state, Action::LoggedIn(Session::with_token("t2")));

    assert_eq!(effects, vec![Effect::PersistSession(Session::with_token("t2"))]);
    assert!(state.posts.items.is_empty());
    assert!(!state.posts.is_busy(&Id::from("p1")));
    assert!(state.posts.fetch_due);
}

#[test]
fn restore_marks_fetch_due_without_writing() {
    let mut state = AppState::default();
    let effects = reduce(&mut state, Action::SessionRestored(Session::with_token("t1")));
    assert!(effects.is_empty());
    assert!(state.auth.is_authenticated());
    assert!(state.posts.fetch_due);
}

#[test]
fn logout_clears_session_posts_and_record() {
    let mut state = signed_in(vec![Post::new("p1", "one")]);
    state.redirect = Some(Route::dashboard());
    let effects = reduce(&mut state, Action::LoggedOut);
    assert_eq!(effects, vec![Effect::ClearPersistedSession]);
    assert!(!state.auth.is_authenticated());
    assert!(state.posts.items.is_empty());
    assert!(state.redirect.is_none());
}

#[test]
fn logout_while_anonymous_still_clears_record() {
    let mut state = AppState::default();
    let effects = reduce(&mut state, Action::LoggedOut);
    assert_eq!(effects, vec![Effect::ClearPersistedSession]);
    assert_eq!(state.auth.epoch, 0);
}

#[test]
fn session_rejection_signs_out_with_notice() {
    let mut state = signed_in(vec![Post::new("p1", "one")]);
    let epoch = state.auth.epoch;
    let notice = Notice::new("E_UNAUTHORIZED", "session expired");
    let effects = reduce(&mut state, Action::SessionRejected(notice.clone()));
    assert_eq!(effects, vec![Effect::ClearPersistedSession]);
    assert_eq!(state.notice, Some(notice));
    assert_eq!(state.auth.epoch, epoch + 1);
    assert!(state.posts.items.is_empty());
}

// =============================================================================
// post collection
// =============================================================================

#[test]
fn posts_loaded_replaces_collection_and_stops_loading() {
    let state = signed_in(vec![Post::new(1_u64, "one")]);
    assert_eq!(state.posts.items, vec![Post::new(1_u64, "one")]);
    assert!(!state.posts.loading);
    assert!(!state.posts.fetch_due);
}

#[test]
fn posts_failed_keeps_previous_collection() {
    let mut state = signed_in(vec![Post::new("p1", "one")]);
    reduce(&mut state, Action::PostsRequested);
    reduce(&mut state, Action::PostsFailed(Notice::new("E_SERVER", "down")));
    assert_eq!(state.posts.items.len(), 1);
    assert!(!state.posts.loading);
    assert_eq!(state.notice.as_ref().map(|n| n.code), Some("E_SERVER"));
}

#[test]
fn created_post_goes_first() {
    let mut state = signed_in(vec![Post::new(1_u64, "one")]);
    reduce(&mut state, Action::PostCreated(Post::new(2_u64, "hi")));
    assert_eq!(state.posts.items, vec![Post::new(2_u64, "hi"), Post::new(1_u64, "one")]);
}

#[test]
fn update_replaces_and_requests_detail_navigation() {
    let mut state = signed_in(vec![Post::new("p1", "one"), Post::new("p2", "two")]);
    reduce(&mut state, Action::PostUpdated(Post::new("p2", "two!")));
    assert_eq!(state.posts.items[1].title, "two!");
    assert_eq!(state.posts.items[0].title, "one");
    assert_eq!(state.redirect, Some(Route::post_detail(&Id::from("p2"))));
}

#[test]
fn update_of_unknown_post_does_not_navigate() {
    let mut state = signed_in(vec![Post::new("p1", "one")]);
    reduce(&mut state, Action::PostUpdated(Post::new("p9", "ghost")));
    assert!(state.redirect.is_none());
    assert_eq!(state.posts.items, vec![Post::new("p1", "one")]);
}

#[test]
fn replaced_post_does_not_navigate() {
    let mut state = signed_in(vec![Post::new("p1", "one")]);
    let mut hidden = Post::new("p1", "one");
    hidden.hidden = true;
    reduce(&mut state, Action::PostReplaced(hidden));
    assert!(state.posts.items[0].hidden);
    assert!(state.redirect.is_none());
}

#[test]
fn removed_post_disappears() {
    let mut state = signed_in(vec![Post::new("p1", "one"), Post::new("p2", "two"), Post::new("p3", "three")]);
    reduce(&mut state, Action::PostRemoved(Id::from("p2")));
    let ids: Vec<&str> = state.posts.items.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["p1", "p3"]);
}

#[test]
fn mutation_tracking_round_trip() {
    let mut state = AppState::default();
    reduce(&mut state, Action::MutationStarted(Id::from("p1")));
    assert!(state.posts.is_busy(&Id::from("p1")));
    reduce(&mut state, Action::MutationSettled(Id::from("p1")));
    assert!(!state.posts.is_busy(&Id::from("p1")));
}

#[test]
fn notice_is_dismissable() {
    let mut state = AppState::default();
    reduce(&mut state, Action::Failed(Notice::new("E_TRANSPORT", "offline")));
    assert!(state.notice.is_some());
    reduce(&mut state, Action::NoticeDismissed);
    assert!(state.notice.is_none());
}
