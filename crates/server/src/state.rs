use engine::Forum;

#[derive(Clone)]
pub struct AppState {
    pub forum: Forum,
}
