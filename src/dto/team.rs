use crate::domain::user::User;

pub struct TeamPageData {
    pub members: Vec<User>,
}
