use crate::domain::tag::Tag;

pub struct TagsPageData {
    pub tags: Vec<Tag>,
}
