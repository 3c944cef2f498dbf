use crate::domain::campaign::Campaign;
use crate::domain::sequence::Sequence;
use crate::domain::tag::Tag;

pub struct CampaignsPageData {
    pub campaigns: Vec<Campaign>,
    /// Choices offered by the campaign form.
    pub sequences: Vec<Sequence>,
    pub tags: Vec<Tag>,
}
