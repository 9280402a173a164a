use compose_content::Post;
use serde::Serialize;

/// A single path segment under `/`: all digits is an index page, anything
/// else is a slug.
#[derive(Debug, PartialEq, Eq)]
pub enum Segment<'a> {
    Page(usize),
    Slug(&'a str),
}

impl<'a> Segment<'a> {
    pub fn parse(segment: &'a str) -> Self {
        if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
            // Overlong numbers are a page that cannot exist
            Segment::Page(segment.parse().unwrap_or(usize::MAX))
        } else {
            Segment::Slug(segment)
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexPage {
    pub posts: Vec<Post>,
    pub current_page: usize,
    pub total_pages: usize,
}
