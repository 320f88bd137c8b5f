use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Anything that can live in a paginated feed.
pub(crate) trait FeedItem {
    fn item_id(&self) -> i64;
}

/// A single review as returned by the list endpoints.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Review {
    pub id: i64,

    #[serde(default)]
    pub isbn: Option<String>,

    #[serde(default)]
    pub book_title: String,

    /// Authors joined with `^` by the backend.
    #[serde(default)]
    pub book_authors: String,

    #[serde(default)]
    pub publisher: String,

    #[serde(default)]
    pub rating: u8,

    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub member_name: String,

    #[serde(default)]
    pub created_at: String,

    #[serde(default)]
    pub reading_status: Option<ReadingStatus>,

    #[serde(default)]
    pub like_count: u32,

    #[serde(default, alias = "likedByMe", alias = "isLiked")]
    pub liked: bool,
}

impl FeedItem for Review {
    fn item_id(&self) -> i64 {
        self.id
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Book {
    pub isbn: String,
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub published_date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Catalog search hit; the search endpoint uses `image` rather than `imageUrl`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct BookSearchItem {
    pub isbn: String,
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Display,
    AsRefStr,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub(crate) enum ReadingStatus {
    #[default]
    Read,
    Reading,
    WantToRead,
}

impl ReadingStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Read => "Read",
            Self::Reading => "Reading",
            Self::WantToRead => "Want to read",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_review_contract_deserialize() {
        let json = r#"{
            "id": 17,
            "isbn": "9788936434120",
            "bookTitle": "Almond",
            "bookAuthors": "Sohn Won-pyung^Translator",
            "publisher": "Changbi",
            "rating": 4,
            "content": "Quiet and sharp.",
            "memberName": "reader",
            "createdAt": "2025-01-03T10:00:00",
            "readingStatus": "READING",
            "likeCount": 2,
            "likedByMe": true
        }"#;
        let review: Review = serde_json::from_str(json).expect("review should parse");
        assert_eq!(review.id, 17);
        assert_eq!(review.book_title, "Almond");
        assert_eq!(review.reading_status, Some(ReadingStatus::Reading));
        assert_eq!(review.like_count, 2);
        assert!(review.liked);
        assert_eq!(review.item_id(), 17);
    }

    #[test]
    fn test_review_missing_like_fields_default() {
        let review: Review =
            serde_json::from_str(r#"{"id": 1, "bookTitle": "t"}"#).expect("should parse");
        assert_eq!(review.like_count, 0);
        assert!(!review.liked);
        assert!(review.reading_status.is_none());
    }

    #[test]
    fn test_book_contract_deserialize() {
        let json = r#"{
            "isbn": "9791190090018",
            "title": "Book",
            "publisher": "P",
            "publishedDate": "2020-05-01",
            "imageUrl": "http://img"
        }"#;
        let book: Book = serde_json::from_str(json).expect("book should parse");
        assert_eq!(book.published_date.as_deref(), Some("2020-05-01"));
        assert_eq!(book.image_url.as_deref(), Some("http://img"));
        assert!(book.author.is_none());
    }

    #[test]
    fn test_reading_status_wire_names() {
        assert_eq!(ReadingStatus::WantToRead.as_ref(), "WANT_TO_READ");
        assert_eq!(
            serde_json::to_value(ReadingStatus::Read).expect("should serialize"),
            "READ"
        );
        assert_eq!("READING".parse::<ReadingStatus>(), Ok(ReadingStatus::Reading));
        assert_eq!(
            "WANT_TO_READ".parse::<ReadingStatus>(),
            Ok(ReadingStatus::WantToRead)
        );
        assert!("bogus".parse::<ReadingStatus>().is_err());
    }
}
