//! Text search across pages
//!
//! A query may end in flag characters, in any order: `?` searches
//! backwards, `~` ignores case and `%` matches whole words only.

use log::debug;

use crate::engine::{DocumentEngine, EngineError, FindFlags};
use crate::geometry::Rectangle;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub backwards: bool,
    pub flags: FindFlags,
}

impl SearchQuery {
    /// Split trailing flags off `input`; `None` if nothing is left to find
    pub fn parse(input: &str) -> Option<Self> {
        let mut text = input;
        let mut backwards = false;
        let mut flags = FindFlags::default();

        while let Some(last) = text.chars().next_back() {
            match last {
                '?' => backwards = true,
                '~' => flags.ignore_case = true,
                '%' => flags.whole_words = true,
                _ => break,
            }
            text = &text[..text.len() - last.len_utf8()];
        }

        (!text.is_empty()).then(|| Self {
            text: text.to_string(),
            backwards,
            flags,
        })
    }
}

/// Where a search matched
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchHit {
    pub page: usize,
    /// Match in page space with a top-left origin
    pub rect: Rectangle,
}

/// Search from `start` toward the end (or the start, for backward queries)
/// of the document. There is no wrap-around.
pub fn find<E: DocumentEngine>(
    engine: &E,
    doc: &E::Document,
    query: &SearchQuery,
    start: usize,
    page_count: usize,
) -> Result<Option<SearchHit>, EngineError> {
    if start == 0 || start > page_count {
        return Ok(None);
    }

    let pages: Box<dyn Iterator<Item = usize>> = if query.backwards {
        Box::new((1..=start).rev())
    } else {
        Box::new(start..=page_count)
    };

    for page in pages {
        if let Some(rect) = engine.find_text(doc, page, &query.text, query.flags)? {
            debug!("search {:?}: hit on page {page}", query.text);
            return Ok(Some(SearchHit { page, rect }));
        }
    }

    debug!("search {:?}: not found", query.text);
    Ok(None)
}
