//! Span merging
//!
//! Interleaves a document string with its annotation spans, producing
//! plain-text runs and annotated runs in reading order. The spans are
//! expected sorted and non-overlapping; that is not checked here (see
//! [`check_layout`]), offsets are only clamped so slicing never panics.

use crate::error::LayoutError;
use crate::types::Annotation;

/// One run of the merged document
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment<'a> {
    /// Text between mentions, newlines still raw
    PlainText(&'a str),
    /// A mention and the annotation it came from
    AnnotatedSpan {
        mention: &'a str,
        index: usize,
        annotation: &'a Annotation,
    },
}

impl<'a> Segment<'a> {
    pub fn text(&self) -> &'a str {
        match self {
            Segment::PlainText(content) => content,
            Segment::AnnotatedSpan { mention, .. } => mention,
        }
    }
}

/// Byte offset of every char boundary, so char offsets can be sliced in O(1)
struct CharBounds {
    offsets: Vec<usize>,
}

impl CharBounds {
    fn new(text: &str) -> Self {
        let mut offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        offsets.push(text.len());
        Self { offsets }
    }

    /// Number of chars in the text
    fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    fn slice<'t>(&self, text: &'t str, start: usize, end: usize) -> &'t str {
        &text[self.offsets[start]..self.offsets[end]]
    }
}

/// Merge `text` with its annotations into ordered segments.
///
/// Leading gaps are emitted only when non-empty; the trailing plain-text
/// segment is always emitted, possibly empty.
pub fn merge<'a>(text: &'a str, annotations: &'a [Annotation]) -> Vec<Segment<'a>> {
    let bounds = CharBounds::new(text);
    let len = bounds.len();
    let mut segments = Vec::with_capacity(annotations.len() * 2 + 1);
    let mut cursor = 0;

    for (index, annotation) in annotations.iter().enumerate() {
        let start = annotation.start.clamp(cursor, len);
        let end = annotation.end.clamp(start, len);

        if start > cursor {
            segments.push(Segment::PlainText(bounds.slice(text, cursor, start)));
        }
        segments.push(Segment::AnnotatedSpan {
            mention: bounds.slice(text, start, end),
            index,
            annotation,
        });
        cursor = end;
    }

    segments.push(Segment::PlainText(bounds.slice(text, cursor, len)));
    segments
}

/// Check that annotations are non-empty, in bounds, ascending and disjoint.
pub fn check_layout(text: &str, annotations: &[Annotation]) -> Result<(), LayoutError> {
    let len = text.chars().count();
    let mut previous_end = 0;

    for (index, annotation) in annotations.iter().enumerate() {
        let (start, end) = annotation.key();
        if start >= end {
            return Err(LayoutError::EmptySpan { index, start, end });
        }
        if end > len {
            return Err(LayoutError::OutOfBounds { index, end, len });
        }
        if start < previous_end {
            return Err(LayoutError::Overlap {
                index,
                start,
                previous_end,
            });
        }
        previous_end = end;
    }
    Ok(())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Text plus a valid ascending, disjoint span list over it
    fn arb_document() -> impl Strategy<Value = (String, Vec<Annotation>)> {
        "[a-zé \n]{0,40}".prop_flat_map(|text| {
            let len = text.chars().count();
            (
                Just(text),
                prop::collection::vec(0..=len, 0..8),
                any::<bool>(),
            )
                .prop_map(|(text, mut cuts, skip_first)| {
                    cuts.sort_unstable();
                    cuts.dedup();
                    let offset = usize::from(skip_first);
                    let annotations = cuts
                        .iter()
                        .skip(offset)
                        .collect::<Vec<_>>()
                        .chunks(2)
                        .filter(|pair| pair.len() == 2)
                        .map(|pair| Annotation {
                            start: *pair[0],
                            end: *pair[1],
                            candidates: vec![],
                            best_candidate_id: None,
                            phrase_score: 0.0,
                        })
                        .collect();
                    (text, annotations)
                })
        })
    }

    proptest! {
        #[test]
        fn segments_reassemble_the_text((text, annotations) in arb_document()) {
            prop_assert_eq!(check_layout(&text, &annotations), Ok(()));
            let segments = merge(&text, &annotations);
            let rebuilt: String = segments.iter().map(Segment::text).collect();
            prop_assert_eq!(rebuilt, text);
        }

        #[test]
        fn one_annotated_segment_per_annotation((text, annotations) in arb_document()) {
            let segments = merge(&text, &annotations);
            let spans = segments
                .iter()
                .filter(|s| matches!(s, Segment::AnnotatedSpan { .. }))
                .count();
            prop_assert_eq!(spans, annotations.len());
            // only the trailing plain segment may be empty
            for segment in &segments[..segments.len() - 1] {
                if let Segment::PlainText(content) = segment {
                    prop_assert!(!content.is_empty());
                }
            }
        }
    }
}
