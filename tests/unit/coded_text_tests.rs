/*!
 * Tests for coded text, code balancing and segmentation
 */

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use locflow::resource::code::{codes_to_string, string_to_codes};
use locflow::resource::fragment::{MARKER_CLOSING, MARKER_OPENING};
use locflow::resource::{StartDocument, TagType, TextContainer, TextFragment, TextUnit};
use locflow::skeleton::{GenericSkeleton, GenericSkeletonWriter, OutputContext, Referent, SkeletonWriter};
use crate::common;

fn hello_world() -> TextFragment {
    let mut fragment = TextFragment::from_text("Hello ");
    fragment.append_tag(TagType::Opening, "b", "<b>").unwrap();
    fragment.append_text("World");
    fragment.append_tag(TagType::Closing, "b", "</b>").unwrap();
    fragment.append_text("!");
    fragment
}

/// The canonical scenario: markup becomes markers plus a code table, the
/// pair shares one id and writing it back restores the input
#[test]
fn test_helloWorld_balanceAndWrite_shouldRestoreInput() {
    let mut fragment = hello_world();

    let coded: Vec<char> = fragment.coded_text().chars().collect();
    assert_eq!(coded[6], MARKER_OPENING);
    assert_eq!(coded[13], MARKER_CLOSING);

    let codes = fragment.codes().to_vec();
    assert_eq!(codes.len(), 2);
    assert_eq!(codes[0].tag_type, TagType::Opening);
    assert_eq!(codes[1].tag_type, TagType::Closing);
    assert_eq!(codes[0].id, 1);
    assert_eq!(codes[1].id, 1);

    let mut skeleton = GenericSkeleton::new();
    skeleton.add_content_placeholder(Referent::Owner, None);
    let tu = TextUnit::with_source("tu1", TextContainer::from(fragment)).with_skeleton(skeleton);

    let mut writer = GenericSkeletonWriter::default();
    let sd = StartDocument::new("sd1", common::en(), "plaintext", "text/plain");
    writer
        .process_start_document(OutputContext::new(common::en(), "UTF-8"), &sd)
        .unwrap();
    assert_eq!(writer.process_text_unit(&tu).unwrap(), "Hello <b>World</b>!");
}

fn random_fragment(rng: &mut StdRng) -> TextFragment {
    let labels = ["b", "i", "span"];
    let mut fragment = TextFragment::new();
    for _ in 0..rng.random_range(0..24) {
        let label = labels[rng.random_range(0..labels.len())];
        match rng.random_range(0..4) {
            0 => fragment.append_text("txt "),
            1 => {
                fragment
                    .append_tag(TagType::Opening, label, &format!("<{}>", label))
                    .unwrap();
            }
            2 => {
                fragment
                    .append_tag(TagType::Closing, label, &format!("</{}>", label))
                    .unwrap();
            }
            _ => {
                fragment
                    .append_tag(TagType::Isolated, "br", "<br/>")
                    .unwrap();
            }
        }
    }
    fragment
}

/// Balancing an already balanced fragment changes nothing
#[test]
fn test_balanceMarkers_randomFragments_shouldBeIdempotent() {
    let mut rng = StdRng::seed_from_u64(0x10c_f10e);
    for _ in 0..200 {
        let mut fragment = random_fragment(&mut rng);
        fragment.balance_markers();
        let once = fragment.clone();
        fragment.balance_markers();
        assert_eq!(fragment.coded_text(), once.coded_text());
        assert_eq!(fragment.codes_as_is(), once.codes_as_is());
    }
}

/// After balancing every opening code has exactly one closing partner
#[test]
fn test_balanceMarkers_randomFragments_shouldPairEveryOpening() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..200 {
        let mut fragment = random_fragment(&mut rng);
        let codes = fragment.codes().to_vec();
        for opening in codes.iter().filter(|c| c.tag_type == TagType::Opening) {
            let partners = codes
                .iter()
                .filter(|c| c.tag_type == TagType::Closing && c.id == opening.id)
                .count();
            assert_eq!(partners, 1, "opening {:?} in {:?}", opening, fragment.equiv_text());
        }
    }
}

/// A fragment stored as two strings comes back identical
#[test]
fn test_codeStorage_shouldRebuildFragment() {
    let mut original = hello_world();
    original.balance_markers();

    let storage = codes_to_string(original.codes_as_is()).unwrap();
    let mut rebuilt = TextFragment::new();
    rebuilt
        .set_coded_text_with_codes(original.coded_text(), string_to_codes(&storage).unwrap())
        .unwrap();

    assert_eq!(rebuilt.to_string(), "Hello <b>World</b>!");
    assert_eq!(rebuilt.codes_as_is(), original.codes_as_is());
    assert_eq!(rebuilt.last_id(), 1);
}

/// A pair cut across two segments keeps its kinds and merging restores the content
#[test]
fn test_segmentation_splitPair_shouldMergeBackExactly() {
    let mut fragment = TextFragment::from_text("One ");
    fragment.append_tag(TagType::Opening, "b", "<b>").unwrap();
    fragment.append_text("two. Three");
    fragment.append_tag(TagType::Closing, "b", "</b>").unwrap();
    fragment.append_text(".");
    fragment.balance_markers();

    let mut container = TextContainer::from(fragment.clone());
    let cut = container.content().coded_text().find(". ").unwrap() + 1;
    container
        .create_segments(&[(0, Some(cut)), (cut + 1, None)])
        .unwrap();

    assert_eq!(container.segment_count(), 2);
    let first = &container.segment("0").unwrap().text;
    let second = &container.segment("1").unwrap().text;
    assert_eq!(first.codes_as_is()[0].tag_type, TagType::Opening);
    assert_eq!(second.codes_as_is()[0].tag_type, TagType::Closing);
    assert_eq!(first.codes_as_is()[0].id, second.codes_as_is()[0].id);
    assert_eq!(container.to_string(), "One <b>two. Three</b>.");

    container.merge_all_segments().unwrap();
    assert!(!container.is_segmented());
    assert_eq!(container.content().coded_text(), fragment.coded_text());
    assert_eq!(container.to_string(), "One <b>two. Three</b>.");
}
