/*!
 * Tests for skeleton building and skeleton writing
 */

use locflow::errors::WriterError;
use locflow::resource::property::{LANGUAGE, Property};
use locflow::resource::{
    DocumentPart, Ending, PropertyScope, StartDocument, TextContainer, TextUnit,
};
use locflow::skeleton::{
    GenericSkeleton, GenericSkeletonWriter, OutputContext, Referent, SkeletonPart, SkeletonWriter,
};
use crate::common::{en, fr};

/// Raw literals merge with `append`; placeholders start a new part
#[test]
fn test_append_afterAddAndPlaceholder_shouldMergeOrSplit() {
    let mut skeleton = GenericSkeleton::new();
    skeleton.add("<p");
    skeleton.append(">");
    assert_eq!(skeleton.len(), 1);

    skeleton.add_content_placeholder(Referent::Owner, None);
    skeleton.append("</p>");
    skeleton.append("\n");
    assert_eq!(skeleton.len(), 3);
    assert_eq!(skeleton.parts()[2].literal_text(), Some("</p>\n"));
    assert_eq!(skeleton.to_string(), "<p>[#$$self$]</p>\n");
}

/// Encodable literals are never extended by `append`
#[test]
fn test_append_afterEncodable_shouldAddNewPart() {
    let mut skeleton = GenericSkeleton::new();
    skeleton.add_encodable("a & b");
    skeleton.append(" raw");
    assert_eq!(skeleton.len(), 2);
}

/// Shared parts are copied on write
#[test]
fn test_addSkeleton_thenEdit_shouldLeaveOriginalUntouched() {
    let original = GenericSkeleton::from_text("<head>");
    let mut combined = GenericSkeleton::new();
    combined.add_skeleton(&original);
    combined.append_to_first_part("<?xml?>");

    assert_eq!(combined.to_string(), "<?xml?><head>");
    assert_eq!(original.to_string(), "<head>");
}

#[test]
fn test_replacePart_shouldSpliceSkeleton() {
    let mut skeleton = GenericSkeleton::from_text("<a>");
    skeleton.add_content_placeholder(Referent::Owner, None);
    skeleton.add("</a>");

    let index = skeleton.find_content_placeholder(None).unwrap();
    assert!(skeleton.replace_part(index, &GenericSkeleton::from_text("X")));
    assert!(!skeleton.has_content_placeholder());
    assert_eq!(skeleton.to_string(), "<a>X</a>");
    assert!(!skeleton.replace_part(10, &GenericSkeleton::new()));
}

#[test]
fn test_findContentPlaceholder_perLocale_shouldMatchExactly() {
    let mut skeleton = GenericSkeleton::new();
    skeleton.add_content_placeholder(Referent::Owner, Some(fr()));
    assert_eq!(skeleton.find_content_placeholder(Some(&fr())), Some(0));
    assert_eq!(skeleton.find_content_placeholder(None), None);
    assert!(matches!(
        skeleton.parts()[0].as_ref(),
        SkeletonPart::Content { locale: Some(l), .. } if *l == fr()
    ));
}

fn xml_document() -> (StartDocument, TextUnit, DocumentPart, TextUnit, Ending) {
    let mut sd = StartDocument::new("sd1", en(), "test", "text/xml");
    sd.properties.source.set(Property::new(LANGUAGE, "en"));
    let mut head = GenericSkeleton::from_text("<doc lang=\"");
    head.add_value_placeholder(Referent::Id("sd1".to_string()), LANGUAGE, PropertyScope::Source);
    head.add("\">");
    sd.skeleton = Some(head);

    let mut body = GenericSkeleton::from_text("<p>");
    body.add_content_placeholder(Referent::Owner, None);
    body.add("</p>");
    let mut translated = TextUnit::new("tu1", "Thanks & bye").with_skeleton(body.clone());
    translated.set_target(fr(), TextContainer::from_text("Merci & au revoir"));

    let mut note = DocumentPart::new("dp-note", GenericSkeleton::from_text("<note/>"));
    note.is_referent = true;

    let mut with_reference = body;
    with_reference.add_reference("dp-note");
    let untranslated = TextUnit::new("tu2", "Only <source>").with_skeleton(with_reference);

    let mut end = Ending::new("sd1");
    end.skeleton = Some(GenericSkeleton::from_text("</doc>"));
    (sd, translated, note, untranslated, end)
}

/// Targets replace placeholders, missing targets fall back to the source,
/// referents render where referenced and `language` follows the output locale
#[test]
fn test_writer_fullDocument_shouldResolveEveryPlaceholder() {
    let (sd, translated, note, untranslated, end) = xml_document();
    let mut writer = GenericSkeletonWriter::default();

    let mut out = writer
        .process_start_document(OutputContext::new(fr(), "UTF-8"), &sd)
        .unwrap();
    out.push_str(&writer.process_text_unit(&translated).unwrap());
    out.push_str(&writer.process_document_part(&note).unwrap());
    out.push_str(&writer.process_text_unit(&untranslated).unwrap());
    out.push_str(&writer.process_end_document(&end).unwrap());

    assert_eq!(
        out,
        "<doc lang=\"fr\"><p>Merci &amp; au revoir</p><p>Only &lt;source></p><note/></doc>"
    );
}

/// A reference consumes the stored copy; a second one has nothing left
#[test]
fn test_writer_referenceUsedTwice_shouldFailSecondTime() {
    let (sd, _, note, untranslated, _) = xml_document();
    let mut writer = GenericSkeletonWriter::default();
    writer
        .process_start_document(OutputContext::new(fr(), "UTF-8"), &sd)
        .unwrap();
    writer.process_document_part(&note).unwrap();
    writer.process_text_unit(&untranslated).unwrap();

    let again = writer.process_text_unit(&untranslated);
    assert!(matches!(again, Err(WriterError::MissingReferent(ref id)) if id == "dp-note"));
}
