/*!
 * Tests for documents read and written back through a pipeline
 */

use std::fs;
use std::path::Path;
use std::sync::Arc;

use locflow::file_utils::FileManager;
use locflow::filter::{FilterRegistry, OutputTarget, PlainTextFilter};
use locflow::pipeline::{
    BatchItemContext, EventSequenceValidator, FilterWriterStep, ParameterKind, ParameterValue,
    Pipeline, PseudoTranslateStep, RawDocumentToEventsStep, TargetSegmentSyncStep,
};
use locflow::resource::{MismatchPolicy, RawDocument};
use crate::common;

fn roundtrip_pipeline(registry: &Arc<FilterRegistry>) -> Pipeline {
    Pipeline::new()
        .with_step(RawDocumentToEventsStep::new(Arc::clone(registry), PlainTextFilter::CONFIG_ID))
        .with_step(EventSequenceValidator::new())
        .with_step(FilterWriterStep::new(Arc::clone(registry)))
}

fn roundtrip_file(path: &Path, encoding: &str) -> Vec<u8> {
    common::init_logger();
    let registry = Arc::new(FilterRegistry::with_defaults());
    let mut pipeline = roundtrip_pipeline(&registry);
    let output = path.with_extension("out");

    let document = RawDocument::from_path(path, common::en()).with_encoding(encoding);
    pipeline
        .process(BatchItemContext::new(document).with_output(OutputTarget::Path(output.clone())))
        .unwrap();
    fs::read(output).unwrap()
}

/// Writing the extracted events back without changes gives the same bytes
#[test]
fn test_roundtrip_plainText_shouldBeByteIdentical() {
    let dir = common::create_temp_dir().unwrap();
    let input: &[u8] = b"\xEF\xBB\xBFHello <b>World</b>!\r\n\r\n  Indented &amp; <br/> spaced  \r\n\
        \tTabbed <i>line</i>\r\nLast line without break";
    let path = common::create_test_file(dir.path(), "mixed.txt", input).unwrap();

    assert_eq!(roundtrip_file(&path, "UTF-8"), input);
}

#[test]
fn test_roundtrip_legacyEncoding_shouldBeByteIdentical() {
    let dir = common::create_temp_dir().unwrap();
    let input: &[u8] = b"Caf\xE9 cr\xE8me\n\n\xC0 bient\xF4t\n";
    let path = common::create_test_file(dir.path(), "latin.txt", input).unwrap();

    assert_eq!(roundtrip_file(&path, "windows-1252"), input);
}

/// UTF-16 input keeps its byte order mark, or its lack of one
#[test]
fn test_roundtrip_utf16_shouldKeepBomChoice() {
    let dir = common::create_temp_dir().unwrap();
    let mut bare = Vec::new();
    for unit in "Grüße

zwei
".encode_utf16() {
        bare.extend_from_slice(&unit.to_le_bytes());
    }
    let mut marked = vec![0xFF, 0xFE];
    marked.extend_from_slice(&bare);

    let path = common::create_test_file(dir.path(), "bare.txt", &bare).unwrap();
    assert_eq!(roundtrip_file(&path, "UTF-16LE"), bare);

    let path = common::create_test_file(dir.path(), "marked.txt", &marked).unwrap();
    assert_eq!(roundtrip_file(&path, "UTF-8"), marked);
}

/// Unbalanced and unknown tags survive as they are
#[test]
fn test_roundtrip_unbalancedTags_shouldBeByteIdentical() {
    let dir = common::create_temp_dir().unwrap();
    let input: &[u8] = b"</i>closing first <b>never closed\n<x:y attr=\"1\">ns</x:y> 5 < 6\n";
    let path = common::create_test_file(dir.path(), "tags.txt", input).unwrap();

    assert_eq!(roundtrip_file(&path, "UTF-8"), input);
}

#[test]
fn test_pseudoTranslate_toFile_shouldWriteLocalizedCopy() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(
        dir.path(),
        "greeting.txt",
        b"Hello <b>World</b>\n\nBye\n",
    )
    .unwrap();
    let output = FileManager::generate_output_path(&path, dir.path().join("out"), "fr");

    let registry = Arc::new(FilterRegistry::with_defaults());
    let mut pipeline = Pipeline::new()
        .with_step(RawDocumentToEventsStep::new(Arc::clone(&registry), PlainTextFilter::CONFIG_ID))
        .with_step(PseudoTranslateStep::default())
        .with_step(TargetSegmentSyncStep::new(MismatchPolicy::AppendSource))
        .with_step(FilterWriterStep::new(Arc::clone(&registry)));

    let document = RawDocument::from_path(&path, common::en()).with_target_locale(common::fr());
    let run = pipeline
        .process(BatchItemContext::new(document).with_output(OutputTarget::Path(output.clone())))
        .unwrap();

    assert_eq!(run.count(locflow::EventType::TextUnit), 2);
    assert!(output.ends_with("out/greeting.fr.txt"));
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "[Hèllö <b>Wörld</b>]\n\n[Býè]\n"
    );
}

/// The output encoding can differ from the input's
#[test]
fn test_roundtrip_toBuffer_withOutputEncoding_shouldConvert() {
    let registry = Arc::new(FilterRegistry::with_defaults());
    let mut pipeline = Pipeline::new()
        .with_step(RawDocumentToEventsStep::new(Arc::clone(&registry), PlainTextFilter::CONFIG_ID))
        .with_step(FilterWriterStep::new(Arc::clone(&registry)));

    let (target, buffer) = OutputTarget::buffer();
    let item = BatchItemContext::new(RawDocument::from_text("Hi\né", common::en()))
        .with_parameter(
            ParameterKind::OutputEncoding,
            ParameterValue::Text("UTF-16LE".to_string()),
        )
        .with_output(target);
    pipeline.process(item).unwrap();

    let mut expected = vec![0xFF, 0xFE];
    for unit in "Hi\né".encode_utf16() {
        expected.extend_from_slice(&unit.to_le_bytes());
    }
    assert_eq!(*buffer.lock(), expected);
}

/// The same pipeline handles several documents one after the other
#[test]
fn test_roundtrip_pipelineReuse_shouldNotLeakState() {
    let registry = Arc::new(FilterRegistry::with_defaults());
    let mut pipeline = roundtrip_pipeline(&registry);

    for text in ["first <b>doc</b>\n", "second\r\n\r\ndoc"] {
        let (target, buffer) = OutputTarget::buffer();
        let item = BatchItemContext::new(RawDocument::from_text(text, common::en())).with_output(target);
        pipeline.process(item).unwrap();
        assert_eq!(String::from_utf8(buffer.lock().clone()).unwrap(), text);
    }
}
