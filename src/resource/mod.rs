/*!
 * Resource model: coded text, containers, text units and the structural
 * resources events carry.
 */

pub mod annotation;
pub mod code;
pub mod container;
pub mod fragment;
pub mod parts;
pub mod property;
pub mod text_unit;

pub use annotation::{Annotation, AnnotationKind, Annotations};
pub use code::{Code, CodeFlags, TagType, UNRESOLVED_ID};
pub use container::{AlignmentReport, MismatchPolicy, Segment, TextContainer};
pub use fragment::{Piece, TextFragment};
pub use parts::{DocumentPart, Ending, RawDocument, RawInput, StartDocument, StartGroup, StartSubDocument};
pub use property::{Property, PropertyHolder, PropertyScope, PropertySet, PropertyTable};
pub use text_unit::{CopyMode, TextUnit};
