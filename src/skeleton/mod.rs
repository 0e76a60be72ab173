/*!
 * Skeletons and skeleton writing.
 *
 * - `generic`: the generic skeleton made of literal and placeholder parts
 * - `marker`: textual reference markers (`[#$id]`, `[#$id@%prop]`)
 * - `writer`: the skeleton writer contract and the generic writer that
 *   rebuilds a document from its events
 */

pub mod generic;
pub mod marker;
pub mod writer;

pub use generic::{GenericSkeleton, LiteralMode, Referent, SkeletonPart};
pub use marker::{RefMarker, find_ref_markers, make_property_marker, make_ref_marker};
pub use writer::{GenericSkeletonWriter, OutputContext, SkeletonWriter, WriterOptions};
